use super::signal::*;

use std::cell::RefCell;

/// A fixed-size sequence of same-width [`Signal`]s, created by the [`Module`]::[`vec`] method.
///
/// Elements are initially wires named `<name>[<index>]`. Element access is bounds-checked: out-of-range indices yield `None` (for [`get`]) or leave the vec untouched (for [`set`]).
///
/// # Examples
///
/// ```
/// use rtlgen::*;
///
/// let c = Context::new();
///
/// let m = c.module("MyModule");
/// let src = m.vec("src", 4, 8);
/// let dst = m.vec("dst", 2, 8);
///
/// assert!(src.get(4).is_none());
///
/// for statement in dst.connect(src) {
///     m.assign_raw(statement);
/// }
/// assert_eq!(m.assigns(), vec!["assign dst[0] = src[0];", "assign dst[1] = src[1];"]);
/// ```
///
/// [`get`]: #method.get
/// [`Module`]: ./struct.Module.html
/// [`set`]: #method.set
/// [`Signal`]: ./struct.Signal.html
/// [`vec`]: ./struct.Module.html#method.vec
#[must_use]
pub struct SignalVec<'a> {
    pub(crate) name: String,
    pub(crate) bit_width: u32,
    pub(crate) elements: RefCell<Vec<&'a Signal<'a>>>,
}

impl<'a> SignalVec<'a> {
    pub(super) fn new(name: String, bit_width: u32, elements: Vec<&'a Signal<'a>>) -> SignalVec<'a> {
        SignalVec {
            name,
            bit_width,
            elements: RefCell::new(elements),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bit width of each element.
    pub fn bit_width(&self) -> u32 {
        self.bit_width
    }

    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    /// Returns the element at `index`, or `None` if `index` is out of range.
    pub fn get(&self, index: usize) -> Option<&'a Signal<'a>> {
        self.elements.borrow().get(index).copied()
    }

    /// Replaces the element at `index` with `signal`. Returns `false` (and does nothing) if `index` is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("MyModule");
    /// let v = m.vec("v", 2, 8);
    /// let x = m.input("x", 8);
    ///
    /// assert!(v.set(1, x));
    /// assert!(!v.set(2, x));
    /// assert_eq!(v.get(1).map(|s| s.name()), Some("x"));
    /// ```
    pub fn set(&self, index: usize, signal: &'a Signal<'a>) -> bool {
        match self.elements.borrow_mut().get_mut(index) {
            Some(element) => {
                *element = signal;
                true
            }
            None => false,
        }
    }

    /// Returns one `assign <self[i]> = <other[i]>;` statement per index present in both vecs.
    pub fn connect(&self, other: &SignalVec<'a>) -> Vec<String> {
        let elements = self.elements.borrow();
        let others = other.elements.borrow();
        elements
            .iter()
            .zip(others.iter())
            .map(|(lhs, rhs)| format!("assign {} = {};", lhs.name(), rhs.name()))
            .collect()
    }
}
