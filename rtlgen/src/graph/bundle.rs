use super::module::*;
use super::signal::*;

use std::cell::RefCell;

/// A named group of [`Signal`]s, created by the [`Module`]::[`bundle`] method.
///
/// Each field is backed by its own [`Signal`] named `<bundle>_<field>`. Fields are kept in the order they were added.
///
/// # Examples
///
/// ```
/// use rtlgen::*;
///
/// let c = Context::new();
///
/// let m = c.module("MyModule");
/// let data = m.wire("data", 32);
/// let valid = m.wire("valid", 1);
///
/// let req = m.bundle("req");
/// req.add_field("data", data);
/// req.add_field("valid", valid);
///
/// let resp = m.bundle("resp");
/// resp.add_field("data", data);
///
/// assert_eq!(req.field("data").map(|f| f.name()), Some("req_data"));
/// assert_eq!(resp.connect(req), vec!["assign resp_data = req_data;"]);
/// ```
///
/// [`bundle`]: ./struct.Module.html#method.bundle
/// [`Module`]: ./struct.Module.html
/// [`Signal`]: ./struct.Signal.html
#[must_use]
pub struct Bundle<'a> {
    module: &'a Module<'a>,

    pub(crate) name: String,
    pub(crate) fields: RefCell<Vec<(String, &'a Signal<'a>)>>,
}

impl<'a> Bundle<'a> {
    pub(super) fn new(module: &'a Module<'a>, name: String) -> Bundle<'a> {
        Bundle {
            module,

            name,
            fields: RefCell::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a field called `name` shaped like `signal` (same bit width and kind), and returns the field's own [`Signal`].
    ///
    /// Adding a field with an existing name replaces it in place.
    ///
    /// [`Signal`]: ./struct.Signal.html
    pub fn add_field<S: Into<String>>(&'a self, name: S, signal: &Signal<'a>) -> &'a Signal<'a> {
        let name = name.into();
        let field = self.module.signal(
            format!("{}_{}", self.name, name),
            signal.bit_width(),
            signal.kind(),
        );
        let mut fields = self.fields.borrow_mut();
        match fields.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = field,
            None => fields.push((name, field)),
        }
        field
    }

    /// Returns the field called `name`, or `None` if there's no such field.
    pub fn field(&self, name: &str) -> Option<&'a Signal<'a>> {
        self.fields
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
    }

    /// Returns one `assign <self_field> = <other_field>;` statement for each field present in both bundles, in this bundle's field order.
    ///
    /// The statements aren't added to any module; pass them to [`Module::assign_raw`](./struct.Module.html#method.assign_raw).
    pub fn connect(&self, other: &Bundle<'a>) -> Vec<String> {
        self.fields
            .borrow()
            .iter()
            .filter_map(|(name, signal)| {
                other
                    .field(name)
                    .map(|o| format!("assign {} = {};", signal.name(), o.name()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn fields_copy_shape() {
        let c = Context::new();

        let m = c.module("A");
        let b = m.bundle("bus");
        let addr = b.add_field("addr", m.input("addr", 16));
        let data = b.add_field("data", m.reg("data", 8));

        assert_eq!(addr.name(), "bus_addr");
        assert_eq!(addr.bit_width(), 16);
        assert_eq!(addr.kind(), SignalKind::Input);
        assert_eq!(data.kind(), SignalKind::Reg);
        assert!(b.field("nope").is_none());
    }

    #[test]
    fn connect_only_shared_fields_in_order() {
        let c = Context::new();

        let m = c.module("A");
        let w = m.wire("w", 4);

        let a = m.bundle("a");
        a.add_field("z", w);
        a.add_field("x", w);
        a.add_field("only_a", w);

        let b = m.bundle("b");
        b.add_field("x", w);
        b.add_field("z", w);
        b.add_field("only_b", w);

        assert_eq!(
            a.connect(b),
            vec!["assign a_z = b_z;", "assign a_x = b_x;"]
        );
    }

    #[test]
    fn readding_field_replaces_in_place() {
        let c = Context::new();

        let m = c.module("A");
        let b = m.bundle("b");
        b.add_field("x", m.wire("narrow", 1));
        b.add_field("y", m.wire("y", 1));
        b.add_field("x", m.wire("wide", 8));

        let fields = b.fields.borrow();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].0, "x");
        assert_eq!(fields[0].1.bit_width(), 8);
    }
}
