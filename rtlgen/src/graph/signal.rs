use super::clock_domain::*;
use super::context::*;
use super::width::*;

use crate::error::WidthMismatch;

use std::borrow::Cow;
use std::cell::Cell;
use std::fmt;
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Not, Rem, Shl, Shr, Sub};

/// Represents a collection of 1 or more bits, identified by a net name or by the rendered text of an expression.
///
/// `Signal`s are created either by [`Module`] builder methods (eg. [`input`], [`wire`], [`reg`]), in which case they're declared nets owned by that [`Module`], or as the result of combining existing `Signal`s with operators, in which case they're immutable expression nodes whose name is the expression text (eg. `a + b`) and whose bit width follows the operator's width rule.
///
/// Operators never check operand widths; hardware truncation/extension semantics apply to the emitted text. Use [`check_width`] to detect a mismatch explicitly.
///
/// # Examples
///
/// ```
/// use rtlgen::*;
///
/// let c = Context::new();
///
/// let m = c.module("my_module");
/// let a = m.input("a", 8);
/// let b = m.input("b", 16);
///
/// let sum = a + b; // 16-bit signal
/// assert_eq!(sum.name(), "a + b");
/// assert_eq!(sum.bit_width(), 16);
///
/// let product = a * b; // 24-bit signal
/// assert_eq!(product.bit_width(), 24);
///
/// let scaled = (a + b) * a;
/// assert_eq!(scaled.name(), "(a + b) * a");
/// ```
///
/// [`check_width`]: #method.check_width
/// [`input`]: ./struct.Module.html#method.input
/// [`Module`]: ./struct.Module.html
/// [`reg`]: ./struct.Module.html#method.reg
/// [`wire`]: ./struct.Module.html#method.wire
#[must_use]
pub struct Signal<'a> {
    pub(super) context: &'a Context<'a>,

    pub(crate) name: String,
    pub(crate) bit_width: u32,
    pub(crate) kind: SignalKind,
    form: Form,

    pub(crate) clock_domain: Cell<Option<&'a ClockDomain<'a>>>,
    pub(crate) registered: Cell<bool>,
}

/// The declaration kind of a [`Signal`](./struct.Signal.html).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalKind {
    Input,
    Output,
    Wire,
    Reg,
}

impl SignalKind {
    /// Keyword used when declaring a net of this kind inside a module body.
    pub(crate) fn decl_keyword(&self) -> &'static str {
        match self {
            SignalKind::Reg => "reg",
            _ => "wire",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignalKind::Input => "input",
            SignalKind::Output => "output",
            SignalKind::Wire => "wire",
            SignalKind::Reg => "reg",
        })
    }
}

// Whether the rendered name needs grouping when used as an operand.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Form {
    Atom,
    Compound,
}

impl<'a> Signal<'a> {
    pub(super) fn new(
        context: &'a Context<'a>,
        name: String,
        bit_width: u32,
        kind: SignalKind,
    ) -> Signal<'a> {
        Signal {
            context,

            name,
            bit_width,
            kind,
            form: Form::Atom,

            clock_domain: Cell::new(None),
            registered: Cell::new(false),
        }
    }

    fn atom(&'a self, name: String, bit_width: u32) -> &'a Signal<'a> {
        self.context
            .signal_arena
            .alloc(Signal::new(self.context, name, bit_width, SignalKind::Wire))
    }

    fn compound(&'a self, name: String, bit_width: u32) -> &'a Signal<'a> {
        let mut signal = Signal::new(self.context, name, bit_width, SignalKind::Wire);
        signal.form = Form::Compound;
        self.context.signal_arena.alloc(signal)
    }

    fn binary(&'a self, op: &str, rhs: &'a Signal<'a>, bit_width: u32) -> &'a Signal<'a> {
        self.compound(
            format!("{} {} {}", self.operand(), op, rhs.operand()),
            bit_width,
        )
    }

    pub(crate) fn operand(&self) -> Cow<'_, str> {
        match self.form {
            Form::Atom => Cow::Borrowed(&self.name),
            Form::Compound => Cow::Owned(format!("({})", self.name)),
        }
    }

    /// Returns the name of this `Signal`: its net name, or the rendered expression text for derived `Signal`s.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the bit width of the given `Signal`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("my_module");
    /// let a = m.input("a", 8);
    /// let b = m.input("b", 4);
    ///
    /// assert_eq!((a + b).bit_width(), 8);
    /// assert_eq!((a - b).bit_width(), 8);
    /// assert_eq!((a & b).bit_width(), 8);
    /// assert_eq!((a * b).bit_width(), 12);
    /// assert_eq!((a / b).bit_width(), 8);
    /// assert_eq!((a % b).bit_width(), 4);
    /// assert_eq!(a.eq(b).bit_width(), 1);
    /// assert_eq!(a.logic_and(b).bit_width(), 1);
    /// assert_eq!((a << 3).bit_width(), 11);
    /// assert_eq!((a >> 3).bit_width(), 5);
    /// assert_eq!((a >> 20).bit_width(), 1);
    /// assert_eq!(a.bits(5, 2).bit_width(), 4);
    /// assert_eq!(a.concat(b).bit_width(), 12);
    /// assert_eq!(m.high().repeat(35).bit_width(), 35);
    /// ```
    #[must_use]
    pub fn bit_width(&self) -> u32 {
        self.bit_width
    }

    /// Returns the declaration kind of this `Signal`. Derived `Signal`s are always [`SignalKind::Wire`](./enum.SignalKind.html).
    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    /// Returns the [`ClockDomain`] this `Signal` has been tagged with, if any.
    ///
    /// [`ClockDomain`]: ./struct.ClockDomain.html
    pub fn clock_domain(&self) -> Option<&'a ClockDomain<'a>> {
        self.clock_domain.get()
    }

    /// Tags this `Signal` with `domain` and returns it.
    ///
    /// The association is for grouping and documentation only; it doesn't change how the `Signal` is emitted.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("my_module");
    /// let domain = m.clock_domain("fast", m.input("clk", 1), m.input("rst", 1));
    /// let data = m.wire("data", 8).with_clock_domain(domain);
    ///
    /// assert_eq!(data.clock_domain().map(|d| d.name()), Some("fast"));
    /// ```
    pub fn with_clock_domain(&'a self, domain: &'a ClockDomain<'a>) -> &'a Signal<'a> {
        self.clock_domain.set(Some(domain));
        self
    }

    /// Returns whether this `Signal` is an output port driven from a clocked block (declared `output reg`).
    pub fn is_registered(&self) -> bool {
        self.registered.get()
    }

    /// Checks that `self` and `other` have the same bit width.
    ///
    /// Operators never perform this check themselves, so this is the explicit way to detect a mismatch. A mismatch isn't fatal; callers decide what to do with it.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("my_module");
    /// let a = m.input("a", 8);
    /// let b = m.input("b", 4);
    ///
    /// assert!(a.check_width(a).is_ok());
    ///
    /// let err = a.check_width(b).unwrap_err();
    /// assert_eq!(err.to_string(), "width mismatch: a has width 8, b has width 4");
    /// ```
    pub fn check_width(&self, other: &Signal<'_>) -> Result<(), WidthMismatch> {
        if self.bit_width != other.bit_width {
            return Err(WidthMismatch {
                lhs: self.name.clone(),
                lhs_width: self.bit_width,
                rhs: other.name.clone(),
                rhs_width: other.bit_width,
            });
        }
        Ok(())
    }

    /// Creates a `Signal` that represents the single bit of this `Signal` at index `index`.
    ///
    /// Equivalent to `self.bits(index, index)`.
    pub fn bit(&'a self, index: u32) -> &'a Signal<'a> {
        self.bits(index, index)
    }

    /// Creates a `Signal` that represents the contiguous bits `[range_high:range_low]` of this `Signal`, with a bit width of `range_high - range_low + 1`.
    ///
    /// A single-bit select (`range_high == range_low`) renders as `name[index]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("my_module");
    /// let a = m.input("a", 16);
    ///
    /// assert_eq!(a.bits(7, 0).name(), "a[7:0]");
    /// assert_eq!(a.bits(7, 0).bit_width(), 8);
    /// assert_eq!(a.bits(3, 3).name(), "a[3]");
    /// assert_eq!(a.bit(3).bit_width(), 1);
    /// ```
    pub fn bits(&'a self, range_high: u32, range_low: u32) -> &'a Signal<'a> {
        if range_high == range_low {
            return self.atom(format!("{}[{}]", self.operand(), range_high), 1);
        }
        self.atom(
            format!("{}[{}:{}]", self.operand(), range_high, range_low),
            range_high.saturating_sub(range_low) + 1,
        )
    }

    /// Creates a `Signal` that represents this `Signal` concatenated with `rhs`, with `self` as the upper bits.
    ///
    /// See [`Module::cat`](./struct.Module.html#method.cat) to concatenate more than two `Signal`s at once.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("my_module");
    /// let a = m.input("a", 4);
    /// let b = m.input("b", 8);
    ///
    /// assert_eq!(a.concat(b).name(), "{a, b}");
    /// assert_eq!(a.concat(b).bit_width(), 12);
    /// ```
    pub fn concat(&'a self, rhs: &'a Signal<'a>) -> &'a Signal<'a> {
        self.atom(
            format!("{{{}, {}}}", self.name, rhs.name),
            self.bit_width.saturating_add(rhs.bit_width),
        )
    }

    /// Creates a `Signal` that represents this `Signal` replicated `count` times, with a bit width of `count * self.bit_width()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("my_module");
    ///
    /// let ones = m.high().repeat(4);
    /// assert_eq!(ones.name(), "{4{1'b1}}");
    /// assert_eq!(ones.bit_width(), 4);
    ///
    /// let pattern = m.lit(1u32, 2).repeat(3);
    /// assert_eq!(pattern.name(), "{3{2'h1}}");
    /// assert_eq!(pattern.bit_width(), 6);
    /// ```
    pub fn repeat(&'a self, count: u32) -> &'a Signal<'a> {
        self.atom(
            format!("{{{}{{{}}}}}", count, self.name),
            count.saturating_mul(self.bit_width),
        )
    }

    /// Creates a single-bit `Signal` that represents the logical AND (`&&`) of `self` and `rhs`.
    pub fn logic_and(&'a self, rhs: &'a Signal<'a>) -> &'a Signal<'a> {
        self.binary("&&", rhs, 1)
    }

    /// Creates a single-bit `Signal` that represents the logical OR (`||`) of `self` and `rhs`.
    pub fn logic_or(&'a self, rhs: &'a Signal<'a>) -> &'a Signal<'a> {
        self.binary("||", rhs, 1)
    }

    /// Creates a single-bit `Signal` that represents the logical negation (`!`) of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("my_module");
    /// let a = m.input("a", 1);
    /// let b = m.input("b", 1);
    /// let req = m.input("req", 1);
    ///
    /// assert_eq!(a.logic_not().name(), "!a");
    /// assert_eq!(req.logic_and(a.logic_or(b).logic_not()).name(), "req && !(a || b)");
    /// ```
    pub fn logic_not(&'a self) -> &'a Signal<'a> {
        self.atom(format!("!{}", self.operand()), 1)
    }

    /// Creates a single-bit `Signal` that represents `self == rhs`.
    pub fn eq(&'a self, rhs: &'a Signal<'a>) -> &'a Signal<'a> {
        self.binary("==", rhs, 1)
    }

    /// Creates a single-bit `Signal` that represents `self != rhs`.
    pub fn ne(&'a self, rhs: &'a Signal<'a>) -> &'a Signal<'a> {
        self.binary("!=", rhs, 1)
    }

    /// Creates a single-bit `Signal` that represents `self < rhs`.
    pub fn lt(&'a self, rhs: &'a Signal<'a>) -> &'a Signal<'a> {
        self.binary("<", rhs, 1)
    }

    /// Creates a single-bit `Signal` that represents `self <= rhs`.
    pub fn le(&'a self, rhs: &'a Signal<'a>) -> &'a Signal<'a> {
        self.binary("<=", rhs, 1)
    }

    /// Creates a single-bit `Signal` that represents `self > rhs`.
    pub fn gt(&'a self, rhs: &'a Signal<'a>) -> &'a Signal<'a> {
        self.binary(">", rhs, 1)
    }

    /// Creates a single-bit `Signal` that represents `self >= rhs`.
    pub fn ge(&'a self, rhs: &'a Signal<'a>) -> &'a Signal<'a> {
        self.binary(">=", rhs, 1)
    }
}

impl<'a> Add for &'a Signal<'a> {
    type Output = Self;

    /// Produces `self + rhs` with the wider operand's bit width.
    fn add(self, rhs: Self) -> Self {
        self.binary("+", rhs, max_width(self.bit_width, rhs.bit_width))
    }
}

impl<'a> Sub for &'a Signal<'a> {
    type Output = Self;

    /// Produces `self - rhs` with the wider operand's bit width.
    fn sub(self, rhs: Self) -> Self {
        self.binary("-", rhs, max_width(self.bit_width, rhs.bit_width))
    }
}

impl<'a> Mul for &'a Signal<'a> {
    type Output = Self;

    /// Produces `self * rhs` with a bit width equal to the sum of the operand widths.
    fn mul(self, rhs: Self) -> Self {
        self.binary("*", rhs, self.bit_width.saturating_add(rhs.bit_width))
    }
}

impl<'a> Div for &'a Signal<'a> {
    type Output = Self;

    /// Produces `self / rhs` with the numerator's bit width.
    fn div(self, rhs: Self) -> Self {
        self.binary("/", rhs, self.bit_width)
    }
}

impl<'a> Rem for &'a Signal<'a> {
    type Output = Self;

    /// Produces `self % rhs` with the denominator's bit width.
    fn rem(self, rhs: Self) -> Self {
        self.binary("%", rhs, rhs.bit_width)
    }
}

impl<'a> BitAnd for &'a Signal<'a> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.binary("&", rhs, max_width(self.bit_width, rhs.bit_width))
    }
}

impl<'a> BitOr for &'a Signal<'a> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.binary("|", rhs, max_width(self.bit_width, rhs.bit_width))
    }
}

impl<'a> BitXor for &'a Signal<'a> {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        self.binary("^", rhs, max_width(self.bit_width, rhs.bit_width))
    }
}

impl<'a> Not for &'a Signal<'a> {
    type Output = Self;

    /// Produces the bitwise complement `~self`, keeping the bit width.
    fn not(self) -> Self {
        self.atom(format!("~{}", self.operand()), self.bit_width)
    }
}

impl<'a> Shl<u32> for &'a Signal<'a> {
    type Output = Self;

    /// Produces `self << amount`; the result grows by `amount` bits.
    fn shl(self, amount: u32) -> Self {
        self.compound(
            format!("{} << {}", self.operand(), amount),
            self.bit_width.saturating_add(amount),
        )
    }
}

impl<'a> Shr<u32> for &'a Signal<'a> {
    type Output = Self;

    /// Produces `self >> amount`; the result shrinks by `amount` bits, but never below 1 bit.
    fn shr(self, amount: u32) -> Self {
        self.compound(
            format!("{} >> {}", self.operand(), amount),
            self.bit_width.saturating_sub(amount).max(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    use proptest::prelude::*;

    #[test]
    fn arithmetic_rendering() {
        let c = Context::new();

        let m = c.module("A");
        let a = m.input("a", 8);
        let b = m.input("b", 8);

        assert_eq!((a + b).name(), "a + b");
        assert_eq!((a - b).name(), "a - b");
        assert_eq!((a * b).name(), "a * b");
        assert_eq!((a / b).name(), "a / b");
        assert_eq!((a % b).name(), "a % b");
        assert_eq!((a & b).name(), "a & b");
        assert_eq!((a | b).name(), "a | b");
        assert_eq!((a ^ b).name(), "a ^ b");
        assert_eq!((!a).name(), "~a");
    }

    #[test]
    fn comparison_rendering() {
        let c = Context::new();

        let m = c.module("A");
        let a = m.input("a", 8);
        let b = m.input("b", 8);

        assert_eq!(a.eq(b).name(), "a == b");
        assert_eq!(a.ne(b).name(), "a != b");
        assert_eq!(a.lt(b).name(), "a < b");
        assert_eq!(a.le(b).name(), "a <= b");
        assert_eq!(a.gt(b).name(), "a > b");
        assert_eq!(a.ge(b).name(), "a >= b");
        assert_eq!(a.logic_and(b).name(), "a && b");
        assert_eq!(a.logic_or(b).name(), "a || b");
    }

    #[test]
    fn shift_rendering() {
        let c = Context::new();

        let m = c.module("A");
        let a = m.input("a", 8);

        assert_eq!((a << 2).name(), "a << 2");
        assert_eq!((a >> 2).name(), "a >> 2");
        assert_eq!((a ^ (a >> 1)).name(), "a ^ (a >> 1)");
    }

    #[test]
    fn compound_operands_are_grouped() {
        let c = Context::new();

        let m = c.module("A");
        let a = m.input("a", 8);
        let b = m.input("b", 8);
        let d = m.input("d", 8);

        assert_eq!(((a + b) * d).name(), "(a + b) * d");
        assert_eq!((d - (a + b)).name(), "d - (a + b)");
        assert_eq!((!(a & b)).name(), "~(a & b)");
        assert_eq!((a + b).bits(3, 0).name(), "(a + b)[3:0]");
        // Selects, concatenations and unary operators stay ungrouped
        assert_eq!((a.bits(3, 0) + !b).name(), "a[3:0] + ~b");
        assert_eq!(a.concat(b).eq(b.concat(a)).name(), "{a, b} == {b, a}");
    }

    #[test]
    fn derived_signals_are_wires() {
        let c = Context::new();

        let m = c.module("A");
        let a = m.reg("a", 8);
        let b = m.input("b", 8);

        assert_eq!(a.kind(), SignalKind::Reg);
        assert_eq!(b.kind(), SignalKind::Input);
        assert_eq!((a + b).kind(), SignalKind::Wire);
        assert!((a + b).clock_domain().is_none());
    }

    #[test]
    fn operators_do_not_mutate_operands() {
        let c = Context::new();

        let m = c.module("A");
        let a = m.input("a", 8);
        let b = m.input("b", 4);

        let _ = a * b;
        let _ = a << 4;

        assert_eq!(a.name(), "a");
        assert_eq!(a.bit_width(), 8);
        assert_eq!(b.name(), "b");
        assert_eq!(b.bit_width(), 4);
    }

    #[test]
    fn bit_select_widths() {
        let c = Context::new();

        let m = c.module("A");
        let a = m.input("a", 32);

        assert_eq!(a.bits(31, 0).bit_width(), 32);
        assert_eq!(a.bits(15, 8).bit_width(), 8);
        assert_eq!(a.bits(0, 0).bit_width(), 1);
        assert_eq!(a.bits(0, 0).name(), "a[0]");
    }

    #[test]
    fn check_width_reports_both_operands() {
        let c = Context::new();

        let m = c.module("A");
        let a = m.input("a", 3);
        let b = m.input("b", 5);

        let err = a.check_width(b).unwrap_err();
        assert_eq!(err.lhs, "a");
        assert_eq!(err.lhs_width, 3);
        assert_eq!(err.rhs, "b");
        assert_eq!(err.rhs_width, 5);
        assert!((a + b).check_width(b).is_ok());
    }

    #[test]
    fn widths_saturate_at_u32_max() {
        let c = Context::new();

        let m = c.module("A");
        let wide = m.wire("wide", u32::MAX);
        let narrow = m.wire("narrow", 2);

        assert_eq!(narrow.repeat(u32::MAX).bit_width(), u32::MAX);
        assert_eq!((wide * narrow).bit_width(), u32::MAX);
        assert_eq!((narrow << u32::MAX).bit_width(), u32::MAX);
        assert_eq!(wide.concat(narrow).bit_width(), u32::MAX);
        assert_eq!(m.cat(&[narrow, wide, narrow]).unwrap().bit_width(), u32::MAX);
    }

    proptest! {
        #[test]
        fn add_width_is_max(wa in 1u32..=256, wb in 1u32..=256) {
            let c = Context::new();
            let m = c.module("A");
            let a = m.wire("a", wa);
            let b = m.wire("b", wb);

            prop_assert_eq!((a + b).bit_width(), wa.max(wb));
            prop_assert_eq!((a - b).bit_width(), wa.max(wb));
            prop_assert_eq!((a | b).bit_width(), wa.max(wb));
        }

        #[test]
        fn mul_width_is_sum(wa in 1u32..=256, wb in 1u32..=256) {
            let c = Context::new();
            let m = c.module("A");
            let a = m.wire("a", wa);
            let b = m.wire("b", wb);

            prop_assert_eq!((a * b).bit_width(), wa + wb);
            prop_assert_eq!((a / b).bit_width(), wa);
            prop_assert_eq!((a % b).bit_width(), wb);
        }

        #[test]
        fn comparisons_are_one_bit(wa in 1u32..=256, wb in 1u32..=256) {
            let c = Context::new();
            let m = c.module("A");
            let a = m.wire("a", wa);
            let b = m.wire("b", wb);

            prop_assert_eq!(a.eq(b).bit_width(), 1);
            prop_assert_eq!(a.ne(b).bit_width(), 1);
            prop_assert_eq!(a.ge(b).bit_width(), 1);
            prop_assert_eq!(a.logic_or(b).bit_width(), 1);
            prop_assert_eq!(a.logic_not().bit_width(), 1);
        }

        #[test]
        fn shr_never_below_one_bit(w in 1u32..=128, k in 0u32..=512) {
            let c = Context::new();
            let m = c.module("A");
            let a = m.wire("a", w);

            prop_assert!((a >> k).bit_width() >= 1);
            prop_assert_eq!((a << k).bit_width(), w + k);
        }

        #[test]
        fn concat_width_is_sum(wa in 1u32..=256, wb in 1u32..=256, n in 1u32..=64) {
            let c = Context::new();
            let m = c.module("A");
            let a = m.wire("a", wa);
            let b = m.wire("b", wb);

            prop_assert_eq!(a.concat(b).bit_width(), wa + wb);
            prop_assert_eq!(m.fill(n, true).bit_width(), n);
        }
    }
}
