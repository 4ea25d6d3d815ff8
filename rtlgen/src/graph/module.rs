use super::bundle::*;
use super::clock_domain::*;
use super::context::*;
use super::instance::*;
use super::mem::*;
use super::mutex::*;
use super::param::*;
use super::signal::*;
use super::signal_vec::*;
use super::template::*;
use super::value::*;

use log::warn;

use std::cell::{Cell, RefCell};
use std::fmt;

/// A self-contained and potentially-reusable hardware design unit, created by the [`Context`]::[`module`] method.
///
/// A `Module` owns ordered lists of everything declared in it (ports, wires, regs, bundles, vecs, memories, instances, statements, clock domains, mutexes and templates). List order is call order, and it directly determines the order of the emitted text.
///
/// No name uniqueness checks are performed; declaring two identically-named ports produces invalid output.
///
/// # Examples
///
/// ```
/// use rtlgen::*;
///
/// let c = Context::new();
///
/// let m = c.module("Adder");
/// let a = m.input("a", 8);
/// let b = m.input("b", 8);
/// let sum = m.output("sum", 8);
/// m.assign(sum, a + b);
///
/// assert_eq!(m.assigns(), vec!["assign sum = a + b;"]);
/// ```
///
/// [`Context`]: ./struct.Context.html
/// [`module`]: ./struct.Context.html#method.module
#[must_use]
pub struct Module<'a> {
    pub(super) context: &'a Context<'a>,

    name: RefCell<String>,

    pub(crate) inputs: RefCell<Vec<&'a Signal<'a>>>,
    pub(crate) outputs: RefCell<Vec<&'a Signal<'a>>>,
    pub(crate) wires: RefCell<Vec<&'a Signal<'a>>>,
    pub(crate) regs: RefCell<Vec<&'a Signal<'a>>>,
    pub(crate) bundles: RefCell<Vec<&'a Bundle<'a>>>,
    pub(crate) vecs: RefCell<Vec<&'a SignalVec<'a>>>,
    pub(crate) mems: RefCell<Vec<&'a Mem<'a>>>,
    pub(crate) instances: RefCell<Vec<&'a Instance<'a>>>,
    pub(crate) assigns: RefCell<Vec<String>>,
    pub(crate) always_blocks: RefCell<Vec<String>>,
    pub(crate) parameters: RefCell<ParamMap>,
    pub(crate) clock_domains: RefCell<Vec<&'a ClockDomain<'a>>>,
    pub(crate) mutexes: RefCell<Vec<&'a Mutex<'a>>>,
    pub(crate) templates: RefCell<Vec<ModuleTemplate>>,

    clock: Cell<Option<&'a Signal<'a>>>,
    reset: Cell<Option<&'a Signal<'a>>>,
}

impl<'a> Module<'a> {
    pub(super) fn new(context: &'a Context<'a>, name: String) -> Module<'a> {
        Module {
            context,

            name: RefCell::new(name),

            inputs: RefCell::new(Vec::new()),
            outputs: RefCell::new(Vec::new()),
            wires: RefCell::new(Vec::new()),
            regs: RefCell::new(Vec::new()),
            bundles: RefCell::new(Vec::new()),
            vecs: RefCell::new(Vec::new()),
            mems: RefCell::new(Vec::new()),
            instances: RefCell::new(Vec::new()),
            assigns: RefCell::new(Vec::new()),
            always_blocks: RefCell::new(Vec::new()),
            parameters: RefCell::new(ParamMap::new()),
            clock_domains: RefCell::new(Vec::new()),
            mutexes: RefCell::new(Vec::new()),
            templates: RefCell::new(Vec::new()),

            clock: Cell::new(None),
            reset: Cell::new(None),
        }
    }

    /// Returns this `Module`'s name.
    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub(super) fn rename(&self, name: String) {
        *self.name.borrow_mut() = name;
    }

    pub(super) fn signal(&'a self, name: String, bit_width: u32, kind: SignalKind) -> &'a Signal<'a> {
        self.context
            .signal_arena
            .alloc(Signal::new(self.context, name, bit_width, kind))
    }

    /// Creates a [`Signal`] that represents the constant literal specified by `value` with `bit_width` bits, rendered as `<bit_width>'h<hex>`.
    ///
    /// The bit width of the type provided by `value` doesn't need to match `bit_width`. A `value` that doesn't fit into `bit_width` bits is still rendered, but a warning is logged.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("MyModule");
    ///
    /// let eight_bit_const = m.lit(0xffu32, 8);
    /// assert_eq!(eight_bit_const.name(), "8'hff");
    ///
    /// let wide_const = m.lit(true, 27);
    /// assert_eq!(wide_const.name(), "27'h1");
    /// assert_eq!(wide_const.bit_width(), 27);
    /// ```
    ///
    /// [`Signal`]: ./struct.Signal.html
    pub fn lit<V: Into<Value>>(&'a self, value: V, bit_width: u32) -> &'a Signal<'a> {
        let value = value.into();
        if value.required_bits() > bit_width {
            warn!(
                "literal {} needs {} bit(s) but is declared with {} in module \"{}\"",
                value.numeric_value(),
                value.required_bits(),
                bit_width,
                self.name()
            );
        }
        self.signal(
            format!("{}'h{:x}", bit_width, value.numeric_value()),
            bit_width,
            SignalKind::Wire,
        )
    }

    /// Convenience method to create a [`Signal`] that represents a single `0` bit (`1'b0`).
    ///
    /// [`Signal`]: ./struct.Signal.html
    pub fn low(&'a self) -> &'a Signal<'a> {
        self.signal("1'b0".into(), 1, SignalKind::Wire)
    }

    /// Convenience method to create a [`Signal`] that represents a single `1` bit (`1'b1`).
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("MyModule");
    ///
    /// assert_eq!(m.high().name(), "1'b1");
    /// assert_eq!(m.low().name(), "1'b0");
    /// ```
    ///
    /// [`Signal`]: ./struct.Signal.html
    pub fn high(&'a self) -> &'a Signal<'a> {
        self.signal("1'b1".into(), 1, SignalKind::Wire)
    }

    /// Creates a [`Signal`] with `count` copies of the single bit `bit`, rendered as `{count{1'b1}}` or `{count{1'b0}}`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("MyModule");
    ///
    /// let mask = m.fill(8, true);
    /// assert_eq!(mask.name(), "{8{1'b1}}");
    /// assert_eq!(mask.bit_width(), 8);
    /// ```
    ///
    /// [`Signal`]: ./struct.Signal.html
    pub fn fill(&'a self, count: u32, bit: bool) -> &'a Signal<'a> {
        let bit = if bit { self.high() } else { self.low() };
        bit.repeat(count)
    }

    /// Creates a [`Signal`] that represents the concatenation of `signals`, with the first element as the upper bits.
    ///
    /// Returns `None` if `signals` is empty, and the only element unchanged if it has exactly one.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("MyModule");
    /// let a = m.input("a", 4);
    /// let b = m.input("b", 4);
    /// let d = m.input("d", 8);
    ///
    /// let all = m.cat(&[a, b, d]).unwrap();
    /// assert_eq!(all.name(), "{a, b, d}");
    /// assert_eq!(all.bit_width(), 16);
    ///
    /// assert!(m.cat(&[]).is_none());
    /// ```
    ///
    /// [`Signal`]: ./struct.Signal.html
    pub fn cat(&'a self, signals: &[&'a Signal<'a>]) -> Option<&'a Signal<'a>> {
        match signals {
            [] => None,
            [single] => Some(*single),
            _ => {
                let names = signals.iter().map(|s| s.name()).collect::<Vec<_>>();
                let bit_width = signals
                    .iter()
                    .fold(0u32, |width, s| width.saturating_add(s.bit_width()));
                Some(self.signal(
                    format!("{{{}}}", names.join(", ")),
                    bit_width,
                    SignalKind::Wire,
                ))
            }
        }
    }

    /// Creates a [`Signal`] that selects among `values` by the value of `sel`, with the bit width of the widest of `values`.
    ///
    /// Renders as a right-nested conditional chain comparing `sel` against each index in turn; the last value is selected when no earlier index matches.
    ///
    /// Returns `None` if `values` is empty, and the only element unchanged if it has exactly one.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("MyModule");
    /// let sel = m.input("sel", 2);
    /// let a = m.input("a", 8);
    /// let b = m.input("b", 4);
    /// let d = m.input("d", 16);
    ///
    /// let picked = m.mux(sel, &[a, b, d]).unwrap();
    /// assert_eq!(picked.name(), "((sel == 0) ? a : (sel == 1) ? b : d)");
    /// assert_eq!(picked.bit_width(), 16);
    /// ```
    ///
    /// [`Signal`]: ./struct.Signal.html
    pub fn mux(&'a self, sel: &'a Signal<'a>, values: &[&'a Signal<'a>]) -> Option<&'a Signal<'a>> {
        let (default, rest) = match values {
            [] => return None,
            [single] => return Some(*single),
            [rest @ .., last] => (*last, rest),
        };
        let mut text = String::from("(");
        for (index, value) in rest.iter().enumerate() {
            text.push_str(&format!("({} == {}) ? {} : ", sel.operand(), index, value.name()));
        }
        text.push_str(default.name());
        text.push(')');
        let bit_width = values.iter().map(|v| v.bit_width()).max().unwrap_or(1);
        Some(self.signal(text, bit_width, SignalKind::Wire))
    }

    /// Creates an input port for this `Module` called `name` with `bit_width` bits, and returns a [`Signal`] that represents it.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("MyModule");
    ///
    /// let my_input = m.input("my_input", 80);
    /// assert_eq!(my_input.kind(), SignalKind::Input);
    /// ```
    ///
    /// [`Signal`]: ./struct.Signal.html
    pub fn input<S: Into<String>>(&'a self, name: S, bit_width: u32) -> &'a Signal<'a> {
        let input = self.signal(name.into(), bit_width, SignalKind::Input);
        self.inputs.borrow_mut().push(input);
        input
    }

    /// Creates an output port for this `Module` called `name` with `bit_width` bits, and returns a [`Signal`] that represents it.
    ///
    /// Outputs are driven with [`assign`](#method.assign) (or from a procedural block).
    ///
    /// [`Signal`]: ./struct.Signal.html
    pub fn output<S: Into<String>>(&'a self, name: S, bit_width: u32) -> &'a Signal<'a> {
        let output = self.signal(name.into(), bit_width, SignalKind::Output);
        self.outputs.borrow_mut().push(output);
        output
    }

    /// Declares a wire in this `Module` called `name` with `bit_width` bits.
    pub fn wire<S: Into<String>>(&'a self, name: S, bit_width: u32) -> &'a Signal<'a> {
        let wire = self.signal(name.into(), bit_width, SignalKind::Wire);
        self.wires.borrow_mut().push(wire);
        wire
    }

    /// Declares a register in this `Module` called `name` with `bit_width` bits.
    ///
    /// Registers are updated from procedural blocks added with [`always`](#method.always).
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("Counter");
    /// let clk = m.input("clk", 1);
    /// let count = m.reg("count", 8);
    /// m.always(format!(
    ///     "always @(posedge {}) {} <= {};",
    ///     clk.name(),
    ///     count.name(),
    ///     (count + m.lit(1u32, 8)).name()
    /// ));
    ///
    /// assert_eq!(m.always_blocks(), vec!["always @(posedge clk) count <= count + 8'h1;"]);
    /// ```
    pub fn reg<S: Into<String>>(&'a self, name: S, bit_width: u32) -> &'a Signal<'a> {
        let reg = self.signal(name.into(), bit_width, SignalKind::Reg);
        self.regs.borrow_mut().push(reg);
        reg
    }

    /// Creates an empty [`Bundle`] called `name` in this `Module`.
    ///
    /// [`Bundle`]: ./struct.Bundle.html
    pub fn bundle<S: Into<String>>(&'a self, name: S) -> &'a Bundle<'a> {
        let bundle = self.context.bundle_arena.alloc(Bundle::new(self, name.into()));
        self.bundles.borrow_mut().push(bundle);
        bundle
    }

    /// Creates a [`SignalVec`] called `name` in this `Module` with `size` wires of `bit_width` bits each, named `name[0]` through `name[size - 1]`.
    ///
    /// [`SignalVec`]: ./struct.SignalVec.html
    pub fn vec<S: Into<String>>(&'a self, name: S, size: usize, bit_width: u32) -> &'a SignalVec<'a> {
        let name = name.into();
        let elements = (0..size)
            .map(|index| self.signal(format!("{}[{}]", name, index), bit_width, SignalKind::Wire))
            .collect();
        let vec = self
            .context
            .vec_arena
            .alloc(SignalVec::new(name, bit_width, elements));
        self.vecs.borrow_mut().push(vec);
        vec
    }

    /// Creates a synchronous-write [`Mem`] called `name` in this `Module` with `depth` elements of `bit_width` bits each.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("MyModule");
    /// let data_mem = m.sync_mem("data_mem", 16, 64);
    ///
    /// assert_eq!(data_mem.address_bit_width(), 6);
    /// ```
    ///
    /// [`Mem`]: ./struct.Mem.html
    pub fn sync_mem<S: Into<String>>(&'a self, name: S, bit_width: u32, depth: u32) -> &'a Mem<'a> {
        self.mem(name.into(), bit_width, depth, MemKind::Sync)
    }

    /// Creates an asynchronous (combinational) write [`Mem`] called `name` in this `Module` with `depth` elements of `bit_width` bits each.
    ///
    /// [`Mem`]: ./struct.Mem.html
    pub fn async_mem<S: Into<String>>(&'a self, name: S, bit_width: u32, depth: u32) -> &'a Mem<'a> {
        self.mem(name.into(), bit_width, depth, MemKind::Async)
    }

    fn mem(&'a self, name: String, bit_width: u32, depth: u32, kind: MemKind) -> &'a Mem<'a> {
        let mem = self
            .context
            .mem_arena
            .alloc(Mem::new(self, name, bit_width, depth, kind));
        self.mems.borrow_mut().push(mem);
        mem
    }

    /// Creates an [`Instance`] of the module called `module_name`, named `instance_name`, inside this `Module`.
    ///
    /// The instantiated module is referred to by name only; it doesn't need to exist in this `Context`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let top = c.module("Top");
    /// let clk = top.input("clk", 1);
    ///
    /// let fifo = top.instance("GenericFIFO", "fifo0");
    /// fifo.set_parameter("DATA_WIDTH", Param::Width(32)).connect("clk", clk);
    /// let full = fifo.io("wr_full", 1);
    ///
    /// assert_eq!(full.name(), "fifo0_wr_full");
    /// ```
    ///
    /// [`Instance`]: ./struct.Instance.html
    pub fn instance<S: Into<String>, T: Into<String>>(
        &'a self,
        module_name: S,
        instance_name: T,
    ) -> &'a Instance<'a> {
        let instance = self.context.instance_arena.alloc(Instance::new(
            self,
            module_name.into(),
            instance_name.into(),
        ));
        self.instances.borrow_mut().push(instance);
        instance
    }

    /// Appends the statement `assign <lhs> = <rhs>;` to this `Module`.
    ///
    /// If `lhs` and `rhs` have different bit widths, a warning is logged, but the statement is still recorded.
    pub fn assign(&self, lhs: &Signal<'_>, rhs: &Signal<'_>) {
        if let Err(mismatch) = lhs.check_width(rhs) {
            warn!("{} (in module \"{}\")", mismatch, self.name());
        }
        self.assign_expr(lhs, rhs.name());
    }

    /// Appends the statement `assign <lhs> = <expr>;` to this `Module`, with `expr` rendered verbatim.
    pub fn assign_expr(&self, lhs: &Signal<'_>, expr: &str) {
        self.assign_raw(format!("assign {} = {};", lhs.name(), expr));
    }

    /// Appends a complete assign statement verbatim, eg. one produced by [`Bundle::connect`] or [`SignalVec::connect`].
    ///
    /// [`Bundle::connect`]: ./struct.Bundle.html#method.connect
    /// [`SignalVec::connect`]: ./struct.SignalVec.html#method.connect
    pub fn assign_raw<S: Into<String>>(&self, statement: S) {
        self.assigns.borrow_mut().push(statement.into());
    }

    /// Appends a raw procedural block verbatim. `block` may span several lines.
    pub fn always<S: Into<String>>(&self, block: S) {
        self.always_blocks.borrow_mut().push(block.into());
    }

    /// Sets this `Module`'s parameter `name` to `value`. Setting an existing parameter replaces its value in place.
    pub fn set_parameter<S: Into<String>, P: Into<Param>>(&self, name: S, value: P) {
        self.parameters.borrow_mut().insert(name, value);
    }

    /// Sets this `Module`'s default clock.
    pub fn set_clock(&self, clock: &'a Signal<'a>) {
        self.clock.set(Some(clock));
    }

    /// Sets this `Module`'s default reset.
    pub fn set_reset(&self, reset: &'a Signal<'a>) {
        self.reset.set(Some(reset));
    }

    pub fn clock(&self) -> Option<&'a Signal<'a>> {
        self.clock.get()
    }

    pub fn reset(&self) -> Option<&'a Signal<'a>> {
        self.reset.get()
    }

    /// Records `template` on this `Module` so it's listed in the emitted template summary.
    pub fn add_template(&self, template: &ModuleTemplate) {
        self.templates.borrow_mut().push(template.clone());
    }

    pub fn inputs(&self) -> Vec<&'a Signal<'a>> {
        self.inputs.borrow().clone()
    }

    pub fn outputs(&self) -> Vec<&'a Signal<'a>> {
        self.outputs.borrow().clone()
    }

    pub fn wires(&self) -> Vec<&'a Signal<'a>> {
        self.wires.borrow().clone()
    }

    pub fn regs(&self) -> Vec<&'a Signal<'a>> {
        self.regs.borrow().clone()
    }

    /// Returns the assign statements recorded so far, in order.
    pub fn assigns(&self) -> Vec<String> {
        self.assigns.borrow().clone()
    }

    /// Returns the procedural blocks recorded so far, in order.
    pub fn always_blocks(&self) -> Vec<String> {
        self.always_blocks.borrow().clone()
    }

    pub fn parameters(&self) -> ParamMap {
        self.parameters.borrow().clone()
    }
}

impl fmt::Debug for Module<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &*self.name.borrow())
            .finish()
    }
}
