use super::module::*;
use super::param::*;
use super::signal::*;

use std::cell::RefCell;

/// An instance of a module, created by the [`Module`]::[`instance`] method.
///
/// The instantiated module is referred to by name. Parameter overrides and port connections are kept in the order they're first set; setting one again replaces its value in place.
///
/// # Examples
///
/// ```
/// use rtlgen::*;
///
/// let c = Context::new();
///
/// let outer = c.module("Outer");
/// let i = outer.input("i", 32);
///
/// let inner = outer.instance("Inner", "inner_inst");
/// inner.connect("i", i);
/// let o = inner.io("o", 32);
///
/// assert_eq!(o.name(), "inner_inst_o");
/// assert_eq!(inner.connection("i").map(|s| s.name()), Some("i"));
/// ```
///
/// [`instance`]: ./struct.Module.html#method.instance
/// [`Module`]: ./struct.Module.html
#[must_use]
pub struct Instance<'a> {
    module: &'a Module<'a>,

    pub(crate) module_name: String,
    pub(crate) name: String,
    pub(crate) parameters: RefCell<ParamMap>,
    pub(crate) connections: RefCell<Vec<(String, &'a Signal<'a>)>>,
}

impl<'a> Instance<'a> {
    pub(super) fn new(module: &'a Module<'a>, module_name: String, name: String) -> Instance<'a> {
        Instance {
            module,

            module_name,
            name,
            parameters: RefCell::new(ParamMap::new()),
            connections: RefCell::new(Vec::new()),
        }
    }

    /// Name of the instantiated module.
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Name of this instance.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Overrides the instantiated module's parameter `name` with `value`.
    pub fn set_parameter<S: Into<String>, P: Into<Param>>(&self, name: S, value: P) -> &Self {
        self.parameters.borrow_mut().insert(name, value);
        self
    }

    /// Connects the port called `port` to `signal`.
    pub fn connect<S: Into<String>>(&self, port: S, signal: &'a Signal<'a>) -> &Self {
        let port = port.into();
        let mut connections = self.connections.borrow_mut();
        match connections.iter_mut().find(|(p, _)| *p == port) {
            Some(entry) => entry.1 = signal,
            None => connections.push((port, signal)),
        }
        self
    }

    /// Declares a new `bit_width`-bit wire named `<instance>_<port>` in the owning module, connects it to `port`, and returns it.
    pub fn io<S: Into<String>>(&self, port: S, bit_width: u32) -> &'a Signal<'a> {
        let port = port.into();
        let wire = self.module.wire(format!("{}_{}", self.name, port), bit_width);
        self.connect(port, wire);
        wire
    }

    /// Returns the [`Signal`](./struct.Signal.html) connected to `port`, if any.
    pub fn connection(&self, port: &str) -> Option<&'a Signal<'a>> {
        self.connections
            .borrow()
            .iter()
            .find(|(p, _)| p == port)
            .map(|(_, s)| *s)
    }

    pub fn parameters(&self) -> ParamMap {
        self.parameters.borrow().clone()
    }
}
