use super::bundle::*;
use super::clock_domain::*;
use super::instance::*;
use super::mem::*;
use super::module::*;
use super::mutex::*;
use super::signal::*;
use super::signal_vec::*;

use typed_arena::Arena;

use std::cell::RefCell;

/// A top-level container/owner object for a [`Module`] graph.
///
/// A `Context` owns all parts of a module graph, and provides an API for creating [`Module`] objects. Every graph object handed out by a builder method is a shared reference into one of the `Context`'s arenas, so it stays valid for as long as the `Context` does.
///
/// # Examples
///
/// ```
/// use rtlgen::*;
///
/// let c = Context::new();
///
/// let m = c.module("MyModule");
/// let i = m.input("i", 1);
/// let o = m.output("o", 1);
/// m.assign(o, i);
/// ```
///
/// [`Module`]: ./struct.Module.html
#[must_use]
pub struct Context<'a> {
    pub(super) module_arena: Arena<Module<'a>>,
    pub(super) signal_arena: Arena<Signal<'a>>,
    pub(super) bundle_arena: Arena<Bundle<'a>>,
    pub(super) vec_arena: Arena<SignalVec<'a>>,
    pub(super) mem_arena: Arena<Mem<'a>>,
    pub(super) instance_arena: Arena<Instance<'a>>,
    pub(super) clock_domain_arena: Arena<ClockDomain<'a>>,
    pub(super) mutex_arena: Arena<Mutex<'a>>,

    modules: RefCell<Vec<&'a Module<'a>>>,
}

impl<'a> Context<'a> {
    /// Creates a new, empty `Context`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    /// ```
    pub fn new() -> Context<'a> {
        Context {
            module_arena: Arena::new(),
            signal_arena: Arena::new(),
            bundle_arena: Arena::new(),
            vec_arena: Arena::new(),
            mem_arena: Arena::new(),
            instance_arena: Arena::new(),
            clock_domain_arena: Arena::new(),
            mutex_arena: Arena::new(),

            modules: RefCell::new(Vec::new()),
        }
    }

    /// Creates a new, empty [`Module`] called `name` in this `Context`.
    ///
    /// Conventionally, `name` should be `CamelCase`, though this is not enforced. Module names aren't checked for uniqueness.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let my_module = c.module("MyModule");
    /// let another_mod = c.module("AnotherMod");
    ///
    /// assert_eq!(my_module.name(), "MyModule");
    /// ```
    ///
    /// [`Module`]: ./struct.Module.html
    pub fn module<S: Into<String>>(&'a self, name: S) -> &'a Module<'a> {
        let module = self.module_arena.alloc(Module::new(self, name.into()));
        self.modules.borrow_mut().push(module);
        module
    }

    /// Returns every [`Module`] created in this `Context`, in creation order.
    ///
    /// This includes modules produced by [`ModuleTemplate::instantiate`].
    ///
    /// [`Module`]: ./struct.Module.html
    /// [`ModuleTemplate::instantiate`]: ./struct.ModuleTemplate.html#method.instantiate
    pub fn modules(&self) -> Vec<&'a Module<'a>> {
        self.modules.borrow().clone()
    }
}

impl<'a> Default for Context<'a> {
    fn default() -> Self {
        Context::new()
    }
}
