use super::module::*;
use super::signal::*;
use super::width::*;

/// Whether a [`Mem`](./struct.Mem.html) is written from a clocked block or combinationally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemKind {
    Sync,
    Async,
}

/// A memory, created by the [`Module`]::[`sync_mem`] or [`Module`]::[`async_mem`] methods.
///
/// Reads produce a [`Signal`] naming the indexed access (`mem[addr]`). Writes produce statement text rather than a [`Signal`]: synchronous memories use a non-blocking assignment gated by the enable, meant to be placed inside a clocked procedural block; asynchronous memories use a combinational assign that holds the old value when the enable is low.
///
/// # Examples
///
/// ```
/// use rtlgen::*;
///
/// let c = Context::new();
///
/// let m = c.module("MyModule");
/// let addr = m.input("addr", 6);
/// let data = m.input("data", 16);
/// let we = m.input("we", 1);
///
/// let data_mem = m.sync_mem("data_mem", 16, 64);
/// assert_eq!(data_mem.read(addr).name(), "data_mem[addr]");
/// assert_eq!(data_mem.write(addr, data, we), "if (we) data_mem[addr] <= data;");
///
/// let scratch = m.async_mem("scratch", 16, 64);
/// assert_eq!(
///     scratch.write(addr, data, we),
///     "assign scratch[addr] = (we) ? data : scratch[addr];"
/// );
/// ```
///
/// [`async_mem`]: ./struct.Module.html#method.async_mem
/// [`Module`]: ./struct.Module.html
/// [`Signal`]: ./struct.Signal.html
/// [`sync_mem`]: ./struct.Module.html#method.sync_mem
#[must_use]
pub struct Mem<'a> {
    module: &'a Module<'a>,

    pub(crate) name: String,
    pub(crate) element_bit_width: u32,
    pub(crate) depth: u32,
    pub(crate) address_bit_width: u32,
    pub(crate) kind: MemKind,
}

impl<'a> Mem<'a> {
    pub(super) fn new(
        module: &'a Module<'a>,
        name: String,
        element_bit_width: u32,
        depth: u32,
        kind: MemKind,
    ) -> Mem<'a> {
        Mem {
            module,

            name,
            element_bit_width,
            depth,
            address_bit_width: address_width(depth),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element_bit_width(&self) -> u32 {
        self.element_bit_width
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of bits needed to address every element (`ceil(log2(depth))`, at least `1`).
    pub fn address_bit_width(&self) -> u32 {
        self.address_bit_width
    }

    pub fn kind(&self) -> MemKind {
        self.kind
    }

    /// Creates a [`Signal`](./struct.Signal.html) that represents the element at `address`.
    pub fn read(&self, address: &Signal<'a>) -> &'a Signal<'a> {
        self.module.signal(
            format!("{}[{}]", self.name, address.name()),
            self.element_bit_width,
            SignalKind::Wire,
        )
    }

    /// Renders a write of `data` to `address`, gated by `enable`.
    pub fn write(&self, address: &Signal<'a>, data: &Signal<'a>, enable: &Signal<'a>) -> String {
        match self.kind {
            MemKind::Sync => format!(
                "if ({}) {}[{}] <= {};",
                enable.name(),
                self.name,
                address.name(),
                data.name()
            ),
            MemKind::Async => format!(
                "assign {mem}[{addr}] = ({en}) ? {data} : {mem}[{addr}];",
                mem = self.name,
                addr = address.name(),
                en = enable.name(),
                data = data.name()
            ),
        }
    }
}
