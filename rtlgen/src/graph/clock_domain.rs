use super::module::*;
use super::signal::*;
use super::width::*;

use log::warn;

use std::cell::Cell;

/// Minimum number of register stages in a synchronizer chain.
pub const MIN_SYNC_STAGES: u32 = 2;

/// A named clock/reset pair, created by the [`Module`]::[`clock_domain`] method.
///
/// [`Signal`]s can be tagged with a `ClockDomain` (see [`Signal::with_clock_domain`]); the association and the optional frequency only appear in the emitted summary comments, and aren't used for any checks.
///
/// # Examples
///
/// ```
/// use rtlgen::*;
///
/// let c = Context::new();
///
/// let m = c.module("MyModule");
/// let fast = m
///     .clock_domain("fast_domain", m.input("clk1", 1), m.input("rst1", 1))
///     .set_frequency(200_000_000);
///
/// assert_eq!(fast.frequency(), Some(200_000_000));
/// ```
///
/// [`clock_domain`]: ./struct.Module.html#method.clock_domain
/// [`Module`]: ./struct.Module.html
/// [`Signal`]: ./struct.Signal.html
/// [`Signal::with_clock_domain`]: ./struct.Signal.html#method.with_clock_domain
#[must_use]
pub struct ClockDomain<'a> {
    pub(crate) name: String,
    pub(crate) clock: &'a Signal<'a>,
    pub(crate) reset: &'a Signal<'a>,
    pub(crate) frequency: Cell<Option<u64>>,
}

impl<'a> ClockDomain<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clock(&self) -> &'a Signal<'a> {
        self.clock
    }

    pub fn reset(&self) -> &'a Signal<'a> {
        self.reset
    }

    /// Frequency in Hz, if set.
    pub fn frequency(&self) -> Option<u64> {
        self.frequency.get()
    }

    /// Records this domain's clock frequency in Hz. Informational only.
    pub fn set_frequency(&self, hz: u64) -> &Self {
        self.frequency.set(Some(hz));
        self
    }
}

/// The externally visible ports of a FIFO built by [`Module::async_fifo`](./struct.Module.html#method.async_fifo).
pub struct AsyncFifo<'a> {
    pub wr_data: &'a Signal<'a>,
    pub wr_en: &'a Signal<'a>,
    pub wr_full: &'a Signal<'a>,
    pub rd_data: &'a Signal<'a>,
    pub rd_en: &'a Signal<'a>,
    pub rd_empty: &'a Signal<'a>,
}

// One side of an async FIFO: binary + Gray pointers and their update block.
struct PointerSide<'a> {
    ptr: &'a Signal<'a>,
    gray: &'a Signal<'a>,
    next: &'a Signal<'a>,
}

impl<'a> PointerSide<'a> {
    fn new(
        module: &'a Module<'a>,
        prefix: &str,
        domain: &'a ClockDomain<'a>,
        bit_width: u32,
    ) -> PointerSide<'a> {
        PointerSide {
            ptr: module
                .reg(format!("{}_ptr", prefix), bit_width)
                .with_clock_domain(domain),
            gray: module
                .reg(format!("{}_ptr_gray", prefix), bit_width)
                .with_clock_domain(domain),
            next: module
                .wire(format!("{}_ptr_next", prefix), bit_width)
                .with_clock_domain(domain),
        }
    }

    fn update_lines(
        &self,
        module: &'a Module<'a>,
        reset: &Signal<'a>,
        advance: &Signal<'a>,
    ) -> Vec<String> {
        let zero = module.lit(0u32, self.ptr.bit_width());
        vec![
            format!("  if ({}) begin", reset.name()),
            format!("    {} <= {};", self.ptr.name(), zero.name()),
            format!("    {} <= {};", self.gray.name(), zero.name()),
            format!("  end else if ({}) begin", advance.name()),
            format!("    {} <= {};", self.ptr.name(), self.next.name()),
            format!(
                "    {} <= {};",
                self.gray.name(),
                (self.next ^ (self.next >> 1)).name()
            ),
            "  end".into(),
        ]
    }
}

impl<'a> Module<'a> {
    /// Creates a [`ClockDomain`] called `name` driven by `clock` and `reset`, and registers it with this `Module`.
    ///
    /// [`ClockDomain`]: ./struct.ClockDomain.html
    pub fn clock_domain<S: Into<String>>(
        &'a self,
        name: S,
        clock: &'a Signal<'a>,
        reset: &'a Signal<'a>,
    ) -> &'a ClockDomain<'a> {
        let domain = self.context.clock_domain_arena.alloc(ClockDomain {
            name: name.into(),
            clock,
            reset,
            frequency: Cell::new(None),
        });
        self.clock_domains.borrow_mut().push(domain);
        domain
    }

    /// Synchronizes `source` into `domain` through a chain of `stages` registers, and returns the last stage.
    ///
    /// The stages are regs named `<name>_sync_stage<i>` tagged with `domain`, each sampled on the rising edge of `domain`'s clock: stage 0 samples `source`, and every later stage samples the one before it. At least [`MIN_SYNC_STAGES`] stages are always built; a lower `stages` is raised (and a warning logged).
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("MyModule");
    /// let slow = m.clock_domain("slow", m.input("clk2", 1), m.input("rst2", 1));
    /// let flag = m.input("flag", 1);
    ///
    /// let synced = m.cdc_synchronizer("flag", flag, slow, 2);
    ///
    /// assert_eq!(synced.name(), "flag_sync_stage1");
    /// assert_eq!(
    ///     m.always_blocks(),
    ///     vec![
    ///         "always @(posedge clk2) flag_sync_stage0 <= flag;",
    ///         "always @(posedge clk2) flag_sync_stage1 <= flag_sync_stage0;",
    ///     ]
    /// );
    /// ```
    ///
    /// [`MIN_SYNC_STAGES`]: ./constant.MIN_SYNC_STAGES.html
    pub fn cdc_synchronizer(
        &'a self,
        name: &str,
        source: &'a Signal<'a>,
        domain: &'a ClockDomain<'a>,
        stages: u32,
    ) -> &'a Signal<'a> {
        let stages = if stages < MIN_SYNC_STAGES {
            warn!(
                "synchronizer \"{}\" requested {} stage(s); using {}",
                name, stages, MIN_SYNC_STAGES
            );
            MIN_SYNC_STAGES
        } else {
            stages
        };

        let mut previous = source;
        for i in 0..stages {
            let stage = self
                .reg(format!("{}_sync_stage{}", name, i), source.bit_width())
                .with_clock_domain(domain);
            self.always(format!(
                "always @(posedge {}) {} <= {};",
                domain.clock.name(),
                stage.name(),
                previous.name()
            ));
            previous = stage;
        }
        previous
    }

    /// Builds a dual-clock FIFO called `name` holding `depth` elements of `bit_width` bits, written from `wr_domain` and read from `rd_domain`.
    ///
    /// The FIFO is made of a synchronous memory (`<name>_mem`), a binary and a Gray-coded pointer per side (one bit wider than the memory address, to tell full from empty), and a clocked update block per side. Only the Gray pointers cross domains, each through a two-stage [`cdc_synchronizer`]. The read side is empty when its Gray pointer equals the synchronized write pointer; the write side is full when its Gray pointer equals the synchronized read pointer with the two most significant bits inverted.
    ///
    /// Gray-code comparison requires the memory depth to be a power of two, so `depth` is rounded up to the next one (and at least 2) with a warning logged; the FIFO then holds that many elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtlgen::*;
    ///
    /// let c = Context::new();
    ///
    /// let m = c.module("Bridge");
    /// let wr = m.clock_domain("wr", m.input("wr_clk", 1), m.input("wr_rst", 1));
    /// let rd = m.clock_domain("rd", m.input("rd_clk", 1), m.input("rd_rst", 1));
    ///
    /// let fifo = m.async_fifo("q", 32, 16, wr, rd);
    ///
    /// assert_eq!(fifo.wr_data.name(), "q_wr_data");
    /// assert_eq!(fifo.rd_empty.name(), "q_rd_empty");
    /// assert_eq!(fifo.rd_data.bit_width(), 32);
    /// ```
    ///
    /// [`cdc_synchronizer`]: #method.cdc_synchronizer
    pub fn async_fifo(
        &'a self,
        name: &str,
        bit_width: u32,
        depth: u32,
        wr_domain: &'a ClockDomain<'a>,
        rd_domain: &'a ClockDomain<'a>,
    ) -> AsyncFifo<'a> {
        let address_bit_width = address_width(depth);
        let pointer_bit_width = address_bit_width + 1;

        let mem_depth = 1u32.checked_shl(address_bit_width).unwrap_or(u32::MAX);
        if mem_depth != depth {
            warn!(
                "async FIFO \"{}\" has depth {}, which isn't a power of two of at least 2; rounding its memory up to {} elements",
                name, depth, mem_depth
            );
        }
        let mem = self.sync_mem(format!("{}_mem", name), bit_width, mem_depth);

        let wr_data = self
            .input(format!("{}_wr_data", name), bit_width)
            .with_clock_domain(wr_domain);
        let wr_en = self
            .input(format!("{}_wr_en", name), 1)
            .with_clock_domain(wr_domain);
        let wr_full = self
            .output(format!("{}_wr_full", name), 1)
            .with_clock_domain(wr_domain);

        let rd_data = self
            .output(format!("{}_rd_data", name), bit_width)
            .with_clock_domain(rd_domain);
        let rd_en = self
            .input(format!("{}_rd_en", name), 1)
            .with_clock_domain(rd_domain);
        let rd_empty = self
            .output(format!("{}_rd_empty", name), 1)
            .with_clock_domain(rd_domain);

        let wr = PointerSide::new(self, &format!("{}_wr", name), wr_domain, pointer_bit_width);
        let rd = PointerSide::new(self, &format!("{}_rd", name), rd_domain, pointer_bit_width);

        let wr_ptr_synced =
            self.cdc_synchronizer(&format!("{}_wr_ptr_sync", name), wr.gray, rd_domain, 2);
        let rd_ptr_synced =
            self.cdc_synchronizer(&format!("{}_rd_ptr_sync", name), rd.gray, wr_domain, 2);

        let one = self.lit(1u32, pointer_bit_width);
        self.assign(wr.next, wr.ptr + one);
        self.assign(rd.next, rd.ptr + one);

        let address_high = address_bit_width - 1;
        self.assign(rd_data, mem.read(rd.ptr.bits(address_high, 0)));
        self.assign(rd_empty, rd.gray.eq(wr_ptr_synced));

        // Full: pointers equal except the two most significant bits
        let msbs = !rd_ptr_synced.bits(address_bit_width, address_bit_width - 1);
        let full_compare = if address_bit_width > 1 {
            msbs.concat(rd_ptr_synced.bits(address_bit_width - 2, 0))
        } else {
            msbs
        };
        self.assign(wr_full, wr.gray.eq(full_compare));

        let wr_advance = wr_en.logic_and(wr_full.logic_not());
        let mut wr_block = vec![format!("always @(posedge {}) begin", wr_domain.clock.name())];
        wr_block.push(format!(
            "  {}",
            mem.write(wr.ptr.bits(address_high, 0), wr_data, wr_advance)
        ));
        wr_block.extend(wr.update_lines(self, wr_domain.reset, wr_advance));
        wr_block.push("end".into());
        self.always(wr_block.join("\n"));

        let rd_advance = rd_en.logic_and(rd_empty.logic_not());
        let mut rd_block = vec![format!("always @(posedge {}) begin", rd_domain.clock.name())];
        rd_block.extend(rd.update_lines(self, rd_domain.reset, rd_advance));
        rd_block.push("end".into());
        self.always(rd_block.join("\n"));

        AsyncFifo {
            wr_data,
            wr_en,
            wr_full,
            rd_data,
            rd_en,
            rd_empty,
        }
    }
}
