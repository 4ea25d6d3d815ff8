//! Reference [`ModuleTemplate`](crate::ModuleTemplate)s.
//!
//! # Examples
//!
//! ```
//! use rtlgen::*;
//!
//! # fn main() -> Result<(), Error> {
//! let c = Context::new();
//!
//! let fifo = templates::fifo_template().instantiate(
//!     &c,
//!     "Fifo32x16",
//!     &TemplateArgs::new()
//!         .with("DATA_WIDTH", Param::Width(32))
//!         .with("DEPTH", 16),
//! )?;
//! assert_eq!(fifo.name(), "Fifo32x16");
//! # Ok(())
//! # }
//! ```

use crate::error::Error;
use crate::graph::*;

use std::convert::TryFrom;

/// Largest `ADDR_WIDTH` accepted by [`register_file_template`], keeping the depth representable.
pub const MAX_REGISTER_FILE_ADDR_WIDTH: u32 = 31;

/// A single-clock FIFO template called `GenericFIFO`, with parameters `DATA_WIDTH` (a width) and `DEPTH` (an int).
///
/// Ports, in order: `clk`, `rst`, `wr_data`, `wr_en`, `wr_full`, `rd_data`, `rd_en`, `rd_empty`. The storage is a synchronous memory `fifo_mem`, indexed by `wr_ptr`/`rd_ptr` registers that carry one extra wrap bit; the FIFO is empty when the pointers are equal, and full when they differ only in the wrap bit. Reset is synchronous and active high.
///
/// # Errors
///
/// Instantiation fails with [`Error::InvalidTemplateArgument`] if `DEPTH` isn't a power of two between 2 and 2^31, since the pointers address every element of `fifo_mem` and wrap at its end.
///
/// [`Error::InvalidTemplateArgument`]: ../error/enum.Error.html#variant.InvalidTemplateArgument
pub fn fifo_template() -> ModuleTemplate {
    ModuleTemplate::new("GenericFIFO", &["DATA_WIDTH", "DEPTH"])
        .constraint("DATA_WIDTH", ParamKind::Width)
        .constraint("DEPTH", ParamKind::Int)
        .generator(generate_fifo)
}

fn generate_fifo<'a>(c: &'a Context<'a>, args: &BoundArgs) -> Result<&'a Module<'a>, Error> {
    let data_width = args.width("DATA_WIDTH")?;
    let depth_arg = args.int("DEPTH")?;
    let depth = u32::try_from(depth_arg)
        .ok()
        .filter(|depth| *depth >= 2 && depth.is_power_of_two())
        .ok_or_else(|| {
            args.invalid(
                "DEPTH",
                depth_arg,
                "depth must be a power of two between 2 and 2^31",
            )
        })?;

    let m = c.module("GenericFIFO");

    let clk = m.input("clk", 1);
    let rst = m.input("rst", 1);
    let wr_data = m.input("wr_data", data_width);
    let wr_en = m.input("wr_en", 1);
    let wr_full = m.output("wr_full", 1);
    let rd_data = m.output("rd_data", data_width);
    let rd_en = m.input("rd_en", 1);
    let rd_empty = m.output("rd_empty", 1);
    m.set_clock(clk);
    m.set_reset(rst);

    let mem = m.sync_mem("fifo_mem", data_width, depth);
    let address_bit_width = mem.address_bit_width();
    let pointer_bit_width = address_bit_width + 1;
    let wr_ptr = m.reg("wr_ptr", pointer_bit_width);
    let rd_ptr = m.reg("rd_ptr", pointer_bit_width);

    let wr_addr = wr_ptr.bits(address_bit_width - 1, 0);
    let rd_addr = rd_ptr.bits(address_bit_width - 1, 0);
    m.assign(rd_data, mem.read(rd_addr));
    m.assign(rd_empty, wr_ptr.eq(rd_ptr));
    m.assign(
        wr_full,
        wr_addr
            .eq(rd_addr)
            .logic_and(wr_ptr.bit(address_bit_width).ne(rd_ptr.bit(address_bit_width))),
    );

    let do_write = wr_en.logic_and(wr_full.logic_not());
    let do_read = rd_en.logic_and(rd_empty.logic_not());
    let zero = m.lit(0u32, pointer_bit_width);
    let one = m.lit(1u32, pointer_bit_width);
    m.always(
        [
            format!("always @(posedge {}) begin", clk.name()),
            format!("  {}", mem.write(wr_addr, wr_data, do_write)),
            format!("  if ({}) begin", rst.name()),
            format!("    {} <= {};", wr_ptr.name(), zero.name()),
            format!("    {} <= {};", rd_ptr.name(), zero.name()),
            "  end else begin".into(),
            format!(
                "    if ({}) {} <= {};",
                do_write.name(),
                wr_ptr.name(),
                (wr_ptr + one).name()
            ),
            format!(
                "    if ({}) {} <= {};",
                do_read.name(),
                rd_ptr.name(),
                (rd_ptr + one).name()
            ),
            "  end".into(),
            "end".into(),
        ]
        .join("\n"),
    );

    m.set_parameter("DATA_WIDTH", Param::Width(data_width));
    m.set_parameter("DEPTH", depth_arg);

    Ok(m)
}

/// A register file template called `GenericRegisterFile`, with parameters `DATA_WIDTH` and `ADDR_WIDTH` (both widths).
///
/// Holds `2^ADDR_WIDTH` words in a synchronous memory `reg_file`, with one clocked write port (`wr_addr`, `wr_data`, `wr_en`, ignored while `rst` is high) and two combinational read ports (`rd1_addr`/`rd1_data`, `rd2_addr`/`rd2_data`).
///
/// # Errors
///
/// Instantiation fails with [`Error::InvalidTemplateArgument`] if `ADDR_WIDTH` is `0` or greater than [`MAX_REGISTER_FILE_ADDR_WIDTH`].
///
/// [`Error::InvalidTemplateArgument`]: ../error/enum.Error.html#variant.InvalidTemplateArgument
/// [`MAX_REGISTER_FILE_ADDR_WIDTH`]: ./constant.MAX_REGISTER_FILE_ADDR_WIDTH.html
pub fn register_file_template() -> ModuleTemplate {
    ModuleTemplate::new("GenericRegisterFile", &["DATA_WIDTH", "ADDR_WIDTH"])
        .constraint("DATA_WIDTH", ParamKind::Width)
        .constraint("ADDR_WIDTH", ParamKind::Width)
        .generator(generate_register_file)
}

fn generate_register_file<'a>(
    c: &'a Context<'a>,
    args: &BoundArgs,
) -> Result<&'a Module<'a>, Error> {
    let data_width = args.width("DATA_WIDTH")?;
    let addr_width = args.width("ADDR_WIDTH")?;
    if addr_width == 0 || addr_width > MAX_REGISTER_FILE_ADDR_WIDTH {
        return Err(args.invalid(
            "ADDR_WIDTH",
            Param::Width(addr_width),
            format!("address width must be between 1 and {}", MAX_REGISTER_FILE_ADDR_WIDTH),
        ));
    }

    let m = c.module("GenericRegisterFile");

    let clk = m.input("clk", 1);
    let rst = m.input("rst", 1);
    m.set_clock(clk);
    m.set_reset(rst);

    let wr_addr = m.input("wr_addr", addr_width);
    let wr_data = m.input("wr_data", data_width);
    let wr_en = m.input("wr_en", 1);

    let rd1_addr = m.input("rd1_addr", addr_width);
    let rd1_data = m.output("rd1_data", data_width);
    let rd2_addr = m.input("rd2_addr", addr_width);
    let rd2_data = m.output("rd2_data", data_width);

    let reg_file = m.sync_mem("reg_file", data_width, 1 << addr_width);

    m.always(
        [
            format!("always @(posedge {}) begin", clk.name()),
            format!(
                "  {}",
                reg_file.write(wr_addr, wr_data, rst.logic_not().logic_and(wr_en))
            ),
            "end".into(),
        ]
        .join("\n"),
    );

    m.assign(rd1_data, reg_file.read(rd1_addr));
    m.assign(rd2_data, reg_file.read(rd2_addr));

    m.set_parameter("DATA_WIDTH", Param::Width(data_width));
    m.set_parameter("ADDR_WIDTH", Param::Width(addr_width));

    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn fifo_args(data_width: u32, depth: i64) -> TemplateArgs {
        TemplateArgs::new()
            .with("DATA_WIDTH", Param::Width(data_width))
            .with("DEPTH", depth)
    }

    #[test]
    fn fifo_ports_and_parameters() {
        let c = Context::new();

        let args = fifo_args(8, 16);
        let m = fifo_template().instantiate(&c, "fifo8", &args).unwrap();

        assert_eq!(m.name(), "fifo8");
        assert_eq!(m.parameters(), args);
        let inputs = m.inputs().iter().map(|s| s.name().to_string()).collect::<Vec<_>>();
        assert_eq!(inputs, vec!["clk", "rst", "wr_data", "wr_en", "rd_en"]);
        let outputs = m.outputs().iter().map(|s| s.name().to_string()).collect::<Vec<_>>();
        assert_eq!(outputs, vec!["wr_full", "rd_data", "rd_empty"]);
        assert_eq!(m.regs()[0].bit_width(), 5);
        assert_eq!(m.clock().map(|s| s.name()), Some("clk"));
    }

    #[test]
    fn fifo_logic() {
        let c = Context::new();

        let m = fifo_template()
            .instantiate(&c, "GenericFIFO", &fifo_args(8, 4))
            .unwrap();

        assert_eq!(
            m.assigns(),
            vec![
                "assign rd_data = fifo_mem[rd_ptr[1:0]];",
                "assign rd_empty = wr_ptr == rd_ptr;",
                "assign wr_full = (wr_ptr[1:0] == rd_ptr[1:0]) && (wr_ptr[2] != rd_ptr[2]);",
            ]
        );
        assert_eq!(
            m.always_blocks(),
            vec![[
                "always @(posedge clk) begin",
                "  if (wr_en && !wr_full) fifo_mem[wr_ptr[1:0]] <= wr_data;",
                "  if (rst) begin",
                "    wr_ptr <= 3'h0;",
                "    rd_ptr <= 3'h0;",
                "  end else begin",
                "    if (wr_en && !wr_full) wr_ptr <= wr_ptr + 3'h1;",
                "    if (rd_en && !rd_empty) rd_ptr <= rd_ptr + 3'h1;",
                "  end",
                "end",
            ]
            .join("\n")]
        );
    }

    #[test]
    fn fifo_rejects_bad_depth() {
        let c = Context::new();

        for depth in &[0, 1, 5, 12, -4, 1 << 40] {
            let err = fifo_template()
                .instantiate(&c, "f", &fifo_args(8, *depth))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidTemplateArgument { ref param, .. } if param == "DEPTH"));
        }
    }

    #[test]
    fn fifo_pointers_stay_inside_memory() {
        let c = Context::new();

        for depth in &[2i64, 4, 64] {
            let m = fifo_template()
                .instantiate(&c, "f", &fifo_args(8, *depth))
                .unwrap();
            let mems = m.mems.borrow();
            let address_bit_width = mems[0].address_bit_width();
            assert_eq!(1i64 << address_bit_width, *depth);
            assert_eq!(m.regs()[0].bit_width(), address_bit_width + 1);
        }

        let err = fifo_template()
            .instantiate(&c, "f", &fifo_args(8, 5))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value 5 for parameter \"DEPTH\" of template \"GenericFIFO\": depth must be a power of two between 2 and 2^31"
        );
    }

    #[test]
    fn fifo_rejects_swapped_kinds() {
        let c = Context::new();

        let args = TemplateArgs::new()
            .with("DATA_WIDTH", 8)
            .with("DEPTH", Param::Width(16));
        let err = fifo_template().instantiate(&c, "f", &args).unwrap_err();

        assert!(matches!(
            err,
            Error::TemplateKindMismatch {
                expected: ParamKind::Width,
                actual: ParamKind::Int,
                ..
            }
        ));
    }

    #[test]
    fn register_file() {
        let c = Context::new();

        let args = TemplateArgs::new()
            .with("DATA_WIDTH", Param::Width(32))
            .with("ADDR_WIDTH", Param::Width(5));
        let m = register_file_template().instantiate(&c, "regs", &args).unwrap();

        assert_eq!(m.parameters(), args);
        assert_eq!(
            m.assigns(),
            vec![
                "assign rd1_data = reg_file[rd1_addr];",
                "assign rd2_data = reg_file[rd2_addr];",
            ]
        );
        assert_eq!(
            m.always_blocks(),
            vec!["always @(posedge clk) begin\n  if (!rst && wr_en) reg_file[wr_addr] <= wr_data;\nend"]
        );
        let mems = m.mems.borrow();
        assert_eq!(mems[0].depth(), 32);
        assert_eq!(mems[0].address_bit_width(), 5);
    }

    #[test]
    fn register_file_rejects_wide_address() {
        let c = Context::new();

        let args = TemplateArgs::new()
            .with("DATA_WIDTH", Param::Width(32))
            .with("ADDR_WIDTH", Param::Width(32));
        let err = register_file_template().instantiate(&c, "regs", &args).unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid value 32 for parameter \"ADDR_WIDTH\" of template \"GenericRegisterFile\": address width must be between 1 and 31"
        );
    }
}
