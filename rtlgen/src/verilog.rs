//! Verilog code generation.
//!
//! A [`Module`](crate::Module) is lowered in one pass, always in the same section order: header and ports, declarations (wires, regs, bundle fields, vec elements, memories), assign statements, submodule instances, clock domain, mutex and template summary comments, procedural blocks, and finally `endmodule`. Empty sections produce no lines.

use crate::code_writer::CodeWriter;
use crate::error::Error;
use crate::graph::*;

use log::{debug, info};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Lowers `m` to an ordered list of Verilog lines, without line terminators.
///
/// Emitting the same `Module` twice yields identical lines.
///
/// Parameter overrides in an instance header are separated by `", "` with no trailing comma, e.g. `Fifo #( .WIDTH(8), .DEPTH(4) ) q (`. An instance without overrides omits the `#( )` list entirely.
///
/// # Examples
///
/// ```
/// use rtlgen::*;
///
/// # fn main() -> Result<(), Error> {
/// let c = Context::new();
///
/// let m = c.module("Adder");
/// let a = m.input("a", 8);
/// let b = m.input("b", 8);
/// let sum = m.output("sum", 8);
/// m.assign(sum, a + b);
///
/// assert_eq!(
///     verilog::emit(m)?,
///     vec![
///         "module Adder(",
///         "  input [7:0] a,",
///         "  input [7:0] b,",
///         "  output [7:0] sum",
///         ");",
///         "  assign sum = a + b;",
///         "endmodule",
///     ]
/// );
/// # Ok(())
/// # }
/// ```
pub fn emit(m: &Module<'_>) -> Result<Vec<String>, Error> {
    debug!("emitting module \"{}\"", m.name());

    let mut w = CodeWriter::new();

    emit_header(m, &mut w)?;

    w.indent();
    emit_declarations(m, &mut w);
    for assign in m.assigns.borrow().iter() {
        w.append_line(assign);
    }
    emit_instances(m, &mut w)?;
    emit_summaries(m, &mut w);
    for block in m.always_blocks.borrow().iter() {
        for line in block.lines() {
            w.append_line(line);
        }
        w.append_newline();
    }
    w.unindent()?;

    w.append_line("endmodule");

    Ok(w.finish())
}

/// Writes the lines produced by [`emit`] to `w`, each terminated by a newline.
pub fn generate<W: Write>(m: &Module<'_>, mut w: W) -> Result<(), Error> {
    for line in emit(m)? {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}

/// Creates (or truncates) the file at `path` and writes `m` to it with [`generate`].
///
/// The file is flushed and closed before returning.
///
/// # Errors
///
/// Returns [`Error::OutputSink`] if the file can't be created, and [`Error::Io`] if writing to it fails.
///
/// [`Error::Io`]: ../error/enum.Error.html#variant.Io
/// [`Error::OutputSink`]: ../error/enum.Error.html#variant.OutputSink
pub fn write_file<P: AsRef<Path>>(m: &Module<'_>, path: P) -> Result<(), Error> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::OutputSink {
        path: path.to_path_buf(),
        source,
    })?;
    let mut w = BufWriter::new(file);
    generate(m, &mut w)?;
    w.flush()?;
    info!("wrote module \"{}\" to {}", m.name(), path.display());
    Ok(())
}

fn separator(index: usize, count: usize) -> &'static str {
    if index + 1 < count {
        ","
    } else {
        ""
    }
}

fn emit_header(m: &Module<'_>, w: &mut CodeWriter) -> Result<(), Error> {
    let parameters = m.parameters.borrow();
    if parameters.is_empty() {
        w.append_line(&format!("module {}(", m.name()));
    } else {
        w.append_line(&format!("module {} #(", m.name()));
        w.indent();
        for (i, (name, value)) in parameters.iter().enumerate() {
            w.append_line(&format!(
                "parameter {} = {}{}",
                name,
                value,
                separator(i, parameters.len())
            ));
        }
        w.unindent()?;
        w.append_line(") (");
    }

    w.indent();
    let inputs = m.inputs.borrow();
    let outputs = m.outputs.borrow();
    let num_ports = inputs.len() + outputs.len();
    for (i, port) in inputs.iter().chain(outputs.iter()).enumerate() {
        let keyword = match port.kind() {
            SignalKind::Output if port.is_registered() => "output reg",
            SignalKind::Output => "output",
            _ => "input",
        };
        w.append_line(&format!(
            "{} {} {}{}",
            keyword,
            bit_range(port.bit_width()),
            port.name(),
            separator(i, num_ports)
        ));
    }
    w.unindent()?;
    w.append_line(");");

    Ok(())
}

fn declaration(keyword: &str, bit_width: u32, name: &str) -> String {
    format!("{} {} {};", keyword, bit_range(bit_width), name)
}

fn emit_declarations(m: &Module<'_>, w: &mut CodeWriter) {
    for wire in m.wires.borrow().iter() {
        w.append_line(&declaration("wire", wire.bit_width(), wire.name()));
    }
    for reg in m.regs.borrow().iter() {
        w.append_line(&declaration("reg", reg.bit_width(), reg.name()));
    }
    for bundle in m.bundles.borrow().iter() {
        for (_, field) in bundle.fields.borrow().iter() {
            w.append_line(&declaration(
                field.kind().decl_keyword(),
                field.bit_width(),
                field.name(),
            ));
        }
    }
    // Slots are declared by index even if an element was replaced with `set`
    for vec in m.vecs.borrow().iter() {
        for index in 0..vec.len() {
            w.append_line(&declaration(
                "wire",
                vec.bit_width(),
                &format!("{}[{}]", vec.name(), index),
            ));
        }
    }
    for mem in m.mems.borrow().iter() {
        w.append_line(&format!(
            "reg {} {} [0:{}];",
            bit_range(mem.element_bit_width()),
            mem.name(),
            mem.depth().saturating_sub(1)
        ));
    }
}

fn emit_instances(m: &Module<'_>, w: &mut CodeWriter) -> Result<(), Error> {
    for instance in m.instances.borrow().iter() {
        let parameters = instance.parameters.borrow();
        if parameters.is_empty() {
            w.append_line(&format!("{} {} (", instance.module_name(), instance.name()));
        } else {
            let overrides = parameters
                .iter()
                .map(|(name, value)| format!(".{}({})", name, value))
                .collect::<Vec<_>>()
                .join(", ");
            w.append_line(&format!(
                "{} #( {} ) {} (",
                instance.module_name(),
                overrides,
                instance.name()
            ));
        }

        w.indent();
        let connections = instance.connections.borrow();
        for (i, (port, signal)) in connections.iter().enumerate() {
            w.append_line(&format!(
                ".{}({}){}",
                port,
                signal.name(),
                separator(i, connections.len())
            ));
        }
        w.unindent()?;
        w.append_line(");");
    }
    Ok(())
}

fn emit_summaries(m: &Module<'_>, w: &mut CodeWriter) {
    let clock_domains = m.clock_domains.borrow();
    if !clock_domains.is_empty() {
        w.append_line("// Clock Domains:");
        for domain in clock_domains.iter() {
            let mut line = format!(
                "// - {}: clk={}, rst={}",
                domain.name(),
                domain.clock().name(),
                domain.reset().name()
            );
            if let Some(hz) = domain.frequency() {
                line.push_str(&format!(", freq={} Hz", hz));
            }
            w.append_line(&line);
        }
    }

    for mutex in m.mutexes.borrow().iter() {
        w.append_line(&format!(
            "// Mutex: {} ({} arbitration)",
            mutex.name(),
            mutex.arbitration()
        ));
        for (i, (request, grant)) in mutex.requests().iter().zip(mutex.grants()).enumerate() {
            w.append_line(&format!(
                "// Request[{}]: {} -> Grant[{}]: {}",
                i,
                request.name(),
                i,
                grant.name()
            ));
        }
    }

    let templates = m.templates.borrow();
    if !templates.is_empty() {
        w.append_line("// Templates:");
        for template in templates.iter() {
            w.append_line(&format!(
                "// - {}: {}",
                template.name(),
                template.type_params().join(", ")
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::templates;

    use pretty_assertions::assert_eq;

    fn text(m: &Module<'_>) -> String {
        let mut lines = emit(m).unwrap().join("\n");
        lines.push('\n');
        lines
    }

    #[test]
    fn empty_module() {
        let c = Context::new();

        let m = c.module("Empty");

        assert_eq!(emit(m).unwrap(), vec!["module Empty(", ");", "endmodule"]);
    }

    #[test]
    fn adder() {
        let c = Context::new();

        let m = c.module("Adder");
        let a = m.input("a", 8);
        let b = m.input("b", 8);
        let sum = m.output("sum", 8);
        m.assign(sum, a + b);

        assert_eq!(
            text(m),
            "\
module Adder(
  input [7:0] a,
  input [7:0] b,
  output [7:0] sum
);
  assign sum = a + b;
endmodule
"
        );
    }

    #[test]
    fn memory_declaration() {
        let c = Context::new();

        let m = c.module("Mem");
        let _ = m.sync_mem("data_mem", 16, 64);
        let _ = m.async_mem("tiny", 1, 1);

        let lines = emit(m).unwrap();
        assert!(lines.contains(&"  reg [15:0] data_mem [0:63];".to_string()));
        assert!(lines.contains(&"  reg [0:0] tiny [0:0];".to_string()));
    }

    #[test]
    fn parameters_and_declarations() {
        let c = Context::new();

        let m = c.module("Decls");
        m.set_parameter("WIDTH", Param::Width(8));
        m.set_parameter("SIGNED", false);
        let clk = m.input("clk", 1);
        let _ = m.wire("w", 4);
        let r = m.reg("r", 8);
        let bus = m.bundle("bus");
        bus.add_field("valid", clk);
        bus.add_field("data", r);
        let _ = m.vec("lanes", 2, 3);
        m.always(format!("always @(posedge {}) {} <= {};", clk.name(), r.name(), m.lit(0u32, 8).name()));
        m.always("always @(posedge clk) begin\n  bus_data <= r;\nend");

        assert_eq!(
            text(m),
            "\
module Decls #(
  parameter WIDTH = 8,
  parameter SIGNED = 0
) (
  input [0:0] clk
);
  wire [3:0] w;
  reg [7:0] r;
  wire [0:0] bus_valid;
  reg [7:0] bus_data;
  wire [2:0] lanes[0];
  wire [2:0] lanes[1];
  always @(posedge clk) r <= 8'h0;

  always @(posedge clk) begin
    bus_data <= r;
  end

endmodule
"
        );
    }

    #[test]
    fn instances() {
        let c = Context::new();

        let m = c.module("Top");
        let clk = m.input("clk", 1);
        let data = m.input("data", 32);

        let plain = m.instance("Leaf", "leaf0");
        plain.connect("clk", clk);

        let fifo = m.instance("GenericFIFO", "fifo0");
        fifo.set_parameter("DATA_WIDTH", Param::Width(32))
            .set_parameter("DEPTH", 16);
        fifo.connect("clk", clk).connect("wr_data", data);
        let _ = fifo.io("wr_full", 1);

        let _ = m.instance("Blank", "blank0");

        assert_eq!(
            text(m),
            "\
module Top(
  input [0:0] clk,
  input [31:0] data
);
  wire [0:0] fifo0_wr_full;
  Leaf leaf0 (
    .clk(clk)
  );
  GenericFIFO #( .DATA_WIDTH(32), .DEPTH(16) ) fifo0 (
    .clk(clk),
    .wr_data(data),
    .wr_full(fifo0_wr_full)
  );
  Blank blank0 (
  );
endmodule
"
        );
    }

    #[test]
    fn single_parameter_override_has_no_trailing_comma() {
        let c = Context::new();

        let m = c.module("Top");
        let inst = m.instance("Sized", "sized0");
        inst.set_parameter("WIDTH", Param::Width(4));

        let lines = emit(m).unwrap();
        assert_eq!(lines[2], "  Sized #( .WIDTH(4) ) sized0 (");
        assert!(lines.iter().all(|line| !line.contains(", )")));
    }

    #[test]
    fn clock_domain_summary() {
        let c = Context::new();

        let m = c.module("Cdc");
        let clk1 = m.input("clk1", 1);
        let rst1 = m.input("rst1", 1);
        let clk2 = m.input("clk2", 1);
        let rst2 = m.input("rst2", 1);
        let fast = m.clock_domain("fast_domain", clk1, rst1);
        fast.set_frequency(200_000_000);
        let slow = m.clock_domain("slow_domain", clk2, rst2);
        let flag = m.input("flag", 1).with_clock_domain(fast);
        let synced = m.cdc_synchronizer("flag", flag, slow, 1);
        let flag_out = m.output("flag_out", 1);
        m.assign(flag_out, synced);

        assert_eq!(
            text(m),
            "\
module Cdc(
  input [0:0] clk1,
  input [0:0] rst1,
  input [0:0] clk2,
  input [0:0] rst2,
  input [0:0] flag,
  output [0:0] flag_out
);
  reg [0:0] flag_sync_stage0;
  reg [0:0] flag_sync_stage1;
  assign flag_out = flag_sync_stage1;
  // Clock Domains:
  // - fast_domain: clk=clk1, rst=rst1, freq=200000000 Hz
  // - slow_domain: clk=clk2, rst=rst2
  always @(posedge clk2) flag_sync_stage0 <= flag;

  always @(posedge clk2) flag_sync_stage1 <= flag_sync_stage0;

endmodule
"
        );
    }

    #[test]
    fn round_robin_mutex() {
        let c = Context::new();

        let m = c.module("Arb");
        let clk = m.input("clk", 1);
        let arb = m.mutex("rr", 2, Arbitration::RoundRobin);
        arb.generate_round_robin(clk).unwrap();

        assert_eq!(
            text(m),
            "\
module Arb(
  input [0:0] clk,
  input [0:0] rr_req_0,
  input [0:0] rr_req_1,
  output reg [0:0] rr_grant_0,
  output reg [0:0] rr_grant_1
);
  reg [0:0] rr_counter;
  // Mutex: rr (round_robin arbitration)
  // Request[0]: rr_req_0 -> Grant[0]: rr_grant_0
  // Request[1]: rr_req_1 -> Grant[1]: rr_grant_1
  always @(posedge clk) begin
    rr_grant_0 <= (rr_counter == 0) && rr_req_0;
    rr_grant_1 <= (rr_counter == 1) && rr_req_1;
    if (((rr_counter == 0) && rr_req_0) || ((rr_counter == 1) && rr_req_1)) rr_counter <= (rr_counter + 1) % 2;
  end

endmodule
"
        );
    }

    #[test]
    fn priority_mutex_and_templates() {
        let c = Context::new();

        let m = c.module("Arb");
        let arb = m.mutex("priority_arb", 3, Arbitration::Priority);
        arb.generate_priority().unwrap();
        m.add_template(&templates::fifo_template());
        m.add_template(&templates::register_file_template());

        let lines = emit(m).unwrap();
        assert_eq!(
            lines[lines.len() - 11..].to_vec(),
            vec![
                "  assign priority_arb_grant_2 = priority_arb_req_2;",
                "  assign priority_arb_grant_1 = priority_arb_req_1 && !(priority_arb_req_2);",
                "  assign priority_arb_grant_0 = priority_arb_req_0 && !(priority_arb_req_1 || priority_arb_req_2);",
                "  // Mutex: priority_arb (priority arbitration)",
                "  // Request[0]: priority_arb_req_0 -> Grant[0]: priority_arb_grant_0",
                "  // Request[1]: priority_arb_req_1 -> Grant[1]: priority_arb_grant_1",
                "  // Request[2]: priority_arb_req_2 -> Grant[2]: priority_arb_grant_2",
                "  // Templates:",
                "  // - GenericFIFO: DATA_WIDTH, DEPTH",
                "  // - GenericRegisterFile: DATA_WIDTH, ADDR_WIDTH",
                "endmodule",
            ]
        );
    }

    #[test]
    fn cat_and_fill() {
        let c = Context::new();

        let m = c.module("Cat");
        let a = m.input("a", 4);
        let b = m.input("b", 4);
        let d = m.input("d", 8);
        let cat_out = m.output("cat_out", 16);
        m.assign(cat_out, m.cat(&[a, b, d]).unwrap());
        let mask = m.output("mask", 8);
        m.assign(mask, m.fill(8, true));

        let lines = emit(m).unwrap();
        assert!(lines.contains(&"  assign cat_out = {a, b, d};".to_string()));
        assert!(lines.contains(&"  assign mask = {8{1'b1}};".to_string()));
    }

    #[test]
    fn emission_is_deterministic() {
        let c = Context::new();

        let m = c.module("Det");
        m.set_parameter("B", 1);
        m.set_parameter("A", 2);
        let clk = m.input("clk", 1);
        let u = m.instance("Child", "u");
        u.set_parameter("Z", 1).set_parameter("Y", 2);
        u.connect("q", clk).connect("p", clk);
        let d = m.clock_domain("d", clk, clk);
        let _ = m.async_fifo("f", 8, 8, d, d);

        assert_eq!(emit(m).unwrap(), emit(m).unwrap());

        let mut first = Vec::new();
        let mut second = Vec::new();
        generate(m, &mut first).unwrap();
        generate(m, &mut second).unwrap();
        assert_eq!(first, second);
        assert_eq!(String::from_utf8(first).unwrap(), text(m));
    }

    #[test]
    fn write_file_reports_sink_path() {
        let c = Context::new();

        let m = c.module("Nowhere");
        let path = std::env::temp_dir()
            .join("rtlgen-missing-dir")
            .join("deeper")
            .join("Nowhere.v");

        match write_file(m, &path) {
            Err(Error::OutputSink { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn write_file_round_trip() {
        let c = Context::new();

        let m = c.module("Written");
        let a = m.input("a", 2);
        let o = m.output("o", 2);
        m.assign(o, !a);

        let path = std::env::temp_dir().join(format!("rtlgen-write-{}.v", std::process::id()));
        write_file(m, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(written, text(m));
    }
}
