use rtlgen::*;

use std::env;
use std::error;
use std::path::Path;

fn main() -> Result<(), Box<dyn error::Error>> {
    let out_dir = env::var("OUT_DIR")?;
    let out_dir = Path::new(&out_dir);

    let c = Context::new();

    let modules = [
        adder(&c),
        data_memory(&c),
        cdc_bridge(&c),
        priority_arbiter(&c)?,
        round_robin_arbiter(&c)?,
        fifo_8x4(&c)?,
        reg_file_8x4(&c)?,
        async_fifo_bridge(&c),
        top(&c),
    ];
    for m in modules.iter() {
        verilog::write_file(m, out_dir.join(format!("{}.v", m.name())))?;
    }

    Ok(())
}

fn adder<'a>(c: &'a Context<'a>) -> &Module<'a> {
    let m = c.module("Adder");

    let a = m.input("a", 8);
    let b = m.input("b", 8);
    let sum = m.output("sum", 8);
    m.assign(sum, a + b);

    m
}

fn data_memory<'a>(c: &'a Context<'a>) -> &Module<'a> {
    let m = c.module("DataMemory");

    let clk = m.input("clk", 1);
    let addr = m.input("addr", 6);
    let wr_data = m.input("wr_data", 16);
    let wr_en = m.input("wr_en", 1);
    let rd_data = m.output("rd_data", 16);

    let data_mem = m.sync_mem("data_mem", 16, 64);
    m.assign(rd_data, data_mem.read(addr));
    m.always(format!(
        "always @(posedge {}) {}",
        clk.name(),
        data_mem.write(addr, wr_data, wr_en)
    ));

    m
}

fn cdc_bridge<'a>(c: &'a Context<'a>) -> &Module<'a> {
    let m = c.module("CdcBridge");

    let domain_a = m.clock_domain("domain_a", m.input("clk_a", 1), m.input("rst_a", 1));
    domain_a.set_frequency(100_000_000);
    let domain_b = m.clock_domain("domain_b", m.input("clk_b", 1), m.input("rst_b", 1));

    let data = m.input("data", 8).with_clock_domain(domain_a);
    let data_b = m.output("data_b", 8).with_clock_domain(domain_b);
    m.assign(data_b, m.cdc_synchronizer("data", data, domain_b, 3));

    m
}

fn priority_arbiter<'a>(c: &'a Context<'a>) -> Result<&Module<'a>, Error> {
    let m = c.module("PriorityArbiter");

    let arb = m.mutex("priority_arb", 3, Arbitration::Priority);
    arb.generate_priority()?;

    Ok(m)
}

fn round_robin_arbiter<'a>(c: &'a Context<'a>) -> Result<&Module<'a>, Error> {
    let m = c.module("RoundRobinArbiter");

    let clk = m.input("clk", 1);
    let arb = m.mutex("rr", 3, Arbitration::RoundRobin);
    arb.generate_round_robin(clk)?;

    Ok(m)
}

fn fifo_8x4<'a>(c: &'a Context<'a>) -> Result<&Module<'a>, Error> {
    templates::fifo_template().instantiate(
        c,
        "Fifo8x4",
        &TemplateArgs::new()
            .with("DATA_WIDTH", Param::Width(8))
            .with("DEPTH", 4),
    )
}

fn reg_file_8x4<'a>(c: &'a Context<'a>) -> Result<&Module<'a>, Error> {
    templates::register_file_template().instantiate(
        c,
        "RegFile8x4",
        &TemplateArgs::new()
            .with("DATA_WIDTH", Param::Width(8))
            .with("ADDR_WIDTH", Param::Width(2)),
    )
}

fn async_fifo_bridge<'a>(c: &'a Context<'a>) -> &Module<'a> {
    let m = c.module("AsyncFifoBridge");

    let wr = m.clock_domain("wr", m.input("wr_clk", 1), m.input("wr_rst", 1));
    let rd = m.clock_domain("rd", m.input("rd_clk", 1), m.input("rd_rst", 1));
    let _ = m.async_fifo("q", 8, 4, wr, rd);

    m
}

fn top<'a>(c: &'a Context<'a>) -> &Module<'a> {
    let m = c.module("Top");

    let clk = m.input("clk", 1);
    let rst = m.input("rst", 1);
    let din = m.input("din", 8);
    let push = m.input("push", 1);
    let pop = m.input("pop", 1);
    let dout = m.output("dout", 8);
    let full = m.output("full", 1);
    let empty = m.output("empty", 1);

    let fifo = m.instance("Fifo8x4", "fifo0");
    fifo.set_parameter("DATA_WIDTH", Param::Width(8))
        .set_parameter("DEPTH", 4);
    fifo.connect("clk", clk)
        .connect("rst", rst)
        .connect("wr_data", din)
        .connect("wr_en", push)
        .connect("rd_en", pop);
    let wr_full = fifo.io("wr_full", 1);
    let rd_data = fifo.io("rd_data", 8);
    let rd_empty = fifo.io("rd_empty", 1);

    m.assign(dout, rd_data);
    m.assign(full, wr_full);
    m.assign(empty, rd_empty);

    m.add_template(&templates::fifo_template());
    m.add_template(&templates::register_file_template());

    m
}
