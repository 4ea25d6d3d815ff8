//! A structural hardware construction library embedded in [Rust](https://www.rust-lang.org/), which lowers netlists to [Verilog](https://en.wikipedia.org/wiki/Verilog).
//!
//! rtlgen provides an API to describe [`Module`]s made of ports, wires, registers, memories and submodule instances, connected by [`Signal`] expressions whose bit widths are tracked as they're combined. On top of that it can build a few recurring structures for you: clock domain crossing synchronizers, dual-clock FIFOs, arbitrated mutexes, and modules generated from parameterized [`ModuleTemplate`]s. Finished modules are turned into text by the [verilog generator](verilog/fn.generate.html).
//!
//! rtlgen records what you build; it doesn't check it. Declaring two signals with the same name, or assigning signals of different widths (which only logs a warning), produces Verilog that another tool will reject.
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! rtlgen = "0.1"
//! ```
//!
//! # Examples
//!
//! ```rust
//! # fn main() -> Result<(), rtlgen::Error> {
//! use rtlgen::*;
//!
//! // Create a context, which will own our module(s)
//! let c = Context::new();
//!
//! // Create a module
//! let adder = c.module("Adder");
//! let a = adder.input("a", 8);
//! let b = adder.input("b", 8);
//! let sum = adder.output("sum", 8);
//! adder.assign(sum, a + b);
//!
//! // Generate verilog code
//! verilog::generate(adder, std::io::stdout())?;
//! # Ok(())
//! # }
//! ```
//!
//! [`Module`]: ./struct.Module.html
//! [`ModuleTemplate`]: ./struct.ModuleTemplate.html
//! [`Signal`]: ./struct.Signal.html

// Must be kept up-to-date with version in Cargo.toml
#![doc(html_root_url = "https://docs.rs/rtlgen/0.1.0")]

mod code_writer;
pub mod error;
mod graph;
pub mod templates;
pub mod verilog;

pub use error::{Error, WidthMismatch};
pub use graph::*;
