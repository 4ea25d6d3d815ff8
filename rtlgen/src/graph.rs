mod bundle;
mod clock_domain;
mod context;
mod instance;
mod mem;
mod module;
mod mutex;
mod param;
mod signal;
mod signal_vec;
mod template;
mod value;
mod width;

pub use bundle::*;
pub use clock_domain::*;
pub use context::*;
pub use instance::*;
pub use mem::*;
pub use module::*;
pub use mutex::*;
pub use param::*;
pub use signal::*;
pub use signal_vec::*;
pub use template::*;
pub use value::*;
pub use width::*;
