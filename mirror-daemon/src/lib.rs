//! Mirror scheduler: periodic passes, cancellation, and the logging sink.

mod error;
pub mod logging;
pub mod paths;
mod runtime;

pub use error::DaemonError;
pub use logging::{init_logging, LogFormat};
pub use runtime::{run, run_until_ctrl_c, start_blocking, SchedulerSummary};
