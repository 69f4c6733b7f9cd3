//! Non-blocking, batched logging into per-severity, per-day files.
//!
//! Producers call [`log_info!`] or [`log_error!`] from any thread. The call
//! captures its location, formats the message, pushes the event onto an
//! unbounded queue and returns. One background thread per [`Logger`]
//! drains the queue in batches and appends them to
//! `{info|error directory}/{yyyy-MM-dd}.log`. A failed write drops that
//! batch and never stops the flusher.
//!
//! ```no_run
//! use daily_log_sink::{located, log_error, log_info, Located};
//!
//! fn charge() -> Result<(), Located> {
//!     Err(located!("card declined"))
//! }
//!
//! log_info!("user {} logged in", "alice");
//! if let Err(e) = charge() {
//!     // Attributed to `charge`, where the error was raised.
//!     log_error!(err = e, "payment failed");
//! }
//! ```

pub mod callsite;
pub mod clock;
pub mod config;
pub mod error;
pub mod file_sink;
pub mod flusher;
pub mod init;
pub mod layer;
pub mod logger;
mod macros;
pub mod noop_sink;
pub mod queue;
pub mod record;
pub mod router;
pub mod signal;
pub mod sink;

pub use callsite::{AsErrorObject, CallSite, Located};
pub use config::LoggerConfig;
pub use error::{Error, Result};
pub use flusher::FlusherState;
pub use logger::{global, init, Logger, LoggerStats};
pub use record::{Level, LineFormat};
pub use router::FileRouter;
