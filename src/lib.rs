#[macro_use]
extern crate quick_error;

#[macro_use(
    slog_crit,
    slog_debug,
    slog_error,
    slog_info,
    slog_trace,
    slog_warn,
    slog_log,
    slog_kv,
    slog_record,
    slog_record_static,
    slog_b
)]
extern crate slog;

#[macro_use]
extern crate slog_global;

mod errors;
pub use errors::*;

pub mod conf;
pub mod envfile;
pub mod setup;
pub mod sync;
pub mod testutil;
