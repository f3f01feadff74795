use std::fs::{self, File, OpenOptions};
use std::io::{self, Error, ErrorKind};
use std::path::Path;

use slog::Drain;
use slog::Level;
use slog_async::AsyncGuard;

use super::log_format::PeerFormat;

/// init_logger installs the global logger used by the `info!`, `warn!`, ... macros.
///
/// Records go to `log_path` in append mode, or to stderr without a timestamp when it is `None`.
/// Records below `level` are dropped.
///
/// Keep the returned guard alive until exit: dropping it flushes pending records.
pub fn init_logger(log_path: Option<&Path>, level: Level) -> io::Result<AsyncGuard> {
    let (drain, guard) = match log_path {
        Some(p) => {
            let file = open_log_file(p)?;
            let drain = PeerFormat::new(slog_term::PlainDecorator::new(file)).fuse();
            async_drain(drain, level)
        }
        None => {
            let decorator = slog_term::PlainDecorator::new(io::stderr());
            let drain = PeerFormat::new(decorator).without_timestamp().fuse();
            async_drain(drain, level)
        }
    };

    let logger = slog::Logger::root(drain, slog::o!());
    slog_global::set_global(logger);

    debug!("logger ready"; "level" => level.as_str());
    Ok(guard)
}

type AsyncDrain = slog::Fuse<slog_async::Async>;

fn async_drain<D>(drain: D, level: Level) -> (AsyncDrain, AsyncGuard)
where
    D: Drain<Ok = (), Err = slog::Never> + Send + 'static,
{
    let drain = drain.filter_level(level).ignore_res();
    let (drain, guard) = slog_async::Async::new(drain).build_with_guard();
    (drain.fuse(), guard)
}

/// Opens log file with append mode. Creates a new log file if it doesn't exist.
fn open_log_file<P: AsRef<Path>>(path: P) -> io::Result<File> {
    let path = path.as_ref();
    let parent = path.parent().ok_or_else(|| {
        Error::new(
            ErrorKind::Other,
            "Unable to get parent directory of log file",
        )
    })?;
    if !parent.as_os_str().is_empty() && !parent.is_dir() {
        fs::create_dir_all(parent)?
    }
    OpenOptions::new().append(true).create(true).open(path)
}
