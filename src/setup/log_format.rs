use std::{io, result};

use slog::{Drain, OwnedKVList, Record, KV};
use slog_term::{Decorator, RecordDecorator, Serializer};

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f %:z";

/// PeerFormat writes one line per record:
/// `[timestamp] [LEVEL] [file:line] msg, k: v, k: v`.
///
/// The timestamp can be left out for sinks that stamp lines themselves, such as journald.
pub struct PeerFormat<D>
where
    D: Decorator,
{
    decorator: D,
    timestamp: bool,
}

impl<D> Drain for PeerFormat<D>
where
    D: Decorator,
{
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, values: &OwnedKVList) -> result::Result<Self::Ok, Self::Err> {
        self.decorator.with_record(record, values, |rd| {
            if self.timestamp {
                write_timestamp(rd)?;
            }
            write_location(rd, record)?;

            rd.start_whitespace()?;
            write!(rd, " ")?;
            rd.start_msg()?;
            write!(rd, "{}", record.msg())?;

            // kvs printed in the order they are given
            let mut ser = Serializer::new(rd, true, true);
            record.kv().serialize(record, &mut ser)?;
            values.serialize(record, &mut ser)?;
            ser.finish()?;

            rd.start_whitespace()?;
            writeln!(rd)?;
            rd.flush()
        })
    }
}

impl<D> PeerFormat<D>
where
    D: Decorator,
{
    pub fn new(d: D) -> PeerFormat<D> {
        PeerFormat {
            decorator: d,
            timestamp: true,
        }
    }

    pub fn without_timestamp(mut self) -> PeerFormat<D> {
        self.timestamp = false;
        self
    }
}

fn write_timestamp(rd: &mut dyn RecordDecorator) -> io::Result<()> {
    rd.start_timestamp()?;
    write!(rd, "[{}]", chrono::Local::now().format(TIMESTAMP_FORMAT))?;

    rd.start_whitespace()?;
    write!(rd, " ")
}

/// write level and source location. slog_term has no `start_file()`, use msg style.
fn write_location(rd: &mut dyn RecordDecorator, record: &Record) -> io::Result<()> {
    rd.start_level()?;
    write!(rd, "[{}]", record.level().as_short_str())?;

    rd.start_whitespace()?;
    write!(rd, " ")?;

    rd.start_msg()?;
    write!(rd, "[{}:{}]", record.file(), record.line())
}
