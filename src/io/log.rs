use log::{max_level, set_logger, set_max_level, LevelFilter, Log, Metadata, Record};
use std::thread;

struct Logger;
static GLOBAL_LOG: Logger = Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= max_level()
    }

    // stdout carries responses only
    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match thread::current().name() {
            Some(name) if name.starts_with("worker-") => {
                eprintln!("% [{} {}] {}", record.level(), name, record.args())
            }
            _ => eprintln!("% [{}] {}", record.level(), record.args()),
        }
    }

    fn flush(&self) {}
}

pub fn start_logging(level: LevelFilter) {
    let _ = set_logger(&GLOBAL_LOG);
    set_max_level(level);
}
