//! `log` backend that writes to the browser console.
//!
//! Installed once from `init()`. Native builds leave the logger choice to the
//! host; if this one is installed anyway it writes to stderr.

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Forwards `log` records to `console.error/warn/info/debug`.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleLogger {
    max_level: LevelFilter,
}

static LOGGER: ConsoleLogger = ConsoleLogger::new(LevelFilter::Info);

impl ConsoleLogger {
    pub const fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        emit(record.level(), &format_record(record));
    }

    fn flush(&self) {}
}

/// Install the console logger. Later calls, or a logger installed by the
/// host first, leave the existing logger in place.
pub fn install() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LOGGER.max_level);
    }
}

fn format_record(record: &Record) -> String {
    format!("[{}] {}: {}", record.level(), record.target(), record.args())
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    use wasm_bindgen::JsValue;
    use web_sys::console;

    let value = JsValue::from_str(line);
    match level {
        Level::Error => console::error_1(&value),
        Level::Warn => console::warn_1(&value),
        Level::Info => console::info_1(&value),
        Level::Debug | Level::Trace => console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{line}");
}
