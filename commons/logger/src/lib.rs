// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    Handle,
};
use once_cell::sync::OnceCell;

/// Logger prelude which includes all logging macros.
pub mod prelude {
    pub use log::{debug, error, info, log_enabled, trace, warn, Level, LevelFilter};
}

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l})} {t} - {m}{n}";

static LOGGER_HANDLE: OnceCell<Handle> = OnceCell::new();

fn build_config(level: LevelFilter) -> Config {
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();
    Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)))
        .build(Root::builder().appender("console").build(level))
        .expect("logger config is well-formed")
}

/// Init logger with the given level, level is ignored on repeat calls.
pub fn init_with_level(level: LevelFilter) {
    LOGGER_HANDLE.get_or_init(|| {
        log4rs::init_config(build_config(level)).expect("logger init should not fail")
    });
}

pub fn init() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LevelFilter::Info);
    init_with_level(level);
}

pub fn init_for_test() {
    init_with_level(LevelFilter::Debug);
}

/// Change the root log level at runtime.
pub fn set_log_level(level: LevelFilter) {
    if let Some(handle) = LOGGER_HANDLE.get() {
        handle.set_config(build_config(level));
    }
}
