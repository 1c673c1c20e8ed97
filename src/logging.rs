// Logger setup. Lines look like
// `[2026-10-17T09:12:44Z] [ INFO] [qtree_provision::provision:42] message`.

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Install the global logger. `RUST_LOG`, when set, overrides `level`.
pub fn init(level: LevelFilter) {
    let mut builder = Builder::new();
    builder.filter_level(level);
    builder.parse_env(Env::default());
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] [{:>5}] [{}:{}] {}",
            buf.timestamp(),
            record.level(),
            record.module_path().unwrap_or("?"),
            record.line().unwrap_or(0),
            record.args()
        )
    });
    // A second init (tests) keeps the first logger.
    let _ = builder.try_init();
}

/// Map the `--debug` / `--silent` switches to a level.
pub fn level_for(debug: bool, silent: bool) -> LevelFilter {
    if silent {
        LevelFilter::Off
    } else if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}
