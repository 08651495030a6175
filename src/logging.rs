//! Logger installation for native and browser builds.

use crate::config::LogLevel;

/// Install the platform logger at `level`.
///
/// Native builds use `env_logger` (`RUST_LOG` still overrides the level);
/// wasm builds log to the browser console. Only the first call installs a
/// logger, later calls just adjust the maximum level.
pub fn init(level: LogLevel) {
    let filter = level.to_level_filter();

    #[cfg(not(target_arch = "wasm32"))]
    let installed = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(filter.as_str()),
    )
    .try_init();

    #[cfg(target_arch = "wasm32")]
    let installed = {
        console_error_panic_hook::set_once();
        match filter.to_level() {
            Some(max) => console_log::init_with_level(max),
            None => Ok(()),
        }
    };

    match installed {
        Ok(()) => log::debug!("Logging initialized at {}", level.name()),
        Err(e) => {
            log::set_max_level(filter);
            log::debug!("Logger already installed ({}), level set to {}", e, level.name());
        }
    }
}
