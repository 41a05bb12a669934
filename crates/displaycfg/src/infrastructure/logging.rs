//! Logging bootstrap.
//!
//! Diagnostics go to stderr through `tracing-subscriber`; stdout carries only
//! query and mode reports so it can be piped.  The filter comes from, in
//! order: `RUST_LOG`, the config file's `[logging] level`, and `--verbose`,
//! which raises a quieter level to `info`.

use tracing_subscriber::EnvFilter;

/// Levels that `--verbose` raises to `info`.
const QUIET_LEVELS: [&str; 3] = ["off", "error", "warn"];

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(configured: &str, verbose: bool) -> String {
    let configured = configured.trim();
    if configured.is_empty() {
        return if verbose { "info" } else { "warn" }.to_string();
    }
    if verbose && QUIET_LEVELS.contains(&configured.to_ascii_lowercase().as_str()) {
        return "info".to_string();
    }
    configured.to_string()
}

/// Builds the filter, letting `RUST_LOG` override the configured level.
pub fn env_filter(configured: &str, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(default_directive(configured, verbose))
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    })
}

/// Installs the global subscriber writing to stderr.
///
/// A second call (e.g. from tests) leaves the first subscriber in place.
pub fn init_logging(configured: &str, verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured, verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_uses_configured_level() {
        assert_eq!(default_directive("debug", false), "debug");
        assert_eq!(default_directive("warn", false), "warn");
    }

    #[test]
    fn test_verbose_raises_quiet_levels_to_info() {
        assert_eq!(default_directive("warn", true), "info");
        assert_eq!(default_directive("ERROR", true), "info");
    }

    #[test]
    fn test_verbose_keeps_more_detailed_levels() {
        assert_eq!(default_directive("trace", true), "trace");
        assert_eq!(default_directive("displaycfg_core=debug", true), "displaycfg_core=debug");
    }

    #[test]
    fn test_blank_level_falls_back_to_warn() {
        assert_eq!(default_directive("  ", false), "warn");
        assert_eq!(default_directive("", true), "info");
    }
}
