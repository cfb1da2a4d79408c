//! tracing subscriber setup.
//!
//! Filter precedence: `RUST_LOG`, then `--log-level` or `-v`, then the
//! settings file, then `info`. Logs go to stderr so command output on stdout
//! stays machine-readable.

use tracing_subscriber::EnvFilter;

pub fn init(verbose: u8, cli_level: Option<&str>, settings_level: Option<&str>) {
    let fallback = level_directive(verbose, cli_level, settings_level);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn level_directive(verbose: u8, cli_level: Option<&str>, settings_level: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return level.to_ascii_lowercase();
    }
    match verbose {
        0 => settings_level.unwrap_or("info").to_ascii_lowercase(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_wins() {
        assert_eq!(level_directive(2, Some("warn"), Some("debug")), "warn");
    }

    #[test]
    fn verbosity_beats_settings() {
        assert_eq!(level_directive(1, None, Some("error")), "debug");
        assert_eq!(level_directive(3, None, None), "trace");
    }

    #[test]
    fn settings_then_info() {
        assert_eq!(level_directive(0, None, Some("WARN")), "warn");
        assert_eq!(level_directive(0, None, None), "info");
    }
}
