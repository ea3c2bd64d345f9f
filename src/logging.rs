//! Diagnostic output setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install a stderr subscriber. `RUST_LOG` overrides the `-v` level.
pub fn init(verbose: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    // Ignore a second initialization; the first subscriber stays.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(0), "warn");
        assert_eq!(default_level(1), "debug");
        assert_eq!(default_level(5), "trace");
    }
}
