//! Log subscriber setup.
//!
//! `RUST_LOG` always wins; otherwise the level follows `--verbose` and
//! `--debug`. Logs go to stderr so tables and boxes stay on stdout.

use tracing_subscriber::EnvFilter;

/// Filter directives used when `RUST_LOG` is unset.
pub fn default_directives(verbose: bool, debug: bool) -> &'static str {
    if debug {
        "debug"
    } else if verbose {
        "info,rasactl=debug"
    } else {
        "warn"
    }
}

pub fn init(verbose: bool, debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose, debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_beats_verbose() {
        assert_eq!(default_directives(false, false), "warn");
        assert_eq!(default_directives(true, false), "info,rasactl=debug");
        assert_eq!(default_directives(true, true), "debug");
        assert_eq!(default_directives(false, true), "debug");
    }
}
