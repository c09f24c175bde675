//! Process-wide subscriber installation

use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Output profile of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines, `sitewatch=debug`
    Development,
    /// One JSON object per line for CI log collectors, `sitewatch=info`
    Production,
    /// Nothing installed here; tests call `init_test_capture()`
    Test,
}

impl Profile {
    /// Filter used when `RUST_LOG` is unset
    pub fn default_filter(self) -> &'static str {
        match self {
            Profile::Development => "sitewatch=debug",
            Profile::Production | Profile::Test => "sitewatch=info",
        }
    }

    fn filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_filter()))
    }
}

static INIT: Once = Once::new();

/// Install the global subscriber for `profile`
///
/// Only the first call has an effect. Output goes to stderr so that stdout
/// stays free for command results.
pub fn init(profile: Profile) {
    INIT.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(profile.filter())
            .with_writer(std::io::stderr);
        // Another subscriber may already be installed, e.g. by a test
        let _ = match profile {
            Profile::Development => builder.try_init(),
            Profile::Production => builder.json().try_init(),
            Profile::Test => Ok(()),
        };
    });
}
