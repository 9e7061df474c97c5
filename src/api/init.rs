use std::sync::OnceLock;

use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogConfig, DEFAULT_LOG_FILTER};

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Install the global `tracing` subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.filter`. Only the first call has any
/// effect; later calls return the first call's result. Returns `false` when
/// another subscriber was already installed by the host.
pub fn init_tracing(config: &LogConfig) -> bool {
    *INSTALLED.get_or_init(|| {
        let (filter, rejected) = build_filter(&config.filter);

        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_ansi(config.ansi))
            .try_init()
            .is_ok();

        if installed {
            info!(ansi = config.ansi, "news fetch engine logging ready");
        }
        if let Some(directives) = rejected {
            warn!(
                "invalid log filter {:?}, using {:?}",
                directives, DEFAULT_LOG_FILTER
            );
        }
        installed
    })
}

/// `RUST_LOG` if set, else `directives`, else the built-in default.
fn build_filter(directives: &str) -> (EnvFilter, Option<String>) {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return (filter, None);
    }
    match EnvFilter::try_new(directives) {
        Ok(filter) => (filter, None),
        Err(_) => (
            EnvFilter::new(DEFAULT_LOG_FILTER),
            Some(directives.to_string()),
        ),
    }
}
