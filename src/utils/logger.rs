use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "ai_lms=info,warn";
const VERBOSE_DIRECTIVES: &str = "ai_lms=debug,tower_http=debug,info";

/// `RUST_LOG` wins over both defaults.
fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            VERBOSE_DIRECTIVES
        } else {
            DEFAULT_DIRECTIVES
        })
    })
}

/// Compact human-readable output for terminals and the `outline` CLI.
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(fmt::layer().with_target(false).compact())
        .init();
}

/// 部署環境用 JSON，方便日誌收集
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(fmt::layer().json().with_current_span(false))
        .init();
}
