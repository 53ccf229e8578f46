use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    }
}

/// Installs the global subscriber. Logs go to stderr so tables printed on
/// stdout stay clean. When `RUST_LOG` is set it replaces the `verbose` level.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let app_filter = env_filter
        .is_none()
        .then(|| Targets::new().with_target(env!("CARGO_CRATE_NAME"), level_for(verbose)));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(app_filter)
        .with(env_filter)
        .init();
}
