use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Overrides the configured level, e.g. `OPSBOARD_LOG=opsboard=debug`.
pub const LOG_ENV_VAR: &str = "OPSBOARD_LOG";

/// Installs the stderr subscriber. Later calls are ignored.
pub fn init(configured_level: &str) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_name(configured_level).into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn level_from_name(name: &str) -> LevelFilter {
    name.trim().parse().unwrap_or(LevelFilter::WARN)
}
