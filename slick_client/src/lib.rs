use tracing_subscriber::EnvFilter;

pub mod config;
pub mod driver;
pub mod prompt;

/// Logs go to standard error, leaving standard output for generated text.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
