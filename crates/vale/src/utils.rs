//! CLI bootstrap helpers.

/// Loads a `.env` file from the working directory when present.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Initializes a tracing subscriber for logging, driven by `RUST_LOG`.
pub fn subscriber() {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
