use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    favorites_app_lib::load_env_files();

    // Logs go to stderr so they never interleave with the table on stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "favorites_app=info,favorites_app_lib=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(error) = favorites_app_lib::run().await {
        tracing::error!(error = %error, "favorites shell failed");
        std::process::exit(1);
    }
}
