use jobtrack_core::Config;

// Use mimalloc as the global allocator for better performance and lower
// fragmentation, especially when running on musl-based systems inside
// containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load .env in development; real deployments set the environment directly.
    dotenvy::dotenv().ok();

    jobtrack_api::setup::telemetry::init_tracing();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (storage, record store, routes)
    let (_state, router) = jobtrack_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    jobtrack_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
