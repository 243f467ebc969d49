use filehost_api::setup;
use filehost_core::FilehostConfig;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = FilehostConfig::from_env()?;

    let (state, router) = setup::initialize_app(config).await?;

    // Start the server; SIGHUP reloads the shared configuration
    setup::server::start_server(state.config.clone(), router).await?;

    Ok(())
}
