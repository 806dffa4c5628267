use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod config;
mod drive;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, sizing the worker pool from configuration
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    // The service-account key is loaded once; bearer tokens are fetched and
    // cached per request through the provider seam.
    let auth = Arc::new(drive::ServiceAccountAuth::from_config(&cfg.drive).await?);
    let images: Arc<dyn drive::ImageLister> = Arc::new(drive::DriveClient::new(auth, &cfg.drive));

    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(config::AppState::new(cfg, images));
    let active_connections = Arc::new(AtomicUsize::new(0));

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    // LocalSet so connection tasks can use spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::run(
            listener,
            state,
            active_connections,
            Arc::clone(&signals.shutdown),
        ))
        .await
}
