pub mod args;
pub mod caption;
pub mod classify;
pub mod danger_list;
pub mod model;
pub mod monitor;
pub mod routes;
pub mod snapshot;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use args::Args;
use monitor::Monitor;

/// Run the warded daemon until the process is stopped.
pub async fn run(args: Args) -> anyhow::Result<()> {
    let monitor = Arc::new(Monitor::new(&args.events_dir, &args.danger_list));
    let app = routes::router(monitor);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "warded listening");
    axum::serve(listener, app).await?;
    Ok(())
}
