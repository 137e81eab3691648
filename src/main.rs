use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use todo_api::{app, db::Database};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let db_path =
        PathBuf::from(std::env::var("TODO_API_DB").unwrap_or_else(|_| "todo.db".to_string()));
    let addr: SocketAddr = std::env::var("TODO_API_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
        .parse()?;

    // fail fast on an unusable database path; handlers reconnect per request
    Database::connect(&db_path)?;

    tracing::info!(addr = %addr, db = %db_path.display(), "todo_api listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app(db_path)).await?;

    Ok(())
}
