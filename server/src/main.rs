use anyhow::Result;
use axum::Router;
use bookrec_core::TfidfConfig;
use bookrec_server::{build_app, AppConfig};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Catalog CSV (id,title,author,genre,year,description)
    #[arg(long, default_value = "./data/books.csv")]
    catalog: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Vocabulary cap for the TF-IDF model
    #[arg(long, default_value_t = 5000)]
    max_features: usize,
    /// Use 1 + ln(tf) instead of raw term counts
    #[arg(long, default_value_t = false)]
    sublinear_tf: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = AppConfig {
        catalog_path: args.catalog,
        tfidf: TfidfConfig { max_features: args.max_features, sublinear_tf: args.sublinear_tf, ..TfidfConfig::default() },
        admin_token: std::env::var("ADMIN_TOKEN").ok(),
        cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
    };
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
