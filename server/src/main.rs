use clap::Parser;
use log::info;
use server::credentials::Credentials;
use server::network::{Server, ServerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "5000")]
    port: u16,

    /// Number of dispatch workers
    #[arg(short, long, default_value = "10")]
    workers: usize,

    /// Path to the user credentials file
    #[arg(short, long, default_value = "data/users.txt")]
    users_file: PathBuf,

    /// Session idle timeout in seconds
    #[arg(long, default_value = "300")]
    session_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let credentials = Credentials::load(&args.users_file);
    let config = ServerConfig {
        workers: args.workers,
        session_timeout: Duration::from_secs(args.session_timeout),
        ..ServerConfig::default()
    };

    let address = format!("{}:{}", args.host, args.port);
    let server = Arc::new(Server::new(&address, credentials, config).await?);

    // Ctrl-C triggers the same graceful shutdown as any external signal.
    {
        let server = Arc::clone(&server);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C, shutting down gracefully...");
                server.shutdown();
            }
        });
    }

    server.run().await?;
    Ok(())
}
