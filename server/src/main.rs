use clap::Parser;
use log::info;
use server::network::{ChatServer, ServerError};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server port to listen on
    #[arg(short, long, default_value = shared::DEFAULT_PORT)]
    port: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    // Validate before any socket is opened; blank or non-numeric ports
    // are fatal configuration errors.
    let port = shared::parse_port(&args.port).map_err(ServerError::Config)?;

    let server = ChatServer::bind(&format!("0.0.0.0:{port}")).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
