use clap::Parser;
use client::network::ChatClient;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server host to connect to
    #[arg(long, default_value = shared::DEFAULT_HOST)]
    host: String,

    /// Server port to connect to
    #[arg(short, long, default_value = shared::DEFAULT_PORT)]
    port: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    // Fail fast on blank or malformed arguments, before opening a socket.
    let host = shared::validate_host(&args.host)?;
    let port = shared::parse_port(&args.port)?;

    info!("Connecting to {host}:{port}");
    let client = ChatClient::connect(host, port).await?;
    client.run().await?;

    Ok(())
}
