use clap::Parser;
use log::info;
use server::network::Server;
use shared::{DEFAULT_COLS, DEFAULT_ROWS};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "5001")]
    port: u16,

    /// Board rows
    #[arg(short, long, default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Board columns
    #[arg(short, long, default_value_t = DEFAULT_COLS)]
    cols: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    if args.rows == 0 || args.cols == 0 {
        return Err("board must have at least one row and one column".into());
    }

    let address = format!("{}:{}", args.host, args.port);
    info!(
        "Starting dots-and-boxes server on {} with a {}x{} board",
        address, args.rows, args.cols
    );

    let server = Server::new(&address, args.rows, args.cols).await?;
    server.run().await?;

    Ok(())
}
