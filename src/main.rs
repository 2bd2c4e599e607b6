use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = webhook_gateway::cli::Cli::parse();
    if let Err(e) = webhook_gateway::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
