use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = panics::cli::Cli::parse();
    if let Err(e) = panics::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
