use clap::Parser;
use warded::args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::from(
            args.log_level,
        ))
        .init();
    warded::run(args).await
}
