use clap::Parser;
use owo_colors::OwoColorize;

use sacristy_daemon::cli::op::{Op, OpContext};
use sacristy_daemon::cli::{Cli, Command};
use sacristy_daemon::http_server::api::client::ApiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let client = ApiClient::new(&cli.api_url)?;
    let ctx = OpContext { client };

    match cli.command {
        Command::Serve(op) => run(&op, &ctx).await,
        Command::Upload(op) => run(&op, &ctx).await,
        Command::Download(op) => run(&op, &ctx).await,
        Command::Delete(op) => run(&op, &ctx).await,
        Command::Health(op) => run(&op, &ctx).await,
        Command::Version(op) => run(&op, &ctx).await,
    }

    Ok(())
}

async fn run<O: Op>(op: &O, ctx: &OpContext) {
    match op.execute(ctx).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{} {}", "error:".red(), e);
            std::process::exit(1);
        }
    }
}
