use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use rouillesftpd::core_cli::ClientCli;
use rouillesftpd::core_client::ClientSession;
use std::io::Write;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let args = ClientCli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    let mut session =
        ClientSession::connect(&args.host, args.port, Path::new(&args.client_dir)).await?;
    session.run().await?;

    Ok(())
}
