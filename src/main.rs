use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use rouillesftpd::core_cli::Cli;
use rouillesftpd::{server, Config};
use std::fs;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize the logger with a custom format
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

    // Determine the default config path based on the OS
    let default_config_path = if cfg!(target_os = "windows") {
        "C:\\src\\rouilleSFTPd\\etc\\rouillesftpd.conf"
    } else {
        "/etc/rouillesftpd.conf"
    };

    // Load configuration from the TOML file
    let config_path = if args.config.is_empty() {
        default_config_path
    } else {
        args.config.as_str()
    };
    let mut config = load_config(config_path)?;

    // CLI switches take precedence over the configuration file
    if let Some(port) = args.port {
        config.server.listen_port = port;
    }
    if args.bypass_login {
        config.server.bypass_login = true;
    }

    // Run the SFTP server
    server::run(config).await?;

    Ok(())
}

fn load_config(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path))?;
    let config = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse configuration file: {}", path))?;
    Ok(config)
}
