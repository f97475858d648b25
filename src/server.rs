use crate::constants::{OTHER_SUBDIR, TEXT_SUBDIR};
use crate::core_credentials::load_users;
use crate::core_network::network;
use crate::Config;
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Runs the SFTP server with the provided configuration.
///
/// This function loads the credential file, prepares the served directory
/// tree and then accepts connections until the process is stopped.
///
/// # Arguments
///
/// * `config` - The server configuration.
///
/// # Returns
///
/// Result<(), anyhow::Error> indicating the success or failure of the operation.
pub async fn run(config: Config) -> Result<()> {
    info!("Starting server with config: {:?}", config);

    let users = load_users(&config.server.users_file)?;
    let server_dir = prepare_directories(&config)?;
    info!("Serving files from {}", server_dir.display());

    let addr = format!("0.0.0.0:{}", config.server.listen_port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on port {}", config.server.listen_port);

    network::serve(listener, Arc::new(config), users).await
}

/// Creates the served directory tree if it does not exist yet.
///
/// Stored files are split by kind, so both the `text` and `other`
/// subdirectories have to be present before the first transfer.
fn prepare_directories(config: &Config) -> Result<PathBuf> {
    let server_dir = PathBuf::from(&config.server.root_dir).join(&config.server.server_dir);

    for subdir in [TEXT_SUBDIR, OTHER_SUBDIR] {
        let path = server_dir.join(subdir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
    }

    Ok(server_dir)
}
