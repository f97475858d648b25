use crate::core_credentials::User;
use crate::core_sftpcommand::handlers::dispatch_command;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;
use crate::Config;
use anyhow::Result;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// Accepts connections on an already-bound listener and serves each one
/// on its own task. Runs until the listener itself fails.
pub async fn serve(
    listener: TcpListener,
    config: Arc<Config>,
    users: Arc<Vec<User>>,
) -> Result<()> {
    loop {
        let (socket, addr) = listener.accept().await?;
        info!("New connection from {}", addr);

        let config = Arc::clone(&config);
        let users = Arc::clone(&users);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, config, users).await {
                warn!("Connection error for {}: {}", addr, e);
            }
            debug!("Connection closed for {}", addr);
        });
    }
}

/// Drives one client from greeting to disconnect.
///
/// Every connection gets its own `Session`, so no state is shared between
/// clients beyond the read-only config and user list.
pub async fn handle_connection(
    socket: TcpStream,
    config: Arc<Config>,
    users: Arc<Vec<User>>,
) -> Result<(), ChannelError> {
    let mut channel = Channel::new(socket);
    let host = config.server.server_name.clone();

    if config.server.out_to_lunch {
        channel
            .write_line(&format!("-{} Out to Lunch", host))
            .await?;
        return Ok(());
    }

    let mut session = match Session::new(&config, Arc::clone(&users)) {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to open server directory: {}", e);
            channel
                .write_line(&format!("-{} Error with SFTP Service", host))
                .await?;
            return Ok(());
        }
    };

    channel
        .write_line(&format!("+{} SFTP Service", host))
        .await?;

    loop {
        let line = match channel.read_line().await? {
            Some(line) => line,
            None => {
                debug!("Client hung up without DONE");
                break;
            }
        };

        dispatch_command(&mut channel, &config, &mut session, &line).await?;

        if session.closed {
            break;
        }
    }

    Ok(())
}
