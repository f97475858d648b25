use std::sync::Arc;

use log::{error, info};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::config::Config;
use crate::constants::TRANSFER_CHUNK_SIZE;
use crate::core_filesystem::FsError;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

/// Handles the SEND command.
///
/// Streams the file staged by RETR as raw bytes, then confirms with a
/// response line. The stream carries no framing of its own; the peer knows
/// how many bytes to expect from the RETR answer. The stage is consumed,
/// so a second SEND needs a fresh RETR.
///
/// # Arguments
///
/// * `channel` - The connection to stream on.
/// * `_config` - A shared server configuration (not used in this command).
/// * `session` - The session owning the staged transfer.
///
/// # Returns
///
/// Result<(), ChannelError> indicating whether the transfer reached the peer.
pub async fn handle_send_command(
    channel: &mut Channel,
    _config: &Arc<Config>,
    session: &mut Session,
) -> Result<(), ChannelError> {
    let path = match session.fs.take_send_file() {
        Some(path) => path,
        None => {
            return channel
                .write_line(&FsError::NothingStaged.to_wire_response())
                .await;
        }
    };

    let mut file = match File::open(&path).await {
        Ok(file) => file,
        Err(err) => {
            error!("staged file {} vanished before SEND: {}", path.display(), err);
            return channel
                .write_line(&FsError::NothingStaged.to_wire_response())
                .await;
        }
    };

    let mut buffer = vec![0; TRANSFER_CHUNK_SIZE];
    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        channel.write_bytes(&buffer[..read]).await?;
    }
    info!("SEND streamed {}", path.display());

    channel.write_line("+File Saved on Client's side").await
}
