use std::sync::Arc;

use log::{info, warn};

use crate::config::Config;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

/// Handles the RETR command.
///
/// Stages a file for transfer to the peer and answers with its byte length
/// as a bare number. The peer decides with SEND or STOP; until then the
/// file stays staged.
///
/// # Arguments
///
/// * `channel` - The connection to answer on.
/// * `_config` - A shared server configuration (not used in this command).
/// * `session` - The session owning the staged transfer.
/// * `arg` - The file to stage, relative to the working directory.
///
/// # Returns
///
/// Result<(), ChannelError> indicating whether the response reached the peer.
pub async fn handle_retr_command(
    channel: &mut Channel,
    _config: &Arc<Config>,
    session: &mut Session,
    arg: &str,
) -> Result<(), ChannelError> {
    match session.fs.stage_send(arg).await {
        Ok(size) => {
            info!("RETR staged {} ({} bytes)", arg, size);
            channel.write_line(&size.to_string()).await
        }
        Err(err) => {
            warn!("RETR {} refused: {}", arg, err);
            channel.write_line(&err.to_wire_response()).await
        }
    }
}
