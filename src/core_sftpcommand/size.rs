use std::sync::Arc;

use log::{info, warn};

use crate::config::Config;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

/// Handles the SIZE command.
///
/// Second half of an upload. The announced byte count is parsed and run
/// through admission: a store must be armed and the size must fit the
/// configured cap and the disk. A rejected SIZE consumes no payload bytes,
/// so the next line off the wire parses as a command. An admitted one is
/// answered with `+ok, waiting for file`, after which exactly that many
/// raw bytes are read and saved; the save result is the second response.
///
/// # Arguments
///
/// * `channel` - The connection the payload arrives on.
/// * `_config` - A shared server configuration (not used in this command).
/// * `session` - The session owning the armed store.
/// * `arg` - The announced byte count, still unparsed.
///
/// # Returns
///
/// Result<(), ChannelError> indicating whether the exchange completed.
pub async fn handle_size_command(
    channel: &mut Channel,
    _config: &Arc<Config>,
    session: &mut Session,
    arg: &str,
) -> Result<(), ChannelError> {
    let size: u64 = match arg.parse() {
        Ok(size) => size,
        Err(_) => {
            warn!("SIZE with a malformed byte count: {}", arg);
            return channel.write_line("-Size is invalid").await;
        }
    };

    if let Err(err) = session.fs.admit_transfer(size) {
        warn!("SIZE {} refused: {}", size, err);
        return channel.write_line(&err.to_wire_response()).await;
    }
    channel.write_line("+ok, waiting for file").await?;

    // the peer now owes exactly `size` raw bytes
    let payload = channel.read_exact_bytes(size, None).await?;
    let response = match session.fs.save_incoming(&payload).await {
        Ok(path) => format!("+Saved {}", path.display()),
        Err(err) => err.to_wire_response(),
    };
    info!("SIZE {}: {}", size, response);
    channel.write_line(&response).await
}
