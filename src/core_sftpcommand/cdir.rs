use std::sync::Arc;

use log::{info, warn};

use crate::config::Config;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

/// Handles the CDIR command.
///
/// Moves the session's working directory. `..` climbs one level, `/` jumps
/// back to the served root, anything else resolves relative to the current
/// directory. The cursor never leaves the served tree: a target that
/// resolves outside it is rejected and the cursor stays put.
///
/// # Arguments
///
/// * `channel` - The connection to answer on.
/// * `_config` - A shared server configuration (not used in this command).
/// * `session` - The session owning the file-system cursor.
/// * `arg` - The directory to change to.
///
/// # Returns
///
/// Result<(), ChannelError> indicating whether the response reached the peer.
pub async fn handle_cdir_command(
    channel: &mut Channel,
    _config: &Arc<Config>,
    session: &mut Session,
    arg: &str,
) -> Result<(), ChannelError> {
    match session.fs.change_directory(arg).await {
        Ok(path) => {
            info!("CDIR to {}", path.display());
            channel
                .write_line(&format!("!Changed working dir to {}", path.display()))
                .await
        }
        Err(err) => {
            warn!("CDIR {} refused: {}", arg, err);
            channel.write_line(&err.to_wire_response()).await
        }
    }
}
