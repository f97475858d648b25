use std::sync::Arc;

use log::{info, warn};

use crate::config::Config;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

/// Handles the KILL command.
///
/// Deletes a file from the working directory, reporting "does not exist"
/// separately from a failed delete.
pub async fn handle_kill_command(
    channel: &mut Channel,
    _config: &Arc<Config>,
    session: &mut Session,
    arg: &str,
) -> Result<(), ChannelError> {
    match session.fs.delete_file(arg).await {
        Ok(deleted) => {
            info!("KILL removed {}", deleted);
            channel.write_line(&format!("+{} deleted", deleted)).await
        }
        Err(err) => {
            warn!("KILL {} refused: {}", arg, err);
            channel.write_line(&err.to_wire_response()).await
        }
    }
}
