use std::sync::Arc;

use log::{info, warn};

use crate::config::Config;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

/// Handles the NAME command.
///
/// First half of a rename: checks the file exists in the working directory
/// and stages it for the TOBE that should follow. A failed check clears
/// any stage left by an earlier NAME.
pub async fn handle_name_command(
    channel: &mut Channel,
    _config: &Arc<Config>,
    session: &mut Session,
    arg: &str,
) -> Result<(), ChannelError> {
    match session.fs.check_file_name(arg).await {
        Ok(()) => {
            info!("NAME staged {}", arg);
            channel.write_line("+File exists").await
        }
        Err(err) => {
            warn!("NAME {} refused: {}", arg, err);
            channel.write_line(&err.to_wire_response()).await
        }
    }
}
