use std::sync::Arc;

use log::{info, warn};

use crate::config::Config;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

/// Handles the TOBE command.
///
/// Second half of a rename: renames the file staged by NAME. The stage is
/// consumed whatever the outcome, so another rename starts over with NAME.
pub async fn handle_tobe_command(
    channel: &mut Channel,
    _config: &Arc<Config>,
    session: &mut Session,
    arg: &str,
) -> Result<(), ChannelError> {
    match session.fs.change_file_name(arg).await {
        Ok((old_path, new_path)) => {
            info!("TOBE renamed {} to {}", old_path.display(), new_path.display());
            channel
                .write_line(&format!(
                    "+{} renamed to {}",
                    old_path.display(),
                    new_path.display()
                ))
                .await
        }
        Err(err) => {
            warn!("TOBE {} refused: {}", arg, err);
            channel.write_line(&err.to_wire_response()).await
        }
    }
}
