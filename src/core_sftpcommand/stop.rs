use std::sync::Arc;

use log::info;

use crate::config::Config;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

/// Handles the STOP command.
///
/// Cancels a transfer staged by RETR, typically because the peer decided
/// it has no room for the reported size.
pub async fn handle_stop_command(
    channel: &mut Channel,
    _config: &Arc<Config>,
    session: &mut Session,
) -> Result<(), ChannelError> {
    match session.fs.cancel_send() {
        Ok(()) => {
            info!("STOP cancelled the staged transfer");
            channel.write_line("+ok, RETR aborted").await
        }
        Err(err) => channel.write_line(&err.to_wire_response()).await,
    }
}
