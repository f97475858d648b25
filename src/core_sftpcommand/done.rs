use std::sync::Arc;

use log::{debug, info};

use crate::config::Config;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

/// Handles the DONE command.
///
/// Says goodbye, half-closes the transport so the peer sees a clean EOF
/// after the farewell line, and marks the session closed.
pub async fn handle_done_command(
    channel: &mut Channel,
    config: &Arc<Config>,
    session: &mut Session,
) -> Result<(), ChannelError> {
    let response = format!(
        "+ Thanks for using {} SFTP Service. Goodbye!",
        config.server.server_name
    );
    channel.write_line(&response).await?;
    if let Err(err) = channel.shutdown().await {
        debug!("shutdown after DONE: {}", err);
    }
    session.closed = true;
    info!("session closed by DONE");
    Ok(())
}
