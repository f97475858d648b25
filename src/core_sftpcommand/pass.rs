use std::sync::Arc;

use log::info;

use crate::config::Config;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

/// Handles the PASS command.
///
/// Submits the password for the selected account. The password itself is
/// kept out of the logs.
pub async fn handle_pass_command(
    channel: &mut Channel,
    _config: &Arc<Config>,
    session: &mut Session,
    arg: &str,
) -> Result<(), ChannelError> {
    let response = session.credentials.submit_password(arg);
    info!("PASS: {}", response);
    channel.write_line(&response).await
}
