use std::sync::Arc;

use log::info;

use crate::config::Config;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

/// Handles the USER command.
///
/// Looks the user-id up in the credential table and answers with the next
/// step of the login handshake. The admin user is logged in on the spot; a
/// regular user is asked for an account and password.
///
/// # Arguments
///
/// * `channel` - The connection to answer on.
/// * `_config` - A shared server configuration (not used in this command).
/// * `session` - The session owning the login state.
/// * `arg` - The user-id to select.
///
/// # Returns
///
/// Result<(), ChannelError> indicating whether the response reached the peer.
pub async fn handle_user_command(
    channel: &mut Channel,
    _config: &Arc<Config>,
    session: &mut Session,
    arg: &str,
) -> Result<(), ChannelError> {
    let response = session.credentials.select_user(arg);
    info!("USER {}: {}", arg, response);
    channel.write_line(&response).await
}
