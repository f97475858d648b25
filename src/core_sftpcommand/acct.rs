use std::sync::Arc;

use log::info;

use crate::config::Config;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

/// Handles the ACCT command.
///
/// Selects an account under the chosen user-id. The reserved root account
/// completes the login immediately; any other account asks for a password.
pub async fn handle_acct_command(
    channel: &mut Channel,
    _config: &Arc<Config>,
    session: &mut Session,
    arg: &str,
) -> Result<(), ChannelError> {
    let response = session.credentials.select_account(arg);
    info!("ACCT {}: {}", arg, response);
    channel.write_line(&response).await
}
