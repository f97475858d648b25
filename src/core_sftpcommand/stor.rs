use std::sync::Arc;

use log::info;

use crate::config::Config;
use crate::core_filesystem::StoreMode;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

/// Handles the STOR command.
///
/// First half of an upload: arms the store operation and answers what the
/// save will do, based on whether the name already exists in its
/// classified location. Nothing is written yet; the write happens after
/// the SIZE that should follow is admitted and its payload arrives.
///
/// # Arguments
///
/// * `channel` - The connection to answer on.
/// * `_config` - A shared server configuration (not used in this command).
/// * `session` - The session owning the armed store.
/// * `mode` - NEW, OLD or APP save semantics.
/// * `name` - Bare file name the payload will be stored under.
///
/// # Returns
///
/// Result<(), ChannelError> indicating whether the response reached the peer.
pub async fn handle_stor_command(
    channel: &mut Channel,
    _config: &Arc<Config>,
    session: &mut Session,
    mode: StoreMode,
    name: &str,
) -> Result<(), ChannelError> {
    let exists = session.fs.preview_store(name, mode).await;
    let response = match (mode, exists) {
        (StoreMode::New, true) => "+File exists, will create new generation of file",
        (StoreMode::New, false) => "+File does not exist, will create new file",
        (StoreMode::Old, true) => "+Will write over old file",
        (StoreMode::Old, false) => "+Will create new file",
        (StoreMode::App, true) => "+Will append to file",
        (StoreMode::App, false) => "+Will create file",
    };
    info!("STOR {:?} {} armed (exists: {})", mode, name, exists);
    channel.write_line(response).await
}
