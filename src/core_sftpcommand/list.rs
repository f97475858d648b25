use std::sync::Arc;

use log::warn;

use crate::config::Config;
use crate::core_filesystem::ListMode;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

/// Handles the LIST command.
///
/// A successful listing is a multi-line body: the `+Contents` line, one
/// indented line per entry, and a blank line closing the body. Failures
/// are a single `-` line with no terminator, so the peer can stop reading
/// after the first line when it starts with `-`.
///
/// # Arguments
///
/// * `channel` - The connection to answer on.
/// * `_config` - A shared server configuration (not used in this command).
/// * `session` - The session owning the file-system cursor.
/// * `mode` - Standard (`F`) or verbose (`V`) formatting.
/// * `dir` - Directory to list, relative to the working directory; empty
///   means the working directory itself.
///
/// # Returns
///
/// Result<(), ChannelError> indicating whether the response reached the peer.
pub async fn handle_list_command(
    channel: &mut Channel,
    _config: &Arc<Config>,
    session: &mut Session,
    mode: ListMode,
    dir: &str,
) -> Result<(), ChannelError> {
    match session.fs.list_directory(dir, mode).await {
        Ok(entries) => {
            channel.write_line("+Contents").await?;
            for entry in &entries {
                channel.write_line(entry).await?;
            }
            channel.write_line("").await
        }
        Err(err) => {
            warn!("LIST {:?} {} refused: {}", mode, dir, err);
            channel.write_line(&err.to_wire_response()).await
        }
    }
}
