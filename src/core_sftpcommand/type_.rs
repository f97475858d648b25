use std::sync::Arc;

use log::info;

use crate::config::Config;
use crate::core_transport::{Channel, ChannelError};
use crate::session::{Session, TransmissionMode};

/// Handles the TYPE command.
///
/// Switches the session between Ascii, Binary and Continuous mode. The
/// letter is checked here rather than in the grammar so an unknown one
/// gets its own diagnostic instead of `-Invalid command`.
pub async fn handle_type_command(
    channel: &mut Channel,
    _config: &Arc<Config>,
    session: &mut Session,
    arg: &str,
) -> Result<(), ChannelError> {
    let response = match arg {
        "A" => {
            session.transmission = TransmissionMode::Ascii;
            "+Using Ascii mode"
        }
        "B" => {
            session.transmission = TransmissionMode::Binary;
            "+Using Binary mode"
        }
        "C" => {
            session.transmission = TransmissionMode::Continuous;
            "+Using Continuous mode"
        }
        _ => "-Type not valid",
    };
    info!("TYPE {}: {}", arg, response);
    channel.write_line(response).await
}
