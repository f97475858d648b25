use std::sync::Arc;

use log::{debug, warn};

use crate::config::Config;
use crate::core_transport::{Channel, ChannelError};
use crate::session::Session;

use super::sftpcommand::{SftpCommand, SftpVerb};
use super::{
    acct, cdir, done, kill, list, name, pass, retr, send, size, stop, stor, tobe, type_, user,
};

/// Runs one command line through gating, validation and its handler.
///
/// Order matters here: an unknown verb is rejected first, USER and DONE run
/// unconditionally, anything else needs a selected user, operational verbs
/// additionally need a completed login, and only then are the arguments
/// themselves checked. A blank line is ignored without a response.
pub async fn dispatch_command(
    channel: &mut Channel,
    config: &Arc<Config>,
    session: &mut Session,
    line: &str,
) -> Result<(), ChannelError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let first = match tokens.first() {
        Some(first) => *first,
        None => return Ok(()),
    };

    let verb = match SftpVerb::parse(first) {
        Some(verb) => verb,
        None => {
            debug!("unknown command: {}", first);
            return channel.write_line("-Invalid command").await;
        }
    };

    if !matches!(verb, SftpVerb::USER | SftpVerb::DONE)
        && !session.credentials.is_user_selected()
    {
        return channel.write_line("-No User-id selected").await;
    }

    if verb.requires_login() && !session.credentials.is_logged_in() {
        // a stray payload must never follow a STOR the login no longer covers
        session.fs.clear_pending_store();
        return channel.write_line("- No Login found").await;
    }

    let command = match SftpCommand::validate(verb, &tokens[1..]) {
        Some(command) => command,
        None => {
            warn!("malformed {:?} command: {:?}", verb, line);
            return channel.write_line("-Invalid command").await;
        }
    };

    match command {
        SftpCommand::User(arg) => user::handle_user_command(channel, config, session, &arg).await,
        SftpCommand::Acct(arg) => acct::handle_acct_command(channel, config, session, &arg).await,
        SftpCommand::Pass(arg) => pass::handle_pass_command(channel, config, session, &arg).await,
        SftpCommand::Type(arg) => type_::handle_type_command(channel, config, session, &arg).await,
        SftpCommand::Cdir(arg) => cdir::handle_cdir_command(channel, config, session, &arg).await,
        SftpCommand::List(mode, dir) => {
            list::handle_list_command(channel, config, session, mode, &dir).await
        }
        SftpCommand::Name(arg) => name::handle_name_command(channel, config, session, &arg).await,
        SftpCommand::Tobe(arg) => tobe::handle_tobe_command(channel, config, session, &arg).await,
        SftpCommand::Kill(arg) => kill::handle_kill_command(channel, config, session, &arg).await,
        SftpCommand::Retr(arg) => retr::handle_retr_command(channel, config, session, &arg).await,
        SftpCommand::Send => send::handle_send_command(channel, config, session).await,
        SftpCommand::Stop => stop::handle_stop_command(channel, config, session).await,
        SftpCommand::Stor(mode, name) => {
            stor::handle_stor_command(channel, config, session, mode, &name).await
        }
        SftpCommand::Size(arg) => size::handle_size_command(channel, config, session, &arg).await,
        SftpCommand::Done => done::handle_done_command(channel, config, session).await,
    }
}
