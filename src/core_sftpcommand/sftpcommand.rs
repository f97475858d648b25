use crate::core_filesystem::{ListMode, StoreMode};

/// The verbs of the protocol. Matching is exact; lowercase spellings are
/// unknown commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SftpVerb {
    USER,
    ACCT,
    PASS,
    TYPE,
    CDIR,
    LIST,
    NAME,
    TOBE,
    KILL,
    RETR,
    SEND,
    STOP,
    STOR,
    SIZE,
    DONE,
}

impl SftpVerb {
    pub fn parse(token: &str) -> Option<SftpVerb> {
        match token {
            "USER" => Some(SftpVerb::USER),
            "ACCT" => Some(SftpVerb::ACCT),
            "PASS" => Some(SftpVerb::PASS),
            "TYPE" => Some(SftpVerb::TYPE),
            "CDIR" => Some(SftpVerb::CDIR),
            "LIST" => Some(SftpVerb::LIST),
            "NAME" => Some(SftpVerb::NAME),
            "TOBE" => Some(SftpVerb::TOBE),
            "KILL" => Some(SftpVerb::KILL),
            "RETR" => Some(SftpVerb::RETR),
            "SEND" => Some(SftpVerb::SEND),
            "STOP" => Some(SftpVerb::STOP),
            "STOR" => Some(SftpVerb::STOR),
            "SIZE" => Some(SftpVerb::SIZE),
            "DONE" => Some(SftpVerb::DONE),
            _ => None,
        }
    }

    /// Everything past the login handshake needs a completed login.
    pub fn requires_login(&self) -> bool {
        !matches!(
            self,
            SftpVerb::USER | SftpVerb::ACCT | SftpVerb::PASS | SftpVerb::DONE
        )
    }
}

/// A fully validated command line: verb plus checked arguments, ready to
/// hand to its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SftpCommand {
    User(String),
    Acct(String),
    Pass(String),
    Type(String),
    Cdir(String),
    List(ListMode, String),
    Name(String),
    Tobe(String),
    Kill(String),
    Retr(String),
    Send,
    Stop,
    Stor(StoreMode, String),
    Size(String),
    Done,
}

impl SftpCommand {
    /// Checks arity and argument shape for `verb` against the grammar.
    /// `None` means the line is answered with `-Invalid command`. The TYPE
    /// letter and the SIZE number are deliberately not checked here; their
    /// handlers answer with their own diagnostics.
    pub fn validate(verb: SftpVerb, args: &[&str]) -> Option<SftpCommand> {
        match verb {
            SftpVerb::USER => one_arg(args).map(SftpCommand::User),
            SftpVerb::ACCT => one_arg(args).map(SftpCommand::Acct),
            SftpVerb::PASS => one_arg(args).map(SftpCommand::Pass),
            SftpVerb::TYPE => one_arg(args).map(SftpCommand::Type),
            SftpVerb::CDIR => one_arg(args).map(SftpCommand::Cdir),
            SftpVerb::NAME => one_arg(args).map(SftpCommand::Name),
            SftpVerb::TOBE => one_arg(args).map(SftpCommand::Tobe),
            SftpVerb::KILL => one_arg(args).map(SftpCommand::Kill),
            SftpVerb::RETR => one_arg(args).map(SftpCommand::Retr),
            SftpVerb::SIZE => one_arg(args).map(SftpCommand::Size),
            SftpVerb::SEND => args.is_empty().then_some(SftpCommand::Send),
            SftpVerb::STOP => args.is_empty().then_some(SftpCommand::Stop),
            SftpVerb::DONE => args.is_empty().then_some(SftpCommand::Done),
            SftpVerb::LIST => {
                if args.is_empty() || args.len() > 2 {
                    return None;
                }
                let mode = ListMode::parse(args[0])?;
                let dir = args.get(1).unwrap_or(&"").to_string();
                Some(SftpCommand::List(mode, dir))
            }
            SftpVerb::STOR => {
                if args.len() != 2 {
                    return None;
                }
                let mode = StoreMode::parse(args[0])?;
                if !is_bare_file_name(args[1]) {
                    return None;
                }
                Some(SftpCommand::Stor(mode, args[1].to_string()))
            }
        }
    }
}

fn one_arg(args: &[&str]) -> Option<String> {
    if args.len() == 1 {
        Some(args[0].to_string())
    } else {
        None
    }
}

/// Stored files are routed by bare name into the classified subtrees, so a
/// STOR name with path separators or dot components has no meaning.
fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && name != "."
        && name != ".."
}
