use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::core_credentials::{CredentialStore, User};
use crate::core_filesystem::FileSystemView;

/// Transfer mode advertised via TYPE. Payloads always move as raw bytes;
/// the mode is session bookkeeping kept for protocol conformance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmissionMode {
    Ascii,
    Binary,
    Continuous,
}

impl Default for TransmissionMode {
    fn default() -> Self {
        TransmissionMode::Binary
    }
}

/// Everything one connection owns: login progress, the file-system cursor
/// and the transfer mode. Built on accept, dropped on DONE or on a
/// transport error. Nothing in here is shared between connections.
pub struct Session {
    pub transmission: TransmissionMode,
    pub credentials: CredentialStore,
    pub fs: FileSystemView,
    pub closed: bool,
}

impl Session {
    pub fn new(config: &Config, users: Arc<Vec<User>>) -> std::io::Result<Self> {
        let base_dir = PathBuf::from(&config.server.root_dir).join(&config.server.server_dir);
        let fs = FileSystemView::new(
            &base_dir,
            config.server.max_upload_size,
            config.duplicate_limit(),
        )?;
        Ok(Self {
            transmission: TransmissionMode::default(),
            credentials: CredentialStore::new(users, config.server.bypass_login),
            fs,
            closed: false,
        })
    }
}
