use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DUPLICATE_LIMIT, DEFAULT_LISTEN_PORT};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub listen_port: u16,
    /// Host name announced in the greeting and goodbye lines.
    pub server_name: String,
    /// Installation root; the server and client working trees live below it.
    pub root_dir: String,
    /// Server sandbox, relative to `root_dir`.
    pub server_dir: String,
    /// Client download directory, relative to `root_dir`.
    pub client_dir: String,
    /// Credential table, relative to the process working directory.
    pub users_file: String,
    pub max_upload_size: Option<u64>, // Optional; None means no size cap
    pub duplicate_limit: Option<u32>, // Optional to allow default value
    #[serde(default)]
    pub bypass_login: bool,
    #[serde(default)]
    pub out_to_lunch: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: DEFAULT_LISTEN_PORT,
            server_name: String::from("rouillesftpd"),
            root_dir: String::from("resources"),
            server_dir: String::from("sftp.server"),
            client_dir: String::from("sftp.client"),
            users_file: String::from("etc/users.csv"),
            max_upload_size: Some(10 * 1024 * 1024), // Default 10 MiB
            duplicate_limit: Some(DEFAULT_DUPLICATE_LIMIT),
            bypass_login: false,
            out_to_lunch: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Effective generation cap for STOR NEW collision handling.
    pub fn duplicate_limit(&self) -> u32 {
        self.server.duplicate_limit.unwrap_or(DEFAULT_DUPLICATE_LIMIT)
    }
}
