pub mod config;
pub mod constants;
pub mod core_cli;
pub mod core_client;
pub mod core_credentials;
pub mod core_filesystem;
pub mod core_network;
pub mod core_sftpcommand;
pub mod core_transport;
pub mod server;
pub mod session;

pub use config::Config;
