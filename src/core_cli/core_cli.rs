use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "rouillesftpd", about = "A simple file transfer server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Listen port, overrides the configuration file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Accept any credentials without checking the user file
    #[arg(short, long)]
    pub bypass_login: bool,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

/// Command-line arguments for the interactive client
#[derive(Parser, Debug)]
#[command(name = "rouillesftp", about = "An interactive simple file transfer client.")]
pub struct ClientCli {
    /// Server host to connect to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port to connect to
    #[arg(short, long, default_value_t = crate::constants::DEFAULT_LISTEN_PORT)]
    pub port: u16,

    /// Directory where retrieved files are written
    #[arg(short, long, default_value = "resources/sftp.client")]
    pub client_dir: String,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}
