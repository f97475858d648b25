use crate::constants::{RECEIVE_IDLE_TIMEOUT, TRANSFER_CHUNK_SIZE};
use crate::core_transport::{Channel, ChannelError};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Stdin};
use tokio::net::TcpStream;

/// Interactive front end for the simple file transfer protocol.
///
/// The session forwards typed commands verbatim and only inspects the
/// handful of exchanges that change how the next bytes on the wire must
/// be read: RETR answers with a bare size line, SEND answers with a raw
/// payload before its confirmation, and an admitted STOR expects the
/// local file to be streamed next.
pub struct ClientSession {
    channel: Channel,
    client_dir: PathBuf,
    /// Next server line is the bare byte count of a staged RETR.
    expect_size_reply: bool,
    /// Name and size the next SEND payload will be written under.
    receive_name: Option<String>,
    receive_size: u64,
    expect_payload: bool,
    /// Local file checked during STOR, streamed once the server admits it.
    file_to_send: Option<PathBuf>,
    send_file_next: bool,
    exit: bool,
}

impl ClientSession {
    /// Connects to the server and reads the greeting line.
    pub async fn connect(host: &str, port: u16, client_dir: &Path) -> Result<Self> {
        fs::create_dir_all(client_dir)
            .with_context(|| format!("Failed to create {}", client_dir.display()))?;

        let socket = TcpStream::connect((host, port))
            .await
            .with_context(|| format!("Failed to connect to {}:{}", host, port))?;
        info!("Connected to {}:{}", host, port);

        let mut session = Self {
            channel: Channel::new(socket),
            client_dir: client_dir.to_path_buf(),
            expect_size_reply: false,
            receive_name: None,
            receive_size: 0,
            expect_payload: false,
            file_to_send: None,
            send_file_next: false,
            exit: false,
        };
        session.read_server_response().await?;
        Ok(session)
    }

    /// Prompts for commands until the server says goodbye or the
    /// connection drops.
    pub async fn run(&mut self) -> Result<()> {
        let mut input = BufReader::new(tokio::io::stdin());

        while !self.exit {
            if self.send_file_next {
                self.stream_staged_file().await?;
                self.read_server_response().await?;
                continue;
            }

            let line = match read_user_line(&mut input).await? {
                Some(line) => line,
                None => break,
            };

            if let Some(request) = self.prepare_request(&line) {
                self.channel.write_line(&request).await?;
                self.read_server_response().await?;
            }
        }

        self.channel.shutdown().await.ok();
        Ok(())
    }

    /// Validates a typed command locally and arms the matching response
    /// expectation. Returns `None` when nothing should be sent.
    fn prepare_request(&mut self, line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        match parts.as_slice() {
            ["STOR", _, name] => {
                let path = self.client_dir.join(name);
                if path.is_file() {
                    self.file_to_send = Some(path);
                } else {
                    self.file_to_send = None;
                    println!("Error: File does not exist on Client System. Try again");
                    return None;
                }
            }
            ["RETR", name] => {
                self.expect_size_reply = true;
                self.receive_name = Some((*name).to_string());
            }
            ["SEND"] => {
                if self.receive_name.is_some() {
                    self.expect_payload = true;
                }
            }
            ["SIZE"] => {
                // Bare SIZE after a checked STOR fills in the local length.
                if let Some(path) = &self.file_to_send {
                    let len = fs::metadata(path).map_or(0, |meta| meta.len());
                    return Some(format!("SIZE {}", len));
                }
            }
            _ => {}
        }

        Some(trimmed.to_string())
    }

    /// Receives whatever the last request makes the server send next: an
    /// optional raw payload, then the response line, then any listing
    /// body closed by a blank line.
    async fn read_server_response(&mut self) -> Result<(), ChannelError> {
        if self.expect_payload {
            self.receive_staged_payload().await?;
        }

        let response = match self.channel.read_line().await? {
            Some(response) => response,
            None => {
                println!("Server closed the connection");
                self.exit = true;
                return Ok(());
            }
        };
        println!("Server response: {}", response);
        self.note_response(&response);

        if response == "+Contents" {
            self.read_listing_body().await?;
        }

        Ok(())
    }

    /// Drains the negotiated SEND payload into the client directory.
    async fn receive_staged_payload(&mut self) -> Result<(), ChannelError> {
        self.expect_payload = false;
        let name = match self.receive_name.take() {
            Some(name) => name,
            None => return Ok(()),
        };

        let bytes = self
            .channel
            .read_exact_bytes(self.receive_size, Some(RECEIVE_IDLE_TIMEOUT))
            .await?;
        if (bytes.len() as u64) < self.receive_size {
            warn!(
                "Transfer stalled at {} of {} bytes",
                bytes.len(),
                self.receive_size
            );
        }

        let path = self.client_dir.join(&name);
        match fs::write(&path, &bytes) {
            Ok(()) => info!("Wrote {} bytes to {}", bytes.len(), path.display()),
            Err(e) => println!("Error: could not write {}: {}", path.display(), e),
        }
        Ok(())
    }

    /// Prints the remaining lines of a listing until the blank terminator.
    async fn read_listing_body(&mut self) -> Result<(), ChannelError> {
        while let Some(line) = self.channel.read_line().await? {
            if line.is_empty() {
                break;
            }
            println!("{}", line);
        }
        Ok(())
    }

    /// Streams the file checked during STOR after the server's go-ahead.
    async fn stream_staged_file(&mut self) -> Result<(), ChannelError> {
        self.send_file_next = false;
        let path = match self.file_to_send.take() {
            Some(path) => path,
            None => return Ok(()),
        };

        let mut file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) => {
                // Server is already blocked reading the payload; closing
                // the connection is the only way to unstick it.
                println!("Error: could not reopen {}: {}", path.display(), e);
                self.exit = true;
                return Ok(());
            }
        };

        let mut buffer = vec![0u8; TRANSFER_CHUNK_SIZE];
        loop {
            let n = file.read(&mut buffer).await.map_err(ChannelError::from)?;
            if n == 0 {
                break;
            }
            self.channel.write_bytes(&buffer[..n]).await?;
        }
        debug!("Streamed {} to server", path.display());
        Ok(())
    }

    /// Updates the protocol expectations from a response line.
    fn note_response(&mut self, response: &str) {
        if response.starts_with('-') {
            if response.contains("Lunch") {
                self.exit = true;
            } else if self.expect_size_reply {
                self.expect_size_reply = false;
                self.receive_name = None;
            }
            return;
        }

        if response.contains("Goodbye") {
            self.exit = true;
        } else if self.expect_size_reply {
            self.expect_size_reply = false;
            match response.trim().parse::<u64>() {
                Ok(size) => self.receive_size = size,
                Err(_) => {
                    println!("Error: expected a file size, got {:?}", response);
                    self.receive_name = None;
                }
            }
        } else if response.contains("+ok, waiting for file") {
            self.send_file_next = true;
        } else if response.contains("+ok, RETR aborted") && self.receive_name.is_some() {
            self.expect_payload = false;
            self.receive_name = None;
        }
    }
}

/// Reads one command from the terminal; `None` means stdin is closed.
async fn read_user_line(input: &mut BufReader<Stdin>) -> Result<Option<String>> {
    print!("Input command: ");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    let n = input
        .read_line(&mut line)
        .await
        .context("Failed to read from stdin")?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
