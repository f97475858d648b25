// src/constants.rs

use std::time::Duration;

pub const DEFAULT_LISTEN_PORT: u16 = 6789;

/// Cap on the `new_<i>_<name>` generation counter for STOR NEW.
pub const DEFAULT_DUPLICATE_LIMIT: u32 = 10_000;

/// Chunk size for streaming file payloads over the control connection.
pub const TRANSFER_CHUNK_SIZE: usize = 8192;

/// Upper bound on one command or response line, terminator included. A
/// peer that keeps streaming bytes without a newline is cut off with a
/// transport error instead of growing the line buffer forever.
pub const MAX_LINE_LENGTH: usize = 4096;

/// Idle timeout applied by the receiving client while draining a
/// negotiated-size payload. The server side reads without one.
pub const RECEIVE_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timestamp layout used by LIST in verbose mode.
pub const LIST_TIMESTAMP_FORMAT: &str = "%H:%M:%S %d/%m/%Y";

/// Marker that classifies a file name as text. Matched as a substring
/// of the name rather than a suffix; text names are stored under
/// TEXT_SUBDIR, everything else lands in OTHER_SUBDIR.
pub const TEXT_FILE_EXTENSION: &str = ".txt";
pub const TEXT_SUBDIR: &str = "text";
pub const OTHER_SUBDIR: &str = "other";
