use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Local, TimeZone};
use filetime::FileTime;
use log::debug;
use sysinfo::{DiskExt, System, SystemExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::error::FsError;
use crate::constants::{LIST_TIMESTAMP_FORMAT, OTHER_SUBDIR, TEXT_FILE_EXTENSION, TEXT_SUBDIR};

/// Listing flavor selected by the first LIST argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// `F`: names only.
    Standard,
    /// `V`: names plus creation, access and modification times.
    Verbose,
}

impl ListMode {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "F" => Some(ListMode::Standard),
            "V" => Some(ListMode::Verbose),
            _ => None,
        }
    }
}

/// Save semantics selected by the first STOR argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    New,
    Old,
    App,
}

impl StoreMode {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "NEW" => Some(StoreMode::New),
            "OLD" => Some(StoreMode::Old),
            "APP" => Some(StoreMode::App),
            _ => None,
        }
    }
}

/// A STOR waiting on its SIZE. `None` in the view below means no store is
/// armed, which is what makes "SIZE without STOR" detectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingStore {
    pub mode: StoreMode,
    pub name: String,
}

/// One session's cursor into the served tree. The current directory always
/// sits inside the canonicalized base; every argument that names a path is
/// resolved and checked against it before it is touched.
///
/// Incoming files never land in the current directory: they are routed by
/// name into the `text/` or `other/` subtree directly under the base.
pub struct FileSystemView {
    base_dir: PathBuf,
    current_dir: PathBuf,
    max_upload_size: Option<u64>,
    duplicate_limit: u32,
    pending_rename: Option<String>,
    staged_send: Option<PathBuf>,
    pending_store: Option<PendingStore>,
}

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

impl FileSystemView {
    pub fn new(
        base_dir: &Path,
        max_upload_size: Option<u64>,
        duplicate_limit: u32,
    ) -> std::io::Result<Self> {
        let base_dir = std::fs::canonicalize(base_dir)?;
        Ok(Self {
            current_dir: base_dir.clone(),
            base_dir,
            max_upload_size,
            duplicate_limit,
            pending_rename: None,
            staged_send: None,
            pending_store: None,
        })
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn pending_store(&self) -> Option<&PendingStore> {
        self.pending_store.as_ref()
    }

    /// Drops a staged store without saving anything. Used when the session
    /// loses its login before the SIZE arrives.
    pub fn clear_pending_store(&mut self) {
        self.pending_store = None;
    }

    /// LIST: sorted entries of `dir` relative to the current directory.
    /// Directories carry a `/` suffix; verbose mode appends the three
    /// timestamps per entry.
    pub async fn list_directory(&self, dir: &str, mode: ListMode) -> Result<Vec<String>, FsError> {
        let target = if dir.is_empty() {
            self.current_dir.clone()
        } else {
            self.current_dir.join(dir)
        };
        let resolved = fs::canonicalize(&target)
            .await
            .map_err(|_| FsError::InvalidDirectory)?;
        if !resolved.starts_with(&self.base_dir) {
            return Err(FsError::InvalidDirectory);
        }

        let mut reader = fs::read_dir(&resolved)
            .await
            .map_err(|_| FsError::InvalidDirectory)?;
        let mut names: Vec<(String, bool)> = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|_| FsError::InvalidDirectory)?
        {
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(_) => continue,
            };
            names.push((
                entry.file_name().to_string_lossy().into_owned(),
                file_type.is_dir(),
            ));
        }
        names.sort();

        match mode {
            ListMode::Standard => Ok(names
                .into_iter()
                .map(|(name, is_dir)| {
                    if is_dir {
                        format!("    {}/", name)
                    } else {
                        format!("    {}", name)
                    }
                })
                .collect()),
            ListMode::Verbose => {
                let mut lines = Vec::new();
                for (name, is_dir) in names {
                    let metadata = match fs::metadata(resolved.join(&name)).await {
                        Ok(metadata) => metadata,
                        Err(_) => continue,
                    };
                    let prefix = if is_dir {
                        format!("    {}/ ", name)
                    } else {
                        format!("    {}  ", name)
                    };
                    lines.push(format!("{}{}", prefix, verbose_stamps(&metadata)));
                }
                Ok(lines)
            }
        }
    }

    /// CDIR: `..` climbs, `/` jumps to the base, anything else resolves
    /// relative to the current directory. The cursor only moves to a
    /// directory whose canonical path stays inside the base.
    pub async fn change_directory(&mut self, dir: &str) -> Result<PathBuf, FsError> {
        let candidate = if dir == ".." || dir == "../" {
            match self.current_dir.parent() {
                Some(parent) => parent.to_path_buf(),
                None => return Err(FsError::OutsideSandbox),
            }
        } else if dir == "/" {
            self.base_dir.clone()
        } else {
            self.current_dir.join(dir)
        };

        let resolved = fs::canonicalize(&candidate)
            .await
            .map_err(|_| FsError::DirectoryMissing)?;
        if !resolved.starts_with(&self.base_dir) {
            return Err(FsError::OutsideSandbox);
        }
        let metadata = fs::metadata(&resolved)
            .await
            .map_err(|_| FsError::DirectoryMissing)?;
        if !metadata.is_dir() {
            return Err(FsError::DirectoryMissing);
        }

        self.current_dir = resolved.clone();
        Ok(resolved)
    }

    /// NAME: stages the rename source if it exists in the current
    /// directory. A failed check clears any earlier stage.
    pub async fn check_file_name(&mut self, name: &str) -> Result<(), FsError> {
        self.pending_rename = None;
        let resolved = fs::canonicalize(self.current_dir.join(name))
            .await
            .map_err(|_| FsError::RenameSourceMissing(name.to_string()))?;
        if !resolved.starts_with(&self.base_dir) {
            return Err(FsError::RenameSourceMissing(name.to_string()));
        }
        self.pending_rename = Some(name.to_string());
        Ok(())
    }

    /// TOBE: renames the staged source. The stage is consumed whatever the
    /// outcome, so a second TOBE needs a fresh NAME.
    pub async fn change_file_name(
        &mut self,
        new_name: &str,
    ) -> Result<(PathBuf, PathBuf), FsError> {
        let staged = self.pending_rename.take().ok_or(FsError::RenameNotStaged)?;
        let old_path = self.current_dir.join(&staged);
        let new_path = self.current_dir.join(new_name);

        let parent = new_path.parent().ok_or(FsError::RenameFailed)?;
        let parent = fs::canonicalize(parent)
            .await
            .map_err(|_| FsError::RenameFailed)?;
        if !parent.starts_with(&self.base_dir) {
            return Err(FsError::RenameFailed);
        }

        fs::rename(&old_path, &new_path)
            .await
            .map_err(|_| FsError::RenameFailed)?;
        Ok((old_path, new_path))
    }

    /// KILL: removes a file from the current directory and echoes the bare
    /// name that went away.
    pub async fn delete_file(&self, name: &str) -> Result<String, FsError> {
        let resolved = fs::canonicalize(self.current_dir.join(name))
            .await
            .map_err(|_| FsError::DeleteMissing)?;
        if !resolved.starts_with(&self.base_dir) {
            return Err(FsError::DeleteMissing);
        }
        let deleted = resolved
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or(FsError::DeleteFailed)?;
        fs::remove_file(&resolved)
            .await
            .map_err(|_| FsError::DeleteFailed)?;
        Ok(deleted)
    }

    /// RETR: stages the file for a later SEND and reports its byte length.
    /// A failed lookup clears any earlier stage.
    pub async fn stage_send(&mut self, name: &str) -> Result<u64, FsError> {
        self.staged_send = None;
        let resolved = fs::canonicalize(self.current_dir.join(name))
            .await
            .map_err(|_| FsError::SendFileMissing)?;
        if !resolved.starts_with(&self.base_dir) {
            return Err(FsError::SendFileMissing);
        }
        let metadata = fs::metadata(&resolved)
            .await
            .map_err(|_| FsError::SendFileMissing)?;
        if !metadata.is_file() {
            return Err(FsError::SendFileMissing);
        }
        self.staged_send = Some(resolved);
        Ok(metadata.len())
    }

    /// STOP: drops the staged send file.
    pub fn cancel_send(&mut self) -> Result<(), FsError> {
        if self.staged_send.take().is_some() {
            Ok(())
        } else {
            Err(FsError::NothingStaged)
        }
    }

    /// SEND: consumes the staged file.
    pub fn take_send_file(&mut self) -> Option<PathBuf> {
        self.staged_send.take()
    }

    /// STOR: arms the store operation and reports whether the name already
    /// exists in its classified location.
    pub async fn preview_store(&mut self, name: &str, mode: StoreMode) -> bool {
        let dest = self.classified_dir(name).join(name);
        self.pending_store = Some(PendingStore {
            mode,
            name: name.to_string(),
        });
        fs::metadata(&dest).await.is_ok()
    }

    /// SIZE: admits the announced transfer if a store is armed, the size
    /// sits under the configured cap, and the disk has room. Rejection
    /// disarms the store; admission leaves it armed for the payload.
    pub fn admit_transfer(&mut self, size: u64) -> Result<(), FsError> {
        if self.pending_store.is_none() {
            return Err(FsError::StoreNotArmed);
        }
        let within_cap = self.max_upload_size.map_or(true, |limit| size < limit);
        let disk_ok = disk_available_space(&self.base_dir).map_or(true, |free| free > size);
        if !within_cap || !disk_ok {
            self.pending_store = None;
            return Err(FsError::CapacityExceeded);
        }
        Ok(())
    }

    /// Saves an admitted payload under the armed store operation, which is
    /// consumed whatever happens. A name absent from its classified
    /// location is written fresh regardless of mode; otherwise NEW picks
    /// the first free `new_<i>_<name>` generation, OLD overwrites, and APP
    /// appends to text files only. Full-file writes go through a temp file
    /// and a rename, so a concurrent reader never sees half a payload.
    pub async fn save_incoming(&mut self, payload: &[u8]) -> Result<PathBuf, FsError> {
        let pending = self.pending_store.take().ok_or(FsError::StoreNotArmed)?;
        let dir = self.classified_dir(&pending.name);
        let dest = dir.join(&pending.name);

        if fs::metadata(&dest).await.is_err() {
            write_atomic(&dest, payload).await.map_err(FsError::Save)?;
            return Ok(dest);
        }

        match pending.mode {
            StoreMode::New => {
                for generation in 0..self.duplicate_limit {
                    let candidate = dir.join(format!("new_{}_{}", generation, pending.name));
                    if fs::metadata(&candidate).await.is_err() {
                        write_atomic(&candidate, payload)
                            .await
                            .map_err(FsError::Save)?;
                        return Ok(candidate);
                    }
                }
                Err(FsError::DuplicateLimitReached)
            }
            StoreMode::Old => {
                write_atomic(&dest, payload).await.map_err(FsError::Save)?;
                Ok(dest)
            }
            StoreMode::App => {
                if !pending.name.contains(TEXT_FILE_EXTENSION) {
                    return Err(FsError::NotTextFile);
                }
                let mut file = fs::OpenOptions::new()
                    .append(true)
                    .open(&dest)
                    .await
                    .map_err(FsError::Save)?;
                file.write_all(payload).await.map_err(FsError::Save)?;
                Ok(dest)
            }
        }
    }

    /// Destination subtree for an incoming name. The text marker is
    /// matched anywhere in the name, not just as a suffix, so a name
    /// like `bundle.txt.gz` still counts as text; the APP mode check in
    /// [`save_incoming`](Self::save_incoming) uses the same test.
    fn classified_dir(&self, name: &str) -> PathBuf {
        if name.contains(TEXT_FILE_EXTENSION) {
            self.base_dir.join(TEXT_SUBDIR)
        } else {
            self.base_dir.join(OTHER_SUBDIR)
        }
    }
}

/// Writes the payload next to its destination and renames it into place.
async fn write_atomic(dest: &Path, payload: &[u8]) -> std::io::Result<()> {
    let dir = dest.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "destination has no parent")
    })?;
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "destination has no name")
        })?;
    let temp = dir.join(format!(
        ".{}.{}.{}.tmp",
        name,
        std::process::id(),
        TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    fs::write(&temp, payload).await?;
    if let Err(err) = fs::rename(&temp, dest).await {
        let _ = fs::remove_file(&temp).await;
        return Err(err);
    }
    Ok(())
}

/// Free bytes on the disk holding `path`, when the mount can be found.
/// Only the disk list is refreshed; this runs on every admission.
fn disk_available_space(path: &Path) -> Option<u64> {
    let mut sys = System::new();
    sys.refresh_disks_list();
    let mut best: Option<(usize, u64)> = None;
    for disk in sys.disks() {
        if path.starts_with(disk.mount_point()) {
            let depth = disk.mount_point().as_os_str().len();
            if best.map_or(true, |(seen, _)| depth >= seen) {
                best = Some((depth, disk.available_space()));
            }
        }
    }
    if best.is_none() {
        debug!("no disk found for {:?}, skipping the free space check", path);
    }
    best.map(|(_, space)| space)
}

fn verbose_stamps(metadata: &std::fs::Metadata) -> String {
    let created = FileTime::from_creation_time(metadata)
        .unwrap_or_else(|| FileTime::from_last_modification_time(metadata));
    let accessed = FileTime::from_last_access_time(metadata);
    let modified = FileTime::from_last_modification_time(metadata);
    format!(
        " created time: {} last accessed time: {} last modified time: {}",
        format_stamp(created),
        format_stamp(accessed),
        format_stamp(modified)
    )
}

fn format_stamp(time: FileTime) -> String {
    match Local.timestamp_opt(time.unix_seconds(), 0).single() {
        Some(stamp) => stamp.format(LIST_TIMESTAMP_FORMAT).to_string(),
        None => String::from("unknown"),
    }
}
