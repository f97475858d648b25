use thiserror::Error;

/// File-system outcomes that turn into `-` responses. Each variant maps to
/// exactly one wire line; none of them tear the session down.
#[derive(Error, Debug)]
pub enum FsError {
    #[error("directory cannot be listed")]
    InvalidDirectory,

    #[error("directory does not exist")]
    DirectoryMissing,

    #[error("path escapes the served tree")]
    OutsideSandbox,

    #[error("rename source {0} not found")]
    RenameSourceMissing(String),

    #[error("no rename source staged")]
    RenameNotStaged,

    #[error("rename failed")]
    RenameFailed,

    #[error("delete target does not exist")]
    DeleteMissing,

    #[error("delete failed")]
    DeleteFailed,

    #[error("requested file does not exist")]
    SendFileMissing,

    #[error("no file staged for sending")]
    NothingStaged,

    #[error("no store operation staged")]
    StoreNotArmed,

    #[error("transfer exceeds available room")]
    CapacityExceeded,

    #[error("append target is not a text file")]
    NotTextFile,

    #[error("generation limit for duplicate files reached")]
    DuplicateLimitReached,

    #[error("could not save the payload: {0}")]
    Save(std::io::Error),
}

impl FsError {
    pub fn to_wire_response(&self) -> String {
        match self {
            FsError::InvalidDirectory => "-Invalid Directory".to_string(),
            FsError::DirectoryMissing => {
                "-Can't connect to directory because: (It does not exist)".to_string()
            }
            FsError::OutsideSandbox => {
                "-Can't connect to directory because: (Outside Server File System)".to_string()
            }
            FsError::RenameSourceMissing(name) => {
                format!("-Can't find {}. NAME command is aborted, don't send TOBE", name)
            }
            FsError::RenameNotStaged => {
                "-File wasn't renamed because file is not specified".to_string()
            }
            FsError::RenameFailed => "-File wasn't renamed as renaming failed".to_string(),
            FsError::DeleteMissing => "-Not deleted because file does not exist".to_string(),
            FsError::DeleteFailed => "-Not deleted because deleting process failed".to_string(),
            FsError::SendFileMissing => "-File doesn't exist".to_string(),
            FsError::NothingStaged => "-No File selected on remote server".to_string(),
            FsError::StoreNotArmed => "-STOR operation was not specified".to_string(),
            FsError::CapacityExceeded => "-Not enough room, don't send it".to_string(),
            FsError::NotTextFile => "-Couldn't save because file is not of text type".to_string(),
            FsError::DuplicateLimitReached => {
                "-Couldn't save because file limit of duplicate files was reached".to_string()
            }
            FsError::Save(err) => format!("-Couldn't save because {}", err),
        }
    }
}
