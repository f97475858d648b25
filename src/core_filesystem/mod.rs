pub mod error;
pub mod view;

pub use error::FsError;
pub use view::{FileSystemView, ListMode, PendingStore, StoreMode};
