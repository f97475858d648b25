pub mod store;
pub mod user;

pub use store::{CredentialStore, LoginState};
pub use user::{load_users, parse_users, Account, User};
