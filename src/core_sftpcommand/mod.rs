pub mod handlers;
pub mod sftpcommand;

#[cfg(test)]
mod test_session;

pub mod acct;
pub mod cdir;
pub mod done;
pub mod kill;
pub mod list;
pub mod name;
pub mod pass;
pub mod retr;
pub mod send;
pub mod size;
pub mod stop;
pub mod stor;
pub mod tobe;
pub mod type_;
pub mod user;
