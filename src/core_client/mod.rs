pub mod client;

pub use client::ClientSession;
