// src/notify/mod.rs
pub mod digest;
pub mod email;

pub use digest::{build_digest, collect_recent, Digest};
pub use email::EmailSender;
