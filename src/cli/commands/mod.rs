//! CLI command modules

pub mod endpoints;
pub mod history;
pub mod info;
pub mod init;
pub mod inspect;
pub mod session;
#[cfg(feature = "http")]
pub mod send;
pub mod validate;
