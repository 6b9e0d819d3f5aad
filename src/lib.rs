pub mod archive;
pub mod check;
pub mod compare;
pub mod config;
pub mod error;
pub mod http;
pub mod library;
pub mod runtime;
pub mod source;

pub use error::CheckError;
