//! HTTP error types for handlers.

mod auth_error;
mod http_error;

pub use self::http_error::{Error, ErrorKind, Result};
