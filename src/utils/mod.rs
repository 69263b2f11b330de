//! The `utils` module provides definitions shared across the `chatrelay`
//! application: the error taxonomy and logging setup.

pub mod error;
pub mod logging;

pub use error::RelayError;
