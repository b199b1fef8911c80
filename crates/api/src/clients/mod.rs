//! External service clients.

pub mod contractor;

pub use contractor::{build_directory, HttpDirectory};
