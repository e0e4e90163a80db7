// lib.rs
pub mod blast;
pub mod error;
pub mod hmmer;
pub mod input;

pub use error::{ErrorKind, LineErr, ParseErr, Result, ValueErr};
