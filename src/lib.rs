pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod lookup;
pub mod models;
pub mod processors;
pub mod readers;
pub mod spatial;
pub mod utils;
pub mod writers;

pub use error::{ProcessingError, Result};
