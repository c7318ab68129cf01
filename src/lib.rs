pub mod boundary;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod manifest;
pub mod npm;
pub mod release;
pub mod ui;

pub use error::{ReleaseError, Result};
