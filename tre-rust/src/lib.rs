//! A library for reading TRE archives

mod archive;
mod chain;
mod compression;
mod error;
mod writer;

pub use crate::archive::{Archive, File};
pub use crate::chain::Chain;
pub use crate::error::Error;
pub use crate::writer::ArchiveWriter;
