use std::path::Path;

use crate::archive::{Archive, File};
use crate::error::Error;

/// An ordered set of archives. Archives added later take precedence over earlier ones, so patch
/// archives shadow the files of the base archives they were added after.
#[derive(Default)]
pub struct Chain {
    archives: Vec<Archive>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, archive: Archive) {
        self.archives.push(archive);
    }

    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        self.add(Archive::open(path)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.archives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// Archives in registration order, i.e. lowest precedence first.
    pub fn archives(&self) -> impl DoubleEndedIterator<Item = &Archive> {
        self.archives.iter()
    }

    pub fn contains_file(&self, name: &str) -> bool {
        self.archives.iter().any(|archive| archive.contains_file(name))
    }

    /// Finds the highest precedence archive containing `name`.
    pub fn find(&self, name: &str) -> Option<(&Archive, File)> {
        self.archives
            .iter()
            .rev()
            .find_map(|archive| archive.open_file(name).ok().map(|file| (archive, file)))
    }

    pub fn read_file(&self, name: &str) -> Result<Vec<u8>, Error> {
        let (archive, file) = self
            .find(name)
            .ok_or_else(|| Error::FileNotFound { name: name.into() })?;
        archive.read_entry(&file)
    }
}
