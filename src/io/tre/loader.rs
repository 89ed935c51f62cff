use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::bail;
use log::{debug, error, trace, warn};

use ::tre::{Archive, Chain};

use crate::io::common::loader::{RawAssetLoader, normalize_path};
use crate::io::tre::manifest::Manifest;

pub struct TreLoader {
    chain: Chain,
    fetches: AtomicUsize,
}

impl TreLoader {
    /// Opens the archives of the manifest in order. Missing or unreadable archives are skipped, it
    /// is only an error when none of them could be opened.
    pub fn new(data_dir: &Path, manifest: &Manifest) -> Result<Self, anyhow::Error> {
        let mut chain = Chain::new();
        for path in manifest.resolve(data_dir) {
            match Archive::open(&path) {
                Ok(archive) => {
                    debug!("Opened {} with {} entries", path.display(), archive.len());
                    chain.add(archive);
                }
                Err(err) => warn!("Skipping archive {}: {}", path.display(), err),
            }
        }

        if chain.is_empty() {
            bail!(
                "None of the {} archives listed in the manifest could be opened from {}",
                manifest.len(),
                data_dir.display()
            );
        }

        Ok(Self::from_chain(chain))
    }

    pub fn from_chain(chain: Chain) -> Self {
        TreLoader {
            chain,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn archive_count(&self) -> usize {
        self.chain.len()
    }

    /// How often entry data has been requested so far, hits and misses alike.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl RawAssetLoader for TreLoader {
    fn load_raw_owned(&self, path: &str) -> Option<Vec<u8>> {
        profiling::scope!("TreLoader::load_raw_owned");
        self.fetches.fetch_add(1, Ordering::Relaxed);

        let path = normalize_path(path);
        let Some((archive, file)) = self.chain.find(&path) else {
            warn!("Could not locate {}!", path);
            return None;
        };

        trace!("Loading {} from {}", path, archive.path().display());
        let mut buf = vec![0; file.size() as usize];
        match file.read(archive, &mut buf) {
            Ok(read) if read == buf.len() => Some(buf),
            Ok(read) => {
                error!("Short read of {}: {} of {} bytes", path, read, buf.len());
                None
            }
            Err(err) => {
                error!("Failed to read {} from {}: {}", path, archive.path().display(), err);
                None
            }
        }
    }
}
