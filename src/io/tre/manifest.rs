use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;

/// Archives of a stock client installation, lowest precedence first.
const DEFAULT_ARCHIVES: &[&str] = &[
    "bottom.tre",
    "data_animation_00.tre",
    "data_music_00.tre",
    "data_other_00.tre",
    "data_sample_00.tre",
    "data_sample_01.tre",
    "data_sample_02.tre",
    "data_sample_03.tre",
    "data_sample_04.tre",
    "data_skeletal_mesh_00.tre",
    "data_skeletal_mesh_01.tre",
    "data_sku1_00.tre",
    "data_sku1_01.tre",
    "data_sku1_02.tre",
    "data_sku1_03.tre",
    "data_sku1_04.tre",
    "data_sku1_05.tre",
    "data_sku1_06.tre",
    "data_sku1_07.tre",
    "data_static_mesh_00.tre",
    "data_static_mesh_01.tre",
    "data_texture_00.tre",
    "data_texture_01.tre",
    "data_texture_02.tre",
    "data_texture_03.tre",
    "data_texture_04.tre",
    "data_texture_05.tre",
    "data_texture_06.tre",
    "data_texture_07.tre",
    "default_patch.tre",
    "patch_00.tre",
    "patch_01.tre",
    "patch_02.tre",
    "patch_03.tre",
    "patch_04.tre",
    "patch_05.tre",
    "patch_06.tre",
    "patch_07.tre",
    "patch_08.tre",
    "patch_09.tre",
    "patch_10.tre",
    "patch_11_00.tre",
    "patch_11_01.tre",
    "patch_11_02.tre",
    "patch_11_03.tre",
    "patch_12_00.tre",
    "patch_13_00.tre",
    "hotfix_24_client_00.tre",
    "hotfix_24_shared_00.tre",
    "hotfix_26_client_00.tre",
    "hotfix_26_shared_00.tre",
    "hotfix_28_client_00.tre",
    "hotfix_28_shared_00.tre",
    "hotfix_29_client_00.tre",
    "hotfix_29_shared_00.tre",
    "hotfix_sku1_19_client_00.tre",
    "hotfix_sku1_20_client_00.tre",
    "hotfix_sku1_21_client_00.tre",
    "hotfix_sku1_23_client_00.tre",
    "hotfix_sku1_28_client_00.tre",
];

/// The ordered list of archive file names to open. Later entries take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    archives: Vec<String>,
}

impl Manifest {
    pub fn new(archives: Vec<String>) -> Self {
        Manifest { archives }
    }

    /// One archive per line. Blank lines and lines starting with `#` are skipped.
    pub fn parse(text: &str) -> Self {
        let archives = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_owned)
            .collect_vec();

        Manifest { archives }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    pub fn archives(&self) -> impl Iterator<Item = &str> {
        self.archives.iter().map(String::as_str)
    }

    /// Archive paths below `data_dir`, in precedence order.
    pub fn resolve(&self, data_dir: &Path) -> Vec<PathBuf> {
        self.archives().map(|name| data_dir.join(name)).collect_vec()
    }

    pub fn len(&self) -> usize {
        self.archives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Manifest::new(DEFAULT_ARCHIVES.iter().map(|name| name.to_string()).collect_vec())
    }
}
