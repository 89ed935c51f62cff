use std::borrow::Cow;

pub trait RawAssetLoader {
    /// The decompressed bytes of the highest precedence entry named `path`, `None` when no archive
    /// contains it. Implementations hand out a fresh buffer on every call.
    fn load_raw_owned(&self, path: &str) -> Option<Vec<u8>>;
}

/// Logical paths always use forward slashes, but plenty of records were authored with backslashes.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if path.contains('\\') {
        Cow::Owned(path.replace('\\', "/"))
    } else {
        Cow::Borrowed(path)
    }
}
