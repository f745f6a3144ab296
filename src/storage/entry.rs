/// A node of [`MapStorage`](super::MapStorage). Files own their bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Directory,
    File(Vec<u8>),
}

impl Entry {
    pub fn dir() -> Entry {
        Entry::Directory
    }

    pub fn file(content: &[u8]) -> Entry {
        Entry::File(content.to_vec())
    }

    /// File content, `None` for directories.
    pub fn content(&self) -> Option<&[u8]> {
        match self {
            Entry::File(bytes) => Some(bytes),
            Entry::Directory => None,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Entry::Directory)
    }
}
