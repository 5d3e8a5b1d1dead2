use serde::Serialize;

use super::fdr::{FileDescriptor, FileKind};

/// A file listed in the disk directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    pub name: String,
    /// Sector holding the file's descriptor.
    pub location: u16,
    /// Sectors used on disk, counting the descriptor itself.
    pub sectors: u32,
    pub kind: FileKind,
    /// Internal (binary) rather than display (text) records.
    pub internal: bool,
    pub protected: bool,
    pub record_length: u8,
}

impl FileEntry {
    pub fn is_program(&self) -> bool {
        self.kind == FileKind::Program
    }
}

impl From<&FileDescriptor<'_>> for FileEntry {
    fn from(fdr: &FileDescriptor<'_>) -> Self {
        Self {
            name: fdr.name(),
            location: fdr.pointer(),
            sectors: 1 + fdr.sectors_in_file() as u32,
            kind: fdr.kind(),
            internal: fdr.is_internal(),
            protected: fdr.is_protected(),
            record_length: fdr.record_length(),
        }
    }
}
