use std::io::Write;

use super::entry::FileEntry;
use crate::error::DiskError;

/// Trait for browsing a read-only disk volume.
pub trait Filesystem {
    /// Volume label, if available.
    fn volume_label(&self) -> Option<&str>;

    /// Filesystem type name.
    fn fs_type(&self) -> &str;

    /// Total volume size in bytes, as declared by the volume.
    fn total_size(&self) -> u64;

    /// Used space in bytes.
    fn used_size(&self) -> u64;

    /// List every file in directory order.
    fn list_files(&self) -> Result<Vec<FileEntry>, DiskError>;

    /// Reconstruct the logical contents of a file.
    fn read_file(&self, entry: &FileEntry) -> Result<Vec<u8>, DiskError>;

    /// Stream file data to a writer. Returns the number of bytes written.
    /// Default delegates to `read_file(entry)`.
    fn write_file_to(&self, entry: &FileEntry, writer: &mut dyn Write) -> Result<u64, DiskError> {
        let data = self.read_file(entry)?;
        writer.write_all(&data)?;
        Ok(data.len() as u64)
    }
}
