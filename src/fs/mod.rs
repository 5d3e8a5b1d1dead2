pub mod catalog;
pub mod cluster;
pub mod content;
pub mod directory;
pub mod entry;
pub mod fdr;
pub mod filesystem;
pub mod image;
pub mod vib;

#[cfg(test)]
pub(crate) mod testdisk;

use log::warn;

use entry::FileEntry;
use fdr::{pad_file_name, FileDescriptor};
use filesystem::Filesystem;
use image::{DiskImage, SECTOR_SIZE};
use vib::{ReadOptions, VolumeHeader};

use crate::error::DiskError;

/// A TI-99/4A volume loaded in memory.
///
/// Owns the image bytes; the header and descriptors handed out by this type
/// are views borrowing from it.
#[derive(Debug)]
pub struct TiDisk {
    image: DiskImage,
    options: ReadOptions,
    label: String,
}

impl TiDisk {
    /// Validate sector 0 and wrap the image.
    ///
    /// Fails with [`DiskError::InvalidVolume`] when the volume mark is not
    /// `"DSK"`.
    pub fn open(image: DiskImage, options: ReadOptions) -> Result<Self, DiskError> {
        let sector0 = image
            .sector(0)
            .map_err(|_| DiskError::InvalidVolume("image is smaller than one sector".into()))?;
        let label = VolumeHeader::parse(sector0)?.name();
        Ok(Self {
            image,
            options,
            label,
        })
    }

    pub fn image(&self) -> &DiskImage {
        &self.image
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    pub fn header(&self) -> VolumeHeader<'_> {
        VolumeHeader::from_validated(&self.image.as_bytes()[..SECTOR_SIZE])
    }

    /// Sectors counted as used by the bitmap scan.
    pub fn used_sectors(&self) -> u32 {
        self.header().used_sector_count(self.options.bitmap_scan_len)
    }

    pub fn free_sectors(&self) -> i64 {
        self.header().free_sector_count(self.options.bitmap_scan_len)
    }

    /// Nonzero directory slots, in slot order.
    pub fn descriptor_pointers(&self) -> Result<Vec<u16>, DiskError> {
        let sector = self.image.sector(directory::DIRECTORY_SECTOR)?;
        Ok(directory::descriptor_pointers(sector))
    }

    /// The descriptor stored at sector `pointer`.
    pub fn descriptor(&self, pointer: u16) -> Result<FileDescriptor<'_>, DiskError> {
        let sector = self
            .image
            .sector(pointer as usize)
            .map_err(|_| DiskError::DescriptorOutOfRange {
                pointer,
                sector_count: self.image.sector_count(),
            })?;
        Ok(FileDescriptor::new(pointer, sector))
    }

    /// Every descriptor the directory points at, in directory order.
    ///
    /// Pointers past the end of the image are logged and left out.
    pub fn descriptors(&self) -> Result<Vec<FileDescriptor<'_>>, DiskError> {
        let mut result = Vec::new();
        for pointer in self.descriptor_pointers()? {
            match self.descriptor(pointer) {
                Ok(fdr) => result.push(fdr),
                Err(e) => warn!("skipping directory entry: {e}"),
            }
        }
        Ok(result)
    }

    /// Look up a file by name.
    ///
    /// The name is padded with spaces to 10 bytes and compared byte for
    /// byte; the first match in directory order wins.
    pub fn find_file(&self, name: &str) -> Result<FileDescriptor<'_>, DiskError> {
        let padded = pad_file_name(name);
        self.descriptors()?
            .into_iter()
            .find(|fdr| fdr.matches(&padded))
            .ok_or_else(|| DiskError::FileNotFound(name.to_string()))
    }

    /// Look up a file by name and describe it.
    pub fn lookup(&self, name: &str) -> Result<FileEntry, DiskError> {
        self.find_file(name).map(|fdr| FileEntry::from(&fdr))
    }

    /// Load a file's sectors and rebuild its logical bytes.
    pub fn file_contents(&self, fdr: &FileDescriptor<'_>) -> Result<Vec<u8>, DiskError> {
        let sectors = content::load_sectors(&self.image, fdr)?;
        Ok(content::reconstruct(fdr, &sectors))
    }
}

impl Filesystem for TiDisk {
    fn volume_label(&self) -> Option<&str> {
        Some(&self.label)
    }

    fn fs_type(&self) -> &str {
        "TI-99/4A"
    }

    fn total_size(&self) -> u64 {
        self.header().sector_count() as u64 * SECTOR_SIZE as u64
    }

    fn used_size(&self) -> u64 {
        self.used_sectors() as u64 * SECTOR_SIZE as u64
    }

    fn list_files(&self) -> Result<Vec<FileEntry>, DiskError> {
        Ok(self.descriptors()?.iter().map(FileEntry::from).collect())
    }

    fn read_file(&self, entry: &FileEntry) -> Result<Vec<u8>, DiskError> {
        let fdr = self.descriptor(entry.location)?;
        self.file_contents(&fdr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::fdr::{FileKind, TYPE_PROGRAM, TYPE_VARIABLE};
    use crate::fs::testdisk::{make_fdr, DiskBuilder};

    fn sample_disk() -> TiDisk {
        let mut data = [0u8; 256];
        data[..5].copy_from_slice(b"HELLO");
        let image = DiskBuilder::new(40, b"SAMPLE    ")
            .file(2, make_fdr(b"HELLO     ", TYPE_PROGRAM, 1, 5, &[(0x10, 0)]))
            .file(3, make_fdr(b"LINES     ", TYPE_VARIABLE, 1, 7, &[(0x11, 0)]))
            .sector(0x10, &data)
            .sector(0x11, &[2, b'O', b'K', 2, b'H', b'I', 0xFF])
            .build();
        TiDisk::open(image, ReadOptions::default()).unwrap()
    }

    #[test]
    fn test_open_rejects_bad_mark() {
        let image = DiskBuilder::new(40, b"BROKEN    ")
            .vib_byte(0x0F, b'X')
            .build();
        assert!(matches!(
            TiDisk::open(image, ReadOptions::default()),
            Err(DiskError::InvalidVolume(_))
        ));
    }

    #[test]
    fn test_open_rejects_tiny_image() {
        let image = DiskImage::from_bytes(b"xxxxxxxxxxxxxDSK".to_vec());
        assert!(matches!(
            TiDisk::open(image, ReadOptions::default()),
            Err(DiskError::InvalidVolume(_))
        ));
    }

    #[test]
    fn test_volume_summary() {
        let disk = sample_disk();
        assert_eq!(disk.volume_label(), Some("SAMPLE"));
        assert_eq!(disk.fs_type(), "TI-99/4A");
        assert_eq!(disk.total_size(), 40 * 256);
        assert_eq!(disk.used_sectors(), 0);
        assert_eq!(disk.free_sectors(), 40);
        assert_eq!(disk.used_size(), 0);
    }

    #[test]
    fn test_bitmap_scan_len_option() {
        let image = DiskBuilder::new(40, b"SAMPLE    ")
            .vib_byte(0x38, 0x00)
            .vib_byte(0x38 + 190, 0x00)
            .build();
        let disk = TiDisk::open(image.clone(), ReadOptions::default()).unwrap();
        assert_eq!(disk.used_sectors(), 16);

        let disk = TiDisk::open(image, ReadOptions { bitmap_scan_len: 5 }).unwrap();
        assert_eq!(disk.used_sectors(), 8);
        assert_eq!(disk.free_sectors(), 32);
    }

    #[test]
    fn test_find_and_read_program() {
        let disk = sample_disk();
        let fdr = disk.find_file("HELLO").unwrap();
        assert_eq!(fdr.pointer(), 2);
        assert_eq!(disk.file_contents(&fdr).unwrap(), b"HELLO".to_vec());
    }

    #[test]
    fn test_find_and_read_variable() {
        let disk = sample_disk();
        let entry = disk.lookup("LINES").unwrap();
        assert_eq!(entry.kind, FileKind::Variable);
        assert_eq!(disk.read_file(&entry).unwrap(), b"OK\nHI\n".to_vec());
    }

    #[test]
    fn test_find_missing_file() {
        let disk = sample_disk();
        match disk.find_file("NOPE") {
            Err(DiskError::FileNotFound(name)) => assert_eq!(name, "NOPE"),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
        // Matching is exact and case sensitive.
        assert!(disk.find_file("hello").is_err());
        assert!(disk.find_file("HELLO ").is_ok());
    }

    #[test]
    fn test_first_match_wins() {
        let image = DiskBuilder::new(40, b"DUPES     ")
            .file(5, make_fdr(b"TWIN      ", TYPE_PROGRAM, 1, 1, &[(0x10, 0)]))
            .file(6, make_fdr(b"TWIN      ", TYPE_PROGRAM, 1, 2, &[(0x11, 0)]))
            .build();
        let disk = TiDisk::open(image, ReadOptions::default()).unwrap();
        assert_eq!(disk.find_file("TWIN").unwrap().pointer(), 5);
    }

    #[test]
    fn test_out_of_range_pointer_is_skipped() {
        let image = DiskBuilder::new(40, b"SAMPLE    ")
            .slot(0, 0x200)
            .file(2, make_fdr(b"OK        ", TYPE_PROGRAM, 1, 1, &[(0x10, 0)]))
            .build();
        let disk = TiDisk::open(image, ReadOptions::default()).unwrap();

        assert_eq!(disk.descriptor_pointers().unwrap(), vec![0x200, 2]);
        assert!(matches!(
            disk.descriptor(0x200),
            Err(DiskError::DescriptorOutOfRange {
                pointer: 0x200,
                sector_count: 40
            })
        ));
        let names: Vec<String> = disk.list_files().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["OK"]);
    }

    #[test]
    fn test_write_file_to() {
        let disk = sample_disk();
        let entry = disk.lookup("HELLO").unwrap();
        let mut out = Vec::new();
        assert_eq!(disk.write_file_to(&entry, &mut out).unwrap(), 5);
        assert_eq!(out, b"HELLO");
    }

    #[test]
    fn test_image_without_directory_sector() {
        let mut data = vec![0u8; 256];
        data[0x0D..0x10].copy_from_slice(b"DSK");
        let disk = TiDisk::open(DiskImage::from_bytes(data), ReadOptions::default()).unwrap();
        assert!(matches!(
            disk.descriptor_pointers(),
            Err(DiskError::SectorOutOfRange { .. })
        ));
    }
}
