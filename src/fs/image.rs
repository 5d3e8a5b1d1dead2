use std::io::{Cursor, Read};
use std::path::Path;

use log::{debug, info};

use crate::error::DiskError;

/// Size of every addressable sector on the disk.
pub const SECTOR_SIZE: usize = 256;

/// A raw sector-addressed disk image held entirely in memory.
///
/// The buffer is never modified after loading. A trailing partial sector, if
/// any, is kept in the buffer but is not addressable.
#[derive(Debug, Clone)]
pub struct DiskImage {
    data: Vec<u8>,
    sector_count: usize,
}

impl DiskImage {
    /// Wrap an already-loaded byte buffer.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let sector_count = data.len() / SECTOR_SIZE;
        if data.len() % SECTOR_SIZE != 0 {
            debug!(
                "image has {} trailing bytes past sector {}, ignoring them",
                data.len() % SECTOR_SIZE,
                sector_count
            );
        }
        Self { data, sector_count }
    }

    /// Load an image from disk in a single read.
    ///
    /// Paths ending in `.zst` are decompressed with zstd first.
    pub fn open(path: &Path) -> Result<Self, DiskError> {
        let raw = std::fs::read(path)?;
        info!("File size is {}", raw.len());

        let is_zstd = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("zst"))
            .unwrap_or(false);
        if !is_zstd {
            return Ok(Self::from_bytes(raw));
        }

        let mut decoder = zstd::stream::read::Decoder::new(Cursor::new(raw))?;
        let mut data = Vec::new();
        decoder.read_to_end(&mut data)?;
        info!("Decompressed image size is {}", data.len());
        Ok(Self::from_bytes(data))
    }

    /// The whole image, including any trailing partial sector.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of whole sectors in the image.
    pub fn sector_count(&self) -> usize {
        self.sector_count
    }

    /// Borrow a single sector.
    pub fn sector(&self, sector: usize) -> Result<&[u8], DiskError> {
        self.sector_range(sector, 1)
    }

    /// Copy `count` sectors starting at `start`.
    pub fn read_sectors(&self, start: usize, count: usize) -> Result<Vec<u8>, DiskError> {
        let bytes = self.sector_range(start, count)?.to_vec();
        debug!("copied sectors {start}+{count} ({} bytes)", bytes.len());
        Ok(bytes)
    }

    fn sector_range(&self, start: usize, count: usize) -> Result<&[u8], DiskError> {
        let end = start
            .checked_add(count)
            .filter(|&end| end <= self.sector_count)
            .ok_or(DiskError::SectorOutOfRange {
                start,
                count,
                sector_count: self.sector_count,
            })?;
        Ok(&self.data[start * SECTOR_SIZE..end * SECTOR_SIZE])
    }
}
