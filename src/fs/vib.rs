use byteorder::{BigEndian, ByteOrder};

use super::image::SECTOR_SIZE;
use crate::error::DiskError;

// Volume information block (sector 0) field offsets.
const NAME_OFFSET: usize = 0x00;
pub const NAME_LEN: usize = 10;
const SECTOR_COUNT_OFFSET: usize = 0x0A;
const SECTORS_PER_TRACK_OFFSET: usize = 0x0C;
const MARK_OFFSET: usize = 0x0D;
const PROTECT_OFFSET: usize = 0x10;
const TRACKS_PER_SIDE_OFFSET: usize = 0x11;
const SIDES_OFFSET: usize = 0x12;
const DENSITY_OFFSET: usize = 0x13;

/// Byte offset of the allocation bitmap within sector 0.
pub const BITMAP_OFFSET: usize = 0x38;
/// Declared length of the allocation bitmap (0x38..0xEC).
pub const BITMAP_LEN: usize = 180;
/// Number of bitmap bytes scanned when counting used sectors.
///
/// This is 20 bytes longer than [`BITMAP_LEN`] and also covers the trailing
/// reserved region up to the end of the sector. Override it through
/// [`ReadOptions`].
pub const DEFAULT_BITMAP_SCAN_LEN: usize = 200;

/// The three bytes every valid volume carries at offset 0x0D.
pub const VOLUME_MARK: &[u8; 3] = b"DSK";

/// Knobs for decoding a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Bitmap bytes scanned for the used-sector count, starting at
    /// [`BITMAP_OFFSET`]. Clamped to the end of sector 0.
    pub bitmap_scan_len: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            bitmap_scan_len: DEFAULT_BITMAP_SCAN_LEN,
        }
    }
}

/// Borrowed view of the volume information block.
#[derive(Debug, Clone, Copy)]
pub struct VolumeHeader<'a> {
    raw: &'a [u8],
}

impl<'a> VolumeHeader<'a> {
    /// Wrap sector 0 and check the volume mark.
    pub fn parse(sector: &'a [u8]) -> Result<Self, DiskError> {
        if sector.len() < SECTOR_SIZE {
            return Err(DiskError::InvalidVolume(format!(
                "sector 0 is {} bytes, expected {SECTOR_SIZE}",
                sector.len()
            )));
        }
        let header = Self {
            raw: &sector[..SECTOR_SIZE],
        };
        if header.mark() != VOLUME_MARK {
            return Err(DiskError::InvalidVolume(
                "disk sector 0 does not look like a volume".into(),
            ));
        }
        Ok(header)
    }

    /// Wrap a sector 0 that has already been through [`VolumeHeader::parse`].
    pub(crate) fn from_validated(sector: &'a [u8]) -> Self {
        debug_assert!(sector.len() >= SECTOR_SIZE);
        Self {
            raw: &sector[..SECTOR_SIZE],
        }
    }

    /// Raw 10-byte, space-padded disk name.
    pub fn name_bytes(&self) -> &'a [u8] {
        &self.raw[NAME_OFFSET..NAME_OFFSET + NAME_LEN]
    }

    /// Disk name with trailing padding removed.
    pub fn name(&self) -> String {
        trimmed_name(self.name_bytes())
    }

    pub fn sector_count(&self) -> u16 {
        BigEndian::read_u16(&self.raw[SECTOR_COUNT_OFFSET..SECTOR_COUNT_OFFSET + 2])
    }

    pub fn sectors_per_track(&self) -> u8 {
        self.raw[SECTORS_PER_TRACK_OFFSET]
    }

    pub fn mark(&self) -> &'a [u8] {
        &self.raw[MARK_OFFSET..MARK_OFFSET + 3]
    }

    /// Protection byte: `b' '` when unprotected, `b'P'` when protected.
    pub fn protect(&self) -> u8 {
        self.raw[PROTECT_OFFSET]
    }

    pub fn tracks_per_side(&self) -> u8 {
        self.raw[TRACKS_PER_SIDE_OFFSET]
    }

    pub fn sides(&self) -> u8 {
        self.raw[SIDES_OFFSET]
    }

    pub fn density(&self) -> u8 {
        self.raw[DENSITY_OFFSET]
    }

    /// The declared allocation bitmap.
    pub fn bitmap(&self) -> &'a [u8] {
        &self.raw[BITMAP_OFFSET..BITMAP_OFFSET + BITMAP_LEN]
    }

    /// Number of zero bits in the first `scan_len` bitmap bytes.
    pub fn used_sector_count(&self, scan_len: usize) -> u32 {
        let end = (BITMAP_OFFSET + scan_len).min(self.raw.len());
        count_zero_bits(&self.raw[BITMAP_OFFSET..end])
    }

    /// Declared sector count minus the used count. Negative when the scan
    /// finds more zero bits than the volume declares sectors.
    pub fn free_sector_count(&self, scan_len: usize) -> i64 {
        self.sector_count() as i64 - self.used_sector_count(scan_len) as i64
    }
}

fn count_zero_bits(bytes: &[u8]) -> u32 {
    bytes.iter().map(|b| b.count_zeros()).sum()
}

/// Render a space-padded on-disk name, dropping trailing spaces and NULs.
pub(crate) fn trimmed_name(raw: &[u8]) -> String {
    let end = raw
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |i| i + 1);
    raw[..end].iter().map(|&b| b as char).collect()
}
