use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::Serialize;

use super::cluster::{ClusterChain, CLUSTER_ENTRIES, CLUSTER_ENTRY_LEN};
use super::image::SECTOR_SIZE;
use super::vib::trimmed_name;

// File descriptor record field offsets.
pub const FILE_NAME_LEN: usize = 10;
const FILE_TYPE_OFFSET: usize = 0x0C;
const RECORDS_PER_SECTOR_OFFSET: usize = 0x0D;
const SECTORS_IN_FILE_OFFSET: usize = 0x0E;
const LAST_BYTE_OFFSET: usize = 0x10;
const RECORD_LENGTH_OFFSET: usize = 0x11;
const NUMBER_OF_RECORDS_OFFSET: usize = 0x12;
const CLUSTER_LIST_OFFSET: usize = 0x1C;

// File type flag bits.
pub const TYPE_VARIABLE: u8 = 0x80;
pub const TYPE_PROTECTED: u8 = 0x08;
pub const TYPE_INTERNAL: u8 = 0x02;
pub const TYPE_PROGRAM: u8 = 0x01;

/// How a file's sectors are turned into logical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileKind {
    /// Memory image; one byte stream.
    Program,
    /// Records prefixed with a length byte.
    Variable,
    /// Records of exactly `record_length` bytes.
    Fixed,
}

impl FileKind {
    /// The program bit wins over the variable bit when both are set.
    pub fn from_type_byte(file_type: u8) -> Self {
        if file_type & TYPE_PROGRAM != 0 {
            FileKind::Program
        } else if file_type & TYPE_VARIABLE != 0 {
            FileKind::Variable
        } else {
            FileKind::Fixed
        }
    }
}

/// Borrowed view of a file descriptor record sector.
#[derive(Debug, Clone, Copy)]
pub struct FileDescriptor<'a> {
    pointer: u16,
    raw: &'a [u8],
}

impl<'a> FileDescriptor<'a> {
    /// Wrap the descriptor found at sector `pointer`.
    ///
    /// `sector` must be a whole sector; [`super::TiDisk`] bounds-checks the
    /// pointer before calling this.
    pub(crate) fn new(pointer: u16, sector: &'a [u8]) -> Self {
        debug_assert_eq!(sector.len(), SECTOR_SIZE);
        Self {
            pointer,
            raw: sector,
        }
    }

    /// Sector number this descriptor was read from.
    pub fn pointer(&self) -> u16 {
        self.pointer
    }

    /// Raw 10-byte, space-padded file name.
    pub fn name_bytes(&self) -> &'a [u8] {
        &self.raw[..FILE_NAME_LEN]
    }

    pub fn name(&self) -> String {
        trimmed_name(self.name_bytes())
    }

    pub fn file_type(&self) -> u8 {
        self.raw[FILE_TYPE_OFFSET]
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from_type_byte(self.file_type())
    }

    pub fn is_protected(&self) -> bool {
        self.file_type() & TYPE_PROTECTED != 0
    }

    pub fn is_internal(&self) -> bool {
        self.file_type() & TYPE_INTERNAL != 0
    }

    pub fn records_per_sector(&self) -> u8 {
        self.raw[RECORDS_PER_SECTOR_OFFSET]
    }

    /// Data sectors in the file, not counting the descriptor. Big-endian.
    pub fn sectors_in_file(&self) -> u16 {
        BigEndian::read_u16(&self.raw[SECTORS_IN_FILE_OFFSET..SECTORS_IN_FILE_OFFSET + 2])
    }

    pub fn last_byte_last_sector(&self) -> u8 {
        self.raw[LAST_BYTE_OFFSET]
    }

    pub fn record_length(&self) -> u8 {
        self.raw[RECORD_LENGTH_OFFSET]
    }

    /// Record count for fixed files. Stored little-endian, unlike every
    /// other 16-bit field on the disk.
    pub fn number_of_records(&self) -> u16 {
        LittleEndian::read_u16(&self.raw[NUMBER_OF_RECORDS_OFFSET..NUMBER_OF_RECORDS_OFFSET + 2])
    }

    /// The packed cluster list (76 three-byte entries).
    pub fn cluster_list(&self) -> &'a [u8] {
        &self.raw[CLUSTER_LIST_OFFSET..CLUSTER_LIST_OFFSET + CLUSTER_ENTRIES * CLUSTER_ENTRY_LEN]
    }

    pub fn clusters(&self) -> ClusterChain<'a> {
        ClusterChain::new(self.cluster_list())
    }

    pub fn last_cluster_offset(&self) -> u16 {
        self.clusters().last_offset()
    }

    /// Logical length of a program file in bytes.
    ///
    /// A last-byte value of 0 means the final sector is full.
    pub fn program_length(&self) -> usize {
        let full = SECTOR_SIZE * self.sectors_in_file() as usize;
        let unused = (SECTOR_SIZE - self.last_byte_last_sector() as usize) % SECTOR_SIZE;
        full.saturating_sub(unused)
    }

    /// Short type description used in catalog listings.
    pub fn type_label(&self) -> String {
        match self.kind() {
            FileKind::Program => format!("Pgm   {:5}", self.program_length()),
            kind => format!(
                "{}/{} {:3}",
                if self.is_internal() { "Int" } else { "Dis" },
                if kind == FileKind::Variable { "Var" } else { "Fix" },
                self.record_length()
            ),
        }
    }

    /// Byte-wise match against a name already padded to 10 bytes.
    pub fn matches(&self, padded: &[u8; FILE_NAME_LEN]) -> bool {
        self.name_bytes() == padded
    }
}

/// Pad a requested file name to the on-disk 10-byte form.
///
/// Longer names are cut at 10 bytes; no case folding or wildcards.
pub fn pad_file_name(name: &str) -> [u8; FILE_NAME_LEN] {
    let mut padded = [b' '; FILE_NAME_LEN];
    for (dst, &src) in padded.iter_mut().zip(name.as_bytes()) {
        *dst = src;
    }
    padded
}
