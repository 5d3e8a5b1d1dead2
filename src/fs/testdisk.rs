//! Synthetic disk images for unit tests.

use super::cluster::encode_cluster;
use super::image::{DiskImage, SECTOR_SIZE};

pub(crate) struct DiskBuilder {
    data: Vec<u8>,
}

impl DiskBuilder {
    /// A blank volume with every bitmap byte set and an empty directory.
    pub(crate) fn new(sectors: u16, name: &[u8; 10]) -> Self {
        let mut data = vec![0u8; sectors as usize * SECTOR_SIZE];
        data[..10].copy_from_slice(name);
        data[0x0A..0x0C].copy_from_slice(&sectors.to_be_bytes());
        data[0x0C] = 9;
        data[0x0D..0x10].copy_from_slice(b"DSK");
        data[0x10] = b' ';
        data[0x11] = 40;
        data[0x12] = 1;
        data[0x13] = 1;
        data[0x38..SECTOR_SIZE].fill(0xFF);
        Self { data }
    }

    pub(crate) fn vib_byte(mut self, offset: usize, value: u8) -> Self {
        self.data[offset] = value;
        self
    }

    /// Point directory slot `slot` at sector `pointer`.
    pub(crate) fn slot(mut self, slot: usize, pointer: u16) -> Self {
        let at = SECTOR_SIZE + slot * 2;
        self.data[at..at + 2].copy_from_slice(&pointer.to_be_bytes());
        self
    }

    /// Write a descriptor at `pointer` and register it in the next free slot.
    pub(crate) fn file(mut self, pointer: u16, fdr: [u8; SECTOR_SIZE]) -> Self {
        let slot = (0..128)
            .find(|i| {
                let at = SECTOR_SIZE + i * 2;
                self.data[at] == 0 && self.data[at + 1] == 0
            })
            .unwrap_or(127);
        self = self.slot(slot, pointer);
        self.sector(pointer as usize, &fdr)
    }

    pub(crate) fn sector(mut self, sector: usize, bytes: &[u8]) -> Self {
        let at = sector * SECTOR_SIZE;
        self.data[at..at + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub(crate) fn build(self) -> DiskImage {
        DiskImage::from_bytes(self.data)
    }
}

/// A descriptor sector with the given name, type, size and cluster chain.
pub(crate) fn make_fdr(
    name: &[u8; 10],
    file_type: u8,
    sectors_in_file: u16,
    last_byte: u8,
    clusters: &[(u16, u16)],
) -> [u8; SECTOR_SIZE] {
    let mut sector = [0u8; SECTOR_SIZE];
    sector[..10].copy_from_slice(name);
    sector[0x0C] = file_type;
    sector[0x0E..0x10].copy_from_slice(&sectors_in_file.to_be_bytes());
    sector[0x10] = last_byte;
    for (i, &(start, offset)) in clusters.iter().enumerate() {
        let at = 0x1C + i * 3;
        sector[at..at + 3].copy_from_slice(&encode_cluster(start, offset));
    }
    sector
}
