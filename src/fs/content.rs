//! Rebuilds logical file bytes from a descriptor's sectors.
//!
//! Loading walks the cluster chain and copies each run of sectors into one
//! contiguous buffer. Reconstruction then interprets that buffer according
//! to the file's organization: program images are truncated to their byte
//! length, variable records are unpacked from their length prefixes, and
//! fixed records are cut to the declared record count.

use log::{debug, warn};

use super::fdr::{FileDescriptor, FileKind};
use super::image::{DiskImage, SECTOR_SIZE};
use crate::error::DiskError;

/// Appended after every variable-length record.
pub const RECORD_SEPARATOR: u8 = b'\n';

/// Copy every sector referenced by the descriptor's cluster chain.
///
/// The buffer holds `1 + last_cluster_offset` sectors. The first run covers
/// `offset + 1` sectors and each later run `offset - previous_offset`.
pub fn load_sectors(image: &DiskImage, fdr: &FileDescriptor<'_>) -> Result<Vec<u8>, DiskError> {
    let total = fdr.last_cluster_offset() as usize + 1;
    if let Some(sectors_in_file) = sector_count_mismatch(fdr) {
        warn!(
            "{}: last cluster offset {} not equal to FDR sectors in file {}",
            fdr.name(),
            total - 1,
            sectors_in_file
        );
    }

    let mut buf = vec![0u8; SECTOR_SIZE * total];
    let mut loaded = 0usize;
    for cluster in fdr.clusters() {
        let end = (cluster.offset as usize + 1).min(total);
        debug!(
            "{:02x}{:02x}{:02x} {:3x}({:x})",
            cluster.raw[0], cluster.raw[1], cluster.raw[2], cluster.sector, cluster.offset
        );
        if end <= loaded {
            warn!(
                "{}: cluster at sector {:#x} has offset {} behind previous runs, skipping",
                fdr.name(),
                cluster.sector,
                cluster.offset
            );
            continue;
        }
        let count = end - loaded;
        let data = image.read_sectors(cluster.sector as usize, count)?;
        buf[loaded * SECTOR_SIZE..end * SECTOR_SIZE].copy_from_slice(&data);
        loaded = end;
    }

    Ok(buf)
}

/// The descriptor's sectors-in-file count when the cluster chain disagrees
/// with it.
pub fn sector_count_mismatch(fdr: &FileDescriptor<'_>) -> Option<usize> {
    let sectors_in_file = fdr.sectors_in_file() as usize;
    (fdr.last_cluster_offset() as usize + 1 != sectors_in_file).then_some(sectors_in_file)
}

/// Turn loaded sectors into the file's logical bytes.
pub fn reconstruct(fdr: &FileDescriptor<'_>, sectors: &[u8]) -> Vec<u8> {
    match fdr.kind() {
        FileKind::Program => program_bytes(fdr, sectors),
        FileKind::Variable => variable_records(fdr, sectors),
        FileKind::Fixed => fixed_records(fdr, sectors),
    }
}

fn program_bytes(fdr: &FileDescriptor<'_>, sectors: &[u8]) -> Vec<u8> {
    let len = fdr.program_length();
    if len > sectors.len() {
        warn!(
            "{}: program length {} exceeds {} loaded bytes",
            fdr.name(),
            len,
            sectors.len()
        );
    }
    sectors[..len.min(sectors.len())].to_vec()
}

fn variable_records(fdr: &FileDescriptor<'_>, sectors: &[u8]) -> Vec<u8> {
    let sectors_in_file = fdr.sectors_in_file() as usize;
    let mut out = Vec::new();

    for i in 0..sectors_in_file {
        let base = i * SECTOR_SIZE;
        if base >= sectors.len() {
            warn!(
                "{}: descriptor claims {} sectors, only {} loaded",
                fdr.name(),
                sectors_in_file,
                i
            );
            break;
        }
        let limit = if i + 1 == sectors_in_file {
            fdr.last_byte_last_sector() as usize
        } else {
            SECTOR_SIZE
        };

        let mut consumed = 0usize;
        while consumed < limit {
            let Some(&len) = sectors.get(base + consumed) else {
                break;
            };
            let len = len as usize;
            if consumed + len > limit {
                break;
            }
            let start = (base + consumed + 1).min(sectors.len());
            let end = (start + len).min(sectors.len());
            out.extend_from_slice(&sectors[start..end]);
            out.push(RECORD_SEPARATOR);
            consumed += 1 + len;
        }
    }

    out
}

fn fixed_records(fdr: &FileDescriptor<'_>, sectors: &[u8]) -> Vec<u8> {
    let sectors_in_file = fdr.sectors_in_file() as usize;
    let record_length = fdr.record_length() as usize;
    let records_per_sector = fdr.records_per_sector() as usize;
    let mut remaining = fdr.number_of_records() as usize;
    let mut out = Vec::with_capacity(remaining * record_length);

    for i in 0..sectors_in_file {
        if remaining == 0 {
            break;
        }
        let base = i * SECTOR_SIZE;
        if base >= sectors.len() {
            warn!(
                "{}: {} records left but only {} sectors loaded",
                fdr.name(),
                remaining,
                i
            );
            break;
        }
        let n = remaining.min(records_per_sector);
        let end = (base + n * record_length).min(sectors.len());
        out.extend_from_slice(&sectors[base..end]);
        remaining -= n;
    }

    out
}
