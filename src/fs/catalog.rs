use std::fmt;

use serde::Serialize;

use super::cluster::Cluster;
use super::entry::FileEntry;
use super::TiDisk;
use crate::error::DiskError;

/// Volume-level part of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeSummary {
    pub mark: String,
    pub name: String,
    pub total_sectors: u16,
    pub free_sectors: i64,
    pub used_sectors: u32,
    pub protect: char,
    pub sectors_per_track: u8,
    pub tracks_per_side: u8,
    pub sides: u8,
    pub density: u8,
}

/// One directory row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub entry: FileEntry,
    pub type_label: String,
    pub clusters: Vec<Cluster>,
}

/// Header summary plus every file descriptor, in directory order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub volume: VolumeSummary,
    pub files: Vec<CatalogEntry>,
}

impl Catalog {
    /// Collect the listing. Never touches file contents.
    pub fn build(disk: &TiDisk) -> Result<Self, DiskError> {
        let vib = disk.header();
        let volume = VolumeSummary {
            mark: vib.mark().iter().map(|&b| b as char).collect(),
            name: vib.name(),
            total_sectors: vib.sector_count(),
            free_sectors: disk.free_sectors(),
            used_sectors: disk.used_sectors(),
            protect: vib.protect() as char,
            sectors_per_track: vib.sectors_per_track(),
            tracks_per_side: vib.tracks_per_side(),
            sides: vib.sides(),
            density: vib.density(),
        };

        let files = disk
            .descriptors()?
            .iter()
            .map(|fdr| CatalogEntry {
                entry: FileEntry::from(fdr),
                type_label: fdr.type_label(),
                clusters: fdr.clusters().collect(),
            })
            .collect();

        Ok(Self { volume, files })
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = &self.volume;
        writeln!(
            f,
            "{:>3}.{:<10}  Free={:4} Used={:4} {} {}S,{}T,{}S,{}D",
            v.mark,
            v.name,
            v.free_sectors,
            v.used_sectors,
            v.protect,
            v.sectors_per_track,
            v.tracks_per_side,
            v.sides,
            v.density
        )?;
        writeln!(f, "FDR Name       Size Type        P Sector(Offset)")?;
        writeln!(f, "--- ---------- ---- ----------- - --------------")?;

        for row in &self.files {
            let e = &row.entry;
            write!(
                f,
                "{:3x} {:<10} {:4} {:<11}  {} ",
                e.location,
                e.name,
                e.sectors,
                row.type_label,
                if e.protected { 'P' } else { ' ' }
            )?;
            for c in &row.clusters {
                write!(
                    f,
                    "{:02x}{:02x}{:02x} {:3x}({:x}) ",
                    c.raw[0], c.raw[1], c.raw[2], c.sector, c.offset
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
