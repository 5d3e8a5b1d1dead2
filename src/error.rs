use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiskError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid volume: {0}")]
    InvalidVolume(String),

    #[error("Sectors {start}+{count} go beyond last sector {sector_count}")]
    SectorOutOfRange {
        start: usize,
        count: usize,
        sector_count: usize,
    },

    #[error("Descriptor pointer {pointer:#x} is beyond last sector {sector_count}")]
    DescriptorOutOfRange { pointer: u16, sector_count: usize },

    #[error("File not found on disk: {0}")]
    FileNotFound(String),
}
