use serde::Serialize;

/// Size in bytes of one packed cluster entry.
pub const CLUSTER_ENTRY_LEN: usize = 3;
/// Number of cluster entries in a file descriptor.
pub const CLUSTER_ENTRIES: usize = 76;

/// One contiguous run of a file's sectors.
///
/// `offset` is cumulative: the logical index (counting from 0) of the last
/// file sector held by this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub sector: u16,
    pub offset: u16,
    /// The packed on-disk bytes this entry was decoded from.
    #[serde(skip)]
    pub raw: [u8; CLUSTER_ENTRY_LEN],
}

/// Unpack a 3-byte cluster entry.
///
/// Layout is nibble-interleaved: `byte0` is the low byte of the sector
/// number, the low nibble of `byte1` its high nibble; the high nibble of
/// `byte1` is the low nibble of the offset and `byte2` its high byte.
pub fn decode_cluster(raw: [u8; CLUSTER_ENTRY_LEN]) -> Cluster {
    let sector = raw[0] as u16 | (((raw[1] & 0x0F) as u16) << 8);
    let offset = ((raw[2] as u16) << 4) | (raw[1] >> 4) as u16;
    Cluster {
        sector,
        offset,
        raw,
    }
}

/// Pack a sector number and cumulative offset (12 bits each).
pub fn encode_cluster(sector: u16, offset: u16) -> [u8; CLUSTER_ENTRY_LEN] {
    [
        (sector & 0xFF) as u8,
        ((sector >> 8) & 0x0F) as u8 | (((offset & 0x0F) as u8) << 4),
        ((offset >> 4) & 0xFF) as u8,
    ]
}

/// Iterator over the cluster entries of a descriptor.
///
/// Stops at the first entry whose sector number is zero, or once all
/// entries in the list are consumed.
#[derive(Debug, Clone)]
pub struct ClusterChain<'a> {
    entries: std::slice::ChunksExact<'a, u8>,
    done: bool,
}

impl<'a> ClusterChain<'a> {
    pub fn new(list: &'a [u8]) -> Self {
        let len = list.len().min(CLUSTER_ENTRIES * CLUSTER_ENTRY_LEN);
        Self {
            entries: list[..len].chunks_exact(CLUSTER_ENTRY_LEN),
            done: false,
        }
    }

    /// Cumulative offset of the last entry, or 0 for an empty chain.
    pub fn last_offset(self) -> u16 {
        self.last().map_or(0, |cluster| cluster.offset)
    }
}

impl Iterator for ClusterChain<'_> {
    type Item = Cluster;

    fn next(&mut self) -> Option<Cluster> {
        if self.done {
            return None;
        }
        let entry = self.entries.next()?;
        let cluster = decode_cluster([entry[0], entry[1], entry[2]]);
        if cluster.sector == 0 {
            self.done = true;
            return None;
        }
        Some(cluster)
    }
}

impl std::iter::FusedIterator for ClusterChain<'_> {}
