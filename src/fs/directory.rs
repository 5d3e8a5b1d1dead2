use byteorder::{BigEndian, ByteOrder};

/// Sector holding the file descriptor index.
pub const DIRECTORY_SECTOR: usize = 1;
/// Number of 16-bit pointer slots in the directory sector.
pub const DIRECTORY_SLOTS: usize = 128;

/// Decode the directory sector into descriptor sector pointers.
///
/// Empty (zero) slots are skipped wherever they appear; the remaining
/// pointers keep their slot order and duplicates are kept.
pub fn descriptor_pointers(sector: &[u8]) -> Vec<u16> {
    sector
        .chunks_exact(2)
        .take(DIRECTORY_SLOTS)
        .map(BigEndian::read_u16)
        .filter(|&ptr| ptr != 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_directory(slots: &[(usize, u16)]) -> [u8; 256] {
        let mut sector = [0u8; 256];
        for &(slot, ptr) in slots {
            sector[slot * 2..slot * 2 + 2].copy_from_slice(&ptr.to_be_bytes());
        }
        sector
    }

    #[test]
    fn test_empty_directory() {
        assert!(descriptor_pointers(&[0u8; 256]).is_empty());
    }

    #[test]
    fn test_pointers_are_big_endian() {
        let sector = make_directory(&[(0, 0x0102)]);
        assert_eq!(descriptor_pointers(&sector), vec![0x0102]);
    }

    #[test]
    fn test_zero_slots_skipped_order_kept() {
        // Holes anywhere in the table, including at the very start and end.
        let sector = make_directory(&[(1, 0x20), (2, 0x05), (40, 0x11), (127, 0x03)]);
        assert_eq!(descriptor_pointers(&sector), vec![0x20, 0x05, 0x11, 0x03]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let sector = make_directory(&[(0, 7), (1, 7), (3, 9)]);
        assert_eq!(descriptor_pointers(&sector), vec![7, 7, 9]);
    }

    #[test]
    fn test_every_slot_pattern_of_a_short_table() {
        // All 2^8 zero/nonzero patterns over the first eight slots.
        for mask in 0u16..256 {
            let slots: Vec<(usize, u16)> = (0..8)
                .filter(|bit| mask & (1 << bit) != 0)
                .map(|bit| (bit, bit as u16 + 2))
                .collect();
            let sector = make_directory(&slots);
            let expected: Vec<u16> = slots.iter().map(|&(_, ptr)| ptr).collect();
            assert_eq!(descriptor_pointers(&sector), expected, "mask {mask:#010b}");
        }
    }
}
