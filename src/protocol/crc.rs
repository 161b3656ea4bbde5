//! Table-driven CRC-32 (reflected, polynomial `0xEDB88320`).
//!
//! ISO 3309 / ITU-T V.42 parameterization: initial value `0xFFFFFFFF`,
//! final XOR `0xFFFFFFFF`. The incremental form composes:
//! `crc32_update(crc32_update(0, a), b) == crc32(a ‖ b)`.

const POLYNOMIAL: u32 = 0xEDB8_8320;

const fn crc_entry(index: u32) -> u32 {
    let mut crc = index;
    let mut bit = 0;
    while bit < 8 {
        crc = if crc & 1 != 0 { (crc >> 1) ^ POLYNOMIAL } else { crc >> 1 };
        bit += 1;
    }
    crc
}

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = crc_entry(i as u32);
        i += 1;
    }
    table
}

static CRC_TABLE: [u32; 256] = build_table();

/// Fold `data` into a running CRC. Start with `crc = 0`.
pub fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    let mut crc = !crc;
    for &byte in data {
        let idx = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC_TABLE[idx];
    }
    !crc
}

/// CRC-32 of `data` in one shot.
pub fn crc32(data: &[u8]) -> u32 {
    crc32_update(0, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_input() {
        assert_eq!(crc32(b""), 0x0000_0000);
    }

    #[test]
    fn check_vector() {
        // The standard check value for this parameterization.
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn single_byte() {
        assert_eq!(crc32(b"a"), 0xE8B7_BE43);
    }

    #[test]
    fn incremental_matches_one_shot() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let (a, b) = data.split_at(17);
        assert_eq!(crc32_update(crc32_update(0, a), b), crc32(data));
    }

    #[test]
    fn sensitive_to_single_bit_flip() {
        let mut data = vec![0x55u8; 64];
        let before = crc32(&data);
        data[40] ^= 0x01;
        assert_ne!(crc32(&data), before);
    }

    proptest! {
        #[test]
        fn composition_holds_for_any_split(
            a in proptest::collection::vec(any::<u8>(), 0..256),
            b in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let mut joined = a.clone();
            joined.extend_from_slice(&b);
            prop_assert_eq!(crc32_update(crc32_update(0, &a), &b), crc32(&joined));
        }

        #[test]
        fn byte_at_a_time_equals_one_shot(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let mut crc = 0;
            for byte in &data {
                crc = crc32_update(crc, std::slice::from_ref(byte));
            }
            prop_assert_eq!(crc, crc32(&data));
        }
    }
}
