use super::Block;

const MASK_28: u32 = 0x0FFF_FFFF;

/// Applies a FIPS 46-3 permutation table (1-indexed from the MSB) to the low `width` bits.
pub fn permute(input: u64, width: u32, table: &[u8]) -> u64 {
    table
        .iter()
        .fold(0u64, |acc, &pos| (acc << 1) | ((input >> (width - pos as u32)) & 1))
}

pub fn rotate_left_28(half: u32, shift: u32) -> u32 {
    ((half << shift) | (half >> (28 - shift))) & MASK_28
}

pub fn split_56(value: u64) -> (u32, u32) {
    (((value >> 28) as u32) & MASK_28, (value as u32) & MASK_28)
}

pub fn join_56(left: u32, right: u32) -> u64 {
    ((left as u64) << 28) | right as u64
}

pub fn split_64(value: u64) -> (u32, u32) {
    ((value >> 32) as u32, value as u32)
}

pub fn join_64(left: u32, right: u32) -> u64 {
    ((left as u64) << 32) | right as u64
}

pub fn block_to_u64(block: Block) -> u64 {
    u64::from_be_bytes(block)
}

pub fn u64_to_block(value: u64) -> Block {
    value.to_be_bytes()
}

pub fn xor_blocks(a: Block, b: Block) -> Block {
    let mut out = a;
    out.iter_mut().zip(b.iter()).for_each(|(x, y)| *x ^= y);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_table_is_a_no_op() {
        let table: Vec<u8> = (1..=8).collect();
        assert_eq!(permute(0b1011_0010, 8, &table), 0b1011_0010);
    }

    #[test]
    fn reversing_table_mirrors_bits() {
        let table: Vec<u8> = (1..=8).rev().collect();
        assert_eq!(permute(0b1000_0001, 8, &table), 0b1000_0001);
        assert_eq!(permute(0b1100_0000, 8, &table), 0b0000_0011);
    }

    #[test]
    fn permutation_can_expand() {
        // Picking bit 1 twice duplicates the MSB
        assert_eq!(permute(0b1000, 4, &[1, 1, 4]), 0b110);
    }

    #[test]
    fn rotation_wraps_within_28_bits() {
        assert_eq!(rotate_left_28(0x800_0000, 1), 0x000_0001);
        assert_eq!(rotate_left_28(0xC00_0000, 2), 0x000_0003);
        assert_eq!(rotate_left_28(0x000_0001, 2), 0x000_0004);
    }

    #[test]
    fn halves_round_trip() {
        let (l, r) = split_56(0x00AB_CDEF_1234_567);
        assert_eq!(join_56(l, r), 0x00AB_CDEF_1234_567);
        let (l, r) = split_64(0x0123_4567_89AB_CDEF);
        assert_eq!((l, r), (0x0123_4567, 0x89AB_CDEF));
        assert_eq!(join_64(l, r), 0x0123_4567_89AB_CDEF);
    }

    #[test]
    fn xor_with_itself_is_zero() {
        let block = [0xA5; 8];
        assert_eq!(xor_blocks(block, block), [0u8; 8]);
        assert_eq!(xor_blocks(block, [0u8; 8]), block);
    }
}
