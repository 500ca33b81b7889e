//! Hand-written DES/3DES. Code outside this module only sees [`BlockCipher`].

pub mod bits;
pub mod des;
pub mod triple_des;

pub use des::Des;
pub use triple_des::{cbc_decrypt, cbc_encrypt, TripleDes};

pub const BLOCK_SIZE: usize = 8;

pub type Block = [u8; BLOCK_SIZE];

pub trait BlockCipher {
    fn encrypt_block(&self, block: Block) -> Block;
    fn decrypt_block(&self, block: Block) -> Block;
}
