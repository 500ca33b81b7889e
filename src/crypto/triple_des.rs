use super::bits::xor_blocks;
use super::des::Des;
use super::{Block, BlockCipher, BLOCK_SIZE};
use crate::error::CryptoError;

pub const KEY_SIZE: usize = 24;

/// Three-key Triple DES, encrypt-decrypt-encrypt.
#[derive(Clone)]
pub struct TripleDes {
    k1: Des,
    k2: Des,
    k3: Des,
}

impl TripleDes {
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        let subkey = |i: usize| -> [u8; 8] {
            let mut part = [0u8; 8];
            part.copy_from_slice(&key[i * 8..(i + 1) * 8]);
            part
        };
        Self {
            k1: Des::new(&subkey(0)),
            k2: Des::new(&subkey(1)),
            k3: Des::new(&subkey(2)),
        }
    }

    pub fn from_slice(key: &[u8]) -> Result<Self, CryptoError> {
        let key: &[u8; KEY_SIZE] = key.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: key.len(),
        })?;
        Ok(Self::new(key))
    }
}

impl BlockCipher for TripleDes {
    fn encrypt_block(&self, block: Block) -> Block {
        self.k3
            .encrypt_block(self.k2.decrypt_block(self.k1.encrypt_block(block)))
    }

    fn decrypt_block(&self, block: Block) -> Block {
        self.k1
            .decrypt_block(self.k2.encrypt_block(self.k3.decrypt_block(block)))
    }
}

impl std::fmt::Debug for TripleDes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TripleDes(**redacted**)")
    }
}

fn blocks(data: &[u8]) -> Result<impl Iterator<Item = Block> + '_, CryptoError> {
    if data.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidBlockLength(data.len()));
    }
    Ok(data.chunks_exact(BLOCK_SIZE).map(|chunk| {
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(chunk);
        block
    }))
}

// no padding: data must already be block-aligned
pub fn cbc_encrypt<C: BlockCipher>(
    cipher: &C,
    iv: Block,
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut out = Vec::with_capacity(data.len());
    let mut previous = iv;
    for block in blocks(data)? {
        previous = cipher.encrypt_block(xor_blocks(block, previous));
        out.extend_from_slice(&previous);
    }
    Ok(out)
}

pub fn cbc_decrypt<C: BlockCipher>(
    cipher: &C,
    iv: Block,
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut out = Vec::with_capacity(data.len());
    let mut previous = iv;
    for block in blocks(data)? {
        out.extend_from_slice(&xor_blocks(cipher.decrypt_block(block), previous));
        previous = block;
    }
    Ok(out)
}
