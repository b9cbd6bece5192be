//! Streaming CBC block-cipher engine.
//!
//! This module implements CBC mode over AES-256 as an incremental,
//! stateful transform: callers feed arbitrary-sized chunks and the
//! engine buffers partial blocks across calls, so chunk boundaries
//! never need to align with cipher block boundaries.
//!
//! Finalization consumes the engine. The one-way Fresh → Working →
//! Finalized lifecycle is therefore enforced by move semantics: there
//! is no way to feed data after `finish`.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes256, Block};

use crate::keys::KEY_LENGTH;
use keyfold_common::{Error, Result};

/// Cipher block size in bytes.
pub const BLOCK_SIZE: usize = 16;

fn init_cipher(key: &[u8], iv: &[u8]) -> Result<(Aes256, Block)> {
    let cipher = Aes256::new_from_slice(key).map_err(|_| {
        Error::Crypto(format!(
            "Invalid key length: expected {}, got {}",
            KEY_LENGTH,
            key.len()
        ))
    })?;
    if iv.len() != BLOCK_SIZE {
        return Err(Error::Crypto(format!(
            "Invalid IV length: expected {}, got {}",
            BLOCK_SIZE,
            iv.len()
        )));
    }
    Ok((cipher, *Block::from_slice(iv)))
}

/// Incremental CBC encryptor.
///
/// Buffers plaintext until a full block accumulates; each complete block
/// is XORed with the previous ciphertext block (the IV for the first),
/// encrypted, and emitted. Trailing partial bytes stay buffered across
/// calls until [`CbcEncryptor::finish`] pads and emits them.
pub struct CbcEncryptor {
    cipher: Aes256,
    /// Previous ciphertext block; starts as the IV.
    chain: Block,
    /// Partial plaintext block, always shorter than BLOCK_SIZE between calls.
    pending: Vec<u8>,
}

impl CbcEncryptor {
    /// Create an encryptor for the given key and IV.
    ///
    /// # Errors
    /// - Key is not KEY_LENGTH bytes
    /// - IV is not BLOCK_SIZE bytes
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self> {
        let (cipher, chain) = init_cipher(key, iv)?;
        Ok(Self {
            cipher,
            chain,
            pending: Vec::with_capacity(BLOCK_SIZE),
        })
    }

    /// Encrypt a chunk of plaintext, appending ciphertext to `out`.
    ///
    /// # Postconditions
    /// - Every completed block is emitted; at most BLOCK_SIZE - 1 bytes
    ///   remain buffered
    pub fn update(&mut self, chunk: &[u8], out: &mut Vec<u8>) {
        self.pending.extend_from_slice(chunk);

        let mut offset = 0;
        while self.pending.len() - offset >= BLOCK_SIZE {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(&self.pending[offset..offset + BLOCK_SIZE]);
            offset += BLOCK_SIZE;
            self.encrypt_block(&block, out);
        }
        self.pending.drain(..offset);
    }

    /// Pad and emit the final block, consuming the encryptor.
    ///
    /// Padding follows PKCS#7: the pad byte value equals the number of
    /// pad bytes added, so block-aligned plaintext gains a full block of
    /// padding. Total ciphertext is always a non-zero multiple of
    /// BLOCK_SIZE.
    pub fn finish(mut self, out: &mut Vec<u8>) {
        let used = self.pending.len();
        let pad = (BLOCK_SIZE - used) as u8;

        let mut block = [pad; BLOCK_SIZE];
        block[..used].copy_from_slice(&self.pending);
        self.encrypt_block(&block, out);
    }

    fn encrypt_block(&mut self, plain: &[u8; BLOCK_SIZE], out: &mut Vec<u8>) {
        for (c, p) in self.chain.iter_mut().zip(plain) {
            *c ^= p;
        }
        self.cipher.encrypt_block(&mut self.chain);
        out.extend_from_slice(&self.chain);
    }
}

/// Incremental CBC decryptor.
///
/// Mirror of [`CbcEncryptor`], with one asymmetry: the last buffered
/// full block is always withheld, because it may carry padding that
/// only [`CbcDecryptor::finish`] can validate and strip.
pub struct CbcDecryptor {
    cipher: Aes256,
    /// Previous ciphertext block, saved before decrypting; starts as the IV.
    chain: Block,
    /// Buffered ciphertext: the withheld final block plus any partial tail.
    pending: Vec<u8>,
}

impl CbcDecryptor {
    /// Create a decryptor for the given key and IV.
    ///
    /// # Errors
    /// - Key is not KEY_LENGTH bytes
    /// - IV is not BLOCK_SIZE bytes
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self> {
        let (cipher, chain) = init_cipher(key, iv)?;
        Ok(Self {
            cipher,
            chain,
            pending: Vec::with_capacity(2 * BLOCK_SIZE),
        })
    }

    /// Decrypt a chunk of ciphertext, appending plaintext to `out`.
    ///
    /// A block is only decrypted once at least one more ciphertext byte
    /// has arrived after it, which guarantees the stream's final block
    /// is never emitted here.
    pub fn update(&mut self, chunk: &[u8], out: &mut Vec<u8>) {
        self.pending.extend_from_slice(chunk);

        let mut offset = 0;
        while self.pending.len() - offset > BLOCK_SIZE {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(&self.pending[offset..offset + BLOCK_SIZE]);
            offset += BLOCK_SIZE;
            self.decrypt_block(&block, out);
        }
        self.pending.drain(..offset);
    }

    /// Decrypt the withheld final block, validate and strip its padding,
    /// and emit the remaining plaintext. Consumes the decryptor.
    ///
    /// # Errors
    /// - `Error::Decrypt` if the buffered tail is not exactly one block
    ///   (truncated or non-block-aligned ciphertext)
    /// - `Error::Decrypt` if the trailing pad length is outside
    ///   `1..=BLOCK_SIZE` or the pad bytes disagree, the signature of a
    ///   wrong key or corrupted ciphertext
    pub fn finish(mut self, out: &mut Vec<u8>) -> Result<()> {
        if self.pending.len() != BLOCK_SIZE {
            return Err(Error::Decrypt(format!(
                "ciphertext is truncated or not block-aligned ({} trailing bytes)",
                self.pending.len()
            )));
        }

        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(&self.pending);

        let mut plain = Vec::with_capacity(BLOCK_SIZE);
        self.decrypt_block(&block, &mut plain);

        let pad = plain[BLOCK_SIZE - 1] as usize;
        if pad == 0 || pad > BLOCK_SIZE {
            return Err(Error::Decrypt("invalid padding".to_string()));
        }
        if plain[BLOCK_SIZE - pad..].iter().any(|&b| b as usize != pad) {
            return Err(Error::Decrypt("invalid padding".to_string()));
        }

        out.extend_from_slice(&plain[..BLOCK_SIZE - pad]);
        Ok(())
    }

    fn decrypt_block(&mut self, cipher_block: &[u8; BLOCK_SIZE], out: &mut Vec<u8>) {
        let mut block = Block::clone_from_slice(cipher_block);
        self.cipher.decrypt_block(&mut block);
        for (p, c) in block.iter_mut().zip(self.chain.iter()) {
            *p ^= c;
        }
        self.chain = *Block::from_slice(cipher_block);
        out.extend_from_slice(&block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const KEY: [u8; KEY_LENGTH] = [0x42; KEY_LENGTH];
    const IV: [u8; BLOCK_SIZE] = [0x24; BLOCK_SIZE];

    fn unhex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn encrypt_all(plaintext: &[u8]) -> Vec<u8> {
        let mut enc = CbcEncryptor::new(&KEY, &IV).unwrap();
        let mut out = Vec::new();
        enc.update(plaintext, &mut out);
        enc.finish(&mut out);
        out
    }

    fn decrypt_all(ciphertext: &[u8]) -> Result<Vec<u8>> {
        let mut dec = CbcDecryptor::new(&KEY, &IV).unwrap();
        let mut out = Vec::new();
        dec.update(ciphertext, &mut out);
        dec.finish(&mut out)?;
        Ok(out)
    }

    #[test]
    fn test_known_vector_sp800_38a() {
        // CBC-AES256.Encrypt, NIST SP 800-38A F.2.5, first block.
        let key = unhex("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4");
        let iv = unhex("000102030405060708090a0b0c0d0e0f");
        let plaintext = unhex("6bc1bee22e409f96e93d7e117393172a");

        let mut enc = CbcEncryptor::new(&key, &iv).unwrap();
        let mut out = Vec::new();
        enc.update(&plaintext, &mut out);
        enc.finish(&mut out);

        assert_eq!(&out[..BLOCK_SIZE], &unhex("f58c4c04d6e5f1ba779eabfb5f7bfbd6")[..]);
        // Aligned input gains exactly one padding block.
        assert_eq!(out.len(), 2 * BLOCK_SIZE);
    }

    #[test]
    fn test_roundtrip_block_boundaries() {
        // Lengths around block alignment: 0, 1, B-1, B, B+1.
        for len in [0usize, 1, 15, 16, 17, 100] {
            let plaintext: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let ciphertext = encrypt_all(&plaintext);

            assert_eq!(ciphertext.len() % BLOCK_SIZE, 0);
            assert!(!ciphertext.is_empty());
            assert_eq!(decrypt_all(&ciphertext).unwrap(), plaintext, "len {}", len);
        }
    }

    #[test]
    fn test_chunk_size_independence() {
        let plaintext: Vec<u8> = (0..133).map(|i| (i * 7) as u8).collect();

        let bulk = encrypt_all(&plaintext);

        let mut enc = CbcEncryptor::new(&KEY, &IV).unwrap();
        let mut bytewise = Vec::new();
        for byte in &plaintext {
            enc.update(std::slice::from_ref(byte), &mut bytewise);
        }
        enc.finish(&mut bytewise);

        assert_eq!(bulk, bytewise);
    }

    #[test]
    fn test_decrypt_chunk_size_independence() {
        let plaintext: Vec<u8> = (0..77).map(|i| (i * 3) as u8).collect();
        let ciphertext = encrypt_all(&plaintext);

        let mut dec = CbcDecryptor::new(&KEY, &IV).unwrap();
        let mut out = Vec::new();
        for byte in &ciphertext {
            dec.update(std::slice::from_ref(byte), &mut out);
        }
        dec.finish(&mut out).unwrap();

        assert_eq!(out, plaintext);
    }

    #[test]
    fn test_decryptor_withholds_final_block() {
        let plaintext = [0u8; 32];
        let ciphertext = encrypt_all(&plaintext); // 48 bytes

        let mut dec = CbcDecryptor::new(&KEY, &IV).unwrap();
        let mut out = Vec::new();
        dec.update(&ciphertext, &mut out);

        // Everything but the final (padding) block is released eagerly.
        assert_eq!(out.len(), ciphertext.len() - BLOCK_SIZE);
    }

    #[test]
    fn test_wrong_key_fails_or_differs() {
        let plaintext = b"attack at dawn, bring the keys";
        let ciphertext = encrypt_all(plaintext);

        let mut dec = CbcDecryptor::new(&[0x43; KEY_LENGTH], &IV).unwrap();
        let mut out = Vec::new();
        dec.update(&ciphertext, &mut out);
        let finished = dec.finish(&mut out);

        // Without an authentication tag the padding check is the only
        // gate; a wrong key must never reproduce the plaintext.
        assert!(finished.is_err() || out != plaintext);
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let ciphertext = encrypt_all(b"some plaintext that spans blocks");

        let mut dec = CbcDecryptor::new(&KEY, &IV).unwrap();
        let mut out = Vec::new();
        dec.update(&ciphertext[..ciphertext.len() - 7], &mut out);

        assert!(matches!(dec.finish(&mut out), Err(Error::Decrypt(_))));
    }

    #[test]
    fn test_empty_ciphertext_fails() {
        let dec = CbcDecryptor::new(&KEY, &IV).unwrap();
        let mut out = Vec::new();

        assert!(matches!(dec.finish(&mut out), Err(Error::Decrypt(_))));
    }

    #[test]
    fn test_invalid_key_length() {
        assert!(CbcEncryptor::new(&[0u8; 16], &IV).is_err());
        assert!(CbcDecryptor::new(&[0u8; 31], &IV).is_err());
    }

    #[test]
    fn test_invalid_iv_length() {
        assert!(CbcEncryptor::new(&KEY, &[0u8; 12]).is_err());
        assert!(CbcDecryptor::new(&KEY, &[]).is_err());
    }

    #[test]
    fn test_different_iv_different_ciphertext() {
        let plaintext = b"identical plaintext";

        let mut enc = CbcEncryptor::new(&KEY, &[1u8; BLOCK_SIZE]).unwrap();
        let mut ct1 = Vec::new();
        enc.update(plaintext, &mut ct1);
        enc.finish(&mut ct1);

        let mut enc = CbcEncryptor::new(&KEY, &[2u8; BLOCK_SIZE]).unwrap();
        let mut ct2 = Vec::new();
        enc.update(plaintext, &mut ct2);
        enc.finish(&mut ct2);

        assert_ne!(ct1, ct2);
    }

    proptest! {
        #[test]
        fn prop_roundtrip_any_length(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let ciphertext = encrypt_all(&data);
            prop_assert_eq!(decrypt_all(&ciphertext).unwrap(), data);
        }
    }
}
