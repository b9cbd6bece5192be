//! Encrypting and decrypting stream adapters.
//!
//! These adapters wrap an underlying byte sink or source so callers can
//! write or read plaintext through the standard `std::io` traits while
//! ciphertext flows to or from the wrapped stream. The IV travels in
//! band: the encrypting side emits it as the first BLOCK_SIZE bytes of
//! the sink, unencrypted, and the decrypting side consumes it from the
//! head of the source.

use std::io::{self, Read, Write};

use rand::RngCore;

use crate::cbc::{CbcDecryptor, CbcEncryptor, BLOCK_SIZE};
use keyfold_common::{Error, Result};

/// Size of the initialization vector, one cipher block.
pub const IV_SIZE: usize = BLOCK_SIZE;

/// How many ciphertext bytes the reader pulls from its source per refill.
const READ_CHUNK: usize = 4096;

/// Writer adapter that encrypts everything written through it.
///
/// The final, padded block is only produced by [`EncryptingWriter::finish`];
/// dropping an unfinished writer leaves the underlying stream truncated
/// and undecryptable, so callers must finish on every path, including
/// the happy one.
pub struct EncryptingWriter<W: Write> {
    inner: W,
    engine: CbcEncryptor,
    scratch: Vec<u8>,
}

impl<W: Write> EncryptingWriter<W> {
    /// Create an encrypting writer with a freshly generated random IV.
    ///
    /// # Postconditions
    /// - The IV has already been written, unencrypted, to `inner`
    ///
    /// # Errors
    /// - Key is the wrong length
    /// - Writing the IV to `inner` fails
    pub fn new(key: &[u8], inner: W) -> Result<Self> {
        let mut iv = [0u8; IV_SIZE];
        rand::thread_rng().fill_bytes(&mut iv);
        Self::with_iv(key, iv, inner)
    }

    /// Create an encrypting writer with an explicit IV.
    ///
    /// Deterministic construction for tests; production callers should
    /// prefer [`EncryptingWriter::new`].
    pub fn with_iv(key: &[u8], iv: [u8; IV_SIZE], mut inner: W) -> Result<Self> {
        let engine = CbcEncryptor::new(key, &iv)?;
        inner.write_all(&iv)?;
        Ok(Self {
            inner,
            engine,
            scratch: Vec::with_capacity(READ_CHUNK),
        })
    }

    /// Encrypt and flush the final padded block, returning the sink.
    ///
    /// # Errors
    /// - Writing or flushing the underlying sink fails
    pub fn finish(mut self) -> Result<W> {
        self.scratch.clear();
        self.engine.finish(&mut self.scratch);
        self.inner.write_all(&self.scratch)?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for EncryptingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.scratch.clear();
        self.engine.update(buf, &mut self.scratch);
        self.inner.write_all(&self.scratch)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Buffered partial blocks cannot be flushed early; only the
        // completed ciphertext is pushed down.
        self.inner.flush()
    }
}

/// Reader adapter that decrypts everything read through it.
///
/// Tolerates sources that return reads of any size, down to one byte at
/// a time. When the source reaches end-of-stream the withheld final
/// block is validated and released exactly once; a padding failure
/// surfaces as an `InvalidData` read error.
pub struct DecryptingReader<R: Read> {
    inner: R,
    engine: Option<CbcDecryptor>,
    /// Decrypted bytes not yet handed to the caller.
    plain: Vec<u8>,
    pos: usize,
    eof: bool,
}

impl<R: Read> DecryptingReader<R> {
    /// Create a decrypting reader, consuming the IV from the source head.
    ///
    /// # Errors
    /// - Key is the wrong length
    /// - Fewer than IV_SIZE bytes are available
    pub fn new(key: &[u8], mut inner: R) -> Result<Self> {
        let mut iv = [0u8; IV_SIZE];
        inner
            .read_exact(&mut iv)
            .map_err(|_| Error::Crypto("no initialization vector in stream".to_string()))?;
        Self::with_iv(key, iv, inner)
    }

    /// Create a decrypting reader with an explicit IV; the source is
    /// expected to contain ciphertext only.
    pub fn with_iv(key: &[u8], iv: [u8; IV_SIZE], inner: R) -> Result<Self> {
        let engine = CbcDecryptor::new(key, &iv)?;
        Ok(Self {
            inner,
            engine: Some(engine),
            plain: Vec::with_capacity(READ_CHUNK),
            pos: 0,
            eof: false,
        })
    }

    /// Pull one chunk from the source into the plaintext buffer.
    ///
    /// On source EOF runs the engine's finalization, releasing the
    /// withheld final block.
    fn refill(&mut self) -> io::Result<()> {
        self.plain.clear();
        self.pos = 0;

        let mut chunk = [0u8; READ_CHUNK];
        while self.plain.is_empty() && !self.eof {
            let n = self.inner.read(&mut chunk)?;
            if n == 0 {
                // finish() consumes the engine; a second EOF cannot
                // re-run it.
                let engine = self.engine.take().expect("decryptor already finished");
                engine.finish(&mut self.plain).map_err(io::Error::from)?;
                self.eof = true;
            } else if let Some(engine) = self.engine.as_mut() {
                engine.update(&chunk[..n], &mut self.plain);
            }
        }
        Ok(())
    }
}

impl<R: Read> Read for DecryptingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pos == self.plain.len() {
            if self.eof {
                return Ok(0);
            }
            self.refill()?;
            if self.plain.is_empty() {
                return Ok(0);
            }
        }

        let n = buf.len().min(self.plain.len() - self.pos);
        buf[..n].copy_from_slice(&self.plain[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
