//! Little-endian primitive reads from a sequential byte stream
//!
//! Knows nothing about chunks. Every read consumes exactly the width of the
//! value it returns; running out of stream inside a value is reported as
//! [`LoadError::Truncated`] so callers can tell it apart from a clean stop.

use byteorder::{ByteOrder, LittleEndian};
use std::io::{self, Read};

use crate::error::LoadError;

/// Scratch size for bulk decodes (multiple of 4 and 2)
const SCRATCH_SIZE: usize = 16 * 1024;

/// Reader for fixed-width little-endian scalars and C strings
pub struct PrimitiveReader<R: Read> {
    inner: R,
    position: u64,
    scratch: Box<[u8]>,
}

impl<R: Read> PrimitiveReader<R> {
    /// Wrap a byte source
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            position: 0,
            scratch: vec![0u8; SCRATCH_SIZE].into_boxed_slice(),
        }
    }

    /// Absolute number of bytes consumed so far
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read as many bytes as the stream will give, up to `buf.len()`.
    ///
    /// Keeps asking after short reads and retries on `Interrupted`. Returns
    /// fewer bytes than requested only at end of stream.
    pub(crate) fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize, LoadError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.position += filled as u64;
        Ok(filled)
    }

    fn read_full(&mut self, buf: &mut [u8]) -> Result<(), LoadError> {
        let offset = self.position;
        let available = self.read_up_to(buf)?;
        if available < buf.len() {
            return Err(LoadError::Truncated {
                offset,
                needed: buf.len(),
                available,
            });
        }
        Ok(())
    }

    pub fn read_u16(&mut self) -> Result<u16, LoadError> {
        let mut buf = [0u8; 2];
        self.read_full(&mut buf)?;
        Ok(LittleEndian::read_u16(&buf))
    }

    pub fn read_u32(&mut self) -> Result<u32, LoadError> {
        let mut buf = [0u8; 4];
        self.read_full(&mut buf)?;
        Ok(LittleEndian::read_u32(&buf))
    }

    /// Read an IEEE-754 single (bit reinterpretation, not conversion)
    pub fn read_f32(&mut self) -> Result<f32, LoadError> {
        let mut buf = [0u8; 4];
        self.read_full(&mut buf)?;
        Ok(LittleEndian::read_f32(&buf))
    }

    /// Read bytes up to and including a NUL; the NUL is dropped.
    ///
    /// Bytes are collected raw and decoded once. 3DS names are 8-bit, so
    /// anything that is not UTF-8 is replaced rather than rejected.
    pub fn read_cstring(&mut self) -> Result<String, LoadError> {
        let mut bytes = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            self.read_full(&mut byte)?;
            if byte[0] == 0 {
                break;
            }
            bytes.push(byte[0]);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Decode `count` floats through the scratch buffer
    pub fn read_f32_array(&mut self, count: usize) -> Result<Vec<f32>, LoadError> {
        let mut out = vec![0.0f32; count];
        self.read_array(count, 4, |bytes, start| {
            let n = bytes.len() / 4;
            LittleEndian::read_f32_into(bytes, &mut out[start..start + n]);
            n
        })?;
        Ok(out)
    }

    /// Decode `count` 16-bit values through the scratch buffer
    pub fn read_u16_array(&mut self, count: usize) -> Result<Vec<u16>, LoadError> {
        let mut out = vec![0u16; count];
        self.read_array(count, 2, |bytes, start| {
            let n = bytes.len() / 2;
            LittleEndian::read_u16_into(bytes, &mut out[start..start + n]);
            n
        })?;
        Ok(out)
    }

    /// Shared bulk loop: fill whole elements into scratch, hand them to `decode`.
    fn read_array<F>(&mut self, count: usize, width: usize, mut decode: F) -> Result<(), LoadError>
    where
        F: FnMut(&[u8], usize) -> usize,
    {
        let offset = self.position;
        let needed = count * width;
        let per_pass = (SCRATCH_SIZE / width) * width;

        // Borrow the scratch out so `read_up_to` can take `&mut self`
        let mut scratch = std::mem::take(&mut self.scratch);
        let mut consumed = 0;
        let mut decoded = 0;
        let result = loop {
            if consumed == needed {
                break Ok(());
            }
            let want = per_pass.min(needed - consumed);
            let got = match self.read_up_to(&mut scratch[..want]) {
                Ok(got) => got,
                Err(e) => break Err(e),
            };
            consumed += got;
            if got < want {
                break Err(LoadError::Truncated {
                    offset,
                    needed,
                    available: consumed,
                });
            }
            decoded += decode(&scratch[..got], decoded);
        };
        self.scratch = scratch;
        result
    }

    /// Discard up to `n` bytes; returns how many were actually discarded.
    ///
    /// Running out of stream is not an error here.
    pub fn skip_bytes(&mut self, n: u64) -> Result<u64, LoadError> {
        let skipped = io::copy(&mut (&mut self.inner).take(n), &mut io::sink())?;
        self.position += skipped;
        Ok(skipped)
    }
}
