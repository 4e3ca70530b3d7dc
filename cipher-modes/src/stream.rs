//! Streaming adapters over a [`CryptoTransform`]
//!
//! [`CryptoWriter`] transforms everything written to it and forwards the
//! result to an inner writer. [`CryptoReader`] pulls from an inner reader
//! and yields transformed bytes. Both hold back the last block of input so
//! that padding is only applied or removed by `transform_final_block`.
//!
//! Finalization happens once: explicitly through `flush_final_block` or
//! `close`, or implicitly on drop. Writers flush their inner stream only
//! when closed or dropped, never through [`Write::flush`], so nested writers
//! flush the innermost stream exactly once.

use std::io::{self, Read, Seek, SeekFrom, Write};

use zeroize::Zeroize;

use crate::error::{CipherModeError, Result};
use crate::transform::CryptoTransform;

const READ_CHUNK: usize = 4096;

/// Direction a crypto stream was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoStreamMode {
    Read,
    Write,
}

/// Properties shared by both stream directions.
///
/// Crypto streams are forward-only: length and position are not available.
pub trait CryptoStream {
    fn mode(&self) -> CryptoStreamMode;

    /// Whether the final block has been transformed
    fn has_flushed_final_block(&self) -> bool;

    fn can_read(&self) -> bool {
        self.mode() == CryptoStreamMode::Read
    }

    fn can_write(&self) -> bool {
        self.mode() == CryptoStreamMode::Write
    }

    fn can_seek(&self) -> bool {
        false
    }

    fn length(&self) -> Result<u64> {
        Err(CipherModeError::NotSupported("length"))
    }

    fn position(&self) -> Result<u64> {
        Err(CipherModeError::NotSupported("position"))
    }

    fn set_position(&mut self, _position: u64) -> Result<()> {
        Err(CipherModeError::NotSupported("set_position"))
    }

    fn set_length(&mut self, _length: u64) -> Result<()> {
        Err(CipherModeError::NotSupported("set_length"))
    }
}

/// Runs every whole block of `pending` except the last one through
/// `transform` and removes them from the buffer.
///
/// Returns `None` while at most one block is pending.
fn transform_all_but_last<T: CryptoTransform>(
    transform: &mut T,
    pending: &mut Vec<u8>,
) -> Result<Option<Vec<u8>>> {
    let input_size = transform.input_block_size();
    if pending.len() <= input_size {
        return Ok(None);
    }

    let count = (pending.len() - 1) / input_size * input_size;
    let mut output = vec![0u8; count / input_size * transform.output_block_size()];
    let written = transform.transform_block(&pending[..count], &mut output)?;
    output.truncate(written);

    pending[..count].zeroize();
    pending.drain(..count);
    Ok(Some(output))
}

/// Write-mode crypto stream.
pub struct CryptoWriter<W: Write, T: CryptoTransform> {
    inner: Option<W>,
    transform: T,
    pending: Vec<u8>,
    finalized: bool,
}

impl<W: Write, T: CryptoTransform> CryptoWriter<W, T> {
    pub fn new(inner: W, transform: T) -> Self {
        let capacity = transform.input_block_size() * 2;
        Self {
            inner: Some(inner),
            transform,
            pending: Vec::with_capacity(capacity),
            finalized: false,
        }
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Transforms the held-back bytes with padding and writes the result.
    ///
    /// # Errors
    ///
    /// [`CipherModeError::AlreadyFinalized`] on a second call.
    pub fn flush_final_block(&mut self) -> Result<()> {
        if self.finalized {
            return Err(CipherModeError::AlreadyFinalized);
        }
        self.finalized = true;

        let result = self.transform.transform_final_block(&self.pending);
        self.pending.zeroize();
        self.pending.clear();
        let output = result?;

        log::debug!("write stream finalized: {} bytes in final block", output.len());
        if let Some(inner) = self.inner.as_mut() {
            inner.write_all(&output)?;
        }
        Ok(())
    }

    /// Finalizes if needed, flushes the inner writer and returns it
    pub fn close(mut self) -> Result<W> {
        if !self.finalized {
            self.flush_final_block()?;
        }
        match self.inner.take() {
            Some(mut inner) => {
                inner.flush()?;
                Ok(inner)
            }
            None => Err(CipherModeError::Disposed("CryptoWriter")),
        }
    }
}

impl<W: Write, T: CryptoTransform> CryptoStream for CryptoWriter<W, T> {
    fn mode(&self) -> CryptoStreamMode {
        CryptoStreamMode::Write
    }

    fn has_flushed_final_block(&self) -> bool {
        self.finalized
    }
}

impl<W: Write, T: CryptoTransform> Write for CryptoWriter<W, T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.finalized {
            return Err(CipherModeError::NotSupported("write after the final block").into());
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let buffered = self.pending.len();
        self.pending.extend_from_slice(buf);
        let output = match transform_all_but_last(&mut self.transform, &mut self.pending) {
            Ok(output) => output,
            Err(err) => {
                // the rejected bytes count as not written
                self.pending[buffered..].zeroize();
                self.pending.truncate(buffered);
                return Err(err.into());
            }
        };
        if let (Some(output), Some(inner)) = (output, self.inner.as_mut()) {
            inner.write_all(&output)?;
        }
        Ok(buf.len())
    }

    /// Does not reach the inner writer; see [`CryptoWriter::close`]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write, T: CryptoTransform> Seek for CryptoWriter<W, T> {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(CipherModeError::NotSupported("seek").into())
    }
}

impl<W: Write, T: CryptoTransform> Drop for CryptoWriter<W, T> {
    fn drop(&mut self) {
        if self.inner.is_none() {
            return;
        }
        if !self.finalized {
            if let Err(err) = self.flush_final_block() {
                log::warn!("failed to finalize crypto stream on drop: {err}");
            }
        }
        if let Some(mut inner) = self.inner.take() {
            if let Err(err) = inner.flush() {
                log::warn!("failed to flush inner stream on drop: {err}");
            }
        }
    }
}

/// Read-mode crypto stream.
pub struct CryptoReader<R: Read, T: CryptoTransform> {
    inner: Option<R>,
    transform: T,
    pending: Vec<u8>,
    output: Vec<u8>,
    output_pos: usize,
    finalized: bool,
    failed: Option<io::ErrorKind>,
}

impl<R: Read, T: CryptoTransform> CryptoReader<R, T> {
    pub fn new(inner: R, transform: T) -> Self {
        Self {
            inner: Some(inner),
            transform,
            pending: Vec::new(),
            output: Vec::new(),
            output_pos: 0,
            finalized: false,
            failed: None,
        }
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Runs the final transform over whatever input is still held back and
    /// returns the inner reader. Transformed bytes not yet read are discarded.
    ///
    /// # Errors
    ///
    /// Repeats the error of an earlier failed read.
    pub fn close(mut self) -> Result<R> {
        if let Some(err) = self.earlier_failure() {
            return Err(err.into());
        }
        if !self.finalized {
            self.finish()?;
        }
        self.inner
            .take()
            .ok_or(CipherModeError::Disposed("CryptoReader"))
    }

    fn finish(&mut self) -> Result<()> {
        self.finalized = true;
        let result = self.transform.transform_final_block(&self.pending);
        self.pending.zeroize();
        self.pending.clear();
        let output = result?;
        log::debug!("read stream finalized: {} bytes in final block", output.len());
        self.set_output(output);
        Ok(())
    }

    fn earlier_failure(&self) -> Option<io::Error> {
        self.failed
            .map(|kind| io::Error::new(kind, "crypto stream failed on an earlier read"))
    }

    /// Records a transform failure; every later read reports it again
    fn fail(&mut self, err: CipherModeError) -> io::Error {
        let err = io::Error::from(err);
        self.failed = Some(err.kind());
        self.pending.zeroize();
        self.pending.clear();
        err
    }

    fn set_output(&mut self, output: Vec<u8>) {
        self.output.zeroize();
        self.output = output;
        self.output_pos = 0;
    }

    /// Reads one chunk from the inner reader; `false` at end of input
    fn fill(&mut self) -> io::Result<bool> {
        let Some(inner) = self.inner.as_mut() else {
            return Ok(false);
        };
        let mut chunk = vec![0u8; READ_CHUNK.max(self.transform.input_block_size())];
        loop {
            match inner.read(&mut chunk) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.pending.extend_from_slice(&chunk[..n]);
                    chunk.zeroize();
                    return Ok(true);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

impl<R: Read, T: CryptoTransform> CryptoStream for CryptoReader<R, T> {
    fn mode(&self) -> CryptoStreamMode {
        CryptoStreamMode::Read
    }

    fn has_flushed_final_block(&self) -> bool {
        self.finalized
    }
}

impl<R: Read, T: CryptoTransform> Read for CryptoReader<R, T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(err) = self.earlier_failure() {
            return Err(err);
        }
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if self.output_pos < self.output.len() {
                let available = &self.output[self.output_pos..];
                let n = available.len().min(buf.len());
                buf[..n].copy_from_slice(&available[..n]);
                self.output_pos += n;
                return Ok(n);
            }
            if self.finalized {
                return Ok(0);
            }

            if !self.fill()? {
                if let Err(err) = self.finish() {
                    return Err(self.fail(err));
                }
                continue;
            }
            match transform_all_but_last(&mut self.transform, &mut self.pending) {
                Ok(Some(output)) => self.set_output(output),
                Ok(None) => {}
                Err(err) => return Err(self.fail(err)),
            }
        }
    }
}

impl<R: Read, T: CryptoTransform> Seek for CryptoReader<R, T> {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(CipherModeError::NotSupported("seek").into())
    }
}

impl<R: Read, T: CryptoTransform> Drop for CryptoReader<R, T> {
    fn drop(&mut self) {
        if !self.finalized && self.failed.is_none() {
            if let Err(err) = self.finish() {
                log::warn!("failed to finalize crypto stream on drop: {err}");
            }
        }
        self.output.zeroize();
    }
}
