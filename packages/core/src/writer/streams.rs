//! Binary and text sub-writers
//!
//! Guards returned by `create_binary_write_stream` / `create_text_writer`.
//! Each borrows the writer for its lifetime, forwards chunks to the
//! back-end, and on close runs the matching end hook and pops the
//! Stream/TextValue scope.
//!
//! A synchronous guard dropped without `close` performs best-effort
//! disposal. An asynchronous guard cannot dispose from `drop`; the scope
//! stays open and the next `end` fails until `close` is awaited.

use std::fmt;
use std::io;

use crate::error::WriteResult;

use super::driver::ODataWriter;

/// Byte sink for a binary value
pub struct BinaryWriteStream<'a> {
    writer: &'a mut ODataWriter,
    closed: bool,
}

impl fmt::Debug for BinaryWriteStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryWriteStream")
            .field("closed", &self.closed)
            .finish()
    }
}

impl<'a> BinaryWriteStream<'a> {
    pub(crate) fn new(writer: &'a mut ODataWriter) -> Self {
        Self {
            writer,
            closed: false,
        }
    }

    /// Close the stream, returning control to the writer.
    pub fn close(mut self) -> WriteResult<()> {
        self.closed = true;
        self.writer.stream_disposed_sync()
    }
}

impl io::Write for BinaryWriteStream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer
            .stream_chunk_sync(buf)
            .map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for BinaryWriteStream<'_> {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.writer.stream_disposed_sync();
        }
    }
}

/// Character sink for a text value
pub struct TextValueWriter<'a> {
    writer: &'a mut ODataWriter,
    closed: bool,
}

impl<'a> TextValueWriter<'a> {
    pub(crate) fn new(writer: &'a mut ODataWriter) -> Self {
        Self {
            writer,
            closed: false,
        }
    }

    /// Close the sink, returning control to the writer.
    pub fn close(mut self) -> WriteResult<()> {
        self.closed = true;
        self.writer.stream_disposed_sync()
    }
}

impl fmt::Write for TextValueWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.writer.text_chunk_sync(s).map_err(|_| fmt::Error)
    }
}

impl Drop for TextValueWriter<'_> {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.writer.stream_disposed_sync();
        }
    }
}

/// Async byte sink for a binary value
pub struct AsyncBinaryWriteStream<'a> {
    writer: &'a mut ODataWriter,
}

impl<'a> AsyncBinaryWriteStream<'a> {
    pub(crate) fn new(writer: &'a mut ODataWriter) -> Self {
        Self { writer }
    }

    pub async fn write_all(&mut self, chunk: &[u8]) -> WriteResult<()> {
        self.writer.stream_chunk_async(chunk).await
    }

    /// Close the stream; must be awaited before the writer is used again.
    pub async fn close(self) -> WriteResult<()> {
        self.writer.stream_disposed_async().await
    }
}

/// Async character sink for a text value
pub struct AsyncTextValueWriter<'a> {
    writer: &'a mut ODataWriter,
}

impl<'a> AsyncTextValueWriter<'a> {
    pub(crate) fn new(writer: &'a mut ODataWriter) -> Self {
        Self { writer }
    }

    pub async fn write_str(&mut self, chunk: &str) -> WriteResult<()> {
        self.writer.text_chunk_async(chunk).await
    }

    /// Close the sink; must be awaited before the writer is used again.
    pub async fn close(self) -> WriteResult<()> {
        self.writer.stream_disposed_async().await
    }
}
