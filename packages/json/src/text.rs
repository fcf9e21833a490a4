//! Low-level JSON text writer
//!
//! Tracks container nesting and comma placement so the payload serializer
//! can emit members in whatever order the hooks arrive. Output accumulates
//! in a byte buffer the owning back-end drains on flush.

use bytes::{BufMut, Bytes, BytesMut};
use odwire_core::error::{constructors, WriteResult};
use serde_json::Value;

#[derive(Debug, Clone, Copy)]
enum Container {
    Object,
    Array,
}

/// JSON syntax writer with per-level separator tracking
#[derive(Debug, Default)]
pub struct JsonTextWriter {
    buf: BytesMut,
    levels: Vec<(Container, usize)>,
    /// A member name was written; the next value attaches without a comma
    pending_value: bool,
}

impl JsonTextWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Comma handling shared by every value-position write.
    fn separate(&mut self) {
        if self.pending_value {
            self.pending_value = false;
            return;
        }
        if let Some((_, count)) = self.levels.last_mut() {
            if *count > 0 {
                self.buf.put_u8(b',');
            }
            *count += 1;
        }
    }

    pub fn start_object(&mut self) {
        self.separate();
        self.buf.put_u8(b'{');
        self.levels.push((Container::Object, 0));
    }

    pub fn end_object(&mut self) {
        self.levels.pop();
        self.buf.put_u8(b'}');
    }

    pub fn start_array(&mut self) {
        self.separate();
        self.buf.put_u8(b'[');
        self.levels.push((Container::Array, 0));
    }

    pub fn end_array(&mut self) {
        self.levels.pop();
        self.buf.put_u8(b']');
    }

    /// Write a member name; the following write is its value.
    pub fn name(&mut self, name: &str) {
        self.separate();
        self.write_escaped(name);
        self.buf.put_u8(b':');
        self.pending_value = true;
    }

    /// Write any JSON value through serde.
    pub fn value(&mut self, value: &Value) -> WriteResult<()> {
        self.separate();
        let rendered = serde_json::to_vec(value).map_err(constructors::backend)?;
        self.buf.put_slice(&rendered);
        Ok(())
    }

    pub fn string(&mut self, text: &str) {
        self.separate();
        self.write_escaped(text);
    }

    pub fn null(&mut self) {
        self.separate();
        self.buf.put_slice(b"null");
    }

    /// Open a string value whose content arrives in fragments.
    pub fn begin_string_value(&mut self) {
        self.separate();
        self.buf.put_u8(b'"');
    }

    /// Append escaped content to an open string value.
    pub fn string_fragment(&mut self, text: &str) {
        self.escape_fragment(text);
    }

    pub fn end_string_value(&mut self) {
        self.buf.put_u8(b'"');
    }

    /// True when a member name is waiting for its value.
    #[must_use]
    pub fn has_pending_value(&self) -> bool {
        self.pending_value
    }

    /// Drain the accumulated output.
    pub fn take(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    fn write_escaped(&mut self, text: &str) {
        self.buf.put_u8(b'"');
        self.escape_fragment(text);
        self.buf.put_u8(b'"');
    }

    fn escape_fragment(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '"' => self.buf.put_slice(b"\\\""),
                '\\' => self.buf.put_slice(b"\\\\"),
                '\n' => self.buf.put_slice(b"\\n"),
                '\r' => self.buf.put_slice(b"\\r"),
                '\t' => self.buf.put_slice(b"\\t"),
                '\u{08}' => self.buf.put_slice(b"\\b"),
                '\u{0c}' => self.buf.put_slice(b"\\f"),
                c if (c as u32) < 0x20 => {
                    let mut encoded = [0u8; 6];
                    let hex = b"0123456789abcdef";
                    encoded.copy_from_slice(b"\\u0000");
                    encoded[4] = hex[((c as u32) >> 4) as usize];
                    encoded[5] = hex[((c as u32) & 0xf) as usize];
                    self.buf.put_slice(&encoded);
                }
                c => {
                    let mut utf8 = [0u8; 4];
                    self.buf.put_slice(c.encode_utf8(&mut utf8).as_bytes());
                }
            }
        }
    }
}
