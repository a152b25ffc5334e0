// traci/storage.rs
//
// Big-endian encoding of TraCI values. Strings are an i32 byte length
// followed by UTF-8 bytes.

use crate::error::{Error, Result};
use crate::shared_data::Position;
use crate::traci::constants::{
    POSITION_2D, TYPE_COMPOUND, TYPE_DOUBLE, TYPE_INTEGER, TYPE_STRING, TYPE_STRINGLIST,
};

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Outgoing byte buffer.
#[derive(Debug, Default, Clone)]
pub struct Storage {
    buf: BytesMut,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buf.put_u8(value);
        self
    }

    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.buf.put_i32(value);
        self
    }

    pub fn write_f64(&mut self, value: f64) -> &mut Self {
        self.buf.put_f64(value);
        self
    }

    pub fn write_string(&mut self, value: &str) -> &mut Self {
        self.buf.put_i32(value.len() as i32);
        self.buf.put_slice(value.as_bytes());
        self
    }

    pub fn write_string_list(&mut self, values: &[String]) -> &mut Self {
        self.buf.put_i32(values.len() as i32);
        for value in values {
            self.write_string(value);
        }
        self
    }

    pub fn write_typed_f64(&mut self, value: f64) -> &mut Self {
        self.write_u8(TYPE_DOUBLE).write_f64(value)
    }

    pub fn write_compound_header(&mut self, items: i32) -> &mut Self {
        self.write_u8(TYPE_COMPOUND).write_i32(items)
    }

    pub fn write_position_2d(&mut self, position: Position) -> &mut Self {
        self.write_u8(POSITION_2D)
            .write_f64(position.x)
            .write_f64(position.y)
    }

    pub fn extend(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.put_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Wraps one command as `[len][id][payload]`, switching to the extended
/// `[0][len: i32][id][payload]` header when the short length would overflow.
pub fn frame_command(command: u8, payload: &[u8]) -> Bytes {
    let short_len = 1 + 1 + payload.len();
    let mut out = BytesMut::with_capacity(short_len + 4);
    if short_len <= u8::MAX as usize {
        out.put_u8(short_len as u8);
    } else {
        out.put_u8(0);
        out.put_i32((1 + 4 + 1 + payload.len()) as i32);
    }
    out.put_u8(command);
    out.put_slice(payload);
    out.freeze()
}

/// Prefixes a sequence of framed commands with the message length.
pub fn frame_message(commands: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(4 + commands.len());
    out.put_i32((4 + commands.len()) as i32);
    out.put_slice(commands);
    out.freeze()
}

/// Cursor over an incoming message body. Every read checks the remaining
/// length first, so truncated input is a protocol error rather than a panic.
#[derive(Debug, Clone)]
pub struct StorageReader {
    buf: Bytes,
    start: usize,
}

impl StorageReader {
    pub fn new(buf: Bytes) -> Self {
        let start = buf.len();
        Self { buf, start }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.start - self.buf.remaining()
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// The unread tail, without copying.
    pub fn into_remaining(self) -> Bytes {
        self.buf
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.buf.remaining() < n {
            return Err(Error::Protocol(format!(
                "needed {} bytes at offset {}, only {} left",
                n,
                self.position(),
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.buf.advance(n);
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.ensure(8)?;
        Ok(self.buf.get_f64())
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(Error::Protocol(format!("negative string length {}", len)));
        }
        self.ensure(len as usize)?;
        let raw = self.buf.split_to(len as usize);
        std::str::from_utf8(&raw)
            .map(str::to_string)
            .map_err(|e| Error::Protocol(format!("string is not UTF-8: {}", e)))
    }

    pub fn read_string_list(&mut self) -> Result<Vec<String>> {
        let count = self.read_i32()?;
        if count < 0 {
            return Err(Error::Protocol(format!("negative list length {}", count)));
        }
        (0..count).map(|_| self.read_string()).collect()
    }

    /// Reads a command length, following the extended form when the short byte is zero.
    /// Returns the length of the command including its header.
    pub fn read_command_length(&mut self) -> Result<usize> {
        match self.read_u8()? {
            0 => {
                let len = self.read_i32()?;
                if len < 6 {
                    return Err(Error::Protocol(format!("bad extended length {}", len)));
                }
                Ok(len as usize)
            }
            len => Ok(len as usize),
        }
    }

    pub fn expect_type(&mut self, expected: u8) -> Result<()> {
        let found = self.read_u8()?;
        if found != expected {
            return Err(Error::Protocol(format!(
                "expected type 0x{:02x}, found 0x{:02x}",
                expected, found
            )));
        }
        Ok(())
    }

    pub fn read_typed_i32(&mut self) -> Result<i32> {
        self.expect_type(TYPE_INTEGER)?;
        self.read_i32()
    }

    pub fn read_typed_f64(&mut self) -> Result<f64> {
        self.expect_type(TYPE_DOUBLE)?;
        self.read_f64()
    }

    pub fn read_typed_string(&mut self) -> Result<String> {
        self.expect_type(TYPE_STRING)?;
        self.read_string()
    }

    pub fn read_typed_string_list(&mut self) -> Result<Vec<String>> {
        self.expect_type(TYPE_STRINGLIST)?;
        self.read_string_list()
    }

    pub fn read_typed_position_2d(&mut self) -> Result<Position> {
        self.expect_type(POSITION_2D)?;
        let x = self.read_f64()?;
        let y = self.read_f64()?;
        Ok(Position::new(x, y))
    }
}
