//! Little-endian body encoding helpers shared by journal clients

use std::io::{self, Read};

/// Builds a frame body from length-prefixed fields.
#[derive(Debug, Default)]
pub struct BodyWriter {
    buf: Vec<u8>,
}

impl BodyWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn put_bool(&mut self, value: bool) -> &mut Self {
        self.put_u8(if value { 1 } else { 0 })
    }

    /// Writes a length-prefixed UTF-8 string.
    pub fn put_str(&mut self, value: &str) -> &mut Self {
        self.put_u32(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    /// Writes a presence byte followed by the string when present.
    pub fn put_opt_str(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            Some(v) => self.put_u8(1).put_str(v),
            None => self.put_u8(0),
        }
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads fields written by [`BodyWriter`] in the same order.
pub struct BodyReader<'a> {
    cursor: io::Cursor<&'a [u8]>,
}

impl<'a> BodyReader<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self {
            cursor: io::Cursor::new(body),
        }
    }

    pub fn u8(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.cursor.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.cursor.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn bool(&mut self) -> io::Result<bool> {
        Ok(self.u8()? != 0)
    }

    pub fn string(&mut self) -> io::Result<String> {
        let len = self.u32()? as usize;
        let remaining = (self.cursor.get_ref().len() as u64).saturating_sub(self.cursor.position());
        if len as u64 > remaining {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("string length {} exceeds remaining {} bytes", len, remaining),
            ));
        }
        let mut buf = vec![0u8; len];
        self.cursor.read_exact(&mut buf)?;
        String::from_utf8(buf).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e))
        })
    }

    pub fn opt_string(&mut self) -> io::Result<Option<String>> {
        match self.u8()? {
            0 => Ok(None),
            1 => Ok(Some(self.string()?)),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid presence byte: {}", other),
            )),
        }
    }

    /// Returns true when every byte of the body has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.cursor.position() as usize == self.cursor.get_ref().len()
    }
}
