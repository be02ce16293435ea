//! Bounds-checked cursor over archive bytes.

use super::ArchiveError;

/// Longest 7-bit length prefix accepted (enough for a u32).
const MAX_VARINT_BYTES: usize = 5;

pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8], ArchiveError> {
        if len > self.remaining() {
            return Err(ArchiveError::UnexpectedEof { offset: self.pos, wanted: len });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), ArchiveError> {
        self.take(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, ArchiveError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32_le(&mut self) -> Result<u32, ArchiveError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Length prefix: little-endian groups of 7 bits, high bit set on every
    /// byte except the last.
    pub fn read_7bit_len(&mut self) -> Result<usize, ArchiveError> {
        let start = self.pos;
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_BYTES {
            let byte = self.read_u8()?;
            value |= u64::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return usize::try_from(value).map_err(|_| ArchiveError::VarintOverflow { offset: start });
            }
        }
        Err(ArchiveError::VarintOverflow { offset: start })
    }

    /// Length-prefixed string. Invalid UTF-8 is replaced, not rejected.
    pub fn read_string(&mut self) -> Result<String, ArchiveError> {
        let len = self.read_7bit_len()?;
        let bytes = self.take(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Strings up to (and consuming) an empty one.
    pub fn read_string_list(&mut self) -> Result<Vec<String>, ArchiveError> {
        let mut items = Vec::new();
        loop {
            let item = self.read_string()?;
            if item.is_empty() {
                return Ok(items);
            }
            items.push(item);
        }
    }
}

/// Append `text` with its 7-bit length prefix. Used to build test archives.
#[cfg(test)]
pub(crate) fn write_string(out: &mut Vec<u8>, text: &str) {
    let mut len = text.len();
    loop {
        let byte = (len & 0x7F) as u8;
        len >>= 7;
        if len == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
    out.extend_from_slice(text.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_byte_length_prefix() {
        let text = "x".repeat(300);
        let mut data = Vec::new();
        write_string(&mut data, &text);
        assert_eq!(&data[..2], &[0xAC, 0x02]);

        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_string().unwrap(), text);
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_runaway_varint_is_rejected() {
        let data = [0xFF; 8];
        let mut reader = ByteReader::new(&data);
        assert!(matches!(reader.read_7bit_len(), Err(ArchiveError::VarintOverflow { offset: 0 })));
    }

    #[test]
    fn test_short_string_is_eof() {
        let data = [5, b'a', b'b'];
        let mut reader = ByteReader::new(&data);
        assert!(matches!(reader.read_string(), Err(ArchiveError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_string_list_stops_at_empty() {
        let mut data = Vec::new();
        for item in ["A", "B", "", "C"] {
            write_string(&mut data, item);
        }
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_string_list().unwrap(), vec!["A", "B"]);
        assert_eq!(reader.read_string().unwrap(), "C");
    }

    #[test]
    fn test_lossy_utf8() {
        let data = [2, 0xC3, 0x28];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_string().unwrap(), "\u{FFFD}(");
    }

    #[test]
    fn test_u32_little_endian() {
        let data = [0x01, 0x02, 0x00, 0x00];
        assert_eq!(ByteReader::new(&data).read_u32_le().unwrap(), 0x0201);
    }
}
