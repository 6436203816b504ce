//! INTEGER / ENUMERATED values

use std::fmt;

use bytes::Bytes;

use crate::error::{VellumError, VellumResult};

/// Arbitrary precision integer kept in its minimal two's complement form
///
/// The content octets are stored as-is, so values parsed from the wire share
/// the input buffer. Any width is accepted; conversions to machine integers
/// are fallible.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Integer {
    bytes: Bytes,
}

impl Integer {
    pub const ZERO: Integer = Integer::from_static(&[0x00]);
    pub const ONE: Integer = Integer::from_static(&[0x01]);

    /// Build from content octets known to be minimal
    ///
    /// Only meant for constants; nothing is validated.
    pub const fn from_static(bytes: &'static [u8]) -> Self {
        Self {
            bytes: Bytes::from_static(bytes),
        }
    }

    /// Parse INTEGER content octets
    ///
    /// # Errors
    /// [`VellumError::Structural`] when the content is empty or not minimal
    /// (a leading `0x00` before a byte with the high bit clear, or a leading
    /// `0xFF` before a byte with the high bit set).
    pub fn from_content(bytes: Bytes) -> VellumResult<Self> {
        match bytes.as_ref() {
            [] => Err(VellumError::structural("empty INTEGER content")),
            [0x00, next, ..] if next & 0x80 == 0 => Err(VellumError::structural(
                "non-minimal INTEGER encoding (redundant leading 0x00)",
            )),
            [0xFF, next, ..] if next & 0x80 != 0 => Err(VellumError::structural(
                "non-minimal INTEGER encoding (redundant leading 0xFF)",
            )),
            _ => Ok(Self { bytes }),
        }
    }

    pub fn from_i64(value: i64) -> Self {
        let raw = value.to_be_bytes();
        let skip = raw
            .windows(2)
            .take_while(|pair| {
                (pair[0] == 0x00 && pair[1] & 0x80 == 0) || (pair[0] == 0xFF && pair[1] & 0x80 != 0)
            })
            .count();
        Self {
            bytes: Bytes::copy_from_slice(&raw[skip..]),
        }
    }

    pub fn from_u64(value: u64) -> Self {
        Self::from_unsigned_bytes(&value.to_be_bytes())
    }

    /// Build a non-negative integer from a big-endian magnitude
    pub fn from_unsigned_bytes(magnitude: &[u8]) -> Self {
        let significant = match magnitude.iter().position(|&b| b != 0) {
            Some(start) => &magnitude[start..],
            None => return Self::ZERO,
        };
        let mut bytes = Vec::with_capacity(significant.len() + 1);
        if significant[0] & 0x80 != 0 {
            bytes.push(0x00);
        }
        bytes.extend_from_slice(significant);
        Self {
            bytes: Bytes::from(bytes),
        }
    }

    /// Two's complement content octets
    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn is_negative(&self) -> bool {
        self.bytes.first().is_some_and(|b| b & 0x80 != 0)
    }

    pub fn is_zero(&self) -> bool {
        self.bytes.as_ref() == [0x00]
    }

    /// Big-endian magnitude of a non-negative value, without sign padding
    pub fn to_unsigned_bytes(&self) -> Option<&[u8]> {
        if self.is_negative() {
            return None;
        }
        match self.bytes.as_ref() {
            [0x00, rest @ ..] if !rest.is_empty() => Some(rest),
            all => Some(all),
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        if self.bytes.len() > 8 {
            return None;
        }
        let fill = if self.is_negative() { 0xFF } else { 0x00 };
        let mut raw = [fill; 8];
        raw[8 - self.bytes.len()..].copy_from_slice(&self.bytes);
        Some(i64::from_be_bytes(raw))
    }

    pub fn to_u64(&self) -> Option<u64> {
        let magnitude = self.to_unsigned_bytes()?;
        if magnitude.len() > 8 {
            return None;
        }
        let mut raw = [0u8; 8];
        raw[8 - magnitude.len()..].copy_from_slice(magnitude);
        Some(u64::from_be_bytes(raw))
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<i32> for Integer {
    fn from(value: i32) -> Self {
        Self::from_i64(i64::from(value))
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<u32> for Integer {
    fn from(value: u32) -> Self {
        Self::from_u64(u64::from(value))
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(value) = self.to_i64() {
            return write!(f, "{}", value);
        }
        f.write_str("0x")?;
        for byte in self.bytes.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Integer({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_encoding() {
        assert_eq!(Integer::from_i64(0).as_bytes().as_ref(), &[0x00]);
        assert_eq!(Integer::from_i64(127).as_bytes().as_ref(), &[0x7F]);
        assert_eq!(Integer::from_i64(128).as_bytes().as_ref(), &[0x00, 0x80]);
        assert_eq!(Integer::from_i64(-1).as_bytes().as_ref(), &[0xFF]);
        assert_eq!(Integer::from_i64(-128).as_bytes().as_ref(), &[0x80]);
        assert_eq!(Integer::from_i64(-129).as_bytes().as_ref(), &[0xFF, 0x7F]);
        assert_eq!(Integer::from_i64(12345).as_bytes().as_ref(), &[0x30, 0x39]);
    }

    #[test]
    fn test_unsigned() {
        assert_eq!(Integer::from_u64(u64::MAX).as_bytes().len(), 9);
        assert_eq!(Integer::from_u64(u64::MAX).to_u64(), Some(u64::MAX));
        assert_eq!(Integer::from_unsigned_bytes(&[0, 0, 0x80]).as_bytes().as_ref(), &[0x00, 0x80]);
        assert_eq!(Integer::from_unsigned_bytes(&[]), Integer::ZERO);
        assert_eq!(Integer::from_i64(-5).to_u64(), None);
    }

    #[test]
    fn test_conversions() {
        for value in [0i64, 1, -1, 255, -256, i64::MAX, i64::MIN] {
            assert_eq!(Integer::from_i64(value).to_i64(), Some(value));
        }
        let big = Integer::from_unsigned_bytes(&[0x01; 12]);
        assert_eq!(big.to_i64(), None);
        assert_eq!(big.to_unsigned_bytes(), Some(&[0x01; 12][..]));
    }

    #[test]
    fn test_non_minimal_rejected() {
        assert!(Integer::from_content(Bytes::from_static(&[])).is_err());
        assert!(Integer::from_content(Bytes::from_static(&[0x00, 0x7F])).is_err());
        assert!(Integer::from_content(Bytes::from_static(&[0xFF, 0x80])).is_err());
        assert!(Integer::from_content(Bytes::from_static(&[0x00, 0x80])).is_ok());
        assert!(Integer::from_content(Bytes::from_static(&[0xFF, 0x7F])).is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(Integer::from_i64(-42).to_string(), "-42");
        let big = Integer::from_unsigned_bytes(&[0xAB; 9]);
        assert_eq!(big.to_string(), "0x00ababababababababab");
    }
}
