//! Packet headers (RFC 4880 §4.2)
//!
//! ```text
//! old format:  1 0 t t t t l l   then 1, 2, 4 or no length octets
//! new format:  1 1 t t t t t t   then 1, 2 or 5 length octets, or a
//!                                partial length octet
//! ```

use std::io::{self, Read};

use crate::error::{VellumError, VellumResult};
use crate::types::PacketTag;

/// Largest length a two-octet new-format length can carry
pub const MAX_TWO_OCTET_LENGTH: u32 = 8383;

/// Smallest first chunk a partial body may start with
pub const MIN_FIRST_PARTIAL_CHUNK: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFormat {
    Old,
    New,
}

/// Length announced by a header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLength {
    Definite(u32),
    /// First chunk of a partial body, more chunks follow
    Partial(u32),
    /// Old format length type 3: the body runs to the end of the stream
    Indeterminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    tag: PacketTag,
    format: HeaderFormat,
    length: BodyLength,
}

impl PacketHeader {
    pub fn new(tag: PacketTag, format: HeaderFormat, length: BodyLength) -> Self {
        Self {
            tag,
            format,
            length,
        }
    }

    pub fn tag(&self) -> PacketTag {
        self.tag
    }

    pub fn format(&self) -> HeaderFormat {
        self.format
    }

    pub fn length(&self) -> BodyLength {
        self.length
    }

    /// Tag carried by a header's first octet
    ///
    /// # Errors
    /// [`VellumError::Structural`] when bit 7 is clear.
    pub fn tag_of(first: u8) -> VellumResult<PacketTag> {
        if first & 0x80 == 0 {
            return Err(VellumError::structural(format!(
                "invalid packet header octet 0x{:02X}: bit 7 clear",
                first
            )));
        }
        let number = if first & 0x40 != 0 {
            first & 0x3F
        } else {
            (first >> 2) & 0x0F
        };
        Ok(PacketTag::from_u8(number))
    }

    /// Read the rest of a header whose first octet was already taken from
    /// `reader`
    pub fn read_after<R: Read>(first: u8, reader: &mut R) -> VellumResult<Self> {
        let tag = Self::tag_of(first)?;
        if first & 0x40 != 0 {
            let length = read_new_length(reader)?;
            return Ok(Self::new(tag, HeaderFormat::New, length));
        }
        let length = match first & 0x03 {
            0 => BodyLength::Definite(u32::from(read_u8(reader)?)),
            1 => {
                let mut buf = [0u8; 2];
                read_exact(reader, &mut buf)?;
                BodyLength::Definite(u32::from(u16::from_be_bytes(buf)))
            }
            2 => {
                let mut buf = [0u8; 4];
                read_exact(reader, &mut buf)?;
                BodyLength::Definite(u32::from_be_bytes(buf))
            }
            _ => BodyLength::Indeterminate,
        };
        Ok(Self::new(tag, HeaderFormat::Old, length))
    }

    /// Read a full header from `reader`
    pub fn read_from<R: Read>(reader: &mut R) -> VellumResult<Self> {
        let first = read_u8(reader)?;
        Self::read_after(first, reader)
    }

    /// Encode the header
    ///
    /// Old-format definite lengths use the smallest length type that fits.
    ///
    /// # Errors
    /// [`VellumError::InvalidArgument`] for combinations the wire format
    /// cannot express: an old-format tag above 15, an old-format partial
    /// length, a new-format indeterminate length, or a partial chunk that is
    /// not a power of two up to 2^30.
    pub fn encode(&self) -> VellumResult<Vec<u8>> {
        let tag = self.tag.to_u8();
        let mut out = Vec::with_capacity(6);
        match self.format {
            HeaderFormat::New => {
                if tag > 0x3F {
                    return Err(VellumError::invalid_argument(format!(
                        "packet tag {} does not fit six bits",
                        tag
                    )));
                }
                out.push(0xC0 | tag);
                match self.length {
                    BodyLength::Definite(length) => encode_new_length(length, &mut out),
                    BodyLength::Partial(chunk) => out.push(partial_length_octet(chunk)?),
                    BodyLength::Indeterminate => {
                        return Err(VellumError::invalid_argument(
                            "new-format headers have no indeterminate length",
                        ));
                    }
                }
            }
            HeaderFormat::Old => {
                if !self.tag.fits_old_format() {
                    return Err(VellumError::invalid_argument(format!(
                        "{} cannot use an old-format header",
                        self.tag
                    )));
                }
                let base = 0x80 | (tag << 2);
                match self.length {
                    BodyLength::Definite(length) if length <= 0xFF => {
                        out.push(base);
                        out.push(length as u8);
                    }
                    BodyLength::Definite(length) if length <= 0xFFFF => {
                        out.push(base | 0x01);
                        out.extend_from_slice(&(length as u16).to_be_bytes());
                    }
                    BodyLength::Definite(length) => {
                        out.push(base | 0x02);
                        out.extend_from_slice(&length.to_be_bytes());
                    }
                    BodyLength::Indeterminate => out.push(base | 0x03),
                    BodyLength::Partial(_) => {
                        return Err(VellumError::invalid_argument(
                            "old-format headers have no partial lengths",
                        ));
                    }
                }
            }
        }
        Ok(out)
    }
}

/// New-format length octets
pub fn encode_new_length(length: u32, out: &mut Vec<u8>) {
    if length < 192 {
        out.push(length as u8);
    } else if length <= MAX_TWO_OCTET_LENGTH {
        let biased = length - 192;
        out.push(((biased >> 8) as u8) + 192);
        out.push(biased as u8);
    } else {
        out.push(0xFF);
        out.extend_from_slice(&length.to_be_bytes());
    }
}

/// The length octet announcing a partial chunk of `chunk` bytes
pub fn partial_length_octet(chunk: u32) -> VellumResult<u8> {
    if !chunk.is_power_of_two() || chunk > 1 << 30 {
        return Err(VellumError::invalid_argument(format!(
            "partial chunk length {} is not a power of two up to 2^30",
            chunk
        )));
    }
    Ok(0xE0 | chunk.trailing_zeros() as u8)
}

/// Read new-format length octets, also used between partial chunks
pub fn read_new_length<R: Read>(reader: &mut R) -> VellumResult<BodyLength> {
    let first = read_u8(reader)?;
    let length = match first {
        0..=191 => BodyLength::Definite(u32::from(first)),
        192..=223 => {
            let second = read_u8(reader)?;
            BodyLength::Definite(((u32::from(first) - 192) << 8) + u32::from(second) + 192)
        }
        255 => {
            let mut buf = [0u8; 4];
            read_exact(reader, &mut buf)?;
            BodyLength::Definite(u32::from_be_bytes(buf))
        }
        _ => BodyLength::Partial(1 << (first & 0x1F)),
    };
    Ok(length)
}

pub(crate) fn read_u8<R: Read>(reader: &mut R) -> VellumResult<u8> {
    let mut buf = [0u8; 1];
    read_exact(reader, &mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> VellumResult<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => VellumError::structural("truncated packet header"),
        _ => VellumError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn read(bytes: &[u8]) -> PacketHeader {
        let mut reader = bytes;
        let header = PacketHeader::read_from(&mut reader).unwrap();
        assert!(reader.is_empty(), "header octets left over");
        header
    }

    #[test]
    fn test_new_format_lengths() {
        let cases: [(&[u8], u32); 5] = [
            (&hex!("cd 64"), 100),
            (&hex!("cd c0 00"), 192),
            (&hex!("cd c5 fb"), 1723),
            (&hex!("cd df ff"), 8383),
            (&hex!("cd ff 00 01 86 a0"), 100_000),
        ];
        for (bytes, length) in cases {
            let header = read(bytes);
            assert_eq!(header.tag(), PacketTag::UserId);
            assert_eq!(header.format(), HeaderFormat::New);
            assert_eq!(header.length(), BodyLength::Definite(length));
            assert_eq!(header.encode().unwrap(), bytes);
        }
    }

    #[test]
    fn test_partial_length() {
        let header = read(&hex!("cb e9"));
        assert_eq!(header.tag(), PacketTag::Literal);
        assert_eq!(header.length(), BodyLength::Partial(512));
        assert_eq!(header.encode().unwrap(), hex!("cb e9"));
        assert!(partial_length_octet(100).is_err());
    }

    #[test]
    fn test_old_format_lengths() {
        let cases: [(&[u8], BodyLength); 4] = [
            (&hex!("b4 0a"), BodyLength::Definite(10)),
            (&hex!("b5 01 00"), BodyLength::Definite(256)),
            (&hex!("b6 00 01 00 00"), BodyLength::Definite(65536)),
            (&hex!("b7"), BodyLength::Indeterminate),
        ];
        for (bytes, length) in cases {
            let header = read(bytes);
            assert_eq!(header.tag(), PacketTag::UserId);
            assert_eq!(header.format(), HeaderFormat::Old);
            assert_eq!(header.length(), length);
            assert_eq!(header.encode().unwrap(), bytes);
        }
    }

    #[test]
    fn test_invalid_headers() {
        assert!(PacketHeader::tag_of(0x3F).is_err());
        assert!(PacketHeader::read_from(&mut &hex!("cd ff 00")[..]).is_err());
        assert!(PacketHeader::read_from(&mut &[0u8; 0][..]).is_err());

        let seipd = PacketHeader::new(PacketTag::SymEncIntegrity, HeaderFormat::Old, BodyLength::Definite(1));
        assert!(seipd.encode().is_err());
        let partial = PacketHeader::new(PacketTag::Literal, HeaderFormat::Old, BodyLength::Partial(512));
        assert!(partial.encode().is_err());
    }
}
