//! Data-carrying and miscellaneous packets (RFC 4880 §5.6 to §5.14)

use bytes::Bytes;

use crate::body::BodyCursor;
use crate::error::{VellumError, VellumResult};
use crate::packet::signature::Subpacket;
use crate::types::CompressionAlgorithm;

/// Compressed data packet; the payload is kept compressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedPacket {
    algorithm: CompressionAlgorithm,
    data: Bytes,
}

impl CompressedPacket {
    pub fn new(algorithm: CompressionAlgorithm, data: impl Into<Bytes>) -> Self {
        Self {
            algorithm,
            data: data.into(),
        }
    }

    pub fn parse(body: Bytes) -> VellumResult<Self> {
        let mut cursor = BodyCursor::new(body, "compressed data packet");
        let algorithm = CompressionAlgorithm::from_u8(cursor.u8()?);
        Ok(Self {
            algorithm,
            data: cursor.rest(),
        })
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut out = Vec::with_capacity(1 + self.data.len());
        out.push(self.algorithm.to_u8());
        out.extend_from_slice(&self.data);
        Bytes::from(out)
    }

    pub fn algorithm(&self) -> CompressionAlgorithm {
        self.algorithm
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Marker packet, always the three octets "PGP"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkerPacket;

impl MarkerPacket {
    pub const BODY: &'static [u8; 3] = b"PGP";

    pub fn parse(body: Bytes) -> VellumResult<Self> {
        let mut cursor = BodyCursor::new(body, "marker packet");
        let marker: [u8; 3] = cursor.array()?;
        if &marker != Self::BODY {
            return Err(cursor.error(format_args!("unexpected marker {}", hex::encode(marker))));
        }
        cursor.finish()?;
        Ok(MarkerPacket)
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::from_static(Self::BODY)
    }
}

/// Literal data packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralPacket {
    /// `b` binary, `t` text, `u` UTF-8
    format: u8,
    filename: Bytes,
    date: u32,
    data: Bytes,
}

impl LiteralPacket {
    /// # Errors
    /// [`VellumError::InvalidArgument`] when `filename` is longer than the
    /// 255 bytes its length octet can count.
    pub fn new(format: u8, filename: impl Into<Bytes>, date: u32, data: impl Into<Bytes>) -> VellumResult<Self> {
        let filename = filename.into();
        if filename.len() > 0xFF {
            return Err(VellumError::invalid_argument(format!(
                "literal filename of {} bytes is longer than 255",
                filename.len()
            )));
        }
        Ok(Self {
            format,
            filename,
            date,
            data: data.into(),
        })
    }

    pub fn parse(body: Bytes) -> VellumResult<Self> {
        let mut cursor = BodyCursor::new(body, "literal data packet");
        let format = cursor.u8()?;
        let name_len = cursor.u8()?;
        let filename = cursor.bytes(usize::from(name_len))?;
        let date = cursor.u32()?;
        Ok(Self {
            format,
            filename,
            date,
            data: cursor.rest(),
        })
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut out = Vec::with_capacity(6 + self.filename.len() + self.data.len());
        out.push(self.format);
        out.push(self.filename.len() as u8);
        out.extend_from_slice(&self.filename);
        out.extend_from_slice(&self.date.to_be_bytes());
        out.extend_from_slice(&self.data);
        Bytes::from(out)
    }

    pub fn format(&self) -> u8 {
        self.format
    }

    pub fn filename(&self) -> &Bytes {
        &self.filename
    }

    pub fn date(&self) -> u32 {
        self.date
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// User ID packet, conventionally an RFC 2822 name-addr in UTF-8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdPacket {
    id: Bytes,
}

impl UserIdPacket {
    pub fn new(id: impl Into<Bytes>) -> Self {
        Self { id: id.into() }
    }

    pub fn parse(body: Bytes) -> VellumResult<Self> {
        Ok(Self { id: body })
    }

    pub fn to_bytes(&self) -> Bytes {
        self.id.clone()
    }

    pub fn id(&self) -> &Bytes {
        &self.id
    }

    /// The ID as text, replacing invalid UTF-8
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }
}

/// User attribute packet: subpackets framed like signature subpackets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAttributePacket {
    subpackets: Vec<Subpacket>,
}

impl UserAttributePacket {
    /// Subpacket type carrying a JPEG image
    pub const IMAGE: u8 = 1;

    pub fn new(subpackets: Vec<Subpacket>) -> Self {
        Self { subpackets }
    }

    pub fn parse(body: Bytes) -> VellumResult<Self> {
        Ok(Self {
            subpackets: Subpacket::read_all(body, "user attribute packet")?,
        })
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(Subpacket::write_all(&self.subpackets))
    }

    pub fn subpackets(&self) -> &[Subpacket] {
        &self.subpackets
    }
}

/// Symmetrically encrypted integrity protected data packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymEncIntegrityPacket {
    version: u8,
    data: Bytes,
}

impl SymEncIntegrityPacket {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            version: 1,
            data: data.into(),
        }
    }

    pub fn parse(body: Bytes) -> VellumResult<Self> {
        let mut cursor = BodyCursor::new(body, "integrity protected data packet");
        let version = cursor.u8()?;
        if version != 1 {
            return Err(cursor.error(format_args!("unsupported version {}", version)));
        }
        Ok(Self {
            version,
            data: cursor.rest(),
        })
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut out = Vec::with_capacity(1 + self.data.len());
        out.push(self.version);
        out.extend_from_slice(&self.data);
        Bytes::from(out)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Ciphertext, including the encrypted MDC packet
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Modification detection code packet: a SHA-1 hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModDetectionCodePacket {
    digest: [u8; 20],
}

impl ModDetectionCodePacket {
    pub fn new(digest: [u8; 20]) -> Self {
        Self { digest }
    }

    pub fn parse(body: Bytes) -> VellumResult<Self> {
        let mut cursor = BodyCursor::new(body, "modification detection code packet");
        let digest = cursor.array()?;
        cursor.finish()?;
        Ok(Self { digest })
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.digest)
    }

    pub fn digest(&self) -> &[u8; 20] {
        &self.digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_literal() {
        let body = hex!("62 08 746573742e747874 5c000000 68656c6c6f");
        let literal = LiteralPacket::parse(Bytes::from(body.to_vec())).unwrap();
        assert_eq!(literal.format(), b'b');
        assert_eq!(literal.filename().as_ref(), b"test.txt");
        assert_eq!(literal.date(), 0x5C00_0000);
        assert_eq!(literal.data().as_ref(), b"hello");
        assert_eq!(literal.to_bytes().as_ref(), &body[..]);

        let truncated = hex!("62 08 7465");
        assert!(LiteralPacket::parse(Bytes::from(truncated.to_vec())).is_err());
    }

    #[test]
    fn test_literal_filename_fits_length_octet() {
        let err = LiteralPacket::new(b'b', vec![b'a'; 256], 0, &b"payload"[..]).unwrap_err();
        assert!(matches!(err, VellumError::InvalidArgument(_)));

        let literal = LiteralPacket::new(b'b', vec![b'a'; 255], 0, &b"payload"[..]).unwrap();
        let bytes = literal.to_bytes();
        assert_eq!(bytes[1], 0xFF);
        assert_eq!(LiteralPacket::parse(bytes).unwrap(), literal);
    }

    #[test]
    fn test_marker() {
        assert_eq!(MarkerPacket::parse(Bytes::from_static(b"PGP")).unwrap(), MarkerPacket);
        assert!(MarkerPacket::parse(Bytes::from_static(b"PGX")).is_err());
        assert!(MarkerPacket::parse(Bytes::from_static(b"PGPP")).is_err());
        assert_eq!(MarkerPacket.to_bytes().as_ref(), b"PGP");
    }

    #[test]
    fn test_compressed() {
        let body = hex!("02 789c0300");
        let packet = CompressedPacket::parse(Bytes::from(body.to_vec())).unwrap();
        assert_eq!(packet.algorithm(), CompressionAlgorithm::Zlib);
        assert_eq!(packet.data().len(), 4);
        assert_eq!(packet.to_bytes().as_ref(), &body[..]);
        assert!(CompressedPacket::parse(Bytes::new()).is_err());
    }

    #[test]
    fn test_user_id_and_attribute() {
        let uid = UserIdPacket::new(Bytes::from_static(b"Alice <alice@example.org>"));
        assert_eq!(uid.to_string_lossy(), "Alice <alice@example.org>");

        let body = hex!("05 01 10000101");
        let attribute = UserAttributePacket::parse(Bytes::from(body.to_vec())).unwrap();
        assert_eq!(attribute.subpackets()[0].kind(), UserAttributePacket::IMAGE);
        assert_eq!(attribute.to_bytes().as_ref(), &body[..]);
    }

    #[test]
    fn test_seipd_and_mdc() {
        let seipd = SymEncIntegrityPacket::parse(Bytes::from(hex!("01 aabb").to_vec())).unwrap();
        assert_eq!(seipd.data().as_ref(), &hex!("aabb"));
        assert!(SymEncIntegrityPacket::parse(Bytes::from(hex!("02 aabb").to_vec())).is_err());

        let mdc = ModDetectionCodePacket::parse(Bytes::from(vec![0x42; 20])).unwrap();
        assert_eq!(mdc.digest(), &[0x42; 20]);
        assert!(ModDetectionCodePacket::parse(Bytes::from(vec![0x42; 19])).is_err());
        assert!(ModDetectionCodePacket::parse(Bytes::from(vec![0x42; 21])).is_err());
    }
}
