//! Signature packets (RFC 4880 §5.2)

use bytes::Bytes;

use crate::body::BodyCursor;
use crate::error::VellumResult;
use crate::mpi::Mpi;
use crate::types::{HashAlgorithm, PublicKeyAlgorithm};

/// Subpacket type numbers
pub mod subpacket {
    pub const CREATION_TIME: u8 = 2;
    pub const EXPIRATION_TIME: u8 = 3;
    pub const EXPORTABLE: u8 = 4;
    pub const TRUST: u8 = 5;
    pub const REVOCABLE: u8 = 7;
    pub const KEY_EXPIRATION_TIME: u8 = 9;
    pub const PREFERRED_SYMMETRIC: u8 = 11;
    pub const ISSUER: u8 = 16;
    pub const NOTATION_DATA: u8 = 20;
    pub const PREFERRED_HASH: u8 = 21;
    pub const PRIMARY_USER_ID: u8 = 25;
    pub const KEY_FLAGS: u8 = 27;
    pub const SIGNERS_USER_ID: u8 = 28;
    pub const REVOCATION_REASON: u8 = 29;
    pub const FEATURES: u8 = 30;
    pub const EMBEDDED_SIGNATURE: u8 = 32;
    pub const ISSUER_FINGERPRINT: u8 = 33;
}

/// One subpacket of a signature or user attribute
///
/// The length normally takes the shortest form; `long_length` keeps a
/// five-octet length seen on the wire so the packet encodes back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subpacket {
    kind: u8,
    critical: bool,
    long_length: bool,
    data: Bytes,
}

impl Subpacket {
    pub fn new(kind: u8, critical: bool, data: impl Into<Bytes>) -> Self {
        Self {
            kind: kind & 0x7F,
            critical,
            long_length: false,
            data: data.into(),
        }
    }

    pub fn kind(&self) -> u8 {
        self.kind
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Reads the subpacket length, type octet and data
    fn read(cursor: &mut BodyCursor) -> VellumResult<Self> {
        let first = cursor.u8()?;
        let (length, long_length) = match first {
            0..=191 => (usize::from(first), false),
            192..=254 => {
                let second = cursor.u8()?;
                (((usize::from(first) - 192) << 8) + usize::from(second) + 192, false)
            }
            255 => (cursor.u32()? as usize, true),
        };
        if length == 0 {
            return Err(cursor.error("zero-length subpacket"));
        }
        let kind = cursor.u8()?;
        let data = cursor.bytes(length - 1)?;
        Ok(Self {
            kind: kind & 0x7F,
            critical: kind & 0x80 != 0,
            long_length,
            data,
        })
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        let length = self.data.len() + 1;
        if self.long_length || length > 8383 {
            out.push(0xFF);
            out.extend_from_slice(&(length as u32).to_be_bytes());
        } else if length < 192 {
            out.push(length as u8);
        } else {
            let biased = length - 192;
            out.push(((biased >> 8) as u8) + 192);
            out.push(biased as u8);
        }
        out.push(if self.critical { self.kind | 0x80 } else { self.kind });
        out.extend_from_slice(&self.data);
    }

    /// Subpacket list filling `area`
    pub(crate) fn read_all(area: Bytes, context: &'static str) -> VellumResult<Vec<Self>> {
        let mut cursor = BodyCursor::new(area, context);
        let mut subpackets = Vec::new();
        while !cursor.is_empty() {
            subpackets.push(Self::read(&mut cursor)?);
        }
        Ok(subpackets)
    }

    pub(crate) fn write_all(subpackets: &[Self]) -> Vec<u8> {
        let mut out = Vec::new();
        for subpacket in subpackets {
            subpacket.write_to(&mut out);
        }
        out
    }
}

/// Signature value: MPIs for the algorithms this crate models, raw bytes
/// otherwise
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureValue {
    Mpis(Vec<Mpi>),
    Raw(Bytes),
}

impl SignatureValue {
    fn read(algorithm: PublicKeyAlgorithm, cursor: &mut BodyCursor) -> VellumResult<Self> {
        match algorithm {
            PublicKeyAlgorithm::Unknown(_) => Ok(SignatureValue::Raw(cursor.rest())),
            _ => cursor.mpis_to_end().map(SignatureValue::Mpis),
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            SignatureValue::Mpis(mpis) => mpis.iter().for_each(|mpi| mpi.write_to(out)),
            SignatureValue::Raw(bytes) => out.extend_from_slice(bytes),
        }
    }
}

/// Version-specific signature fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureFields {
    V3 { created: u32, key_id: u64 },
    V4 {
        hashed: Vec<Subpacket>,
        unhashed: Vec<Subpacket>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignaturePacket {
    version: u8,
    signature_type: u8,
    key_algorithm: PublicKeyAlgorithm,
    hash_algorithm: HashAlgorithm,
    fields: SignatureFields,
    /// Left 16 bits of the signed hash
    hash_prefix: [u8; 2],
    value: SignatureValue,
}

impl SignaturePacket {
    /// A version 4 signature
    pub fn new_v4(
        signature_type: u8,
        key_algorithm: PublicKeyAlgorithm,
        hash_algorithm: HashAlgorithm,
        hashed: Vec<Subpacket>,
        unhashed: Vec<Subpacket>,
        hash_prefix: [u8; 2],
        value: SignatureValue,
    ) -> Self {
        Self {
            version: 4,
            signature_type,
            key_algorithm,
            hash_algorithm,
            fields: SignatureFields::V4 { hashed, unhashed },
            hash_prefix,
            value,
        }
    }

    pub fn parse(body: Bytes) -> VellumResult<Self> {
        let mut cursor = BodyCursor::new(body, "signature packet");
        let version = cursor.u8()?;
        let packet = match version {
            2 | 3 => {
                let hashed_len = cursor.u8()?;
                if hashed_len != 5 {
                    return Err(cursor.error(format_args!(
                        "v3 hashed material must be 5 octets, got {}",
                        hashed_len
                    )));
                }
                let signature_type = cursor.u8()?;
                let created = cursor.u32()?;
                let key_id = u64::from_be_bytes(cursor.array()?);
                let key_algorithm = PublicKeyAlgorithm::from_u8(cursor.u8()?);
                let hash_algorithm = HashAlgorithm::from_u8(cursor.u8()?);
                let hash_prefix = cursor.array()?;
                let value = SignatureValue::read(key_algorithm, &mut cursor)?;
                Self {
                    version,
                    signature_type,
                    key_algorithm,
                    hash_algorithm,
                    fields: SignatureFields::V3 { created, key_id },
                    hash_prefix,
                    value,
                }
            }
            4 => {
                let signature_type = cursor.u8()?;
                let key_algorithm = PublicKeyAlgorithm::from_u8(cursor.u8()?);
                let hash_algorithm = HashAlgorithm::from_u8(cursor.u8()?);
                let hashed_len = cursor.u16()?;
                let hashed = Subpacket::read_all(
                    cursor.bytes(usize::from(hashed_len))?,
                    "hashed subpackets",
                )?;
                let unhashed_len = cursor.u16()?;
                let unhashed = Subpacket::read_all(
                    cursor.bytes(usize::from(unhashed_len))?,
                    "unhashed subpackets",
                )?;
                let hash_prefix = cursor.array()?;
                let value = SignatureValue::read(key_algorithm, &mut cursor)?;
                Self {
                    version,
                    signature_type,
                    key_algorithm,
                    hash_algorithm,
                    fields: SignatureFields::V4 { hashed, unhashed },
                    hash_prefix,
                    value,
                }
            }
            other => {
                return Err(cursor.error(format_args!("unsupported signature version {}", other)));
            }
        };
        log::trace!(
            "signature v{} type 0x{:02X} {:?}/{:?}",
            packet.version,
            packet.signature_type,
            packet.key_algorithm,
            packet.hash_algorithm
        );
        Ok(packet)
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut out = vec![self.version];
        match &self.fields {
            SignatureFields::V3 { created, key_id } => {
                out.push(5);
                out.push(self.signature_type);
                out.extend_from_slice(&created.to_be_bytes());
                out.extend_from_slice(&key_id.to_be_bytes());
                out.push(self.key_algorithm.to_u8());
                out.push(self.hash_algorithm.to_u8());
            }
            SignatureFields::V4 { hashed, unhashed } => {
                out.push(self.signature_type);
                out.push(self.key_algorithm.to_u8());
                out.push(self.hash_algorithm.to_u8());
                for area in [hashed, unhashed] {
                    let bytes = Subpacket::write_all(area);
                    out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
                    out.extend_from_slice(&bytes);
                }
            }
        }
        out.extend_from_slice(&self.hash_prefix);
        self.value.write_to(&mut out);
        Bytes::from(out)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn signature_type(&self) -> u8 {
        self.signature_type
    }

    pub fn key_algorithm(&self) -> PublicKeyAlgorithm {
        self.key_algorithm
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    pub fn fields(&self) -> &SignatureFields {
        &self.fields
    }

    pub fn hash_prefix(&self) -> [u8; 2] {
        self.hash_prefix
    }

    pub fn value(&self) -> &SignatureValue {
        &self.value
    }

    pub fn hashed_subpackets(&self) -> &[Subpacket] {
        match &self.fields {
            SignatureFields::V4 { hashed, .. } => hashed,
            SignatureFields::V3 { .. } => &[],
        }
    }

    pub fn unhashed_subpackets(&self) -> &[Subpacket] {
        match &self.fields {
            SignatureFields::V4 { unhashed, .. } => unhashed,
            SignatureFields::V3 { .. } => &[],
        }
    }

    fn find(&self, kind: u8, hashed_only: bool) -> Option<&Subpacket> {
        let mut hashed = self.hashed_subpackets().iter();
        if hashed_only {
            return hashed.find(|s| s.kind() == kind);
        }
        hashed
            .chain(self.unhashed_subpackets())
            .find(|s| s.kind() == kind)
    }

    /// Signature creation time, from the v3 field or the hashed subpacket
    pub fn created(&self) -> Option<u32> {
        match &self.fields {
            SignatureFields::V3 { created, .. } => Some(*created),
            SignatureFields::V4 { .. } => self
                .find(subpacket::CREATION_TIME, true)
                .and_then(|s| <[u8; 4]>::try_from(s.data().as_ref()).ok())
                .map(u32::from_be_bytes),
        }
    }

    /// Issuer key id, from the v3 field or an issuer subpacket in either area
    pub fn issuer_key_id(&self) -> Option<u64> {
        match &self.fields {
            SignatureFields::V3 { key_id, .. } => Some(*key_id),
            SignatureFields::V4 { .. } => self
                .find(subpacket::ISSUER, false)
                .and_then(|s| <[u8; 8]>::try_from(s.data().as_ref()).ok())
                .map(u64::from_be_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const V4_SIGNATURE: [u8; 32] = hex!(
        "04 00 16 08"
        "0006 05 02 5c000000"
        "000a 09 10 0102030405060708"
        "abcd"
        "0008 ff 0008 80"
    );

    #[test]
    fn test_v4_signature() {
        let sig = SignaturePacket::parse(Bytes::from(V4_SIGNATURE.to_vec())).unwrap();
        assert_eq!(sig.version(), 4);
        assert_eq!(sig.signature_type(), 0x00);
        assert_eq!(sig.key_algorithm(), PublicKeyAlgorithm::EdDsa);
        assert_eq!(sig.hash_algorithm(), HashAlgorithm::Sha256);
        assert_eq!(sig.hashed_subpackets().len(), 1);
        assert_eq!(sig.unhashed_subpackets()[0].kind(), subpacket::ISSUER);
        assert_eq!(sig.created(), Some(0x5C00_0000));
        assert_eq!(sig.issuer_key_id(), Some(0x0102_0304_0506_0708));
        assert_eq!(sig.hash_prefix(), [0xAB, 0xCD]);
        match sig.value() {
            SignatureValue::Mpis(mpis) => assert_eq!(mpis.len(), 2),
            other => panic!("unexpected value {:?}", other),
        }
        assert_eq!(sig.to_bytes().as_ref(), &V4_SIGNATURE);
    }

    #[test]
    fn test_v3_signature() {
        let body = hex!("03 05 10 5c000000 0102030405060708 01 02 abcd 0008 ff");
        let sig = SignaturePacket::parse(Bytes::from(body.to_vec())).unwrap();
        assert_eq!(sig.version(), 3);
        assert_eq!(sig.signature_type(), 0x10);
        assert_eq!(sig.created(), Some(0x5C00_0000));
        assert_eq!(sig.issuer_key_id(), Some(0x0102_0304_0506_0708));
        assert!(sig.hashed_subpackets().is_empty());
        assert_eq!(sig.to_bytes().as_ref(), &body[..]);

        let bad = hex!("03 04 10 5c000000");
        let err = SignaturePacket::parse(Bytes::from(bad.to_vec())).unwrap_err();
        assert!(err.to_string().contains("5 octets"));
    }

    #[test]
    fn test_creation_time_only_from_hashed_area() {
        let body = hex!(
            "04 00 01 02"
            "0000"
            "0006 05 02 5c000000"
            "abcd 0008 ff"
        );
        let sig = SignaturePacket::parse(Bytes::from(body.to_vec())).unwrap();
        assert_eq!(sig.created(), None);
        assert_eq!(sig.issuer_key_id(), None);
    }

    #[test]
    fn test_subpacket_flags_and_lengths() {
        let body = hex!(
            "04 00 01 02"
            "0010 05 82 5c000000 ff00000005 02 5c000000"
            "0000"
            "abcd 0008 ff"
        );
        let sig = SignaturePacket::parse(Bytes::from(body.to_vec())).unwrap();
        let hashed = sig.hashed_subpackets();
        assert!(hashed[0].is_critical());
        assert_eq!(hashed[0].kind(), subpacket::CREATION_TIME);
        assert!(!hashed[1].is_critical());
        assert_eq!(hashed[1].data().as_ref(), &hex!("5c000000"));
        assert_eq!(sig.to_bytes().as_ref(), &body[..]);

        let mut data = vec![0u8; 300];
        data[0] = 1;
        let long = Subpacket::new(subpacket::NOTATION_DATA, false, data);
        let encoded = Subpacket::write_all(std::slice::from_ref(&long));
        assert_eq!(&encoded[..3], &hex!("c0 6d 14"));
        let parsed = Subpacket::read_all(Bytes::from(encoded), "test").unwrap();
        assert_eq!(parsed, vec![long]);
    }

    #[test]
    fn test_truncated_subpacket_area() {
        let body = hex!("04 00 01 02 0006 05 02 5c00");
        assert!(SignaturePacket::parse(Bytes::from(body.to_vec())).is_err());
        let zero = hex!("04 00 01 02 0001 00 0000 abcd");
        assert!(SignaturePacket::parse(Bytes::from(zero.to_vec())).is_err());
    }

    #[test]
    fn test_unknown_algorithm_value_kept_raw() {
        let body = hex!("04 00 64 08 0000 0000 abcd 010203");
        let sig = SignaturePacket::parse(Bytes::from(body.to_vec())).unwrap();
        assert_eq!(sig.value(), &SignatureValue::Raw(Bytes::from_static(&[1, 2, 3])));
        assert_eq!(sig.to_bytes().as_ref(), &body[..]);
    }
}
