//! Typed packet bodies

pub mod data;
pub mod key;
pub mod session;
pub mod signature;

use bytes::Bytes;

use crate::error::{VellumError, VellumResult};
use crate::types::PacketTag;

pub use data::{
    CompressedPacket, LiteralPacket, MarkerPacket, ModDetectionCodePacket, SymEncIntegrityPacket,
    UserAttributePacket, UserIdPacket,
};
pub use key::{KdfParameters, PublicKeyMaterial, PublicKeyPacket, S2k, SecretKeyPacket, SecretKeyProtection};
pub use session::{EncryptedSessionKey, OnePassSignaturePacket, PublicKeyEncSessionPacket, SymKeyEncSessionPacket};
pub use signature::{SignatureFields, SignaturePacket, SignatureValue, Subpacket};

/// One packet with its body decoded according to its tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    PublicKeyEncSession(PublicKeyEncSessionPacket),
    Signature(SignaturePacket),
    SymKeyEncSession(SymKeyEncSessionPacket),
    OnePassSignature(OnePassSignaturePacket),
    SecretKey(SecretKeyPacket),
    PublicKey(PublicKeyPacket),
    SecretSubkey(SecretKeyPacket),
    Compressed(CompressedPacket),
    /// Legacy encrypted data without integrity protection, kept opaque
    SymEncData(Bytes),
    Marker(MarkerPacket),
    Literal(LiteralPacket),
    /// Implementation-defined trust data, kept opaque
    Trust(Bytes),
    UserId(UserIdPacket),
    PublicSubkey(PublicKeyPacket),
    UserAttribute(UserAttributePacket),
    SymEncIntegrity(SymEncIntegrityPacket),
    ModDetectionCode(ModDetectionCodePacket),
    Experimental { tag: u8, body: Bytes },
    Unknown { tag: u8, body: Bytes },
}

impl Packet {
    /// Decode `body` as the packet named by `tag`
    ///
    /// # Errors
    /// [`VellumError::Structural`] for the reserved tag 0 or a body that
    /// does not match its packet layout.
    pub fn parse(tag: PacketTag, body: Bytes) -> VellumResult<Self> {
        let packet = match tag {
            PacketTag::Reserved => {
                return Err(VellumError::structural("packet tag 0 is reserved"));
            }
            PacketTag::PublicKeyEncSession => {
                Packet::PublicKeyEncSession(PublicKeyEncSessionPacket::parse(body)?)
            }
            PacketTag::Signature => Packet::Signature(SignaturePacket::parse(body)?),
            PacketTag::SymKeyEncSession => Packet::SymKeyEncSession(SymKeyEncSessionPacket::parse(body)?),
            PacketTag::OnePassSignature => Packet::OnePassSignature(OnePassSignaturePacket::parse(body)?),
            PacketTag::SecretKey => Packet::SecretKey(SecretKeyPacket::parse(body)?),
            PacketTag::PublicKey => Packet::PublicKey(PublicKeyPacket::parse(body)?),
            PacketTag::SecretSubkey => Packet::SecretSubkey(SecretKeyPacket::parse(body)?),
            PacketTag::Compressed => Packet::Compressed(CompressedPacket::parse(body)?),
            PacketTag::SymEncData => Packet::SymEncData(body),
            PacketTag::Marker => Packet::Marker(MarkerPacket::parse(body)?),
            PacketTag::Literal => Packet::Literal(LiteralPacket::parse(body)?),
            PacketTag::Trust => Packet::Trust(body),
            PacketTag::UserId => Packet::UserId(UserIdPacket::parse(body)?),
            PacketTag::PublicSubkey => Packet::PublicSubkey(PublicKeyPacket::parse(body)?),
            PacketTag::UserAttribute => Packet::UserAttribute(UserAttributePacket::parse(body)?),
            PacketTag::SymEncIntegrity => Packet::SymEncIntegrity(SymEncIntegrityPacket::parse(body)?),
            PacketTag::ModDetectionCode => Packet::ModDetectionCode(ModDetectionCodePacket::parse(body)?),
            PacketTag::Experimental(tag) => Packet::Experimental { tag, body },
            PacketTag::Unknown(tag) => {
                log::debug!("keeping body of unknown packet tag {} ({} bytes)", tag, body.len());
                Packet::Unknown { tag, body }
            }
        };
        Ok(packet)
    }

    pub fn tag(&self) -> PacketTag {
        match self {
            Packet::PublicKeyEncSession(_) => PacketTag::PublicKeyEncSession,
            Packet::Signature(_) => PacketTag::Signature,
            Packet::SymKeyEncSession(_) => PacketTag::SymKeyEncSession,
            Packet::OnePassSignature(_) => PacketTag::OnePassSignature,
            Packet::SecretKey(_) => PacketTag::SecretKey,
            Packet::PublicKey(_) => PacketTag::PublicKey,
            Packet::SecretSubkey(_) => PacketTag::SecretSubkey,
            Packet::Compressed(_) => PacketTag::Compressed,
            Packet::SymEncData(_) => PacketTag::SymEncData,
            Packet::Marker(_) => PacketTag::Marker,
            Packet::Literal(_) => PacketTag::Literal,
            Packet::Trust(_) => PacketTag::Trust,
            Packet::UserId(_) => PacketTag::UserId,
            Packet::PublicSubkey(_) => PacketTag::PublicSubkey,
            Packet::UserAttribute(_) => PacketTag::UserAttribute,
            Packet::SymEncIntegrity(_) => PacketTag::SymEncIntegrity,
            Packet::ModDetectionCode(_) => PacketTag::ModDetectionCode,
            Packet::Experimental { tag, .. } | Packet::Unknown { tag, .. } => PacketTag::from_u8(*tag),
        }
    }

    /// Body octets, without the header
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Packet::PublicKeyEncSession(p) => p.to_bytes(),
            Packet::Signature(p) => p.to_bytes(),
            Packet::SymKeyEncSession(p) => p.to_bytes(),
            Packet::OnePassSignature(p) => p.to_bytes(),
            Packet::SecretKey(p) | Packet::SecretSubkey(p) => p.to_bytes(),
            Packet::PublicKey(p) | Packet::PublicSubkey(p) => p.to_bytes(),
            Packet::Compressed(p) => p.to_bytes(),
            Packet::SymEncData(body) | Packet::Trust(body) => body.clone(),
            Packet::Marker(p) => p.to_bytes(),
            Packet::Literal(p) => p.to_bytes(),
            Packet::UserId(p) => p.to_bytes(),
            Packet::UserAttribute(p) => p.to_bytes(),
            Packet::SymEncIntegrity(p) => p.to_bytes(),
            Packet::ModDetectionCode(p) => p.to_bytes(),
            Packet::Experimental { body, .. } | Packet::Unknown { body, .. } => body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_tag() {
        let packet = Packet::parse(PacketTag::UserId, Bytes::from_static(b"bob")).unwrap();
        assert_eq!(packet.tag(), PacketTag::UserId);
        assert_eq!(packet.to_bytes().as_ref(), b"bob");

        let trust = Packet::parse(PacketTag::Trust, Bytes::from_static(&[0x00, 0x3C])).unwrap();
        assert_eq!(trust, Packet::Trust(Bytes::from_static(&[0x00, 0x3C])));
    }

    #[test]
    fn test_reserved_tag_rejected() {
        let err = Packet::parse(PacketTag::Reserved, Bytes::new()).unwrap_err();
        assert!(matches!(err, VellumError::Structural(_)));
    }

    #[test]
    fn test_unknown_and_experimental_kept() {
        let unknown = Packet::parse(PacketTag::from_u8(40), Bytes::from_static(&[1, 2])).unwrap();
        assert_eq!(unknown, Packet::Unknown { tag: 40, body: Bytes::from_static(&[1, 2]) });
        assert_eq!(unknown.tag(), PacketTag::Unknown(40));

        let experimental = Packet::parse(PacketTag::from_u8(61), Bytes::from_static(&[3])).unwrap();
        assert_eq!(experimental.tag(), PacketTag::Experimental(61));
        assert_eq!(experimental.to_bytes().as_ref(), &[3]);
    }

    #[test]
    fn test_body_errors_propagate() {
        let err = Packet::parse(PacketTag::Marker, Bytes::from_static(b"XYZ")).unwrap_err();
        assert!(err.to_string().contains("marker packet"));
    }
}
