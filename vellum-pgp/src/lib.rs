//! OpenPGP packet layer
//!
//! This crate frames and decodes OpenPGP packets (RFC 4880):
//! - Old and new format headers, including partial body lengths
//! - Typed packet bodies for keys, signatures, session keys and data packets
//! - A streaming [`PacketReader`] with one-packet lookahead and a [`PacketWriter`]
//!
//! Cryptographic operations are not performed; encrypted and compressed
//! payloads stay opaque.

mod body;
pub mod error;
pub mod header;
pub mod mpi;
pub mod packet;
pub mod reader;
pub mod types;
pub mod writer;

pub use error::{VellumError, VellumResult};
pub use header::{BodyLength, HeaderFormat, PacketHeader};
pub use mpi::Mpi;
pub use packet::{
    CompressedPacket, EncryptedSessionKey, KdfParameters, LiteralPacket, MarkerPacket,
    ModDetectionCodePacket, OnePassSignaturePacket, Packet, PublicKeyEncSessionPacket,
    PublicKeyMaterial, PublicKeyPacket, S2k, SecretKeyPacket, SecretKeyProtection, SignatureFields,
    SignaturePacket, SignatureValue, Subpacket, SymEncIntegrityPacket, SymKeyEncSessionPacket,
    UserAttributePacket, UserIdPacket,
};
pub use reader::{PacketReader, PartialBodyReader};
pub use types::{CompressionAlgorithm, HashAlgorithm, PacketTag, PublicKeyAlgorithm, SymmetricAlgorithm};
pub use writer::PacketWriter;
pub use vellum_core::config::PacketReaderConfig;
