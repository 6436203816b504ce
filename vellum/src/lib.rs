//! vellum - binary document object model
//!
//! This library provides the structural codecs and the ordered index used by
//! a document-manipulation stack.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `vellum-core`: Error taxonomy and decoder configuration
//! - `vellum-tree`: Red-black ordered tree
//! - `vellum-asn1`: ASN.1 BER/DER encoding/decoding and PKIX, CRMF, OCSP, PKCS schemas
//! - `vellum-pgp`: OpenPGP packet framing, typed packets, reader and writer
//!
//! # Usage
//!
//! ```
//! use vellum::asn1::{decode, Asn1Object};
//! use vellum::tree::OrderedTree;
//!
//! let object = decode(&[0x02, 0x01, 0x05]).unwrap();
//! assert!(matches!(object, Asn1Object::Integer(_)));
//!
//! let mut index = OrderedTree::new();
//! index.insert("b", 2).unwrap();
//! index.insert("a", 1).unwrap();
//! assert_eq!(index.min_key().unwrap(), &"a");
//! ```

// Re-export core types
pub use vellum_core::{DecodeLimits, PacketReaderConfig, VellumError, VellumResult};

// Re-export the ordered tree
pub mod tree {
    pub use vellum_tree::*;
}

// Re-export the ASN.1 codec and schemas
pub mod asn1 {
    pub use vellum_asn1::*;
}

// Re-export the OpenPGP packet layer
pub mod pgp {
    pub use vellum_pgp::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_errors_are_shared_across_crates() {
        let asn1_err: VellumError = asn1::decode(&hex!("30 05 02 01")).unwrap_err();
        assert!(matches!(asn1_err, VellumError::Structural(_)));

        let pgp_err: VellumError = pgp::PacketReader::new(&hex!("cd 05 61")[..])
            .read_packet()
            .unwrap_err();
        assert!(matches!(pgp_err, VellumError::Structural(_)));

        let tree_err: VellumError = tree::OrderedTree::<u8, u8>::new().min_key().unwrap_err();
        assert!(matches!(tree_err, VellumError::EmptyTree));
    }

    #[test]
    fn test_packet_carrying_der_payload() {
        let der = asn1::Asn1Object::Sequence(asn1::Sequence::new(vec![
            asn1::Asn1Object::Integer(asn1::Integer::from_i64(5)),
        ]))
        .to_der();
        let literal = pgp::Packet::Literal(pgp::LiteralPacket::new(b'b', &b""[..], 0, der.clone()).unwrap());

        let mut writer = pgp::PacketWriter::new(Vec::new());
        writer.write_packet(&literal).unwrap();
        let out = writer.into_inner();

        let packet = pgp::PacketReader::new(&out[..]).read_packet().unwrap();
        let Some(pgp::Packet::Literal(read)) = packet else {
            panic!("expected a literal packet");
        };
        let object = asn1::decode(read.data()).unwrap();
        assert_eq!(object.to_der(), der);
    }
}
