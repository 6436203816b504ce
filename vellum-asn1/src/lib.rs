//! ASN.1 BER/DER codec and schema types
//!
//! This crate provides the tag-length-value framing, a typed node model
//! ([`Asn1Object`]) and fixed schemas built on top of it:
//!
//! - `ber`: tags, lengths, the streaming encoder and the bounded decoder
//! - `object` / `constructed` / `primitive`: the node model
//! - `schema`: conversion traits and helpers for SEQUENCE-shaped schemas
//! - `pkix`, `crmf`, `ocsp`, `pkcs`: certificate request, status and key
//!   structures
//!
//! # Encodings
//!
//! [`Asn1Object::to_der`] always produces the canonical DER form.
//! [`Asn1Object::encode`] keeps indefinite lengths seen while decoding, so
//! BER input whose only departure from DER is the indefinite form comes
//! back byte for byte.
//!
//! # Usage
//!
//! ```
//! use vellum_asn1::{decode, Asn1Object};
//!
//! let object = decode(&[0x30, 0x03, 0x02, 0x01, 0x05]).unwrap();
//! let Asn1Object::Sequence(seq) = &object else { unreachable!() };
//! assert_eq!(seq.len(), 1);
//! assert_eq!(object.to_der().as_ref(), &[0x30, 0x03, 0x02, 0x01, 0x05]);
//! ```

pub mod ber;
pub mod constructed;
pub mod crmf;
pub mod error;
pub mod object;
pub mod ocsp;
pub mod oids;
pub mod pkcs;
pub mod pkix;
pub mod primitive;
pub mod schema;

use bytes::Bytes;
use vellum_core::DecodeLimits;

pub use ber::{BerDecoder, BerEncoder, BerLength, BerTag, BerTagClass};
pub use constructed::{RawElement, Sequence, Set, TaggedContent, TaggedObject};
pub use error::{VellumError, VellumResult};
pub use object::Asn1Object;
pub use primitive::{
    Asn1String, BitString, GeneralizedTime, Integer, ObjectIdentifier, StringKind, UtcTime,
};
pub use schema::{Asn1Encodable, Defaulted, FieldVector, FromAsn1, SequenceReader};

/// Decode exactly one element from `data` with the default limits
///
/// # Errors
/// [`VellumError::Structural`] for malformed framing or trailing bytes.
pub fn decode(data: &[u8]) -> VellumResult<Asn1Object> {
    decode_bytes(Bytes::copy_from_slice(data))
}

/// Like [`decode`], sharing `data` with the decoded leaves
pub fn decode_bytes(data: Bytes) -> VellumResult<Asn1Object> {
    decode_with(data, DecodeLimits::default())
}

/// Decode exactly one element under `limits`
pub fn decode_with(data: impl Into<Bytes>, limits: DecodeLimits) -> VellumResult<Asn1Object> {
    let mut decoder = BerDecoder::with_limits(data, limits);
    let object = decoder.decode_object()?;
    decoder.finish()?;
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use proptest::prelude::*;

    #[test]
    fn test_trailing_bytes_rejected() {
        let err = decode(&hex!("0500 00")).unwrap_err();
        assert!(err.to_string().contains("trailing"));
    }

    #[test]
    fn test_strict_limits() {
        let ber = hex!("3080 020101 0000");
        assert!(decode(&ber).is_ok());
        assert!(decode_with(ber.to_vec(), DecodeLimits::der()).is_err());
    }

    fn oid_strategy() -> impl Strategy<Value = ObjectIdentifier> {
        (0u64..=2, 0u64..40, proptest::collection::vec(any::<u32>(), 0..6)).prop_map(
            |(first, second, rest)| {
                let mut arcs = vec![first, second];
                arcs.extend(rest.into_iter().map(u64::from));
                ObjectIdentifier::new(arcs).unwrap()
            },
        )
    }

    fn leaf_strategy() -> impl Strategy<Value = Asn1Object> {
        prop_oneof![
            any::<bool>().prop_map(Asn1Object::Boolean),
            any::<i64>().prop_map(|v| Asn1Object::Integer(Integer::from_i64(v))),
            any::<i64>().prop_map(|v| Asn1Object::Enumerated(Integer::from_i64(v))),
            proptest::collection::vec(any::<u8>(), 0..40)
                .prop_map(|v| Asn1Object::OctetString(Bytes::from(v))),
            (proptest::collection::vec(any::<u8>(), 1..10), 0u8..8).prop_map(|(mut data, pad)| {
                if let Some(last) = data.last_mut() {
                    *last &= 0xFFu8 << pad;
                }
                Asn1Object::BitString(BitString::new(data, pad).unwrap())
            }),
            Just(Asn1Object::Null),
            oid_strategy().prop_map(Asn1Object::ObjectIdentifier),
            "[a-zA-Z0-9 ]{0,24}".prop_map(|s| Asn1Object::String(Asn1String::utf8(s))),
        ]
    }

    fn object_strategy() -> impl Strategy<Value = Asn1Object> {
        leaf_strategy().prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..6)
                    .prop_map(|v| Asn1Object::Sequence(Sequence::new(v))),
                proptest::collection::vec(inner.clone(), 0..6)
                    .prop_map(|v| Asn1Object::Set(Set::new(v))),
                (0u32..40, inner.clone())
                    .prop_map(|(n, v)| Asn1Object::Tagged(TaggedObject::explicit(n, v))),
                (0u32..40, inner)
                    .prop_map(|(n, v)| Asn1Object::Tagged(TaggedObject::implicit(n, &v))),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_der_round_trip(object in object_strategy()) {
            let der = object.to_der();
            let decoded = decode(&der).unwrap();
            prop_assert_eq!(decoded.to_der(), der.clone());
            prop_assert_eq!(decoded.encode(), der);
        }

        #[test]
        fn prop_der_input_is_strict_der(object in object_strategy()) {
            let der = object.to_der();
            prop_assert!(decode_with(der, DecodeLimits::der()).is_ok());
        }

        #[test]
        fn prop_arbitrary_input_never_panics(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            let _ = decode(&data);
        }
    }
}
