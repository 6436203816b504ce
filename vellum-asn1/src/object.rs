//! The decoded node model
//!
//! [`Asn1Object`] is a sum over every node kind the decoder produces. Universal
//! tags with a dedicated type are mapped to it; every other universal tag ends
//! up in [`Asn1Object::Unknown`] with its raw content, and every non-universal
//! tag in [`Asn1Object::Tagged`].
//!
//! Two nodes are equal when their DER encodings are equal. Ordering and
//! hashing follow the same rule, which is also the order DER uses for SET
//! elements.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use bytes::{Bytes, BytesMut};

use crate::ber::encoder::BerEncoder;
use crate::ber::types::{BerTag, BerTagClass, universal};
use crate::constructed::{RawElement, Sequence, Set, TaggedContent, TaggedObject};
use crate::error::{VellumError, VellumResult};
use crate::primitive::{
    Asn1String, BitString, GeneralizedTime, Integer, ObjectIdentifier, StringKind, UtcTime,
};

#[derive(Debug, Clone)]
pub enum Asn1Object {
    Boolean(bool),
    Integer(Integer),
    Enumerated(Integer),
    BitString(BitString),
    OctetString(Bytes),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    String(Asn1String),
    UtcTime(UtcTime),
    GeneralizedTime(GeneralizedTime),
    Sequence(Sequence),
    Set(Set),
    Tagged(TaggedObject),
    Unknown(RawElement),
}

impl Asn1Object {
    /// Name of the node kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Asn1Object::Boolean(_) => "BOOLEAN",
            Asn1Object::Integer(_) => "INTEGER",
            Asn1Object::Enumerated(_) => "ENUMERATED",
            Asn1Object::BitString(_) => "BIT STRING",
            Asn1Object::OctetString(_) => "OCTET STRING",
            Asn1Object::Null => "NULL",
            Asn1Object::ObjectIdentifier(_) => "OBJECT IDENTIFIER",
            Asn1Object::String(_) => "character string",
            Asn1Object::UtcTime(_) => "UTCTime",
            Asn1Object::GeneralizedTime(_) => "GeneralizedTime",
            Asn1Object::Sequence(_) => "SEQUENCE",
            Asn1Object::Set(_) => "SET",
            Asn1Object::Tagged(_) => "tagged value",
            Asn1Object::Unknown(_) => "unrecognised element",
        }
    }

    /// The tag this node is encoded under
    pub fn tag(&self) -> BerTag {
        let number = match self {
            Asn1Object::Boolean(_) => universal::BOOLEAN,
            Asn1Object::Integer(_) => universal::INTEGER,
            Asn1Object::Enumerated(_) => universal::ENUMERATED,
            Asn1Object::BitString(_) => universal::BIT_STRING,
            Asn1Object::OctetString(_) => universal::OCTET_STRING,
            Asn1Object::Null => universal::NULL,
            Asn1Object::ObjectIdentifier(_) => universal::OBJECT_IDENTIFIER,
            Asn1Object::String(s) => s.kind().tag_number(),
            Asn1Object::UtcTime(_) => universal::UTC_TIME,
            Asn1Object::GeneralizedTime(_) => universal::GENERALIZED_TIME,
            Asn1Object::Sequence(_) => return BerTag::universal(true, universal::SEQUENCE),
            Asn1Object::Set(_) => return BerTag::universal(true, universal::SET),
            Asn1Object::Tagged(tagged) => return tagged.tag(),
            Asn1Object::Unknown(raw) => return raw.tag(),
        };
        BerTag::universal(false, number)
    }

    /// Whether this is a context-specific tagged value numbered `number`
    pub fn is_context_tag(&self, number: u32) -> bool {
        matches!(self, Asn1Object::Tagged(t) if t.class() == BerTagClass::ContextSpecific && t.number() == number)
    }

    /// Build a node from the content of a primitive universal element
    ///
    /// With `strict` set, BOOLEAN content other than `00`/`FF` is rejected.
    pub fn from_universal_primitive(number: u32, content: Bytes, strict: bool) -> VellumResult<Self> {
        let object = match number {
            universal::END_OF_CONTENTS => {
                return Err(VellumError::structural("unexpected end-of-contents marker"));
            }
            universal::BOOLEAN => match content.as_ref() {
                [0x00] => Asn1Object::Boolean(false),
                [0xFF] => Asn1Object::Boolean(true),
                [_] if !strict => Asn1Object::Boolean(true),
                _ => return Err(VellumError::structural("invalid BOOLEAN content")),
            },
            universal::INTEGER => Asn1Object::Integer(Integer::from_content(content)?),
            universal::ENUMERATED => Asn1Object::Enumerated(Integer::from_content(content)?),
            universal::BIT_STRING => Asn1Object::BitString(BitString::from_content(content)?),
            universal::OCTET_STRING => Asn1Object::OctetString(content),
            universal::NULL => {
                if !content.is_empty() {
                    return Err(VellumError::structural("NULL with non-empty content"));
                }
                Asn1Object::Null
            }
            universal::OBJECT_IDENTIFIER => {
                Asn1Object::ObjectIdentifier(ObjectIdentifier::from_content(&content)?)
            }
            universal::UTC_TIME => Asn1Object::UtcTime(UtcTime::new(text_of(&content)?)?),
            universal::GENERALIZED_TIME => {
                Asn1Object::GeneralizedTime(GeneralizedTime::new(text_of(&content)?)?)
            }
            universal::SEQUENCE | universal::SET => {
                return Err(VellumError::structural(format!(
                    "universal tag {} must be constructed",
                    number
                )));
            }
            other => match StringKind::from_tag_number(other) {
                Some(kind) => Asn1Object::String(Asn1String::from_content(kind, &content)?),
                None => {
                    log::debug!("keeping unrecognised universal tag {} raw", other);
                    Asn1Object::Unknown(RawElement::new(other, TaggedContent::Primitive(content)))
                }
            },
        };
        Ok(object)
    }

    /// Build a node from the decoded children of a constructed universal
    /// element
    ///
    /// Constructed string encodings are joined into a single value unless
    /// `strict` is set.
    pub fn from_universal_constructed(
        number: u32,
        elements: Vec<Asn1Object>,
        indefinite: bool,
        strict: bool,
    ) -> VellumResult<Self> {
        match number {
            universal::SEQUENCE => Ok(Asn1Object::Sequence(Sequence::decoded(elements, indefinite))),
            universal::SET => Ok(Asn1Object::Set(Set::decoded(elements, indefinite))),
            universal::BIT_STRING | universal::OCTET_STRING if !strict => {
                join_segments(number, &elements)
            }
            other if !strict && StringKind::from_tag_number(other).is_some() => {
                join_segments(other, &elements)
            }
            universal::END_OF_CONTENTS
            | universal::BOOLEAN
            | universal::INTEGER
            | universal::BIT_STRING
            | universal::OCTET_STRING
            | universal::NULL
            | universal::OBJECT_IDENTIFIER
            | universal::ENUMERATED
            | universal::UTC_TIME
            | universal::GENERALIZED_TIME => Err(VellumError::structural(format!(
                "universal tag {} must be primitive",
                number
            ))),
            other if StringKind::from_tag_number(other).is_some() => Err(VellumError::structural(
                format!("constructed string (tag {}) is not valid DER", other),
            )),
            other => Ok(Asn1Object::Unknown(RawElement::decoded(
                other,
                TaggedContent::Constructed(elements),
                indefinite,
            ))),
        }
    }

    /// Content octets of a primitive node; children's DER for a constructed one
    pub(crate) fn primitive_content(&self) -> Bytes {
        match self {
            Asn1Object::Boolean(value) => {
                Bytes::from_static(if *value { &[0xFF] } else { &[0x00] })
            }
            Asn1Object::Integer(value) | Asn1Object::Enumerated(value) => value.as_bytes().clone(),
            Asn1Object::BitString(bits) => bits.content(),
            Asn1Object::OctetString(bytes) => bytes.clone(),
            Asn1Object::Null => Bytes::new(),
            Asn1Object::ObjectIdentifier(oid) => Bytes::from(oid.content()),
            Asn1Object::String(s) => s.content(),
            Asn1Object::UtcTime(t) => Bytes::copy_from_slice(t.as_str().as_bytes()),
            Asn1Object::GeneralizedTime(t) => Bytes::copy_from_slice(t.as_str().as_bytes()),
            Asn1Object::Sequence(seq) => children_der(seq.elements(), false),
            Asn1Object::Set(set) => children_der(set.elements(), true),
            Asn1Object::Tagged(tagged) => content_der(tagged.content()),
            Asn1Object::Unknown(raw) => content_der(raw.content()),
        }
    }

    pub(crate) fn write(&self, encoder: &mut BerEncoder, preserve: bool) {
        match self {
            Asn1Object::Sequence(seq) => {
                write_constructed(encoder, &self.tag(), seq.elements(), seq.is_indefinite(), preserve, false)
            }
            Asn1Object::Set(set) => {
                write_constructed(encoder, &self.tag(), set.elements(), set.is_indefinite(), preserve, !preserve)
            }
            Asn1Object::Tagged(tagged) => {
                write_content(encoder, &self.tag(), tagged.content(), tagged.is_indefinite(), preserve)
            }
            Asn1Object::Unknown(raw) => {
                write_content(encoder, &self.tag(), raw.content(), raw.is_indefinite(), preserve)
            }
            leaf => encoder.encode_tlv(&leaf.tag(), &leaf.primitive_content()),
        }
    }

    /// Canonical DER encoding
    pub fn to_der(&self) -> Bytes {
        let mut encoder = BerEncoder::new();
        self.write(&mut encoder, false);
        encoder.into_bytes()
    }

    /// Encoding that keeps the indefinite-length form of decoded values and
    /// the decoded order of SET elements
    pub fn encode(&self) -> Bytes {
        let mut encoder = BerEncoder::new();
        self.write(&mut encoder, true);
        encoder.into_bytes()
    }
}

fn text_of(content: &[u8]) -> VellumResult<&str> {
    std::str::from_utf8(content).map_err(|_| VellumError::structural("time value is not ASCII"))
}

fn children_der(elements: &[Asn1Object], sort: bool) -> Bytes {
    let mut encoded: Vec<Bytes> = elements.iter().map(Asn1Object::to_der).collect();
    if sort {
        encoded.sort();
    }
    let mut out = BytesMut::with_capacity(encoded.iter().map(Bytes::len).sum());
    for element in &encoded {
        out.extend_from_slice(element);
    }
    out.freeze()
}

fn content_der(content: &TaggedContent) -> Bytes {
    match content {
        TaggedContent::Primitive(bytes) => bytes.clone(),
        TaggedContent::Constructed(children) => children_der(children, false),
    }
}

fn write_content(
    encoder: &mut BerEncoder,
    tag: &BerTag,
    content: &TaggedContent,
    indefinite: bool,
    preserve: bool,
) {
    match content {
        TaggedContent::Primitive(bytes) => encoder.encode_tlv(tag, bytes),
        TaggedContent::Constructed(children) => {
            write_constructed(encoder, tag, children, indefinite, preserve, false)
        }
    }
}

fn write_constructed(
    encoder: &mut BerEncoder,
    tag: &BerTag,
    children: &[Asn1Object],
    indefinite: bool,
    preserve: bool,
    sort: bool,
) {
    if preserve && indefinite {
        encoder.begin_indefinite(tag);
        for child in children {
            child.write(encoder, preserve);
        }
        encoder.push_end_of_contents();
        return;
    }
    if sort {
        encoder.encode_tlv(tag, &children_der(children, true));
        return;
    }
    let mut inner = BerEncoder::new();
    for child in children {
        child.write(&mut inner, preserve);
    }
    encoder.encode_tlv(tag, inner.as_bytes());
}

/// Joins the segments of a constructed string encoding
fn join_segments(number: u32, segments: &[Asn1Object]) -> VellumResult<Asn1Object> {
    log::debug!(
        "joining {} segments of constructed string (tag {})",
        segments.len(),
        number
    );
    let mut joined = BytesMut::new();
    let mut padding = 0u8;
    for (i, segment) in segments.iter().enumerate() {
        if padding != 0 {
            return Err(VellumError::structural(
                "only the last BIT STRING segment may have padding",
            ));
        }
        match (number, segment) {
            (universal::BIT_STRING, Asn1Object::BitString(bits)) => {
                padding = bits.padding();
                joined.extend_from_slice(bits.data());
            }
            (universal::OCTET_STRING, Asn1Object::OctetString(bytes)) => {
                joined.extend_from_slice(bytes)
            }
            (n, Asn1Object::OctetString(bytes)) if n != universal::BIT_STRING => {
                joined.extend_from_slice(bytes)
            }
            (_, Asn1Object::String(s)) if s.kind().tag_number() == number => {
                joined.extend_from_slice(&s.content())
            }
            (_, other) => {
                return Err(VellumError::structural(format!(
                    "segment {} of constructed string (tag {}) is {}",
                    i,
                    number,
                    other.kind_name()
                )));
            }
        }
    }
    let joined = joined.freeze();
    match number {
        universal::BIT_STRING => {
            let mut content = BytesMut::with_capacity(joined.len() + 1);
            content.extend_from_slice(&[padding]);
            content.extend_from_slice(&joined);
            Ok(Asn1Object::BitString(BitString::from_content(content.freeze())?))
        }
        universal::OCTET_STRING => Ok(Asn1Object::OctetString(joined)),
        other => Asn1Object::from_universal_primitive(other, joined, false),
    }
}

impl PartialEq for Asn1Object {
    fn eq(&self, other: &Self) -> bool {
        self.to_der() == other.to_der()
    }
}

impl Eq for Asn1Object {}

impl PartialOrd for Asn1Object {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Asn1Object {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_der().cmp(&other.to_der())
    }
}

impl Hash for Asn1Object {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_der().hash(state);
    }
}

impl From<bool> for Asn1Object {
    fn from(value: bool) -> Self {
        Asn1Object::Boolean(value)
    }
}

impl From<Integer> for Asn1Object {
    fn from(value: Integer) -> Self {
        Asn1Object::Integer(value)
    }
}

impl From<BitString> for Asn1Object {
    fn from(value: BitString) -> Self {
        Asn1Object::BitString(value)
    }
}

impl From<Bytes> for Asn1Object {
    fn from(value: Bytes) -> Self {
        Asn1Object::OctetString(value)
    }
}

impl From<ObjectIdentifier> for Asn1Object {
    fn from(value: ObjectIdentifier) -> Self {
        Asn1Object::ObjectIdentifier(value)
    }
}

impl From<Asn1String> for Asn1Object {
    fn from(value: Asn1String) -> Self {
        Asn1Object::String(value)
    }
}

impl From<UtcTime> for Asn1Object {
    fn from(value: UtcTime) -> Self {
        Asn1Object::UtcTime(value)
    }
}

impl From<GeneralizedTime> for Asn1Object {
    fn from(value: GeneralizedTime) -> Self {
        Asn1Object::GeneralizedTime(value)
    }
}

impl From<Sequence> for Asn1Object {
    fn from(value: Sequence) -> Self {
        Asn1Object::Sequence(value)
    }
}

impl From<Set> for Asn1Object {
    fn from(value: Set) -> Self {
        Asn1Object::Set(value)
    }
}

impl From<TaggedObject> for Asn1Object {
    fn from(value: TaggedObject) -> Self {
        Asn1Object::Tagged(value)
    }
}

macro_rules! accessor {
    ($(#[$doc:meta])* $name:ident, $variant:ident, $ty:ty, $expected:literal) => {
        $(#[$doc])*
        pub fn $name(&self) -> VellumResult<&$ty> {
            match self {
                Asn1Object::$variant(value) => Ok(value),
                other => Err(VellumError::structural(format!(
                    concat!("expected ", $expected, ", found {}"),
                    other.kind_name()
                ))),
            }
        }
    };
}

/// Casting accessors
///
/// Each fails with [`VellumError::Structural`] naming the expected and the
/// actual node kind.
impl Asn1Object {
    accessor!(as_integer, Integer, Integer, "INTEGER");
    accessor!(as_enumerated, Enumerated, Integer, "ENUMERATED");
    accessor!(as_bit_string, BitString, BitString, "BIT STRING");
    accessor!(as_octet_string, OctetString, Bytes, "OCTET STRING");
    accessor!(as_oid, ObjectIdentifier, ObjectIdentifier, "OBJECT IDENTIFIER");
    accessor!(as_string, String, Asn1String, "character string");
    accessor!(as_utc_time, UtcTime, UtcTime, "UTCTime");
    accessor!(as_generalized_time, GeneralizedTime, GeneralizedTime, "GeneralizedTime");
    accessor!(as_sequence, Sequence, Sequence, "SEQUENCE");
    accessor!(as_set, Set, Set, "SET");
    accessor!(as_tagged, Tagged, TaggedObject, "tagged value");

    pub fn as_boolean(&self) -> VellumResult<bool> {
        match self {
            Asn1Object::Boolean(value) => Ok(*value),
            other => Err(VellumError::structural(format!(
                "expected BOOLEAN, found {}",
                other.kind_name()
            ))),
        }
    }

    pub fn as_null(&self) -> VellumResult<()> {
        match self {
            Asn1Object::Null => Ok(()),
            other => Err(VellumError::structural(format!(
                "expected NULL, found {}",
                other.kind_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_leaf_der() {
        assert_eq!(Asn1Object::Boolean(true).to_der().as_ref(), &hex!("0101ff"));
        assert_eq!(Asn1Object::Null.to_der().as_ref(), &hex!("0500"));
        assert_eq!(
            Asn1Object::Integer(Integer::from_i64(256)).to_der().as_ref(),
            &hex!("02020100")
        );
        assert_eq!(
            Asn1Object::String(Asn1String::utf8("hi")).to_der().as_ref(),
            &hex!("0c026869")
        );
    }

    #[test]
    fn test_set_der_sorts() {
        let set = Asn1Object::Set(Set::new(vec![
            Asn1Object::Integer(Integer::from_i64(2)),
            Asn1Object::Boolean(false),
        ]));
        assert_eq!(set.to_der().as_ref(), &hex!("3106 010100 020102"));
        assert_eq!(set.encode().as_ref(), &hex!("3106 020102 010100"));
    }

    #[test]
    fn test_equality_follows_der() {
        let a = Asn1Object::Set(Set::new(vec![Asn1Object::Null, Asn1Object::Boolean(true)]));
        let b = Asn1Object::Set(Set::new(vec![Asn1Object::Boolean(true), Asn1Object::Null]));
        assert_eq!(a, b);
        assert!(Asn1Object::Boolean(true) < Asn1Object::Null);
    }

    #[test]
    fn test_explicit_and_implicit_tagging() {
        let inner = Asn1Object::Integer(Integer::from_i64(5));
        let explicit = Asn1Object::Tagged(TaggedObject::explicit(0, inner.clone()));
        assert_eq!(explicit.to_der().as_ref(), &hex!("a003 020105"));
        let implicit = Asn1Object::Tagged(TaggedObject::implicit(1, &inner));
        assert_eq!(implicit.to_der().as_ref(), &hex!("8101 05"));

        let seq = Asn1Object::Sequence(Sequence::new(vec![inner.clone()]));
        let implicit_seq = TaggedObject::implicit(2, &seq);
        assert_eq!(Asn1Object::Tagged(implicit_seq.clone()).to_der().as_ref(), &hex!("a203 020105"));
        assert_eq!(implicit_seq.implicit_sequence().unwrap(), seq);

        let TaggedContent::Primitive(_) = TaggedObject::implicit(1, &inner).content() else {
            panic!("implicit INTEGER must be primitive");
        };
        assert_eq!(
            TaggedObject::implicit(1, &inner).implicit_as(universal::INTEGER).unwrap(),
            inner
        );
    }

    #[test]
    fn test_accessor_errors_name_kinds() {
        let err = Asn1Object::Null.as_sequence().unwrap_err();
        assert_eq!(err.to_string(), "Structural error: expected SEQUENCE, found NULL");
        assert!(Asn1Object::Boolean(false).as_boolean().is_ok());
    }

    #[test]
    fn test_universal_primitive_rules() {
        assert!(Asn1Object::from_universal_primitive(universal::NULL, Bytes::from_static(&[0]), false).is_err());
        assert!(Asn1Object::from_universal_primitive(universal::BOOLEAN, Bytes::from_static(&[1]), true).is_err());
        assert_eq!(
            Asn1Object::from_universal_primitive(universal::BOOLEAN, Bytes::from_static(&[1]), false).unwrap(),
            Asn1Object::Boolean(true)
        );
        assert!(Asn1Object::from_universal_primitive(universal::SEQUENCE, Bytes::new(), false).is_err());
        let raw = Asn1Object::from_universal_primitive(7, Bytes::from_static(&[0xAB]), false).unwrap();
        assert_eq!(raw.to_der().as_ref(), &hex!("0701ab"));
    }

    #[test]
    fn test_constructed_octet_string_joined() {
        let segments = vec![
            Asn1Object::OctetString(Bytes::from_static(b"AB")),
            Asn1Object::OctetString(Bytes::from_static(b"C")),
        ];
        let joined =
            Asn1Object::from_universal_constructed(universal::OCTET_STRING, segments.clone(), true, false)
                .unwrap();
        assert_eq!(joined, Asn1Object::OctetString(Bytes::from_static(b"ABC")));
        assert!(
            Asn1Object::from_universal_constructed(universal::OCTET_STRING, segments, true, true).is_err()
        );
    }
}
