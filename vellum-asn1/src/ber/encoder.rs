//! BER encoder for ASN.1 structures
//!
//! This module provides encoding functionality for ASN.1 values using BER encoding rules.
//!
//! # Usage Example
//!
//! ```rust
//! use vellum_asn1::ber::BerEncoder;
//!
//! let mut encoder = BerEncoder::new();
//! encoder.encode_integer(12345);
//! assert_eq!(encoder.as_bytes(), &[0x02, 0x02, 0x30, 0x39]);
//! ```

use bytes::{Bytes, BytesMut};

use crate::ber::types::{BerLength, BerTag, universal};
use crate::error::{VellumError, VellumResult};
use crate::object::Asn1Object;
use crate::primitive::{BitString, Integer, ObjectIdentifier};

/// BER encoder for ASN.1 structures
///
/// This encoder follows the encoding rules of ITU-T X.690. Each encoded value
/// is a TLV (Tag-Length-Value) triplet appended to an internal buffer.
///
/// Definite-length output is produced by default. The streaming form
/// (`begin_indefinite` ... `end_indefinite`) writes the indefinite length
/// octet and closes the value with the end-of-contents marker `00 00`.
pub struct BerEncoder {
    buffer: BytesMut,
    open_indefinite: usize,
}

impl BerEncoder {
    /// Create a new BER encoder
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
            open_indefinite: 0,
        }
    }

    /// Create a new BER encoder with initial capacity
    ///
    /// # Arguments
    /// * `capacity` - Initial buffer capacity in bytes
    ///
    /// # Why Pre-allocate?
    /// When the size of the output is roughly known, one allocation up front
    /// replaces repeated growth of the buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            open_indefinite: 0,
        }
    }

    /// Encode a tag and a length
    pub fn encode_header(&mut self, tag: &BerTag, length: BerLength) {
        self.buffer.extend_from_slice(&tag.encode());
        self.buffer.extend_from_slice(&length.encode());
    }

    /// Encode a TLV (Tag-Length-Value) triplet
    ///
    /// # Arguments
    /// * `tag` - BER tag
    /// * `value` - Value bytes (already encoded)
    ///
    /// # Why This Method?
    /// Every typed `encode_*` method writes through here, so all values share
    /// the same tag and length layout.
    pub fn encode_tlv(&mut self, tag: &BerTag, value: &[u8]) {
        self.encode_header(tag, BerLength::Definite(value.len()));
        self.buffer.extend_from_slice(value);
    }

    /// Append bytes that are already a complete encoding
    pub fn append_raw(&mut self, encoded: &[u8]) {
        self.buffer.extend_from_slice(encoded);
    }

    /// Open a constructed value with indefinite length
    ///
    /// The tag is forced to the constructed form. Every value encoded until
    /// the matching [`end_indefinite`](Self::end_indefinite) becomes part of
    /// its content.
    ///
    /// # Why Indefinite Length?
    /// A producer streaming its content does not know the size up front. The
    /// end-of-contents marker closes the value without a length.
    pub fn begin_indefinite(&mut self, tag: &BerTag) {
        let tag = BerTag::new(tag.class(), true, tag.number());
        self.encode_header(&tag, BerLength::Indefinite);
        self.open_indefinite += 1;
    }

    /// Close the innermost indefinite-length value
    ///
    /// # Error Handling
    /// Returns [`VellumError::InvalidArgument`] if no indefinite-length value
    /// is open.
    pub fn end_indefinite(&mut self) -> VellumResult<()> {
        if self.open_indefinite == 0 {
            return Err(VellumError::invalid_argument(
                "end_indefinite without a matching begin_indefinite",
            ));
        }
        self.push_end_of_contents();
        Ok(())
    }

    pub(crate) fn push_end_of_contents(&mut self) {
        self.open_indefinite = self.open_indefinite.saturating_sub(1);
        self.buffer.extend_from_slice(&[0x00, 0x00]);
    }

    /// Number of indefinite-length values still open
    pub fn open_indefinite(&self) -> usize {
        self.open_indefinite
    }

    pub fn encode_boolean(&mut self, value: bool) {
        let tag = BerTag::universal(false, universal::BOOLEAN);
        self.encode_tlv(&tag, &[if value { 0xFF } else { 0x00 }]);
    }

    /// Encode an INTEGER in minimal two's complement form
    ///
    /// # Why Minimal Form?
    /// X.690 forbids a leading `0x00` or `0xFF` octet that only repeats the
    /// sign bit, and strict readers reject such padding.
    pub fn encode_integer(&mut self, value: i64) {
        self.encode_big_integer(&Integer::from_i64(value));
    }

    pub fn encode_big_integer(&mut self, value: &Integer) {
        let tag = BerTag::universal(false, universal::INTEGER);
        self.encode_tlv(&tag, value.as_bytes());
    }

    pub fn encode_null(&mut self) {
        let tag = BerTag::universal(false, universal::NULL);
        self.encode_tlv(&tag, &[]);
    }

    /// Encode an OCTET STRING
    pub fn encode_octet_string(&mut self, value: &[u8]) {
        let tag = BerTag::universal(false, universal::OCTET_STRING);
        self.encode_tlv(&tag, value);
    }

    /// Encode a BIT STRING
    ///
    /// # Arguments
    /// * `value` - Bit string bytes
    /// * `unused_bits` - Number of unused bits in the last byte (0-7)
    ///
    /// # Error Handling
    /// Fails when `unused_bits` is above 7, or non-zero with an empty `value`.
    pub fn encode_bit_string(&mut self, value: &[u8], unused_bits: u8) -> VellumResult<()> {
        let bits = BitString::new(Bytes::copy_from_slice(value), unused_bits)?;
        let tag = BerTag::universal(false, universal::BIT_STRING);
        self.encode_tlv(&tag, &bits.content());
        Ok(())
    }

    /// Encode an OBJECT IDENTIFIER
    pub fn encode_object_identifier(&mut self, oid: &ObjectIdentifier) {
        let tag = BerTag::universal(false, universal::OBJECT_IDENTIFIER);
        self.encode_tlv(&tag, &oid.content());
    }

    /// Encode a SEQUENCE whose elements are already encoded
    pub fn encode_sequence(&mut self, elements: &[u8]) {
        let tag = BerTag::universal(true, universal::SEQUENCE);
        self.encode_tlv(&tag, elements);
    }

    /// Encode a SET whose elements are already encoded
    pub fn encode_set(&mut self, elements: &[u8]) {
        let tag = BerTag::universal(true, universal::SET);
        self.encode_tlv(&tag, elements);
    }

    /// Encode a context-specific tag
    ///
    /// # Arguments
    /// * `tag_number` - Context-specific tag number
    /// * `value` - Encoded value bytes
    /// * `constructed` - Whether this is a constructed type
    pub fn encode_context_specific(&mut self, tag_number: u32, value: &[u8], constructed: bool) {
        let tag = BerTag::context_specific(constructed, tag_number);
        self.encode_tlv(&tag, value);
    }

    /// Encode an application tag
    pub fn encode_application(&mut self, tag_number: u32, value: &[u8], constructed: bool) {
        let tag = BerTag::application(constructed, tag_number);
        self.encode_tlv(&tag, value);
    }

    /// Encode a node in canonical DER form
    pub fn encode_object(&mut self, object: &Asn1Object) {
        object.write(self, false);
    }

    /// Encode a node keeping the indefinite-length form it was decoded with
    pub fn encode_object_preserving(&mut self, object: &Asn1Object) {
        object.write(self, true);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Clear the encoder buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.open_indefinite = 0;
    }
}

impl Default for BerEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_encode_integer() {
        let mut encoder = BerEncoder::new();
        encoder.encode_integer(12345);
        encoder.encode_integer(-129);
        assert_eq!(encoder.as_bytes(), &hex!("02 02 3039 02 02 ff7f"));
    }

    #[test]
    fn test_encode_octet_string() {
        let mut encoder = BerEncoder::new();
        encoder.encode_octet_string(b"Hello");
        let bytes = encoder.into_bytes();
        assert_eq!(bytes[0], 0x04);
        assert_eq!(bytes[1], 5);
        assert_eq!(&bytes[2..], b"Hello");
    }

    #[test]
    fn test_encode_bit_string() {
        let mut encoder = BerEncoder::new();
        encoder.encode_bit_string(&[0x84], 2).unwrap();
        assert_eq!(encoder.as_bytes(), &hex!("03 02 02 84"));
        assert!(encoder.encode_bit_string(&[0x00], 8).is_err());
    }

    #[test]
    fn test_encode_object_identifier() {
        let mut encoder = BerEncoder::new();
        let oid = ObjectIdentifier::from_static(&[1, 2, 840, 113549]);
        encoder.encode_object_identifier(&oid);
        assert_eq!(encoder.as_bytes(), &hex!("06 06 2a864886f70d"));
    }

    #[test]
    fn test_encode_sequence() {
        let mut encoder = BerEncoder::new();
        let mut element_encoder = BerEncoder::new();
        element_encoder.encode_integer(123);
        element_encoder.encode_null();
        encoder.encode_sequence(element_encoder.as_bytes());
        assert_eq!(encoder.as_bytes(), &hex!("30 05 02017b 0500"));
    }

    #[test]
    fn test_long_form_length() {
        let mut encoder = BerEncoder::new();
        encoder.encode_octet_string(&[0xAA; 300]);
        assert_eq!(&encoder.as_bytes()[..4], &hex!("04 82 012c"));
        assert_eq!(encoder.len(), 304);
    }

    #[test]
    fn test_indefinite_sequence() {
        let mut encoder = BerEncoder::new();
        encoder.begin_indefinite(&BerTag::universal(true, universal::SEQUENCE));
        encoder.encode_boolean(true);
        assert_eq!(encoder.open_indefinite(), 1);
        encoder.end_indefinite().unwrap();
        assert_eq!(encoder.as_bytes(), &hex!("30 80 0101ff 0000"));
        assert!(encoder.end_indefinite().is_err());
    }

    #[test]
    fn test_context_and_application() {
        let mut encoder = BerEncoder::new();
        encoder.encode_context_specific(0, &hex!("020101"), true);
        encoder.encode_application(1, &[], false);
        assert_eq!(encoder.as_bytes(), &hex!("a0 03 020101 41 00"));
    }
}
