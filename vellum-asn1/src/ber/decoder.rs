//! BER decoder for ASN.1 structures
//!
//! This module provides decoding functionality for ASN.1 values using BER encoding rules.
//!
//! # Usage Example
//!
//! ```rust
//! use vellum_asn1::ber::BerDecoder;
//!
//! let mut decoder = BerDecoder::new(&[0x02, 0x02, 0x30, 0x39][..]);
//! let integer = decoder.decode_integer().unwrap();
//! assert_eq!(integer.to_i64(), Some(12345));
//! decoder.finish().unwrap();
//! ```

use bytes::Bytes;

use crate::ber::types::{BerLength, BerTag, BerTagClass};
use crate::constructed::{Sequence, TaggedContent, TaggedObject};
use crate::error::{VellumError, VellumResult};
use crate::object::Asn1Object;
use crate::primitive::{Integer, ObjectIdentifier};
use vellum_core::DecodeLimits;

/// BER decoder for ASN.1 structures
///
/// This decoder follows the decoding rules of ITU-T X.690. It reads TLV
/// (Tag-Length-Value) triplets from a shared byte buffer; primitive contents
/// are returned as slices of that buffer, not copies.
///
/// # Position Tracking
///
/// The decoder maintains a position pointer that advances as data is decoded.
/// This allows sequential decoding of multiple values from the same buffer.
///
/// # Error Handling
///
/// Every failure is a [`VellumError::Structural`] carrying the offset where it
/// was detected:
/// - Buffer underflow (declared length beyond the remaining input)
/// - Invalid tag or length octets
/// - A length above [`DecodeLimits::max_content_length`]
/// - Nesting deeper than [`DecodeLimits::max_depth`]
/// - Missing end-of-contents marker
pub struct BerDecoder {
    buffer: Bytes,
    position: usize,
    limits: DecodeLimits,
    depth: usize,
}

impl BerDecoder {
    /// Create a new BER decoder with default limits
    pub fn new(buffer: impl Into<Bytes>) -> Self {
        Self::with_limits(buffer, DecodeLimits::default())
    }

    pub fn with_limits(buffer: impl Into<Bytes>, limits: DecodeLimits) -> Self {
        Self {
            buffer: buffer.into(),
            position: 0,
            limits,
            depth: 0,
        }
    }

    fn child(&self, buffer: Bytes) -> Self {
        Self {
            buffer,
            position: 0,
            limits: self.limits,
            depth: self.depth,
        }
    }

    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Get current position in buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get remaining bytes
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Check if there is more data to decode
    pub fn has_remaining(&self) -> bool {
        self.position < self.buffer.len()
    }

    fn error(&self, message: impl std::fmt::Display) -> VellumError {
        VellumError::structural(format!("{} at offset {}", message, self.position))
    }

    /// Attach the current offset to a structural error raised further down
    fn locate(&self, error: VellumError) -> VellumError {
        at_offset(error, self.position)
    }

    /// Read multiple bytes from the buffer, sharing its storage
    fn read_bytes(&mut self, count: usize) -> VellumResult<Bytes> {
        if count > self.remaining() {
            return Err(self.error(format_args!(
                "buffer exhausted: need {} bytes, have {}",
                count,
                self.remaining()
            )));
        }
        let start = self.position;
        self.position += count;
        Ok(self.buffer.slice(start..start + count))
    }

    /// Peek at the next tag without consuming it
    pub fn peek_tag(&self) -> VellumResult<Option<BerTag>> {
        if !self.has_remaining() {
            return Ok(None);
        }
        let (tag, _) = BerTag::decode_with(&self.buffer[self.position..], self.limits.strict_der)
            .map_err(|e| self.locate(e))?;
        Ok(Some(tag))
    }

    /// Decode a tag and a length
    ///
    /// A definite length is checked against the configured maximum and
    /// against the bytes left in the buffer before anything is read.
    pub fn decode_header(&mut self) -> VellumResult<(BerTag, BerLength)> {
        let strict = self.limits.strict_der;
        let (tag, tag_len) = BerTag::decode_with(&self.buffer[self.position..], strict)
            .map_err(|e| self.locate(e))?;
        let (length, length_len) =
            BerLength::decode_with(&self.buffer[self.position + tag_len..], strict)
                .map_err(|e| self.locate(e))?;

        match length {
            BerLength::Indefinite => {
                if !self.limits.allow_indefinite {
                    return Err(self.error("indefinite length not allowed"));
                }
                if !tag.is_constructed() {
                    return Err(self.error("primitive element with indefinite length"));
                }
                log::debug!("indefinite length for tag {:?} at offset {}", tag, self.position);
            }
            BerLength::Definite(len) => {
                if len > self.limits.max_content_length {
                    return Err(self.error(format_args!(
                        "content length {} exceeds limit {}",
                        len, self.limits.max_content_length
                    )));
                }
                let available = self.remaining() - tag_len - length_len;
                if len > available {
                    return Err(self.error(format_args!(
                        "declared length {} but only {} bytes remain",
                        len, available
                    )));
                }
            }
        }

        self.position += tag_len + length_len;
        Ok((tag, length))
    }

    /// Decode a definite-length TLV (Tag-Length-Value) triplet
    ///
    /// # Returns
    /// The tag and the raw content octets.
    pub fn decode_tlv(&mut self) -> VellumResult<(BerTag, Bytes)> {
        match self.decode_header()? {
            (tag, BerLength::Definite(len)) => Ok((tag, self.read_bytes(len)?)),
            (_, BerLength::Indefinite) => {
                Err(self.error("indefinite length where a definite length is required"))
            }
        }
    }

    /// Skip the next element, returning the number of bytes consumed
    pub fn skip_tlv(&mut self) -> VellumResult<usize> {
        let start = self.position;
        self.decode_object()?;
        Ok(self.position - start)
    }

    fn at_end_of_contents(&self) -> bool {
        self.buffer.get(self.position..self.position + 2) == Some(&[0x00, 0x00][..])
    }

    /// Decode the next element into a node, recursing into constructed
    /// elements
    pub fn decode_object(&mut self) -> VellumResult<Asn1Object> {
        let start = self.position;
        let (tag, length) = self.decode_header()?;
        log::trace!("decoding {:?} ({:?}) at offset {}", tag, length, start);

        if !tag.is_constructed() {
            let BerLength::Definite(len) = length else {
                return Err(self.error("primitive element with indefinite length"));
            };
            let content = self.read_bytes(len)?;
            return match tag.class() {
                BerTagClass::Universal => {
                    Asn1Object::from_universal_primitive(tag.number(), content, self.limits.strict_der)
                        .map_err(|e| at_offset(e, start))
                }
                class => Ok(Asn1Object::Tagged(TaggedObject::decoded(
                    class,
                    tag.number(),
                    TaggedContent::Primitive(content),
                    false,
                ))),
            };
        }

        if self.depth >= self.limits.max_depth {
            return Err(self.error(format_args!(
                "nesting deeper than {} levels",
                self.limits.max_depth
            )));
        }
        self.depth += 1;
        let children = self.decode_children(length);
        self.depth -= 1;
        let children = children?;
        let indefinite = length.is_indefinite();

        match tag.class() {
            BerTagClass::Universal => Asn1Object::from_universal_constructed(
                tag.number(),
                children,
                indefinite,
                self.limits.strict_der,
            )
            .map_err(|e| at_offset(e, start)),
            class => Ok(Asn1Object::Tagged(TaggedObject::decoded(
                class,
                tag.number(),
                TaggedContent::Constructed(children),
                indefinite,
            ))),
        }
    }

    fn decode_children(&mut self, length: BerLength) -> VellumResult<Vec<Asn1Object>> {
        let mut children = Vec::new();
        match length {
            BerLength::Definite(len) => {
                let content = self.read_bytes(len)?;
                let mut inner = self.child(content);
                while inner.has_remaining() {
                    children.push(inner.decode_object()?);
                }
            }
            BerLength::Indefinite => loop {
                if self.at_end_of_contents() {
                    self.position += 2;
                    break;
                }
                if !self.has_remaining() {
                    return Err(self.error("missing end-of-contents marker"));
                }
                children.push(self.decode_object()?);
            },
        }
        Ok(children)
    }

    /// Decode an INTEGER
    pub fn decode_integer(&mut self) -> VellumResult<Integer> {
        Ok(self.decode_object()?.as_integer()?.clone())
    }

    pub fn decode_boolean(&mut self) -> VellumResult<bool> {
        self.decode_object()?.as_boolean()
    }

    /// Decode an OCTET STRING
    pub fn decode_octet_string(&mut self) -> VellumResult<Bytes> {
        Ok(self.decode_object()?.as_octet_string()?.clone())
    }

    /// Decode an OBJECT IDENTIFIER
    pub fn decode_object_identifier(&mut self) -> VellumResult<ObjectIdentifier> {
        Ok(self.decode_object()?.as_oid()?.clone())
    }

    /// Decode a SEQUENCE
    pub fn decode_sequence(&mut self) -> VellumResult<Sequence> {
        match self.decode_object()? {
            Asn1Object::Sequence(seq) => Ok(seq),
            other => Err(VellumError::structural(format!(
                "expected SEQUENCE, found {}",
                other.kind_name()
            ))),
        }
    }

    /// Decode a context-specific element numbered `expected_tag_number`,
    /// returning its raw content
    pub fn decode_context_specific(&mut self, expected_tag_number: u32) -> VellumResult<Bytes> {
        let (tag, content) = self.decode_tlv()?;
        if !tag.is_context(expected_tag_number) {
            return Err(VellumError::structural(format!(
                "expected context tag [{}], got {:?}",
                expected_tag_number, tag
            )));
        }
        Ok(content)
    }

    /// Require that the whole buffer was consumed
    pub fn finish(self) -> VellumResult<()> {
        if self.has_remaining() {
            return Err(self.error(format_args!("{} trailing bytes", self.remaining())));
        }
        Ok(())
    }
}

fn at_offset(error: VellumError, offset: usize) -> VellumError {
    match error {
        VellumError::Structural(message) => {
            VellumError::Structural(format!("{} at offset {}", message, offset))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn decode(data: &[u8]) -> VellumResult<Asn1Object> {
        let mut decoder = BerDecoder::new(Bytes::copy_from_slice(data));
        let object = decoder.decode_object()?;
        decoder.finish()?;
        Ok(object)
    }

    #[test]
    fn test_decode_integer() {
        let mut decoder = BerDecoder::new(hex!("02 02 3039 02 01 80").to_vec());
        assert_eq!(decoder.decode_integer().unwrap().to_i64(), Some(12345));
        assert_eq!(decoder.decode_integer().unwrap().to_i64(), Some(-128));
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn test_decode_octet_string() {
        let mut decoder = BerDecoder::new(hex!("04 05 48656c6c6f").to_vec());
        assert_eq!(decoder.decode_octet_string().unwrap().as_ref(), b"Hello");
    }

    #[test]
    fn test_decode_object_identifier() {
        let mut decoder = BerDecoder::new(hex!("06 06 2a864886f70d").to_vec());
        let oid = decoder.decode_object_identifier().unwrap();
        assert_eq!(oid.arcs(), &[1, 2, 840, 113549]);
    }

    #[test]
    fn test_high_tag_form_for_small_number() {
        // [UNIVERSAL 5] in the high-tag-number form: still NULL
        let object = decode(&hex!("1f05 00")).unwrap();
        assert_eq!(object, Asn1Object::Null);

        let mut decoder = BerDecoder::with_limits(hex!("1f05 00").to_vec(), DecodeLimits::der());
        assert!(decoder.decode_object().is_err());
    }

    #[test]
    fn test_truncated_length_rejected() {
        let mut data = vec![0x04, 100];
        data.extend_from_slice(&[0xAA; 10]);
        let mut decoder = BerDecoder::new(data);
        let err = decoder.decode_object().unwrap_err();
        assert!(matches!(err, VellumError::Structural(_)));
        assert!(err.to_string().contains("declared length 100"));
    }

    #[test]
    fn test_indefinite_sequence() {
        let object = decode(&hex!("3080 020101 0500 0000")).unwrap();
        let seq = object.as_sequence().unwrap();
        assert!(seq.is_indefinite());
        assert_eq!(seq.len(), 2);
        assert_eq!(object.encode().as_ref(), &hex!("3080 020101 0500 0000"));
        assert_eq!(object.to_der().as_ref(), &hex!("3005 020101 0500"));
    }

    #[test]
    fn test_nested_indefinite_tagged() {
        let data = hex!("a080 3080 0101ff 0000 0000");
        let object = decode(&data).unwrap();
        let tagged = object.as_tagged().unwrap();
        assert!(tagged.is_indefinite());
        assert!(tagged.explicit_inner().unwrap().as_sequence().is_ok());
        assert_eq!(object.encode().as_ref(), &data);
    }

    #[test]
    fn test_missing_end_of_contents() {
        assert!(decode(&hex!("3080 020101")).is_err());
    }

    #[test]
    fn test_indefinite_disallowed_by_limits() {
        let limits = DecodeLimits::default().with_indefinite(false);
        let mut decoder = BerDecoder::with_limits(hex!("3080 0000").to_vec(), limits);
        assert!(decoder.decode_object().is_err());
    }

    #[test]
    fn test_primitive_indefinite_rejected() {
        assert!(decode(&hex!("0480 0000")).is_err());
    }

    #[test]
    fn test_constructed_octet_string() {
        let object = decode(&hex!("2480 0402 4142 0401 43 0000")).unwrap();
        assert_eq!(object.as_octet_string().unwrap().as_ref(), b"ABC");
    }

    #[test]
    fn test_depth_limit() {
        let data = hex!("3006 3004 3002 3000");
        let limits = DecodeLimits::default().with_max_depth(3);
        let mut decoder = BerDecoder::with_limits(data.to_vec(), limits);
        assert!(decoder.decode_object().is_err());
        let mut decoder = BerDecoder::with_limits(data.to_vec(), limits.with_max_depth(4));
        assert!(decoder.decode_object().is_ok());
    }

    #[test]
    fn test_content_length_limit() {
        let limits = DecodeLimits::default().with_max_content_length(4);
        let mut decoder = BerDecoder::with_limits(hex!("0405 0102030405").to_vec(), limits);
        assert!(decoder.decode_object().is_err());
    }

    #[test]
    fn test_trailing_bytes() {
        assert!(decode(&hex!("0500 00")).is_err());
    }

    #[test]
    fn test_context_specific_tlv() {
        let mut decoder = BerDecoder::new(hex!("8102 abcd").to_vec());
        assert_eq!(decoder.peek_tag().unwrap(), Some(BerTag::context_specific(false, 1)));
        assert_eq!(decoder.decode_context_specific(1).unwrap().as_ref(), &hex!("abcd"));
        assert_eq!(decoder.peek_tag().unwrap(), None);
    }

    #[test]
    fn test_unknown_universal_kept_raw() {
        let object = decode(&hex!("0701 ab")).unwrap();
        assert!(matches!(object, Asn1Object::Unknown(_)));
        assert_eq!(object.encode().as_ref(), &hex!("0701 ab"));
    }

    #[test]
    fn test_zero_copy_content() {
        let data = Bytes::from(hex!("04 03 010203").to_vec());
        let mut decoder = BerDecoder::new(data.clone());
        let content = decoder.decode_octet_string().unwrap();
        assert_eq!(content.as_ptr(), data[2..].as_ptr());
    }
}
