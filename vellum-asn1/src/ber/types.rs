//! BER encoding types (Tag, Length, etc.)

use serde::{Deserialize, Serialize};

use crate::error::{VellumError, VellumResult};

/// Universal tag numbers (ITU-T X.680 §8.4)
pub mod universal {
    pub const END_OF_CONTENTS: u32 = 0;
    pub const BOOLEAN: u32 = 1;
    pub const INTEGER: u32 = 2;
    pub const BIT_STRING: u32 = 3;
    pub const OCTET_STRING: u32 = 4;
    pub const NULL: u32 = 5;
    pub const OBJECT_IDENTIFIER: u32 = 6;
    pub const ENUMERATED: u32 = 10;
    pub const UTF8_STRING: u32 = 12;
    pub const SEQUENCE: u32 = 16;
    pub const SET: u32 = 17;
    pub const NUMERIC_STRING: u32 = 18;
    pub const PRINTABLE_STRING: u32 = 19;
    pub const T61_STRING: u32 = 20;
    pub const IA5_STRING: u32 = 22;
    pub const UTC_TIME: u32 = 23;
    pub const GENERALIZED_TIME: u32 = 24;
    pub const VISIBLE_STRING: u32 = 26;
    pub const BMP_STRING: u32 = 30;
}

/// BER Tag Class
///
/// ASN.1 defines four tag classes:
/// - **Universal**: Standard ASN.1 types (INTEGER, OCTET STRING, etc.)
/// - **Application**: Application-specific types
/// - **Context-specific**: Context-dependent types (used in SEQUENCE/SET)
/// - **Private**: Private/implementation-specific types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BerTagClass {
    /// Universal class (00)
    Universal = 0,
    /// Application class (01)
    Application = 1,
    /// Context-specific class (10)
    ContextSpecific = 2,
    /// Private class (11)
    Private = 3,
}

impl BerTagClass {
    /// Get tag class from bits 8-7 of the identifier byte
    pub fn from_bits(bits: u8) -> Self {
        match (bits >> 6) & 0x03 {
            0 => BerTagClass::Universal,
            1 => BerTagClass::Application,
            2 => BerTagClass::ContextSpecific,
            _ => BerTagClass::Private,
        }
    }

    /// Convert tag class to bits (for encoding)
    pub fn to_bits(self) -> u8 {
        (self as u8) << 6
    }
}

/// BER Tag
///
/// A BER tag identifies the type of an ASN.1 value. It consists of:
/// - **Class**: Universal, Application, Context-specific, or Private
/// - **Constructed/Primitive**: Whether the value contains nested TLVs
/// - **Tag Number**: 0-30 in the identifier byte, larger numbers in the
///   high-tag-number form
///
/// # Encoding Format
///
/// Short form (tag number 0-30):
/// ```text
/// Bits: 8 7 6 5 4 3 2 1
///       C C P T T T T T
/// ```
///
/// High-tag-number form (tag number >= 31):
/// ```text
/// First byte:      C C P 1 1 1 1 1
/// Following bytes: 1 T T T T T T T ... 0 T T T T T T T
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BerTag {
    class: BerTagClass,
    constructed: bool,
    number: u32,
}

impl BerTag {
    pub fn new(class: BerTagClass, constructed: bool, number: u32) -> Self {
        Self {
            class,
            constructed,
            number,
        }
    }

    pub fn universal(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::Universal, constructed, number)
    }

    pub fn application(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::Application, constructed, number)
    }

    pub fn context_specific(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::ContextSpecific, constructed, number)
    }

    pub fn private(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::Private, constructed, number)
    }

    pub fn class(&self) -> BerTagClass {
        self.class
    }

    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Whether this is the universal tag `number`, in either form
    pub fn is_universal(&self, number: u32) -> bool {
        self.class == BerTagClass::Universal && self.number == number
    }

    /// Whether this is the context-specific tag `number`, in either form
    pub fn is_context(&self, number: u32) -> bool {
        self.class == BerTagClass::ContextSpecific && self.number == number
    }

    /// The identifier byte(s) of this tag
    pub fn encode(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(1);
        let leading = self.class.to_bits() | if self.constructed { 0x20 } else { 0x00 };

        if self.number < 31 {
            result.push(leading | self.number as u8);
            return result;
        }

        result.push(leading | 0x1F);
        let mut groups = Vec::with_capacity(5);
        let mut remaining = self.number;
        loop {
            groups.push((remaining & 0x7F) as u8);
            remaining >>= 7;
            if remaining == 0 {
                break;
            }
        }
        let last = groups.len() - 1;
        for (i, group) in groups.iter().rev().enumerate() {
            result.push(if i < last { group | 0x80 } else { *group });
        }
        result
    }

    /// Decode a tag, accepting BER leniencies
    ///
    /// Returns the tag and the number of bytes consumed.
    pub fn decode(data: &[u8]) -> VellumResult<(Self, usize)> {
        Self::decode_with(data, false)
    }

    /// Decode a tag
    ///
    /// With `strict` set, the high-tag-number form is rejected for numbers
    /// that fit the single-byte form.
    ///
    /// # Why Two Modes?
    /// BER lets an encoder pick among several forms for the same tag, while DER
    /// allows exactly one. Signed data is checked as DER; other input is read
    /// leniently and only logged.
    ///
    /// # Errors
    /// Returns [`VellumError::Structural`] if:
    /// - the buffer ends inside the identifier
    /// - the first continuation byte is `0x80` (non-minimal)
    /// - the number does not fit in 32 bits
    pub fn decode_with(data: &[u8], strict: bool) -> VellumResult<(Self, usize)> {
        let Some(&first) = data.first() else {
            return Err(VellumError::structural("empty buffer for tag decoding"));
        };
        let class = BerTagClass::from_bits(first);
        let constructed = (first & 0x20) != 0;
        let low = first & 0x1F;

        if low < 31 {
            return Ok((Self::new(class, constructed, u32::from(low)), 1));
        }

        let mut number = 0u32;
        let mut pos = 1;
        loop {
            let Some(&byte) = data.get(pos) else {
                return Err(VellumError::structural("incomplete high-tag-number encoding"));
            };
            if pos == 1 && byte == 0x80 {
                return Err(VellumError::structural(
                    "high-tag-number form has a leading zero group",
                ));
            }
            if number > (u32::MAX >> 7) {
                return Err(VellumError::structural("tag number exceeds 32 bits"));
            }
            number = (number << 7) | u32::from(byte & 0x7F);
            pos += 1;
            if byte & 0x80 == 0 {
                break;
            }
        }

        if number < 31 {
            if strict {
                return Err(VellumError::structural(format!(
                    "tag number {} must use the single-byte form",
                    number
                )));
            }
            log::debug!("accepting high-tag-number form for tag number {}", number);
        }

        Ok((Self::new(class, constructed, number), pos))
    }
}

/// BER Length encoding
///
/// - **Definite**: short form for 0-127 (one byte), long form otherwise
///   (`0x80 | n` followed by `n` big-endian length bytes)
/// - **Indefinite**: the single byte `0x80`; the content is a series of
///   elements terminated by the end-of-contents marker `00 00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerLength {
    Definite(usize),
    Indefinite,
}

impl BerLength {
    pub fn new(length: usize) -> Self {
        BerLength::Definite(length)
    }

    /// The definite length, if any
    pub fn value(&self) -> Option<usize> {
        match self {
            BerLength::Definite(length) => Some(*length),
            BerLength::Indefinite => None,
        }
    }

    pub fn is_indefinite(&self) -> bool {
        matches!(self, BerLength::Indefinite)
    }

    /// The length octets, always in minimal form
    ///
    /// # Why Minimal Form?
    /// DER accepts only the shortest length octets, and a BER reader accepts
    /// them too, so one encoding serves both outputs.
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            BerLength::Indefinite => vec![0x80],
            BerLength::Definite(length) if length < 0x80 => vec![length as u8],
            BerLength::Definite(length) => {
                let bytes = length.to_be_bytes();
                let skip = bytes.iter().take_while(|&&b| b == 0).count();
                let significant = &bytes[skip..];
                let mut result = Vec::with_capacity(1 + significant.len());
                result.push(0x80 | significant.len() as u8);
                result.extend_from_slice(significant);
                result
            }
        }
    }

    /// Decode a length, accepting BER leniencies
    pub fn decode(data: &[u8]) -> VellumResult<(Self, usize)> {
        Self::decode_with(data, false)
    }

    /// Decode a length
    ///
    /// With `strict` set, non-minimal long forms and the indefinite form are
    /// rejected.
    ///
    /// # Why Reject 0xFF?
    /// X.690 reserves `0xFF` as a first length octet for future extensions.
    /// No valid encoding uses it, in BER or DER.
    pub fn decode_with(data: &[u8], strict: bool) -> VellumResult<(Self, usize)> {
        let Some(&first) = data.first() else {
            return Err(VellumError::structural("empty buffer for length decoding"));
        };

        if first & 0x80 == 0 {
            return Ok((BerLength::Definite(usize::from(first)), 1));
        }
        if first == 0x80 {
            if strict {
                return Err(VellumError::structural("indefinite length is not valid DER"));
            }
            return Ok((BerLength::Indefinite, 1));
        }
        if first == 0xFF {
            return Err(VellumError::structural("length byte 0xFF is reserved"));
        }

        let count = usize::from(first & 0x7F);
        if count > std::mem::size_of::<usize>() {
            return Err(VellumError::structural(format!(
                "length encoding too large: {} bytes",
                count
            )));
        }
        if data.len() < 1 + count {
            return Err(VellumError::structural(format!(
                "buffer too short for long form length: need {} bytes, got {}",
                1 + count,
                data.len()
            )));
        }

        let octets = &data[1..1 + count];
        let length = octets
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | usize::from(b));

        if octets[0] == 0 || length < 0x80 {
            if strict {
                return Err(VellumError::structural(format!(
                    "non-minimal length encoding for {}",
                    length
                )));
            }
            log::debug!("accepting non-minimal length encoding for {}", length);
        }

        Ok((BerLength::Definite(length), 1 + count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ber_tag_short_form() {
        let tag = BerTag::universal(false, universal::INTEGER);
        assert_eq!(tag.encode(), vec![0x02]);
    }

    #[test]
    fn test_ber_tag_constructed() {
        let tag = BerTag::context_specific(true, 3);
        assert_eq!(tag.encode(), vec![0xA3]);
        let tag = BerTag::application(true, 0);
        assert_eq!(tag.encode(), vec![0x60]);
    }

    #[test]
    fn test_ber_tag_high_number() {
        let tag = BerTag::context_specific(false, 201);
        let encoded = tag.encode();
        assert_eq!(encoded, vec![0x9F, 0x81, 0x49]);
        let (decoded, consumed) = BerTag::decode(&encoded).unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(decoded, tag);

        let tag = BerTag::private(true, 31);
        assert_eq!(tag.encode(), vec![0xFF, 0x1F]);
    }

    #[test]
    fn test_ber_tag_high_form_for_small_number() {
        let (tag, consumed) = BerTag::decode(&[0x1F, 0x05]).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(tag.class(), BerTagClass::Universal);
        assert!(!tag.is_constructed());
        assert_eq!(tag.number(), 5);
        assert!(BerTag::decode_with(&[0x1F, 0x05], true).is_err());
    }

    #[test]
    fn test_ber_tag_malformed() {
        assert!(BerTag::decode(&[]).is_err());
        assert!(BerTag::decode(&[0x1F]).is_err());
        assert!(BerTag::decode(&[0x1F, 0x81]).is_err());
        assert!(BerTag::decode(&[0x1F, 0x80, 0x01]).is_err());
        assert!(BerTag::decode(&[0x1F, 0x8F, 0xFF, 0xFF, 0xFF, 0x7F]).is_err());
    }

    #[test]
    fn test_ber_length_short_and_long() {
        assert_eq!(BerLength::new(100).encode(), vec![100]);
        assert_eq!(BerLength::new(128).encode(), vec![0x81, 0x80]);
        assert_eq!(BerLength::new(1000).encode(), vec![0x82, 0x03, 0xE8]);
        assert_eq!(BerLength::Indefinite.encode(), vec![0x80]);
    }

    #[test]
    fn test_ber_length_decode() {
        assert_eq!(BerLength::decode(&[100]).unwrap(), (BerLength::Definite(100), 1));
        assert_eq!(
            BerLength::decode(&[0x82, 0x01, 0x00]).unwrap(),
            (BerLength::Definite(256), 3)
        );
        assert_eq!(BerLength::decode(&[0x80]).unwrap(), (BerLength::Indefinite, 1));
        assert!(BerLength::decode(&[0xFF]).is_err());
        assert!(BerLength::decode(&[0x82, 0x01]).is_err());
        assert!(BerLength::decode(&[0x89, 1, 2, 3, 4, 5, 6, 7, 8, 9]).is_err());
    }

    #[test]
    fn test_ber_length_strict() {
        assert!(BerLength::decode_with(&[0x80], true).is_err());
        assert!(BerLength::decode_with(&[0x81, 0x05], true).is_err());
        assert!(BerLength::decode_with(&[0x82, 0x00, 0x90], true).is_err());
        assert_eq!(
            BerLength::decode(&[0x81, 0x05]).unwrap(),
            (BerLength::Definite(5), 2)
        );
    }
}
