//! Character string values

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ber::types::universal;
use crate::error::{VellumError, VellumResult};

/// Character string types, by universal tag number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StringKind {
    Utf8,
    Numeric,
    Printable,
    /// T61String, read as Latin-1
    Teletex,
    Ia5,
    Visible,
    Bmp,
}

impl StringKind {
    pub fn from_tag_number(number: u32) -> Option<Self> {
        match number {
            universal::UTF8_STRING => Some(StringKind::Utf8),
            universal::NUMERIC_STRING => Some(StringKind::Numeric),
            universal::PRINTABLE_STRING => Some(StringKind::Printable),
            universal::T61_STRING => Some(StringKind::Teletex),
            universal::IA5_STRING => Some(StringKind::Ia5),
            universal::VISIBLE_STRING => Some(StringKind::Visible),
            universal::BMP_STRING => Some(StringKind::Bmp),
            _ => None,
        }
    }

    pub fn tag_number(self) -> u32 {
        match self {
            StringKind::Utf8 => universal::UTF8_STRING,
            StringKind::Numeric => universal::NUMERIC_STRING,
            StringKind::Printable => universal::PRINTABLE_STRING,
            StringKind::Teletex => universal::T61_STRING,
            StringKind::Ia5 => universal::IA5_STRING,
            StringKind::Visible => universal::VISIBLE_STRING,
            StringKind::Bmp => universal::BMP_STRING,
        }
    }

    fn allows(self, c: char) -> bool {
        match self {
            StringKind::Utf8 => true,
            StringKind::Numeric => c.is_ascii_digit() || c == ' ',
            StringKind::Printable => {
                c.is_ascii_alphanumeric() || " '()+,-./:=?".contains(c)
            }
            StringKind::Teletex => u32::from(c) <= 0xFF,
            StringKind::Ia5 => c.is_ascii(),
            StringKind::Visible => (' '..='~').contains(&c),
            StringKind::Bmp => u32::from(c) <= 0xFFFF,
        }
    }
}

/// A character string together with its ASN.1 string type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asn1String {
    kind: StringKind,
    value: String,
}

impl Asn1String {
    /// # Errors
    /// [`VellumError::InvalidArgument`] if `value` has a character the string
    /// type cannot carry.
    pub fn new(kind: StringKind, value: impl Into<String>) -> VellumResult<Self> {
        let value = value.into();
        if let Some(bad) = value.chars().find(|&c| !kind.allows(c)) {
            return Err(VellumError::invalid_argument(format!(
                "character {:?} not allowed in {:?} string",
                bad, kind
            )));
        }
        Ok(Self { kind, value })
    }

    pub fn utf8(value: impl Into<String>) -> Self {
        Self {
            kind: StringKind::Utf8,
            value: value.into(),
        }
    }

    pub fn printable(value: impl Into<String>) -> VellumResult<Self> {
        Self::new(StringKind::Printable, value)
    }

    pub fn ia5(value: impl Into<String>) -> VellumResult<Self> {
        Self::new(StringKind::Ia5, value)
    }

    /// Parse content octets of a string of type `kind`
    pub fn from_content(kind: StringKind, content: &[u8]) -> VellumResult<Self> {
        let value = match kind {
            StringKind::Teletex => content.iter().map(|&b| char::from(b)).collect(),
            StringKind::Bmp => {
                if content.len() % 2 != 0 {
                    return Err(VellumError::structural("BMPString content has odd length"));
                }
                let units = content
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
                char::decode_utf16(units)
                    .collect::<Result<String, _>>()
                    .map_err(|_| VellumError::structural("BMPString holds a surrogate"))?
            }
            _ => String::from_utf8(content.to_vec()).map_err(|_| {
                VellumError::structural(format!("{:?} string is not valid text", kind))
            })?,
        };
        Self::new(kind, value).map_err(|e| VellumError::structural(e.to_string()))
    }

    pub fn kind(&self) -> StringKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Content octets
    pub fn content(&self) -> Bytes {
        match self.kind {
            StringKind::Teletex => self.value.chars().map(|c| u32::from(c) as u8).collect(),
            StringKind::Bmp => self
                .value
                .encode_utf16()
                .flat_map(|unit| unit.to_be_bytes())
                .collect(),
            _ => Bytes::copy_from_slice(self.value.as_bytes()),
        }
    }
}

impl fmt::Display for Asn1String {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_alphabet() {
        assert!(Asn1String::printable("Example CA, Inc.").is_ok());
        assert!(Asn1String::printable("user@example.com").is_err());
        assert!(Asn1String::ia5("user@example.com").is_ok());
        assert!(Asn1String::new(StringKind::Numeric, "12 34").is_ok());
        assert!(Asn1String::new(StringKind::Numeric, "12a").is_err());
    }

    #[test]
    fn test_bmp_content() {
        let s = Asn1String::new(StringKind::Bmp, "Aé").unwrap();
        assert_eq!(s.content().as_ref(), &[0x00, 0x41, 0x00, 0xE9]);
        let back = Asn1String::from_content(StringKind::Bmp, &[0x00, 0x41, 0x00, 0xE9]).unwrap();
        assert_eq!(back, s);
        assert!(Asn1String::from_content(StringKind::Bmp, &[0x00]).is_err());
    }

    #[test]
    fn test_teletex_latin1() {
        let s = Asn1String::from_content(StringKind::Teletex, &[0x41, 0xE9]).unwrap();
        assert_eq!(s.as_str(), "Aé");
        assert_eq!(s.content().as_ref(), &[0x41, 0xE9]);
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(Asn1String::from_content(StringKind::Utf8, &[0xC3, 0x28]).is_err());
        assert!(Asn1String::from_content(StringKind::Ia5, &[0x80]).is_err());
    }

    #[test]
    fn test_kind_numbers() {
        for kind in [
            StringKind::Utf8,
            StringKind::Numeric,
            StringKind::Printable,
            StringKind::Teletex,
            StringKind::Ia5,
            StringKind::Visible,
            StringKind::Bmp,
        ] {
            assert_eq!(StringKind::from_tag_number(kind.tag_number()), Some(kind));
        }
        assert_eq!(StringKind::from_tag_number(universal::INTEGER), None);
    }
}
