//! OBJECT IDENTIFIER values

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::{VellumError, VellumResult};

/// An object identifier as a list of arcs
///
/// # Encoding
/// The first two arcs `X.Y` share one subidentifier `40 * X + Y`; every
/// subidentifier is written base-128, most significant group first, with the
/// high bit set on all but the last octet.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIdentifier {
    arcs: Cow<'static, [u64]>,
}

impl ObjectIdentifier {
    /// Compile-time constant; the arcs must already satisfy the first-arc
    /// rules checked by [`ObjectIdentifier::new`].
    pub const fn from_static(arcs: &'static [u64]) -> Self {
        Self {
            arcs: Cow::Borrowed(arcs),
        }
    }

    /// # Errors
    /// [`VellumError::InvalidArgument`] when there are fewer than two arcs,
    /// the first arc is above 2, or the second arc is 40 or more under a
    /// first arc of 0 or 1.
    pub fn new(arcs: impl Into<Vec<u64>>) -> VellumResult<Self> {
        let arcs = arcs.into();
        Self::check_arcs(&arcs)?;
        Ok(Self {
            arcs: Cow::Owned(arcs),
        })
    }

    fn check_arcs(arcs: &[u64]) -> VellumResult<()> {
        match arcs {
            [] | [_] => Err(VellumError::invalid_argument(
                "object identifier needs at least two arcs",
            )),
            [first, _, ..] if *first > 2 => Err(VellumError::invalid_argument(format!(
                "first object identifier arc must be 0, 1 or 2, got {}",
                first
            ))),
            [first, second, ..] if *first < 2 && *second >= 40 => {
                Err(VellumError::invalid_argument(format!(
                    "second arc must be below 40 under arc {}, got {}",
                    first, second
                )))
            }
            [2, second, ..] if second.checked_add(80).is_none() => Err(
                VellumError::invalid_argument("second object identifier arc too large"),
            ),
            _ => Ok(()),
        }
    }

    pub fn arcs(&self) -> &[u64] {
        &self.arcs
    }

    /// Whether `self` equals `prefix` or lies underneath it
    pub fn starts_with(&self, prefix: &ObjectIdentifier) -> bool {
        self.arcs.starts_with(&prefix.arcs)
    }

    /// The identifier of arc `arc` underneath `self`
    pub fn child(&self, arc: u64) -> Self {
        let mut arcs = self.arcs.to_vec();
        arcs.push(arc);
        Self {
            arcs: Cow::Owned(arcs),
        }
    }

    /// Content octets
    pub fn content(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.arcs.len() * 2);
        let Some((&first, rest)) = self.arcs.split_first() else {
            return out;
        };
        let Some((&second, rest)) = rest.split_first() else {
            return out;
        };
        push_subidentifier(&mut out, first.saturating_mul(40).saturating_add(second));
        for &arc in rest {
            push_subidentifier(&mut out, arc);
        }
        out
    }

    /// Parse OBJECT IDENTIFIER content octets
    ///
    /// # Errors
    /// [`VellumError::Structural`] on empty content, a subidentifier starting
    /// with `0x80`, a truncated last subidentifier, or an arc beyond 64 bits.
    pub fn from_content(content: &[u8]) -> VellumResult<Self> {
        if content.is_empty() {
            return Err(VellumError::structural("empty OBJECT IDENTIFIER content"));
        }

        let mut arcs = Vec::with_capacity(content.len() + 1);
        let mut value = 0u64;
        let mut fresh = true;
        for &byte in content {
            if fresh && byte == 0x80 {
                return Err(VellumError::structural(
                    "non-minimal OBJECT IDENTIFIER subidentifier",
                ));
            }
            if value > (u64::MAX >> 7) {
                return Err(VellumError::structural("OBJECT IDENTIFIER arc exceeds 64 bits"));
            }
            value = (value << 7) | u64::from(byte & 0x7F);
            fresh = byte & 0x80 == 0;
            if fresh {
                if arcs.is_empty() {
                    let (first, second) = match value {
                        0..40 => (0, value),
                        40..80 => (1, value - 40),
                        _ => (2, value - 80),
                    };
                    arcs.push(first);
                    arcs.push(second);
                } else {
                    arcs.push(value);
                }
                value = 0;
            }
        }
        if !fresh {
            return Err(VellumError::structural("truncated OBJECT IDENTIFIER subidentifier"));
        }

        Ok(Self {
            arcs: Cow::Owned(arcs),
        })
    }
}

fn push_subidentifier(out: &mut Vec<u8>, mut value: u64) {
    let mut groups = [0u8; 10];
    let mut count = 0;
    loop {
        groups[count] = (value & 0x7F) as u8;
        count += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..count).rev() {
        out.push(if i > 0 { groups[i] | 0x80 } else { groups[i] });
    }
}

impl FromStr for ObjectIdentifier {
    type Err = VellumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arcs = s
            .split('.')
            .map(|arc| {
                arc.parse::<u64>().map_err(|_| {
                    VellumError::invalid_argument(format!("invalid object identifier: {}", s))
                })
            })
            .collect::<VellumResult<Vec<u64>>>()?;
        Self::new(arcs)
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.arcs.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectIdentifier({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_rsa_encryption() {
        let oid: ObjectIdentifier = "1.2.840.113549.1.1.1".parse().unwrap();
        assert_eq!(
            oid.content(),
            vec![0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01]
        );
        assert_eq!(ObjectIdentifier::from_content(&oid.content()).unwrap(), oid);
    }

    #[test]
    fn test_large_first_subidentifier() {
        // 2.999.3 encodes 40*2+999 = 1079 in two octets
        let oid = ObjectIdentifier::new(vec![2, 999, 3]).unwrap();
        assert_eq!(oid.content(), vec![0x88, 0x37, 0x03]);
        assert_eq!(ObjectIdentifier::from_content(&[0x88, 0x37, 0x03]).unwrap(), oid);
    }

    #[test]
    fn test_arc_rules() {
        assert!(ObjectIdentifier::new(vec![1]).is_err());
        assert!(ObjectIdentifier::new(vec![3, 1]).is_err());
        assert!(ObjectIdentifier::new(vec![1, 40]).is_err());
        assert!(ObjectIdentifier::new(vec![2, 40]).is_ok());
        assert!("1.2.x".parse::<ObjectIdentifier>().is_err());
        assert!("".parse::<ObjectIdentifier>().is_err());
    }

    #[test]
    fn test_malformed_content() {
        assert!(ObjectIdentifier::from_content(&[]).is_err());
        assert!(ObjectIdentifier::from_content(&[0x2A, 0x80, 0x01]).is_err());
        assert!(ObjectIdentifier::from_content(&[0x2A, 0x86]).is_err());
        assert!(ObjectIdentifier::from_content(&[0xFF; 11]).is_err());
    }

    #[test]
    fn test_static_and_display() {
        const SHA1: ObjectIdentifier = ObjectIdentifier::from_static(&[1, 3, 14, 3, 2, 26]);
        assert_eq!(SHA1.to_string(), "1.3.14.3.2.26");
        assert_eq!(format!("{:?}", SHA1), "ObjectIdentifier(1.3.14.3.2.26)");
        assert_eq!(SHA1, "1.3.14.3.2.26".parse().unwrap());
        assert!(SHA1.child(7).starts_with(&SHA1));
    }
}
