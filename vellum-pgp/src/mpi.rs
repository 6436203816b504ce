//! Multiprecision integers (RFC 4880 §3.2)

use std::fmt;

use bytes::Bytes;

use crate::error::{VellumError, VellumResult};

/// A bit count followed by the big-endian magnitude
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Mpi {
    bits: u16,
    magnitude: Bytes,
}

impl Mpi {
    /// Build from a magnitude, dropping leading zero octets
    ///
    /// # Errors
    /// [`VellumError::InvalidArgument`] if the value is wider than 65535 bits.
    pub fn new(magnitude: impl Into<Bytes>) -> VellumResult<Self> {
        let mut magnitude = magnitude.into();
        let leading = magnitude.iter().take_while(|&&b| b == 0).count();
        let _ = magnitude.split_to(leading);
        let bits = match magnitude.first() {
            None => 0,
            Some(&top) => (magnitude.len() - 1) * 8 + (8 - top.leading_zeros() as usize),
        };
        let bits = u16::try_from(bits).map_err(|_| {
            VellumError::invalid_argument(format!("MPI of {} bits is too wide", bits))
        })?;
        Ok(Self { bits, magnitude })
    }

    /// Check a bit count read from the wire against its magnitude
    ///
    /// # Errors
    /// [`VellumError::Structural`] when the magnitude length is not
    /// `ceil(bits / 8)` or its top octet does not have exactly the announced
    /// highest bit set.
    pub fn from_parts(bits: u16, magnitude: Bytes) -> VellumResult<Self> {
        let expected = usize::from(bits).div_ceil(8);
        if magnitude.len() != expected {
            return Err(VellumError::structural(format!(
                "MPI announces {} bits but carries {} octets",
                bits,
                magnitude.len()
            )));
        }
        if let Some(&top) = magnitude.first() {
            let top_bits = 8 - top.leading_zeros() as u16;
            let expected_top = bits - (expected as u16 - 1) * 8;
            if top_bits != expected_top {
                return Err(VellumError::structural(format!(
                    "MPI announces {} bits but its magnitude has {}",
                    bits,
                    (expected as u16 - 1) * 8 + top_bits
                )));
            }
        }
        Ok(Self { bits, magnitude })
    }

    pub fn bits(&self) -> u16 {
        self.bits
    }

    pub fn magnitude(&self) -> &Bytes {
        &self.magnitude
    }

    /// Length on the wire
    pub fn encoded_len(&self) -> usize {
        2 + self.magnitude.len()
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.bits.to_be_bytes());
        out.extend_from_slice(&self.magnitude);
    }
}

impl fmt::Debug for Mpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mpi({} bits, {})", self.bits, hex::encode(&self.magnitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strips_leading_zeros() {
        let mpi = Mpi::new(vec![0x00, 0x00, 0x01, 0xFF]).unwrap();
        assert_eq!(mpi.bits(), 9);
        assert_eq!(mpi.magnitude().as_ref(), &[0x01, 0xFF]);

        let zero = Mpi::new(vec![0x00]).unwrap();
        assert_eq!(zero.bits(), 0);
        assert!(zero.magnitude().is_empty());
    }

    #[test]
    fn test_bit_count_validated() {
        assert!(Mpi::from_parts(9, Bytes::from_static(&[0x01, 0xFF])).is_ok());
        assert!(Mpi::from_parts(10, Bytes::from_static(&[0x01, 0xFF])).is_err());
        assert!(Mpi::from_parts(16, Bytes::from_static(&[0x01, 0xFF])).is_err());
        assert!(Mpi::from_parts(8, Bytes::from_static(&[0x01, 0xFF])).is_err());
        assert!(Mpi::from_parts(0, Bytes::new()).is_ok());
    }

    #[test]
    fn test_write() {
        let mpi = Mpi::new(vec![0x80]).unwrap();
        let mut out = Vec::new();
        mpi.write_to(&mut out);
        assert_eq!(out, [0x00, 0x08, 0x80]);
        assert_eq!(mpi.encoded_len(), 3);
    }
}
