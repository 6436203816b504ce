//! BIT STRING values

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{VellumError, VellumResult};

/// A bit string: data octets plus the number of unused bits in the last octet
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitString {
    padding: u8,
    data: Bytes,
}

impl BitString {
    /// # Errors
    /// [`VellumError::InvalidArgument`] if `padding` is above 7, or non-zero
    /// with empty `data`.
    pub fn new(data: impl Into<Bytes>, padding: u8) -> VellumResult<Self> {
        let data = data.into();
        if padding > 7 {
            return Err(VellumError::invalid_argument(format!(
                "BIT STRING padding must be 0-7, got {}",
                padding
            )));
        }
        if data.is_empty() && padding != 0 {
            return Err(VellumError::invalid_argument(
                "empty BIT STRING must have zero padding",
            ));
        }
        Ok(Self { padding, data })
    }

    /// A bit string covering whole octets
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            padding: 0,
            data: data.into(),
        }
    }

    /// Named-bit list where bit `i` of `flags` is the ASN.1 bit `i`
    ///
    /// Trailing zero bits are dropped, as DER requires for named bit lists.
    pub fn from_flags(flags: u32) -> Self {
        if flags == 0 {
            return Self {
                padding: 0,
                data: Bytes::new(),
            };
        }
        let bit_count = (u32::BITS - flags.leading_zeros()) as usize;
        let octets = bit_count.div_ceil(8);
        let mut data = BytesMut::with_capacity(octets);
        for octet in 0..octets {
            let mut byte = 0u8;
            for bit in 0..8 {
                if flags & (1 << (octet * 8 + bit)) != 0 {
                    byte |= 0x80 >> bit;
                }
            }
            data.put_u8(byte);
        }
        Self {
            padding: (octets * 8 - bit_count) as u8,
            data: data.freeze(),
        }
    }

    /// Parse BIT STRING content octets (leading padding octet included)
    pub fn from_content(content: Bytes) -> VellumResult<Self> {
        let Some(&padding) = content.first() else {
            return Err(VellumError::structural("empty BIT STRING content"));
        };
        let data = content.slice(1..);
        Self::new(data, padding).map_err(|e| VellumError::structural(e.to_string()))
    }

    pub fn padding(&self) -> u8 {
        self.padding
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn bit_len(&self) -> usize {
        self.data.len() * 8 - usize::from(self.padding)
    }

    /// Whether ASN.1 bit `index` (0 = most significant bit of the first octet)
    /// is set
    pub fn is_set(&self, index: usize) -> bool {
        if index >= self.bit_len() {
            return false;
        }
        self.data[index / 8] & (0x80 >> (index % 8)) != 0
    }

    /// Content octets: padding count followed by the data
    pub fn content(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(1 + self.data.len());
        out.put_u8(self.padding);
        out.extend_from_slice(&self.data);
        out.freeze()
    }
}
