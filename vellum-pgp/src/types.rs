//! Packet tags and algorithm identifiers

use std::fmt;

/// One-octet registries where values outside the known set are carried as
/// `Unknown`
macro_rules! registry {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            Unknown(u8),
        }

        impl $name {
            pub fn from_u8(value: u8) -> Self {
                match value {
                    $($value => $name::$variant,)+
                    other => $name::Unknown(other),
                }
            }

            pub fn to_u8(self) -> u8 {
                match self {
                    $($name::$variant => $value,)+
                    $name::Unknown(other) => other,
                }
            }
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                Self::from_u8(value)
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                value.to_u8()
            }
        }
    };
}

registry!(
    /// Public-key algorithm IDs (RFC 4880 §9.1, RFC 6637)
    PublicKeyAlgorithm {
        RsaEncryptSign = 1,
        RsaEncrypt = 2,
        RsaSign = 3,
        Elgamal = 16,
        Dsa = 17,
        Ecdh = 18,
        Ecdsa = 19,
        ElgamalEncryptSign = 20,
        EdDsa = 22,
    }
);

registry!(
    /// Symmetric-key algorithm IDs (RFC 4880 §9.2)
    SymmetricAlgorithm {
        Plaintext = 0,
        Idea = 1,
        TripleDes = 2,
        Cast5 = 3,
        Blowfish = 4,
        Aes128 = 7,
        Aes192 = 8,
        Aes256 = 9,
        Twofish = 10,
        Camellia128 = 11,
        Camellia192 = 12,
        Camellia256 = 13,
    }
);

impl SymmetricAlgorithm {
    /// Cipher block size in bytes, which is also the IV length
    pub fn block_size(self) -> Option<usize> {
        match self {
            SymmetricAlgorithm::Plaintext => Some(0),
            SymmetricAlgorithm::Idea
            | SymmetricAlgorithm::TripleDes
            | SymmetricAlgorithm::Cast5
            | SymmetricAlgorithm::Blowfish => Some(8),
            SymmetricAlgorithm::Aes128
            | SymmetricAlgorithm::Aes192
            | SymmetricAlgorithm::Aes256
            | SymmetricAlgorithm::Twofish
            | SymmetricAlgorithm::Camellia128
            | SymmetricAlgorithm::Camellia192
            | SymmetricAlgorithm::Camellia256 => Some(16),
            SymmetricAlgorithm::Unknown(_) => None,
        }
    }
}

registry!(
    /// Hash algorithm IDs (RFC 4880 §9.4)
    HashAlgorithm {
        Md5 = 1,
        Sha1 = 2,
        Ripemd160 = 3,
        Sha256 = 8,
        Sha384 = 9,
        Sha512 = 10,
        Sha224 = 11,
    }
);

registry!(
    /// Compression algorithm IDs (RFC 4880 §9.3)
    CompressionAlgorithm {
        Uncompressed = 0,
        Zip = 1,
        Zlib = 2,
        Bzip2 = 3,
    }
);

/// Packet tags (RFC 4880 §4.3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketTag {
    Reserved,
    PublicKeyEncSession,
    Signature,
    SymKeyEncSession,
    OnePassSignature,
    SecretKey,
    PublicKey,
    SecretSubkey,
    Compressed,
    SymEncData,
    Marker,
    Literal,
    Trust,
    UserId,
    PublicSubkey,
    UserAttribute,
    SymEncIntegrity,
    ModDetectionCode,
    /// Private or experimental values 60 to 63
    Experimental(u8),
    Unknown(u8),
}

impl PacketTag {
    /// Tag numbers fit in six bits; anything above is masked by the header
    /// decoder before it gets here.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => PacketTag::Reserved,
            1 => PacketTag::PublicKeyEncSession,
            2 => PacketTag::Signature,
            3 => PacketTag::SymKeyEncSession,
            4 => PacketTag::OnePassSignature,
            5 => PacketTag::SecretKey,
            6 => PacketTag::PublicKey,
            7 => PacketTag::SecretSubkey,
            8 => PacketTag::Compressed,
            9 => PacketTag::SymEncData,
            10 => PacketTag::Marker,
            11 => PacketTag::Literal,
            12 => PacketTag::Trust,
            13 => PacketTag::UserId,
            14 => PacketTag::PublicSubkey,
            17 => PacketTag::UserAttribute,
            18 => PacketTag::SymEncIntegrity,
            19 => PacketTag::ModDetectionCode,
            60..=63 => PacketTag::Experimental(value),
            other => PacketTag::Unknown(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            PacketTag::Reserved => 0,
            PacketTag::PublicKeyEncSession => 1,
            PacketTag::Signature => 2,
            PacketTag::SymKeyEncSession => 3,
            PacketTag::OnePassSignature => 4,
            PacketTag::SecretKey => 5,
            PacketTag::PublicKey => 6,
            PacketTag::SecretSubkey => 7,
            PacketTag::Compressed => 8,
            PacketTag::SymEncData => 9,
            PacketTag::Marker => 10,
            PacketTag::Literal => 11,
            PacketTag::Trust => 12,
            PacketTag::UserId => 13,
            PacketTag::PublicSubkey => 14,
            PacketTag::UserAttribute => 17,
            PacketTag::SymEncIntegrity => 18,
            PacketTag::ModDetectionCode => 19,
            PacketTag::Experimental(value) | PacketTag::Unknown(value) => value,
        }
    }

    /// Whether an old-format header can carry this tag (four tag bits)
    pub fn fits_old_format(self) -> bool {
        self.to_u8() < 16
    }
}

impl fmt::Display for PacketTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketTag::Experimental(value) => write!(f, "experimental packet {}", value),
            PacketTag::Unknown(value) => write!(f, "unknown packet {}", value),
            other => write!(f, "{:?} packet", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_values_round_trip() {
        for value in 0u8..64 {
            assert_eq!(PacketTag::from_u8(value).to_u8(), value);
        }
        assert_eq!(PacketTag::from_u8(61), PacketTag::Experimental(61));
        assert_eq!(PacketTag::from_u8(15), PacketTag::Unknown(15));
        assert!(PacketTag::UserId.fits_old_format());
        assert!(!PacketTag::SymEncIntegrity.fits_old_format());
    }

    #[test]
    fn test_registries() {
        assert_eq!(PublicKeyAlgorithm::from_u8(22), PublicKeyAlgorithm::EdDsa);
        assert_eq!(PublicKeyAlgorithm::from_u8(99), PublicKeyAlgorithm::Unknown(99));
        assert_eq!(u8::from(HashAlgorithm::Sha256), 8);
        assert_eq!(SymmetricAlgorithm::Aes256.block_size(), Some(16));
        assert_eq!(SymmetricAlgorithm::Cast5.block_size(), Some(8));
        assert_eq!(SymmetricAlgorithm::Unknown(200).block_size(), None);
    }
}
