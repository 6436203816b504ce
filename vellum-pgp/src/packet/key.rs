//! Public and secret key packets (RFC 4880 §5.5, RFC 6637 §9)

use bytes::Bytes;
use sha1::{Digest, Sha1};

use crate::body::BodyCursor;
use crate::error::{VellumError, VellumResult};
use crate::mpi::Mpi;
use crate::types::{HashAlgorithm, PublicKeyAlgorithm, SymmetricAlgorithm};

/// Algorithm-specific public key fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKeyMaterial {
    Rsa { n: Mpi, e: Mpi },
    Dsa { p: Mpi, q: Mpi, g: Mpi, y: Mpi },
    Elgamal { p: Mpi, g: Mpi, y: Mpi },
    Ecdsa { curve: Bytes, point: Mpi },
    EdDsa { curve: Bytes, point: Mpi },
    Ecdh { curve: Bytes, point: Mpi, kdf: KdfParameters },
    /// Fields of an algorithm this crate does not model
    Raw(Bytes),
}

/// ECDH key derivation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParameters {
    pub hash: HashAlgorithm,
    pub cipher: SymmetricAlgorithm,
}

fn read_curve(cursor: &mut BodyCursor) -> VellumResult<Bytes> {
    let len = cursor.u8()?;
    if len == 0 || len == 0xFF {
        return Err(cursor.error(format_args!("reserved curve OID length {}", len)));
    }
    cursor.bytes(usize::from(len))
}

fn check_curve(curve: &Bytes) -> VellumResult<()> {
    if curve.is_empty() || curve.len() >= 0xFF {
        return Err(VellumError::invalid_argument(format!(
            "curve OID of {} bytes does not fit its length octet (1 to 254)",
            curve.len()
        )));
    }
    Ok(())
}

impl PublicKeyMaterial {
    fn parse(algorithm: PublicKeyAlgorithm, cursor: &mut BodyCursor) -> VellumResult<Self> {
        let material = match algorithm {
            PublicKeyAlgorithm::RsaEncryptSign
            | PublicKeyAlgorithm::RsaEncrypt
            | PublicKeyAlgorithm::RsaSign => PublicKeyMaterial::Rsa {
                n: cursor.mpi()?,
                e: cursor.mpi()?,
            },
            PublicKeyAlgorithm::Dsa => PublicKeyMaterial::Dsa {
                p: cursor.mpi()?,
                q: cursor.mpi()?,
                g: cursor.mpi()?,
                y: cursor.mpi()?,
            },
            PublicKeyAlgorithm::Elgamal | PublicKeyAlgorithm::ElgamalEncryptSign => {
                PublicKeyMaterial::Elgamal {
                    p: cursor.mpi()?,
                    g: cursor.mpi()?,
                    y: cursor.mpi()?,
                }
            }
            PublicKeyAlgorithm::Ecdsa => PublicKeyMaterial::Ecdsa {
                curve: read_curve(cursor)?,
                point: cursor.mpi()?,
            },
            PublicKeyAlgorithm::EdDsa => PublicKeyMaterial::EdDsa {
                curve: read_curve(cursor)?,
                point: cursor.mpi()?,
            },
            PublicKeyAlgorithm::Ecdh => {
                let curve = read_curve(cursor)?;
                let point = cursor.mpi()?;
                let kdf_len = cursor.u8()?;
                let reserved = cursor.u8()?;
                if kdf_len != 3 || reserved != 1 {
                    return Err(cursor.error(format_args!(
                        "unsupported KDF parameters (length {}, version {})",
                        kdf_len, reserved
                    )));
                }
                let kdf = KdfParameters {
                    hash: HashAlgorithm::from_u8(cursor.u8()?),
                    cipher: SymmetricAlgorithm::from_u8(cursor.u8()?),
                };
                PublicKeyMaterial::Ecdh { curve, point, kdf }
            }
            PublicKeyAlgorithm::Unknown(_) => PublicKeyMaterial::Raw(cursor.rest()),
        };
        Ok(material)
    }

    /// Checks the fields that carry a one-octet length
    fn validate(&self) -> VellumResult<()> {
        match self {
            PublicKeyMaterial::Ecdsa { curve, .. }
            | PublicKeyMaterial::EdDsa { curve, .. }
            | PublicKeyMaterial::Ecdh { curve, .. } => check_curve(curve),
            _ => Ok(()),
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        let curve_point = |out: &mut Vec<u8>, curve: &Bytes, point: &Mpi| {
            out.push(curve.len() as u8);
            out.extend_from_slice(curve);
            point.write_to(out);
        };
        match self {
            PublicKeyMaterial::Rsa { n, e } => {
                n.write_to(out);
                e.write_to(out);
            }
            PublicKeyMaterial::Dsa { p, q, g, y } => {
                for mpi in [p, q, g, y] {
                    mpi.write_to(out);
                }
            }
            PublicKeyMaterial::Elgamal { p, g, y } => {
                for mpi in [p, g, y] {
                    mpi.write_to(out);
                }
            }
            PublicKeyMaterial::Ecdsa { curve, point } | PublicKeyMaterial::EdDsa { curve, point } => {
                curve_point(out, curve, point)
            }
            PublicKeyMaterial::Ecdh { curve, point, kdf } => {
                curve_point(out, curve, point);
                out.extend_from_slice(&[0x03, 0x01, kdf.hash.to_u8(), kdf.cipher.to_u8()]);
            }
            PublicKeyMaterial::Raw(bytes) => out.extend_from_slice(bytes),
        }
    }
}

/// Public key and public subkey packet body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyPacket {
    version: u8,
    created: u32,
    /// v3 only: validity period in days, 0 for no expiry
    validity_days: u16,
    algorithm: PublicKeyAlgorithm,
    material: PublicKeyMaterial,
}

impl PublicKeyPacket {
    /// A version 4 key
    ///
    /// # Errors
    /// [`VellumError::InvalidArgument`] when a curve OID is empty or longer
    /// than 254 bytes.
    pub fn new(created: u32, algorithm: PublicKeyAlgorithm, material: PublicKeyMaterial) -> VellumResult<Self> {
        material.validate()?;
        Ok(Self {
            version: 4,
            created,
            validity_days: 0,
            algorithm,
            material,
        })
    }

    pub fn parse(body: Bytes) -> VellumResult<Self> {
        let mut cursor = BodyCursor::new(body, "public key packet");
        let key = Self::read(&mut cursor)?;
        cursor.finish()?;
        Ok(key)
    }

    fn read(cursor: &mut BodyCursor) -> VellumResult<Self> {
        let version = cursor.u8()?;
        let (created, validity_days) = match version {
            2 | 3 => (cursor.u32()?, cursor.u16()?),
            4 => (cursor.u32()?, 0),
            other => {
                return Err(cursor.error(format_args!("unsupported key version {}", other)));
            }
        };
        let algorithm = PublicKeyAlgorithm::from_u8(cursor.u8()?);
        let material = PublicKeyMaterial::parse(algorithm, cursor)?;
        log::trace!("public key v{} {:?}", version, algorithm);
        Ok(Self {
            version,
            created,
            validity_days,
            algorithm,
            material,
        })
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.version);
        out.extend_from_slice(&self.created.to_be_bytes());
        if self.version < 4 {
            out.extend_from_slice(&self.validity_days.to_be_bytes());
        }
        out.push(self.algorithm.to_u8());
        self.material.write_to(out);
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut out = Vec::new();
        self.write_to(&mut out);
        Bytes::from(out)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Creation time in seconds since the Unix epoch
    pub fn created(&self) -> u32 {
        self.created
    }

    pub fn validity_days(&self) -> u16 {
        self.validity_days
    }

    pub fn algorithm(&self) -> PublicKeyAlgorithm {
        self.algorithm
    }

    pub fn material(&self) -> &PublicKeyMaterial {
        &self.material
    }

    /// SHA-1 over `0x99`, the two-octet body length and the body
    ///
    /// Only defined for version 4 keys whose body length fits two octets.
    pub fn fingerprint(&self) -> Option<[u8; 20]> {
        if self.version != 4 {
            return None;
        }
        let body = self.to_bytes();
        let length = u16::try_from(body.len()).ok()?;
        let mut hasher = Sha1::new();
        hasher.update([0x99]);
        hasher.update(length.to_be_bytes());
        hasher.update(&body);
        Some(hasher.finalize().into())
    }

    pub fn fingerprint_hex(&self) -> Option<String> {
        self.fingerprint().map(hex::encode_upper)
    }

    /// Low 64 bits of the v4 fingerprint, or of the RSA modulus for v3 keys
    pub fn key_id(&self) -> Option<u64> {
        if let Some(fingerprint) = self.fingerprint() {
            let mut id = [0u8; 8];
            id.copy_from_slice(&fingerprint[12..]);
            return Some(u64::from_be_bytes(id));
        }
        match &self.material {
            PublicKeyMaterial::Rsa { n, .. } if n.magnitude().len() >= 8 => {
                let modulus = n.magnitude();
                let mut id = [0u8; 8];
                id.copy_from_slice(&modulus[modulus.len() - 8..]);
                Some(u64::from_be_bytes(id))
            }
            _ => None,
        }
    }
}

/// String-to-key specifier (RFC 4880 §3.7)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum S2k {
    Simple {
        hash: HashAlgorithm,
    },
    Salted {
        hash: HashAlgorithm,
        salt: [u8; 8],
    },
    Iterated {
        hash: HashAlgorithm,
        salt: [u8; 8],
        /// Coded count octet
        count: u8,
    },
    /// GnuPG extension 101: no secret key material (mode 1) or a key held on
    /// a smartcard (mode 2)
    Gnu {
        hash: HashAlgorithm,
        mode: u8,
        serial: Option<Bytes>,
    },
}

impl S2k {
    pub(crate) fn read(cursor: &mut BodyCursor) -> VellumResult<Self> {
        let kind = cursor.u8()?;
        let hash = HashAlgorithm::from_u8(cursor.u8()?);
        let s2k = match kind {
            0 => S2k::Simple { hash },
            1 => S2k::Salted {
                hash,
                salt: cursor.array()?,
            },
            3 => S2k::Iterated {
                hash,
                salt: cursor.array()?,
                count: cursor.u8()?,
            },
            101 => {
                let marker: [u8; 3] = cursor.array()?;
                if &marker != b"GNU" {
                    return Err(cursor.error("S2K 101 without GNU marker"));
                }
                let mode = cursor.u8()?;
                let serial = if mode == 2 {
                    let len = cursor.u8()?;
                    Some(cursor.bytes(usize::from(len))?)
                } else {
                    None
                };
                S2k::Gnu { hash, mode, serial }
            }
            other => return Err(cursor.error(format_args!("unknown S2K specifier {}", other))),
        };
        Ok(s2k)
    }

    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            S2k::Simple { hash } => out.extend_from_slice(&[0, hash.to_u8()]),
            S2k::Salted { hash, salt } => {
                out.extend_from_slice(&[1, hash.to_u8()]);
                out.extend_from_slice(salt);
            }
            S2k::Iterated { hash, salt, count } => {
                out.extend_from_slice(&[3, hash.to_u8()]);
                out.extend_from_slice(salt);
                out.push(*count);
            }
            S2k::Gnu { hash, mode, serial } => {
                out.extend_from_slice(&[101, hash.to_u8()]);
                out.extend_from_slice(b"GNU");
                out.push(*mode);
                if let Some(serial) = serial {
                    out.push(serial.len() as u8);
                    out.extend_from_slice(serial);
                }
            }
        }
    }

    /// Decoded iteration count of an iterated S2K
    pub fn iterations(&self) -> Option<u32> {
        match self {
            S2k::Iterated { count, .. } => {
                let count = u32::from(*count);
                Some((16 + (count & 15)) << ((count >> 4) + 6))
            }
            _ => None,
        }
    }

    fn is_gnu(&self) -> bool {
        matches!(self, S2k::Gnu { .. })
    }

    /// A GNU serial number goes with mode 2 only and fits one length octet
    pub(crate) fn validate(&self) -> VellumResult<()> {
        if let S2k::Gnu { mode, serial, .. } = self {
            match serial {
                Some(_) if *mode != 2 => {
                    return Err(VellumError::invalid_argument(format!(
                        "GNU S2K mode {} carries no serial number",
                        mode
                    )));
                }
                None if *mode == 2 => {
                    return Err(VellumError::invalid_argument(
                        "GNU S2K mode 2 needs a card serial number",
                    ));
                }
                Some(serial) if serial.len() > 0xFF => {
                    return Err(VellumError::invalid_argument(format!(
                        "GNU S2K serial number of {} bytes does not fit its length octet",
                        serial.len()
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// How the secret key material is protected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretKeyProtection {
    /// Usage octet 0: cleartext MPIs and a two-octet checksum
    Unprotected,
    /// Usage octet 254 (SHA-1 check) or 255 (checksum) with an S2K specifier
    S2k {
        usage: u8,
        cipher: SymmetricAlgorithm,
        s2k: S2k,
        iv: Bytes,
    },
    /// Any other usage octet names the cipher directly, keyed by a simple
    /// MD5 S2K
    Legacy { cipher: SymmetricAlgorithm, iv: Bytes },
}

fn check_iv(cipher: SymmetricAlgorithm, iv: &Bytes, expected: Option<usize>) -> VellumResult<()> {
    match expected {
        Some(size) if size == iv.len() => Ok(()),
        Some(size) => Err(VellumError::invalid_argument(format!(
            "IV for {:?} must be {} bytes, got {}",
            cipher,
            size,
            iv.len()
        ))),
        None => Err(VellumError::invalid_argument(format!(
            "unknown cipher {:?} has no IV size",
            cipher
        ))),
    }
}

impl SecretKeyProtection {
    /// Checks that the protection encodes back to the same usage octet and
    /// IV length a parser would expect
    fn validate(&self) -> VellumResult<()> {
        match self {
            SecretKeyProtection::Unprotected => Ok(()),
            SecretKeyProtection::S2k {
                usage,
                cipher,
                s2k,
                iv,
            } => {
                if !matches!(usage, 254 | 255) {
                    return Err(VellumError::invalid_argument(format!(
                        "S2K usage octet must be 254 or 255, got {}",
                        usage
                    )));
                }
                s2k.validate()?;
                let expected = if s2k.is_gnu() { Some(0) } else { cipher.block_size() };
                check_iv(*cipher, iv, expected)
            }
            SecretKeyProtection::Legacy { cipher, iv } => {
                if matches!(cipher.to_u8(), 0 | 254 | 255) {
                    return Err(VellumError::invalid_argument(format!(
                        "{:?} cannot be named by a legacy usage octet",
                        cipher
                    )));
                }
                check_iv(*cipher, iv, cipher.block_size())
            }
        }
    }
}

/// Secret key and secret subkey packet body
///
/// The secret fields themselves stay opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretKeyPacket {
    public_key: PublicKeyPacket,
    protection: SecretKeyProtection,
    secret_data: Bytes,
}

fn read_iv(cursor: &mut BodyCursor, cipher: SymmetricAlgorithm) -> VellumResult<Bytes> {
    let size = cipher
        .block_size()
        .ok_or_else(|| cursor.error(format_args!("unknown cipher {:?}", cipher)))?;
    cursor.bytes(size)
}

impl SecretKeyPacket {
    /// # Errors
    /// [`VellumError::InvalidArgument`] when `protection` cannot be written
    /// back as parsed: a usage octet other than 254/255 for an S2K, a GNU
    /// serial number mismatch or overflow, or an IV not sized to the cipher.
    pub fn new(
        public_key: PublicKeyPacket,
        protection: SecretKeyProtection,
        secret_data: impl Into<Bytes>,
    ) -> VellumResult<Self> {
        protection.validate()?;
        Ok(Self {
            public_key,
            protection,
            secret_data: secret_data.into(),
        })
    }

    pub fn parse(body: Bytes) -> VellumResult<Self> {
        let mut cursor = BodyCursor::new(body, "secret key packet");
        let public_key = PublicKeyPacket::read(&mut cursor)?;
        let usage = cursor.u8()?;
        let protection = match usage {
            0 => SecretKeyProtection::Unprotected,
            254 | 255 => {
                let cipher = SymmetricAlgorithm::from_u8(cursor.u8()?);
                let s2k = S2k::read(&mut cursor)?;
                let iv = if s2k.is_gnu() {
                    Bytes::new()
                } else {
                    read_iv(&mut cursor, cipher)?
                };
                SecretKeyProtection::S2k {
                    usage,
                    cipher,
                    s2k,
                    iv,
                }
            }
            other => {
                let cipher = SymmetricAlgorithm::from_u8(other);
                let iv = read_iv(&mut cursor, cipher)?;
                SecretKeyProtection::Legacy { cipher, iv }
            }
        };
        let secret_data = cursor.rest();
        Ok(Self {
            public_key,
            protection,
            secret_data,
        })
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut out = Vec::new();
        self.public_key.write_to(&mut out);
        match &self.protection {
            SecretKeyProtection::Unprotected => out.push(0),
            SecretKeyProtection::S2k {
                usage,
                cipher,
                s2k,
                iv,
            } => {
                out.push(*usage);
                out.push(cipher.to_u8());
                s2k.write_to(&mut out);
                out.extend_from_slice(iv);
            }
            SecretKeyProtection::Legacy { cipher, iv } => {
                out.push(cipher.to_u8());
                out.extend_from_slice(iv);
            }
        }
        out.extend_from_slice(&self.secret_data);
        Bytes::from(out)
    }

    pub fn public_key(&self) -> &PublicKeyPacket {
        &self.public_key
    }

    pub fn protection(&self) -> &SecretKeyProtection {
        &self.protection
    }

    /// Secret fields as stored, encrypted unless unprotected
    pub fn secret_data(&self) -> &Bytes {
        &self.secret_data
    }

    /// GnuPG stub without any secret material
    pub fn is_stub(&self) -> bool {
        matches!(
            &self.protection,
            SecretKeyProtection::S2k { s2k: S2k::Gnu { mode: 1, .. }, .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const ED25519_OID: [u8; 9] = hex!("2b06010401da470f01");

    fn ed25519_body() -> Vec<u8> {
        let mut body = hex!("04 5c000000 16 09 2b06010401da470f01 0107 40").to_vec();
        body.extend_from_slice(&[0x11; 32]);
        body
    }

    #[test]
    fn test_eddsa_key_round_trip() {
        let body = ed25519_body();
        let key = PublicKeyPacket::parse(Bytes::from(body.clone())).unwrap();
        assert_eq!(key.version(), 4);
        assert_eq!(key.created(), 0x5C00_0000);
        assert_eq!(key.algorithm(), PublicKeyAlgorithm::EdDsa);
        match key.material() {
            PublicKeyMaterial::EdDsa { curve, point } => {
                assert_eq!(curve.as_ref(), &ED25519_OID);
                assert_eq!(point.bits(), 263);
            }
            other => panic!("unexpected material {:?}", other),
        }
        assert_eq!(key.to_bytes().as_ref(), &body[..]);
    }

    #[test]
    fn test_fingerprint_and_key_id() {
        let key = PublicKeyPacket::parse(Bytes::from(ed25519_body())).unwrap();
        assert_eq!(
            key.fingerprint_hex().unwrap(),
            "7DBCDC200257B1385B43B3B660D74B8CF299F4B0"
        );
        assert_eq!(key.key_id(), Some(0x60D7_4B8C_F299_F4B0));
    }

    #[test]
    fn test_v3_rsa_key_id() {
        let body = hex!("03 00000001 0000 01 0040 8102030405060708 0002 03");
        let key = PublicKeyPacket::parse(Bytes::from(body.to_vec())).unwrap();
        assert_eq!(key.version(), 3);
        assert!(key.fingerprint().is_none());
        assert_eq!(key.key_id(), Some(0x8102_0304_0506_0708));
        assert_eq!(key.to_bytes().as_ref(), &body[..]);
    }

    #[test]
    fn test_rejects_bad_key_bodies() {
        // modulus announces 16 bits but its top octet only has 1
        let bad_mpi = hex!("04 00000001 01 0010 0101 0002 03");
        let err = PublicKeyPacket::parse(Bytes::from(bad_mpi.to_vec())).unwrap_err();
        assert!(err.to_string().contains("public key packet"));

        let version = hex!("05 00000001 01");
        assert!(PublicKeyPacket::parse(Bytes::from(version.to_vec())).is_err());

        let mut trailing = ed25519_body();
        trailing.push(0x00);
        assert!(PublicKeyPacket::parse(Bytes::from(trailing)).is_err());
    }

    #[test]
    fn test_unknown_algorithm_kept_raw() {
        let body = hex!("04 00000001 63 aabbcc");
        let key = PublicKeyPacket::parse(Bytes::from(body.to_vec())).unwrap();
        assert_eq!(key.material(), &PublicKeyMaterial::Raw(Bytes::from_static(&[0xAA, 0xBB, 0xCC])));
        assert_eq!(key.to_bytes().as_ref(), &body[..]);
    }

    #[test]
    fn test_secret_key_iterated_s2k() {
        let mut body = ed25519_body();
        body.extend_from_slice(&hex!("fe 09 03 08 0102030405060708 60"));
        body.extend_from_slice(&[0x22; 16]);
        body.extend_from_slice(&hex!("deadbeef"));
        let key = SecretKeyPacket::parse(Bytes::from(body.clone())).unwrap();
        match key.protection() {
            SecretKeyProtection::S2k { usage, cipher, s2k, iv } => {
                assert_eq!(*usage, 254);
                assert_eq!(*cipher, SymmetricAlgorithm::Aes256);
                assert_eq!(s2k.iterations(), Some(65536));
                assert_eq!(iv.len(), 16);
            }
            other => panic!("unexpected protection {:?}", other),
        }
        assert_eq!(key.secret_data().as_ref(), &hex!("deadbeef"));
        assert!(!key.is_stub());
        assert_eq!(key.to_bytes().as_ref(), &body[..]);
    }

    #[test]
    fn test_gnu_stub() {
        let mut body = ed25519_body();
        body.extend_from_slice(&hex!("fe 00 65 02 474e55 01"));
        let key = SecretKeyPacket::parse(Bytes::from(body.clone())).unwrap();
        assert!(key.is_stub());
        assert!(key.secret_data().is_empty());
        assert_eq!(key.to_bytes().as_ref(), &body[..]);
    }

    #[test]
    fn test_new_rejects_oversized_curve() {
        let material = |len: usize| PublicKeyMaterial::EdDsa {
            curve: Bytes::from(vec![0x2B; len]),
            point: Mpi::new(vec![0x40]).unwrap(),
        };
        let err = PublicKeyPacket::new(1, PublicKeyAlgorithm::EdDsa, material(256)).unwrap_err();
        assert!(matches!(err, VellumError::InvalidArgument(_)));
        assert!(PublicKeyPacket::new(1, PublicKeyAlgorithm::EdDsa, material(255)).is_err());
        assert!(PublicKeyPacket::new(1, PublicKeyAlgorithm::EdDsa, material(0)).is_err());

        let key = PublicKeyPacket::new(1, PublicKeyAlgorithm::EdDsa, material(254)).unwrap();
        assert_eq!(PublicKeyPacket::parse(key.to_bytes()).unwrap(), key);
    }

    #[test]
    fn test_fingerprint_needs_two_octet_length() {
        let key = PublicKeyPacket::new(
            1,
            PublicKeyAlgorithm::Unknown(99),
            PublicKeyMaterial::Raw(Bytes::from(vec![0u8; 70_000])),
        )
        .unwrap();
        assert!(key.to_bytes().len() > usize::from(u16::MAX));
        assert_eq!(key.fingerprint(), None);
        assert_eq!(key.key_id(), None);
    }

    #[test]
    fn test_secret_key_new_validates_protection() {
        let public_key = PublicKeyPacket::parse(Bytes::from(ed25519_body())).unwrap();
        let gnu = |mode: u8, serial: Option<Bytes>| SecretKeyProtection::S2k {
            usage: 254,
            cipher: SymmetricAlgorithm::Plaintext,
            s2k: S2k::Gnu {
                hash: HashAlgorithm::Sha1,
                mode,
                serial,
            },
            iv: Bytes::new(),
        };

        let long_serial = gnu(2, Some(Bytes::from(vec![0x01; 256])));
        let err = SecretKeyPacket::new(public_key.clone(), long_serial, Bytes::new()).unwrap_err();
        assert!(matches!(err, VellumError::InvalidArgument(_)));
        assert!(SecretKeyPacket::new(public_key.clone(), gnu(2, None), Bytes::new()).is_err());
        assert!(SecretKeyPacket::new(public_key.clone(), gnu(1, Some(Bytes::new())), Bytes::new()).is_err());

        let card = SecretKeyPacket::new(public_key.clone(), gnu(2, Some(Bytes::from(vec![0x01; 255]))), Bytes::new())
            .unwrap();
        assert_eq!(SecretKeyPacket::parse(card.to_bytes()).unwrap(), card);

        let short_iv = SecretKeyProtection::Legacy {
            cipher: SymmetricAlgorithm::Aes128,
            iv: Bytes::from(vec![0u8; 8]),
        };
        assert!(SecretKeyPacket::new(public_key.clone(), short_iv, Bytes::new()).is_err());

        let bad_usage = SecretKeyProtection::S2k {
            usage: 7,
            cipher: SymmetricAlgorithm::Aes128,
            s2k: S2k::Simple { hash: HashAlgorithm::Sha1 },
            iv: Bytes::from(vec![0u8; 16]),
        };
        assert!(SecretKeyPacket::new(public_key, bad_usage, Bytes::new()).is_err());
    }

    #[test]
    fn test_unprotected_secret_key() {
        let mut body = ed25519_body();
        body.extend_from_slice(&hex!("00 0008 ff 00ff"));
        let key = SecretKeyPacket::parse(Bytes::from(body.clone())).unwrap();
        assert_eq!(key.protection(), &SecretKeyProtection::Unprotected);
        assert_eq!(key.public_key().algorithm(), PublicKeyAlgorithm::EdDsa);
        assert_eq!(key.to_bytes().as_ref(), &body[..]);
    }
}
