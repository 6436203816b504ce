//! Session key and one-pass signature packets (RFC 4880 §5.1, §5.3, §5.4)

use bytes::Bytes;

use crate::body::BodyCursor;
use crate::error::{VellumError, VellumResult};
use crate::mpi::Mpi;
use crate::packet::key::S2k;
use crate::types::{HashAlgorithm, PublicKeyAlgorithm, SymmetricAlgorithm};

/// Session key encrypted to a public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncryptedSessionKey {
    /// RSA (one MPI) or Elgamal (two MPIs)
    Mpis(Vec<Mpi>),
    /// Ephemeral point and the wrapped key (RFC 6637 §10)
    Ecdh { point: Mpi, wrapped: Bytes },
    Raw(Bytes),
}

/// Public-key encrypted session key packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyEncSessionPacket {
    version: u8,
    key_id: u64,
    algorithm: PublicKeyAlgorithm,
    session_key: EncryptedSessionKey,
}

impl PublicKeyEncSessionPacket {
    /// # Errors
    /// [`VellumError::InvalidArgument`] when an ECDH wrapped key is longer
    /// than 255 bytes.
    pub fn new(key_id: u64, algorithm: PublicKeyAlgorithm, session_key: EncryptedSessionKey) -> VellumResult<Self> {
        if let EncryptedSessionKey::Ecdh { wrapped, .. } = &session_key {
            if wrapped.len() > 0xFF {
                return Err(VellumError::invalid_argument(format!(
                    "wrapped session key of {} bytes is longer than 255",
                    wrapped.len()
                )));
            }
        }
        Ok(Self {
            version: 3,
            key_id,
            algorithm,
            session_key,
        })
    }

    pub fn parse(body: Bytes) -> VellumResult<Self> {
        let mut cursor = BodyCursor::new(body, "public-key encrypted session key packet");
        let version = cursor.u8()?;
        if version != 3 {
            return Err(cursor.error(format_args!("unsupported version {}", version)));
        }
        let key_id = u64::from_be_bytes(cursor.array()?);
        let algorithm = PublicKeyAlgorithm::from_u8(cursor.u8()?);
        let session_key = match algorithm {
            PublicKeyAlgorithm::RsaEncryptSign | PublicKeyAlgorithm::RsaEncrypt => {
                EncryptedSessionKey::Mpis(vec![cursor.mpi()?])
            }
            PublicKeyAlgorithm::Elgamal | PublicKeyAlgorithm::ElgamalEncryptSign => {
                EncryptedSessionKey::Mpis(vec![cursor.mpi()?, cursor.mpi()?])
            }
            PublicKeyAlgorithm::Ecdh => {
                let point = cursor.mpi()?;
                let len = cursor.u8()?;
                let wrapped = cursor.bytes(usize::from(len))?;
                EncryptedSessionKey::Ecdh { point, wrapped }
            }
            _ => EncryptedSessionKey::Raw(cursor.rest()),
        };
        cursor.finish()?;
        Ok(Self {
            version,
            key_id,
            algorithm,
            session_key,
        })
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut out = vec![self.version];
        out.extend_from_slice(&self.key_id.to_be_bytes());
        out.push(self.algorithm.to_u8());
        match &self.session_key {
            EncryptedSessionKey::Mpis(mpis) => mpis.iter().for_each(|mpi| mpi.write_to(&mut out)),
            EncryptedSessionKey::Ecdh { point, wrapped } => {
                point.write_to(&mut out);
                out.push(wrapped.len() as u8);
                out.extend_from_slice(wrapped);
            }
            EncryptedSessionKey::Raw(bytes) => out.extend_from_slice(bytes),
        }
        Bytes::from(out)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Recipient key id, zero for a speculative ("wildcard") recipient
    pub fn key_id(&self) -> u64 {
        self.key_id
    }

    pub fn algorithm(&self) -> PublicKeyAlgorithm {
        self.algorithm
    }

    pub fn session_key(&self) -> &EncryptedSessionKey {
        &self.session_key
    }
}

/// Symmetric-key encrypted session key packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymKeyEncSessionPacket {
    version: u8,
    cipher: SymmetricAlgorithm,
    s2k: S2k,
    /// Absent when the S2K output is the session key itself
    encrypted_key: Option<Bytes>,
}

impl SymKeyEncSessionPacket {
    /// # Errors
    /// [`VellumError::InvalidArgument`] for an S2K that cannot be written back
    /// as given, or an encrypted key that is present but empty.
    pub fn new(cipher: SymmetricAlgorithm, s2k: S2k, encrypted_key: Option<Bytes>) -> VellumResult<Self> {
        s2k.validate()?;
        if encrypted_key.as_ref().is_some_and(Bytes::is_empty) {
            return Err(VellumError::invalid_argument("encrypted session key is empty"));
        }
        Ok(Self {
            version: 4,
            cipher,
            s2k,
            encrypted_key,
        })
    }

    pub fn parse(body: Bytes) -> VellumResult<Self> {
        let mut cursor = BodyCursor::new(body, "symmetric-key encrypted session key packet");
        let version = cursor.u8()?;
        if version != 4 {
            return Err(cursor.error(format_args!("unsupported version {}", version)));
        }
        let cipher = SymmetricAlgorithm::from_u8(cursor.u8()?);
        let s2k = S2k::read(&mut cursor)?;
        let encrypted_key = Some(cursor.rest()).filter(|key| !key.is_empty());
        Ok(Self {
            version,
            cipher,
            s2k,
            encrypted_key,
        })
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut out = vec![self.version, self.cipher.to_u8()];
        self.s2k.write_to(&mut out);
        if let Some(key) = &self.encrypted_key {
            out.extend_from_slice(key);
        }
        Bytes::from(out)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn cipher(&self) -> SymmetricAlgorithm {
        self.cipher
    }

    pub fn s2k(&self) -> &S2k {
        &self.s2k
    }

    pub fn encrypted_key(&self) -> Option<&Bytes> {
        self.encrypted_key.as_ref()
    }
}

/// One-pass signature packet, announcing a signature that follows the data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnePassSignaturePacket {
    version: u8,
    signature_type: u8,
    hash_algorithm: HashAlgorithm,
    key_algorithm: PublicKeyAlgorithm,
    key_id: u64,
    /// Zero when another one-pass signature over the same data follows
    nested: u8,
}

impl OnePassSignaturePacket {
    pub fn new(
        signature_type: u8,
        hash_algorithm: HashAlgorithm,
        key_algorithm: PublicKeyAlgorithm,
        key_id: u64,
        last: bool,
    ) -> Self {
        Self {
            version: 3,
            signature_type,
            hash_algorithm,
            key_algorithm,
            key_id,
            nested: u8::from(last),
        }
    }

    pub fn parse(body: Bytes) -> VellumResult<Self> {
        let mut cursor = BodyCursor::new(body, "one-pass signature packet");
        let version = cursor.u8()?;
        if version != 3 {
            return Err(cursor.error(format_args!("unsupported version {}", version)));
        }
        let packet = Self {
            version,
            signature_type: cursor.u8()?,
            hash_algorithm: HashAlgorithm::from_u8(cursor.u8()?),
            key_algorithm: PublicKeyAlgorithm::from_u8(cursor.u8()?),
            key_id: u64::from_be_bytes(cursor.array()?),
            nested: cursor.u8()?,
        };
        cursor.finish()?;
        Ok(packet)
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut out = vec![
            self.version,
            self.signature_type,
            self.hash_algorithm.to_u8(),
            self.key_algorithm.to_u8(),
        ];
        out.extend_from_slice(&self.key_id.to_be_bytes());
        out.push(self.nested);
        Bytes::from(out)
    }

    pub fn signature_type(&self) -> u8 {
        self.signature_type
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    pub fn key_algorithm(&self) -> PublicKeyAlgorithm {
        self.key_algorithm
    }

    pub fn key_id(&self) -> u64 {
        self.key_id
    }

    /// Whether this is the last one-pass signature before the signed data
    pub fn is_last(&self) -> bool {
        self.nested != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_pkesk_rsa() {
        let body = hex!("03 0102030405060708 01 0008 ff");
        let packet = PublicKeyEncSessionPacket::parse(Bytes::from(body.to_vec())).unwrap();
        assert_eq!(packet.key_id(), 0x0102_0304_0506_0708);
        assert_eq!(packet.algorithm(), PublicKeyAlgorithm::RsaEncryptSign);
        match packet.session_key() {
            EncryptedSessionKey::Mpis(mpis) => assert_eq!(mpis.len(), 1),
            other => panic!("unexpected session key {:?}", other),
        }
        assert_eq!(packet.to_bytes().as_ref(), &body[..]);
    }

    #[test]
    fn test_pkesk_ecdh() {
        let body = hex!("03 0000000000000000 12 0008 ff 03 aabbcc");
        let packet = PublicKeyEncSessionPacket::parse(Bytes::from(body.to_vec())).unwrap();
        assert_eq!(packet.key_id(), 0);
        match packet.session_key() {
            EncryptedSessionKey::Ecdh { wrapped, .. } => assert_eq!(wrapped.as_ref(), &hex!("aabbcc")),
            other => panic!("unexpected session key {:?}", other),
        }
        assert_eq!(packet.to_bytes().as_ref(), &body[..]);

        let trailing = hex!("03 0102030405060708 01 0008 ff 00");
        assert!(PublicKeyEncSessionPacket::parse(Bytes::from(trailing.to_vec())).is_err());
        let version = hex!("02 0102030405060708 01 0008 ff");
        assert!(PublicKeyEncSessionPacket::parse(Bytes::from(version.to_vec())).is_err());
    }

    #[test]
    fn test_skesk() {
        let bare = hex!("04 09 03 08 0102030405060708 60");
        let packet = SymKeyEncSessionPacket::parse(Bytes::from(bare.to_vec())).unwrap();
        assert_eq!(packet.cipher(), SymmetricAlgorithm::Aes256);
        assert!(packet.encrypted_key().is_none());
        assert_eq!(packet.to_bytes().as_ref(), &bare[..]);

        let with_key = hex!("04 07 01 02 0102030405060708 deadbeef");
        let packet = SymKeyEncSessionPacket::parse(Bytes::from(with_key.to_vec())).unwrap();
        assert!(matches!(packet.s2k(), S2k::Salted { .. }));
        assert_eq!(packet.encrypted_key().map(|k| k.len()), Some(4));
        assert_eq!(packet.to_bytes().as_ref(), &with_key[..]);
    }

    #[test]
    fn test_pkesk_new_rejects_long_wrapped_key() {
        let ecdh = |len: usize| EncryptedSessionKey::Ecdh {
            point: Mpi::new(vec![0x04]).unwrap(),
            wrapped: Bytes::from(vec![0xAB; len]),
        };
        let err = PublicKeyEncSessionPacket::new(0, PublicKeyAlgorithm::Ecdh, ecdh(256)).unwrap_err();
        assert!(matches!(err, VellumError::InvalidArgument(_)));

        let packet = PublicKeyEncSessionPacket::new(0, PublicKeyAlgorithm::Ecdh, ecdh(255)).unwrap();
        assert_eq!(PublicKeyEncSessionPacket::parse(packet.to_bytes()).unwrap(), packet);
    }

    #[test]
    fn test_skesk_new_validates() {
        let card = |len: usize| S2k::Gnu {
            hash: HashAlgorithm::Sha1,
            mode: 2,
            serial: Some(Bytes::from(vec![0x01; len])),
        };
        let err = SymKeyEncSessionPacket::new(SymmetricAlgorithm::Aes128, card(256), None).unwrap_err();
        assert!(matches!(err, VellumError::InvalidArgument(_)));
        assert!(SymKeyEncSessionPacket::new(SymmetricAlgorithm::Aes128, card(4), Some(Bytes::new())).is_err());

        let packet = SymKeyEncSessionPacket::new(SymmetricAlgorithm::Aes128, card(255), None).unwrap();
        assert_eq!(SymKeyEncSessionPacket::parse(packet.to_bytes()).unwrap(), packet);
    }

    #[test]
    fn test_one_pass_signature() {
        let packet = OnePassSignaturePacket::new(
            0x00,
            HashAlgorithm::Sha256,
            PublicKeyAlgorithm::EdDsa,
            0x0102_0304_0506_0708,
            true,
        );
        let bytes = packet.to_bytes();
        assert_eq!(bytes.as_ref(), &hex!("03 00 08 16 0102030405060708 01"));
        let parsed = OnePassSignaturePacket::parse(bytes).unwrap();
        assert_eq!(parsed, packet);
        assert!(parsed.is_last());

        let short = hex!("03 00 08 16 01020304");
        assert!(OnePassSignaturePacket::parse(Bytes::from(short.to_vec())).is_err());
    }
}
