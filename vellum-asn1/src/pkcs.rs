//! PKCS structures: content info (PKCS#7), private keys (PKCS#8), RSASSA-PSS
//! parameters (PKCS#1) and password-based key derivation (PKCS#5)

use bytes::Bytes;

use crate::ber::types::universal;
use crate::constructed::Set;
use crate::error::{VellumError, VellumResult};
use crate::object::Asn1Object;
use crate::oids;
use crate::pkix::AlgorithmIdentifier;
use crate::primitive::{BitString, Integer, ObjectIdentifier};
use crate::schema::{
    Asn1Encodable, Defaulted, FieldVector, FromAsn1, SequenceReader, invalid_choice,
};

/// ```text
/// ContentInfo ::= SEQUENCE {
///     contentType  ContentType,
///     content      [0] EXPLICIT ANY DEFINED BY contentType OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentInfo {
    content_type: ObjectIdentifier,
    content: Option<Asn1Object>,
}

impl ContentInfo {
    pub fn new(content_type: ObjectIdentifier, content: Option<Asn1Object>) -> Self {
        Self {
            content_type,
            content,
        }
    }

    /// `id-data` wrapping `data` in an OCTET STRING
    pub fn data(data: impl Into<Bytes>) -> Self {
        Self::new(oids::DATA, Some(Asn1Object::OctetString(data.into())))
    }

    pub fn content_type(&self) -> &ObjectIdentifier {
        &self.content_type
    }

    pub fn content(&self) -> Option<&Asn1Object> {
        self.content.as_ref()
    }
}

impl FromAsn1 for ContentInfo {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "ContentInfo")?;
        let info = Self {
            content_type: reader.next()?,
            content: reader.next_explicit(0)?,
        };
        reader.finish()?;
        Ok(info)
    }
}

impl Asn1Encodable for ContentInfo {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.content_type)
            .push_explicit_optional(0, self.content.as_ref());
        fields.into_sequence()
    }
}

/// ```text
/// OneAsymmetricKey ::= SEQUENCE {
///     version                   Version,
///     privateKeyAlgorithm       AlgorithmIdentifier,
///     privateKey                OCTET STRING,
///     attributes            [0] Attributes OPTIONAL,
///     ...,
///     [[2: publicKey        [1] BIT STRING OPTIONAL ]] }
/// ```
///
/// Version is v1 (0) unless a public key is attached, which makes it v2 (1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKeyInfo {
    version: Integer,
    algorithm: AlgorithmIdentifier,
    private_key: Bytes,
    attributes: Option<Set>,
    public_key: Option<BitString>,
}

impl PrivateKeyInfo {
    pub fn new(algorithm: AlgorithmIdentifier, private_key: impl Into<Bytes>) -> Self {
        Self {
            version: Integer::ZERO,
            algorithm,
            private_key: private_key.into(),
            attributes: None,
            public_key: None,
        }
    }

    pub fn with_attributes(mut self, attributes: Set) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_public_key(mut self, public_key: BitString) -> Self {
        self.version = Integer::ONE;
        self.public_key = Some(public_key);
        self
    }

    pub fn version(&self) -> &Integer {
        &self.version
    }

    pub fn algorithm(&self) -> &AlgorithmIdentifier {
        &self.algorithm
    }

    pub fn private_key(&self) -> &Bytes {
        &self.private_key
    }

    pub fn attributes(&self) -> Option<&Set> {
        self.attributes.as_ref()
    }

    pub fn public_key(&self) -> Option<&BitString> {
        self.public_key.as_ref()
    }
}

impl FromAsn1 for PrivateKeyInfo {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "PrivateKeyInfo")?;
        let version: Integer = reader.next()?;
        if version != Integer::ZERO && version != Integer::ONE {
            return Err(VellumError::structural(format!(
                "PrivateKeyInfo: unsupported version {}",
                version
            )));
        }
        let info = Self {
            version,
            algorithm: reader.next()?,
            private_key: reader.next()?,
            attributes: reader.next_implicit(0, universal::SET)?,
            public_key: reader.next_implicit(1, universal::BIT_STRING)?,
        };
        reader.finish()?;
        if info.public_key.is_some() && info.version == Integer::ZERO {
            return Err(VellumError::structural(
                "PrivateKeyInfo: publicKey requires version 1",
            ));
        }
        Ok(info)
    }
}

impl Asn1Encodable for PrivateKeyInfo {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.version)
            .push(&self.algorithm)
            .push(&self.private_key)
            .push_implicit_optional(0, self.attributes.as_ref())
            .push_implicit_optional(1, self.public_key.as_ref());
        fields.into_sequence()
    }
}

/// ```text
/// EncryptedPrivateKeyInfo ::= SEQUENCE {
///     encryptionAlgorithm  AlgorithmIdentifier,
///     encryptedData        OCTET STRING }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPrivateKeyInfo {
    encryption_algorithm: AlgorithmIdentifier,
    encrypted_data: Bytes,
}

impl EncryptedPrivateKeyInfo {
    pub fn new(encryption_algorithm: AlgorithmIdentifier, encrypted_data: impl Into<Bytes>) -> Self {
        Self {
            encryption_algorithm,
            encrypted_data: encrypted_data.into(),
        }
    }

    pub fn encryption_algorithm(&self) -> &AlgorithmIdentifier {
        &self.encryption_algorithm
    }

    pub fn encrypted_data(&self) -> &Bytes {
        &self.encrypted_data
    }
}

impl FromAsn1 for EncryptedPrivateKeyInfo {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "EncryptedPrivateKeyInfo")?;
        let info = Self {
            encryption_algorithm: reader.next()?,
            encrypted_data: reader.next()?,
        };
        reader.finish()?;
        Ok(info)
    }
}

impl Asn1Encodable for EncryptedPrivateKeyInfo {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.encryption_algorithm)
            .push(&self.encrypted_data);
        fields.into_sequence()
    }
}

/// A mask generation function identifier whose parameter is the digest
/// algorithm, as used by MGF1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskGenAlgorithm {
    algorithm: ObjectIdentifier,
    hash: AlgorithmIdentifier,
}

impl MaskGenAlgorithm {
    pub const fn new(algorithm: ObjectIdentifier, hash: AlgorithmIdentifier) -> Self {
        Self { algorithm, hash }
    }

    pub const fn mgf1(hash: AlgorithmIdentifier) -> Self {
        Self::new(oids::MGF1, hash)
    }

    pub fn algorithm(&self) -> &ObjectIdentifier {
        &self.algorithm
    }

    pub fn hash(&self) -> &AlgorithmIdentifier {
        &self.hash
    }
}

impl FromAsn1 for MaskGenAlgorithm {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "MaskGenAlgorithm")?;
        let mgf = Self {
            algorithm: reader.next()?,
            hash: reader.next()?,
        };
        reader.finish()?;
        Ok(mgf)
    }
}

impl Asn1Encodable for MaskGenAlgorithm {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields.push(&self.algorithm).push(&self.hash);
        fields.into_sequence()
    }
}

pub const DEFAULT_PSS_HASH: AlgorithmIdentifier =
    AlgorithmIdentifier::with_parameters(oids::SHA1, Asn1Object::Null);
pub const DEFAULT_PSS_MASK_GEN: MaskGenAlgorithm = MaskGenAlgorithm::mgf1(DEFAULT_PSS_HASH);
pub const DEFAULT_PSS_SALT_LENGTH: Integer = Integer::from_static(&[20]);
pub const DEFAULT_PSS_TRAILER_FIELD: Integer = Integer::ONE;

/// ```text
/// RSASSA-PSS-params ::= SEQUENCE {
///     hashAlgorithm     [0] HashAlgorithm     DEFAULT sha1,
///     maskGenAlgorithm  [1] MaskGenAlgorithm  DEFAULT mgf1SHA1,
///     saltLength        [2] INTEGER           DEFAULT 20,
///     trailerField      [3] TrailerField      DEFAULT trailerFieldBC }
/// ```
///
/// `Default` gives the all-defaults value, which encodes as an empty SEQUENCE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsassPssParameters {
    hash_algorithm: Defaulted<AlgorithmIdentifier>,
    mask_gen_algorithm: Defaulted<MaskGenAlgorithm>,
    salt_length: Defaulted<Integer>,
    trailer_field: Defaulted<Integer>,
}

impl Default for RsassPssParameters {
    fn default() -> Self {
        Self {
            hash_algorithm: Defaulted::implied(DEFAULT_PSS_HASH),
            mask_gen_algorithm: Defaulted::implied(DEFAULT_PSS_MASK_GEN),
            salt_length: Defaulted::implied(DEFAULT_PSS_SALT_LENGTH),
            trailer_field: Defaulted::implied(DEFAULT_PSS_TRAILER_FIELD),
        }
    }
}

impl RsassPssParameters {
    /// Parameters for `hash` with MGF1 over the same digest
    pub fn new(hash: AlgorithmIdentifier, salt_length: Integer) -> Self {
        Self {
            hash_algorithm: Defaulted::implied(hash.clone()),
            mask_gen_algorithm: Defaulted::implied(MaskGenAlgorithm::mgf1(hash)),
            salt_length: Defaulted::implied(salt_length),
            trailer_field: Defaulted::implied(DEFAULT_PSS_TRAILER_FIELD),
        }
    }

    pub fn hash_algorithm(&self) -> &AlgorithmIdentifier {
        self.hash_algorithm.value()
    }

    pub fn mask_gen_algorithm(&self) -> &MaskGenAlgorithm {
        self.mask_gen_algorithm.value()
    }

    pub fn salt_length(&self) -> &Integer {
        self.salt_length.value()
    }

    pub fn trailer_field(&self) -> &Integer {
        self.trailer_field.value()
    }
}

impl FromAsn1 for RsassPssParameters {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "RSASSA-PSS-params")?;
        let hash = reader.next_explicit(0)?;
        let mask_gen = reader.next_explicit(1)?;
        let salt = reader.next_explicit(2)?;
        let trailer = reader.next_explicit(3)?;
        reader.finish()?;
        Ok(Self {
            hash_algorithm: Defaulted::from_field(hash, &DEFAULT_PSS_HASH),
            mask_gen_algorithm: Defaulted::from_field(mask_gen, &DEFAULT_PSS_MASK_GEN),
            salt_length: Defaulted::from_field(salt, &DEFAULT_PSS_SALT_LENGTH),
            trailer_field: Defaulted::from_field(trailer, &DEFAULT_PSS_TRAILER_FIELD),
        })
    }
}

impl Asn1Encodable for RsassPssParameters {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push_explicit_defaulted(0, &self.hash_algorithm, &DEFAULT_PSS_HASH)
            .push_explicit_defaulted(1, &self.mask_gen_algorithm, &DEFAULT_PSS_MASK_GEN)
            .push_explicit_defaulted(2, &self.salt_length, &DEFAULT_PSS_SALT_LENGTH)
            .push_explicit_defaulted(3, &self.trailer_field, &DEFAULT_PSS_TRAILER_FIELD);
        fields.into_sequence()
    }
}

/// `salt CHOICE { specified OCTET STRING, otherSource AlgorithmIdentifier }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pbkdf2Salt {
    Specified(Bytes),
    OtherSource(AlgorithmIdentifier),
}

impl FromAsn1 for Pbkdf2Salt {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        match object {
            Asn1Object::OctetString(bytes) => Ok(Pbkdf2Salt::Specified(bytes.clone())),
            Asn1Object::Sequence(_) => Ok(Pbkdf2Salt::OtherSource(AlgorithmIdentifier::from_asn1(
                object,
            )?)),
            other => Err(invalid_choice("PBKDF2-params salt", other)),
        }
    }
}

impl Asn1Encodable for Pbkdf2Salt {
    fn to_asn1_object(&self) -> Asn1Object {
        match self {
            Pbkdf2Salt::Specified(bytes) => Asn1Object::OctetString(bytes.clone()),
            Pbkdf2Salt::OtherSource(alg) => alg.to_asn1_object(),
        }
    }
}

pub const DEFAULT_PBKDF2_PRF: AlgorithmIdentifier =
    AlgorithmIdentifier::with_parameters(oids::HMAC_WITH_SHA1, Asn1Object::Null);

/// ```text
/// PBKDF2-params ::= SEQUENCE {
///     salt            CHOICE { ... },
///     iterationCount  INTEGER (1..MAX),
///     keyLength       INTEGER (1..MAX) OPTIONAL,
///     prf             AlgorithmIdentifier DEFAULT algid-hmacWithSHA1 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbkdf2Params {
    salt: Pbkdf2Salt,
    iteration_count: Integer,
    key_length: Option<Integer>,
    prf: Defaulted<AlgorithmIdentifier>,
}

impl Pbkdf2Params {
    /// # Errors
    /// [`VellumError::InvalidArgument`] when `iteration_count` is zero.
    pub fn new(salt: impl Into<Bytes>, iteration_count: u64) -> VellumResult<Self> {
        if iteration_count == 0 {
            return Err(VellumError::invalid_argument("iteration count must be positive"));
        }
        Ok(Self {
            salt: Pbkdf2Salt::Specified(salt.into()),
            iteration_count: Integer::from_u64(iteration_count),
            key_length: None,
            prf: Defaulted::implied(DEFAULT_PBKDF2_PRF),
        })
    }

    pub fn with_key_length(mut self, key_length: u64) -> Self {
        self.key_length = Some(Integer::from_u64(key_length));
        self
    }

    pub fn with_prf(mut self, prf: AlgorithmIdentifier) -> Self {
        self.prf = Defaulted::implied(prf);
        self
    }

    pub fn salt(&self) -> &Pbkdf2Salt {
        &self.salt
    }

    pub fn iteration_count(&self) -> &Integer {
        &self.iteration_count
    }

    pub fn key_length(&self) -> Option<&Integer> {
        self.key_length.as_ref()
    }

    pub fn prf(&self) -> &AlgorithmIdentifier {
        self.prf.value()
    }
}

impl FromAsn1 for Pbkdf2Params {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "PBKDF2-params")?;
        let salt = reader.next()?;
        let iteration_count: Integer = reader.next()?;
        if iteration_count.is_negative() || iteration_count.is_zero() {
            return Err(VellumError::structural(
                "PBKDF2-params: iteration count must be positive",
            ));
        }
        let key_length = reader.next_optional(universal::INTEGER)?;
        let prf = reader.next_optional(universal::SEQUENCE)?;
        reader.finish()?;
        Ok(Self {
            salt,
            iteration_count,
            key_length,
            prf: Defaulted::from_field(prf, &DEFAULT_PBKDF2_PRF),
        })
    }
}

impl Asn1Encodable for Pbkdf2Params {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.salt)
            .push(&self.iteration_count)
            .push_optional(self.key_length.as_ref())
            .push_defaulted(&self.prf, &DEFAULT_PBKDF2_PRF);
        fields.into_sequence()
    }
}

/// ```text
/// PBES2-params ::= SEQUENCE {
///     keyDerivationFunc  AlgorithmIdentifier,
///     encryptionScheme   AlgorithmIdentifier }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbes2Params {
    key_derivation_func: AlgorithmIdentifier,
    encryption_scheme: AlgorithmIdentifier,
}

impl Pbes2Params {
    pub fn new(key_derivation_func: AlgorithmIdentifier, encryption_scheme: AlgorithmIdentifier) -> Self {
        Self {
            key_derivation_func,
            encryption_scheme,
        }
    }

    pub fn key_derivation_func(&self) -> &AlgorithmIdentifier {
        &self.key_derivation_func
    }

    pub fn encryption_scheme(&self) -> &AlgorithmIdentifier {
        &self.encryption_scheme
    }

    /// The PBKDF2 parameters, if that is the key derivation function
    pub fn pbkdf2_params(&self) -> VellumResult<Option<Pbkdf2Params>> {
        if self.key_derivation_func.algorithm() != &oids::PBKDF2 {
            return Ok(None);
        }
        let parameters = self
            .key_derivation_func
            .parameters()
            .ok_or_else(|| VellumError::structural("PBKDF2 without parameters"))?;
        Pbkdf2Params::from_asn1(parameters).map(Some)
    }
}

impl FromAsn1 for Pbes2Params {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "PBES2-params")?;
        let params = Self {
            key_derivation_func: reader.next()?,
            encryption_scheme: reader.next()?,
        };
        reader.finish()?;
        Ok(params)
    }
}

impl Asn1Encodable for Pbes2Params {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.key_derivation_func)
            .push(&self.encryption_scheme);
        fields.into_sequence()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_pss_defaults_encode_empty() {
        let params = RsassPssParameters::default();
        assert_eq!(params.to_der().as_ref(), &hex!("3000"));

        let decoded = RsassPssParameters::from_der(&hex!("3000")).unwrap();
        assert_eq!(decoded.hash_algorithm().algorithm(), &oids::SHA1);
        assert_eq!(decoded.mask_gen_algorithm().algorithm(), &oids::MGF1);
        assert_eq!(decoded.salt_length().to_i64(), Some(20));
        assert_eq!(decoded.trailer_field().to_i64(), Some(1));
    }

    #[test]
    fn test_pss_sha256() {
        let sha256 = AlgorithmIdentifier::with_parameters(oids::SHA256, Asn1Object::Null);
        let params = RsassPssParameters::new(sha256.clone(), Integer::from_i64(32));
        let der = params.to_der();
        let decoded = RsassPssParameters::from_der(&der).unwrap();
        assert_eq!(decoded.hash_algorithm(), &sha256);
        assert_eq!(decoded.mask_gen_algorithm().hash(), &sha256);
        assert_eq!(decoded.salt_length().to_i64(), Some(32));
        // trailerField stays implied
        assert_eq!(decoded.to_der(), der);
        assert!(!der.windows(2).any(|w| w == [0xA3, 0x03]));
    }

    #[test]
    fn test_pss_explicit_default_preserved() {
        // saltLength 20 written out although it is the default
        let wire = hex!("3005 a203020114");
        let decoded = RsassPssParameters::from_der(&wire).unwrap();
        assert_eq!(decoded.salt_length(), &DEFAULT_PSS_SALT_LENGTH);
        assert_eq!(decoded.to_der().as_ref(), &wire);
    }

    #[test]
    fn test_pbkdf2_params() {
        let params = Pbkdf2Params::new(hex!("0102030405060708").to_vec(), 2048)
            .unwrap()
            .with_key_length(32);
        let der = params.to_der();
        assert_eq!(der.as_ref(), &hex!("3011 04080102030405060708 02020800 020120"));
        assert_eq!(Pbkdf2Params::from_der(&der).unwrap(), params);

        let sha256 = params.clone().with_prf(AlgorithmIdentifier::with_parameters(
            oids::HMAC_WITH_SHA256,
            Asn1Object::Null,
        ));
        let decoded = Pbkdf2Params::from_der(&sha256.to_der()).unwrap();
        assert_eq!(decoded.prf().algorithm(), &oids::HMAC_WITH_SHA256);

        assert!(Pbkdf2Params::new(Bytes::new(), 0).is_err());
        assert!(Pbkdf2Params::from_der(&hex!("3005 0400 020100")).is_err());
    }

    #[test]
    fn test_pbes2_wraps_pbkdf2() {
        let kdf = Pbkdf2Params::new(hex!("aabb").to_vec(), 1000).unwrap();
        let pbes2 = Pbes2Params::new(
            AlgorithmIdentifier::with_parameters(oids::PBKDF2, kdf.to_asn1_object()),
            AlgorithmIdentifier::new(oids::SHA256),
        );
        let decoded = Pbes2Params::from_der(&pbes2.to_der()).unwrap();
        assert_eq!(decoded.pbkdf2_params().unwrap(), Some(kdf));
    }

    #[test]
    fn test_private_key_info() {
        let alg = AlgorithmIdentifier::new(oids::ED25519);
        let key = PrivateKeyInfo::new(alg.clone(), hex!("0420 00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff").to_vec());
        let der = key.to_der();
        assert_eq!(&der[..5], &hex!("302e 020100"));
        assert_eq!(PrivateKeyInfo::from_der(&der).unwrap(), key);

        let with_public = key.with_public_key(BitString::from_bytes(vec![0x42; 32]));
        let decoded = PrivateKeyInfo::from_der(&with_public.to_der()).unwrap();
        assert_eq!(decoded.version(), &Integer::ONE);
        assert_eq!(decoded.public_key().map(BitString::bit_len), Some(256));

        // version 0 with a public key
        assert!(PrivateKeyInfo::from_der(&hex!("300f 020100 3005 06032b6570 0400 810100")).is_err());
    }

    #[test]
    fn test_content_info() {
        let info = ContentInfo::data(Bytes::from_static(b"hello"));
        let der = info.to_der();
        assert_eq!(
            der.as_ref(),
            &hex!("3014 06092a864886f70d010701 a007 040568656c6c6f")
        );
        let decoded = ContentInfo::from_der(&der).unwrap();
        assert_eq!(decoded.content_type(), &oids::DATA);
        assert_eq!(
            decoded.content().and_then(|c| c.as_octet_string().ok()).map(|b| &b[..]),
            Some(&b"hello"[..])
        );

        let bare = ContentInfo::new(oids::SIGNED_DATA, None);
        assert_eq!(ContentInfo::from_der(&bare.to_der()).unwrap(), bare);
    }

    #[test]
    fn test_encrypted_private_key_info() {
        let info = EncryptedPrivateKeyInfo::new(
            AlgorithmIdentifier::new(oids::PBES2),
            Bytes::from_static(&[0xEE; 48]),
        );
        assert_eq!(EncryptedPrivateKeyInfo::from_der(&info.to_der()).unwrap(), info);
    }
}
