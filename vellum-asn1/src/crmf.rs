//! Certificate Request Message Format (RFC 4211)

use crate::ber::types::{BerTagClass, universal};
use crate::constructed::{Sequence, TaggedObject};
use crate::error::{VellumError, VellumResult};
use crate::object::Asn1Object;
use crate::pkix::{AlgorithmIdentifier, Extensions, Name, SubjectPublicKeyInfo, Time};
use crate::primitive::{BitString, Integer, ObjectIdentifier};
use crate::schema::{
    Asn1Encodable, FieldVector, FromAsn1, SequenceReader, invalid_choice, unknown_tag,
};
use bytes::Bytes;

/// ```text
/// OptionalValidity ::= SEQUENCE {
///     notBefore  [0] Time OPTIONAL,
///     notAfter   [1] Time OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionalValidity {
    not_before: Option<Time>,
    not_after: Option<Time>,
}

impl OptionalValidity {
    pub fn new(not_before: Option<Time>, not_after: Option<Time>) -> Self {
        Self {
            not_before,
            not_after,
        }
    }

    pub fn not_before(&self) -> Option<&Time> {
        self.not_before.as_ref()
    }

    pub fn not_after(&self) -> Option<&Time> {
        self.not_after.as_ref()
    }
}

impl FromAsn1 for OptionalValidity {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "OptionalValidity")?;
        let validity = Self {
            not_before: reader.next_explicit(0)?,
            not_after: reader.next_explicit(1)?,
        };
        reader.finish()?;
        Ok(validity)
    }
}

impl Asn1Encodable for OptionalValidity {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push_explicit_optional(0, self.not_before.as_ref())
            .push_explicit_optional(1, self.not_after.as_ref());
        fields.into_sequence()
    }
}

/// ```text
/// CertTemplate ::= SEQUENCE {
///     version      [0] Version               OPTIONAL,
///     serialNumber [1] INTEGER               OPTIONAL,
///     signingAlg   [2] AlgorithmIdentifier   OPTIONAL,
///     issuer       [3] Name                  OPTIONAL,
///     validity     [4] OptionalValidity      OPTIONAL,
///     subject      [5] Name                  OPTIONAL,
///     publicKey    [6] SubjectPublicKeyInfo  OPTIONAL,
///     issuerUID    [7] UniqueIdentifier      OPTIONAL,
///     subjectUID   [8] UniqueIdentifier      OPTIONAL,
///     extensions   [9] Extensions            OPTIONAL }
/// ```
///
/// Every field is implicitly tagged except `issuer` and `subject`, whose
/// type is a CHOICE.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CertTemplate {
    version: Option<Integer>,
    serial_number: Option<Integer>,
    signing_alg: Option<AlgorithmIdentifier>,
    issuer: Option<Name>,
    validity: Option<OptionalValidity>,
    subject: Option<Name>,
    public_key: Option<SubjectPublicKeyInfo>,
    issuer_uid: Option<BitString>,
    subject_uid: Option<BitString>,
    extensions: Option<Extensions>,
}

impl CertTemplate {
    pub fn version(&self) -> Option<&Integer> {
        self.version.as_ref()
    }

    pub fn serial_number(&self) -> Option<&Integer> {
        self.serial_number.as_ref()
    }

    pub fn signing_alg(&self) -> Option<&AlgorithmIdentifier> {
        self.signing_alg.as_ref()
    }

    pub fn issuer(&self) -> Option<&Name> {
        self.issuer.as_ref()
    }

    pub fn validity(&self) -> Option<&OptionalValidity> {
        self.validity.as_ref()
    }

    pub fn subject(&self) -> Option<&Name> {
        self.subject.as_ref()
    }

    pub fn public_key(&self) -> Option<&SubjectPublicKeyInfo> {
        self.public_key.as_ref()
    }

    pub fn issuer_uid(&self) -> Option<&BitString> {
        self.issuer_uid.as_ref()
    }

    pub fn subject_uid(&self) -> Option<&BitString> {
        self.subject_uid.as_ref()
    }

    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, tag: u32) -> VellumResult<()> {
    if slot.is_some() {
        return Err(VellumError::structural(format!(
            "CertTemplate: duplicate field [{}]",
            tag
        )));
    }
    *slot = Some(value);
    Ok(())
}

fn implicit<T: FromAsn1>(tagged: &TaggedObject, universal_number: u32) -> VellumResult<T> {
    T::from_asn1(&tagged.implicit_as(universal_number)?)
}

impl FromAsn1 for CertTemplate {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "CertTemplate")?;
        let mut template = Self::default();
        while !reader.is_empty() {
            let element = reader.next_object()?;
            let tagged = match element {
                Asn1Object::Tagged(t) if t.class() == BerTagClass::ContextSpecific => t,
                other => {
                    return Err(VellumError::structural(format!(
                        "CertTemplate: expected tagged field, found {}",
                        other.kind_name()
                    )));
                }
            };
            let tag = tagged.number();
            match tag {
                0 => set_once(&mut template.version, implicit(tagged, universal::INTEGER)?, tag)?,
                1 => set_once(
                    &mut template.serial_number,
                    implicit(tagged, universal::INTEGER)?,
                    tag,
                )?,
                2 => set_once(
                    &mut template.signing_alg,
                    implicit(tagged, universal::SEQUENCE)?,
                    tag,
                )?,
                3 => set_once(
                    &mut template.issuer,
                    Name::from_asn1(tagged.explicit_inner()?)?,
                    tag,
                )?,
                4 => set_once(
                    &mut template.validity,
                    implicit(tagged, universal::SEQUENCE)?,
                    tag,
                )?,
                5 => set_once(
                    &mut template.subject,
                    Name::from_asn1(tagged.explicit_inner()?)?,
                    tag,
                )?,
                6 => set_once(
                    &mut template.public_key,
                    implicit(tagged, universal::SEQUENCE)?,
                    tag,
                )?,
                7 => set_once(
                    &mut template.issuer_uid,
                    implicit(tagged, universal::BIT_STRING)?,
                    tag,
                )?,
                8 => set_once(
                    &mut template.subject_uid,
                    implicit(tagged, universal::BIT_STRING)?,
                    tag,
                )?,
                9 => set_once(
                    &mut template.extensions,
                    implicit(tagged, universal::SEQUENCE)?,
                    tag,
                )?,
                _ => return Err(unknown_tag("CertTemplate", tagged)),
            }
        }
        Ok(template)
    }
}

impl Asn1Encodable for CertTemplate {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push_implicit_optional(0, self.version.as_ref())
            .push_implicit_optional(1, self.serial_number.as_ref())
            .push_implicit_optional(2, self.signing_alg.as_ref())
            .push_explicit_optional(3, self.issuer.as_ref())
            .push_implicit_optional(4, self.validity.as_ref())
            .push_explicit_optional(5, self.subject.as_ref())
            .push_implicit_optional(6, self.public_key.as_ref())
            .push_implicit_optional(7, self.issuer_uid.as_ref())
            .push_implicit_optional(8, self.subject_uid.as_ref())
            .push_implicit_optional(9, self.extensions.as_ref());
        fields.into_sequence()
    }
}

/// Mutable accumulator for a [`CertTemplate`]
///
/// Unset fields are left out of the built template.
#[derive(Debug, Clone, Default)]
pub struct CertTemplateBuilder {
    template: CertTemplate,
}

impl CertTemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// [`VellumError::InvalidArgument`] unless `version` is v1 (0), v2 (1) or
    /// v3 (2).
    pub fn set_version(&mut self, version: i64) -> VellumResult<&mut Self> {
        if !(0..=2).contains(&version) {
            return Err(VellumError::invalid_argument(format!(
                "certificate version must be 0, 1 or 2, got {}",
                version
            )));
        }
        self.template.version = Some(Integer::from_i64(version));
        Ok(self)
    }

    pub fn set_serial_number(&mut self, serial: Integer) -> &mut Self {
        self.template.serial_number = Some(serial);
        self
    }

    pub fn set_signing_alg(&mut self, alg: AlgorithmIdentifier) -> &mut Self {
        self.template.signing_alg = Some(alg);
        self
    }

    pub fn set_issuer(&mut self, issuer: Name) -> &mut Self {
        self.template.issuer = Some(issuer);
        self
    }

    pub fn set_validity(&mut self, validity: OptionalValidity) -> &mut Self {
        self.template.validity = Some(validity);
        self
    }

    pub fn set_subject(&mut self, subject: Name) -> &mut Self {
        self.template.subject = Some(subject);
        self
    }

    pub fn set_public_key(&mut self, key: SubjectPublicKeyInfo) -> &mut Self {
        self.template.public_key = Some(key);
        self
    }

    pub fn set_issuer_uid(&mut self, uid: BitString) -> &mut Self {
        self.template.issuer_uid = Some(uid);
        self
    }

    pub fn set_subject_uid(&mut self, uid: BitString) -> &mut Self {
        self.template.subject_uid = Some(uid);
        self
    }

    pub fn set_extensions(&mut self, extensions: Extensions) -> &mut Self {
        self.template.extensions = Some(extensions);
        self
    }

    pub fn build(&self) -> CertTemplate {
        self.template.clone()
    }
}

/// ```text
/// EncryptedValue ::= SEQUENCE {
///     intendedAlg  [0] AlgorithmIdentifier  OPTIONAL,
///     symmAlg      [1] AlgorithmIdentifier  OPTIONAL,
///     encSymmKey   [2] BIT STRING           OPTIONAL,
///     keyAlg       [3] AlgorithmIdentifier  OPTIONAL,
///     valueHint    [4] OCTET STRING         OPTIONAL,
///     encValue     BIT STRING }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedValue {
    intended_alg: Option<AlgorithmIdentifier>,
    symm_alg: Option<AlgorithmIdentifier>,
    enc_symm_key: Option<BitString>,
    key_alg: Option<AlgorithmIdentifier>,
    value_hint: Option<Bytes>,
    enc_value: BitString,
}

impl EncryptedValue {
    pub fn new(enc_value: BitString) -> Self {
        Self {
            intended_alg: None,
            symm_alg: None,
            enc_symm_key: None,
            key_alg: None,
            value_hint: None,
            enc_value,
        }
    }

    pub fn with_intended_alg(mut self, alg: AlgorithmIdentifier) -> Self {
        self.intended_alg = Some(alg);
        self
    }

    pub fn with_symm_alg(mut self, alg: AlgorithmIdentifier) -> Self {
        self.symm_alg = Some(alg);
        self
    }

    pub fn with_enc_symm_key(mut self, key: BitString) -> Self {
        self.enc_symm_key = Some(key);
        self
    }

    pub fn with_key_alg(mut self, alg: AlgorithmIdentifier) -> Self {
        self.key_alg = Some(alg);
        self
    }

    pub fn with_value_hint(mut self, hint: Bytes) -> Self {
        self.value_hint = Some(hint);
        self
    }

    pub fn intended_alg(&self) -> Option<&AlgorithmIdentifier> {
        self.intended_alg.as_ref()
    }

    pub fn symm_alg(&self) -> Option<&AlgorithmIdentifier> {
        self.symm_alg.as_ref()
    }

    pub fn enc_symm_key(&self) -> Option<&BitString> {
        self.enc_symm_key.as_ref()
    }

    pub fn key_alg(&self) -> Option<&AlgorithmIdentifier> {
        self.key_alg.as_ref()
    }

    pub fn value_hint(&self) -> Option<&Bytes> {
        self.value_hint.as_ref()
    }

    pub fn enc_value(&self) -> &BitString {
        &self.enc_value
    }
}

impl FromAsn1 for EncryptedValue {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "EncryptedValue")?;
        let intended_alg = reader.next_implicit(0, universal::SEQUENCE)?;
        let symm_alg = reader.next_implicit(1, universal::SEQUENCE)?;
        let enc_symm_key = reader.next_implicit(2, universal::BIT_STRING)?;
        let key_alg = reader.next_implicit(3, universal::SEQUENCE)?;
        let value_hint = reader.next_implicit(4, universal::OCTET_STRING)?;
        if let Some(Asn1Object::Tagged(tagged)) = reader.peek() {
            return Err(unknown_tag("EncryptedValue", tagged));
        }
        let enc_value = reader.next()?;
        reader.finish()?;
        Ok(Self {
            intended_alg,
            symm_alg,
            enc_symm_key,
            key_alg,
            value_hint,
            enc_value,
        })
    }
}

impl Asn1Encodable for EncryptedValue {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push_implicit_optional(0, self.intended_alg.as_ref())
            .push_implicit_optional(1, self.symm_alg.as_ref())
            .push_implicit_optional(2, self.enc_symm_key.as_ref())
            .push_implicit_optional(3, self.key_alg.as_ref())
            .push_implicit_optional(4, self.value_hint.as_ref())
            .push(&self.enc_value);
        fields.into_sequence()
    }
}

/// ```text
/// AttributeTypeAndValue ::= SEQUENCE {
///     type   OBJECT IDENTIFIER,
///     value  ANY DEFINED BY type }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeAndValue {
    kind: ObjectIdentifier,
    value: Asn1Object,
}

impl AttributeTypeAndValue {
    pub fn new(kind: ObjectIdentifier, value: Asn1Object) -> Self {
        Self { kind, value }
    }

    pub fn kind(&self) -> &ObjectIdentifier {
        &self.kind
    }

    pub fn value(&self) -> &Asn1Object {
        &self.value
    }
}

impl FromAsn1 for AttributeTypeAndValue {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "AttributeTypeAndValue")?;
        let attribute = Self {
            kind: reader.next()?,
            value: reader.next_object()?.clone(),
        };
        reader.finish()?;
        Ok(attribute)
    }
}

impl Asn1Encodable for AttributeTypeAndValue {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields.push(&self.kind).push(&self.value);
        fields.into_sequence()
    }
}

/// ```text
/// POPOSigningKey ::= SEQUENCE {
///     poposkInput          [0] POPOSigningKeyInput OPTIONAL,
///     algorithmIdentifier  AlgorithmIdentifier,
///     signature            BIT STRING }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopoSigningKey {
    input: Option<Sequence>,
    algorithm: AlgorithmIdentifier,
    signature: BitString,
}

impl PopoSigningKey {
    pub fn new(input: Option<Sequence>, algorithm: AlgorithmIdentifier, signature: BitString) -> Self {
        Self {
            input,
            algorithm,
            signature,
        }
    }

    pub fn input(&self) -> Option<&Sequence> {
        self.input.as_ref()
    }

    pub fn algorithm(&self) -> &AlgorithmIdentifier {
        &self.algorithm
    }

    pub fn signature(&self) -> &BitString {
        &self.signature
    }
}

impl FromAsn1 for PopoSigningKey {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "POPOSigningKey")?;
        let key = Self {
            input: reader.next_implicit(0, universal::SEQUENCE)?,
            algorithm: reader.next()?,
            signature: reader.next()?,
        };
        reader.finish()?;
        Ok(key)
    }
}

impl Asn1Encodable for PopoSigningKey {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push_implicit_optional(0, self.input.as_ref())
            .push(&self.algorithm)
            .push(&self.signature);
        fields.into_sequence()
    }
}

/// ```text
/// ProofOfPossession ::= CHOICE {
///     raVerified       [0] NULL,
///     signature        [1] POPOSigningKey,
///     keyEncipherment  [2] POPOPrivKey,
///     keyAgreement     [3] POPOPrivKey }
/// ```
///
/// `POPOPrivKey` is itself a CHOICE, so its alternative is kept as the
/// decoded node under the explicit tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofOfPossession {
    RaVerified,
    Signature(PopoSigningKey),
    KeyEncipherment(Asn1Object),
    KeyAgreement(Asn1Object),
}

impl FromAsn1 for ProofOfPossession {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let Asn1Object::Tagged(tagged) = object else {
            return Err(invalid_choice("ProofOfPossession", object));
        };
        if tagged.class() != BerTagClass::ContextSpecific {
            return Err(invalid_choice("ProofOfPossession", object));
        }
        match tagged.number() {
            0 => {
                tagged.implicit_as(universal::NULL)?.as_null()?;
                Ok(ProofOfPossession::RaVerified)
            }
            1 => Ok(ProofOfPossession::Signature(implicit(tagged, universal::SEQUENCE)?)),
            2 => Ok(ProofOfPossession::KeyEncipherment(tagged.explicit_inner()?.clone())),
            3 => Ok(ProofOfPossession::KeyAgreement(tagged.explicit_inner()?.clone())),
            _ => Err(invalid_choice("ProofOfPossession", object)),
        }
    }
}

impl Asn1Encodable for ProofOfPossession {
    fn to_asn1_object(&self) -> Asn1Object {
        let tagged = match self {
            ProofOfPossession::RaVerified => TaggedObject::implicit(0, &Asn1Object::Null),
            ProofOfPossession::Signature(key) => TaggedObject::implicit(1, &key.to_asn1_object()),
            ProofOfPossession::KeyEncipherment(inner) => TaggedObject::explicit(2, inner.clone()),
            ProofOfPossession::KeyAgreement(inner) => TaggedObject::explicit(3, inner.clone()),
        };
        Asn1Object::Tagged(tagged)
    }
}

/// ```text
/// CertRequest ::= SEQUENCE {
///     certReqId     INTEGER,
///     certTemplate  CertTemplate,
///     controls      Controls OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertRequest {
    cert_req_id: Integer,
    cert_template: CertTemplate,
    controls: Option<Vec<AttributeTypeAndValue>>,
}

impl CertRequest {
    pub fn new(
        cert_req_id: Integer,
        cert_template: CertTemplate,
        controls: Option<Vec<AttributeTypeAndValue>>,
    ) -> Self {
        Self {
            cert_req_id,
            cert_template,
            controls,
        }
    }

    pub fn cert_req_id(&self) -> &Integer {
        &self.cert_req_id
    }

    pub fn cert_template(&self) -> &CertTemplate {
        &self.cert_template
    }

    pub fn controls(&self) -> Option<&[AttributeTypeAndValue]> {
        self.controls.as_deref()
    }
}

impl FromAsn1 for CertRequest {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "CertRequest")?;
        let request = Self {
            cert_req_id: reader.next()?,
            cert_template: reader.next()?,
            controls: reader.next_optional(universal::SEQUENCE)?,
        };
        reader.finish()?;
        Ok(request)
    }
}

impl Asn1Encodable for CertRequest {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.cert_req_id)
            .push(&self.cert_template)
            .push_optional(self.controls.as_ref());
        fields.into_sequence()
    }
}

/// ```text
/// CertReqMsg ::= SEQUENCE {
///     certReq  CertRequest,
///     popo     ProofOfPossession OPTIONAL,
///     regInfo  SEQUENCE SIZE(1..MAX) OF AttributeTypeAndValue OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertReqMsg {
    cert_req: CertRequest,
    popo: Option<ProofOfPossession>,
    reg_info: Option<Vec<AttributeTypeAndValue>>,
}

impl CertReqMsg {
    pub fn new(
        cert_req: CertRequest,
        popo: Option<ProofOfPossession>,
        reg_info: Option<Vec<AttributeTypeAndValue>>,
    ) -> Self {
        Self {
            cert_req,
            popo,
            reg_info,
        }
    }

    pub fn cert_req(&self) -> &CertRequest {
        &self.cert_req
    }

    pub fn popo(&self) -> Option<&ProofOfPossession> {
        self.popo.as_ref()
    }

    pub fn reg_info(&self) -> Option<&[AttributeTypeAndValue]> {
        self.reg_info.as_deref()
    }
}

impl FromAsn1 for CertReqMsg {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "CertReqMsg")?;
        let cert_req = reader.next()?;
        let popo = match reader.peek() {
            Some(Asn1Object::Tagged(_)) => Some(reader.next()?),
            _ => None,
        };
        let reg_info: Option<Vec<AttributeTypeAndValue>> =
            reader.next_optional(universal::SEQUENCE)?;
        if reg_info.as_ref().is_some_and(Vec::is_empty) {
            return Err(VellumError::structural("CertReqMsg: regInfo must not be empty"));
        }
        reader.finish()?;
        Ok(Self {
            cert_req,
            popo,
            reg_info,
        })
    }
}

impl Asn1Encodable for CertReqMsg {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.cert_req)
            .push_optional(self.popo.as_ref())
            .push_optional(self.reg_info.as_ref());
        fields.into_sequence()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oids;
    use crate::pkix::Extension;
    use crate::primitive::{Asn1String, UtcTime};
    use hex_literal::hex;

    fn sample_template() -> CertTemplate {
        let mut builder = CertTemplateBuilder::new();
        builder
            .set_version(2)
            .unwrap()
            .set_serial_number(Integer::from_u64(0x1001))
            .set_subject(Name::new(vec![(oids::COMMON_NAME, Asn1String::utf8("alice"))]))
            .set_validity(OptionalValidity::new(
                None,
                Some(Time::Utc(UtcTime::new("301231235959Z").unwrap())),
            ))
            .set_public_key(SubjectPublicKeyInfo::new(
                AlgorithmIdentifier::new(oids::ED25519),
                BitString::from_bytes(vec![0x11; 32]),
            ))
            .set_extensions(Extensions::new(vec![Extension::new(
                oids::KEY_USAGE,
                true,
                hex!("03020780").to_vec(),
            )]));
        builder.build()
    }

    #[test]
    fn test_builder_elides_unset_fields() {
        let empty = CertTemplateBuilder::new().build();
        assert_eq!(empty.to_der().as_ref(), &hex!("3000"));

        let mut builder = CertTemplateBuilder::new();
        builder.set_serial_number(Integer::from_i64(5));
        assert_eq!(builder.build().to_der().as_ref(), &hex!("3003 810105"));
        assert!(builder.set_version(3).is_err());
    }

    #[test]
    fn test_template_round_trip() {
        let template = sample_template();
        let der = template.to_der();
        let decoded = CertTemplate::from_der(&der).unwrap();
        assert_eq!(decoded, template);
        assert_eq!(decoded.to_der(), der);
        assert_eq!(decoded.version().and_then(Integer::to_i64), Some(2));
        assert_eq!(decoded.subject().and_then(|n| n.find(&oids::COMMON_NAME)), Some("alice"));
        assert!(decoded.issuer().is_none());
        assert!(decoded.validity().unwrap().not_before().is_none());
    }

    #[test]
    fn test_template_unknown_tag() {
        // [10] is not a CertTemplate field
        let err = CertTemplate::from_der(&hex!("3003 8a0100")).unwrap_err();
        assert!(matches!(err, VellumError::UnknownTag { context: "CertTemplate", tag: 10 }));
    }

    #[test]
    fn test_template_rejects_untagged_and_duplicates() {
        assert!(CertTemplate::from_der(&hex!("3003 020101")).is_err());
        assert!(CertTemplate::from_der(&hex!("3006 810101 810102")).is_err());
    }

    #[test]
    fn test_encrypted_value() {
        let value = EncryptedValue::new(BitString::from_bytes(vec![0xAB, 0xCD]))
            .with_symm_alg(AlgorithmIdentifier::new(oids::SHA256))
            .with_value_hint(Bytes::from_static(b"hint"));
        let der = value.to_der();
        let decoded = EncryptedValue::from_der(&der).unwrap();
        assert_eq!(decoded, value);
        assert!(decoded.intended_alg().is_none());
        assert_eq!(decoded.symm_alg().unwrap().algorithm(), &oids::SHA256);
        assert_eq!(decoded.enc_value().data().as_ref(), &[0xAB, 0xCD]);

        // encValue is mandatory
        assert!(EncryptedValue::from_der(&hex!("3000")).is_err());
        let err = EncryptedValue::from_der(&hex!("3007 850100 03020000")).unwrap_err();
        assert!(matches!(err, VellumError::UnknownTag { context: "EncryptedValue", tag: 5 }));
    }

    #[test]
    fn test_cert_req_msg_round_trip() {
        let request = CertRequest::new(Integer::from_i64(1), sample_template(), None);
        let msg = CertReqMsg::new(
            request,
            Some(ProofOfPossession::RaVerified),
            Some(vec![AttributeTypeAndValue::new(
                oids::REG_CTRL_REG_TOKEN,
                Asn1Object::String(Asn1String::utf8("token")),
            )]),
        );
        let der = msg.to_der();
        let decoded = CertReqMsg::from_der(&der).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.popo(), Some(&ProofOfPossession::RaVerified));
        assert_eq!(decoded.reg_info().map(<[_]>::len), Some(1));
        assert_eq!(decoded.cert_req().cert_req_id().to_i64(), Some(1));
    }

    #[test]
    fn test_proof_of_possession_choice() {
        let popo = ProofOfPossession::Signature(PopoSigningKey::new(
            None,
            AlgorithmIdentifier::new(oids::ED25519),
            BitString::from_bytes(vec![0x01; 4]),
        ));
        assert_eq!(popo.to_der()[0], 0xA1);
        assert_eq!(ProofOfPossession::from_der(&popo.to_der()).unwrap(), popo);
        assert_eq!(ProofOfPossession::RaVerified.to_der().as_ref(), &hex!("8000"));
        let err = ProofOfPossession::from_der(&hex!("8400")).unwrap_err();
        assert!(matches!(err, VellumError::InvalidChoice { .. }));
    }
}
