//! Online Certificate Status Protocol messages (RFC 6960)

use bytes::Bytes;

use crate::ber::types::{BerTagClass, universal};
use crate::constructed::{Sequence, TaggedObject};
use crate::error::{VellumError, VellumResult};
use crate::object::Asn1Object;
use crate::oids;
use crate::pkix::{AlgorithmIdentifier, Extensions, GeneralName, Name};
use crate::primitive::{BitString, GeneralizedTime, Integer, ObjectIdentifier};
use crate::schema::{
    Asn1Encodable, Defaulted, FieldVector, FromAsn1, SequenceReader, invalid_choice,
};

/// `Version ::= INTEGER { v1(0) }`, the DEFAULT of every versioned structure
pub const VERSION_V1: Integer = Integer::ZERO;

/// ENUMERATED types with a closed set of values
macro_rules! enumerated {
    ($name:ident, $context:literal, { $($variant:ident = $value:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $value),+
        }

        impl $name {
            pub fn from_value(value: i64) -> Option<Self> {
                match value {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn value(self) -> i64 {
                self as i64
            }
        }

        impl FromAsn1 for $name {
            fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
                let integer = object.as_enumerated()?;
                integer
                    .to_i64()
                    .and_then(Self::from_value)
                    .ok_or_else(|| {
                        VellumError::structural(format!(
                            "{}: unknown value {}",
                            $context, integer
                        ))
                    })
            }
        }

        impl Asn1Encodable for $name {
            fn to_asn1_object(&self) -> Asn1Object {
                Asn1Object::Enumerated(Integer::from_i64(self.value()))
            }
        }
    };
}

enumerated!(OcspResponseStatus, "OCSPResponseStatus", {
    Successful = 0,
    MalformedRequest = 1,
    InternalError = 2,
    TryLater = 3,
    SigRequired = 5,
    Unauthorized = 6,
});

enumerated!(CrlReason, "CRLReason", {
    Unspecified = 0,
    KeyCompromise = 1,
    CaCompromise = 2,
    AffiliationChanged = 3,
    Superseded = 4,
    CessationOfOperation = 5,
    CertificateHold = 6,
    RemoveFromCrl = 8,
    PrivilegeWithdrawn = 9,
    AaCompromise = 10,
});

/// ```text
/// OCSPResponse ::= SEQUENCE {
///     responseStatus  OCSPResponseStatus,
///     responseBytes   [0] EXPLICIT ResponseBytes OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcspResponse {
    status: OcspResponseStatus,
    response_bytes: Option<ResponseBytes>,
}

impl OcspResponse {
    pub fn new(status: OcspResponseStatus, response_bytes: Option<ResponseBytes>) -> Self {
        Self {
            status,
            response_bytes,
        }
    }

    /// A successful response carrying `basic`
    pub fn successful(basic: &BasicOcspResponse) -> Self {
        Self::new(
            OcspResponseStatus::Successful,
            Some(ResponseBytes::new(oids::OCSP_BASIC, basic.to_der())),
        )
    }

    pub fn status(&self) -> OcspResponseStatus {
        self.status
    }

    pub fn response_bytes(&self) -> Option<&ResponseBytes> {
        self.response_bytes.as_ref()
    }
}

impl FromAsn1 for OcspResponse {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "OCSPResponse")?;
        let response = Self {
            status: reader.next()?,
            response_bytes: reader.next_explicit(0)?,
        };
        reader.finish()?;
        Ok(response)
    }
}

impl Asn1Encodable for OcspResponse {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.status)
            .push_explicit_optional(0, self.response_bytes.as_ref());
        fields.into_sequence()
    }
}

/// ```text
/// ResponseBytes ::= SEQUENCE {
///     responseType  OBJECT IDENTIFIER,
///     response      OCTET STRING }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBytes {
    response_type: ObjectIdentifier,
    response: Bytes,
}

impl ResponseBytes {
    pub fn new(response_type: ObjectIdentifier, response: impl Into<Bytes>) -> Self {
        Self {
            response_type,
            response: response.into(),
        }
    }

    pub fn response_type(&self) -> &ObjectIdentifier {
        &self.response_type
    }

    pub fn response(&self) -> &Bytes {
        &self.response
    }

    /// Decodes the payload as `id-pkix-ocsp-basic`
    ///
    /// # Errors
    /// [`VellumError::InvalidArgument`] for any other response type.
    pub fn basic_response(&self) -> VellumResult<BasicOcspResponse> {
        if self.response_type != oids::OCSP_BASIC {
            return Err(VellumError::invalid_argument(format!(
                "response type {} is not id-pkix-ocsp-basic",
                self.response_type
            )));
        }
        BasicOcspResponse::from_der(&self.response)
    }
}

impl FromAsn1 for ResponseBytes {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "ResponseBytes")?;
        let bytes = Self {
            response_type: reader.next()?,
            response: reader.next()?,
        };
        reader.finish()?;
        Ok(bytes)
    }
}

impl Asn1Encodable for ResponseBytes {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields.push(&self.response_type).push(&self.response);
        fields.into_sequence()
    }
}

/// ```text
/// BasicOCSPResponse ::= SEQUENCE {
///     tbsResponseData     ResponseData,
///     signatureAlgorithm  AlgorithmIdentifier,
///     signature           BIT STRING,
///     certs               [0] EXPLICIT SEQUENCE OF Certificate OPTIONAL }
/// ```
///
/// Certificates are kept as their decoded SEQUENCE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicOcspResponse {
    tbs_response_data: ResponseData,
    signature_algorithm: AlgorithmIdentifier,
    signature: BitString,
    certs: Option<Vec<Sequence>>,
}

impl BasicOcspResponse {
    pub fn new(
        tbs_response_data: ResponseData,
        signature_algorithm: AlgorithmIdentifier,
        signature: BitString,
        certs: Option<Vec<Sequence>>,
    ) -> Self {
        Self {
            tbs_response_data,
            signature_algorithm,
            signature,
            certs,
        }
    }

    pub fn tbs_response_data(&self) -> &ResponseData {
        &self.tbs_response_data
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        &self.signature_algorithm
    }

    pub fn signature(&self) -> &BitString {
        &self.signature
    }

    pub fn certs(&self) -> Option<&[Sequence]> {
        self.certs.as_deref()
    }
}

impl FromAsn1 for BasicOcspResponse {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "BasicOCSPResponse")?;
        let response = Self {
            tbs_response_data: reader.next()?,
            signature_algorithm: reader.next()?,
            signature: reader.next()?,
            certs: reader.next_explicit(0)?,
        };
        reader.finish()?;
        Ok(response)
    }
}

impl Asn1Encodable for BasicOcspResponse {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.tbs_response_data)
            .push(&self.signature_algorithm)
            .push(&self.signature)
            .push_explicit_optional(0, self.certs.as_ref());
        fields.into_sequence()
    }
}

/// ```text
/// ResponseData ::= SEQUENCE {
///     version             [0] EXPLICIT Version DEFAULT v1,
///     responderID         ResponderID,
///     producedAt          GeneralizedTime,
///     responses           SEQUENCE OF SingleResponse,
///     responseExtensions  [1] EXPLICIT Extensions OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseData {
    version: Defaulted<Integer>,
    responder_id: ResponderId,
    produced_at: GeneralizedTime,
    responses: Vec<SingleResponse>,
    extensions: Option<Extensions>,
}

impl ResponseData {
    pub fn new(
        responder_id: ResponderId,
        produced_at: GeneralizedTime,
        responses: Vec<SingleResponse>,
        extensions: Option<Extensions>,
    ) -> Self {
        Self {
            version: Defaulted::implied(VERSION_V1),
            responder_id,
            produced_at,
            responses,
            extensions,
        }
    }

    /// Writes the version field even when it is v1
    pub fn with_explicit_version(mut self) -> Self {
        self.version = Defaulted::present(self.version.into_value());
        self
    }

    pub fn version(&self) -> &Integer {
        self.version.value()
    }

    pub fn responder_id(&self) -> &ResponderId {
        &self.responder_id
    }

    pub fn produced_at(&self) -> &GeneralizedTime {
        &self.produced_at
    }

    pub fn responses(&self) -> &[SingleResponse] {
        &self.responses
    }

    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }
}

impl FromAsn1 for ResponseData {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "ResponseData")?;
        let version = reader.next_explicit(0)?;
        let data = Self {
            version: Defaulted::from_field(version, &VERSION_V1),
            responder_id: reader.next()?,
            produced_at: reader.next()?,
            responses: reader.next()?,
            extensions: reader.next_explicit(1)?,
        };
        reader.finish()?;
        Ok(data)
    }
}

impl Asn1Encodable for ResponseData {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push_explicit_defaulted(0, &self.version, &VERSION_V1)
            .push(&self.responder_id)
            .push(&self.produced_at)
            .push(&self.responses)
            .push_explicit_optional(1, self.extensions.as_ref());
        fields.into_sequence()
    }
}

/// ```text
/// ResponderID ::= CHOICE {
///     byName  [1] Name,
///     byKey   [2] KeyHash }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponderId {
    ByName(Name),
    /// SHA-1 hash of the responder's public key
    ByKey(Bytes),
}

impl FromAsn1 for ResponderId {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        match object {
            Asn1Object::Tagged(tagged) if tagged.class() == BerTagClass::ContextSpecific => {
                match tagged.number() {
                    1 => Ok(ResponderId::ByName(Name::from_asn1(tagged.explicit_inner()?)?)),
                    2 => Ok(ResponderId::ByKey(Bytes::from_asn1(tagged.explicit_inner()?)?)),
                    _ => Err(invalid_choice("ResponderID", object)),
                }
            }
            other => Err(invalid_choice("ResponderID", other)),
        }
    }
}

impl Asn1Encodable for ResponderId {
    fn to_asn1_object(&self) -> Asn1Object {
        let tagged = match self {
            ResponderId::ByName(name) => TaggedObject::explicit(1, name.to_asn1_object()),
            ResponderId::ByKey(hash) => TaggedObject::explicit(2, hash.to_asn1_object()),
        };
        Asn1Object::Tagged(tagged)
    }
}

/// ```text
/// SingleResponse ::= SEQUENCE {
///     certID            CertID,
///     certStatus        CertStatus,
///     thisUpdate        GeneralizedTime,
///     nextUpdate        [0] EXPLICIT GeneralizedTime OPTIONAL,
///     singleExtensions  [1] EXPLICIT Extensions OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleResponse {
    cert_id: CertId,
    cert_status: CertStatus,
    this_update: GeneralizedTime,
    next_update: Option<GeneralizedTime>,
    extensions: Option<Extensions>,
}

impl SingleResponse {
    pub fn new(
        cert_id: CertId,
        cert_status: CertStatus,
        this_update: GeneralizedTime,
        next_update: Option<GeneralizedTime>,
    ) -> Self {
        Self {
            cert_id,
            cert_status,
            this_update,
            next_update,
            extensions: None,
        }
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = Some(extensions);
        self
    }

    pub fn cert_id(&self) -> &CertId {
        &self.cert_id
    }

    pub fn cert_status(&self) -> &CertStatus {
        &self.cert_status
    }

    pub fn this_update(&self) -> &GeneralizedTime {
        &self.this_update
    }

    pub fn next_update(&self) -> Option<&GeneralizedTime> {
        self.next_update.as_ref()
    }

    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }
}

impl FromAsn1 for SingleResponse {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "SingleResponse")?;
        let response = Self {
            cert_id: reader.next()?,
            cert_status: reader.next()?,
            this_update: reader.next()?,
            next_update: reader.next_explicit(0)?,
            extensions: reader.next_explicit(1)?,
        };
        reader.finish()?;
        Ok(response)
    }
}

impl Asn1Encodable for SingleResponse {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.cert_id)
            .push(&self.cert_status)
            .push(&self.this_update)
            .push_explicit_optional(0, self.next_update.as_ref())
            .push_explicit_optional(1, self.extensions.as_ref());
        fields.into_sequence()
    }
}

/// ```text
/// CertID ::= SEQUENCE {
///     hashAlgorithm   AlgorithmIdentifier,
///     issuerNameHash  OCTET STRING,
///     issuerKeyHash   OCTET STRING,
///     serialNumber    CertificateSerialNumber }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertId {
    hash_algorithm: AlgorithmIdentifier,
    issuer_name_hash: Bytes,
    issuer_key_hash: Bytes,
    serial_number: Integer,
}

impl CertId {
    pub fn new(
        hash_algorithm: AlgorithmIdentifier,
        issuer_name_hash: impl Into<Bytes>,
        issuer_key_hash: impl Into<Bytes>,
        serial_number: Integer,
    ) -> Self {
        Self {
            hash_algorithm,
            issuer_name_hash: issuer_name_hash.into(),
            issuer_key_hash: issuer_key_hash.into(),
            serial_number,
        }
    }

    pub fn hash_algorithm(&self) -> &AlgorithmIdentifier {
        &self.hash_algorithm
    }

    pub fn issuer_name_hash(&self) -> &Bytes {
        &self.issuer_name_hash
    }

    pub fn issuer_key_hash(&self) -> &Bytes {
        &self.issuer_key_hash
    }

    pub fn serial_number(&self) -> &Integer {
        &self.serial_number
    }
}

impl FromAsn1 for CertId {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "CertID")?;
        let id = Self {
            hash_algorithm: reader.next()?,
            issuer_name_hash: reader.next()?,
            issuer_key_hash: reader.next()?,
            serial_number: reader.next()?,
        };
        reader.finish()?;
        Ok(id)
    }
}

impl Asn1Encodable for CertId {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.hash_algorithm)
            .push(&self.issuer_name_hash)
            .push(&self.issuer_key_hash)
            .push(&self.serial_number);
        fields.into_sequence()
    }
}

/// ```text
/// CertStatus ::= CHOICE {
///     good     [0] IMPLICIT NULL,
///     revoked  [1] IMPLICIT RevokedInfo,
///     unknown  [2] IMPLICIT UnknownInfo }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertStatus {
    Good,
    Revoked(RevokedInfo),
    Unknown,
}

impl FromAsn1 for CertStatus {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let Asn1Object::Tagged(tagged) = object else {
            return Err(invalid_choice("CertStatus", object));
        };
        if tagged.class() != BerTagClass::ContextSpecific {
            return Err(invalid_choice("CertStatus", object));
        }
        match tagged.number() {
            0 => tagged.implicit_as(universal::NULL)?.as_null().map(|()| CertStatus::Good),
            1 => Ok(CertStatus::Revoked(RevokedInfo::from_asn1(
                &tagged.implicit_sequence()?,
            )?)),
            2 => tagged.implicit_as(universal::NULL)?.as_null().map(|()| CertStatus::Unknown),
            _ => Err(invalid_choice("CertStatus", object)),
        }
    }
}

impl Asn1Encodable for CertStatus {
    fn to_asn1_object(&self) -> Asn1Object {
        let tagged = match self {
            CertStatus::Good => TaggedObject::implicit(0, &Asn1Object::Null),
            CertStatus::Revoked(info) => TaggedObject::implicit(1, &info.to_asn1_object()),
            CertStatus::Unknown => TaggedObject::implicit(2, &Asn1Object::Null),
        };
        Asn1Object::Tagged(tagged)
    }
}

/// ```text
/// RevokedInfo ::= SEQUENCE {
///     revocationTime    GeneralizedTime,
///     revocationReason  [0] EXPLICIT CRLReason OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedInfo {
    revocation_time: GeneralizedTime,
    revocation_reason: Option<CrlReason>,
}

impl RevokedInfo {
    pub fn new(revocation_time: GeneralizedTime, revocation_reason: Option<CrlReason>) -> Self {
        Self {
            revocation_time,
            revocation_reason,
        }
    }

    pub fn revocation_time(&self) -> &GeneralizedTime {
        &self.revocation_time
    }

    pub fn revocation_reason(&self) -> Option<CrlReason> {
        self.revocation_reason
    }
}

impl FromAsn1 for RevokedInfo {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "RevokedInfo")?;
        let info = Self {
            revocation_time: reader.next()?,
            revocation_reason: reader.next_explicit(0)?,
        };
        reader.finish()?;
        Ok(info)
    }
}

impl Asn1Encodable for RevokedInfo {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.revocation_time)
            .push_explicit_optional(0, self.revocation_reason.as_ref());
        fields.into_sequence()
    }
}

/// ```text
/// OCSPRequest ::= SEQUENCE {
///     tbsRequest         TBSRequest,
///     optionalSignature  [0] EXPLICIT Signature OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcspRequest {
    tbs_request: TbsRequest,
    optional_signature: Option<Signature>,
}

impl OcspRequest {
    pub fn new(tbs_request: TbsRequest, optional_signature: Option<Signature>) -> Self {
        Self {
            tbs_request,
            optional_signature,
        }
    }

    pub fn tbs_request(&self) -> &TbsRequest {
        &self.tbs_request
    }

    pub fn optional_signature(&self) -> Option<&Signature> {
        self.optional_signature.as_ref()
    }
}

impl FromAsn1 for OcspRequest {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "OCSPRequest")?;
        let request = Self {
            tbs_request: reader.next()?,
            optional_signature: reader.next_explicit(0)?,
        };
        reader.finish()?;
        Ok(request)
    }
}

impl Asn1Encodable for OcspRequest {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.tbs_request)
            .push_explicit_optional(0, self.optional_signature.as_ref());
        fields.into_sequence()
    }
}

/// ```text
/// TBSRequest ::= SEQUENCE {
///     version            [0] EXPLICIT Version DEFAULT v1,
///     requestorName      [1] EXPLICIT GeneralName OPTIONAL,
///     requestList        SEQUENCE OF Request,
///     requestExtensions  [2] EXPLICIT Extensions OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TbsRequest {
    version: Defaulted<Integer>,
    requestor_name: Option<GeneralName>,
    request_list: Vec<Request>,
    extensions: Option<Extensions>,
}

impl TbsRequest {
    pub fn new(request_list: Vec<Request>) -> Self {
        Self {
            version: Defaulted::implied(VERSION_V1),
            requestor_name: None,
            request_list,
            extensions: None,
        }
    }

    pub fn with_requestor_name(mut self, name: GeneralName) -> Self {
        self.requestor_name = Some(name);
        self
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Writes the version field even when it is v1
    pub fn with_explicit_version(mut self) -> Self {
        self.version = Defaulted::present(self.version.into_value());
        self
    }

    pub fn version(&self) -> &Integer {
        self.version.value()
    }

    pub fn has_explicit_version(&self) -> bool {
        self.version.is_present()
    }

    pub fn requestor_name(&self) -> Option<&GeneralName> {
        self.requestor_name.as_ref()
    }

    pub fn request_list(&self) -> &[Request] {
        &self.request_list
    }

    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }
}

impl FromAsn1 for TbsRequest {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "TBSRequest")?;
        let version = reader.next_explicit(0)?;
        let request = Self {
            version: Defaulted::from_field(version, &VERSION_V1),
            requestor_name: reader.next_explicit(1)?,
            request_list: reader.next()?,
            extensions: reader.next_explicit(2)?,
        };
        reader.finish()?;
        Ok(request)
    }
}

impl Asn1Encodable for TbsRequest {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push_explicit_defaulted(0, &self.version, &VERSION_V1)
            .push_explicit_optional(1, self.requestor_name.as_ref())
            .push(&self.request_list)
            .push_explicit_optional(2, self.extensions.as_ref());
        fields.into_sequence()
    }
}

/// ```text
/// Request ::= SEQUENCE {
///     reqCert                  CertID,
///     singleRequestExtensions  [0] EXPLICIT Extensions OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    req_cert: CertId,
    extensions: Option<Extensions>,
}

impl Request {
    pub fn new(req_cert: CertId, extensions: Option<Extensions>) -> Self {
        Self {
            req_cert,
            extensions,
        }
    }

    pub fn req_cert(&self) -> &CertId {
        &self.req_cert
    }

    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }
}

impl FromAsn1 for Request {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "Request")?;
        let request = Self {
            req_cert: reader.next()?,
            extensions: reader.next_explicit(0)?,
        };
        reader.finish()?;
        Ok(request)
    }
}

impl Asn1Encodable for Request {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.req_cert)
            .push_explicit_optional(0, self.extensions.as_ref());
        fields.into_sequence()
    }
}

/// ```text
/// Signature ::= SEQUENCE {
///     signatureAlgorithm  AlgorithmIdentifier,
///     signature           BIT STRING,
///     certs               [0] EXPLICIT SEQUENCE OF Certificate OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    signature_algorithm: AlgorithmIdentifier,
    signature: BitString,
    certs: Option<Vec<Sequence>>,
}

impl Signature {
    pub fn new(
        signature_algorithm: AlgorithmIdentifier,
        signature: BitString,
        certs: Option<Vec<Sequence>>,
    ) -> Self {
        Self {
            signature_algorithm,
            signature,
            certs,
        }
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        &self.signature_algorithm
    }

    pub fn signature(&self) -> &BitString {
        &self.signature
    }

    pub fn certs(&self) -> Option<&[Sequence]> {
        self.certs.as_deref()
    }
}

impl FromAsn1 for Signature {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "Signature")?;
        let signature = Self {
            signature_algorithm: reader.next()?,
            signature: reader.next()?,
            certs: reader.next_explicit(0)?,
        };
        reader.finish()?;
        Ok(signature)
    }
}

impl Asn1Encodable for Signature {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.signature_algorithm)
            .push(&self.signature)
            .push_explicit_optional(0, self.certs.as_ref());
        fields.into_sequence()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkix::Extension;
    use crate::primitive::Asn1String;
    use hex_literal::hex;

    fn sample_cert_id() -> CertId {
        CertId::new(
            AlgorithmIdentifier::with_parameters(oids::SHA1, Asn1Object::Null),
            vec![0xAA; 20],
            vec![0xBB; 20],
            Integer::from_u64(0x0123_4567),
        )
    }

    fn sample_basic() -> BasicOcspResponse {
        let time = GeneralizedTime::new("20240101000000Z").unwrap();
        let responses = vec![
            SingleResponse::new(sample_cert_id(), CertStatus::Good, time.clone(), None),
            SingleResponse::new(
                sample_cert_id(),
                CertStatus::Revoked(RevokedInfo::new(time.clone(), Some(CrlReason::KeyCompromise))),
                time.clone(),
                Some(GeneralizedTime::new("20240108000000Z").unwrap()),
            ),
            SingleResponse::new(sample_cert_id(), CertStatus::Unknown, time.clone(), None),
        ];
        let data = ResponseData::new(
            ResponderId::ByName(Name::new(vec![(
                oids::COMMON_NAME,
                Asn1String::utf8("responder"),
            )])),
            time,
            responses,
            Some(Extensions::new(vec![Extension::new(
                oids::OCSP_NONCE,
                false,
                hex!("0408 0102030405060708").to_vec(),
            )])),
        );
        BasicOcspResponse::new(
            data,
            AlgorithmIdentifier::new(oids::SHA256_WITH_RSA_ENCRYPTION),
            BitString::from_bytes(vec![0x5A; 16]),
            None,
        )
    }

    #[test]
    fn test_response_round_trip() {
        let basic = sample_basic();
        let response = OcspResponse::successful(&basic);
        let der = response.to_der();

        let decoded = OcspResponse::from_der(&der).unwrap();
        assert_eq!(decoded, response);
        assert_eq!(decoded.status(), OcspResponseStatus::Successful);

        let inner = decoded.response_bytes().unwrap().basic_response().unwrap();
        assert_eq!(inner, basic);
        let data = inner.tbs_response_data();
        assert_eq!(data.version(), &VERSION_V1);
        assert_eq!(data.responses().len(), 3);
        assert_eq!(data.responses()[0].cert_status(), &CertStatus::Good);
        match data.responses()[1].cert_status() {
            CertStatus::Revoked(info) => {
                assert_eq!(info.revocation_reason(), Some(CrlReason::KeyCompromise))
            }
            other => panic!("unexpected status {:?}", other),
        }
        assert!(data.extensions().unwrap().get(&oids::OCSP_NONCE).is_some());
    }

    #[test]
    fn test_error_response() {
        let response = OcspResponse::new(OcspResponseStatus::TryLater, None);
        assert_eq!(response.to_der().as_ref(), &hex!("3003 0a0103"));
        assert_eq!(OcspResponse::from_der(&hex!("3003 0a0103")).unwrap(), response);

        // 4 is not assigned
        let err = OcspResponse::from_der(&hex!("3003 0a0104")).unwrap_err();
        assert!(matches!(err, VellumError::Structural(_)));
    }

    #[test]
    fn test_version_presence_preserved() {
        let request = TbsRequest::new(vec![Request::new(sample_cert_id(), None)]);
        let implied = request.to_der();
        let explicit = request.clone().with_explicit_version().to_der();
        assert_eq!(explicit.len(), implied.len() + 5);
        assert_eq!(&explicit[2..7], &hex!("a003020100"));

        let decoded = TbsRequest::from_der(&explicit).unwrap();
        assert!(decoded.has_explicit_version());
        assert_eq!(decoded.to_der(), explicit);
        assert!(!TbsRequest::from_der(&implied).unwrap().has_explicit_version());
    }

    #[test]
    fn test_request_with_signature() {
        let tbs = TbsRequest::new(vec![Request::new(sample_cert_id(), None)])
            .with_requestor_name(GeneralName::DnsName("client.example".into()));
        let signature = Signature::new(
            AlgorithmIdentifier::new(oids::ED25519),
            BitString::from_bytes(vec![0x01; 64]),
            Some(vec![Sequence::new(vec![Asn1Object::Null])]),
        );
        let request = OcspRequest::new(tbs, Some(signature));
        let decoded = OcspRequest::from_der(&request.to_der()).unwrap();
        assert_eq!(decoded, request);
        assert_eq!(
            decoded.tbs_request().requestor_name(),
            Some(&GeneralName::DnsName("client.example".into()))
        );
        assert_eq!(decoded.optional_signature().unwrap().certs().map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_choice_errors() {
        let err = CertStatus::from_der(&hex!("8300")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid choice for CertStatus: [3]");
        let err = ResponderId::from_der(&hex!("0400")).unwrap_err();
        assert!(matches!(err, VellumError::InvalidChoice { choice: "ResponderID", .. }));

        let by_key = ResponderId::ByKey(Bytes::from_static(&[0x11; 20]));
        assert_eq!(ResponderId::from_der(&by_key.to_der()).unwrap(), by_key);
    }

    #[test]
    fn test_foreign_response_type() {
        let bytes = ResponseBytes::new(oids::DATA, Bytes::new());
        assert!(matches!(bytes.basic_response(), Err(VellumError::InvalidArgument(_))));
    }
}
