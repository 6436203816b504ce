//! Shared PKIX structures (RFC 5280)

use bytes::Bytes;

use crate::ber::types::{BerTagClass, universal};
use crate::constructed::{Sequence, Set, TaggedContent, TaggedObject};
use crate::error::{VellumError, VellumResult};
use crate::object::Asn1Object;
use crate::primitive::{Asn1String, BitString, GeneralizedTime, ObjectIdentifier, UtcTime};
use crate::schema::{
    Asn1Encodable, Defaulted, FieldVector, FromAsn1, SequenceReader, invalid_choice,
};

/// ```text
/// AlgorithmIdentifier ::= SEQUENCE {
///     algorithm   OBJECT IDENTIFIER,
///     parameters  ANY DEFINED BY algorithm OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    algorithm: ObjectIdentifier,
    parameters: Option<Asn1Object>,
}

impl AlgorithmIdentifier {
    pub const fn new(algorithm: ObjectIdentifier) -> Self {
        Self {
            algorithm,
            parameters: None,
        }
    }

    pub const fn with_parameters(algorithm: ObjectIdentifier, parameters: Asn1Object) -> Self {
        Self {
            algorithm,
            parameters: Some(parameters),
        }
    }

    pub fn algorithm(&self) -> &ObjectIdentifier {
        &self.algorithm
    }

    pub fn parameters(&self) -> Option<&Asn1Object> {
        self.parameters.as_ref()
    }
}

impl FromAsn1 for AlgorithmIdentifier {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "AlgorithmIdentifier")?;
        let algorithm = reader.next()?;
        let parameters = if reader.is_empty() {
            None
        } else {
            Some(reader.next_object()?.clone())
        };
        reader.finish()?;
        Ok(Self {
            algorithm,
            parameters,
        })
    }
}

impl Asn1Encodable for AlgorithmIdentifier {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.algorithm)
            .push_optional(self.parameters.as_ref());
        fields.into_sequence()
    }
}

/// ```text
/// SubjectPublicKeyInfo ::= SEQUENCE {
///     algorithm         AlgorithmIdentifier,
///     subjectPublicKey  BIT STRING }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPublicKeyInfo {
    algorithm: AlgorithmIdentifier,
    public_key: BitString,
}

impl SubjectPublicKeyInfo {
    pub fn new(algorithm: AlgorithmIdentifier, public_key: BitString) -> Self {
        Self {
            algorithm,
            public_key,
        }
    }

    pub fn algorithm(&self) -> &AlgorithmIdentifier {
        &self.algorithm
    }

    pub fn public_key(&self) -> &BitString {
        &self.public_key
    }
}

impl FromAsn1 for SubjectPublicKeyInfo {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "SubjectPublicKeyInfo")?;
        let info = Self {
            algorithm: reader.next()?,
            public_key: reader.next()?,
        };
        reader.finish()?;
        Ok(info)
    }
}

impl Asn1Encodable for SubjectPublicKeyInfo {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields.push(&self.algorithm).push(&self.public_key);
        fields.into_sequence()
    }
}

/// An X.500 distinguished name
///
/// ```text
/// Name ::= SEQUENCE OF RelativeDistinguishedName
/// RelativeDistinguishedName ::= SET OF AttributeTypeAndValue
/// AttributeTypeAndValue ::= SEQUENCE { type OBJECT IDENTIFIER, value ANY }
/// ```
///
/// The decoded node is kept as-is; attribute values are not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    rdns: Sequence,
}

impl Name {
    /// A name with one attribute per RDN
    pub fn new(attributes: Vec<(ObjectIdentifier, Asn1String)>) -> Self {
        let rdns = attributes
            .into_iter()
            .map(|(kind, value)| {
                let mut pair = FieldVector::new();
                pair.push(&kind).push(&value);
                Asn1Object::Set(Set::new(vec![pair.into_sequence()]))
            })
            .collect();
        Self { rdns }
    }

    pub fn rdn_count(&self) -> usize {
        self.rdns.len()
    }

    /// Every `(type, value)` pair, in order
    pub fn attributes(&self) -> impl Iterator<Item = (&ObjectIdentifier, &Asn1Object)> + '_ {
        self.rdns
            .iter()
            .filter_map(|rdn| rdn.as_set().ok())
            .flat_map(|set| set.iter())
            .filter_map(|pair| {
                let pair = pair.as_sequence().ok()?;
                Some((pair.get(0)?.as_oid().ok()?, pair.get(1)?))
            })
    }

    /// Text of the first attribute of type `kind`
    pub fn find(&self, kind: &ObjectIdentifier) -> Option<&str> {
        self.attributes()
            .find(|(oid, _)| *oid == kind)
            .and_then(|(_, value)| value.as_string().ok())
            .map(Asn1String::as_str)
    }
}

impl FromAsn1 for Name {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let rdns = object
            .as_sequence()
            .map_err(|e| VellumError::structural(format!("Name: {}", e)))?;
        for rdn in rdns {
            for pair in rdn.as_set()?.iter() {
                let mut reader = SequenceReader::from_object(pair, "AttributeTypeAndValue")?;
                reader.next::<ObjectIdentifier>()?;
                reader.next_object()?;
                reader.finish()?;
            }
        }
        Ok(Self { rdns: rdns.clone() })
    }
}

impl Asn1Encodable for Name {
    fn to_asn1_object(&self) -> Asn1Object {
        Asn1Object::Sequence(self.rdns.clone())
    }
}

/// ```text
/// Extension ::= SEQUENCE {
///     extnID     OBJECT IDENTIFIER,
///     critical   BOOLEAN DEFAULT FALSE,
///     extnValue  OCTET STRING }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    id: ObjectIdentifier,
    critical: Defaulted<bool>,
    value: Bytes,
}

impl Extension {
    pub fn new(id: ObjectIdentifier, critical: bool, value: impl Into<Bytes>) -> Self {
        Self {
            id,
            critical: Defaulted::implied(critical),
            value: value.into(),
        }
    }

    pub fn id(&self) -> &ObjectIdentifier {
        &self.id
    }

    pub fn is_critical(&self) -> bool {
        *self.critical.value()
    }

    /// The DER encoding of the extension value
    pub fn value(&self) -> &Bytes {
        &self.value
    }
}

impl FromAsn1 for Extension {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let mut reader = SequenceReader::from_object(object, "Extension")?;
        let id = reader.next()?;
        let critical = reader.next_optional(universal::BOOLEAN)?;
        let value = reader.next()?;
        reader.finish()?;
        Ok(Self {
            id,
            critical: Defaulted::from_field(critical, &false),
            value,
        })
    }
}

impl Asn1Encodable for Extension {
    fn to_asn1_object(&self) -> Asn1Object {
        let mut fields = FieldVector::new();
        fields
            .push(&self.id)
            .push_defaulted(&self.critical, &false)
            .push(&self.value);
        fields.into_sequence()
    }
}

/// `Extensions ::= SEQUENCE SIZE (1..MAX) OF Extension`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extensions {
    extensions: Vec<Extension>,
}

impl Extensions {
    pub fn new(extensions: Vec<Extension>) -> Self {
        Self { extensions }
    }

    pub fn get(&self, id: &ObjectIdentifier) -> Option<&Extension> {
        self.extensions.iter().find(|ext| ext.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Extension> {
        self.extensions.iter()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl FromAsn1 for Extensions {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let extensions = Vec::<Extension>::from_asn1(object)?;
        if extensions.is_empty() {
            return Err(VellumError::structural("Extensions must not be empty"));
        }
        Ok(Self { extensions })
    }
}

impl Asn1Encodable for Extensions {
    fn to_asn1_object(&self) -> Asn1Object {
        self.extensions.to_asn1_object()
    }
}

/// `Time ::= CHOICE { utcTime UTCTime, generalTime GeneralizedTime }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Time {
    Utc(UtcTime),
    Generalized(GeneralizedTime),
}

impl Time {
    pub fn to_generalized(&self) -> GeneralizedTime {
        match self {
            Time::Utc(t) => t.to_generalized(),
            Time::Generalized(t) => t.clone(),
        }
    }
}

impl FromAsn1 for Time {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        match object {
            Asn1Object::UtcTime(t) => Ok(Time::Utc(t.clone())),
            Asn1Object::GeneralizedTime(t) => Ok(Time::Generalized(t.clone())),
            other => Err(invalid_choice("Time", other)),
        }
    }
}

impl Asn1Encodable for Time {
    fn to_asn1_object(&self) -> Asn1Object {
        match self {
            Time::Utc(t) => Asn1Object::UtcTime(t.clone()),
            Time::Generalized(t) => Asn1Object::GeneralizedTime(t.clone()),
        }
    }
}

/// ```text
/// GeneralName ::= CHOICE {
///     otherName                  [0] OtherName,
///     rfc822Name                 [1] IA5String,
///     dNSName                    [2] IA5String,
///     x400Address                [3] ORAddress,
///     directoryName              [4] Name,
///     ediPartyName               [5] EDIPartyName,
///     uniformResourceIdentifier  [6] IA5String,
///     iPAddress                  [7] OCTET STRING,
///     registeredID               [8] OBJECT IDENTIFIER }
/// ```
///
/// Implicitly tagged except `directoryName`, whose type is itself a CHOICE.
/// `otherName`, `x400Address` and `ediPartyName` are kept as their
/// decoded SEQUENCE content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneralName {
    OtherName(Sequence),
    Rfc822Name(String),
    DnsName(String),
    X400Address(Sequence),
    DirectoryName(Name),
    EdiPartyName(Sequence),
    Uri(String),
    IpAddress(Bytes),
    RegisteredId(ObjectIdentifier),
}

fn implicit_ia5(tagged: &TaggedObject) -> VellumResult<String> {
    let object = tagged.implicit_as(universal::IA5_STRING)?;
    Ok(object.as_string()?.as_str().to_string())
}

fn implicit_sequence(tagged: &TaggedObject) -> VellumResult<Sequence> {
    Ok(tagged.implicit_sequence()?.as_sequence()?.clone())
}

impl FromAsn1 for GeneralName {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        let Asn1Object::Tagged(tagged) = object else {
            return Err(invalid_choice("GeneralName", object));
        };
        if tagged.class() != BerTagClass::ContextSpecific {
            return Err(invalid_choice("GeneralName", object));
        }
        match tagged.number() {
            0 => Ok(GeneralName::OtherName(implicit_sequence(tagged)?)),
            1 => Ok(GeneralName::Rfc822Name(implicit_ia5(tagged)?)),
            2 => Ok(GeneralName::DnsName(implicit_ia5(tagged)?)),
            3 => Ok(GeneralName::X400Address(implicit_sequence(tagged)?)),
            4 => Ok(GeneralName::DirectoryName(Name::from_asn1(tagged.explicit_inner()?)?)),
            5 => Ok(GeneralName::EdiPartyName(implicit_sequence(tagged)?)),
            6 => Ok(GeneralName::Uri(implicit_ia5(tagged)?)),
            7 => match tagged.content() {
                TaggedContent::Primitive(bytes) => Ok(GeneralName::IpAddress(bytes.clone())),
                TaggedContent::Constructed(_) => {
                    Err(VellumError::structural("iPAddress must be primitive"))
                }
            },
            8 => Ok(GeneralName::RegisteredId(
                tagged
                    .implicit_as(universal::OBJECT_IDENTIFIER)?
                    .as_oid()?
                    .clone(),
            )),
            _ => Err(invalid_choice("GeneralName", object)),
        }
    }
}

impl Asn1Encodable for GeneralName {
    fn to_asn1_object(&self) -> Asn1Object {
        let ia5 = |text: &str| Asn1Object::String(Asn1String::utf8(text));
        let tagged = match self {
            GeneralName::OtherName(seq) => TaggedObject::implicit(0, &seq.clone().into()),
            GeneralName::Rfc822Name(text) => TaggedObject::implicit(1, &ia5(text)),
            GeneralName::DnsName(text) => TaggedObject::implicit(2, &ia5(text)),
            GeneralName::X400Address(seq) => TaggedObject::implicit(3, &seq.clone().into()),
            GeneralName::DirectoryName(name) => TaggedObject::explicit(4, name.to_asn1_object()),
            GeneralName::EdiPartyName(seq) => TaggedObject::implicit(5, &seq.clone().into()),
            GeneralName::Uri(text) => TaggedObject::implicit(6, &ia5(text)),
            GeneralName::IpAddress(bytes) => {
                TaggedObject::implicit(7, &Asn1Object::OctetString(bytes.clone()))
            }
            GeneralName::RegisteredId(oid) => {
                TaggedObject::implicit(8, &Asn1Object::ObjectIdentifier(oid.clone()))
            }
        };
        Asn1Object::Tagged(tagged)
    }
}
