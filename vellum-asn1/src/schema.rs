//! Building fixed schemas on top of the node model
//!
//! Schema types convert from a decoded [`Asn1Object`] through [`FromAsn1`],
//! walking a SEQUENCE with a [`SequenceReader`], and back through
//! [`Asn1Encodable`], collecting present fields into a [`FieldVector`].
//!
//! OPTIONAL fields absent on the wire stay `None`, and `None` fields are left
//! out of the output. DEFAULT fields are carried as [`Defaulted`] values which
//! remember whether the field was present, so a field that was encoded with
//! its default value is encoded again on the way out.

use bytes::Bytes;

use crate::ber::types::BerTagClass;
use crate::constructed::{Sequence, Set, TaggedObject};
use crate::error::{VellumError, VellumResult};
use crate::object::Asn1Object;
use crate::primitive::{
    Asn1String, BitString, GeneralizedTime, Integer, ObjectIdentifier, UtcTime,
};

/// A value with a canonical node form
pub trait Asn1Encodable {
    fn to_asn1_object(&self) -> Asn1Object;

    /// Canonical DER encoding
    fn to_der(&self) -> Bytes {
        self.to_asn1_object().to_der()
    }

    /// Encoding that keeps decoded indefinite lengths
    fn encode(&self) -> Bytes {
        self.to_asn1_object().encode()
    }
}

/// A value that can be read from a node
///
/// `from_asn1` takes an already decoded node and checks it has the expected
/// shape; `from_der` decodes raw bytes first.
pub trait FromAsn1: Sized {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self>;

    fn from_der(data: &[u8]) -> VellumResult<Self> {
        Self::from_asn1(&crate::decode(data)?)
    }
}

impl Asn1Encodable for Asn1Object {
    fn to_asn1_object(&self) -> Asn1Object {
        self.clone()
    }
}

impl FromAsn1 for Asn1Object {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        Ok(object.clone())
    }
}

macro_rules! leaf_impls {
    ($ty:ty, $variant:ident, $accessor:ident) => {
        impl Asn1Encodable for $ty {
            fn to_asn1_object(&self) -> Asn1Object {
                Asn1Object::$variant(self.clone())
            }
        }

        impl FromAsn1 for $ty {
            fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
                object.$accessor().map(Clone::clone)
            }
        }
    };
}

leaf_impls!(Integer, Integer, as_integer);
leaf_impls!(BitString, BitString, as_bit_string);
leaf_impls!(Bytes, OctetString, as_octet_string);
leaf_impls!(ObjectIdentifier, ObjectIdentifier, as_oid);
leaf_impls!(Asn1String, String, as_string);
leaf_impls!(UtcTime, UtcTime, as_utc_time);
leaf_impls!(GeneralizedTime, GeneralizedTime, as_generalized_time);
leaf_impls!(Sequence, Sequence, as_sequence);
leaf_impls!(Set, Set, as_set);
leaf_impls!(TaggedObject, Tagged, as_tagged);

impl Asn1Encodable for bool {
    fn to_asn1_object(&self) -> Asn1Object {
        Asn1Object::Boolean(*self)
    }
}

impl FromAsn1 for bool {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        object.as_boolean()
    }
}

impl Asn1Encodable for () {
    fn to_asn1_object(&self) -> Asn1Object {
        Asn1Object::Null
    }
}

impl FromAsn1 for () {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        object.as_null()
    }
}

/// Elements of a SEQUENCE OF / SET OF
impl<T: Asn1Encodable> Asn1Encodable for Vec<T> {
    fn to_asn1_object(&self) -> Asn1Object {
        Asn1Object::Sequence(self.iter().map(Asn1Encodable::to_asn1_object).collect())
    }
}

impl<T: FromAsn1> FromAsn1 for Vec<T> {
    fn from_asn1(object: &Asn1Object) -> VellumResult<Self> {
        object.as_sequence()?.iter().map(T::from_asn1).collect()
    }
}

/// A DEFAULT field together with whether it was present on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaulted<T> {
    value: T,
    present: bool,
}

impl<T> Defaulted<T> {
    /// A value that is encoded only when it differs from the default
    pub const fn implied(value: T) -> Self {
        Self {
            value,
            present: false,
        }
    }

    /// A value that is encoded even when it equals the default
    pub const fn present(value: T) -> Self {
        Self {
            value,
            present: true,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// Whether the field is forced into the encoding
    pub fn is_present(&self) -> bool {
        self.present
    }
}

impl<T: Clone> Defaulted<T> {
    /// Read from an optional decoded field, falling back to `default`
    pub fn from_field(field: Option<T>, default: &T) -> Self {
        match field {
            Some(value) => Self::present(value),
            None => Self::implied(default.clone()),
        }
    }
}

/// Sequential reader over the elements of a SEQUENCE
///
/// Every accessor names the schema (`context`) in its errors. Elements left
/// over once the schema is read are reported by [`finish`](Self::finish).
pub struct SequenceReader<'a> {
    elements: &'a [Asn1Object],
    position: usize,
    context: &'static str,
}

impl<'a> SequenceReader<'a> {
    pub fn new(sequence: &'a Sequence, context: &'static str) -> Self {
        Self {
            elements: sequence.elements(),
            position: 0,
            context,
        }
    }

    /// Reader over `object`, which must be a SEQUENCE
    pub fn from_object(object: &'a Asn1Object, context: &'static str) -> VellumResult<Self> {
        let sequence = object.as_sequence().map_err(|e| {
            VellumError::structural(format!("{}: {}", context, strip_prefix(&e)))
        })?;
        Ok(Self::new(sequence, context))
    }

    pub fn remaining(&self) -> usize {
        self.elements.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn peek(&self) -> Option<&'a Asn1Object> {
        self.elements.get(self.position)
    }

    /// Names the element just consumed in a structural error
    fn wrap(&self, error: VellumError) -> VellumError {
        match error {
            VellumError::Structural(message) => VellumError::Structural(format!(
                "{} element {}: {}",
                self.context,
                self.position.saturating_sub(1),
                message
            )),
            other => other,
        }
    }

    /// The next element, which must exist
    pub fn next_object(&mut self) -> VellumResult<&'a Asn1Object> {
        let Some(object) = self.elements.get(self.position) else {
            return Err(VellumError::structural(format!(
                "{}: missing element {}",
                self.context, self.position
            )));
        };
        self.position += 1;
        Ok(object)
    }

    /// The next element, read as `T`
    pub fn next<T: FromAsn1>(&mut self) -> VellumResult<T> {
        let object = self.next_object()?;
        T::from_asn1(object).map_err(|e| self.wrap(e))
    }

    /// The next element if it carries universal tag `universal_number`
    pub fn next_optional<T: FromAsn1>(&mut self, universal_number: u32) -> VellumResult<Option<T>> {
        match self.peek() {
            Some(object) if object.tag().is_universal(universal_number) => self.next().map(Some),
            _ => Ok(None),
        }
    }

    /// The next element if it is the context-specific tag `number`
    pub fn next_tagged(&mut self, number: u32) -> Option<&'a TaggedObject> {
        match self.peek() {
            Some(Asn1Object::Tagged(tagged))
                if tagged.class() == BerTagClass::ContextSpecific && tagged.number() == number =>
            {
                self.position += 1;
                Some(tagged)
            }
            _ => None,
        }
    }

    /// `[number] EXPLICIT T OPTIONAL`
    pub fn next_explicit<T: FromAsn1>(&mut self, number: u32) -> VellumResult<Option<T>> {
        let Some(tagged) = self.next_tagged(number) else {
            return Ok(None);
        };
        tagged
            .explicit_inner()
            .and_then(T::from_asn1)
            .map(Some)
            .map_err(|e| self.wrap(e))
    }

    /// `[number] IMPLICIT T OPTIONAL`, where T is the universal type
    /// `universal_number`
    pub fn next_implicit<T: FromAsn1>(
        &mut self,
        number: u32,
        universal_number: u32,
    ) -> VellumResult<Option<T>> {
        let Some(tagged) = self.next_tagged(number) else {
            return Ok(None);
        };
        tagged
            .implicit_as(universal_number)
            .and_then(|object| T::from_asn1(&object))
            .map(Some)
            .map_err(|e| self.wrap(e))
    }

    /// Fails if any element was not consumed
    pub fn finish(self) -> VellumResult<()> {
        if self.position < self.elements.len() {
            return Err(VellumError::structural(format!(
                "{}: {} unexpected trailing element(s), first is {}",
                self.context,
                self.elements.len() - self.position,
                self.elements[self.position].kind_name()
            )));
        }
        Ok(())
    }
}

fn strip_prefix(error: &VellumError) -> String {
    match error {
        VellumError::Structural(message) => message.clone(),
        other => other.to_string(),
    }
}

/// Accumulates the present fields of a schema value, in order
#[derive(Debug, Clone, Default)]
pub struct FieldVector {
    elements: Vec<Asn1Object>,
}

impl FieldVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T: Asn1Encodable + ?Sized>(&mut self, value: &T) -> &mut Self {
        self.elements.push(value.to_asn1_object());
        self
    }

    pub fn push_object(&mut self, object: Asn1Object) -> &mut Self {
        self.elements.push(object);
        self
    }

    pub fn push_optional<T: Asn1Encodable>(&mut self, value: Option<&T>) -> &mut Self {
        if let Some(value) = value {
            self.push(value);
        }
        self
    }

    /// `[number] EXPLICIT value`
    pub fn push_explicit<T: Asn1Encodable + ?Sized>(&mut self, number: u32, value: &T) -> &mut Self {
        self.push_object(Asn1Object::Tagged(TaggedObject::explicit(
            number,
            value.to_asn1_object(),
        )))
    }

    pub fn push_explicit_optional<T: Asn1Encodable>(&mut self, number: u32, value: Option<&T>) -> &mut Self {
        if let Some(value) = value {
            self.push_explicit(number, value);
        }
        self
    }

    /// `[number] IMPLICIT value`
    pub fn push_implicit<T: Asn1Encodable + ?Sized>(&mut self, number: u32, value: &T) -> &mut Self {
        self.push_object(Asn1Object::Tagged(TaggedObject::implicit(
            number,
            &value.to_asn1_object(),
        )))
    }

    pub fn push_implicit_optional<T: Asn1Encodable>(&mut self, number: u32, value: Option<&T>) -> &mut Self {
        if let Some(value) = value {
            self.push_implicit(number, value);
        }
        self
    }

    /// A DEFAULT field: left out when equal to `default`, unless
    /// `explicitly_present` is set
    pub fn push_default<T: Asn1Encodable + PartialEq>(
        &mut self,
        value: &T,
        default: &T,
        explicitly_present: bool,
    ) -> &mut Self {
        if explicitly_present || value != default {
            self.push(value);
        }
        self
    }

    /// A [`Defaulted`] field
    pub fn push_defaulted<T: Asn1Encodable + PartialEq>(
        &mut self,
        value: &Defaulted<T>,
        default: &T,
    ) -> &mut Self {
        self.push_default(value.value(), default, value.is_present())
    }

    /// `[number] EXPLICIT` [`Defaulted`] field
    pub fn push_explicit_defaulted<T: Asn1Encodable + PartialEq>(
        &mut self,
        number: u32,
        value: &Defaulted<T>,
        default: &T,
    ) -> &mut Self {
        if value.is_present() || value.value() != default {
            self.push_explicit(number, value.value());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn into_sequence(self) -> Asn1Object {
        Asn1Object::Sequence(Sequence::new(self.elements))
    }

    pub fn into_set(self) -> Asn1Object {
        Asn1Object::Set(Set::new(self.elements))
    }

    pub fn into_vec(self) -> Vec<Asn1Object> {
        self.elements
    }
}

/// Maps a context tag number outside a schema's fields to
/// [`VellumError::UnknownTag`]
pub fn unknown_tag(context: &'static str, tagged: &TaggedObject) -> VellumError {
    VellumError::UnknownTag {
        context,
        tag: tagged.number(),
    }
}

/// Maps a CHOICE alternative mismatch to [`VellumError::InvalidChoice`]
pub fn invalid_choice(choice: &'static str, object: &Asn1Object) -> VellumError {
    let tag = object.tag();
    let tag = match tag.class() {
        BerTagClass::Universal => format!("UNIVERSAL {}", tag.number()),
        BerTagClass::Application => format!("[APPLICATION {}]", tag.number()),
        BerTagClass::ContextSpecific => format!("[{}]", tag.number()),
        BerTagClass::Private => format!("[PRIVATE {}]", tag.number()),
    };
    VellumError::InvalidChoice { choice, tag }
}
