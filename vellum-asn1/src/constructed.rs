//! Composite nodes: SEQUENCE, SET, tagged values and unrecognised elements

use bytes::Bytes;

use crate::ber::types::{BerTag, BerTagClass, universal};
use crate::error::{VellumError, VellumResult};
use crate::object::Asn1Object;

/// SEQUENCE / SEQUENCE OF
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    elements: Vec<Asn1Object>,
    indefinite: bool,
}

impl Sequence {
    pub fn new(elements: Vec<Asn1Object>) -> Self {
        Self {
            elements,
            indefinite: false,
        }
    }

    pub(crate) fn decoded(elements: Vec<Asn1Object>, indefinite: bool) -> Self {
        Self {
            elements,
            indefinite,
        }
    }

    pub fn elements(&self) -> &[Asn1Object] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Asn1Object> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Asn1Object> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Asn1Object> {
        self.elements.iter()
    }

    /// Whether the value was read with an indefinite length
    pub fn is_indefinite(&self) -> bool {
        self.indefinite
    }
}

impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl Eq for Sequence {}

impl FromIterator<Asn1Object> for Sequence {
    fn from_iter<I: IntoIterator<Item = Asn1Object>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Asn1Object;
    type IntoIter = std::slice::Iter<'a, Asn1Object>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// SET / SET OF
///
/// Elements keep the order they were given or decoded in; the DER form
/// sorts them by their encodings.
#[derive(Debug, Clone, Default)]
pub struct Set {
    elements: Vec<Asn1Object>,
    indefinite: bool,
}

impl Set {
    pub fn new(elements: Vec<Asn1Object>) -> Self {
        Self {
            elements,
            indefinite: false,
        }
    }

    pub(crate) fn decoded(elements: Vec<Asn1Object>, indefinite: bool) -> Self {
        Self {
            elements,
            indefinite,
        }
    }

    pub fn elements(&self) -> &[Asn1Object] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Asn1Object> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Asn1Object> {
        self.elements.iter()
    }

    pub fn is_indefinite(&self) -> bool {
        self.indefinite
    }

    /// Elements in DER order
    pub fn sorted_elements(&self) -> Vec<Asn1Object> {
        let mut elements = self.elements.clone();
        elements.sort();
        elements
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.sorted_elements() == other.sorted_elements()
    }
}

impl Eq for Set {}

impl FromIterator<Asn1Object> for Set {
    fn from_iter<I: IntoIterator<Item = Asn1Object>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Content of a tagged or unrecognised element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaggedContent {
    /// Raw content octets of a primitive element
    Primitive(Bytes),
    /// Decoded children of a constructed element
    Constructed(Vec<Asn1Object>),
}

/// A value under an application, context-specific or private tag
///
/// Whether the tagging is explicit or implicit is not recorded on the wire;
/// the schema reading the value decides, through
/// [`explicit_inner`](Self::explicit_inner) or
/// [`implicit_as`](Self::implicit_as).
#[derive(Debug, Clone)]
pub struct TaggedObject {
    class: BerTagClass,
    number: u32,
    content: TaggedContent,
    indefinite: bool,
}

impl TaggedObject {
    /// `[number] EXPLICIT inner` in the context-specific class
    pub fn explicit(number: u32, inner: Asn1Object) -> Self {
        Self::explicit_with_class(BerTagClass::ContextSpecific, number, inner)
    }

    pub fn explicit_with_class(class: BerTagClass, number: u32, inner: Asn1Object) -> Self {
        Self {
            class,
            number,
            content: TaggedContent::Constructed(vec![inner]),
            indefinite: false,
        }
    }

    /// `[number] IMPLICIT inner` in the context-specific class
    ///
    /// The inner tag is dropped; a constructed inner value keeps its children.
    pub fn implicit(number: u32, inner: &Asn1Object) -> Self {
        Self::implicit_with_class(BerTagClass::ContextSpecific, number, inner)
    }

    pub fn implicit_with_class(class: BerTagClass, number: u32, inner: &Asn1Object) -> Self {
        let content = match inner {
            Asn1Object::Sequence(seq) => TaggedContent::Constructed(seq.elements().to_vec()),
            Asn1Object::Set(set) => TaggedContent::Constructed(set.sorted_elements()),
            Asn1Object::Tagged(tagged) => tagged.content.clone(),
            Asn1Object::Unknown(raw) => raw.content().clone(),
            leaf => TaggedContent::Primitive(leaf.primitive_content()),
        };
        Self {
            class,
            number,
            content,
            indefinite: false,
        }
    }

    pub(crate) fn decoded(
        class: BerTagClass,
        number: u32,
        content: TaggedContent,
        indefinite: bool,
    ) -> Self {
        Self {
            class,
            number,
            content,
            indefinite,
        }
    }

    pub fn class(&self) -> BerTagClass {
        self.class
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn content(&self) -> &TaggedContent {
        &self.content
    }

    pub fn is_constructed(&self) -> bool {
        matches!(self.content, TaggedContent::Constructed(_))
    }

    pub fn is_indefinite(&self) -> bool {
        self.indefinite
    }

    pub fn tag(&self) -> BerTag {
        BerTag::new(self.class, self.is_constructed(), self.number)
    }

    /// The value under an explicit tag
    ///
    /// # Errors
    /// [`VellumError::Structural`] unless the content is exactly one
    /// constructed child.
    pub fn explicit_inner(&self) -> VellumResult<&Asn1Object> {
        match &self.content {
            TaggedContent::Constructed(children) if children.len() == 1 => Ok(&children[0]),
            TaggedContent::Constructed(children) => Err(VellumError::structural(format!(
                "explicit tag [{}] must wrap exactly one value, found {}",
                self.number,
                children.len()
            ))),
            TaggedContent::Primitive(_) => Err(VellumError::structural(format!(
                "explicit tag [{}] must be constructed",
                self.number
            ))),
        }
    }

    /// Re-read the content as the universal type `universal_number`
    pub fn implicit_as(&self, universal_number: u32) -> VellumResult<Asn1Object> {
        match &self.content {
            TaggedContent::Primitive(content) => {
                Asn1Object::from_universal_primitive(universal_number, content.clone(), false)
            }
            TaggedContent::Constructed(children) => Asn1Object::from_universal_constructed(
                universal_number,
                children.clone(),
                self.indefinite,
                false,
            ),
        }
    }

    /// Shorthand for `implicit_as(SEQUENCE)`
    pub fn implicit_sequence(&self) -> VellumResult<Asn1Object> {
        self.implicit_as(universal::SEQUENCE)
    }
}

impl PartialEq for TaggedObject {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.number == other.number && self.content == other.content
    }
}

impl Eq for TaggedObject {}

/// A universal element whose tag number has no dedicated node type
///
/// Kept raw so that callers can interpret it themselves.
#[derive(Debug, Clone)]
pub struct RawElement {
    number: u32,
    content: TaggedContent,
    indefinite: bool,
}

impl RawElement {
    pub fn new(number: u32, content: TaggedContent) -> Self {
        Self {
            number,
            content,
            indefinite: false,
        }
    }

    pub(crate) fn decoded(number: u32, content: TaggedContent, indefinite: bool) -> Self {
        Self {
            number,
            content,
            indefinite,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn content(&self) -> &TaggedContent {
        &self.content
    }

    pub fn is_indefinite(&self) -> bool {
        self.indefinite
    }

    pub fn tag(&self) -> BerTag {
        BerTag::universal(
            matches!(self.content, TaggedContent::Constructed(_)),
            self.number,
        )
    }
}

impl PartialEq for RawElement {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number && self.content == other.content
    }
}

impl Eq for RawElement {}
