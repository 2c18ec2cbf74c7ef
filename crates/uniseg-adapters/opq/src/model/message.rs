//! OPQ message type.

use serde::{Deserialize, Serialize};

use super::segment::OpqSegment;

/// An ordered list of OPQ elements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpqMessage {
    segments: Vec<OpqSegment>,
}

impl OpqMessage {
    /// Creates an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text element.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.segments.push(OpqSegment::text(text));
        self
    }

    /// Adds a mention element.
    pub fn at(mut self, uin: i64) -> Self {
        self.segments.push(OpqSegment::at(uin));
        self
    }

    /// Appends an element.
    pub fn push(&mut self, segment: OpqSegment) {
        self.segments.push(segment);
    }

    /// Returns an iterator over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, OpqSegment> {
        self.segments.iter()
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the message has no elements.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the elements as a slice.
    pub fn as_slice(&self) -> &[OpqSegment] {
        &self.segments
    }

    /// Returns all elements of the given type.
    pub fn include<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a OpqSegment> + 'a {
        self.segments.iter().filter(move |seg| seg.kind == kind)
    }

    /// Concatenates the content of all text elements.
    pub fn extract_plain_text(&self) -> String {
        self.segments.iter().filter_map(OpqSegment::as_text).collect()
    }
}

impl From<Vec<OpqSegment>> for OpqMessage {
    fn from(segments: Vec<OpqSegment>) -> Self {
        Self { segments }
    }
}

impl From<OpqSegment> for OpqMessage {
    fn from(segment: OpqSegment) -> Self {
        Self {
            segments: vec![segment],
        }
    }
}

impl From<&str> for OpqMessage {
    fn from(text: &str) -> Self {
        OpqSegment::text(text).into()
    }
}

impl FromIterator<OpqSegment> for OpqMessage {
    fn from_iter<I: IntoIterator<Item = OpqSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a OpqMessage {
    type Item = &'a OpqSegment;
    type IntoIter = std::slice::Iter<'a, OpqSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
