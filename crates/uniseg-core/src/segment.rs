//! Universal message segments.
//!
//! A [`Segment`] is the platform-agnostic unit of message content. Adapters
//! translate their native elements into segments on the way in and back into
//! native elements on the way out.
//!
//! # Example
//!
//! ```rust,ignore
//! use uniseg_core::{Segment, UniMessage};
//!
//! let msg = UniMessage::new()
//!     .text("Hello, ")
//!     .at("10001000")
//!     .image_url("https://example.com/a.png");
//!
//! assert_eq!(msg.extract_plain_text(), "Hello, ");
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Segment Enum
// ============================================================================

/// A universal message segment.
///
/// Each variant only carries the fields that are meaningful for its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Segment {
    /// Plain text.
    Text(Text),
    /// Mention of a single user.
    At(At),
    /// Mention of everyone in the conversation.
    AtAll(AtAll),
    /// Picture.
    Image(Image),
    /// Arbitrary file.
    File(File),
    /// Video clip.
    Video(Media),
    /// Voice message.
    Voice(Media),
    /// Reply to an earlier message.
    Reply(Reply),
    /// Platform emoji / face.
    Emoji(Emoji),
    /// Rich card in XML or JSON.
    Hyper(Hyper),
    /// Forwarded message reference.
    Reference(Reference),
}

impl Segment {
    /// Returns the kind name of this segment (e.g. `"text"`, `"image"`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::At(_) => "at",
            Self::AtAll(_) => "at_all",
            Self::Image(_) => "image",
            Self::File(_) => "file",
            Self::Video(_) => "video",
            Self::Voice(_) => "voice",
            Self::Reply(_) => "reply",
            Self::Emoji(_) => "emoji",
            Self::Hyper(_) => "hyper",
            Self::Reference(_) => "reference",
        }
    }

    /// Returns true if this is a text segment.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Returns the text content if this is a text segment.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(&t.text),
            _ => None,
        }
    }

    // --------------------------------
    // Constructors
    // --------------------------------

    /// Creates a text segment.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(Text { text: text.into() })
    }

    /// Creates a mention segment.
    pub fn at(target: impl Into<String>) -> Self {
        Self::At(At {
            target: target.into(),
        })
    }

    /// Creates a mention-everyone segment.
    pub fn at_all() -> Self {
        Self::AtAll(AtAll {})
    }

    /// Creates an image segment pointing at a remote URL.
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::Image(Image {
            url: Some(url.into()),
            ..Default::default()
        })
    }

    /// Creates an image segment backed by a local file.
    pub fn image_path(path: impl Into<PathBuf>) -> Self {
        Self::Image(Image {
            path: Some(path.into()),
            ..Default::default()
        })
    }

    /// Creates an image segment from raw bytes.
    pub fn image_raw(raw: impl Into<Vec<u8>>) -> Self {
        Self::Image(Image {
            raw: Some(raw.into()),
            ..Default::default()
        })
    }

    /// Creates a file segment backed by a local file.
    pub fn file_path(path: impl Into<PathBuf>, name: Option<String>) -> Self {
        Self::File(File {
            path: Some(path.into()),
            name,
            ..Default::default()
        })
    }

    /// Creates a reply segment referring to a message id.
    pub fn reply(id: impl Into<String>) -> Self {
        Self::Reply(Reply::new(id))
    }
}

impl From<&str> for Segment {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Segment {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

// ============================================================================
// Segment Data Types
// ============================================================================

/// Plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    /// The text content.
    pub text: String,
}

/// Mention of a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct At {
    /// Platform identity of the mentioned user, as a string.
    pub target: String,
}

/// Mention of everyone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AtAll {}

/// Picture.
///
/// Outbound exporters pick the first available source in the order
/// `raw`, `path`, `url`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Image {
    /// Platform resource id (hash or file id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Remote URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Local file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Embedded bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Vec<u8>>,
    /// Width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Arbitrary file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct File {
    /// Platform resource id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Remote URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Local file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Embedded bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Vec<u8>>,
}

/// Video or voice clip.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Media {
    /// Platform resource id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Remote URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Local file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Embedded bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Vec<u8>>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: u64,
}

/// Reply to an earlier message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Reply {
    /// Id of the message being replied to.
    pub id: String,
    /// Quoted content, if the platform provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Platform correlation data needed to address the original message
    /// (for example sequence number, timestamp and sender uid).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl Reply {
    /// Creates a reply with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: None,
            meta: Map::new(),
        }
    }

    /// Attaches a correlation field.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// Platform emoji / face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    /// Emoji id.
    pub id: String,
    /// Emoji name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Rich card format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HyperFormat {
    /// XML card.
    Xml,
    /// JSON card.
    Json,
}

/// Rich card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyper {
    /// Card format.
    pub format: HyperFormat,
    /// Raw card payload.
    pub raw: String,
}

/// Forwarded message reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reference {
    /// Forward id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

// ============================================================================
// UniMessage
// ============================================================================

/// An ordered sequence of universal segments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniMessage {
    segments: Vec<Segment>,
}

impl UniMessage {
    /// Creates an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a message from segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Appends a segment.
    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.segments.push(segment.into());
    }

    /// Adds a text segment.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment::text(text));
        self
    }

    /// Adds a mention segment.
    pub fn at(mut self, target: impl Into<String>) -> Self {
        self.segments.push(Segment::at(target));
        self
    }

    /// Adds a mention-everyone segment.
    pub fn at_all(mut self) -> Self {
        self.segments.push(Segment::at_all());
        self
    }

    /// Adds an image by URL.
    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.segments.push(Segment::image_url(url));
        self
    }

    /// Adds a reply segment.
    pub fn reply(mut self, id: impl Into<String>) -> Self {
        self.segments.push(Segment::reply(id));
        self
    }

    /// Returns an iterator over the segments.
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the message has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the segments as a slice.
    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    /// Concatenates the content of all text segments.
    pub fn extract_plain_text(&self) -> String {
        self.segments.iter().filter_map(Segment::as_text).collect()
    }

    /// Returns the first reply segment, if any.
    pub fn reply_to(&self) -> Option<&Reply> {
        self.segments.iter().find_map(|seg| match seg {
            Segment::Reply(r) => Some(r),
            _ => None,
        })
    }
}

impl From<Vec<Segment>> for UniMessage {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl From<Segment> for UniMessage {
    fn from(segment: Segment) -> Self {
        Self {
            segments: vec![segment],
        }
    }
}

impl From<&str> for UniMessage {
    fn from(text: &str) -> Self {
        Segment::text(text).into()
    }
}

impl FromIterator<Segment> for UniMessage {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for UniMessage {
    type Item = Segment;
    type IntoIter = std::vec::IntoIter<Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter()
    }
}

impl<'a> IntoIterator for &'a UniMessage {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
