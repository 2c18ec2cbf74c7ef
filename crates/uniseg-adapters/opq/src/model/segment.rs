//! OPQ native message elements.
//!
//! OPQ elements are loosely typed `{type, data}` records. The adapter knows
//! which keys are meaningful per type; this module only provides the record
//! and constructors for the elements the exporter emits.
//!
//! | type    | outbound data                         |
//! |---------|---------------------------------------|
//! | `text`  | `text`                                |
//! | `at`    | `uin` (integer)                       |
//! | `atall` | (empty)                               |
//! | `image` | one of `base64`, `path`, `url`        |

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use uniseg_core::NativeElement;

/// A single OPQ message element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpqSegment {
    /// Element type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Element payload.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl OpqSegment {
    /// Creates an element from a tag and payload.
    pub fn new(kind: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }

    /// Creates an element with a single data entry.
    fn single(kind: &str, key: &str, value: impl Into<Value>) -> Self {
        let mut data = Map::new();
        data.insert(key.to_string(), value.into());
        Self::new(kind, data)
    }

    /// Creates a text element.
    pub fn text(text: impl Into<String>) -> Self {
        Self::single("text", "text", text.into())
    }

    /// Creates a mention element.
    pub fn at(uin: i64) -> Self {
        Self::single("at", "uin", uin)
    }

    /// Creates a mention-everyone element.
    pub fn at_all() -> Self {
        Self::new("atall", Map::new())
    }

    /// Creates an image element from base64-encoded bytes.
    pub fn image_base64(encoded: impl Into<String>) -> Self {
        Self::single("image", "base64", encoded.into())
    }

    /// Creates an image element from a local path.
    pub fn image_path(path: &Path) -> Self {
        Self::single("image", "path", path.to_string_lossy().into_owned())
    }

    /// Creates an image element from a remote URL.
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::single("image", "url", url.into())
    }

    /// Returns the text if this is a text element.
    pub fn as_text(&self) -> Option<&str> {
        if self.kind == "text" {
            self.data.get("text").and_then(Value::as_str)
        } else {
            None
        }
    }
}

impl NativeElement for OpqSegment {
    fn tag(&self) -> &str {
        &self.kind
    }

    fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}
