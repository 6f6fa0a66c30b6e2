//! Attachment data exchanged with the host editor.

use serde::{Deserialize, Serialize};

use crate::dimensions::Size;
use crate::error::ToolResult;
use crate::tune::Tune;

/// File metadata. Only `url` and the preload size are read; other keys are
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileData {
    /// Final media location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Preload width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Preload height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Anything else the upload collaborator stored.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FileData {
    /// Whether the object carries no keys at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.width.is_none() && self.height.is_none() && self.extra.is_empty()
    }

    /// Preload size.
    #[must_use]
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }
}

/// Saved state of one image block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttachmentData {
    /// File metadata; absent or `{}` means nothing was selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileData>,
    /// Caption markup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Border tune.
    pub with_border: bool,
    /// Background tune.
    pub with_background: bool,
    /// Stretched tune.
    pub stretched: bool,
    /// Caption tune.
    pub with_caption: bool,
}

impl AttachmentData {
    /// Parse saved data from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a key has the wrong type.
    pub fn from_json(json: &str) -> ToolResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> ToolResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whether a non-empty file object is present.
    #[must_use]
    pub fn has_file(&self) -> bool {
        self.file.as_ref().is_some_and(|f| !f.is_empty())
    }

    /// Saved tune flags.
    #[must_use]
    pub fn tunes(&self) -> [(Tune, bool); 4] {
        [
            (Tune::Border, self.with_border),
            (Tune::Background, self.with_background),
            (Tune::Stretched, self.stretched),
            (Tune::Caption, self.with_caption),
        ]
    }

    /// Set a saved tune flag. Unknown names are not persisted.
    pub fn set_tune(&mut self, name: &str, enabled: bool) {
        match name {
            "border" => self.with_border = enabled,
            "background" => self.with_background = enabled,
            "stretched" => self.stretched = enabled,
            "caption" => self.with_caption = enabled,
            _ => {}
        }
    }
}
