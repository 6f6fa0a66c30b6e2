//! Tool configuration and host callbacks.

use serde::{Deserialize, Serialize};

use crate::dimensions::ResizeDirection;
use crate::error::ToolResult;
use crate::node::NodeSetOptions;

/// Label of the select-file button when no override is configured.
pub const DEFAULT_FILE_BUTTON_CONTENT: &str = "Select an Image";
/// Label of the upload button when no override is configured.
pub const DEFAULT_UPLOAD_BUTTON_CONTENT: &str = "Upload";
/// Caption placeholder when none is configured.
pub const DEFAULT_CAPTION_PLACEHOLDER: &str = "Caption";

/// Classes the host editor provides for its blocks and controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostStyles {
    /// Block wrapper class.
    pub block: String,
    /// Editable input class.
    pub input: String,
    /// Button class.
    pub button: String,
    /// Loader class.
    pub loader: String,
}

impl Default for HostStyles {
    fn default() -> Self {
        Self {
            block: "cdx-block".to_string(),
            input: "cdx-input".to_string(),
            button: "cdx-button".to_string(),
            loader: "cdx-loader".to_string(),
        }
    }
}

/// Options recognised by the tool, as the host passes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolConfig {
    /// Placeholder shown by an empty caption.
    pub caption_placeholder: String,
    /// Markup replacing the default select/upload button labels.
    pub button_content: Option<String>,
    /// Host classes.
    pub styles: HostStyles,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            caption_placeholder: DEFAULT_CAPTION_PLACEHOLDER.to_string(),
            button_content: None,
            styles: HostStyles::default(),
        }
    }
}

impl ToolConfig {
    /// Parse the host's JSON config. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a key has the wrong type.
    pub fn from_json(json: &str) -> ToolResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Node set options derived from this config.
    #[must_use]
    pub fn node_options(&self, read_only: bool) -> NodeSetOptions<'_> {
        NodeSetOptions {
            block_class: &self.styles.block,
            input_class: &self.styles.input,
            button_class: &self.styles.button,
            loader_class: &self.styles.loader,
            caption_placeholder: &self.caption_placeholder,
            file_button_content: self
                .button_content
                .as_deref()
                .unwrap_or(DEFAULT_FILE_BUTTON_CONTENT),
            upload_button_content: self
                .button_content
                .as_deref()
                .unwrap_or(DEFAULT_UPLOAD_BUTTON_CONTENT),
            read_only,
        }
    }
}

/// Callbacks into the collaborators that do the actual work.
pub trait ToolCallbacks {
    /// The user asked to pick a file.
    fn on_select_file(&mut self);

    /// The user asked to upload the previewed file.
    fn on_upload_file(&mut self);

    /// The user pressed a grow or shrink button.
    fn on_resize(&mut self, direction: ResizeDirection);
}

/// Callbacks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallbacks;

impl ToolCallbacks for NoopCallbacks {
    fn on_select_file(&mut self) {}

    fn on_upload_file(&mut self) {}

    fn on_resize(&mut self, _direction: ResizeDirection) {}
}
