//! Scripted sessions.
//!
//! A script is the sequence of calls a host would make, written as JSON.
//! Replaying it against a fresh widget gives a deterministic end state,
//! which is how the CLI and the integration tests exercise full flows.
//!
//! ```json
//! {
//!   "data": { "file": {} },
//!   "steps": [
//!     { "op": "show_preloader", "url": "blob:preview", "width": 640, "height": 480 },
//!     { "op": "fill_image", "url": "https://cdn.example.com/a.png" },
//!     { "op": "complete" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::data::AttachmentData;
use crate::dimensions::ResizeDirection;
use crate::error::{ToolError, ToolResult};
use crate::machine::CompletionOutcome;
use crate::media::CompletionEvent;
use crate::state::PresentationState;
use crate::tool::ImageTool;

/// One host call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Render saved data.
    Render {
        /// Data to render.
        data: AttachmentData,
    },
    /// Show a preview.
    ShowPreloader {
        /// Preview location.
        url: String,
        /// Width in pixels.
        #[serde(default)]
        width: Option<u32>,
        /// Height in pixels.
        #[serde(default)]
        height: Option<u32>,
    },
    /// Start loading the final media.
    FillImage {
        /// Final location.
        url: String,
    },
    /// Fire a media event for the outstanding request.
    Complete {
        /// Event to fire; defaults to the one the media awaits.
        #[serde(default)]
        event: Option<CompletionEvent>,
    },
    /// Replace the caption.
    FillCaption {
        /// Caption markup.
        text: String,
    },
    /// Return to empty.
    HidePreloader,
    /// Show the spinner.
    ShowSpinner,
    /// Hide the spinner.
    HideSpinner,
    /// Hide all controls.
    HideTools,
    /// Toggle a tune.
    ApplyTune {
        /// Tune name.
        name: String,
        /// Whether to enable it.
        enabled: bool,
    },
    /// Click the select-file button.
    SelectFile,
    /// Click the upload button.
    Upload,
    /// Click a grow or shrink button.
    Resize {
        /// Direction.
        direction: ResizeDirection,
    },
    /// Type into the caption.
    EditCaption {
        /// New markup.
        text: String,
    },
    /// Type into the width input.
    EditWidth {
        /// New value.
        value: String,
    },
    /// Type into the height input.
    EditHeight {
        /// New value.
        value: String,
    },
}

/// A session: optional initial data plus the calls that follow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    /// Data rendered before the first step.
    pub data: Option<AttachmentData>,
    /// Calls in order.
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or names an unknown step.
    pub fn from_json(json: &str) -> ToolResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// State after one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Zero-based step index.
    pub index: usize,
    /// Lifecycle state after the step.
    pub state: PresentationState,
    /// Whether a completion step actually filled the widget.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filled: Option<bool>,
}

/// Replay `script` against `tool`.
///
/// # Errors
///
/// Returns an error if a `complete` step runs while no fill request is outstanding.
pub fn replay(tool: &mut ImageTool, script: &Script) -> ToolResult<Vec<StepReport>> {
    if let Some(data) = &script.data {
        tool.render(data);
    }
    script
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let filled = apply_step(tool, index, step)?;
            Ok(StepReport {
                index,
                state: tool.state(),
                filled,
            })
        })
        .collect()
}

fn apply_step(tool: &mut ImageTool, index: usize, step: &Step) -> ToolResult<Option<bool>> {
    tracing::trace!(index, ?step, "replaying step");
    match step {
        Step::Render { data } => tool.render(data),
        Step::ShowPreloader { url, width, height } => tool.show_preloader(url, *width, *height),
        Step::FillImage { url } => {
            drop(tool.fill_image(url));
        }
        Step::Complete { event } => {
            let pending = tool.pending_media().ok_or_else(|| ToolError::InvalidScript {
                index,
                reason: "no fill request is outstanding".to_string(),
            })?;
            let event = event.unwrap_or(pending.awaiting);
            let outcome = tool.media_event(pending.token, event);
            return Ok(Some(matches!(outcome, CompletionOutcome::Filled(_))));
        }
        Step::FillCaption { text } => tool.fill_caption(text),
        Step::HidePreloader => tool.hide_preloader(),
        Step::ShowSpinner => tool.show_spinner(),
        Step::HideSpinner => tool.hide_spinner(),
        Step::HideTools => tool.hide_tools(),
        Step::ApplyTune { name, enabled } => tool.apply_tune(name, *enabled),
        Step::SelectFile => tool.click_select_file(),
        Step::Upload => tool.click_upload(),
        Step::Resize { direction } => {
            tool.click_resize(*direction);
        }
        Step::EditCaption { text } => tool.edit_caption(text),
        Step::EditWidth { value } => tool.edit_width(value),
        Step::EditHeight { value } => tool.edit_height(value),
    }
    Ok(None)
}
