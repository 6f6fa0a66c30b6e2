//! The image tool widget - the surface the host editor talks to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{ToolCallbacks, ToolConfig};
use crate::data::{AttachmentData, FileData};
use crate::dimensions::{ResizeDirection, Size};
use crate::machine::{CompletionOutcome, PresentationMachine};
use crate::media::{CompletionEvent, LoadToken, MediaKind, MediaLoad};
use crate::node::{VisualNode, VisualNodeSet};
use crate::state::PresentationState;

/// Unique identifier for one attachment widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentId(Uuid);

impl AttachmentId {
    /// Create a new unique attachment ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttachmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the host needs to start loading the pending media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingMediaInfo {
    /// Token to quote back with the media event.
    pub token: LoadToken,
    /// Source to load.
    pub url: String,
    /// Image or video.
    pub kind: MediaKind,
    /// Event to report back.
    pub awaiting: CompletionEvent,
}

/// Serializable picture of the widget for hosts that mirror it.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    /// Attachment this snapshot belongs to.
    pub id: AttachmentId,
    /// Lifecycle state.
    pub state: PresentationState,
    /// Width and height as entered.
    pub size: Size,
    /// Outstanding fill request.
    pub pending: Option<PendingMediaInfo>,
    /// Node tree.
    pub nodes: &'a VisualNodeSet,
}

/// One image attachment widget.
pub struct ImageTool {
    id: AttachmentId,
    config: ToolConfig,
    read_only: bool,
    callbacks: Box<dyn ToolCallbacks>,
    machine: PresentationMachine,
    data: AttachmentData,
}

impl std::fmt::Debug for ImageTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageTool")
            .field("id", &self.id)
            .field("read_only", &self.read_only)
            .field("state", &self.machine.state())
            .finish_non_exhaustive()
    }
}

impl ImageTool {
    /// Create a widget. Nothing is shown until [`ImageTool::render`].
    #[must_use]
    pub fn new(config: ToolConfig, read_only: bool, callbacks: Box<dyn ToolCallbacks>) -> Self {
        let nodes = VisualNodeSet::new(&config.node_options(read_only));
        let id = AttachmentId::new();
        tracing::debug!(attachment = %id, read_only, "image tool created");
        let mut machine = PresentationMachine::new(nodes);
        if read_only {
            machine.lock_tools();
        }
        Self {
            id,
            config,
            read_only,
            callbacks,
            machine,
            data: AttachmentData::default(),
        }
    }

    /// Attachment ID, used as a log field.
    #[must_use]
    pub fn id(&self) -> AttachmentId {
        self.id
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Whether the widget was created read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PresentationState {
        self.machine.state()
    }

    /// The underlying state machine.
    #[must_use]
    pub fn machine(&self) -> &PresentationMachine {
        &self.machine
    }

    /// Read-only view of the node tree.
    #[must_use]
    pub fn nodes(&self) -> &VisualNodeSet {
        self.machine.nodes()
    }

    /// Render saved data.
    ///
    /// Without a file the widget is empty; with one it waits in the uploading
    /// state until [`ImageTool::fill_image`] is called. Saved tunes and caption
    /// are applied. Read-only widgets keep their tools hidden in every state.
    pub fn render(&mut self, data: &AttachmentData) {
        let has_file = data.has_file();
        tracing::info!(attachment = %self.id, has_file, "rendering attachment");
        self.data = data.clone();
        self.machine.render(has_file);

        if let Some((width, height)) = data.file.as_ref().and_then(|f| f.size().both()) {
            let mut input = self.machine.input();
            input.width(&width.to_string());
            input.height(&height.to_string());
        }
        for (tune, enabled) in data.tunes() {
            self.machine.apply_tune(tune.as_str(), enabled);
        }
        if let Some(caption) = &data.caption {
            self.machine.fill_caption(caption);
        }
    }

    /// Show a local preview, optionally with the file's pixel size.
    pub fn show_preloader(&mut self, preview_url: &str, width: Option<u32>, height: Option<u32>) {
        tracing::debug!(attachment = %self.id, ?width, ?height, "showing preloader");
        self.machine.show_preloader(preview_url, Size { width, height });
    }

    /// Start loading the final media. The returned future resolves once it is shown.
    ///
    /// The location is only saved once the media has actually been shown.
    pub fn fill_image(&mut self, url: &str) -> MediaLoad {
        tracing::info!(attachment = %self.id, url, "filling image");
        self.machine.fill_image(url)
    }

    /// The outstanding fill request, for the host to load.
    #[must_use]
    pub fn pending_media(&self) -> Option<PendingMediaInfo> {
        self.machine.pending().map(|p| PendingMediaInfo {
            token: p.token(),
            url: p.url().to_string(),
            kind: p.resolved().kind,
            awaiting: p.resolved().completion,
        })
    }

    /// Node the host should load for the outstanding request.
    #[must_use]
    pub fn pending_media_node(&self) -> Option<&VisualNode> {
        self.machine.pending().map(|p| p.node())
    }

    /// Report a media event from the host.
    pub fn media_event(&mut self, token: LoadToken, event: CompletionEvent) -> CompletionOutcome {
        let outcome = self.machine.media_event(token, event);
        match &outcome {
            CompletionOutcome::Filled(ready) => {
                tracing::info!(attachment = %self.id, url = %ready.url, kind = ?ready.kind, "media shown");
                self.data.file.get_or_insert_with(FileData::default).url = Some(ready.url.clone());
            }
            CompletionOutcome::Ignored(reason) => {
                tracing::warn!(attachment = %self.id, %token, ?reason, "media event ignored");
            }
        }
        outcome
    }

    /// Replace the caption markup.
    pub fn fill_caption(&mut self, text: &str) {
        self.machine.fill_caption(text);
    }

    /// Go back to empty after a failed or cancelled upload.
    ///
    /// The saved file is dropped, so saving now yields data that renders empty.
    pub fn hide_preloader(&mut self) {
        tracing::debug!(attachment = %self.id, "hiding preloader");
        self.data.file = None;
        self.machine.hide_preloader();
    }

    /// Show the standalone spinner.
    pub fn show_spinner(&mut self) {
        self.machine.show_spinner();
    }

    /// Hide the standalone spinner.
    pub fn hide_spinner(&mut self) {
        self.machine.hide_spinner();
    }

    /// Hide every control without changing the lifecycle state.
    pub fn hide_tools(&mut self) {
        self.machine.hide_tools();
    }

    /// Toggle a tune by name.
    pub fn apply_tune(&mut self, name: &str, enabled: bool) {
        if self.machine.apply_tune(name, enabled) {
            self.data.set_tune(name, enabled);
        }
    }

    /// Width and height as currently entered.
    #[must_use]
    pub fn get_size(&self) -> Size {
        self.machine.size()
    }

    /// The select-file button was clicked.
    pub fn click_select_file(&mut self) {
        if self.read_only {
            tracing::debug!(attachment = %self.id, "select ignored in read-only mode");
            return;
        }
        self.callbacks.on_select_file();
    }

    /// The upload button was clicked.
    pub fn click_upload(&mut self) {
        if self.read_only {
            tracing::debug!(attachment = %self.id, "upload ignored in read-only mode");
            return;
        }
        self.callbacks.on_upload_file();
    }

    /// A grow or shrink button was clicked.
    ///
    /// Returns the new size, or `None` if width or height is unset, in which
    /// case nothing was resized. The host is told about the click either way.
    pub fn click_resize(&mut self, direction: ResizeDirection) -> Option<(u32, u32)> {
        if self.read_only {
            tracing::debug!(attachment = %self.id, "resize ignored in read-only mode");
            return None;
        }
        let resized = self.machine.resize(direction);
        tracing::debug!(attachment = %self.id, %direction, ?resized, "resize requested");
        self.callbacks.on_resize(direction);
        resized
    }

    /// The user edited the caption.
    pub fn edit_caption(&mut self, markup: &str) {
        if self.read_only {
            return;
        }
        self.machine.input().caption(markup);
    }

    /// The user typed into the width input.
    pub fn edit_width(&mut self, value: &str) {
        if self.read_only {
            return;
        }
        self.machine.input().width(value);
    }

    /// The user typed into the height input.
    pub fn edit_height(&mut self, value: &str) {
        if self.read_only {
            return;
        }
        self.machine.input().height(value);
    }

    /// Current data for the host to persist.
    #[must_use]
    pub fn save(&self) -> AttachmentData {
        let mut data = self.data.clone();
        let nodes = self.machine.nodes();
        data.caption = (!nodes.caption_is_empty()).then(|| nodes.caption().content().to_string());
        if let Some(file) = data.file.as_mut() {
            let size = self.machine.size();
            file.width = size.width;
            file.height = size.height;
        }
        data
    }

    /// Serializable picture of the widget.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            id: self.id,
            state: self.state(),
            size: self.get_size(),
            pending: self.pending_media(),
            nodes: self.nodes(),
        }
    }

    /// Render the node tree as HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.nodes().to_html()
    }
}
