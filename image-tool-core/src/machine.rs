//! Presentation state machine.
//!
//! Owns the node set and the lifecycle state and is the only code allowed to
//! change which nodes are shown and which lifecycle class the wrapper carries.
//!
//! ```text
//!            render(no file) / hide
//!      ┌──────────────────────────────┐
//!      ▼                              │
//!   Empty ──preview──▶ Uploading ──media ready──▶ Filled
//!      ▲                  │                         │
//!      └──────hide────────┴──────────hide───────────┘
//! ```

use serde::Serialize;

use crate::dimensions::{adjust, ResizeDirection, Size};
use crate::media::{
    resolve, CompletionEvent, LoadToken, MediaLoad, MediaReady, PendingMedia, SubscribedMedia,
};
use crate::node::VisualNodeSet;
use crate::state::{set_exclusive_state, PresentationState};
use crate::tune::{Tune, TuneSet};

/// Why a media event did not fill the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    /// No fill request is outstanding.
    NoPendingLoad,
    /// The event belongs to a request a newer fill replaced.
    Superseded,
    /// The event is not the one the media waits for.
    UnexpectedEvent,
}

/// Outcome of delivering a media event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The media was injected and the widget is now filled.
    Filled(MediaReady),
    /// The event was dropped.
    Ignored(IgnoredReason),
}

/// Lifecycle state plus the visual nodes it drives.
#[derive(Debug)]
pub struct PresentationMachine {
    state: PresentationState,
    nodes: VisualNodeSet,
    tunes: TuneSet,
    pending: Option<PendingMedia>,
    next_token: u32,
    tools_locked: bool,
}

impl PresentationMachine {
    /// Take ownership of `nodes` and put them in the empty state.
    #[must_use]
    pub fn new(nodes: VisualNodeSet) -> Self {
        let mut machine = Self {
            state: PresentationState::Empty,
            nodes,
            tunes: TuneSet::default(),
            pending: None,
            next_token: 0,
            tools_locked: false,
        };
        machine.enter(PresentationState::Empty);
        machine
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PresentationState {
        self.state
    }

    /// Read-only view of the node set.
    #[must_use]
    pub fn nodes(&self) -> &VisualNodeSet {
        &self.nodes
    }

    /// Active tunes.
    #[must_use]
    pub fn tunes(&self) -> &TuneSet {
        &self.tunes
    }

    /// The outstanding fill request, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingMedia> {
        self.pending.as_ref()
    }

    /// Keep every control hidden from now on, whatever state is entered.
    pub fn lock_tools(&mut self) {
        self.tools_locked = true;
        self.hide_tools();
    }

    /// Whether controls stay hidden across transitions.
    #[must_use]
    pub fn tools_locked(&self) -> bool {
        self.tools_locked
    }

    /// Enter the initial state for saved data: empty without a file, uploading with one.
    pub fn render(&mut self, has_file: bool) {
        let next = if has_file {
            PresentationState::Uploading
        } else {
            PresentationState::Empty
        };
        self.transition(next);
    }

    /// Show a local preview while the final media uploads.
    pub fn show_preloader(&mut self, preview_url: &str, size: Size) {
        self.nodes.set_preloader_background(Some(preview_url));
        if let Some((width, height)) = size.both() {
            self.nodes.set_dimension_inputs(width, height);
            self.nodes.set_preloader_background_size(width, height);
        }
        self.transition(PresentationState::Uploading);
    }

    /// Start loading the final media.
    ///
    /// The completion subscriber is registered before the source is assigned.
    /// Any earlier outstanding request is superseded and its future yields `None`.
    pub fn fill_image(&mut self, url: &str) -> MediaLoad {
        self.next_token = self.next_token.wrapping_add(1);
        let token = LoadToken(self.next_token);
        let resolved = resolve(url);
        let (subscribed, load) = SubscribedMedia::subscribe(token, resolved);
        if let Some(previous) = self.pending.replace(subscribed.assign_source(url)) {
            tracing::debug!(superseded = %previous.token(), by = %token, "fill request replaced");
        }
        tracing::debug!(
            %token,
            kind = ?resolved.kind,
            awaiting = resolved.completion.as_str(),
            "media source assigned"
        );
        load
    }

    /// Deliver a media event for the request identified by `token`.
    ///
    /// On the awaited event the media node is injected and the lifecycle class
    /// flips to filled within the same call.
    pub fn media_event(&mut self, token: LoadToken, event: CompletionEvent) -> CompletionOutcome {
        let reason = match &self.pending {
            None => Some(IgnoredReason::NoPendingLoad),
            Some(p) if p.token() != token => Some(IgnoredReason::Superseded),
            Some(p) if !p.awaits(event) => Some(IgnoredReason::UnexpectedEvent),
            Some(_) => None,
        };
        if let Some(reason) = reason {
            tracing::debug!(%token, event = event.as_str(), ?reason, "media event ignored");
            return CompletionOutcome::Ignored(reason);
        }
        let Some(pending) = self.pending.take() else {
            return CompletionOutcome::Ignored(IgnoredReason::NoPendingLoad);
        };

        let (node, ready) = pending.complete();
        self.nodes.insert_media(node);
        self.transition(PresentationState::Filled);
        self.nodes.set_preloader_background(None);
        CompletionOutcome::Filled(ready)
    }

    /// Replace the caption markup.
    pub fn fill_caption(&mut self, text: &str) {
        self.nodes.set_caption(text);
    }

    /// Return to empty, e.g. after a failed or cancelled upload.
    pub fn hide_preloader(&mut self) {
        self.nodes.set_preloader_background(None);
        self.transition(PresentationState::Empty);
    }

    /// Show the standalone spinner.
    pub fn show_spinner(&mut self) {
        self.nodes.set_spinner_visible(true);
    }

    /// Hide the standalone spinner.
    pub fn hide_spinner(&mut self) {
        self.nodes.set_spinner_visible(false);
    }

    /// Hide every control, including the select-file button. The lifecycle class is kept.
    pub fn hide_tools(&mut self) {
        self.nodes.set_preloader_visible(false);
        self.nodes.set_size_controls_visible(false);
        self.nodes.set_upload_visible(false);
        self.nodes.set_file_button_visible(false);
    }

    /// Toggle a tune. Returns whether it was applied.
    pub fn apply_tune(&mut self, name: &str, enabled: bool) -> bool {
        let applied = self.tunes.apply(self.nodes.wrapper_classes_mut(), name, enabled);
        if applied && name == Tune::Caption.as_str() {
            self.nodes.set_caption_visible(enabled);
        }
        applied
    }

    /// One grow/shrink step. Returns the new size, or `None` if a dimension is unset.
    pub fn resize(&mut self, direction: ResizeDirection) -> Option<(u32, u32)> {
        let (width, height) = self.nodes.dimension_inputs();
        let (width, height) = adjust(width, height, direction)?;
        self.nodes.set_dimension_inputs(width, height);
        self.nodes.set_preloader_background_size(width, height);
        Some((width, height))
    }

    /// Width and height as currently entered.
    #[must_use]
    pub fn size(&self) -> Size {
        let (width, height) = self.nodes.dimension_inputs();
        Size::from_inputs(width, height)
    }

    /// Direct access for user edits of the caption and size inputs.
    pub fn input(&mut self) -> InputSurface<'_> {
        InputSurface {
            nodes: &mut self.nodes,
        }
    }

    fn transition(&mut self, next: PresentationState) {
        tracing::debug!(from = ?self.state, to = ?next, "state transition");
        self.enter(next);
    }

    fn enter(&mut self, next: PresentationState) {
        match next {
            PresentationState::Empty => {
                self.nodes.set_preloader_visible(false);
                self.nodes.set_size_controls_visible(false);
                self.nodes.set_upload_visible(false);
                self.nodes.set_file_button_visible(true);
            }
            PresentationState::Uploading => {
                self.nodes.set_preloader_visible(true);
                self.nodes.set_size_controls_visible(true);
                self.nodes.set_upload_visible(true);
            }
            PresentationState::Filled => {}
        }
        if self.tools_locked {
            self.hide_tools();
        }
        set_exclusive_state(self.nodes.wrapper_classes_mut(), next);
        self.state = next;
    }
}

/// The parts of the node set that accept user input directly.
#[derive(Debug)]
pub struct InputSurface<'a> {
    nodes: &'a mut VisualNodeSet,
}

impl InputSurface<'_> {
    /// User typed into the caption.
    pub fn caption(&mut self, markup: &str) {
        self.nodes.set_caption(markup);
    }

    /// User typed into the width input.
    pub fn width(&mut self, value: &str) {
        self.nodes.set_width_input(value);
    }

    /// User typed into the height input.
    pub fn height(&mut self, value: &str) {
        self.nodes.set_height_input(value);
    }
}
