//! # Image Tool Core
//!
//! Presentation layer of the image block: one attachment, its preview,
//! the final image or looping clip, a caption, size controls and tunes.
//! Compiles to WASM so the editor can embed it directly.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                ImageTool                    │
//! │  config · callbacks · saved data            │
//! ├─────────────────────────────────────────────┤
//! │  PresentationMachine                        │
//! │  - Empty / Uploading / Filled               │
//! │  - pending media (one-shot completion)      │
//! ├──────────────┬──────────────┬───────────────┤
//! │ VisualNodeSet│  TuneSet     │ resolve()     │
//! │              │              │ adjust()      │
//! └──────────────┴──────────────┴───────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod data;
pub mod dimensions;
pub mod error;
pub mod machine;
pub mod media;
pub mod node;
pub mod replay;
pub mod state;
pub mod tool;
pub mod tune;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{HostStyles, NoopCallbacks, ToolCallbacks, ToolConfig};
pub use data::{AttachmentData, FileData};
pub use dimensions::{adjust, ResizeDirection, Size};
pub use error::{ToolError, ToolResult};
pub use machine::{CompletionOutcome, IgnoredReason, PresentationMachine};
pub use media::{
    resolve, CompletionEvent, LoadToken, MediaKind, MediaLoad, MediaReady, ResolvedMedia,
};
pub use node::{ClassList, NodeRole, VisualNode, VisualNodeSet};
pub use replay::{replay, Script, Step, StepReport};
pub use state::PresentationState;
pub use tool::{AttachmentId, ImageTool, PendingMediaInfo, Snapshot};
pub use tune::{Tune, TuneSet};

/// Image tool core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
