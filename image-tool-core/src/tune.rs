//! Tunes - independent visual modifiers on the wrapper.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::node::{modifier_class, ClassList};
use crate::state::PresentationState;

/// Tunes the host editor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tune {
    /// Draw a border around the media.
    Border,
    /// Put the media on a background and centre it.
    Background,
    /// Stretch the media to the full block width.
    Stretched,
    /// Show the caption surface.
    Caption,
}

impl Tune {
    /// All known tunes.
    pub const ALL: [Self; 4] = [Self::Border, Self::Background, Self::Stretched, Self::Caption];

    /// Identifier passed to [`TuneSet::apply`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Border => "border",
            Self::Background => "background",
            Self::Stretched => "stretched",
            Self::Caption => "caption",
        }
    }
}

impl std::fmt::Display for Tune {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active tunes. Names are stored as given; the host is trusted to pass
/// identifiers its stylesheet knows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TuneSet(BTreeSet<String>);

impl TuneSet {
    /// Toggle `name` and its wrapper class.
    ///
    /// Names that collide with a lifecycle class are refused so a tune can
    /// never change the lifecycle state. Returns whether the tune was applied.
    pub fn apply(&mut self, classes: &mut ClassList, name: &str, enabled: bool) -> bool {
        if PresentationState::is_lifecycle_suffix(name) {
            tracing::warn!(tune = name, "refusing tune that shadows a lifecycle class");
            return false;
        }
        if enabled {
            self.0.insert(name.to_string());
        } else {
            self.0.remove(name);
        }
        classes.toggle(&modifier_class(name), enabled);
        true
    }

    /// Whether `name` is active.
    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Iterate active tune names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
