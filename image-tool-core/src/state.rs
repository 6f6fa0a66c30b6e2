//! Lifecycle state of the attachment.

use serde::{Deserialize, Serialize};

use crate::node::{modifier_class, ClassList};

/// Lifecycle state, reflected as exactly one modifier class on the wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationState {
    /// Nothing selected yet.
    #[default]
    Empty,
    /// A preview is shown while the final media is pending.
    Uploading,
    /// The final media is on screen.
    Filled,
}

impl PresentationState {
    /// Suffix of the wrapper modifier class.
    #[must_use]
    pub const fn class_suffix(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Uploading => "loading",
            Self::Filled => "filled",
        }
    }

    /// Full wrapper modifier class, e.g. `image-tool--loading`.
    #[must_use]
    pub fn class_name(self) -> String {
        modifier_class(self.class_suffix())
    }

    /// The two states that must be cleared when entering `self`.
    #[must_use]
    pub const fn others(self) -> [Self; 2] {
        match self {
            Self::Empty => [Self::Uploading, Self::Filled],
            Self::Uploading => [Self::Empty, Self::Filled],
            Self::Filled => [Self::Empty, Self::Uploading],
        }
    }

    /// Whether `name` is one of the lifecycle class suffixes.
    #[must_use]
    pub fn is_lifecycle_suffix(name: &str) -> bool {
        matches!(name, "empty" | "loading" | "filled")
    }

    /// Read the state back from a class list, if exactly one lifecycle class is present.
    #[must_use]
    pub fn from_classes(classes: &ClassList) -> Option<Self> {
        let mut found = [Self::Empty, Self::Uploading, Self::Filled]
            .into_iter()
            .filter(|s| classes.contains(&s.class_name()));
        let first = found.next()?;
        found.next().is_none().then_some(first)
    }
}

impl std::fmt::Display for PresentationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.class_suffix())
    }
}

/// Clear the other two lifecycle classes, then set the one for `state`.
pub fn set_exclusive_state(classes: &mut ClassList, state: PresentationState) {
    for other in state.others() {
        classes.remove(&other.class_name());
    }
    classes.add(&state.class_name());
}
