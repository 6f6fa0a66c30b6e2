//! Media resolution and load completion.
//!
//! A source ending in `.mp4` is shown as a silent looping clip; anything
//! else is a still image. Each fill request gets a one-shot completion
//! channel that is registered before the source is assigned, so a source
//! that is already cached cannot finish loading ahead of its subscriber.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use serde::{Deserialize, Serialize};

use crate::node::{NodeRole, VisualNode, MEDIA_CLASS};

/// Boolean attributes that make a video behave like an animated image.
pub const VIDEO_ATTRIBUTES: [&str; 4] = ["autoplay", "loop", "muted", "playsinline"];

/// How the media is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image.
    Image,
    /// Silent looping video.
    Video,
}

impl MediaKind {
    /// Element tag for this representation.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Image => "img",
            Self::Video => "video",
        }
    }
}

/// The event that signals the media is ready to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionEvent {
    /// Image `load`.
    Load,
    /// Video `loadeddata`.
    LoadedData,
}

impl CompletionEvent {
    /// DOM event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::LoadedData => "loadeddata",
        }
    }
}

impl std::str::FromStr for CompletionEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "load" => Ok(Self::Load),
            "loadeddata" => Ok(Self::LoadedData),
            other => Err(format!("unknown media event: {other}")),
        }
    }
}

/// Result of resolving a source locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedMedia {
    /// Image or video.
    pub kind: MediaKind,
    /// Event to await before the media counts as loaded.
    pub completion: CompletionEvent,
    /// Extra boolean attributes to set on the media node.
    pub attributes: &'static [&'static str],
}

/// Decide how to present `source_url`. Pure; no I/O.
#[must_use]
pub fn resolve(source_url: &str) -> ResolvedMedia {
    if source_url.ends_with(".mp4") {
        ResolvedMedia {
            kind: MediaKind::Video,
            completion: CompletionEvent::LoadedData,
            attributes: &VIDEO_ATTRIBUTES,
        }
    } else {
        ResolvedMedia {
            kind: MediaKind::Image,
            completion: CompletionEvent::Load,
            attributes: &[],
        }
    }
}

/// Identifies one fill request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadToken(pub u32);

impl std::fmt::Display for LoadToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Delivered through [`MediaLoad`] once the media is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReady {
    /// Request that completed.
    pub token: LoadToken,
    /// Final source.
    pub url: String,
    /// Image or video.
    pub kind: MediaKind,
}

/// Future resolved when a fill request completes.
///
/// Yields `None` if the request was superseded by a newer fill or the widget
/// was dropped before the media loaded.
#[derive(Debug)]
pub struct MediaLoad {
    token: LoadToken,
    rx: oneshot::Receiver<MediaReady>,
}

impl MediaLoad {
    /// Token of the request this future tracks.
    #[must_use]
    pub fn token(&self) -> LoadToken {
        self.token
    }
}

impl Future for MediaLoad {
    type Output = Option<MediaReady>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

/// A media node that has a completion subscriber but no source yet.
///
/// The only way to obtain a [`PendingMedia`] is through
/// [`SubscribedMedia::assign_source`], which fixes the subscribe-then-assign order.
#[derive(Debug)]
pub struct SubscribedMedia {
    token: LoadToken,
    resolved: ResolvedMedia,
    tx: oneshot::Sender<MediaReady>,
}

impl SubscribedMedia {
    /// Register the completion subscriber for `resolved`.
    #[must_use]
    pub fn subscribe(token: LoadToken, resolved: ResolvedMedia) -> (Self, MediaLoad) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                token,
                resolved,
                tx,
            },
            MediaLoad { token, rx },
        )
    }

    /// Assign the source. From here on the media may load at any time.
    #[must_use]
    pub fn assign_source(self, url: &str) -> PendingMedia {
        let mut node = VisualNode::new(NodeRole::Media, self.resolved.kind.tag())
            .with_class(MEDIA_CLASS)
            .with_attribute("src", url);
        for attribute in self.resolved.attributes {
            node = node.with_attribute(attribute, "");
        }
        PendingMedia {
            token: self.token,
            resolved: self.resolved,
            url: url.to_string(),
            node,
            tx: Some(self.tx),
        }
    }
}

/// A sourced media node waiting for its completion event.
#[derive(Debug)]
pub struct PendingMedia {
    token: LoadToken,
    resolved: ResolvedMedia,
    url: String,
    node: VisualNode,
    tx: Option<oneshot::Sender<MediaReady>>,
}

impl PendingMedia {
    /// Request token.
    #[must_use]
    pub fn token(&self) -> LoadToken {
        self.token
    }

    /// Source being loaded.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Resolution the node was built from.
    #[must_use]
    pub fn resolved(&self) -> ResolvedMedia {
        self.resolved
    }

    /// The node that will be injected once loaded.
    #[must_use]
    pub fn node(&self) -> &VisualNode {
        &self.node
    }

    /// Whether `event` is the one this media waits for.
    #[must_use]
    pub fn awaits(&self, event: CompletionEvent) -> bool {
        self.resolved.completion == event
    }

    /// Fulfil the subscriber and hand back the node to inject.
    ///
    /// The subscriber is notified at most once; a receiver that was dropped
    /// is not an error.
    pub fn complete(mut self) -> (VisualNode, MediaReady) {
        let ready = MediaReady {
            token: self.token,
            url: self.url,
            kind: self.resolved.kind,
        };
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(ready.clone());
        }
        (self.node, ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mp4_resolves_to_silent_looping_video() {
        let media = resolve("https://cdn.example.com/clip.mp4");
        assert_eq!(media.kind, MediaKind::Video);
        assert_eq!(media.completion, CompletionEvent::LoadedData);
        for attribute in ["autoplay", "loop", "muted", "playsinline"] {
            assert!(media.attributes.contains(&attribute), "missing {attribute}");
        }
    }

    #[test]
    fn other_sources_resolve_to_image() {
        for url in ["a.png", "photo.jpeg", "clip.MP4", "clip.mp4?x=1", "mp4", ""] {
            let media = resolve(url);
            assert_eq!(media.kind, MediaKind::Image, "{url}");
            assert_eq!(media.completion, CompletionEvent::Load, "{url}");
            assert!(media.attributes.is_empty());
        }
    }

    #[test]
    fn pending_video_node_carries_attributes() {
        let (subscribed, _load) = SubscribedMedia::subscribe(LoadToken(1), resolve("x.mp4"));
        let pending = subscribed.assign_source("x.mp4");
        let node = pending.node();
        assert_eq!(node.tag(), "video");
        assert_eq!(node.attribute("src"), Some("x.mp4"));
        assert_eq!(node.attribute("muted"), Some(""));
        assert_eq!(node.attribute("playsinline"), Some(""));
        assert!(node.classes().contains(MEDIA_CLASS));
    }

    #[test]
    fn awaits_only_its_own_event() {
        let (subscribed, _load) = SubscribedMedia::subscribe(LoadToken(1), resolve("x.png"));
        let pending = subscribed.assign_source("x.png");
        assert!(pending.awaits(CompletionEvent::Load));
        assert!(!pending.awaits(CompletionEvent::LoadedData));
    }

    #[tokio::test]
    async fn completion_fulfils_future_once() {
        let (subscribed, load) = SubscribedMedia::subscribe(LoadToken(7), resolve("x.png"));
        let pending = subscribed.assign_source("x.png");
        assert_eq!(load.token(), LoadToken(7));

        let (node, ready) = pending.complete();
        assert_eq!(node.tag(), "img");
        assert_eq!(ready.url, "x.png");

        let delivered = load.await.expect("completion delivered");
        assert_eq!(delivered, ready);
    }

    #[tokio::test]
    async fn dropped_request_yields_none() {
        let (subscribed, load) = SubscribedMedia::subscribe(LoadToken(2), resolve("x.png"));
        drop(subscribed.assign_source("x.png"));
        assert!(load.await.is_none());
    }

    #[test]
    fn event_names_parse() {
        assert_eq!("load".parse::<CompletionEvent>(), Ok(CompletionEvent::Load));
        assert_eq!(
            "loadeddata".parse::<CompletionEvent>(),
            Ok(CompletionEvent::LoadedData)
        );
        assert!("error".parse::<CompletionEvent>().is_err());
        assert_eq!(CompletionEvent::LoadedData.as_str(), "loadeddata");
    }
}
