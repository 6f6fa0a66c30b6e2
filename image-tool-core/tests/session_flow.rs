//! Session Flow Integration Tests
//!
//! Drives the widget the way a host editor does:
//! - Selecting, previewing, uploading and showing an image
//! - Restoring saved data
//! - Retry after a failed upload
//! - Tunes and captions across lifecycle changes

use std::cell::RefCell;
use std::rc::Rc;

use image_tool_core::{
    replay, AttachmentData, CompletionEvent, CompletionOutcome, ImageTool, MediaKind,
    NoopCallbacks, PresentationState, ResizeDirection, Script, Size, ToolCallbacks, ToolConfig,
};

/// Callbacks that remember what the widget asked for.
#[derive(Clone, Default)]
struct HostLog(Rc<RefCell<Vec<String>>>);

impl ToolCallbacks for HostLog {
    fn on_select_file(&mut self) {
        self.0.borrow_mut().push("select".to_string());
    }

    fn on_upload_file(&mut self) {
        self.0.borrow_mut().push("upload".to_string());
    }

    fn on_resize(&mut self, direction: ResizeDirection) {
        self.0.borrow_mut().push(format!("resize:{direction}"));
    }
}

fn new_tool() -> ImageTool {
    ImageTool::new(ToolConfig::default(), false, Box::new(NoopCallbacks))
}

fn lifecycle_class_count(tool: &ImageTool) -> usize {
    ["image-tool--empty", "image-tool--loading", "image-tool--filled"]
        .iter()
        .filter(|c| tool.nodes().wrapper().classes().contains(c))
        .count()
}

// ============================================================================
// Upload Workflow Tests
// ============================================================================

#[tokio::test]
async fn test_select_preview_upload_and_show() {
    let log = HostLog::default();
    let mut tool = ImageTool::new(ToolConfig::default(), false, Box::new(log.clone()));
    tool.render(&AttachmentData::default());
    assert_eq!(tool.state(), PresentationState::Empty);
    assert!(!tool.nodes().file_button().is_hidden());

    // User picks a file; the host shows a local preview.
    tool.click_select_file();
    tool.show_preloader("a.png", Some(100), Some(50));
    assert_eq!(tool.state(), PresentationState::Uploading);
    assert!(!tool.nodes().preloader().is_hidden());
    assert_eq!(tool.nodes().dimension_inputs(), ("100", "50"));

    // User uploads; the host fills the final image and it loads.
    tool.click_upload();
    let load = tool.fill_image("a.png");
    let token = load.token();
    assert!(tool.nodes().media().is_none());
    let outcome = tool.media_event(token, CompletionEvent::Load);
    assert!(matches!(outcome, CompletionOutcome::Filled(_)));

    let ready = load.await.expect("completion delivered");
    assert_eq!(ready.url, "a.png");
    assert_eq!(ready.kind, MediaKind::Image);

    assert_eq!(tool.state(), PresentationState::Filled);
    assert_eq!(tool.nodes().preloader().style("background-image"), None);
    assert!(tool.nodes().media().is_some());
    assert_eq!(lifecycle_class_count(&tool), 1);
    assert_eq!(*log.0.borrow(), vec!["select", "upload"]);
}

#[tokio::test]
async fn test_video_waits_for_loadeddata() {
    let mut tool = new_tool();
    tool.show_preloader("blob:clip", None, None);
    let load = tool.fill_image("https://cdn.example.com/clip.mp4");
    let token = load.token();

    tool.media_event(token, CompletionEvent::Load);
    assert_eq!(tool.state(), PresentationState::Uploading);

    tool.media_event(token, CompletionEvent::LoadedData);
    assert_eq!(tool.state(), PresentationState::Filled);

    let media = tool.nodes().media().expect("video injected");
    assert_eq!(media.tag(), "video");
    for attribute in ["autoplay", "loop", "muted", "playsinline"] {
        assert!(media.attribute(attribute).is_some(), "missing {attribute}");
    }
    assert_eq!(load.await.map(|r| r.kind), Some(MediaKind::Video));
}

#[tokio::test]
async fn test_refill_supersedes_previous_request() {
    let mut tool = new_tool();
    tool.show_preloader("blob:a", None, None);
    let first = tool.fill_image("first.png");
    let second = tool.fill_image("second.png");
    let first_token = first.token();

    assert!(first.await.is_none(), "superseded request resolves empty");
    tool.media_event(first_token, CompletionEvent::Load);
    assert_eq!(tool.state(), PresentationState::Uploading);

    tool.media_event(second.token(), CompletionEvent::Load);
    assert_eq!(
        tool.nodes().media().and_then(|m| m.attribute("src")),
        Some("second.png")
    );
}

// ============================================================================
// Saved Data Tests
// ============================================================================

#[test]
fn test_saved_data_needs_explicit_fill() {
    let data = AttachmentData::from_json(
        r#"{"file":{"url":"https://cdn.example.com/a.png"},"caption":"Dunes","stretched":true}"#,
    )
    .expect("valid data");
    let mut tool = new_tool();
    tool.render(&data);
    assert_eq!(tool.state(), PresentationState::Uploading);

    let url = data
        .file
        .as_ref()
        .and_then(|f| f.url.clone())
        .expect("saved url");
    let token = tool.fill_image(&url).token();
    tool.media_event(token, CompletionEvent::Load);
    assert_eq!(tool.state(), PresentationState::Filled);

    let saved = tool.save();
    assert_eq!(saved.caption.as_deref(), Some("Dunes"));
    assert!(saved.stretched);
    assert_eq!(saved.file.and_then(|f| f.url), Some(url));
}

// ============================================================================
// Failure and Retry Tests
// ============================================================================

#[test]
fn test_failed_upload_returns_to_empty_and_retries() {
    let mut tool = new_tool();
    tool.show_spinner();
    tool.show_preloader("blob:a", Some(640), Some(480));
    tool.hide_spinner();

    // Upload failed: the collaborator resets the widget.
    tool.hide_preloader();
    tool.hide_preloader();
    assert_eq!(tool.state(), PresentationState::Empty);
    assert!(tool.nodes().preloader().is_hidden());
    assert!(tool.nodes().size_controls().is_hidden());
    assert!(tool.nodes().upload_button().is_hidden());
    assert!(!tool.nodes().file_button().is_hidden());
    assert_eq!(lifecycle_class_count(&tool), 1);

    // Retry succeeds.
    tool.show_preloader("blob:b", Some(640), Some(480));
    let token = tool.fill_image("b.png").token();
    tool.media_event(token, CompletionEvent::Load);
    assert_eq!(tool.state(), PresentationState::Filled);
}

// ============================================================================
// Tune and Caption Tests
// ============================================================================

#[test]
fn test_tunes_never_touch_lifecycle() {
    let mut tool = new_tool();
    tool.show_preloader("blob:a", Some(10), Some(10));
    for name in ["border", "background", "stretched", "caption", "loading", "empty"] {
        tool.apply_tune(name, true);
        assert_eq!(tool.state(), PresentationState::Uploading);
        assert_eq!(lifecycle_class_count(&tool), 1);
        assert!(tool.nodes().wrapper().classes().contains("image-tool--loading"));
    }
    let wrapper = tool.nodes().wrapper().classes();
    assert!(wrapper.contains("image-tool--border"));
    assert!(wrapper.contains("image-tool--background"));
    assert!(wrapper.contains("image-tool--stretched"));
}

#[test]
fn test_caption_survives_resize_and_fill() {
    let log = HostLog::default();
    let mut tool = ImageTool::new(ToolConfig::default(), false, Box::new(log.clone()));
    tool.apply_tune("caption", true);
    tool.edit_caption("A <b>bold</b> claim");
    tool.show_preloader("blob:a", Some(200), Some(100));

    assert_eq!(tool.click_resize(ResizeDirection::Down), Some((180, 90)));
    assert_eq!(tool.click_resize(ResizeDirection::Up), Some((198, 99)));
    assert_eq!(tool.get_size(), Size::new(198, 99));

    let token = tool.fill_image("a.png").token();
    tool.media_event(token, CompletionEvent::Load);

    assert_eq!(tool.nodes().caption().content(), "A <b>bold</b> claim");
    assert!(!tool.nodes().caption().is_hidden());
    assert_eq!(*log.0.borrow(), vec!["resize:down", "resize:up"]);
}

#[test]
fn test_hide_tools_for_read_only_view() {
    let mut tool = ImageTool::new(ToolConfig::default(), true, Box::new(NoopCallbacks));
    tool.render(&AttachmentData::from_json(r#"{"file":{"url":"a.png"}}"#).expect("valid data"));
    let nodes = tool.nodes();
    assert!(nodes.preloader().is_hidden());
    assert!(nodes.size_controls().is_hidden());
    assert!(nodes.upload_button().is_hidden());
    assert!(nodes.file_button().is_hidden());
    assert_eq!(tool.state(), PresentationState::Uploading);
    assert_eq!(nodes.caption().attribute("contenteditable"), Some("false"));

    // A later reset must not bring the tools back.
    tool.hide_preloader();
    assert_eq!(tool.state(), PresentationState::Empty);
    assert!(tool.nodes().file_button().is_hidden());
    assert!(!tool.save().has_file());
}

// ============================================================================
// Replay Tests
// ============================================================================

#[test]
fn test_replay_script_end_to_end() {
    let script = Script::from_json(
        r#"{
            "steps": [
                { "op": "apply_tune", "name": "border", "enabled": true },
                { "op": "show_preloader", "url": "blob:p", "width": 100, "height": 50 },
                { "op": "resize", "direction": "up" },
                { "op": "edit_caption", "text": "Hello" },
                { "op": "fill_image", "url": "https://cdn.example.com/p.png" },
                { "op": "complete" }
            ]
        }"#,
    )
    .expect("valid script");

    let mut tool = new_tool();
    let reports = replay(&mut tool, &script).expect("replays");
    assert_eq!(reports.len(), 6);
    assert_eq!(tool.state(), PresentationState::Filled);

    let html = tool.to_html();
    assert!(html.contains("image-tool--filled"));
    assert!(html.contains("image-tool--border"));
    assert!(html.contains("src=\"https://cdn.example.com/p.png\""));
    assert!(html.contains(">Hello</div>"));
    assert!(!html.contains("image-tool--loading"));
}
