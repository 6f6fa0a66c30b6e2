//! Visual nodes - the mutable surface the widget draws.
//!
//! The node set is a fixed tree: the wrapper holds the image container
//! (preloader, spinner, media), the caption, the size controls and the two
//! buttons. Everything a transition can change is reached through named
//! methods; the lifecycle and tune classes on the wrapper can only be touched
//! from inside the crate.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

/// Root class of the widget. Lifecycle and tune classes are `image-tool--<name>`.
pub const WRAPPER_CLASS: &str = "image-tool";
/// Class of the box holding the preloader and the media.
pub const IMAGE_CONTAINER_CLASS: &str = "image-tool__image";
/// Class of the placeholder surface.
pub const PRELOADER_CLASS: &str = "image-tool__image-preloader";
/// Class of the injected media node.
pub const MEDIA_CLASS: &str = "image-tool__image-picture";
/// Class of the standalone spinner.
pub const SPINNER_CLASS: &str = "image-tool__spinner";
/// Class of the caption surface.
pub const CAPTION_CLASS: &str = "image-tool__caption";
/// Marker carried by the caption while it has no content.
pub const CAPTION_EMPTY_CLASS: &str = "image-tool__caption--empty";
/// Class of the size controls row.
pub const SIZE_CLASS: &str = "image-tool__size";
/// Class of the width and height inputs.
pub const SIZE_INPUT_CLASS: &str = "image-tool__size-input";
/// Class of the grow and shrink buttons.
pub const SIZE_BUTTON_CLASS: &str = "image-tool__size-button";
/// Class of the upload button.
pub const UPLOAD_BUTTON_CLASS: &str = "image-tool__upload-button";
/// Class of the select-file button.
pub const FILE_BUTTON_CLASS: &str = "image-tool__file-button";

/// Build a wrapper modifier class, e.g. `image-tool--filled`.
#[must_use]
pub fn modifier_class(name: &str) -> String {
    format!("{WRAPPER_CLASS}--{name}")
}

/// Ordered, duplicate-free list of style classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassList(Vec<String>);

impl ClassList {
    /// Add a class if it is not already present. Blank names are skipped.
    pub fn add(&mut self, class: &str) {
        if !class.trim().is_empty() && !self.contains(class) {
            self.0.push(class.to_string());
        }
    }

    /// Remove a class if present.
    pub fn remove(&mut self, class: &str) {
        self.0.retain(|c| c != class);
    }

    /// Add or remove a class depending on `force`.
    pub fn toggle(&mut self, class: &str, force: bool) {
        if force {
            self.add(class);
        } else {
            self.remove(class);
        }
    }

    /// Check whether a class is present.
    #[must_use]
    pub fn contains(&self, class: &str) -> bool {
        self.0.iter().any(|c| c == class)
    }

    /// Iterate classes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ClassList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// What a node is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Root of the widget.
    Wrapper,
    /// Box around preloader and media.
    ImageContainer,
    /// Placeholder showing the preview.
    Preloader,
    /// Standalone busy indicator.
    Spinner,
    /// The loaded image or video.
    Media,
    /// Editable caption surface.
    Caption,
    /// Row holding the size inputs and buttons.
    SizeControls,
    /// Width input.
    WidthInput,
    /// Height input.
    HeightInput,
    /// Grow button.
    SizeUpButton,
    /// Shrink button.
    SizeDownButton,
    /// Upload button.
    UploadButton,
    /// Select-file button.
    FileButton,
}

/// A single visual node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNode {
    role: NodeRole,
    tag: &'static str,
    classes: ClassList,
    hidden: bool,
    styles: BTreeMap<&'static str, String>,
    attributes: BTreeMap<String, String>,
    content: String,
}

impl VisualNode {
    /// Create a visible node with no classes.
    #[must_use]
    pub fn new(role: NodeRole, tag: &'static str) -> Self {
        Self {
            role,
            tag,
            classes: ClassList::default(),
            hidden: false,
            styles: BTreeMap::new(),
            attributes: BTreeMap::new(),
            content: String::new(),
        }
    }

    /// Add a class.
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.add(class);
        self
    }

    /// Set an attribute. Boolean attributes use an empty value.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Set the inner markup.
    #[must_use]
    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    /// Role of this node.
    #[must_use]
    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// Element tag name.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Style classes.
    #[must_use]
    pub fn classes(&self) -> &ClassList {
        &self.classes
    }

    /// Whether the node is hidden.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Inline style property value.
    #[must_use]
    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    /// Attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Inner markup.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    pub(crate) fn classes_mut(&mut self) -> &mut ClassList {
        &mut self.classes
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn set_style(&mut self, property: &'static str, value: Option<String>) {
        match value {
            Some(v) if !v.is_empty() => {
                self.styles.insert(property, v);
            }
            _ => {
                self.styles.remove(property);
            }
        }
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    fn write_open(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape_attr(&self.classes.to_string()));
        }
        for (name, value) in &self.attributes {
            if value.is_empty() {
                let _ = write!(out, " {name}");
            } else {
                let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
            }
        }
        if !self.styles.is_empty() {
            let style: Vec<String> = self
                .styles
                .iter()
                .map(|(k, v)| format!("{k}: {v};"))
                .collect();
            let _ = write!(out, " style=\"{}\"", escape_attr(&style.join(" ")));
        }
        if self.hidden {
            out.push_str(" hidden");
        }
        out.push('>');
    }

    fn write_close(&self, out: &mut String) {
        if !is_void(self.tag) {
            let _ = write!(out, "</{}>", self.tag);
        }
    }

    fn write_leaf(&self, out: &mut String) {
        self.write_open(out);
        out.push_str(&self.content);
        self.write_close(out);
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "input" | "img")
}

/// Quoted CSS `url()` value. Quotes, backslashes and line breaks are escaped
/// so the locator cannot end the declaration.
fn css_url(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len() + 7);
    value.push_str("url(\"");
    for c in raw.chars() {
        match c {
            '"' => value.push_str("\\\""),
            '\\' => value.push_str("\\\\"),
            '\n' => value.push_str("\\a "),
            '\r' => value.push_str("\\d "),
            other => value.push(other),
        }
    }
    value.push_str("\")");
    value
}

fn escape_attr(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Host-provided classes and labels used while building the node set.
#[derive(Debug, Clone)]
pub struct NodeSetOptions<'a> {
    /// Host block class added to the wrapper.
    pub block_class: &'a str,
    /// Host input class added to the caption.
    pub input_class: &'a str,
    /// Host button class added to every button.
    pub button_class: &'a str,
    /// Host loader class added to the spinner.
    pub loader_class: &'a str,
    /// Placeholder shown by an empty caption.
    pub caption_placeholder: &'a str,
    /// Markup of the select-file button.
    pub file_button_content: &'a str,
    /// Markup of the upload button.
    pub upload_button_content: &'a str,
    /// Whether the caption accepts edits.
    pub read_only: bool,
}

/// The complete tree of visual nodes for one attachment.
#[derive(Debug, Clone, Serialize)]
pub struct VisualNodeSet {
    wrapper: VisualNode,
    image_container: VisualNode,
    preloader: VisualNode,
    spinner: VisualNode,
    media: Option<VisualNode>,
    caption: VisualNode,
    size_controls: VisualNode,
    width_input: VisualNode,
    height_input: VisualNode,
    size_up: VisualNode,
    size_down: VisualNode,
    upload_button: VisualNode,
    file_button: VisualNode,
}

impl VisualNodeSet {
    /// Build the node tree. The spinner and caption start hidden.
    #[must_use]
    pub fn new(options: &NodeSetOptions<'_>) -> Self {
        let mut spinner = VisualNode::new(NodeRole::Spinner, "div")
            .with_class(SPINNER_CLASS)
            .with_class(options.loader_class);
        spinner.set_hidden(true);

        let mut caption = VisualNode::new(NodeRole::Caption, "div")
            .with_class(options.input_class)
            .with_class(CAPTION_CLASS)
            .with_class(CAPTION_EMPTY_CLASS)
            .with_attribute("contenteditable", if options.read_only { "false" } else { "true" })
            .with_attribute("data-placeholder", options.caption_placeholder);
        caption.set_hidden(true);

        let size_input = |role, axis: &str| {
            VisualNode::new(role, "input")
                .with_class(SIZE_INPUT_CLASS)
                .with_attribute("type", "number")
                .with_attribute("placeholder", axis)
                .with_attribute("value", "")
        };
        let size_button = |role, direction: &str, label: &str| {
            VisualNode::new(role, "button")
                .with_class(options.button_class)
                .with_class(SIZE_BUTTON_CLASS)
                .with_attribute("data-direction", direction)
                .with_content(label)
        };

        Self {
            wrapper: VisualNode::new(NodeRole::Wrapper, "div")
                .with_class(options.block_class)
                .with_class(WRAPPER_CLASS),
            image_container: VisualNode::new(NodeRole::ImageContainer, "div")
                .with_class(IMAGE_CONTAINER_CLASS),
            preloader: VisualNode::new(NodeRole::Preloader, "div").with_class(PRELOADER_CLASS),
            spinner,
            media: None,
            caption,
            size_controls: VisualNode::new(NodeRole::SizeControls, "div").with_class(SIZE_CLASS),
            width_input: size_input(NodeRole::WidthInput, "width"),
            height_input: size_input(NodeRole::HeightInput, "height"),
            size_up: size_button(NodeRole::SizeUpButton, "up", "+"),
            size_down: size_button(NodeRole::SizeDownButton, "down", "-"),
            upload_button: VisualNode::new(NodeRole::UploadButton, "div")
                .with_class(options.button_class)
                .with_class(UPLOAD_BUTTON_CLASS)
                .with_content(options.upload_button_content),
            file_button: VisualNode::new(NodeRole::FileButton, "div")
                .with_class(options.button_class)
                .with_class(FILE_BUTTON_CLASS)
                .with_content(options.file_button_content),
        }
    }

    /// Root node.
    #[must_use]
    pub fn wrapper(&self) -> &VisualNode {
        &self.wrapper
    }

    /// Placeholder node.
    #[must_use]
    pub fn preloader(&self) -> &VisualNode {
        &self.preloader
    }

    /// Spinner node.
    #[must_use]
    pub fn spinner(&self) -> &VisualNode {
        &self.spinner
    }

    /// Injected media node, once loaded.
    #[must_use]
    pub fn media(&self) -> Option<&VisualNode> {
        self.media.as_ref()
    }

    /// Caption surface.
    #[must_use]
    pub fn caption(&self) -> &VisualNode {
        &self.caption
    }

    /// Size controls row (inputs and grow/shrink buttons).
    #[must_use]
    pub fn size_controls(&self) -> &VisualNode {
        &self.size_controls
    }

    /// Upload button.
    #[must_use]
    pub fn upload_button(&self) -> &VisualNode {
        &self.upload_button
    }

    /// Select-file button.
    #[must_use]
    pub fn file_button(&self) -> &VisualNode {
        &self.file_button
    }

    /// Raw width and height input values.
    #[must_use]
    pub fn dimension_inputs(&self) -> (&str, &str) {
        (
            self.width_input.attribute("value").unwrap_or_default(),
            self.height_input.attribute("value").unwrap_or_default(),
        )
    }

    /// Whether the caption currently holds no content.
    #[must_use]
    pub fn caption_is_empty(&self) -> bool {
        self.caption.content.trim().is_empty()
    }

    /// Replace the width input value, as typed by the user.
    pub fn set_width_input(&mut self, value: &str) {
        self.width_input.set_attribute("value", value);
    }

    /// Replace the height input value, as typed by the user.
    pub fn set_height_input(&mut self, value: &str) {
        self.height_input.set_attribute("value", value);
    }

    /// Replace the caption markup, as typed by the user.
    pub fn set_caption(&mut self, markup: &str) {
        self.caption.content = markup.to_string();
        let empty = self.caption_is_empty();
        self.caption.classes.toggle(CAPTION_EMPTY_CLASS, empty);
    }

    pub(crate) fn wrapper_classes_mut(&mut self) -> &mut ClassList {
        self.wrapper.classes_mut()
    }

    pub(crate) fn set_dimension_inputs(&mut self, width: u32, height: u32) {
        self.set_width_input(&width.to_string());
        self.set_height_input(&height.to_string());
    }

    pub(crate) fn set_preloader_visible(&mut self, visible: bool) {
        self.preloader.set_hidden(!visible);
    }

    pub(crate) fn set_preloader_background(&mut self, url: Option<&str>) {
        self.preloader.set_style("background-image", url.map(css_url));
    }

    pub(crate) fn set_preloader_background_size(&mut self, width: u32, height: u32) {
        self.preloader.set_style("background-size", Some(format!("{width}px {height}px")));
    }

    pub(crate) fn set_spinner_visible(&mut self, visible: bool) {
        self.spinner.set_hidden(!visible);
    }

    pub(crate) fn set_size_controls_visible(&mut self, visible: bool) {
        self.size_controls.set_hidden(!visible);
    }

    pub(crate) fn set_upload_visible(&mut self, visible: bool) {
        self.upload_button.set_hidden(!visible);
    }

    pub(crate) fn set_file_button_visible(&mut self, visible: bool) {
        self.file_button.set_hidden(!visible);
    }

    pub(crate) fn set_caption_visible(&mut self, visible: bool) {
        self.caption.set_hidden(!visible);
    }

    pub(crate) fn insert_media(&mut self, node: VisualNode) {
        self.media = Some(node);
    }

    /// Render the tree as HTML markup.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.wrapper.write_open(&mut out);

        self.image_container.write_open(&mut out);
        self.preloader.write_open(&mut out);
        self.spinner.write_leaf(&mut out);
        self.preloader.write_close(&mut out);
        if let Some(media) = &self.media {
            media.write_leaf(&mut out);
        }
        self.image_container.write_close(&mut out);

        self.caption.write_leaf(&mut out);

        self.size_controls.write_open(&mut out);
        self.width_input.write_leaf(&mut out);
        self.height_input.write_leaf(&mut out);
        self.size_down.write_leaf(&mut out);
        self.size_up.write_leaf(&mut out);
        self.size_controls.write_close(&mut out);

        self.upload_button.write_leaf(&mut out);
        self.file_button.write_leaf(&mut out);

        self.wrapper.write_close(&mut out);
        out
    }
}
