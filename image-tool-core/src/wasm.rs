//! WebAssembly bindings for image-tool-core.
//!
//! This module provides JavaScript-callable functions when compiled to WASM.
//! The host mirrors the node tree from `getSnapshotJson`/`toHtml`, loads the
//! pending media itself and reports its events back through `mediaEvent`.

use wasm_bindgen::prelude::*;

use crate::{
    AttachmentData, CompletionEvent, CompletionOutcome, ImageTool, LoadToken, ResizeDirection,
    ToolCallbacks, ToolConfig,
};

/// Initialize the image tool WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
    tracing::info!("Image tool WASM initialized");
}

/// Callbacks backed by JavaScript functions. Missing functions are skipped.
struct JsCallbacks {
    on_select_file: Option<js_sys::Function>,
    on_upload_file: Option<js_sys::Function>,
    on_resize: Option<js_sys::Function>,
}

impl JsCallbacks {
    fn call(function: Option<&js_sys::Function>, args: &[JsValue]) {
        let Some(function) = function else {
            return;
        };
        let result = match args {
            [] => function.call0(&JsValue::NULL),
            [first, ..] => function.call1(&JsValue::NULL, first),
        };
        if let Err(e) = result {
            web_sys::console::error_2(&JsValue::from_str("image tool callback failed"), &e);
        }
    }
}

impl ToolCallbacks for JsCallbacks {
    fn on_select_file(&mut self) {
        Self::call(self.on_select_file.as_ref(), &[]);
    }

    fn on_upload_file(&mut self) {
        Self::call(self.on_upload_file.as_ref(), &[]);
    }

    fn on_resize(&mut self, direction: ResizeDirection) {
        if self.on_resize.is_some() {
            Self::call(
                self.on_resize.as_ref(),
                &[JsValue::from_str(direction.as_str())],
            );
        }
    }
}

/// Image tool instance for WASM.
#[wasm_bindgen]
pub struct WasmImageTool {
    tool: ImageTool,
}

#[wasm_bindgen]
impl WasmImageTool {
    /// Create a new widget from the host's JSON config.
    ///
    /// # Errors
    ///
    /// Returns an error string if the config JSON is malformed.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: &str,
        read_only: bool,
        on_select_file: Option<js_sys::Function>,
        on_upload_file: Option<js_sys::Function>,
        on_resize: Option<js_sys::Function>,
    ) -> Result<WasmImageTool, String> {
        let config = if config_json.trim().is_empty() {
            ToolConfig::default()
        } else {
            ToolConfig::from_json(config_json).map_err(|e| e.to_string())?
        };
        let callbacks = JsCallbacks {
            on_select_file,
            on_upload_file,
            on_resize,
        };
        Ok(Self {
            tool: ImageTool::new(config, read_only, Box::new(callbacks)),
        })
    }

    /// Render saved attachment data.
    ///
    /// # Errors
    ///
    /// Returns an error string if the data JSON is malformed.
    pub fn render(&mut self, data_json: &str) -> Result<(), String> {
        let data = AttachmentData::from_json(data_json).map_err(|e| e.to_string())?;
        self.tool.render(&data);
        Ok(())
    }

    /// Show a local preview.
    #[wasm_bindgen(js_name = showPreloader)]
    pub fn show_preloader(&mut self, preview_url: &str, width: Option<u32>, height: Option<u32>) {
        self.tool.show_preloader(preview_url, width, height);
    }

    /// Start loading the final media; returns the request token.
    #[wasm_bindgen(js_name = fillImage)]
    pub fn fill_image(&mut self, url: &str) -> u32 {
        self.tool.fill_image(url).token().0
    }

    /// Report a media event. Returns whether the widget is now filled.
    ///
    /// # Errors
    ///
    /// Returns an error string for unknown event names.
    #[wasm_bindgen(js_name = mediaEvent)]
    pub fn media_event(&mut self, token: u32, event: &str) -> Result<bool, String> {
        let event: CompletionEvent = event.parse()?;
        let outcome = self.tool.media_event(LoadToken(token), event);
        Ok(matches!(outcome, CompletionOutcome::Filled(_)))
    }

    /// Replace the caption markup.
    #[wasm_bindgen(js_name = fillCaption)]
    pub fn fill_caption(&mut self, text: &str) {
        self.tool.fill_caption(text);
    }

    /// Return to empty.
    #[wasm_bindgen(js_name = hidePreloader)]
    pub fn hide_preloader(&mut self) {
        self.tool.hide_preloader();
    }

    /// Show the spinner.
    #[wasm_bindgen(js_name = showSpinner)]
    pub fn show_spinner(&mut self) {
        self.tool.show_spinner();
    }

    /// Hide the spinner.
    #[wasm_bindgen(js_name = hideSpinner)]
    pub fn hide_spinner(&mut self) {
        self.tool.hide_spinner();
    }

    /// Hide all controls.
    #[wasm_bindgen(js_name = hideTools)]
    pub fn hide_tools(&mut self) {
        self.tool.hide_tools();
    }

    /// Toggle a tune.
    #[wasm_bindgen(js_name = applyTune)]
    pub fn apply_tune(&mut self, name: &str, enabled: bool) {
        self.tool.apply_tune(name, enabled);
    }

    /// Current size as JSON (`{"width":..,"height":..}`).
    #[wasm_bindgen(js_name = getSize)]
    #[must_use]
    pub fn get_size(&self) -> String {
        serde_json::to_string(&self.tool.get_size()).unwrap_or_default()
    }

    /// Forward a click on the select-file button.
    #[wasm_bindgen(js_name = clickSelectFile)]
    pub fn click_select_file(&mut self) {
        self.tool.click_select_file();
    }

    /// Forward a click on the upload button.
    #[wasm_bindgen(js_name = clickUpload)]
    pub fn click_upload(&mut self) {
        self.tool.click_upload();
    }

    /// Forward a click on a size button (`"up"` or `"down"`).
    ///
    /// # Errors
    ///
    /// Returns an error string for unknown directions.
    #[wasm_bindgen(js_name = clickResize)]
    pub fn click_resize(&mut self, direction: &str) -> Result<bool, String> {
        let direction: ResizeDirection = direction.parse()?;
        Ok(self.tool.click_resize(direction).is_some())
    }

    /// Forward a caption edit.
    #[wasm_bindgen(js_name = editCaption)]
    pub fn edit_caption(&mut self, markup: &str) {
        self.tool.edit_caption(markup);
    }

    /// Forward a width input edit.
    #[wasm_bindgen(js_name = editWidth)]
    pub fn edit_width(&mut self, value: &str) {
        self.tool.edit_width(value);
    }

    /// Forward a height input edit.
    #[wasm_bindgen(js_name = editHeight)]
    pub fn edit_height(&mut self, value: &str) {
        self.tool.edit_height(value);
    }

    /// Lifecycle state name.
    #[wasm_bindgen(js_name = getState)]
    #[must_use]
    pub fn get_state(&self) -> String {
        self.tool.state().to_string()
    }

    /// Data to persist, as JSON.
    #[must_use]
    pub fn save(&self) -> String {
        self.tool.save().to_json().unwrap_or_default()
    }

    /// Full widget snapshot as JSON.
    #[wasm_bindgen(js_name = getSnapshotJson)]
    #[must_use]
    pub fn get_snapshot_json(&self) -> String {
        serde_json::to_string(&self.tool.snapshot()).unwrap_or_default()
    }

    /// Node tree as HTML.
    #[wasm_bindgen(js_name = toHtml)]
    #[must_use]
    pub fn to_html(&self) -> String {
        self.tool.to_html()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> WasmImageTool {
        WasmImageTool::new("", false, None, None, None).expect("default config")
    }

    #[test]
    fn new_rejects_invalid_config() {
        assert!(WasmImageTool::new("{ nope", false, None, None, None).is_err());
    }

    #[test]
    fn render_rejects_invalid_json() {
        let mut tool = widget();
        assert!(tool.render("not json").is_err());
        assert!(tool.render("{}").is_ok());
        assert_eq!(tool.get_state(), "empty");
    }

    #[test]
    fn fill_flow_through_bindings() {
        let mut tool = widget();
        tool.show_preloader("blob:a", Some(100), Some(50));
        assert_eq!(tool.get_state(), "loading");
        let token = tool.fill_image("a.png");
        assert_eq!(tool.media_event(token, "loadeddata"), Ok(false));
        assert_eq!(tool.media_event(token, "load"), Ok(true));
        assert_eq!(tool.get_state(), "filled");
        assert!(tool.media_event(token, "error").is_err());
    }

    #[test]
    fn size_and_resize_through_bindings() {
        let mut tool = widget();
        tool.show_preloader("blob:a", Some(100), Some(50));
        assert_eq!(tool.click_resize("up"), Ok(true));
        assert_eq!(tool.get_size(), r#"{"width":110,"height":55}"#);
        assert!(tool.click_resize("left").is_err());
    }

    #[test]
    fn snapshot_json_is_valid() {
        let tool = widget();
        let parsed: Result<serde_json::Value, _> = serde_json::from_str(&tool.get_snapshot_json());
        assert!(parsed.is_ok(), "Snapshot JSON should be valid");
        assert!(tool.to_html().contains("image-tool--empty"));
    }
}
