//! # Image Tool CLI
//!
//! Command-line harness for the image tool block. It replays a host session
//! written as JSON against a headless widget and prints the resulting node
//! tree, which makes the widget's behaviour reviewable without a browser.
//!
//! ## Usage
//!
//! ```bash
//! image-tool replay --script session.json --format html
//! image-tool resolve https://cdn.example.com/clip.mp4
//! image-tool adjust --width 640 --height 480 --direction down
//! ```
//!
//! Preview paths in `show_preloader` steps that are local files and lack a
//! size are probed with the `image` crate before the script runs.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use image_tool_core::{
    adjust, replay, resolve, AttachmentData, ImageTool, ResizeDirection, Script, Snapshot, Step,
    StepReport, ToolCallbacks, ToolConfig,
};
use serde::Serialize;

/// Command-line arguments for image-tool.
#[derive(Debug, Clone, Parser)]
#[command(name = "image-tool")]
#[command(about = "Replay and inspect image tool sessions")]
#[command(version)]
pub struct CliArgs {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Replay a session script and print the final widget.
    Replay(ReplayArgs),
    /// Show how a source URL would be presented.
    Resolve {
        /// Source URL.
        url: String,
    },
    /// Apply one grow or shrink step to a width and height.
    Adjust {
        /// Width as typed.
        #[arg(long)]
        width: String,
        /// Height as typed.
        #[arg(long)]
        height: String,
        /// `up` or `down`.
        #[arg(long)]
        direction: ResizeDirection,
    },
}

/// Arguments for `replay`.
#[derive(Debug, Clone, Parser)]
pub struct ReplayArgs {
    /// Session script (JSON).
    #[arg(long)]
    pub script: PathBuf,

    /// Saved attachment data rendered before the script; overrides the script's own.
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Tool config (JSON).
    #[arg(long, env = "IMAGE_TOOL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Create the widget read-only.
    #[arg(long)]
    pub read_only: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Do not probe local preview files for their size.
    #[arg(long)]
    pub no_probe: bool,
}

/// How replay results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// State, per-step reports, snapshot and saved data.
    Json,
    /// Final node tree only.
    Html,
}

/// Replay configuration.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Session script path.
    pub script: PathBuf,
    /// Saved data path.
    pub data: Option<PathBuf>,
    /// Tool config path.
    pub tool_config: Option<PathBuf>,
    /// Read-only widget.
    pub read_only: bool,
    /// Output format.
    pub format: OutputFormat,
    /// Directory local preview paths are resolved against, if probing.
    pub probe_root: Option<PathBuf>,
}

impl From<ReplayArgs> for ReplayConfig {
    fn from(args: ReplayArgs) -> Self {
        let probe_root = (!args.no_probe).then(|| {
            args.script
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        });
        Self {
            script: args.script,
            data: args.data,
            tool_config: args.config,
            read_only: args.read_only,
            format: args.format,
            probe_root,
        }
    }
}

/// Callbacks that log each request and keep it for the report.
#[derive(Debug, Clone, Default)]
pub struct LoggingCallbacks {
    requests: Rc<RefCell<Vec<String>>>,
}

impl LoggingCallbacks {
    /// Requests made so far.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    fn record(&self, request: String) {
        tracing::info!(%request, "host request");
        self.requests.borrow_mut().push(request);
    }
}

impl ToolCallbacks for LoggingCallbacks {
    fn on_select_file(&mut self) {
        self.record("select_file".to_string());
    }

    fn on_upload_file(&mut self) {
        self.record("upload_file".to_string());
    }

    fn on_resize(&mut self, direction: ResizeDirection) {
        self.record(format!("resize:{direction}"));
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayOutput<'a> {
    reports: Vec<StepReport>,
    snapshot: Snapshot<'a>,
    saved: AttachmentData,
    host_requests: Vec<String>,
}

/// Map a preview URL to a local file, if it names one.
#[must_use]
pub fn local_preview_path(url: &str, root: &Path) -> Option<PathBuf> {
    if let Some(path) = url.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }
    if url.contains("://") || url.starts_with("blob:") || url.starts_with("data:") {
        return None;
    }
    Some(root.join(url))
}

/// Fill in missing preview sizes from local image files.
///
/// Returns the number of steps that were given a size. Unreadable files are
/// logged and left alone.
pub fn probe_preview_sizes(script: &mut Script, root: &Path) -> usize {
    let mut probed = 0;
    for step in &mut script.steps {
        let Step::ShowPreloader { url, width, height } = step else {
            continue;
        };
        if width.is_some() && height.is_some() {
            continue;
        }
        let Some(path) = local_preview_path(url, root) else {
            continue;
        };
        match image::image_dimensions(&path) {
            Ok((w, h)) => {
                tracing::debug!(path = %path.display(), w, h, "probed preview size");
                width.get_or_insert(w);
                height.get_or_insert(h);
                probed += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not probe preview");
            }
        }
    }
    probed
}

fn read_json(path: &Path, what: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read {what} '{}'", path.display()))
}

/// Run a replay and return the rendered output.
///
/// # Errors
///
/// Returns an error if a file cannot be read, any JSON is malformed, or the
/// script completes a load that was never started.
pub fn run_replay(config: &ReplayConfig) -> anyhow::Result<String> {
    let tool_config = match &config.tool_config {
        Some(path) => ToolConfig::from_json(&read_json(path, "config")?)
            .with_context(|| format!("parse config '{}'", path.display()))?,
        None => ToolConfig::default(),
    };

    let mut script = Script::from_json(&read_json(&config.script, "script")?)
        .with_context(|| format!("parse script '{}'", config.script.display()))?;
    if let Some(path) = &config.data {
        let data = AttachmentData::from_json(&read_json(path, "data")?)
            .with_context(|| format!("parse data '{}'", path.display()))?;
        script.data = Some(data);
    }
    if let Some(root) = &config.probe_root {
        let probed = probe_preview_sizes(&mut script, root);
        tracing::debug!(probed, "preview probing done");
    }

    let callbacks = LoggingCallbacks::default();
    let mut tool = ImageTool::new(tool_config, config.read_only, Box::new(callbacks.clone()));
    tracing::info!(attachment = %tool.id(), steps = script.steps.len(), "replaying script");
    let reports = replay(&mut tool, &script)?;
    tracing::info!(attachment = %tool.id(), state = %tool.state(), "replay finished");

    match config.format {
        OutputFormat::Html => Ok(tool.to_html()),
        OutputFormat::Json => {
            let output = ReplayOutput {
                reports,
                snapshot: tool.snapshot(),
                saved: tool.save(),
                host_requests: callbacks.requests(),
            };
            Ok(serde_json::to_string_pretty(&output)?)
        }
    }
}

/// Describe how `url` would be presented, as JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn describe_source(url: &str) -> anyhow::Result<String> {
    let resolved = resolve(url);
    let description = serde_json::json!({
        "url": url,
        "tag": resolved.kind.tag(),
        "kind": resolved.kind,
        "completion": resolved.completion.as_str(),
        "attributes": resolved.attributes,
    });
    Ok(serde_json::to_string_pretty(&description)?)
}

/// One grow or shrink step, formatted as `WxH`, or `None` if either value is unset.
#[must_use]
pub fn step_size(width: &str, height: &str, direction: ResizeDirection) -> Option<String> {
    adjust(width, height, direction).map(|(w, h)| format!("{w}x{h}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    fn config(script: PathBuf, format: OutputFormat) -> ReplayConfig {
        ReplayConfig {
            script,
            data: None,
            tool_config: None,
            read_only: false,
            format,
            probe_root: None,
        }
    }

    #[test]
    fn parses_replay_args() {
        let args = CliArgs::try_parse_from([
            "image-tool",
            "replay",
            "--script",
            "dir/session.json",
            "--format",
            "html",
            "--read-only",
        ])
        .expect("valid args");
        let Command::Replay(replay_args) = args.command else {
            panic!("expected replay");
        };
        let config = ReplayConfig::from(replay_args);
        assert_eq!(config.format, OutputFormat::Html);
        assert!(config.read_only);
        assert_eq!(config.probe_root, Some(PathBuf::from("dir")));
    }

    #[test]
    fn no_probe_disables_probing() {
        let args = CliArgs::try_parse_from([
            "image-tool",
            "replay",
            "--script",
            "s.json",
            "--no-probe",
        ])
        .expect("valid args");
        let Command::Replay(replay_args) = args.command else {
            panic!("expected replay");
        };
        assert_eq!(ReplayConfig::from(replay_args).probe_root, None);
    }

    #[test]
    fn parses_adjust_direction() {
        let args = CliArgs::try_parse_from([
            "image-tool",
            "adjust",
            "--width",
            "100",
            "--height",
            "50",
            "--direction",
            "down",
        ])
        .expect("valid args");
        assert!(matches!(
            args.command,
            Command::Adjust {
                direction: ResizeDirection::Down,
                ..
            }
        ));
        assert!(CliArgs::try_parse_from([
            "image-tool",
            "adjust",
            "--width",
            "1",
            "--height",
            "1",
            "--direction",
            "sideways",
        ])
        .is_err());
    }

    #[test]
    fn local_preview_paths() {
        let root = Path::new("/tmp/session");
        assert_eq!(
            local_preview_path("a.png", root),
            Some(PathBuf::from("/tmp/session/a.png"))
        );
        assert_eq!(
            local_preview_path("file:///srv/b.png", root),
            Some(PathBuf::from("/srv/b.png"))
        );
        assert_eq!(local_preview_path("https://cdn/a.png", root), None);
        assert_eq!(local_preview_path("blob:abc", root), None);
        assert_eq!(local_preview_path("data:image/png;base64,AA", root), None);
    }

    #[test]
    fn probes_local_preview() {
        let dir = tempfile::tempdir().expect("temp dir");
        image::RgbaImage::new(12, 7)
            .save(dir.path().join("preview.png"))
            .expect("write png");

        let mut script = Script {
            data: None,
            steps: vec![
                Step::ShowPreloader {
                    url: "preview.png".to_string(),
                    width: None,
                    height: None,
                },
                Step::ShowPreloader {
                    url: "missing.png".to_string(),
                    width: None,
                    height: None,
                },
                Step::ShowPreloader {
                    url: "preview.png".to_string(),
                    width: Some(3),
                    height: Some(4),
                },
            ],
        };
        assert_eq!(probe_preview_sizes(&mut script, dir.path()), 1);
        assert!(matches!(
            script.steps[0],
            Step::ShowPreloader {
                width: Some(12),
                height: Some(7),
                ..
            }
        ));
        assert!(matches!(
            script.steps[1],
            Step::ShowPreloader { width: None, .. }
        ));
        assert!(matches!(
            script.steps[2],
            Step::ShowPreloader {
                width: Some(3),
                ..
            }
        ));
    }

    #[test]
    fn replay_json_output() {
        let dir = tempfile::tempdir().expect("temp dir");
        let script = write(
            dir.path(),
            "session.json",
            r#"{"steps":[
                {"op":"select_file"},
                {"op":"show_preloader","url":"blob:p","width":100,"height":50},
                {"op":"resize","direction":"down"},
                {"op":"fill_image","url":"https://cdn.example.com/a.png"},
                {"op":"complete"}
            ]}"#,
        );
        let output = run_replay(&config(script, OutputFormat::Json)).expect("replays");
        let json: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(json["snapshot"]["state"], "filled");
        assert_eq!(json["saved"]["file"]["width"], 90);
        assert_eq!(
            json["hostRequests"],
            serde_json::json!(["select_file", "resize:down"])
        );
        assert_eq!(json["reports"].as_array().map(Vec::len), Some(5));
    }

    #[test]
    fn replay_html_with_data_and_config() {
        let dir = tempfile::tempdir().expect("temp dir");
        let script = write(dir.path(), "session.json", r#"{"steps":[]}"#);
        let data = write(
            dir.path(),
            "data.json",
            r#"{"file":{"url":"a.png"},"withBorder":true}"#,
        );
        let tool_config = write(
            dir.path(),
            "config.json",
            r#"{"buttonContent":"Pick one"}"#,
        );
        let mut config = config(script, OutputFormat::Html);
        config.data = Some(data);
        config.tool_config = Some(tool_config);

        let html = run_replay(&config).expect("replays");
        assert!(html.contains("image-tool--loading"));
        assert!(html.contains("image-tool--border"));
        assert!(html.contains("Pick one"));
    }

    #[test]
    fn replay_reports_bad_script() {
        let dir = tempfile::tempdir().expect("temp dir");
        let script = write(dir.path(), "session.json", r#"{"steps":[{"op":"complete"}]}"#);
        assert!(run_replay(&config(script, OutputFormat::Json)).is_err());
        assert!(run_replay(&config(dir.path().join("absent.json"), OutputFormat::Json)).is_err());
    }

    #[test]
    fn describes_sources() {
        let video: serde_json::Value =
            serde_json::from_str(&describe_source("clip.mp4").expect("json")).expect("valid");
        assert_eq!(video["tag"], "video");
        assert_eq!(video["completion"], "loadeddata");
        assert_eq!(video["attributes"].as_array().map(Vec::len), Some(4));

        let image: serde_json::Value =
            serde_json::from_str(&describe_source("photo.png").expect("json")).expect("valid");
        assert_eq!(image["kind"], "image");
        assert_eq!(image["completion"], "load");
    }

    #[test]
    fn steps_sizes() {
        assert_eq!(
            step_size("100", "50", ResizeDirection::Up).as_deref(),
            Some("110x55")
        );
        assert_eq!(step_size("", "50", ResizeDirection::Down), None);
    }
}
