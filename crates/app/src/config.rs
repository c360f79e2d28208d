//! Settings file and command line

use anyhow::{bail, Context};
use capture_wgc::{CaptureTarget, TargetInfo};
use clap::{ArgGroup, Parser};
use render::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Read when no `--config` is given and the file exists
pub const DEFAULT_CONFIG_FILE: &str = "wintransform.json";

/// Which capture target to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetSelector {
    /// First window whose title contains this text, ignoring case
    Window(String),
    /// Monitor by enumeration order
    Monitor(usize),
}

impl TargetSelector {
    pub fn resolve<'a>(&self, targets: &'a [TargetInfo]) -> anyhow::Result<&'a TargetInfo> {
        match self {
            TargetSelector::Window(needle) => {
                let needle = needle.to_lowercase();
                targets
                    .iter()
                    .filter(|info| matches!(info.target, CaptureTarget::Window(_)))
                    .find(|info| info.name.to_lowercase().contains(&needle))
                    .with_context(|| format!("No window title contains \"{needle}\""))
            }
            TargetSelector::Monitor(index) => targets
                .iter()
                .filter(|info| info.is_monitor())
                .nth(*index)
                .with_context(|| format!("No monitor with index {index}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub target: Option<TargetSelector>,
    /// Host window client size
    #[serde(alias = "windowWidth")]
    pub window_width: i32,
    #[serde(alias = "windowHeight")]
    pub window_height: i32,
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    #[serde(alias = "logFilter")]
    pub log_filter: String,
    #[serde(alias = "backoffMs")]
    pub backoff_ms: u64,
    #[serde(alias = "fpsSampleSecs")]
    pub fps_sample_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target: None,
            window_width: 800,
            window_height: 600,
            log_filter: "info".into(),
            backoff_ms: 1000,
            fps_sample_secs: 5,
        }
    }
}

impl AppConfig {
    /// Load `path`, or the default file if present, or fall back to defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        if config.window_width <= 0 || config.window_height <= 0 {
            bail!(
                "window size must be positive, got {}x{}",
                config.window_width,
                config.window_height
            );
        }
        Ok(config)
    }

    /// The configured target, or the first monitor
    pub fn resolve_target<'a>(&self, targets: &'a [TargetInfo]) -> anyhow::Result<&'a TargetInfo> {
        self.target
            .as_ref()
            .unwrap_or(&TargetSelector::Monitor(0))
            .resolve(targets)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            backoff: Duration::from_millis(self.backoff_ms),
            fps_sample_period: Duration::from_secs(self.fps_sample_secs.max(1)),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "wintransform", version)]
#[command(group(ArgGroup::new("target").args(["window", "monitor"])))]
pub struct CliArgs {
    /// List capture targets and exit
    #[arg(short, long)]
    pub list: bool,
    /// Show the first window whose title contains this text
    #[arg(short, long, value_name = "TITLE")]
    pub window: Option<String>,
    /// Show a monitor by enumeration order
    #[arg(short, long, value_name = "INDEX")]
    pub monitor: Option<usize>,
    /// Settings file, `wintransform.json` if omitted
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    pub fn target(&self) -> Option<TargetSelector> {
        match (&self.window, self.monitor) {
            (Some(title), _) => Some(TargetSelector::Window(title.clone())),
            (None, Some(index)) => Some(TargetSelector::Monitor(index)),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once("wintransform").chain(list.iter().copied()))
    }

    fn targets() -> Vec<TargetInfo> {
        vec![
            TargetInfo {
                name: "Notepad - notes.txt".into(),
                target: CaptureTarget::Window(10),
            },
            TargetInfo {
                name: "Calculator".into(),
                target: CaptureTarget::Window(11),
            },
            TargetInfo {
                name: r"\\.\DISPLAY1".into(),
                target: CaptureTarget::Monitor(1),
            },
            TargetInfo {
                name: r"\\.\DISPLAY2".into(),
                target: CaptureTarget::Monitor(2),
            },
        ]
    }

    #[test]
    fn camel_case_config() {
        let config = AppConfig::from_json(
            r#"{ "target": { "window": "notepad" }, "windowWidth": 1024, "backoffMs": 250 }"#,
        )
        .unwrap();
        assert_eq!(config.target, Some(TargetSelector::Window("notepad".into())));
        assert_eq!(config.window_width, 1024);
        assert_eq!(config.window_height, 600);
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.pipeline_config().backoff, Duration::from_millis(250));
    }

    #[test]
    fn rejects_empty_window() {
        assert!(AppConfig::from_json(r#"{ "window_height": 0 }"#).is_err());
    }

    #[test]
    fn defaults_match_pipeline_defaults() {
        assert_eq!(AppConfig::default().pipeline_config(), PipelineConfig::default());
    }

    #[test]
    fn cli_selectors() {
        let parsed = args(&["--monitor", "1", "--config", "custom.json"]).unwrap();
        assert_eq!(parsed.target(), Some(TargetSelector::Monitor(1)));
        assert_eq!(parsed.config, Some(PathBuf::from("custom.json")));
        assert!(!parsed.list);

        assert!(args(&["--list"]).unwrap().list);
        assert!(args(&["--monitor", "first"]).is_err());
        assert!(args(&["--window"]).is_err());
        assert!(args(&["--fullscreen"]).is_err());
        assert_eq!(args(&[]).unwrap().target(), None);
    }

    #[test]
    fn cli_window_and_monitor_conflict() {
        let parsed = args(&["-w", "Notepad"]).unwrap();
        assert_eq!(parsed.target(), Some(TargetSelector::Window("Notepad".into())));

        let err = args(&["--window", "Notepad", "--monitor", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn resolves_targets() {
        let targets = targets();

        let found = TargetSelector::Window("NOTES".into()).resolve(&targets).unwrap();
        assert_eq!(found.target, CaptureTarget::Window(10));

        let found = TargetSelector::Monitor(1).resolve(&targets).unwrap();
        assert_eq!(found.target, CaptureTarget::Monitor(2));

        // Monitor names never match a window search
        assert!(TargetSelector::Window("display".into()).resolve(&targets).is_err());
        assert!(TargetSelector::Monitor(2).resolve(&targets).is_err());
    }

    #[test]
    fn default_target_is_first_monitor() {
        let targets = targets();
        let found = AppConfig::default().resolve_target(&targets).unwrap();
        assert_eq!(found.target, CaptureTarget::Monitor(1));
    }
}
