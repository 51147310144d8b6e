// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::config::ViewerConfig;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "scene-tour")]
#[command(about = "First-person viewer with a scripted valley tour", long_about = None)]
pub struct Cli {
    /// JSON config file; omitted fields keep their defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Asset root directory
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Initial window width
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height
    #[arg(long)]
    pub height: Option<u32>,

    /// Start with the autopilot tour engaged
    #[arg(long)]
    pub autopilot: bool,

    /// Start with fog enabled
    #[arg(long)]
    pub fog: bool,

    /// Keep the startup projection when the window is resized
    #[arg(long = "static-aspect")]
    pub static_aspect: bool,
}

impl Cli {
    /// Load the config file (or defaults) and apply command-line overrides
    pub fn resolve(&self) -> anyhow::Result<ViewerConfig> {
        let config = match &self.config {
            Some(path) => ViewerConfig::load(path)?,
            None => ViewerConfig::default(),
        };
        Ok(self.apply(config))
    }

    pub fn apply(&self, mut config: ViewerConfig) -> ViewerConfig {
        if let Some(assets) = &self.assets {
            config.assets.root = assets.clone();
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        config.autopilot |= self.autopilot;
        config.fog |= self.fog;
        config.static_aspect |= self.static_aspect;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["scene-tour"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.autopilot);
        assert_eq!(cli.resolve().unwrap(), ViewerConfig::default());
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::try_parse_from([
            "scene-tour",
            "--assets",
            "/data/valley",
            "--width",
            "800",
            "--height",
            "600",
            "--autopilot",
            "--static-aspect",
        ])
        .unwrap();
        let config = cli.apply(ViewerConfig::default());
        assert_eq!(config.assets.root, PathBuf::from("/data/valley"));
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert!(config.autopilot);
        assert!(config.static_aspect);
        assert!(!config.fog);
    }

    #[test]
    fn test_flags_do_not_clear_config_values() {
        let cli = Cli::default();
        let mut base = ViewerConfig::default();
        base.fog = true;
        assert!(cli.apply(base).fog);
    }

    #[test]
    fn test_missing_config_file_fails() {
        let cli = Cli::try_parse_from(["scene-tour", "--config", "missing.json"]).unwrap();
        assert!(cli.resolve().is_err());
    }
}
