//! Simulator configuration from environment variables.
use std::env;
use std::path::PathBuf;

use chain_core::ActionType;

/// How the result is printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line of text.
    #[default]
    Summary,
    /// Pretty-printed JSON report.
    Json,
}

#[derive(Clone, Debug)]
pub struct SimConfig {
    pub data_dir: PathBuf,
    pub world: String,
    /// Replaces the world file's requested action type.
    pub action: Option<ActionType>,
    pub output: OutputFormat,
}

impl SimConfig {
    pub const DEFAULT_WORLD: &'static str = "ore_vein";

    /// Construct simulator configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CHAIN_DATA_DIR` - Content directory (default: platform data dir if
    ///   present, else the bundled content)
    /// - `CHAIN_WORLD` - World file name under `worlds/` (default: `ore_vein`)
    /// - `CHAIN_ACTION` - `mining`, `interaction`, `planting` or `harvesting`
    /// - `CHAIN_OUTPUT` - `summary` (default) or `json`
    pub fn from_env() -> Self {
        let data_dir = env::var_os("CHAIN_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let world = env::var("CHAIN_WORLD").unwrap_or_else(|_| Self::DEFAULT_WORLD.to_owned());

        let action = read_env::<ActionType>("CHAIN_ACTION");
        if action.is_none() && env::var_os("CHAIN_ACTION").is_some() {
            tracing::warn!("CHAIN_ACTION is not a known action type; using the world's request");
        }

        let output = match env::var("CHAIN_OUTPUT").ok().as_deref() {
            Some("json") => OutputFormat::Json,
            Some("summary") | None => OutputFormat::Summary,
            Some(other) => {
                tracing::warn!("Unknown CHAIN_OUTPUT {:?}; printing a summary", other);
                OutputFormat::Summary
            }
        };

        Self {
            data_dir,
            world,
            action,
            output,
        }
    }
}

/// Platform data directory when it holds content, else the bundled content.
///
/// - Linux: `~/.local/share/chain-sim` (or `$XDG_DATA_HOME/chain-sim`)
/// - macOS: `~/Library/Application Support/chain-sim`
/// - Windows: `%APPDATA%\chain-sim`
fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "chain-sim")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .filter(|dir| dir.join("worlds").is_dir())
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../chain/content/data")))
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
