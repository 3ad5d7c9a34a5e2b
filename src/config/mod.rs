//! Configuration management for Liftoff.
//!
//! Configuration is read from `~/.config/liftoff/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.spaceflightnewsapi.net/";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub pipeline: PipelineConfig,
    pub swipe: SwipeConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

/// HTTP transport settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub user_agent: String,
    /// Log request and response bodies. Unset means "only in debug builds".
    pub log_bodies: Option<bool>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: 60,
            read_timeout_secs: 60,
            user_agent: concat!("liftoff/", env!("CARGO_PKG_VERSION")).to_string(),
            log_bodies: None,
        }
    }
}

impl ApiConfig {
    pub fn log_bodies(&self) -> bool {
        self.log_bodies.unwrap_or(cfg!(debug_assertions))
    }
}

/// Behaviour of the fetch pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub show_progress: bool,
    pub show_error_toast: bool,
    /// Turn error bodies without a `detail` into an error outcome instead of dropping them.
    pub surface_malformed_errors: bool,
    /// Discard list responses that belong to a superseded request.
    pub sequence_requests: bool,
    /// Skip the interface probe and always treat the network as reachable.
    pub assume_online: bool,
    pub signal_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            show_error_toast: true,
            surface_malformed_errors: false,
            sequence_requests: true,
            assume_online: false,
            signal_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    pub debounce_ms: u64,
    /// Offset swipes from the last fetched article instead of the opened one.
    pub cumulative_ids: bool,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            cumulative_ids: false,
        }
    }
}

impl SwipeConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(config_path)
    }

    /// Load configuration from an explicit path without creating it.
    pub fn load_from(config_path: PathBuf) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/liftoff/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("liftoff").join("config.toml"))
    }

    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Liftoff Configuration
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "1"
# - Special keys: Enter, Tab, BackTab, Backspace, Delete, Home, End,
#   PageUp, PageDown, Up, Down, Left, Right, Esc, Space, F1-F12
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

[api]
base_url = "https://api.spaceflightnewsapi.net/"
connect_timeout_secs = 60
read_timeout_secs = 60

# Log request/response bodies (target "liftoff::http").
# Defaults to on for debug builds only.
# log_bodies = true

[pipeline]
# Publish loader start/stop signals around each request
show_progress = true

# Show a toast for application errors
show_error_toast = true

# Error responses without a "detail" field are dropped silently unless this is set
surface_malformed_errors = false

# Ignore list responses from requests that were superseded by a newer one
sequence_requests = true

# Skip the network interface check
assume_online = false

[swipe]
# Settle time before a detail-view swipe triggers a fetch (milliseconds)
debounce_ms = 300

# Derive the next article id from the last fetched one rather than the opened one
cumulative_ids = false

[colors]
active_border = "Cyan"
inactive_border = "DarkGray"

selection_bg = "Cyan"
selection_fg = "Black"

chip_selected_bg = "Blue"
chip_selected_fg = "White"
chip_fg = "Gray"

metadata_site = "Yellow"
metadata_date = "Yellow"
metadata_link = "Blue"

status_fg = "White"
status_bg = "DarkGray"
toast_fg = "LightRed"

[keybindings]
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
next_page = ["n", "PageDown"]
prev_page = ["p", "PageUp"]
select = ["Enter"]
back = ["Esc", "Backspace"]
search = ["/"]
next_chip = ["]"]
prev_chip = ["["]
toggle_chip = ["Space"]
swipe_prev = ["h", "Left"]
swipe_next = ["l", "Right"]
open_in_browser = ["o"]
refresh = ["R"]
preferences = ["P"]
confirm = ["c"]
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
