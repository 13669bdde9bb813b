//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML and carries one
//! section per concern. Every section defaults sensibly so an empty file is
//! valid; the required credentials usually arrive through environment
//! variables (see [`Config::apply_env`]) and are checked by
//! [`Config::validate`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::Error;

/// Default per-run row quota.
pub const DEFAULT_MAX_ROWS: usize = 20;

/// Files searched when no `--config` path is given.
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "./sheetcast.toml",
    "~/.config/sheetcast/config.toml",
    "/etc/sheetcast/config.toml",
];

pub const ENV_SHEET_ID: &str = "SHEET_ID";
pub const ENV_SHEET_TAB: &str = "SHEET_TAB";
pub const ENV_GOOGLE_ACCESS_TOKEN: &str = "GOOGLE_ACCESS_TOKEN";
pub const ENV_TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const ENV_BATCH_SIZE: &str = "BATCH_SIZE";
pub const ENV_PACING_MS: &str = "PACING_MS";
pub const ENV_WORK_DIR: &str = "WORK_DIR";
pub const ENV_FFMPEG_PATH: &str = "FFMPEG_PATH";

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sheet: SheetConfig,
    pub google: GoogleConfig,
    pub telegram: TelegramConfig,
    pub batch: BatchConfig,
    pub tools: ToolsConfig,
    pub transcode: TranscodeConfig,
}

impl Config {
    /// Deserialize a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Config(format!("config parse error: {e}")))
    }

    /// Load configuration from `path`, or from the first default location
    /// that exists, or fall back to defaults.
    ///
    /// An explicit path that cannot be read is an error; missing default
    /// locations are not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("failed to read config file {}: {e}", path.display()))
            })?;
            return Self::from_toml(&contents);
        }

        for candidate in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(candidate);
            let candidate = Path::new(expanded.as_ref());
            if candidate.exists() {
                tracing::debug!("Loading config from {}", candidate.display());
                let contents = std::fs::read_to_string(candidate)?;
                return Self::from_toml(&contents);
            }
        }

        tracing::debug!("No config file found; using defaults");
        Ok(Self::default())
    }

    /// Overlay environment-style settings on top of the loaded values.
    ///
    /// `lookup` is usually `|k| std::env::var(k).ok()`; tests pass a map.
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_SHEET_ID) {
            self.sheet.spreadsheet_id = v;
        }
        if let Some(v) = get(ENV_SHEET_TAB) {
            self.sheet.tab = Some(v);
        }
        if let Some(v) = get(ENV_GOOGLE_ACCESS_TOKEN) {
            self.google.access_token = Some(v.trim().to_string());
        }
        if let Some(v) = get(ENV_TELEGRAM_BOT_TOKEN) {
            self.telegram.bot_token = v;
        }
        if let Some(v) = get(ENV_TELEGRAM_CHAT_ID) {
            self.telegram.chat_id = v;
        }
        if let Some(v) = get(ENV_BATCH_SIZE) {
            self.batch.max_rows = v.trim().parse().map_err(|_| {
                Error::Config(format!("{ENV_BATCH_SIZE} must be a non-negative integer, got {v:?}"))
            })?;
        }
        if let Some(v) = get(ENV_PACING_MS) {
            self.batch.pacing_ms = v.trim().parse().map_err(|_| {
                Error::Config(format!("{ENV_PACING_MS} must be a non-negative integer, got {v:?}"))
            })?;
        }
        if let Some(v) = get(ENV_WORK_DIR) {
            self.batch.work_dir = PathBuf::from(shellexpand::tilde(&v).as_ref());
        }
        if let Some(v) = get(ENV_FFMPEG_PATH) {
            self.tools.ffmpeg_path = Some(PathBuf::from(v));
        }

        Ok(())
    }

    /// Load from file (or defaults), apply the process environment, and
    /// validate. This is what the binary calls at startup.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Fail when a value the pipeline cannot run without is missing.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();

        if self.sheet.spreadsheet_id.trim().is_empty() {
            missing.push(ENV_SHEET_ID);
        }
        if self
            .google
            .access_token
            .as_deref()
            .map_or(true, |t| t.trim().is_empty())
        {
            missing.push(ENV_GOOGLE_ACCESS_TOKEN);
        }
        if self.telegram.bot_token.trim().is_empty() {
            missing.push(ENV_TELEGRAM_BOT_TOKEN);
        }
        if self.telegram.chat_id.trim().is_empty() {
            missing.push(ENV_TELEGRAM_CHAT_ID);
        }

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.batch.max_rows == 0 {
            warnings.push("batch.max_rows is 0; runs will not attempt any row".into());
        }
        if self.batch.pacing_ms == 0 {
            warnings.push("batch.pacing_ms is 0; requests are not rate limited".into());
        }
        if let Some(ref ffmpeg) = self.tools.ffmpeg_path {
            if !ffmpeg.exists() {
                warnings.push(format!(
                    "tools.ffmpeg_path {} does not exist; falling back to PATH",
                    ffmpeg.display()
                ));
            }
        }

        let presets = [
            "ultrafast", "superfast", "veryfast", "faster", "fast", "medium", "slow", "slower",
            "veryslow",
        ];
        if !presets.contains(&self.transcode.video_preset.as_str()) {
            warnings.push(format!(
                "transcode.video_preset '{}' is not a recognized x264 preset",
                self.transcode.video_preset
            ));
        }
        if self.transcode.video_crf > 51 {
            warnings.push(format!(
                "transcode.video_crf {} is outside the x264 range 0-51",
                self.transcode.video_crf
            ));
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Spreadsheet location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Spreadsheet key (the long id in the sheet URL).
    pub spreadsheet_id: String,
    /// Worksheet title; `None` uses the first sheet.
    pub tab: Option<String>,
    pub api_base: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            tab: None,
            api_base: "https://sheets.googleapis.com".into(),
        }
    }
}

/// Google API access (Sheets and Drive share the token).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// OAuth bearer token with `spreadsheets` and `drive.readonly` scopes.
    pub access_token: Option<String>,
    pub drive_api_base: String,
    pub download_timeout_secs: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            drive_api_base: "https://www.googleapis.com".into(),
            download_timeout_secs: 300,
        }
    }
}

impl GoogleConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

/// Telegram bot used as the publishing target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
    pub upload_timeout_secs: u64,
    pub lookup_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: "https://api.telegram.org".into(),
            upload_timeout_secs: 300,
            lookup_timeout_secs: 60,
        }
    }
}

impl TelegramConfig {
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

/// Batch driver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of attempted rows per run.
    pub max_rows: usize,
    /// Fixed delay between rows, in milliseconds.
    pub pacing_ms: u64,
    /// Directory holding the per-row scratch files.
    pub work_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            pacing_ms: 1000,
            work_dir: std::env::temp_dir(),
        }
    }
}

impl BatchConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

/// External tool path overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
}

/// Web MP4 encoding parameters (H.264 + AAC-LC).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    pub video_preset: String,
    pub video_crf: u32,
    pub frame_rate: u32,
    pub audio_bitrate: String,
    pub audio_sample_rate: u32,
    pub timeout_secs: u64,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            video_preset: "veryfast".into(),
            video_crf: 23,
            frame_rate: 30,
            audio_bitrate: "128k".into(),
            audio_sample_rate: 44100,
            timeout_secs: 86400,
        }
    }
}

impl TranscodeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
