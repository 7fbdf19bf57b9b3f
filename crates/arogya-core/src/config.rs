use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use crate::error::{ChatError, Result};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const SERVER_URL_ENV: &str = "AROGYA_SERVER_URL";

/// How the transient "waiting for reply" bubble is drawn
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadingIndicatorStyle {
    /// Three dots pulsing in turn
    #[default]
    Dots,
    /// A growing "..." string
    Ellipsis,
}

/// What to do with a submission while another reply is still outstanding
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusyPolicy {
    #[default]
    Reject,
    Queue,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BubbleAlign {
    Left,
    Right,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BubbleStyle {
    pub label: String,
    /// Colour name or `#rrggbb`, interpreted by the front end
    pub color: String,
    pub align: BubbleAlign,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BubbleStyles {
    pub user: BubbleStyle,
    pub ai: BubbleStyle,
}

impl Default for BubbleStyles {
    fn default() -> Self {
        Self {
            user: BubbleStyle {
                label: "You".to_string(),
                color: "cyan".to_string(),
                align: BubbleAlign::Right,
            },
            ai: BubbleStyle {
                label: "Arogya".to_string(),
                color: "yellow".to_string(),
                align: BubbleAlign::Left,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WidgetConfig {
    pub server_url: String,
    pub loading_indicator_style: LoadingIndicatorStyle,
    pub bubbles: BubbleStyles,
    pub welcome_message: String,
    pub error_message: String,
    pub suggestions: Vec<String>,
    pub busy_policy: BusyPolicy,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            loading_indicator_style: LoadingIndicatorStyle::default(),
            bubbles: BubbleStyles::default(),
            welcome_message: "Hello! I'm Arogya AI. What is your primary health goal today?"
                .to_string(),
            error_message:
                "Sorry, I'm having trouble connecting. Please check the console and try again."
                    .to_string(),
            suggestions: vec![
                "Create a meal plan for weight loss".to_string(),
                "Suggest a 20 minute home workout".to_string(),
                "How much water should I drink daily?".to_string(),
            ],
            busy_policy: BusyPolicy::default(),
        }
    }
}

impl WidgetConfig {
    /// Load from the default location, falling back to defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: WidgetConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply `AROGYA_SERVER_URL`, then an explicit override (CLI flag)
    pub fn with_overrides(self, server_url: Option<String>) -> Self {
        self.apply_overrides(std::env::var(SERVER_URL_ENV).ok(), server_url)
    }

    /// CLI beats env beats the file. A blank env value is ignored.
    pub fn apply_overrides(mut self, env_url: Option<String>, cli_url: Option<String>) -> Self {
        if let Some(url) = env_url.filter(|u| !u.trim().is_empty()) {
            self.server_url = url;
        }
        if let Some(url) = cli_url {
            self.server_url = url;
        }
        self
    }

    pub fn chat_endpoint(&self) -> String {
        format!("{}/chat", self.server_url.trim_end_matches('/'))
    }

    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(ChatError::NoConfigDir)?;
        Ok(dir.join("arogya"))
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}
