use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{fs, path::PathBuf, sync::RwLock};

pub const DEFAULT_KB_DEBOUNCE_MS: u64 = 1500;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSettings {
    /// Quiet period after the last code edit before the agent's view of the
    /// code is refreshed.
    pub kb_debounce_ms: u64,
    /// Client tool definitions forwarded to the conversation agent at start,
    /// when the handle supports them.
    #[serde(default)]
    pub client_tools: HashMap<String, serde_json::Value>,
}

impl Default for InterviewSettings {
    fn default() -> Self {
        Self {
            kb_debounce_ms: DEFAULT_KB_DEBOUNCE_MS,
            client_tools: HashMap::new(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<InterviewSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            InterviewSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn snapshot(&self) -> InterviewSettings {
        self.data.read().unwrap().clone()
    }

    pub fn update(&self, settings: InterviewSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            *guard = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: InterviewSettings = serde_json::from_str(&contents)?;
        let mut guard = self.data.write().unwrap();
        *guard = data;
        Ok(())
    }

    fn persist(&self, data: &InterviewSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
