use serde::{Deserialize, Serialize};
use shelf_core::view::{ViewConfig, ViewFlavor};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub storage: Storage,
    pub view: Option<View>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Storage {
    /// JSON file holding the collection; defaults to `<config_dir>/data/shelf.json`
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct View {
    /// full|readonly
    pub mode: Option<ViewFlavor>,
    /// Views longer than this are windowed (default: 50)
    pub virtualization_threshold: Option<usize>,
    /// Row height in pixels (default: 180)
    pub item_height: Option<u32>,
    /// Rows kept above and below the viewport (default: 5)
    pub buffer_size: Option<usize>,
    pub search_debounce_ms: Option<u64>,
    pub scroll_throttle_ms: Option<u64>,
    /// How long notifications stay visible (default: 3000)
    pub notification_ms: Option<u64>,
    pub empty_placeholder: Option<String>,
    pub error_placeholder: Option<String>,
    pub no_results_placeholder: Option<String>,
}

impl Settings {
    /// Engine options with unset keys taken from [`ViewConfig::default`].
    pub fn view_config(&self) -> ViewConfig {
        let mut cfg = ViewConfig::default();
        let Some(v) = &self.view else {
            return cfg;
        };
        if let Some(mode) = v.mode {
            cfg.mode = mode;
        }
        if let Some(n) = v.virtualization_threshold {
            cfg.virtualization_threshold = n;
        }
        if let Some(h) = v.item_height {
            cfg.item_height = h;
        }
        if let Some(b) = v.buffer_size {
            cfg.buffer_size = b;
        }
        if let Some(ms) = v.search_debounce_ms {
            cfg.search_debounce_ms = ms;
        }
        if let Some(ms) = v.scroll_throttle_ms {
            cfg.scroll_throttle_ms = ms;
        }
        if let Some(ms) = v.notification_ms {
            cfg.notification_ms = ms;
        }
        if let Some(s) = &v.empty_placeholder {
            cfg.empty_placeholder = s.clone();
        }
        if let Some(s) = &v.error_placeholder {
            cfg.error_placeholder = s.clone();
        }
        if let Some(s) = &v.no_results_placeholder {
            cfg.no_results_placeholder = s.clone();
        }
        cfg
    }

    pub fn store_path(&self) -> PathBuf {
        match &self.storage.path {
            Some(p) if !p.as_os_str().is_empty() => p.clone(),
            _ => config_dir().join("data").join("shelf.json"),
        }
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(bd) = directories::BaseDirs::new() {
        bd.config_dir().join("shelf")
    } else {
        PathBuf::from("./.config/shelf")
    }
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

/// Reads settings from `path` (or the default location). A missing file gives
/// defaults; a malformed one is reported and ignored.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let path = path.map(Path::to_path_buf).unwrap_or_else(settings_path);
    let Ok(s) = std::fs::read_to_string(&path) else {
        return Settings::default();
    };
    match toml::from_str(&s) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings");
            Settings::default()
        }
    }
}
