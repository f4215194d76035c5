//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--no-mouse`, `--theme`)
//! 2. `--config <path>`
//! 3. `$NOTETREE_CONFIG` environment variable (path to config file)
//! 4. Project-local `.notetree.toml` in the current working directory
//! 5. Global `~/.config/notetree/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fs::tree::TreeOptions;
use crate::note::highlight::DEFAULT_SYNTAX_THEME;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Notes folder (overridden by CLI positional arg).
    pub default_path: Option<String>,
    /// Enable mouse support.
    pub mouse: Option<bool>,
}

/// Tree panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Panel width in columns.
    pub width: Option<u16>,
    /// Folders start expanded after the initial walk.
    pub expand_on_load: Option<bool>,
    /// Blank line before each top-level folder.
    pub folder_gap: Option<bool>,
    /// Extension of note files, without the dot.
    pub note_extension: Option<String>,
    /// Use nerd font icons (false = ASCII fallback).
    pub show_icons: Option<bool>,
}

/// Note panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NoteConfig {
    /// Markdown syntax highlighting.
    pub highlight: Option<bool>,
    /// Syntax highlighting theme (syntect theme name).
    pub syntax_theme: Option<String>,
    pub word_wrap: Option<bool>,
}

/// Color overrides for the `custom` scheme.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub tree_fg: Option<String>,
    pub tree_selected_bg: Option<String>,
    pub tree_selected_fg: Option<String>,
    pub tree_hover_bg: Option<String>,
    pub tree_folder_fg: Option<String>,
    pub tree_file_fg: Option<String>,
    pub note_fg: Option<String>,
    pub note_title_fg: Option<String>,
    pub note_hint_fg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
    pub border_fg: Option<String>,
    pub dialog_bg: Option<String>,
    pub dialog_border_fg: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark", "light", "custom".
    pub scheme: Option<String>,
    /// Custom color overrides.
    pub custom: Option<ThemeColorsConfig>,
}

/// Log file settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. `"debug"` or `"notetree=trace"`.
    pub level: Option<String>,
    pub file: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub tree: TreeConfig,
    pub note: NoteConfig,
    pub theme: ThemeConfig,
    pub log: LogConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

pub const DEFAULT_TREE_WIDTH: u16 = 30;
pub const DEFAULT_NOTE_EXTENSION: &str = "md";
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Candidate config file paths in priority order, `--config` excluded.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("NOTETREE_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".notetree.toml"));
    }
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("notetree").join("config.toml"));
    }

    paths
}

/// Read and parse one config file. A missing file is `Ok(None)`; a file
/// that exists but does not parse is an error message.
fn load_file(path: &Path) -> Result<Option<AppConfig>, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Ok(None),
    };
    toml::from_str::<AppConfig>(&content)
        .map(Some)
        .map_err(|e| format!("failed to parse config file {}: {}", path.display(), e))
}

// ── Merge logic ──────────────────────────────────────────────────────────────

fn pick<T: Clone>(over: &Option<T>, base: Option<T>) -> Option<T> {
    over.clone().or(base)
}

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                default_path: pick(&other.general.default_path, self.general.default_path),
                mouse: pick(&other.general.mouse, self.general.mouse),
            },
            tree: TreeConfig {
                width: pick(&other.tree.width, self.tree.width),
                expand_on_load: pick(&other.tree.expand_on_load, self.tree.expand_on_load),
                folder_gap: pick(&other.tree.folder_gap, self.tree.folder_gap),
                note_extension: pick(&other.tree.note_extension, self.tree.note_extension),
                show_icons: pick(&other.tree.show_icons, self.tree.show_icons),
            },
            note: NoteConfig {
                highlight: pick(&other.note.highlight, self.note.highlight),
                syntax_theme: pick(&other.note.syntax_theme, self.note.syntax_theme),
                word_wrap: pick(&other.note.word_wrap, self.note.word_wrap),
            },
            theme: ThemeConfig {
                scheme: pick(&other.theme.scheme, self.theme.scheme),
                custom: pick(&other.theme.custom, self.theme.custom),
            },
            log: LogConfig {
                level: pick(&other.log.level, self.log.level),
                file: pick(&other.log.file, self.log.file),
            },
        }
    }

    /// Load the final merged configuration, plus a warning for every file
    /// that existed but could not be parsed.
    pub fn load(
        cli_config_path: Option<&Path>,
        cli_overrides: Option<&AppConfig>,
    ) -> (AppConfig, Vec<String>) {
        let mut config = AppConfig::default();
        let mut warnings = Vec::new();

        let mut sources: Vec<PathBuf> = candidate_paths().into_iter().rev().collect();
        if let Some(cli_path) = cli_config_path {
            sources.push(cli_path.to_path_buf());
        }

        // Lowest priority first so later sources overwrite.
        for path in &sources {
            match load_file(path) {
                Ok(Some(file_cfg)) => config = config.merge(&file_cfg),
                Ok(None) => {}
                Err(warning) => warnings.push(warning),
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        (config, warnings)
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    pub fn tree_width(&self) -> u16 {
        self.tree.width.unwrap_or(DEFAULT_TREE_WIDTH)
    }

    pub fn expand_on_load(&self) -> bool {
        self.tree.expand_on_load.unwrap_or(true)
    }

    pub fn folder_gap(&self) -> bool {
        self.tree.folder_gap.unwrap_or(false)
    }

    /// Note extension without a leading dot.
    pub fn note_extension(&self) -> &str {
        self.tree
            .note_extension
            .as_deref()
            .map(|e| e.trim_start_matches('.'))
            .unwrap_or(DEFAULT_NOTE_EXTENSION)
    }

    pub fn show_icons(&self) -> bool {
        self.tree.show_icons.unwrap_or(true)
    }

    pub fn highlight_enabled(&self) -> bool {
        self.note.highlight.unwrap_or(true)
    }

    pub fn syntax_theme_name(&self) -> &str {
        self.note
            .syntax_theme
            .as_deref()
            .unwrap_or(DEFAULT_SYNTAX_THEME)
    }

    pub fn word_wrap(&self) -> bool {
        self.note.word_wrap.unwrap_or(true)
    }

    /// Theme scheme: "dark", "light", or "custom".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Log file path: configured, else under the platform data dir.
    pub fn log_file(&self) -> Option<PathBuf> {
        match &self.log.file {
            Some(file) => Some(PathBuf::from(file)),
            None => dirs::data_local_dir().map(|d| d.join("notetree").join("notetree.log")),
        }
    }

    /// Tree construction policy derived from the `[tree]` section.
    pub fn tree_options(&self) -> TreeOptions {
        TreeOptions {
            expand_on_load: self.expand_on_load(),
            folder_gap: self.folder_gap(),
            note_extension: self.note_extension().to_string(),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let cfg = AppConfig::default();
        assert!(cfg.mouse_enabled());
        assert_eq!(cfg.tree_width(), 30);
        assert!(cfg.expand_on_load());
        assert!(!cfg.folder_gap());
        assert_eq!(cfg.note_extension(), "md");
        assert!(cfg.show_icons());
        assert!(cfg.highlight_enabled());
        assert_eq!(cfg.syntax_theme_name(), "base16-ocean.dark");
        assert!(cfg.word_wrap());
        assert_eq!(cfg.theme_scheme(), "dark");
        assert_eq!(cfg.log_level(), "info");
        assert_eq!(cfg.tree_options(), TreeOptions::default());
    }

    #[test]
    fn test_toml_parsing_full() {
        let toml = r#"
[general]
default_path = "~/notes"
mouse = false

[tree]
width = 40
expand_on_load = false
folder_gap = true
note_extension = ".txt"
show_icons = false

[note]
highlight = false
syntax_theme = "Solarized (dark)"
word_wrap = false

[theme]
scheme = "light"

[log]
level = "debug"
file = "/tmp/nt.log"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.general.default_path.as_deref(), Some("~/notes"));
        assert!(!cfg.mouse_enabled());
        assert_eq!(cfg.tree_width(), 40);
        assert!(!cfg.expand_on_load());
        assert!(cfg.folder_gap());
        assert_eq!(cfg.note_extension(), "txt");
        assert!(!cfg.show_icons());
        assert!(!cfg.highlight_enabled());
        assert_eq!(cfg.syntax_theme_name(), "Solarized (dark)");
        assert!(!cfg.word_wrap());
        assert_eq!(cfg.theme_scheme(), "light");
        assert_eq!(cfg.log_level(), "debug");
        assert_eq!(cfg.log_file(), Some(PathBuf::from("/tmp/nt.log")));
    }

    #[test]
    fn test_toml_parsing_partial() {
        let cfg: AppConfig = toml::from_str("[tree]\nfolder_gap = true\n").expect("parse failed");
        assert!(cfg.folder_gap());
        assert!(cfg.expand_on_load());
        assert_eq!(cfg.note_extension(), "md");
    }

    #[test]
    fn test_tree_options_follow_config() {
        let cfg: AppConfig =
            toml::from_str("[tree]\nexpand_on_load = false\nnote_extension = \"txt\"\n")
                .expect("parse failed");
        let options = cfg.tree_options();
        assert!(!options.expand_on_load);
        assert!(!options.folder_gap);
        assert_eq!(options.note_extension, "txt");
    }

    #[test]
    fn test_merge_overrides() {
        let base = AppConfig {
            tree: TreeConfig {
                width: Some(25),
                folder_gap: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let over = AppConfig {
            tree: TreeConfig {
                width: Some(50),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert_eq!(merged.tree_width(), 50);
        assert!(merged.folder_gap());
    }

    #[test]
    fn test_merge_none_does_not_clear_some() {
        let base = AppConfig {
            log: LogConfig {
                level: Some("trace".into()),
                file: None,
            },
            ..Default::default()
        };
        let merged = base.merge(&AppConfig::default());
        assert_eq!(merged.log_level(), "trace");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("test-config.toml");
        let mut f = std::fs::File::create(&cfg_path).expect("create");
        writeln!(f, "[note]\nhighlight = false\n").expect("write");

        let cfg = load_file(&cfg_path).expect("read").expect("present");
        assert!(!cfg.highlight_enabled());
        assert!(cfg.word_wrap());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(load_file(Path::new("/nonexistent/config.toml")), Ok(None)));
    }

    #[test]
    fn test_load_invalid_toml_is_warning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("bad.toml");
        std::fs::write(&cfg_path, "this is { not valid toml").expect("write");
        let err = load_file(&cfg_path).unwrap_err();
        assert!(err.contains("bad.toml"));

        let (cfg, warnings) = AppConfig::load(Some(&cfg_path), None);
        assert_eq!(warnings.len(), 1);
        assert_eq!(cfg.tree_width(), 30);
    }

    #[test]
    fn test_load_with_cli_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("config.toml");
        std::fs::write(&cfg_path, "[general]\nmouse = true\n[tree]\nwidth = 44\n").expect("write");

        let cli_overrides = AppConfig {
            general: GeneralConfig {
                mouse: Some(false),
                ..Default::default()
            },
            ..Default::default()
        };

        let (cfg, warnings) = AppConfig::load(Some(&cfg_path), Some(&cli_overrides));
        assert!(warnings.is_empty());
        assert!(!cfg.mouse_enabled());
        assert_eq!(cfg.tree_width(), 44);
    }

    #[test]
    fn test_theme_custom_colors() {
        let toml = r##"
[theme]
scheme = "custom"

[theme.custom]
tree_folder_fg = "#1a1b26"
note_hint_fg = "#c0caf5"
"##;
        let cfg: AppConfig = toml::from_str(toml).expect("parse");
        assert_eq!(cfg.theme_scheme(), "custom");
        let custom = cfg.theme.custom.as_ref().expect("custom present");
        assert_eq!(custom.tree_folder_fg.as_deref(), Some("#1a1b26"));
        assert_eq!(custom.note_hint_fg.as_deref(), Some("#c0caf5"));
        assert!(custom.dialog_bg.is_none());
    }
}
