//! Configuration handling for taskmark
//!
//! Settings are read from `--config <path>`, else `.taskmark.toml` in the
//! current directory or an ancestor, else `config.toml` in the platform
//! config directory, else built-in defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    parse_marks, AggregateOptions, Behavior, Category, CategoryMarks, ChildBlock, ProgressOptions,
    StatusConfig, Theme,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Marker categories and counting overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusSettings {
    /// Pipe-delimited marks per category
    pub completed: String,
    pub in_progress: String,
    pub abandoned: String,
    pub planned: String,
    pub not_started: String,

    /// Category for marks no category lists
    pub count_other_statuses_as: Category,

    /// Marks never counted
    pub exclude_marks: String,

    /// Count only `only_count_marks` (plus blank boxes)
    pub use_only_count_marks: bool,
    pub only_count_marks: String,

    /// Replace the category marks with a predefined theme
    pub theme: Option<String>,

    /// Derive categories from the switcher cycle instead of the strings above
    pub derive_from_cycle: bool,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            completed: "x|X".to_string(),
            in_progress: ">|/".to_string(),
            abandoned: "-".to_string(),
            planned: "?".to_string(),
            not_started: " ".to_string(),
            count_other_statuses_as: Category::NotStarted,
            exclude_marks: String::new(),
            use_only_count_marks: false,
            only_count_marks: "x|X".to_string(),
            theme: None,
            derive_from_cycle: false,
        }
    }
}

/// The status cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitcherSettings {
    pub cycle: Vec<String>,
    pub excluded_from_cycle: Vec<String>,
    /// Status name to its single-character mark
    pub marks: BTreeMap<String, String>,
}

impl Default for SwitcherSettings {
    fn default() -> Self {
        let cycle = ["TODO", "DOING", "IN-PROGRESS", "DONE"];
        let marks = [" ", "-", ">", "x"];
        Self {
            cycle: cycle.iter().map(|s| s.to_string()).collect(),
            marks: cycle
                .iter()
                .zip(marks)
                .map(|(status, mark)| (status.to_string(), mark.to_string()))
                .collect(),
            excluded_from_cycle: Vec::new(),
        }
    }
}

/// Progress listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    /// Count every descendant rather than direct children only
    pub count_sub_levels: bool,
    /// Report heading sections as well as tasks
    pub heading_progress: bool,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            count_sub_levels: true,
            heading_progress: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Columns per indent level
    pub tab_size: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self { tab_size: 4 }
    }
}

/// Rules for suppressing a document's progress listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilitySettings {
    /// Master switch; the rules below are ignored unless set
    pub hide_based_on_conditions: bool,
    /// Frontmatter key that hides progress when truthy
    pub hide_metadata_key: String,
    /// Frontmatter tags that hide progress
    pub hide_tags: Vec<String>,
    /// Path prefixes whose documents are hidden
    pub hide_folders: Vec<String>,
}

impl Default for VisibilitySettings {
    fn default() -> Self {
        Self {
            hide_based_on_conditions: false,
            hide_metadata_key: "hide-progress-bar".to_string(),
            hide_tags: vec!["no-progress-bar".to_string()],
            hide_folders: Vec::new(),
        }
    }
}

/// Everything a settings file can hold
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub statuses: StatusSettings,
    pub switcher: SwitcherSettings,
    pub behavior: Behavior,
    pub progress: ProgressSettings,
    pub editor: EditorSettings,
    pub visibility: VisibilitySettings,
}

impl Settings {
    /// Parses settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize settings")
    }

    /// Builds the status configuration the core operates on
    pub fn status_config(&self) -> Result<StatusConfig, ConfigError> {
        let statuses = &self.statuses;
        let marks = self.cycle_marks()?;

        let mut config = if statuses.derive_from_cycle {
            StatusConfig::from_cycle(self.switcher.cycle.iter().cloned(), marks)
        } else {
            let mut categories = CategoryMarks::from_strings(
                &statuses.completed,
                &statuses.in_progress,
                &statuses.abandoned,
                &statuses.planned,
                &statuses.not_started,
            );
            if let Some(name) = &statuses.theme {
                let theme: Theme = name.parse().map_err(ConfigError::Invalid)?;
                theme.apply(&mut categories);
            }
            StatusConfig::new(categories).with_cycle(self.switcher.cycle.iter().cloned(), marks)
        };

        for status in &self.switcher.excluded_from_cycle {
            if !self.switcher.cycle.contains(status) {
                tracing::warn!(status = %status, "excluded status is not part of the cycle");
            }
        }

        config = config
            .with_excluded_from_cycle(self.switcher.excluded_from_cycle.iter().cloned())
            .with_exclude_marks(parse_marks(&statuses.exclude_marks))
            .with_fallback(statuses.count_other_statuses_as);

        if statuses.use_only_count_marks {
            let only = parse_marks(statuses.only_count_marks.trim());
            config = config.with_only_count_marks(Some(only));
        }

        Ok(config)
    }

    /// Resolves the switcher's string marks to characters
    fn cycle_marks(&self) -> Result<Vec<(String, char)>, ConfigError> {
        let mut marks = Vec::new();
        for status in &self.switcher.cycle {
            let Some(mark) = self.switcher.marks.get(status) else {
                tracing::warn!(status = %status, "status has no mark; using a blank box");
                continue;
            };
            let mut chars = mark.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => marks.push((status.clone(), c)),
                _ => {
                    return Err(ConfigError::Invalid(format!(
                        "mark for status '{}' must be a single character, got {:?}",
                        status, mark
                    )))
                }
            }
        }
        Ok(marks)
    }

    /// Progress listing options, with `all_levels` and `headings` forcing
    /// the respective behavior on
    pub fn progress_options(&self, all_levels: bool, headings: bool) -> ProgressOptions {
        ProgressOptions {
            count_sub_levels: all_levels || self.progress.count_sub_levels,
            headings: headings || self.progress.heading_progress,
            indent_unit: Some(self.editor.tab_size),
        }
    }

    /// Options for counting under a single anchor
    pub fn aggregate_options(&self, block: &ChildBlock) -> AggregateOptions {
        AggregateOptions::for_block(block, self.progress.count_sub_levels)
            .with_indent_unit(Some(self.editor.tab_size))
    }
}

/// Loaded settings and where they came from
#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    pub source: Option<PathBuf>,
}

impl Config {
    /// Name of the per-project settings file
    pub const FILE_NAME: &'static str = ".taskmark.toml";

    /// Loads settings, preferring an explicit path over discovered files
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self {
                settings: Self::load_file(path)?,
                source: Some(path.to_path_buf()),
            });
        }

        let candidate = Self::find_project_file().or_else(|| {
            Self::global_config_dir()
                .map(|dir| dir.join("config.toml"))
                .filter(|path| path.is_file())
        });

        match candidate {
            Some(path) => Ok(Self {
                settings: Self::load_file(&path)?,
                source: Some(path),
            }),
            None => Ok(Self {
                settings: Settings::default(),
                source: None,
            }),
        }
    }

    /// Reads one settings file
    pub fn load_file(path: &Path) -> Result<Settings> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let settings = Settings::from_toml(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "taskmark", "taskmark").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Finds `.taskmark.toml` in the current directory or an ancestor
    pub fn find_project_file() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let candidate = current.join(Self::FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Writes default settings into `dir`, refusing to overwrite
    pub fn init(dir: &Path) -> Result<PathBuf> {
        let path = dir.join(Self::FILE_NAME);
        if path.exists() {
            anyhow::bail!("{} already exists", path.display());
        }

        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        fs::write(&path, Settings::default().to_toml()?)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        tracing::info!(path = %path.display(), "wrote default settings");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_classic_statuses() {
        let config = Settings::default().status_config().unwrap();

        assert_eq!(config, StatusConfig::default());
        assert_eq!(config.classify('x'), Category::Completed);
        assert_eq!(config.classify('/'), Category::InProgress);
        assert_eq!(config.next_mark(' ', Direction::Forward), Some('-'));
    }

    #[test]
    fn parse_partial_file() {
        let toml = r#"
[statuses]
exclude_marks = "?"
count_other_statuses_as = "planned"

[switcher]
cycle = ["TODO", "DOING", "DONE"]
marks = { TODO = " ", DOING = "/", DONE = "x" }
excluded_from_cycle = ["DOING"]

[behavior]
mark_parent_in_progress_when_partially_complete = true
"#;

        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(settings.statuses.completed, "x|X");
        assert!(!settings.behavior.auto_complete_parent);
        assert!(settings.behavior.mark_parent_in_progress_when_partially_complete);

        let config = settings.status_config().unwrap();
        assert!(config.is_excluded('?'));
        assert_eq!(config.classify('!'), Category::Planned);
        assert_eq!(config.next_mark(' ', Direction::Forward), Some('x'));
    }

    #[test]
    fn defaults_leave_parents_and_visibility_alone() {
        let settings = Settings::default();
        assert!(!settings.behavior.auto_complete_parent);
        assert!(settings.behavior.cycle_complete_status);
        assert!(!settings.visibility.hide_based_on_conditions);
        assert_eq!(settings.editor.tab_size, 4);
    }

    #[test]
    fn tab_size_feeds_progress_options() {
        let mut settings = Settings::default();
        settings.editor.tab_size = 2;
        assert_eq!(settings.progress_options(false, false).indent_unit, Some(2));
    }

    #[test]
    fn theme_overrides_category_strings() {
        let toml = r#"
[statuses]
theme = "minimal"
"#;
        let config = Settings::from_toml(toml).unwrap().status_config().unwrap();
        assert_eq!(config.classify('<'), Category::Planned);
        assert_eq!(config.classify('?'), Category::NotStarted);
    }

    #[test]
    fn unknown_theme_is_invalid() {
        let mut settings = Settings::default();
        settings.statuses.theme = Some("solarized".to_string());
        assert!(matches!(settings.status_config(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn multi_character_mark_is_invalid() {
        let mut settings = Settings::default();
        settings.switcher.marks.insert("DONE".to_string(), "xx".to_string());
        assert!(matches!(settings.status_config(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn derive_categories_from_cycle() {
        let toml = r#"
[statuses]
derive_from_cycle = true

[switcher]
cycle = ["OPEN", "WIP", "SHIPPED"]
marks = { OPEN = " ", WIP = "w", SHIPPED = "s" }
"#;
        let config = Settings::from_toml(toml).unwrap().status_config().unwrap();
        assert_eq!(config.classify('w'), Category::InProgress);
        assert_eq!(config.classify('s'), Category::Completed);
        assert_eq!(config.classify('x'), Category::NotStarted);
    }

    #[test]
    fn only_count_marks_need_opt_in() {
        let mut settings = Settings::default();
        settings.statuses.only_count_marks = "x".to_string();
        assert_eq!(settings.status_config().unwrap().only_count_marks(), None);

        settings.statuses.use_only_count_marks = true;
        assert_eq!(settings.status_config().unwrap().only_count_marks(), Some(&['x'][..]));

        settings.statuses.only_count_marks = " ".to_string();
        let config = settings.status_config().unwrap();
        assert!(config.only_count_marks().is_some_and(<[char]>::is_empty));
        assert!(!config.counts(' '));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(Settings::from_toml("[statuses"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let text = Settings::default().to_toml().unwrap();
        assert_eq!(Settings::from_toml(&text).unwrap(), Settings::default());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = Config::init(dir.path()).unwrap();
        assert!(path.ends_with(Config::FILE_NAME));
        assert!(Config::init(dir.path()).is_err());
    }

    #[test]
    fn explicit_path_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[editor]\ntab_size = 2\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.settings.editor.tab_size, 2);
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
