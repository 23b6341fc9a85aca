use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// A pipeline file: the annotation vocabulary plus the steps to run, in
/// order, after segmenting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_line_markers")]
    pub line_markers: Vec<String>,
    #[serde(default = "default_block_markers")]
    pub block_markers: Vec<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_line_markers() -> Vec<String> {
    vec!["answer".to_string()]
}

fn default_block_markers() -> Vec<String> {
    ["info", "note", "edit"].map(String::from).to_vec()
}

fn all_cells() -> String {
    "all".to_string()
}

fn markdown_target() -> String {
    "markdown".to_string()
}

/// Built-in literal substitution tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Powers,
    Fractions,
}

/// One pipeline step. `cells` is a kind expression and defaults to `all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    ReplaceStr {
        #[serde(default = "all_cells")]
        cells: String,
        #[serde(default)]
        pairs: Vec<(String, String)>,
        /// Applied before `pairs`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table: Option<Table>,
    },
    ReplaceChar {
        #[serde(default = "all_cells")]
        cells: String,
        pairs: Vec<(String, String)>,
    },
    ReplaceRe {
        #[serde(default = "all_cells")]
        cells: String,
        pairs: Vec<(String, String)>,
    },
    RemoveComments {
        #[serde(default = "all_cells")]
        cells: String,
        #[serde(default)]
        keep: Vec<String>,
    },
    ExpandUrls {
        #[serde(default = "all_cells")]
        cells: String,
        labels: BTreeMap<String, String>,
    },
    CheckUrls {
        #[serde(default = "all_cells")]
        cells: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_secs: Option<u64>,
    },
    CheckBreaks {
        #[serde(default = "all_cells")]
        cells: String,
    },
    CheckLevels,
    CheckLengths {
        #[serde(default = "all_cells")]
        cells: String,
        max: usize,
    },
    CheckComments {
        #[serde(default = "all_cells")]
        cells: String,
    },
    Append {
        text: String,
    },
    Prepend {
        text: String,
        #[serde(default = "markdown_target")]
        target: String,
    },
    Merge {
        #[serde(default = "all_cells")]
        cells: String,
    },
    RemoveCells {
        #[serde(default = "all_cells")]
        cells: String,
        pattern: String,
    },
    RemoveAnnotations {
        #[serde(default = "all_cells")]
        cells: String,
    },
    SetCells {
        #[serde(default = "all_cells")]
        cells: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        editable: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deletable: Option<bool>,
    },
}

impl Step {
    /// The `action` name as written in pipeline files.
    pub fn action(&self) -> &'static str {
        match self {
            Step::ReplaceStr { .. } => "replace_str",
            Step::ReplaceChar { .. } => "replace_char",
            Step::ReplaceRe { .. } => "replace_re",
            Step::RemoveComments { .. } => "remove_comments",
            Step::ExpandUrls { .. } => "expand_urls",
            Step::CheckUrls { .. } => "check_urls",
            Step::CheckBreaks { .. } => "check_breaks",
            Step::CheckLevels => "check_levels",
            Step::CheckLengths { .. } => "check_lengths",
            Step::CheckComments { .. } => "check_comments",
            Step::Append { .. } => "append",
            Step::Prepend { .. } => "prepend",
            Step::Merge { .. } => "merge",
            Step::RemoveCells { .. } => "remove_cells",
            Step::RemoveAnnotations { .. } => "remove_annotations",
            Step::SetCells { .. } => "set_cells",
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            line_markers: default_line_markers(),
            block_markers: default_block_markers(),
            steps: Vec::new(),
        }
    }
}

impl PipelineConfig {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config = Self::from_toml(&content).map_err(|source| ConfigError::ConfigParseError {
            config_path: config_path.to_path_buf(),
            source,
        })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-notebook");
        PathBuf::from(config_dir.as_ref()).join("pipeline.toml")
    }

    /// Expands `~` and environment variables, leaving the path unchanged
    /// when a variable is undefined.
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(_) => path.to_path_buf(),
        }
    }

    /// A starter pipeline: trims cells, checks headings and line breaks, and
    /// fills answer placeholders.
    pub fn example() -> Self {
        let prose = "md:text md:note md:info md:edit".to_string();
        Self {
            steps: vec![
                Step::ReplaceRe {
                    cells: all_cells(),
                    pairs: vec![
                        (r"^\s+".to_string(), String::new()),
                        (r"\s+$".to_string(), String::new()),
                    ],
                },
                Step::ReplaceStr {
                    cells: all_cells(),
                    pairs: vec![],
                    table: Some(Table::Powers),
                },
                Step::CheckBreaks {
                    cells: prose.clone(),
                },
                Step::CheckLevels,
                Step::CheckComments { cells: prose },
                Step::ReplaceStr {
                    cells: "md:answer".to_string(),
                    pairs: vec![(String::new(), "_Write your answer here._".to_string())],
                    table: None,
                },
            ],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = PipelineConfig::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/markdown-notebook/pipeline.toml"));
    }

    #[test]
    fn test_parse_full_pipeline() {
        let content = r#"
line_markers = ["answer"]
block_markers = ["info", "note"]

[[steps]]
action = "replace_re"
pairs = [['^\s+', ''], ['\s+$', '']]

[[steps]]
action = "replace_char"
cells = "md:text md:note"
pairs = [["—", "−"]]

[[steps]]
action = "replace_str"
table = "fractions"

[[steps]]
action = "expand_urls"
cells = "md:text"
labels = { m269 = "https://www.open.ac.uk/courses/modules/m269" }

[[steps]]
action = "check_levels"

[[steps]]
action = "check_lengths"
cells = "code"
max = 69

[[steps]]
action = "prepend"
text = "Read the notes first."

[[steps]]
action = "set_cells"
cells = "markdown"
editable = false
"#;
        let config = PipelineConfig::from_toml(content).unwrap();

        assert_eq!(config.block_markers, ["info", "note"]);
        let actions: Vec<_> = config.steps.iter().map(Step::action).collect();
        assert_eq!(
            actions,
            [
                "replace_re",
                "replace_char",
                "replace_str",
                "expand_urls",
                "check_levels",
                "check_lengths",
                "prepend",
                "set_cells"
            ]
        );
        assert_eq!(
            config.steps[0],
            Step::ReplaceRe {
                cells: "all".into(),
                pairs: vec![(r"^\s+".into(), "".into()), (r"\s+$".into(), "".into())],
            }
        );
        assert_eq!(
            config.steps[6],
            Step::Prepend {
                text: "Read the notes first.".into(),
                target: "markdown".into(),
            }
        );
        assert_eq!(
            config.steps[7],
            Step::SetCells {
                cells: "markdown".into(),
                editable: Some(false),
                deletable: None,
            }
        );
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_unknown_action_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("pipeline.toml");
        std::fs::write(&config_file, "[[steps]]\naction = \"shout\"\n").unwrap();

        let err = PipelineConfig::load_from_path(&config_file).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("pipeline.toml"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = PipelineConfig::expand_path(Path::new("~/test/path"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("NOTEBOOK_TEST_VAR", "/test/env/path");
        }

        let expanded = PipelineConfig::expand_path(Path::new("$NOTEBOOK_TEST_VAR/subdir"));
        assert_eq!(expanded, PathBuf::from("/test/env/path/subdir"));

        unsafe {
            env::remove_var("NOTEBOOK_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_path_with_undefined_var_is_unchanged() {
        let path = Path::new("$NOTEBOOK_SURELY_UNDEFINED_VAR/x");
        assert_eq!(PipelineConfig::expand_path(path), path);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = PipelineConfig::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_example() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("pipeline.toml");
        let example = PipelineConfig::example();

        example.save_to_path(&config_file).unwrap();
        let loaded = PipelineConfig::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded, example);
    }
}
