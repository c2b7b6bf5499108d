use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

const REFERENCE_FROM: NaiveDate = match NaiveDate::from_ymd_opt(2018, 10, 1) {
    Some(date) => date,
    None => panic!("invalid reference start date"),
};
const REFERENCE_TO: NaiveDate = match NaiveDate::from_ymd_opt(2018, 10, 31) {
    Some(date) => date,
    None => panic!("invalid reference end date"),
};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub query: QueryConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GitHubConfig {
    pub token: Option<String>,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: "https://api.github.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Search parameters for the pull requests under review.
///
/// Defaults reproduce the Hacktoberfest 2018 run against the Kentico organization.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct QueryConfig {
    pub organization: String,
    pub created_from: NaiveDate,
    pub created_to: NaiveDate,
    pub excluded_labels: Vec<String>,
    pub visibility: String,
    pub sort: String,
    pub order: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            organization: "Kentico".to_string(),
            created_from: REFERENCE_FROM,
            created_to: REFERENCE_TO,
            excluded_labels: vec!["invalid".to_string()],
            visibility: "public".to_string(),
            sort: "created".to_string(),
            order: "desc".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub delimiter: String,
    /// Treat a run with no external pull requests as an error instead of
    /// writing a header-only file
    pub fail_on_empty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("output.csv"),
            delimiter: ";".to_string(),
            fail_on_empty: false,
        }
    }
}

impl OutputConfig {
    /// Field separator as the single byte the csv writer expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [b] => Ok(*b),
            _ => anyhow::bail!(
                "Output delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ),
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file layered with
    /// `EXPORTER__SECTION__KEY` environment overrides.
    ///
    /// A missing file is only an error when the path was given explicitly.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let required = path.is_some();
        let config_path = path.unwrap_or_else(|| PathBuf::from("config.toml"));

        let builder = config::Config::builder()
            .add_source(config::File::from(config_path.clone()).required(required))
            .add_source(
                config::Environment::with_prefix("EXPORTER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("query.excluded_labels")
                    .try_parsing(true),
            );

        let settings = builder
            .build()
            .with_context(|| format!("Failed to load config from {:?}", config_path))?;

        let mut config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize config")?;

        // Handle ${GITHUB_TOKEN} placeholder in token field. An unset variable
        // leaves the token empty so a token given on the command line still applies.
        let placeholder = config
            .github
            .token
            .as_deref()
            .and_then(|t| t.strip_prefix("${"))
            .and_then(|t| t.strip_suffix('}'))
            .map(str::to_string);
        if let Some(env_var) = placeholder {
            config.github.token = std::env::var(&env_var).ok();
            if config.github.token.is_none() {
                debug!("Token placeholder ${{{}}} is not set", env_var);
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_config_load() {
        let config_content = r#"
[github]
token = "test_token"
api_url = "http://localhost:8080"

[query]
organization = "rust-lang"
created_from = "2023-10-01"
created_to = "2023-10-31"
excluded_labels = ["invalid", "spam"]

[output]
path = "hacktoberfest.csv"
fail_on_empty = true
"#;

        // Use .toml suffix so config crate recognizes the format
        let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = Config::load(Some(temp_file.path().to_path_buf())).unwrap();

        assert_eq!(config.github.token.as_deref(), Some("test_token"));
        assert_eq!(config.github.api_url, "http://localhost:8080");
        assert_eq!(config.github.timeout_secs, 30);
        assert_eq!(config.query.organization, "rust-lang");
        assert_eq!(
            config.query.created_from,
            NaiveDate::from_ymd_opt(2023, 10, 1).unwrap()
        );
        assert_eq!(config.query.excluded_labels, vec!["invalid", "spam"]);
        assert_eq!(config.query.visibility, "public");
        assert_eq!(config.output.path, PathBuf::from("hacktoberfest.csv"));
        assert_eq!(config.output.delimiter, ";");
        assert!(config.output.fail_on_empty);
    }

    #[test]
    fn test_defaults_match_reference_run() {
        let config = Config::default();

        assert_eq!(config.query.organization, "Kentico");
        assert_eq!(config.query.created_from.to_string(), "2018-10-01");
        assert_eq!(config.query.created_to.to_string(), "2018-10-31");
        assert_eq!(config.query.excluded_labels, vec!["invalid"]);
        assert_eq!(config.output.path, PathBuf::from("output.csv"));
        assert_eq!(config.output.delimiter_byte().unwrap(), b';');
    }

    #[test]
    fn test_unset_token_placeholder_leaves_token_empty() {
        let config_content = r#"
[github]
token = "${EXTERNAL_CONTRIBUTIONS_TEST_UNSET_TOKEN}"
"#;

        let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = Config::load(Some(temp_file.path().to_path_buf())).unwrap();
        assert_eq!(config.github.token, None);
    }

    #[test]
    fn test_token_placeholder_resolved_from_env() {
        // PATH is set in every test environment
        let config_content = r#"
[github]
token = "${PATH}"
"#;

        let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = Config::load(Some(temp_file.path().to_path_buf())).unwrap();
        assert_eq!(config.github.token, std::env::var("PATH").ok());
    }

    #[test]
    fn test_delimiter_must_be_single_byte() {
        let output = OutputConfig {
            delimiter: ";;".to_string(),
            ..OutputConfig::default()
        };
        assert!(output.delimiter_byte().is_err());

        let output = OutputConfig {
            delimiter: "\t".to_string(),
            ..OutputConfig::default()
        };
        assert_eq!(output.delimiter_byte().unwrap(), b'\t');
    }
}
