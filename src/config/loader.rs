//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{StorageBackend, TallyConfig};
use super::secret::secret_string;
use crate::domain::errors::TallyError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`TallyConfig`]
/// 4. Applies environment variable overrides (`TALLY_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`TallyError::Configuration`] if the file is missing or unreadable,
/// a referenced variable is unset, the TOML is malformed, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use tally::config::load_config;
///
/// let config = load_config("tally.toml").expect("Failed to load config");
/// println!("batch size: {}", config.engine.batch_size);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TallyConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TallyError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TallyError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<TallyConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: TallyConfig = toml::from_str(&contents)
        .map_err(|e| TallyError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        TallyError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| TallyError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(TallyError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse().map(Some).map_err(|_| {
            TallyError::Configuration(format!("Invalid value '{val}' for {name}"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using the `TALLY_*` prefix
///
/// Variables follow the pattern `TALLY_<SECTION>_<KEY>`, for example
/// `TALLY_ENGINE_BATCH_SIZE` or `TALLY_SOURCE_PATH`. Setting both
/// `TALLY_SOURCE_BUCKET` and `TALLY_SOURCE_PATH` creates the section when the
/// file has none.
fn apply_env_overrides(config: &mut TallyConfig) -> Result<()> {
    if let Ok(val) = std::env::var("TALLY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    override_input(&mut config.source, "SOURCE");
    override_input(&mut config.target, "TARGET");

    // Engine
    if let Some(size) = env_parse("TALLY_ENGINE_BATCH_SIZE")? {
        config.engine.batch_size = size;
    }
    if let Some(workers) = env_parse("TALLY_ENGINE_WORKER_COUNT")? {
        config.engine.worker_count = workers;
    }
    if let Ok(val) = std::env::var("TALLY_ENGINE_DELIMITER") {
        config.engine.delimiter = val;
    }
    if let Some(secs) = env_parse("TALLY_ENGINE_RUN_TIMEOUT_SECS")? {
        config.engine.run_timeout_secs = Some(secs);
    }

    // Storage
    if let Ok(val) = std::env::var("TALLY_STORAGE_BACKEND") {
        config.storage.backend = match val.to_lowercase().as_str() {
            "local" => StorageBackend::Local,
            "http" => StorageBackend::Http,
            other => {
                return Err(TallyError::Configuration(format!(
                    "Invalid value '{other}' for TALLY_STORAGE_BACKEND. Must be one of: local, http"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("TALLY_STORAGE_ROOT") {
        config.storage.root = val;
    }
    if let Ok(val) = std::env::var("TALLY_STORAGE_BASE_URL") {
        config.storage.base_url = Some(val);
    }
    if let Ok(val) = std::env::var("TALLY_STORAGE_TOKEN") {
        config.storage.token = Some(secret_string(val));
    }
    if let Some(secs) = env_parse("TALLY_STORAGE_TIMEOUT_SECONDS")? {
        config.storage.timeout_seconds = secs;
    }

    // Report
    if let Some(enabled) = env_parse("TALLY_REPORT_ENABLED")? {
        config.report.enabled = enabled;
    }
    if let Ok(val) = std::env::var("TALLY_REPORT_BUCKET") {
        config.report.bucket = val;
    }
    if let Ok(val) = std::env::var("TALLY_REPORT_SUMMARY_PATH") {
        config.report.summary_path = val;
    }
    if let Ok(val) = std::env::var("TALLY_REPORT_MISMATCHES_PATH") {
        config.report.mismatches_path = val;
    }
    if let Some(skip) = env_parse("TALLY_REPORT_SKIP_EMPTY_MISMATCHES")? {
        config.report.skip_empty_mismatches = skip;
    }

    if let Ok(val) = std::env::var("TALLY_TRIGGER_BUCKET") {
        config.trigger.bucket = val;
    }

    // Logging
    if let Some(enabled) = env_parse("TALLY_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Ok(val) = std::env::var("TALLY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("TALLY_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

fn override_input(input: &mut Option<super::schema::InputConfig>, section: &str) {
    let bucket = std::env::var(format!("TALLY_{section}_BUCKET")).ok();
    let path = std::env::var(format!("TALLY_{section}_PATH")).ok();

    match input {
        Some(existing) => {
            if let Some(bucket) = bucket {
                existing.bucket = bucket;
            }
            if let Some(path) = path {
                existing.path = path;
            }
        }
        None => {
            if let (Some(bucket), Some(path)) = (bucket, path) {
                *input = Some(super::schema::InputConfig { bucket, path });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("TALLY_LOADER_TEST_VAR", "test_value");
        let input = "token = \"${TALLY_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "token = \"test_value\"\n");
        std::env::remove_var("TALLY_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("TALLY_LOADER_MISSING_VAR");
        let input = "token = \"${TALLY_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("TALLY_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("TALLY_LOADER_COMMENTED_VAR");
        let input = "# token = \"${TALLY_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-tally.toml");
        assert!(matches!(result, Err(TallyError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[source]
bucket = "landing"
path = "extracts/source.txt"

[target]
bucket = "landing"
path = "extracts/target.json"

[engine]
batch_size = 500
worker_count = 2
delimiter = ","

[report]
bucket = "quality"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(
            config.source.as_ref().unwrap().location().unwrap().to_string(),
            "landing/extracts/source.txt"
        );
        assert_eq!(config.engine.batch_size, 500);
        assert_eq!(config.engine.delimiter_byte().unwrap(), b',');
        assert_eq!(config.report.bucket, "quality");
        assert_eq!(config.report.summary_path, "data_quality_summary.csv");
    }

    #[test]
    fn test_parse_config_rejects_invalid_values() {
        let result = parse_config("[engine]\nbatch_size = 0\n");
        assert!(matches!(result, Err(TallyError::Configuration(_))));
    }

    #[test]
    fn test_parse_config_rejects_malformed_toml() {
        let result = parse_config("[engine\nbatch_size = 1\n");
        assert!(matches!(result, Err(TallyError::Configuration(_))));
    }
}
