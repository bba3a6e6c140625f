use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// User-supplied slang entries that extend or override the built-in dictionary.
///
/// ```yaml
/// slang:
///   gpp: "tidak apa apa"
///   mantul: mantap
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct SlangFile {
    #[serde(default)]
    pub slang: BTreeMap<String, String>,
}

/// Load and validate a slang override file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_slang_file(path: &Path) -> Result<SlangFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SlangFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_slang_file(&content)
}

/// Parse and validate slang YAML content.
///
/// # Errors
///
/// Returns `ConfigError` on malformed YAML or entries that are not single words.
pub fn parse_slang_file(content: &str) -> Result<SlangFile, ConfigError> {
    let file: SlangFile = serde_yaml::from_str(content).map_err(ConfigError::SlangFileParse)?;
    validate_slang(&file)?;
    Ok(file)
}

fn validate_slang(file: &SlangFile) -> Result<(), ConfigError> {
    for (informal, canonical) in &file.slang {
        let key = informal.trim();
        if key.is_empty() || key.chars().any(|c| !c.is_alphanumeric()) {
            return Err(ConfigError::Validation(format!(
                "slang key '{informal}' must be a single alphanumeric word"
            )));
        }
        if canonical.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "slang key '{informal}' maps to an empty value"
            )));
        }
    }
    Ok(())
}
