use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// An audience grouping used to bound a marketplace search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Niche {
    pub name: String,
    pub keywords: Vec<String>,
    /// Category path fragments such as `"Home & Garden > Home Décor"`.
    #[serde(default)]
    pub categories: Vec<String>,
    pub audience: String,
    /// Why this niche is worth promoting to the channel's audience.
    pub why: String,
}

#[derive(Debug, Deserialize)]
pub struct NichesFile {
    pub niches: Vec<Niche>,
}

/// Load and validate the niche catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_niches(path: &Path) -> Result<NichesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::NichesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_niches(&content)
}

/// Parse and validate a niche catalog from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_niches(content: &str) -> Result<NichesFile, ConfigError> {
    let niches_file: NichesFile =
        serde_yaml::from_str(content).map_err(ConfigError::NichesFileParse)?;

    validate_niches(&niches_file)?;

    Ok(niches_file)
}

fn validate_niches(niches_file: &NichesFile) -> Result<(), ConfigError> {
    if niches_file.niches.is_empty() {
        return Err(ConfigError::Validation(
            "niche catalog must contain at least one niche".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();

    for niche in &niches_file.niches {
        if niche.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "niche name must be non-empty".to_string(),
            ));
        }

        if niche.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "niche '{}' has no keywords",
                niche.name
            )));
        }

        if !seen_names.insert(niche.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate niche name: '{}'",
                niche.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
niches:
  - name: Smart home gadgets
    keywords: ["smart home gadgets", "smart lighting"]
    categories: ["Consumer Electronics > Surveillance & Smart Home Electronics"]
    audience: home_users
    why: Cheaper than local retail.
  - name: Pet supplies
    keywords: ["pet supplies"]
    audience: pet_owners
    why: Wide selection.
"#;

    #[test]
    fn parses_valid_catalog() {
        let file = parse_niches(VALID).unwrap();
        assert_eq!(file.niches.len(), 2);
        assert_eq!(file.niches[0].keywords.len(), 2);
        assert!(file.niches[1].categories.is_empty());
    }

    #[test]
    fn rejects_empty_catalog() {
        let err = parse_niches("niches: []").unwrap_err();
        assert!(err.to_string().contains("at least one niche"));
    }

    #[test]
    fn rejects_duplicate_names_case_insensitively() {
        let yaml = r"
niches:
  - {name: Pets, keywords: [a], audience: x, why: y}
  - {name: pets, keywords: [b], audience: x, why: y}
";
        let err = parse_niches(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate niche name"));
    }

    #[test]
    fn rejects_niche_without_keywords() {
        let yaml = r"
niches:
  - {name: Empty, keywords: [], audience: x, why: y}
";
        let err = parse_niches(yaml).unwrap_err();
        assert!(err.to_string().contains("has no keywords"));
    }

    #[test]
    fn rejects_blank_name() {
        let yaml = r"
niches:
  - {name: '  ', keywords: [a], audience: x, why: y}
";
        assert!(matches!(
            parse_niches(yaml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_niches(Path::new("/definitely/not/here/niches.yaml"));
        assert!(matches!(result, Err(ConfigError::NichesFileIo { .. })));
    }

    #[test]
    fn shipped_catalog_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/niches.yaml");
        let file = load_niches(&path).unwrap();
        assert!(file.niches.len() >= 18);
    }
}
