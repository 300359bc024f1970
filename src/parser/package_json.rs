//! package.json manifest reader

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::config::CheckConfig;
use crate::parser::traits::ParseError;

/// The parts of package.json the engine check needs
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Manifest {
    /// `engines` object, kept loose: old packages sometimes use other shapes
    engines: Value,
    /// Optional `enginesCheck` configuration block
    pub engines_check: CheckConfig,
}

impl Manifest {
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        serde_json::from_str(content).map_err(|e| {
            warn!("Failed to parse package.json: {}", e);
            ParseError::Json(e)
        })
    }

    /// The range declared for `engine`, if it is a string
    pub fn engine_range(&self, engine: &str) -> Option<&str> {
        let value = self.engines.get(engine)?;
        let range = value.as_str();
        if range.is_none() {
            warn!("Ignoring non-string engines.{} value: {}", engine, value);
        }
        range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parse_reads_engine_range() {
        let manifest = Manifest::parse(
            r#"{
  "name": "app",
  "engines": { "node": ">=18.12.0", "pnpm": "^9" }
}"#,
        )
        .unwrap();

        assert_eq!(manifest.engine_range("node"), Some(">=18.12.0"));
        assert_eq!(manifest.engine_range("pnpm"), Some("^9"));
        assert_eq!(manifest.engine_range("npm"), None);
        assert_eq!(manifest.engines_check, CheckConfig::default());
    }

    #[test]
    fn parse_reads_engines_check_block() {
        let manifest = Manifest::parse(
            r#"{
  "engines": { "npm": ">=9" },
  "enginesCheck": { "engine": "npm", "includeDev": false }
}"#,
        )
        .unwrap();

        assert_eq!(manifest.engines_check.engine, "npm");
        assert!(!manifest.engines_check.include_dev);
    }

    #[rstest]
    #[case(r#"{"name": "app"}"#)]
    #[case(r#"{"engines": {"node": 18}}"#)]
    #[case(r#"{"engines": ["node >= 0.8"]}"#)]
    #[case(r#"{"engines": null}"#)]
    fn engine_range_is_none_when_missing_or_not_a_string(#[case] content: &str) {
        let manifest = Manifest::parse(content).unwrap();
        assert_eq!(manifest.engine_range("node"), None);
    }

    #[test]
    fn parse_rejects_invalid_json() {
        assert!(matches!(
            Manifest::parse("{ not json"),
            Err(ParseError::Json(_))
        ));
    }
}
