use serde::Deserialize;

// =============================================================================
// Defaults
// =============================================================================

/// Manifest read when no `--manifest` is given
pub const DEFAULT_MANIFEST: &str = "package.json";

/// Lockfile read when no `--lockfile` is given
pub const DEFAULT_LOCKFILE: &str = "pnpm-lock.yaml";

/// Engine whose constraints are checked by default
pub const DEFAULT_ENGINE: &str = "node";

/// Check configuration
///
/// Read from the manifest's optional `enginesCheck` block, then overridden
/// by command-line flags.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckConfig {
    /// Key under `engines` to check (`node`, `npm`, `pnpm`, ...)
    pub engine: String,
    /// Whether packages marked `dev: true` in the lockfile are checked
    pub include_dev: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            engine: DEFAULT_ENGINE.to_string(),
            include_dev: true,
        }
    }
}

/// Command-line overrides applied on top of the manifest configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub engine: Option<String>,
    /// Skip dev-only packages
    pub prod: bool,
}

impl CheckConfig {
    pub fn with_overrides(self, overrides: &Overrides) -> Self {
        Self {
            engine: overrides.engine.clone().unwrap_or(self.engine),
            include_dev: self.include_dev && !overrides.prod,
        }
    }

    /// Engine name as shown in messages: `node` -> `Node`
    pub fn engine_label(&self) -> String {
        let mut chars = self.engine.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn check_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<CheckConfig>(json!({
            "engine": "npm"
        }))
        .unwrap();

        assert_eq!(
            result,
            CheckConfig {
                engine: "npm".to_string(),
                include_dev: true,
            }
        );
    }

    #[test]
    fn check_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<CheckConfig>(json!({
            "engine": "pnpm",
            "includeDev": false
        }))
        .unwrap();

        assert_eq!(
            result,
            CheckConfig {
                engine: "pnpm".to_string(),
                include_dev: false,
            }
        );
    }

    #[test]
    fn overrides_take_precedence() {
        let config = CheckConfig::default().with_overrides(&Overrides {
            engine: Some("npm".to_string()),
            prod: true,
        });

        assert_eq!(config.engine, "npm");
        assert!(!config.include_dev);
    }

    #[test]
    fn empty_overrides_keep_manifest_values() {
        let manifest = CheckConfig {
            engine: "pnpm".to_string(),
            include_dev: false,
        };

        assert_eq!(
            manifest.clone().with_overrides(&Overrides::default()),
            manifest
        );
    }

    #[test]
    fn engine_label_capitalizes_first_letter() {
        assert_eq!(CheckConfig::default().engine_label(), "Node");
    }
}
