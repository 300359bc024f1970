//! pnpm-lock.yaml engine constraint parser

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::parser::traits::{ParseError, Parser};
use crate::parser::types::EngineConstraint;

/// Parser for pnpm-lock.yaml files
///
/// Collects `engines.<engine>` from every entry of the top-level
/// `devDependencies` and `packages` mappings. Both block style and the flow
/// style pnpm writes (`engines: {node: '>=18'}`) are understood.
pub struct PnpmLockParser {
    engine: String,
}

impl PnpmLockParser {
    /// Top-level sections holding per-package metadata, in reading order
    const SECTIONS: [&'static str; 2] = ["devDependencies", "packages"];

    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
        }
    }
}

impl Parser for PnpmLockParser {
    fn parse(&self, content: &str) -> Result<Vec<EngineConstraint>, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        let language = tree_sitter_yaml::LANGUAGE;
        parser.set_language(&language.into()).map_err(|e| {
            warn!("Failed to set YAML language for tree-sitter: {}", e);
            ParseError::TreeSitter(e.to_string())
        })?;

        let tree = parser.parse(content, None).ok_or_else(|| {
            warn!("Failed to parse YAML content");
            ParseError::ParseFailed("Failed to parse YAML".to_string())
        })?;

        let root = tree.root_node();
        if root.has_error() {
            warn!("pnpm-lock.yaml contains syntax errors");
            return Err(ParseError::ParseFailed(
                "pnpm-lock.yaml contains syntax errors".to_string(),
            ));
        }

        let Some(document) = find_mapping(root) else {
            return Ok(Vec::new());
        };
        let sections = mapping_pairs(document, content);

        // A package listed twice keeps its first position and its last value
        let mut constraints: IndexMap<String, EngineConstraint> = IndexMap::new();
        for section in Self::SECTIONS {
            let package_maps = sections
                .iter()
                .filter(|(key, _)| key == section)
                .filter_map(|(_, value)| find_mapping(*value));

            for packages in package_maps {
                for (package, entry) in mapping_pairs(packages, content) {
                    if let Some(constraint) = self.parse_entry(&package, entry, content) {
                        debug!(
                            "Collected {} constraint {} from {}",
                            self.engine, constraint.range, package
                        );
                        constraints.insert(package, constraint);
                    }
                }
            }
        }

        Ok(constraints.into_values().collect())
    }
}

impl PnpmLockParser {
    /// Extract the engine constraint of one package entry
    fn parse_entry(
        &self,
        package: &str,
        entry: tree_sitter::Node,
        content: &str,
    ) -> Option<EngineConstraint> {
        let fields = mapping_pairs(find_mapping(entry)?, content);

        let engines = fields
            .iter()
            .find(|(key, _)| key == "engines")
            .and_then(|(_, value)| find_mapping(*value))?;

        let Some((_, range_node)) = mapping_pairs(engines, content)
            .into_iter()
            .find(|(key, _)| *key == self.engine)
        else {
            debug!("{} declares engines but no {} constraint", package, self.engine);
            return None;
        };

        if find_mapping(range_node).is_some() {
            warn!("Ignoring non-scalar engines.{} in {}", self.engine, package);
            return None;
        }

        let range = get_node_text(range_node, content);
        let dev = fields
            .iter()
            .any(|(key, value)| key == "dev" && get_node_text(*value, content) == "true");

        Some(EngineConstraint {
            package: package.to_string(),
            range,
            dev,
        })
    }
}

/// Find the first mapping at or below `node`, looking through wrapper nodes
/// (stream, document, block/flow node) but not into sequences
fn find_mapping(node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    match node.kind() {
        "block_mapping" | "flow_mapping" => return Some(node),
        "block_sequence" | "flow_sequence" => return None,
        _ => {}
    }

    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find_map(find_mapping);
    found
}

/// Key text and value node of each pair in a block or flow mapping
fn mapping_pairs<'tree>(
    mapping: tree_sitter::Node<'tree>,
    content: &str,
) -> Vec<(String, tree_sitter::Node<'tree>)> {
    let mut cursor = mapping.walk();
    let pairs = mapping
        .named_children(&mut cursor)
        .filter(|child| matches!(child.kind(), "block_mapping_pair" | "flow_pair"))
        .filter_map(|pair| {
            let key = pair.child_by_field_name("key")?;
            let value = pair.child_by_field_name("value")?;
            Some((get_node_text(key, content), value))
        })
        .collect();
    pairs
}

/// Get text content of a node, removing quotes if present
fn get_node_text(node: tree_sitter::Node, content: &str) -> String {
    let text = content[node.byte_range()].trim();
    text.strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .or_else(|| text.strip_prefix('"').and_then(|t| t.strip_suffix('"')))
        .unwrap_or(text)
        .to_string()
}
