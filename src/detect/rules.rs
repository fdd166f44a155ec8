//! Rule-set loading and validation.

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde_yaml::Value;
use tracing::info;

use crate::detect::matcher::Pattern;
use crate::detect::DetectError;
use crate::output;

/// The patterns owning one named repository bit.
#[derive(Debug, Clone)]
pub struct BitRule {
    /// Bit name, used as a result key and an output name.
    pub name: String,
    /// Compiled patterns in declaration order.
    pub patterns: Vec<Pattern>,
}

/// Ordered mapping from bit name to its pattern rules.
///
/// Declaration order is preserved for both bits and patterns; the
/// matcher depends on it.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    bits: Vec<BitRule>,
}

impl RuleSet {
    /// Loads and validates rules from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading rules from {}", path.display());
        let text = fs::read_to_string(path).map_err(|e| {
            DetectError::Config(format!("reading {} failed: {e}", path.display()))
        })?;
        Self::parse(&text)
    }

    /// Parses and validates rules from YAML text.
    ///
    /// The document must be a mapping from bit names to pattern lists.
    /// Any violation rejects the whole load; a partial rule set is never
    /// returned.
    pub fn parse(text: &str) -> Result<Self> {
        let doc: Value = serde_yaml::from_str(text)
            .map_err(|e| DetectError::Config(format!("parsing failed: {e}")))?;
        let Value::Mapping(mapping) = doc else {
            return Err(DetectError::Config(
                "expected a mapping of bit names to pattern lists".to_string(),
            )
            .into());
        };

        let mut bits = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let Value::String(name) = key else {
                return Err(
                    DetectError::Config("bit names must be strings".to_string()).into(),
                );
            };
            if output::RESERVED_NAMES.contains(&name.as_str()) {
                return Err(
                    DetectError::Config(format!("\"{name}\" is a reserved word")).into(),
                );
            }
            let patterns = parse_patterns(&name, value)?;
            info!(
                "Patterns for {name}: {}",
                patterns
                    .iter()
                    .map(Pattern::as_str)
                    .collect::<Vec<_>>()
                    .join(",")
            );
            bits.push(BitRule { name, patterns });
        }
        Ok(Self { bits })
    }

    /// Bits in declaration order.
    pub fn bits(&self) -> &[BitRule] {
        &self.bits
    }

    /// Bit names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bits.iter().map(|b| b.name.as_str())
    }

    /// Number of configured bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether no bits are configured.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

fn parse_patterns(bit: &str, value: Value) -> Result<Vec<Pattern>> {
    let Value::Sequence(items) = value else {
        return Err(DetectError::Config(format!(
            "patterns for \"{bit}\" must be a sequence"
        ))
        .into());
    };
    items
        .into_iter()
        .map(|item| {
            let Value::String(raw) = item else {
                return Err(DetectError::Config(format!(
                    "patterns for \"{bit}\" must be strings"
                ))
                .into());
            };
            Pattern::parse(&raw).map_err(|e| {
                DetectError::Config(format!("invalid pattern \"{raw}\" for \"{bit}\": {e}"))
                    .into()
            })
        })
        .collect()
}
