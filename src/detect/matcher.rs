//! Pattern matching of changed files against bit rules.

use std::collections::BTreeMap;

use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, info};

use crate::detect::changes::ChangedFile;
use crate::detect::results::BitResult;
use crate::detect::rules::RuleSet;
use crate::detect::DetectionContext;

/// One compiled rule pattern.
///
/// A leading `!` marks an exclusion. Basename matching is always on:
/// a pattern containing no `/` is applied to the final path component,
/// a pattern containing `/` is applied to the whole path.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    negated: bool,
    match_base: bool,
    matcher: GlobMatcher,
}

impl Pattern {
    /// Compiles a pattern, stripping the exclusion marker.
    pub fn parse(raw: &str) -> Result<Self, globset::Error> {
        let (negated, text) = match raw.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        // `*` and `?` must not cross directory boundaries; only `**`
        // spans segments.
        let matcher = GlobBuilder::new(text)
            .literal_separator(true)
            .build()?
            .compile_matcher();
        Ok(Self {
            raw: raw.to_string(),
            negated,
            match_base: !text.contains('/'),
            matcher,
        })
    }

    /// The pattern as written in the rules file.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this pattern removes entries from the accumulated set.
    pub fn is_exclusion(&self) -> bool {
        self.negated
    }

    /// Whether `path` satisfies this pattern, negation applied.
    pub fn matches(&self, path: &str) -> bool {
        let candidate = if self.match_base {
            path.rsplit('/').next().unwrap_or(path)
        } else {
            path
        };
        let hit = self.matcher.is_match(candidate);
        if self.negated {
            !hit
        } else {
            hit
        }
    }
}

/// Matches every bit's patterns against the changed-file list.
///
/// Patterns apply in declaration order to an accumulating matched set:
/// inclusions scan the full original file list and union their matches
/// in; exclusions re-filter the accumulated set only. The asymmetry is
/// deliberate and observable, so an exclusion can never resurrect a
/// file a later inclusion then re-adds from the original list.
///
/// Returns an empty mapping when the fail-safe already fired.
pub fn match_rules(
    ctx: &DetectionContext,
    rules: &RuleSet,
    changed_files: &[ChangedFile],
) -> BTreeMap<String, BitResult> {
    if ctx.is_all_dirty() {
        // A previous stage already marked all bits dirty.
        return BTreeMap::new();
    }

    let files: Vec<&str> = changed_files.iter().map(|f| f.filename.as_str()).collect();
    let mut results = BTreeMap::new();
    for bit in rules.bits() {
        let mut matched: Vec<String> = Vec::new();
        for pattern in &bit.patterns {
            if pattern.is_exclusion() {
                matched.retain(|f| pattern.matches(f));
            } else {
                for file in &files {
                    if pattern.matches(file) && !matched.iter().any(|m| m == file) {
                        matched.push((*file).to_string());
                    }
                }
            }
            debug!("Matches for pattern \"{}\": {matched:?}", pattern.as_str());
        }
        info!("Matches for {}: {} files", bit.name, matched.len());
        results.insert(
            bit.name.clone(),
            BitResult {
                dirty: !matched.is_empty(),
                matched_files: Some(matched),
            },
        );
    }
    results
}
