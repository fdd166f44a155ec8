//! Detection result assembly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::detect::rules::RuleSet;
use crate::detect::DetectionContext;

/// Match outcome for one bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitResult {
    /// Whether any changed file matched the bit's rules.
    pub dirty: bool,
    /// Files that matched, in match order. Absent on the fail-safe path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_files: Option<Vec<String>>,
}

/// Final dirty-bit detection results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResults {
    /// All bits are marked clean.
    pub all_clean: bool,
    /// All bits are marked dirty.
    pub all_dirty: bool,
    /// Why all bits were assumed dirty, when the fail-safe fired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_dirty_reason: Option<String>,
    /// At least one bit is marked dirty.
    pub some_dirty: bool,
    /// Match results keyed by bit name.
    pub bits: BTreeMap<String, BitResult>,
    /// Names of clean bits, in rule declaration order.
    pub clean_bits: Vec<String>,
    /// Names of dirty bits, in rule declaration order.
    pub dirty_bits: Vec<String>,
    /// Base commit used to determine changed files.
    pub base: String,
    /// Head commit used to determine changed files.
    pub head: String,
    /// Human-facing compare URL for `base` and `head`.
    pub compare_commits_url: String,
}

/// Partitions bits into clean and dirty and derives the summary flags.
///
/// When the fail-safe fired, every configured bit is forced dirty with
/// no matched-file list; otherwise the partition follows the matcher's
/// per-bit verdicts. The summary flags are always computed from the
/// partition, never set independently.
pub fn assemble(
    rules: &RuleSet,
    ctx: DetectionContext,
    mut bits: BTreeMap<String, BitResult>,
) -> DetectionResults {
    let mut clean_bits = Vec::new();
    let mut dirty_bits = Vec::new();

    if ctx.is_all_dirty() {
        for name in rules.names() {
            dirty_bits.push(name.to_string());
            bits.insert(
                name.to_string(),
                BitResult {
                    dirty: true,
                    matched_files: None,
                },
            );
        }
    } else {
        for name in rules.names() {
            if bits.get(name).is_some_and(|r| r.dirty) {
                dirty_bits.push(name.to_string());
            } else {
                clean_bits.push(name.to_string());
            }
        }
    }

    DetectionResults {
        all_clean: dirty_bits.is_empty(),
        all_dirty: clean_bits.is_empty(),
        all_dirty_reason: ctx.all_dirty_reason().map(str::to_string),
        some_dirty: !dirty_bits.is_empty(),
        bits,
        clean_bits,
        dirty_bits,
        base: ctx.base,
        head: ctx.head,
        compare_commits_url: ctx.compare_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn three_bit_rules() -> Result<RuleSet> {
        Ok(RuleSet::parse(
            "alpha:\n  - \"alpha/**\"\nbeta:\n  - \"beta/**\"\ngamma:\n  - \"gamma/**\"\n",
        )?)
    }

    fn verdict(dirty: bool, files: &[&str]) -> BitResult {
        BitResult {
            dirty,
            matched_files: Some(files.iter().map(|f| (*f).to_string()).collect()),
        }
    }

    #[test]
    fn partition_follows_rule_declaration_order() -> Result<()> {
        let rules = three_bit_rules()?;
        let mut bits = BTreeMap::new();
        bits.insert("alpha".to_string(), verdict(true, &["alpha/a.rs"]));
        bits.insert("beta".to_string(), verdict(false, &[]));
        bits.insert("gamma".to_string(), verdict(true, &["gamma/g.rs"]));

        let results = assemble(&rules, DetectionContext::new(), bits);
        assert_eq!(results.dirty_bits, ["alpha", "gamma"]);
        assert_eq!(results.clean_bits, ["beta"]);
        assert!(!results.all_clean);
        assert!(!results.all_dirty);
        assert!(results.some_dirty);
        assert_eq!(results.all_dirty_reason, None);
        Ok(())
    }

    #[test]
    fn partition_covers_every_bit_exactly_once() -> Result<()> {
        let rules = three_bit_rules()?;
        let mut bits = BTreeMap::new();
        bits.insert("alpha".to_string(), verdict(false, &[]));
        bits.insert("beta".to_string(), verdict(true, &["beta/b.rs"]));
        bits.insert("gamma".to_string(), verdict(false, &[]));

        let results = assemble(&rules, DetectionContext::new(), bits);
        let mut all: Vec<&String> = results
            .clean_bits
            .iter()
            .chain(results.dirty_bits.iter())
            .collect();
        all.sort();
        let mut names: Vec<&str> = rules.names().collect();
        names.sort_unstable();
        assert_eq!(all.iter().map(|s| s.as_str()).collect::<Vec<_>>(), names);
        Ok(())
    }

    #[test]
    fn fail_safe_forces_every_bit_dirty_without_matches() -> Result<()> {
        let rules = three_bit_rules()?;
        let mut ctx = DetectionContext::new();
        ctx.mark_all_dirty("unable to find previous release");

        let results = assemble(&rules, ctx, BTreeMap::new());
        assert!(results.all_dirty);
        assert!(!results.all_clean);
        assert!(results.some_dirty);
        assert_eq!(results.dirty_bits, ["alpha", "beta", "gamma"]);
        assert!(results.clean_bits.is_empty());
        assert_eq!(
            results.all_dirty_reason.as_deref(),
            Some("unable to find previous release")
        );
        for (name, bit) in &results.bits {
            assert!(bit.dirty, "{name} must be forced dirty");
            assert_eq!(bit.matched_files, None, "{name} must carry no matches");
        }
        Ok(())
    }

    #[test]
    fn all_clean_iff_no_dirty_bits() -> Result<()> {
        let rules = three_bit_rules()?;
        let mut bits = BTreeMap::new();
        for name in rules.names() {
            bits.insert(name.to_string(), verdict(false, &[]));
        }

        let results = assemble(&rules, DetectionContext::new(), bits);
        assert!(results.all_clean);
        assert!(!results.some_dirty);
        assert!(!results.all_dirty);
        assert_eq!(results.clean_bits.len(), 3);
        Ok(())
    }

    #[test]
    fn context_range_flows_into_results() -> Result<()> {
        let rules = three_bit_rules()?;
        let mut ctx = DetectionContext::new();
        ctx.base = "aaa".to_string();
        ctx.head = "bbb".to_string();
        ctx.compare_url = "https://example.com/compare/aaa...bbb".to_string();
        let mut bits = BTreeMap::new();
        for name in rules.names() {
            bits.insert(name.to_string(), verdict(false, &[]));
        }

        let results = assemble(&rules, ctx, bits);
        assert_eq!(results.base, "aaa");
        assert_eq!(results.head, "bbb");
        assert_eq!(
            results.compare_commits_url,
            "https://example.com/compare/aaa...bbb"
        );
        Ok(())
    }

    #[test]
    fn serializes_with_camel_case_keys() -> Result<()> {
        let rules = three_bit_rules()?;
        let mut ctx = DetectionContext::new();
        ctx.mark_all_dirty("reason");
        let json = serde_json::to_string(&assemble(&rules, ctx, BTreeMap::new()))?;
        assert!(json.contains("\"allClean\""));
        assert!(json.contains("\"allDirtyReason\""));
        assert!(json.contains("\"someDirty\""));
        assert!(json.contains("\"cleanBits\""));
        assert!(json.contains("\"dirtyBits\""));
        assert!(json.contains("\"compareCommitsUrl\""));
        Ok(())
    }
}
