//! Rule evaluation for article suppression.
//!
//! Pure and deterministic: no I/O, no clock, case-insensitive substring
//! matching throughout (lowercased comparison, not locale collation).
//! Precedence is layered: a global allow keyword displays the article
//! unconditionally; a rule's own allow keyword neutralizes only that rule;
//! the first surviving block match suppresses.

use crate::domain::{AllowKeyword, Article, FilterRule};

/// Decide whether `article` is suppressed (`true`) or displayed (`false`).
///
/// Rules are evaluated in the order supplied by the caller; the engine
/// assigns no implicit ordering.
pub fn evaluate(article: &Article, rules: &[FilterRule], global_allow: &[AllowKeyword]) -> bool {
    let searchable = article.searchable_text().to_lowercase();

    // Global allow-list has absolute priority and short-circuits everything.
    for allow in global_allow {
        let keyword = allow.keyword.trim().to_lowercase();
        if !keyword.is_empty() && searchable.contains(&keyword) {
            return false;
        }
    }

    for rule in rules {
        if rule_blocks(article, rule) {
            return true;
        }
    }

    false
}

fn rule_blocks(article: &Article, rule: &FilterRule) -> bool {
    let block = rule.block_keyword.trim().to_lowercase();
    if block.is_empty() {
        return false;
    }

    // A rule targeting neither field matches nothing, by construction of an
    // empty target string.
    let mut target = String::new();
    if rule.target_title {
        target.push_str(&article.title);
    }
    if rule.target_description {
        if let Some(summary) = article.summary.as_deref() {
            target.push(' ');
            target.push_str(summary);
        }
    }
    let target = target.to_lowercase();

    if !target.contains(&block) {
        return false;
    }

    // A rule-local allow match neutralizes this rule only; later rules may
    // still block.
    !rule.allow_list().iter().any(|allow| target.contains(allow))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, summary: Option<&str>) -> Article {
        let mut a = Article::new(1, "feed", title.to_string(), "https://e.com/a".to_string());
        a.summary = summary.map(String::from);
        a
    }

    fn rule(block: &str, allow: Option<&str>, title: bool, description: bool) -> FilterRule {
        let mut r = FilterRule::new(block.to_string());
        r.allow_keywords = allow.map(String::from);
        r.target_title = title;
        r.target_description = description;
        r
    }

    fn global(keywords: &[&str]) -> Vec<AllowKeyword> {
        keywords
            .iter()
            .map(|k| AllowKeyword::new(k.to_string()))
            .collect()
    }

    #[test]
    fn test_no_rules_displays() {
        assert!(!evaluate(&article("anything", None), &[], &[]));
    }

    #[test]
    fn test_block_keyword_suppresses() {
        let rules = [rule("FX", None, true, false)];
        assert!(evaluate(&article("FXで億り人", None), &rules, &[]));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let rules = [rule("fx", None, true, false)];
        assert!(evaluate(&article("FX Weekly", None), &rules, &[]));
    }

    #[test]
    fn test_global_allow_has_absolute_priority() {
        let rules = [rule("FX", None, true, false)];
        let allow = global(&["React"]);
        assert!(!evaluate(&article("FXで React開発", None), &rules, &allow));
    }

    #[test]
    fn test_global_allow_matches_summary_too() {
        let rules = [rule("FX", None, true, true)];
        let allow = global(&["rust"]);
        assert!(!evaluate(
            &article("FXの話", Some("実はRustの記事")),
            &rules,
            &allow
        ));
    }

    #[test]
    fn test_rule_allow_neutralizes_only_that_rule() {
        // First rule is neutralized by its own allow keyword; the second
        // still fires.
        let rules = [
            rule("炎上", Some("ゴシップ"), true, false),
            rule("ゴシップ", None, true, false),
        ];
        assert!(evaluate(&article("ゴシップと炎上の話題", None), &rules, &[]));
    }

    #[test]
    fn test_title_only_rule_ignores_summary() {
        let rules = [rule("FX", None, true, false)];
        assert!(!evaluate(
            &article("健全な投資記事", Some("FXについて解説")),
            &rules,
            &[]
        ));
    }

    #[test]
    fn test_description_only_rule_matches_summary() {
        let rules = [rule("FX", None, false, true)];
        assert!(evaluate(
            &article("投資の基礎", Some("FXについて")),
            &rules,
            &[]
        ));
    }

    #[test]
    fn test_description_only_rule_ignores_title() {
        let rules = [rule("FX", None, false, true)];
        assert!(!evaluate(&article("FXの基礎", Some("為替の解説")), &rules, &[]));
    }

    #[test]
    fn test_multi_keyword_allow_list() {
        let rules = [rule("FX", Some("仮想通貨,web3,crypto"), true, false)];
        assert!(!evaluate(&article("FXでweb3投資", None), &rules, &[]));
    }

    #[test]
    fn test_rule_targeting_neither_field_matches_nothing() {
        let rules = [rule("FX", None, false, false)];
        assert!(!evaluate(&article("FX", Some("FX")), &rules, &[]));
    }

    #[test]
    fn test_missing_summary_degrades_gracefully() {
        let rules = [rule("FX", None, false, true)];
        assert!(!evaluate(&article("FXの話", None), &rules, &[]));
    }

    #[test]
    fn test_first_blocking_rule_wins() {
        // Order is caller-supplied; the engine guarantees no canonical
        // ordering, only that evaluation stops at the first block.
        let rules = [
            rule("投資", None, true, false),
            rule("FX", None, true, false),
        ];
        assert!(evaluate(&article("FX投資", None), &rules, &[]));
    }

    #[test]
    fn test_empty_block_keyword_never_matches() {
        let rules = [rule("  ", None, true, true)];
        assert!(!evaluate(&article("anything", Some("at all")), &rules, &[]));
    }
}
