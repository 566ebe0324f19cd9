//! First-match keyword routing.

use std::cmp::Ordering;

use super::model::ClassificationRule;

fn match_order(a: &ClassificationRule, b: &ClassificationRule) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then(a.created_at.cmp(&b.created_at))
        .then(a.id.cmp(&b.id))
}

/// Sort rules into evaluation order: priority descending, then creation
/// time ascending.
pub fn order_for_matching(rules: &mut [ClassificationRule]) {
    rules.sort_by(match_order);
}

/// Return the first active rule, in evaluation order, whose keyword occurs
/// in `text`. Both sides are lower-cased before comparison.
///
/// `rules` need not be pre-sorted.
pub fn match_rules<'a>(
    rules: &'a [ClassificationRule],
    text: &str,
) -> Option<&'a ClassificationRule> {
    if text.is_empty() {
        return None;
    }
    let haystack = text.to_lowercase();

    let mut ordered: Vec<&ClassificationRule> = rules.iter().filter(|r| r.is_active).collect();
    ordered.sort_by(|a, b| match_order(a, b));

    ordered
        .into_iter()
        .find(|rule| haystack.contains(&rule.keyword.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use dochub_core::types::{FolderId, RuleId, UserId};

    fn rule(keyword: &str, priority: i32, age_secs: i64) -> ClassificationRule {
        let created = Utc::now() - Duration::seconds(age_secs);
        ClassificationRule {
            id: RuleId::new(),
            user_id: UserId::new(),
            keyword: keyword.into(),
            target_folder_id: FolderId::new(),
            priority,
            is_active: true,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_case_insensitive_substring() {
        let rules = vec![rule("invoice", 10, 0)];
        let hit = match_rules(&rules, "Scanned INVOICE #123").unwrap();
        assert_eq!(hit.keyword, "invoice");
        assert!(match_rules(&rules, "receipt").is_none());
    }

    #[test]
    fn test_highest_priority_wins() {
        let rules = vec![rule("report", 1, 0), rule("invoice", 5, 0)];
        let hit = match_rules(&rules, "invoice report").unwrap();
        assert_eq!(hit.keyword, "invoice");
    }

    #[test]
    fn test_priority_tie_goes_to_oldest() {
        let newer = rule("tax", 3, 10);
        let older = rule("TAX", 3, 100);
        let rules = vec![newer, older.clone()];
        assert_eq!(match_rules(&rules, "tax return").unwrap().id, older.id);
    }

    #[test]
    fn test_inactive_rules_skipped() {
        let mut off = rule("invoice", 100, 0);
        off.is_active = false;
        let on = rule("invoice", 1, 0);
        let rules = vec![off, on.clone()];
        assert_eq!(match_rules(&rules, "invoice").unwrap().id, on.id);
    }

    #[test]
    fn test_empty_text_never_matches() {
        let rules = vec![rule("a", 1, 0)];
        assert!(match_rules(&rules, "").is_none());
    }

    #[test]
    fn test_order_for_matching() {
        let mut rules = vec![rule("low", 1, 0), rule("high", 9, 0), rule("mid", 5, 0)];
        order_for_matching(&mut rules);
        let keywords: Vec<_> = rules.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(keywords, ["high", "mid", "low"]);
    }
}
