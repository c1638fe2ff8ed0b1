//! Tag and keyword exclusion policy
//!
//! Decides whether a scraped document should be kept, based on its tags and
//! title. The energy-sector sites this grew out of tag documents by sector,
//! and a gas-focused scraper must not discard a document just because it
//! also mentions electricity; hence the waiver rule in
//! [`ExclusionPolicy::evaluate`].

use crate::config::FilterConfig;
use std::collections::HashSet;

/// Evaluates documents against required/excluded tag sets and excluded
/// title keywords
///
/// All comparisons are case-insensitive. Configured values are lowercased
/// once at construction; document values are lowercased per evaluation.
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    /// Lowercased required tags (empty = no requirement)
    required_tags: HashSet<String>,

    /// Lowercased excluded tags
    excluded_tags: HashSet<String>,

    /// Excluded keywords in configured order, original casing
    excluded_keywords: Vec<String>,

    /// Required tags in configured order, original casing, for reason strings
    required_display: Vec<String>,
}

impl ExclusionPolicy {
    /// Builds a policy from filter configuration
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            required_tags: config
                .required_tags
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            excluded_tags: config
                .excluded_tags
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            excluded_keywords: config.excluded_keywords.clone(),
            required_display: config.required_tags.clone(),
        }
    }

    /// Evaluates a document, returning an exclusion reason or `None` to include
    ///
    /// Checks, in order:
    /// 1. Excluded tags. A match is waived when the document also carries a
    ///    required tag: a document covering both an excluded and a required
    ///    sector stays in.
    /// 2. Required tags. When configured, a document carrying none of them
    ///    is excluded. An empty tag list therefore excludes the document.
    /// 3. Excluded keywords, matched as case-insensitive substrings of the
    ///    title. A document without a title never matches.
    pub fn evaluate(&self, tags: &[String], title: Option<&str>) -> Option<String> {
        let lowered: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();

        let has_required = !self.required_tags.is_empty()
            && lowered.iter().any(|t| self.required_tags.contains(t));

        if !self.excluded_tags.is_empty() {
            if let Some(idx) = lowered.iter().position(|t| self.excluded_tags.contains(t)) {
                if !has_required {
                    return Some(format!("tag: {}", tags[idx]));
                }
                // Waived: an excluded tag alongside a required one
            }
        }

        if !self.required_tags.is_empty() && !has_required {
            return Some(format!(
                "missing required tag: {}",
                self.required_display.join(", ")
            ));
        }

        if !self.excluded_keywords.is_empty() {
            if let Some(title) = title {
                if !title.is_empty() {
                    let lowered_title = title.to_lowercase();
                    for keyword in &self.excluded_keywords {
                        if lowered_title.contains(&keyword.to_lowercase()) {
                            return Some(format!("keyword: {}", keyword));
                        }
                    }
                }
            }
        }

        None
    }

    /// Returns true if the policy can never exclude anything
    pub fn is_permissive(&self) -> bool {
        self.required_tags.is_empty()
            && self.excluded_tags.is_empty()
            && self.excluded_keywords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(required: &[&str], excluded: &[&str], keywords: &[&str]) -> ExclusionPolicy {
        ExclusionPolicy::new(&FilterConfig {
            required_tags: required.iter().map(|s| s.to_string()).collect(),
            excluded_tags: excluded.iter().map(|s| s.to_string()).collect(),
            excluded_keywords: keywords.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_required_tag_waives_excluded_tag() {
        let policy = policy(&["Electricity"], &["Gas"], &[]);

        // Document covers both sectors: the required tag waives the
        // excluded-tag match.
        let result = policy.evaluate(&tags(&["Gas", "Electricity"]), Some("X"));
        assert_eq!(result, None);
    }

    #[test]
    fn test_excluded_tag_without_waiver() {
        let policy = policy(&["Electricity"], &["Gas"], &[]);

        let result = policy.evaluate(&tags(&["Gas"]), Some("X"));
        assert_eq!(result, Some("tag: Gas".to_string()));
    }

    #[test]
    fn test_excluded_tag_case_insensitive() {
        let policy = policy(&[], &["gas"], &[]);

        let result = policy.evaluate(&tags(&["GAS"]), None);
        // Reason reports the document's own casing
        assert_eq!(result, Some("tag: GAS".to_string()));
    }

    #[test]
    fn test_missing_required_tag() {
        let policy = policy(&["Electricity"], &[], &[]);

        let result = policy.evaluate(&tags(&["Retail"]), Some("X"));
        assert_eq!(
            result,
            Some("missing required tag: Electricity".to_string())
        );
    }

    #[test]
    fn test_empty_tag_list_fails_required_check() {
        let policy = policy(&["Electricity"], &["Gas"], &[]);

        let result = policy.evaluate(&[], Some("X"));
        assert_eq!(
            result,
            Some("missing required tag: Electricity".to_string())
        );
    }

    #[test]
    fn test_no_required_tags_never_excludes_on_tags() {
        // A site without sector filtering configures no required tags
        let policy = policy(&[], &[], &[]);

        assert_eq!(policy.evaluate(&tags(&["Gas"]), Some("X")), None);
        assert_eq!(policy.evaluate(&[], None), None);
        assert!(policy.is_permissive());
    }

    #[test]
    fn test_keyword_exclusion() {
        let policy = policy(&[], &[], &["webinar", "register now"]);

        let result = policy.evaluate(&[], Some("Upcoming WEBINAR: market update"));
        assert_eq!(result, Some("keyword: webinar".to_string()));
    }

    #[test]
    fn test_keyword_first_match_wins() {
        let policy = policy(&[], &[], &["market", "update"]);

        let result = policy.evaluate(&[], Some("Market update"));
        assert_eq!(result, Some("keyword: market".to_string()));
    }

    #[test]
    fn test_missing_title_never_matches_keywords() {
        let policy = policy(&[], &[], &["webinar"]);

        assert_eq!(policy.evaluate(&[], None), None);
        assert_eq!(policy.evaluate(&[], Some("")), None);
    }

    #[test]
    fn test_tag_checks_run_before_keyword_checks() {
        let policy = policy(&[], &["Gas"], &["webinar"]);

        let result = policy.evaluate(&tags(&["Gas"]), Some("Gas webinar"));
        assert_eq!(result, Some("tag: Gas".to_string()));
    }

    #[test]
    fn test_waived_document_still_subject_to_keywords() {
        let policy = policy(&["Electricity"], &["Gas"], &["webinar"]);

        let result = policy.evaluate(
            &tags(&["Gas", "Electricity"]),
            Some("Joint sector webinar"),
        );
        assert_eq!(result, Some("keyword: webinar".to_string()));
    }

    #[test]
    fn test_multiple_required_tags_in_reason() {
        let policy = policy(&["Electricity", "Networks"], &[], &[]);

        let result = policy.evaluate(&tags(&["Gas"]), None);
        assert_eq!(
            result,
            Some("missing required tag: Electricity, Networks".to_string())
        );
    }
}
