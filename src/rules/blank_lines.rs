use crate::config::{RuleConfig, Severity};
use crate::rules::{Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::Item;

pub const ID: &str = "blank-line-between-rules";

/// Top-level rule blocks are separated by exactly one blank line.
///
/// A comment attached to a rule belongs to it, so the blank line is measured
/// above the comment. Rules separated by a section heading comment are left
/// to heading-comment-spacing.
#[derive(Debug)]
pub struct BlankLinesRule {
    severity: Severity,
}

impl BlankLinesRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        Ok(Self {
            severity: config.severity,
        })
    }
}

impl Rule for BlankLinesRule {
    fn id(&self) -> &str {
        ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let items = &ctx.stylesheet.items;
        let mut findings = Vec::new();

        for (idx, item) in items.iter().enumerate() {
            if !matches!(item, Item::Rule(_)) || idx == 0 {
                continue;
            }

            // Step back over the rule's own attached comment.
            let mut head = idx;
            if let Item::Comment(c) = &items[idx - 1] {
                if c.attached_to == Some(idx) {
                    head = idx - 1;
                }
            }
            if head == 0 || !matches!(items[head - 1], Item::Rule(_)) {
                continue;
            }

            let blank = items[head].leading_blank_lines();
            if blank != 1 {
                let at = items[head].start();
                let message = if at.line == items[head - 1].end().line {
                    "rule starts on the same line as the previous rule".to_string()
                } else {
                    format!(
                        "expected 1 blank line between rules, found {}",
                        blank
                    )
                };
                findings.push(
                    ctx.finding(self, at, message)
                        .with_suggest("separate top-level rules with exactly one blank line"),
                );
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::lint;

    fn check(content: &str) -> Vec<Finding> {
        let rule = BlankLinesRule::new(&RuleConfig::default()).unwrap();
        lint(&rule, content)
    }

    #[test]
    fn one_blank_line_passes() {
        assert!(check(".a {\n  color: red;\n}\n\n.b {\n  color: blue;\n}\n").is_empty());
    }

    #[test]
    fn no_blank_line() {
        let findings = check(".a {}\n.b {}\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(2));
        assert!(findings[0].message.contains("found 0"));
    }

    #[test]
    fn too_many_blank_lines() {
        let findings = check(".a {}\n\n\n.b {}\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("found 2"));
    }

    #[test]
    fn same_line() {
        let findings = check(".a {}.b {}");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("same line"));
    }

    #[test]
    fn attached_comment_counts_as_part_of_rule() {
        assert!(check(".a {}\n\n// The b block\n.b {}\n").is_empty());
        let findings = check(".a {}\n// The b block\n.b {}\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(2));
    }

    #[test]
    fn section_comments_are_skipped() {
        assert!(check(".a {}\n\n\n/* Section */\n\n.b {}\n").is_empty());
    }

    #[test]
    fn nested_rules_are_not_checked() {
        assert!(check(".a {\n  .b {}\n  .c {}\n}\n").is_empty());
    }
}
