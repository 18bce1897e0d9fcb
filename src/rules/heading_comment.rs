use crate::config::{RuleConfig, Severity};
use crate::rules::{Finding, LintContext, Rule, RuleBuildError};
use crate::syntax::Item;

pub const ID: &str = "heading-comment-spacing";

/// Section heading comments (top-level comments not attached to the item
/// below them) are surrounded by a fixed number of blank lines.
///
/// A comment with nothing after it closes the file rather than opening a
/// section, so it is not checked.
#[derive(Debug)]
pub struct HeadingCommentRule {
    severity: Severity,
    before: usize,
    after: usize,
}

impl HeadingCommentRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        Ok(Self {
            severity: config.severity,
            before: config.blank_lines_before,
            after: config.blank_lines_after,
        })
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "line"
    } else {
        "lines"
    }
}

impl Rule for HeadingCommentRule {
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
            let Item::Comment(comment) = item else { continue };
            if comment.attached_to.is_some() {
                continue;
            }
            let Some(next) = items.get(idx + 1) else { continue };

            if idx > 0 && comment.leading_blank_lines != self.before {
                findings.push(
                    ctx.finding(
                        self,
                        comment.start,
                        format!(
                            "expected {} blank {} before section comment, found {}",
                            self.before,
                            plural(self.before),
                            comment.leading_blank_lines
                        ),
                    )
                    .with_suggest(format!(
                        "leave {} blank {} above the heading",
                        self.before,
                        plural(self.before)
                    )),
                );
            }

            let found = next.leading_blank_lines();
            if found != self.after {
                findings.push(
                    ctx.finding(
                        self,
                        comment.end,
                        format!(
                            "expected {} blank {} after section comment, found {}",
                            self.after,
                            plural(self.after),
                            found
                        ),
                    )
                    .with_suggest(format!(
                        "leave {} blank {} below the heading",
                        self.after,
                        plural(self.after)
                    )),
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
        let rule = HeadingCommentRule::new(&RuleConfig::default()).unwrap();
        lint(&rule, content)
    }

    #[test]
    fn well_spaced_heading_passes() {
        let content = ".a {}\n\n\n/* Buttons */\n\n.b {}\n";
        assert!(check(content).is_empty());
    }

    #[test]
    fn heading_at_top_of_file() {
        assert!(check("// Layout\n\n.a {}\n").is_empty());
    }

    #[test]
    fn too_few_blank_lines_below() {
        let findings = check(".a {}\n\n\n/* Buttons */\n\n\n.b {}\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("after"));
        assert!(findings[0].message.contains("found 2"));
    }

    #[test]
    fn too_many_blank_lines_above() {
        let findings = check(".a {}\n\n\n\n/* Buttons */\n\n.b {}\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("before"));
        assert_eq!(findings[0].line, Some(5));
    }

    #[test]
    fn closing_comment_at_end_of_file_is_skipped() {
        assert!(check(".a {}\n/* end */").is_empty());
        assert!(check(".a {}\n\n// end of buttons\n").is_empty());
    }

    #[test]
    fn attached_comments_are_not_headings() {
        assert!(check(".a {}\n\n// explains b\n.b {}\n").is_empty());
    }

    #[test]
    fn counts_are_configurable() {
        let config = RuleConfig {
            blank_lines_before: 1,
            blank_lines_after: 0,
            ..RuleConfig::default()
        };
        let rule = HeadingCommentRule::new(&config).unwrap();
        assert!(lint(&rule, ".a {}\n\n/* Buttons */\n\n\n.b {}\n").len() == 1);
    }
}
