use crate::config::{RuleConfig, Severity};
use crate::rules::{
    in_spans, string_literals, value_texts, Finding, LintContext, Rule, RuleBuildError,
};
use regex::Regex;

pub const ID: &str = "hex-color-case";

/// Hex colors are lowercase and use the short form when one exists
/// (`#fff`, not `#FFFFFF`). Declaration values and Sass directive arguments
/// such as `@include button(#fff)` are both checked.
#[derive(Debug)]
pub struct HexColorRule {
    severity: Severity,
    hex: Regex,
}

impl HexColorRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        let hex = Regex::new(r"#([0-9A-Fa-f]+)\b")
            .map_err(|e| RuleBuildError::InvalidRegex(config.id.clone(), e))?;
        Ok(Self {
            severity: config.severity,
            hex,
        })
    }
}

/// The preferred spelling of a hex color, or `None` if `digits` is not a
/// color (wrong length).
pub fn preferred_hex(digits: &str) -> Option<String> {
    if !matches!(digits.len(), 3 | 4 | 6 | 8) {
        return None;
    }
    let lower = digits.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    if bytes.len() >= 6 && bytes.chunks(2).all(|pair| pair[0] == pair[1]) {
        let short: String = bytes.chunks(2).map(|pair| pair[0] as char).collect();
        return Some(format!("#{}", short));
    }
    Some(format!("#{}", lower))
}

impl Rule for HexColorRule {
    fn id(&self) -> &str {
        ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let mut findings = Vec::new();

        for value in value_texts(ctx.stylesheet) {
            let strings = string_literals(value.text);

            for caps in self.hex.captures_iter(value.text) {
                let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                if in_spans(&strings, whole.start()) {
                    continue;
                }
                let Some(preferred) = preferred_hex(digits.as_str()) else {
                    continue;
                };
                if preferred == whole.as_str() {
                    continue;
                }

                let has_upper = digits.as_str().chars().any(|c| c.is_ascii_uppercase());
                let shorter = preferred.len() < whole.as_str().len();
                let problem = match (has_upper, shorter) {
                    (true, true) => "is uppercase and can be shortened",
                    (true, false) => "is uppercase",
                    _ => "can be shortened",
                };
                findings.push(
                    ctx.finding(
                        self,
                        value.position_at(whole.start()),
                        format!("hex color '{}' {}; use '{}'", whole.as_str(), problem, preferred),
                    )
                    .with_suggest(preferred),
                );
            }
        }

        findings
    }
}
