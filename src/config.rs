use serde::Serialize;
use std::fmt;

/// Severity level for a finding.
///
/// Ordered so that `Error > Warning`; a threshold of `Warning` therefore
/// matches every finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "warning" | "warn" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Preferred quote character for strings and attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Double,
    Single,
}

impl QuoteStyle {
    pub fn quote_char(self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Single => '\'',
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "double" => Some(QuoteStyle::Double),
            "single" => Some(QuoteStyle::Single),
            _ => None,
        }
    }
}

/// Settings for one rule. Each rule reads only the parameters it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleConfig {
    pub id: String,
    pub enabled: bool,
    pub severity: Severity,
    /// Spaces per indentation level (indentation-consistency).
    pub indent_width: usize,
    /// Preferred quotes (quote-style).
    pub quote: QuoteStyle,
    /// Most declarations allowed in a single-line block (compact-form-eligibility).
    pub max_declarations: usize,
    /// Deepest allowed selector nesting (nesting-depth).
    pub max_depth: usize,
    /// Longest allowed nested block, in lines (nesting-span).
    pub max_lines: usize,
    /// Required prefix for custom functions (custom-function-namespace).
    pub namespace: Option<String>,
    /// Extra function names treated as built in (custom-function-namespace).
    pub allowed_functions: Vec<String>,
    /// Regex every class name must match (class-naming).
    pub pattern: Option<String>,
    /// Blank lines required above a section heading comment.
    pub blank_lines_before: usize,
    /// Blank lines required below a section heading comment.
    pub blank_lines_after: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            enabled: true,
            severity: Severity::Warning,
            indent_width: 2,
            quote: QuoteStyle::Double,
            max_declarations: 3,
            max_depth: 1,
            max_lines: 20,
            namespace: None,
            allowed_functions: Vec::new(),
            pattern: None,
            blank_lines_before: 2,
            blank_lines_after: 1,
        }
    }
}

/// Everything a lint run needs to know, after the config file (if any) has
/// been loaded and validated.
#[derive(Debug, Clone)]
pub struct LintConfig {
    /// File extensions picked up when walking directories.
    pub extensions: Vec<String>,
    /// Glob patterns excluded from directory walks.
    pub exclude: Vec<String>,
    /// Findings at or above this severity make the run fail.
    pub fail_on: Severity,
    /// One entry per known rule, enabled or not.
    pub rules: Vec<RuleConfig>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["css".to_string(), "scss".to_string()],
            exclude: Vec::new(),
            fail_on: Severity::Warning,
            rules: crate::rules::factory::default_rule_configs(),
        }
    }
}

impl LintConfig {
    pub fn rule(&self, id: &str) -> Option<&RuleConfig> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn rule_mut(&mut self, id: &str) -> Option<&mut RuleConfig> {
        self.rules.iter_mut().find(|r| r.id == id)
    }

    /// Config with only the listed rules enabled.
    pub fn only(ids: &[&str]) -> Self {
        let mut config = Self::default();
        for rule in &mut config.rules {
            rule.enabled = ids.contains(&rule.id.as_str());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
    }

    #[test]
    fn severity_parse() {
        assert_eq!(Severity::parse("ERROR"), Some(Severity::Error));
        assert_eq!(Severity::parse("warn"), Some(Severity::Warning));
        assert_eq!(Severity::parse("fatal"), None);
    }

    #[test]
    fn default_config_knows_every_rule() {
        let config = LintConfig::default();
        assert!(config.rule("brace-spacing").is_some());
        assert!(config.rule("nesting-depth").unwrap().enabled);
        assert!(!config.rule("custom-function-namespace").unwrap().enabled);
    }

    #[test]
    fn only_enables_listed_rules() {
        let config = LintConfig::only(&["zero-unit"]);
        let enabled: Vec<_> = config
            .rules
            .iter()
            .filter(|r| r.enabled)
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(enabled, vec!["zero-unit"]);
    }
}
