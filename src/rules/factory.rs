use crate::config::{LintConfig, RuleConfig, Severity};
use crate::rules::attribute_quoting::AttributeQuotingRule;
use crate::rules::blank_lines::BlankLinesRule;
use crate::rules::brace_spacing::BraceSpacingRule;
use crate::rules::class_naming::ClassNamingRule;
use crate::rules::closing_brace::ClosingBraceRule;
use crate::rules::comma_spacing::CommaSpacingRule;
use crate::rules::compact_form::CompactFormRule;
use crate::rules::declaration_per_line::DeclarationPerLineRule;
use crate::rules::directive_order::{ExtendPositionRule, IncludePositionRule};
use crate::rules::function_namespace::FunctionNamespaceRule;
use crate::rules::heading_comment::HeadingCommentRule;
use crate::rules::hex_color::HexColorRule;
use crate::rules::indentation::IndentationRule;
use crate::rules::nesting::{NestingDepthRule, NestingSpanRule};
use crate::rules::quote_style::QuoteStyleRule;
use crate::rules::selector_per_line::SelectorPerLineRule;
use crate::rules::trailing_semicolon::TrailingSemicolonRule;
use crate::rules::zero_unit::ZeroUnitRule;
use crate::rules::{
    attribute_quoting, blank_lines, brace_spacing, class_naming, closing_brace, comma_spacing,
    compact_form, declaration_per_line, directive_order, function_namespace, heading_comment,
    hex_color, indentation, nesting, quote_style, selector_per_line, trailing_semicolon,
    zero_unit, Rule, RuleBuildError,
};
use thiserror::Error;

/// Static description of a known rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleInfo {
    pub id: &'static str,
    pub description: &'static str,
    pub enabled: bool,
    pub severity: Severity,
    /// Config keys the rule reads besides `enabled` and `severity`.
    pub params: &'static [&'static str],
}

const fn info(id: &'static str, description: &'static str, enabled: bool) -> RuleInfo {
    RuleInfo {
        id,
        description,
        enabled,
        severity: Severity::Warning,
        params: &[],
    }
}

impl RuleInfo {
    const fn with_params(self, params: &'static [&'static str]) -> Self {
        RuleInfo { params, ..self }
    }

    pub fn accepts(&self, key: &str) -> bool {
        self.params.contains(&key)
    }
}

/// Every rule the linter knows, in the order `stylecheck rules` lists them.
pub const RULES: &[RuleInfo] = &[
    info(indentation::ID, "spaces only, one indent unit per nesting level", true)
        .with_params(&["width"]),
    info(selector_per_line::ID, "each selector in a list on its own line", true),
    info(brace_spacing::ID, "exactly one space before '{'", true),
    info(declaration_per_line::ID, "one declaration per line outside single-line blocks", true),
    info(compact_form::ID, "single-line blocks stay short and flat", true)
        .with_params(&["max_declarations"]),
    info(hex_color::ID, "hex colors lowercase and shortened where possible", true),
    info(quote_style::ID, "strings use the preferred quote character", true).with_params(&["quote"]),
    info(attribute_quoting::ID, "attribute selector values are quoted", true),
    info(zero_unit::ID, "no units on zero lengths", true),
    info(comma_spacing::ID, "one space after commas in values, none before", true),
    info(trailing_semicolon::ID, "the last declaration ends with ';'", true),
    info(closing_brace::ID, "closing brace aligned with its selector", true),
    info(blank_lines::ID, "one blank line between top-level rules", true),
    info(nesting::DEPTH_ID, "selector nesting stays shallow", true).with_params(&["max_depth"]),
    info(nesting::SPAN_ID, "nested blocks stay short", true).with_params(&["max_lines"]),
    info(directive_order::EXTEND_ID, "@extend first in its block", true),
    info(directive_order::INCLUDE_ID, "@include before declarations", true),
    info(function_namespace::ID, "custom functions carry the project namespace", false)
        .with_params(&["namespace", "allowed_functions"]),
    info(class_naming::ID, "class names follow a naming pattern (BEM by default)", false)
        .with_params(&["pattern"]),
    info(heading_comment::ID, "blank lines around section heading comments", true)
        .with_params(&["blank_lines_before", "blank_lines_after"]),
];

pub fn rule_info(id: &str) -> Option<&'static RuleInfo> {
    RULES.iter().find(|r| r.id == id)
}

/// One config per known rule, carrying its default state and parameters.
pub fn default_rule_configs() -> Vec<RuleConfig> {
    RULES
        .iter()
        .map(|info| RuleConfig {
            id: info.id.to_string(),
            enabled: info.enabled,
            severity: info.severity,
            ..RuleConfig::default()
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("unknown rule: '{0}'")]
    UnknownRule(String),
    #[error(transparent)]
    BuildError(#[from] RuleBuildError),
}

/// Build a rule instance from its config. The config's id picks the rule.
pub fn build_rule(config: &RuleConfig) -> Result<Box<dyn Rule>, FactoryError> {
    match config.id.as_str() {
        indentation::ID => Ok(Box::new(IndentationRule::new(config)?)),
        selector_per_line::ID => Ok(Box::new(SelectorPerLineRule::new(config)?)),
        brace_spacing::ID => Ok(Box::new(BraceSpacingRule::new(config)?)),
        declaration_per_line::ID => Ok(Box::new(DeclarationPerLineRule::new(config)?)),
        compact_form::ID => Ok(Box::new(CompactFormRule::new(config)?)),
        hex_color::ID => Ok(Box::new(HexColorRule::new(config)?)),
        quote_style::ID => Ok(Box::new(QuoteStyleRule::new(config)?)),
        attribute_quoting::ID => Ok(Box::new(AttributeQuotingRule::new(config)?)),
        zero_unit::ID => Ok(Box::new(ZeroUnitRule::new(config)?)),
        comma_spacing::ID => Ok(Box::new(CommaSpacingRule::new(config)?)),
        trailing_semicolon::ID => Ok(Box::new(TrailingSemicolonRule::new(config)?)),
        closing_brace::ID => Ok(Box::new(ClosingBraceRule::new(config)?)),
        blank_lines::ID => Ok(Box::new(BlankLinesRule::new(config)?)),
        nesting::DEPTH_ID => Ok(Box::new(NestingDepthRule::new(config)?)),
        nesting::SPAN_ID => Ok(Box::new(NestingSpanRule::new(config)?)),
        directive_order::EXTEND_ID => Ok(Box::new(ExtendPositionRule::new(config)?)),
        directive_order::INCLUDE_ID => Ok(Box::new(IncludePositionRule::new(config)?)),
        function_namespace::ID => Ok(Box::new(FunctionNamespaceRule::new(config)?)),
        class_naming::ID => Ok(Box::new(ClassNamingRule::new(config)?)),
        heading_comment::ID => Ok(Box::new(HeadingCommentRule::new(config)?)),
        _ => Err(FactoryError::UnknownRule(config.id.clone())),
    }
}

/// Build every enabled rule, in registry order.
pub fn build_enabled(config: &LintConfig) -> Result<Vec<Box<dyn Rule>>, FactoryError> {
    config
        .rules
        .iter()
        .filter(|r| r.enabled)
        .map(build_rule)
        .collect()
}
