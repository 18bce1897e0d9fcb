use crate::config::{RuleConfig, Severity};
use crate::rules::{
    in_spans, string_literals, Finding, LintContext, Rule, RuleBuildError, NON_VALUE_AT_RULES,
};
use crate::syntax::token::prev_significant;
use crate::syntax::{Token, TokenKind};
use regex::Regex;
use std::collections::HashSet;

pub const ID: &str = "custom-function-namespace";

/// CSS functions and Sass global functions. Calls to these never need a
/// namespace.
const BUILTIN_FUNCTIONS: &[&str] = &[
    // CSS
    "abs", "acos", "anchor", "asin", "atan", "atan2", "attr", "blur", "brightness", "calc",
    "circle", "clamp", "color", "color-mix", "conic-gradient", "contrast", "cos", "counter",
    "counters", "cross-fade", "cubic-bezier", "drop-shadow", "element", "ellipse", "env", "exp",
    "fit-content", "format", "grayscale", "hsl", "hsla", "hue-rotate", "hwb", "hypot", "image",
    "image-set", "inset", "invert", "lab", "layer", "lch", "light-dark", "linear-gradient",
    "local", "log", "matrix", "matrix3d", "max", "min", "minmax", "mod", "not", "oklab", "oklch",
    "opacity", "path", "perspective", "polygon", "pow", "radial-gradient", "rect", "rem",
    "repeat", "repeating-conic-gradient", "repeating-linear-gradient",
    "repeating-radial-gradient", "rgb", "rgba", "rotate", "rotate3d", "rotatex", "rotatey",
    "rotatez", "round", "saturate", "scale", "scale3d", "scalex", "scaley", "scalez", "selector",
    "sepia", "sign", "sin", "skew", "skewx", "skewy", "sqrt", "steps", "style", "supports",
    "symbols", "tan", "translate", "translate3d", "translatex", "translatey", "translatez",
    "url", "var", "xywh",
    // Sass
    "adjust-color", "adjust-hue", "alpha", "append", "blue", "call", "ceil", "change-color",
    "comparable", "complement", "content-exists", "darken", "desaturate", "fade-in", "fade-out",
    "feature-exists", "floor", "function-exists", "get-function", "global-variable-exists",
    "green", "hue", "ie-hex-str", "if", "index", "inspect", "is-bracketed", "is-superselector",
    "join", "keywords", "length", "lighten", "lightness", "list-separator", "map-get",
    "map-has-key", "map-keys", "map-merge", "map-remove", "map-values", "mix", "mixin-exists",
    "nth", "opacify", "percentage", "quote", "random", "red", "saturation", "scale-color",
    "selector-append", "selector-extend", "selector-nest", "selector-parse", "selector-replace",
    "selector-unify", "set-nth", "simple-selectors", "str-index", "str-insert", "str-length",
    "str-slice", "to-lower-case", "to-upper-case", "transparentize", "type-of", "unique-id",
    "unit", "unitless", "unquote", "variable-exists", "zip",
];

const VENDOR_PREFIXES: &[&str] = &["-webkit-", "-moz-", "-ms-", "-o-"];

/// Calls to custom (user-defined) functions carry the project namespace,
/// e.g. `acme-rem(12px)`. Definitions via `@function` are held to the same
/// prefix. Module-qualified calls such as `math.div()` are left alone.
#[derive(Debug)]
pub struct FunctionNamespaceRule {
    severity: Severity,
    namespace: String,
    known: HashSet<String>,
    call: Regex,
}

impl FunctionNamespaceRule {
    pub fn new(config: &RuleConfig) -> Result<Self, RuleBuildError> {
        let namespace = match config.namespace.as_deref() {
            Some(ns) if !ns.trim().is_empty() => ns.trim().to_string(),
            _ => return Err(RuleBuildError::MissingField(config.id.clone(), "namespace")),
        };
        let call = Regex::new(r"[A-Za-z_-][\w-]*\(")
            .map_err(|e| RuleBuildError::InvalidRegex(config.id.clone(), e))?;
        let known = BUILTIN_FUNCTIONS
            .iter()
            .map(|s| s.to_string())
            .chain(config.allowed_functions.iter().map(|s| s.to_lowercase()))
            .collect();
        Ok(Self {
            severity: config.severity,
            namespace,
            known,
            call,
        })
    }

    fn is_known(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        if self.known.contains(&lower) {
            return true;
        }
        VENDOR_PREFIXES
            .iter()
            .any(|p| lower.strip_prefix(p).map_or(false, |rest| self.known.contains(rest)))
    }
}

/// The at-rule a value token belongs to, and whether the token directly
/// follows its keyword.
fn owning_at_rule(tokens: &[Token], idx: usize) -> Option<(String, bool)> {
    let mut i = idx;
    while let Some(p) = prev_significant(tokens, i) {
        match tokens[p].kind {
            TokenKind::Value | TokenKind::Comma => i = p,
            TokenKind::AtKeyword => {
                let name = tokens[p].text.trim_start_matches('@').to_lowercase();
                return Some((name, prev_significant(tokens, idx) == Some(p)));
            }
            _ => return None,
        }
    }
    None
}

impl Rule for FunctionNamespaceRule {
    fn id(&self) -> &str {
        ID
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LintContext) -> Vec<Finding> {
        let tokens = ctx.tokens;
        let mut findings = Vec::new();

        for (idx, tok) in tokens.iter().enumerate() {
            if tok.kind != TokenKind::Value {
                continue;
            }
            let mut skip_leading_name = false;
            if let Some((at_rule, first)) = owning_at_rule(tokens, idx) {
                if NON_VALUE_AT_RULES.contains(&at_rule.as_str()) {
                    continue;
                }
                // `@include name(...)` and `@mixin name(...)` name a mixin.
                skip_leading_name = first && (at_rule == "include" || at_rule == "mixin");
            }

            let strings = string_literals(&tok.text);
            for m in self.call.find_iter(&tok.text) {
                if skip_leading_name && m.start() == 0 {
                    continue;
                }
                if in_spans(&strings, m.start()) {
                    continue;
                }
                let before = tok.text[..m.start()].chars().next_back();
                if matches!(before, Some(c) if c.is_alphanumeric() || matches!(c, '.' | '$' | '%' | '@' | '_')) {
                    continue;
                }
                let name = &m.as_str()[..m.as_str().len() - 1];
                if self.is_known(name) || name.starts_with(&self.namespace) {
                    continue;
                }
                findings.push(
                    ctx.finding(
                        self,
                        tok.start.advance(&tok.text, m.start()),
                        format!(
                            "custom function '{}' is not prefixed with '{}'",
                            name, self.namespace
                        ),
                    )
                    .with_suggest(format!("{}{}", self.namespace, name)),
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

    fn rule() -> FunctionNamespaceRule {
        let config = RuleConfig {
            id: ID.into(),
            namespace: Some("acme-".into()),
            allowed_functions: vec!["theme".into()],
            ..RuleConfig::default()
        };
        FunctionNamespaceRule::new(&config).unwrap()
    }

    fn check(content: &str) -> Vec<Finding> {
        lint(&rule(), content)
    }

    #[test]
    fn builtins_and_namespaced_calls_pass() {
        let content = ".a {\n  color: rgba(darken($c, 10%), .5);\n  width: calc(100% - acme-rem(12px));\n  background: -webkit-linear-gradient(red, blue);\n}";
        assert!(check(content).is_empty());
    }

    #[test]
    fn custom_call_without_namespace() {
        let findings = check(".a {\n  width: rem(12px);\n}");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(2));
        assert_eq!(findings[0].column, Some(10));
        assert_eq!(findings[0].suggest.as_deref(), Some("acme-rem"));
    }

    #[test]
    fn nested_custom_call() {
        assert_eq!(check(".a { width: calc(spacing(2) * 1px); }").len(), 1);
    }

    #[test]
    fn allowed_functions_pass() {
        assert!(check(".a { color: theme(primary); }").is_empty());
    }

    #[test]
    fn module_calls_and_strings_are_skipped() {
        let content = ".a {\n  width: math.div(10px, 2);\n  content: \"foo(bar)\";\n}";
        assert!(check(content).is_empty());
    }

    #[test]
    fn mixin_names_are_not_functions() {
        assert!(check(".a {\n  @include size(1px);\n}\n@mixin size($w) {\n  width: $w;\n}").is_empty());
        assert_eq!(check(".a {\n  @include size(spacing(1));\n}").len(), 1);
    }

    #[test]
    fn function_definitions_are_checked() {
        let content = "@function double($n) {\n  @return $n * 2;\n}\n\n@function acme-half($n) {\n  @return $n / 2;\n}";
        let findings = check(content);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(1));
    }

    #[test]
    fn media_queries_are_skipped() {
        assert!(check("@media screen and(min-width: 10px) {\n  .a { color: red; }\n}").is_empty());
    }

    #[test]
    fn namespace_is_required() {
        let config = RuleConfig {
            id: ID.into(),
            ..RuleConfig::default()
        };
        assert!(matches!(
            FunctionNamespaceRule::new(&config),
            Err(RuleBuildError::MissingField(_, "namespace"))
        ));
    }
}
