//! Warning-level lint rules run on every Landofile that parses.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use landofile_schema::SchemaIndex;

use crate::config::EngineConfig;
use crate::paths::{PathTracker, locate};
use crate::types::{Diagnostic, Range};

/// `@scope/name`, the form plugin-provided recipes take.
static SCOPED_PLUGIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@[a-z0-9][a-z0-9._-]*/[a-z0-9][a-z0-9._-]*$").unwrap());

/// Everything a rule may look at.
pub struct LintContext<'a> {
    pub text: &'a str,
    /// The parsed document.
    pub data: &'a Value,
    pub index: Option<&'a SchemaIndex>,
    /// Whether a compiled schema validated `data`; without one, schema
    /// keywords found in `index` were never enforced.
    pub schema_enforced: bool,
    pub config: &'a EngineConfig,
}

/// A check over a parsed Landofile.
pub trait LintRule {
    /// Rule name, also used as the diagnostic code.
    fn name(&self) -> &'static str;

    /// A short description of what this rule checks
    fn description(&self) -> &'static str;

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic>;
}

/// Rules enabled by `config.lints`, in reporting order.
pub fn enabled_rules(config: &EngineConfig) -> Vec<Box<dyn LintRule>> {
    let mut rules: Vec<Box<dyn LintRule>> = Vec::new();
    if config.lints.unknown_recipe {
        rules.push(Box::new(UnknownRecipe));
    }
    if config.lints.deprecated_property {
        rules.push(Box::new(DeprecatedProperty));
    }
    if config.lints.indentation {
        rules.push(Box::new(Indentation));
    }
    rules
}

pub fn run_lints(ctx: &LintContext<'_>) -> Vec<Diagnostic> {
    enabled_rules(ctx.config)
        .iter()
        .flat_map(|rule| {
            rule.check(ctx)
                .into_iter()
                .map(|diagnostic| diagnostic.with_code(rule.name()))
        })
        .collect()
}

pub struct UnknownRecipe;

impl LintRule for UnknownRecipe {
    fn name(&self) -> &'static str {
        "unknown-recipe"
    }

    fn description(&self) -> &'static str {
        "Flags recipes that are neither built in nor a scoped plugin"
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let Some(recipe) = ctx.data.get("recipe").and_then(Value::as_str) else {
            return Vec::new();
        };
        if ctx.config.is_known_recipe(recipe) || SCOPED_PLUGIN.is_match(recipe) {
            return Vec::new();
        }
        // A compiled schema enum already reports this as an error
        if ctx.schema_enforced
            && ctx
                .index
                .and_then(|index| index.get("recipe"))
                .is_some_and(|descriptor| !descriptor.enum_values.is_empty())
        {
            return Vec::new();
        }
        let Some(range) = locate(ctx.text, &["recipe"], ctx.config.indent_width) else {
            return Vec::new();
        };
        vec![Diagnostic::warning(
            range,
            format!("Unknown recipe \"{recipe}\". Use a built-in recipe or a plugin recipe such as \"@scope/name\"."),
        )]
    }
}

pub struct DeprecatedProperty;

impl LintRule for DeprecatedProperty {
    fn name(&self) -> &'static str {
        "deprecated-property"
    }

    fn description(&self) -> &'static str {
        "Flags keys the schema marks as deprecated"
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let Some(index) = ctx.index else {
            return Vec::new();
        };
        let mut tracker = PathTracker::new(ctx.config.indent_width);
        let mut diagnostics = Vec::new();
        for (n, line) in ctx.text.lines().enumerate() {
            let Some(key_line) = tracker.feed_line(line) else {
                continue;
            };
            if let Some((_, descriptor)) = index.lookup(tracker.path())
                && descriptor.deprecated
            {
                diagnostics.push(Diagnostic::warning(
                    Range::on_line(n as u32, key_line.key_start, key_line.key_end),
                    format!("\"{}\" is deprecated.", key_line.key),
                ));
            }
        }
        diagnostics
    }
}

pub struct Indentation;

impl LintRule for Indentation {
    fn name(&self) -> &'static str {
        "indentation"
    }

    fn description(&self) -> &'static str {
        "Flags keys indented by something other than a multiple of the indent width"
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let width = ctx.config.indent_width.max(1);
        let mut tracker = PathTracker::new(width);
        let mut diagnostics = Vec::new();
        for (n, line) in ctx.text.lines().enumerate() {
            let Some(key_line) = tracker.feed_line(line) else {
                continue;
            };
            if key_line.indent % width != 0 {
                diagnostics.push(Diagnostic::warning(
                    Range::on_line(n as u32, 0, key_line.key_start),
                    format!(
                        "Indentation of {} is not a multiple of {width}; \"{}\" may be read at the wrong level.",
                        key_line.indent, key_line.key
                    ),
                ));
            }
        }
        diagnostics
    }
}
