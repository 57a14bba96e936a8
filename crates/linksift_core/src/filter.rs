//! Regex filter configuration and its compiled form.
//!
//! A [`FilterConfig`] maps a link field to either a raw pattern or a
//! [`FilterSpec`] of helper keys. [`compile_filters`] flattens all of it into
//! one list of [`FilterRule`]s, so matching never looks at config shape.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use thiserror::Error;

use crate::types::{Link, LinkField};

/// Flags applied when a rule does not name its own.
pub const DEFAULT_FLAGS: &str = "i";

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("unknown link field {0:?}")]
    UnknownField(String),
    #[error("invalid regex flag {flag:?} for field {field}")]
    InvalidFlag { field: LinkField, flag: char },
    #[error("invalid pattern {pattern:?} for field {field}: {source}")]
    InvalidPattern {
        field: LinkField,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    Include,
    Exclude,
}

/// How several rules combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    All,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Many(items)
    }
}

/// Entry of the legacy `include`/`exclude` keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LegacyPattern {
    Raw(String),
    Flagged {
        pattern: String,
        #[serde(default)]
        flags: Option<String>,
    },
}

/// Helper keys for one field. Every key present contributes rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    pub flags: Option<String>,
    pub include_exact: Option<OneOrMany<String>>,
    pub exclude_exact: Option<OneOrMany<String>>,
    pub include_starts_with: Option<OneOrMany<String>>,
    pub exclude_starts_with: Option<OneOrMany<String>>,
    pub include_ends_with: Option<OneOrMany<String>>,
    pub exclude_ends_with: Option<OneOrMany<String>>,
    pub include_contains: Option<OneOrMany<String>>,
    pub exclude_contains: Option<OneOrMany<String>>,
    pub include_patterns: Option<OneOrMany<String>>,
    pub exclude_patterns: Option<OneOrMany<String>>,
    pub include: Option<OneOrMany<LegacyPattern>>,
    pub exclude: Option<OneOrMany<LegacyPattern>>,
    pub pattern: Option<String>,
    pub mode: Option<FilterMode>,
}

fn strings<I, S>(items: I) -> Option<OneOrMany<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Some(OneOrMany::Many(items.into_iter().map(Into::into).collect()))
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = Some(flags.into());
        self
    }

    pub fn include_exact<I: IntoIterator<Item = S>, S: Into<String>>(mut self, items: I) -> Self {
        self.include_exact = strings(items);
        self
    }

    pub fn exclude_exact<I: IntoIterator<Item = S>, S: Into<String>>(mut self, items: I) -> Self {
        self.exclude_exact = strings(items);
        self
    }

    pub fn include_starts_with<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        items: I,
    ) -> Self {
        self.include_starts_with = strings(items);
        self
    }

    pub fn exclude_starts_with<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        items: I,
    ) -> Self {
        self.exclude_starts_with = strings(items);
        self
    }

    pub fn include_ends_with<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        items: I,
    ) -> Self {
        self.include_ends_with = strings(items);
        self
    }

    pub fn exclude_ends_with<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        items: I,
    ) -> Self {
        self.exclude_ends_with = strings(items);
        self
    }

    pub fn include_contains<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        items: I,
    ) -> Self {
        self.include_contains = strings(items);
        self
    }

    pub fn exclude_contains<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        items: I,
    ) -> Self {
        self.exclude_contains = strings(items);
        self
    }

    pub fn include_patterns<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        items: I,
    ) -> Self {
        self.include_patterns = strings(items);
        self
    }

    pub fn exclude_patterns<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        items: I,
    ) -> Self {
        self.exclude_patterns = strings(items);
        self
    }

    /// Legacy single pattern with an explicit mode.
    pub fn pattern(mut self, pattern: impl Into<String>, mode: FilterMode) -> Self {
        self.pattern = Some(pattern.into());
        self.mode = Some(mode);
        self
    }

    fn rule_defs(&self, field: LinkField) -> Vec<RuleDef> {
        use FilterMode::{Exclude, Include};

        let helpers = [
            (&self.include_exact, Include, RuleKind::Exact),
            (&self.exclude_exact, Exclude, RuleKind::Exact),
            (&self.include_starts_with, Include, RuleKind::StartsWith),
            (&self.exclude_starts_with, Exclude, RuleKind::StartsWith),
            (&self.include_ends_with, Include, RuleKind::EndsWith),
            (&self.exclude_ends_with, Exclude, RuleKind::EndsWith),
            (&self.include_contains, Include, RuleKind::Contains),
            (&self.exclude_contains, Exclude, RuleKind::Contains),
            (&self.include_patterns, Include, RuleKind::Patterns),
            (&self.exclude_patterns, Exclude, RuleKind::Patterns),
        ];

        let mut defs = Vec::new();
        for (items, mode, kind) in helpers {
            let Some(items) = present(items) else {
                continue;
            };
            defs.push(RuleDef {
                field,
                spec: RuleSpec::Helper { kind, items },
                flags: self.flags.clone(),
                mode,
            });
        }

        for (entries, mode) in [(&self.include, Include), (&self.exclude, Exclude)] {
            let Some(entries) = present(entries) else {
                continue;
            };
            for entry in entries {
                let (pattern, flags) = match entry {
                    LegacyPattern::Raw(pattern) => (pattern, self.flags.clone()),
                    // An object entry never inherits the enclosing flags.
                    LegacyPattern::Flagged { pattern, flags } => (pattern, flags),
                };
                defs.push(RuleDef {
                    field,
                    spec: RuleSpec::Raw(pattern),
                    flags,
                    mode,
                });
            }
        }

        if let Some(pattern) = self.pattern.as_ref().filter(|p| !p.is_empty()) {
            defs.push(RuleDef {
                field,
                spec: RuleSpec::Raw(pattern.clone()),
                flags: self.flags.clone(),
                mode: self.mode.unwrap_or_default(),
            });
        }

        defs
    }
}

/// Entries of a helper key, or `None` when the key is absent or a lone empty
/// string. Lists always count, even empty ones.
fn present<T: Clone + IsBlank>(value: &Option<OneOrMany<T>>) -> Option<Vec<T>> {
    match value {
        None => None,
        Some(OneOrMany::One(item)) if item.is_blank() => None,
        Some(items) => Some(items.clone().into_vec()),
    }
}

trait IsBlank {
    fn is_blank(&self) -> bool;
}

impl IsBlank for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl IsBlank for LegacyPattern {
    fn is_blank(&self) -> bool {
        matches!(self, Self::Raw(pattern) if pattern.is_empty())
    }
}

/// What a config holds for one field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldFilter {
    /// A bare pattern string: one include rule with default flags.
    Pattern(String),
    Spec(FilterSpec),
}

impl From<FilterSpec> for FieldFilter {
    fn from(spec: FilterSpec) -> Self {
        Self::Spec(spec)
    }
}

impl From<&str> for FieldFilter {
    fn from(pattern: &str) -> Self {
        Self::Pattern(pattern.to_string())
    }
}

/// Field name to filter mapping, e.g. the JSON
/// `{"link": {"excludeContains": ["ads"]}, "name": "^docs"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FilterConfig {
    fields: BTreeMap<String, FieldFilter>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter for `field`, replacing any previous one.
    pub fn field(mut self, field: impl Into<String>, filter: impl Into<FieldFilter>) -> Self {
        self.fields.insert(field.into(), filter.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Normalizes every field entry into flat rule definitions.
    pub fn rule_defs(&self) -> Result<Vec<RuleDef>, FilterError> {
        let mut defs = Vec::new();
        for (name, filter) in &self.fields {
            let field =
                LinkField::parse(name).ok_or_else(|| FilterError::UnknownField(name.clone()))?;
            match filter {
                FieldFilter::Pattern(pattern) => defs.push(RuleDef {
                    field,
                    spec: RuleSpec::Raw(pattern.clone()),
                    flags: None,
                    mode: FilterMode::Include,
                }),
                FieldFilter::Spec(spec) => defs.extend(spec.rule_defs(field)),
            }
        }
        Ok(defs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Exact,
    StartsWith,
    EndsWith,
    Contains,
    /// Entries are already regular expressions.
    Patterns,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSpec {
    Helper { kind: RuleKind, items: Vec<String> },
    Raw(String),
}

impl RuleSpec {
    pub fn to_pattern(&self) -> String {
        match self {
            Self::Raw(pattern) => pattern.clone(),
            Self::Helper { kind, items } => {
                let alternatives = match kind {
                    RuleKind::Patterns => items.join("|"),
                    _ => items
                        .iter()
                        .map(|item| regex::escape(item))
                        .collect::<Vec<_>>()
                        .join("|"),
                };
                match kind {
                    RuleKind::Exact => format!("^({alternatives})$"),
                    RuleKind::StartsWith => format!("^({alternatives})"),
                    RuleKind::EndsWith => format!("({alternatives})$"),
                    RuleKind::Contains | RuleKind::Patterns => format!("({alternatives})"),
                }
            }
        }
    }
}

/// A rule before regex compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDef {
    pub field: LinkField,
    pub spec: RuleSpec,
    pub flags: Option<String>,
    pub mode: FilterMode,
}

impl RuleDef {
    pub fn compile(&self) -> Result<FilterRule, FilterError> {
        let pattern = self.spec.to_pattern();
        let flags = self.flags.as_deref().unwrap_or(DEFAULT_FLAGS);
        let regex = build_regex(self.field, &pattern, flags)?;
        Ok(FilterRule {
            field: self.field,
            mode: self.mode,
            regex,
        })
    }
}

fn build_regex(field: LinkField, pattern: &str, flags: &str) -> Result<Regex, FilterError> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            // Global/sticky/unicode have no meaning for a single test.
            'g' | 'y' | 'u' => {}
            other => return Err(FilterError::InvalidFlag { field, flag: other }),
        }
    }
    builder.build().map_err(|source| FilterError::InvalidPattern {
        field,
        pattern: pattern.to_string(),
        source,
    })
}

/// A compiled predicate over one field of a [`Link`].
#[derive(Debug, Clone)]
pub struct FilterRule {
    field: LinkField,
    mode: FilterMode,
    regex: Regex,
}

impl FilterRule {
    pub fn field(&self) -> LinkField {
        self.field
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn passes(&self, link: &Link) -> bool {
        let matches = self.regex.is_match(link.field(self.field));
        match self.mode {
            FilterMode::Include => matches,
            FilterMode::Exclude => !matches,
        }
    }
}

pub fn compile_filters(config: &FilterConfig) -> Result<Vec<FilterRule>, FilterError> {
    config.rule_defs()?.iter().map(RuleDef::compile).collect()
}

/// True when `link` satisfies the rule set. An empty set accepts everything.
pub fn passes_filters(rules: &[FilterRule], link: &Link, mode: MatchMode) -> bool {
    if rules.is_empty() {
        return true;
    }
    match mode {
        MatchMode::All => rules.iter().all(|rule| rule.passes(link)),
        MatchMode::Any => rules.iter().any(|rule| rule.passes(link)),
    }
}
