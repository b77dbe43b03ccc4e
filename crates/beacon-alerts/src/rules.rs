//! Declarative rule descriptors and the evaluator shared by every domain.
//!
//! A domain classifier is a [`RuleSet`]: an ordered list of [`RuleBlock`]s,
//! each emitting at most one [`Finding`] per row. Blocks come in three shapes
//! ([`RuleKind`]):
//!
//! - **Threshold**: one numeric signal compared against ordered cutoffs.
//! - **Keyword**: case-insensitive substring match against tiered keyword lists.
//! - **Composite**: ordered bands over arbitrary [`Predicate`]s.
//!
//! In all three the first matching band wins and the rest are not checked,
//! so a block can never report two severities for the same row. A block
//! marked as a row override stops evaluation of the remaining blocks once
//! it fires.
//!
//! Rows are presented to the evaluator as [`Facts`]: the numbers and texts a
//! domain extracted from the raw row. A signal that is absent from the facts
//! makes every comparison on it false, which disables the block without
//! affecting its neighbours.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::{AlertError, Result};
use crate::types::{ComparisonOperator, Finding, Severity};

/// Named values extracted from one dataset row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facts {
    numbers: HashMap<&'static str, f64>,
    texts: HashMap<&'static str, String>,
    baseline: Option<Severity>,
}

impl Facts {
    /// Creates an empty set of facts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a numeric signal. `None` and NaN leave the signal absent.
    pub fn set_number(&mut self, name: &'static str, value: Option<f64>) -> &mut Self {
        match value {
            Some(v) if !v.is_nan() => {
                self.numbers.insert(name, v);
            }
            _ => {
                self.numbers.remove(name);
            }
        }
        self
    }

    /// Records a text field. `None` leaves the field absent.
    pub fn set_text(&mut self, name: &'static str, value: Option<impl Into<String>>) -> &mut Self {
        match value {
            Some(v) => {
                self.texts.insert(name, v.into());
            }
            None => {
                self.texts.remove(name);
            }
        }
        self
    }

    /// Sets the severity used by [`BandSeverity::Baseline`] and
    /// [`BandSeverity::AtLeast`] bands.
    pub fn set_baseline(&mut self, severity: Severity) -> &mut Self {
        self.baseline = Some(severity);
        self
    }

    /// Numeric signal, if present.
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.numbers.get(name).copied()
    }

    /// Text field, if present.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    /// Row baseline severity, if the domain defines one.
    #[must_use]
    pub const fn baseline(&self) -> Option<Severity> {
        self.baseline
    }
}

/// Right-hand side of a numeric comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    /// A constant.
    Value(f64),
    /// Another signal of the same row.
    Signal(&'static str),
    /// Another signal multiplied by a constant.
    Scaled {
        /// Signal name.
        signal: &'static str,
        /// Multiplier.
        factor: f64,
    },
}

impl Operand {
    fn resolve(&self, facts: &Facts) -> Option<f64> {
        match *self {
            Self::Value(v) => Some(v),
            Self::Signal(name) => facts.number(name),
            Self::Scaled { signal, factor } => facts.number(signal).map(|v| v * factor),
        }
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Self::Value(value)
    }
}

/// A boolean condition over [`Facts`].
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Always true.
    Always,
    /// `signal op operand`; false if either side is absent.
    Compare {
        /// Left-hand signal.
        signal: &'static str,
        /// Operator.
        op: ComparisonOperator,
        /// Right-hand side.
        operand: Operand,
    },
    /// The field contains any of the keywords (case-insensitive substring).
    Contains {
        /// Text field.
        field: &'static str,
        /// Lowercased, non-empty keywords.
        keywords: Vec<String>,
    },
    /// The field equals one of the values, ignoring case and surrounding space.
    OneOf {
        /// Text field.
        field: &'static str,
        /// Lowercased values.
        values: Vec<String>,
    },
    /// The numeric signal is present.
    Present(&'static str),
    /// The text field is present.
    HasText(&'static str),
    /// Every inner predicate holds.
    All(Vec<Predicate>),
    /// At least one inner predicate holds.
    Any(Vec<Predicate>),
    /// The inner predicate does not hold.
    Not(Box<Predicate>),
}

impl Predicate {
    /// `signal op operand`.
    #[must_use]
    pub fn compare(signal: &'static str, op: ComparisonOperator, operand: impl Into<Operand>) -> Self {
        Self::Compare {
            signal,
            op,
            operand: operand.into(),
        }
    }

    /// `signal < operand`.
    #[must_use]
    pub fn lt(signal: &'static str, operand: impl Into<Operand>) -> Self {
        Self::compare(signal, ComparisonOperator::LessThan, operand)
    }

    /// `signal <= operand`.
    #[must_use]
    pub fn le(signal: &'static str, operand: impl Into<Operand>) -> Self {
        Self::compare(signal, ComparisonOperator::LessThanOrEqual, operand)
    }

    /// `signal > operand`.
    #[must_use]
    pub fn gt(signal: &'static str, operand: impl Into<Operand>) -> Self {
        Self::compare(signal, ComparisonOperator::GreaterThan, operand)
    }

    /// `signal >= operand`.
    #[must_use]
    pub fn ge(signal: &'static str, operand: impl Into<Operand>) -> Self {
        Self::compare(signal, ComparisonOperator::GreaterThanOrEqual, operand)
    }

    /// Field contains any keyword.
    #[must_use]
    pub fn contains<S: AsRef<str>>(field: &'static str, keywords: &[S]) -> Self {
        Self::Contains {
            field,
            keywords: normalize(keywords),
        }
    }

    /// Field equals the value.
    #[must_use]
    pub fn equals(field: &'static str, value: &str) -> Self {
        Self::one_of(field, &[value])
    }

    /// Field equals one of the values.
    #[must_use]
    pub fn one_of<S: AsRef<str>>(field: &'static str, values: &[S]) -> Self {
        Self::OneOf {
            field,
            values: normalize(values),
        }
    }

    /// Logical negation.
    #[must_use]
    pub fn negate(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn matches(&self, facts: &Facts) -> bool {
        match self {
            Self::Always => true,
            Self::Compare {
                signal,
                op,
                operand,
            } => match (facts.number(signal), operand.resolve(facts)) {
                (Some(left), Some(right)) => op.evaluate(left, right),
                _ => false,
            },
            Self::Contains { field, keywords } => facts.text(field).is_some_and(|text| {
                let text = text.to_lowercase();
                keywords.iter().any(|k| text.contains(k.as_str()))
            }),
            Self::OneOf { field, values } => facts.text(field).is_some_and(|text| {
                let text = text.trim().to_lowercase();
                values.iter().any(|v| *v == text)
            }),
            Self::Present(signal) => facts.number(signal).is_some(),
            Self::HasText(field) => facts.text(field).is_some(),
            Self::All(inner) => inner.iter().all(|p| p.matches(facts)),
            Self::Any(inner) => inner.iter().any(|p| p.matches(facts)),
            Self::Not(inner) => !inner.matches(facts),
        }
    }
}

fn normalize<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// An alert title with `{name}` or `{name:format}` placeholders.
///
/// Placeholders resolve against the row facts, text fields first. Three names
/// are reserved: `severity` (`Critical`), `SEVERITY` (`CRITICAL`) and `value`
/// (the signal of a threshold block). Unknown names render as `N/A`.
///
/// Number formats: `int` truncates, `pct` renders a ratio as a percentage
/// with two decimals, `.N` fixes the number of decimals. Without a format,
/// whole numbers keep one decimal (`41.0`). Text formats: `upper`, `lower`,
/// `title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template(String);

impl Template {
    /// Wraps a template string.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Renders the title.
    #[must_use]
    pub fn render(&self, facts: &Facts, severity: Severity, value: Option<f64>) -> String {
        let mut out = String::with_capacity(self.0.len() + 32);
        let mut rest = self.0.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                return out;
            };
            let (name, format) = match after[..close].split_once(':') {
                Some((name, format)) => (name, Some(format)),
                None => (&after[..close], None),
            };
            match name {
                "severity" => out.push_str(severity.as_str()),
                "SEVERITY" => out.push_str(&severity.as_str().to_uppercase()),
                "value" => push_number(&mut out, value, format),
                _ => {
                    if let Some(text) = facts.text(name) {
                        push_text(&mut out, text, format);
                    } else {
                        push_number(&mut out, facts.number(name), format);
                    }
                }
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        out
    }
}

impl From<&str> for Template {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

fn push_text(out: &mut String, text: &str, format: Option<&str>) {
    match format {
        Some("upper") => out.push_str(&text.to_uppercase()),
        Some("lower") => out.push_str(&text.to_lowercase()),
        Some("title") => out.push_str(&title_case(text)),
        _ => out.push_str(text),
    }
}

fn push_number(out: &mut String, value: Option<f64>, format: Option<&str>) {
    let Some(v) = value else {
        out.push_str("N/A");
        return;
    };
    let _ = match format {
        #[allow(clippy::cast_possible_truncation)]
        Some("int") => write!(out, "{}", v.trunc() as i64),
        Some("pct") => write!(out, "{:.2}%", v * 100.0),
        Some(f) if f.starts_with('.') => match f[1..].parse::<usize>() {
            Ok(precision) => write!(out, "{v:.precision$}"),
            Err(_) => write!(out, "{}", display_number(v)),
        },
        _ => write!(out, "{}", display_number(v)),
    };
}

/// Renders a number the way spreadsheet exports show floats: whole values
/// keep a trailing `.0`.
#[must_use]
pub fn display_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

/// Capitalizes the first letter of every word and lowercases the rest.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// How a composite band picks its severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandSeverity {
    /// Always this severity.
    Fixed(Severity),
    /// The row baseline, raised to at least this severity.
    AtLeast(Severity),
    /// The row baseline; no finding if the row has none.
    Baseline,
    /// The band matches but emits nothing, stopping later bands.
    Suppress,
}

impl BandSeverity {
    fn resolve(self, facts: &Facts) -> Option<Severity> {
        match self {
            Self::Fixed(s) => Some(s),
            Self::AtLeast(s) => Some(facts.baseline().map_or(s, |b| b.max(s))),
            Self::Baseline => facts.baseline(),
            Self::Suppress => None,
        }
    }
}

/// One band of a composite block.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    /// Condition.
    pub when: Predicate,
    /// Severity when the condition holds.
    pub severity: BandSeverity,
    /// Alert title.
    pub title: Template,
}

impl Band {
    /// Creates a band.
    #[must_use]
    pub fn new(when: Predicate, severity: BandSeverity, title: impl Into<Template>) -> Self {
        Self {
            when,
            severity,
            title: title.into(),
        }
    }
}

/// One cutoff of a threshold block.
#[derive(Debug, Clone, PartialEq)]
pub struct Cutoff {
    /// Right-hand side of the comparison.
    pub value: f64,
    /// Severity when the comparison holds.
    pub severity: Severity,
    /// Alert title.
    pub title: Template,
}

impl Cutoff {
    /// Creates a cutoff.
    #[must_use]
    pub fn new(value: f64, severity: Severity, title: impl Into<Template>) -> Self {
        Self {
            value,
            severity,
            title: title.into(),
        }
    }
}

/// One severity tier of a keyword block.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordTier {
    /// Severity when any keyword matches.
    pub severity: Severity,
    /// Lowercased keywords.
    pub keywords: Vec<String>,
    /// Alert title.
    pub title: Template,
}

impl KeywordTier {
    /// Creates a tier.
    #[must_use]
    pub fn new<S: AsRef<str>>(severity: Severity, keywords: &[S], title: impl Into<Template>) -> Self {
        Self {
            severity,
            keywords: normalize(keywords),
            title: title.into(),
        }
    }
}

/// Raises the selected severity by one band when its condition holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Escalation {
    /// Condition.
    pub when: Predicate,
    /// Severities that are raised; others are left alone.
    pub raises: Vec<Severity>,
}

/// The three rule shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    /// Numeric signal against cutoffs, most severe first.
    Threshold {
        /// Signal name.
        signal: &'static str,
        /// Comparison applied as `signal op cutoff`.
        op: ComparisonOperator,
        /// Cutoffs, most severe first.
        cutoffs: Vec<Cutoff>,
    },
    /// Keyword tiers over one text field, most severe first.
    Keyword {
        /// Text field.
        field: &'static str,
        /// Tiers, most severe first.
        tiers: Vec<KeywordTier>,
    },
    /// Arbitrary ordered bands.
    Composite {
        /// Bands in evaluation order.
        bands: Vec<Band>,
    },
}

/// A self-contained check emitting at most one finding per row.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBlock {
    /// Block name, used in logs.
    pub name: &'static str,
    /// Condition that must hold before any band is checked.
    pub gate: Predicate,
    /// Band selection.
    pub kind: RuleKind,
    /// Applied in order; the first matching escalation is used.
    pub escalations: Vec<Escalation>,
    /// When the block fires, later blocks are skipped for the row.
    pub overrides_row: bool,
}

impl RuleBlock {
    /// A threshold block.
    #[must_use]
    pub fn threshold(
        name: &'static str,
        signal: &'static str,
        op: ComparisonOperator,
        cutoffs: Vec<Cutoff>,
    ) -> Self {
        Self::with_kind(name, RuleKind::Threshold { signal, op, cutoffs })
    }

    /// A keyword block.
    #[must_use]
    pub fn keyword(name: &'static str, field: &'static str, tiers: Vec<KeywordTier>) -> Self {
        Self::with_kind(name, RuleKind::Keyword { field, tiers })
    }

    /// A composite block.
    #[must_use]
    pub fn composite(name: &'static str, bands: Vec<Band>) -> Self {
        Self::with_kind(name, RuleKind::Composite { bands })
    }

    fn with_kind(name: &'static str, kind: RuleKind) -> Self {
        Self {
            name,
            gate: Predicate::Always,
            kind,
            escalations: Vec::new(),
            overrides_row: false,
        }
    }

    /// Sets the gate.
    #[must_use]
    pub fn gated(mut self, gate: Predicate) -> Self {
        self.gate = gate;
        self
    }

    /// Adds an escalation.
    #[must_use]
    pub fn escalate(mut self, when: Predicate, raises: &[Severity]) -> Self {
        self.escalations.push(Escalation {
            when,
            raises: raises.to_vec(),
        });
        self
    }

    /// Marks the block as a row override.
    #[must_use]
    pub const fn overriding(mut self) -> Self {
        self.overrides_row = true;
        self
    }

    /// Checks the block's cutoffs and tiers are ordered most severe first.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| {
            Err(AlertError::InvalidRule {
                reason: format!("{}: {reason}", self.name),
            })
        };

        match &self.kind {
            RuleKind::Threshold { op, cutoffs, .. } => {
                if cutoffs.is_empty() {
                    return invalid("no cutoffs".to_string());
                }
                if let Some(c) = cutoffs.iter().find(|c| !c.value.is_finite()) {
                    return invalid(format!("cutoff {} is not finite", c.value));
                }
                for pair in cutoffs.windows(2) {
                    let (worse, milder) = (&pair[0], &pair[1]);
                    if worse.severity <= milder.severity {
                        return invalid(format!(
                            "{} listed before {}",
                            worse.severity, milder.severity
                        ));
                    }
                    let ordered = if op.is_lower_worse() {
                        worse.value < milder.value
                    } else {
                        worse.value > milder.value
                    };
                    if !ordered {
                        return invalid(format!(
                            "{} cutoff {} does not come before {} cutoff {} for {op}",
                            worse.severity, worse.value, milder.severity, milder.value
                        ));
                    }
                }
            }
            RuleKind::Keyword { tiers, .. } => {
                if tiers.is_empty() {
                    return invalid("no keyword tiers".to_string());
                }
                for pair in tiers.windows(2) {
                    if pair[0].severity <= pair[1].severity {
                        return invalid(format!(
                            "{} tier listed before {}",
                            pair[0].severity, pair[1].severity
                        ));
                    }
                }
            }
            RuleKind::Composite { bands } => {
                if bands.is_empty() {
                    return invalid("no bands".to_string());
                }
            }
        }
        Ok(())
    }

    /// Evaluates the block against one row.
    #[must_use]
    pub fn evaluate(&self, facts: &Facts, category: &str) -> Option<Finding> {
        if !self.gate.matches(facts) {
            return None;
        }

        let (severity, title, value) = match &self.kind {
            RuleKind::Threshold {
                signal,
                op,
                cutoffs,
            } => {
                let value = facts.number(signal)?;
                let cutoff = cutoffs.iter().find(|c| op.evaluate(value, c.value))?;
                (cutoff.severity, &cutoff.title, Some(value))
            }
            RuleKind::Keyword { field, tiers } => {
                let text = facts.text(field)?.to_lowercase();
                let tier = tiers
                    .iter()
                    .find(|t| t.keywords.iter().any(|k| text.contains(k.as_str())))?;
                (tier.severity, &tier.title, None)
            }
            RuleKind::Composite { bands } => {
                let band = bands.iter().find(|b| b.when.matches(facts))?;
                (band.severity.resolve(facts)?, &band.title, None)
            }
        };

        let severity = match self.escalations.iter().find(|e| e.when.matches(facts)) {
            Some(e) if e.raises.contains(&severity) => severity.raised(),
            _ => severity,
        };

        Some(Finding::new(
            title.render(facts, severity, value),
            category,
            severity,
        ))
    }
}

/// A domain's ordered rule blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    category: String,
    blocks: Vec<RuleBlock>,
}

impl RuleSet {
    /// Builds a rule set, validating every block.
    pub fn new(category: impl Into<String>, blocks: Vec<RuleBlock>) -> Result<Self> {
        for block in &blocks {
            block.validate()?;
        }
        Ok(Self {
            category: category.into(),
            blocks,
        })
    }

    /// Category stamped on every finding.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Blocks in evaluation order.
    #[must_use]
    pub fn blocks(&self) -> &[RuleBlock] {
        &self.blocks
    }

    /// Classifies one row. Findings are in block order.
    #[must_use]
    pub fn classify(&self, facts: &Facts) -> Vec<Finding> {
        let mut findings = Vec::new();
        for block in &self.blocks {
            if let Some(finding) = block.evaluate(facts, &self.category) {
                findings.push(finding);
                if block.overrides_row {
                    break;
                }
            }
        }
        findings
    }
}
