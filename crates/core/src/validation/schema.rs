//! Declarative field rules.

use regex::Regex;

/// JSON type a field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

/// Rule set for a single request field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<Regex>,
    pub one_of: Option<&'static [&'static str]>,
}

impl FieldRule {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            min_len: None,
            max_len: None,
            min: None,
            max: None,
            pattern: None,
            one_of: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn object(name: &'static str) -> Self {
        Self::new(name, FieldKind::Object)
    }

    /// Array field. `length`/`min_length`/`max_length` bound the item count.
    pub fn array(name: &'static str) -> Self {
        Self::new(name, FieldKind::Array)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Character-count bounds (inclusive) for string fields.
    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.min_len = Some(min);
        self.max_len = Some(max);
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Anchors are the caller's responsibility.
    ///
    /// # Panics
    /// Panics on an invalid regular expression. Rules are static
    /// configuration, so a bad pattern is a programming error.
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(Regex::new(pattern).expect("invalid validation pattern"));
        self
    }

    pub fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.one_of = Some(values);
        self
    }
}

/// Ordered collection of field rules for one request body.
#[derive(Debug, Clone)]
pub struct Schema {
    pub fields: Vec<FieldRule>,
    /// Stop at the first failing field instead of collecting every failure.
    pub abort_early: bool,
}

impl Schema {
    pub fn new(fields: Vec<FieldRule>) -> Self {
        Self {
            fields,
            abort_early: false,
        }
    }

    pub fn abort_early(mut self) -> Self {
        self.abort_early = true;
        self
    }
}

/// Request payloads that carry a declarative schema.
pub trait Validate {
    fn schema() -> &'static Schema;
}
