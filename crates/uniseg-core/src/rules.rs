//! Declarative inbound mapping tables.
//!
//! Native elements are loosely typed (`{type, data}` records), so each build
//! rule declares up front which keys it reads, in priority order, and which
//! default applies when none of them is present. A [`RuleSet`] validates all
//! rules once when it is constructed and afterwards only dispatches on the
//! element tag.
//!
//! ```rust,ignore
//! const TARGET: FieldSpec = FieldSpec::new("target", &["qq", "uin"]);
//!
//! fn at(fields: &Fields<'_>) -> Option<Segment> {
//!     fields.text(&TARGET).map(Segment::at)
//! }
//!
//! let rules = RuleSet::new(&[BuildRule::new("at", &[TARGET], at)])?;
//! ```

use std::collections::HashMap;
use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::RuleError;
use crate::segment::Segment;

/// A platform-native element: a tag plus a loosely typed data map.
pub trait NativeElement {
    /// Returns the element type tag (e.g. `"at"`).
    fn tag(&self) -> &str;

    /// Returns the element data.
    fn data(&self) -> &Map<String, Value>;
}

/// Typed default applied when none of a field's keys is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// The field stays absent.
    Absent,
    /// A fixed string.
    Text(&'static str),
    /// A fixed unsigned integer.
    Integer(u64),
}

/// One logical field of a build rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Logical field name, used in diagnostics.
    pub name: &'static str,
    /// Keys to read, highest priority first.
    pub keys: &'static [&'static str],
    /// Default applied when no key is present.
    pub default: FieldDefault,
}

impl FieldSpec {
    /// Creates a field without a default.
    pub const fn new(name: &'static str, keys: &'static [&'static str]) -> Self {
        Self {
            name,
            keys,
            default: FieldDefault::Absent,
        }
    }

    /// Sets the default.
    pub const fn or(mut self, default: FieldDefault) -> Self {
        self.default = default;
        self
    }
}

/// Read access to an element's data through [`FieldSpec`]s.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    data: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// Wraps an element data map.
    pub fn new(data: &'a Map<String, Value>) -> Self {
        Self { data }
    }

    /// Returns the value of the first present, non-null key.
    pub fn raw(&self, spec: &FieldSpec) -> Option<&'a Value> {
        spec.keys
            .iter()
            .filter_map(|key| self.data.get(*key))
            .find(|value| !value.is_null())
    }

    /// Reads a field as a string, coercing numbers and booleans.
    pub fn text(&self, spec: &FieldSpec) -> Option<String> {
        match self.raw(spec).and_then(value_to_string) {
            Some(s) => Some(s),
            None => match spec.default {
                FieldDefault::Text(s) => Some(s.to_string()),
                FieldDefault::Integer(n) => Some(n.to_string()),
                FieldDefault::Absent => None,
            },
        }
    }

    /// Reads a field as a string, falling back to the given default.
    pub fn text_or(&self, spec: &FieldSpec, default: &str) -> String {
        self.raw(spec)
            .and_then(value_to_string)
            .unwrap_or_else(|| default.to_string())
    }

    /// Reads a field as an unsigned integer, accepting numeric strings.
    pub fn integer(&self, spec: &FieldSpec) -> Option<u64> {
        match self.raw(spec).and_then(value_to_u64) {
            Some(n) => Some(n),
            None => match spec.default {
                FieldDefault::Integer(n) => Some(n),
                FieldDefault::Text(s) => s.parse().ok(),
                FieldDefault::Absent => None,
            },
        }
    }

    /// Reads a field as a `u32`, dropping values that do not fit.
    pub fn integer_u32(&self, spec: &FieldSpec) -> Option<u32> {
        self.integer(spec).and_then(|n| u32::try_from(n).ok())
    }
}

/// Converts a scalar JSON value into its string form.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Converts a JSON number or numeric string into a `u64`.
pub fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Converts a JSON number or numeric string into an `i64`.
pub fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Function that turns an element's fields into a segment.
pub type BuildFn = fn(&Fields<'_>) -> Option<Segment>;

/// A mapping rule for one native element tag.
#[derive(Debug, Clone, Copy)]
pub struct BuildRule {
    /// Element tag this rule handles.
    pub tag: &'static str,
    /// Fields the rule reads.
    pub fields: &'static [FieldSpec],
    /// The mapping function.
    pub build: BuildFn,
}

impl BuildRule {
    /// Creates a rule.
    pub const fn new(tag: &'static str, fields: &'static [FieldSpec], build: BuildFn) -> Self {
        Self { tag, fields, build }
    }

    fn validate(&self) -> Result<(), RuleError> {
        if self.tag.is_empty() {
            return Err(RuleError::EmptyTag);
        }
        for field in self.fields {
            if field.keys.is_empty() {
                return Err(RuleError::EmptyKeys {
                    tag: self.tag,
                    field: field.name,
                });
            }
            let mut seen = HashSet::new();
            for &key in field.keys {
                if !seen.insert(key) {
                    return Err(RuleError::DuplicateKey {
                        tag: self.tag,
                        field: field.name,
                        key,
                    });
                }
            }
        }
        Ok(())
    }
}

/// A validated table of build rules keyed by element tag.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: HashMap<&'static str, BuildRule>,
}

impl RuleSet {
    /// Validates and indexes the given rules.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] for empty tags, duplicate tags, fields without
    /// keys and fields repeating a key.
    pub fn new(rules: &[BuildRule]) -> Result<Self, RuleError> {
        let mut map = HashMap::with_capacity(rules.len());
        for rule in rules {
            rule.validate()?;
            if map.insert(rule.tag, *rule).is_some() {
                return Err(RuleError::DuplicateTag(rule.tag));
            }
        }
        Ok(Self { rules: map })
    }

    /// Returns true if a rule exists for the tag.
    pub fn handles(&self, tag: &str) -> bool {
        self.rules.contains_key(tag)
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Maps a native element, or returns `None` if it is unmappable.
    pub fn apply<E: NativeElement + ?Sized>(&self, element: &E) -> Option<Segment> {
        let Some(rule) = self.rules.get(element.tag()) else {
            trace!(tag = %element.tag(), "No build rule for element, dropping");
            return None;
        };
        (rule.build)(&Fields::new(element.data()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Raw(&'static str, Map<String, Value>);

    impl NativeElement for Raw {
        fn tag(&self) -> &str {
            self.0
        }

        fn data(&self) -> &Map<String, Value> {
            &self.1
        }
    }

    fn raw(tag: &'static str, data: Value) -> Raw {
        match data {
            Value::Object(map) => Raw(tag, map),
            _ => Raw(tag, Map::new()),
        }
    }

    const TARGET: FieldSpec = FieldSpec::new("target", &["qq", "uin"]);
    const NAME: FieldSpec = FieldSpec::new("name", &["Name"]).or(FieldDefault::Text("anon"));

    fn at(fields: &Fields<'_>) -> Option<Segment> {
        fields.text(&TARGET).map(Segment::at)
    }

    fn name(fields: &Fields<'_>) -> Option<Segment> {
        fields.text(&NAME).map(Segment::text)
    }

    #[test]
    fn test_priority_order() {
        let rules = RuleSet::new(&[BuildRule::new("at", &[TARGET], at)]).unwrap();
        let seg = rules.apply(&raw("at", json!({"uin": 2, "qq": 1}))).unwrap();
        assert_eq!(seg, Segment::at("1"));

        let seg = rules.apply(&raw("at", json!({"qq": null, "uin": "7"}))).unwrap();
        assert_eq!(seg, Segment::at("7"));
    }

    #[test]
    fn test_default_and_unknown() {
        let rules = RuleSet::new(&[BuildRule::new("name", &[NAME], name)]).unwrap();
        assert_eq!(
            rules.apply(&raw("name", json!({}))),
            Some(Segment::text("anon"))
        );
        assert_eq!(rules.apply(&raw("face", json!({"id": 1}))), None);
    }

    #[test]
    fn test_integer_coercion() {
        let spec = FieldSpec::new("duration", &["Duration"]).or(FieldDefault::Integer(0));
        let data = json!({"Duration": "15"});
        let fields = Fields::new(data.as_object().unwrap());
        assert_eq!(fields.integer(&spec), Some(15));

        let empty = Map::new();
        assert_eq!(Fields::new(&empty).integer(&spec), Some(0));
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let err = RuleSet::new(&[
            BuildRule::new("at", &[TARGET], at),
            BuildRule::new("at", &[TARGET], at),
        ])
        .unwrap_err();
        assert_eq!(err, RuleError::DuplicateTag("at"));
    }

    #[test]
    fn test_invalid_fields_rejected() {
        const EMPTY: FieldSpec = FieldSpec::new("nothing", &[]);
        const TWICE: FieldSpec = FieldSpec::new("twice", &["a", "a"]);

        assert!(matches!(
            RuleSet::new(&[BuildRule::new("x", &[EMPTY], at)]),
            Err(RuleError::EmptyKeys { tag: "x", .. })
        ));
        assert!(matches!(
            RuleSet::new(&[BuildRule::new("y", &[TWICE], at)]),
            Err(RuleError::DuplicateKey { key: "a", .. })
        ));
        assert_eq!(
            RuleSet::new(&[BuildRule::new("", &[], at)]).unwrap_err(),
            RuleError::EmptyTag
        );
    }
}
