use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// What a custom rule predicate may answer: accept, reject with the rule's
/// static message, or reject with its own replacement message.
pub enum RuleOutcome {
    Valid,
    Invalid,
    Message(String),
}

type CustomCheck = Arc<dyn Fn(&str) -> RuleOutcome + Send + Sync>;

/// One declarative rule for a single field. A rule may combine aspects
/// (e.g. required + pattern) under one message; the constructor helpers
/// build the common single-aspect rules.
#[derive(Clone, Default)]
pub struct FieldRule {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub custom: Option<CustomCheck>,
    pub message: String,
}

impl FieldRule {
    pub fn required(message: impl Into<String>) -> Self {
        Self {
            required: true,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Self {
            min_length: Some(min),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Self {
            max_length: Some(max),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn pattern(pattern: Regex, message: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn custom(
        check: impl Fn(&str) -> RuleOutcome + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> Self {
        Self {
            custom: Some(Arc::new(check)),
            message: message.into(),
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("required", &self.required)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("custom", &self.custom.is_some())
            .field("message", &self.message)
            .finish()
    }
}

/// Rules per field name, evaluated in insertion-independent (sorted) order.
pub type RuleSet = BTreeMap<String, Vec<FieldRule>>;

/// Evaluate every rule for a single value, accumulating all failing
/// messages. A failing `required` on an empty value short-circuits the
/// remaining rules for that field; an empty optional value skips them.
pub fn validate_field(value: Option<&str>, rules: &[FieldRule]) -> Vec<String> {
    let mut errors = Vec::new();
    let text = value.unwrap_or("");
    let empty = text.trim().is_empty();

    for rule in rules {
        if rule.required && empty {
            errors.push(rule.message.clone());
            continue;
        }
        if empty {
            continue;
        }

        if let Some(min) = rule.min_length {
            if text.chars().count() < min {
                errors.push(rule.message.clone());
            }
        }

        if let Some(max) = rule.max_length {
            if text.chars().count() > max {
                errors.push(rule.message.clone());
            }
        }

        if let Some(pattern) = &rule.pattern {
            if !pattern.is_match(text) {
                errors.push(rule.message.clone());
            }
        }

        if let Some(custom) = &rule.custom {
            match custom(text) {
                RuleOutcome::Valid => {}
                RuleOutcome::Invalid => errors.push(rule.message.clone()),
                RuleOutcome::Message(message) => errors.push(message),
            }
        }
    }

    errors
}

/// Holds the per-field error lists produced by the last `validate` call.
/// Each call overwrites the map entirely; errors are not additive across
/// calls.
#[derive(Debug, Default)]
pub struct FormValidator {
    errors: BTreeMap<String, Vec<String>>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a whole record; returns overall validity. Only fields with
    /// at least one violation get an entry in the error map.
    pub fn validate(&mut self, record: &HashMap<String, String>, rules: &RuleSet) -> bool {
        self.errors.clear();
        let mut valid = true;

        for (field, field_rules) in rules {
            let value = record.get(field).map(String::as_str);
            let field_errors = validate_field(value, field_rules);
            if !field_errors.is_empty() {
                self.errors.insert(field.clone(), field_errors);
                valid = false;
            }
        }

        valid
    }

    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.get(field).is_some_and(|e| !e.is_empty())
    }

    pub fn first_error(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|e| e.first())
            .map(String::as_str)
    }

    pub fn field_errors(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn clear_error(&mut self, field: &str) {
        self.errors.remove(field);
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn required_rejects_missing_and_blank_values() {
        let rules = vec![FieldRule::required("required")];
        assert_eq!(validate_field(None, &rules), vec!["required"]);
        assert_eq!(validate_field(Some(""), &rules), vec!["required"]);
        assert_eq!(validate_field(Some("   "), &rules), vec!["required"]);
        assert!(validate_field(Some("x"), &rules).is_empty());
    }

    #[test]
    fn required_failure_skips_remaining_rules_for_the_field() {
        let rules = vec![
            FieldRule::required("required"),
            FieldRule::min_length(3, "too short"),
        ];
        assert_eq!(validate_field(Some(""), &rules), vec!["required"]);
    }

    #[test]
    fn empty_optional_value_skips_all_checks() {
        let rules = vec![
            FieldRule::min_length(3, "too short"),
            FieldRule::pattern(Regex::new(r"^\d+$").unwrap(), "digits only"),
        ];
        assert!(validate_field(Some(""), &rules).is_empty());
        assert!(validate_field(None, &rules).is_empty());
    }

    #[test]
    fn all_failing_rules_accumulate_in_order() {
        let rules = vec![
            FieldRule::min_length(5, "too short"),
            FieldRule::pattern(Regex::new(r"^\d+$").unwrap(), "digits only"),
        ];
        assert_eq!(validate_field(Some("ab"), &rules), vec!["too short", "digits only"]);
    }

    #[test]
    fn length_checks_count_characters() {
        let rules = vec![FieldRule::max_length(3, "too long")];
        assert!(validate_field(Some("héé"), &rules).is_empty());
        assert_eq!(validate_field(Some("hééé"), &rules), vec!["too long"]);
    }

    #[test]
    fn custom_rule_may_replace_the_message() {
        let rules = vec![FieldRule::custom(
            |value| {
                if value == "ok" {
                    RuleOutcome::Valid
                } else if value == "bad" {
                    RuleOutcome::Invalid
                } else {
                    RuleOutcome::Message(format!("unexpected: {value}"))
                }
            },
            "static message",
        )];
        assert!(validate_field(Some("ok"), &rules).is_empty());
        assert_eq!(validate_field(Some("bad"), &rules), vec!["static message"]);
        assert_eq!(
            validate_field(Some("odd"), &rules),
            vec!["unexpected: odd"]
        );
    }

    #[test]
    fn validate_collects_only_failing_fields() {
        let mut rules = RuleSet::new();
        rules.insert("name".to_string(), vec![FieldRule::required("name required")]);
        rules.insert("email".to_string(), vec![FieldRule::required("email required")]);

        let mut validator = FormValidator::new();
        let ok = validator.validate(&record(&[("name", "ada")]), &rules);

        assert!(!ok);
        assert!(!validator.has_error("name"));
        assert!(validator.has_error("email"));
        assert_eq!(validator.first_error("email"), Some("email required"));
        assert_eq!(validator.field_errors("email"), ["email required"]);
    }

    #[test]
    fn validate_overwrites_previous_errors_entirely() {
        let mut rules = RuleSet::new();
        rules.insert("name".to_string(), vec![FieldRule::required("name required")]);

        let mut validator = FormValidator::new();
        assert!(!validator.validate(&record(&[]), &rules));
        assert!(validator.has_error("name"));

        assert!(validator.validate(&record(&[("name", "ada")]), &rules));
        assert!(validator.errors().is_empty());
    }

    #[test]
    fn clear_helpers_remove_errors() {
        let mut rules = RuleSet::new();
        rules.insert("name".to_string(), vec![FieldRule::required("required")]);

        let mut validator = FormValidator::new();
        validator.validate(&record(&[]), &rules);
        assert!(validator.has_error("name"));

        validator.clear_error("name");
        assert!(!validator.has_error("name"));

        validator.validate(&record(&[]), &rules);
        validator.clear_errors();
        assert!(validator.errors().is_empty());
    }

    #[test]
    fn cpf_checksum_as_custom_rule() {
        use crate::validation::cpf;

        let rules = vec![FieldRule::custom(
            |value| {
                if cpf::validate_checksum(value) {
                    RuleOutcome::Valid
                } else {
                    RuleOutcome::Invalid
                }
            },
            "invalid CPF",
        )];
        assert!(validate_field(Some("529.982.247-25"), &rules).is_empty());
        assert_eq!(validate_field(Some("11111111111"), &rules), vec!["invalid CPF"]);
    }
}
