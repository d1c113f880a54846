use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::descriptor::FieldKey;
use super::value::{FieldValue, FormValues};

pub const DEFAULT_PHONE_PREFIX: &str = "+234";
pub const DEFAULT_PHONE_DIGITS: usize = 10;

// A pattern that fails to compile makes every email invalid, so it is logged.
static EMAIL_SHAPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
        .map_err(|error| tracing::error!(%error, "email shape pattern failed to compile"))
        .ok()
});

pub type ValuePredicate = Arc<dyn Fn(&FieldValue) -> bool + Send + Sync>;
pub type FormPredicate = Arc<dyn Fn(&FieldValue, &FormValues) -> bool + Send + Sync>;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One error per invalid field; valid fields have no entry.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldErrors {
    entries: BTreeMap<FieldKey, FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldError> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &FieldError)> {
        self.entries.iter().map(|(key, error)| (*key, error))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn set(&mut self, key: FieldKey, error: Option<FieldError>) {
        match error {
            Some(error) => {
                self.entries.insert(key, error);
            }
            None => {
                self.entries.remove(&key);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Clone)]
enum Check {
    Required,
    MinChars(usize),
    MaxChars(usize),
    Email,
    Phone {
        prefix: Cow<'static, str>,
        digits: usize,
    },
    Pattern(Regex),
    Checked,
    OneOf(Vec<String>),
    Custom(ValuePredicate),
    CrossField(FormPredicate),
}

impl Debug for Check {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Check::Required => f.write_str("Required"),
            Check::MinChars(min) => write!(f, "MinChars({min})"),
            Check::MaxChars(max) => write!(f, "MaxChars({max})"),
            Check::Email => f.write_str("Email"),
            Check::Phone { prefix, digits } => write!(f, "Phone({prefix} + {digits} digits)"),
            Check::Pattern(regex) => write!(f, "Pattern({})", regex.as_str()),
            Check::Checked => f.write_str("Checked"),
            Check::OneOf(options) => write!(f, "OneOf({options:?})"),
            Check::Custom(_) => f.write_str("Custom"),
            Check::CrossField(_) => f.write_str("CrossField"),
        }
    }
}

/// A predicate paired with the message shown when it fails.
#[derive(Clone, Debug)]
pub struct Rule {
    check: Check,
    message: Cow<'static, str>,
}

impl Rule {
    fn new(check: Check, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            check,
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Check::Required, message)
    }

    /// Inclusive lower bound on character count.
    pub fn min_chars(min: usize, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Check::MinChars(min), message)
    }

    /// Inclusive upper bound on character count.
    pub fn max_chars(max: usize, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Check::MaxChars(max), message)
    }

    pub fn email(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Check::Email, message)
    }

    /// `+234` followed by exactly ten digits.
    pub fn phone(message: impl Into<Cow<'static, str>>) -> Self {
        Self::phone_with(DEFAULT_PHONE_PREFIX, DEFAULT_PHONE_DIGITS, message)
    }

    pub fn phone_with(
        prefix: impl Into<Cow<'static, str>>,
        digits: usize,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(
            Check::Phone {
                prefix: prefix.into(),
                digits,
            },
            message,
        )
    }

    pub fn pattern(regex: Regex, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Check::Pattern(regex), message)
    }

    pub fn checked(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Check::Checked, message)
    }

    pub fn one_of<I, S>(options: I, message: impl Into<Cow<'static, str>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            Check::OneOf(options.into_iter().map(Into::into).collect()),
            message,
        )
    }

    pub fn custom(
        predicate: impl Fn(&FieldValue) -> bool + Send + Sync + 'static,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(Check::Custom(Arc::new(predicate)), message)
    }

    /// Predicate that may also read the other values of the form.
    pub fn cross_field(
        predicate: impl Fn(&FieldValue, &FormValues) -> bool + Send + Sync + 'static,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(Check::CrossField(Arc::new(predicate)), message)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn passes(&self, value: &FieldValue, values: &FormValues) -> bool {
        let text = value.as_text();
        match &self.check {
            Check::Required => !value.is_blank(),
            Check::MinChars(min) => text.map_or(0, |t| t.chars().count()) >= *min,
            Check::MaxChars(max) => text.is_none_or(|t| t.chars().count() <= *max),
            Check::Email => text.is_some_and(is_email_shaped),
            Check::Phone { prefix, digits } => text.is_some_and(|t| {
                t.strip_prefix(prefix.as_ref()).is_some_and(|rest| {
                    rest.len() == *digits && rest.chars().all(|c| c.is_ascii_digit())
                })
            }),
            Check::Pattern(regex) => text.is_some_and(|t| regex.is_match(t)),
            Check::Checked => value.as_bool() == Some(true),
            Check::OneOf(options) => text.is_some_and(|t| options.iter().any(|o| o == t)),
            Check::Custom(predicate) => predicate(value),
            Check::CrossField(predicate) => predicate(value, values),
        }
    }

    pub fn check(&self, value: &FieldValue, values: &FormValues) -> Result<(), FieldError> {
        if self.passes(value, values) {
            Ok(())
        } else {
            Err(FieldError::new(self.message.as_ref()))
        }
    }
}

fn is_email_shaped(value: &str) -> bool {
    !value.starts_with('.')
        && !value.contains("..")
        && EMAIL_SHAPE
            .as_ref()
            .is_some_and(|shape| shape.is_match(value))
}

#[derive(Clone, Debug, Default)]
struct FieldRules {
    optional: bool,
    rules: Vec<Rule>,
}

#[derive(Clone, Debug, Default)]
pub struct ValidationSchema {
    fields: BTreeMap<FieldKey, FieldRules>,
}

impl ValidationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields
            .entry(FieldKey::new(name))
            .or_default()
            .rules
            .extend(rules);
        self
    }

    /// Rules that only apply once the field holds a non-blank value.
    pub fn optional_field(
        mut self,
        name: &'static str,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Self {
        let entry = self.fields.entry(FieldKey::new(name)).or_default();
        entry.optional = true;
        entry.rules.extend(rules);
        self
    }

    pub fn has_rules(&self, name: &str) -> bool {
        self.fields
            .get(name)
            .is_some_and(|field| !field.rules.is_empty())
    }

    pub fn rules_for(&self, name: &str) -> &[Rule] {
        self.fields
            .get(name)
            .map(|field| field.rules.as_slice())
            .unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.fields.keys().copied()
    }

    /// Checks a single field against the current values. Fields without
    /// rules are always valid.
    pub fn validate_field(&self, name: &str, values: &FormValues) -> Option<FieldError> {
        let field = self.fields.get(name)?;
        let value = values.get(name).unwrap_or(&FieldValue::Empty);
        if field.optional && value.is_blank() {
            return None;
        }
        field
            .rules
            .iter()
            .find_map(|rule| rule.check(value, values).err())
    }

    /// Checks every field with rules and collects one error per invalid field.
    pub fn validate_all(&self, values: &FormValues) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for key in self.fields.keys() {
            errors.set(*key, self.validate_field(key.as_str(), values));
        }
        errors
    }
}
