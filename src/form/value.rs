use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use super::descriptor::FieldKey;

/// A file picked by the user and held in memory until the host uploads it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StagedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

// Document payloads only describe the file; the bytes travel separately.
impl Serialize for StagedFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut file = serializer.serialize_struct("StagedFile", 3)?;
        file.serialize_field("name", &self.name)?;
        file.serialize_field("mimeType", &self.mime_type)?;
        file.serialize_field("size", &self.size())?;
        file.end()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    Date(Option<NaiveDateTime>),
    Files(Vec<StagedFile>),
    Choice(Option<String>),
    Empty,
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Date(_) => "date",
            FieldValue::Files(_) => "file list",
            FieldValue::Choice(_) => "choice",
            FieldValue::Empty => "empty",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            FieldValue::Choice(Some(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Date(value) => *value,
            _ => None,
        }
    }

    pub fn as_files(&self) -> Option<&[StagedFile]> {
        match self {
            FieldValue::Files(files) => Some(files),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&str> {
        match self {
            FieldValue::Choice(value) => value.as_deref(),
            _ => None,
        }
    }

    /// True for values a user has not filled in yet.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(value) => value.trim().is_empty(),
            FieldValue::Bool(_) => false,
            FieldValue::Date(value) => value.is_none(),
            FieldValue::Files(files) => files.is_empty(),
            FieldValue::Choice(value) => value.as_deref().is_none_or(|v| v.trim().is_empty()),
            FieldValue::Empty => true,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(value) => f.write_str(value),
            FieldValue::Bool(value) => write!(f, "{value}"),
            FieldValue::Date(Some(value)) => write!(f, "{value}"),
            FieldValue::Files(files) => {
                let names = files.iter().map(|file| file.name.as_str()).collect::<Vec<_>>();
                f.write_str(&names.join(", "))
            }
            FieldValue::Choice(Some(value)) => f.write_str(value),
            FieldValue::Date(None) | FieldValue::Choice(None) | FieldValue::Empty => Ok(()),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::Date(Some(value))
    }
}

impl From<Option<NaiveDateTime>> for FieldValue {
    fn from(value: Option<NaiveDateTime>) -> Self {
        FieldValue::Date(value)
    }
}

impl From<Vec<StagedFile>> for FieldValue {
    fn from(value: Vec<StagedFile>) -> Self {
        FieldValue::Files(value)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        FieldValue::Choice(value)
    }
}

/// Current values of one form, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormValues {
    entries: BTreeMap<FieldKey, FieldValue>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_bool)
    }

    pub fn date(&self, name: &str) -> Option<NaiveDateTime> {
        self.get(name).and_then(FieldValue::as_date)
    }

    pub fn choice(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_choice)
    }

    pub fn files(&self, name: &str) -> Option<&[StagedFile]> {
        self.get(name).and_then(FieldValue::as_files)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &FieldValue)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub(crate) fn insert(&mut self, key: FieldKey, value: FieldValue) -> Option<FieldValue> {
        self.entries.insert(key, value)
    }
}

impl Serialize for FormValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.as_str(), value)?;
        }
        map.end()
    }
}

/// Explicit default-value table handed to a form controller at initialization.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormDefaults {
    values: BTreeMap<FieldKey, FieldValue>,
}

impl FormDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: impl Into<FieldValue>) -> Self {
        self.values.insert(FieldKey::new(name), value.into());
        self
    }

    /// Entries of `other` win over entries already present.
    pub fn merge(mut self, other: FormDefaults) -> Self {
        self.values.extend(other.values);
        self
    }

    /// Drops the entry for a field the form does not declare.
    pub fn without(mut self, name: &str) -> Self {
        self.values.remove(name);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(&'static str, FieldValue)> for FormDefaults {
    fn from_iter<I: IntoIterator<Item = (&'static str, FieldValue)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |defaults, (name, value)| defaults.with(name, value))
    }
}

/// Implemented by configuration structs that describe a form's defaults,
/// normally through `#[derive(DefaultValues)]`.
pub trait DefaultValues {
    fn field_names() -> &'static [&'static str];

    fn default_values(&self) -> FormDefaults;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn blank_detection_follows_value_type() {
        assert!(FieldValue::Text("   ".into()).is_blank());
        assert!(!FieldValue::Bool(false).is_blank());
        assert!(FieldValue::Date(None).is_blank());
        assert!(FieldValue::Files(Vec::new()).is_blank());
        assert!(FieldValue::Choice(None).is_blank());
        assert!(!FieldValue::Choice(Some("Male".into())).is_blank());
        assert!(FieldValue::Empty.is_blank());
    }

    #[test]
    fn values_serialize_as_flat_document() {
        let birth = NaiveDate::from_ymd_opt(1990, 4, 12)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid date");
        let mut values = FormValues::new();
        values.insert(FieldKey::new("name"), "Ada Obi".into());
        values.insert(FieldKey::new("privacy_consent"), true.into());
        values.insert(FieldKey::new("birth_date"), birth.into());
        values.insert(FieldKey::new("gender"), FieldValue::Choice(None));
        values.insert(
            FieldKey::new("identification_document"),
            vec![StagedFile::new("id.png", "image/png", vec![1, 2, 3])].into(),
        );

        let json = values.to_json();
        assert_eq!(json["name"], "Ada Obi");
        assert_eq!(json["privacy_consent"], true);
        assert_eq!(json["birth_date"], "1990-04-12T00:00:00");
        assert!(json["gender"].is_null());
        assert_eq!(json["identification_document"][0]["size"], 3);
        assert_eq!(json["identification_document"][0]["mimeType"], "image/png");
    }

    #[test]
    fn defaults_merge_prefers_later_entries() {
        let base = FormDefaults::new().with("name", "").with("gender", "Male");
        let merged = base.merge(FormDefaults::new().with("name", "Ada"));
        assert_eq!(merged.get("name"), Some(&FieldValue::Text("Ada".into())));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.without("gender").get("gender"), None);
    }
}
