use intakeui::form::{DefaultValues, FieldValue};

#[derive(Clone, intakeui::form::DefaultValues)]
struct ContactDefaults {
    name: String,
    r#type: Option<String>,
    subscribed: bool,
}

fn main() {
    let defaults = ContactDefaults {
        name: "Ada".to_string(),
        r#type: Some("Guardian".to_string()),
        subscribed: true,
    };
    assert_eq!(ContactDefaults::field_names(), &["name", "type", "subscribed"]);

    let table = defaults.default_values();
    assert_eq!(table.get("name"), Some(&FieldValue::Text("Ada".into())));
    assert_eq!(
        table.get("type"),
        Some(&FieldValue::Choice(Some("Guardian".into())))
    );
    assert_eq!(table.get("subscribed"), Some(&FieldValue::Bool(true)));
}
