use std::fmt::Write;
use std::sync::Arc;

use chrono::NaiveDateTime;

use super::descriptor::FieldDescriptor;
use super::phone::{self, PhoneRegion};
use super::registry::{FieldStrategy, LabelPlacement};
use super::render::{Element, FieldHandlers, FieldState};
use super::value::FieldValue;
use crate::icon::IconAsset;

fn text_value(state: &FieldState) -> String {
    state.value.as_text().unwrap_or_default().to_string()
}

fn placeholder(descriptor: &FieldDescriptor) -> Option<String> {
    descriptor.placeholder_text().map(str::to_string)
}

// Unknown specifiers in a caller-supplied format leave the display empty.
fn format_date(date: NaiveDateTime, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}

fn framed(icon: Option<&IconAsset>, control: Element) -> Element {
    match icon {
        Some(icon) => Element::Framed {
            icon: icon.clone(),
            control: Box::new(control),
        },
        None => control,
    }
}

pub struct TextStrategy;

impl FieldStrategy for TextStrategy {
    fn value_type(&self) -> &'static str {
        "text"
    }

    fn default_value(&self) -> FieldValue {
        FieldValue::Text(String::new())
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Text(_))
    }

    fn render_control(&self, descriptor: &FieldDescriptor, state: &FieldState) -> Option<Element> {
        let input = Element::TextInput {
            name: descriptor.name(),
            value: text_value(state),
            placeholder: placeholder(descriptor),
            disabled: descriptor.is_disabled(),
        };
        Some(framed(descriptor.icon_asset(), input))
    }
}

pub struct MultilineTextStrategy;

impl FieldStrategy for MultilineTextStrategy {
    fn value_type(&self) -> &'static str {
        "text"
    }

    fn default_value(&self) -> FieldValue {
        FieldValue::Text(String::new())
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Text(_))
    }

    fn render_control(&self, descriptor: &FieldDescriptor, state: &FieldState) -> Option<Element> {
        Some(Element::TextArea {
            name: descriptor.name(),
            value: text_value(state),
            placeholder: placeholder(descriptor),
            disabled: descriptor.is_disabled(),
        })
    }
}

pub struct PhoneNumberStrategy;

impl PhoneNumberStrategy {
    fn region(descriptor: &FieldDescriptor) -> PhoneRegion {
        descriptor.options().phone_region.unwrap_or_default()
    }
}

impl FieldStrategy for PhoneNumberStrategy {
    fn value_type(&self) -> &'static str {
        "text"
    }

    fn default_value(&self) -> FieldValue {
        FieldValue::Text(String::new())
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Text(_))
    }

    fn render_control(&self, descriptor: &FieldDescriptor, state: &FieldState) -> Option<Element> {
        let value = text_value(state);
        Some(Element::PhoneInput {
            name: descriptor.name(),
            display: phone::format_international(&value),
            value,
            placeholder: placeholder(descriptor),
            region: Self::region(descriptor),
            disabled: descriptor.is_disabled(),
        })
    }

    // Typed text reaches the form already in international form.
    fn handlers(&self, descriptor: &FieldDescriptor, state: &FieldState) -> FieldHandlers {
        let region = Self::region(descriptor);
        let forward = state.change_handler();
        FieldHandlers {
            on_change: Arc::new(move |value| match value {
                FieldValue::Text(raw) => {
                    forward(FieldValue::Text(phone::normalize_input(&raw, region)))
                }
                other => forward(other),
            }),
            on_blur: state.blur_handler(),
        }
    }
}

pub struct CheckboxStrategy;

impl FieldStrategy for CheckboxStrategy {
    fn value_type(&self) -> &'static str {
        "boolean"
    }

    fn default_value(&self) -> FieldValue {
        FieldValue::Bool(false)
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Bool(_))
    }

    fn render_control(&self, descriptor: &FieldDescriptor, state: &FieldState) -> Option<Element> {
        Some(Element::Checkbox {
            name: descriptor.name(),
            checked: state.value.as_bool().unwrap_or(false),
            label: descriptor.label_text().map(str::to_string),
            disabled: descriptor.is_disabled(),
        })
    }

    fn label_placement(&self) -> LabelPlacement {
        LabelPlacement::Inline
    }
}

pub struct DateStrategy;

impl FieldStrategy for DateStrategy {
    fn value_type(&self) -> &'static str {
        "date"
    }

    fn default_value(&self) -> FieldValue {
        FieldValue::Date(None)
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Date(_))
    }

    fn render_control(&self, descriptor: &FieldDescriptor, state: &FieldState) -> Option<Element> {
        let options = &descriptor.options().date;
        let format = options.resolved_format().to_string();
        let selected = state.value.as_date();
        let picker = Element::DatePicker {
            name: descriptor.name(),
            selected,
            display: selected.and_then(|date| format_date(date, &format)),
            format,
            show_time: options.show_time,
            disabled: descriptor.is_disabled(),
        };
        let icon = descriptor
            .icon_asset()
            .cloned()
            .unwrap_or(IconAsset::CALENDAR);
        Some(framed(Some(&icon), picker))
    }
}

pub struct SelectStrategy;

impl FieldStrategy for SelectStrategy {
    fn value_type(&self) -> &'static str {
        "choice"
    }

    fn default_value(&self) -> FieldValue {
        FieldValue::Choice(None)
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Choice(_))
    }

    fn render_control(&self, descriptor: &FieldDescriptor, state: &FieldState) -> Option<Element> {
        Some(Element::Select {
            name: descriptor.name(),
            selected: state.value.as_choice().map(str::to_string),
            placeholder: placeholder(descriptor),
            items: descriptor.options().select_items.clone(),
            disabled: descriptor.is_disabled(),
        })
    }
}

pub struct DelegatedRenderStrategy;

impl FieldStrategy for DelegatedRenderStrategy {
    fn value_type(&self) -> &'static str {
        "any"
    }

    fn default_value(&self) -> FieldValue {
        FieldValue::Empty
    }

    fn accepts(&self, _value: &FieldValue) -> bool {
        true
    }

    fn render_control(&self, descriptor: &FieldDescriptor, state: &FieldState) -> Option<Element> {
        descriptor
            .options()
            .render
            .as_ref()
            .and_then(|render| render(state))
    }
}
