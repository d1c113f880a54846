use std::borrow::{Borrow, Cow};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use super::phone::PhoneRegion;
use super::render::{Element, FieldState};
use crate::icon::IconAsset;

pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";
pub const DEFAULT_DATE_TIME_FORMAT: &str = "%m/%d/%Y - %I:%M %p";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl Borrow<str> for FieldKey {
    fn borrow(&self) -> &str {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FieldKind {
    Text,
    MultilineText,
    PhoneNumber,
    Checkbox,
    Date,
    Select,
    DelegatedRender,
}

impl FieldKind {
    pub const ALL: [FieldKind; 7] = [
        FieldKind::Text,
        FieldKind::MultilineText,
        FieldKind::PhoneNumber,
        FieldKind::Checkbox,
        FieldKind::Date,
        FieldKind::Select,
        FieldKind::DelegatedRender,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "input",
            FieldKind::MultilineText => "textarea",
            FieldKind::PhoneNumber => "phone_input",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Date => "date_picker",
            FieldKind::Select => "select",
            FieldKind::DelegatedRender => "delegated",
        }
    }

    /// Kinds that draw a leading glyph inside the control frame.
    pub const fn supports_icon(self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Date)
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type RenderCallback = Arc<dyn Fn(&FieldState) -> Option<Element> + Send + Sync>;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DateOptions {
    pub format: Option<Cow<'static, str>>,
    pub show_time: bool,
}

impl DateOptions {
    pub fn resolved_format(&self) -> &str {
        match &self.format {
            Some(format) => format.as_ref(),
            None if self.show_time => DEFAULT_DATE_TIME_FORMAT,
            None => DEFAULT_DATE_FORMAT,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SelectItem {
    pub value: String,
    pub content: Vec<Element>,
}

impl SelectItem {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            content: vec![Element::Text(value.clone())],
            value,
        }
    }

    pub fn with_content(value: impl Into<String>, content: Vec<Element>) -> Self {
        Self {
            value: value.into(),
            content,
        }
    }
}

/// Kind-specific settings. Options a kind does not use are ignored.
#[derive(Clone, Default)]
pub struct FieldOptions {
    pub date: DateOptions,
    pub phone_region: Option<PhoneRegion>,
    pub select_items: Vec<SelectItem>,
    pub render: Option<RenderCallback>,
}

impl Debug for FieldOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldOptions")
            .field("date", &self.date)
            .field("phone_region", &self.phone_region)
            .field("select_items", &self.select_items)
            .field("render", &self.render.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    kind: FieldKind,
    name: FieldKey,
    label: Option<Cow<'static, str>>,
    placeholder: Option<Cow<'static, str>>,
    icon: Option<IconAsset>,
    disabled: bool,
    options: FieldOptions,
}

impl FieldDescriptor {
    pub fn new(kind: FieldKind, name: &'static str) -> Self {
        Self {
            kind,
            name: FieldKey::new(name),
            label: None,
            placeholder: None,
            icon: None,
            disabled: false,
            options: FieldOptions::default(),
        }
    }

    pub fn text(name: &'static str) -> Self {
        Self::new(FieldKind::Text, name)
    }

    pub fn multiline(name: &'static str) -> Self {
        Self::new(FieldKind::MultilineText, name)
    }

    pub fn phone(name: &'static str) -> Self {
        Self::new(FieldKind::PhoneNumber, name)
    }

    pub fn checkbox(name: &'static str) -> Self {
        Self::new(FieldKind::Checkbox, name)
    }

    pub fn date(name: &'static str) -> Self {
        Self::new(FieldKind::Date, name)
    }

    pub fn select(name: &'static str) -> Self {
        Self::new(FieldKind::Select, name)
    }

    pub fn delegated(name: &'static str) -> Self {
        Self::new(FieldKind::DelegatedRender, name)
    }

    pub fn label(mut self, value: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(value.into());
        self
    }

    pub fn placeholder(mut self, value: impl Into<Cow<'static, str>>) -> Self {
        self.placeholder = Some(value.into());
        self
    }

    pub fn icon(mut self, value: IconAsset) -> Self {
        self.icon = Some(value);
        self
    }

    pub fn disabled(mut self, value: bool) -> Self {
        self.disabled = value;
        self
    }

    pub fn date_format(mut self, value: impl Into<Cow<'static, str>>) -> Self {
        self.options.date.format = Some(value.into());
        self
    }

    pub fn show_time(mut self, value: bool) -> Self {
        self.options.date.show_time = value;
        self
    }

    pub fn default_region(mut self, value: PhoneRegion) -> Self {
        self.options.phone_region = Some(value);
        self
    }

    pub fn item(mut self, value: SelectItem) -> Self {
        self.options.select_items.push(value);
        self
    }

    pub fn items(mut self, values: impl IntoIterator<Item = SelectItem>) -> Self {
        self.options.select_items.extend(values);
        self
    }

    pub fn render_with(
        mut self,
        render: impl Fn(&FieldState) -> Option<Element> + Send + Sync + 'static,
    ) -> Self {
        self.options.render = Some(Arc::new(render));
        self
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn name(&self) -> FieldKey {
        self.name
    }

    pub fn label_text(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn placeholder_text(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn icon_asset(&self) -> Option<&IconAsset> {
        self.icon.as_ref()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }
}
