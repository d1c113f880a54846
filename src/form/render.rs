use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use chrono::NaiveDateTime;

use super::descriptor::{FieldDescriptor, FieldKey, SelectItem};
use super::phone::PhoneRegion;
use super::registry::{FieldKindRegistry, LabelPlacement};
use super::value::FieldValue;
use crate::icon::IconAsset;

pub type ChangeHandler = Arc<dyn Fn(FieldValue) + Send + Sync>;
pub type BlurHandler = Arc<dyn Fn() + Send + Sync>;

/// Headless presentation tree produced by the field renderer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Element {
    Label {
        text: String,
        target: FieldKey,
    },
    Text(String),
    Icon(IconAsset),
    TextInput {
        name: FieldKey,
        value: String,
        placeholder: Option<String>,
        disabled: bool,
    },
    TextArea {
        name: FieldKey,
        value: String,
        placeholder: Option<String>,
        disabled: bool,
    },
    PhoneInput {
        name: FieldKey,
        value: String,
        display: String,
        placeholder: Option<String>,
        region: PhoneRegion,
        disabled: bool,
    },
    Checkbox {
        name: FieldKey,
        checked: bool,
        label: Option<String>,
        disabled: bool,
    },
    DatePicker {
        name: FieldKey,
        selected: Option<NaiveDateTime>,
        display: Option<String>,
        format: String,
        show_time: bool,
        disabled: bool,
    },
    Select {
        name: FieldKey,
        selected: Option<String>,
        placeholder: Option<String>,
        items: Vec<SelectItem>,
        disabled: bool,
    },
    RadioGroup {
        name: FieldKey,
        options: Vec<String>,
        selected: Option<String>,
    },
    FileDropzone {
        name: FieldKey,
        files: Vec<String>,
    },
    /// Control frame with a leading icon.
    Framed {
        icon: IconAsset,
        control: Box<Element>,
    },
    Row(Vec<Element>),
    /// Form submit trigger. While loading it shows the spinner icon and
    /// cannot be pressed.
    SubmitButton {
        label: String,
        icon: Option<IconAsset>,
        loading: bool,
        disabled: bool,
    },
}

impl Element {
    /// This element and everything nested in it, depth first.
    pub fn walk(&self) -> Vec<&Element> {
        let mut out = vec![self];
        match self {
            Element::Framed { control, .. } => out.extend(control.walk()),
            Element::Row(children) => {
                for child in children {
                    out.extend(child.walk());
                }
            }
            Element::Select { items, .. } => {
                for item in items {
                    for child in &item.content {
                        out.extend(child.walk());
                    }
                }
            }
            _ => {}
        }
        out
    }
}

pub const LOADING_LABEL: &str = "Loading ...";

pub fn render_submit_button(label: impl Into<String>, loading: bool) -> Element {
    if loading {
        Element::SubmitButton {
            label: LOADING_LABEL.to_string(),
            icon: Some(IconAsset::LOADING),
            loading: true,
            disabled: true,
        }
    } else {
        Element::SubmitButton {
            label: label.into(),
            icon: None,
            loading: false,
            disabled: false,
        }
    }
}

/// What a control sees of its field: value, error and the callbacks that
/// feed user edits back into the owning form.
#[derive(Clone)]
pub struct FieldState {
    pub name: FieldKey,
    pub value: FieldValue,
    pub error: Option<String>,
    pub touched: bool,
    on_change: ChangeHandler,
    on_blur: BlurHandler,
}

impl FieldState {
    pub fn new(name: FieldKey, value: FieldValue) -> Self {
        Self {
            name,
            value,
            error: None,
            touched: false,
            on_change: Arc::new(|_| {}),
            on_blur: Arc::new(|| {}),
        }
    }

    pub fn error(mut self, value: Option<String>) -> Self {
        self.error = value;
        self
    }

    pub fn touched(mut self, value: bool) -> Self {
        self.touched = value;
        self
    }

    pub fn on_change(mut self, handler: impl Fn(FieldValue) + Send + Sync + 'static) -> Self {
        self.on_change = Arc::new(handler);
        self
    }

    pub fn on_blur(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_blur = Arc::new(handler);
        self
    }

    pub fn change(&self, value: FieldValue) {
        (self.on_change)(value)
    }

    pub fn blur(&self) {
        (self.on_blur)()
    }

    pub fn change_handler(&self) -> ChangeHandler {
        self.on_change.clone()
    }

    pub fn blur_handler(&self) -> BlurHandler {
        self.on_blur.clone()
    }
}

impl Debug for FieldState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldState")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("error", &self.error)
            .field("touched", &self.touched)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct FieldHandlers {
    pub on_change: ChangeHandler,
    pub on_blur: BlurHandler,
}

impl FieldHandlers {
    pub fn from_state(state: &FieldState) -> Self {
        Self {
            on_change: state.change_handler(),
            on_blur: state.blur_handler(),
        }
    }
}

/// Visual part of a rendered field, comparable in tests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldView {
    pub name: FieldKey,
    pub label: Option<Element>,
    pub control: Option<Element>,
    pub error: Option<String>,
}

pub struct RenderedField {
    pub view: FieldView,
    handlers: FieldHandlers,
}

impl RenderedField {
    pub fn change(&self, value: impl Into<FieldValue>) {
        (self.handlers.on_change)(value.into())
    }

    pub fn blur(&self) {
        (self.handlers.on_blur)()
    }

    pub fn handlers(&self) -> &FieldHandlers {
        &self.handlers
    }
}

impl Debug for RenderedField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedField")
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}

/// Renders one field. A kind without a registered strategy yields no control.
pub fn render_field(
    registry: &FieldKindRegistry,
    descriptor: &FieldDescriptor,
    state: &FieldState,
) -> RenderedField {
    let strategy = registry.strategy(descriptor.kind());

    let placement = strategy
        .map(|strategy| strategy.label_placement())
        .unwrap_or(LabelPlacement::Above);
    let label = match placement {
        LabelPlacement::Above => descriptor.label_text().map(|text| Element::Label {
            text: text.to_string(),
            target: descriptor.name(),
        }),
        LabelPlacement::Inline => None,
    };

    let (control, handlers) = match strategy {
        Some(strategy) => (
            strategy.render_control(descriptor, state),
            strategy.handlers(descriptor, state),
        ),
        None => (None, FieldHandlers::from_state(state)),
    };

    RenderedField {
        view: FieldView {
            name: descriptor.name(),
            label,
            control,
            error: state.error.clone(),
        },
        handlers,
    }
}
