mod binding;
mod controller;
mod descriptor;
mod kinds;
pub mod phone;
mod registry;
mod render;
mod validation;
mod value;

#[cfg(test)]
mod tests;

pub use controller::{
    ConfigurationError, FormController, FormError, FormId, FormOptions, FormResult, FormSnapshot,
    Outcome, SubmitState, ValidationMode,
};
pub use descriptor::{
    DEFAULT_DATE_FORMAT, DEFAULT_DATE_TIME_FORMAT, DateOptions, FieldDescriptor, FieldKey,
    FieldKind, FieldOptions, RenderCallback, SelectItem,
};
pub use intakeui_form_derive::DefaultValues;
pub use kinds::{
    CheckboxStrategy, DateStrategy, DelegatedRenderStrategy, MultilineTextStrategy,
    PhoneNumberStrategy, SelectStrategy, TextStrategy,
};
pub use phone::PhoneRegion;
pub use registry::{FieldKindRegistry, FieldStrategy, LabelPlacement};
pub use render::{
    BlurHandler, ChangeHandler, Element, FieldHandlers, FieldState, FieldView, LOADING_LABEL,
    RenderedField, render_field, render_submit_button,
};
pub use validation::{FieldError, FieldErrors, FormPredicate, Rule, ValidationSchema, ValuePredicate};
pub use value::{DefaultValues, FieldValue, FormDefaults, FormValues, StagedFile};
