pub use crate::form::{
    DefaultValues, Element, FieldDescriptor, FieldKey, FieldKind, FieldKindRegistry, FieldState,
    FieldStrategy, FieldValue, FormController, FormDefaults, FormError, FormOptions, FormResult,
    FormValues, Outcome, PhoneRegion, Rule, SelectItem, StagedFile, ValidationMode,
    ValidationSchema,
};
pub use crate::icon::IconAsset;
pub use crate::intake::{ActionError, InMemoryIntakeStore, IntakeActions, Route};
