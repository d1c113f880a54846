//! Schema-driven form fields for the patient-intake screens.
//!
//! [`form`] holds the engine: field descriptors, the field kind registry, the
//! headless field renderer, validation schemas and the form controller.
//! [`intake`] builds the application's three screens on top of it.

pub mod form;
pub mod icon;
pub mod intake;
pub mod prelude;

pub use form::{FormController, FormError, FormResult, Outcome};
