use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::descriptor::{FieldDescriptor, FieldKey};
use super::registry::FieldKindRegistry;
use super::validation::{FieldError, FieldErrors, ValidationSchema};
use super::value::{FieldValue, FormDefaults, FormValues};

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Submitting,
    Succeeded,
    Invalid,
    Failed,
}

/// When per-field validation runs outside of `submit`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ValidationMode {
    #[default]
    OnChange,
    OnBlur,
    OnSubmit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormOptions {
    pub validate_mode: ValidationMode,
    pub warn_on_unregistered_kind: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_mode: ValidationMode::OnChange,
            warn_on_unregistered_kind: cfg!(debug_assertions),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("field descriptor has an empty name")]
    EmptyFieldName,
    #[error("field `{0}` is declared more than once")]
    DuplicateField(FieldKey),
    #[error("default value given for undeclared field `{0}`")]
    UndeclaredDefault(FieldKey),
    #[error("validation rules given for undeclared field `{0}`")]
    UndeclaredSchemaField(FieldKey),
    #[error("default for `{field}` is a {found} value, expected {expected}")]
    DefaultTypeMismatch {
        field: FieldKey,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("invalid form configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("field `{field}` expects a {expected} value")]
    ValueTypeMismatch {
        field: FieldKey,
        expected: &'static str,
    },
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
}

pub type FormResult<T> = Result<T, FormError>;

/// Result of one submit attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome<R, E> {
    /// Validation failed; the action was not called.
    Invalid(FieldErrors),
    Submitted(R),
    Failed(E),
}

impl<R, E> Outcome<R, E> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Outcome::Submitted(_))
    }

    pub fn submitted(self) -> Option<R> {
        match self {
            Outcome::Submitted(result) => Some(result),
            _ => None,
        }
    }

    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> Outcome<T, E> {
        match self {
            Outcome::Invalid(errors) => Outcome::Invalid(errors),
            Outcome::Submitted(result) => Outcome::Submitted(f(result)),
            Outcome::Failed(error) => Outcome::Failed(error),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FormSnapshot {
    pub form_id: FormId,
    pub values: FormValues,
    pub errors: FieldErrors,
    pub touched: BTreeSet<FieldKey>,
    pub dirty: BTreeSet<FieldKey>,
    pub submit_state: SubmitState,
    pub submit_count: u32,
    pub is_submitting: bool,
}

impl FormSnapshot {
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub(super) struct FormState {
    pub(super) initial_values: FormValues,
    pub(super) values: FormValues,
    pub(super) errors: FieldErrors,
    pub(super) touched: BTreeSet<FieldKey>,
    pub(super) dirty: BTreeSet<FieldKey>,
    pub(super) submit_state: SubmitState,
    pub(super) submit_count: u32,
    pub(super) in_flight: u32,
}

/// Owns the values, errors and submit lifecycle of one form instance.
#[derive(Clone)]
pub struct FormController {
    pub(super) id: FormId,
    pub(super) options: FormOptions,
    pub(super) registry: FieldKindRegistry,
    pub(super) descriptors: Arc<[FieldDescriptor]>,
    pub(super) index: Arc<BTreeMap<FieldKey, usize>>,
    pub(super) schema: Arc<ValidationSchema>,
    pub(super) state: Arc<RwLock<FormState>>,
}

impl FormController {
    pub fn initialize(
        descriptors: impl IntoIterator<Item = FieldDescriptor>,
        schema: ValidationSchema,
        defaults: FormDefaults,
    ) -> FormResult<Self> {
        Self::initialize_with(
            descriptors,
            schema,
            defaults,
            FormOptions::default(),
            FieldKindRegistry::standard(),
        )
    }

    pub fn initialize_with(
        descriptors: impl IntoIterator<Item = FieldDescriptor>,
        schema: ValidationSchema,
        defaults: FormDefaults,
        options: FormOptions,
        registry: FieldKindRegistry,
    ) -> FormResult<Self> {
        let descriptors: Arc<[FieldDescriptor]> = descriptors.into_iter().collect();

        let mut index = BTreeMap::new();
        for (position, descriptor) in descriptors.iter().enumerate() {
            let key = descriptor.name();
            if key.as_str().is_empty() {
                return Err(ConfigurationError::EmptyFieldName.into());
            }
            if index.insert(key, position).is_some() {
                return Err(ConfigurationError::DuplicateField(key).into());
            }
        }
        if let Some(key) = defaults.keys().find(|key| !index.contains_key(key)) {
            return Err(ConfigurationError::UndeclaredDefault(key).into());
        }
        if let Some(key) = schema.fields().find(|key| !index.contains_key(key)) {
            return Err(ConfigurationError::UndeclaredSchemaField(key).into());
        }

        let mut values = FormValues::new();
        for descriptor in descriptors.iter() {
            let key = descriptor.name();
            let strategy = registry.strategy(descriptor.kind());
            let value = match (defaults.get(key.as_str()), strategy) {
                (Some(value), Some(strategy)) if !strategy.accepts(value) => {
                    return Err(ConfigurationError::DefaultTypeMismatch {
                        field: key,
                        expected: strategy.value_type(),
                        found: value.type_name(),
                    }
                    .into());
                }
                (Some(value), _) => value.clone(),
                (None, Some(strategy)) => strategy.default_value(),
                (None, None) => FieldValue::Empty,
            };
            values.insert(key, value);
        }

        let id = FormId::next();
        tracing::debug!(form = id.0, fields = descriptors.len(), "form initialized");

        Ok(Self {
            id,
            options,
            registry,
            descriptors,
            index: Arc::new(index),
            schema: Arc::new(schema),
            state: Arc::new(RwLock::new(FormState {
                initial_values: values.clone(),
                values,
                errors: FieldErrors::new(),
                touched: BTreeSet::new(),
                dirty: BTreeSet::new(),
                submit_state: SubmitState::Idle,
                submit_count: 0,
                in_flight: 0,
            })),
        })
    }

    pub fn form_id(&self) -> FormId {
        self.id
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    pub fn registry(&self) -> &FieldKindRegistry {
        &self.registry
    }

    pub fn schema(&self) -> &ValidationSchema {
        &self.schema
    }

    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index
            .get(name)
            .and_then(|position| self.descriptors.get(*position))
    }

    fn resolve(&self, name: &str) -> FormResult<&FieldDescriptor> {
        self.descriptor(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    /// Stores a new value for `name`. Unknown names and values of the wrong
    /// type fail without touching the form state.
    pub fn set_field_value(&self, name: &str, value: impl Into<FieldValue>) -> FormResult<()> {
        let descriptor = self.resolve(name)?;
        let key = descriptor.name();
        let value = value.into();
        if let Some(strategy) = self.registry.strategy(descriptor.kind()) {
            if !strategy.accepts(&value) {
                return Err(FormError::ValueTypeMismatch {
                    field: key,
                    expected: strategy.value_type(),
                });
            }
        }

        let mut state = write_lock(&self.state, "setting field value")?;
        if state.initial_values.get(name) == Some(&value) {
            state.dirty.remove(&key);
        } else {
            state.dirty.insert(key);
        }
        state.values.insert(key, value);
        if self.options.validate_mode == ValidationMode::OnChange {
            self.revalidate(&mut state, key);
        }
        Ok(())
    }

    pub fn blur(&self, name: &str) -> FormResult<()> {
        let key = self.resolve(name)?.name();
        let mut state = write_lock(&self.state, "marking field touched")?;
        state.touched.insert(key);
        if self.options.validate_mode == ValidationMode::OnBlur {
            self.revalidate(&mut state, key);
        }
        Ok(())
    }

    fn revalidate(&self, state: &mut FormState, key: FieldKey) {
        if self.schema.has_rules(key.as_str()) {
            let error = self.schema.validate_field(key.as_str(), &state.values);
            state.errors.set(key, error);
        }
    }

    /// Validates every field and, when all pass, hands the values to
    /// `action`. The lock is never held while `action` runs, so overlapping
    /// calls proceed independently. While any call is in flight the submit
    /// state reads `Submitting`; the last call to finish sets the final one.
    pub async fn submit<F, Fut, R, E>(&self, action: F) -> FormResult<Outcome<R, E>>
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: Display,
    {
        let values = {
            let mut state = write_lock(&self.state, "validating for submit")?;
            state.submit_count = state.submit_count.saturating_add(1);
            let errors = self.schema.validate_all(&state.values);
            state.errors = errors.clone();
            if !errors.is_empty() {
                if state.in_flight == 0 {
                    state.submit_state = SubmitState::Invalid;
                }
                tracing::debug!(form = self.id.0, errors = errors.len(), "submit rejected");
                return Ok(Outcome::Invalid(errors));
            }
            state.submit_state = SubmitState::Submitting;
            state.in_flight += 1;
            state.values.clone()
        };

        tracing::debug!(form = self.id.0, fields = values.len(), "submit started");
        let mut guard = InFlight {
            state: &self.state,
            armed: true,
        };
        let result = action(values).await;

        let mut state = write_lock(&self.state, "completing submit")?;
        guard.armed = false;
        state.in_flight = state.in_flight.saturating_sub(1);
        // Stays `Submitting` until the last overlapping submit settles.
        let settled = state.in_flight == 0;
        match result {
            Ok(result) => {
                if settled {
                    state.submit_state = SubmitState::Succeeded;
                }
                tracing::debug!(form = self.id.0, "submit succeeded");
                Ok(Outcome::Submitted(result))
            }
            Err(error) => {
                if settled {
                    state.submit_state = SubmitState::Failed;
                }
                tracing::warn!(form = self.id.0, %error, "submit action failed");
                Ok(Outcome::Failed(error))
            }
        }
    }

    pub fn is_submitting(&self) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading submit state")?.in_flight > 0)
    }

    pub fn submit_state(&self) -> FormResult<SubmitState> {
        Ok(read_lock(&self.state, "reading submit state")?.submit_state)
    }

    pub fn values(&self) -> FormResult<FormValues> {
        Ok(read_lock(&self.state, "reading values")?.values.clone())
    }

    pub fn value(&self, name: &str) -> FormResult<FieldValue> {
        let key = self.resolve(name)?.name();
        let state = read_lock(&self.state, "reading field value")?;
        Ok(state
            .values
            .get(key.as_str())
            .cloned()
            .unwrap_or(FieldValue::Empty))
    }

    pub fn errors(&self) -> FormResult<FieldErrors> {
        Ok(read_lock(&self.state, "reading errors")?.errors.clone())
    }

    pub fn field_error(&self, name: &str) -> FormResult<Option<FieldError>> {
        let key = self.resolve(name)?.name();
        Ok(read_lock(&self.state, "reading field error")?
            .errors
            .get(key.as_str())
            .cloned())
    }

    pub fn is_touched(&self, name: &str) -> FormResult<bool> {
        let key = self.resolve(name)?.name();
        Ok(read_lock(&self.state, "reading touched fields")?
            .touched
            .contains(&key))
    }

    pub fn is_dirty(&self) -> FormResult<bool> {
        Ok(!read_lock(&self.state, "reading dirty fields")?.dirty.is_empty())
    }

    /// Restores the initial values and clears errors, touched and dirty
    /// marks. Submissions already in flight keep running.
    pub fn reset(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "resetting form")?;
        state.values = state.initial_values.clone();
        state.errors.clear();
        state.touched.clear();
        state.dirty.clear();
        state.submit_state = SubmitState::Idle;
        Ok(())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot> {
        let state = read_lock(&self.state, "creating form snapshot")?;
        Ok(FormSnapshot {
            form_id: self.id,
            values: state.values.clone(),
            errors: state.errors.clone(),
            touched: state.touched.clone(),
            dirty: state.dirty.clone(),
            submit_state: state.submit_state,
            submit_count: state.submit_count,
            is_submitting: state.in_flight > 0,
        })
    }
}

// Releases the in-flight count when a submit future is dropped mid-await.
struct InFlight<'a> {
    state: &'a RwLock<FormState>,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.in_flight = state.in_flight.saturating_sub(1);
            if state.in_flight == 0 && state.submit_state == SubmitState::Submitting {
                state.submit_state = SubmitState::Idle;
            }
        }
    }
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
