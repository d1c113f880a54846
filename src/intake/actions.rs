use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::form::{FormValues, StagedFile};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Registration payload: the form values plus the owning user, the parsed
/// birth date and the staged identification document.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientData {
    pub user_id: String,
    pub birth_date: NaiveDateTime,
    pub identification_document: Option<StagedFile>,
    pub values: FormValues,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDateTime,
    pub primary_physician: Option<String>,
    pub identification_document: Option<StagedFile>,
    pub document: serde_json::Value,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub user_id: String,
    pub patient_id: String,
    pub primary_physician: String,
    pub schedule: NaiveDateTime,
    pub reason: String,
    pub note: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    pub id: String,
    pub user_id: String,
    pub patient_id: String,
    pub primary_physician: String,
    pub schedule: NaiveDateTime,
    pub reason: String,
    pub note: Option<String>,
}

/// Create/read calls the intake screens make against the record store.
#[async_trait]
pub trait IntakeActions: Send + Sync {
    /// Creates a user, or returns the existing one registered with the same email.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, ActionError>;

    async fn get_user(&self, user_id: &str) -> Result<UserRecord, ActionError>;

    async fn register_patient(&self, patient: PatientData) -> Result<PatientRecord, ActionError>;

    /// Looks up the patient profile owned by `user_id`.
    async fn get_patient(&self, user_id: &str) -> Result<PatientRecord, ActionError>;

    async fn create_appointment(
        &self,
        appointment: NewAppointment,
    ) -> Result<AppointmentRecord, ActionError>;

    async fn get_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<AppointmentRecord, ActionError>;
}

#[derive(Default)]
struct StoreState {
    users: BTreeMap<String, UserRecord>,
    patients: BTreeMap<String, PatientRecord>,
    appointments: BTreeMap<String, AppointmentRecord>,
}

/// Process-local record store with generated ids.
#[derive(Clone, Default)]
pub struct InMemoryIntakeStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryIntakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.read().users.len()
    }

    pub fn patient_count(&self) -> usize {
        self.read().patients.len()
    }

    pub fn appointment_count(&self) -> usize {
        self.read().appointments.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn next_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn required_text(values: &FormValues, name: &str) -> Result<String, ActionError> {
    values
        .text(name)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| ActionError::InvalidPayload(format!("missing `{name}`")))
}

#[async_trait]
impl IntakeActions for InMemoryIntakeStore {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, ActionError> {
        let mut state = self.write();
        if let Some(existing) = state
            .users
            .values()
            .find(|record| record.email.eq_ignore_ascii_case(&user.email))
        {
            tracing::debug!(user = %existing.id, "user already registered");
            return Ok(existing.clone());
        }

        let record = UserRecord {
            id: next_id(),
            name: user.name,
            email: user.email,
            phone: user.phone,
        };
        tracing::debug!(user = %record.id, "user created");
        state.users.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get_user(&self, user_id: &str) -> Result<UserRecord, ActionError> {
        self.read()
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| ActionError::NotFound {
                kind: "user",
                id: user_id.to_string(),
            })
    }

    async fn register_patient(&self, patient: PatientData) -> Result<PatientRecord, ActionError> {
        let mut state = self.write();
        if !state.users.contains_key(&patient.user_id) {
            return Err(ActionError::NotFound {
                kind: "user",
                id: patient.user_id,
            });
        }

        let record = PatientRecord {
            id: next_id(),
            name: required_text(&patient.values, "name")?,
            email: required_text(&patient.values, "email")?,
            phone: required_text(&patient.values, "phone")?,
            primary_physician: patient
                .values
                .choice("primary_physician")
                .map(str::to_string),
            document: patient.values.to_json(),
            user_id: patient.user_id,
            birth_date: patient.birth_date,
            identification_document: patient.identification_document,
        };
        tracing::debug!(patient = %record.id, user = %record.user_id, "patient registered");
        state.patients.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get_patient(&self, user_id: &str) -> Result<PatientRecord, ActionError> {
        self.read()
            .patients
            .values()
            .find(|record| record.user_id == user_id)
            .cloned()
            .ok_or_else(|| ActionError::NotFound {
                kind: "patient",
                id: user_id.to_string(),
            })
    }

    async fn create_appointment(
        &self,
        appointment: NewAppointment,
    ) -> Result<AppointmentRecord, ActionError> {
        let mut state = self.write();
        let owner = state
            .patients
            .get(&appointment.patient_id)
            .map(|patient| patient.user_id.as_str());
        match owner {
            None => {
                return Err(ActionError::NotFound {
                    kind: "patient",
                    id: appointment.patient_id,
                });
            }
            Some(owner) if owner != appointment.user_id => {
                return Err(ActionError::InvalidPayload(format!(
                    "patient `{}` does not belong to user `{}`",
                    appointment.patient_id, appointment.user_id
                )));
            }
            Some(_) => {}
        }

        let record = AppointmentRecord {
            id: next_id(),
            user_id: appointment.user_id,
            patient_id: appointment.patient_id,
            primary_physician: appointment.primary_physician,
            schedule: appointment.schedule,
            reason: appointment.reason,
            note: appointment.note,
        };
        tracing::debug!(appointment = %record.id, patient = %record.patient_id, "appointment created");
        state.appointments.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<AppointmentRecord, ActionError> {
        self.read()
            .appointments
            .get(appointment_id)
            .cloned()
            .ok_or_else(|| ActionError::NotFound {
                kind: "appointment",
                id: appointment_id.to_string(),
            })
    }
}
