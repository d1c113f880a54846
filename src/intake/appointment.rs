use chrono::NaiveDateTime;

use super::actions::{ActionError, AppointmentRecord, IntakeActions, NewAppointment};
use super::{Route, doctor_items};
use crate::form::{
    DefaultValues, FieldDescriptor, FormController, FormResult, Outcome, Rule, ValidationSchema,
};

#[derive(Clone, Debug, Default, DefaultValues)]
pub struct AppointmentFormDefaults {
    pub primary_physician: Option<String>,
    pub schedule: Option<NaiveDateTime>,
    pub reason: String,
    pub note: String,
}

/// Whether the screen books a new appointment or cancels an existing one.
/// Cancelling does not pick a physician.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AppointmentMode {
    #[default]
    Create,
    Cancel,
}

impl AppointmentMode {
    pub fn submit_label(self) -> &'static str {
        match self {
            AppointmentMode::Create => "Submit Appointment",
            AppointmentMode::Cancel => "Cancel Appointment",
        }
    }
}

pub fn appointment_fields(mode: AppointmentMode) -> Vec<FieldDescriptor> {
    let mut fields = Vec::with_capacity(4);
    if mode != AppointmentMode::Cancel {
        fields.push(
            FieldDescriptor::select("primary_physician")
                .label("Doctor")
                .placeholder("Select a doctor")
                .items(doctor_items()),
        );
    }
    fields.extend([
        FieldDescriptor::date("schedule")
            .label("Expected appointment date")
            .show_time(true),
        FieldDescriptor::multiline("reason")
            .label("Appointment reason")
            .placeholder("Annual monthly check-up"),
        FieldDescriptor::multiline("note")
            .label("Comments/notes")
            .placeholder("Prefer afternoon appointments, if possible"),
    ]);
    fields
}

pub fn appointment_schema(mode: AppointmentMode) -> ValidationSchema {
    let schema = ValidationSchema::new()
        .field("schedule", [Rule::required("Select an appointment date")])
        .field(
            "reason",
            [
                Rule::min_chars(2, "Reason must be at least 2 characters"),
                Rule::max_chars(500, "Reason must be at most 500 characters"),
            ],
        );
    match mode {
        AppointmentMode::Create => schema.field(
            "primary_physician",
            [Rule::min_chars(2, "Select at least one doctor")],
        ),
        AppointmentMode::Cancel => schema,
    }
}

pub fn open_appointment_form(
    defaults: AppointmentFormDefaults,
    mode: AppointmentMode,
) -> FormResult<FormController> {
    let mut defaults = defaults.default_values();
    if mode == AppointmentMode::Cancel {
        defaults = defaults.without("primary_physician");
    }
    FormController::initialize(
        appointment_fields(mode),
        appointment_schema(mode),
        defaults,
    )
}

/// Requests an appointment for the patient and routes to the success page.
/// Forms opened in cancel mode carry no physician and fail as an invalid
/// payload.
pub async fn submit_appointment_form<A>(
    form: &FormController,
    actions: &A,
    user_id: &str,
    patient_id: &str,
) -> FormResult<Outcome<(AppointmentRecord, Route), ActionError>>
where
    A: IntakeActions + ?Sized,
{
    form.submit(|values| async move {
        let schedule = values
            .date("schedule")
            .ok_or_else(|| ActionError::InvalidPayload("missing `schedule`".into()))?;
        let primary_physician = values
            .choice("primary_physician")
            .map(str::to_string)
            .ok_or_else(|| ActionError::InvalidPayload("missing `primary_physician`".into()))?;
        let note = super::text(&values, "note");
        let appointment = actions
            .create_appointment(NewAppointment {
                user_id: user_id.to_string(),
                patient_id: patient_id.to_string(),
                primary_physician,
                schedule,
                reason: super::text(&values, "reason"),
                note: (!note.trim().is_empty()).then_some(note),
            })
            .await?;
        let route = Route::AppointmentSuccess {
            user_id: appointment.user_id.clone(),
            appointment_id: appointment.id.clone(),
        };
        Ok::<_, ActionError>((appointment, route))
    })
    .await
}
