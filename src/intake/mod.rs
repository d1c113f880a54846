//! The patient-intake screens: the landing-page user form, the full patient
//! registration form and the appointment request form.
//!
//! Each screen is a descriptor list plus a validation schema and a defaults
//! struct, opened as a [`FormController`](crate::form::FormController) and
//! submitted through an [`IntakeActions`] collaborator. A successful submit
//! yields the [`Route`] the host should navigate to.

mod actions;
mod appointment;
mod patient;
mod user;

use std::fmt::{Display, Formatter};

use crate::form::{Element, FormValues, SelectItem};
use crate::icon::IconAsset;

pub use actions::{
    ActionError, AppointmentRecord, InMemoryIntakeStore, IntakeActions, NewAppointment, NewUser,
    PatientData, PatientRecord, UserRecord,
};
pub use appointment::{
    AppointmentFormDefaults, AppointmentMode, appointment_fields, appointment_schema, open_appointment_form,
    submit_appointment_form,
};
pub use patient::{
    PatientFormDefaults, open_patient_form, patient_fields, patient_schema, submit_patient_form,
};
pub use user::{UserFormDefaults, open_user_form, submit_user_form, user_fields, user_schema};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Doctor {
    pub name: &'static str,
    pub image: &'static str,
}

pub const DOCTORS: [Doctor; 9] = [
    Doctor {
        name: "John Green",
        image: "/assets/images/dr-green.png",
    },
    Doctor {
        name: "Leila Cameron",
        image: "/assets/images/dr-cameron.png",
    },
    Doctor {
        name: "David Livingston",
        image: "/assets/images/dr-livingston.png",
    },
    Doctor {
        name: "Evan Peter",
        image: "/assets/images/dr-peter.png",
    },
    Doctor {
        name: "Jane Powell",
        image: "/assets/images/dr-powell.png",
    },
    Doctor {
        name: "Alex Ramirez",
        image: "/assets/images/dr-remirez.png",
    },
    Doctor {
        name: "Jasmine Lee",
        image: "/assets/images/dr-lee.png",
    },
    Doctor {
        name: "Alyana Cruz",
        image: "/assets/images/dr-cruz.png",
    },
    Doctor {
        name: "Hardik Sharma",
        image: "/assets/images/dr-sharma.png",
    },
];

pub const GENDER_OPTIONS: [&str; 3] = ["Male", "Female", "Other"];

pub const IDENTIFICATION_TYPES: [&str; 11] = [
    "Birth Certificate",
    "Driver's License",
    "Medical Insurance Card/Policy",
    "Military ID Card",
    "National Identity Card",
    "Passport",
    "Resident Alien Card (Green Card)",
    "Social Security Card",
    "State ID Card",
    "Student ID Card",
    "Voter ID Card",
];

pub(crate) fn text(values: &FormValues, name: &str) -> String {
    values.text(name).unwrap_or_default().to_string()
}

/// Physician picker entries: avatar followed by the doctor's name.
pub(crate) fn doctor_items() -> Vec<SelectItem> {
    DOCTORS
        .iter()
        .map(|doctor| {
            SelectItem::with_content(
                doctor.name,
                vec![Element::Row(vec![
                    Element::Icon(IconAsset::new(doctor.image, "doctor")),
                    Element::Text(doctor.name.to_string()),
                ])],
            )
        })
        .collect()
}

pub(crate) fn identification_items() -> Vec<SelectItem> {
    IDENTIFICATION_TYPES
        .iter()
        .map(|kind| SelectItem::new(*kind))
        .collect()
}

/// Where the host navigates after a successful submit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Route {
    Register {
        user_id: String,
    },
    NewAppointment {
        user_id: String,
    },
    AppointmentSuccess {
        user_id: String,
        appointment_id: String,
    },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Register { user_id } => format!("/patients/{user_id}/register"),
            Route::NewAppointment { user_id } => format!("/patients/{user_id}/new-appointment"),
            Route::AppointmentSuccess {
                user_id,
                appointment_id,
            } => format!(
                "/patients/{user_id}/new-appointment/success?appointmentId={appointment_id}"
            ),
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}
