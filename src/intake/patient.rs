use chrono::NaiveDateTime;

use super::actions::{ActionError, IntakeActions, PatientData, PatientRecord, UserRecord};
use super::{GENDER_OPTIONS, IDENTIFICATION_TYPES, Route, doctor_items, identification_items};
use crate::form::{
    DefaultValues, Element, FieldDescriptor, FieldState, FormController, FormResult, Outcome,
    Rule, StagedFile, ValidationSchema,
};
use crate::icon::IconAsset;

/// Defaults for the registration form. Gender and identification type start
/// on the first listed option.
#[derive(Clone, Debug, DefaultValues)]
pub struct PatientFormDefaults {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<NaiveDateTime>,
    pub gender: Option<String>,
    pub address: String,
    pub occupation: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    pub primary_physician: Option<String>,
    pub insurance_provider: String,
    pub insurance_policy_number: String,
    pub allergies: String,
    pub current_medication: String,
    pub family_medical_history: String,
    pub past_medical_history: String,
    pub identification_type: Option<String>,
    pub identification_number: String,
    pub identification_document: Vec<StagedFile>,
    pub treatment_consent: bool,
    pub disclosure_consent: bool,
    pub privacy_consent: bool,
}

impl Default for PatientFormDefaults {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            birth_date: None,
            gender: Some(GENDER_OPTIONS[0].to_string()),
            address: String::new(),
            occupation: String::new(),
            emergency_contact_name: String::new(),
            emergency_contact_number: String::new(),
            primary_physician: None,
            insurance_provider: String::new(),
            insurance_policy_number: String::new(),
            allergies: String::new(),
            current_medication: String::new(),
            family_medical_history: String::new(),
            past_medical_history: String::new(),
            identification_type: Some(IDENTIFICATION_TYPES[0].to_string()),
            identification_number: String::new(),
            identification_document: Vec::new(),
            treatment_consent: false,
            disclosure_consent: false,
            privacy_consent: false,
        }
    }
}

impl PatientFormDefaults {
    /// Prefills the contact details captured on the landing page.
    pub fn for_user(user: &UserRecord) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            ..Self::default()
        }
    }
}

fn gender_radio(state: &FieldState) -> Option<Element> {
    Some(Element::RadioGroup {
        name: state.name,
        options: GENDER_OPTIONS.iter().map(|option| option.to_string()).collect(),
        selected: state.value.as_choice().map(str::to_string),
    })
}

fn document_dropzone(state: &FieldState) -> Option<Element> {
    let files = state
        .value
        .as_files()
        .unwrap_or_default()
        .iter()
        .map(|file| file.name.clone())
        .collect::<Vec<_>>();
    if files.is_empty() {
        return Some(Element::Row(vec![
            Element::Icon(IconAsset::UPLOAD),
            Element::FileDropzone {
                name: state.name,
                files,
            },
        ]));
    }
    Some(Element::FileDropzone {
        name: state.name,
        files,
    })
}

pub fn patient_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("name")
            .label("Full name")
            .placeholder("John Doe")
            .icon(IconAsset::USER),
        FieldDescriptor::text("email")
            .label("Email address")
            .placeholder("johndoe@gmail.com")
            .icon(IconAsset::EMAIL),
        FieldDescriptor::phone("phone")
            .label("Phone number")
            .placeholder("(+234) 803 123 4567"),
        FieldDescriptor::date("birth_date").label("Date of birth"),
        FieldDescriptor::delegated("gender")
            .label("Gender")
            .render_with(gender_radio),
        FieldDescriptor::text("address")
            .label("Address")
            .placeholder("14 street, New york, NY - 5101"),
        FieldDescriptor::text("occupation")
            .label("Occupation")
            .placeholder("Software Engineer"),
        FieldDescriptor::text("emergency_contact_name")
            .label("Emergency contact name")
            .placeholder("Guardian's name"),
        FieldDescriptor::phone("emergency_contact_number")
            .label("Emergency contact number")
            .placeholder("(+234) 803 123 4567"),
        FieldDescriptor::select("primary_physician")
            .label("Primary care physician")
            .placeholder("Select a physician")
            .items(doctor_items()),
        FieldDescriptor::text("insurance_provider")
            .label("Insurance provider")
            .placeholder("BlueCross BlueShield"),
        FieldDescriptor::text("insurance_policy_number")
            .label("Insurance policy number")
            .placeholder("ABC123456789"),
        FieldDescriptor::multiline("allergies")
            .label("Allergies (if any)")
            .placeholder("Peanuts, Penicillin, Pollen"),
        FieldDescriptor::multiline("current_medication")
            .label("Current medications")
            .placeholder("Ibuprofen 200mg, Levothyroxine 50mcg"),
        FieldDescriptor::multiline("family_medical_history")
            .label("Family medical history (if relevant)")
            .placeholder("Mother had brain cancer, Father has hypertension"),
        FieldDescriptor::multiline("past_medical_history")
            .label("Past medical history")
            .placeholder("Appendectomy in 2015, Asthma diagnosis in childhood"),
        FieldDescriptor::select("identification_type")
            .label("Identification type")
            .placeholder("Select identification type")
            .items(identification_items()),
        FieldDescriptor::text("identification_number")
            .label("Identification number")
            .placeholder("123456789"),
        FieldDescriptor::delegated("identification_document")
            .label("Scanned copy of identification document")
            .render_with(document_dropzone),
        FieldDescriptor::checkbox("treatment_consent")
            .label("I consent to receive treatment for my health condition."),
        FieldDescriptor::checkbox("disclosure_consent").label(
            "I consent to the use and disclosure of my health information for treatment purposes.",
        ),
        FieldDescriptor::checkbox("privacy_consent")
            .label("I acknowledge that I have reviewed and agree to the privacy policy"),
    ]
}

pub fn patient_schema() -> ValidationSchema {
    ValidationSchema::new()
        .field(
            "name",
            [
                Rule::min_chars(2, "Name must be at least 2 characters."),
                Rule::max_chars(50, "Name must be at most 50 characters"),
            ],
        )
        .field("email", [Rule::email("Invalid email address.")])
        .field("phone", [Rule::phone("Invalid phone number")])
        .field("birth_date", [Rule::required("Date of birth is required")])
        .field(
            "gender",
            [Rule::one_of(GENDER_OPTIONS, "Select a gender")],
        )
        .field(
            "address",
            [
                Rule::min_chars(5, "Address must be at least 5 characters"),
                Rule::max_chars(500, "Address must be at most 500 characters"),
            ],
        )
        .field(
            "occupation",
            [
                Rule::min_chars(2, "Occupation must be at least 2 characters"),
                Rule::max_chars(500, "Occupation must be at most 500 characters"),
            ],
        )
        .field(
            "emergency_contact_name",
            [
                Rule::min_chars(2, "Contact name must be at least 2 characters"),
                Rule::max_chars(50, "Contact name must be at most 50 characters"),
            ],
        )
        .field(
            "emergency_contact_number",
            [Rule::phone("Invalid phone number")],
        )
        .field(
            "primary_physician",
            [Rule::min_chars(2, "Select at least one doctor")],
        )
        .field(
            "insurance_provider",
            [
                Rule::min_chars(2, "Insurance name must be at least 2 characters"),
                Rule::max_chars(50, "Insurance name must be at most 50 characters"),
            ],
        )
        .field(
            "insurance_policy_number",
            [
                Rule::min_chars(2, "Policy number must be at least 2 characters"),
                Rule::max_chars(50, "Policy number must be at most 50 characters"),
            ],
        )
        .optional_field(
            "identification_type",
            [Rule::one_of(IDENTIFICATION_TYPES, "Select a listed identification type")],
        )
        .field(
            "treatment_consent",
            [Rule::checked("You must consent to treatment in order to proceed")],
        )
        .field(
            "disclosure_consent",
            [Rule::checked("You must consent to disclosure in order to proceed")],
        )
        .field(
            "privacy_consent",
            [Rule::checked("You must consent to privacy in order to proceed")],
        )
}

pub fn open_patient_form(defaults: PatientFormDefaults) -> FormResult<FormController> {
    FormController::initialize(patient_fields(), patient_schema(), defaults.default_values())
}

/// Registers the patient for `user_id` and routes to the appointment screen.
/// The first staged identification file travels with the payload.
pub async fn submit_patient_form<A>(
    form: &FormController,
    actions: &A,
    user_id: &str,
) -> FormResult<Outcome<(PatientRecord, Route), ActionError>>
where
    A: IntakeActions + ?Sized,
{
    form.submit(|values| async move {
        let birth_date = values
            .date("birth_date")
            .ok_or_else(|| ActionError::InvalidPayload("missing `birth_date`".into()))?;
        let identification_document = values
            .files("identification_document")
            .and_then(|files| files.first())
            .cloned();
        let patient = actions
            .register_patient(PatientData {
                user_id: user_id.to_string(),
                birth_date,
                identification_document,
                values,
            })
            .await?;
        let route = Route::NewAppointment {
            user_id: user_id.to_string(),
        };
        Ok::<_, ActionError>((patient, route))
    })
    .await
}
