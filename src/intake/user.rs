use super::Route;
use super::actions::{ActionError, IntakeActions, NewUser, UserRecord};
use crate::form::{
    DefaultValues, FieldDescriptor, FormController, FormResult, Outcome, Rule, ValidationSchema,
};
use crate::icon::IconAsset;

#[derive(Clone, Debug, Default, DefaultValues)]
pub struct UserFormDefaults {
    pub name: String,
    pub email: String,
    pub phone: String,
}

pub fn user_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("name")
            .label("Full name")
            .placeholder("John Doe")
            .icon(IconAsset::USER),
        FieldDescriptor::text("email")
            .label("Email")
            .placeholder("johndoe@gmail.com")
            .icon(IconAsset::EMAIL),
        FieldDescriptor::phone("phone")
            .label("Phone number")
            .placeholder("(+234) 803 123 4567"),
    ]
}

pub fn user_schema() -> ValidationSchema {
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
}

pub fn open_user_form(defaults: UserFormDefaults) -> FormResult<FormController> {
    FormController::initialize(user_fields(), user_schema(), defaults.default_values())
}

/// Creates (or finds) the user and routes to patient registration.
pub async fn submit_user_form<A>(
    form: &FormController,
    actions: &A,
) -> FormResult<Outcome<(UserRecord, Route), ActionError>>
where
    A: IntakeActions + ?Sized,
{
    form.submit(|values| async move {
        let user = actions
            .create_user(NewUser {
                name: super::text(&values, "name"),
                email: super::text(&values, "email"),
                phone: super::text(&values, "phone"),
            })
            .await?;
        let route = Route::Register {
            user_id: user.id.clone(),
        };
        Ok::<_, ActionError>((user, route))
    })
    .await
}
