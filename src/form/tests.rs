use super::*;
use futures::FutureExt;
use futures::channel::oneshot;
use futures::executor::block_on;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{0}")]
struct TestError(&'static str);

#[derive(Clone, DefaultValues)]
struct SignupDefaults {
    name: String,
    email: String,
    phone: String,
    terms: bool,
}

fn signup_defaults() -> SignupDefaults {
    SignupDefaults {
        name: "Ada Obi".into(),
        email: "ada@example.com".into(),
        phone: "+2348031234567".into(),
        terms: true,
    }
}

fn signup_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("name").label("Full name"),
        FieldDescriptor::text("email").label("Email"),
        FieldDescriptor::phone("phone").label("Phone number"),
        FieldDescriptor::multiline("bio").label("About you"),
        FieldDescriptor::checkbox("terms").label("I accept the terms"),
    ]
}

fn signup_schema() -> ValidationSchema {
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
        .field("terms", [Rule::checked("You must accept the terms")])
}

fn controller_with(options: FormOptions) -> FormController {
    FormController::initialize_with(
        signup_fields(),
        signup_schema(),
        signup_defaults().default_values(),
        options,
        FieldKindRegistry::standard(),
    )
    .expect("signup form must initialize")
}

fn controller() -> FormController {
    controller_with(FormOptions::default())
}

#[test]
fn derived_defaults_list_every_field() {
    assert_eq!(
        SignupDefaults::field_names(),
        &["name", "email", "phone", "terms"]
    );
    let defaults = signup_defaults().default_values();
    assert_eq!(defaults.get("terms"), Some(&FieldValue::Bool(true)));
    assert_eq!(defaults.len(), 4);
}

#[test]
fn initialize_fills_missing_defaults_per_kind() {
    let controller = FormController::initialize(
        signup_fields()
            .into_iter()
            .chain([FieldDescriptor::date("birth_date"), FieldDescriptor::select("doctor")]),
        ValidationSchema::new(),
        FormDefaults::new().with("name", "Ada"),
    )
    .expect("initialize");

    let values = controller.values().expect("values");
    assert_eq!(values.len(), 7);
    assert_eq!(values.text("name"), Some("Ada"));
    assert_eq!(values.text("bio"), Some(""));
    assert_eq!(values.bool("terms"), Some(false));
    assert_eq!(values.get("birth_date"), Some(&FieldValue::Date(None)));
    assert_eq!(values.get("doctor"), Some(&FieldValue::Choice(None)));
}

#[test]
fn duplicate_names_are_a_configuration_error() {
    let result = FormController::initialize(
        [FieldDescriptor::text("email"), FieldDescriptor::phone("email")],
        ValidationSchema::new(),
        FormDefaults::new(),
    );
    assert!(matches!(
        result,
        Err(FormError::Configuration(ConfigurationError::DuplicateField(key))) if key.as_str() == "email"
    ));
}

#[test]
fn inconsistent_configuration_is_rejected() {
    let empty_name = FormController::initialize(
        [FieldDescriptor::text("")],
        ValidationSchema::new(),
        FormDefaults::new(),
    );
    assert!(matches!(
        empty_name,
        Err(FormError::Configuration(ConfigurationError::EmptyFieldName))
    ));

    let stray_default = FormController::initialize(
        signup_fields(),
        ValidationSchema::new(),
        FormDefaults::new().with("nickname", "Ada"),
    );
    assert!(matches!(
        stray_default,
        Err(FormError::Configuration(ConfigurationError::UndeclaredDefault(_)))
    ));

    let stray_rule = FormController::initialize(
        signup_fields(),
        ValidationSchema::new().field("nickname", [Rule::required("required")]),
        FormDefaults::new(),
    );
    assert!(matches!(
        stray_rule,
        Err(FormError::Configuration(ConfigurationError::UndeclaredSchemaField(_)))
    ));

    let wrong_type = FormController::initialize(
        signup_fields(),
        ValidationSchema::new(),
        FormDefaults::new().with("terms", "yes"),
    );
    assert!(matches!(
        wrong_type,
        Err(FormError::Configuration(ConfigurationError::DefaultTypeMismatch {
            expected: "boolean",
            ..
        }))
    ));
}

#[test]
fn unknown_field_leaves_state_untouched() {
    let controller = controller();
    controller
        .set_field_value("name", "A")
        .expect("known field");
    let before = controller.snapshot().expect("snapshot");

    let result = controller.set_field_value("nickname", "Ada");
    assert_eq!(result, Err(FormError::UnknownField("nickname".into())));
    assert_eq!(controller.blur("nickname"), Err(FormError::UnknownField("nickname".into())));

    let after = controller.snapshot().expect("snapshot");
    assert_eq!(after.values, before.values);
    assert_eq!(after.errors, before.errors);
    assert_eq!(after.touched, before.touched);
}

#[test]
fn mismatched_value_type_is_rejected() {
    let controller = controller();
    let result = controller.set_field_value("terms", "yes");
    assert!(matches!(
        result,
        Err(FormError::ValueTypeMismatch { expected: "boolean", .. })
    ));
    assert_eq!(
        controller.value("terms").expect("value"),
        FieldValue::Bool(true)
    );
    assert!(!controller.is_dirty().expect("dirty"));
}

#[test]
fn change_revalidates_only_the_changed_field() {
    let controller = FormController::initialize(
        signup_fields(),
        signup_schema(),
        FormDefaults::new(),
    )
    .expect("initialize");

    controller.set_field_value("name", "A").expect("set name");
    let errors = controller.errors().expect("errors");
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors.get("name").map(FieldError::message),
        Some("Name must be at least 2 characters.")
    );

    controller.set_field_value("name", "Ada").expect("fix name");
    assert!(controller.errors().expect("errors").is_empty());
}

#[test]
fn validation_mode_controls_when_errors_appear() {
    let on_blur = controller_with(FormOptions {
        validate_mode: ValidationMode::OnBlur,
        ..FormOptions::default()
    });
    on_blur.set_field_value("email", "nope").expect("set email");
    assert_eq!(on_blur.field_error("email").expect("error"), None);
    on_blur.blur("email").expect("blur");
    assert!(on_blur.is_touched("email").expect("touched"));
    assert_eq!(
        on_blur.field_error("email").expect("error"),
        Some(FieldError::new("Invalid email address."))
    );

    let on_submit = controller_with(FormOptions {
        validate_mode: ValidationMode::OnSubmit,
        ..FormOptions::default()
    });
    on_submit.set_field_value("email", "nope").expect("set email");
    on_submit.blur("email").expect("blur");
    assert!(on_submit.errors().expect("errors").is_empty());
}

#[test]
fn valid_submit_calls_action_once() {
    let controller = controller();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();

    let outcome = block_on(controller.submit(move |values| async move {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok::<_, TestError>(values.text("email").map(str::to_string))
    }))
    .expect("submit");

    assert_eq!(outcome, Outcome::Submitted(Some("ada@example.com".to_string())));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!controller.is_submitting().expect("submitting"));
    assert_eq!(controller.submit_state().expect("state"), SubmitState::Succeeded);
}

#[test]
fn invalid_submit_reports_failing_fields_only() {
    let controller = controller();
    controller.set_field_value("phone", "08031234567").expect("set phone");
    controller.set_field_value("bio", "").expect("set bio");
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();

    let outcome = block_on(controller.submit(move |_| async move {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok::<_, TestError>(())
    }))
    .expect("submit");

    let Outcome::Invalid(errors) = outcome else {
        panic!("expected invalid outcome, got {outcome:?}");
    };
    assert_eq!(errors.keys().collect::<Vec<_>>(), vec![FieldKey::new("phone")]);
    assert_eq!(
        errors.get("phone").map(FieldError::message),
        Some("Invalid phone number")
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!controller.is_submitting().expect("submitting"));
    assert_eq!(controller.submit_state().expect("state"), SubmitState::Invalid);
}

#[test]
fn submit_validates_untouched_fields() {
    let controller = FormController::initialize(
        signup_fields(),
        signup_schema(),
        FormDefaults::new(),
    )
    .expect("initialize");

    let outcome = block_on(controller.submit(|_| async { Ok::<_, TestError>(()) }))
        .expect("submit");
    let Outcome::Invalid(errors) = outcome else {
        panic!("expected invalid outcome");
    };
    let invalid = errors.keys().map(FieldKey::as_str).collect::<Vec<_>>();
    assert_eq!(invalid, vec!["email", "name", "phone", "terms"]);
    assert_eq!(controller.errors().expect("errors"), errors);
}

#[test]
fn failed_action_keeps_values_for_resubmission() {
    let controller = controller();
    controller.set_field_value("bio", "Night shift nurse").expect("set bio");

    let outcome = block_on(
        controller.submit(|_| async { Err::<(), _>(TestError("backend unavailable")) }),
    )
    .expect("submit");

    assert_eq!(outcome, Outcome::Failed(TestError("backend unavailable")));
    assert!(!controller.is_submitting().expect("submitting"));
    assert_eq!(controller.submit_state().expect("state"), SubmitState::Failed);
    let values = controller.values().expect("values");
    assert_eq!(values.text("bio"), Some("Night shift nurse"));
    assert_eq!(values.text("name"), Some("Ada Obi"));
}

#[test]
fn repeated_submits_are_not_deduplicated() {
    let controller = controller();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let seen = calls.clone();
        let outcome = block_on(controller.submit(move |_| async move {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok::<_, TestError>(())
        }))
        .expect("submit");
        assert!(outcome.is_submitted());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(controller.snapshot().expect("snapshot").submit_count, 2);
}

#[test]
fn is_submitting_spans_overlapping_submits() {
    let controller = controller();
    let (release, gate) = oneshot::channel::<()>();

    let first = controller.submit(move |values| async move {
        let _ = gate.await;
        Ok::<_, TestError>(values.len())
    });
    let observer = async {
        assert!(controller.is_submitting().expect("submitting"));
        let second = controller
            .submit(|_| async { Ok::<_, TestError>(0) })
            .await
            .expect("second submit");
        assert!(controller.is_submitting().expect("first still running"));
        let snapshot = controller.snapshot().expect("snapshot");
        assert_eq!(snapshot.submit_state, SubmitState::Submitting);
        assert!(snapshot.is_submitting);
        let _ = release.send(());
        second
    };

    let (first, second) = block_on(futures::future::join(first, observer));
    assert_eq!(first.expect("first submit"), Outcome::Submitted(5));
    assert_eq!(second, Outcome::Submitted(0));
    assert!(!controller.is_submitting().expect("submitting"));
    assert_eq!(controller.submit_state().expect("state"), SubmitState::Succeeded);
}

#[test]
fn invalid_submit_during_flight_keeps_submitting_state() {
    let controller = controller();
    let (release, gate) = oneshot::channel::<()>();

    let first = controller.submit(move |_| async move {
        let _ = gate.await;
        Err::<(), _>(TestError("backend unavailable"))
    });
    let observer = async {
        controller.set_field_value("email", "broken").expect("set email");
        let second = controller
            .submit(|_| async { Ok::<_, TestError>(()) })
            .await
            .expect("second submit");
        assert!(matches!(second, Outcome::Invalid(_)));
        assert_eq!(controller.submit_state().expect("state"), SubmitState::Submitting);
        let _ = release.send(());
    };

    let (first, ()) = block_on(futures::future::join(first, observer));
    assert!(matches!(first.expect("first submit"), Outcome::Failed(_)));
    assert_eq!(controller.submit_state().expect("state"), SubmitState::Failed);
}

#[test]
fn submit_button_shows_loading_while_in_flight() {
    let controller = controller();
    assert_eq!(
        controller.render_submit("Get Started").expect("idle button"),
        Element::SubmitButton {
            label: "Get Started".into(),
            icon: None,
            loading: false,
            disabled: false,
        }
    );

    let (release, gate) = oneshot::channel::<()>();
    let pending = controller.submit(move |_| async move {
        let _ = gate.await;
        Ok::<_, TestError>(())
    });
    let observer = async {
        let button = controller.render_submit("Get Started").expect("busy button");
        let _ = release.send(());
        button
    };

    let (outcome, busy) = block_on(futures::future::join(pending, observer));
    assert!(outcome.expect("submit").is_submitted());
    assert_eq!(
        busy,
        Element::SubmitButton {
            label: LOADING_LABEL.into(),
            icon: Some(crate::icon::IconAsset::LOADING),
            loading: true,
            disabled: true,
        }
    );
    assert!(matches!(
        controller.render_submit("Get Started").expect("settled button"),
        Element::SubmitButton { ref label, loading: false, disabled: false, .. } if label == "Get Started"
    ));
}

#[test]
fn dropped_submit_releases_in_flight_count() {
    let controller = controller();
    let pending = controller
        .submit(|_| async {
            futures::future::pending::<()>().await;
            Ok::<_, TestError>(())
        })
        .now_or_never();

    assert!(pending.is_none());
    assert!(!controller.is_submitting().expect("submitting"));
    assert_eq!(controller.submit_state().expect("state"), SubmitState::Idle);
}

#[test]
fn dirty_tracking_and_reset() {
    let controller = controller();
    controller.set_field_value("name", "Bola").expect("set name");
    controller.blur("name").expect("blur");
    let snapshot = controller.snapshot().expect("snapshot");
    assert!(snapshot.is_dirty());
    assert!(snapshot.touched.contains(&FieldKey::new("name")));

    controller.set_field_value("name", "Ada Obi").expect("restore name");
    assert!(!controller.is_dirty().expect("dirty"));

    controller.set_field_value("email", "broken").expect("set email");
    assert!(!controller.snapshot().expect("snapshot").is_valid());
    controller.reset().expect("reset");

    let snapshot = controller.snapshot().expect("snapshot");
    assert!(snapshot.is_valid());
    assert!(!snapshot.is_dirty());
    assert!(snapshot.touched.is_empty());
    assert_eq!(snapshot.values.text("email"), Some("ada@example.com"));
    assert_eq!(snapshot.submit_state, SubmitState::Idle);
}

#[test]
fn bound_handlers_write_back_into_the_form() {
    let controller = controller();
    let rendered = controller.render_field("phone").expect("render phone");

    rendered.change("0803 765 4321");
    rendered.blur();

    assert_eq!(
        controller.value("phone").expect("phone"),
        FieldValue::Text("+2348037654321".into())
    );
    assert!(controller.is_touched("phone").expect("touched"));

    let rerendered = controller.render_field("phone").expect("render phone");
    assert!(matches!(
        rerendered.view.control,
        Some(Element::PhoneInput { ref display, .. }) if display == "+234 803 765 4321"
    ));
}

#[test]
fn bound_handler_failures_do_not_change_state() {
    let controller = controller();
    let rendered = controller.render_field("name").expect("render name");
    rendered.change(true);
    assert_eq!(
        controller.value("name").expect("name"),
        FieldValue::Text("Ada Obi".into())
    );
}

#[test]
fn rendered_errors_follow_controller_state() {
    let controller = controller();
    controller.set_field_value("email", "broken").expect("set email");
    let rendered = controller.render_field("email").expect("render email");
    assert_eq!(rendered.view.error.as_deref(), Some("Invalid email address."));
    assert_eq!(
        rendered.view.label,
        Some(Element::Label {
            text: "Email".into(),
            target: FieldKey::new("email"),
        })
    );
}

#[test]
fn checkbox_labels_never_render_above() {
    let controller = controller();
    let rendered = controller.render().expect("render");
    let terms = rendered
        .iter()
        .find(|field| field.view.name.as_str() == "terms")
        .expect("terms rendered");
    assert_eq!(terms.view.label, None);
    assert!(matches!(
        terms.view.control,
        Some(Element::Checkbox { ref label, checked: true, .. })
            if label.as_deref() == Some("I accept the terms")
    ));
}

#[test]
fn unregistered_kind_renders_nothing_but_keeps_label() {
    let controller = FormController::initialize_with(
        signup_fields(),
        ValidationSchema::new(),
        FormDefaults::new(),
        FormOptions {
            warn_on_unregistered_kind: true,
            ..FormOptions::default()
        },
        FieldKindRegistry::standard().unregister(FieldKind::MultilineText),
    )
    .expect("initialize");

    assert_eq!(controller.value("bio").expect("bio"), FieldValue::Empty);
    controller
        .set_field_value("bio", true)
        .expect("unregistered kinds accept any value");

    let rendered = controller.render_field("bio").expect("render bio");
    assert_eq!(rendered.view.control, None);
    assert!(rendered.view.label.is_some());
    assert_eq!(controller.render().expect("render all").len(), 5);
}

#[test]
fn unknown_field_cannot_be_rendered() {
    let controller = controller();
    assert!(matches!(
        controller.render_field("nickname"),
        Err(FormError::UnknownField(name)) if name == "nickname"
    ));
    assert!(matches!(
        controller.field_state("nickname"),
        Err(FormError::UnknownField(_))
    ));
}

#[test]
fn controllers_do_not_share_state() {
    let first = controller();
    let second = controller();
    assert_ne!(first.form_id(), second.form_id());

    first.set_field_value("name", "Chidi").expect("set name");
    assert_eq!(
        second.value("name").expect("name"),
        FieldValue::Text("Ada Obi".into())
    );
}
