//! Tests for step payload validation and step kind metadata.
use kaiwa::error::StepViolation;
use kaiwa::step::*;

fn violations(step: &Step) -> Vec<StepViolation> {
    step.validate().err().unwrap_or_default()
}

#[test]
fn test_quick_reply_rejects_fourth_button() {
    assert!(Step::quick_reply("Pick", &["a", "b", "c"]).validate().is_ok());

    let step = Step::quick_reply("Pick", &["a", "b", "c", "d"]);
    let found = violations(&step);
    assert!(found.iter().any(|v| matches!(
        v,
        StepViolation::TooMany { count: 4, max: 3, .. }
    )));
}

#[test]
fn test_list_menu_rejects_eleventh_option() {
    let ten: Vec<String> = (0..10).map(|i| format!("Option {}", i)).collect();
    let ten: Vec<&str> = ten.iter().map(String::as_str).collect();
    assert!(Step::list_menu("Pick", "Open", &ten).validate().is_ok());

    let mut eleven = ten.clone();
    eleven.push("One too many");
    let found = violations(&Step::list_menu("Pick", "Open", &eleven));
    assert!(found.iter().any(|v| matches!(
        v,
        StepViolation::TooMany { count: 11, max: 10, .. }
    )));
}

#[test]
fn test_choice_label_limits() {
    let long_label = "x".repeat(MAX_BUTTON_LABEL_CHARS + 1);
    let found = violations(&Step::quick_reply("Pick", &[long_label.as_str()]));
    assert!(matches!(
        found.as_slice(),
        [StepViolation::TooLong { max: 20, .. }]
    ));

    let found = violations(&Step::quick_reply("Pick", &["  "]));
    assert!(matches!(found.as_slice(), [StepViolation::MissingField { .. }]));

    let long_title = "t".repeat(MAX_OPTION_TITLE_CHARS + 1);
    let found = violations(&Step::list_menu("Pick", "Open", &[long_title.as_str()]));
    assert!(matches!(
        found.as_slice(),
        [StepViolation::TooLong { max: 24, .. }]
    ));

    let mut step = Step::list_menu("Pick", "Open", &["Only"]);
    if let StepPayload::ListMenu(list) = &mut step.payload {
        list.options[0].description = Some("d".repeat(MAX_OPTION_DESCRIPTION_CHARS + 1));
    }
    assert!(matches!(
        violations(&step).as_slice(),
        [StepViolation::TooLong { max: 72, .. }]
    ));
}

#[test]
fn test_text_requires_content() {
    assert!(Step::text("Hi").validate().is_ok());
    let found = violations(&Step::text("   "));
    assert_eq!(
        found,
        vec![StepViolation::MissingField {
            field: "content".to_string()
        }]
    );
}

#[test]
fn test_payload_must_match_kind() {
    let step = Step::new(StepKind::Image, None, StepPayload::None);
    assert_eq!(
        violations(&step),
        vec![StepViolation::PayloadMismatch {
            kind: StepKind::Image,
            found: "none",
        }]
    );

    let step = Step::new(
        StepKind::Text,
        Some("Hi".to_string()),
        StepPayload::Media(MediaPayload {
            media_id: "m1".to_string(),
        }),
    );
    assert!(matches!(
        violations(&step).as_slice(),
        [StepViolation::PayloadMismatch { found: "media", .. }]
    ));
}

#[test]
fn test_media_requires_media_id() {
    assert!(Step::media(StepKind::Video, "vid-1", Some("Watch")).validate().is_ok());
    let found = violations(&Step::media(StepKind::Image, "", None));
    assert!(matches!(found.as_slice(), [StepViolation::MissingField { field }] if field == "media_id"));
}

#[test]
fn test_input_validation_rules() {
    assert!(Step::input(StepKind::TextInput, "Name?", "full_name").validate().is_ok());
    // An empty variable name is allowed; the answer is simply not stored.
    assert!(Step::input(StepKind::TextInput, "Name?", "").validate().is_ok());

    let found = violations(&Step::input(StepKind::TextInput, "Name?", "1st name"));
    assert!(matches!(found.as_slice(), [StepViolation::InvalidVariableName { .. }]));

    let mut number = Step::input(StepKind::NumberInput, "Age?", "age");
    if let StepPayload::Input(input) = &mut number.payload {
        input.validation.min = Some(18.0);
        input.validation.max = Some(10.0);
    }
    assert!(matches!(
        violations(&number).as_slice(),
        [StepViolation::OutOfRange { field, .. }] if field == "validation.min"
    ));

    let mut email = Step::input(StepKind::EmailInput, "Email?", "email");
    if let StepPayload::Input(input) = &mut email.payload {
        input.validation.min = Some(1.0);
        input.validation.regex = Some(".+@.+".to_string());
        input.validation.max_retries = 0;
    }
    let found = violations(&email);
    assert_eq!(found.len(), 3);
    assert!(found.iter().any(|v| matches!(v, StepViolation::OutOfRange { field, .. } if field == "validation.max_retries")));
    assert_eq!(
        found
            .iter()
            .filter(|v| matches!(v, StepViolation::NotApplicable { .. }))
            .count(),
        2
    );

    let mut text = Step::input(StepKind::TextInput, "Code?", "code");
    if let StepPayload::Input(input) = &mut text.payload {
        input.validation.regex = Some("([a-z]".to_string());
    }
    assert!(matches!(
        violations(&text).as_slice(),
        [StepViolation::InvalidRegex { .. }]
    ));
}

#[test]
fn test_numeric_bounds_must_be_finite() {
    let mut number = Step::input(StepKind::NumberInput, "Age?", "age");
    if let StepPayload::Input(input) = &mut number.payload {
        input.validation.min = Some(f64::NAN);
        input.validation.max = Some(f64::INFINITY);
    }
    let found = violations(&number);
    let fields: Vec<&str> = found
        .iter()
        .filter_map(|v| match v {
            StepViolation::OutOfRange { field, .. } => Some(field.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(fields, vec!["validation.min", "validation.max"]);
    assert_eq!(found.len(), 2);

    if let StepPayload::Input(input) = &mut number.payload {
        input.validation.min = Some(0.0);
        input.validation.max = Some(f64::NEG_INFINITY);
    }
    assert!(matches!(
        violations(&number).as_slice(),
        [StepViolation::OutOfRange { field, .. }] if field == "validation.max"
    ));
}

#[test]
fn test_location_and_url_rules() {
    let location = |lat: &str, long: &str| {
        Step::new(
            StepKind::Location,
            None,
            StepPayload::Location(LocationPayload {
                latitude: lat.to_string(),
                longitude: long.to_string(),
                name: Some("Office".to_string()),
                address: None,
            }),
        )
    };
    assert!(location("52.37", "4.89").validate().is_ok());
    assert!(matches!(
        violations(&location("95", "4.89")).as_slice(),
        [StepViolation::OutOfRange { field, .. }] if field == "latitude"
    ));
    assert!(matches!(
        violations(&location("north", "")).as_slice(),
        [StepViolation::OutOfRange { .. }, StepViolation::MissingField { .. }]
    ));

    let link = |url: &str| {
        Step::new(
            StepKind::YouTubeLink,
            None,
            StepPayload::Link(LinkPayload {
                url: url.to_string(),
                label: None,
            }),
        )
    };
    assert!(link("https://youtu.be/abc").validate().is_ok());
    assert!(matches!(
        violations(&link("ftp://example.com")).as_slice(),
        [StepViolation::InvalidUrl { .. }]
    ));
}

#[test]
fn test_subflow_jump_and_condition_rules() {
    assert!(Step::subflow_jump("flow-42", None).validate().is_ok());
    assert!(Step::subflow_jump("flow-42", Some("node-3")).validate().is_ok());
    assert!(matches!(
        violations(&Step::subflow_jump(" ", Some(""))).as_slice(),
        [StepViolation::MissingField { .. }, StepViolation::MissingField { .. }]
    ));

    let condition = Step::new(
        StepKind::Condition,
        None,
        StepPayload::Condition(ConditionPayload {
            subject: String::new(),
            operator: ConditionOperator::IsSet,
            value: String::new(),
        }),
    );
    assert!(matches!(
        violations(&condition).as_slice(),
        [StepViolation::MissingField { field }] if field == "subject"
    ));
}

#[test]
fn test_outcome_count_and_output_variable() {
    assert_eq!(Step::quick_reply("Q", &["a", "b"]).outcome_count(), Some(2));
    assert_eq!(Step::list_menu("Q", "Open", &["a"]).outcome_count(), Some(1));
    assert_eq!(Step::text("Hi").outcome_count(), None);

    assert_eq!(
        Step::input(StepKind::DateInput, "When?", " visit_date ").output_variable(),
        Some("visit_date")
    );
    assert_eq!(Step::input(StepKind::DateInput, "When?", "").output_variable(), None);
    assert_eq!(Step::text("Hi").output_variable(), None);
}

#[test]
fn test_editor_labels_round_trip() {
    for kind in StepKind::ALL {
        assert_eq!(StepKind::from_editor_label(kind.editor_label()), Some(kind));
    }
    assert_eq!(StepKind::from_editor_label("Text Message"), Some(StepKind::Text));
    assert_eq!(StepKind::from_editor_label("Chatbot"), Some(StepKind::SubflowJump));
    assert_eq!(StepKind::from_editor_label("File Input"), None);
}

#[test]
fn test_step_serialization_shape() {
    let step = Step::quick_reply("Pick", &["Yes"]);
    let value = serde_json::to_value(&step).unwrap();
    assert_eq!(value["kind"], "quick_reply");
    assert_eq!(value["payload"]["quick_reply"]["buttons"][0]["label"], "Yes");

    assert_eq!(
        serde_json::to_value(StepKind::YouTubeLink).unwrap(),
        "youtube_link"
    );

    // Stored steps may omit defaulted fields.
    let parsed: Step = serde_json::from_str(r#"{"kind": "text", "content": "Hi"}"#).unwrap();
    assert_eq!(parsed.payload, StepPayload::None);
    assert!(parsed.validate().is_ok());
}
