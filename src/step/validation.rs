use super::{
    InputPayload, ListMenuPayload, LocationPayload, QuickReplyPayload, Step, StepKind, StepPayload,
};
use crate::error::StepViolation;
use regex::Regex;

pub const MAX_QUICK_REPLY_BUTTONS: usize = 3;
pub const MAX_BUTTON_LABEL_CHARS: usize = 20;
pub const MAX_LIST_OPTIONS: usize = 10;
pub const MAX_OPTION_TITLE_CHARS: usize = 24;
pub const MAX_OPTION_DESCRIPTION_CHARS: usize = 72;
pub const MAX_BODY_CHARS: usize = 4096;
pub const MAX_RETRIES_LIMIT: u8 = 10;

/// Checks a step against the rules of its kind. Every violation is reported;
/// nothing is coerced.
pub fn validate_step(step: &Step) -> Result<(), Vec<StepViolation>> {
    let mut violations = Vec::new();

    if let Some(content) = &step.content {
        check_length(&mut violations, "content", content, MAX_BODY_CHARS);
    }

    match step.kind {
        StepKind::Text => validate_text(step, &mut violations),
        StepKind::Image | StepKind::Video | StepKind::Audio | StepKind::File => {
            validate_media(step, &mut violations)
        }
        StepKind::Location => validate_location(step, &mut violations),
        StepKind::YouTubeLink | StepKind::Link => validate_link(step, &mut violations),
        StepKind::QuickReply => validate_quick_reply(step, &mut violations),
        StepKind::ListMenu => validate_list_menu(step, &mut violations),
        StepKind::TextInput
        | StepKind::NumberInput
        | StepKind::EmailInput
        | StepKind::PhoneInput
        | StepKind::DateInput
        | StepKind::TimeInput => validate_input(step, &mut violations),
        StepKind::Condition => validate_condition(step, &mut violations),
        StepKind::SubflowJump => validate_subflow_jump(step, &mut violations),
        StepKind::Webhook => validate_webhook(step, &mut violations),
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn mismatch(step: &Step) -> StepViolation {
    StepViolation::PayloadMismatch {
        kind: step.kind,
        found: step.payload.shape(),
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn check_length(violations: &mut Vec<StepViolation>, field: &str, value: &str, max: usize) {
    let length = value.chars().count();
    if length > max {
        violations.push(StepViolation::TooLong {
            field: field.to_string(),
            length,
            max,
        });
    }
}

fn require_content(step: &Step, violations: &mut Vec<StepViolation>) {
    if step.content.as_deref().is_none_or(is_blank) {
        violations.push(StepViolation::MissingField {
            field: "content".to_string(),
        });
    }
}

fn check_url(violations: &mut Vec<StepViolation>, field: &str, url: &str) {
    if is_blank(url) {
        violations.push(StepViolation::MissingField {
            field: field.to_string(),
        });
        return;
    }
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    if rest.is_none_or(is_blank) {
        violations.push(StepViolation::InvalidUrl {
            url: url.to_string(),
        });
    }
}

/// Variable names are identifiers: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn validate_text(step: &Step, violations: &mut Vec<StepViolation>) {
    if step.payload != StepPayload::None {
        violations.push(mismatch(step));
    }
    require_content(step, violations);
}

fn validate_media(step: &Step, violations: &mut Vec<StepViolation>) {
    match &step.payload {
        StepPayload::Media(media) if is_blank(&media.media_id) => {
            violations.push(StepViolation::MissingField {
                field: "media_id".to_string(),
            });
        }
        StepPayload::Media(_) => {}
        _ => violations.push(mismatch(step)),
    }
}

fn validate_location(step: &Step, violations: &mut Vec<StepViolation>) {
    let StepPayload::Location(location) = &step.payload else {
        violations.push(mismatch(step));
        return;
    };
    let LocationPayload {
        latitude,
        longitude,
        ..
    } = location;
    check_coordinate(violations, "latitude", latitude, 90.0);
    check_coordinate(violations, "longitude", longitude, 180.0);
}

fn check_coordinate(violations: &mut Vec<StepViolation>, field: &str, raw: &str, bound: f64) {
    if is_blank(raw) {
        violations.push(StepViolation::MissingField {
            field: field.to_string(),
        });
        return;
    }
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && (-bound..=bound).contains(&value) => {}
        _ => violations.push(StepViolation::OutOfRange {
            field: field.to_string(),
            value: raw.to_string(),
            expected: format!("a number between -{} and {}", bound, bound),
        }),
    }
}

fn validate_link(step: &Step, violations: &mut Vec<StepViolation>) {
    match &step.payload {
        StepPayload::Link(link) => {
            check_url(violations, "url", &link.url);
            if let Some(label) = &link.label {
                check_length(violations, "label", label, MAX_BUTTON_LABEL_CHARS);
            }
        }
        _ => violations.push(mismatch(step)),
    }
}

fn validate_quick_reply(step: &Step, violations: &mut Vec<StepViolation>) {
    let StepPayload::QuickReply(QuickReplyPayload { buttons }) = &step.payload else {
        violations.push(mismatch(step));
        return;
    };
    require_content(step, violations);
    if buttons.len() > MAX_QUICK_REPLY_BUTTONS {
        violations.push(StepViolation::TooMany {
            field: "buttons".to_string(),
            count: buttons.len(),
            max: MAX_QUICK_REPLY_BUTTONS,
        });
    }
    for (i, button) in buttons.iter().enumerate() {
        let field = format!("buttons[{}].label", i);
        if is_blank(&button.label) {
            violations.push(StepViolation::MissingField { field });
        } else {
            check_length(violations, &field, &button.label, MAX_BUTTON_LABEL_CHARS);
        }
    }
}

fn validate_list_menu(step: &Step, violations: &mut Vec<StepViolation>) {
    let StepPayload::ListMenu(ListMenuPayload {
        button_label,
        options,
    }) = &step.payload
    else {
        violations.push(mismatch(step));
        return;
    };
    require_content(step, violations);
    if is_blank(button_label) {
        violations.push(StepViolation::MissingField {
            field: "button_label".to_string(),
        });
    } else {
        check_length(violations, "button_label", button_label, MAX_BUTTON_LABEL_CHARS);
    }
    if options.len() > MAX_LIST_OPTIONS {
        violations.push(StepViolation::TooMany {
            field: "options".to_string(),
            count: options.len(),
            max: MAX_LIST_OPTIONS,
        });
    }
    for (i, option) in options.iter().enumerate() {
        let title_field = format!("options[{}].title", i);
        if is_blank(&option.title) {
            violations.push(StepViolation::MissingField { field: title_field });
        } else {
            check_length(violations, &title_field, &option.title, MAX_OPTION_TITLE_CHARS);
        }
        if let Some(description) = &option.description {
            check_length(
                violations,
                &format!("options[{}].description", i),
                description,
                MAX_OPTION_DESCRIPTION_CHARS,
            );
        }
    }
}

fn validate_input(step: &Step, violations: &mut Vec<StepViolation>) {
    let StepPayload::Input(InputPayload {
        variable,
        validation,
    }) = &step.payload
    else {
        violations.push(mismatch(step));
        return;
    };

    if !variable.is_empty() && !is_valid_variable_name(variable) {
        violations.push(StepViolation::InvalidVariableName {
            name: variable.clone(),
        });
    }

    if !(1..=MAX_RETRIES_LIMIT).contains(&validation.max_retries) {
        violations.push(StepViolation::OutOfRange {
            field: "validation.max_retries".to_string(),
            value: validation.max_retries.to_string(),
            expected: format!("1..={}", MAX_RETRIES_LIMIT),
        });
    }

    let numeric_bounds = validation.min.is_some() || validation.max.is_some();
    if numeric_bounds && step.kind != StepKind::NumberInput {
        violations.push(StepViolation::NotApplicable {
            field: "validation.min/max".to_string(),
            kind: step.kind,
        });
    }
    for (field, bound) in [("validation.min", validation.min), ("validation.max", validation.max)] {
        if let Some(value) = bound.filter(|v| !v.is_finite()) {
            violations.push(StepViolation::OutOfRange {
                field: field.to_string(),
                value: value.to_string(),
                expected: "a finite number".to_string(),
            });
        }
    }
    if let (Some(min), Some(max)) = (validation.min, validation.max) {
        if min.is_finite() && max.is_finite() && min > max {
            violations.push(StepViolation::OutOfRange {
                field: "validation.min".to_string(),
                value: min.to_string(),
                expected: format!("a value not greater than max ({})", max),
            });
        }
    }

    if let Some(pattern) = validation.regex.as_deref().filter(|p| !p.is_empty()) {
        if step.kind != StepKind::TextInput {
            violations.push(StepViolation::NotApplicable {
                field: "validation.regex".to_string(),
                kind: step.kind,
            });
        } else if let Err(e) = Regex::new(pattern) {
            violations.push(StepViolation::InvalidRegex {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            });
        }
    }
}

fn validate_condition(step: &Step, violations: &mut Vec<StepViolation>) {
    match &step.payload {
        StepPayload::Condition(condition) if is_blank(&condition.subject) => {
            violations.push(StepViolation::MissingField {
                field: "subject".to_string(),
            });
        }
        StepPayload::Condition(_) => {}
        _ => violations.push(mismatch(step)),
    }
}

fn validate_subflow_jump(step: &Step, violations: &mut Vec<StepViolation>) {
    match &step.payload {
        StepPayload::SubflowJump(jump) => {
            if is_blank(&jump.target_flow_id) {
                violations.push(StepViolation::MissingField {
                    field: "target_flow_id".to_string(),
                });
            }
            if jump.target_node_id.as_deref().is_some_and(is_blank) {
                violations.push(StepViolation::MissingField {
                    field: "target_node_id".to_string(),
                });
            }
        }
        _ => violations.push(mismatch(step)),
    }
}

fn validate_webhook(step: &Step, violations: &mut Vec<StepViolation>) {
    match &step.payload {
        StepPayload::Webhook(webhook) => check_url(violations, "url", &webhook.url),
        _ => violations.push(mismatch(step)),
    }
}
