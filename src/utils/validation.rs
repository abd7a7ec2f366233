use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};
use validator::Validate;

use crate::config::ValidationMessages;
use crate::models::{FieldErrors, FieldName, ProfileImage, UserDraft};

/// `something@something.something`, no whitespace in any part. Unanchored.
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));

const NAME_MIN_LEN: usize = 3;
const DESCRIPTION_MIN_LEN: usize = 10;
const PHONE_LEN: usize = 10;

fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn validate_name(value: &str, messages: &ValidationMessages) -> Option<String> {
    if value.is_empty() {
        Some(messages.required.clone())
    } else if char_len(value) < NAME_MIN_LEN {
        Some(messages.name_too_short.clone())
    } else {
        None
    }
}

pub fn validate_email(value: &str, messages: &ValidationMessages) -> Option<String> {
    if value.is_empty() {
        Some(messages.required.clone())
    } else if !EMAIL_REGEX.is_match(value) {
        Some(messages.invalid_email.clone())
    } else {
        None
    }
}

/// Only the length is checked; digits are not enforced.
pub fn validate_phone(value: &str, messages: &ValidationMessages) -> Option<String> {
    if value.is_empty() {
        Some(messages.required.clone())
    } else if char_len(value) != PHONE_LEN {
        Some(messages.phone_length.clone())
    } else {
        None
    }
}

pub fn validate_description(value: &str, messages: &ValidationMessages) -> Option<String> {
    if value.is_empty() {
        Some(messages.required.clone())
    } else if char_len(value) < DESCRIPTION_MIN_LEN {
        Some(messages.description_too_short.clone())
    } else {
        None
    }
}

/// Fails on a pristine draft: the image starts out unset but is required.
pub fn validate_profile_image(
    value: Option<&ProfileImage>,
    messages: &ValidationMessages,
) -> Option<String> {
    match value {
        Some(_) => None,
        None => Some(messages.invalid_image.clone()),
    }
}

/// Only an id of 0 fails. Drafts always start with a non-zero role, so this
/// cannot trigger through the controller, but it stays part of the rule set.
pub fn validate_role(role_id: i64, messages: &ValidationMessages) -> Option<String> {
    (role_id == 0).then(|| messages.role_required.clone())
}

/// Run every rule against `draft` and collect the failures.
///
/// All rules run; an empty result means the draft can be submitted.
pub fn validate_form(draft: &UserDraft, messages: &ValidationMessages) -> FieldErrors {
    let checks = [
        (FieldName::Name, validate_name(&draft.name, messages)),
        (FieldName::Email, validate_email(&draft.email, messages)),
        (FieldName::Phone, validate_phone(&draft.phone, messages)),
        (
            FieldName::Description,
            validate_description(&draft.description, messages),
        ),
        (
            FieldName::ProfileImage,
            validate_profile_image(draft.profile_image.as_ref(), messages),
        ),
        (FieldName::RoleId, validate_role(draft.role_id, messages)),
    ];

    checks
        .into_iter()
        .filter_map(|(field, error)| error.map(|message| (field, message)))
        .collect()
}

/// Validate a payload implementing `validator::Validate` and return the
/// failures as `field -> [messages]`, the shape the users API answers with.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), serde_json::Map<String, Value>> {
    if let Err(errors) = payload.validate() {
        let mut errors_map = serde_json::Map::new();
        for (field, errs) in errors.field_errors().iter() {
            let msgs: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .clone()
                        .unwrap_or_else(|| "Invalid input".into())
                        .to_string()
                })
                .collect();
            errors_map.insert(field.to_string(), json!(msgs));
        }
        return Err(errors_map);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn messages() -> ValidationMessages {
        ValidationMessages::default()
    }

    fn valid_draft() -> UserDraft {
        UserDraft {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "0123456789".into(),
            description: "Analytical engine programmer".into(),
            profile_image: Some(ProfileImage::new("ada.png", "image/png", vec![1, 2, 3])),
            role_id: 1,
        }
    }

    #[test]
    fn name_required_takes_precedence_over_length() {
        let m = messages();
        assert_eq!(validate_name("", &m), Some(m.required.clone()));
        assert_eq!(validate_name("a", &m), Some(m.name_too_short.clone()));
        assert_eq!(validate_name("ab", &m), Some(m.name_too_short.clone()));
        assert_eq!(validate_name("abc", &m), None);
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        let m = messages();
        assert_eq!(validate_name("Zoë", &m), None);
        assert_eq!(validate_name("é", &m), Some(m.name_too_short.clone()));
    }

    #[test]
    fn email_shape() {
        let m = messages();
        assert_eq!(validate_email("", &m), Some(m.required.clone()));
        assert_eq!(validate_email("foo", &m), Some(m.invalid_email.clone()));
        assert_eq!(validate_email("foo@bar", &m), Some(m.invalid_email.clone()));
        assert_eq!(validate_email("a @b.co", &m), Some(m.invalid_email.clone()));
        assert_eq!(validate_email("a@b.co", &m), None);
    }

    #[test]
    fn phone_must_be_exactly_ten_characters() {
        let m = messages();
        assert_eq!(validate_phone("", &m), Some(m.required.clone()));
        assert_eq!(validate_phone("123456789", &m), Some(m.phone_length.clone()));
        assert_eq!(validate_phone("12345678901", &m), Some(m.phone_length.clone()));
        assert_eq!(validate_phone("0123456789", &m), None);
        // Digits are not enforced.
        assert_eq!(validate_phone("abcdefghij", &m), None);
    }

    #[test]
    fn description_min_length() {
        let m = messages();
        assert_eq!(validate_description("", &m), Some(m.required.clone()));
        assert_eq!(
            validate_description("too short", &m),
            Some(m.description_too_short.clone())
        );
        assert_eq!(validate_description("long enough", &m), None);
    }

    #[test]
    fn role_zero_is_the_only_failure() {
        let m = messages();
        assert_eq!(validate_role(0, &m), Some(m.role_required.clone()));
        assert_eq!(validate_role(1, &m), None);
        assert_eq!(validate_role(42, &m), None);
    }

    #[test]
    fn pristine_draft_fails_every_field_but_role() {
        let errors = validate_form(&UserDraft::default(), &messages());
        for field in FieldName::iter() {
            assert_eq!(errors.contains(field), field != FieldName::RoleId, "{field}");
        }
        assert_eq!(
            errors.get(FieldName::ProfileImage),
            Some(messages().invalid_image.as_str())
        );
    }

    #[test]
    fn valid_draft_has_no_errors() {
        assert!(validate_form(&valid_draft(), &messages()).is_empty());
    }

    #[test]
    fn each_missing_field_is_reported_on_its_own_key() {
        let m = messages();
        for field in [
            FieldName::Name,
            FieldName::Email,
            FieldName::Phone,
            FieldName::Description,
        ] {
            let draft = valid_draft().with_text(field, "").unwrap();
            let errors = validate_form(&draft, &m);
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.get(field), Some(m.required.as_str()));
        }

        let mut draft = valid_draft();
        draft.profile_image = None;
        assert!(validate_form(&draft, &m).contains(FieldName::ProfileImage));
    }

    #[test]
    fn messages_come_from_the_injected_catalog() {
        let m = ValidationMessages {
            required: "Obligatoire.".into(),
            ..ValidationMessages::default()
        };
        assert_eq!(validate_name("", &m).as_deref(), Some("Obligatoire."));
    }

    #[derive(Validate)]
    struct TestPayload {
        #[validate(length(min = 1, message = "Name cannot be empty"))]
        name: String,
    }

    #[test]
    fn validate_payload_collects_messages_per_field() {
        let p = TestPayload { name: "".into() };
        let errors = validate_payload(&p).unwrap_err();
        assert_eq!(errors.get("name"), Some(&json!(["Name cannot be empty"])));
    }

    #[test]
    fn validate_payload_ok() {
        let p = TestPayload { name: "ok".into() };
        assert!(validate_payload(&p).is_ok());
    }
}
