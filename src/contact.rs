use crate::relay::{RelayError, TemplateParams};
use regex::Regex;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const SEND_FAILED_MESSAGE: &str = "Failed to send message. Please try again later.";
pub const SEND_SUCCEEDED_MESSAGE: &str =
    "Your message has been sent successfully. I'll get back to you soon!";
pub const SUCCESS_BANNER_TTL: Duration = Duration::from_millis(6_000);

static EMAIL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$")
        .inspect_err(|err| log::error!("email pattern failed to compile: {err}"))
        .ok()
});

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Subject => "Subject",
            Self::Message => "Message",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Name => 0,
            Self::Email => 1,
            Self::Subject => 2,
            Self::Message => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{} is required", .0.label())]
    Required(Field),
    #[error("Invalid email address")]
    InvalidEmail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success { expires_at: Instant },
    Failure(String),
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    values: [String; 4],
    errors: [Option<FieldError>; 4],
    focus: Option<Field>,
    submitting: bool,
    banner: Option<Banner>,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn error(&self, field: Field) -> Option<FieldError> {
        self.errors[field.index()]
    }

    pub fn focus(&self) -> Option<Field> {
        self.focus
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// Replaces a field's value and clears its error.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = value.into();
        self.errors[field.index()] = None;
    }

    pub fn push_char(&mut self, ch: char) {
        if let Some(field) = self.focus {
            self.values[field.index()].push(ch);
            self.errors[field.index()] = None;
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.focus {
            self.values[field.index()].pop();
            self.errors[field.index()] = None;
        }
    }

    pub fn set_focus(&mut self, field: Option<Field>) {
        self.focus = field;
    }

    pub fn focus_next(&mut self) {
        self.focus = Some(match self.focus {
            None => Field::Name,
            Some(field) => Field::ALL[(field.index() + 1) % Field::ALL.len()],
        });
    }

    pub fn focus_prev(&mut self) {
        self.focus = Some(match self.focus {
            None => Field::Message,
            Some(field) => {
                Field::ALL[(field.index() + Field::ALL.len() - 1) % Field::ALL.len()]
            }
        });
    }

    /// Recomputes every field error. Returns true when the form can be sent.
    pub fn validate(&mut self) -> bool {
        for field in Field::ALL {
            let raw = &self.values[field.index()];
            self.errors[field.index()] = if raw.trim().is_empty() {
                Some(FieldError::Required(field))
            } else if field == Field::Email && !is_valid_email(raw) {
                Some(FieldError::InvalidEmail)
            } else {
                None
            };
        }
        self.errors.iter().all(Option::is_none)
    }

    /// Validates and, when valid, marks the form as submitting and returns the payload.
    pub fn begin_submit(&mut self) -> Option<TemplateParams> {
        if self.submitting || !self.validate() {
            return None;
        }
        self.submitting = true;
        self.banner = None;
        Some(TemplateParams {
            user_name: self.value(Field::Name).to_string(),
            user_email: self.value(Field::Email).to_string(),
            user_subject: self.value(Field::Subject).to_string(),
            message: self.value(Field::Message).to_string(),
        })
    }

    pub fn finish_submit(&mut self, result: Result<(), RelayError>, now: Instant) {
        self.submitting = false;
        match result {
            Ok(()) => {
                log::info!("contact message sent");
                self.values = Default::default();
                self.errors = [None; 4];
                self.focus = None;
                self.banner = Some(Banner::Success {
                    expires_at: now + SUCCESS_BANNER_TTL,
                });
            }
            Err(err) => {
                log::error!("failed to send contact message: {err}");
                self.banner = Some(Banner::Failure(SEND_FAILED_MESSAGE.to_string()));
            }
        }
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Hides an expired success banner. Returns true if it was hidden.
    pub fn poll_banner(&mut self, now: Instant) -> bool {
        if let Some(Banner::Success { expires_at }) = self.banner
            && now >= expires_at
        {
            self.banner = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn filled_form() -> ContactForm {
        let mut form = ContactForm::new();
        form.set_field(Field::Name, "Ana");
        form.set_field(Field::Email, "ana@example.com");
        form.set_field(Field::Subject, "Hello");
        form.set_field(Field::Message, "Nice site");
        form
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let mut form = ContactForm::new();
        assert!(!form.validate());
        for field in Field::ALL {
            assert_eq!(form.error(field), Some(FieldError::Required(field)));
        }
        assert_eq!(
            form.error(Field::Subject).map(|err| err.to_string()),
            Some("Subject is required".to_string())
        );
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let mut form = filled_form();
        form.set_field(Field::Message, "   \n");
        assert!(!form.validate());
        assert_eq!(
            form.error(Field::Message),
            Some(FieldError::Required(Field::Message))
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut form = filled_form();
        form.set_field(Field::Email, "ana@example");
        assert!(form.begin_submit().is_none());
        assert_eq!(form.error(Field::Email), Some(FieldError::InvalidEmail));
        assert!(!form.is_submitting());
    }

    #[test]
    fn email_with_surrounding_spaces_is_rejected_not_sent() {
        let mut form = filled_form();
        form.set_field(Field::Email, " ana@example.com ");
        assert!(form.begin_submit().is_none());
        assert_eq!(form.error(Field::Email), Some(FieldError::InvalidEmail));

        form.set_field(Field::Email, "ana@example.com");
        let params = form.begin_submit().expect("valid form submits");
        assert_eq!(params.user_email, "ana@example.com");
    }

    #[test]
    fn editing_a_field_clears_only_its_error() {
        let mut form = ContactForm::new();
        form.validate();
        form.set_focus(Some(Field::Name));
        form.push_char('A');
        assert_eq!(form.error(Field::Name), None);
        assert!(form.error(Field::Email).is_some());
    }

    #[test]
    fn email_check_is_case_insensitive() {
        assert!(is_valid_email("Ana.Lee+site@Example.CO"));
        assert!(!is_valid_email("ana@example.c"));
        assert!(!is_valid_email("ana example@example.com"));
    }

    #[test]
    fn successful_send_clears_form_and_shows_banner() {
        let mut form = filled_form();
        let params = form.begin_submit().expect("valid form submits");
        assert_eq!(params.user_email, "ana@example.com");
        assert!(form.is_submitting());
        assert!(form.begin_submit().is_none());

        let now = Instant::now();
        form.finish_submit(Ok(()), now);
        assert!(!form.is_submitting());
        assert!(Field::ALL.iter().all(|field| form.value(*field).is_empty()));
        assert!(matches!(form.banner(), Some(Banner::Success { .. })));

        assert!(!form.poll_banner(now + Duration::from_millis(5_999)));
        assert!(form.poll_banner(now + SUCCESS_BANNER_TTL));
        assert_eq!(form.banner(), None);
    }

    #[test]
    fn failed_send_keeps_input_and_shows_error() {
        let mut form = filled_form();
        form.begin_submit();
        form.finish_submit(Err(RelayError::NotConfigured), Instant::now());

        assert_eq!(form.value(Field::Name), "Ana");
        assert_eq!(
            form.banner(),
            Some(&Banner::Failure(SEND_FAILED_MESSAGE.to_string()))
        );
        form.dismiss_banner();
        assert_eq!(form.banner(), None);
    }

    #[test]
    fn focus_cycles_through_fields() {
        let mut form = ContactForm::new();
        form.focus_next();
        assert_eq!(form.focus(), Some(Field::Name));
        form.focus_prev();
        assert_eq!(form.focus(), Some(Field::Message));
        form.focus_next();
        assert_eq!(form.focus(), Some(Field::Name));
    }

    proptest! {
        #[test]
        fn simple_addresses_validate(
            local in "[a-z0-9._%+-]{1,12}",
            domain in "[a-z0-9-]{1,12}",
            tld in "[a-z]{2,6}",
        ) {
            let address = format!("{local}@{domain}.{tld}");
            prop_assert!(is_valid_email(&address));
        }

        #[test]
        fn addresses_without_at_sign_fail(value in "[a-z0-9.]{0,24}") {
            prop_assert!(!is_valid_email(&value));
        }
    }
}
