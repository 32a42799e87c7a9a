use regex::Regex;

use crate::errors::AppError;
use crate::models::{NewSubmission, SubmitInterestRequest};

/// Check an email against the `local@domain.tld` shape: no whitespace, no
/// second `@`, at least one dot in the domain part. Intentionally loose
/// beyond that; deliverability is the notifier's problem, not the form's.
pub fn is_valid_email(email: &str) -> bool {
    let email_regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    email_regex.is_match(email)
}

fn non_empty(field: Option<&String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Validate and normalize an incoming form payload.
///
/// Pure: no store or network access. Fields are trimmed; an empty or
/// whitespace-only `title` becomes `None`.
pub fn validate(req: &SubmitInterestRequest) -> Result<NewSubmission, AppError> {
    let name = non_empty(req.name.as_ref());
    let email = non_empty(req.email.as_ref());
    let country = non_empty(req.country.as_ref());

    let (Some(name), Some(email), Some(country)) = (name, email, country) else {
        return Err(AppError::Validation(
            "Missing required fields: name, email, and country are required".to_string(),
        ));
    };

    if !is_valid_email(&email) {
        tracing::debug!("Rejected submission with malformed email");
        return Err(AppError::Validation("Invalid email format".to_string()));
    }

    Ok(NewSubmission {
        title: non_empty(req.title.as_ref()),
        name,
        email,
        country,
    })
}
