/// Unit tests for form validation
/// Tests required-field checks and the email shape rule
use interest_api::models::SubmitInterestRequest;
use interest_api::validation::{is_valid_email, validate};

fn request(name: Option<&str>, email: Option<&str>, country: Option<&str>) -> SubmitInterestRequest {
    SubmitInterestRequest {
        title: None,
        name: name.map(String::from),
        email: email.map(String::from),
        country: country.map(String::from),
        turnstile_token: None,
    }
}

#[cfg(test)]
mod email_validation_tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("test.user@example.com"));
        assert!(is_valid_email("user+tag@example.co.uk"));
        assert!(is_valid_email("user_name@example-domain.com"));
        assert!(is_valid_email("a@b.c"));
        assert!(is_valid_email("user@sub.example.com"));
    }

    #[test]
    fn test_invalid_emails_missing_parts() {
        // No dot in the domain
        assert!(!is_valid_email("bob@example"));
        // No @ at all
        assert!(!is_valid_email("userexample.com"));
        // Empty local or domain part
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("bob@example."));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_invalid_emails_malformed() {
        assert!(!is_valid_email("user @example.com")); // space in local part
        assert!(!is_valid_email("user@exam ple.com")); // space in domain
        assert!(!is_valid_email("user@@example.com")); // double @
        assert!(!is_valid_email("a@b@c.com"));
    }
}

#[cfg(test)]
mod submission_validation_tests {
    use super::*;

    #[test]
    fn test_complete_request_accepted() {
        let valid = validate(&request(
            Some("Ada Lovelace"),
            Some("ada@example.com"),
            Some("United Kingdom"),
        ))
        .unwrap();
        assert_eq!(valid.name, "Ada Lovelace");
        assert_eq!(valid.email, "ada@example.com");
        assert_eq!(valid.country, "United Kingdom");
    }

    #[test]
    fn test_missing_fields_report_missing_field_error() {
        for req in [
            request(None, Some("a@b.com"), Some("IE")),
            request(Some("Bob"), None, Some("IE")),
            request(Some("Bob"), Some("a@b.com"), None),
            request(Some(""), Some("a@b.com"), Some("IE")),
        ] {
            let err = validate(&req).unwrap_err();
            assert!(err.to_string().contains("Missing required fields"));
        }
    }

    #[test]
    fn test_bad_email_reports_format_error() {
        let err = validate(&request(Some("Bob"), Some("bob@example"), Some("IE"))).unwrap_err();
        assert!(err.to_string().contains("Invalid email format"));
    }

    #[test]
    fn test_title_is_optional() {
        let mut req = request(Some("Bob"), Some("bob@example.com"), Some("IE"));
        assert!(validate(&req).unwrap().title.is_none());

        req.title = Some("Dr".to_string());
        assert_eq!(validate(&req).unwrap().title.as_deref(), Some("Dr"));
    }
}
