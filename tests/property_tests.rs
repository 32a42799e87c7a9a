/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use proptest::prelude::*;
use interest_api::repository::{clamped_limit, page_offset, sort_column, sort_direction};
use interest_api::validation::is_valid_email;

// Property: Email validation should never panic
proptest! {
    #[test]
    fn email_validation_never_panics(email in "\\PC*") {
        let _ = is_valid_email(&email);
    }

    #[test]
    fn email_without_at_never_validates(email in "[^@]*") {
        prop_assert!(!is_valid_email(&email));
    }

    #[test]
    fn well_formed_emails_always_validate(
        local in "[a-z0-9]{1,10}",
        domain in "[a-z0-9]{1,10}",
        tld in "[a-z]{2,4}"
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_valid_email(&email));
    }

    #[test]
    fn emails_with_whitespace_never_validate(
        prefix in "[a-z]{1,5}",
        suffix in "[a-z]{1,5}"
    ) {
        let email = format!("{} {}@example.com", prefix, suffix);
        prop_assert!(!is_valid_email(&email));
    }
}

// Property: sort inputs are total functions onto safe values
proptest! {
    #[test]
    fn sort_column_always_resolves_to_allow_list(requested in "\\PC*") {
        let resolved = sort_column(&requested);
        prop_assert!(
            ["id", "name", "email", "country", "submitted_at"].contains(&resolved)
        );
    }

    #[test]
    fn sort_direction_always_asc_or_desc(requested in "\\PC*") {
        let resolved = sort_direction(&requested);
        prop_assert!(resolved == "ASC" || resolved == "DESC");
    }
}

// Property: pagination arithmetic stays in bounds for any caller input
proptest! {
    #[test]
    fn limit_always_within_bounds(limit in any::<i64>()) {
        let clamped = clamped_limit(limit);
        prop_assert!((1..=200).contains(&clamped));
    }

    #[test]
    fn offset_never_negative(page in any::<i64>(), limit in any::<i64>()) {
        let clamped = clamped_limit(limit);
        prop_assert!(page_offset(page, clamped) >= 0);
    }

    #[test]
    fn offset_matches_one_based_pages(page in 1i64..100_000, limit in 1i64..=200) {
        prop_assert_eq!(page_offset(page, limit), (page - 1) * limit);
    }
}
