// Validation utilities module
// Identity checks run before a new user is persisted

use validator::validate_email;

use crate::auth::password::PasswordService;

/// Column widths of the `users` table, in characters
pub const MAX_EMAIL_LENGTH: usize = 256;
pub const MAX_NAME_LENGTH: usize = 100;

/// Profile fields of a prospective user
#[derive(Debug, Clone, Copy)]
pub struct NewUserFields<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

/// Collect every identity validation failure for a prospective user.
///
/// An empty result means the user can be stored as given.
pub fn validate_new_user(passwords: &PasswordService, fields: NewUserFields<'_>) -> Vec<String> {
    let mut errors = Vec::new();
    let email = fields.email;

    if email.chars().count() > MAX_EMAIL_LENGTH {
        errors.push(format!(
            "Email must be at most {} characters.",
            MAX_EMAIL_LENGTH
        ));
    } else if !validate_email(email.trim()) {
        errors.push(format!("Email '{}' is invalid.", email));
    }
    for (label, value) in [("First name", fields.first_name), ("Last name", fields.last_name)] {
        if value.is_some_and(|v| v.chars().count() > MAX_NAME_LENGTH) {
            errors.push(format!(
                "{} must be at most {} characters.",
                label, MAX_NAME_LENGTH
            ));
        }
    }
    errors.extend(passwords.validate_password_strength(fields.password));

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields<'a>(email: &'a str, password: &'a str) -> NewUserFields<'a> {
        NewUserFields {
            email,
            password,
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_valid_user_has_no_errors() {
        let passwords = PasswordService::default();
        assert!(validate_new_user(&passwords, fields("a@x.com", "P@ssw0rd!")).is_empty());
    }

    #[test]
    fn test_invalid_email_is_reported_first() {
        let passwords = PasswordService::default();
        let errors = validate_new_user(&passwords, fields("not-an-email", "weak"));

        assert_eq!(errors[0], "Email 'not-an-email' is invalid.");
        assert!(errors.len() > 1);
    }

    #[test]
    fn test_overlong_email_is_rejected() {
        let passwords = PasswordService::default();
        let label = "b".repeat(60);
        let email = format!("{}@{l}.{l}.{l}.{l}.com", "a".repeat(64), l = label);
        assert!(email.chars().count() > MAX_EMAIL_LENGTH);

        let errors = validate_new_user(&passwords, fields(&email, "P@ssw0rd!"));

        assert_eq!(errors, vec!["Email must be at most 256 characters.".to_string()]);
    }

    #[test]
    fn test_overlong_names_are_rejected() {
        let passwords = PasswordService::default();
        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        let limit = "y".repeat(MAX_NAME_LENGTH);

        let errors = validate_new_user(
            &passwords,
            NewUserFields {
                first_name: Some(&long),
                last_name: Some(&long),
                ..fields("a@x.com", "P@ssw0rd!")
            },
        );
        assert_eq!(
            errors,
            vec![
                "First name must be at most 100 characters.".to_string(),
                "Last name must be at most 100 characters.".to_string(),
            ]
        );

        let errors = validate_new_user(
            &passwords,
            NewUserFields {
                first_name: Some(&limit),
                ..fields("a@x.com", "P@ssw0rd!")
            },
        );
        assert!(errors.is_empty());
    }
}
