use serde::{Deserialize, Serialize};

use nilecart_core::{Entity, UserId};

use crate::Role;

/// Minimal persisted user shape.
///
/// The identity provider owns credentials and the OTP/reset flow; the
/// storefront keeps just enough to populate orders and address notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub phone_number: Option<String>,
    /// Dialing prefix; Egyptian default applies when absent.
    pub country_code: Option<String>,
}

impl User {
    /// Full WhatsApp-dialable number, or `None` when no phone is on file.
    pub fn full_phone_number(&self) -> Option<String> {
        let number = self.phone_number.as_deref()?.trim();
        if number.is_empty() {
            return None;
        }
        let code = self.country_code.as_deref().unwrap_or("+20");
        Some(format!("{code}{number}"))
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(phone: Option<&str>, code: Option<&str>) -> User {
        User {
            id: UserId::new(),
            first_name: "Mona".into(),
            last_name: "Hassan".into(),
            email: "mona@example.com".into(),
            role: Role::Customer,
            phone_number: phone.map(Into::into),
            country_code: code.map(Into::into),
        }
    }

    #[test]
    fn country_code_defaults_to_egypt() {
        assert_eq!(user(Some("1001234567"), None).full_phone_number().unwrap(), "+201001234567");
    }

    #[test]
    fn explicit_country_code_wins() {
        assert_eq!(
            user(Some("501234567"), Some("+971")).full_phone_number().unwrap(),
            "+971501234567"
        );
    }

    #[test]
    fn missing_or_blank_phone_yields_none() {
        assert_eq!(user(None, None).full_phone_number(), None);
        assert_eq!(user(Some("  "), None).full_phone_number(), None);
    }
}
