use serde::{Deserialize, Serialize};

use crate::database::models::{Entity, UniqueRule};
use crate::database::record::{non_blank, RecordError};
use crate::filter::Filter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Parent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Parent => "parent",
        }
    }
}

/// Stored user. Only the bcrypt hash of the password is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub role: Role,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";

    fn unique_rule(&self) -> Option<UniqueRule> {
        Some(UniqueRule {
            filter: Filter::by("email", self.email.clone()),
            message: "User already exists.",
        })
    }
}

/// Registration payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub role: Option<Role>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A registration that passed validation; the password is still plaintext.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub role: Role,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl ValidRegistration {
    pub fn into_user(self, password_hash: String) -> User {
        User {
            role: self.role,
            name: self.name,
            email: self.email,
            password_hash,
        }
    }
}

impl NewUser {
    pub fn validate(self) -> Result<ValidRegistration, RecordError> {
        let name = non_blank(self.name);
        let email = non_blank(self.email).map(|e| normalize_email(&e));
        // Passwords are taken verbatim; only emptiness is rejected.
        let password = self.password.filter(|p| !p.is_empty());

        let present = [
            ("role", self.role.is_some()),
            ("name", name.is_some()),
            ("email", email.is_some()),
            ("password", password.is_some()),
        ];
        let (Some(role), Some(name), Some(email), Some(password)) = (self.role, name, email, password) else {
            return Err(RecordError::missing(&present));
        };
        if !email.contains('@') {
            return Err(RecordError::invalid("email", "must be an email address"));
        }

        Ok(ValidRegistration {
            role,
            name,
            email,
            password,
        })
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
