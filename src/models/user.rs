use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::UserId;

/// An account known to the AuthN provider. Boards, tasks and comments only
/// ever reference users by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// "First Last", trimmed so a missing last name leaves no trailing space.
    pub fn fullname(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Fields needed to persist a freshly registered user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// A user together with the stored password hash, used by login only.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

/// The public shape of a user embedded in board and task responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub fullname: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            fullname: user.fullname(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: 1,
            email: "ada@example.com".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_fullname_joins_and_trims() {
        assert_eq!(user("Ada", "Lovelace").fullname(), "Ada Lovelace");
        assert_eq!(user("Ada", "").fullname(), "Ada");
    }

    #[test]
    fn test_summary_from_user() {
        let summary = UserSummary::from(&user("Ada", "Lovelace"));
        assert_eq!(summary.id, 1);
        assert_eq!(summary.email, "ada@example.com");
        assert_eq!(summary.fullname, "Ada Lovelace");
    }
}
