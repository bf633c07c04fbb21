use serde::{Deserialize, Serialize};

/// The signed-in user, as surfaced by the session credential.
///
/// Only used for rendering; access decisions look at session presence alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    /// Unix seconds at which the session expires
    pub expires_at: i64,
}

impl SessionUser {
    /// Name shown in the greeting and navbar
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or("there")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: Option<&str>, email: Option<&str>) -> SessionUser {
        SessionUser {
            id: "123".into(),
            name: name.map(String::from),
            email: email.map(String::from),
            image: None,
            expires_at: 0,
        }
    }

    #[test]
    fn display_name_falls_back_to_email() {
        assert_eq!(user(Some("Ada"), Some("ada@example.com")).display_name(), "Ada");
        assert_eq!(user(Some("  "), Some("ada@example.com")).display_name(), "ada@example.com");
        assert_eq!(user(None, None).display_name(), "there");
    }
}
