use serde::{Deserialize, Serialize};

/// The authenticated user, as reported by `users/me/` or `auth/login/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    /// First name when set, username otherwise
    pub fn display_name(&self) -> &str {
        match self.first_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

/// Body of `POST auth/login/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body of `POST auth/register/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Greeting line shown above the task list
pub fn greeting(user: Option<&User>) -> String {
    match user {
        Some(user) => format!("Hello, {}", user.display_name()),
        None => "Hello".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first_name: Option<&str>) -> User {
        User {
            id: 1,
            username: "ada".into(),
            first_name: first_name.map(String::from),
            email: None,
        }
    }

    #[test]
    fn display_name_prefers_first_name() {
        assert_eq!(user(Some("Ada")).display_name(), "Ada");
        assert_eq!(user(Some("  ")).display_name(), "ada");
        assert_eq!(user(None).display_name(), "ada");
    }

    #[test]
    fn greeting_for_anonymous() {
        assert_eq!(greeting(None), "Hello");
        assert_eq!(greeting(Some(&user(Some("Ada")))), "Hello, Ada");
    }

    #[test]
    fn user_tolerates_null_and_extra_fields() {
        let json = r#"{"id":3,"username":"bob","first_name":null,"email":"b@x.io","full_name":"","avatar_url":null}"#;
        let u: User = serde_json::from_str(json).unwrap();
        assert_eq!(u.first_name, None);
        assert_eq!(u.email.as_deref(), Some("b@x.io"));
    }
}
