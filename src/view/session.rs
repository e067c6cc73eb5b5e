pub const GUEST_USER: &str = "guest";

/// Identity of the person browsing. Not authenticated: the user is whatever
/// string the client has stored, or `guest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: String,
}

impl Session {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }

    pub fn from_stored(user: Option<&str>) -> Self {
        match user.map(str::trim) {
            Some(u) if !u.is_empty() => Self::new(u),
            _ => Self::default(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GUEST_USER)
    }
}
