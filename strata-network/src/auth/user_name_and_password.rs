use std::fmt;

/// plain user name and password credentials
///
/// a validated value holder for the password-based authentication mode;
/// the password never appears in the `Debug` rendering.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserNameAndPassword {
    user_name: Option<String>,
    password: Option<String>,
}

impl UserNameAndPassword {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user_name(&mut self, user_name: impl Into<String>) {
        self.user_name = Some(user_name.into());
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = Some(password.into());
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// both the user name and the password are present
    pub fn is_complete(&self) -> bool {
        self.user_name.is_some() && self.password.is_some()
    }

    /// reset every field to its default
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for UserNameAndPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserNameAndPassword")
            .field("user_name", &self.user_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
