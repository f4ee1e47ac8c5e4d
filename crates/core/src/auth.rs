use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Kind of caller behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Internal back-office user.
    Staff,
    /// External customer account.
    Customer,
}

impl UserType {
    /// Returns a stable storage value for this user type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Customer => "customer",
        }
    }
}

/// Caller context resolved by the session layer for one request.
///
/// The authentication layer builds this from the verified session and the
/// caller's resolved role grants. Services trust it as-is and only perform
/// authorization against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceContext {
    user_id: String,
    user_type: UserType,
    permissions: BTreeSet<String>,
    role: Option<String>,
}

impl ServiceContext {
    /// Creates a service context from session and grant data.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        user_type: UserType,
        permissions: BTreeSet<String>,
        role: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_type,
            permissions,
            role,
        }
    }

    /// Returns the stable caller identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }

    /// Returns the caller kind.
    #[must_use]
    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    /// Returns the caller's effective permission strings.
    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    /// Returns whether the caller holds a permission string.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns the caller's role name, if one was resolved.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{ServiceContext, UserType};

    #[test]
    fn context_reports_held_permission() {
        let context = ServiceContext::new(
            "user-1",
            UserType::Staff,
            BTreeSet::from(["orders:read".to_owned()]),
            Some("staff".to_owned()),
        );

        assert!(context.has_permission("orders:read"));
        assert!(!context.has_permission("orders:update"));
    }
}
