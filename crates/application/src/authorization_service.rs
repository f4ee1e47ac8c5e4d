use std::collections::BTreeSet;

use fabriq_core::{AppError, AppResult, ServiceContext, UserType};
use fabriq_domain::{Action, Permission, Resource};

/// Customer-context access policy for one service.
///
/// Staff callers are checked against their permission strings; customer
/// callers are dispatched here instead, because customer accounts carry no
/// role grants. The default for every guard is `Deny`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerAccess {
    /// Customers are always denied.
    Deny,
    /// Customers may perform exactly the listed actions.
    Allow(BTreeSet<Action>),
}

impl CustomerAccess {
    /// Returns whether this policy grants an action to customer callers.
    #[must_use]
    pub fn allows(&self, action: Action) -> bool {
        match self {
            Self::Deny => false,
            Self::Allow(actions) => actions.contains(&action),
        }
    }
}

/// Options for one permission check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionCheck {
    /// Skips the check entirely for trusted internal call paths.
    ///
    /// Never a default: callers opt in explicitly at the call site.
    pub skip_permission_check: bool,
}

/// Authorization guard bound to the resource a service operates on.
///
/// Performs authorization only — the context arrives pre-built and
/// pre-trusted from the session layer. A failed check is fatal to the
/// current operation; callers must not catch and continue past it.
#[derive(Debug, Clone)]
pub struct AuthorizationGuard {
    resource: Resource,
    customer_access: CustomerAccess,
}

impl AuthorizationGuard {
    /// Creates a guard for one resource with customers denied.
    #[must_use]
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            customer_access: CustomerAccess::Deny,
        }
    }

    /// Creates a guard with a customer access override.
    #[must_use]
    pub fn with_customer_access(resource: Resource, customer_access: CustomerAccess) -> Self {
        Self {
            resource,
            customer_access,
        }
    }

    /// Returns the resource this guard is bound to.
    #[must_use]
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Ensures the caller may perform an action on the bound resource.
    pub fn require_permission(&self, context: &ServiceContext, action: Action) -> AppResult<()> {
        self.require_permission_with(context, action, &PermissionCheck::default())
    }

    /// Ensures the caller may perform an action, honoring check options.
    pub fn require_permission_with(
        &self,
        context: &ServiceContext,
        action: Action,
        check: &PermissionCheck,
    ) -> AppResult<()> {
        if check.skip_permission_check {
            return Ok(());
        }

        if context.user_id().trim().is_empty() {
            return Err(AppError::Forbidden(
                "service context is missing a caller id".to_owned(),
            ));
        }

        let permission = Permission::new(self.resource, action);
        match context.user_type() {
            UserType::Staff => {
                if context.permissions().is_empty() {
                    return Err(AppError::Forbidden(format!(
                        "user '{}' carries no permissions",
                        context.user_id()
                    )));
                }

                if context.has_permission(&permission.as_string()) {
                    return Ok(());
                }

                Err(AppError::Forbidden(format!(
                    "user '{}' is missing permission '{permission}'",
                    context.user_id()
                )))
            }
            UserType::Customer => {
                if context.has_permission(&permission.as_string())
                    || self.customer_access.allows(action)
                {
                    return Ok(());
                }

                Err(AppError::Forbidden(format!(
                    "customer '{}' may not perform '{permission}'",
                    context.user_id()
                )))
            }
        }
    }

    /// Returns whether the caller may perform an action on the bound resource.
    #[must_use]
    pub fn has_permission(&self, context: &ServiceContext, action: Action) -> bool {
        self.require_permission(context, action).is_ok()
    }
}
