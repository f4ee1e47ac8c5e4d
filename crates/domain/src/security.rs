use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use fabriq_core::AppError;
use serde::{Deserialize, Serialize};

/// Managed noun-domains that permissions apply to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Back-office user accounts and role assignments.
    Users,
    /// Customer accounts.
    Customers,
    /// Manufacturing orders.
    Orders,
    /// Incoming inquiries.
    Inquiries,
    /// Product catalog entries.
    Products,
    /// Uploaded media assets.
    Media,
}

impl Resource {
    /// Returns a stable storage value for this resource.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Customers => "customers",
            Self::Orders => "orders",
            Self::Inquiries => "inquiries",
            Self::Products => "products",
            Self::Media => "media",
        }
    }

    /// Returns all known resources in declaration order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Resource] = &[
            Resource::Users,
            Resource::Customers,
            Resource::Orders,
            Resource::Inquiries,
            Resource::Products,
            Resource::Media,
        ];

        ALL
    }

    /// Parses a stored value into a resource. Returns `None` for unknown values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "users" => Some(Self::Users),
            "customers" => Some(Self::Customers),
            "orders" => Some(Self::Orders),
            "inquiries" => Some(Self::Inquiries),
            "products" => Some(Self::Products),
            "media" => Some(Self::Media),
            _ => None,
        }
    }

    /// Returns every permission scoped to this resource.
    #[must_use]
    pub fn permissions(&self) -> Vec<Permission> {
        Permission::all()
            .into_iter()
            .filter(|permission| permission.resource() == *self)
            .collect()
    }
}

/// CRUD-style verbs applied to a resource.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create a new record.
    Create,
    /// Read existing records.
    Read,
    /// Update existing records.
    Update,
    /// Delete existing records.
    Delete,
    /// Administer the resource beyond CRUD.
    Manage,
}

impl Action {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Manage => "manage",
        }
    }

    /// Returns all known actions in declaration order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::Manage,
        ];

        ALL
    }

    /// Parses a stored value into an action. Returns `None` for unknown values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(Self::Create),
            "read" => Some(Self::Read),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            "manage" => Some(Self::Manage),
            _ => None,
        }
    }

    /// Returns every permission carrying this action.
    #[must_use]
    pub fn permissions(&self) -> Vec<Permission> {
        Permission::all()
            .into_iter()
            .filter(|permission| permission.action() == *self)
            .collect()
    }
}

/// A `resource:action` capability enforced by service policy checks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Permission {
    resource: Resource,
    action: Action,
}

impl Permission {
    /// Creates a permission from a resource and action pair.
    #[must_use]
    pub fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    /// Returns the resource this permission is scoped to.
    #[must_use]
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Returns the action this permission grants.
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// Returns the canonical lowercase `resource:action` string.
    #[must_use]
    pub fn as_string(&self) -> String {
        format!("{}:{}", self.resource.as_str(), self.action.as_str())
    }

    /// Parses a permission string. Total: returns `None` for any malformed
    /// input (missing separator, empty segment, unknown resource or action).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (resource, action) = value.split_once(':')?;
        if resource.is_empty() || action.is_empty() {
            return None;
        }

        Some(Self {
            resource: Resource::parse(resource)?,
            action: Action::parse(action)?,
        })
    }

    /// Returns whether a string is a well-formed known permission.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        Self::parse(value).is_some()
    }

    /// Returns every known permission as the deterministic resource-major
    /// cross product of resources and actions.
    #[must_use]
    pub fn all() -> Vec<Self> {
        let mut permissions = Vec::with_capacity(Resource::all().len() * Action::all().len());
        for resource in Resource::all() {
            for action in Action::all() {
                permissions.push(Self::new(*resource, *action));
            }
        }

        permissions
    }
}

impl Display for Permission {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}:{}",
            self.resource.as_str(),
            self.action.as_str()
        )
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
            .ok_or_else(|| AppError::Validation(format!("unknown permission value '{value}'")))
    }
}

/// Built-in roles shipped with every installation.
///
/// These roles are protected: they cannot be renamed or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltInRole {
    /// Unrestricted access to every resource.
    Superadmin,
    /// Full operational access except user administration.
    Admin,
    /// Day-to-day order and inquiry handling.
    Staff,
}

impl BuiltInRole {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::Admin => "admin",
            Self::Staff => "staff",
        }
    }

    /// Returns all built-in roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[BuiltInRole] = &[
            BuiltInRole::Superadmin,
            BuiltInRole::Admin,
            BuiltInRole::Staff,
        ];

        ALL
    }

    /// Parses a role name into a built-in role. Returns `None` for custom roles.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "superadmin" => Some(Self::Superadmin),
            "admin" => Some(Self::Admin),
            "staff" => Some(Self::Staff),
            _ => None,
        }
    }

    /// Returns whether a role name belongs to a protected built-in role.
    #[must_use]
    pub fn is_protected(name: &str) -> bool {
        Self::parse(name).is_some()
    }

    /// Returns the default permission grants for this role.
    ///
    /// Superadmin holds every permission. Admin holds everything except user
    /// deletion and user administration. Staff holds read access on the
    /// operational resources plus order/inquiry handling and media uploads.
    #[must_use]
    pub fn default_permissions(&self) -> BTreeSet<Permission> {
        match self {
            Self::Superadmin => Permission::all().into_iter().collect(),
            Self::Admin => Permission::all()
                .into_iter()
                .filter(|permission| {
                    permission.resource() != Resource::Users
                        || matches!(
                            permission.action(),
                            Action::Create | Action::Read | Action::Update
                        )
                })
                .collect(),
            Self::Staff => BTreeSet::from([
                Permission::new(Resource::Customers, Action::Read),
                Permission::new(Resource::Orders, Action::Create),
                Permission::new(Resource::Orders, Action::Read),
                Permission::new(Resource::Orders, Action::Update),
                Permission::new(Resource::Inquiries, Action::Create),
                Permission::new(Resource::Inquiries, Action::Read),
                Permission::new(Resource::Inquiries, Action::Update),
                Permission::new(Resource::Products, Action::Read),
                Permission::new(Resource::Media, Action::Create),
                Permission::new(Resource::Media, Action::Read),
            ]),
        }
    }
}

/// Role definition with its effective grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier.
    pub role_id: String,
    /// Unique role name.
    pub name: String,
    /// Indicates a protected built-in role.
    pub is_built_in: bool,
    /// Effective role grants.
    pub permissions: BTreeSet<Permission>,
}
