use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use fabriq_core::{AppError, AppResult, NonEmptyString, ServiceContext};
use fabriq_domain::{Action, BuiltInRole, Permission, Resource, Role};

use crate::authorization_service::AuthorizationGuard;

/// Input payload for creating custom roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: String,
    /// Grants to attach to the role.
    pub permissions: BTreeSet<Permission>,
}

/// Repository port for role definitions.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists all roles.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Finds a role by name.
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Stores a new role.
    async fn insert_role(&self, role: Role) -> AppResult<Role>;

    /// Renames an existing role.
    async fn rename_role(&self, role_id: &str, name: &str) -> AppResult<Role>;

    /// Deletes an existing role.
    async fn delete_role(&self, role_id: &str) -> AppResult<()>;
}

/// Application service for role administration.
///
/// Built-in roles are immutable: rename and delete refuse to touch them.
#[derive(Clone)]
pub struct RoleAdminService {
    guard: AuthorizationGuard,
    repository: Arc<dyn RoleRepository>,
}

impl RoleAdminService {
    /// Creates the service from its repository dependency.
    #[must_use]
    pub fn new(repository: Arc<dyn RoleRepository>) -> Self {
        Self {
            guard: AuthorizationGuard::new(Resource::Users),
            repository,
        }
    }

    /// Lists all roles.
    pub async fn list_roles(&self, context: &ServiceContext) -> AppResult<Vec<Role>> {
        self.guard.require_permission(context, Action::Read)?;
        self.repository.list_roles().await
    }

    /// Creates a custom role.
    pub async fn create_role(
        &self,
        context: &ServiceContext,
        input: CreateRoleInput,
    ) -> AppResult<Role> {
        self.guard.require_permission(context, Action::Manage)?;

        let name = NonEmptyString::new(input.name)?;
        if BuiltInRole::is_protected(name.as_str()) {
            return Err(AppError::Validation(format!(
                "role name '{}' is reserved for a built-in role",
                name.as_str()
            )));
        }

        if self.repository.find_role_by_name(name.as_str()).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                name.as_str()
            )));
        }

        self.repository
            .insert_role(Role {
                role_id: Uuid::new_v4().to_string(),
                name: name.into(),
                is_built_in: false,
                permissions: input.permissions,
            })
            .await
    }

    /// Renames a custom role.
    pub async fn rename_role(
        &self,
        context: &ServiceContext,
        name: &str,
        new_name: &str,
    ) -> AppResult<Role> {
        self.guard.require_permission(context, Action::Manage)?;

        let role = self.find_existing_role(name).await?;
        if role.is_built_in {
            return Err(AppError::Validation(format!(
                "built-in role '{name}' cannot be renamed"
            )));
        }

        let new_name = NonEmptyString::new(new_name)?;
        if BuiltInRole::is_protected(new_name.as_str()) {
            return Err(AppError::Validation(format!(
                "role name '{}' is reserved for a built-in role",
                new_name.as_str()
            )));
        }

        if self
            .repository
            .find_role_by_name(new_name.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                new_name.as_str()
            )));
        }

        self.repository
            .rename_role(&role.role_id, new_name.as_str())
            .await
    }

    /// Deletes a custom role.
    pub async fn delete_role(&self, context: &ServiceContext, name: &str) -> AppResult<()> {
        self.guard.require_permission(context, Action::Manage)?;

        let role = self.find_existing_role(name).await?;
        if role.is_built_in {
            return Err(AppError::Validation(format!(
                "built-in role '{name}' cannot be deleted"
            )));
        }

        self.repository.delete_role(&role.role_id).await
    }

    async fn find_existing_role(&self, name: &str) -> AppResult<Role> {
        self.repository
            .find_role_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{name}' does not exist")))
    }
}
