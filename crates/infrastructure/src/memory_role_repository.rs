use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use fabriq_application::RoleRepository;
use fabriq_core::{AppError, AppResult};
use fabriq_domain::{BuiltInRole, Role};

/// In-memory role store.
///
/// `seeded()` installs the built-in roles with their default grants, the way
/// a durable deployment seeds them through a migration.
#[derive(Default)]
pub struct InMemoryRoleRepository {
    roles: Mutex<HashMap<String, Role>>,
}

impl InMemoryRoleRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the built-in roles.
    #[must_use]
    pub fn seeded() -> Self {
        let mut roles = HashMap::new();
        for built_in in BuiltInRole::all() {
            let role = Role {
                role_id: Uuid::new_v4().to_string(),
                name: built_in.as_str().to_owned(),
                is_built_in: true,
                permissions: built_in.default_permissions(),
            };
            roles.insert(role.role_id.clone(), role);
        }

        Self {
            roles: Mutex::new(roles),
        }
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let roles = self.roles.lock().await;
        let mut listed: Vec<Role> = roles.values().cloned().collect();
        listed.sort_by(|left, right| left.name.cmp(&right.name));

        Ok(listed)
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .values()
            .find(|role| role.name == name)
            .cloned())
    }

    async fn insert_role(&self, role: Role) -> AppResult<Role> {
        let mut roles = self.roles.lock().await;
        if roles.values().any(|stored| stored.name == role.name) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name
            )));
        }

        debug!(role = %role.name, "stored new role");
        roles.insert(role.role_id.clone(), role.clone());

        Ok(role)
    }

    async fn rename_role(&self, role_id: &str, name: &str) -> AppResult<Role> {
        let mut roles = self.roles.lock().await;
        if roles
            .values()
            .any(|stored| stored.name == name && stored.role_id != role_id)
        {
            return Err(AppError::Conflict(format!("role '{name}' already exists")));
        }

        let Some(role) = roles.get_mut(role_id) else {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' does not exist"
            )));
        };

        role.name = name.to_owned();
        Ok(role.clone())
    }

    async fn delete_role(&self, role_id: &str) -> AppResult<()> {
        if self.roles.lock().await.remove(role_id).is_none() {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' does not exist"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fabriq_application::RoleRepository;
    use fabriq_domain::{BuiltInRole, Permission};

    use super::InMemoryRoleRepository;

    #[tokio::test]
    async fn seeded_store_holds_the_built_in_roles() {
        let store = InMemoryRoleRepository::seeded();

        let roles = store.list_roles().await.unwrap_or_default();
        assert_eq!(roles.len(), BuiltInRole::all().len());

        let superadmin = store.find_role_by_name("superadmin").await.unwrap_or_default();
        assert!(superadmin.is_some_and(|role| {
            role.is_built_in && role.permissions.len() == Permission::all().len()
        }));
    }

    #[tokio::test]
    async fn rename_refuses_taken_names() {
        let store = InMemoryRoleRepository::seeded();

        let admin = store.find_role_by_name("admin").await.unwrap_or_default();
        assert!(admin.is_some());
        let Some(admin) = admin else {
            return;
        };

        let result = store.rename_role(&admin.role_id, "staff").await;
        assert!(result.is_err());
    }
}
