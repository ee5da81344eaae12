use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use log::info;
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::{DevfileError, Result};
use crate::model::{generate_name, Devfile, DevfileRecord, Id, PersistentDevfile};

/// Attribute carrying the infrastructure namespace a workspace deploys to.
pub const INFRASTRUCTURE_NAMESPACE_ATTRIBUTE: &str = "infrastructureNamespace";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkspaceStatus {
    Stopped,
    Starting,
    Running,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Id,
    pub namespace: String,
    pub devfile_id: Id,
    pub devfile: Devfile,
    pub attributes: BTreeMap<String, String>,
    pub status: WorkspaceStatus,
    pub created_at: DateTime<Utc>,
}

impl Workspace {
    pub fn name(&self) -> Option<&str> {
        self.devfile.name()
    }
}

/// Turns a persisted devfile into a workspace.
#[async_trait::async_trait]
pub trait WorkspaceFactory: Send + Sync {
    async fn create_workspace(
        &self,
        devfile: &PersistentDevfile,
        namespace: &str,
        attributes: BTreeMap<String, String>,
    ) -> Result<Workspace>;

    async fn start_workspace(&self, workspace_id: &str) -> Result<Workspace>;
}

/// Keeps workspaces in process. Starting a workspace only flips its status.
#[derive(Debug, Default)]
pub struct LocalWorkspaceFactory {
    workspaces: RwLock<HashMap<Id, Workspace>>,
}

impl LocalWorkspaceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_workspace(&self, workspace_id: &str) -> Result<Workspace> {
        self.workspaces
            .read()
            .get(workspace_id)
            .cloned()
            .ok_or_else(|| workspace_not_found(workspace_id))
    }
}

#[async_trait::async_trait]
impl WorkspaceFactory for LocalWorkspaceFactory {
    async fn create_workspace(
        &self,
        devfile: &PersistentDevfile,
        namespace: &str,
        attributes: BTreeMap<String, String>,
    ) -> Result<Workspace> {
        let mut workspaces = self.workspaces.write();
        let name = devfile.name();
        let taken = workspaces
            .values()
            .any(|ws| ws.namespace == namespace && ws.name() == name);
        if taken {
            return Err(DevfileError::Conflict(format!(
                "Workspace with name '{}' already exists in namespace '{}'",
                name.unwrap_or_default(),
                namespace
            )));
        }

        let workspace = Workspace {
            id: generate_name("workspace", 16),
            namespace: namespace.to_string(),
            devfile_id: devfile.id().to_string(),
            devfile: devfile.devfile().clone(),
            attributes,
            status: WorkspaceStatus::Stopped,
            created_at: Utc::now(),
        };
        workspaces.insert(workspace.id.clone(), workspace.clone());
        info!(
            "Workspace '{}' created in namespace '{}' from devfile '{}'",
            workspace.id, namespace, workspace.devfile_id
        );

        Ok(workspace)
    }

    async fn start_workspace(&self, workspace_id: &str) -> Result<Workspace> {
        let mut workspaces = self.workspaces.write();
        let workspace = workspaces
            .get_mut(workspace_id)
            .ok_or_else(|| workspace_not_found(workspace_id))?;
        workspace.status = WorkspaceStatus::Running;
        info!("Workspace '{}' started", workspace_id);

        Ok(workspace.clone())
    }
}

fn workspace_not_found(workspace_id: &str) -> DevfileError {
    DevfileError::NotFound(format!("Workspace with id '{}' doesn't exist", workspace_id))
}
