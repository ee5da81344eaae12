use std::collections::BTreeMap;
use std::sync::Arc;

use log::{info, warn};

use crate::error::{require_non_empty, Result};
use crate::events::{DevfileCreatedEvent, EventBus};
use crate::logic::content::FileContentProvider;
use crate::logic::integrity::{
    generate_name_if_needed, validate_attributes, validate_content_references,
    validate_integrity,
};
use crate::logic::workspace::{Workspace, WorkspaceFactory};
use crate::model::{
    Devfile, DevfileRecord, DevfileScope, Page, PersistentDevfile, UserContext,
};
use crate::store::DevfileDao;

/// Parameters of a workspace created from a devfile.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateWorkspaceRequest {
    pub devfile: Devfile,
    pub namespace: String,
    pub attributes: BTreeMap<String, String>,
    pub start_after_create: bool,
}

/// Devfiles that back workspaces.
#[derive(Clone)]
pub struct DevfileManager {
    dao: Arc<dyn DevfileDao<PersistentDevfile>>,
    workspaces: Arc<dyn WorkspaceFactory>,
    events: EventBus<DevfileCreatedEvent<PersistentDevfile>>,
}

impl DevfileManager {
    pub fn new(
        dao: Arc<dyn DevfileDao<PersistentDevfile>>,
        workspaces: Arc<dyn WorkspaceFactory>,
        events: EventBus<DevfileCreatedEvent<PersistentDevfile>>,
    ) -> Self {
        Self {
            dao,
            workspaces,
            events,
        }
    }

    pub fn events(&self) -> &EventBus<DevfileCreatedEvent<PersistentDevfile>> {
        &self.events
    }

    /// Validates the devfile, persists it for `creator` and builds a workspace
    /// from it.
    ///
    /// Referenced files are fetched through `content`, which callers create
    /// per request. When the workspace cannot be built the persisted devfile
    /// is removed again.
    pub async fn create_workspace(
        &self,
        request: CreateWorkspaceRequest,
        content: &dyn FileContentProvider,
        creator: &UserContext,
    ) -> Result<Workspace> {
        let CreateWorkspaceRequest {
            devfile,
            namespace,
            attributes,
            start_after_create,
        } = request;
        require_non_empty(&namespace, "namespace")?;
        require_non_empty(&creator.user_id, "Owner id")?;
        validate_attributes(&attributes)?;

        let devfile = generate_name_if_needed(devfile)?;
        validate_integrity(&devfile)?;
        validate_content_references(&devfile, content).await?;

        let record = PersistentDevfile::new(
            DevfileScope::Workspace.generate_id(),
            Some(creator.user_id.clone()),
            devfile,
        );
        let created = self.dao.create(record).await?;
        info!(
            "Devfile '{}' with id '{}' created by user '{}'",
            created.name().unwrap_or_default(),
            created.id,
            creator.user_name
        );
        self.events.publish(DevfileCreatedEvent::new(created.clone()));

        let workspace = match self
            .workspaces
            .create_workspace(&created, &namespace, attributes)
            .await
        {
            Ok(workspace) => workspace,
            Err(e) => {
                if let Err(cleanup) = self.dao.remove(&created.id).await {
                    warn!(
                        "Failed to remove devfile '{}' after workspace creation failed: {}",
                        created.id, cleanup
                    );
                }
                return Err(e);
            }
        };

        if start_after_create {
            return self.workspaces.start_workspace(&workspace.id).await;
        }
        Ok(workspace)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<PersistentDevfile> {
        require_non_empty(id, "Devfile id")?;
        self.dao.get_by_id(id).await
    }

    pub async fn get_devfiles(
        &self,
        owner_id: &str,
        max_items: usize,
        skip_count: usize,
    ) -> Result<Page<PersistentDevfile>> {
        self.dao.get_devfiles(owner_id, max_items, skip_count).await
    }

    pub async fn remove_devfile(&self, id: &str) -> Result<()> {
        require_non_empty(id, "Devfile id")?;
        self.dao.remove(id).await?;
        info!("Devfile with id '{}' removed", id);
        Ok(())
    }
}
