use std::sync::Arc;

use log::info;

use crate::error::{require_non_empty, Result};
use crate::events::{DevfileCreatedEvent, EventBus};
use crate::model::{Devfile, DevfileRecord, DevfileScope, Page, UserContext, UserDevfile};
use crate::store::DevfileDao;

/// Library of devfiles a user keeps independently of any workspace.
#[derive(Clone)]
pub struct UserDevfileManager {
    dao: Arc<dyn DevfileDao<UserDevfile>>,
    events: EventBus<DevfileCreatedEvent<UserDevfile>>,
}

impl UserDevfileManager {
    pub fn new(
        dao: Arc<dyn DevfileDao<UserDevfile>>,
        events: EventBus<DevfileCreatedEvent<UserDevfile>>,
    ) -> Self {
        Self { dao, events }
    }

    pub fn events(&self) -> &EventBus<DevfileCreatedEvent<UserDevfile>> {
        &self.events
    }

    /// Stores `devfile` under a freshly generated id, owned by `creator`.
    ///
    /// Publishes a [`DevfileCreatedEvent`] once the record is persisted.
    pub async fn create_devfile(
        &self,
        devfile: Devfile,
        creator: &UserContext,
    ) -> Result<UserDevfile> {
        require_non_empty(&creator.user_id, "Owner id")?;
        let record = UserDevfile::new(
            DevfileScope::User.generate_id(),
            Some(creator.user_id.clone()),
            devfile,
        );

        let created = self.dao.create(record).await?;
        info!(
            "UserDevfile '{}' with id '{}' created by user '{}'",
            created.name().unwrap_or_default(),
            created.id,
            creator.user_name
        );
        self.events.publish(DevfileCreatedEvent::new(created.clone()));

        Ok(created)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<UserDevfile> {
        require_non_empty(id, "Devfile id")?;
        self.dao.get_by_id(id).await
    }

    /// Replaces the document stored under `id`. The owner never changes.
    pub async fn update_user_devfile(&self, id: &str, devfile: Devfile) -> Result<UserDevfile> {
        require_non_empty(id, "Devfile id")?;
        self.dao
            .update(UserDevfile::new(id.to_string(), None, devfile))
            .await
    }

    pub async fn remove_user_devfile(&self, id: &str) -> Result<()> {
        require_non_empty(id, "Devfile id")?;
        self.dao.remove(id).await?;
        info!("UserDevfile with id '{}' removed", id);
        Ok(())
    }

    pub async fn get_user_devfiles(
        &self,
        owner_id: &str,
        max_items: usize,
        skip_count: usize,
    ) -> Result<Page<UserDevfile>> {
        self.dao.get_devfiles(owner_id, max_items, skip_count).await
    }
}
