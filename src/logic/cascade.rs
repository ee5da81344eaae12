use std::sync::Arc;

use log::{debug, info};
use parking_lot::RwLock;

use crate::error::{require_non_empty, DevfileError, Result};
use crate::model::{DevfileRecord, User};
use crate::store::{DevfileDao, UserStore};

/// Runs before a user is deleted. An error aborts the deletion.
#[async_trait::async_trait]
pub trait BeforeUserRemoved: Send + Sync {
    async fn on_before_user_removed(&self, user: &User) -> Result<()>;
}

/// Deletes every devfile of one scope owned by the user being removed.
pub struct RemoveDevfilesBeforeUserRemoved<R: DevfileRecord> {
    dao: Arc<dyn DevfileDao<R>>,
    page_size: usize,
}

impl<R: DevfileRecord> RemoveDevfilesBeforeUserRemoved<R> {
    pub fn new(dao: Arc<dyn DevfileDao<R>>, page_size: usize) -> Self {
        Self {
            dao,
            page_size: page_size.max(1),
        }
    }

    /// Removes the owner's devfiles page by page, always reading from offset
    /// zero since each pass shrinks the result set.
    pub async fn remove_devfiles(&self, owner_id: &str) -> Result<usize> {
        let mut removed = 0;
        let mut previous_total: Option<usize> = None;

        loop {
            let page = self.dao.get_devfiles(owner_id, self.page_size, 0).await?;
            if page.is_empty() {
                break;
            }
            if previous_total.map_or(false, |total| page.total_count >= total) {
                return Err(DevfileError::Storage(format!(
                    "Removing devfiles of user '{}' made no progress",
                    owner_id
                )));
            }
            previous_total = Some(page.total_count);

            for record in &page.items {
                self.dao.remove(record.id()).await?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[async_trait::async_trait]
impl<R: DevfileRecord> BeforeUserRemoved for RemoveDevfilesBeforeUserRemoved<R> {
    async fn on_before_user_removed(&self, user: &User) -> Result<()> {
        let removed = self.remove_devfiles(&user.id).await?;
        info!(
            "Removed {} record(s) from '{}' owned by user '{}'",
            removed,
            R::SCOPE.table(),
            user.id
        );
        Ok(())
    }
}

/// Deletes users after running the registered hooks.
pub struct UserRemovalService {
    users: Arc<dyn UserStore>,
    hooks: RwLock<Vec<(String, Arc<dyn BeforeUserRemoved>)>>,
}

impl UserRemovalService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self {
            users,
            hooks: RwLock::new(Vec::new()),
        }
    }

    /// Registers `hook` under `name`, replacing a hook with the same name.
    pub fn subscribe(&self, name: impl Into<String>, hook: Arc<dyn BeforeUserRemoved>) {
        let name = name.into();
        let mut hooks = self.hooks.write();
        hooks.retain(|(existing, _)| *existing != name);
        debug!("Subscribed '{}' to user removal", name);
        hooks.push((name, hook));
    }

    pub fn unsubscribe(&self, name: &str) -> bool {
        let mut hooks = self.hooks.write();
        let before = hooks.len();
        hooks.retain(|(existing, _)| existing != name);
        before != hooks.len()
    }

    pub fn unsubscribe_all(&self) {
        let mut hooks = self.hooks.write();
        for (name, _) in hooks.drain(..) {
            debug!("Unsubscribed '{}' from user removal", name);
        }
    }

    pub fn hook_names(&self) -> Vec<String> {
        self.hooks
            .read()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Runs every hook in registration order, then deletes the user.
    ///
    /// Hooks and the final delete do not share a transaction. If a hook
    /// fails the user is kept, but devfiles already removed by earlier hooks
    /// stay removed; calling again finishes the cascade.
    pub async fn remove_user(&self, id: &str) -> Result<()> {
        require_non_empty(id, "User id")?;
        let user = self.users.get_user(id).await?;

        let hooks: Vec<_> = self.hooks.read().iter().map(|(_, h)| h.clone()).collect();
        for hook in hooks {
            hook.on_before_user_removed(&user).await?;
        }

        self.users.remove_user(id).await?;
        info!("User '{}' removed", id);
        Ok(())
    }
}
