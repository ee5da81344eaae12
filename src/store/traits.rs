use crate::error::Result;
use crate::model::{DevfileRecord, Page, User};

/// Data access contract for one persistence scope of devfile records.
///
/// Every returned record is an independent copy of what was stored.
#[async_trait::async_trait]
pub trait DevfileDao<R: DevfileRecord>: Send + Sync {
    /// Stores a new record and returns the stored copy.
    ///
    /// Fails with `Conflict` when the id or the (owner, name) pair is taken,
    /// or when the owner does not exist.
    async fn create(&self, record: R) -> Result<R>;

    /// Replaces the document of an existing record. The owner is kept.
    ///
    /// Fails with `NotFound` when no record has the given id; never inserts.
    async fn update(&self, record: R) -> Result<R>;

    /// Deletes a record. Removing an unknown id is not an error.
    async fn remove(&self, id: &str) -> Result<()>;

    async fn get_by_id(&self, id: &str) -> Result<R>;

    /// Records owned by `owner_id` in insertion order, plus the owner's total.
    async fn get_devfiles(
        &self,
        owner_id: &str,
        max_items: usize,
        skip_count: usize,
    ) -> Result<Page<R>>;
}

/// Accounts that devfile records refer to.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: User) -> Result<User>;
    /// Creates the user unless one with the same id already exists.
    async fn ensure_user(&self, user: User) -> Result<()>;
    async fn get_user(&self, id: &str) -> Result<User>;
    /// Fails with `Conflict` while devfiles still refer to the user.
    async fn remove_user(&self, id: &str) -> Result<()>;
}

pub(crate) fn validate_page_request(max_items: usize) -> Result<()> {
    if max_items == 0 {
        return Err(crate::error::DevfileError::Validation(
            "The number of items to return must be greater than 0".to_string(),
        ));
    }
    Ok(())
}
