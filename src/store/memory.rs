use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{require_non_empty, DevfileError, Result};
use crate::model::{Devfile, DevfileRecord, DevfileScope, Id, Page, User};
use crate::store::traits::{validate_page_request, DevfileDao, UserStore};

/// Row of a devfile table, independent of the record type.
#[derive(Clone, Debug)]
struct StoredDevfile {
    id: Id,
    owner: Option<Id>,
    devfile: Devfile,
}

impl StoredDevfile {
    fn name(&self) -> Option<&str> {
        self.devfile.name()
    }

    fn to_record<R: DevfileRecord>(&self) -> R {
        R::from_parts(self.id.clone(), self.owner.clone(), self.devfile.clone())
    }
}

#[derive(Debug, Default)]
struct Table {
    /// Rows keyed by insertion sequence.
    rows: BTreeMap<u64, StoredDevfile>,
    by_id: HashMap<Id, u64>,
}

impl Table {
    /// Ownerless rows never collide, like NULLs in a unique constraint.
    fn name_taken(&self, owner: Option<&str>, name: Option<&str>, except_id: Option<&str>) -> bool {
        let (Some(owner), Some(name)) = (owner, name) else {
            return false;
        };
        self.rows.values().any(|row| {
            row.owner.as_deref() == Some(owner)
                && row.name() == Some(name)
                && Some(row.id.as_str()) != except_id
        })
    }

    fn owned_by<'a>(&'a self, owner_id: &'a str) -> impl Iterator<Item = &'a StoredDevfile> + 'a {
        self.rows
            .values()
            .filter(move |row| row.owner.as_deref() == Some(owner_id))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<Id, User>,
    tables: HashMap<DevfileScope, Table>,
    next_seq: u64,
}

impl MemoryState {
    fn table(&self, scope: DevfileScope) -> Option<&Table> {
        self.tables.get(&scope)
    }

    fn table_mut(&mut self, scope: DevfileScope) -> &mut Table {
        self.tables.entry(scope).or_default()
    }
}

/// In-process store with the same semantics as the relational one.
///
/// Every operation takes the single state lock, which stands in for the
/// per-operation transaction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data access object for one record scope, sharing this store's state.
    pub fn devfiles<R: DevfileRecord>(&self) -> InMemoryDevfileDao<R> {
        InMemoryDevfileDao {
            state: Arc::clone(&self.state),
            _record: PhantomData,
        }
    }
}

pub struct InMemoryDevfileDao<R> {
    state: Arc<RwLock<MemoryState>>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for InMemoryDevfileDao<R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            _record: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<R: DevfileRecord> DevfileDao<R> for InMemoryDevfileDao<R> {
    async fn create(&self, record: R) -> Result<R> {
        require_non_empty(record.id(), "Devfile id")?;
        let mut state = self.state.write().await;

        if let Some(owner) = record.owner() {
            if !state.users.contains_key(owner) {
                return Err(DevfileError::Conflict(
                    "Could not create devfile with creator that refers on non-existent user"
                        .to_string(),
                ));
            }
        }

        let seq = state.next_seq;
        let table = state.table_mut(R::SCOPE);
        if table.by_id.contains_key(record.id()) {
            return Err(DevfileError::Conflict(format!(
                "Devfile with id '{}' already exists",
                record.id()
            )));
        }
        if table.name_taken(record.owner(), record.name(), None) {
            return Err(name_conflict(record.name()));
        }

        let (id, owner, devfile) = record.into_parts();
        let row = StoredDevfile { id, owner, devfile };
        let created: R = row.to_record();
        table.by_id.insert(row.id.clone(), seq);
        table.rows.insert(seq, row);
        state.next_seq += 1;

        Ok(created)
    }

    async fn update(&self, record: R) -> Result<R> {
        require_non_empty(record.id(), "Devfile id")?;
        let mut state = self.state.write().await;
        let table = state.table_mut(R::SCOPE);

        let Some(seq) = table.by_id.get(record.id()).copied() else {
            return Err(DevfileError::NotFound(format!(
                "Could not update devfile with id {} because it doesn't exist",
                record.id()
            )));
        };
        let owner = table.rows[&seq].owner.clone();
        if table.name_taken(owner.as_deref(), record.name(), Some(record.id())) {
            return Err(name_conflict(record.name()));
        }

        let (_, _, devfile) = record.into_parts();
        let row = table
            .rows
            .get_mut(&seq)
            .ok_or_else(|| DevfileError::Storage("Devfile index is inconsistent".to_string()))?;
        row.devfile = devfile;

        Ok(row.to_record::<R>())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        require_non_empty(id, "Devfile id")?;
        let mut state = self.state.write().await;
        let table = state.table_mut(R::SCOPE);
        if let Some(seq) = table.by_id.remove(id) {
            table.rows.remove(&seq);
        }
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<R> {
        require_non_empty(id, "Devfile id")?;
        let state = self.state.read().await;
        state
            .table(R::SCOPE)
            .and_then(|table| table.by_id.get(id).and_then(|seq| table.rows.get(seq)))
            .map(StoredDevfile::to_record::<R>)
            .ok_or_else(|| DevfileError::not_found_by_id(id))
    }

    async fn get_devfiles(
        &self,
        owner_id: &str,
        max_items: usize,
        skip_count: usize,
    ) -> Result<Page<R>> {
        require_non_empty(owner_id, "Owner id")?;
        validate_page_request(max_items)?;
        let state = self.state.read().await;
        let Some(table) = state.table(R::SCOPE) else {
            return Ok(Page::new(Vec::new(), skip_count, max_items, 0));
        };

        let items: Vec<R> = table
            .owned_by(owner_id)
            .skip(skip_count)
            .take(max_items)
            .map(StoredDevfile::to_record::<R>)
            .collect();
        let total = table.owned_by(owner_id).count();

        Ok(Page::new(items, skip_count, max_items, total))
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: User) -> Result<User> {
        require_non_empty(&user.id, "User id")?;
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.id) {
            return Err(DevfileError::Conflict(format!(
                "User with id '{}' already exists",
                user.id
            )));
        }
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn ensure_user(&self, user: User) -> Result<()> {
        require_non_empty(&user.id, "User id")?;
        let mut state = self.state.write().await;
        state.users.entry(user.id.clone()).or_insert(user);
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        require_non_empty(id, "User id")?;
        let state = self.state.read().await;
        state
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| DevfileError::NotFound(format!("User with id '{}' doesn't exist", id)))
    }

    async fn remove_user(&self, id: &str) -> Result<()> {
        require_non_empty(id, "User id")?;
        let mut state = self.state.write().await;
        let still_owns = state
            .tables
            .values()
            .any(|table| table.owned_by(id).next().is_some());
        if still_owns {
            return Err(DevfileError::Conflict(format!(
                "User '{}' still owns devfiles",
                id
            )));
        }
        state.users.remove(id);
        Ok(())
    }
}

fn name_conflict(name: Option<&str>) -> DevfileError {
    DevfileError::Conflict(format!(
        "Devfile with name '{}' already exists for current user",
        name.unwrap_or_default()
    ))
}
