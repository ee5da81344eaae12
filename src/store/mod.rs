pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::*;
pub use postgres::*;
pub use traits::*;

use std::sync::Arc;

use crate::model::{PersistentDevfile, UserDevfile};

/// The data access objects of one storage backend.
#[derive(Clone)]
pub struct Stores {
    pub user_devfiles: Arc<dyn DevfileDao<UserDevfile>>,
    pub devfiles: Arc<dyn DevfileDao<PersistentDevfile>>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self::from_memory(&InMemoryStore::new())
    }

    pub fn from_memory(store: &InMemoryStore) -> Self {
        Self {
            user_devfiles: Arc::new(store.devfiles::<UserDevfile>()),
            devfiles: Arc::new(store.devfiles::<PersistentDevfile>()),
            users: Arc::new(store.clone()),
        }
    }

    pub fn postgres(store: &PostgresStore) -> Self {
        Self {
            user_devfiles: Arc::new(store.devfiles::<UserDevfile>()),
            devfiles: Arc::new(store.devfiles::<PersistentDevfile>()),
            users: Arc::new(store.clone()),
        }
    }
}
