use crate::model::{generate_name, Devfile, Id};

/// Persistence scope a record lives in. Each scope has its own table and
/// id prefix but identical storage semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DevfileScope {
    /// Standalone entries of a user's devfile library.
    User,
    /// Devfiles embedded in workspaces.
    Workspace,
}

impl DevfileScope {
    pub fn table(&self) -> &'static str {
        match self {
            DevfileScope::User => "user_devfiles",
            DevfileScope::Workspace => "persistent_devfiles",
        }
    }

    pub fn id_prefix(&self) -> &'static str {
        match self {
            DevfileScope::User => "usrdevfile",
            DevfileScope::Workspace => "devfile",
        }
    }

    pub fn generate_id(&self) -> Id {
        generate_name(self.id_prefix(), 16)
    }
}

/// Storage identity wrapped around a [`Devfile`].
///
/// Records are plain values: data access objects hand out clones, so a
/// caller mutating a returned record never touches stored state.
pub trait DevfileRecord: Clone + std::fmt::Debug + PartialEq + Send + Sync + 'static {
    const SCOPE: DevfileScope;

    fn from_parts(id: Id, owner: Option<Id>, devfile: Devfile) -> Self;
    fn into_parts(self) -> (Id, Option<Id>, Devfile);

    fn id(&self) -> &str;
    fn owner(&self) -> Option<&str>;
    fn devfile(&self) -> &Devfile;

    /// Natural key component; unique per owner.
    fn name(&self) -> Option<&str> {
        self.devfile().name()
    }
}

/// Entry of a user's devfile library.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDevfile {
    pub id: Id,
    pub owner: Option<Id>,
    pub devfile: Devfile,
}

impl UserDevfile {
    pub fn new(id: Id, owner: Option<Id>, devfile: Devfile) -> Self {
        Self { id, owner, devfile }
    }
}

impl DevfileRecord for UserDevfile {
    const SCOPE: DevfileScope = DevfileScope::User;

    fn from_parts(id: Id, owner: Option<Id>, devfile: Devfile) -> Self {
        Self::new(id, owner, devfile)
    }

    fn into_parts(self) -> (Id, Option<Id>, Devfile) {
        (self.id, self.owner, self.devfile)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    fn devfile(&self) -> &Devfile {
        &self.devfile
    }
}

/// Devfile stored as part of a workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistentDevfile {
    pub id: Id,
    pub owner: Option<Id>,
    pub devfile: Devfile,
}

impl PersistentDevfile {
    pub fn new(id: Id, owner: Option<Id>, devfile: Devfile) -> Self {
        Self { id, owner, devfile }
    }
}

impl DevfileRecord for PersistentDevfile {
    const SCOPE: DevfileScope = DevfileScope::Workspace;

    fn from_parts(id: Id, owner: Option<Id>, devfile: Devfile) -> Self {
        Self::new(id, owner, devfile)
    }

    fn into_parts(self) -> (Id, Option<Id>, Devfile) {
        (self.id, self.owner, self.devfile)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    fn devfile(&self) -> &Devfile {
        &self.devfile
    }
}
