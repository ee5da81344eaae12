use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::links::{LinkBuilder, LINK_REL_DEVFILE, LINK_REL_SELF, LINK_REL_WORKSPACE};
use crate::logic::Workspace;
use crate::model::{Devfile, Id, PersistentDevfile, UserDevfile};

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub skip_count: Option<usize>,
    pub max_items: Option<usize>,
}

/// A stored devfile as returned over HTTP. The owner is not exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevfileResponse {
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub devfile: Devfile,
    #[serde(default)]
    pub links: BTreeMap<String, String>,
}

impl DevfileResponse {
    pub fn from_user_devfile(record: UserDevfile, links: &LinkBuilder) -> Self {
        let self_link = links.user_devfile(&record.id);
        Self::with_self_link(record.id, record.devfile, self_link)
    }

    pub fn from_persistent_devfile(record: PersistentDevfile, links: &LinkBuilder) -> Self {
        let self_link = links.devfile(&record.id);
        Self::with_self_link(record.id, record.devfile, self_link)
    }

    fn with_self_link(id: Id, devfile: Devfile, self_link: String) -> Self {
        Self {
            id,
            name: devfile.name().map(str::to_string),
            devfile,
            links: BTreeMap::from([(LINK_REL_SELF.to_string(), self_link)]),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceResponse {
    #[serde(flatten)]
    pub workspace: Workspace,
    pub links: BTreeMap<String, String>,
}

impl WorkspaceResponse {
    pub fn new(workspace: Workspace, links: &LinkBuilder) -> Self {
        let links = BTreeMap::from([
            (LINK_REL_SELF.to_string(), links.workspace(&workspace.id)),
            (LINK_REL_WORKSPACE.to_string(), links.workspace(&workspace.id)),
            (LINK_REL_DEVFILE.to_string(), links.devfile(&workspace.devfile_id)),
        ]);
        Self { workspace, links }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub id: Option<Id>,
    pub name: String,
    pub email: Option<String>,
}
