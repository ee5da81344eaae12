use itertools::Itertools;

use crate::model::{Page, PageRef};

pub const LINK_REL_SELF: &str = "self";
pub const LINK_REL_DEVFILE: &str = "devfile";
pub const LINK_REL_WORKSPACE: &str = "workspace";

/// Builds hypermedia links. Links are relative unless an API endpoint is
/// configured.
#[derive(Debug, Clone, Default)]
pub struct LinkBuilder {
    base: String,
}

impl LinkBuilder {
    pub fn new(api_endpoint: Option<&str>) -> Self {
        Self {
            base: api_endpoint
                .map(|endpoint| endpoint.trim_end_matches('/').to_string())
                .unwrap_or_default(),
        }
    }

    pub fn resource(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base, collection, id)
    }

    pub fn user_devfile(&self, id: &str) -> String {
        self.resource("userdevfile", id)
    }

    pub fn devfile(&self, id: &str) -> String {
        self.resource("devfile", id)
    }

    pub fn workspace(&self, id: &str) -> String {
        self.resource("workspace", id)
    }

    fn page(&self, collection: &str, page_ref: PageRef) -> String {
        format!(
            "{}/{}?skipCount={}&maxItems={}",
            self.base, collection, page_ref.skip_count, page_ref.page_size
        )
    }

    /// `Link` header value with `first`, `prev`, `next` and `last` relations.
    pub fn page_header<T>(&self, collection: &str, page: &Page<T>) -> String {
        let mut relations = vec![("first", page.first_page_ref())];
        if let Some(prev) = page.previous_page_ref() {
            relations.push(("prev", prev));
        }
        if let Some(next) = page.next_page_ref() {
            relations.push(("next", next));
        }
        relations.push(("last", page.last_page_ref()));

        relations
            .into_iter()
            .map(|(rel, page_ref)| format!("<{}>; rel=\"{}\"", self.page(collection, page_ref), rel))
            .join(", ")
    }
}
