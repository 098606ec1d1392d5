//! Project API implementation

use super::common::{pick_id, ApiParams, ParamBag, SetDomainId};
use super::error::Result;
use super::response::decode;
use super::Client;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub account: String,
    pub displaytext: String,
    pub domain: String,
    pub domainid: String,
    pub state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListProjectsResponse {
    pub count: usize,
    pub project: Vec<Project>,
}

#[derive(Debug, Clone, Default)]
pub struct ListProjectsParams {
    p: ParamBag,
}

impl ListProjectsParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_account(&mut self, v: &str) {
        self.p.set("account", v);
    }

    pub fn set_id(&mut self, v: &str) {
        self.p.set("id", v);
    }

    pub fn set_isrecursive(&mut self, v: bool) {
        self.p.set_bool("isrecursive", v);
    }

    pub fn set_keyword(&mut self, v: &str) {
        self.p.set("keyword", v);
    }

    pub fn set_listall(&mut self, v: bool) {
        self.p.set_bool("listall", v);
    }

    pub fn set_name(&mut self, v: &str) {
        self.p.set("name", v);
    }

    pub fn set_state(&mut self, v: &str) {
        self.p.set("state", v);
    }

    pub fn set_tags<I, K, V>(&mut self, tags: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.p.set_map("tags", tags);
    }

    pub fn set_page(&mut self, v: i32) {
        self.p.set_int("page", v);
    }

    pub fn set_pagesize(&mut self, v: i32) {
        self.p.set_int("pagesize", v);
    }
}

impl SetDomainId for ListProjectsParams {
    fn set_domain_id(&mut self, id: String) {
        self.p.set("domainid", id);
    }
}

impl ApiParams for ListProjectsParams {
    fn to_params(&self) -> ParamBag {
        self.p.clone()
    }

    fn domain_id_setter(&mut self) -> Option<&mut dyn SetDomainId> {
        Some(self)
    }
}

/// Project API providing project lookups
pub struct ProjectApi<'a> {
    client: &'a Client,
}

impl<'a> ProjectApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET listProjects
    pub async fn list_projects(
        &self,
        params: &mut ListProjectsParams,
    ) -> Result<ListProjectsResponse> {
        let payload = self.client.execute("listProjects", params, false).await?;
        decode(payload)
    }

    /// Resolve a project name to its ID, searching every visible project.
    pub async fn get_project_id(&self, name: &str) -> Result<String> {
        let mut params = ListProjectsParams::new();
        params.set_listall(true);
        params.set_name(name);

        let list = self.list_projects(&mut params).await?;
        pick_id(
            name,
            list.count,
            list.project.iter().map(|p| (p.id.as_str(), p.name.as_str())),
        )
    }
}
