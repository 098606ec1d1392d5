//! Domain API implementation

use super::common::{pick_id, ApiParams, ParamBag};
use super::error::Result;
use super::response::decode;
use super::Client;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Domain {
    pub id: String,
    pub name: String,
    pub haschild: bool,
    pub level: i32,
    pub networkdomain: String,
    pub parentdomainid: String,
    pub parentdomainname: String,
    pub path: String,
    pub state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListDomainsResponse {
    pub count: usize,
    pub domain: Vec<Domain>,
}

#[derive(Debug, Clone, Default)]
pub struct ListDomainsParams {
    p: ParamBag,
}

impl ListDomainsParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_id(&mut self, v: &str) {
        self.p.set("id", v);
    }

    pub fn set_keyword(&mut self, v: &str) {
        self.p.set("keyword", v);
    }

    pub fn set_level(&mut self, v: i32) {
        self.p.set_int("level", v);
    }

    pub fn set_listall(&mut self, v: bool) {
        self.p.set_bool("listall", v);
    }

    pub fn set_name(&mut self, v: &str) {
        self.p.set("name", v);
    }

    pub fn set_page(&mut self, v: i32) {
        self.p.set_int("page", v);
    }

    pub fn set_pagesize(&mut self, v: i32) {
        self.p.set_int("pagesize", v);
    }
}

impl ApiParams for ListDomainsParams {
    fn to_params(&self) -> ParamBag {
        self.p.clone()
    }
}

/// Domain API providing domain lookups
pub struct DomainApi<'a> {
    client: &'a Client,
}

impl<'a> DomainApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET listDomains
    pub async fn list_domains(
        &self,
        params: &mut ListDomainsParams,
    ) -> Result<ListDomainsResponse> {
        let payload = self.client.execute("listDomains", params, false).await?;
        decode(payload)
    }

    /// Resolve a domain name to its ID, searching every visible domain.
    pub async fn get_domain_id(&self, name: &str) -> Result<String> {
        let mut params = ListDomainsParams::new();
        params.set_listall(true);
        params.set_name(name);

        let list = self.list_domains(&mut params).await?;
        pick_id(
            name,
            list.count,
            list.domain.iter().map(|d| (d.id.as_str(), d.name.as_str())),
        )
    }
}
