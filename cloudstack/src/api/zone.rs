//! Zone API implementation

use super::common::{pick_id, ApiParams, ParamBag, SetDomainId};
use super::error::Result;
use super::response::decode;
use super::Client;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub allocationstate: String,
    pub description: String,
    pub dns1: String,
    pub dns2: String,
    pub domain: String,
    pub domainid: String,
    pub internaldns1: String,
    pub localstorageenabled: bool,
    pub networktype: String,
    pub securitygroupsenabled: bool,
    pub zonetoken: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListZonesResponse {
    pub count: usize,
    pub zone: Vec<Zone>,
}

#[derive(Debug, Clone, Default)]
pub struct ListZonesParams {
    p: ParamBag,
}

impl ListZonesParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&mut self, v: bool) {
        self.p.set_bool("available", v);
    }

    pub fn set_id(&mut self, v: &str) {
        self.p.set("id", v);
    }

    pub fn set_keyword(&mut self, v: &str) {
        self.p.set("keyword", v);
    }

    pub fn set_name(&mut self, v: &str) {
        self.p.set("name", v);
    }

    pub fn set_networktype(&mut self, v: &str) {
        self.p.set("networktype", v);
    }

    pub fn set_showcapacities(&mut self, v: bool) {
        self.p.set_bool("showcapacities", v);
    }

    pub fn set_page(&mut self, v: i32) {
        self.p.set_int("page", v);
    }

    pub fn set_pagesize(&mut self, v: i32) {
        self.p.set_int("pagesize", v);
    }
}

impl SetDomainId for ListZonesParams {
    fn set_domain_id(&mut self, id: String) {
        self.p.set("domainid", id);
    }
}

impl ApiParams for ListZonesParams {
    fn to_params(&self) -> ParamBag {
        self.p.clone()
    }

    fn domain_id_setter(&mut self) -> Option<&mut dyn SetDomainId> {
        Some(self)
    }
}

/// Zone API providing zone lookups
pub struct ZoneApi<'a> {
    client: &'a Client,
}

impl<'a> ZoneApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET listZones
    pub async fn list_zones(&self, params: &mut ListZonesParams) -> Result<ListZonesResponse> {
        let payload = self.client.execute("listZones", params, false).await?;
        decode(payload)
    }

    /// Resolve a zone name to its ID.
    pub async fn get_zone_id(&self, name: &str) -> Result<String> {
        let mut params = ListZonesParams::new();
        params.set_name(name);

        let list = self.list_zones(&mut params).await?;
        pick_id(
            name,
            list.count,
            list.zone.iter().map(|z| (z.id.as_str(), z.name.as_str())),
        )
    }
}
