//! Host API implementation

use super::common::{pick_id, ApiParams, ParamBag, SetZoneId, SuccessResponse};
use super::error::Result;
use super::Client;
use serde::Deserialize;

/// Host as returned by the host commands.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Host {
    pub id: String,
    pub name: String,
    pub clusterid: String,
    pub clustername: String,
    pub clustertype: String,
    pub cpunumber: i32,
    pub created: String,
    pub disconnected: String,
    pub hypervisor: String,
    pub ipaddress: String,
    pub jobid: String,
    pub jobstatus: i32,
    pub lastpinged: String,
    pub managementserverid: String,
    pub podid: String,
    pub podname: String,
    pub resourcestate: String,
    pub state: String,
    #[serde(rename = "type")]
    pub host_type: String,
    pub version: String,
    pub zoneid: String,
    pub zonename: String,
}

pub type AddHostResponse = Host;
pub type PrepareHostForMaintenanceResponse = Host;
pub type CancelHostMaintenanceResponse = Host;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListHostsResponse {
    pub count: usize,
    pub host: Vec<Host>,
}

#[derive(Debug, Clone)]
pub struct AddHostParams {
    p: ParamBag,
}

impl AddHostParams {
    pub fn new(hypervisor: &str, podid: &str, url: &str, zoneid: &str) -> Self {
        let mut p = ParamBag::new();
        p.set("hypervisor", hypervisor)
            .set("podid", podid)
            .set("url", url)
            .set("zoneid", zoneid);
        Self { p }
    }

    pub fn set_allocationstate(&mut self, v: &str) {
        self.p.set("allocationstate", v);
    }

    pub fn set_clusterid(&mut self, v: &str) {
        self.p.set("clusterid", v);
    }

    pub fn set_clustername(&mut self, v: &str) {
        self.p.set("clustername", v);
    }

    pub fn set_hosttags(&mut self, v: &[&str]) {
        self.p.set_list("hosttags", v.iter().copied());
    }

    pub fn set_username(&mut self, v: &str) {
        self.p.set("username", v);
    }

    pub fn set_password(&mut self, v: &str) {
        self.p.set("password", v);
    }
}

impl SetZoneId for AddHostParams {
    fn set_zone_id(&mut self, id: String) {
        self.p.set("zoneid", id);
    }
}

impl ApiParams for AddHostParams {
    fn to_params(&self) -> ParamBag {
        self.p.clone()
    }

    fn zone_id_setter(&mut self) -> Option<&mut dyn SetZoneId> {
        Some(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListHostsParams {
    p: ParamBag,
}

impl ListHostsParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_id(&mut self, v: &str) {
        self.p.set("id", v);
    }

    pub fn set_name(&mut self, v: &str) {
        self.p.set("name", v);
    }

    pub fn set_clusterid(&mut self, v: &str) {
        self.p.set("clusterid", v);
    }

    pub fn set_podid(&mut self, v: &str) {
        self.p.set("podid", v);
    }

    pub fn set_hypervisor(&mut self, v: &str) {
        self.p.set("hypervisor", v);
    }

    pub fn set_resourcestate(&mut self, v: &str) {
        self.p.set("resourcestate", v);
    }

    pub fn set_state(&mut self, v: &str) {
        self.p.set("state", v);
    }

    pub fn set_type(&mut self, v: &str) {
        self.p.set("type", v);
    }

    pub fn set_keyword(&mut self, v: &str) {
        self.p.set("keyword", v);
    }

    pub fn set_page(&mut self, v: i32) {
        self.p.set_int("page", v);
    }

    pub fn set_pagesize(&mut self, v: i32) {
        self.p.set_int("pagesize", v);
    }
}

impl SetZoneId for ListHostsParams {
    fn set_zone_id(&mut self, id: String) {
        self.p.set("zoneid", id);
    }
}

impl ApiParams for ListHostsParams {
    fn to_params(&self) -> ParamBag {
        self.p.clone()
    }

    fn zone_id_setter(&mut self) -> Option<&mut dyn SetZoneId> {
        Some(self)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteHostParams {
    p: ParamBag,
}

impl DeleteHostParams {
    pub fn new(id: &str) -> Self {
        let mut p = ParamBag::new();
        p.set("id", id);
        Self { p }
    }

    pub fn set_forced(&mut self, v: bool) {
        self.p.set_bool("forced", v);
    }

    pub fn set_forcedestroylocalstorage(&mut self, v: bool) {
        self.p.set_bool("forcedestroylocalstorage", v);
    }
}

impl ApiParams for DeleteHostParams {
    fn to_params(&self) -> ParamBag {
        self.p.clone()
    }
}

/// Parameters for the maintenance commands, which take only a host ID.
#[derive(Debug, Clone)]
pub struct HostMaintenanceParams {
    p: ParamBag,
}

impl HostMaintenanceParams {
    pub fn new(id: &str) -> Self {
        let mut p = ParamBag::new();
        p.set("id", id);
        Self { p }
    }
}

impl ApiParams for HostMaintenanceParams {
    fn to_params(&self) -> ParamBag {
        self.p.clone()
    }
}

pub type PrepareHostForMaintenanceParams = HostMaintenanceParams;
pub type CancelHostMaintenanceParams = HostMaintenanceParams;

/// Host API providing hypervisor host operations
pub struct HostApi<'a> {
    client: &'a Client,
}

impl<'a> HostApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// POST addHost
    pub async fn add_host(&self, params: &mut AddHostParams) -> Result<AddHostResponse> {
        let payload = self.client.execute("addHost", params, true).await?;
        self.client.decode_entity(payload)
    }

    /// GET listHosts
    pub async fn list_hosts(&self, params: &mut ListHostsParams) -> Result<ListHostsResponse> {
        let payload = self.client.execute("listHosts", params, false).await?;
        super::response::decode(payload)
    }

    /// GET deleteHost
    pub async fn delete_host(&self, params: &mut DeleteHostParams) -> Result<SuccessResponse> {
        let payload = self.client.execute("deleteHost", params, false).await?;
        super::response::decode(payload)
    }

    /// GET prepareHostForMaintenance (async job)
    pub async fn prepare_host_for_maintenance(
        &self,
        params: &mut PrepareHostForMaintenanceParams,
    ) -> Result<PrepareHostForMaintenanceResponse> {
        let payload = self
            .client
            .execute("prepareHostForMaintenance", params, false)
            .await?;
        self.client.complete_async(payload, true).await
    }

    /// GET cancelHostMaintenance (async job)
    pub async fn cancel_host_maintenance(
        &self,
        params: &mut CancelHostMaintenanceParams,
    ) -> Result<CancelHostMaintenanceResponse> {
        let payload = self
            .client
            .execute("cancelHostMaintenance", params, false)
            .await?;
        self.client.complete_async(payload, true).await
    }

    /// Resolve a host name to its ID.
    pub async fn get_host_id(&self, name: &str) -> Result<String> {
        let mut params = ListHostsParams::new();
        params.set_name(name);

        let list = self.list_hosts(&mut params).await?;
        pick_id(
            name,
            list.count,
            list.host.iter().map(|h| (h.id.as_str(), h.name.as_str())),
        )
    }
}

#[cfg(test)]
#[path = "./host_test.rs"]
mod host_test;
