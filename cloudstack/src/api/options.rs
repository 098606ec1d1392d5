//! Option hooks applied to request parameters before dispatch

use async_trait::async_trait;

use super::common::{is_id, ApiParams};
use super::error::Result;
use super::Client;

/// Mutates a parameter object before it is sent.
///
/// Hooks skip parameter types that lack the field they set. Returning an
/// error aborts the call before any request is made.
#[async_trait]
pub trait OptionHook: Send + Sync {
    async fn apply(&self, client: &Client, params: &mut dyn ApiParams) -> Result<()>;
}

/// Sets `domainid`, resolving a domain name to its ID first.
#[derive(Debug, Clone)]
pub struct WithDomain {
    domain: String,
}

impl WithDomain {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }
}

#[async_trait]
impl OptionHook for WithDomain {
    async fn apply(&self, client: &Client, params: &mut dyn ApiParams) -> Result<()> {
        if self.domain.is_empty() || params.domain_id_setter().is_none() {
            return Ok(());
        }

        let id = if is_id(&self.domain) {
            self.domain.clone()
        } else {
            client.domain().get_domain_id(&self.domain).await?
        };

        if let Some(setter) = params.domain_id_setter() {
            setter.set_domain_id(id);
        }
        Ok(())
    }
}

/// Sets `projectid`, resolving a project name to its ID first.
#[derive(Debug, Clone)]
pub struct WithProject {
    project: String,
}

impl WithProject {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
        }
    }
}

#[async_trait]
impl OptionHook for WithProject {
    async fn apply(&self, client: &Client, params: &mut dyn ApiParams) -> Result<()> {
        if self.project.is_empty() || params.project_id_setter().is_none() {
            return Ok(());
        }

        let id = if is_id(&self.project) {
            self.project.clone()
        } else {
            client.project().get_project_id(&self.project).await?
        };

        if let Some(setter) = params.project_id_setter() {
            setter.set_project_id(id);
        }
        Ok(())
    }
}

/// Sets `zoneid`, resolving a zone name to its ID first.
#[derive(Debug, Clone)]
pub struct WithZone {
    zone: String,
}

impl WithZone {
    pub fn new(zone: impl Into<String>) -> Self {
        Self { zone: zone.into() }
    }
}

#[async_trait]
impl OptionHook for WithZone {
    async fn apply(&self, client: &Client, params: &mut dyn ApiParams) -> Result<()> {
        if self.zone.is_empty() || params.zone_id_setter().is_none() {
            return Ok(());
        }

        let id = if is_id(&self.zone) {
            self.zone.clone()
        } else {
            client.zone().get_zone_id(&self.zone).await?
        };

        if let Some(setter) = params.zone_id_setter() {
            setter.set_zone_id(id);
        }
        Ok(())
    }
}

/// Sets `vpcid`. No name lookup.
#[derive(Debug, Clone)]
pub struct WithVpcId {
    id: String,
}

impl WithVpcId {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl OptionHook for WithVpcId {
    async fn apply(&self, _client: &Client, params: &mut dyn ApiParams) -> Result<()> {
        if self.id.is_empty() {
            return Ok(());
        }
        if let Some(setter) = params.vpc_id_setter() {
            setter.set_vpc_id(self.id.clone());
        }
        Ok(())
    }
}

/// Hook built from a synchronous closure.
pub struct FnHook<F>(F);

pub fn hook_fn<F>(f: F) -> FnHook<F>
where
    F: Fn(&Client, &mut dyn ApiParams) -> Result<()> + Send + Sync,
{
    FnHook(f)
}

#[async_trait]
impl<F> OptionHook for FnHook<F>
where
    F: Fn(&Client, &mut dyn ApiParams) -> Result<()> + Send + Sync,
{
    async fn apply(&self, client: &Client, params: &mut dyn ApiParams) -> Result<()> {
        (self.0)(client, params)
    }
}
