pub mod asyncjob;
pub mod client;
pub mod common;
pub mod config;
pub mod domain;
pub mod encode;
pub mod error;
pub mod host;
pub mod options;
pub mod poller;
pub mod pool;
pub mod project;
pub mod response;
pub mod sign;
pub mod zone;

#[cfg(test)]
mod test_helpers;

pub use asyncjob::{
    AsyncJobApi, JobFailure, JobOutcome, QueryAsyncJobResultParams, QueryAsyncJobResultResponse,
};
pub use client::{Client, Credentials, Dispatch};
pub use common::{
    is_id, ApiParams, ParamBag, ParamValue, SetDomainId, SetProjectId, SetVpcId, SetZoneId,
    SuccessResponse, UNLIMITED_RESOURCE_ID,
};
pub use config::{ClientBuilder, DEFAULT_ASYNC_TIMEOUT};
pub use encode::encode_values;
pub use error::{ApiError, CsError, Result};
pub use options::{hook_fn, FnHook, OptionHook, WithDomain, WithProject, WithVpcId, WithZone};
pub use poller::{AsyncPoller, Backoff};
pub use pool::TransportConfig;
pub use response::{unwrap_envelope, unwrap_value};
pub use sign::sign;
