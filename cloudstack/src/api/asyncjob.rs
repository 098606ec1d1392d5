//! Async job API implementation

use super::common::{ApiParams, ParamBag};
use super::error::Result;
use super::response::decode;
use super::Client;
use serde::Deserialize;
use serde_json::Value;

pub const JOB_STATUS_PENDING: i32 = 0;
pub const JOB_STATUS_SUCCEEDED: i32 = 1;
pub const JOB_STATUS_FAILED: i32 = 2;

#[derive(Debug, Clone)]
pub struct QueryAsyncJobResultParams {
    p: ParamBag,
}

impl QueryAsyncJobResultParams {
    pub fn new(job_id: &str) -> Self {
        let mut p = ParamBag::new();
        p.set("jobid", job_id);
        Self { p }
    }

    pub fn job_id(&self) -> Option<&str> {
        self.p.get_str("jobid")
    }
}

impl ApiParams for QueryAsyncJobResultParams {
    fn to_params(&self) -> ParamBag {
        self.p.clone()
    }
}

/// Status of an async job as reported by `queryAsyncJobResult`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryAsyncJobResultResponse {
    pub accountid: String,
    pub cmd: String,
    pub completed: String,
    pub created: String,
    pub jobid: String,
    pub jobinstanceid: String,
    pub jobinstancetype: String,
    pub jobprocstatus: i32,
    pub jobresult: Value,
    pub jobresultcode: i32,
    pub jobresulttype: String,
    pub jobstatus: i32,
    pub userid: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobFailure {
    /// `jobresulttype` was `text`; the message is the result itself.
    Text(String),
    Payload(Value),
}

impl JobFailure {
    pub fn message(&self) -> String {
        match self {
            JobFailure::Text(text) => text.clone(),
            JobFailure::Payload(payload) => format!("Undefined error: {}", payload),
        }
    }

    pub fn into_payload(self) -> Value {
        match self {
            JobFailure::Text(text) => Value::String(text),
            JobFailure::Payload(payload) => payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Pending,
    Succeeded(Value),
    Failed(JobFailure),
}

impl QueryAsyncJobResultResponse {
    pub fn outcome(self) -> JobOutcome {
        match self.jobstatus {
            JOB_STATUS_SUCCEEDED => JobOutcome::Succeeded(self.jobresult),
            JOB_STATUS_FAILED if self.jobresulttype == "text" => {
                let text = match self.jobresult {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                JobOutcome::Failed(JobFailure::Text(text))
            }
            JOB_STATUS_FAILED => JobOutcome::Failed(JobFailure::Payload(self.jobresult)),
            _ => JobOutcome::Pending,
        }
    }
}

pub struct AsyncJobApi<'a> {
    client: &'a Client,
}

impl<'a> AsyncJobApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Single status query, never awaited.
    pub async fn query_async_job_result(
        &self,
        params: &mut QueryAsyncJobResultParams,
    ) -> Result<QueryAsyncJobResultResponse> {
        let payload = self
            .client
            .execute("queryAsyncJobResult", params, false)
            .await?;
        decode(payload)
    }
}
