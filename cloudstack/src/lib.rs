//! Client SDK core for the Apache CloudStack API.
//!
//! Commands are signed with the account's API key and secret and sent over
//! HTTP. Commands that start async jobs either return the job ID straight
//! away or, for clients built in async mode, wait for the job to finish.
//!
//! ```no_run
//! use cloudstack::api::host::ListHostsParams;
//! use cloudstack::Client;
//!
//! # async fn run() -> cloudstack::Result<()> {
//! let client = Client::new("https://cloud.example.com/client/api", "key", "secret", true)?;
//! let hosts = client.host().list_hosts(&mut ListHostsParams::new()).await?;
//! println!("{} hosts", hosts.count);
//! # Ok(())
//! # }
//! ```

pub mod api;

pub use api::{ApiError, Client, ClientBuilder, Result};
