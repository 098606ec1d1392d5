use cloudstack::api::host::ListHostsParams;
use cloudstack::api::WithZone;
use cloudstack::ClientBuilder;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let mut builder = ClientBuilder::from_env()?;
    if let Ok(zone) = std::env::var("CLOUDSTACK_ZONE") {
        builder = builder.option(Arc::new(WithZone::new(zone)));
    }
    let client = builder.build()?;

    let hosts = client.host().list_hosts(&mut ListHostsParams::new()).await?;
    info!("Found {} hosts", hosts.count);
    for host in hosts.host {
        info!(
            "{} ({}) state={} resourcestate={}",
            host.name, host.id, host.state, host.resourcestate
        );
    }

    Ok(())
}
