use crate::{
    client::{Client, HttpTransport, Transport},
    config::{BridgeParams, TapParams},
    coordinator::Coordinator,
    linktap::{Auth, DevicesCmd, Endpoint, Reply},
};
use linktap_api::{driver::PropertySink, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// The account all valves are registered with. It holds the
/// credentials and the connection shared by every valve's
/// coordinator.
pub struct Bridge<T = HttpTransport> {
    client: Arc<Client<T>>,
}

impl Bridge<HttpTransport> {
    pub fn new(cfg: &BridgeParams) -> Result<Self> {
        Ok(Bridge::with_transport(cfg, HttpTransport::new(cfg.timeout())?))
    }
}

impl<T: Transport> Bridge<T> {
    pub fn with_transport(cfg: &BridgeParams, transport: T) -> Self {
        let auth = Auth {
            username: cfg.username.clone(),
            api_key: cfg.api_key.clone(),
        };

        Bridge {
            client: Arc::new(Client::new(transport, cfg.base_url(), auth)),
        }
    }

    /// Asks for the account's device list to see if the service can
    /// be reached with our credentials. This is only informational;
    /// valves are started either way.
    pub async fn probe(&self) -> bool {
        match self.client.send(Endpoint::AllDevices, &DevicesCmd {}).await {
            Ok(Reply::Ok(_)) => {
                info!("LinkTap account is online");
                true
            }
            Ok(Reply::Rejected(msg)) => {
                warn!(
                    "LinkTap account is offline : {}",
                    msg.as_deref().unwrap_or("request rejected")
                );
                false
            }
            Ok(Reply::Empty) => {
                warn!("LinkTap account is offline : empty reply");
                false
            }
            Err(e) => {
                warn!("LinkTap account is offline : {}", e);
                false
            }
        }
    }

    /// Creates the coordinator of one valve.
    pub fn tap<S: PropertySink>(
        &self,
        cfg: &TapParams,
        sink: S,
    ) -> Coordinator<T, S> {
        Coordinator::new(self.client.clone(), cfg, sink)
    }
}
