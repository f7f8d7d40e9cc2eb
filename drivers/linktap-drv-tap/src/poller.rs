use crate::{
    client::{Client, Transport},
    limiter::Throttle,
    linktap::{Endpoint, Reply, StatusCmd},
};
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};

/// The watering status returned by one poll. Counters are in minutes.
/// A failed poll has `success` cleared and zeroed counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub success: bool,
    pub remaining_duration_minutes: i64,
    pub total_time_minutes: i64,
    pub eco_total_minutes: i64,
}

/// Fetches the watering status of one valve, no more often than the
/// refresh interval allows.
pub struct StatusPoller {
    taplinker_id: Arc<str>,
    throttle: Throttle,
}

impl StatusPoller {
    pub fn new(taplinker_id: Arc<str>, refresh: Duration) -> Self {
        StatusPoller {
            taplinker_id,
            throttle: Throttle::new(refresh),
        }
    }

    /// Polls the service for the valve's status. Returns `None`,
    /// without touching the network, if the previous poll was less
    /// than a refresh interval ago.
    ///
    /// The polling slot is used up before the request is sent, so a
    /// slow or failed request still waits for the next interval.
    pub async fn poll<T: Transport>(
        &mut self,
        client: &Client<T>,
    ) -> Option<Snapshot> {
        if !self.throttle.try_acquire(Instant::now()) {
            debug!("status poll suppressed; too soon after the last one");
            return None;
        }

        let cmd = StatusCmd {
            taplinker_id: self.taplinker_id.clone(),
        };

        Some(match client.send(Endpoint::WateringStatus, &cmd).await {
            Ok(Reply::Ok(Some(status))) => Snapshot {
                success: true,
                remaining_duration_minutes: status.on_duration.0,
                total_time_minutes: status.total.0,
                eco_total_minutes: status.eco_total.map_or(0, |v| v.0),
            },

            // A null status means the valve isn't watering.
            Ok(Reply::Ok(None)) => Snapshot {
                success: true,
                ..Snapshot::default()
            },

            Ok(Reply::Empty) => {
                debug!("status request returned an empty reply");
                Snapshot::default()
            }

            Ok(Reply::Rejected(msg)) => {
                warn!(
                    "status request rejected : {}",
                    msg.as_deref().unwrap_or("no reason given")
                );
                Snapshot::default()
            }

            Err(e) => {
                warn!("status request failed : {}", e);
                Snapshot::default()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;
    use linktap_api::Error;

    fn mk_poller() -> StatusPoller {
        StatusPoller::new("T1".into(), Duration::from_secs(60))
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit() {
        let client = mock::client();
        let mut poller = mk_poller();

        client.transport().push_reply(r#"{"result":"ok","status":null}"#);

        assert!(poller.poll(&client).await.is_some());

        // A second poll inside the interval makes no request. Callers
        // that want the zeroed snapshot get an unsuccessful one.

        tokio::time::advance(Duration::from_secs(59)).await;

        let snap = poller.poll(&client).await;

        assert_eq!(snap, None);
        assert!(!snap.unwrap_or_default().success);
        assert_eq!(snap.unwrap_or_default(), Snapshot::default());
        assert_eq!(client.transport().calls().len(), 1);

        // Once the interval passes, the next poll goes out.

        tokio::time::advance(Duration::from_secs(1)).await;

        assert!(poller.poll(&client).await.is_some());
        assert_eq!(client.transport().calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_poll_uses_slot() {
        let client = mock::client();
        let mut poller = mk_poller();

        client.transport().push_error(Error::TimeoutError);

        assert_eq!(poller.poll(&client).await, Some(Snapshot::default()));
        assert_eq!(poller.poll(&client).await, None);
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshots() {
        let client = mock::client();
        let replies = [
            (
                r#"{"result":"ok","status":{"onDuration":5,"total":20}}"#,
                Snapshot {
                    success: true,
                    remaining_duration_minutes: 5,
                    total_time_minutes: 20,
                    eco_total_minutes: 0,
                },
            ),
            (
                r#"{"result":"ok","status":{"onDuration":5,"total":20,"ecoTotal":7}}"#,
                Snapshot {
                    success: true,
                    remaining_duration_minutes: 5,
                    total_time_minutes: 20,
                    eco_total_minutes: 7,
                },
            ),
            (
                r#"{"result":"ok","status":null}"#,
                Snapshot {
                    success: true,
                    ..Snapshot::default()
                },
            ),
            ("", Snapshot::default()),
            (r#"{"result":"fail","message":"x"}"#, Snapshot::default()),
            (r#"{"status":{}}"#, Snapshot::default()),
        ];

        for (body, expected) in replies {
            let mut poller = mk_poller();

            client.transport().push_reply(body);
            assert_eq!(poller.poll(&client).await, Some(expected), "{}", body);
        }

        // Every request names the valve.

        for (url, body) in client.transport().calls() {
            assert!(url.ends_with("getWateringStatus"));
            assert_eq!(body["taplinkerId"], "T1");
        }
    }
}
