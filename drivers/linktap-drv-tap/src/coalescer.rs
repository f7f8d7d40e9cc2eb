// Mode changes aren't sent as they arrive. A change only raises a
// flag; a periodic tick turns the flag into a single request built
// from the latest state. Several changes between ticks result in one
// request.

use crate::{
    client::{Client, Transport},
    limiter::Throttle,
    linktap::{ModeCmd, Reply},
    model::DeviceState,
};
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct CommandCoalescer {
    dirty: bool,
    throttle: Throttle,
    gateway_id: Arc<str>,
    taplinker_id: Arc<str>,
}

impl CommandCoalescer {
    pub fn new(
        gateway_id: Arc<str>,
        taplinker_id: Arc<str>,
        interval: Duration,
    ) -> Self {
        CommandCoalescer {
            dirty: false,
            throttle: Throttle::new(interval),
            gateway_id,
            taplinker_id,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Decides whether a request should go out now and, if so, builds
    /// it. Taking a request clears the dirty flag and starts a new
    /// mode-change interval whether or not the request succeeds.
    ///
    /// A running valve in an unknown mode has nothing to send; the
    /// change is consumed without a request.
    pub fn take_dispatch(
        &mut self,
        state: &DeviceState,
        now: Instant,
    ) -> Option<ModeCmd> {
        if !self.dirty || !self.throttle.is_ready(now) {
            return None;
        }

        self.dirty = false;
        self.throttle.stamp(now);

        if state.running {
            let cmd = ModeCmd::mk_activate(
                self.gateway_id.clone(),
                self.taplinker_id.clone(),
                state,
            );

            if cmd.is_none() {
                warn!("mode {} can't be activated; change dropped", state.mode)
            }
            cmd
        } else {
            Some(ModeCmd::mk_deactivate(
                self.gateway_id.clone(),
                self.taplinker_id.clone(),
            ))
        }
    }

    /// Sends a mode-change request. Returns `true` only if the service
    /// accepted it. Failures are logged and otherwise dropped.
    pub async fn send<T: Transport>(client: &Client<T>, cmd: &ModeCmd) -> bool {
        match client.send(cmd.endpoint, cmd).await {
            Ok(Reply::Ok(_)) => {
                info!("{} accepted", cmd.endpoint);
                true
            }
            Ok(Reply::Empty) => {
                debug!("{} returned an empty reply", cmd.endpoint);
                false
            }
            Ok(Reply::Rejected(msg)) => {
                warn!(
                    "{} rejected : {}",
                    cmd.endpoint,
                    msg.as_deref().unwrap_or("no reason given")
                );
                false
            }
            Err(e) => {
                warn!("{} failed : {}", cmd.endpoint, e);
                false
            }
        }
    }

    /// Dispatches the latest state if it changed and the mode-change
    /// interval has passed. Does nothing when the state is clean.
    ///
    /// This is the form for a caller that owns both the coalescer and
    /// the state. A caller that shares them behind a lock does the same
    /// two steps itself: `take_dispatch()` while holding the lock and
    /// `send()` after releasing it.
    pub async fn tick<T: Transport>(
        &mut self,
        state: &DeviceState,
        client: &Client<T>,
    ) -> bool {
        match self.take_dispatch(state, Instant::now()) {
            Some(cmd) => CommandCoalescer::send(client, &cmd).await,
            None => false,
        }
    }
}
