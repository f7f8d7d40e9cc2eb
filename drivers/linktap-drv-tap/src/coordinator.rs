// The coordinator manages one valve. It turns host commands into
// changes of the valve's desired state and turns polled status into
// property updates. Three activities share it: the status poll, the
// dispatch tick, and the command handler. The desired state and the
// dirty flag sit behind one mutex which is never held while waiting
// on the network.

use crate::{
    channel::Channel,
    client::{Client, Transport},
    coalescer::CommandCoalescer,
    config::TapParams,
    model::{DeviceState, Mode},
    poller::StatusPoller,
};
use linktap_api::{
    driver::{Command, CommandSource, PropertySink},
    Error, Result, TimeUnit, Value,
};
use std::{convert::Infallible, sync::Arc};
use tokio::{
    sync::Mutex,
    time::{self, Duration, Instant},
};
use tracing::{debug, info, warn};

struct Control {
    state: DeviceState,
    coalescer: CommandCoalescer,
}

struct Monitor {
    poller: StatusPoller,
    reported_error: Option<bool>,
}

pub struct Coordinator<T, S> {
    client: Arc<Client<T>>,
    sink: S,
    refresh: Duration,
    tick: Duration,
    control: Mutex<Control>,
    monitor: Mutex<Monitor>,
}

fn read_only(ch: Channel) -> Error {
    Error::InvArgument(format!("'{}' is read-only", ch))
}

// Converts a duration setting to a number of seconds the valve can
// use.

fn to_secs(value: &Value) -> Result<u32> {
    let secs = value.as_seconds()?;

    if secs < 0 {
        Err(Error::InvArgument(format!("negative duration: {}", value)))
    } else {
        u32::try_from(secs).map_err(|_| {
            Error::InvArgument(format!("duration too long: {}", value))
        })
    }
}

impl<T: Transport, S: PropertySink> Coordinator<T, S> {
    pub fn new(client: Arc<Client<T>>, cfg: &TapParams, sink: S) -> Self {
        Coordinator {
            client,
            sink,
            refresh: cfg.refresh_interval(),
            tick: cfg.dispatch_tick(),
            control: Mutex::new(Control {
                state: DeviceState::default(),
                coalescer: CommandCoalescer::new(
                    cfg.gateway_id.clone(),
                    cfg.tap_id.clone(),
                    cfg.mode_change_interval(),
                ),
            }),
            monitor: Mutex::new(Monitor {
                poller: StatusPoller::new(
                    cfg.tap_id.clone(),
                    cfg.refresh_interval(),
                ),
                reported_error: None,
            }),
        }
    }

    /// Returns a copy of the valve's desired state.
    pub async fn state(&self) -> DeviceState {
        self.control.lock().await.state.clone()
    }

    pub async fn is_dirty(&self) -> bool {
        self.control.lock().await.coalescer.is_dirty()
    }

    // Applies a setting to the desired state and returns the value
    // that was used.

    fn apply(state: &mut DeviceState, ch: Channel, value: Value) -> Result<Value> {
        match ch {
            Channel::Mode => {
                let name = String::try_from(value)?;
                let mode = Mode::from_name(&name);

                if mode == Mode::Unknown {
                    warn!("unrecognized mode '{}'", name)
                }
                state.set_mode(mode);
                Ok(Value::from(mode.as_str()))
            }
            Channel::Running => {
                let v = bool::try_from(value)?;

                state.set_running(v);
                Ok(v.into())
            }
            Channel::EcoMode => {
                let v = bool::try_from(value)?;

                state.set_eco_mode(v);
                Ok(v.into())
            }
            Channel::AutoBack => {
                let v = bool::try_from(value)?;

                state.set_auto_back(v);
                Ok(v.into())
            }
            Channel::OnDuration => {
                let v = to_secs(&value)?;

                state.set_on_duration(v);
                Ok(Value::Time(v.into(), TimeUnit::Second))
            }
            Channel::EcoOn => {
                let v = to_secs(&value)?;

                state.set_eco_on(v);
                Ok(Value::Time(v.into(), TimeUnit::Second))
            }
            Channel::EcoOff => {
                let v = to_secs(&value)?;

                state.set_eco_off(v);
                Ok(Value::Time(v.into(), TimeUnit::Second))
            }
            _ => Err(read_only(ch)),
        }
    }

    /// Handles one command from the host. An accepted setting marks
    /// the valve dirty, so it gets dispatched on a later tick, and is
    /// echoed back to the host. A refresh polls the status right away
    /// if the refresh interval allows it.
    pub async fn handle_command(&self, cmd: Command) -> Result<Value> {
        match cmd {
            Command::Refresh => Ok(Value::Bool(self.poll_status().await)),

            Command::Set(name, value) => {
                let ch = name.parse::<Channel>()?;

                if !ch.is_writable() {
                    return Err(read_only(ch));
                }

                let used = {
                    let mut ctl = self.control.lock().await;
                    let used = Self::apply(&mut ctl.state, ch, value)?;

                    ctl.coalescer.mark_dirty();
                    used
                };

                debug!("{} set to {}", ch, &used);
                self.sink.report(ch.as_str(), used.clone()).await;
                Ok(used)
            }
        }
    }

    // Checks to see if the current error state ('value') matches the
    // previously reported error state. If not, it saves the current
    // state and sends the updated value to the host.

    async fn sync_error_state(&self, mon: &mut Monitor, value: bool) {
        if mon.reported_error != Some(value) {
            mon.reported_error = Some(value);

            if value {
                warn!("valve is offline")
            } else {
                info!("valve is online")
            }
            self.sink.report(Channel::Error.as_str(), value.into()).await
        }
    }

    /// Polls the valve's status and reports it to the host. Returns
    /// `true` if fresh status was obtained.
    pub async fn poll_status(&self) -> bool {
        let mut mon = self.monitor.lock().await;

        let Some(snap) = mon.poller.poll(self.client.as_ref()).await else {
            return false;
        };

        if snap.success {
            for (ch, v) in [
                (Channel::RemainingDuration, snap.remaining_duration_minutes),
                (Channel::TotalTime, snap.total_time_minutes),
                (Channel::EcoTotal, snap.eco_total_minutes),
            ] {
                self.sink
                    .report(ch.as_str(), Value::Time(v, TimeUnit::Minute))
                    .await
            }
        }

        self.sync_error_state(&mut mon, !snap.success).await;
        snap.success
    }

    /// Sends the latest desired state if it changed. The request is
    /// built while holding the lock and sent after releasing it.
    pub async fn dispatch_tick(&self) -> bool {
        let cmd = {
            let mut guard = self.control.lock().await;
            let ctl = &mut *guard;

            ctl.coalescer.take_dispatch(&ctl.state, Instant::now())
        };

        match cmd {
            Some(cmd) => CommandCoalescer::send(self.client.as_ref(), &cmd).await,
            None => false,
        }
    }

    // Both loops are fixed-delay: a period starts when the previous
    // pass finishes, so a pass never lands inside the interval its
    // predecessor stamped.

    async fn poll_loop(&self) -> Infallible {
        loop {
            self.poll_status().await;
            time::sleep(self.refresh).await
        }
    }

    async fn dispatch_loop(&self) -> Infallible {
        loop {
            self.dispatch_tick().await;
            time::sleep(self.tick).await
        }
    }

    async fn command_loop<C: CommandSource>(&self, commands: &mut C) -> Infallible {
        while let Some((cmd, reply)) = commands.next_command().await {
            debug!("received command {:?}", &cmd);

            let result = self.handle_command(cmd).await;

            if let Err(e) = &result {
                warn!("command rejected : {}", e)
            }
            reply(result)
        }

        // The host won't send anything else. Keep polling and
        // dispatching what's pending.

        info!("command source closed");
        std::future::pending().await
    }

    /// Runs the valve until the future is dropped. The first status
    /// poll goes out immediately.
    pub async fn run<C: CommandSource>(&self, commands: &mut C) -> Infallible {
        tokio::select! {
            v = self.poll_loop() => v,
            v = self.dispatch_loop() => v,
            v = self.command_loop(commands) => v
        }
    }
}
