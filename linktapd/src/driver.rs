use crate::host::LogSink;
use linktap_api::driver::ChannelSource;
use linktap_drv_tap::{Bridge, TapParams, Transport};
use std::{convert::Infallible, sync::Arc};
use tokio::time::{self, Duration};
use tracing::{error, info, warn};

const START_DELAY: u64 = 5;
const MAX_DELAY: u64 = 600;

// Returns the delay to use after the one that was just used. The
// delay doubles on each restart, up to 10 minutes.

fn next_delay(delay: u64) -> u64 {
    std::cmp::min(delay * 2, MAX_DELAY)
}

// This is the main loop of a valve's manager. A coordinator is never
// supposed to exit, so it only returns to this loop by panicking. When
// that happens, a fresh coordinator (with default state) is started
// after a delay. The command source outlives the coordinators so the
// host's handle stays valid across restarts.

pub async fn manage_tap<T>(
    bridge: Arc<Bridge<T>>,
    cfg: TapParams,
    mut commands: ChannelSource,
) -> Infallible
where
    T: Transport + 'static,
{
    use futures::FutureExt;
    use std::panic::AssertUnwindSafe;

    let mut restart_delay = START_DELAY;

    loop {
        info!("running");

        let coordinator = bridge.tap(&cfg, LogSink::new(cfg.name.clone()));
        let run = coordinator.run(&mut commands);

        // `run()` can't return normally, so `catch_unwind()` only
        // yields `Err(_)` values.

        let Err(e) = AssertUnwindSafe(run).catch_unwind().await;

        error!("exited unexpectedly -- {e:?}");

        // Delay before restarting. This prevents the system from
        // being compute-bound if the coordinator panics right away.

        warn!("delay before restarting valve ...");
        time::sleep(Duration::from_secs(restart_delay)).await;
        restart_delay = next_delay(restart_delay);
        info!("restarting valve");
    }
}
