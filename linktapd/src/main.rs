use futures::future;
use linktap_api::{driver::ChannelSource, Error, Result};
use linktap_drv_tap::{Bridge, BridgeParams, TapParams};
use std::{collections::HashMap, convert::Infallible, sync::Arc};
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, trace, warn, Instrument};

mod config;
mod console;
mod driver;
mod host;

// Number of console commands that can be queued for one valve.

const COMMAND_DEPTH: usize = 20;

// Initializes the `linktapd` application. It determines the
// configuration and sets up the logger. It returns `Some(Config)`
// with the found configuration, if the applications is to run. It
// returns `None` if the program should exit (because a command line
// option asked for the configuration to be printed, for instance.)

async fn init_app() -> Option<config::Config> {
    let cfg = config::get().await?;

    // Initialize the log system. The max log level is determined by
    // the user (either through the config file or the command line.)

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(cfg.get_log_level())
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("ERROR: unable to set global default subscriber -- {}", e);
        return None;
    }
    Some(cfg)
}

async fn wrap_task(handle: JoinHandle<Infallible>) -> Result<Infallible> {
    match handle.await {
        Err(e) if e.is_panic() => {
            error!("terminated due to panic");
            Err(Error::OperationError("task panicked".to_owned()))
        }

        Err(_) => {
            error!("terminated due to cancellation");
            Err(Error::OperationError("task was canceled".to_owned()))
        }

        Ok(v) => match v {},
    }
}

// Runs the main body of the application. This top-level task reads
// the config, checks the account, starts a manager for each valve,
// and monitors their health.

async fn run() -> Result<()> {
    if let Some(cfg) = init_app().await {
        let bridge_cfg = BridgeParams::try_from(cfg.bridge)?;
        let bridge = Arc::new(Bridge::new(&bridge_cfg)?);

        // Let the user know early if the credentials are bad. The
        // valves are started regardless; their status polls will
        // report the problem, too.

        bridge.probe().instrument(info_span!("bridge")).await;

        let mut routes = HashMap::new();
        let mut tasks = vec![];

        trace!("starting valves");

        for tap in cfg.tap {
            let params = TapParams::try_from(tap)?;
            let name = params.name.to_string();

            if routes.contains_key(&name) {
                error!("valve '{}' is configured more than once", &name);
                return Err(Error::ConfigError(format!(
                    "duplicate valve name '{}'",
                    name
                )));
            }

            let (tx, commands) = ChannelSource::new(COMMAND_DEPTH);
            let span = info_span!("tap", name = &*name);

            tasks.push(wrap_task(tokio::spawn(
                driver::manage_tap(bridge.clone(), params, commands)
                    .instrument(span),
            )));
            routes.insert(name, tx);
        }

        if tasks.is_empty() {
            warn!("no valves configured");
            return Ok(());
        }

        // The console isn't required. If standard input closes, the
        // valves keep running.

        info!("accepting commands on standard input");
        tokio::spawn(console::run(routes).instrument(info_span!("console")));

        // Now run all the tasks.

        let _ = future::join_all(tasks).await;

        warn!("shutting down")
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("ERROR: {}", e)
    }
}
