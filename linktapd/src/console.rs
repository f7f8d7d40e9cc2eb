// Reads commands from standard input and forwards them to the valves.
// Each line names a valve and what to do with it:
//
//   front refresh
//   front running on
//   front on-duration 2min
//   back mode TAP_MODE_SEVEN_DAY

use linktap_api::{
    driver::{send_command, Command, TxCommand},
    Error, Result, Value,
};
use std::collections::HashMap;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

// Splits a line into the valve's name and the command for it.

fn parse_line(line: &str) -> Result<(&str, Command)> {
    let mut words = line.split_whitespace();

    match (words.next(), words.next()) {
        (Some(tap), Some("refresh")) => {
            if words.next().is_none() {
                Ok((tap, Command::Refresh))
            } else {
                Err(Error::ParseError("'refresh' takes no value".into()))
            }
        }
        (Some(tap), Some(channel)) => {
            let value = words.collect::<Vec<_>>().join(" ");

            if value.is_empty() {
                Err(Error::ParseError(format!("no value for '{}'", channel)))
            } else {
                Ok((tap, Command::Set(channel.into(), value.parse::<Value>()?)))
            }
        }
        _ => Err(Error::ParseError(
            "expected '<valve> refresh' or '<valve> <property> <value>'"
                .into(),
        )),
    }
}

// Sends one line's command to the named valve and returns the reply.

async fn route(routes: &HashMap<String, TxCommand>, line: &str) -> Result<Value> {
    let (tap, cmd) = parse_line(line)?;
    let tx = routes.get(tap).ok_or(Error::NotFound)?;

    send_command(tx, cmd).await
}

pub async fn run(routes: HashMap<String, TxCommand>) {
    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();

                if line.is_empty() || line.starts_with('#') {
                    continue;
                }

                match route(&routes, line).await {
                    Ok(v) => info!("'{}' -> {}", line, v),
                    Err(e) => warn!("'{}' failed : {}", line, e),
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("can't read console -- {}", e);
                break;
            }
        }
    }
    info!("console closed")
}
