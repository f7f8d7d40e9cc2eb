#![doc = include_str!("../README.md")]

// A driver for LinkTap irrigation valves. The valves are reached
// through the LinkTap cloud service, which takes JSON in HTTP POSTs.
// Some sample exchanges:
//
//  Get watering status:
//
//   Sent:      {"username":"me","apiKey":"...","taplinkerId":"T1"}
//   Received:  {"result":"ok","status":{"onDuration":5,"total":20}}
//
//  Water for 2 minutes 30 seconds:
//
//   Sent:      {"username":"me","apiKey":"...","gatewayId":"GW",
//               "taplinkerId":"T1","action":true,"duration":2,
//               "durationSec":30,"autoBack":false}
//   Received:  {"result":"ok"}
//
//  Error reply (example):
//
//   Received:  {"result":"error","message":"invalid api key"}

mod bridge;
mod channel;
mod client;
mod coalescer;
mod config;
mod coordinator;
mod limiter;
pub mod linktap;
mod model;
mod poller;

pub use bridge::Bridge;
pub use channel::Channel;
pub use client::{Client, HttpTransport, Transport};
pub use coalescer::CommandCoalescer;
pub use config::{BridgeParams, TapParams, DEFAULT_URL};
pub use coordinator::Coordinator;
pub use limiter::Throttle;
pub use model::{DeviceState, DurationSetting, Mode};
pub use poller::{Snapshot, StatusPoller};

pub const NAME: &str = "linktap";

pub const SUMMARY: &str = "monitors and controls LinkTap irrigation valves";

// A scripted service and a sink that remembers what it was told. The
// tests of every module use them in place of the network and the
// host.
