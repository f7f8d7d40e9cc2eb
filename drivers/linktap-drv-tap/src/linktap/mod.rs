// This module defines the requests that are sent to the LinkTap
// service and the reply envelope it returns. Every endpoint takes a
// JSON object in a POST and replies with:
//
//   {"result":"ok","status":{"onDuration":5,"total":20,"ecoTotal":2}}
//
// or, when the service refuses the request:
//
//   {"result":"error","message":"invalid username or api key"}
//
// `status` is only returned by `getWateringStatus` and may be null
// when the valve isn't watering.

use linktap_api::{Error, Result};
use serde::Deserialize;
use std::fmt;

pub mod cmd;

pub use cmd::{Auth, DevicesCmd, ModeCmd, StatusCmd};

// The value of `result` that indicates success.

const RESULT_OK: &str = "ok";

/// The logical endpoints of the service. Each is a path below the
/// configured base URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    WateringStatus,
    ActivateInstant,
    ActivateInterval,
    ActivateOddEven,
    ActivateSevenDay,
    ActivateMonth,
    AllDevices,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::WateringStatus => "getWateringStatus",
            Endpoint::ActivateInstant => "activateInstantMode",
            Endpoint::ActivateInterval => "activateIntervalMode",
            Endpoint::ActivateOddEven => "activateOddEvenMode",
            Endpoint::ActivateSevenDay => "activateSevenDayMode",
            Endpoint::ActivateMonth => "activateMonthMode",
            Endpoint::AllDevices => "getAllDevices",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// The service isn't consistent about quoting numbers, so counters are
// accepted as a JSON integer or as a string holding one.

#[derive(Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Text(String),
}

#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(try_from = "Number")]
pub struct Minutes(pub i64);

impl TryFrom<Number> for Minutes {
    type Error = String;

    fn try_from(v: Number) -> std::result::Result<Self, Self::Error> {
        match v {
            Number::Int(v) => Ok(Minutes(v)),
            Number::Text(s) => s
                .trim()
                .parse()
                .map(Minutes)
                .map_err(|_| format!("'{}' isn't an integer", s)),
        }
    }
}

#[derive(Deserialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub on_duration: Minutes,
    pub total: Minutes,
    #[serde(default)]
    pub eco_total: Option<Minutes>,
}

// The raw envelope. `result` is left as a JSON value because only the
// string "ok" means success; anything else, string or not, is a
// rejection.

#[derive(Deserialize)]
struct Envelope {
    result: serde_json::Value,
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    status: Option<Status>,
}

/// The decoded reply of any endpoint.
#[derive(PartialEq, Debug)]
pub enum Reply {
    /// The service returned no body. The caller should assume nothing
    /// changed.
    Empty,

    /// The request was accepted. Only the status endpoint fills in
    /// the status.
    Ok(Option<Status>),

    /// The service refused the request, possibly explaining why.
    Rejected(Option<String>),
}

impl Reply {
    pub fn decode(body: &str) -> Result<Reply> {
        if body.trim().is_empty() {
            return Ok(Reply::Empty);
        }

        let env: Envelope = serde_json::from_str(body).map_err(|e| {
            Error::ParseError(format!("bad reply ({}) : {}", e, body))
        })?;

        match env.result {
            serde_json::Value::String(s) if s == RESULT_OK => {
                Ok(Reply::Ok(env.status))
            }
            _ => Ok(Reply::Rejected(env.message.map(|m| match m {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            }))),
        }
    }
}
