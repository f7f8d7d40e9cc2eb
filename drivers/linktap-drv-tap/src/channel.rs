use linktap_api::Error;
use std::{fmt, str::FromStr};

/// The properties a tap exposes to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Mode,
    Running,
    OnDuration,
    EcoMode,
    EcoOn,
    EcoOff,
    AutoBack,
    RemainingDuration,
    TotalTime,
    EcoTotal,
    Error,
}

impl Channel {
    pub const ALL: [Channel; 11] = [
        Channel::Mode,
        Channel::Running,
        Channel::OnDuration,
        Channel::EcoMode,
        Channel::EcoOn,
        Channel::EcoOff,
        Channel::AutoBack,
        Channel::RemainingDuration,
        Channel::TotalTime,
        Channel::EcoTotal,
        Channel::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Mode => "mode",
            Channel::Running => "running",
            Channel::OnDuration => "on-duration",
            Channel::EcoMode => "eco-mode",
            Channel::EcoOn => "eco-on",
            Channel::EcoOff => "eco-off",
            Channel::AutoBack => "auto-back",
            Channel::RemainingDuration => "remaining-duration",
            Channel::TotalTime => "total-time",
            Channel::EcoTotal => "eco-total",
            Channel::Error => "error",
        }
    }

    /// Status channels are filled in by polling and can't be set by
    /// the host.
    pub fn is_writable(&self) -> bool {
        !matches!(
            self,
            Channel::RemainingDuration
                | Channel::TotalTime
                | Channel::EcoTotal
                | Channel::Error
        )
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|ch| ch.as_str() == s)
            .ok_or(Error::NotFound)
    }
}
