// Defines the desired configuration of one valve. The coordinator
// owns the only instance and serializes access to it.

use crate::linktap::Endpoint;
use std::fmt;

/// The watering schedule selected for a valve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    Instant,
    Interval,
    OddEven,
    SevenDay,
    Month,
    #[default]
    Unknown,
}

impl Mode {
    const INSTANT: &'static str = "TAP_MODE_INSTANT";
    const INTERVAL: &'static str = "TAP_MODE_INTERVAL";
    const ODD_EVEN: &'static str = "TAP_MODE_ODD_EVEN";
    const SEVEN_DAY: &'static str = "TAP_MODE_SEVEN_DAY";
    const MONTH: &'static str = "TAP_MODE_MONTH";
    const UNKNOWN: &'static str = "TAP_MODE_UNKNOWN";

    /// Converts the host's name for a mode. Names that aren't
    /// recognized select `Unknown`, which never gets dispatched.
    pub fn from_name(s: &str) -> Self {
        match s {
            Mode::INSTANT => Mode::Instant,
            Mode::INTERVAL => Mode::Interval,
            Mode::ODD_EVEN => Mode::OddEven,
            Mode::SEVEN_DAY => Mode::SevenDay,
            Mode::MONTH => Mode::Month,
            _ => Mode::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Instant => Mode::INSTANT,
            Mode::Interval => Mode::INTERVAL,
            Mode::OddEven => Mode::ODD_EVEN,
            Mode::SevenDay => Mode::SEVEN_DAY,
            Mode::Month => Mode::MONTH,
            Mode::Unknown => Mode::UNKNOWN,
        }
    }

    /// Returns the endpoint that activates the mode.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            Mode::Instant => Some(Endpoint::ActivateInstant),
            Mode::Interval => Some(Endpoint::ActivateInterval),
            Mode::OddEven => Some(Endpoint::ActivateOddEven),
            Mode::SevenDay => Some(Endpoint::ActivateSevenDay),
            Mode::Month => Some(Endpoint::ActivateMonth),
            Mode::Unknown => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A duration split the way the remote service wants it: whole
/// minutes plus the leftover seconds. The fields are private so the
/// pair can only be built from a total, which keeps `seconds` in
/// `0..60`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DurationSetting {
    minutes: u32,
    seconds: u8,
}

impl DurationSetting {
    pub const fn from_secs(total: u32) -> Self {
        DurationSetting {
            minutes: total / 60,
            seconds: (total % 60) as u8,
        }
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn total_secs(&self) -> u32 {
        self.minutes * 60 + self.seconds as u32
    }
}

impl Default for DurationSetting {
    fn default() -> Self {
        DurationSetting::from_secs(60)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeviceState {
    pub mode: Mode,
    pub running: bool,
    pub on_duration: DurationSetting,
    pub eco_mode: bool,
    pub eco_on: DurationSetting,
    pub eco_off: DurationSetting,
    pub auto_back: bool,
}

impl DeviceState {
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode
    }

    pub fn set_running(&mut self, v: bool) {
        self.running = v
    }

    pub fn set_on_duration(&mut self, secs: u32) {
        self.on_duration = DurationSetting::from_secs(secs)
    }

    pub fn set_eco_mode(&mut self, v: bool) {
        self.eco_mode = v
    }

    pub fn set_eco_on(&mut self, secs: u32) {
        self.eco_on = DurationSetting::from_secs(secs)
    }

    pub fn set_eco_off(&mut self, secs: u32) {
        self.eco_off = DurationSetting::from_secs(secs)
    }

    pub fn set_auto_back(&mut self, v: bool) {
        self.auto_back = v
    }
}
