// This module defines the request bodies sent to the LinkTap
// service. Each request is built fresh from the valve's state and
// `serde` converts it to the JSON layout the service expects. The
// account credentials aren't part of these types; the client merges
// them into every body it sends.

use super::Endpoint;
use crate::model::{DeviceState, DurationSetting, Mode};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize, PartialEq, Debug)]
pub struct Auth {
    pub username: Arc<str>,
    #[serde(rename = "apiKey")]
    pub api_key: Arc<str>,
}

// Body of the `getWateringStatus` request.

#[derive(Serialize, PartialEq, Debug)]
pub struct StatusCmd {
    #[serde(rename = "taplinkerId")]
    pub taplinker_id: Arc<str>,
}

// Body of the `getAllDevices` request. Only the credentials are sent.

#[derive(Serialize, PartialEq, Debug)]
pub struct DevicesCmd {}

// Eco mode cycles the valve on and off while watering.

#[derive(Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EcoFields {
    pub eco: bool,
    pub eco_on: u32,
    pub eco_on_sec: u8,
    pub eco_off: u32,
    pub eco_off_sec: u8,
}

// The extra fields used by the Instant mode endpoint.

#[derive(Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InstantFields {
    pub action: bool,
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_back: Option<bool>,
    #[serde(flatten)]
    pub eco: Option<EcoFields>,
}

/// A request that changes the watering mode of a valve, or turns it
/// off.
#[derive(Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ModeCmd {
    #[serde(skip)]
    pub endpoint: Endpoint,
    pub gateway_id: Arc<str>,
    pub taplinker_id: Arc<str>,
    #[serde(flatten)]
    pub instant: Option<InstantFields>,
}

impl ModeCmd {
    /// Builds the request that activates the valve's current mode.
    /// Returns `None` when the mode is unknown since there's no
    /// endpoint for it.
    pub fn mk_activate(
        gateway_id: Arc<str>,
        taplinker_id: Arc<str>,
        state: &DeviceState,
    ) -> Option<ModeCmd> {
        let endpoint = state.mode.endpoint()?;
        let instant = if let Mode::Instant = state.mode {
            Some(InstantFields {
                action: true,
                duration: state.on_duration.minutes(),
                duration_sec: Some(state.on_duration.seconds()),
                auto_back: Some(state.auto_back),
                eco: if state.eco_mode {
                    Some(mk_eco(&state.eco_on, &state.eco_off))
                } else {
                    None
                },
            })
        } else {
            None
        };

        Some(ModeCmd {
            endpoint,
            gateway_id,
            taplinker_id,
            instant,
        })
    }

    /// Builds the request that stops the valve, whatever mode it's
    /// in.
    pub fn mk_deactivate(
        gateway_id: Arc<str>,
        taplinker_id: Arc<str>,
    ) -> ModeCmd {
        ModeCmd {
            endpoint: Endpoint::ActivateInstant,
            gateway_id,
            taplinker_id,
            instant: Some(InstantFields {
                action: false,
                duration: 0,
                duration_sec: None,
                auto_back: None,
                eco: None,
            }),
        }
    }
}

fn mk_eco(on: &DurationSetting, off: &DurationSetting) -> EcoFields {
    EcoFields {
        eco: true,
        eco_on: on.minutes(),
        eco_on_sec: on.seconds(),
        eco_off: off.minutes(),
        eco_off_sec: off.seconds(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (Arc<str>, Arc<str>) {
        ("GW".into(), "T1".into())
    }

    #[test]
    fn test_cmds() {
        assert_eq!(
            serde_json::to_string(&StatusCmd {
                taplinker_id: "T1".into()
            })
            .unwrap(),
            r#"{"taplinkerId":"T1"}"#
        );
        assert_eq!(serde_json::to_string(&DevicesCmd {}).unwrap(), "{}");
        assert_eq!(
            serde_json::to_string(&Auth {
                username: "me".into(),
                api_key: "secret".into()
            })
            .unwrap(),
            r#"{"username":"me","apiKey":"secret"}"#
        );

        let (gw, tap) = ids();
        let cmd = ModeCmd::mk_deactivate(gw, tap);

        assert_eq!(cmd.endpoint, Endpoint::ActivateInstant);
        assert_eq!(
            serde_json::to_string(&cmd).unwrap(),
            r#"{"gatewayId":"GW","taplinkerId":"T1","action":false,"duration":0}"#
        );
    }

    #[test]
    fn test_activate_cmds() {
        let mut st = DeviceState::default();

        // Unknown modes have no request.

        let (gw, tap) = ids();

        assert_eq!(ModeCmd::mk_activate(gw, tap, &st), None);

        // Schedule-based modes only send the identifiers.

        for (mode, ep) in [
            (Mode::Interval, Endpoint::ActivateInterval),
            (Mode::OddEven, Endpoint::ActivateOddEven),
            (Mode::SevenDay, Endpoint::ActivateSevenDay),
            (Mode::Month, Endpoint::ActivateMonth),
        ] {
            let (gw, tap) = ids();

            st.set_mode(mode);

            let cmd = ModeCmd::mk_activate(gw, tap, &st).unwrap();

            assert_eq!(cmd.endpoint, ep);
            assert_eq!(
                serde_json::to_string(&cmd).unwrap(),
                r#"{"gatewayId":"GW","taplinkerId":"T1"}"#
            );
        }

        st.set_mode(Mode::Instant);
        st.set_on_duration(150);
        st.set_auto_back(true);

        let (gw, tap) = ids();

        assert_eq!(
            serde_json::to_string(&ModeCmd::mk_activate(gw, tap, &st).unwrap())
                .unwrap(),
            r#"{"gatewayId":"GW","taplinkerId":"T1","action":true,"duration":2,"durationSec":30,"autoBack":true}"#
        );

        // The eco-off seconds come from the eco-off duration.

        st.set_eco_mode(true);
        st.set_eco_on(65);
        st.set_eco_off(130);

        let (gw, tap) = ids();

        assert_eq!(
            serde_json::to_string(&ModeCmd::mk_activate(gw, tap, &st).unwrap())
                .unwrap(),
            r#"{"gatewayId":"GW","taplinkerId":"T1","action":true,"duration":2,"durationSec":30,"autoBack":true,"eco":true,"ecoOn":1,"ecoOnSec":5,"ecoOff":2,"ecoOffSec":10}"#
        );
    }
}
