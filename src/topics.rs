use crate::error::{AppError, Result};
use serde::Serialize;
use strum::IntoEnumIterator;

/// Suffix appended to a state topic to form its command topic.
pub const SET_SUFFIX: &str = "set";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Control {
    Power,
    Mode,
    Fan,
    Vane,
    #[serde(rename = "widevane")]
    #[strum(serialize = "widevane")]
    WideVane,
    Temp,
    RoomTemp,
}

impl Control {
    /// Room temperature is reported by the unit and cannot be commanded.
    pub fn settable(self) -> bool {
        !matches!(self, Control::RoomTemp)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicPair {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
}

impl TopicPair {
    fn for_control(main: &str, control: Control) -> Self {
        let state = format!("{main}/{control}");
        let set = control
            .settable()
            .then(|| format!("{state}/{SET_SUFFIX}"));
        Self { state, set }
    }
}

/// Every topic the bridge publishes or listens on, derived from one main topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topics {
    pub main: String,
    pub power: TopicPair,
    pub mode: TopicPair,
    pub fan: TopicPair,
    pub vane: TopicPair,
    pub wide_vane: TopicPair,
    pub temp: TopicPair,
    pub room_temp: TopicPair,
}

impl Topics {
    pub fn derive(main_topic: &str) -> Result<Self> {
        let main = main_topic.trim().trim_end_matches('/');
        if main.is_empty() {
            return Err(AppError::invalid("mqtt.topic", "main topic cannot be empty"));
        }
        if let Some(bad) = main.chars().find(|c| matches!(c, '+' | '#' | '\0')) {
            return Err(AppError::invalid(
                "mqtt.topic",
                format!("main topic must not contain {bad:?}"),
            ));
        }

        Ok(Self {
            main: main.to_string(),
            power: TopicPair::for_control(main, Control::Power),
            mode: TopicPair::for_control(main, Control::Mode),
            fan: TopicPair::for_control(main, Control::Fan),
            vane: TopicPair::for_control(main, Control::Vane),
            wide_vane: TopicPair::for_control(main, Control::WideVane),
            temp: TopicPair::for_control(main, Control::Temp),
            room_temp: TopicPair::for_control(main, Control::RoomTemp),
        })
    }

    pub fn pair(&self, control: Control) -> &TopicPair {
        match control {
            Control::Power => &self.power,
            Control::Mode => &self.mode,
            Control::Fan => &self.fan,
            Control::Vane => &self.vane,
            Control::WideVane => &self.wide_vane,
            Control::Temp => &self.temp,
            Control::RoomTemp => &self.room_temp,
        }
    }

    pub fn state(&self, control: Control) -> &str {
        &self.pair(control).state
    }

    pub fn set(&self, control: Control) -> Option<&str> {
        self.pair(control).set.as_deref()
    }

    /// Command topics, in `Control` order.
    pub fn set_topics(&self) -> Vec<&str> {
        Control::iter().filter_map(|c| self.set(c)).collect()
    }

    pub fn control_for_set(&self, topic: &str) -> Option<Control> {
        Control::iter().find(|c| self.set(*c) == Some(topic))
    }
}
