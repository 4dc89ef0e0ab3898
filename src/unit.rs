//! Per-unit customization: setpoint limits, step and supported modes.
//!
//! Limits and step should match what the unit's own remote control allows.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

pub const DEFAULT_MIN_TEMP: u8 = 16;
pub const DEFAULT_MAX_TEMP: u8 = 31;
pub const DEFAULT_TEMP_STEP: f32 = 1.0;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Auto,
    Cool,
    Dry,
    Heat,
    Fan,
}

/// Setpoint increment. Accepts either a string (`"0.5"`) or a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StepRepr", into = "f32")]
pub struct TempStep(f32);

#[derive(Deserialize)]
#[serde(untagged)]
enum StepRepr {
    Number(f32),
    Text(String),
}

impl TempStep {
    pub fn new(value: f32) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(AppError::invalid(
                "unit.temp_step",
                format!("must be a positive number, got {value}"),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for TempStep {
    fn default() -> Self {
        Self(DEFAULT_TEMP_STEP)
    }
}

impl TryFrom<StepRepr> for TempStep {
    type Error = String;

    fn try_from(repr: StepRepr) -> std::result::Result<Self, Self::Error> {
        let value = match repr {
            StepRepr::Number(n) => n,
            StepRepr::Text(s) => s
                .trim()
                .parse::<f32>()
                .map_err(|e| format!("invalid temp_step {s:?}: {e}"))?,
        };
        TempStep::new(value).map_err(|e| e.to_string())
    }
}

impl From<TempStep> for f32 {
    fn from(step: TempStep) -> Self {
        step.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitSettings {
    pub min_temp: u8,
    pub max_temp: u8,
    pub temp_step: TempStep,
    /// Some models cannot heat.
    pub support_heat_mode: bool,
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self {
            min_temp: DEFAULT_MIN_TEMP,
            max_temp: DEFAULT_MAX_TEMP,
            temp_step: TempStep::default(),
            support_heat_mode: true,
        }
    }
}

impl UnitSettings {
    pub fn validate(&self) -> Result<()> {
        if self.min_temp >= self.max_temp {
            return Err(AppError::invalid(
                "unit.min_temp",
                format!(
                    "min_temp ({}) must be below max_temp ({})",
                    self.min_temp, self.max_temp
                ),
            ));
        }
        let span = f32::from(self.max_temp - self.min_temp);
        if self.temp_step.value() > span {
            return Err(AppError::invalid(
                "unit.temp_step",
                format!(
                    "step {} is larger than the {}..{} range",
                    self.temp_step.value(),
                    self.min_temp,
                    self.max_temp
                ),
            ));
        }
        Ok(())
    }

    /// Bring a requested setpoint into range and onto the step grid.
    pub fn clamp_setpoint(&self, value: f32) -> f32 {
        let min = f32::from(self.min_temp);
        let max = f32::from(self.max_temp);
        if value.is_nan() {
            return min;
        }
        let step = self.temp_step.value();
        let clamped = value.clamp(min, max);
        let snapped = min + ((clamped - min) / step).round() * step;
        if snapped > max {
            // highest grid point not above max
            snapped - step
        } else {
            snapped
        }
    }

    pub fn supports(&self, mode: Mode) -> bool {
        mode != Mode::Heat || self.support_heat_mode
    }

    pub fn supported_modes(&self) -> Vec<Mode> {
        Mode::iter().filter(|m| self.supports(*m)).collect()
    }
}
