//! Live traffic settings.
//!
//! [`LoadConfig`] is the single current shape of generated traffic. It is
//! only ever replaced wholesale, so readers always see all four fields from
//! the same update.

use serde::{Deserialize, Serialize};

use crate::config::LoadDefaults;
use crate::engine::error::ControlError;

pub const MIN_RATE_PER_MINUTE: u32 = 1;
pub const MAX_RATE_PER_MINUTE: u32 = 300;
pub const MAX_PERCENT: u32 = 100;

/// Current traffic shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadConfig {
    pub rate_per_minute: u32,
    pub failure_rate_pct: u32,
    pub latency_ms: u64,
    pub corruption_pct: u32,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            rate_per_minute: 60,
            failure_rate_pct: 0,
            latency_ms: 0,
            corruption_pct: 0,
        }
    }
}

impl LoadConfig {
    /// Return a copy with every provided field of `update` applied.
    pub fn merged(&self, update: &ValidatedUpdate) -> Self {
        Self {
            rate_per_minute: update.rate_per_minute.unwrap_or(self.rate_per_minute),
            failure_rate_pct: update.failure_rate_pct.unwrap_or(self.failure_rate_pct),
            latency_ms: update.latency_ms.unwrap_or(self.latency_ms),
            corruption_pct: update.corruption_pct.unwrap_or(self.corruption_pct),
        }
    }

    /// Build the boot-time config from file defaults, always clamping.
    pub fn from_defaults(defaults: &LoadDefaults) -> (Self, Vec<Adjustment>) {
        let update = ConfigUpdate {
            rate_per_minute: Some(defaults.rate_per_minute),
            failure_rate_pct: Some(defaults.failure_rate_pct),
            latency_ms: Some(defaults.latency_ms),
            corruption_pct: Some(defaults.corruption_pct),
        };
        // Clamp policy never errors.
        match update.validate(ValidationPolicy::Clamp) {
            Ok(validated) => {
                let config = LoadConfig::default().merged(&validated);
                (config, validated.adjustments)
            }
            Err(_) => (LoadConfig::default(), Vec::new()),
        }
    }
}

/// How out-of-range values are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Pull the value to the nearest bound and report it.
    #[default]
    Clamp,
    /// Refuse the whole update.
    Reject,
}

impl ValidationPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Reject
        } else {
            Self::Clamp
        }
    }
}

/// A partial update as received from a control client.
///
/// Fields are signed and wide so that out-of-range input parses and reaches
/// validation instead of failing deserialization. Integers beyond `i64`
/// (and fractional numbers) are not clamped: they fail to parse and are
/// reported as malformed. Aliases accept the short field names used by HTML
/// form clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigUpdate {
    #[serde(default, alias = "rpm", skip_serializing_if = "Option::is_none")]
    pub rate_per_minute: Option<i64>,
    #[serde(default, alias = "error_rate", skip_serializing_if = "Option::is_none")]
    pub failure_rate_pct: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<i64>,
    #[serde(default, alias = "corruption_rate", skip_serializing_if = "Option::is_none")]
    pub corruption_pct: Option<i64>,
}

/// A field that was pulled into range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Adjustment {
    pub field: &'static str,
    pub requested: i64,
    pub applied: i64,
}

/// An update whose values are all in range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedUpdate {
    pub rate_per_minute: Option<u32>,
    pub failure_rate_pct: Option<u32>,
    pub latency_ms: Option<u64>,
    pub corruption_pct: Option<u32>,
    pub adjustments: Vec<Adjustment>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.rate_per_minute.is_none()
            && self.failure_rate_pct.is_none()
            && self.latency_ms.is_none()
            && self.corruption_pct.is_none()
    }

    /// Check every provided field against its bounds.
    pub fn validate(&self, policy: ValidationPolicy) -> Result<ValidatedUpdate, ControlError> {
        let mut adjustments = Vec::new();
        let mut check = |field: &'static str, value: Option<i64>, min: i64, max: i64| {
            value
                .map(|v| bound(field, v, min, max, policy, &mut adjustments))
                .transpose()
        };

        let rate = check(
            "rate_per_minute",
            self.rate_per_minute,
            MIN_RATE_PER_MINUTE.into(),
            MAX_RATE_PER_MINUTE.into(),
        )?;
        let failure = check("failure_rate_pct", self.failure_rate_pct, 0, MAX_PERCENT.into())?;
        let latency = check("latency_ms", self.latency_ms, 0, i64::MAX)?;
        let corruption = check("corruption_pct", self.corruption_pct, 0, MAX_PERCENT.into())?;

        // Bounds above guarantee these conversions succeed.
        Ok(ValidatedUpdate {
            rate_per_minute: rate.map(|v| v as u32),
            failure_rate_pct: failure.map(|v| v as u32),
            latency_ms: latency.map(|v| v as u64),
            corruption_pct: corruption.map(|v| v as u32),
            adjustments,
        })
    }
}

fn bound(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
    policy: ValidationPolicy,
    adjustments: &mut Vec<Adjustment>,
) -> Result<i64, ControlError> {
    if (min..=max).contains(&value) {
        return Ok(value);
    }
    match policy {
        ValidationPolicy::Reject => Err(ControlError::OutOfRange {
            field,
            value,
            min,
            max,
        }),
        ValidationPolicy::Clamp => {
            let applied = value.clamp(min, max);
            adjustments.push(Adjustment {
                field,
                requested: value,
                applied,
            });
            Ok(applied)
        }
    }
}
