use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Every stat is clamped into `STAT_MIN..=STAT_MAX` before averaging.
pub const STAT_MIN: f64 = 0.0;
pub const STAT_MAX: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatField {
    /// Input/storage key.
    pub key: &'static str,
    /// Chart axis label.
    pub label: &'static str,
}

pub const OUTFIELD_FIELDS: [StatField; 5] = [
    StatField { key: "sht", label: "SHOOTING" },
    StatField { key: "dbl", label: "DRIBBLING" },
    StatField { key: "stl", label: "STEALING" },
    StatField { key: "psn", label: "PASSING" },
    StatField { key: "dfd", label: "DEFENDING" },
];

pub const GOALKEEPER_FIELDS: [StatField; 4] = [
    StatField { key: "dvg", label: "DIVING" },
    StatField { key: "biq", label: "BIQ" },
    StatField { key: "rfx", label: "REFLEXES" },
    StatField { key: "dtg", label: "DISTRIB." },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatMode {
    #[default]
    Outfield,
    Goalkeeper,
}

impl StatMode {
    pub fn fields(self) -> &'static [StatField] {
        match self {
            Self::Outfield => &OUTFIELD_FIELDS,
            Self::Goalkeeper => &GOALKEEPER_FIELDS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Outfield => "FW / MF",
            Self::Goalkeeper => "GK",
        }
    }

    /// Accent color distinguishing the two modes in the chart and result panel.
    pub fn accent_rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Outfield => (0, 240, 255),
            Self::Goalkeeper => (255, 102, 0),
        }
    }
}

/// Parse one raw input. Empty, unparseable and non-finite input is 0;
/// everything else is clamped into the stat range.
pub fn parse_stat(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(clamp_stat)
        .unwrap_or(STAT_MIN)
}

pub fn clamp_stat(value: f64) -> f64 {
    value.clamp(STAT_MIN, STAT_MAX)
}

/// Stat values for exactly one mode. Values are already clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StatInputSet {
    Outfield { values: [f64; 5] },
    Goalkeeper { values: [f64; 4] },
}

impl StatInputSet {
    pub fn outfield(values: [f64; 5]) -> Self {
        Self::Outfield {
            values: values.map(clamp_stat),
        }
    }

    pub fn goalkeeper(values: [f64; 4]) -> Self {
        Self::Goalkeeper {
            values: values.map(clamp_stat),
        }
    }

    /// Build the set for `mode` from raw input text keyed by field key.
    /// Keys belonging to the other mode are ignored.
    pub fn from_raw(mode: StatMode, raw: &BTreeMap<String, String>) -> Self {
        let value = |key: &str| raw.get(key).map(|s| parse_stat(s)).unwrap_or(STAT_MIN);
        match mode {
            StatMode::Outfield => Self::Outfield {
                values: OUTFIELD_FIELDS.map(|f| value(f.key)),
            },
            StatMode::Goalkeeper => Self::Goalkeeper {
                values: GOALKEEPER_FIELDS.map(|f| value(f.key)),
            },
        }
    }

    pub fn mode(&self) -> StatMode {
        match self {
            Self::Outfield { .. } => StatMode::Outfield,
            Self::Goalkeeper { .. } => StatMode::Goalkeeper,
        }
    }

    pub fn values(&self) -> &[f64] {
        match self {
            Self::Outfield { values } => values,
            Self::Goalkeeper { values } => values,
        }
    }

    pub fn fields(&self) -> &'static [StatField] {
        self.mode().fields()
    }

    /// Arithmetic mean over this mode's fields.
    pub fn average(&self) -> f64 {
        let values = self.values();
        values.iter().sum::<f64>() / values.len() as f64
    }
}
