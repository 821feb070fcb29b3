use crate::stats::{StatInputSet, StatMode};

/// Averages within this distance below a bound still reach it, so a mean
/// such as 6.999999999 (from float summation) lands in the 7.0 band.
const BOUND_EPSILON: f64 = 1e-9;

/// Sub-band thresholds inside a rank: one star below `two`, two below `three`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarBands {
    pub two: f64,
    pub three: f64,
}

impl StarBands {
    pub fn stars(self, average: f64) -> &'static str {
        if reaches(average, self.three) {
            "⭐⭐⭐"
        } else if reaches(average, self.two) {
            "⭐⭐"
        } else {
            "⭐"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankEntry {
    /// Inclusive lower bound of the band.
    pub min: f64,
    pub label: &'static str,
    pub stars: Option<StarBands>,
    pub color: (u8, u8, u8),
}

impl RankEntry {
    const fn new(min: f64, label: &'static str, color: (u8, u8, u8)) -> Self {
        Self {
            min,
            label,
            stars: None,
            color,
        }
    }

    const fn starred(min: f64, label: &'static str, two: f64, three: f64, color: (u8, u8, u8)) -> Self {
        Self {
            min,
            label,
            stars: Some(StarBands { two, three }),
            color,
        }
    }

    pub fn display(&self, average: f64) -> String {
        match self.stars {
            Some(bands) => format!("{} - {}", self.label, bands.stars(average)),
            None => self.label.to_string(),
        }
    }
}

/// Ordered threshold table, ascending by `min`. The first entry must start at
/// the bottom of the stat range so every average has a band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankTable {
    pub entries: &'static [RankEntry],
}

const UNRANKED_COLOR: (u8, u8, u8) = (85, 85, 85);

pub const OUTFIELD_RANKS: RankTable = RankTable {
    entries: &[
        RankEntry::new(0.0, "UNRANKED", UNRANKED_COLOR),
        RankEntry::starred(4.6, "ROOKIE STRIKER 🥉", 4.9, 5.2, (205, 127, 50)),
        RankEntry::starred(5.5, "AMATEUR STRIKER ⚽", 5.8, 6.1, (160, 160, 160)),
        RankEntry::starred(6.4, "ELITE ⚡", 6.7, 7.0, (0, 240, 255)),
        RankEntry::starred(7.3, "PRODIGY 🏅", 7.6, 7.9, (255, 102, 0)),
        RankEntry::starred(8.2, "NEW GEN XI", 8.5, 8.8, (255, 204, 0)),
        RankEntry::starred(9.1, "WORLD CLASS 👑", 9.4, 9.7, (255, 215, 0)),
    ],
};

pub const GOALKEEPER_RANKS: RankTable = RankTable {
    entries: &[
        RankEntry::new(0.0, "UNRANKED", UNRANKED_COLOR),
        RankEntry::new(0.1, "D TIER", (160, 160, 160)),
        RankEntry::new(7.0, "C TIER", (205, 127, 50)),
        RankEntry::new(7.5, "B TIER", (255, 102, 0)),
        RankEntry::new(8.0, "A TIER", (0, 240, 255)),
        RankEntry::new(8.5, "S TIER", (255, 204, 0)),
        RankEntry::new(9.5, "S+ TIER", (255, 215, 0)),
    ],
};

fn reaches(average: f64, bound: f64) -> bool {
    average + BOUND_EPSILON >= bound
}

impl RankTable {
    pub fn for_mode(mode: StatMode) -> Self {
        match mode {
            StatMode::Outfield => OUTFIELD_RANKS,
            StatMode::Goalkeeper => GOALKEEPER_RANKS,
        }
    }

    /// The entry with the greatest lower bound not above `average`.
    pub fn entry_for(&self, average: f64) -> &'static RankEntry {
        let entries = self.entries;
        entries
            .iter()
            .rev()
            .find(|e| reaches(average, e.min))
            .unwrap_or(&entries[0])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub average: f64,
    pub rank: String,
    pub color: (u8, u8, u8),
}

impl Classification {
    /// Average rounded for display, e.g. `"7.0"`.
    pub fn average_label(&self) -> String {
        format!("{:.1}", self.average)
    }
}

/// The band is chosen from the exact mean; `average_label` only rounds for display.
pub fn classify(input: &StatInputSet) -> Classification {
    let average = input.average();
    let entry = RankTable::for_mode(input.mode()).entry_for(average);
    Classification {
        average,
        rank: entry.display(average),
        color: entry.color,
    }
}
