/// Number of HF band groups reported by the feed
pub const HF_BAND_COUNT: usize = 4;
/// Day slots followed by night slots
pub const CONDITION_SLOTS: usize = HF_BAND_COUNT * 2;

/// Forecast usability of an HF band group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandCondition {
    Poor,
    Fair,
    Good,
    #[default]
    Unknown,
}

impl BandCondition {
    /// Map feed text case-insensitively; anything unrecognised is `Unknown`
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case("good") {
            BandCondition::Good
        } else if text.eq_ignore_ascii_case("fair") {
            BandCondition::Fair
        } else if text.eq_ignore_ascii_case("poor") {
            BandCondition::Poor
        } else {
            BandCondition::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BandCondition::Poor => "Poor",
            BandCondition::Fair => "Fair",
            BandCondition::Good => "Good",
            BandCondition::Unknown => "?",
        }
    }
}

/// HF band groups in slot order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HfBand {
    M80To40,
    M30To20,
    M17To15,
    M12To10,
}

impl HfBand {
    pub const ALL: [HfBand; HF_BAND_COUNT] = [
        HfBand::M80To40,
        HfBand::M30To20,
        HfBand::M17To15,
        HfBand::M12To10,
    ];

    /// Parse the `name` attribute of a `<band>` tag
    pub fn from_feed_name(name: &str) -> Option<Self> {
        match name {
            "80m-40m" => Some(HfBand::M80To40),
            "30m-20m" => Some(HfBand::M30To20),
            "17m-15m" => Some(HfBand::M17To15),
            "12m-10m" => Some(HfBand::M12To10),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            HfBand::M80To40 => "80-40",
            HfBand::M30To20 => "30-20",
            HfBand::M17To15 => "17-15",
            HfBand::M12To10 => "12-10",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Day,
    Night,
}

impl TimeOfDay {
    /// Parse the `time` attribute of a `<band>` tag
    pub fn from_feed_name(name: &str) -> Option<Self> {
        match name {
            "day" => Some(TimeOfDay::Day),
            "night" => Some(TimeOfDay::Night),
            _ => None,
        }
    }

    fn slot_offset(self) -> usize {
        match self {
            TimeOfDay::Day => 0,
            TimeOfDay::Night => HF_BAND_COUNT,
        }
    }
}

/// VHF phenomena, kept as the feed's own wording ("Band Closed", ...)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VhfConditions {
    pub aurora: String,
    pub e_skip_europe_2m: String,
    pub e_skip_europe_4m: String,
    pub e_skip_europe_6m: String,
}

/// Solar indices and band forecasts from one propagation feed fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropagationSnapshot {
    pub solar_flux: i32,
    pub a_index: i32,
    pub k_index: i32,
    pub xray: String,
    pub geomagnetic_field: String,
    pub signal_noise: String,
    pub sunspots: i32,
    /// Slots 0-3 are day, 4-7 night, bands in `HfBand::ALL` order
    pub conditions: [BandCondition; CONDITION_SLOTS],
    pub vhf: VhfConditions,
}

impl PropagationSnapshot {
    pub fn condition(&self, band: HfBand, time: TimeOfDay) -> BandCondition {
        self.conditions[time.slot_offset() + band.index()]
    }

    pub fn set_condition(&mut self, band: HfBand, time: TimeOfDay, condition: BandCondition) {
        self.conditions[time.slot_offset() + band.index()] = condition;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_text_is_case_insensitive() {
        assert_eq!(BandCondition::from_text("Good"), BandCondition::Good);
        assert_eq!(BandCondition::from_text("GOOD"), BandCondition::Good);
        assert_eq!(BandCondition::from_text(" fair "), BandCondition::Fair);
        assert_eq!(BandCondition::from_text("Poor"), BandCondition::Poor);
        assert_eq!(BandCondition::from_text("excellent"), BandCondition::Unknown);
    }

    #[test]
    fn test_slot_layout() {
        let mut snapshot = PropagationSnapshot::default();
        snapshot.set_condition(HfBand::M30To20, TimeOfDay::Night, BandCondition::Fair);
        assert_eq!(snapshot.conditions[5], BandCondition::Fair);
        assert_eq!(
            snapshot.condition(HfBand::M30To20, TimeOfDay::Day),
            BandCondition::Unknown
        );
    }
}
