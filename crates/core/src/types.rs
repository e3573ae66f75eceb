use serde::{Deserialize, Serialize};

/// Canonical health classes a report line can carry. Reports encode these as
/// emoji glyphs with several visually-equivalent renderings per class; the
/// accepted code points live in [`GLYPHS`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Service interruption (a "floating" VLAN in operator speak).
    Down,
    /// Nominal tier A.
    Purple,
    /// Nominal tier B.
    Green,
    /// Degraded tier.
    Orange,
}

/// Every accepted status glyph, mapped to its canonical class. Glyphs outside
/// this table fail the line instead of being guessed at.
pub const GLYPHS: &[(char, Status)] = &[
    ('\u{274C}', Status::Down),    // ❌
    ('\u{1F534}', Status::Down),   // 🔴
    ('\u{1F7E5}', Status::Down),   // 🟥
    ('\u{1F7E3}', Status::Purple), // 🟣
    ('\u{1F7EA}', Status::Purple), // 🟪
    ('\u{1F535}', Status::Purple), // 🔵
    ('\u{1F7E6}', Status::Purple), // 🟦
    ('\u{1F7E2}', Status::Green),  // 🟢
    ('\u{1F7E9}', Status::Green),  // 🟩
    ('\u{2705}', Status::Green),   // ✅
    ('\u{1F7E0}', Status::Orange), // 🟠
    ('\u{1F7E7}', Status::Orange), // 🟧
    ('\u{1F7E1}', Status::Orange), // 🟡
    ('\u{1F7E8}', Status::Orange), // 🟨
];

impl Status {
    pub fn from_glyph(glyph: char) -> Option<Status> {
        GLYPHS
            .iter()
            .find(|&&(g, _)| g == glyph)
            .map(|&(_, status)| status)
    }

    /// The one canonical glyph per class, used in display strings.
    pub fn glyph(self) -> char {
        match self {
            Status::Down => '\u{274C}',
            Status::Purple => '\u{1F7E3}',
            Status::Green => '\u{1F7E2}',
            Status::Orange => '\u{1F7E0}',
        }
    }

    pub fn is_down(self) -> bool {
        self == Status::Down
    }
}

/// One parsed report line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VlanReading {
    pub number: u32,
    pub name: String,
    pub status: Status,
    pub megabytes: u32,
}

impl VlanReading {
    pub fn display(&self) -> String {
        format!("{} {}MB", self.status.glyph(), self.megabytes)
    }

    pub fn short_display(&self) -> String {
        format!("{}{}", self.status.glyph(), self.megabytes)
    }
}

/// Alert sensitivity tier, derived from the prior day's reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SizeTier {
    Big,
    Medium,
    Small,
}

impl SizeTier {
    pub fn of(prior_megabytes: u32) -> SizeTier {
        if prior_megabytes >= 3000 {
            SizeTier::Big
        } else if prior_megabytes >= 1000 {
            SizeTier::Medium
        } else {
            SizeTier::Small
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    NewFloatBig,
    NewFloatMedium,
    NewFloatSmall,
    BigDropCritical,
    BigDropSignificant,
    MediumDrop,
    BigIncrease,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::NewFloatBig => "new_float_big",
            AlertKind::NewFloatMedium => "new_float_medium",
            AlertKind::NewFloatSmall => "new_float_small",
            AlertKind::BigDropCritical => "big_drop_critical",
            AlertKind::BigDropSignificant => "big_drop_significant",
            AlertKind::MediumDrop => "medium_drop",
            AlertKind::BigIncrease => "big_increase",
        }
    }
}

/// One classified day-over-day change for a single VLAN.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertItem {
    pub kind: AlertKind,
    pub vlan: u32,
    pub name: String,
    pub port: String,
    pub from: u32,
    pub to: u32,
    pub percent: u32,
    pub size: SizeTier,
    pub original_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_amount: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increase_amount: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_accepted_glyph_resolves_and_canonical_glyphs_round_trip() {
        for &(glyph, status) in GLYPHS {
            assert_eq!(Status::from_glyph(glyph), Some(status));
        }
        for status in [Status::Down, Status::Purple, Status::Green, Status::Orange] {
            assert_eq!(Status::from_glyph(status.glyph()), Some(status));
        }
    }

    #[test]
    fn unknown_glyphs_are_rejected() {
        assert_eq!(Status::from_glyph('\u{1F7E4}'), None); // 🟤
        assert_eq!(Status::from_glyph('x'), None);
    }

    #[test]
    fn size_tier_boundaries() {
        assert_eq!(SizeTier::of(3000), SizeTier::Big);
        assert_eq!(SizeTier::of(2999), SizeTier::Medium);
        assert_eq!(SizeTier::of(1000), SizeTier::Medium);
        assert_eq!(SizeTier::of(999), SizeTier::Small);
        assert_eq!(SizeTier::of(0), SizeTier::Small);
    }
}
