//! Movie DNA categories and their answer keywords.

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// A quiz outcome ("DNA type").
///
/// The set is closed: adding a category means adding a variant here, and the
/// compiler then points at every lookup table that needs a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Fantasy,
    Motivation,
    Healing,
    Dark,
}

impl Category {
    /// Every category, in tie-break priority order.
    ///
    /// When several categories share the top score, the first one in this list
    /// wins. The order is a fixed contract; do not sort it.
    pub const PRIORITY: [Category; 4] = [
        Category::Fantasy,
        Category::Motivation,
        Category::Healing,
        Category::Dark,
    ];

    /// Stable identifier used in storage and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fantasy => "fantasy",
            Self::Motivation => "motivation",
            Self::Healing => "healing",
            Self::Dark => "dark",
        }
    }

    /// Display label shown to the user when the quiz resolves.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fantasy => "สายแฟนตาซี (Fantasy Dreamer)",
            Self::Motivation => "สายไฟลุก (Motivation Seeker)",
            Self::Healing => "สายฮีลใจ (Healing Soul)",
            Self::Dark => "สายดาร์ก (Dark Explorer)",
        }
    }

    /// Lowercase keyword stems that identify this category in free text.
    ///
    /// Matching is substring-based, so stems may be word prefixes
    /// (`"motivat"` covers "motivation" and "motivated").
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Fantasy => &[
                "fantasy",
                "magic",
                "dream",
                "adventure",
                "wizard",
                "แฟนตาซี",
                "เวทมนตร์",
                "ผจญภัย",
                "จินตนาการ",
                "ความฝัน",
            ],
            Self::Motivation => &[
                "motivat",
                "inspir",
                "success",
                "goal",
                "hustle",
                "แรงบันดาลใจ",
                "ฮึด",
                "ความสำเร็จ",
                "เป้าหมาย",
                "ไฟลุก",
                "จุดไฟ",
            ],
            Self::Healing => &[
                "heal",
                "warm",
                "comfort",
                "relax",
                "cozy",
                "ฮีล",
                "อบอุ่น",
                "ผ่อนคลาย",
                "ชิล",
                "ละมุน",
            ],
            Self::Dark => &[
                "dark",
                "horror",
                "scary",
                "thrill",
                "creepy",
                "ดาร์ก",
                "หลอน",
                "สยอง",
                "ระทึก",
                "ลึกลับ",
            ],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fantasy" => Ok(Self::Fantasy),
            "motivation" => Ok(Self::Motivation),
            "healing" => Ok(Self::Healing),
            "dark" => Ok(Self::Dark),
            other => Err(QuizError::UnknownCategory(other.to_string())),
        }
    }
}
