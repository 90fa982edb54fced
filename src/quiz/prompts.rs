//! User-facing reply texts.

use super::category::Category;
use super::question::Question;

pub const RESET_CONFIRMATION: &str = "รีเซ็ตแล้ว พิมพ์ start เพื่อเริ่มใหม่";

pub const SEND_START_FIRST: &str = "พิมพ์ start ก่อนนะ 🎬";

const START_INTRO: &str = "มาหา Movie DNA ของคุณกัน! ตอบด้วย A, B, C หรือ D";

const REASK_HINT: &str = "ยังไม่เข้าใจคำตอบนะ ลองตอบเป็น A, B, C หรือ D อีกครั้ง";

/// First question, preceded by the intro line.
pub fn start_reply(first: &Question) -> String {
    format!("{START_INTRO}\n\n{}", first.display_text())
}

/// The same question again, preceded by a hint.
pub fn reask_reply(question: &Question) -> String {
    format!("{REASK_HINT}\n\n{}", question.display_text())
}

pub fn completion_reply(winner: Category) -> String {
    format!(
        "ครบแล้ว! Movie DNA ของคุณคือ {} 🍿\nกด Recommend เพื่อดูหนังที่ใช่ได้เลย",
        winner.label()
    )
}

pub fn already_complete_reply(winner: Option<Category>) -> String {
    match winner {
        Some(winner) => format!(
            "ตอบครบแล้ว (Movie DNA: {}) กด Recommend เพื่อดูหนังได้เลย หรือพิมพ์ reset เพื่อเล่นใหม่",
            winner.label()
        ),
        None => "ตอบครบแล้ว กด Recommend เพื่อดูหนังได้เลย หรือพิมพ์ reset เพื่อเล่นใหม่".to_string(),
    }
}
