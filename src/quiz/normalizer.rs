//! Answer normalization — free text to a choice symbol.
//!
//! Rules run in order over the trimmed, lowercased input and the first one
//! that yields a symbol wins:
//! 1. the whole input is a choice symbol (`"b"`)
//! 2. a choice symbol appears as a standalone token (`"answer: B"`, `"ข้อ B"`)
//! 3. the input contains a category keyword stem, mapped back to the symbol the
//!    current question assigns to that category
//!
//! `None` means the input was not recognized; callers re-ask the question.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::category::Category;
use super::question::{Choice, Question};

/// A single normalization rule.
type Rule = fn(&str, &Question) -> Option<Choice>;

/// Rules in priority order.
const RULES: &[(&str, Rule)] = &[
    ("exact_symbol", exact_symbol as Rule),
    ("standalone_token", standalone_token as Rule),
    ("category_keyword", category_keyword as Rule),
];

/// A lone A–D not touching other letters, digits or apostrophes. Non-ASCII
/// text (Thai) around the symbol counts as a boundary.
static STANDALONE_SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^a-z0-9'’])([a-d])(?:$|[^a-z0-9'’])").unwrap());

/// Normalize raw user text against the current question.
pub fn normalize(input: &str, question: &Question) -> Option<Choice> {
    let text = input.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    for (name, rule) in RULES {
        if let Some(choice) = rule(&text, question) {
            debug!(rule = *name, %choice, question = question.key, "Answer recognized");
            return Some(choice);
        }
    }

    debug!(question = question.key, "Answer not recognized");
    None
}

fn exact_symbol(text: &str, _question: &Question) -> Option<Choice> {
    Choice::parse(text)
}

fn standalone_token(text: &str, _question: &Question) -> Option<Choice> {
    STANDALONE_SYMBOL
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Choice::parse(m.as_str()))
}

fn category_keyword(text: &str, question: &Question) -> Option<Choice> {
    Category::PRIORITY
        .into_iter()
        .find(|category| category.keywords().iter().any(|stem| text.contains(stem)))
        .and_then(|category| question.choice_for(category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::question::QuestionBank;

    fn bank() -> QuestionBank {
        QuestionBank::standard().unwrap()
    }

    #[test]
    fn exact_symbols_always_normalize_to_themselves() {
        let bank = bank();
        for question in bank.iter() {
            for choice in Choice::ALL {
                let upper = choice.as_str();
                let lower = upper.to_lowercase();
                assert_eq!(normalize(upper, question), Some(choice));
                assert_eq!(normalize(&lower, question), Some(choice));
                assert_eq!(normalize(&format!("  {upper} \n"), question), Some(choice));
            }
        }
    }

    #[test]
    fn standalone_token_inside_longer_text() {
        let bank = bank();
        let q = bank.question_at(0).unwrap();
        assert_eq!(normalize("answer: B", q), Some(Choice::B));
        assert_eq!(normalize("ข้อ C", q), Some(Choice::C));
        assert_eq!(normalize("ขอเลือกdนะ", q), Some(Choice::D));
        assert_eq!(normalize("(a)", q), Some(Choice::A));
    }

    #[test]
    fn letters_inside_words_are_not_tokens() {
        let bank = bank();
        let q = bank.question_at(0).unwrap();
        // "bad" and "cab" contain a-d but never as a standalone token.
        assert_eq!(normalize("bad cab", q), None);
        assert_eq!(normalize("b2", q), None);
    }

    #[test]
    fn contractions_are_not_tokens() {
        let bank = bank();
        let q = bank.question_at(0).unwrap();
        assert_eq!(
            normalize("I'd like something healing", q),
            q.choice_for(Category::Healing)
        );
        assert_eq!(normalize("i’d rather not", q), None);
        assert_eq!(normalize("we'd", q), None);
    }

    #[test]
    fn short_thai_fragments_do_not_match_keywords() {
        let bank = bank();
        let q = bank.question_at(0).unwrap();
        // "file" shares its first syllable with a motivation word.
        assert_eq!(normalize("ไฟล์", q), None);
        assert_eq!(normalize("อยากจุดไฟในใจ", q), q.choice_for(Category::Motivation));
    }

    #[test]
    fn keyword_maps_through_current_question() {
        let bank = bank();
        // "healing" sits on a different symbol in each question.
        for question in bank.iter() {
            let expected = question.choice_for(Category::Healing).unwrap();
            assert_eq!(normalize("something healing please", question), Some(expected));
            assert_eq!(normalize("อยากได้อะไรอบอุ่นๆ", question), Some(expected));
        }
    }

    #[test]
    fn thai_keywords_for_each_category() {
        let bank = bank();
        let q = bank.question_at(1).unwrap();
        assert_eq!(normalize("หนังผจญภัย", q), q.choice_for(Category::Fantasy));
        assert_eq!(normalize("ขอแรงบันดาลใจหน่อย", q), q.choice_for(Category::Motivation));
        assert_eq!(normalize("หลอนๆ", q), q.choice_for(Category::Dark));
    }

    #[test]
    fn keyword_conflicts_resolve_by_priority() {
        let bank = bank();
        let q = bank.question_at(2).unwrap();
        // Both fantasy and dark stems present: fantasy comes first.
        assert_eq!(normalize("dark fantasy", q), q.choice_for(Category::Fantasy));
    }

    #[test]
    fn symbol_rules_beat_keywords() {
        let bank = bank();
        let q = bank.question_at(0).unwrap();
        assert_eq!(normalize("d, horror", q), Some(Choice::D));
        assert_eq!(normalize("c แต่ก็ชอบ magic", q), Some(Choice::C));
    }

    #[test]
    fn gibberish_is_unrecognized() {
        let bank = bank();
        for question in bank.iter() {
            assert_eq!(normalize("zzz", question), None);
            assert_eq!(normalize("", question), None);
            assert_eq!(normalize("   ", question), None);
            assert_eq!(normalize("12345", question), None);
        }
    }
}
