//! Question bank — the fixed, ordered list of quiz questions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::error::QuizError;

/// An answer-option identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
    C,
    D,
}

impl Choice {
    /// Every choice symbol, in display order.
    pub const ALL: [Choice; 4] = [Choice::A, Choice::B, Choice::C, Choice::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// Parse a symbol, ignoring ASCII case.
    pub fn parse(s: &str) -> Option<Choice> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One multiple-choice option of a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOption {
    pub choice: Choice,
    pub text: &'static str,
    pub category: Category,
}

/// An immutable quiz question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Unique answer-slot identifier.
    pub key: &'static str,
    pub prompt: &'static str,
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// Category recorded when `choice` is picked.
    pub fn category_for(&self, choice: Choice) -> Option<Category> {
        self.options
            .iter()
            .find(|o| o.choice == choice)
            .map(|o| o.category)
    }

    /// Reverse lookup: the symbol this question maps to `category`.
    pub fn choice_for(&self, category: Category) -> Option<Choice> {
        self.options
            .iter()
            .find(|o| o.category == category)
            .map(|o| o.choice)
    }

    /// Full display text: prompt followed by one line per option.
    pub fn display_text(&self) -> String {
        let mut text = self.prompt.to_string();
        for option in &self.options {
            text.push_str(&format!("\n{}) {}", option.choice, option.text));
        }
        text
    }
}

/// Ordered, immutable sequence of questions, validated at construction.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank, checking that it is well-formed.
    ///
    /// Every question must offer each choice symbol exactly once and map the
    /// symbols onto every category exactly once; keys must be unique.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::InvalidQuestionBank("no questions".into()));
        }

        let mut keys = HashSet::new();
        for question in &questions {
            if !keys.insert(question.key) {
                return Err(QuizError::InvalidQuestionBank(format!(
                    "duplicate question key '{}'",
                    question.key
                )));
            }
            if question.options.len() != Choice::ALL.len() {
                return Err(QuizError::InvalidQuestionBank(format!(
                    "question '{}' has {} options, expected {}",
                    question.key,
                    question.options.len(),
                    Choice::ALL.len()
                )));
            }
            for choice in Choice::ALL {
                if question.category_for(choice).is_none() {
                    return Err(QuizError::InvalidQuestionBank(format!(
                        "question '{}' is missing choice {choice}",
                        question.key
                    )));
                }
            }
            for category in Category::PRIORITY {
                if question.choice_for(category).is_none() {
                    return Err(QuizError::InvalidQuestionBank(format!(
                        "question '{}' never maps to category {category}",
                        question.key
                    )));
                }
            }
        }

        Ok(Self { questions })
    }

    /// The built-in five-question movie DNA quiz.
    pub fn standard() -> Result<Self, QuizError> {
        Self::new(standard_questions())
    }

    /// Question at zero-based index `i`.
    pub fn question_at(&self, i: usize) -> Result<&Question, QuizError> {
        self.questions.get(i).ok_or(QuizError::OutOfRange {
            index: i,
            len: self.questions.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Look a question up by its answer-slot key.
    pub fn by_key(&self, key: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.key == key)
    }
}

fn option(choice: Choice, text: &'static str, category: Category) -> QuestionOption {
    QuestionOption {
        choice,
        text,
        category,
    }
}

fn standard_questions() -> Vec<Question> {
    use Category::*;
    use Choice::*;

    vec![
        Question {
            key: "weekend",
            prompt: "ข้อ 1/5: วันหยุดในฝันของคุณเป็นแบบไหน?",
            options: vec![
                option(A, "ออกผจญภัยไปที่ที่ไม่เคยไป", Fantasy),
                option(B, "นอนกอดผ้าห่ม จิบโกโก้อุ่นๆ", Healing),
                option(C, "ตั้งเป้าหมายใหม่แล้วลุยให้สุด", Motivation),
                option(D, "ไขคดีปริศนาตอนเที่ยงคืน", Dark),
            ],
        },
        Question {
            key: "mood",
            prompt: "ข้อ 2/5: ตอนนี้ใจคุณต้องการอะไรที่สุด?",
            options: vec![
                option(A, "แรงฮึดให้กลับไปสู้ต่อ", Motivation),
                option(B, "ความระทึกที่ทำให้หัวใจเต้นแรง", Dark),
                option(C, "โลกเวทมนตร์ให้หลบหนีความจริง", Fantasy),
                option(D, "อ้อมกอดอบอุ่นและรอยยิ้ม", Healing),
            ],
        },
        Question {
            key: "hero",
            prompt: "ข้อ 3/5: ตัวละครแบบไหนที่คุณอินที่สุด?",
            options: vec![
                option(A, "คนธรรมดาที่ใจดีกับทุกคน", Healing),
                option(B, "นักเวทผู้ค้นพบพลังของตัวเอง", Fantasy),
                option(C, "แอนตี้ฮีโร่ที่มีด้านมืด", Dark),
                option(D, "นักกีฬาที่ล้มแล้วลุกขึ้นมาใหม่", Motivation),
            ],
        },
        Question {
            key: "ending",
            prompt: "ข้อ 4/5: ตอนจบแบบไหนที่ค้างในใจคุณนานที่สุด?",
            options: vec![
                option(A, "หักมุมจนต้องดูซ้ำ", Dark),
                option(B, "ชัยชนะหลังจากความพยายามทั้งหมด", Motivation),
                option(C, "ทุกคนได้กลับบ้านอย่างมีความสุข", Healing),
                option(D, "ประตูสู่โลกใหม่เพิ่งเปิดออก", Fantasy),
            ],
        },
        Question {
            key: "soundtrack",
            prompt: "ข้อ 5/5: เพลงประกอบที่ใช่สำหรับคุณคือ?",
            options: vec![
                option(A, "ออร์เคสตรายิ่งใหญ่อลังการ", Fantasy),
                option(B, "บีทหนักๆ ปลุกไฟในตัว", Motivation),
                option(C, "อะคูสติกเบาๆ ละมุนหู", Healing),
                option(D, "เสียงซินธ์หลอนๆ ชวนขนลุก", Dark),
            ],
        },
    ]
}
