//! Questions and their answer options
//!
//! A question arrives from the question source with its correct answer and
//! a few incorrect ones. Before it is shown, all answers are merged and
//! shuffled into an option group where exactly one option is marked correct.

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Difficulty level reported by, or requested from, the question source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Easy questions
    Easy,
    /// Medium questions
    Medium,
    /// Hard questions
    Hard,
}

impl Difficulty {
    /// Name of the difficulty as used in source requests
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

/// A multiple choice question as delivered by the question source
///
/// Answer strings are kept verbatim: if the source repeats a string, the
/// option group will contain two identical options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Question {
    /// The question text shown to the player
    #[serde(rename = "question")]
    #[garde(length(
        min = crate::constants::question::MIN_PROMPT_LENGTH,
        max = crate::constants::question::MAX_PROMPT_LENGTH
    ))]
    pub prompt: String,
    /// The single correct answer
    #[garde(length(
        min = crate::constants::question::MIN_ANSWER_LENGTH,
        max = crate::constants::question::MAX_ANSWER_LENGTH
    ))]
    pub correct_answer: String,
    /// The wrong answers, typically three
    #[garde(length(
        min = crate::constants::question::MIN_INCORRECT_ANSWERS,
        max = crate::constants::question::MAX_INCORRECT_ANSWERS
    ))]
    pub incorrect_answers: Vec<String>,
    /// Category name, when the source provides one
    #[serde(default)]
    #[garde(skip)]
    pub category: Option<String>,
    /// Difficulty, when the source provides one
    #[serde(default)]
    #[garde(skip)]
    pub difficulty: Option<Difficulty>,
}

/// One selectable answer of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Text displayed for this option
    pub display_text: String,
    /// Whether this is the question's correct answer
    pub is_correct: bool,
    /// Index of the question this option belongs to
    pub question_index: usize,
}

impl Question {
    /// Creates a question without category or difficulty metadata
    pub fn new(
        prompt: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            correct_answer: correct_answer.into(),
            incorrect_answers: incorrect_answers.into_iter().map(Into::into).collect_vec(),
            category: None,
            difficulty: None,
        }
    }

    /// Number of options this question yields
    pub fn option_count(&self) -> usize {
        1 + self.incorrect_answers.len()
    }

    /// Builds the option group for this question in uniformly random order
    ///
    /// # Arguments
    ///
    /// * `question_index` - Position of the question within its round
    /// * `rng` - Random source used for the permutation
    ///
    /// # Returns
    ///
    /// `1 + incorrect_answers.len()` options, exactly one of which is correct
    pub fn to_options(&self, question_index: usize, rng: &mut fastrand::Rng) -> Vec<AnswerOption> {
        let mut options = std::iter::once((self.correct_answer.clone(), true))
            .chain(
                self.incorrect_answers
                    .iter()
                    .map(|answer| (answer.clone(), false)),
            )
            .map(|(display_text, is_correct)| AnswerOption {
                display_text,
                is_correct,
                question_index,
            })
            .collect_vec();

        rng.shuffle(&mut options);
        options
    }
}
