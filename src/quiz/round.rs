//! A round of questions
//!
//! A round owns the questions fetched together, their shuffled option
//! groups and the player's current selection for each question. It is
//! graded synchronously from whatever selections exist at the time.

use itertools::Itertools;
use serde::Serialize;
use thiserror::Error;

use super::question::{AnswerOption, Question};

/// Errors that can occur when selecting an answer
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The question index does not exist in this round
    #[error("question {0} is not part of this round")]
    QuestionOutOfRange(usize),
    /// No option of the question has the given text
    #[error("question {0} has no such option")]
    UnknownOption(usize),
}

/// What the rendering surface gets to see of a question
///
/// Correctness markers are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    /// Index of the question within its round
    pub index: usize,
    /// The question text
    pub prompt: String,
    /// Option texts in display order
    pub options: Vec<String>,
}

/// Update messages describing a round to the rendering surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UpdateMessage {
    /// A new round is ready to be displayed
    QuestionsAnnouncement {
        /// Generation of the round being announced
        generation: u64,
        /// The questions with their option texts
        questions: Vec<QuestionView>,
    },
}

#[derive(Debug, Clone)]
struct Slot {
    question: Question,
    options: Vec<AnswerOption>,
    selected: Option<usize>,
}

/// An ordered set of questions presented together
#[derive(Debug, Clone)]
pub struct Round {
    generation: u64,
    slots: Vec<Slot>,
}

impl Round {
    /// Builds a round, shuffling each question's options independently
    pub fn new(questions: Vec<Question>, generation: u64) -> Self {
        Self::with_rng(questions, generation, &mut fastrand::Rng::new())
    }

    /// Builds a round using the provided random source
    pub fn with_rng(questions: Vec<Question>, generation: u64, rng: &mut fastrand::Rng) -> Self {
        let slots = questions
            .into_iter()
            .enumerate()
            .map(|(index, question)| Slot {
                options: question.to_options(index, rng),
                question,
                selected: None,
            })
            .collect_vec();

        Self { generation, slots }
    }

    /// Generation token of the request that produced this round
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of questions in the round
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the round has no questions
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The question at `index`
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.slots.get(index).map(|slot| &slot.question)
    }

    /// The option group of the question at `index`, in display order
    pub fn options(&self, index: usize) -> Option<&[AnswerOption]> {
        self.slots.get(index).map(|slot| slot.options.as_slice())
    }

    /// The option currently selected for the question at `index`
    pub fn selected(&self, index: usize) -> Option<&AnswerOption> {
        let slot = self.slots.get(index)?;
        slot.options.get(slot.selected?)
    }

    /// Records the player's choice for a question
    ///
    /// A later selection for the same question replaces the earlier one. When
    /// several options share the same text, the correct one among them is
    /// preferred, so picking the correct answer's text always scores.
    ///
    /// # Errors
    ///
    /// * `Error::QuestionOutOfRange` - `question_index` is not in the round
    /// * `Error::UnknownOption` - no option of the question has `option_text`
    pub fn select_answer(&mut self, question_index: usize, option_text: &str) -> Result<(), Error> {
        let slot = self
            .slots
            .get_mut(question_index)
            .ok_or(Error::QuestionOutOfRange(question_index))?;

        let matches = |option: &AnswerOption| option.display_text == option_text;
        let position = slot
            .options
            .iter()
            .position(|option| matches(option) && option.is_correct)
            .or_else(|| slot.options.iter().position(matches))
            .ok_or(Error::UnknownOption(question_index))?;

        slot.selected = Some(position);
        Ok(())
    }

    /// Counts the questions whose selected option is correct
    ///
    /// Unanswered questions count as wrong, so the result lies within
    /// `0..=self.len()`.
    pub fn grade(&self) -> usize {
        (0..self.slots.len())
            .filter_map(|index| self.selected(index))
            .filter(|option| option.is_correct)
            .count()
    }

    /// Views of every question for display
    pub fn views(&self) -> Vec<QuestionView> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| QuestionView {
                index,
                prompt: slot.question.prompt.clone(),
                options: slot
                    .options
                    .iter()
                    .map(|option| option.display_text.clone())
                    .collect_vec(),
            })
            .collect_vec()
    }

    /// Announcement of this round for the rendering surface
    pub fn announcement(&self) -> UpdateMessage {
        UpdateMessage::QuestionsAnnouncement {
            generation: self.generation,
            questions: self.views(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn create_test_questions(count: usize) -> Vec<Question> {
        (0..count)
            .map(|i| {
                Question::new(
                    format!("Question {i}"),
                    format!("right {i}"),
                    [format!("wrong {i}a"), format!("wrong {i}b"), format!("wrong {i}c")],
                )
            })
            .collect()
    }

    fn create_test_round(count: usize) -> Round {
        Round::with_rng(create_test_questions(count), 1, &mut fastrand::Rng::with_seed(5))
    }

    fn correct_text(round: &Round, index: usize) -> String {
        round
            .options(index)
            .unwrap()
            .iter()
            .find(|o| o.is_correct)
            .unwrap()
            .display_text
            .clone()
    }

    fn wrong_text(round: &Round, index: usize) -> String {
        round
            .options(index)
            .unwrap()
            .iter()
            .find(|o| !o.is_correct)
            .unwrap()
            .display_text
            .clone()
    }

    #[test]
    fn test_new_round_has_no_selection() {
        let round = create_test_round(4);

        assert_eq!(round.len(), 4);
        assert!(!round.is_empty());
        assert_eq!(round.generation(), 1);
        assert!((0..4).all(|i| round.selected(i).is_none()));
    }

    #[test]
    fn test_every_group_has_one_correct_option() {
        let round = create_test_round(10);

        for index in 0..round.len() {
            let options = round.options(index).unwrap();
            assert_eq!(options.len(), 4);
            assert_eq!(options.iter().filter(|o| o.is_correct).count(), 1);
            assert!(options.iter().all(|o| o.question_index == index));
        }
    }

    #[test]
    fn test_grade_nothing_selected() {
        let round = create_test_round(10);
        assert_eq!(round.grade(), 0);
    }

    #[test]
    fn test_grade_all_correct() {
        let mut round = create_test_round(10);
        for index in 0..round.len() {
            let text = correct_text(&round, index);
            round.select_answer(index, &text).unwrap();
        }

        assert_eq!(round.grade(), 10);
    }

    #[test]
    fn test_grade_mixed() {
        let mut round = create_test_round(6);
        for index in 0..3 {
            let text = correct_text(&round, index);
            round.select_answer(index, &text).unwrap();
        }
        for index in 3..5 {
            let text = wrong_text(&round, index);
            round.select_answer(index, &text).unwrap();
        }

        assert_eq!(round.grade(), 3);
    }

    #[test]
    fn test_reselecting_overwrites() {
        let mut round = create_test_round(1);
        let right = correct_text(&round, 0);
        let wrong = wrong_text(&round, 0);

        round.select_answer(0, &right).unwrap();
        assert_eq!(round.grade(), 1);

        round.select_answer(0, &wrong).unwrap();
        assert_eq!(round.grade(), 0);
        assert_eq!(round.selected(0).unwrap().display_text, wrong);
    }

    #[test]
    fn test_select_out_of_range() {
        let mut round = create_test_round(2);
        assert_eq!(
            round.select_answer(2, "right 2"),
            Err(Error::QuestionOutOfRange(2))
        );
    }

    #[test]
    fn test_select_unknown_option() {
        let mut round = create_test_round(2);
        assert_eq!(
            round.select_answer(0, "right 1"),
            Err(Error::UnknownOption(0))
        );
        assert!(round.selected(0).is_none());
    }

    #[test]
    fn test_duplicate_correct_text_always_scores() {
        let questions = vec![Question::new("Pick one", "Same", ["Same", "Other"])];

        for seed in 0..200 {
            let mut round =
                Round::with_rng(questions.clone(), 1, &mut fastrand::Rng::with_seed(seed));
            round.select_answer(0, "Same").unwrap();

            assert_eq!(round.grade(), 1, "seed {seed}");
            assert!(round.selected(0).unwrap().is_correct);
        }
    }

    #[test]
    fn test_duplicate_incorrect_text_selects_first() {
        let questions = vec![Question::new("Pick one", "Right", ["Twin", "Twin"])];
        let mut round = Round::with_rng(questions, 1, &mut fastrand::Rng::with_seed(1));

        round.select_answer(0, "Twin").unwrap();
        assert_eq!(round.grade(), 0);
        assert!(!round.selected(0).unwrap().is_correct);
    }

    #[test]
    fn test_views_hide_correctness() {
        let round = create_test_round(2);
        let views = round.views();

        assert_eq!(views.len(), 2);
        assert_eq!(views[1].index, 1);
        assert_eq!(views[1].prompt, "Question 1");
        assert_eq!(views[1].options.len(), 4);

        let json = serde_json::to_string(&round.announcement()).unwrap();
        assert!(json.contains("QuestionsAnnouncement"));
        assert!(!json.contains("is_correct"));
    }

    #[test]
    fn test_empty_round() {
        let round = Round::new(Vec::new(), 0);
        assert!(round.is_empty());
        assert_eq!(round.grade(), 0);
    }
}
