//! Round lifecycle
//!
//! The engine requests question batches from its source and turns them into
//! rounds. Every request is tagged with a generation; a result only becomes
//! the current round if no newer request was started in the meantime.

use serde::Serialize;
use thiserror::Error;

use crate::source::{self, QuestionSource};

use super::{
    question::Question,
    round::{self, Round},
};

/// Errors that can occur when acting on the current round
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No round has been started yet
    #[error("no round is active")]
    NoActiveRound,
    /// The round rejected the selection
    #[error(transparent)]
    Round(#[from] round::Error),
}

/// Handle for an outstanding round request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTicket {
    /// Generation the request belongs to
    pub generation: u64,
    /// Number of questions requested
    pub count: usize,
}

/// What happened to a fetched batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The batch became the current round
    Started,
    /// A newer request had been started; the batch was discarded
    Superseded,
}

/// Orchestrates fetching, shuffling and grading of rounds
#[derive(Debug)]
pub struct QuizEngine<Q> {
    source: Q,
    generation: u64,
    in_flight: bool,
    current: Option<Round>,
    rng: fastrand::Rng,
}

impl<Q: QuestionSource> QuizEngine<Q> {
    /// Creates an engine with no active round
    pub fn new(source: Q) -> Self {
        Self::with_rng(source, fastrand::Rng::new())
    }

    /// Creates an engine shuffling options with the given random source
    pub fn with_rng(source: Q, rng: fastrand::Rng) -> Self {
        Self {
            source,
            generation: 0,
            in_flight: false,
            current: None,
            rng,
        }
    }

    /// The question source
    pub fn source(&self) -> &Q {
        &self.source
    }

    /// Generation of the most recent request
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the most recent request is still outstanding
    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// The current round, if one has been started
    pub fn round(&self) -> Option<&Round> {
        self.current.as_ref()
    }

    /// Registers a new round request, superseding any outstanding one
    pub fn begin_round(&mut self, count: usize) -> RoundTicket {
        self.generation += 1;
        self.in_flight = true;
        RoundTicket {
            generation: self.generation,
            count,
        }
    }

    /// Applies the result of a request started with [`QuizEngine::begin_round`]
    ///
    /// Results of superseded requests are dropped, whether they succeeded or
    /// not. A failure for the current request leaves the previous round in
    /// place.
    ///
    /// # Errors
    ///
    /// Returns the source error when the current request failed.
    pub fn finish_round(
        &mut self,
        ticket: RoundTicket,
        result: Result<Vec<Question>, source::Error>,
    ) -> Result<RoundOutcome, source::Error> {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding superseded question batch"
            );
            return Ok(RoundOutcome::Superseded);
        }
        self.in_flight = false;

        let questions = result?;
        if questions.is_empty() {
            return Err(source::Error::Unavailable("no questions returned".to_owned()));
        }

        tracing::info!(
            generation = ticket.generation,
            questions = questions.len(),
            "round started"
        );
        self.current = Some(Round::with_rng(questions, ticket.generation, &mut self.rng));
        Ok(RoundOutcome::Started)
    }

    /// Fetches `count` questions and makes them the current round
    ///
    /// # Errors
    ///
    /// Returns the source error when the fetch failed; the previous round is
    /// kept.
    pub async fn start_round(&mut self, count: usize) -> Result<RoundOutcome, source::Error> {
        let ticket = self.begin_round(count);
        let result = self.source.fetch_batch(ticket.count).await;
        self.finish_round(ticket, result)
    }

    /// Drops the current round and marks any outstanding request as stale
    pub fn discard_round(&mut self) {
        self.current = None;
        if self.in_flight {
            self.generation += 1;
            self.in_flight = false;
        }
    }

    /// Records the player's choice in the current round
    ///
    /// # Errors
    ///
    /// * `Error::NoActiveRound` - no round has been started
    /// * `Error::Round` - the question or option does not exist
    pub fn select_answer(&mut self, question_index: usize, option_text: &str) -> Result<(), Error> {
        Ok(self
            .current
            .as_mut()
            .ok_or(Error::NoActiveRound)?
            .select_answer(question_index, option_text)?)
    }

    /// Grades the current round, if any
    pub fn grade(&self) -> Option<usize> {
        self.current.as_ref().map(Round::grade)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::{cell::RefCell, collections::VecDeque};

    use async_trait::async_trait;

    use super::*;
    use crate::source::StaticSource;

    /// Replies to each request with the next scripted result
    struct ScriptedSource {
        replies: RefCell<VecDeque<Result<Vec<Question>, source::Error>>>,
    }

    impl ScriptedSource {
        fn new(replies: Vec<Result<Vec<Question>, source::Error>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
            }
        }
    }

    #[async_trait(?Send)]
    impl QuestionSource for ScriptedSource {
        async fn fetch_batch(&self, _count: usize) -> Result<Vec<Question>, source::Error> {
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(source::Error::Unavailable("script exhausted".into())))
        }
    }

    fn create_test_questions(prefix: &str, count: usize) -> Vec<Question> {
        (0..count)
            .map(|i| {
                Question::new(
                    format!("{prefix} {i}"),
                    "right",
                    ["wrong a", "wrong b", "wrong c"],
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_start_round() {
        let mut engine = QuizEngine::new(StaticSource::new(create_test_questions("Q", 10)));
        assert!(engine.round().is_none());

        let outcome = engine.start_round(10).await.unwrap();

        assert_eq!(outcome, RoundOutcome::Started);
        assert!(!engine.is_loading());
        let round = engine.round().unwrap();
        assert_eq!(round.len(), 10);
        assert_eq!(round.generation(), 1);
        assert_eq!(engine.grade(), Some(0));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_round() {
        let mut engine = QuizEngine::new(ScriptedSource::new(vec![
            Ok(create_test_questions("first", 3)),
            Err(source::Error::Unavailable("offline".into())),
            Err(source::Error::Malformed("garbage".into())),
        ]));

        engine.start_round(3).await.unwrap();
        engine.select_answer(0, "right").unwrap();

        assert_eq!(
            engine.start_round(3).await,
            Err(source::Error::Unavailable("offline".into()))
        );
        assert_eq!(
            engine.start_round(3).await,
            Err(source::Error::Malformed("garbage".into()))
        );

        assert!(!engine.is_loading());
        let round = engine.round().unwrap();
        assert_eq!(round.question(0).unwrap().prompt, "first 0");
        assert_eq!(engine.grade(), Some(1));

        engine.select_answer(1, "right").unwrap();
        assert_eq!(engine.grade(), Some(2));
    }

    #[tokio::test]
    async fn test_stale_result_is_discarded() {
        let mut engine = QuizEngine::new(ScriptedSource::new(vec![
            Ok(create_test_questions("older", 2)),
            Ok(create_test_questions("newer", 2)),
        ]));

        let older = engine.begin_round(2);
        let newer = engine.begin_round(2);
        assert!(engine.is_loading());

        let older_result = engine.source().fetch_batch(older.count).await;
        let newer_result = engine.source().fetch_batch(newer.count).await;

        assert_eq!(
            engine.finish_round(newer, newer_result),
            Ok(RoundOutcome::Started)
        );
        assert_eq!(
            engine.finish_round(older, older_result),
            Ok(RoundOutcome::Superseded)
        );

        let round = engine.round().unwrap();
        assert_eq!(round.generation(), newer.generation);
        assert_eq!(round.question(0).unwrap().prompt, "newer 0");
    }

    #[test]
    fn test_stale_failure_is_ignored() {
        let mut engine = QuizEngine::new(StaticSource::default());
        let older = engine.begin_round(2);
        let newer = engine.begin_round(2);

        assert_eq!(
            engine.finish_round(older, Err(source::Error::Unavailable("late".into()))),
            Ok(RoundOutcome::Superseded)
        );
        assert!(engine.is_loading());

        engine
            .finish_round(newer, Ok(create_test_questions("Q", 1)))
            .unwrap();
        assert!(!engine.is_loading());
    }

    #[test]
    fn test_empty_batch_is_unavailable() {
        let mut engine = QuizEngine::new(StaticSource::default());
        let ticket = engine.begin_round(5);

        assert!(matches!(
            engine.finish_round(ticket, Ok(Vec::new())),
            Err(source::Error::Unavailable(_))
        ));
        assert!(engine.round().is_none());
    }

    #[test]
    fn test_generation_is_monotonic() {
        let mut engine = QuizEngine::new(StaticSource::default());
        let tickets: Vec<_> = (0..5).map(|_| engine.begin_round(1)).collect();

        assert!(tickets.windows(2).all(|w| w[0].generation < w[1].generation));
        assert_eq!(engine.generation(), 5);
    }

    #[test]
    fn test_discard_round_invalidates_pending_request() {
        let mut engine = QuizEngine::new(StaticSource::default());
        let first = engine.begin_round(1);
        engine
            .finish_round(first, Ok(create_test_questions("Q", 1)))
            .unwrap();

        let pending = engine.begin_round(1);
        engine.discard_round();

        assert!(engine.round().is_none());
        assert!(!engine.is_loading());
        assert_eq!(
            engine.finish_round(pending, Ok(create_test_questions("late", 1))),
            Ok(RoundOutcome::Superseded)
        );
        assert!(engine.round().is_none());
    }

    #[tokio::test]
    async fn test_invalid_selection() {
        let mut engine = QuizEngine::new(StaticSource::new(create_test_questions("Q", 2)));
        engine.start_round(2).await.unwrap();

        assert_eq!(
            engine.select_answer(5, "right"),
            Err(Error::Round(round::Error::QuestionOutOfRange(5)))
        );
        assert_eq!(
            engine.select_answer(0, "nope"),
            Err(Error::Round(round::Error::UnknownOption(0)))
        );
    }

    #[tokio::test]
    async fn test_seeded_engines_shuffle_alike() {
        let questions = create_test_questions("Q", 5);
        let mut first = QuizEngine::with_rng(
            StaticSource::new(questions.clone()),
            fastrand::Rng::with_seed(9),
        );
        let mut second =
            QuizEngine::with_rng(StaticSource::new(questions), fastrand::Rng::with_seed(9));

        first.start_round(5).await.unwrap();
        second.start_round(5).await.unwrap();

        assert_eq!(first.round().unwrap().views(), second.round().unwrap().views());
    }

    #[test]
    fn test_select_without_round() {
        let mut engine = QuizEngine::new(StaticSource::default());
        assert_eq!(engine.select_answer(0, "right"), Err(Error::NoActiveRound));
        assert_eq!(engine.grade(), None);
    }
}
