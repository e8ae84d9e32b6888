//! Session control
//!
//! The session controller ties the quiz engine, the identity store, the
//! score ledger and the rendering surface together. It reacts to the page's
//! commands (load, answer selection, submission, "new player") and moves
//! through its phases:
//!
//! `Idle -> AwaitingIdentity -> RoundInProgress -> Grading -> RoundComplete -> RoundInProgress`
//!
//! Source and storage failures never escape the controller: they are logged,
//! reported to the surface, and the session carries on.

use std::cell::Cell;

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::{
    config::SessionConfig,
    constants,
    identity::IdentityStore,
    ledger::{Ledger, ScoreRecord},
    quiz::{
        engine::{self, QuizEngine, RoundOutcome, RoundTicket},
        question::Question,
        round::{self, Round},
    },
    session::Surface,
    source::{self, QuestionSource},
    storage::{self, KeyValueStore},
};

/// Phases of a quiz session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No round has been loaded yet
    #[default]
    Idle,
    /// The session is starting: identity is checked and the first round requested
    AwaitingIdentity,
    /// Questions are displayed and accept selections
    RoundInProgress,
    /// A submission is being graded
    Grading,
    /// The submission was graded and recorded; the next round is being requested
    RoundComplete,
}

/// Errors returned to the caller of a session command
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No round has been loaded yet
    #[error("no round is active")]
    NoActiveRound,
    /// Questions are still loading
    #[error("questions are still loading")]
    RoundLoading,
    /// The selection does not match the current round
    #[error(transparent)]
    Round(#[from] round::Error),
}

impl From<engine::Error> for Error {
    fn from(error: engine::Error) -> Self {
        match error {
            engine::Error::NoActiveRound => Self::NoActiveRound,
            engine::Error::Round(e) => Self::Round(e),
        }
    }
}

/// Update messages about the session sent to the rendering surface
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub enum UpdateMessage {
    /// A round has been requested; show the loading indicator
    Loading,
    /// The round request failed; the previous round (if any) is still shown
    FetchFailed {
        /// Human readable description of the failure
        reason: String,
    },
    /// The name the player is currently playing under, if any
    Identity {
        /// Stored player name
        player: Option<String>,
    },
    /// Every recorded score, in recording order
    Scores(Vec<ScoreRecord>),
    /// Result of the latest submission
    Score {
        /// Name the submission was recorded under
        player: String,
        /// Number of correct answers
        score: usize,
        /// Number of questions in the graded round
        count: usize,
    },
    /// Persistent storage failed; the session continues without it
    StorageUnavailable {
        /// Human readable description of the failure
        reason: String,
    },
}

/// Outcome of a graded submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    /// Name the submission was made under
    pub player: String,
    /// Number of correct answers
    pub score: usize,
    /// Number of questions in the graded round
    pub question_count: usize,
    /// Whether the score reached the ledger
    pub recorded: bool,
}

/// Drives a quiz session
///
/// Collaborators are handed over at construction; the controller never looks
/// anything up ambiently.
pub struct SessionController<Q, I, L, S> {
    config: SessionConfig,
    engine: QuizEngine<Q>,
    identity: IdentityStore<I>,
    ledger: Ledger<L>,
    surface: S,
    phase: Phase,
    storage_degraded: Cell<bool>,
}

impl<Q, I, L, S> SessionController<Q, I, L, S>
where
    Q: QuestionSource,
    I: KeyValueStore,
    L: KeyValueStore,
    S: Surface,
{
    /// Creates a controller from its collaborators
    ///
    /// # Errors
    ///
    /// Returns the validation report if `config` is out of bounds.
    pub fn new(
        config: SessionConfig,
        engine: QuizEngine<Q>,
        identity: IdentityStore<I>,
        ledger: Ledger<L>,
        surface: S,
    ) -> Result<Self, garde::Report> {
        config.validate()?;

        Ok(Self {
            config,
            engine,
            identity,
            ledger,
            surface,
            phase: Phase::Idle,
            storage_degraded: Cell::new(false),
        })
    }

    /// The current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The quiz engine
    pub fn engine(&self) -> &QuizEngine<Q> {
        &self.engine
    }

    /// The rendering surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The round currently displayed, if any
    pub fn round(&self) -> Option<&Round> {
        self.engine.round()
    }

    /// Whether a round request is outstanding
    pub fn is_loading(&self) -> bool {
        self.engine.is_loading()
    }

    /// Whether a storage failure has been observed during this session
    pub fn is_storage_degraded(&self) -> bool {
        self.storage_degraded.get()
    }

    fn send(&self, message: UpdateMessage) {
        self.surface.send_message(&message.into());
    }

    fn set_phase(&mut self, phase: Phase) {
        tracing::trace!(from = ?self.phase, to = ?phase, "phase change");
        self.phase = phase;
    }

    /// Reports a storage failure once, then only logs repeats
    fn storage_failed(&self, error: &storage::Error) {
        if self.storage_degraded.replace(true) {
            tracing::debug!(%error, "storage still unavailable");
        } else {
            tracing::warn!(%error, "storage unavailable, continuing in memory");
            self.send(UpdateMessage::StorageUnavailable {
                reason: error.to_string(),
            });
        }
    }

    /// The stored player name, if any
    pub fn player(&self) -> Option<String> {
        self.identity.get().unwrap_or_else(|e| {
            self.storage_failed(&e);
            None
        })
    }

    /// Every recorded score, or `None` if the ledger cannot be read
    pub fn scores(&self) -> Option<Vec<ScoreRecord>> {
        self.ledger
            .all()
            .inspect_err(|e| self.storage_failed(e))
            .ok()
    }

    fn announce_identity(&self) {
        self.send(UpdateMessage::Identity {
            player: self.player(),
        });
    }

    fn announce_scores(&self) {
        if let Some(scores) = self.scores() {
            self.send(UpdateMessage::Scores(scores));
        }
    }

    /// Starts the session: shows identity and scores, then loads a round
    pub async fn load(&mut self) -> bool {
        self.set_phase(Phase::AwaitingIdentity);
        self.announce_identity();
        self.announce_scores();
        self.start_round().await
    }

    /// Registers a round request and shows the loading indicator
    ///
    /// Use together with [`SessionController::finish_round`] when the fetch is
    /// driven outside the controller.
    pub fn begin_round(&mut self) -> RoundTicket {
        let ticket = self.engine.begin_round(self.config.question_count);
        self.send(UpdateMessage::Loading);
        ticket
    }

    /// Applies a fetched batch
    ///
    /// # Returns
    ///
    /// `true` if the batch became the displayed round, `false` if it was
    /// stale or the fetch failed
    pub fn finish_round(
        &mut self,
        ticket: RoundTicket,
        result: Result<Vec<Question>, source::Error>,
    ) -> bool {
        match self.engine.finish_round(ticket, result) {
            Ok(RoundOutcome::Started) => {
                self.set_phase(Phase::RoundInProgress);
                if let Some(round) = self.engine.round() {
                    self.surface.send_message(&round.announcement().into());
                }
                true
            }
            Ok(RoundOutcome::Superseded) => false,
            Err(error) => {
                tracing::warn!(%error, "could not load questions");
                self.send(UpdateMessage::FetchFailed {
                    reason: error.to_string(),
                });
                let phase = if self.engine.round().is_some() {
                    Phase::RoundInProgress
                } else {
                    Phase::Idle
                };
                self.set_phase(phase);
                false
            }
        }
    }

    /// Fetches a fresh round and displays it
    ///
    /// Also serves as the retry command after a failed fetch.
    ///
    /// # Returns
    ///
    /// `true` if a new round is displayed
    pub async fn start_round(&mut self) -> bool {
        let ticket = self.begin_round();
        let result = self.engine.source().fetch_batch(ticket.count).await;
        self.finish_round(ticket, result)
    }

    /// Records the player's choice for a question
    ///
    /// # Errors
    ///
    /// * `Error::NoActiveRound` - no round has been loaded
    /// * `Error::Round` - the question or option does not exist
    pub fn select_answer(&mut self, question_index: usize, option_text: &str) -> Result<(), Error> {
        Ok(self.engine.select_answer(question_index, option_text)?)
    }

    /// Works out the name a submission is recorded under
    ///
    /// A stored identity takes precedence over the name field. Without one,
    /// the trimmed name field is used, or the anonymous sentinel when it is
    /// blank, and that name is remembered.
    fn resolve_player(&self, name_field: &str) -> String {
        if let Some(existing) = self.player() {
            return existing;
        }

        let typed = name_field.trim();
        let player = if typed.is_empty() {
            constants::identity::ANONYMOUS
        } else {
            typed
        };

        if let Err(e) = self.identity.set(player, self.config.identity_ttl_days) {
            self.storage_failed(&e);
        }
        player.to_owned()
    }

    /// Grades the displayed round, records the score and loads the next round
    ///
    /// Grading uses the selections present when this is called. The score is
    /// reported even if it cannot be stored.
    ///
    /// # Errors
    ///
    /// * `Error::RoundLoading` - a round request is outstanding
    /// * `Error::NoActiveRound` - no round has been loaded
    pub async fn submit(&mut self, name_field: &str) -> Result<Submission, Error> {
        if self.engine.is_loading() {
            return Err(Error::RoundLoading);
        }
        let question_count = self.engine.round().map(Round::len).ok_or(Error::NoActiveRound)?;

        let player = self.resolve_player(name_field);

        self.set_phase(Phase::Grading);
        let score = self.engine.grade().unwrap_or_default();
        let recorded = self
            .ledger
            .record(ScoreRecord::new(player.clone(), score))
            .inspect_err(|e| self.storage_failed(e))
            .is_ok();
        tracing::info!(%player, score, question_count, recorded, "submission graded");
        self.set_phase(Phase::RoundComplete);

        self.send(UpdateMessage::Score {
            player: player.clone(),
            score,
            count: question_count,
        });
        self.announce_scores();
        self.announce_identity();

        self.start_round().await;

        Ok(Submission {
            player,
            score,
            question_count,
            recorded,
        })
    }

    /// Forgets the player and their scores, then loads a fresh round
    pub async fn new_player(&mut self) -> bool {
        if let Err(e) = self.identity.clear() {
            self.storage_failed(&e);
        }
        if let Err(e) = self.ledger.clear() {
            self.storage_failed(&e);
        }
        self.engine.discard_round();
        self.set_phase(Phase::Idle);
        tracing::info!("new player");

        self.announce_identity();
        self.announce_scores();
        self.start_round().await
    }
}
