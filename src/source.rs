//! Question sources
//!
//! A question source hands out batches of multiple choice questions. The
//! main implementation queries the Open Trivia Database over HTTP; an
//! in-memory bank is available for offline play.

use async_trait::async_trait;
use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants,
    quiz::question::{Difficulty, Question},
};

/// Errors that can occur while fetching questions
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The service could not be reached, refused the request or had nothing to offer
    #[error("question source is unavailable: {0}")]
    Unavailable(String),
    /// The service answered with something that is not a batch of questions
    #[error("question source sent a malformed response: {0}")]
    Malformed(String),
}

/// Provider of question batches
#[async_trait(?Send)]
pub trait QuestionSource {
    /// Fetches up to `count` questions
    ///
    /// # Errors
    ///
    /// * `Error::Unavailable` - the request failed or returned no questions
    /// * `Error::Malformed` - the response could not be read as questions
    async fn fetch_batch(&self, count: usize) -> Result<Vec<Question>, Error>;
}

/// Optional filters applied to remote requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFilter {
    /// Numeric category id of the remote service
    pub category: Option<u32>,
    /// Requested difficulty
    pub difficulty: Option<Difficulty>,
}

#[derive(Deserialize)]
struct OpenTriviaResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<Question>,
}

/// Describes a non-zero response code of the Open Trivia Database
fn describe_response_code(code: u8) -> &'static str {
    match code {
        1 => "not enough questions for the query",
        2 => "invalid request parameter",
        3 => "session token not found",
        4 => "session token exhausted",
        5 => "rate limited",
        _ => "unknown response code",
    }
}

/// Question source backed by the Open Trivia Database
#[derive(Debug, Clone)]
pub struct OpenTriviaSource {
    client: reqwest::Client,
    endpoint: String,
    filter: SourceFilter,
}

impl Default for OpenTriviaSource {
    fn default() -> Self {
        Self::new(constants::source::OPEN_TRIVIA_ENDPOINT)
    }
}

impl OpenTriviaSource {
    /// Creates a source querying `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            filter: SourceFilter::default(),
        }
    }

    /// Restricts requests with the given filter
    #[must_use]
    pub fn with_filter(mut self, filter: SourceFilter) -> Self {
        self.filter = filter;
        self
    }

    fn query(&self, count: usize) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("amount", count.to_string()),
            ("type", constants::source::QUESTION_TYPE.to_owned()),
        ];
        if let Some(category) = self.filter.category {
            query.push(("category", category.to_string()));
        }
        if let Some(difficulty) = self.filter.difficulty {
            query.push(("difficulty", difficulty.as_str().to_owned()));
        }
        query
    }
}

/// Turns a response body into validated questions
fn parse_batch(body: &str) -> Result<Vec<Question>, Error> {
    let response: OpenTriviaResponse =
        serde_json::from_str(body).map_err(|e| Error::Malformed(e.to_string()))?;

    if response.response_code != 0 {
        return Err(Error::Unavailable(format!(
            "response code {}: {}",
            response.response_code,
            describe_response_code(response.response_code)
        )));
    }
    if response.results.is_empty() {
        return Err(Error::Unavailable("no questions returned".to_owned()));
    }
    if let Some((index, report)) = response
        .results
        .iter()
        .enumerate()
        .find_map(|(i, question)| question.validate().err().map(|report| (i, report)))
    {
        return Err(Error::Malformed(format!("question {index}: {report}")));
    }

    Ok(response.results)
}

#[async_trait(?Send)]
impl QuestionSource for OpenTriviaSource {
    async fn fetch_batch(&self, count: usize) -> Result<Vec<Question>, Error> {
        tracing::debug!(endpoint = %self.endpoint, count, "requesting questions");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(count))
            .send()
            .await
            .map_err(|e| Error::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Unavailable(format!("HTTP {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Unavailable(e.to_string()))?;

        parse_batch(&body)
    }
}

/// In-memory question bank
///
/// Serves the first `count` questions of its pool on every request.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    questions: Vec<Question>,
}

impl StaticSource {
    /// Creates a bank from the given questions
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

#[async_trait(?Send)]
impl QuestionSource for StaticSource {
    async fn fetch_batch(&self, count: usize) -> Result<Vec<Question>, Error> {
        if self.questions.is_empty() || count == 0 {
            return Err(Error::Unavailable("question bank is empty".to_owned()));
        }
        Ok(self.questions.iter().take(count).cloned().collect_vec())
    }
}
