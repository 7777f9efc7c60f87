//! Search-and-select state machine.
//!
//! The session holds no I/O. Callers feed it [`Event`]s, run the
//! [`Command`]s it hands back (see [`crate::Dispatcher`]) and return the
//! results as [`Completion`]s. Every command carries the [`Generation`] of
//! the slot it will write; a completion whose generation is no longer
//! current is dropped, so a slow response can never overwrite a newer one.

use crate::{
    error::SessionError,
    model::{Candidate, Summary},
    resolver::SearchOutcome,
};

/// Monotonic counter identifying which trigger an in-flight task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    fn bump(&mut self) -> Generation {
        self.0 += 1;
        *self
    }
}

/// User input, already translated from whatever front end produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    QueryChanged(String),
    /// Pick the candidate at this index of the current list.
    Select(usize),
    ClearSelection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    pub generation: Generation,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTicket {
    pub generation: Generation,
    pub candidate: Candidate,
}

/// Work the session wants done.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(SearchTicket),
    Forecast(ForecastTicket),
}

/// Result of a [`Command`], handed back to [`Session::complete`].
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Suggestions { ticket: SearchTicket, outcome: SearchOutcome },
    Forecast { ticket: ForecastTicket, summary: Option<Summary> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForecastState {
    Pending,
    Resolved(Summary),
    /// Fetch failed; there is nothing to show.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub candidate: Candidate,
    pub forecast: ForecastState,
}

/// Coarse view of where the interaction is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Searching,
    SelectedPending,
    SelectedResolved,
    SelectedEmpty,
}

#[derive(Debug, Default)]
pub struct Session {
    query: String,
    suggestions: Option<SearchOutcome>,
    selection: Option<Selection>,
    search_gen: Generation,
    shown_gen: Generation,
    forecast_gen: Generation,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Candidates of the latest applied search.
    pub fn candidates(&self) -> &[Candidate] {
        self.suggestions.as_ref().map(SearchOutcome::candidates).unwrap_or(&[])
    }

    /// Latest applied search outcome. Stays in place while a newer search is pending.
    pub fn suggestions(&self) -> Option<&SearchOutcome> {
        self.suggestions.as_ref()
    }

    /// Whether the shown suggestions are older than the current query.
    pub fn is_search_pending(&self) -> bool {
        !self.query.is_empty() && self.shown_gen != self.search_gen
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Summary for the current selection, if it has arrived.
    pub fn summary(&self) -> Option<&Summary> {
        match &self.selection {
            Some(Selection { forecast: ForecastState::Resolved(s), .. }) => Some(s),
            _ => None,
        }
    }

    /// A non-empty query takes precedence: typing while a selection is shown is `Searching`.
    pub fn phase(&self) -> Phase {
        if !self.query.is_empty() {
            return Phase::Searching;
        }
        match &self.selection {
            None => Phase::Idle,
            Some(s) => match s.forecast {
                ForecastState::Pending => Phase::SelectedPending,
                ForecastState::Resolved(_) => Phase::SelectedResolved,
                ForecastState::Empty => Phase::SelectedEmpty,
            },
        }
    }

    /// Apply an event and return the command it triggers, if any.
    pub fn handle(&mut self, event: Event) -> Result<Option<Command>, SessionError> {
        match event {
            Event::QueryChanged(text) => Ok(self.change_query(text)),
            Event::Select(index) => self.select(index).map(Some),
            Event::ClearSelection => {
                self.selection = None;
                self.forecast_gen.bump();
                Ok(None)
            }
        }
    }

    fn change_query(&mut self, text: String) -> Option<Command> {
        if text == self.query {
            return None;
        }

        self.query = text;
        let generation = self.search_gen.bump();

        if self.query.is_empty() {
            self.suggestions = None;
            return None;
        }

        Some(Command::Search(SearchTicket { generation, query: self.query.clone() }))
    }

    fn select(&mut self, index: usize) -> Result<Command, SessionError> {
        let available = self.candidates().len();
        let candidate = self
            .candidates()
            .get(index)
            .cloned()
            .ok_or(SessionError::NoSuchCandidate { index, available })?;

        self.query.clear();
        self.suggestions = None;
        // Any search still in flight answered a query that is now gone.
        self.search_gen.bump();

        let generation = self.forecast_gen.bump();
        self.selection = Some(Selection { candidate: candidate.clone(), forecast: ForecastState::Pending });

        Ok(Command::Forecast(ForecastTicket { generation, candidate }))
    }

    /// Apply a finished command. Returns `false` when the result was stale and dropped.
    pub fn complete(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::Suggestions { ticket, outcome } => {
                if ticket.generation != self.search_gen {
                    tracing::debug!(query = %ticket.query, "dropping stale suggestions");
                    return false;
                }
                self.suggestions = Some(outcome);
                self.shown_gen = ticket.generation;
                true
            }
            Completion::Forecast { ticket, summary } => {
                let Some(selection) = self.selection.as_mut() else {
                    tracing::debug!(place = %ticket.candidate.name, "dropping forecast without selection");
                    return false;
                };
                if ticket.generation != self.forecast_gen {
                    tracing::debug!(place = %ticket.candidate.name, "dropping stale forecast");
                    return false;
                }
                selection.forecast = match summary {
                    Some(summary) => ForecastState::Resolved(summary),
                    None => ForecastState::Empty,
                };
                true
            }
        }
    }
}
