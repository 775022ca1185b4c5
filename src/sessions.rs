use std::str::FromStr;

use thiserror::Error;

use crate::series::{PlotChoice, UnknownPlot};

/// Telegram rejects callback payloads longer than this (in bytes).
pub const MAX_CALLBACK_DATA: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("callback payload carries no country")]
    NoCountry,
    #[error(transparent)]
    UnknownPlot(#[from] UnknownPlot),
}

/// A plot button: the country picked with `/available_plots` and the chart
/// to draw for it. Both travel in the button's callback payload
/// (`italy|cases recovered`), so every keyboard keeps its own country no
/// matter who presses it or how old it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotSession {
    pub country: String,
    pub choice: PlotChoice,
}

impl PlotSession {
    pub fn new(country: impl Into<String>, choice: PlotChoice) -> Self {
        Self {
            country: country.into(),
            choice,
        }
    }

    pub fn callback_data(&self) -> String {
        format!("{}|{}", self.country, self.choice.callback_data())
    }

    pub fn fits_callback(&self) -> bool {
        self.callback_data().len() <= MAX_CALLBACK_DATA
    }
}

impl FromStr for PlotSession {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (country, choice) = s.rsplit_once('|').ok_or(SessionError::NoCountry)?;
        if country.trim().is_empty() {
            return Err(SessionError::NoCountry);
        }
        Ok(Self::new(country, choice.parse()?))
    }
}
