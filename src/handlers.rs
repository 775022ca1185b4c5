use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::api::Client;
use crate::chart::{metric_color, ChartRenderer};
use crate::messages;
use crate::resolver;
use crate::series::{Metric, PlotChoice};
use crate::sessions::{PlotSession, SessionError};

/// Window fetched for the "new X vs new Y" charts.
pub const COMPARISON_DAYS: u32 = 60;

#[derive(Debug)]
pub enum PlotsReply {
    /// Show the plot keyboard below this text.
    Keyboard {
        text: String,
        keyboard: InlineKeyboardMarkup,
    },
    Text(String),
}

impl From<String> for PlotsReply {
    fn from(msg: String) -> Self {
        PlotsReply::Text(msg)
    }
}

#[derive(Debug)]
pub enum PlotReply {
    Photo(Vec<u8>),
    Text(String),
}

impl From<String> for PlotReply {
    fn from(msg: String) -> Self {
        PlotReply::Text(msg)
    }
}

macro_rules! handle_api_error {
    ($e:expr) => {
        match $e {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Statistics request failed: {e}");
                return messages::source_unavailable().into();
            }
        }
    };
}

pub async fn stats(client: &Client) -> String {
    let stats = handle_api_error!(client.fetch_global(true).await);
    messages::statistics(&stats)
}

pub async fn country_stats(client: &Client, name: &str) -> String {
    if name.trim().is_empty() {
        return messages::missing_country();
    }

    let records = handle_api_error!(client.fetch_countries(true, true).await);
    match resolver::resolve(name, &records) {
        Some(stats) => messages::statistics(stats),
        None => messages::invalid_country(),
    }
}

pub async fn countries(client: &Client) -> String {
    let names = handle_api_error!(client.country_names().await);
    messages::country_list(&names)
}

pub async fn available_plots(client: &Client, name: &str) -> PlotsReply {
    let country = resolver::normalize(name);
    if country.is_empty() {
        return messages::invalid_plot_country().into();
    }

    let names = handle_api_error!(client.country_names().await);
    if !resolver::contains(&country, &names) {
        return messages::invalid_plot_country().into();
    }

    match plot_keyboard(&country) {
        Some(keyboard) => PlotsReply::Keyboard {
            text: messages::choose_plot(),
            keyboard,
        },
        None => {
            log::warn!("Country name {country:?} is too long for plot buttons");
            messages::invalid_plot_country().into()
        }
    }
}

pub async fn plot(client: &Client, renderer: &ChartRenderer, data: &str) -> PlotReply {
    let PlotSession { country, choice } = match data.parse::<PlotSession>() {
        Ok(session) => session,
        Err(SessionError::NoCountry) => return messages::no_plot_session().into(),
        Err(e) => {
            log::warn!("Plot callback {data:?}: {e}");
            return messages::unknown_plot().into();
        }
    };

    let rendered = match choice {
        PlotChoice::Single(metric) => {
            let timeline = handle_api_error!(client.fetch_historical(&country, None).await);
            renderer
                .render_single(timeline.get(metric), metric.as_str(), Some(metric_color(metric)))
                .await
        }
        PlotChoice::Comparison(a, b) => {
            let timeline = handle_api_error!(
                client
                    .fetch_historical(&country, Some(COMPARISON_DAYS))
                    .await
            );
            renderer
                .render_comparison(
                    &timeline.get(a).to_delta(),
                    a.as_str(),
                    &timeline.get(b).to_delta(),
                    b.as_str(),
                )
                .await
        }
    };

    match rendered {
        Ok(bytes) => PlotReply::Photo(bytes),
        Err(e) => {
            log::error!("Plot {data} failed: {e}");
            messages::internal_error().into()
        }
    }
}

/// Keyboard offered after `/available_plots`, or `None` when the country
/// doesn't fit into a callback payload.
pub fn plot_keyboard(country: &str) -> Option<InlineKeyboardMarkup> {
    use Metric::*;

    let rows: [&[(&str, PlotChoice)]; 4] = [
        &[
            ("Total Cases", PlotChoice::Single(Cases)),
            ("Total Recovered", PlotChoice::Single(Recovered)),
            ("Total Deaths", PlotChoice::Single(Deaths)),
        ],
        &[(
            "New Cases vs. New Recoveries",
            PlotChoice::Comparison(Cases, Recovered),
        )],
        &[(
            "New Recoveries vs. New Deaths",
            PlotChoice::Comparison(Recovered, Deaths),
        )],
        &[(
            "New Cases vs. New Deaths",
            PlotChoice::Comparison(Cases, Deaths),
        )],
    ];

    let mut keyboard = Vec::with_capacity(rows.len());
    for row in rows {
        let mut buttons = Vec::with_capacity(row.len());
        for (text, choice) in row {
            let session = PlotSession::new(country, *choice);
            if !session.fits_callback() {
                return None;
            }
            buttons.push(InlineKeyboardButton::callback(
                text.to_string(),
                session.callback_data(),
            ));
        }
        keyboard.push(buttons);
    }
    Some(InlineKeyboardMarkup::new(keyboard))
}
