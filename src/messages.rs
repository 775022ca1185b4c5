use teloxide::utils::markdown::{bold, escape};

use crate::api::StatisticsRecord;

fn figure(label: &str, value: u64) -> String {
    format!("{}{}", bold(&escape(label)), escape(&value.to_string()))
}

pub fn welcome() -> String {
    escape("Hello, Welcome to the Covid19-telegram-bot. Please type /help to view all the available commands.")
}

pub fn help() -> String {
    escape(
        "Use /stats to view Covid-19 stats globally.
Use /country_stats COUNTRY to view Covid-19 stats for a particular country.
Use /countries to list all the countries affected by Covid-19.
Use /available_plots COUNTRY to visualize Covid-19 stats via different plots.",
    )
}

pub fn statistics(stats: &StatisticsRecord) -> String {
    let lines = [
        bold(&escape(&format!("{} Statistics", stats.country()))),
        String::new(),
        figure("🦠 Total Cases: ", stats.cases()),
        figure("🤒 Active: ", stats.active()),
        figure("💪🏼 Recovered: ", stats.recovered()),
        figure("☠️ Deaths: ", stats.deaths()),
        String::new(),
        bold("Today Statistics"),
        String::new(),
        figure("🦠 Today Cases: ", stats.today_cases()),
        figure("💪🏼 Recovered: ", stats.today_recovered()),
        figure("☠️ Deaths: ", stats.today_deaths()),
    ];
    lines.join("\n")
}

pub fn country_list(names: &[String]) -> String {
    escape(&format!(
        "All the available countries are as follows:\n\n{}",
        names.join(", ")
    ))
}

pub fn missing_country() -> String {
    escape("Please enter a country name. Country cannot be an empty string.")
}

pub fn invalid_country() -> String {
    escape("Please enter a valid country name. To view the available country names enter /countries")
}

pub fn invalid_plot_country() -> String {
    escape("Please enter a valid country name in order to visualize the plots.")
}

pub fn choose_plot() -> String {
    escape("Please choose a plot you would like to see:")
}

pub fn plot_pending() -> String {
    escape("The plot is being displayed just wait for a while.")
}

pub fn no_plot_session() -> String {
    escape("Please pick a country with /available_plots COUNTRY first.")
}

pub fn unknown_plot() -> String {
    escape("Sorry, I don't know this plot.")
}

pub fn source_unavailable() -> String {
    escape("Sorry, I couldn't reach the data source. Please try again later.")
}

pub fn internal_error() -> String {
    escape("Sorry, an internal error occurred :(")
}
