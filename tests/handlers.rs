mod common;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use covidstatsbot::chart::ChartRenderer;
use covidstatsbot::handlers::{self, PlotReply, PlotsReply};
use covidstatsbot::messages;
use serde_json::json;
use teloxide::types::{InlineKeyboardButtonKind, InlineKeyboardMarkup};

fn italy_api() -> Router {
    Router::new()
        .route(
            "/countries",
            get(|| async {
                Json(json!([
                    {
                        "country": "Italy",
                        "cases": 100,
                        "active": 50,
                        "recovered": 45,
                        "deaths": 5,
                        "todayCases": 10,
                        "todayRecovered": 5,
                        "todayDeaths": 1
                    },
                    common::record(Some("USA"), [700, 300, 380, 20, 30, 12, 2]),
                ]))
            }),
        )
        .route(
            "/all",
            get(|| async { Json(common::record(None, [900, 80, 800, 20, 9, 8, 2])) }),
        )
        .route(
            "/historical/:country",
            get(|Path(country): Path<String>| async move {
                if country != "italy" {
                    return Err(StatusCode::NOT_FOUND);
                }
                Ok(Json(common::timeline(&country, 60)))
            }),
        )
}

fn broken_api() -> Router {
    Router::new().fallback(|| async { StatusCode::INTERNAL_SERVER_ERROR })
}

#[tokio::test]
async fn country_stats_reply_carries_every_figure() {
    let client = common::client(italy_api()).await;

    let reply = handlers::country_stats(&client, "Italy").await;

    assert!(reply.contains("Italy"));
    for expected in [
        "Total Cases: *100",
        "Active: *50",
        "Recovered: *45",
        "Deaths: *5",
        "Today Cases: *10",
        "Recovered: *5",
        "Deaths: *1",
    ] {
        assert!(reply.contains(expected), "{expected} missing in {reply}");
    }
}

#[tokio::test]
async fn country_stats_handles_bad_input() {
    let client = common::client(italy_api()).await;

    assert_eq!(
        handlers::country_stats(&client, "Atlantis").await,
        messages::invalid_country()
    );
    assert_eq!(
        handlers::country_stats(&client, "   ").await,
        messages::missing_country()
    );
    assert!(handlers::country_stats(&client, "  ITALY ")
        .await
        .contains("*Italy Statistics*"));
}

#[tokio::test]
async fn unreachable_source_degrades_to_message() {
    let client = common::client(broken_api()).await;

    assert_eq!(handlers::stats(&client).await, messages::source_unavailable());
    assert_eq!(
        handlers::country_stats(&client, "Italy").await,
        messages::source_unavailable()
    );
    assert_eq!(
        handlers::countries(&client).await,
        messages::source_unavailable()
    );
}

#[tokio::test]
async fn global_stats_and_country_list() {
    let client = common::client(italy_api()).await;

    let stats = handlers::stats(&client).await;
    assert!(stats.starts_with("*Global Statistics*"));
    assert!(stats.contains("Total Cases: *900"));

    assert!(handlers::countries(&client).await.ends_with("italy, usa"));
}

/// Callback payloads of a plot keyboard, by button text.
fn payloads(keyboard: &InlineKeyboardMarkup) -> Vec<(String, String)> {
    keyboard
        .inline_keyboard
        .iter()
        .flatten()
        .map(|button| match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => (button.text.clone(), data.clone()),
            other => panic!("unexpected button {other:?}"),
        })
        .collect()
}

async fn keyboard_for(client: &covidstatsbot::api::Client, name: &str) -> InlineKeyboardMarkup {
    match handlers::available_plots(client, name).await {
        PlotsReply::Keyboard { text, keyboard } => {
            assert_eq!(text, messages::choose_plot());
            keyboard
        }
        PlotsReply::Text(text) => panic!("{name}: unexpected reply {text}"),
    }
}

#[tokio::test]
async fn plot_flow() {
    let client = common::client(italy_api()).await;
    let dir = tempfile::tempdir().unwrap();
    let renderer = ChartRenderer::new(dir.path().join("graph.png"));

    match handlers::plot(&client, &renderer, "cases").await {
        PlotReply::Text(text) => assert_eq!(text, messages::no_plot_session()),
        PlotReply::Photo(_) => panic!("plotted without a selected country"),
    }

    match handlers::available_plots(&client, "Atlantis").await {
        PlotsReply::Text(text) => assert_eq!(text, messages::invalid_plot_country()),
        PlotsReply::Keyboard { .. } => panic!("keyboard for unknown country"),
    }

    let keyboard = keyboard_for(&client, " Italy").await;
    let buttons = payloads(&keyboard);
    assert_eq!(buttons.len(), 6);
    assert!(buttons.iter().all(|(_, data)| data.starts_with("italy|")));

    for (text, data) in &buttons {
        match handlers::plot(&client, &renderer, data).await {
            PlotReply::Photo(png) => assert!(png.starts_with(b"\x89PNG")),
            PlotReply::Text(reply) => panic!("{text}: unexpected reply {reply}"),
        }
    }

    match handlers::plot(&client, &renderer, "italy|active").await {
        PlotReply::Text(text) => assert_eq!(text, messages::unknown_plot()),
        PlotReply::Photo(_) => panic!("plotted an unknown metric"),
    }
}

/// Two members of a group ask for different countries; the first keyboard
/// must still plot its own country.
#[tokio::test]
async fn group_chat_keyboards_keep_their_country() {
    let client = common::client(italy_api()).await;
    let dir = tempfile::tempdir().unwrap();
    let renderer = ChartRenderer::new(dir.path().join("graph.png"));

    let italy = payloads(&keyboard_for(&client, "Italy").await);
    let usa = payloads(&keyboard_for(&client, "USA").await);
    assert_eq!(usa[0].1, "usa|cases");

    // the stub only has a history for italy
    match handlers::plot(&client, &renderer, &italy[0].1).await {
        PlotReply::Photo(png) => assert!(png.starts_with(b"\x89PNG")),
        PlotReply::Text(text) => panic!("italy keyboard plotted something else: {text}"),
    }
    match handlers::plot(&client, &renderer, &usa[0].1).await {
        PlotReply::Text(text) => assert_eq!(text, messages::source_unavailable()),
        PlotReply::Photo(_) => panic!("usa keyboard plotted italy"),
    }
}
