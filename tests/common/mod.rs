#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use covidstatsbot::api::Client;
use serde_json::{json, Value};
use url::Url;

/// Serves `router` on an ephemeral local port for the rest of the test.
pub async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub api");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub api");
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

pub async fn client(router: Router) -> Client {
    let base = serve(router).await;
    Client::new(base, Duration::from_secs(5)).unwrap()
}

pub fn record(country: Option<&str>, figures: [u64; 7]) -> Value {
    let [cases, active, recovered, deaths, today_cases, today_recovered, today_deaths] = figures;
    let mut value = json!({
        "cases": cases,
        "active": active,
        "recovered": recovered,
        "deaths": deaths,
        "todayCases": today_cases,
        "todayRecovered": today_recovered,
        "todayDeaths": today_deaths,
    });
    if let Some(country) = country {
        value["country"] = json!(country);
    }
    value
}

pub fn timeline(country: &str, days: usize) -> Value {
    let series = |scale: i64| {
        let mut map = serde_json::Map::new();
        for day in 0..days {
            map.insert(
                format!("3/{}/20", day + 1),
                json!(scale * (day as i64) * (day as i64)),
            );
        }
        Value::Object(map)
    };
    json!({
        "country": country,
        "province": ["mainland"],
        "timeline": {
            "cases": series(10),
            "deaths": series(1),
            "recovered": series(5),
        }
    })
}
