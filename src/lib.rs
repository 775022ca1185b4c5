pub mod api;
pub mod chart;
pub mod config;
pub mod handlers;
pub mod messages;
pub mod resolver;
pub mod series;
pub mod sessions;
pub mod users;
