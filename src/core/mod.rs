pub mod auth;
pub mod cloudwatch;
pub mod config;
pub mod fetch;
pub mod formatter;
pub mod metadata;
pub mod models;
pub mod planner;
pub mod query;
