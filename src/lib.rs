pub mod ai;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod llms_txt;
pub mod metrics;
