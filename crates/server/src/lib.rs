pub mod alerting;
pub mod config;
pub mod db;
pub mod metrics;
pub mod notifications;
pub mod web;
