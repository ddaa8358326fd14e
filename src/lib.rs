pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod filters;
pub mod input_utils;
pub mod instruments;
pub mod journal;
pub mod migration;
pub mod models;
pub mod net_worth;
pub mod optimizer;
pub mod performance;
pub mod setup_analytics;
pub mod trade_math;
