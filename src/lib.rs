pub mod api;
pub mod chart;
pub mod config;
pub mod currency;
pub mod error;
pub mod output;
pub mod pages;
pub mod shell;
