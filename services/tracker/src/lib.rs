//! Flowtime: personal time tracking over HTTP
//!
//! A logged-in user clocks in and out with one button and sees today's
//! intervals with their durations. The domain lives in [`models`],
//! [`durations`] and [`tracker`]; [`routes`] wires it to axum.

pub mod auth;
pub mod clock;
pub mod config;
pub mod durations;
pub mod error;
pub mod flash;
pub mod forms;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod tracker;
pub mod views;

pub use state::AppState;
