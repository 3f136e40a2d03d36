//! HTTP trigger surface for the promotion scheduler
//!
//! Exposes manual and auto-promote triggers plus a cadence view over a
//! shared scheduler instance.

pub mod error;
pub mod state;
pub mod traits;
pub mod web;
pub mod webserver_impl;

// Re-export main types
pub use error::{WebServerError, WebServerResult};
pub use state::AppState;
pub use traits::PromotionTrigger;
pub use webserver_impl::WebServer;
