//! Common test utilities and infrastructure
//!
//! Shared fixtures and a scheduler builder wired to in-memory stores, a
//! manual clock and scripted channels.

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

pub use fixtures::TestFixtures;
pub use helpers::{SchedulerBuilder, ScriptedFactory, TestHelpers, TestScheduler};
