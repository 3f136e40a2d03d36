//! Common test utilities for router tests

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;
