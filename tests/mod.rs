//! Test suite for offline-forms
//!
//! This module organizes all tests

pub mod integration;
