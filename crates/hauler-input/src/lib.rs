//! Action-based input pipeline: device capture, configurable controls,
//! semantic translation, and per-screen dispatch with debounce.

pub mod action;
pub mod controls;
pub mod gamepad;
pub mod manager;
pub mod processor;
pub mod raw_map;
