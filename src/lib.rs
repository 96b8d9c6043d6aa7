//! A smol water-intake tracker with daily drink reminders.

pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod hydration;
pub mod notifier;
pub mod repository;
pub mod scheduler;
pub mod screen;
pub mod storage;
pub mod structs;
pub mod tasks;
pub mod theme;
pub mod timers;

pub use error::{Error, Result};
