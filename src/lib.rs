//! Moodlist
//!
//! A mood-driven playlist service: free text is classified into one of five
//! moods, each mood maps to audio feature targets, and the targets drive
//! catalog recommendations that are written to a playlist. Listener
//! feedback adjusts an existing playlist through named feature deltas.

pub mod adjust;
pub mod catalog;
pub mod config;
pub mod curator;
pub mod error;
pub mod features;
pub mod inference;
pub mod mood;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, Result};

pub use adjust::{Adjustment, AdjustmentEngine};
pub use curator::{CurationStatus, Curator};
pub use features::{AudioFeatures, FeatureKey};
pub use mood::{Mood, MoodPrediction};
