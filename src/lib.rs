//! swiped - swipe gesture recognition for touch input
//!
//! Features:
//! - Single-contact swipe recognizer firing `swiped-left`, `swiped-right`,
//!   `swiped-up` and `swiped-down` from the element a contact started on
//! - Per-element threshold, timeout and ignore attributes
//! - Clip carousel that moves forward and back on horizontal swipes
//! - Trace replay for running recorded input without a browser
//! - DOM binding behind the `web` feature

pub mod carousel;
pub mod config;
pub mod element;
pub mod error;
pub mod input;
pub mod replay;
#[cfg(feature = "web")]
pub mod web;

pub use config::{Settings, SwipeConfig};
pub use error::{ConfigError, Error, Result};
pub use input::{ContactEvent, GestureRecognizer, Point, SwipeDirection, SwipeEvent, SwipeTarget};
