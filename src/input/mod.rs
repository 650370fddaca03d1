//! Input handling - contact events and swipe recognition
//!
//! This module provides:
//! - Raw single-contact events and coordinates
//! - The swipe recognizer and the target contract it dispatches through

mod gestures;
mod touch;

pub use gestures::*;
pub use touch::*;
