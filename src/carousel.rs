//! Clip carousel driven by swipes and arrow keys
//!
//! Clips are remote `.mp4` files named by a number. Moving forward picks a
//! random clip; moving back replays the one before the current clip. Every
//! clip shown is appended to the history, including the ones reached by
//! going back.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::input::SwipeDirection;

pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/ondersumer07/vinematik-videos/master/vid/";

fn default_source_url() -> String { DEFAULT_SOURCE_URL.to_string() }
fn default_max_clip_id() -> u32 { 3970 }

/// Carousel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselConfig {
    /// Prefix that clip ids are appended to
    #[serde(default = "default_source_url")]
    pub source_url: String,
    /// Clip ids are drawn from 1..=max_clip_id
    #[serde(default = "default_max_clip_id")]
    pub max_clip_id: u32,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            max_clip_id: default_max_clip_id(),
        }
    }
}

/// A clip to load into the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clip {
    pub id: u32,
    pub url: String,
}

/// Navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Next,
    Previous,
}

impl Command {
    /// Swipe left for a new clip, swipe right to go back
    pub fn from_swipe(direction: SwipeDirection) -> Option<Self> {
        match direction {
            SwipeDirection::Left => Some(Command::Next),
            SwipeDirection::Right => Some(Command::Previous),
            SwipeDirection::Up | SwipeDirection::Down => None,
        }
    }

    /// Map a `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" => Some(Command::Next),
            "ArrowLeft" => Some(Command::Previous),
            _ => None,
        }
    }
}

pub struct Carousel<R> {
    config: CarouselConfig,
    rng: R,
    history: Vec<u32>,
}

impl Carousel<StdRng> {
    /// Carousel seeded from operating system randomness
    pub fn from_entropy(config: CarouselConfig) -> Self {
        Self::new(config, StdRng::from_entropy())
    }

    /// Carousel with a fixed seed, for reproducible runs
    pub fn seeded(config: CarouselConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Carousel<R> {
    pub fn new(config: CarouselConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    /// Every clip id shown so far, oldest first
    pub fn history(&self) -> &[u32] {
        &self.history
    }

    pub fn current(&self) -> Option<Clip> {
        self.history.last().map(|&id| self.clip(id))
    }

    /// Show a random clip
    pub fn next(&mut self) -> Clip {
        let max = self.config.max_clip_id.max(1);
        let id = self.rng.gen_range(1..=max);
        self.show(id)
    }

    /// Show the clip before the current one again.
    ///
    /// `None` until at least two clips have been shown.
    pub fn previous(&mut self) -> Option<Clip> {
        let len = self.history.len();
        if len < 2 {
            debug!("No previous clip");
            return None;
        }
        let id = self.history[len - 2];
        Some(self.show(id))
    }

    pub fn apply(&mut self, command: Command) -> Option<Clip> {
        match command {
            Command::Next => Some(self.next()),
            Command::Previous => self.previous(),
        }
    }

    fn show(&mut self, id: u32) -> Clip {
        self.history.push(id);
        debug!(history = ?self.history, "Showing clip {}", id);
        self.clip(id)
    }

    fn clip(&self, id: u32) -> Clip {
        Clip {
            id,
            url: format!("{}{}.mp4", self.config.source_url, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(max_clip_id: u32) -> CarouselConfig {
        CarouselConfig {
            source_url: "https://clips.test/".to_string(),
            max_clip_id,
        }
    }

    #[test]
    fn test_next_stays_in_range() {
        let mut carousel = Carousel::seeded(small(7), 42);
        for _ in 0..200 {
            let clip = carousel.next();
            assert!((1..=7).contains(&clip.id));
            assert_eq!(clip.url, format!("https://clips.test/{}.mp4", clip.id));
        }
        assert_eq!(carousel.history().len(), 200);
    }

    #[test]
    fn test_previous_needs_two_clips() {
        let mut carousel = Carousel::seeded(small(100), 1);
        assert_eq!(carousel.previous(), None);
        carousel.next();
        assert_eq!(carousel.previous(), None);
        assert_eq!(carousel.history().len(), 1);
    }

    #[test]
    fn test_previous_alternates_last_two() {
        let mut carousel = Carousel::seeded(small(1000), 9);
        let a = carousel.next();
        let b = carousel.next();

        assert_eq!(carousel.previous(), Some(a.clone()));
        assert_eq!(carousel.previous(), Some(b.clone()));
        assert_eq!(carousel.previous(), Some(a.clone()));
        assert_eq!(carousel.history(), &[a.id, b.id, a.id, b.id, a.id]);
        assert_eq!(carousel.current(), Some(a));
    }

    #[test]
    fn test_zero_max_clip_id_still_picks() {
        let mut carousel = Carousel::seeded(small(0), 3);
        assert_eq!(carousel.next().id, 1);
    }

    #[test]
    fn test_commands() {
        assert_eq!(Command::from_swipe(SwipeDirection::Left), Some(Command::Next));
        assert_eq!(Command::from_swipe(SwipeDirection::Right), Some(Command::Previous));
        assert_eq!(Command::from_swipe(SwipeDirection::Up), None);
        assert_eq!(Command::from_key("ArrowRight"), Some(Command::Next));
        assert_eq!(Command::from_key("ArrowLeft"), Some(Command::Previous));
        assert_eq!(Command::from_key("Enter"), None);
    }

    #[test]
    fn test_default_source() {
        let carousel = Carousel::seeded(CarouselConfig::default(), 0);
        assert_eq!(carousel.config().max_clip_id, 3970);
        assert!(carousel.config().source_url.ends_with("/vid/"));
    }
}
