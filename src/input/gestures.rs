//! Swipe gesture recognition for a single contact point
//!
//! A session begins when a contact goes down, follows the contact's
//! displacement while it moves, and is classified when it lifts:
//! - Dominant axis: horizontal only when |dx| is strictly larger than |dy|
//! - Travel along that axis must exceed the threshold
//! - The contact must lift before the timeout elapses
//!
//! At most one session exists per recognizer. The recognized swipe is fired
//! from the element where the contact started, as a bubbling, cancelable
//! signal named `swiped-left`, `swiped-right`, `swiped-up` or `swiped-down`.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::touch::{ContactEvent, Point};
use crate::config::SwipeConfig;

/// Direction of a swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SwipeDirection {
    pub const ALL: [SwipeDirection; 4] = [
        SwipeDirection::Up,
        SwipeDirection::Down,
        SwipeDirection::Left,
        SwipeDirection::Right,
    ];

    /// Name of the event fired for this direction
    pub fn event_name(&self) -> &'static str {
        match self {
            SwipeDirection::Up => "swiped-up",
            SwipeDirection::Down => "swiped-down",
            SwipeDirection::Left => "swiped-left",
            SwipeDirection::Right => "swiped-right",
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// An element that can start a swipe and receive the resulting signal.
///
/// Identity is `PartialEq`: a contact that lifts over a different element
/// than it started on never produces a swipe.
pub trait SwipeTarget: Clone + PartialEq {
    /// Raw attribute value, used to resolve the element's [`SwipeConfig`]
    fn attribute(&self, name: &str) -> Option<String>;

    /// Fire a bubbling, cancelable swipe signal from this element.
    ///
    /// Returns `false` if a listener cancelled it.
    fn dispatch_swipe(&self, direction: SwipeDirection) -> bool;
}

/// Recognized swipe
#[derive(Debug, Clone)]
pub struct SwipeEvent<T> {
    pub direction: SwipeDirection,
    /// Element the contact started on
    pub target: T,
    /// Displacement from origin to last position (origin minus current)
    pub delta: Point,
    pub elapsed: Duration,
}

impl<T: SwipeTarget> SwipeEvent<T> {
    /// Fire this swipe from its target; `false` if a listener cancelled it
    pub fn dispatch(&self) -> bool {
        self.target.dispatch_swipe(self.direction)
    }
}

/// A swipe that has been fired, with the dispatch result
#[derive(Debug, Clone)]
pub struct Dispatched<T> {
    pub event: SwipeEvent<T>,
    /// A listener called `prevent_default`
    pub cancelled: bool,
}

/// State of the one in-progress contact
#[derive(Debug, Clone)]
pub struct Session<T> {
    pub target: T,
    pub origin: Point,
    pub started_at: Duration,
    pub delta: Point,
    pub config: SwipeConfig,
}

impl<T> Session<T> {
    fn new(target: T, origin: Point, started_at: Duration, config: SwipeConfig) -> Self {
        Self {
            target,
            origin,
            started_at,
            delta: Point::default(),
            config,
        }
    }

    fn update(&mut self, pos: Point) {
        // Positive x means the contact moved left, positive y means up
        self.delta = self.origin - pos;
    }
}

/// Classify a finished contact.
///
/// Returns `None` when the dominant-axis travel does not exceed the
/// threshold or the contact lasted `timeout` or longer.
pub fn classify(delta: Point, elapsed: Duration, config: &SwipeConfig) -> Option<SwipeDirection> {
    if elapsed >= config.timeout {
        return None;
    }

    if delta.x.abs() > delta.y.abs() {
        if delta.x.abs() > config.threshold {
            return Some(if delta.x > 0.0 {
                SwipeDirection::Left
            } else {
                SwipeDirection::Right
            });
        }
    } else if delta.y.abs() > config.threshold {
        return Some(if delta.y > 0.0 {
            SwipeDirection::Up
        } else {
            SwipeDirection::Down
        });
    }

    None
}

/// Swipe recognizer state machine
#[derive(Debug, Clone)]
pub struct GestureRecognizer<T> {
    /// Defaults that element attributes are resolved against
    pub config: SwipeConfig,
    session: Option<Session<T>>,
}

impl<T> Default for GestureRecognizer<T> {
    fn default() -> Self {
        Self {
            config: SwipeConfig::default(),
            session: None,
        }
    }
}

impl<T: SwipeTarget> GestureRecognizer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SwipeConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// The in-progress contact, if any
    pub fn session(&self) -> Option<&Session<T>> {
        self.session.as_ref()
    }

    pub fn has_active_session(&self) -> bool {
        self.session.is_some()
    }

    /// Handle contact start.
    ///
    /// Replaces any in-progress session, unless the target opts out with
    /// `data-swipe-ignore="true"`, in which case nothing changes.
    pub fn touch_start(&mut self, target: T, position: Point, at: Duration) {
        let config = SwipeConfig::from_attributes(&self.config, |name| target.attribute(name));
        if config.ignore {
            debug!("Contact start on ignored element, not tracking");
            return;
        }

        debug!(
            x = position.x,
            y = position.y,
            threshold = config.threshold,
            timeout_ms = config.timeout.as_millis() as u64,
            "Swipe session started"
        );
        self.session = Some(Session::new(target, position, at, config));
    }

    /// Handle contact motion
    pub fn touch_motion(&mut self, position: Point) {
        if let Some(session) = self.session.as_mut() {
            session.update(position);
        }
    }

    /// Handle contact end - returns the recognized swipe, if any.
    ///
    /// The session is consumed whatever the outcome.
    pub fn touch_up(&mut self, target: &T, at: Duration) -> Option<SwipeEvent<T>> {
        let session = self.session.take()?;

        if session.target != *target {
            debug!("Contact ended on a different element, discarding session");
            return None;
        }

        let elapsed = at.saturating_sub(session.started_at);
        let direction = classify(session.delta, elapsed, &session.config);

        debug!(
            dx = session.delta.x,
            dy = session.delta.y,
            elapsed_ms = elapsed.as_millis() as u64,
            swipe = ?direction,
            "Swipe session ended"
        );

        direction.map(|direction| SwipeEvent {
            direction,
            target: session.target,
            delta: session.delta,
            elapsed,
        })
    }

    /// Handle contact cancel - drop the session without firing
    pub fn touch_cancel(&mut self) {
        if self.session.take().is_some() {
            debug!("Swipe session cancelled");
        }
    }

    /// Feed one raw event, firing the swipe on its target when one is recognized
    pub fn handle(&mut self, event: ContactEvent<T>) -> Option<Dispatched<T>> {
        let swipe = match event {
            ContactEvent::Start { target, position, at } => {
                self.touch_start(target, position, at);
                None
            }
            ContactEvent::Move { position } => {
                self.touch_motion(position);
                None
            }
            ContactEvent::End { target, at } => self.touch_up(&target, at),
            ContactEvent::Cancel => {
                self.touch_cancel();
                None
            }
        }?;

        let cancelled = !swipe.dispatch();
        Some(Dispatched {
            event: swipe,
            cancelled,
        })
    }
}
