//! Touch input handling

use std::ops::Sub;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A position in the host's coordinate space (CSS pixels in the browser)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Raw single-contact event from the host.
///
/// Only the first active contact is reported; additional fingers are not
/// tracked. `at` is measured from whatever epoch the host uses, as long as it
/// is the same for every event fed to one recognizer.
#[derive(Debug, Clone)]
pub enum ContactEvent<T> {
    Start {
        target: T,
        position: Point,
        at: Duration,
    },
    Move {
        position: Point,
    },
    End {
        target: T,
        at: Duration,
    },
    Cancel,
}
