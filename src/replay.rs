//! Trace replay
//!
//! A trace is a TOML file describing an element tree and a list of recorded
//! input steps:
//!
//! ```toml
//! [[element]]
//! id = "page"
//!
//! [[element]]
//! id = "player"
//! parent = "page"
//! attributes = { "data-swipe-threshold" = "30" }
//!
//! [[step]]
//! kind = "start"
//! target = "player"
//! x = 100.0
//! y = 100.0
//! at_ms = 0
//!
//! [[step]]
//! kind = "move"
//! x = 60.0
//! y = 100.0
//!
//! [[step]]
//! kind = "end"
//! target = "player"
//! at_ms = 120
//! ```
//!
//! Replaying feeds the contact steps through a [`GestureRecognizer`]. When a
//! carousel is attached it listens on the root elements, so it only sees
//! swipes that bubble all the way up.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::carousel::{Carousel, Command};
use crate::config::SwipeConfig;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::input::{ContactEvent, GestureRecognizer, Point, SwipeDirection};

/// An element declared by a trace
#[derive(Debug, Clone, Deserialize)]
pub struct ElementSpec {
    pub id: String,
    #[serde(default)]
    pub tag: Option<String>,
    /// Must name an element declared earlier in the file
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Install a listener that cancels every swipe reaching this element
    #[serde(default)]
    pub prevent_default: bool,
    /// Install a listener that stops every swipe from bubbling past this element
    #[serde(default)]
    pub stop_propagation: bool,
}

/// One recorded input step
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Step {
    Start { target: String, x: f64, y: f64, at_ms: u64 },
    Move { x: f64, y: f64 },
    End { target: String, at_ms: u64 },
    Cancel,
    /// Key press, by `KeyboardEvent.key` name
    Key { key: String },
    /// The playing clip reached its end
    Ended,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Trace {
    #[serde(default, rename = "element")]
    pub elements: Vec<ElementSpec>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// What a step produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outcome {
    Swipe {
        step: usize,
        event: &'static str,
        target: String,
        elapsed_ms: u64,
        cancelled: bool,
    },
    Clip {
        step: usize,
        command: Command,
        id: u32,
        url: String,
    },
}

/// Elements of a trace, by id
pub struct Scene {
    elements: HashMap<String, Element>,
    roots: Vec<Element>,
}

impl Scene {
    pub fn get(&self, id: &str) -> Result<&Element> {
        self.elements
            .get(id)
            .ok_or_else(|| Error::Trace(format!("unknown element \"{}\"", id)))
    }

    pub fn roots(&self) -> &[Element] {
        &self.roots
    }
}

impl Trace {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let trace = Self::from_toml(&contents)?;
        info!(
            elements = trace.elements.len(),
            steps = trace.steps.len(),
            "Loaded trace from {:?}",
            path
        );
        Ok(trace)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Build the element tree
    pub fn scene(&self) -> Result<Scene> {
        let mut elements: HashMap<String, Element> = HashMap::new();
        let mut roots = Vec::new();

        for spec in &self.elements {
            if elements.contains_key(&spec.id) {
                return Err(Error::Trace(format!("duplicate element \"{}\"", spec.id)));
            }

            let tag = spec.tag.clone().unwrap_or_else(|| "div".to_string());
            let el = match &spec.parent {
                Some(parent) => elements
                    .get(parent)
                    .ok_or_else(|| {
                        Error::Trace(format!(
                            "element \"{}\" has undeclared parent \"{}\"",
                            spec.id, parent
                        ))
                    })?
                    .child(tag),
                None => {
                    let el = Element::new(tag);
                    roots.push(el.clone());
                    el
                }
            };

            if spec.attributes.contains_key("id") {
                return Err(Error::Trace(format!(
                    "element \"{}\" sets \"id\" in attributes; use the id field",
                    spec.id
                )));
            }
            el.set_attribute("id", spec.id.clone());
            for (name, value) in &spec.attributes {
                el.set_attribute(name.clone(), value.clone());
            }
            for direction in SwipeDirection::ALL {
                if spec.prevent_default {
                    el.add_listener(direction, |signal| signal.prevent_default());
                }
                if spec.stop_propagation {
                    el.add_listener(direction, |signal| signal.stop_propagation());
                }
            }

            elements.insert(spec.id.clone(), el);
        }

        Ok(Scene { elements, roots })
    }

    /// Replay contact steps and report every recognized swipe
    pub fn swipes(&self, config: &SwipeConfig) -> Result<Vec<Outcome>> {
        self.run::<StdRng>(config, None)
    }

    /// Replay all steps, driving `carousel` from swipes, keys and clip ends
    pub fn drive<R: Rng>(&self, config: &SwipeConfig, carousel: &mut Carousel<R>) -> Result<Vec<Outcome>> {
        self.run(config, Some(carousel))
    }

    fn run<R: Rng>(&self, config: &SwipeConfig, mut carousel: Option<&mut Carousel<R>>) -> Result<Vec<Outcome>> {
        let scene = self.scene()?;
        let mut recognizer = GestureRecognizer::with_config(config.clone());
        let mut outcomes = Vec::new();

        // Commands heard by the page-level listeners, drained after each step
        let heard: Rc<RefCell<Vec<Command>>> = Rc::new(RefCell::new(Vec::new()));
        if carousel.is_some() {
            for root in scene.roots() {
                for direction in [SwipeDirection::Left, SwipeDirection::Right] {
                    let heard = heard.clone();
                    root.add_listener(direction, move |signal| {
                        if let Some(command) = Command::from_swipe(signal.direction()) {
                            heard.borrow_mut().push(command);
                        }
                    });
                }
            }
        }

        for (index, step) in self.steps.iter().enumerate() {
            let contact = match step {
                Step::Start { target, x, y, at_ms } => Some(ContactEvent::Start {
                    target: scene.get(target)?.clone(),
                    position: Point::new(*x, *y),
                    at: Duration::from_millis(*at_ms),
                }),
                Step::Move { x, y } => Some(ContactEvent::Move {
                    position: Point::new(*x, *y),
                }),
                Step::End { target, at_ms } => Some(ContactEvent::End {
                    target: scene.get(target)?.clone(),
                    at: Duration::from_millis(*at_ms),
                }),
                Step::Cancel => Some(ContactEvent::Cancel),
                Step::Key { key } => {
                    match Command::from_key(key) {
                        Some(command) => heard.borrow_mut().push(command),
                        None => debug!(step = index, "Ignoring key {:?}", key),
                    }
                    None
                }
                Step::Ended => {
                    heard.borrow_mut().push(Command::Next);
                    None
                }
            };

            if let Some(dispatched) = contact.and_then(|event| recognizer.handle(event)) {
                let event = &dispatched.event;
                outcomes.push(Outcome::Swipe {
                    step: index,
                    event: event.direction.event_name(),
                    target: event.target.get_attribute("id").unwrap_or_default(),
                    elapsed_ms: event.elapsed.as_millis() as u64,
                    cancelled: dispatched.cancelled,
                });
            }

            let commands: Vec<Command> = heard.borrow_mut().drain(..).collect();
            if let Some(carousel) = carousel.as_deref_mut() {
                for command in commands {
                    if let Some(clip) = carousel.apply(command) {
                        outcomes.push(Outcome::Clip {
                            step: index,
                            command,
                            id: clip.id,
                            url: clip.url,
                        });
                    }
                }
            }
        }

        Ok(outcomes)
    }
}

impl Outcome {
    /// One-line human readable form
    pub fn describe(&self) -> String {
        match self {
            Outcome::Swipe { step, event, target, elapsed_ms, cancelled } => format!(
                "step {}: {} on #{} after {}ms{}",
                step,
                event,
                target,
                elapsed_ms,
                if *cancelled { " (cancelled)" } else { "" }
            ),
            Outcome::Clip { step, command, id, url } => {
                format!("step {}: {:?} -> clip {} ({})", step, command, id, url)
            }
        }
    }
}
