//! In-memory element tree
//!
//! Used when replaying traces outside a browser. Swipe signals behave like
//! DOM custom events created with `bubbles: true, cancelable: true`: they run
//! the target's listeners, then each ancestor's, until a listener stops
//! propagation.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::input::{SwipeDirection, SwipeTarget};

pub type Listener = Rc<dyn Fn(&mut SwipeSignal)>;

struct Node {
    tag: String,
    parent: Option<Element>,
    attributes: RefCell<BTreeMap<String, String>>,
    listeners: RefCell<Vec<(SwipeDirection, Listener)>>,
}

/// Shared handle to a node; equality is identity
#[derive(Clone)]
pub struct Element(Rc<Node>);

impl Element {
    /// Create a root element
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_parent(tag.into(), None)
    }

    /// Create an element nested under `self`
    pub fn child(&self, tag: impl Into<String>) -> Element {
        Self::with_parent(tag.into(), Some(self.clone()))
    }

    fn with_parent(tag: String, parent: Option<Element>) -> Self {
        Element(Rc::new(Node {
            tag,
            parent,
            attributes: RefCell::new(BTreeMap::new()),
            listeners: RefCell::new(Vec::new()),
        }))
    }

    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    pub fn parent(&self) -> Option<Element> {
        self.0.parent.clone()
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow().get(name).cloned()
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.0.attributes.borrow_mut().insert(name.into(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.0.attributes.borrow_mut().remove(name);
    }

    /// Listen for one swipe direction on this element or any descendant
    pub fn add_listener<F>(&self, direction: SwipeDirection, listener: F)
    where
        F: Fn(&mut SwipeSignal) + 'static,
    {
        self.0.listeners.borrow_mut().push((direction, Rc::new(listener)));
    }

    /// This element followed by its ancestors, innermost first
    pub fn ancestors(&self) -> impl Iterator<Item = Element> {
        std::iter::successors(Some(self.clone()), |el| el.parent())
    }

    /// Fire a swipe signal from this element; `false` if a listener cancelled it
    pub fn dispatch(&self, direction: SwipeDirection) -> bool {
        let mut signal = SwipeSignal {
            direction,
            target: self.clone(),
            current_target: self.clone(),
            default_prevented: false,
            propagation_stopped: false,
        };

        for el in self.ancestors() {
            // Snapshot so listeners may register more listeners
            let listeners: Vec<Listener> = el
                .0
                .listeners
                .borrow()
                .iter()
                .filter(|(d, _)| *d == direction)
                .map(|(_, l)| l.clone())
                .collect();

            signal.current_target = el;
            for listener in listeners {
                listener(&mut signal);
            }
            if signal.propagation_stopped {
                break;
            }
        }

        !signal.default_prevented
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Element");
        dbg.field("tag", &self.0.tag);
        if let Some(id) = self.get_attribute("id") {
            dbg.field("id", &id);
        }
        dbg.finish()
    }
}

impl SwipeTarget for Element {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn dispatch_swipe(&self, direction: SwipeDirection) -> bool {
        self.dispatch(direction)
    }
}

/// Swipe signal as seen by a listener
pub struct SwipeSignal {
    direction: SwipeDirection,
    target: Element,
    current_target: Element,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl SwipeSignal {
    pub fn direction(&self) -> SwipeDirection {
        self.direction
    }

    /// Element the contact started on
    pub fn target(&self) -> &Element {
        &self.target
    }

    /// Element whose listener is running
    pub fn current_target(&self) -> &Element {
        &self.current_target
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Finish the current element's listeners, then stop bubbling
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, name: &'static str) -> impl Fn(&mut SwipeSignal) + 'static {
        let log = log.clone();
        move |signal: &mut SwipeSignal| {
            log.borrow_mut().push(format!("{}:{}", name, signal.current_target().tag()));
        }
    }

    #[test]
    fn test_bubbles_to_ancestors() {
        let body = Element::new("body");
        let main = body.child("main");
        let video = main.child("video");
        let log = Rc::new(RefCell::new(Vec::new()));

        body.add_listener(SwipeDirection::Left, recorder(&log, "body"));
        video.add_listener(SwipeDirection::Left, recorder(&log, "video"));
        main.add_listener(SwipeDirection::Right, recorder(&log, "main"));

        assert!(video.dispatch(SwipeDirection::Left));
        assert_eq!(*log.borrow(), vec!["video:video", "body:body"]);
    }

    #[test]
    fn test_stop_propagation() {
        let body = Element::new("body");
        let video = body.child("video");
        let log = Rc::new(RefCell::new(Vec::new()));

        video.add_listener(SwipeDirection::Up, |signal| signal.stop_propagation());
        video.add_listener(SwipeDirection::Up, recorder(&log, "second"));
        body.add_listener(SwipeDirection::Up, recorder(&log, "body"));

        assert!(video.dispatch(SwipeDirection::Up));
        assert_eq!(*log.borrow(), vec!["second:video"]);
    }

    #[test]
    fn test_prevent_default_cancels() {
        let body = Element::new("body");
        let video = body.child("video");
        body.add_listener(SwipeDirection::Down, |signal| signal.prevent_default());

        assert!(!video.dispatch(SwipeDirection::Down));
        assert!(video.dispatch(SwipeDirection::Up));
    }

    #[test]
    fn test_target_is_origin() {
        let body = Element::new("body");
        let video = body.child("video");
        let seen = Rc::new(RefCell::new(None));
        let seen_in = seen.clone();
        body.add_listener(SwipeDirection::Left, move |signal| {
            *seen_in.borrow_mut() = Some(signal.target().clone());
        });

        video.dispatch(SwipeDirection::Left);
        assert_eq!(*seen.borrow(), Some(video));
    }

    #[test]
    fn test_identity_equality() {
        let a = Element::new("div");
        let b = Element::new("div");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_attributes() {
        let el = Element::new("div");
        el.set_attribute("data-swipe-threshold", "40");
        assert_eq!(el.attribute("data-swipe-threshold").as_deref(), Some("40"));
        el.remove_attribute("data-swipe-threshold");
        assert_eq!(el.get_attribute("data-swipe-threshold"), None);
    }
}
