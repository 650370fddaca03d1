//! Browser binding
//!
//! `install_swipe_events` listens for touches on the whole document and fires
//! `swiped-*` custom events (bubbling, cancelable) on the element where each
//! swipe started. `start_carousel` wires the clip carousel to a `<video>`
//! element and its `<source>`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, Event, HtmlMediaElement, HtmlSourceElement,
    KeyboardEvent, TouchEvent, Window,
};

use crate::carousel::{Carousel, CarouselConfig, Command};
use crate::input::{GestureRecognizer, Point, SwipeDirection, SwipeTarget};

impl SwipeTarget for Element {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn dispatch_swipe(&self, direction: SwipeDirection) -> bool {
        let init = CustomEventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        match CustomEvent::new_with_event_init_dict(direction.event_name(), &init) {
            Ok(event) => self.dispatch_event(&event).unwrap_or(false),
            Err(e) => {
                tracing::warn!("Failed to create {} event: {:?}", direction, e);
                false
            }
        }
    }
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn now() -> Duration {
    Duration::from_millis(js_sys::Date::now() as u64)
}

fn event_element(e: &Event) -> Option<Element> {
    e.target().and_then(|t| t.dyn_into::<Element>().ok())
}

fn first_touch(e: &TouchEvent) -> Option<Point> {
    e.touches()
        .item(0)
        .map(|t| Point::new(t.client_x() as f64, t.client_y() as f64))
}

/// Start recognizing swipes anywhere in the document
#[wasm_bindgen]
pub fn install_swipe_events() -> Result<(), JsValue> {
    let document = document()?;
    let recognizer: Rc<RefCell<GestureRecognizer<Element>>> =
        Rc::new(RefCell::new(GestureRecognizer::new()));

    let touch_start_cb = {
        let recognizer = recognizer.clone();
        Closure::wrap(Box::new(move |e: TouchEvent| {
            if let (Some(target), Some(position)) = (event_element(&e), first_touch(&e)) {
                recognizer.borrow_mut().touch_start(target, position, now());
            }
        }) as Box<dyn FnMut(TouchEvent)>)
    };
    document.add_event_listener_with_callback("touchstart", touch_start_cb.as_ref().unchecked_ref())?;

    let touch_move_cb = {
        let recognizer = recognizer.clone();
        Closure::wrap(Box::new(move |e: TouchEvent| {
            if let Some(position) = first_touch(&e) {
                recognizer.borrow_mut().touch_motion(position);
            }
        }) as Box<dyn FnMut(TouchEvent)>)
    };
    document.add_event_listener_with_callback("touchmove", touch_move_cb.as_ref().unchecked_ref())?;

    let touch_end_cb = {
        let recognizer = recognizer.clone();
        Closure::wrap(Box::new(move |e: TouchEvent| {
            let Some(target) = event_element(&e) else {
                recognizer.borrow_mut().touch_cancel();
                return;
            };
            // Release the borrow before listeners run
            let swipe = recognizer.borrow_mut().touch_up(&target, now());
            if let Some(swipe) = swipe {
                swipe.dispatch();
            }
        }) as Box<dyn FnMut(TouchEvent)>)
    };
    document.add_event_listener_with_callback("touchend", touch_end_cb.as_ref().unchecked_ref())?;

    // Listeners live as long as the page
    touch_start_cb.forget();
    touch_move_cb.forget();
    touch_end_cb.forget();
    Ok(())
}

fn is_safari(window: &Window) -> bool {
    let ua = window.navigator().user_agent().unwrap_or_default();
    ua.contains("Safari") && ua.contains("Mac") && !ua.contains("Chrome")
}

/// Play clips in the `<video id=video_id>` element through its `<source id=source_id>`.
///
/// Loads a first clip immediately. Swipe left, ArrowRight and the end of a clip
/// load a new one; swipe right and ArrowLeft go back.
#[wasm_bindgen]
pub fn start_carousel(video_id: &str, source_id: &str) -> Result<(), JsValue> {
    let window = window()?;
    let document = document()?;

    let video: HtmlMediaElement = document
        .get_element_by_id(video_id)
        .ok_or_else(|| JsValue::from_str("video element not found"))?
        .dyn_into()
        .map_err(|_| JsValue::from_str("not a media element"))?;
    let source: HtmlSourceElement = document
        .get_element_by_id(source_id)
        .ok_or_else(|| JsValue::from_str("source element not found"))?
        .dyn_into()
        .map_err(|_| JsValue::from_str("not a source element"))?;

    if is_safari(&window) {
        video.set_attribute("crossorigin", "true")?;
    }

    let carousel = RefCell::new(Carousel::from_entropy(CarouselConfig::default()));
    let apply: Rc<dyn Fn(Command)> = {
        let video = video.clone();
        Rc::new(move |command: Command| {
            let clip = carousel.borrow_mut().apply(command);
            if let Some(clip) = clip {
                source.set_src(&clip.url);
                video.load();
            }
        })
    };

    apply(Command::Next);

    for direction in [SwipeDirection::Left, SwipeDirection::Right] {
        let Some(command) = Command::from_swipe(direction) else {
            continue;
        };
        let apply = apply.clone();
        let swipe_cb = Closure::wrap(Box::new(move |_e: Event| apply(command)) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback(direction.event_name(), swipe_cb.as_ref().unchecked_ref())?;
        swipe_cb.forget();
    }

    let keydown_cb = {
        let apply = apply.clone();
        Closure::wrap(Box::new(move |e: KeyboardEvent| {
            if let Some(command) = Command::from_key(&e.key()) {
                apply(command);
            }
        }) as Box<dyn FnMut(KeyboardEvent)>)
    };
    document.add_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref())?;
    keydown_cb.forget();

    let ended_cb = Closure::wrap(Box::new(move |_e: Event| apply(Command::Next)) as Box<dyn FnMut(Event)>);
    video.add_event_listener_with_callback("ended", ended_cb.as_ref().unchecked_ref())?;
    ended_cb.forget();

    Ok(())
}
