//! `requestAnimationFrame` driven sampling loop

use crate::platform::FrameScheduler;
use crate::types::BindingId;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;

/// Frame scheduler backed by the browser's animation-frame clock
///
/// Each `start` installs a fresh callback for its binding; a callback whose
/// binding is no longer active does nothing and does not re-arm.
pub struct AnimationFrameScheduler {
    state: Rc<LoopState>,
}

struct LoopState {
    active: Cell<Option<BindingId>>,
    handle: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    on_frame: Box<dyn Fn(BindingId)>,
}

impl AnimationFrameScheduler {
    /// Create a scheduler calling `on_frame` once per display frame
    pub fn new(on_frame: impl Fn(BindingId) + 'static) -> Self {
        Self {
            state: Rc::new(LoopState {
                active: Cell::new(None),
                handle: Cell::new(None),
                callback: RefCell::new(None),
                on_frame: Box::new(on_frame),
            }),
        }
    }
}

impl LoopState {
    fn request(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return;
        };

        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(handle) => self.handle.set(Some(handle)),
            Err(e) => tracing::warn!("requestAnimationFrame failed: {e:?}"),
        }
    }

    fn tick(&self, binding: BindingId) {
        if self.active.get() != Some(binding) {
            return;
        }
        (self.on_frame)(binding);
        // on_frame may have cancelled the loop
        if self.active.get() == Some(binding) {
            self.request();
        }
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn start(&mut self, binding: BindingId) {
        self.cancel();
        self.state.active.set(Some(binding));

        let weak: Weak<LoopState> = Rc::downgrade(&self.state);
        let callback = Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
            if let Some(state) = weak.upgrade() {
                state.tick(binding);
            }
        });
        *self.state.callback.borrow_mut() = Some(callback);
        self.state.request();
    }

    fn cancel(&mut self) {
        self.state.active.set(None);
        if let Some(handle) = self.state.handle.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle);
            }
        }
    }
}

impl Drop for AnimationFrameScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
