//! WASM bindings for beats-playback
//!
//! Browser implementation of the platform traits on top of
//! `HtmlAudioElement`, Web Audio's `AnalyserNode` and `requestAnimationFrame`,
//! plus a JavaScript-friendly session wrapper.

mod backend;
mod scheduler;
mod session;

pub use backend::{MediaInbox, WebAudioBackend};
pub use scheduler::AnimationFrameScheduler;
pub use session::WasmPlaybackSession;
