#![allow(dead_code)]

//! Editor shell glue: when the live engine runs and how previews are superseded.

pub mod preview;
pub mod session;

pub use preview::{PageRasterizer, PreviewRequest, PreviewScheduler, PreviewState};
pub use session::{EditorSession, FrameId, FrameScheduler, ReflowGate};
