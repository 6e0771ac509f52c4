/// plotview core library - view transformation and camera control
///
/// This library holds everything between a scene of points, lines and
/// triangles and a device-space rendering backend: the layered transform
/// stack, the eye/target camera, pan/zoom/rotate gestures, fit-to-bounds
/// placement, and the attribute (color) stack. It has no windowing or
/// terminal dependencies; hosts implement [`RenderBackend`].

pub mod attribute;
pub mod backend;
mod camera;
pub mod config;
pub mod controller;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod gesture;
pub mod scene;
pub mod stack;
pub mod transform;
pub mod viewport;

// Re-export commonly used types
pub use attribute::{Attribute, AttributeStack, Color};
pub use backend::{DrawList, Primitive, RecordingBackend, RenderBackend};
pub use config::{DisplayConfig, ViewerConfig};
pub use controller::ViewController;
pub use error::{Result, ViewError};
pub use fit::{CameraPlacement, FitMode};
pub use geometry::{Bounds, Drawable, Geometry, Mesh, Plot, PlotCommand, PointSet, Triangle};
pub use scene::{Scene, SceneObject};
pub use stack::{Level, TransformStack};
pub use transform::{RotationState, Transform};
pub use viewport::Viewport;
