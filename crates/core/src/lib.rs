//! Core library for beamviz.
//!
//! Diagrams of beams, supports and bending-moment plots are described as
//! named primitives positioned relative to one another. Layout happens up
//! front and is baked into absolute coordinates; a scene's timeline then hands
//! the positioned groups to an external [`Renderer`] in a fixed order.

pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod plot;
pub mod record;
pub mod render;
pub mod scene;
pub mod script;
pub mod shape;
pub mod timeline;

pub use config::{AppConfig, FrameConfig, LayoutConfig, TimelineConfig};
pub use error::{BeamVizError, Result};
pub use geometry::{Affine, Point, Rect, Vec2};
pub use layout::{Anchor, Layout, NodeBounds, NodeId};
pub use plot::{Axes, AxesSpec, AxisRange};
pub use record::{Recorder, RecordingSettings};
pub use render::{RenderItem, Renderer, Transition, TracingRenderer};
pub use scene::{SceneDescriptor, SceneInstance, SceneKind};
pub use script::{Script, Step};
pub use shape::{Color, Primitive, Shape, ShapeSpec, Slant, Style};
pub use timeline::{Animation, Cue, PlaybackClock, ScheduledCue, Timeline};
