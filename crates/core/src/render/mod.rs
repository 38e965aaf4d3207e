//! Boundary to the external renderer.
//!
//! The layout side resolves node ids into owned snapshots of absolutely
//! positioned primitives. A renderer only ever sees those snapshots, in the
//! order the timeline submits them.

use serde::{Deserialize, Serialize};

use crate::{
    config::FrameConfig,
    layout::{Layout, NodeId},
    shape::Primitive,
    timeline::Animation,
    Result,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPrimitive {
    pub name: String,
    pub primitive: Primitive,
}

/// One node flattened into its primitives. A group is always a single item so
/// the renderer can treat it atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderItem {
    pub name: String,
    pub primitives: Vec<RenderPrimitive>,
}

impl RenderItem {
    /// Snapshots a positioned node. Open stroke widths take the layout's
    /// configured width.
    pub fn snapshot(layout: &Layout, id: NodeId) -> Result<Self> {
        layout.bounding_box(id)?;
        let stroke_width = layout.config().stroke_width;
        let primitives = layout
            .primitives(id)?
            .into_iter()
            .map(|(name, primitive)| {
                let mut primitive = primitive.clone();
                primitive.style.stroke_width.get_or_insert(stroke_width);
                RenderPrimitive {
                    name: name.to_string(),
                    primitive,
                }
            })
            .collect();
        Ok(Self {
            name: layout.name(id)?.to_string(),
            primitives,
        })
    }

    pub fn snapshot_all(layout: &Layout, ids: &[NodeId]) -> Result<Vec<Self>> {
        ids.iter().map(|id| Self::snapshot(layout, *id)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    FadeIn { items: Vec<RenderItem> },
    Create { item: RenderItem },
    ReplacementTransform { from: RenderItem, to: RenderItem },
    /// Hold the current frame.
    Wait,
}

impl Transition {
    pub fn resolve(layout: &Layout, animation: &Animation) -> Result<Self> {
        Ok(match animation {
            Animation::FadeIn { targets } => Transition::FadeIn {
                items: RenderItem::snapshot_all(layout, targets)?,
            },
            Animation::Create { target } => Transition::Create {
                item: RenderItem::snapshot(layout, *target)?,
            },
            Animation::ReplacementTransform { from, to } => Transition::ReplacementTransform {
                from: RenderItem::snapshot(layout, *from)?,
                to: RenderItem::snapshot(layout, *to)?,
            },
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Transition::FadeIn { .. } => "fade_in",
            Transition::Create { .. } => "create",
            Transition::ReplacementTransform { .. } => "replacement_transform",
            Transition::Wait => "wait",
        }
    }
}

/// Rendering backend abstraction. Implementations must draw items in the order
/// they are submitted.
pub trait Renderer {
    fn display(&mut self, items: &[RenderItem]) -> Result<()>;

    fn animate(&mut self, transition: &Transition, run_time: f64) -> Result<()>;
}

/// Renderer that only reports each call through `tracing`. Useful as a dry run
/// of a scene's timeline.
#[derive(Debug, Default)]
pub struct TracingRenderer {
    frame: FrameConfig,
    calls: usize,
}

impl TracingRenderer {
    pub fn new(frame: FrameConfig) -> Self {
        Self { frame, calls: 0 }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Renderer for TracingRenderer {
    fn display(&mut self, items: &[RenderItem]) -> Result<()> {
        self.calls += 1;
        for item in items {
            tracing::info!(
                item = %item.name,
                primitives = item.primitives.len(),
                background = %self.frame.background,
                "display"
            );
        }
        Ok(())
    }

    fn animate(&mut self, transition: &Transition, run_time: f64) -> Result<()> {
        self.calls += 1;
        let frames = (run_time * self.frame.fps as f64).round() as u64;
        tracing::info!(transition = transition.label(), run_time, frames, "animate");
        Ok(())
    }
}
