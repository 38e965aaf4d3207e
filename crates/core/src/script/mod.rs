//! Ordered construction scripts.
//!
//! A script spells out the order in which a diagram is built. Each step names
//! what it reads and what it defines, so a script can be checked for forward
//! references before any geometry is computed.

use std::{collections::HashMap, collections::HashSet, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Point, Vec2},
    layout::{Anchor, Layout, NodeId},
    shape::{Color, ShapeSpec, Style},
    BeamVizError, Result,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Create {
        name: String,
        shape: ShapeSpec,
        #[serde(default)]
        style: Option<Style>,
    },
    /// Like `Create`, but the primitive cannot serve as a reference until a
    /// later step places it.
    Declare {
        name: String,
        shape: ShapeSpec,
        #[serde(default)]
        style: Option<Style>,
    },
    Copy {
        name: String,
        source: String,
    },
    Group {
        name: String,
        members: Vec<String>,
    },
    Shift {
        target: String,
        by: Vec2,
    },
    MoveTo {
        target: String,
        point: Point,
    },
    NextTo {
        target: String,
        reference: String,
        direction: Vec2,
        #[serde(default)]
        aligned_edge: Vec2,
        /// Falls back to the layout's default buffer.
        #[serde(default)]
        buff: Option<f64>,
    },
    PositionRelative {
        target: String,
        reference: String,
        direction: Vec2,
        #[serde(default)]
        aligned_edge: Vec2,
        #[serde(default)]
        offset: Vec2,
    },
    AlignTo {
        target: String,
        reference: String,
        direction: Vec2,
    },
    Rotate {
        target: String,
        angle: f64,
        #[serde(default)]
        about: Option<Point>,
    },
    Scale {
        target: String,
        factor: f64,
        #[serde(default)]
        about: Option<Point>,
    },
    SetAngle {
        target: String,
        angle: f64,
    },
    SetColor {
        target: String,
        color: Color,
    },
    SetFill {
        target: String,
        color: Color,
        opacity: f64,
    },
    Surround {
        name: String,
        target: String,
        #[serde(default)]
        buff: Option<f64>,
    },
    Angle {
        name: String,
        first: String,
        second: String,
        radius: f64,
    },
}

impl Step {
    /// Name bound by this step, if any.
    pub fn defines(&self) -> Option<&str> {
        match self {
            Step::Create { name, .. }
            | Step::Declare { name, .. }
            | Step::Copy { name, .. }
            | Step::Group { name, .. }
            | Step::Surround { name, .. }
            | Step::Angle { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Names this step needs to exist already.
    pub fn reads(&self) -> Vec<&str> {
        match self {
            Step::Create { .. } | Step::Declare { .. } => Vec::new(),
            Step::Copy { source, .. } => vec![source.as_str()],
            Step::Group { members, .. } => members.iter().map(String::as_str).collect(),
            Step::Shift { target, .. }
            | Step::MoveTo { target, .. }
            | Step::Rotate { target, .. }
            | Step::Scale { target, .. }
            | Step::SetAngle { target, .. }
            | Step::SetColor { target, .. }
            | Step::SetFill { target, .. }
            | Step::Surround { target, .. } => vec![target.as_str()],
            Step::NextTo {
                target, reference, ..
            }
            | Step::PositionRelative {
                target, reference, ..
            }
            | Step::AlignTo {
                target, reference, ..
            } => vec![target.as_str(), reference.as_str()],
            Step::Angle { first, second, .. } => vec![first.as_str(), second.as_str()],
        }
    }

    fn op(&self) -> &'static str {
        match self {
            Step::Create { .. } => "create",
            Step::Declare { .. } => "declare",
            Step::Copy { .. } => "copy",
            Step::Group { .. } => "group",
            Step::Shift { .. } => "shift",
            Step::MoveTo { .. } => "move_to",
            Step::NextTo { .. } => "next_to",
            Step::PositionRelative { .. } => "position_relative",
            Step::AlignTo { .. } => "align_to",
            Step::Rotate { .. } => "rotate",
            Step::Scale { .. } => "scale",
            Step::SetAngle { .. } => "set_angle",
            Step::SetColor { .. } => "set_color",
            Step::SetFill { .. } => "set_fill",
            Step::Surround { .. } => "surround",
            Step::Angle { .. } => "angle",
        }
    }

    fn apply(&self, layout: &mut Layout) -> Result<()> {
        match self {
            Step::Create { name, shape, style } => {
                let id = layout.create_from_spec(name.as_str(), shape)?;
                if let Some(style) = style {
                    layout.set_style(id, style)?;
                }
            }
            Step::Declare { name, shape, style } => {
                let mut primitive = shape.build(layout.config())?;
                if let Some(style) = style {
                    primitive.style = style.clone();
                }
                layout.declare(name.as_str(), primitive);
            }
            Step::Copy { name, source } => {
                let source = layout.id(source)?;
                layout.copy(source, name.as_str())?;
            }
            Step::Group { name, members } => {
                let members = members
                    .iter()
                    .map(|member| layout.id(member))
                    .collect::<Result<Vec<NodeId>>>()?;
                layout.group(name.as_str(), &members)?;
            }
            Step::Shift { target, by } => {
                let id = layout.id(target)?;
                layout.shift(id, *by)?;
            }
            Step::MoveTo { target, point } => {
                let id = layout.id(target)?;
                layout.move_to(id, *point)?;
            }
            Step::NextTo {
                target,
                reference,
                direction,
                aligned_edge,
                buff,
            } => {
                let id = layout.id(target)?;
                let reference = layout.id(reference)?;
                let buff = buff.unwrap_or(layout.config().default_buff);
                let anchor = Anchor::new(reference, *direction)
                    .aligned_edge(*aligned_edge)
                    .buff(buff);
                layout.position_relative(id, &anchor)?;
            }
            Step::PositionRelative {
                target,
                reference,
                direction,
                aligned_edge,
                offset,
            } => {
                let id = layout.id(target)?;
                let reference = layout.id(reference)?;
                let anchor = Anchor::new(reference, *direction)
                    .aligned_edge(*aligned_edge)
                    .offset(*offset);
                layout.position_relative(id, &anchor)?;
            }
            Step::AlignTo {
                target,
                reference,
                direction,
            } => {
                let id = layout.id(target)?;
                let reference = layout.id(reference)?;
                layout.align_to(id, reference, *direction)?;
            }
            Step::Rotate {
                target,
                angle,
                about,
            } => {
                let id = layout.id(target)?;
                layout.rotate(id, *angle, *about)?;
            }
            Step::Scale {
                target,
                factor,
                about,
            } => {
                let id = layout.id(target)?;
                layout.scale(id, *factor, *about)?;
            }
            Step::SetAngle { target, angle } => {
                let id = layout.id(target)?;
                layout.set_angle(id, *angle)?;
            }
            Step::SetColor { target, color } => {
                let id = layout.id(target)?;
                layout.set_color(id, *color)?;
            }
            Step::SetFill {
                target,
                color,
                opacity,
            } => {
                let id = layout.id(target)?;
                layout.set_fill(id, *color, *opacity)?;
            }
            Step::Surround { name, target, buff } => {
                let id = layout.id(target)?;
                let buff = buff.unwrap_or(layout.config().small_buff);
                layout.surround(name.as_str(), id, buff)?;
            }
            Step::Angle {
                name,
                first,
                second,
                radius,
            } => {
                let first = layout.id(first)?;
                let second = layout.id(second)?;
                layout.angle(name.as_str(), first, second, *radius)?;
            }
        }
        Ok(())
    }
}

/// What one step reads and defines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub step: usize,
    pub defines: Option<String>,
    pub reads: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn push(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn dependencies(&self) -> Vec<Dependency> {
        self.steps
            .iter()
            .enumerate()
            .map(|(step, s)| Dependency {
                step,
                defines: s.defines().map(str::to_string),
                reads: s.reads().into_iter().map(str::to_string).collect(),
            })
            .collect()
    }

    /// Checks that every name is defined by an earlier step than the one
    /// reading it.
    pub fn validate(&self) -> Result<()> {
        let mut defined: HashSet<&str> = HashSet::new();
        for (index, step) in self.steps.iter().enumerate() {
            if let Some(missing) = step.reads().into_iter().find(|name| !defined.contains(name)) {
                return Err(BeamVizError::unresolved(format!(
                    "{missing} (read by step {index}, {})",
                    step.op()
                )));
            }
            if let Some(name) = step.defines() {
                defined.insert(name);
            }
        }
        Ok(())
    }

    /// Validates, then applies every step in order. Returns the final id bound
    /// to each name the script defines.
    pub fn run(&self, layout: &mut Layout) -> Result<HashMap<String, NodeId>> {
        self.validate()?;
        let mut bindings = HashMap::new();
        for (index, step) in self.steps.iter().enumerate() {
            tracing::debug!(index, op = step.op(), "applying script step");
            step.apply(layout)?;
            if let Some(name) = step.defines() {
                bindings.insert(name.to_string(), layout.id(name)?);
            }
        }
        Ok(bindings)
    }

    pub fn create(&mut self, name: &str, shape: ShapeSpec) -> &mut Self {
        self.push(Step::Create {
            name: name.to_string(),
            shape,
            style: None,
        })
    }

    pub fn create_styled(&mut self, name: &str, shape: ShapeSpec, style: Style) -> &mut Self {
        self.push(Step::Create {
            name: name.to_string(),
            shape,
            style: Some(style),
        })
    }

    pub fn declare(&mut self, name: &str, shape: ShapeSpec) -> &mut Self {
        self.push(Step::Declare {
            name: name.to_string(),
            shape,
            style: None,
        })
    }

    pub fn copy(&mut self, name: &str, source: &str) -> &mut Self {
        self.push(Step::Copy {
            name: name.to_string(),
            source: source.to_string(),
        })
    }

    pub fn group(&mut self, name: &str, members: &[&str]) -> &mut Self {
        self.push(Step::Group {
            name: name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        })
    }

    pub fn shift(&mut self, target: &str, by: Vec2) -> &mut Self {
        self.push(Step::Shift {
            target: target.to_string(),
            by,
        })
    }

    pub fn move_to(&mut self, target: &str, point: Point) -> &mut Self {
        self.push(Step::MoveTo {
            target: target.to_string(),
            point,
        })
    }

    pub fn next_to(&mut self, target: &str, reference: &str, direction: Vec2) -> &mut Self {
        self.push(Step::NextTo {
            target: target.to_string(),
            reference: reference.to_string(),
            direction,
            aligned_edge: Vec2::ZERO,
            buff: None,
        })
    }

    pub fn next_to_buff(&mut self, target: &str, reference: &str, direction: Vec2, buff: f64) -> &mut Self {
        self.push(Step::NextTo {
            target: target.to_string(),
            reference: reference.to_string(),
            direction,
            aligned_edge: Vec2::ZERO,
            buff: Some(buff),
        })
    }

    pub fn position_relative(
        &mut self,
        target: &str,
        reference: &str,
        direction: Vec2,
        offset: Vec2,
    ) -> &mut Self {
        self.push(Step::PositionRelative {
            target: target.to_string(),
            reference: reference.to_string(),
            direction,
            aligned_edge: Vec2::ZERO,
            offset,
        })
    }

    pub fn align_to(&mut self, target: &str, reference: &str, direction: Vec2) -> &mut Self {
        self.push(Step::AlignTo {
            target: target.to_string(),
            reference: reference.to_string(),
            direction,
        })
    }

    pub fn rotate(&mut self, target: &str, angle: f64) -> &mut Self {
        self.push(Step::Rotate {
            target: target.to_string(),
            angle,
            about: None,
        })
    }

    pub fn scale(&mut self, target: &str, factor: f64) -> &mut Self {
        self.push(Step::Scale {
            target: target.to_string(),
            factor,
            about: None,
        })
    }

    pub fn set_angle(&mut self, target: &str, angle: f64) -> &mut Self {
        self.push(Step::SetAngle {
            target: target.to_string(),
            angle,
        })
    }

    pub fn set_color(&mut self, target: &str, color: Color) -> &mut Self {
        self.push(Step::SetColor {
            target: target.to_string(),
            color,
        })
    }

    pub fn set_fill(&mut self, target: &str, color: Color, opacity: f64) -> &mut Self {
        self.push(Step::SetFill {
            target: target.to_string(),
            color,
            opacity,
        })
    }

    pub fn surround(&mut self, name: &str, target: &str, buff: f64) -> &mut Self {
        self.push(Step::Surround {
            name: name.to_string(),
            target: target.to_string(),
            buff: Some(buff),
        })
    }

    pub fn angle(&mut self, name: &str, first: &str, second: &str, radius: f64) -> &mut Self {
        self.push(Step::Angle {
            name: name.to_string(),
            first: first.to_string(),
            second: second.to_string(),
            radius,
        })
    }
}
