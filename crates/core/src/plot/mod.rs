//! Cartesian axes with numbered ticks and line graphs, built out of ordinary
//! layout primitives.

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Point, Vec2, DOWN, LEFT, UR},
    layout::{Layout, NodeId},
    shape::{Color, Primitive, Slant, Style},
    BeamVizError, Result,
};

/// Most ticks a single axis may carry.
const MAX_TICKS: f64 = 1000.0;

/// Inclusive value range with the spacing between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    fn validate(&self, axis: &str) -> Result<()> {
        let finite = self.min.is_finite() && self.max.is_finite() && self.step.is_finite();
        if !finite || self.max <= self.min || self.step <= 0.0 {
            return Err(BeamVizError::invalid(format!(
                "{axis} range [{}, {}, {}] is degenerate",
                self.min, self.max, self.step
            )));
        }
        let intervals = (self.max - self.min) / self.step;
        if intervals > MAX_TICKS {
            return Err(BeamVizError::invalid(format!(
                "{axis} range [{}, {}] with step {} needs {} ticks, more than {MAX_TICKS}",
                self.min,
                self.max,
                self.step,
                intervals.floor() + 1.0
            )));
        }
        Ok(())
    }

    /// Tick values from `min` to `max` inclusive.
    fn ticks(&self) -> Vec<f64> {
        let count = ((self.max - self.min) / self.step + 1e-9).floor() as usize;
        (0..=count).map(|i| self.min + i as f64 * self.step).collect()
    }

    /// Where the perpendicular axis crosses this one.
    fn crossing(&self) -> f64 {
        0.0_f64.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesSpec {
    pub x_range: AxisRange,
    pub y_range: AxisRange,
    pub x_length: f64,
    pub y_length: f64,
    /// Values that get a numeric label under the x axis.
    pub x_numbers: Vec<f64>,
    pub y_numbers: Vec<f64>,
    pub number_font_size: f64,
    pub label_font_size: f64,
    pub tick_size: f64,
    pub dot_radius: f64,
}

impl Default for AxesSpec {
    fn default() -> Self {
        Self {
            x_range: AxisRange::new(-1.0, 1.0, 1.0),
            y_range: AxisRange::new(-1.0, 1.0, 1.0),
            x_length: 6.0,
            y_length: 6.0,
            x_numbers: Vec::new(),
            y_numbers: Vec::new(),
            number_font_size: 24.0,
            label_font_size: 48.0,
            tick_size: 0.1,
            dot_radius: 0.08,
        }
    }
}

/// Axes laid out inside a [`Layout`], centred on the origin when built.
#[derive(Debug, Clone)]
pub struct Axes {
    spec: AxesSpec,
    name: String,
    offset: Vec2,
    group: NodeId,
    x_axis: NodeId,
    y_axis: NodeId,
}

impl Axes {
    pub fn build(layout: &mut Layout, name: &str, spec: AxesSpec) -> Result<Self> {
        spec.x_range.validate("x")?;
        spec.y_range.validate("y")?;
        for (what, value) in [
            ("x length", spec.x_length),
            ("y length", spec.y_length),
            ("tick size", spec.tick_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(BeamVizError::invalid(format!("axes {what} must be positive, got {value}")));
            }
        }

        let map = |x: f64, y: f64| map_coords(&spec, Vec2::ZERO, x, y);
        let x_cross = spec.x_range.crossing();
        let y_cross = spec.y_range.crossing();

        let x_line = Primitive::line(map(spec.x_range.min, y_cross), map(spec.x_range.max, y_cross))?;
        let y_line = Primitive::line(map(x_cross, spec.y_range.min), map(x_cross, spec.y_range.max))?;
        let x_axis = layout.create(format!("{name}.x_axis"), x_line);
        let y_axis = layout.create(format!("{name}.y_axis"), y_line);
        let mut members = vec![x_axis, y_axis];

        let half_tick = spec.tick_size / 2.0;
        for (i, x) in spec.x_range.ticks().into_iter().enumerate() {
            let at = map(x, y_cross);
            let tick = Primitive::line(at + DOWN * half_tick, at - DOWN * half_tick)?;
            members.push(layout.create(format!("{name}.x_tick{i}"), tick));
        }
        for (i, y) in spec.y_range.ticks().into_iter().enumerate() {
            let at = map(x_cross, y);
            let tick = Primitive::line(at + LEFT * half_tick, at - LEFT * half_tick)?;
            members.push(layout.create(format!("{name}.y_tick{i}"), tick));
        }

        let buff = layout.config().small_buff + half_tick;
        for (i, x) in spec.x_numbers.iter().enumerate() {
            let label = number_label(layout, &spec, format!("{name}.x_number{i}"), *x)?;
            layout.next_to_point(label, map(*x, y_cross), DOWN, buff)?;
            members.push(label);
        }
        for (i, y) in spec.y_numbers.iter().enumerate() {
            let label = number_label(layout, &spec, format!("{name}.y_number{i}"), *y)?;
            layout.next_to_point(label, map(x_cross, *y), LEFT, buff)?;
            members.push(label);
        }

        let group = layout.group(name, &members)?;
        tracing::debug!(axes = name, parts = members.len(), "built axes");
        Ok(Self {
            spec,
            name: name.to_string(),
            offset: Vec2::ZERO,
            group,
            x_axis,
            y_axis,
        })
    }

    pub fn group(&self) -> NodeId {
        self.group
    }

    pub fn x_axis(&self) -> NodeId {
        self.x_axis
    }

    pub fn y_axis(&self) -> NodeId {
        self.y_axis
    }

    /// Maps graph coordinates to scene coordinates.
    pub fn coords_to_point(&self, x: f64, y: f64) -> Point {
        map_coords(&self.spec, self.offset, x, y)
    }

    /// Moves the axes group and keeps the coordinate mapping in step.
    pub fn shift(&mut self, layout: &mut Layout, vector: Vec2) -> Result<()> {
        layout.shift(self.group, vector)?;
        self.offset += vector;
        Ok(())
    }

    /// Math labels at the far ends of both axes.
    pub fn axis_labels(&self, layout: &mut Layout, x_label: &str, y_label: &str) -> Result<NodeId> {
        let buff = layout.config().small_buff;
        let x_end = self.axis_end(layout, self.x_axis)?;
        let y_end = self.axis_end(layout, self.y_axis)?;

        let x = layout.declare(
            format!("{}.x_label", self.name),
            Primitive::math(x_label, self.spec.label_font_size, layout.config())?,
        );
        layout.next_to_point(x, x_end, UR, buff)?;
        let y = layout.declare(
            format!("{}.y_label", self.name),
            Primitive::math(y_label, self.spec.label_font_size, layout.config())?,
        );
        layout.next_to_point(y, y_end, UR, buff)?;

        layout.group(format!("{}.labels", self.name), &[x, y])
    }

    /// Polyline through the samples with a dot on every vertex.
    pub fn line_graph(&self, layout: &mut Layout, name: &str, xs: &[f64], ys: &[f64]) -> Result<NodeId> {
        if xs.len() != ys.len() {
            return Err(BeamVizError::invalid(format!(
                "graph has {} x values but {} y values",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(BeamVizError::invalid("a line graph needs at least two samples"));
        }

        let vertices: Vec<Point> = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| self.coords_to_point(*x, *y))
            .collect();
        let line = layout.create(format!("{name}.line"), Primitive::polyline(vertices.clone())?);
        let mut members = vec![line];
        for (i, vertex) in vertices.into_iter().enumerate() {
            let dot = Primitive::circle(self.spec.dot_radius)?
                .with_style(Style::stroked(Color::WHITE).with_fill(Color::WHITE, 1.0));
            let dot = layout.create(format!("{name}.dot{i}"), dot);
            layout.move_to(dot, vertex)?;
            members.push(dot);
        }
        layout.group(name, &members)
    }

    fn axis_end(&self, layout: &Layout, axis: NodeId) -> Result<Point> {
        layout
            .primitive(axis)?
            .line_endpoints()
            .map(|(_, end)| end)
            .ok_or_else(|| BeamVizError::invalid("axis is not a line"))
    }
}

fn map_coords(spec: &AxesSpec, offset: Vec2, x: f64, y: f64) -> Point {
    let AxesSpec {
        x_range,
        y_range,
        x_length,
        y_length,
        ..
    } = spec;
    let px = -x_length / 2.0 + (x - x_range.min) / (x_range.max - x_range.min) * x_length;
    let py = -y_length / 2.0 + (y - y_range.min) / (y_range.max - y_range.min) * y_length;
    Point::new(px, py) + offset
}

fn number_label(layout: &mut Layout, spec: &AxesSpec, name: String, value: f64) -> Result<NodeId> {
    let text = Primitive::text(
        format!("{value:.2}"),
        spec.number_font_size,
        Slant::Normal,
        layout.config(),
    )?;
    Ok(layout.declare(name, text))
}
