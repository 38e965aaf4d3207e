//! The layout model: an arena of named primitives and groups positioned
//! relative to one another.
//!
//! Every operation bakes its result into absolute coordinates immediately.
//! Nothing is re-evaluated later, so the order in which operations run is the
//! order in which references must become available.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    config::LayoutConfig,
    geometry::{critical_point, Point, Rect, Vec2, EPSILON},
    shape::{Color, Primitive, ShapeSpec, Style},
    BeamVizError, Result,
};

/// Handle to a node inside one [`Layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub enum NodeKind {
    Primitive { primitive: Primitive, placed: bool },
    Group(Vec<NodeId>),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
}

/// One-shot relative placement: the subject's critical point at
/// `aligned_edge - direction` is moved onto the reference's critical point at
/// `aligned_edge + direction`, then displaced by `offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub reference: NodeId,
    pub direction: Vec2,
    pub aligned_edge: Vec2,
    pub offset: Vec2,
}

impl Anchor {
    pub fn new(reference: NodeId, direction: Vec2) -> Self {
        Self {
            reference,
            direction,
            aligned_edge: Vec2::ZERO,
            offset: Vec2::ZERO,
        }
    }

    pub fn aligned_edge(mut self, edge: Vec2) -> Self {
        self.aligned_edge = edge;
        self
    }

    pub fn offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Gap measured along the direction vector, so a non-unit direction
    /// stretches the gap accordingly.
    pub fn buff(mut self, buff: f64) -> Self {
        self.offset = self.direction * buff;
        self
    }
}

/// Final bounds of a named node, as reported to callers and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeBounds {
    pub id: NodeId,
    pub name: String,
    pub group: bool,
    pub bounds: Option<Rect>,
}

#[derive(Debug, Default, Clone)]
pub struct Layout {
    nodes: Vec<Node>,
    names: HashMap<String, NodeId>,
    config: LayoutConfig,
}

impl Layout {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            nodes: Vec::new(),
            names: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a primitive at its default position. It can be used as a
    /// reference straight away.
    pub fn create(&mut self, name: impl Into<String>, primitive: Primitive) -> NodeId {
        self.insert(
            name.into(),
            NodeKind::Primitive {
                primitive,
                placed: true,
            },
        )
    }

    /// Builds a primitive from script parameters and adds it at its default position.
    pub fn create_from_spec(&mut self, name: impl Into<String>, spec: &ShapeSpec) -> Result<NodeId> {
        let primitive = spec.build(&self.config)?;
        Ok(self.create(name, primitive))
    }

    /// Adds a primitive whose position is still open. Using it as a reference
    /// fails until it is moved, positioned against something or arranged.
    pub fn declare(&mut self, name: impl Into<String>, primitive: Primitive) -> NodeId {
        self.insert(
            name.into(),
            NodeKind::Primitive {
                primitive,
                placed: false,
            },
        )
    }

    /// Bundles existing nodes. Grouping never moves anything.
    pub fn group(&mut self, name: impl Into<String>, members: &[NodeId]) -> Result<NodeId> {
        let name = name.into();
        if members.is_empty() {
            return Err(BeamVizError::invalid(format!("group `{name}` has no members")));
        }
        for member in members {
            self.node(*member)?;
        }
        Ok(self.insert(name, NodeKind::Group(members.to_vec())))
    }

    /// Deep copy. Members shared inside the copied group stay shared in the copy.
    pub fn copy(&mut self, source: NodeId, name: impl Into<String>) -> Result<NodeId> {
        let mut copied = HashMap::new();
        let id = self.copy_node(source, &mut copied)?;
        let name = name.into();
        self.nodes[id.0].name = name.clone();
        self.names.insert(name, id);
        tracing::debug!(source = source.0, copy = id.0, "copied node");
        Ok(id)
    }

    /// Latest node bound to `name`.
    pub fn id(&self, name: &str) -> Result<NodeId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| BeamVizError::unresolved(name))
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| BeamVizError::unresolved(format!("#{}", id.0)))
    }

    pub fn name(&self, id: NodeId) -> Result<&str> {
        Ok(&self.node(id)?.name)
    }

    pub fn primitive(&self, id: NodeId) -> Result<&Primitive> {
        match &self.node(id)?.kind {
            NodeKind::Primitive { primitive, .. } => Ok(primitive),
            NodeKind::Group(_) => Err(BeamVizError::invalid(format!(
                "`{}` is a group, not a primitive",
                self.nodes[id.0].name
            ))),
        }
    }

    pub fn is_placed(&self, id: NodeId) -> Result<bool> {
        Ok(self.first_unplaced(id)?.is_none())
    }

    /// Bounds of a positioned node.
    pub fn bounding_box(&self, id: NodeId) -> Result<Rect> {
        self.require_placed(id)?;
        self.extent(id)
    }

    pub fn center(&self, id: NodeId) -> Result<Point> {
        Ok(self.bounding_box(id)?.center())
    }

    /// Distinct primitives below `id`, in first-visit order.
    pub fn leaves(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_leaves(id, &mut seen, &mut out)?;
        Ok(out)
    }

    /// Primitives below `id` with their names, ready to hand to a renderer.
    pub fn primitives(&self, id: NodeId) -> Result<Vec<(&str, &Primitive)>> {
        self.leaves(id)?
            .into_iter()
            .map(|leaf| Ok((self.name(leaf)?, self.primitive(leaf)?)))
            .collect()
    }

    pub fn shift(&mut self, id: NodeId, vector: Vec2) -> Result<()> {
        finite(vector)?;
        for leaf in self.leaves(id)? {
            self.primitive_mut(leaf).shift(vector);
        }
        Ok(())
    }

    /// Centres the node on `point` and fixes its position.
    pub fn move_to(&mut self, id: NodeId, point: Point) -> Result<()> {
        finite(point.to_vec2())?;
        let center = self.extent(id)?.center();
        self.shift(id, point - center)?;
        self.mark_placed(id)
    }

    pub fn position_relative(&mut self, id: NodeId, anchor: &Anchor) -> Result<()> {
        finite(anchor.direction)?;
        finite(anchor.aligned_edge)?;
        finite(anchor.offset)?;
        let target = critical_point(
            self.bounding_box(anchor.reference)?,
            anchor.aligned_edge + anchor.direction,
        );
        let from = critical_point(self.extent(id)?, anchor.aligned_edge - anchor.direction);
        let shift = target - from + anchor.offset;
        tracing::debug!(
            subject = %self.nodes[id.0].name,
            reference = %self.nodes[anchor.reference.0].name,
            dx = shift.x,
            dy = shift.y,
            "positioned relative"
        );
        self.shift(id, shift)?;
        self.mark_placed(id)
    }

    /// Places `id` beside `reference` along `direction`, `buff` apart.
    pub fn next_to(&mut self, id: NodeId, reference: NodeId, direction: Vec2, buff: f64) -> Result<()> {
        self.position_relative(id, &Anchor::new(reference, direction).buff(buff))
    }

    /// Places `id` beside a fixed point, `buff` apart along `direction`.
    pub fn next_to_point(&mut self, id: NodeId, point: Point, direction: Vec2, buff: f64) -> Result<()> {
        finite(point.to_vec2())?;
        finite(direction)?;
        let from = critical_point(self.extent(id)?, -direction);
        self.shift(id, point - from + direction * buff)?;
        self.mark_placed(id)
    }

    /// Matches the subject's extremum to the reference's on each axis where
    /// `direction` is non-zero. Other axes are untouched.
    pub fn align_to(&mut self, id: NodeId, reference: NodeId, direction: Vec2) -> Result<()> {
        finite(direction)?;
        let target = critical_point(self.bounding_box(reference)?, direction);
        let current = critical_point(self.extent(id)?, direction);
        let delta = target - current;
        let masked = |component: f64, moved: f64| if component != 0.0 { moved } else { 0.0 };
        let shift = Vec2::new(masked(direction.x, delta.x), masked(direction.y, delta.y));
        self.shift(id, shift)?;
        self.mark_placed(id)
    }

    /// Rotates counter-clockwise by `angle` radians about `about`, or about the
    /// node's own centre.
    pub fn rotate(&mut self, id: NodeId, angle: f64, about: Option<Point>) -> Result<()> {
        if !angle.is_finite() {
            return Err(BeamVizError::invalid(format!("rotation angle {angle} is not finite")));
        }
        let about = match about {
            Some(point) => finite(point.to_vec2()).map(|_| point)?,
            None => self.extent(id)?.center(),
        };
        for leaf in self.leaves(id)? {
            self.primitive_mut(leaf).rotate(angle, about);
        }
        Ok(())
    }

    pub fn scale(&mut self, id: NodeId, factor: f64, about: Option<Point>) -> Result<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(BeamVizError::invalid(format!(
                "scale factor must be positive and finite, got {factor}"
            )));
        }
        let about = match about {
            Some(point) => finite(point.to_vec2()).map(|_| point)?,
            None => self.extent(id)?.center(),
        };
        for leaf in self.leaves(id)? {
            self.primitive_mut(leaf).scale(factor, about);
        }
        Ok(())
    }

    /// Turns a line or arrow about its start point so it points at `angle` radians.
    pub fn set_angle(&mut self, id: NodeId, angle: f64) -> Result<()> {
        let (start, end) = self.line_of(id)?;
        let current = (end - start).atan2();
        self.rotate(id, angle - current, Some(start))
    }

    pub fn set_style(&mut self, id: NodeId, style: &Style) -> Result<()> {
        for leaf in self.leaves(id)? {
            self.primitive_mut(leaf).style = style.clone();
        }
        Ok(())
    }

    pub fn set_color(&mut self, id: NodeId, color: Color) -> Result<()> {
        for leaf in self.leaves(id)? {
            let primitive = self.primitive_mut(leaf);
            primitive.style = primitive.style.clone().with_color(color);
        }
        Ok(())
    }

    pub fn set_fill(&mut self, id: NodeId, color: Color, opacity: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(BeamVizError::invalid(format!("fill opacity {opacity} is outside [0, 1]")));
        }
        for leaf in self.leaves(id)? {
            let primitive = self.primitive_mut(leaf);
            primitive.style = primitive.style.clone().with_fill(color, opacity);
        }
        Ok(())
    }

    /// Lays a group's members out one after another along `direction`, keeping
    /// the group's centre where it was.
    pub fn arrange(&mut self, id: NodeId, direction: Vec2, buff: f64) -> Result<()> {
        let members = match &self.node(id)?.kind {
            NodeKind::Group(members) => members.clone(),
            NodeKind::Primitive { .. } => {
                return Err(BeamVizError::invalid("only groups can be arranged"));
            }
        };
        let center = self.extent(id)?.center();
        for pair in members.windows(2) {
            self.mark_placed(pair[0])?;
            self.next_to(pair[1], pair[0], direction, buff)?;
        }
        self.move_to(id, center)
    }

    /// Adds a frame box around a positioned node.
    pub fn surround(&mut self, name: impl Into<String>, target: NodeId, buff: f64) -> Result<NodeId> {
        let bounds = self.bounding_box(target)?;
        let frame = Primitive::surrounding(bounds, buff)?;
        Ok(self.create(name, frame))
    }

    /// Arc of `radius` from the direction of `first` counter-clockwise to the
    /// direction of `second`, centred where the two lines meet.
    pub fn angle(&mut self, name: impl Into<String>, first: NodeId, second: NodeId, radius: f64) -> Result<NodeId> {
        self.require_placed(first)?;
        self.require_placed(second)?;
        let (a0, a1) = self.line_of(first)?;
        let (b0, b1) = self.line_of(second)?;
        let da = a1 - a0;
        let db = b1 - b0;
        let denom = da.cross(db);
        if denom.abs() <= EPSILON {
            return Err(BeamVizError::invalid("lines are parallel and never meet"));
        }
        let t = (b0 - a0).cross(db) / denom;
        let center = a0 + da * t;
        let start = da.atan2();
        let sweep = (db.atan2() - start).rem_euclid(std::f64::consts::TAU);
        let arc = Primitive::arc(center, radius, start, sweep)?;
        Ok(self.create(name, arc))
    }

    pub fn point_from_proportion(&self, id: NodeId, alpha: f64) -> Result<Point> {
        self.require_placed(id)?;
        self.primitive(id)?.point_from_proportion(alpha)
    }

    /// Bounds of every node, in creation order.
    pub fn summary(&self) -> Vec<NodeBounds> {
        (0..self.nodes.len())
            .map(|index| {
                let id = NodeId(index);
                let node = &self.nodes[index];
                NodeBounds {
                    id,
                    name: node.name.clone(),
                    group: matches!(node.kind, NodeKind::Group(_)),
                    bounds: self.bounding_box(id).ok(),
                }
            })
            .collect()
    }

    fn insert(&mut self, name: String, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        tracing::debug!(id = id.0, %name, "added node");
        self.names.insert(name.clone(), id);
        self.nodes.push(Node { name, kind });
        id
    }

    fn copy_node(&mut self, source: NodeId, copied: &mut HashMap<NodeId, NodeId>) -> Result<NodeId> {
        if let Some(existing) = copied.get(&source) {
            return Ok(*existing);
        }
        let node = self.node(source)?.clone();
        let kind = match node.kind {
            NodeKind::Group(members) => {
                let members = members
                    .into_iter()
                    .map(|member| self.copy_node(member, copied))
                    .collect::<Result<Vec<_>>>()?;
                NodeKind::Group(members)
            }
            primitive @ NodeKind::Primitive { .. } => primitive,
        };
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: node.name,
            kind,
        });
        copied.insert(source, id);
        Ok(id)
    }

    /// Bounds from the current geometry, placed or not.
    fn extent(&self, id: NodeId) -> Result<Rect> {
        let leaves = self.leaves(id)?;
        let mut bounds: Option<Rect> = None;
        for leaf in leaves {
            let leaf_bounds = self.primitive(leaf)?.bounds();
            bounds = Some(match bounds {
                Some(acc) => acc.union(leaf_bounds),
                None => leaf_bounds,
            });
        }
        bounds.ok_or_else(|| BeamVizError::invalid("node has no primitives"))
    }

    fn first_unplaced(&self, id: NodeId) -> Result<Option<NodeId>> {
        for leaf in self.leaves(id)? {
            if let NodeKind::Primitive { placed: false, .. } = self.nodes[leaf.0].kind {
                return Ok(Some(leaf));
            }
        }
        Ok(None)
    }

    fn require_placed(&self, id: NodeId) -> Result<()> {
        match self.first_unplaced(id)? {
            Some(leaf) => Err(BeamVizError::unresolved(self.nodes[leaf.0].name.clone())),
            None => Ok(()),
        }
    }

    fn mark_placed(&mut self, id: NodeId) -> Result<()> {
        for leaf in self.leaves(id)? {
            if let NodeKind::Primitive { placed, .. } = &mut self.nodes[leaf.0].kind {
                *placed = true;
            }
        }
        Ok(())
    }

    fn collect_leaves(&self, id: NodeId, seen: &mut HashSet<NodeId>, out: &mut Vec<NodeId>) -> Result<()> {
        match &self.node(id)?.kind {
            NodeKind::Primitive { .. } => {
                if seen.insert(id) {
                    out.push(id);
                }
            }
            NodeKind::Group(members) => {
                for member in members {
                    self.collect_leaves(*member, seen, out)?;
                }
            }
        }
        Ok(())
    }

    fn line_of(&self, id: NodeId) -> Result<(Point, Point)> {
        self.primitive(id)?
            .line_endpoints()
            .ok_or_else(|| BeamVizError::invalid(format!("`{}` is not a line", self.nodes[id.0].name)))
    }

    /// Callers pass ids that `leaves` returned, which are always primitives.
    fn primitive_mut(&mut self, id: NodeId) -> &mut Primitive {
        match &mut self.nodes[id.0].kind {
            NodeKind::Primitive { primitive, .. } => primitive,
            NodeKind::Group(_) => unreachable!("leaves only yields primitives"),
        }
    }
}

fn finite(vector: Vec2) -> Result<()> {
    if vector.is_finite() {
        Ok(())
    } else {
        Err(BeamVizError::invalid(format!("non-finite vector {vector:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{DEGREES, DOWN, LEFT, ORIGIN, RIGHT, UP};

    fn layout() -> Layout {
        Layout::new(LayoutConfig::default())
    }

    fn near(a: Point, b: Point, tolerance: f64) -> bool {
        (a - b).hypot() <= tolerance
    }

    fn circle(layout: &mut Layout, name: &str, radius: f64) -> NodeId {
        layout.create(name, Primitive::circle(radius).unwrap())
    }

    #[test]
    fn circle_hangs_below_rectangle_at_offset() {
        let mut layout = layout();
        let rect = layout.create("beam", Primitive::rectangle(2.0, 0.1).unwrap());
        let wheel = circle(&mut layout, "wheel", 0.06);

        layout
            .position_relative(wheel, &Anchor::new(rect, DOWN).offset(Vec2::new(2.0, -1.0)))
            .unwrap();

        let center = layout.center(wheel).unwrap();
        assert!(near(center, Point::new(2.0, -1.0 - 0.05 - 0.06), 1e-12));
    }

    #[test]
    fn relative_positioning_is_deterministic() {
        let mut layout = layout();
        let reference = layout.create("ref", Primitive::rectangle(1.0, 0.5).unwrap());
        layout.shift(reference, Vec2::new(0.3, -0.7)).unwrap();
        let subject = circle(&mut layout, "subject", 0.2);
        let anchor = Anchor::new(reference, RIGHT).aligned_edge(UP).buff(0.25);

        layout.position_relative(subject, &anchor).unwrap();
        let first = layout.bounding_box(subject).unwrap();
        layout.position_relative(subject, &anchor).unwrap();
        let second = layout.bounding_box(subject).unwrap();

        assert_eq!(first, second);
        assert!((first.y1 - (-0.7 + 0.25)).abs() < 1e-12);
        assert!((first.x0 - (0.3 + 0.5 + 0.25)).abs() < 1e-12);
    }

    #[test]
    fn copies_do_not_alias() {
        let mut layout = layout();
        let original = circle(&mut layout, "original", 0.5);
        let copy = layout.copy(original, "copy").unwrap();

        layout.shift(copy, RIGHT * 3.0).unwrap();
        assert_eq!(layout.center(original).unwrap(), ORIGIN);

        layout.shift(original, UP).unwrap();
        assert!(near(layout.center(copy).unwrap(), ORIGIN + RIGHT * 3.0, 1e-12));
    }

    #[test]
    fn group_copies_keep_shared_members_shared() {
        let mut layout = layout();
        let a = circle(&mut layout, "a", 0.1);
        let inner = layout.group("inner", &[a]).unwrap();
        let outer = layout.group("outer", &[inner, a]).unwrap();

        let copy = layout.copy(outer, "outer copy").unwrap();
        assert_eq!(layout.leaves(copy).unwrap().len(), 1);
        assert_ne!(layout.leaves(copy).unwrap(), layout.leaves(outer).unwrap());
    }

    #[test]
    fn grouping_is_structural_only() {
        let build = |nest_left: bool| {
            let mut layout = layout();
            let a = circle(&mut layout, "a", 0.1);
            let b = layout.create("b", Primitive::rectangle(1.0, 0.2).unwrap());
            let c = layout.create("c", Primitive::line(ORIGIN + LEFT, ORIGIN + RIGHT).unwrap());
            layout.shift(b, UP).unwrap();
            layout.shift(c, DOWN * 2.0).unwrap();
            let all = if nest_left {
                let ab = layout.group("ab", &[a, b]).unwrap();
                layout.group("all", &[ab, c]).unwrap()
            } else {
                let bc = layout.group("bc", &[b, c]).unwrap();
                layout.group("all", &[a, bc]).unwrap()
            };
            layout.shift(all, RIGHT * 0.5).unwrap();
            [a, b, c].map(|id| layout.bounding_box(id).unwrap())
        };

        assert_eq!(build(true), build(false));
    }

    #[test]
    fn shared_members_move_once() {
        let mut layout = layout();
        let prop = layout.create("prop", Primitive::triangle().unwrap());
        let wheel = layout.group("wheel", &[prop]).unwrap();
        let support = layout.group("support", &[wheel, prop]).unwrap();

        layout.shift(support, RIGHT).unwrap();
        assert!((layout.bounding_box(prop).unwrap().center().x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rotate_then_unrotate_restores_orientation() {
        let mut layout = layout();
        let beam = layout.create("beam", Primitive::rectangle(1.5, 0.1).unwrap());
        layout.shift(beam, Vec2::new(0.75, 0.2)).unwrap();
        let before = layout.primitive(beam).unwrap().clone();

        let center = layout.center(beam).unwrap();
        layout.rotate(beam, 0.2, Some(center)).unwrap();
        assert!((layout.primitive(beam).unwrap().angle - 0.2).abs() < 1e-12);
        layout.rotate(beam, -0.2, Some(center)).unwrap();

        let after = layout.primitive(beam).unwrap();
        assert!(after.angle.abs() < 1e-12);
        for (a, b) in before.extent_points().iter().zip(after.extent_points()) {
            assert!(near(*a, b, 1e-12));
        }
    }

    #[test]
    fn unplaced_reference_is_rejected() {
        let mut layout = layout();
        let floating = layout.declare("hinge", Primitive::circle(0.05).unwrap());
        let subject = circle(&mut layout, "label", 0.1);

        let err = layout.next_to(subject, floating, DOWN, 0.1).unwrap_err();
        assert!(matches!(err, BeamVizError::UnresolvedReference(ref name) if name == "hinge"));
        assert!(matches!(
            layout.bounding_box(floating),
            Err(BeamVizError::UnresolvedReference(_))
        ));

        layout.move_to(floating, Point::new(1.0, 1.0)).unwrap();
        layout.next_to(subject, floating, DOWN, 0.1).unwrap();
        assert!(layout.is_placed(subject).unwrap());
    }

    #[test]
    fn unknown_names_are_unresolved() {
        let layout = layout();
        assert!(matches!(layout.id("wall"), Err(BeamVizError::UnresolvedReference(_))));
    }

    #[test]
    fn align_to_moves_only_masked_axes() {
        let mut layout = layout();
        let beam = layout.create("beam", Primitive::rectangle(2.0, 0.1).unwrap());
        let wall = layout.create("wall", Primitive::line(ORIGIN + UP * 0.5, ORIGIN + DOWN * 0.5).unwrap());
        layout.shift(wall, Vec2::new(3.0, 2.0)).unwrap();

        layout.align_to(wall, beam, LEFT).unwrap();
        let bounds = layout.bounding_box(wall).unwrap();
        assert!((bounds.x0 + 1.0).abs() < 1e-12);
        assert!((bounds.center().y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn set_angle_turns_about_start() {
        let mut layout = layout();
        let line = layout.create("hatch", Primitive::line(ORIGIN, ORIGIN + DOWN * 0.2).unwrap());
        layout.set_angle(line, 30.0 * DEGREES).unwrap();

        let primitive = layout.primitive(line).unwrap();
        assert!((primitive.line_angle().unwrap() - 30.0 * DEGREES).abs() < 1e-12);
        let (start, end) = primitive.line_endpoints().unwrap();
        assert!(near(start, ORIGIN, 1e-12));
        assert!((end.distance(start) - 0.2).abs() < 1e-12);

        let dot = circle(&mut layout, "dot", 0.1);
        assert!(matches!(layout.set_angle(dot, 0.0), Err(BeamVizError::InvalidGeometry(_))));
    }

    #[test]
    fn next_to_point_leaves_a_gap() {
        let mut layout = layout();
        let label = layout.declare("label", Primitive::rectangle(0.4, 0.2).unwrap());
        layout.next_to_point(label, Point::new(3.0, 0.0), UP, 0.1).unwrap();

        let bounds = layout.bounding_box(label).unwrap();
        assert!((bounds.y0 - 0.1).abs() < 1e-12);
        assert!((bounds.center().x - 3.0).abs() < 1e-12);
    }

    #[test]
    fn scale_rejects_non_positive_factors() {
        let mut layout = layout();
        let dot = circle(&mut layout, "dot", 1.0);
        assert!(matches!(layout.scale(dot, 0.0, None), Err(BeamVizError::InvalidGeometry(_))));

        layout.scale(dot, 0.2, None).unwrap();
        assert!((layout.bounding_box(dot).unwrap().width() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn angle_arc_starts_at_intersection() {
        let mut layout = layout();
        let left = ORIGIN + LEFT;
        let base = layout.create("base", Primitive::line(left, ORIGIN + RIGHT).unwrap());
        let moving = layout.create("moving", Primitive::line(left, ORIGIN + RIGHT).unwrap());
        layout.rotate(moving, 20.0 * DEGREES, Some(left)).unwrap();

        let arc = layout.angle("theta", base, moving, 0.5).unwrap();
        let start = layout.point_from_proportion(arc, 0.0).unwrap();
        let end = layout.point_from_proportion(arc, 1.0).unwrap();

        assert!(near(start, left + RIGHT * 0.5, 1e-9));
        assert!((end.distance(left) - 0.5).abs() < 1e-9);
        assert!(((end - left).atan2() - 20.0 * DEGREES).abs() < 1e-9);

        let parallel = layout.create("parallel", Primitive::line(left + UP, ORIGIN + RIGHT + UP).unwrap());
        assert!(layout.angle("none", base, parallel, 0.5).is_err());
    }

    #[test]
    fn arrange_keeps_group_centre() {
        let mut layout = layout();
        let parts: Vec<_> = (0..3)
            .map(|i| layout.create(format!("part{i}"), Primitive::rectangle(1.0, 0.5).unwrap()))
            .collect();
        let row = layout.group("row", &parts).unwrap();

        layout.arrange(row, RIGHT, 0.25).unwrap();
        let bounds = layout.bounding_box(row).unwrap();
        assert!(near(bounds.center(), ORIGIN, 1e-12));
        assert!((bounds.width() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn surround_pads_the_target() {
        let mut layout = layout();
        let hinge = circle(&mut layout, "hinge", 0.05);
        let frame = layout.surround("frame", hinge, 0.1).unwrap();

        let bounds = layout.bounding_box(frame).unwrap();
        assert!((bounds.width() - 0.3).abs() < 1e-12);
        assert!(layout.surround("none", NodeId(99), 0.1).is_err());
    }

    #[test]
    fn rotated_angle_arc_keeps_finite_bounds() {
        let mut layout = layout();
        let left = ORIGIN + LEFT;
        let base = layout.create("base", Primitive::line(left, ORIGIN + RIGHT).unwrap());
        let moving = layout.create("moving", Primitive::line(left, ORIGIN + RIGHT).unwrap());
        layout.rotate(moving, 20.0 * DEGREES, Some(left)).unwrap();
        let arc = layout.angle("theta", base, moving, 0.5).unwrap();

        for turn in [1e17, 1e19, 1e21] {
            layout.rotate(arc, turn, None).unwrap();
            let bounds = layout.bounding_box(arc).unwrap();
            assert!(bounds.width() <= 1.0 + 1e-9 && bounds.height() <= 1.0 + 1e-9);
        }
    }
}
