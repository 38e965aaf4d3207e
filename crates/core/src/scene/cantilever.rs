//! The beam diagrams: the propped cantilever and its collapse mechanism.
//!
//! Offsets here are the diagram. Parts are allowed to overlap (hinges sit on
//! top of the beam, the load arrow runs into it).

use std::collections::HashMap;

use crate::{
    config::FrameConfig,
    geometry::{Point, Vec2, DEGREES, DOWN, LEFT, ORIGIN, RIGHT, UP},
    layout::{Layout, NodeId},
    script::Script,
    shape::{Color, Primitive, ShapeSpec, Slant, Style},
    timeline::Timeline,
    BeamVizError, Result,
};

const WHEEL_RADIUS: f64 = 0.06;
const HINGE_RADIUS: f64 = 0.05;
const BEAM_DEPTH: f64 = 0.1;
/// Hatch lines are set to this many radians, not degrees.
const HATCH_ANGLE: f64 = 70.0;

pub(super) fn propped_cantilever(layout: &mut Layout, timeline: &mut Timeline, frame: &FrameConfig) -> Result<()> {
    let mut script = Script::new();
    script
        .create("circle1", ShapeSpec::Circle { radius: WHEEL_RADIUS })
        .copy("circle2", "circle1")
        .create_styled(
            "rectangle",
            ShapeSpec::Rectangle {
                width: 4.0,
                height: BEAM_DEPTH,
            },
            beam_style(),
        );
    prop_and_wheels(&mut script);
    wall(&mut script, "rectangle");
    script.group("wall", &["dline1", "dline2", "dline3", "vline"]);
    floor(&mut script);
    script
        .create(
            "arrow",
            ShapeSpec::Arrow {
                start: frame.top(),
                end: ORIGIN,
            },
        )
        .scale("arrow", 0.2)
        .align_to("arrow", "rectangle", UP)
        .create(
            "weight",
            ShapeSpec::Text {
                content: "Weight of Life".to_string(),
                font_size: 20.0,
                slant: Slant::Italic,
            },
        )
        .shift("weight", DOWN)
        .group("loading", &["arrow", "weight"])
        .group("wheel", &["circle1", "circle2"]);

    let ids = script.run(layout)?;
    let id = |name: &str| bound(&ids, name);
    timeline
        .fade_in(&[id("rectangle")?])
        .fade_in(&[id("prop")?, id("wheel")?])
        .fade_in(&[id("wall")?, id("floor")?])
        .fade_in(&[id("loading")?])
        .wait();
    Ok(())
}

pub(super) fn upper_bound(layout: &mut Layout, timeline: &mut Timeline) -> Result<()> {
    let mut script = Script::new();
    // deformed beam: two halves turned in opposite directions
    script
        .create_styled(
            "rectangle1",
            ShapeSpec::Rectangle {
                width: 1.5,
                height: BEAM_DEPTH,
            },
            beam_style(),
        )
        .copy("rectangle2", "rectangle1")
        .shift("rectangle2", RIGHT * 1.5)
        .rotate("rectangle2", 0.2)
        .rotate("rectangle1", -0.2)
        .group("beam", &["rectangle1", "rectangle2"])
        .create("hinge1", ShapeSpec::Circle { radius: HINGE_RADIUS })
        .set_fill("hinge1", Color::BLACK, 1.0)
        .copy("hinge2", "hinge1")
        .shift("hinge2", Vec2::new(0.75, -0.15))
        .surround("framebox1", "hinge2", 0.1);

    script
        .create("circle1", ShapeSpec::Circle { radius: WHEEL_RADIUS })
        .copy("circle2", "circle1");
    prop_and_wheels(&mut script);
    script.group("wheel", &["prop", "circle1", "circle2"]);

    wall(&mut script, "rectangle1");
    script
        .align_to("hinge1", "rectangle1", LEFT)
        .shift("hinge1", UP * 0.15)
        .group("wall", &["dline1", "dline2", "dline3", "vline", "hinge1"]);
    floor(&mut script);
    script
        .group("support", &["wheel", "floor"])
        .shift("support", Vec2::new(0.25, 0.15));

    let ids = script.run(layout)?;
    let angle = hinge_angle(layout)?;

    let id = |name: &str| bound(&ids, name);
    timeline
        .fade_in(&[id("beam")?, id("wall")?, id("support")?])
        .wait()
        .fade_in(&[id("hinge2")?])
        .create(id("framebox1")?)
        .wait()
        .fade_in(&[angle])
        .wait();
    Ok(())
}

/// The θ annotation: a fixed line, a copy turned 20° about its left end, the
/// arc between them and the label, moved off to the right of the beam.
fn hinge_angle(layout: &mut Layout) -> Result<NodeId> {
    let (left, right) = (ORIGIN + LEFT, ORIGIN + RIGHT);
    let base = layout.create("line1", Primitive::line(left, right)?);
    let moving = layout.create("line_moving", Primitive::line(left, right)?);
    layout.rotate(moving, 20.0 * DEGREES, Some(left))?;

    let arc = layout.angle("a", base, moving, 0.5)?;
    let label_radius = 0.5 + 3.0 * layout.config().small_buff;
    let guide = layout.angle("theta_guide", base, moving, label_radius)?;
    let label_at = layout.point_from_proportion(guide, 0.3)?;
    let label = layout.create("tex", Primitive::math(r"\theta", 40.0, layout.config())?);
    layout.move_to(label, label_at)?;

    let angle = layout.group("angle", &[base, moving, arc, label])?;
    layout.shift(angle, RIGHT * 4.0)?;
    Ok(angle)
}

/// Roller prop under the right end of the beam. Expects `circle1` and
/// `circle2` to exist already.
fn prop_and_wheels(script: &mut Script) {
    // The wheels are placed against the prop with a buffer perpendicular to
    // the direction, which contributes nothing, so they touch it.
    script
        .create("prop", ShapeSpec::Triangle)
        .scale("prop", 0.2)
        .set_color("prop", Color::WHITE)
        .shift("prop", Vec2::new(2.0, -0.5))
        .shift("circle1", Vec2::new(2.0, -1.0))
        .next_to_buff("circle1", "prop", DOWN, 0.0)
        .shift("circle1", LEFT * 0.1)
        .next_to("circle2", "circle1", RIGHT)
        .next_to_buff("circle2", "prop", DOWN, 0.0)
        .shift("circle2", RIGHT * 0.1);
}

/// Fixed support: a vertical face at the beam's left end with three hatch lines.
fn wall(script: &mut Script, beam: &str) {
    script
        .create(
            "vline",
            ShapeSpec::Line {
                start: Point::new(0.0, 0.5),
                end: Point::new(0.0, -0.5),
            },
        )
        .align_to("vline", beam, LEFT)
        .create(
            "dline1",
            ShapeSpec::Line {
                start: ORIGIN,
                end: Point::new(0.0, -0.2),
            },
        )
        .set_angle("dline1", HATCH_ANGLE)
        .next_to("dline1", "vline", LEFT * 0.2)
        .copy("dline2", "dline1")
        .next_to("dline2", "dline1", UP * 0.5)
        .copy("dline3", "dline1")
        .next_to("dline3", "dline1", DOWN * 0.5);
}

/// Ground line under the wheels with three hatch lines copied from the wall.
fn floor(script: &mut Script) {
    script
        .create(
            "hline",
            ShapeSpec::Line {
                start: Point::new(0.5, 0.0),
                end: Point::new(-0.5, 0.0),
            },
        )
        .align_to("hline", "circle1", DOWN)
        .shift("hline", RIGHT * 2.0)
        .copy("dline4", "dline1")
        .next_to("dline4", "hline", DOWN * 0.2)
        .copy("dline5", "dline4")
        .shift("dline5", LEFT * 0.3)
        .copy("dline6", "dline4")
        .shift("dline6", RIGHT * 0.3)
        .group("floor", &["dline4", "dline5", "dline6", "hline"]);
}

fn beam_style() -> Style {
    Style::stroked(Color::PINK).with_fill(Color::PINK, 0.5)
}

fn bound(ids: &HashMap<String, NodeId>, name: &str) -> Result<NodeId> {
    ids.get(name)
        .copied()
        .ok_or_else(|| BeamVizError::unresolved(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{LayoutConfig, TimelineConfig},
        geometry::Rect,
    };

    fn build(scene: impl FnOnce(&mut Layout, &mut Timeline) -> Result<()>) -> (Layout, Timeline) {
        let mut layout = Layout::new(LayoutConfig::default());
        let mut timeline = Timeline::new(TimelineConfig::default());
        scene(&mut layout, &mut timeline).unwrap();
        (layout, timeline)
    }

    fn propped() -> (Layout, Timeline) {
        build(|layout, timeline| propped_cantilever(layout, timeline, &FrameConfig::default()))
    }

    fn bounds(layout: &Layout, name: &str) -> Rect {
        layout.bounding_box(layout.id(name).unwrap()).unwrap()
    }

    #[test]
    fn wheels_touch_the_prop() {
        let (layout, _) = propped();
        let prop = bounds(&layout, "prop");
        let left = bounds(&layout, "circle1");
        let right = bounds(&layout, "circle2");

        assert!((left.y1 - prop.y0).abs() < 1e-12);
        assert!((left.center().x - (prop.center().x - 0.1)).abs() < 1e-12);
        assert!((right.center().x - (prop.center().x + 0.1)).abs() < 1e-12);
        assert!((left.center().y - right.center().y).abs() < 1e-12);
    }

    #[test]
    fn wall_sits_at_beam_end() {
        let (layout, _) = propped();
        let beam = bounds(&layout, "rectangle");
        let vline = bounds(&layout, "vline");
        let hatch = bounds(&layout, "dline1");

        assert!((vline.x0 - beam.x0).abs() < 1e-12);
        assert!((hatch.x1 - (vline.x0 - 0.05)).abs() < 1e-12);
        assert!((hatch.center().y - vline.center().y).abs() < 1e-12);
    }

    #[test]
    fn floor_runs_under_the_wheels() {
        let (layout, _) = propped();
        let wheel = bounds(&layout, "circle1");
        let floor_line = bounds(&layout, "hline");

        assert!((floor_line.y0 - wheel.y0).abs() < 1e-12);
        assert!((floor_line.center().x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn load_arrow_meets_beam_top() {
        let (layout, timeline) = propped();
        let arrow = bounds(&layout, "arrow");
        let beam = bounds(&layout, "rectangle");

        assert!((arrow.y1 - beam.y1).abs() < 1e-12);
        assert!((arrow.height() - 0.7).abs() < 1e-9);
        assert_eq!(timeline.duration(), 5.0);
    }

    #[test]
    fn support_is_shifted_with_the_prop() {
        let (layout, _) = build(upper_bound);
        let prop = bounds(&layout, "prop");
        let hline = bounds(&layout, "hline");

        assert!((prop.center().x - 2.25).abs() < 1e-12);
        assert!((hline.center().x - 2.25).abs() < 1e-12);
    }

    #[test]
    fn framebox_surrounds_second_hinge() {
        let (layout, timeline) = build(upper_bound);
        let hinge = bounds(&layout, "hinge2");
        let frame = bounds(&layout, "framebox1");

        assert!((frame.center() - hinge.center()).hypot() < 1e-12);
        assert!((frame.width() - (2.0 * HINGE_RADIUS + 0.2)).abs() < 1e-12);
        assert_eq!(timeline.duration(), 7.0);
    }

    #[test]
    fn angle_annotation_is_moved_right() {
        let (layout, _) = build(upper_bound);
        let base = bounds(&layout, "line1");
        let label = bounds(&layout, "tex");

        assert!((base.x0 - 3.0).abs() < 1e-12);
        assert!(label.center().y > 0.0);
        assert!(label.center().x > base.x0);
    }
}
