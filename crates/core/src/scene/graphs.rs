use crate::{
    layout::Layout,
    plot::{AxesSpec, AxisRange, Axes},
    timeline::Timeline,
    Result,
};

/// Sagging moment diagram for a central point load, in units of WL/4.
pub(super) fn particular_equilibrium(layout: &mut Layout, timeline: &mut Timeline) -> Result<()> {
    let spec = AxesSpec {
        x_range: AxisRange::new(0.0, 1.0, 0.5),
        y_range: AxisRange::new(-1.0, 1.0, 1.0),
        x_numbers: vec![0.0, 0.5],
        y_numbers: vec![-1.0, -0.5, 0.0, 0.5],
        ..AxesSpec::default()
    };
    moment_diagram(
        layout,
        timeline,
        spec,
        ["length(l)", "B.M.(WL/4)"],
        &[0.0, 0.5, 1.0],
        &[0.0, -1.0, 0.0],
    )
}

/// Linear self-stress moment, from the redundant reaction at the wall to zero
/// at the prop.
pub(super) fn self_stress(layout: &mut Layout, timeline: &mut Timeline) -> Result<()> {
    let spec = AxesSpec {
        x_range: AxisRange::new(0.0, 1.5, 0.5),
        y_range: AxisRange::new(0.0, 1.5, 0.5),
        x_numbers: vec![0.0, 0.5],
        y_numbers: vec![0.0, 0.5],
        ..AxesSpec::default()
    };
    moment_diagram(
        layout,
        timeline,
        spec,
        ["length(l)", "moment(M)"],
        &[0.0, 1.0],
        &[1.0, 0.0],
    )
}

fn moment_diagram(
    layout: &mut Layout,
    timeline: &mut Timeline,
    spec: AxesSpec,
    [x_label, y_label]: [&str; 2],
    xs: &[f64],
    ys: &[f64],
) -> Result<()> {
    let axes = Axes::build(layout, "ax", spec)?;
    let labels = axes.axis_labels(layout, x_label, y_label)?;
    let graph = axes.line_graph(layout, "graph", xs, ys)?;

    timeline.fade_in(&[axes.group(), labels, graph]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutConfig, TimelineConfig};

    #[test]
    fn moment_peak_sits_at_midspan() {
        let mut layout = Layout::new(LayoutConfig::default());
        let mut timeline = Timeline::new(TimelineConfig::default());
        particular_equilibrium(&mut layout, &mut timeline).unwrap();

        let line = layout.id("graph.line").unwrap();
        let midspan = layout.point_from_proportion(line, 0.5).unwrap();
        assert!(midspan.x.abs() < 1e-12);
        assert!((midspan.y + 3.0).abs() < 1e-12);
        assert!((layout.bounding_box(line).unwrap().y0 - midspan.y).abs() < 1e-12);
        assert_eq!(timeline.cues().len(), 1);
    }

    #[test]
    fn self_stress_graph_starts_at_unit_moment() {
        let mut layout = Layout::new(LayoutConfig::default());
        let mut timeline = Timeline::new(TimelineConfig::default());
        self_stress(&mut layout, &mut timeline).unwrap();

        let first_dot = layout.center(layout.id("graph.dot0").unwrap()).unwrap();
        // y = 1 on a 0..1.5 range six units tall
        assert!((first_dot.y - 1.0).abs() < 1e-12);
        assert!((first_dot.x + 3.0).abs() < 1e-12);
    }
}
