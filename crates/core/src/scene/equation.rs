use crate::{
    geometry::{DOWN, RIGHT},
    layout::{Layout, NodeId},
    shape::Primitive,
    timeline::Timeline,
    Result,
};

const FONT_SIZE: f64 = 50.0;

/// Compatibility and work equations. The frame box first marks the external
/// work term, then moves onto the collapse load.
pub(super) fn upper_bound_equation(layout: &mut Layout, timeline: &mut Timeline) -> Result<()> {
    let compatibility = layout.create(
        "compatibility",
        Primitive::math(r"\theta=2\delta/L", FONT_SIZE, layout.config())?,
    );

    let parts = [r"W\times\delta", r"=M_{p}2\theta+M_{p}\theta", "=", r"6M_{p}/L"]
        .iter()
        .enumerate()
        .map(|(i, tex)| -> Result<NodeId> {
            let part = Primitive::math(*tex, FONT_SIZE, layout.config())?;
            Ok(layout.create(format!("energy[{i}]"), part))
        })
        .collect::<Result<Vec<_>>>()?;
    let energy = layout.group("energy", &parts)?;
    // parts of one formula are set edge to edge
    layout.arrange(energy, RIGHT, 0.0)?;
    layout.shift(energy, DOWN)?;

    let framebox1 = layout.surround("framebox1", parts[0], 0.1)?;
    let framebox2 = layout.surround("framebox2", parts[3], 0.1)?;

    timeline
        .fade_in(&[compatibility])
        .fade_in(&[energy])
        .create(framebox1)
        .wait()
        .replacement_transform(framebox1, framebox2)
        .wait();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{LayoutConfig, TimelineConfig},
        geometry::Point,
    };

    #[test]
    fn energy_parts_sit_in_one_row_below_compatibility() {
        let mut layout = Layout::new(LayoutConfig::default());
        let mut timeline = Timeline::new(TimelineConfig::default());
        upper_bound_equation(&mut layout, &mut timeline).unwrap();

        let part = |i: usize| {
            let id = layout.id(&format!("energy[{i}]")).unwrap();
            layout.bounding_box(id).unwrap()
        };
        for i in 0..3 {
            assert!((part(i).x1 - part(i + 1).x0).abs() < 1e-12);
            assert!((part(i).center().y + 1.0).abs() < 1e-12);
        }

        let energy = layout.bounding_box(layout.id("energy").unwrap()).unwrap();
        assert!((energy.center() - Point::new(0.0, -1.0)).hypot() < 1e-12);
        assert_eq!(timeline.duration(), 6.0);
    }

    #[test]
    fn frame_boxes_mark_first_and_last_terms() {
        let mut layout = Layout::new(LayoutConfig::default());
        let mut timeline = Timeline::new(TimelineConfig::default());
        upper_bound_equation(&mut layout, &mut timeline).unwrap();

        let bounds = |name: &str| layout.bounding_box(layout.id(name).unwrap()).unwrap();
        let centred = |frame: &str, part: &str| (bounds(frame).center() - bounds(part).center()).hypot() < 1e-12;
        assert!(centred("framebox1", "energy[0]"));
        assert!(centred("framebox2", "energy[3]"));
    }
}
