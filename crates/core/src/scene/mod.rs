//! Catalogue of the scenes that ship with the crate.
//!
//! Each scene lays itself out completely up front and then hands a fixed
//! timeline to whatever [`Renderer`] it is played into.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    layout::Layout,
    render::{RenderItem, Renderer, Transition},
    timeline::{Cue, PlaybackClock, Timeline},
    BeamVizError, Result,
};

mod cantilever;
mod equation;
mod graphs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneKind {
    /// Propped cantilever under its load.
    ProppedCantilever,
    /// Collapse mechanism with the two plastic hinges and the hinge angle.
    UpperBound,
    /// Work-done equation for the upper-bound mechanism.
    UpperBoundEquation,
    /// Bending-moment diagram for the particular equilibrium solution.
    ParticularEquilibrium,
    /// Bending moment caused by self-stress in the indeterminate beam.
    SelfStress,
}

impl SceneKind {
    pub const ALL: [SceneKind; 5] = [
        SceneKind::ProppedCantilever,
        SceneKind::UpperBound,
        SceneKind::UpperBoundEquation,
        SceneKind::ParticularEquilibrium,
        SceneKind::SelfStress,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            SceneKind::ProppedCantilever => "propped-cantilever",
            SceneKind::UpperBound => "upper-bound",
            SceneKind::UpperBoundEquation => "upper-bound-equation",
            SceneKind::ParticularEquilibrium => "particular-equilibrium",
            SceneKind::SelfStress => "self-stress",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SceneKind::ProppedCantilever => "Propped cantilever under loading",
            SceneKind::UpperBound => "Upper bound: hinge formation",
            SceneKind::UpperBoundEquation => "Upper bound work equation",
            SceneKind::ParticularEquilibrium => "Particular equilibrium bending moment",
            SceneKind::SelfStress => "Self-stress bending moment",
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for SceneKind {
    type Err = BeamVizError;

    fn from_str(s: &str) -> Result<Self> {
        SceneKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| BeamVizError::msg(format!("unknown scene `{s}`")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDescriptor {
    pub name: String,
    pub kind: SceneKind,
}

impl SceneDescriptor {
    pub fn new(kind: SceneKind) -> Self {
        Self {
            name: kind.title().to_string(),
            kind,
        }
    }

    pub fn catalogue() -> Vec<Self> {
        SceneKind::ALL.into_iter().map(Self::new).collect()
    }
}

/// A fully laid-out scene and the timeline that presents it.
#[derive(Debug, Clone)]
pub struct SceneInstance {
    pub descriptor: SceneDescriptor,
    pub layout: Layout,
    pub timeline: Timeline,
}

impl SceneInstance {
    pub fn build(kind: SceneKind, config: &AppConfig) -> Result<Self> {
        let mut layout = Layout::new(config.layout.clone());
        let mut timeline = Timeline::new(config.timeline.clone());

        match kind {
            SceneKind::ProppedCantilever => {
                cantilever::propped_cantilever(&mut layout, &mut timeline, &config.frame)?
            }
            SceneKind::UpperBound => cantilever::upper_bound(&mut layout, &mut timeline)?,
            SceneKind::UpperBoundEquation => equation::upper_bound_equation(&mut layout, &mut timeline)?,
            SceneKind::ParticularEquilibrium => {
                graphs::particular_equilibrium(&mut layout, &mut timeline)?
            }
            SceneKind::SelfStress => graphs::self_stress(&mut layout, &mut timeline)?,
        }

        tracing::debug!(scene = %kind, nodes = layout.len(), "laid out scene");
        Ok(Self {
            descriptor: SceneDescriptor::new(kind),
            layout,
            timeline,
        })
    }

    /// Submits the timeline to `renderer` cue by cue and returns the clock at
    /// the end of the scene.
    pub fn play<R: Renderer + ?Sized>(&self, renderer: &mut R) -> Result<PlaybackClock> {
        tracing::info!(
            scene = %self.descriptor.kind,
            duration = self.timeline.duration(),
            "playing scene"
        );
        let mut clock = PlaybackClock::default();
        for scheduled in self.timeline.schedule() {
            match &scheduled.cue {
                Cue::Add { targets } => {
                    renderer.display(&RenderItem::snapshot_all(&self.layout, targets)?)?
                }
                Cue::Play {
                    animation,
                    run_time,
                } => {
                    let transition = Transition::resolve(&self.layout, animation)?;
                    renderer.animate(&transition, *run_time)?
                }
                Cue::Wait { seconds } => renderer.animate(&Transition::Wait, *seconds)?,
            }
            clock.advance(scheduled.cue.duration());
        }
        Ok(clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordingSettings, Recorder, RenderCall};

    #[test]
    fn every_scene_builds_and_plays() {
        let config = AppConfig::default();
        for kind in SceneKind::ALL {
            let scene = SceneInstance::build(kind, &config).unwrap();
            let mut recorder = Recorder::new(RecordingSettings::default());
            recorder.start().unwrap();

            let clock = scene.play(&mut recorder).unwrap();
            assert_eq!(clock.time_seconds, scene.timeline.duration(), "{kind}");
            assert_eq!(recorder.calls().len(), scene.timeline.cues().len(), "{kind}");
        }
    }

    #[test]
    fn slugs_round_trip() {
        for kind in SceneKind::ALL {
            assert_eq!(kind.slug().parse::<SceneKind>().unwrap(), kind);
        }
        assert!("beam".parse::<SceneKind>().is_err());
        assert_eq!(SceneDescriptor::catalogue().len(), 5);
    }

    #[test]
    fn groups_reach_the_renderer_as_single_items() {
        let scene = SceneInstance::build(SceneKind::ProppedCantilever, &AppConfig::default()).unwrap();
        let mut recorder = Recorder::new(RecordingSettings::default());
        recorder.start().unwrap();
        scene.play(&mut recorder).unwrap();

        let RenderCall::Animate {
            transition: Transition::FadeIn { items },
            ..
        } = &recorder.calls()[2].call
        else {
            panic!("third call should fade in the wall and floor");
        };
        let names: Vec<_> = items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["wall", "floor"]);
        assert_eq!(items[0].primitives.len(), 4);
    }
}
