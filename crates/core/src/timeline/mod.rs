use serde::{Deserialize, Serialize};

use crate::{config::TimelineConfig, layout::NodeId, BeamVizError, Result};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlaybackClock {
    pub time_seconds: f64,
}

impl PlaybackClock {
    pub fn reset(&mut self) {
        self.time_seconds = 0.0;
    }

    pub fn advance(&mut self, delta: f64) {
        self.time_seconds = (self.time_seconds + delta).max(0.0);
    }
}

/// Transition the renderer interpolates over a run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Animation {
    FadeIn { targets: Vec<NodeId> },
    /// Draws the outline progressively.
    Create { target: NodeId },
    /// Morphs `from` into `to`; afterwards only `to` is on screen.
    ReplacementTransform { from: NodeId, to: NodeId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum Cue {
    /// Show immediately, without a transition.
    Add { targets: Vec<NodeId> },
    Play { animation: Animation, run_time: f64 },
    Wait { seconds: f64 },
}

impl Cue {
    pub fn duration(&self) -> f64 {
        match self {
            Cue::Add { .. } => 0.0,
            Cue::Play { run_time, .. } => *run_time,
            Cue::Wait { seconds } => *seconds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCue {
    pub start_seconds: f64,
    pub cue: Cue,
}

/// Fixed sequence of cues for one scene.
#[derive(Debug, Default, Clone)]
pub struct Timeline {
    cues: Vec<Cue>,
    defaults: TimelineConfig,
}

impl Timeline {
    pub fn new(defaults: TimelineConfig) -> Self {
        Self {
            cues: Vec::new(),
            defaults,
        }
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn add(&mut self, targets: &[NodeId]) -> &mut Self {
        self.cues.push(Cue::Add {
            targets: targets.to_vec(),
        });
        self
    }

    /// Queues an animation with an explicit run time.
    pub fn play(&mut self, animation: Animation, run_time: f64) -> Result<&mut Self> {
        check_duration("run time", run_time)?;
        self.cues.push(Cue::Play {
            animation,
            run_time,
        });
        Ok(self)
    }

    pub fn fade_in(&mut self, targets: &[NodeId]) -> &mut Self {
        self.push_default(Animation::FadeIn {
            targets: targets.to_vec(),
        })
    }

    pub fn create(&mut self, target: NodeId) -> &mut Self {
        self.push_default(Animation::Create { target })
    }

    pub fn replacement_transform(&mut self, from: NodeId, to: NodeId) -> &mut Self {
        self.push_default(Animation::ReplacementTransform { from, to })
    }

    /// Holds the current frame for the configured default wait.
    pub fn wait(&mut self) -> &mut Self {
        self.cues.push(Cue::Wait {
            seconds: self.defaults.default_wait,
        });
        self
    }

    pub fn wait_for(&mut self, seconds: f64) -> Result<&mut Self> {
        check_duration("wait", seconds)?;
        self.cues.push(Cue::Wait { seconds });
        Ok(self)
    }

    /// Cues with their start times, in order.
    pub fn schedule(&self) -> Vec<ScheduledCue> {
        let mut clock = PlaybackClock::default();
        self.cues
            .iter()
            .map(|cue| {
                let scheduled = ScheduledCue {
                    start_seconds: clock.time_seconds,
                    cue: cue.clone(),
                };
                clock.advance(cue.duration());
                scheduled
            })
            .collect()
    }

    pub fn duration(&self) -> f64 {
        self.cues.iter().map(Cue::duration).sum()
    }

    fn push_default(&mut self, animation: Animation) -> &mut Self {
        self.cues.push(Cue::Play {
            animation,
            run_time: self.defaults.default_run_time,
        });
        self
    }
}

fn check_duration(what: &str, seconds: f64) -> Result<()> {
    if seconds.is_finite() && seconds > 0.0 {
        Ok(())
    } else {
        Err(BeamVizError::msg(format!(
            "{what} must be a positive number of seconds, got {seconds}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::LayoutConfig, layout::Layout, shape::Primitive};

    fn ids() -> (NodeId, NodeId) {
        let mut layout = Layout::new(LayoutConfig::default());
        let a = layout.create("a", Primitive::circle(1.0).unwrap());
        let b = layout.create("b", Primitive::circle(1.0).unwrap());
        (a, b)
    }

    #[test]
    fn schedules_cues_back_to_back() {
        let (a, b) = ids();
        let mut timeline = Timeline::new(TimelineConfig::default());
        timeline.add(&[a]).fade_in(&[b]).wait();
        timeline.wait_for(2.5).unwrap().replacement_transform(a, b);

        let schedule = timeline.schedule();
        let starts: Vec<f64> = schedule.iter().map(|s| s.start_seconds).collect();
        assert_eq!(starts, vec![0.0, 0.0, 1.0, 2.0, 4.5]);
        assert_eq!(timeline.duration(), 5.5);
    }

    #[test]
    fn rejects_non_positive_durations() {
        let (a, _) = ids();
        let mut timeline = Timeline::new(TimelineConfig::default());

        assert!(timeline.wait_for(0.0).is_err());
        assert!(timeline.play(Animation::Create { target: a }, f64::NAN).is_err());
        assert!(timeline.cues().is_empty());
    }

    #[test]
    fn uses_configured_defaults() {
        let (a, _) = ids();
        let mut timeline = Timeline::new(TimelineConfig {
            default_run_time: 0.5,
            default_wait: 2.0,
        });
        timeline.create(a).wait();

        assert_eq!(timeline.duration(), 2.5);
    }

    #[test]
    fn clock_never_goes_negative() {
        let mut clock = PlaybackClock::default();
        clock.advance(1.0);
        clock.advance(-3.0);
        assert_eq!(clock.time_seconds, 0.0);
        clock.advance(2.0);
        clock.reset();
        assert_eq!(clock.time_seconds, 0.0);
    }
}
