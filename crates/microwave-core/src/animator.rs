//! Periodic playback of the field animation.
//!
//! The animator itself is immutable once built;
//! all per-playback state lives in the [`AnimationHandle`] returned by
//! [`FieldAnimator::start`], which also owns the timer driving the playback.

use std::time::Duration;

use crate::{
    field::{FieldFrame, FieldParams, Grid, ParamError},
    scheduler::{Scheduler, TimerHandle},
};

/// Parameters to construct a [`FieldAnimator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatorParams {
    /// Number of grid samples per axis. Default: 100.
    pub grid_resolution: usize,
    /// The grid covers `[-spatial_extent, spatial_extent]` on both axes.
    /// Default: 1.0.
    pub spatial_extent: f64,
    /// Constants of the field function.
    pub field: FieldParams,
    /// Number of distinct frames in one playback. Default: 200.
    pub frame_count: usize,
    /// Time between frames. Default: 50 ms.
    pub interval: Duration,
    /// Whether to start over from the first frame
    /// after the last one has been shown. Default: true.
    pub repeat: bool,
}

impl Default for AnimatorParams {
    fn default() -> Self {
        Self {
            grid_resolution: 100,
            spatial_extent: 1.0,
            field: FieldParams::default(),
            frame_count: 200,
            interval: Duration::from_millis(50),
            repeat: true,
        }
    }
}

/// Computes field frames over a fixed grid
/// and starts timed playbacks of them.
#[derive(Clone, Debug)]
pub struct FieldAnimator {
    grid: Grid,
    field: FieldParams,
    frame_count: usize,
    interval: Duration,
    repeat: bool,
}

impl FieldAnimator {
    /// Validate the parameters and build the sample grid.
    pub fn new(params: AnimatorParams) -> Result<Self, ParamError> {
        let grid = Grid::new(params.grid_resolution, params.spatial_extent)?;
        params.field.validate()?;
        if params.frame_count == 0 {
            return Err(ParamError::FrameCount);
        }
        if params.interval.is_zero() {
            return Err(ParamError::FrameInterval);
        }
        Ok(Self {
            grid,
            field: params.field,
            frame_count: params.frame_count,
            interval: params.interval,
            repeat: params.repeat,
        })
    }

    /// The grid frames are sampled on.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Constants of the field function.
    #[inline]
    pub fn field(&self) -> &FieldParams {
        &self.field
    }

    /// Number of distinct frames in one playback.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Time between frames.
    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Compute the field over the whole grid for the given frame.
    ///
    /// This is a pure function of the frame index;
    /// pushing the result to a display is up to the caller.
    pub fn render(&self, frame_index: usize) -> FieldFrame {
        self.field.sample(&self.grid, frame_index)
    }

    /// Start a playback at frame 0,
    /// arming a repeating timer that fires `event` once per frame interval.
    ///
    /// Each time the event fires,
    /// call [`AnimationHandle::advance`] to move to the next frame.
    pub fn start<E: Clone>(
        &self,
        now: Duration,
        scheduler: &mut Scheduler<E>,
        event: E,
    ) -> AnimationHandle {
        let timer = scheduler.schedule_repeating(now, self.interval, event);
        log::debug!(
            "Playing {} frames every {:?}",
            self.frame_count,
            self.interval
        );
        AnimationHandle {
            timer: Some(timer),
            frame_index: 0,
            frame_count: self.frame_count,
            repeat: self.repeat,
        }
    }
}

/// A running (or stopped) playback of a [`FieldAnimator`].
#[derive(Clone, Debug)]
pub struct AnimationHandle {
    // None once stopped
    timer: Option<TimerHandle>,
    frame_index: usize,
    frame_count: usize,
    repeat: bool,
}

impl AnimationHandle {
    /// Whether the playback timer is still armed.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Index of the most recently reached frame.
    #[inline]
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Move to the next frame in response to a timer event.
    ///
    /// Returns the index of the frame to draw,
    /// or `None` if the playback is stopped.
    /// A playback that doesn't repeat stops itself
    /// when asked to go past its last frame.
    pub fn advance<E: Clone>(&mut self, scheduler: &mut Scheduler<E>) -> Option<usize> {
        if !self.is_running() {
            return None;
        }
        let next = self.frame_index + 1;
        if next < self.frame_count {
            self.frame_index = next;
        } else if self.repeat {
            self.frame_index = 0;
        } else {
            self.stop(scheduler);
            return None;
        }
        Some(self.frame_index)
    }

    /// Halt the playback by cancelling its timer.
    ///
    /// Stopping an already stopped playback does nothing.
    pub fn stop<E: Clone>(&mut self, scheduler: &mut Scheduler<E>) {
        if let Some(timer) = self.timer.take() {
            scheduler.cancel(timer);
            log::debug!("Animation stopped at frame {}", self.frame_index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn default_animator_is_valid() {
        let anim = FieldAnimator::new(AnimatorParams::default()).unwrap();
        assert_eq!(anim.grid().resolution(), 100);
        assert_eq!(anim.frame_count(), 200);
        assert_eq!(anim.interval(), ms(50));

        let frame = anim.render(10);
        assert_eq!(frame.frame_index, 10);
        assert_eq!(frame.time, 1.0);
        assert_eq!(frame.values.len(), 100 * 100);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let with = |f: fn(&mut AnimatorParams)| {
            let mut params = AnimatorParams::default();
            f(&mut params);
            FieldAnimator::new(params).map(|_| ())
        };
        assert_eq!(
            with(|p| p.grid_resolution = 0),
            Err(ParamError::GridResolution(0))
        );
        assert_eq!(
            with(|p| p.spatial_extent = -1.),
            Err(ParamError::SpatialExtent(-1.))
        );
        assert_eq!(with(|p| p.frame_count = 0), Err(ParamError::FrameCount));
        assert_eq!(
            with(|p| p.interval = Duration::ZERO),
            Err(ParamError::FrameInterval)
        );
        assert_eq!(
            with(|p| p.field.frequency = 0.),
            Err(ParamError::Frequency(0.))
        );
    }

    #[test]
    fn playback_loops_over_frame_budget() {
        let anim = FieldAnimator::new(AnimatorParams {
            frame_count: 3,
            ..Default::default()
        })
        .unwrap();
        let mut sched = Scheduler::new();
        let mut handle = anim.start(ms(0), &mut sched, ());
        assert_eq!(sched.pending(), 1);
        assert_eq!(handle.frame_index(), 0);

        let mut shown = Vec::new();
        for step in 1..=7 {
            for () in sched.poll(ms(50 * step)) {
                shown.extend(handle.advance(&mut sched));
            }
        }
        assert_eq!(shown, vec![1, 2, 0, 1, 2, 0, 1]);
        assert!(handle.is_running());
    }

    #[test]
    fn non_repeating_playback_stops_itself() {
        let anim = FieldAnimator::new(AnimatorParams {
            frame_count: 2,
            repeat: false,
            ..Default::default()
        })
        .unwrap();
        let mut sched = Scheduler::new();
        let mut handle = anim.start(ms(0), &mut sched, ());
        assert_eq!(handle.advance(&mut sched), Some(1));
        assert_eq!(handle.advance(&mut sched), None);
        assert!(!handle.is_running());
        assert_eq!(sched.pending(), 0);
        // the last frame stays as the one to display
        assert_eq!(handle.frame_index(), 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let anim = FieldAnimator::new(AnimatorParams::default()).unwrap();
        let mut sched = Scheduler::new();
        let other = sched.schedule_once(ms(0), ms(1000), ());
        let mut handle = anim.start(ms(0), &mut sched, ());
        handle.stop(&mut sched);
        handle.stop(&mut sched);
        assert!(!handle.is_running());
        assert_eq!(handle.advance(&mut sched), None);
        // unrelated timers are untouched
        assert!(sched.is_pending(other));
        assert_eq!(sched.pending(), 1);
    }
}
