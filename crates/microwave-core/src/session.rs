//! Cooking sessions: input validation, the countdown and its paired animation.
//!
//! A [`Controller`] owns at most one session at a time.
//! It drives two independent timers on a shared [`Scheduler`]:
//! a one-shot countdown tick that re-arms itself every second
//! and a repeating animation timer owned by an [`AnimationHandle`].
//! Both are released together whenever a session ends or is replaced.

use std::{fmt, str::FromStr, time::Duration};

use log::{debug, info, warn};

use crate::{
    animator::{AnimationHandle, AnimatorParams, FieldAnimator},
    field::{FieldFrame, ParamError},
    scheduler::{Scheduler, TimerHandle},
};

/// The kinds of food the oven knows how to cook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Food {
    Popcorn,
    Pizza,
    Chicken,
}

impl Food {
    /// Every food in the order they appear in the selection menu.
    pub const ALL: [Food; 3] = [Food::Popcorn, Food::Pizza, Food::Chicken];

    /// Human-readable name of the food.
    pub fn name(self) -> &'static str {
        match self {
            Food::Popcorn => "Popcorn",
            Food::Pizza => "Pizza",
            Food::Chicken => "Chicken",
        }
    }
}

impl fmt::Display for Food {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Food {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Food::ALL
            .into_iter()
            .find(|food| food.name().eq_ignore_ascii_case(s))
            .ok_or(InvalidInput::Food)
    }
}

/// Rejected input to [`Controller::start`].
///
/// The `Display` text is what the status line shows.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInput {
    /// The cook time is not a positive whole number of seconds.
    #[error("Enter a valid cook time!")]
    CookTime,
    /// No food (or an unknown one) was selected.
    #[error("Select a food type!")]
    Food,
}

/// Events the controller schedules for itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// One second of cooking has passed.
    CountdownTick,
    /// Time to show the next animation frame.
    AnimationFrame,
}

/// Lifecycle of the controller's session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has been cooked yet.
    Idle,
    /// Countdown and animation are live.
    Running,
    /// The countdown reached zero. Stays here until the next start.
    Finished,
}

/// One run from pressing start to completion or replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CookSession {
    /// Seconds left on the countdown.
    pub remaining_seconds: u32,
    /// What is being cooked.
    pub food: Food,
}

/// The text shown by the status line and the countdown display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayState {
    /// Status line text.
    pub status: String,
    /// Countdown display text, empty when nothing is cooking.
    pub countdown: String,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            status: "Status: Waiting".to_string(),
            countdown: String::new(),
        }
    }
}

/// Parameters to construct a [`Controller`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerParams {
    /// Time between countdown ticks. Default: one second.
    pub tick_interval: Duration,
    /// Parameters of the field animation paired with each session.
    pub animator: AnimatorParams,
}

impl Default for ControllerParams {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            animator: AnimatorParams::default(),
        }
    }
}

/// Owns the cooking session and everything scheduled on its behalf.
#[derive(Clone, Debug)]
pub struct Controller {
    tick_interval: Duration,
    animator: FieldAnimator,
    state: SessionState,
    session: Option<CookSession>,
    display: DisplayState,
    countdown: Option<TimerHandle>,
    animation: Option<AnimationHandle>,
    surface: Option<FieldFrame>,
}

impl Controller {
    /// Create an idle controller.
    pub fn new(params: ControllerParams) -> Result<Self, ParamError> {
        Ok(Self {
            tick_interval: params.tick_interval,
            animator: FieldAnimator::new(params.animator)?,
            state: SessionState::Idle,
            session: None,
            display: DisplayState::default(),
            countdown: None,
            animation: None,
            surface: None,
        })
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The current or most recent session.
    #[inline]
    pub fn session(&self) -> Option<&CookSession> {
        self.session.as_ref()
    }

    /// Text for the status line and countdown display.
    #[inline]
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// The latest computed animation frame, if a session has been started.
    #[inline]
    pub fn surface(&self) -> Option<&FieldFrame> {
        self.surface.as_ref()
    }

    /// The animation's playback state, if a session has been started.
    #[inline]
    pub fn animation(&self) -> Option<&AnimationHandle> {
        self.animation.as_ref()
    }

    /// The animator frames are computed with.
    #[inline]
    pub fn animator(&self) -> &FieldAnimator {
        &self.animator
    }

    /// Start cooking from raw form input.
    ///
    /// `cook_time` must parse as a positive whole number of seconds
    /// and `food` must name one of the known [`Food`]s.
    /// On failure the status line shows the error message
    /// and any session already running carries on untouched.
    /// On success a running session is torn down first,
    /// so there is never more than one countdown or animation live.
    pub fn start(
        &mut self,
        cook_time: &str,
        food: &str,
        now: Duration,
        scheduler: &mut Scheduler<SessionEvent>,
    ) -> Result<(), InvalidInput> {
        let parsed = parse_cook_time(cook_time)
            .and_then(|secs| food.parse::<Food>().map(|food| (secs, food)));
        let (seconds, food) = match parsed {
            Ok(input) => input,
            Err(err) => {
                warn!("Rejected cooking input {cook_time:?}, {food:?}: {err}");
                self.display.status = err.to_string();
                return Err(err);
            }
        };

        if self.state == SessionState::Running {
            info!("Replacing the running session");
        }
        self.teardown(scheduler);

        info!("Cooking {food} for {seconds} s");
        self.session = Some(CookSession {
            remaining_seconds: seconds,
            food,
        });
        self.display.status = format!("Cooking {food} for {seconds} seconds");
        self.display.countdown = seconds.to_string();
        self.countdown = Some(scheduler.schedule_once(
            now,
            self.tick_interval,
            SessionEvent::CountdownTick,
        ));
        self.animation = Some(
            self.animator
                .start(now, scheduler, SessionEvent::AnimationFrame),
        );
        self.surface = Some(self.animator.render(0));
        self.state = SessionState::Running;

        Ok(())
    }

    /// Release the timers of the current session.
    fn teardown(&mut self, scheduler: &mut Scheduler<SessionEvent>) {
        if let Some(timer) = self.countdown.take() {
            scheduler.cancel(timer);
        }
        if let Some(mut anim) = self.animation.take() {
            anim.stop(scheduler);
        }
        self.surface = None;
    }

    /// React to an event that came due on the scheduler.
    pub fn handle_event(
        &mut self,
        event: SessionEvent,
        now: Duration,
        scheduler: &mut Scheduler<SessionEvent>,
    ) {
        match event {
            SessionEvent::CountdownTick => self.tick(now, scheduler),
            SessionEvent::AnimationFrame => self.next_frame(scheduler),
        }
    }

    /// Count down one second.
    ///
    /// Re-arms itself until the countdown reaches zero,
    /// at which point the session finishes and the animation stops.
    /// Does nothing unless a session is running.
    pub fn tick(&mut self, now: Duration, scheduler: &mut Scheduler<SessionEvent>) {
        // normally the one-shot timer that brought us here has already fired,
        // but a tick delivered by other means must not leave it armed
        if let Some(timer) = self.countdown.take() {
            scheduler.cancel(timer);
        }
        let session = match (&mut self.session, self.state) {
            (Some(session), SessionState::Running) => session,
            _ => {
                debug!("Ignoring countdown tick without a running session");
                return;
            }
        };

        session.remaining_seconds = session.remaining_seconds.saturating_sub(1);
        let CookSession {
            remaining_seconds,
            food,
        } = *session;
        debug!("{remaining_seconds} s of {food} remaining");

        if remaining_seconds > 0 {
            self.display.status = format!("Cooking {food}... {remaining_seconds} seconds remaining");
            self.display.countdown = remaining_seconds.to_string();
            self.countdown = Some(scheduler.schedule_once(
                now,
                self.tick_interval,
                SessionEvent::CountdownTick,
            ));
        } else {
            self.finish(scheduler);
        }
    }

    fn finish(&mut self, scheduler: &mut Scheduler<SessionEvent>) {
        let Some(session) = self.session else {
            return;
        };
        info!("{} done cooking", session.food);
        self.display.status = format!("{} done cooking!", session.food);
        self.display.countdown.clear();
        // the last frame stays on screen, only the playback stops
        if let Some(anim) = &mut self.animation {
            anim.stop(scheduler);
        }
        self.state = SessionState::Finished;
    }

    fn next_frame(&mut self, scheduler: &mut Scheduler<SessionEvent>) {
        let Some(anim) = &mut self.animation else {
            return;
        };
        if let Some(frame_index) = anim.advance(scheduler) {
            self.surface = Some(self.animator.render(frame_index));
        }
    }
}

fn parse_cook_time(text: &str) -> Result<u32, InvalidInput> {
    match text.trim().parse::<u32>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(InvalidInput::CookTime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A controller wired to a scheduler on a virtual clock.
    struct Oven {
        ctl: Controller,
        sched: Scheduler<SessionEvent>,
        now: Duration,
    }

    impl Oven {
        fn new() -> Self {
            Self::with_params(ControllerParams {
                // a coarse grid keeps long countdowns quick to simulate
                animator: AnimatorParams {
                    grid_resolution: 8,
                    ..Default::default()
                },
                ..Default::default()
            })
        }

        fn with_params(params: ControllerParams) -> Self {
            Self {
                ctl: Controller::new(params).unwrap(),
                sched: Scheduler::new(),
                now: Duration::ZERO,
            }
        }

        fn start(&mut self, cook_time: &str, food: &str) -> Result<(), InvalidInput> {
            self.ctl.start(cook_time, food, self.now, &mut self.sched)
        }

        /// Advance the clock in animation-sized steps,
        /// delivering every event that comes due.
        fn run_for(&mut self, time: Duration) {
            let end = self.now + time;
            let step = Duration::from_millis(50);
            while self.now < end {
                self.now = (self.now + step).min(end);
                for event in self.sched.poll(self.now) {
                    self.ctl.handle_event(event, self.now, &mut self.sched);
                }
            }
        }

        fn run_secs(&mut self, secs: u64) {
            self.run_for(Duration::from_secs(secs));
        }

        fn remaining(&self) -> Option<u32> {
            self.ctl.session().map(|s| s.remaining_seconds)
        }
    }

    #[test]
    fn countdown_finishes_after_cook_time_ticks() {
        for cook_time in [1, 5, 120] {
            let mut oven = Oven::new();
            oven.start(&cook_time.to_string(), "Popcorn").unwrap();
            assert_eq!(oven.ctl.state(), SessionState::Running);
            assert_eq!(oven.ctl.display().countdown, cook_time.to_string());

            oven.run_secs(cook_time - 1);
            assert_eq!(oven.remaining(), Some(1));
            assert_eq!(oven.ctl.state(), SessionState::Running);

            oven.run_secs(1);
            assert_eq!(oven.remaining(), Some(0));
            assert_eq!(oven.ctl.state(), SessionState::Finished);
            assert_eq!(oven.ctl.display().status, "Popcorn done cooking!");
            assert_eq!(oven.ctl.display().countdown, "");
        }
    }

    #[test]
    fn ticks_update_status_and_countdown() {
        let mut oven = Oven::new();
        oven.start("4", "chicken").unwrap();
        assert_eq!(oven.ctl.display().status, "Cooking Chicken for 4 seconds");
        oven.run_secs(1);
        assert_eq!(
            oven.ctl.display().status,
            "Cooking Chicken... 3 seconds remaining"
        );
        assert_eq!(oven.ctl.display().countdown, "3");
    }

    #[test]
    fn invalid_cook_time_is_rejected() {
        for input in ["abc", "-3", "", "0", "1.5", "   "] {
            let mut oven = Oven::new();
            assert_eq!(oven.start(input, "Pizza"), Err(InvalidInput::CookTime));
            assert_eq!(oven.ctl.display().status, "Enter a valid cook time!");
            assert_eq!(oven.ctl.state(), SessionState::Idle);
            assert_eq!(oven.remaining(), None);
            assert!(oven.ctl.animation().is_none());
            assert_eq!(oven.sched.pending(), 0);
        }
    }

    #[test]
    fn missing_food_is_rejected() {
        for food in ["", "Toast"] {
            let mut oven = Oven::new();
            assert_eq!(oven.start("30", food), Err(InvalidInput::Food));
            assert_eq!(oven.ctl.display().status, "Select a food type!");
            assert_eq!(oven.ctl.state(), SessionState::Idle);
            assert_eq!(oven.sched.pending(), 0);
        }
        // the cook time is checked first
        let mut oven = Oven::new();
        assert_eq!(oven.start("x", ""), Err(InvalidInput::CookTime));
    }

    #[test]
    fn rejected_input_leaves_running_session_alone() {
        let mut oven = Oven::new();
        oven.start("10", "Pizza").unwrap();
        oven.run_secs(2);
        assert_eq!(oven.start("nope", "Pizza"), Err(InvalidInput::CookTime));
        assert_eq!(oven.ctl.state(), SessionState::Running);
        assert_eq!(oven.remaining(), Some(8));
        assert_eq!(oven.sched.pending(), 2);

        oven.run_secs(1);
        assert_eq!(oven.remaining(), Some(7));
        assert_eq!(
            oven.ctl.display().status,
            "Cooking Pizza... 7 seconds remaining"
        );
    }

    #[test]
    fn restart_replaces_both_timers() {
        let mut oven = Oven::new();
        oven.start("10", "Popcorn").unwrap();
        oven.run_for(Duration::from_millis(3500));
        assert_eq!(oven.remaining(), Some(7));

        oven.start("5", "Pizza").unwrap();
        // one countdown and one animation, not two of each
        assert_eq!(oven.sched.pending(), 2);
        assert_eq!(oven.ctl.animation().map(|a| a.frame_index()), Some(0));

        oven.run_secs(2);
        assert_eq!(oven.remaining(), Some(3));
        assert_eq!(oven.sched.pending(), 2);
        assert_eq!(oven.ctl.session().map(|s| s.food), Some(Food::Pizza));
    }

    #[test]
    fn pizza_scenario() {
        let mut oven = Oven::new();
        oven.start("3", "Pizza").unwrap();
        for _ in 0..3 {
            oven.ctl.tick(oven.now, &mut oven.sched);
        }
        let status = &oven.ctl.display().status;
        assert!(status.contains("Pizza") && status.contains("done"));
        assert_eq!(oven.ctl.display().countdown, "");
        assert_eq!(oven.ctl.state(), SessionState::Finished);

        // nothing is left to fire, not even the animation
        assert!(oven.ctl.animation().is_some_and(|a| !a.is_running()));
        assert_eq!(oven.sched.pending(), 0);
        assert!(oven.sched.poll(oven.now + Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn finished_session_stays_finished() {
        let mut oven = Oven::new();
        oven.start("1", "Popcorn").unwrap();
        oven.run_secs(1);
        let frame = oven.ctl.surface().map(|f| f.frame_index);
        assert_eq!(oven.sched.pending(), 0);

        oven.run_secs(5);
        assert_eq!(oven.ctl.state(), SessionState::Finished);
        assert_eq!(oven.remaining(), Some(0));
        // the last frame stays displayed
        assert_eq!(oven.ctl.surface().map(|f| f.frame_index), frame);

        // a stray tick changes nothing
        oven.ctl.tick(oven.now, &mut oven.sched);
        assert_eq!(oven.ctl.display().status, "Popcorn done cooking!");
        assert_eq!(oven.sched.pending(), 0);
    }

    #[test]
    fn finished_session_can_be_restarted() {
        let mut oven = Oven::new();
        oven.start("1", "Popcorn").unwrap();
        oven.run_secs(1);
        oven.start("2", "Chicken").unwrap();
        assert_eq!(oven.ctl.state(), SessionState::Running);
        assert_eq!(oven.ctl.display().countdown, "2");
        oven.run_secs(2);
        assert_eq!(oven.ctl.display().status, "Chicken done cooking!");
    }

    #[test]
    fn idle_tick_is_ignored() {
        let mut oven = Oven::new();
        oven.ctl.tick(oven.now, &mut oven.sched);
        assert_eq!(oven.ctl.state(), SessionState::Idle);
        assert_eq!(oven.ctl.display(), &DisplayState::default());
        assert_eq!(oven.sched.pending(), 0);
    }

    #[test]
    fn animation_advances_while_cooking() {
        let mut oven = Oven::new();
        oven.start("30", "Pizza").unwrap();
        assert_eq!(oven.ctl.surface().map(|f| f.frame_index), Some(0));
        oven.run_for(Duration::from_millis(500));
        let frame = oven.ctl.surface().unwrap();
        assert_eq!(frame.frame_index, 10);
        assert_eq!(frame.time, 1.0);
        assert_eq!(frame.values.len(), 8 * 8);
    }

    #[test]
    fn food_names_parse_case_insensitively() {
        assert_eq!("pizza".parse::<Food>(), Ok(Food::Pizza));
        assert_eq!(" POPCORN ".parse::<Food>(), Ok(Food::Popcorn));
        assert_eq!("".parse::<Food>(), Err(InvalidInput::Food));
        assert_eq!(Food::Chicken.to_string(), "Chicken");
    }
}
