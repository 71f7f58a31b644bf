//! Session: the scheduling state machine and everything it owns
//!
//! All mutable state sits behind one mutex that is never held across an
//! `.await`. External actions run outside the lock; their results are applied
//! afterwards, and the transient `Requesting`/`Cancelling` phases keep a
//! second request from slipping in while one is in flight.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use chrono::{DateTime, Duration as ChronoDuration, Local};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{Opacity, Phase, PresenceState, Schedule, ViewMode};
use crate::{
    display::{format_countdown, format_time_of_day, remaining_seconds, DisplayState, NO_TIME},
    error::{SessionError, SessionResult},
    services::{Clock, Dialogs, ShutdownAction, WindowSurface},
    tasks::{
        countdown::CountdownStep, countdown_task, pre_expiry_prompt_task, presence_sensor_task,
        preview_task, TimerHandle,
    },
    time_source::{DurationInput, TimeSource},
};

/// External collaborators the session drives
#[derive(Clone)]
pub struct Collaborators {
    pub shutdown: Arc<dyn ShutdownAction>,
    pub dialogs: Arc<dyn Dialogs>,
    pub window: Arc<dyn WindowSurface>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// How long to wait after the countdown hits zero before assuming the
    /// shutdown did not happen and returning to idle
    pub fire_grace: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            fire_grace: Duration::from_secs(120),
        }
    }
}

/// Outcome of a cancel request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Nothing was scheduled; no external call was made
    NotScheduled,
    /// The local schedule was dropped. `action_error` carries the OS cancel
    /// failure, if any.
    Cancelled { action_error: Option<SessionError> },
}

/// Read-only view of the session for the front-end
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub source: TimeSource,
    pub slider: u32,
    pub custom_hours: u32,
    pub custom_minutes: u32,
    pub minutes: u32,
    pub locked_source: Option<TimeSource>,
    pub target: Option<DateTime<Local>>,
    pub total_seconds: Option<u64>,
    pub view_mode: ViewMode,
    pub sensing_enabled: bool,
    pub opacity: Opacity,
    pub display: DisplayState,
}

#[derive(Default)]
struct Timers {
    preview: Option<TimerHandle>,
    countdown: Option<TimerHandle>,
    sensor: Option<TimerHandle>,
    prompt: Option<TimerHandle>,
}

struct SessionState {
    input: DurationInput,
    phase: Phase,
    schedule: Option<Schedule>,
    next_schedule_id: u64,
    presence: PresenceState,
    view_mode: ViewMode,
    timers: Timers,
}

impl SessionState {
    fn locked_source(&self) -> Option<TimeSource> {
        self.schedule.as_ref().map(|s| s.source)
    }

    fn ensure_unlocked(&self, source: TimeSource) -> SessionResult<()> {
        if self.locked_source() == Some(source) {
            return Err(SessionError::ControlsLocked(source));
        }
        Ok(())
    }

    fn schedule_matches(&self, id: u64) -> bool {
        self.schedule.as_ref().is_some_and(|s| s.id == id)
    }
}

/// Restores `from -> to` if the owning future is dropped before `disarm`
struct PhaseRollback<'a> {
    session: &'a Session,
    from: Phase,
    to: Phase,
    armed: bool,
}

impl PhaseRollback<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PhaseRollback<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.session.state();
        if state.phase == self.from {
            warn!("{:?} abandoned, returning to {:?}", self.from, self.to);
            state.phase = self.to;
        }
    }
}

pub struct Session {
    shutdown: Arc<dyn ShutdownAction>,
    dialogs: Arc<dyn Dialogs>,
    window: Arc<dyn WindowSurface>,
    clock: Arc<dyn Clock>,
    settings: SessionSettings,
    inner: Mutex<SessionState>,
    display_tx: watch::Sender<DisplayState>,
    /// Keep the receiver alive so the channel never closes
    _display_rx: watch::Receiver<DisplayState>,
    weak_self: Weak<Session>,
}

impl Session {
    pub fn new(collaborators: Collaborators, settings: SessionSettings) -> Arc<Self> {
        let (display_tx, display_rx) = watch::channel(DisplayState::new());

        Arc::new_cyclic(|weak_self| Self {
            shutdown: collaborators.shutdown,
            dialogs: collaborators.dialogs,
            window: collaborators.window,
            clock: collaborators.clock,
            settings,
            inner: Mutex::new(SessionState {
                input: DurationInput::new(),
                phase: Phase::Idle,
                schedule: None,
                next_schedule_id: 1,
                presence: PresenceState::new(),
                view_mode: ViewMode::Full,
                timers: Timers::default(),
            }),
            display_tx,
            _display_rx: display_rx,
            weak_self: weak_self.clone(),
        })
    }

    /// Render the initial preview. Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut state = self.state();
        self.refresh_preview(&mut state);
        info!("Session started with {} minute default", state.input.resolve());
    }

    /// Dispose of every timer and leave the window visible
    pub fn close(&self) {
        let mut state = self.state();
        state.timers = Timers::default();
        state.presence.sensing_enabled = false;
        state.presence.opacity = Opacity::Visible;
        self.window.set_opacity(Opacity::Visible);

        if state.phase.is_active() {
            warn!("Closing with a shutdown still scheduled at {:?}", state.schedule.as_ref().map(|s| s.target));
        }
        info!("Session closed");
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: Phase) {
        self.state().phase = phase;
    }

    pub fn fire_grace(&self) -> Duration {
        self.settings.fire_grace
    }

    pub fn subscribe_display(&self) -> watch::Receiver<DisplayState> {
        self.display_tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        let (custom_hours, custom_minutes) = state.input.custom();
        SessionSnapshot {
            phase: state.phase,
            source: state.input.source(),
            slider: state.input.slider(),
            custom_hours,
            custom_minutes,
            minutes: state.input.resolve(),
            locked_source: state.locked_source(),
            target: state.schedule.as_ref().map(|s| s.target),
            total_seconds: state.schedule.as_ref().map(|s| s.total_seconds),
            view_mode: state.view_mode,
            sensing_enabled: state.presence.sensing_enabled,
            opacity: state.presence.opacity,
            display: self.display_tx.borrow().clone(),
        }
    }

    /// Switch between slider and custom input, returning the resolved minutes.
    /// Custom fields that produced the active schedule survive the switch.
    pub fn set_source(&self, source: TimeSource) -> u32 {
        let mut state = self.state();
        if state.locked_source() == Some(TimeSource::Custom) {
            state.input.select_source(source);
        } else {
            state.input.switch_source(source);
        }
        debug!("Time source set to {:?}", source);
        self.refresh_preview(&mut state);
        state.input.resolve()
    }

    pub fn set_slider(&self, raw: i64) -> SessionResult<u32> {
        let mut state = self.state();
        state.ensure_unlocked(TimeSource::Preset)?;
        let snapped = state.input.set_slider(raw);
        debug!("Slider moved to {} (raw {})", snapped, raw);
        self.refresh_preview(&mut state);
        Ok(state.input.resolve())
    }

    pub fn set_custom(&self, hours: &str, minutes: &str) -> SessionResult<u32> {
        let mut state = self.state();
        state.ensure_unlocked(TimeSource::Custom)?;
        state.input.set_custom(hours, minutes);
        self.refresh_preview(&mut state);
        Ok(state.input.resolve())
    }

    /// Restart or stop the idle preview after an input change
    fn refresh_preview(&self, state: &mut SessionState) {
        if state.phase.is_active() {
            return;
        }

        let minutes = state.input.resolve();
        if minutes == 0 {
            state.timers.preview = None;
            self.publish_shutdown_at(NO_TIME.to_string());
            return;
        }

        self.publish_shutdown_at(self.projected_time(minutes));
        if state.timers.preview.as_ref().map_or(true, TimerHandle::is_finished) {
            state.timers.preview = Some(TimerHandle::spawn(preview_task(self.weak_self.clone())));
        }
    }

    fn projected_time(&self, minutes: u32) -> String {
        format_time_of_day(self.clock.now() + ChronoDuration::minutes(minutes as i64))
    }

    /// One preview tick; `false` once the preview should stop
    pub(crate) fn preview_tick(&self) -> bool {
        let mut state = self.state();
        let minutes = state.input.resolve();
        if state.phase.is_active() || minutes == 0 {
            if let Some(handle) = state.timers.preview.take() {
                handle.detach();
            }
            return false;
        }
        self.publish_shutdown_at(self.projected_time(minutes));
        true
    }

    fn publish_shutdown_at(&self, shutdown_at: String) {
        self.display_tx.send_modify(|display| display.shutdown_at = shutdown_at);
    }

    fn publish_countdown(&self, countdown: Option<String>) {
        self.display_tx.send_modify(|display| display.countdown = countdown);
    }

    /// Schedule a shutdown for the duration the active input resolves to
    pub async fn request_schedule(&self) -> SessionResult<()> {
        let (minutes, source) = {
            let state = self.state();
            (state.input.resolve(), state.input.source())
        };
        self.request_seconds(minutes as u64 * 60, source).await
    }

    pub(crate) async fn request_seconds(&self, total_seconds: u64, source: TimeSource) -> SessionResult<()> {
        {
            let mut state = self.state();
            match state.phase {
                Phase::Idle => state.phase = Phase::Requesting,
                phase if phase.is_active() => return Err(SessionError::AlreadyActive),
                _ => return Err(SessionError::Busy),
            }
        }
        let rollback = PhaseRollback {
            session: self,
            from: Phase::Requesting,
            to: Phase::Idle,
            armed: true,
        };

        if total_seconds == 0 && !self.dialogs.confirm("Confirm", "Shut down immediately?").await {
            info!("Immediate shutdown declined");
            rollback.disarm();
            self.set_phase(Phase::Idle);
            return Err(SessionError::Declined);
        }

        if let Err(reason) = self.shutdown.schedule(total_seconds).await {
            rollback.disarm();
            self.set_phase(Phase::Idle);
            let error = SessionError::ScheduleActionFailed(reason);
            self.dialogs.notify_error("Error", &error.to_string()).await;
            return Err(error);
        }

        rollback.disarm();
        let mut state = self.state();
        self.enter_scheduled(&mut state, total_seconds, source);
        Ok(())
    }

    fn enter_scheduled(&self, state: &mut SessionState, total_seconds: u64, source: TimeSource) {
        let id = state.next_schedule_id;
        state.next_schedule_id += 1;

        let schedule = Schedule::new(id, self.clock.now(), total_seconds, source);
        info!(
            "Shutdown {} scheduled in {}s, at {}",
            id,
            total_seconds,
            schedule.target.format("%Y-%m-%d %H:%M:%S")
        );

        state.timers.preview = None;
        self.publish_shutdown_at(format_time_of_day(schedule.target));
        self.publish_countdown(Some(format_countdown(total_seconds)));
        state.timers.countdown = Some(TimerHandle::spawn(countdown_task(self.weak_self.clone(), id)));

        if let Some(delay) = schedule.prompt_delay() {
            debug!("Pre-expiry prompt armed in {:?}", delay);
            state.timers.prompt = Some(TimerHandle::spawn(pre_expiry_prompt_task(
                self.weak_self.clone(),
                id,
                delay,
            )));
        }

        state.phase = Phase::Scheduled;
        state.schedule = Some(schedule);
        let mode = ViewMode::for_active(state.phase.is_active());
        self.set_view_mode(state, mode);
        self.apply_sensing(state, true);
    }

    fn leave_scheduled(&self, state: &mut SessionState) {
        state.timers.prompt = None;
        state.timers.countdown = None;
        state.schedule = None;
        state.phase = Phase::Idle;
        self.publish_countdown(None);
        self.apply_sensing(state, false);
        let mode = ViewMode::for_active(state.phase.is_active());
        self.set_view_mode(state, mode);
        self.refresh_preview(state);
    }

    fn set_view_mode(&self, state: &mut SessionState, mode: ViewMode) {
        state.view_mode = mode;
        self.window.set_view_mode(mode);
    }

    /// One countdown tick for schedule `id`
    pub(crate) fn countdown_tick(&self, id: u64) -> CountdownStep {
        let mut state = self.state();
        let Some(target) = state.schedule.as_ref().filter(|s| s.id == id).map(|s| s.target) else {
            return CountdownStep::Stale;
        };

        let remaining = remaining_seconds(target, self.clock.now());
        self.publish_countdown(Some(format_countdown(remaining)));
        if remaining > 0 {
            return CountdownStep::Continue;
        }

        if state.phase == Phase::Scheduled {
            info!("Shutdown {} is due", id);
            state.phase = Phase::Fired;
        }
        CountdownStep::Expired
    }

    /// The countdown expired a grace period ago and we are still running
    pub(crate) async fn recover_after_fire(&self, id: u64) {
        {
            let mut state = self.state();
            if state.phase != Phase::Fired || !state.schedule_matches(id) {
                return;
            }
            if let Some(handle) = state.timers.countdown.take() {
                handle.detach();
            }
            warn!("Shutdown {} did not take effect, returning to idle", id);
            self.leave_scheduled(&mut state);
        }

        self.dialogs
            .notify_info("Shutdown", "The scheduled shutdown did not take effect.")
            .await;
    }

    /// Explicit cancel. OS cancel failures are reported but the local schedule
    /// is always dropped.
    pub async fn cancel(&self) -> SessionResult<CancelOutcome> {
        self.cancel_schedule(true, None).await
    }

    async fn cancel_schedule(&self, explicit: bool, only: Option<u64>) -> SessionResult<CancelOutcome> {
        let previous = {
            let mut state = self.state();
            match state.phase {
                Phase::Scheduled | Phase::Fired => {}
                Phase::Requesting | Phase::Cancelling => return Err(SessionError::Busy),
                Phase::Idle => return Ok(CancelOutcome::NotScheduled),
            }
            if only.is_some_and(|id| !state.schedule_matches(id)) {
                return Ok(CancelOutcome::NotScheduled);
            }
            let previous = state.phase;
            state.phase = Phase::Cancelling;
            previous
        };
        let rollback = PhaseRollback {
            session: self,
            from: Phase::Cancelling,
            to: previous,
            armed: true,
        };

        let result = self.shutdown.cancel().await;
        rollback.disarm();

        {
            let mut state = self.state();
            self.leave_scheduled(&mut state);
        }
        info!("Shutdown cancelled ({})", if explicit { "explicit" } else { "prompt" });

        let action_error = match result {
            Ok(()) => {
                if explicit {
                    self.dialogs.notify_info("Cancelled", "Shutdown has been cancelled.").await;
                }
                None
            }
            Err(reason) => {
                let error = SessionError::CancelActionFailed(reason);
                if explicit {
                    warn!("{}", error);
                    self.dialogs.notify_error("Cancel Shutdown", &error.to_string()).await;
                } else {
                    debug!("Ignoring passive cancel failure: {}", error);
                }
                Some(error)
            }
        };

        Ok(CancelOutcome::Cancelled { action_error })
    }

    /// Ask whether schedule `id` should be cancelled; "yes" cancels it
    pub(crate) async fn pre_expiry_prompt(&self, id: u64) {
        {
            let state = self.state();
            if state.phase != Phase::Scheduled || !state.schedule_matches(id) {
                return;
            }
        }

        let cancel = self
            .dialogs
            .confirm(
                "Cancel Shutdown?",
                "Shutdown is scheduled in 3 minutes.\nDo you want to cancel it?",
            )
            .await;

        {
            let mut state = self.state();
            if !state.schedule_matches(id) {
                return;
            }
            if let Some(handle) = state.timers.prompt.take() {
                handle.detach();
            }
        }

        if cancel {
            match self.cancel_schedule(false, Some(id)).await {
                Ok(outcome) => debug!("Prompt cancel finished: {:?}", outcome),
                Err(e) => debug!("Prompt cancel skipped: {}", e),
            }
        }
    }

    /// Manually enable or disable presence sensing
    pub fn set_sensing(&self, enabled: bool) -> bool {
        let mut state = self.state();
        self.apply_sensing(&mut state, enabled);
        enabled
    }

    pub fn toggle_sensing(&self) -> bool {
        let mut state = self.state();
        let enabled = !state.presence.sensing_enabled;
        self.apply_sensing(&mut state, enabled);
        enabled
    }

    fn apply_sensing(&self, state: &mut SessionState, enabled: bool) {
        if state.presence.sensing_enabled == enabled {
            return;
        }
        state.presence.sensing_enabled = enabled;

        if enabled {
            info!("Presence sensing enabled");
            state.timers.sensor = Some(TimerHandle::spawn(presence_sensor_task(self.weak_self.clone())));
        } else {
            info!("Presence sensing disabled");
            state.timers.sensor = None;
            state.presence.opacity = Opacity::Visible;
            self.window.set_opacity(Opacity::Visible);
        }
    }

    /// One sensor tick; `false` once sensing is off
    pub(crate) fn presence_tick(&self) -> bool {
        let pointer = self.window.pointer();
        let bounds = self.window.bounds();

        let mut state = self.state();
        if !state.presence.sensing_enabled {
            return false;
        }
        let opacity = state.presence.evaluate(pointer, bounds);
        if opacity != state.presence.opacity {
            debug!("Pointer at ({}, {}), window now {:?}", pointer.x, pointer.y, opacity);
        }
        state.presence.opacity = opacity;
        self.window.set_opacity(opacity);
        true
    }
}
