use clap::ValueEnum;

use crate::settings::Settings;

/// The three session kinds, each with an independently configured duration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum SessionType {
    #[strum(serialize = "focus")]
    Focus,
    #[strum(serialize = "short break")]
    ShortBreak,
    #[strum(serialize = "long break")]
    LongBreak,
}

impl SessionType {
    pub fn duration_secs(self, settings: &Settings) -> u32 {
        let minutes = match self {
            SessionType::Focus => settings.pomodoro_minutes,
            SessionType::ShortBreak => settings.short_break_minutes,
            SessionType::LongBreak => settings.long_break_minutes,
        };
        minutes * 60
    }

    pub const ALL: [SessionType; 3] = [
        SessionType::Focus,
        SessionType::ShortBreak,
        SessionType::LongBreak,
    ];
}

/// Outcome of advancing the countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Paused or already at zero; nothing moved.
    Idle,
    /// The countdown moved and has not reached zero yet.
    Running,
    /// The countdown just hit zero. Reported exactly once per natural
    /// expiry; focus expiries credit the analytics record.
    Expired(SessionType),
}

/// Countdown state machine. Durations come from [`Settings`] at every
/// transition; the machine itself never touches a store.
#[derive(Debug)]
pub struct Timer {
    session_type: SessionType,
    remaining_secs: u32,
    running: bool,
}

impl Timer {
    pub fn new(settings: &Settings) -> Self {
        Self::with_session(settings, SessionType::Focus)
    }

    pub fn with_session(settings: &Settings, session: SessionType) -> Self {
        Self {
            session_type: session,
            remaining_secs: session.duration_secs(settings),
            running: false,
        }
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Selects a session type: full duration, paused.
    pub fn switch_session(&mut self, session: SessionType, settings: &Settings) {
        self.session_type = session;
        self.remaining_secs = session.duration_secs(settings);
        self.running = false;
    }

    /// Start/pause. Leaves the countdown value untouched.
    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    pub fn reset(&mut self, settings: &Settings) {
        self.running = false;
        self.remaining_secs = self.session_type.duration_secs(settings);
    }

    /// Re-derives the countdown after a settings change. A running session
    /// keeps its remaining time; new durations apply from the next reset or
    /// switch.
    pub fn apply_settings(&mut self, settings: &Settings) {
        if !self.running {
            self.remaining_secs = self.session_type.duration_secs(settings);
        }
    }

    /// Advances the countdown by one elapsed second.
    pub fn tick(&mut self) -> Tick {
        if !self.running || self.remaining_secs == 0 {
            return Tick::Idle;
        }

        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            self.running = false;
            return Tick::Expired(self.session_type);
        }
        Tick::Running
    }

    /// Fraction of the current session already elapsed, in 0..=1.
    pub fn progress(&self, settings: &Settings) -> f64 {
        let total = self.session_type.duration_secs(settings);
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.remaining_secs);
        elapsed as f64 / total as f64
    }
}
