//! The single screen that owns the hydration counter, the timer list and the
//! theme. Every user command and tick lands here, one at a time.

use std::{fmt, sync::Arc};

use chrono::NaiveDateTime;
use tracing::{debug, trace};

use crate::{
    clock::Clock,
    commands::{self, Command, CommandError, HELP},
    error::ValidationError,
    hydration::HydrationTracker,
    repository::Repository,
    scheduler::{NotificationScheduler, Permission},
    structs::timer::{NotificationTimer, TimerId, TimerStatus},
    theme::{Theme, ThemeProvider, ThemeState},
    timers::{format_remaining, format_time_12h, time_remaining, TimerManager},
};

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    GlassAdded { glasses: u32, goal: u32, percent: u32 },
    GoalReached { goal: u32 },
    CounterReset,
    NewDay,
    GoalUpdated { goal: u32 },
    TimerAdded { name: String, time: String },
    TimerUpdated { name: String, time: String },
    TimerToggled { name: String, active: bool },
    ConfirmDelete { id: TimerId, name: String },
    TimerDeleted { name: String },
    DeleteCancelled,
    PermissionDenied,
    ThemeChanged(Theme),
    Invalid(String),
    Info(String),
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::GlassAdded {
                glasses,
                goal,
                percent,
            } => write!(f, "🥛 {glasses}/{goal} glasses ({percent}%)"),
            Alert::GoalReached { goal } => write!(
                f,
                "🎉 You drank {goal} glasses today, goal reached! Type 'done' to dismiss."
            ),
            Alert::CounterReset => f.write_str("Glass counter reset"),
            Alert::NewDay => f.write_str("A new day! Glass counter reset"),
            Alert::GoalUpdated { goal } => write!(f, "Daily goal set to {goal} glasses"),
            Alert::TimerAdded { name, time } => {
                write!(f, "⏰ '{name}' will remind you every day at {time}")
            }
            Alert::TimerUpdated { name, time } => write!(f, "'{name}' updated to {time}"),
            Alert::TimerToggled { name, active } => {
                let state = if *active { "on" } else { "off" };
                write!(f, "'{name}' turned {state}")
            }
            Alert::ConfirmDelete { name, .. } => {
                write!(f, "Delete '{name}'? This cannot be undone [y/N]")
            }
            Alert::TimerDeleted { name } => write!(f, "'{name}' deleted"),
            Alert::DeleteCancelled => f.write_str("Delete cancelled"),
            Alert::PermissionDenied => f.write_str(
                "Notifications are not allowed, reminders will not be delivered",
            ),
            Alert::ThemeChanged(theme) => write!(f, "Switched to {theme} theme"),
            Alert::Invalid(message) => write!(f, "⚠️  {message}"),
            Alert::Info(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(Vec<Alert>),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerRow {
    pub id: TimerId,
    pub name: String,
    pub time: String,
    pub status: TimerStatus,
    /// Countdown to the next reminder, only for active timers
    pub remaining: Option<String>,
}

impl TimerRow {
    fn new(timer: &NotificationTimer, now: NaiveDateTime) -> Self {
        Self {
            id: timer.id,
            name: timer.name.clone(),
            time: format_time_12h(timer.hour, timer.minute),
            status: timer.status(),
            remaining: timer
                .is_active
                .then(|| format_remaining(time_remaining(now, timer.hour, timer.minute))),
        }
    }
}

impl fmt::Display for TimerRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} at {}", self.id, self.name, self.time)?;
        match (self.status, &self.remaining) {
            (TimerStatus::Inactive, _) => f.write_str(" (off)"),
            (TimerStatus::ActiveFailed, _) => f.write_str(" (on, not scheduled)"),
            (TimerStatus::ActiveScheduled, Some(remaining)) => write!(f, " (in {remaining})"),
            (TimerStatus::ActiveScheduled, None) => Ok(()),
        }
    }
}

/// Everything the screen shows, recomputed on every clock tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub now: NaiveDateTime,
    pub glasses: u32,
    pub goal: u32,
    pub percent: u32,
    pub theme: Theme,
    pub timers: Vec<TimerRow>,
    /// Soonest active reminder as `(name, countdown)`
    pub next: Option<(String, String)>,
}

impl Dashboard {
    pub fn render_status(&self) -> String {
        format!(
            "{}  🥛 {}/{} glasses ({}%)  theme: {}",
            self.now.format("%I:%M:%S %p"),
            self.glasses,
            self.goal,
            self.percent,
            self.theme
        )
    }

    /// One-line summary at minute granularity, shown as the terminal title.
    pub fn render_title(&self) -> String {
        let mut title = format!(
            "🥛 {}/{} · {}",
            self.glasses,
            self.goal,
            self.now.format("%I:%M %p")
        );
        if let Some((name, remaining)) = &self.next {
            title.push_str(&format!(" · {name} in {remaining}"));
        }
        title
    }

    pub fn render_timers(&self) -> String {
        if self.timers.is_empty() {
            return "No reminders yet, try 'add Morning 08:00'".to_owned();
        }
        self.timers
            .iter()
            .map(TimerRow::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct Screen {
    hydration: HydrationTracker,
    timers: TimerManager,
    theme: ThemeState,
    theme_provider: Arc<dyn ThemeProvider>,
    clock: Arc<dyn Clock>,
    pending_delete: Option<TimerId>,
    dashboard: Dashboard,
    /// Last title written by [`Screen::tick`]
    title: Option<String>,
}

impl Screen {
    /// Loads persisted state and reconciles timers. Returns any alerts worth
    /// showing at startup.
    pub fn load(
        repository: Repository,
        scheduler: Arc<dyn NotificationScheduler>,
        theme_provider: Arc<dyn ThemeProvider>,
        clock: Arc<dyn Clock>,
    ) -> (Self, Vec<Alert>) {
        let hydration = HydrationTracker::load(repository.clone(), clock.today());
        let timers = TimerManager::load(repository.clone(), scheduler, clock.clone());
        let theme = ThemeState::load(repository, theme_provider.as_ref());

        let mut alerts = Vec::new();
        if timers.permission() == Permission::Denied {
            alerts.push(Alert::PermissionDenied);
        }

        let mut screen = Self {
            dashboard: Dashboard {
                now: clock.now(),
                glasses: 0,
                goal: 0,
                percent: 0,
                theme: theme.current(),
                timers: Vec::new(),
                next: None,
            },
            hydration,
            timers,
            theme,
            theme_provider,
            clock,
            pending_delete: None,
            title: None,
        };
        screen.refresh();

        (screen, alerts)
    }

    pub fn hydration(&self) -> &HydrationTracker {
        &self.hydration
    }

    pub fn timers(&self) -> &TimerManager {
        &self.timers
    }

    pub fn theme(&self) -> Theme {
        self.theme.current()
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Recomputes the dashboard from the current clock.
    pub fn refresh(&mut self) -> &Dashboard {
        let now = self.clock.now();
        let state = self.hydration.state();
        let next = self
            .timers
            .timers()
            .iter()
            .filter(|timer| timer.is_active)
            .map(|timer| (time_remaining(now, timer.hour, timer.minute), timer))
            .min_by_key(|(remaining, _)| *remaining)
            .map(|(remaining, timer)| (timer.name.clone(), format_remaining(remaining)));

        self.dashboard = Dashboard {
            now,
            glasses: state.glasses_consumed,
            goal: state.daily_goal,
            percent: self.hydration.progress_percent(),
            theme: self.theme.current(),
            timers: self
                .timers
                .timers()
                .iter()
                .map(|timer| TimerRow::new(timer, now))
                .collect(),
            next,
        };
        trace!(status = %self.dashboard.render_status(), "Refreshed dashboard");
        &self.dashboard
    }

    /// Driven by the clock tick. Refreshes the dashboard and returns the new
    /// title only when it differs from the last one returned.
    pub fn tick(&mut self) -> Option<String> {
        let title = self.refresh().render_title();
        if self.title.as_ref() == Some(&title) {
            return None;
        }
        self.title = Some(title.clone());
        Some(title)
    }

    /// Driven by the rollover tick.
    pub fn check_rollover(&mut self) -> Option<Alert> {
        let rolled = self.hydration.check_day_rollover(self.clock.today());
        if rolled {
            self.refresh();
        }
        rolled.then_some(Alert::NewDay)
    }

    pub fn handle_line(&mut self, line: &str) -> Flow {
        if let Some(id) = self.pending_delete.take() {
            return Flow::Continue(self.confirm_delete(id, line));
        }

        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue(Vec::new());
        }

        match commands::parse(line) {
            Ok(Command::Quit) => Flow::Quit,
            Ok(command) => {
                debug!(?command, "Handling command");
                let alerts = self.execute(command);
                self.refresh();
                Flow::Continue(alerts)
            }
            Err(e) => Flow::Continue(vec![Alert::Invalid(e.to_string())]),
        }
    }

    fn confirm_delete(&mut self, id: TimerId, answer: &str) -> Vec<Alert> {
        if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
            return vec![Alert::DeleteCancelled];
        }

        let alert = match self.timers.delete_timer(id) {
            Ok(removed) => Alert::TimerDeleted { name: removed.name },
            Err(e) => Alert::Invalid(e.to_string()),
        };
        self.refresh();
        vec![alert]
    }

    fn execute(&mut self, command: Command) -> Vec<Alert> {
        match self.try_execute(command) {
            Ok(alerts) => alerts,
            Err(e) => vec![Alert::Invalid(e.to_string())],
        }
    }

    fn try_execute(&mut self, command: Command) -> Result<Vec<Alert>, CommandError> {
        let alerts = match command {
            Command::AddGlass => {
                let reached = self.hydration.add_glass();
                let state = self.hydration.state();
                let mut alerts = vec![Alert::GlassAdded {
                    glasses: state.glasses_consumed,
                    goal: state.daily_goal,
                    percent: self.hydration.progress_percent(),
                }];
                if reached {
                    alerts.push(Alert::GoalReached {
                        goal: state.daily_goal,
                    });
                }
                alerts
            }
            Command::ResetGlasses => {
                self.hydration.reset_glasses();
                vec![Alert::CounterReset]
            }
            Command::SetGoal(goal) => {
                self.hydration.set_goal(goal)?;
                vec![Alert::GoalUpdated {
                    goal: self.hydration.state().daily_goal,
                }]
            }
            Command::DismissCompletion => {
                self.hydration.dismiss_completion();
                Vec::new()
            }
            Command::AddTimer { name, hour, minute } => {
                let timer = self.timers.add_timer(&name, hour, minute)?;
                // No confirmation when the platform refused the schedule
                match timer.status() {
                    TimerStatus::ActiveScheduled => vec![Alert::TimerAdded {
                        name: timer.name.clone(),
                        time: format_time_12h(timer.hour, timer.minute),
                    }],
                    _ => Vec::new(),
                }
            }
            Command::EditTimer {
                id,
                name,
                hour,
                minute,
            } => {
                let timer = self.timers.edit_timer(id, &name, hour, minute)?;
                vec![Alert::TimerUpdated {
                    name: timer.name.clone(),
                    time: format_time_12h(timer.hour, timer.minute),
                }]
            }
            Command::ToggleTimer(id) => {
                let timer = self.timers.toggle_timer(id)?;
                vec![Alert::TimerToggled {
                    name: timer.name.clone(),
                    active: timer.is_active,
                }]
            }
            Command::DeleteTimer(id) => {
                let name = self
                    .timers
                    .get(id)
                    .map(|timer| timer.name.clone())
                    .ok_or(ValidationError::UnknownTimer(id))?;
                self.pending_delete = Some(id);
                vec![Alert::ConfirmDelete { id, name }]
            }
            Command::List => vec![Alert::Info(self.refresh().render_timers())],
            Command::Status => {
                let dashboard = self.refresh();
                let mut status = dashboard.render_status();
                if self.hydration.goal_reached() {
                    status.push_str("  🎉 goal reached");
                }
                vec![Alert::Info(status)]
            }
            Command::ToggleTheme => {
                let theme = self.theme.toggle(self.theme_provider.as_ref());
                vec![Alert::ThemeChanged(theme)]
            }
            Command::Help => vec![Alert::Info(HELP.to_owned())],
            Command::Quit => Vec::new(),
        };

        Ok(alerts)
    }
}
