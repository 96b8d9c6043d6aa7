use std::{fmt, str::FromStr};

use tracing::{debug, error};

use crate::repository::Repository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(()),
        }
    }
}

pub trait ThemeProvider: Send + Sync {
    fn system_theme(&self) -> Theme;

    fn apply_theme(&self, theme: Theme);
}

/// Guesses the terminal background from `COLORFGBG` (`"fg;bg"`).
#[derive(Debug, Default)]
pub struct EnvThemeProvider;

impl EnvThemeProvider {
    pub fn new() -> Self {
        Self
    }
}

pub fn theme_from_colorfgbg(raw: &str) -> Option<Theme> {
    let background: u8 = raw.rsplit(';').next()?.trim().parse().ok()?;
    match background {
        0..=6 | 8 => Some(Theme::Dark),
        _ => Some(Theme::Light),
    }
}

impl ThemeProvider for EnvThemeProvider {
    fn system_theme(&self) -> Theme {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|raw| theme_from_colorfgbg(&raw))
            .unwrap_or_default()
    }

    fn apply_theme(&self, theme: Theme) {
        debug!(%theme, "Applying theme");
    }
}

/// Current appearance, persisted under `theme`.
pub struct ThemeState {
    current: Theme,
    repository: Repository,
}

impl ThemeState {
    pub fn load(repository: Repository, provider: &dyn ThemeProvider) -> Self {
        let current = repository
            .load_theme()
            .unwrap_or_else(|| provider.system_theme());
        provider.apply_theme(current);

        Self {
            current,
            repository,
        }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn toggle(&mut self, provider: &dyn ThemeProvider) -> Theme {
        self.current = self.current.toggled();
        provider.apply_theme(self.current);

        if let Err(e) = self.repository.save_theme(self.current) {
            error!("Unable to save theme: {e}");
        }
        self.current
    }
}
