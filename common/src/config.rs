use std::time::Duration;

use crate::query::City;

/// How long a snapshot may be served before a parameterless request refetches.
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Upper bound on a single source fetch.
pub const DEFAULT_SOURCE_DEADLINE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct Config {
    /// City searched when a request names none.
    pub default_location: City,
    /// Age after which the cached snapshot is no longer served.
    pub staleness_window: Duration,
    /// Deadline the orchestrator imposes on each source task.
    ///
    /// `None` leaves timing entirely to the adapters.
    pub source_deadline: Option<Duration>,
    /// 0 = normal output, 1 = results only, 2 = summary only.
    pub quiet: u8,
    pub verbose: u8,
    /// Emit the response as JSON instead of the terminal tree.
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_location: City::default(),
            staleness_window: DEFAULT_STALENESS_WINDOW,
            source_deadline: Some(DEFAULT_SOURCE_DEADLINE),
            quiet: 0,
            verbose: 0,
            json: false,
        }
    }
}
