//! Error reporter (component I): turns a [`NoMatch`] into a single
//! user-facing diagnostic.

use crate::matcher::{Attempt, NoMatch};

/// The "nearest miss" diagnostic: the endpoint whose pattern bound the
/// longest successful prefix of argv before failing, plus why it failed.
#[derive(Debug, Clone)]
pub struct NoMatchReport {
    pub pattern_source: String,
    pub failing_token_position: usize,
    pub reason: String,
    /// Every attempted endpoint's reason, present only when `CORVID_DEBUG`
    /// is enabled — this is the payload [`crate::debug::DEBUG_ENABLED`]
    /// gates, not the headline report.
    pub all_attempts: Option<Vec<Attempt>>,
}

impl std::fmt::Display for NoMatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no command matched. closest was '{}': {} (at token {})",
            self.pattern_source, self.reason, self.failing_token_position
        )?;
        if let Some(attempts) = &self.all_attempts {
            for attempt in attempts {
                write!(f, "\n  '{}': {}", attempt.pattern_source, attempt.reason)?;
            }
        }
        Ok(())
    }
}

/// Build the nearest-miss diagnostic for a failed match. Returns `None`
/// only when there were no registered endpoints to attempt at all.
pub fn build_report(no_match: &NoMatch) -> Option<NoMatchReport> {
    let nearest = no_match.nearest_miss()?;
    Some(NoMatchReport {
        pattern_source: nearest.pattern_source.clone(),
        failing_token_position: nearest.matched_prefix_len,
        reason: nearest.reason.to_string(),
        all_attempts: (*crate::debug::DEBUG_ENABLED).then(|| no_match.attempts.clone()),
    })
}
