//! Search budget and tuning parameters.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Calls allowed per trial beyond the number of required duties.
pub const RECURSION_SLACK: usize = 5;

/// Tuning parameters for [`Matcher::match_roster`](super::Matcher::match_roster).
///
/// # Example
///
/// ```
/// use u_roster::matching::MatchConfig;
///
/// let config = MatchConfig::default()
///     .with_trial_max(100)
///     .with_seed(42);
/// assert_eq!(config.threshold_max, 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Search calls per trial. `0` derives it from the calendar.
    pub recursion_max: usize,
    /// Randomized trials per threshold level.
    pub trial_max: usize,
    /// Highest scarcity threshold tried.
    pub threshold_max: usize,
    /// Stop once this many solutions are collected.
    pub solution_max: usize,
    /// Accepted swaps per refinement. `0` disables refinement.
    pub refine_cycle: usize,
    /// Worker threads. `0` uses all but one core.
    pub workers: usize,
    /// Base seed for worker RNGs. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            recursion_max: 0,
            trial_max: 500,
            threshold_max: 2,
            solution_max: 20,
            refine_cycle: 10,
            workers: 0,
            seed: None,
        }
    }
}

/// Per-worker limits resolved against a concrete calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Search calls per trial.
    pub recursion_max: usize,
    /// Trials per threshold level.
    pub trial_max: usize,
    /// Highest scarcity threshold.
    pub threshold_max: usize,
    /// Pool size at which workers stop.
    pub solution_max: usize,
    /// Accepted swaps per refinement.
    pub refine_cycle: usize,
}

impl MatchConfig {
    /// Sets the per-trial call budget (`0` derives it).
    pub fn with_recursion_max(mut self, value: usize) -> Self {
        self.recursion_max = value;
        self
    }

    /// Sets the trials per threshold level.
    pub fn with_trial_max(mut self, value: usize) -> Self {
        self.trial_max = value;
        self
    }

    /// Sets the highest scarcity threshold.
    pub fn with_threshold_max(mut self, value: usize) -> Self {
        self.threshold_max = value;
        self
    }

    /// Sets how many solutions to collect.
    pub fn with_solution_max(mut self, value: usize) -> Self {
        self.solution_max = value;
        self
    }

    /// Sets the swaps accepted per refinement.
    pub fn with_refine_cycle(mut self, value: usize) -> Self {
        self.refine_cycle = value;
        self
    }

    /// Sets the worker thread count (`0` = auto).
    pub fn with_workers(mut self, value: usize) -> Self {
        self.workers = value;
        self
    }

    /// Fixes the base seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks that every budget that must be positive is.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trial_max == 0 {
            return Err(ConfigError::Zero("trial_max"));
        }
        if self.threshold_max == 0 {
            return Err(ConfigError::Zero("threshold_max"));
        }
        if self.solution_max == 0 {
            return Err(ConfigError::Zero("solution_max"));
        }
        Ok(())
    }

    /// Recursion budget for a calendar with `required` duties.
    pub fn resolved_recursion_max(&self, required: usize) -> usize {
        if self.recursion_max > 0 {
            self.recursion_max
        } else {
            required + RECURSION_SLACK
        }
    }

    /// Number of worker threads to spawn.
    pub fn resolved_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(1)
            .max(1)
    }

    /// Limits handed to each worker.
    pub fn limits(&self, required: usize) -> SearchLimits {
        SearchLimits {
            recursion_max: self.resolved_recursion_max(required),
            trial_max: self.trial_max,
            threshold_max: self.threshold_max,
            solution_max: self.solution_max,
            refine_cycle: self.refine_cycle,
        }
    }

    /// Applies `key=value` overrides such as `"trial_max=100 refine_cycle=3"`.
    ///
    /// Pairs are separated by whitespace, `,` or `;`; spaces around `=` are
    /// allowed. `seed` also accepts `none`.
    ///
    /// # Errors
    /// Unknown keys, pairs without `=` and values that are not
    /// non-negative integers. Nothing is applied on error.
    pub fn apply_overrides(&mut self, overrides: &str) -> Result<(), ConfigError> {
        let mut next = self.clone();
        for pair in split_pairs(overrides) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| ConfigError::Malformed(pair.clone()))?;
            if key.is_empty() {
                return Err(ConfigError::Malformed(pair.clone()));
            }

            let slot = match key {
                "recursion_max" => &mut next.recursion_max,
                "trial_max" => &mut next.trial_max,
                "threshold_max" => &mut next.threshold_max,
                "solution_max" => &mut next.solution_max,
                "refine_cycle" => &mut next.refine_cycle,
                "workers" => &mut next.workers,
                "seed" => {
                    next.seed = if value.eq_ignore_ascii_case("none") {
                        None
                    } else {
                        Some(parse_value(key, value)?)
                    };
                    continue;
                }
                _ => return Err(ConfigError::UnknownKey(key.to_string())),
            };
            *slot = parse_value(key, value)?;
        }
        *self = next;
        Ok(())
    }
}

/// Splits into `key=value` tokens, joining spaces around `=`.
fn split_pairs(input: &str) -> Vec<String> {
    let mut joined = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '=' {
            while joined.ends_with(' ') || joined.ends_with('\t') {
                joined.pop();
            }
            joined.push('=');
            while chars.peek().is_some_and(|n| *n == ' ' || *n == '\t') {
                chars.next();
            }
        } else {
            joined.push(c);
        }
    }
    joined
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = MatchConfig::default();
        assert_eq!(c.trial_max, 500);
        assert_eq!(c.threshold_max, 2);
        assert_eq!(c.solution_max, 20);
        assert_eq!(c.refine_cycle, 10);
        assert_eq!(c.resolved_recursion_max(30), 35);
        assert!(c.resolved_workers() >= 1);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let c = MatchConfig::default()
            .with_recursion_max(1000)
            .with_workers(3)
            .with_refine_cycle(0)
            .with_seed(9);
        assert_eq!(c.resolved_recursion_max(30), 1000);
        assert_eq!(c.resolved_workers(), 3);
        assert_eq!(c.seed, Some(9));

        let limits = c.limits(30);
        assert_eq!(limits.recursion_max, 1000);
        assert_eq!(limits.refine_cycle, 0);
    }

    #[test]
    fn test_validate_zero_budgets() {
        let c = MatchConfig::default().with_trial_max(0);
        assert!(matches!(c.validate(), Err(ConfigError::Zero("trial_max"))));
        let c = MatchConfig::default().with_solution_max(0);
        assert!(matches!(c.validate(), Err(ConfigError::Zero("solution_max"))));
    }

    #[test]
    fn test_apply_overrides() {
        let mut c = MatchConfig::default();
        c.apply_overrides("trial_max=100 refine_cycle = 3, threshold_max=4;seed=7")
            .unwrap();
        assert_eq!(c.trial_max, 100);
        assert_eq!(c.refine_cycle, 3);
        assert_eq!(c.threshold_max, 4);
        assert_eq!(c.seed, Some(7));

        c.apply_overrides("seed=none").unwrap();
        assert_eq!(c.seed, None);
        c.apply_overrides("").unwrap();
        assert_eq!(c.trial_max, 100);
    }

    #[test]
    fn test_apply_overrides_errors_leave_config() {
        let mut c = MatchConfig::default();
        assert!(matches!(
            c.apply_overrides("trial_max=5 speed=3"),
            Err(ConfigError::UnknownKey(k)) if k == "speed"
        ));
        assert!(matches!(
            c.apply_overrides("trial_max=-1"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            c.apply_overrides("trial_max"),
            Err(ConfigError::Malformed(_))
        ));
        assert_eq!(c, MatchConfig::default());
    }

    #[test]
    fn test_serde_defaults() {
        let c: MatchConfig = serde_json::from_str(r#"{"trial_max": 50}"#).unwrap();
        assert_eq!(c.trial_max, 50);
        assert_eq!(c.solution_max, 20);

        let json = serde_json::to_string(&c).unwrap();
        let back: MatchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
