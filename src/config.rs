use anyhow::{anyhow, Result};
use chrono::NaiveTime;
use std::collections::HashMap;

pub const DEFAULT_TICK_SIZE: f64 = 0.25;
pub const PROFIT_FACTOR_CAP: f64 = 999.0;

/// Setting keys understood by [`JournalSettings::from_settings_map`].
pub const SETTING_KEYS: &[&str] = &[
    "DEFAULT_TICK_SIZE",
    "LONDON_SESSION",
    "NEW_YORK_SESSION",
    "EDGE_SWEEP_MIN_R",
    "EDGE_SWEEP_MAX_R",
    "EDGE_SWEEP_STEP_R",
    "EDGE_MIN_MOVE_R",
    "RECENT_FORM_LENGTH",
    "PROFIT_FACTOR_CAP",
];

/// Time-of-day window, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SessionWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let (start, end) = raw
            .split_once('-')
            .ok_or_else(|| anyhow!("Session window must look like HH:MM-HH:MM (value: {})", raw))?;
        let start = parse_time(start.trim())?;
        let end = parse_time(end.trim())?;
        if end < start {
            return Err(anyhow!(
                "Session window end must not precede its start (value: {})",
                raw
            ));
        }
        Ok(Self { start, end })
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

pub fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| anyhow!("Time must be HH:MM or HH:MM:SS (value: {})", raw))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub london: SessionWindow,
    pub new_york: SessionWindow,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            london: SessionWindow::new(hm(3, 0), hm(11, 30)),
            new_york: SessionWindow::new(hm(8, 30), hm(17, 0)),
        }
    }
}

/// R targets sampled by the edge sweep and the minimum excursion that counts as a real attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSweepConfig {
    pub min_target_r: f64,
    pub max_target_r: f64,
    pub step_r: f64,
    pub min_move_r: f64,
}

impl Default for EdgeSweepConfig {
    fn default() -> Self {
        Self {
            min_target_r: 0.5,
            max_target_r: 10.0,
            step_r: 0.5,
            min_move_r: 0.2,
        }
    }
}

impl EdgeSweepConfig {
    pub fn targets(&self) -> Vec<f64> {
        if self.step_r <= 0.0 || self.max_target_r < self.min_target_r {
            return Vec::new();
        }
        let steps = ((self.max_target_r - self.min_target_r) / self.step_r + 1e-9).floor() as usize;
        (0..=steps)
            .map(|index| self.min_target_r + index as f64 * self.step_r)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalSettings {
    pub default_tick_size: f64,
    pub sessions: SessionConfig,
    pub edge_sweep: EdgeSweepConfig,
    pub recent_form_length: usize,
    pub profit_factor_cap: f64,
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            default_tick_size: DEFAULT_TICK_SIZE,
            sessions: SessionConfig::default(),
            edge_sweep: EdgeSweepConfig::default(),
            recent_form_length: 5,
            profit_factor_cap: PROFIT_FACTOR_CAP,
        }
    }
}

impl JournalSettings {
    pub fn from_settings_map(settings: &HashMap<String, String>) -> Result<Self> {
        let defaults = Self::default();

        let default_tick_size =
            optional_setting_f64(settings, "DEFAULT_TICK_SIZE", Some(f64::MIN_POSITIVE), None)?
                .unwrap_or(defaults.default_tick_size);
        let london = optional_setting(settings, "LONDON_SESSION")
            .map(SessionWindow::parse)
            .transpose()?
            .unwrap_or(defaults.sessions.london);
        let new_york = optional_setting(settings, "NEW_YORK_SESSION")
            .map(SessionWindow::parse)
            .transpose()?
            .unwrap_or(defaults.sessions.new_york);
        let min_target_r = optional_setting_f64(settings, "EDGE_SWEEP_MIN_R", Some(0.0), None)?
            .unwrap_or(defaults.edge_sweep.min_target_r);
        let max_target_r = optional_setting_f64(settings, "EDGE_SWEEP_MAX_R", Some(0.0), None)?
            .unwrap_or(defaults.edge_sweep.max_target_r);
        let step_r =
            optional_setting_f64(settings, "EDGE_SWEEP_STEP_R", Some(f64::MIN_POSITIVE), None)?
                .unwrap_or(defaults.edge_sweep.step_r);
        let min_move_r = optional_setting_f64(settings, "EDGE_MIN_MOVE_R", Some(0.0), None)?
            .unwrap_or(defaults.edge_sweep.min_move_r);
        let recent_form_length = optional_setting_usize(settings, "RECENT_FORM_LENGTH", 1)?
            .unwrap_or(defaults.recent_form_length);
        let profit_factor_cap =
            optional_setting_f64(settings, "PROFIT_FACTOR_CAP", Some(0.0), None)?
                .unwrap_or(defaults.profit_factor_cap);

        if max_target_r < min_target_r {
            return Err(anyhow!(
                "EDGE_SWEEP_MAX_R ({}) must be >= EDGE_SWEEP_MIN_R ({})",
                max_target_r,
                min_target_r
            ));
        }

        Ok(Self {
            default_tick_size,
            sessions: SessionConfig { london, new_york },
            edge_sweep: EdgeSweepConfig {
                min_target_r,
                max_target_r,
                step_r,
                min_move_r,
            },
            recent_form_length,
            profit_factor_cap,
        })
    }
}

fn optional_setting<'a>(settings: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    settings
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn optional_setting_f64(
    settings: &HashMap<String, String>,
    key: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<Option<f64>> {
    let Some(raw) = optional_setting(settings, key) else {
        return Ok(None);
    };
    let value = raw
        .parse::<f64>()
        .map_err(|_| anyhow!("Setting {} must be a number (value: {})", key, raw))?;
    if !value.is_finite() {
        return Err(anyhow!("Setting {} must be finite (value: {})", key, raw));
    }
    if let Some(min_value) = min {
        if value < min_value {
            return Err(anyhow!(
                "Setting {} must be >= {} (value: {})",
                key,
                min_value,
                raw
            ));
        }
    }
    if let Some(max_value) = max {
        if value > max_value {
            return Err(anyhow!(
                "Setting {} must be <= {} (value: {})",
                key,
                max_value,
                raw
            ));
        }
    }
    Ok(Some(value))
}

fn optional_setting_usize(
    settings: &HashMap<String, String>,
    key: &str,
    min: usize,
) -> Result<Option<usize>> {
    let Some(raw) = optional_setting(settings, key) else {
        return Ok(None);
    };
    let value = raw
        .parse::<usize>()
        .map_err(|_| anyhow!("Setting {} must be a whole number (value: {})", key, raw))?;
    if value < min {
        return Err(anyhow!(
            "Setting {} must be >= {} (value: {})",
            key,
            min,
            raw
        ));
    }
    Ok(Some(value))
}
