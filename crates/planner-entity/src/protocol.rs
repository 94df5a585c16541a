//! Dosing protocol record and dosing frequency.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use planner_core::types::ProtocolId;

use crate::validation::{clean_optional, not_blank};

/// How often a protocol calls for a dose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frequency {
    /// Every day.
    Daily,
    /// Every second day, counted from the start date.
    EveryOtherDay,
    /// Every `days` days, counted from the start date.
    EveryNDays { days: u32 },
    /// On fixed weekdays.
    DaysOfWeek { days: Vec<Weekday> },
}

impl Frequency {
    /// Whether a dose falls on `date` for a protocol starting on `start`.
    pub fn is_due(&self, start: NaiveDate, date: NaiveDate) -> bool {
        if date < start {
            return false;
        }
        let elapsed = (date - start).num_days();
        match self {
            Frequency::Daily => true,
            Frequency::EveryOtherDay => elapsed % 2 == 0,
            Frequency::EveryNDays { days } => *days > 0 && elapsed % i64::from(*days) == 0,
            Frequency::DaysOfWeek { days } => days.contains(&date.weekday()),
        }
    }

    /// Average number of doses per day.
    pub fn doses_per_day(&self) -> f64 {
        match self {
            Frequency::Daily => 1.0,
            Frequency::EveryOtherDay => 0.5,
            Frequency::EveryNDays { days } if *days > 0 => 1.0 / f64::from(*days),
            Frequency::EveryNDays { .. } => 0.0,
            Frequency::DaysOfWeek { days } => days.len() as f64 / 7.0,
        }
    }

    fn check(&self) -> Result<(), ValidationError> {
        match self {
            Frequency::EveryNDays { days: 0 } => Err(ValidationError::new("frequency")
                .with_message(Cow::Borrowed("interval must be at least one day"))),
            Frequency::DaysOfWeek { days } if days.is_empty() => Err(ValidationError::new(
                "frequency",
            )
            .with_message(Cow::Borrowed("at least one weekday is required"))),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::EveryOtherDay => write!(f, "eod"),
            Frequency::EveryNDays { days } => write!(f, "every:{days}"),
            Frequency::DaysOfWeek { days } => {
                let names: Vec<String> = days
                    .iter()
                    .map(|d| d.to_string().to_ascii_lowercase())
                    .collect();
                write!(f, "days:{}", names.join(","))
            }
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    /// Accepts `daily`, `eod`, `every:<n>` and `days:mon,wed,fri`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "daily" => return Ok(Self::Daily),
            "eod" | "every-other-day" => return Ok(Self::EveryOtherDay),
            _ => {}
        }

        if let Some(n) = s.strip_prefix("every:") {
            let days = n
                .parse::<u32>()
                .map_err(|_| format!("invalid interval '{n}'"))?;
            return Ok(Self::EveryNDays { days });
        }

        if let Some(list) = s.strip_prefix("days:") {
            let days = list
                .split(',')
                .filter(|d| !d.trim().is_empty())
                .map(|d| {
                    d.trim()
                        .parse::<Weekday>()
                        .map_err(|_| format!("invalid weekday '{}'", d.trim()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::DaysOfWeek { days });
        }

        Err(format!("unknown frequency '{s}'"))
    }
}

/// A dosing schedule for one peptide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_protocol"))]
pub struct Protocol {
    /// Unique protocol identifier.
    pub id: ProtocolId,
    /// Display name.
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    /// Compound being dosed.
    #[validate(custom(function = "not_blank"))]
    pub peptide: String,
    /// Dose per administration, in micrograms.
    #[validate(range(exclusive_min = 0.0, message = "dose must be positive"))]
    pub dose_mcg: f64,
    /// Dosing frequency.
    pub frequency: Frequency,
    /// First dosing day.
    pub start_date: NaiveDate,
    /// Last dosing day, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Whether the protocol is currently running.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the protocol was created.
    pub created_at: DateTime<Utc>,
    /// When the protocol was last modified.
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

fn validate_protocol(protocol: &Protocol) -> Result<(), ValidationError> {
    if let Some(end) = protocol.end_date {
        if end < protocol.start_date {
            return Err(ValidationError::new("dates")
                .with_message(Cow::Borrowed("end date is before start date")));
        }
    }
    protocol.frequency.check()
}

/// Data required to create a protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProtocol {
    pub name: String,
    pub peptide: String,
    pub dose_mcg: f64,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Partial update of a protocol.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProtocol {
    pub name: Option<String>,
    pub dose_mcg: Option<f64>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl Protocol {
    /// Build a new, active protocol from creation data.
    pub fn create(data: CreateProtocol, now: DateTime<Utc>) -> Self {
        Self {
            id: ProtocolId::new(),
            name: data.name.trim().to_string(),
            peptide: data.peptide.trim().to_string(),
            dose_mcg: data.dose_mcg,
            frequency: data.frequency,
            start_date: data.start_date,
            end_date: data.end_date,
            active: true,
            notes: clean_optional(data.notes),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update.
    pub fn apply(&mut self, update: UpdateProtocol, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(dose) = update.dose_mcg {
            self.dose_mcg = dose;
        }
        if let Some(frequency) = update.frequency {
            self.frequency = frequency;
        }
        if let Some(start) = update.start_date {
            self.start_date = start;
        }
        if update.end_date.is_some() {
            self.end_date = update.end_date;
        }
        if update.notes.is_some() {
            self.notes = clean_optional(update.notes);
        }
        self.updated_at = now;
    }

    /// Whether a dose is scheduled on `date`.
    pub fn is_due(&self, date: NaiveDate) -> bool {
        if self.end_date.is_some_and(|end| date > end) {
            return false;
        }
        self.frequency.is_due(self.start_date, date)
    }

    /// Average milligrams consumed per day while the protocol runs.
    pub fn daily_mg(&self) -> f64 {
        self.dose_mcg / 1000.0 * self.frequency.doses_per_day()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn protocol(frequency: Frequency) -> Protocol {
        Protocol::create(
            CreateProtocol {
                name: "Recovery".into(),
                peptide: "BPC-157".into(),
                dose_mcg: 250.0,
                frequency,
                start_date: date(2024, 1, 1),
                end_date: Some(date(2024, 1, 31)),
                notes: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_every_other_day() {
        let p = protocol(Frequency::EveryOtherDay);
        assert!(p.is_due(date(2024, 1, 1)));
        assert!(!p.is_due(date(2024, 1, 2)));
        assert!(p.is_due(date(2024, 1, 3)));
        assert!(!p.is_due(date(2023, 12, 31)));
        assert!(!p.is_due(date(2024, 2, 2)));
    }

    #[test]
    fn test_days_of_week() {
        // 2024-01-01 is a Monday.
        let p = protocol(Frequency::DaysOfWeek {
            days: vec![Weekday::Mon, Weekday::Fri],
        });
        assert!(p.is_due(date(2024, 1, 1)));
        assert!(!p.is_due(date(2024, 1, 2)));
        assert!(p.is_due(date(2024, 1, 5)));
        assert!((p.frequency.doses_per_day() - 2.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_daily_mg() {
        let p = protocol(Frequency::Daily);
        assert!((p.daily_mg() - 0.25).abs() < 1e-9);
        let p = protocol(Frequency::EveryNDays { days: 4 });
        assert!((p.daily_mg() - 0.0625).abs() < 1e-9);
    }

    #[test]
    fn test_validation() {
        let mut p = protocol(Frequency::Daily);
        assert!(p.validate().is_ok());

        p.end_date = Some(date(2023, 12, 1));
        assert!(p.validate().is_err());

        let mut p = protocol(Frequency::EveryNDays { days: 0 });
        assert!(p.validate().is_err());
        p.frequency = Frequency::Daily;
        p.dose_mcg = 0.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_frequency_parse_and_display() {
        assert_eq!("daily".parse::<Frequency>(), Ok(Frequency::Daily));
        assert_eq!("EOD".parse::<Frequency>(), Ok(Frequency::EveryOtherDay));
        assert_eq!(
            "every:3".parse::<Frequency>(),
            Ok(Frequency::EveryNDays { days: 3 })
        );
        let f: Frequency = "days:mon,thu".parse().unwrap();
        assert_eq!(
            f,
            Frequency::DaysOfWeek {
                days: vec![Weekday::Mon, Weekday::Thu]
            }
        );
        assert_eq!(f.to_string(), "days:mon,thu");
        assert!("hourly".parse::<Frequency>().is_err());
        assert!("days:funday".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_frequency_json_shape() {
        let json = serde_json::to_value(Frequency::EveryNDays { days: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "every_n_days", "days": 3}));
    }
}
