use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use condohub_core::{DomainError, DomainResult, EnterpriseId, Entity, Record, UserId, text};

condohub_core::record_id!(
    /// Water reading identifier.
    ReadingId
);

/// One meter reading for one unit.
///
/// # Invariants
/// - `unit` is non-empty.
/// - `reading` and `previous_reading` are finite, non-negative, and
///   `reading >= previous_reading`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterReading {
    pub id: ReadingId,
    pub enterprise_id: EnterpriseId,
    pub unit: String,
    pub reading: f64,
    pub previous_reading: f64,
    pub reading_date: NaiveDate,
    pub recorded_by: UserId,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReading {
    pub unit: String,
    pub reading: f64,
    /// Taken from the unit's latest reading when omitted.
    #[serde(default)]
    pub previous_reading: Option<f64>,
    #[serde(default)]
    pub reading_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPatch {
    pub unit: Option<String>,
    pub reading: Option<f64>,
    pub previous_reading: Option<f64>,
    pub reading_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub photo_url: Option<Option<String>>,
}

fn meter_value(field: &str, value: f64) -> DomainResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!("{field} must be a non-negative number")));
    }
    Ok(value)
}

fn ensure_not_decreasing(reading: f64, previous: f64) -> DomainResult<()> {
    if reading < previous {
        return Err(DomainError::validation(format!(
            "reading {reading} is lower than the previous reading {previous}"
        )));
    }
    Ok(())
}

impl WaterReading {
    /// Build a reading.
    ///
    /// `inferred_previous` is the unit's latest stored reading (0 when the unit
    /// has none); it is used only when the input carries no previous value.
    pub fn create(
        enterprise_id: EnterpriseId,
        recorded_by: UserId,
        input: NewReading,
        inferred_previous: f64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let unit = text::required("unit", &input.unit)?;
        let reading = meter_value("reading", input.reading)?;
        let previous_reading = meter_value(
            "previous reading",
            input.previous_reading.unwrap_or(inferred_previous),
        )?;
        ensure_not_decreasing(reading, previous_reading)?;

        Ok(Self {
            id: ReadingId::new(),
            enterprise_id,
            unit,
            reading,
            previous_reading,
            reading_date: input.reading_date.unwrap_or_else(|| now.date_naive()),
            recorded_by,
            notes: text::optional(input.notes),
            photo_url: text::optional(input.photo_url),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: ReadingPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let unit = patch.unit.as_deref().map(|u| text::required("unit", u)).transpose()?;
        let reading = meter_value("reading", patch.reading.unwrap_or(self.reading))?;
        let previous = meter_value(
            "previous reading",
            patch.previous_reading.unwrap_or(self.previous_reading),
        )?;
        ensure_not_decreasing(reading, previous)?;

        if let Some(unit) = unit {
            self.unit = unit;
        }
        self.reading = reading;
        self.previous_reading = previous;
        if let Some(date) = patch.reading_date {
            self.reading_date = date;
        }
        if let Some(notes) = patch.notes {
            self.notes = text::optional(notes);
        }
        if let Some(photo_url) = patch.photo_url {
            self.photo_url = text::optional(photo_url);
        }
        self.updated_at = now;
        Ok(())
    }

    /// `reading - previous_reading`.
    pub fn consumption(&self) -> f64 {
        self.reading - self.previous_reading
    }
}

/// High-consumption check: strictly greater than the configured limit.
///
/// No limit configured means no alert.
pub fn exceeds_limit(consumption: f64, limit: Option<f64>) -> bool {
    limit.is_some_and(|l| consumption > l)
}

/// Latest reading of `unit` by reading date, then creation time.
pub fn latest_for_unit<'a>(readings: &'a [WaterReading], unit: &str) -> Option<&'a WaterReading> {
    let unit = unit.trim();
    readings
        .iter()
        .filter(|r| r.unit.eq_ignore_ascii_case(unit))
        .max_by(|a, b| {
            a.reading_date
                .cmp(&b.reading_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
        })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReadingFilter {
    pub unit: Option<String>,
}

impl ReadingFilter {
    pub fn matches(&self, reading: &WaterReading) -> bool {
        match self.unit.as_deref().map(str::trim) {
            Some(u) if !u.is_empty() => reading.unit.eq_ignore_ascii_case(u),
            _ => true,
        }
    }
}

pub fn sort_newest_first(readings: &mut [WaterReading]) {
    readings.sort_by(|a, b| {
        b.reading_date
            .cmp(&a.reading_date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

impl Entity for WaterReading {
    type Id = ReadingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for WaterReading {
    const TABLE: &'static str = "water_readings";

    fn key(&self) -> uuid::Uuid {
        *self.id.as_uuid()
    }

    fn enterprise_id(&self) -> Option<EnterpriseId> {
        Some(self.enterprise_id)
    }
}
