//! Per-unit consumption summary.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::WaterReading;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSummary {
    pub unit: String,
    pub readings: usize,
    pub total_consumption: f64,
    pub average_consumption: f64,
    pub latest_reading: f64,
    pub latest_date: NaiveDate,
    /// Whether the most recent consumption is above the limit.
    pub over_limit: bool,
}

/// Summarize readings per unit, ordered by unit name.
///
/// Units are grouped case-insensitively; the displayed name is the one on the
/// latest reading.
pub fn summarize(readings: &[WaterReading], limit: Option<f64>) -> Vec<UnitSummary> {
    let mut by_unit: BTreeMap<String, Vec<&WaterReading>> = BTreeMap::new();
    for r in readings {
        by_unit.entry(r.unit.to_lowercase()).or_default().push(r);
    }

    by_unit
        .into_values()
        .filter_map(|mut group| {
            group.sort_by(|a, b| {
                a.reading_date
                    .cmp(&b.reading_date)
                    .then_with(|| a.created_at.cmp(&b.created_at))
            });
            let latest = *group.last()?;
            let total: f64 = group.iter().map(|r| r.consumption()).sum();
            let count = group.len();

            Some(UnitSummary {
                unit: latest.unit.clone(),
                readings: count,
                total_consumption: total,
                average_consumption: total / count as f64,
                latest_reading: latest.reading,
                latest_date: latest.reading_date,
                over_limit: crate::exceeds_limit(latest.consumption(), limit),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewReading;
    use chrono::{Duration, Utc};
    use condohub_core::{EnterpriseId, UserId};

    fn reading(unit: &str, value: f64, previous: f64, days_ago: i64) -> WaterReading {
        let now = Utc::now();
        WaterReading::create(
            EnterpriseId::new(),
            UserId::new(),
            NewReading {
                unit: unit.into(),
                reading: value,
                previous_reading: Some(previous),
                reading_date: Some(now.date_naive() - Duration::days(days_ago)),
                ..Default::default()
            },
            0.0,
            now,
        )
        .unwrap()
    }

    #[test]
    fn groups_by_unit_and_flags_latest_over_limit() {
        let readings = vec![
            reading("A-101", 100.0, 90.0, 30),
            reading("A-101", 120.0, 100.0, 0),
            reading("B-2", 50.0, 45.0, 0),
        ];

        let summary = summarize(&readings, Some(15.0));
        assert_eq!(summary.len(), 2);

        let a = &summary[0];
        assert_eq!(a.unit, "A-101");
        assert_eq!(a.readings, 2);
        assert_eq!(a.total_consumption, 30.0);
        assert_eq!(a.average_consumption, 15.0);
        assert_eq!(a.latest_reading, 120.0);
        assert!(a.over_limit);

        assert!(!summary[1].over_limit);
    }

    #[test]
    fn empty_input_gives_empty_summary() {
        assert!(summarize(&[], Some(1.0)).is_empty());
    }
}
