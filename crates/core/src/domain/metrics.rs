use crate::domain::channel::Channel;
use crate::error::EngineError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One day of metrics for a channel. ROI is derived at construction, so the
/// figures it is derived from are read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    traffic: u64,
    conversions: u64,
    revenue: u64,
    cost: u64,
    roi: f64,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, traffic: u64, conversions: u64, revenue: u64, cost: u64) -> Self {
        let roi = round_to(revenue as f64 / cost.max(1) as f64, 2);
        Self {
            date,
            traffic,
            conversions,
            revenue,
            cost,
            roi,
        }
    }

    pub fn traffic(&self) -> u64 {
        self.traffic
    }

    pub fn conversions(&self) -> u64 {
        self.conversions
    }

    pub fn revenue(&self) -> u64 {
        self.revenue
    }

    pub fn cost(&self) -> u64 {
        self.cost
    }

    pub fn roi(&self) -> f64 {
        self.roi
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Traffic => self.traffic as f64,
            Metric::Conversions => self.conversions as f64,
            Metric::Revenue => self.revenue as f64,
            Metric::Cost => self.cost as f64,
            Metric::Roi => self.roi,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Traffic,
    Conversions,
    #[default]
    Revenue,
    Cost,
    Roi,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Traffic,
        Metric::Conversions,
        Metric::Revenue,
        Metric::Cost,
        Metric::Roi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Traffic => "traffic",
            Self::Conversions => "conversions",
            Self::Revenue => "revenue",
            Self::Cost => "cost",
            Self::Roi => "roi",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| anyhow::anyhow!("unknown metric: {needle}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Sums over a 7-day slice; `roi` is the mean of the daily ROI values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PeriodTotals {
    pub traffic: u64,
    pub conversions: u64,
    pub revenue: u64,
    pub cost: u64,
    pub roi: f64,
}

impl PeriodTotals {
    pub fn from_records(records: &[DailyRecord]) -> Self {
        let mut totals = Self::default();
        if records.is_empty() {
            return totals;
        }

        let mut roi_sum = 0.0;
        for record in records {
            totals.traffic += record.traffic;
            totals.conversions += record.conversions;
            totals.revenue += record.revenue;
            totals.cost += record.cost;
            roi_sum += record.roi;
        }
        totals.roi = round_to(roi_sum / records.len() as f64, 2);
        totals
    }
}

/// Percent change per field, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PeriodChanges {
    pub traffic: f64,
    pub conversions: f64,
    pub revenue: f64,
    pub cost: f64,
    pub roi: f64,
}

impl PeriodChanges {
    pub fn between(current: &PeriodTotals, previous: &PeriodTotals) -> Self {
        let change = |c: f64, p: f64| round_to(percent_change(c, p), 1);
        Self {
            traffic: change(current.traffic as f64, previous.traffic as f64),
            conversions: change(current.conversions as f64, previous.conversions as f64),
            revenue: change(current.revenue as f64, previous.revenue as f64),
            cost: change(current.cost as f64, previous.cost as f64),
            roi: change(current.roi, previous.roi),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummary {
    pub channel: &'static Channel,
    pub current: PeriodTotals,
    pub previous: PeriodTotals,
    pub changes: PeriodChanges,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelComparison {
    pub channel: String,
    pub revenue: u64,
    pub conversions: u64,
    pub roi: f64,
    pub traffic: u64,
}

/// Zero when `previous` is zero, whatever `current` is.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        let reason = EngineError::DivisionGuard {
            what: "percent change",
        };
        tracing::trace!(%reason, "previous period is zero");
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn roi_floors_cost_at_one() {
        let free = DailyRecord::new(day(1), 100, 5, 500, 0);
        assert_eq!(free.roi(), 500.0);

        let paid = DailyRecord::new(day(1), 100, 5, 500, 300);
        assert_eq!(paid.roi(), 1.67);
    }

    #[test]
    fn roi_tracks_the_figures_it_is_built_from() {
        let record = DailyRecord::new(day(3), 120, 6, 500, 100);
        assert_eq!(record.revenue(), 500);
        assert_eq!(record.cost(), 100);
        assert_eq!(record.roi(), 5.0);
        assert_eq!(record.value(Metric::Roi), 5.0);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["roi"], 5.0);
        assert_eq!(value["revenue"], 500);

        let doubled = DailyRecord::new(
            record.date,
            record.traffic(),
            record.conversions(),
            1000,
            record.cost(),
        );
        assert_eq!(doubled.roi(), 10.0);
    }

    #[test]
    fn percent_change_is_zero_without_a_baseline() {
        assert_eq!(percent_change(42.0, 0.0), 0.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
        assert_eq!(percent_change(-7.5, 0.0), 0.0);
    }

    #[test]
    fn percent_change_is_relative_to_previous() {
        assert!((percent_change(315.0, 280.0) - 12.5).abs() < 1e-9);
        assert!((percent_change(50.0, 100.0) + 50.0).abs() < 1e-9);
    }

    #[test]
    fn totals_sum_fields_and_average_roi() {
        let records = vec![
            DailyRecord::new(day(1), 100, 4, 400, 100),
            DailyRecord::new(day(2), 200, 6, 600, 100),
        ];
        let totals = PeriodTotals::from_records(&records);
        assert_eq!(totals.traffic, 300);
        assert_eq!(totals.conversions, 10);
        assert_eq!(totals.revenue, 1000);
        assert_eq!(totals.cost, 200);
        assert_eq!(totals.roi, 5.0);
    }

    #[test]
    fn totals_of_empty_slice_are_zero() {
        assert_eq!(PeriodTotals::from_records(&[]), PeriodTotals::default());
    }

    #[test]
    fn metric_names_parse() {
        assert_eq!("ROI".parse::<Metric>().unwrap(), Metric::Roi);
        assert_eq!("traffic".parse::<Metric>().unwrap(), Metric::Traffic);
        assert!("clicks".parse::<Metric>().is_err());
    }
}
