use crate::domain::channel::{Channel, ChannelId};
use crate::domain::insight::{builtin_templates, DynamicData, EnrichedInsight, InsightTemplate};
use crate::domain::metrics::{
    round_to, ChannelComparison, ChartPoint, DailyRecord, Metric, PeriodChanges, PeriodSummary,
    PeriodTotals,
};
use crate::error::EngineError;
use crate::synth::{self, SynthOptions};
use anyhow::ensure;
use chrono::Duration;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

const PERIOD_DAYS: usize = 7;

/// Channel series and the insight catalog. Built once, then only read.
#[derive(Debug, Clone)]
pub struct Engine {
    series: BTreeMap<ChannelId, Vec<DailyRecord>>,
    templates: Vec<InsightTemplate>,
}

impl Engine {
    /// Synthesize demo data for every catalog channel.
    pub fn initialize(seed: Option<u64>, opts: &SynthOptions) -> anyhow::Result<Self> {
        let mut rng = synth::rng_from_seed(seed);
        let series = ChannelId::ALL
            .into_iter()
            .map(|id| Ok((id, synth::generate_series(id.channel(), opts, &mut rng)?)))
            .collect::<anyhow::Result<_>>()?;

        tracing::info!(
            seeded = seed.is_some(),
            start = %opts.start,
            days = opts.days,
            "engine initialized"
        );

        Ok(Self {
            series,
            templates: builtin_templates(),
        })
    }

    /// Build from explicit data. Channels missing from `series` have no records.
    pub fn from_series(
        templates: Vec<InsightTemplate>,
        series: BTreeMap<ChannelId, Vec<DailyRecord>>,
    ) -> anyhow::Result<Self> {
        ensure!(!templates.is_empty(), "insight catalog must be non-empty");

        for (id, records) in &series {
            for pair in records.windows(2) {
                ensure!(
                    pair[0].date.checked_add_signed(Duration::days(1)) == Some(pair[1].date),
                    "series for {id} must be consecutive days: {} followed by {}",
                    pair[0].date,
                    pair[1].date
                );
            }
        }

        Ok(Self { series, templates })
    }

    pub fn channel(&self, id: ChannelId) -> &'static Channel {
        id.channel()
    }

    pub fn records(&self, id: ChannelId) -> &[DailyRecord] {
        self.series.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Trailing 7-day totals against the 7 days before them.
    ///
    /// Reads the last 14 records. A shorter series yields overlapping windows:
    /// the current period is the last `min(n, 7)` records and the previous period
    /// is the first `min(n, 7)` of the last `min(n, 14)`. Absent when the channel
    /// has no records.
    pub fn summarize(&self, id: ChannelId) -> Option<PeriodSummary> {
        let records = self.records(id);
        if records.is_empty() {
            return None;
        }

        let n = records.len();
        let recent = &records[n - n.min(PERIOD_DAYS * 2)..];
        let current = &records[n - n.min(PERIOD_DAYS)..];
        let previous = &recent[..recent.len().min(PERIOD_DAYS)];

        let current = PeriodTotals::from_records(current);
        let previous = PeriodTotals::from_records(previous);

        Some(PeriodSummary {
            channel: id.channel(),
            changes: PeriodChanges::between(&current, &previous),
            current,
            previous,
        })
    }

    /// Like [`Engine::summarize`], for an id that has not been parsed yet.
    pub fn summarize_named(&self, id: &str) -> Option<PeriodSummary> {
        match id.parse::<ChannelId>() {
            Ok(id) => self.summarize(id),
            Err(err) => {
                tracing::debug!(reason = %err, "summary requested for unknown channel");
                None
            }
        }
    }

    /// Trailing `days` records of one metric, oldest first.
    pub fn chart(&self, id: ChannelId, metric: Metric, days: usize) -> Vec<ChartPoint> {
        let records = self.records(id);
        let start = records.len().saturating_sub(days);
        records[start..]
            .iter()
            .map(|r| ChartPoint {
                date: r.date,
                value: r.value(metric),
            })
            .collect()
    }

    /// Current-period figures for every channel with data, in catalog order.
    pub fn compare(&self) -> Vec<ChannelComparison> {
        ChannelId::ALL
            .into_iter()
            .filter_map(|id| self.summarize(id))
            .map(|s| ChannelComparison {
                channel: s.channel.label(),
                revenue: s.current.revenue,
                conversions: s.current.conversions,
                roi: s.current.roi,
                traffic: s.current.traffic,
            })
            .collect()
    }

    /// Pick a narrative template and decorate it with the ROI spread across channels.
    ///
    /// With a focus channel only templates relevant to it are candidates; when
    /// none are, the whole catalog is used and `focus_fallback` is set. Ties for
    /// best or worst ROI resolve to any of the tied channels.
    pub fn select_insight<R: Rng + ?Sized>(
        &self,
        focus: Option<ChannelId>,
        rng: &mut R,
    ) -> EnrichedInsight {
        let roi_by_channel: Vec<(ChannelId, f64)> = ChannelId::ALL
            .into_iter()
            .filter_map(|id| self.summarize(id).map(|s| (id, s.current.roi)))
            .collect();

        if roi_by_channel.is_empty() {
            tracing::debug!("no channel has data; returning an undecorated template");
            return EnrichedInsight {
                template: self.pick(&self.templates, rng),
                dynamic_data: None,
                focus_fallback: false,
            };
        }

        let (candidates, focus_fallback) = self.candidates(focus);
        let template = self.pick(&candidates, rng);

        let (best, best_roi) = extreme(&roi_by_channel, |a, b| a > b);
        let (worst, worst_roi) = extreme(&roi_by_channel, |a, b| a < b);

        EnrichedInsight {
            template,
            dynamic_data: Some(DynamicData {
                best_channel: best.channel().name,
                best_roi,
                worst_channel: worst.channel().name,
                worst_roi,
                improvement_potential: improvement_potential(best_roi, worst_roi),
            }),
            focus_fallback,
        }
    }

    fn candidates(&self, focus: Option<ChannelId>) -> (Vec<InsightTemplate>, bool) {
        let Some(focus) = focus else {
            return (self.templates.clone(), false);
        };

        let relevant: Vec<InsightTemplate> = self
            .templates
            .iter()
            .filter(|t| t.is_relevant_to(focus))
            .cloned()
            .collect();

        if relevant.is_empty() {
            let reason = EngineError::EmptyCandidateSet { focus };
            tracing::debug!(%reason, "falling back to the full insight catalog");
            return (self.templates.clone(), true);
        }

        (relevant, false)
    }

    fn pick<R: Rng + ?Sized>(&self, candidates: &[InsightTemplate], rng: &mut R) -> InsightTemplate {
        // `from_series` and `initialize` both guarantee a non-empty catalog.
        candidates
            .choose(rng)
            .or_else(|| self.templates.first())
            .cloned()
            .expect("insight catalog is non-empty")
    }
}

/// `(best - worst) / worst * 100`, one decimal. Zero when the spread is zero or
/// the worst ROI is not positive.
pub fn improvement_potential(best_roi: f64, worst_roi: f64) -> f64 {
    if best_roi == worst_roi {
        return 0.0;
    }
    if worst_roi <= 0.0 {
        let reason = EngineError::DivisionGuard {
            what: "improvement potential",
        };
        tracing::debug!(%reason, best_roi, "worst ROI is zero");
        return 0.0;
    }
    round_to((best_roi - worst_roi) / worst_roi * 100.0, 1)
}

fn extreme(values: &[(ChannelId, f64)], better: impl Fn(f64, f64) -> bool) -> (ChannelId, f64) {
    let mut out = values[0];
    for &(id, roi) in &values[1..] {
        if better(roi, out.1) {
            out = (id, roi);
        }
    }
    out
}
