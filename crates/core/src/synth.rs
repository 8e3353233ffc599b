use crate::domain::channel::Channel;
use crate::domain::metrics::DailyRecord;
use anyhow::Context;
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

const DEFAULT_START: (i32, u32, u32) = (2024, 1, 1);
const DEFAULT_DAYS: usize = 144;

const BASE_TRAFFIC_MIN: u64 = 1_000;
const BASE_TRAFFIC_MAX: u64 = 5_000;
const DAILY_NOISE_STD: f64 = 0.1;
const TREND_END: f64 = 0.3;
const TRAFFIC_FLOOR: f64 = 100.0;
const CONVERSION_JITTER: (f64, f64) = (0.8, 1.2);
const COST_JITTER: (f64, f64) = (0.9, 1.1);
const VALUE_PER_CONVERSION_MIN: u64 = 50;
const VALUE_PER_CONVERSION_MAX: u64 = 200;

/// Historical window the demo series covers.
#[derive(Debug, Clone)]
pub struct SynthOptions {
    pub start: NaiveDate,
    pub days: usize,
}

impl Default for SynthOptions {
    fn default() -> Self {
        let (y, m, d) = DEFAULT_START;
        Self {
            start: NaiveDate::from_ymd_opt(y, m, d).expect("default history start is a valid date"),
            days: DEFAULT_DAYS,
        }
    }
}

impl SynthOptions {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut out = Self::default();

        if let Ok(s) = std::env::var("HISTORY_START") {
            out.start = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .with_context(|| format!("HISTORY_START must be YYYY-MM-DD (got {s})"))?;
        }

        if let Ok(s) = std::env::var("HISTORY_DAYS") {
            out.days = s
                .trim()
                .parse::<usize>()
                .with_context(|| format!("HISTORY_DAYS must be an integer (got {s})"))?;
        }

        anyhow::ensure!(
            (1..=3660).contains(&out.days),
            "HISTORY_DAYS must be 1..=3660 (got {})",
            out.days
        );
        out.day(out.days.saturating_sub(1))?;
        Ok(out)
    }

    /// Date of the `offset`-th day of the window.
    pub fn day(&self, offset: usize) -> anyhow::Result<NaiveDate> {
        i64::try_from(offset)
            .ok()
            .and_then(Duration::try_days)
            .and_then(|d| self.start.checked_add_signed(d))
            .with_context(|| {
                format!(
                    "history window starting {} cannot span {} days",
                    self.start,
                    offset + 1
                )
            })
    }
}

/// Seeded runs reproduce the same series; unseeded runs draw from entropy.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Synthesize one channel's daily series.
///
/// Traffic is a random base level scaled by normal noise plus a linear growth
/// trend, floored at 100 visits. Conversions, revenue and cost are derived from
/// traffic and the channel's baseline rates with uniform jitter. Fails when the
/// window runs past the last representable date.
pub fn generate_series<R: Rng + ?Sized>(
    channel: &Channel,
    opts: &SynthOptions,
    rng: &mut R,
) -> anyhow::Result<Vec<DailyRecord>> {
    let days = opts.days;
    let mut out = Vec::with_capacity(days);
    if days == 0 {
        return Ok(out);
    }

    let base_traffic = rng.gen_range(BASE_TRAFFIC_MIN..=BASE_TRAFFIC_MAX) as f64;
    let value_per_conversion =
        rng.gen_range(VALUE_PER_CONVERSION_MIN..=VALUE_PER_CONVERSION_MAX) as f64;
    let noise = Normal::new(0.0, DAILY_NOISE_STD).expect("noise std is a positive constant");

    for i in 0..days {
        let trend = if days > 1 {
            TREND_END * i as f64 / (days - 1) as f64
        } else {
            0.0
        };
        let variation = noise.sample(rng);

        let traffic = (base_traffic * (1.0 + variation + trend)).max(TRAFFIC_FLOOR);
        let conversions = traffic
            * channel.conversion_rate
            * rng.gen_range(CONVERSION_JITTER.0..CONVERSION_JITTER.1);
        let revenue = conversions * value_per_conversion;
        let cost = traffic * channel.avg_cost_per_click * rng.gen_range(COST_JITTER.0..COST_JITTER.1);

        out.push(DailyRecord::new(
            opts.day(i)?,
            traffic as u64,
            conversions as u64,
            revenue as u64,
            cost as u64,
        ));
    }

    tracing::debug!(
        channel = %channel.id,
        days,
        base_traffic,
        value_per_conversion,
        "synthesized channel series"
    );
    Ok(out)
}
