pub mod domain;
pub mod engine;
pub mod error;
pub mod render;
pub mod synth;

pub use engine::Engine;

pub mod config {
    use crate::synth::SynthOptions;
    use anyhow::Context;
    use std::time::Duration;

    const DEFAULT_INSIGHT_DELAY_MS: u64 = 2_000;
    const DEFAULT_CHART_DAYS: usize = 30;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        /// Fixes the synthetic data. Unset means a fresh dataset per process.
        pub seed: Option<u64>,
        /// Artificial "processing" pause before a freshly generated insight.
        pub insight_delay: Duration,
        pub chart_days: usize,
        pub synth: SynthOptions,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let seed = match std::env::var("CHANNELPULSE_SEED") {
                Ok(s) => Some(
                    s.trim()
                        .parse::<u64>()
                        .with_context(|| format!("CHANNELPULSE_SEED must be an integer (got {s})"))?,
                ),
                Err(_) => None,
            };

            let insight_delay_ms = std::env::var("INSIGHT_DELAY_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEFAULT_INSIGHT_DELAY_MS);

            let chart_days = std::env::var("CHART_DAYS")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|n| *n >= 1)
                .unwrap_or(DEFAULT_CHART_DAYS);

            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                seed,
                insight_delay: Duration::from_millis(insight_delay_ms),
                chart_days,
                synth: SynthOptions::from_env()?,
            })
        }
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                sentry_dsn: None,
                seed: None,
                insight_delay: Duration::from_millis(DEFAULT_INSIGHT_DELAY_MS),
                chart_days: DEFAULT_CHART_DAYS,
                synth: SynthOptions::default(),
            }
        }
    }
}
