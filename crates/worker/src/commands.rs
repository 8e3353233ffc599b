use anyhow::Context;
use chrono::NaiveDateTime;
use rand::Rng;
use std::fmt::Write;

use channelpulse_core::domain::channel::ChannelId;
use channelpulse_core::domain::metrics::Metric;
use channelpulse_core::render;
use channelpulse_core::Engine;

/// An unknown channel is reported like a channel without data: `null` in JSON.
pub fn summary(engine: &Engine, channel: &str, json: bool) -> anyhow::Result<String> {
    let id = channel.parse::<ChannelId>().ok();
    let summary = id.and_then(|id| engine.summarize(id));

    if json {
        return serde_json::to_string_pretty(&summary).context("serialize summary failed");
    }
    match id {
        Some(id) => Ok(render::render_summary(id.channel(), summary.as_ref())),
        None => Ok(render::NO_CHANNEL_DATA.to_string()),
    }
}

pub fn insight<R: Rng + ?Sized>(
    engine: &Engine,
    focus: Option<&str>,
    json: bool,
    rng: &mut R,
) -> anyhow::Result<String> {
    let focus = parse_focus(focus)?;
    let insight = engine.select_insight(focus, rng);

    if json {
        return serde_json::to_string_pretty(&insight).context("serialize insight failed");
    }
    Ok(render::render_insight(&insight))
}

pub fn chart(
    engine: &Engine,
    channel: &str,
    metric: &str,
    days: usize,
    json: bool,
) -> anyhow::Result<String> {
    let metric = metric.parse::<Metric>()?;
    anyhow::ensure!(days >= 1, "days must be >= 1");

    let id = channel.parse::<ChannelId>().ok();
    let points = id.map(|id| engine.chart(id, metric, days));

    if json {
        return serde_json::to_string_pretty(&points).context("serialize chart failed");
    }
    let (Some(id), Some(points)) = (id, points) else {
        return Ok(render::NO_CHANNEL_DATA.to_string());
    };
    if points.is_empty() {
        return Ok(render::NO_CHANNEL_DATA.to_string());
    }

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} - {} trend (last {} days)",
        id.channel().label(),
        metric,
        points.len()
    );
    for point in &points {
        let _ = writeln!(output, "{}  {}", point.date, point.value);
    }
    Ok(output)
}

pub fn compare(engine: &Engine, json: bool) -> anyhow::Result<String> {
    let rows = engine.compare();

    if json {
        return serde_json::to_string_pretty(&rows).context("serialize comparison failed");
    }
    if rows.is_empty() {
        return Ok("No channel data available.".to_string());
    }

    let mut output = String::new();
    let _ = writeln!(output, "Cross-channel performance (current week):");
    for row in &rows {
        let _ = writeln!(
            output,
            "- {}: revenue ${} | conversions {} | ROI {}x | traffic {}",
            row.channel, row.revenue, row.conversions, row.roi, row.traffic
        );
    }
    Ok(output)
}

pub fn voice<R: Rng + ?Sized>(
    engine: &Engine,
    focus: Option<&str>,
    rng: &mut R,
) -> anyhow::Result<String> {
    let focus = parse_focus(focus)?;
    Ok(render::voice_script(&engine.select_insight(focus, rng)))
}

pub fn report<R: Rng + ?Sized>(
    engine: &Engine,
    channel: &str,
    generated_at: NaiveDateTime,
    rng: &mut R,
) -> anyhow::Result<String> {
    let id = channel
        .parse::<ChannelId>()
        .with_context(|| format!("cannot build a report for channel {channel:?}"))?;
    let summary = engine.summarize(id);
    let insight = engine.select_insight(Some(id), rng);
    Ok(render::build_report(
        id.channel(),
        summary.as_ref(),
        &insight,
        generated_at,
    ))
}

fn parse_focus(focus: Option<&str>) -> anyhow::Result<Option<ChannelId>> {
    match focus.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Ok(Some(s.parse::<ChannelId>()?)),
        None => Ok(None),
    }
}
