use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::domain::channel::Channel;
use crate::domain::insight::EnrichedInsight;
use crate::domain::metrics::PeriodSummary;

pub const NO_CHANNEL_DATA: &str = "No data available for this channel.";

pub const IMPLEMENTATION_ACK: &str = "🚀 **Recommendation Implemented Successfully!**\n\n\
Integration with advertising platforms initiated. You'll receive a confirmation email with \
detailed implementation steps and projected timeline.";

const NEXT_STEPS: [&str; 4] = [
    "Implement cross-channel retargeting",
    "Optimize budget allocation",
    "Monitor performance metrics",
    "Schedule monthly review",
];

pub fn render_summary(channel: &Channel, summary: Option<&PeriodSummary>) -> String {
    let Some(summary) = summary else {
        return NO_CHANNEL_DATA.to_string();
    };

    let current = &summary.current;
    let changes = &summary.changes;
    let mut output = String::new();

    let _ = writeln!(output, "## {} Performance Summary", channel.label());
    let _ = writeln!(output);
    let _ = writeln!(output, "**This Week's Metrics:**");
    let _ = writeln!(
        output,
        "- 📈 Traffic: {} ({:+.1}%)",
        thousands(current.traffic),
        changes.traffic
    );
    let _ = writeln!(
        output,
        "- 🎯 Conversions: {} ({:+.1}%)",
        thousands(current.conversions),
        changes.conversions
    );
    let _ = writeln!(
        output,
        "- 💰 Revenue: ${} ({:+.1}%)",
        thousands(current.revenue),
        changes.revenue
    );
    let _ = writeln!(output, "- 📊 ROI: {}x ({:+.1}%)", current.roi, changes.roi);
    let _ = writeln!(output);
    let _ = writeln!(output, "**Target Audience:** {}", channel.audience);
    let _ = writeln!(
        output,
        "**Conversion Rate:** {:.1}%",
        channel.conversion_rate * 100.0
    );

    output
}

pub fn render_insight(insight: &EnrichedInsight) -> String {
    let template = &insight.template;
    let mut output = String::new();

    let _ = writeln!(output, "## {}", template.title);
    let _ = writeln!(output);
    let _ = writeln!(output, "{}", template.content);
    let _ = writeln!(output);
    let _ = writeln!(output, "**💡 Recommended Action:** {}", template.action);
    let _ = writeln!(output, "**📈 Projected Impact:** {}", template.impact);

    if let Some(data) = &insight.dynamic_data {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Best channel: {} ({}x ROI). Weakest channel: {} ({}x ROI). Improvement potential: {:.1}%.",
            data.best_channel, data.best_roi, data.worst_channel, data.worst_roi,
            data.improvement_potential
        );
    }

    output
}

pub fn voice_script(insight: &EnrichedInsight) -> String {
    let template = &insight.template;
    format!(
        "Here's your AI-powered insight: {}. {} The projected impact is {}. \
         Would you like me to implement this recommendation?",
        template.title, template.content, template.impact
    )
}

pub fn build_report(
    channel: &Channel,
    summary: Option<&PeriodSummary>,
    insight: &EnrichedInsight,
    generated_at: NaiveDateTime,
) -> String {
    let template = &insight.template;
    let mut output = String::new();

    let _ = writeln!(output, "# ChannelPulse AI Report");
    let _ = writeln!(
        output,
        "**Generated on:** {}",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(output, "**Primary Channel:** {}", channel.name);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Executive Summary");
    let _ = writeln!(output, "{}", template.content);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Performance Metrics");

    match summary {
        Some(summary) => {
            let current = &summary.current;
            let _ = writeln!(output, "- **Traffic:** {} visitors", thousands(current.traffic));
            let _ = writeln!(output, "- **Conversions:** {}", thousands(current.conversions));
            let _ = writeln!(output, "- **Revenue:** ${}", thousands(current.revenue));
            let _ = writeln!(output, "- **ROI:** {}x", current.roi);
        }
        None => {
            let _ = writeln!(output, "{NO_CHANNEL_DATA}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendations");
    let _ = writeln!(output, "1. **Action:** {}", template.action);
    let _ = writeln!(output, "2. **Expected Impact:** {}", template.impact);
    let _ = writeln!(output, "3. **Implementation Timeline:** 2-4 weeks");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Next Steps");
    for step in NEXT_STEPS {
        let _ = writeln!(output, "- {step}");
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "---");
    let _ = writeln!(
        output,
        "*Generated by ChannelPulse AI - Dynamic Multi-Channel Insights*"
    );

    output
}

fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
