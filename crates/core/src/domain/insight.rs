use crate::domain::channel::ChannelId;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightTemplate {
    pub title: &'static str,
    pub content: &'static str,
    pub action: &'static str,
    pub impact: &'static str,
    pub channels: &'static [ChannelId],
}

impl InsightTemplate {
    pub fn is_relevant_to(&self, channel: ChannelId) -> bool {
        self.channels.contains(&channel)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicData {
    pub best_channel: &'static str,
    pub best_roi: f64,
    pub worst_channel: &'static str,
    pub worst_roi: f64,
    /// Percent by which the worst channel's ROI trails the best, one decimal.
    pub improvement_potential: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedInsight {
    #[serde(flatten)]
    pub template: InsightTemplate,
    /// Absent when no channel had data to rank.
    pub dynamic_data: Option<DynamicData>,
    /// Set when the focus channel matched no template and the full catalog was used.
    pub focus_fallback: bool,
}

pub fn builtin_templates() -> Vec<InsightTemplate> {
    vec![
        InsightTemplate {
            title: "🚀 Instagram Campaign Breakthrough",
            content: "Your Instagram ads are crushing it! CTR is 300% higher than LinkedIn. \
                      I've detected a pattern: posts with sustainability themes get 2x more \
                      engagement. Consider shifting 20% of your LinkedIn budget to Instagram \
                      for a projected $8,000 monthly revenue increase.",
            action: "Reallocate Budget",
            impact: "+$8,000/month",
            channels: &[ChannelId::Instagram, ChannelId::Linkedin],
        },
        InsightTemplate {
            title: "📊 Blog Content Gold Mine",
            content: "Your recent blog post about 'Sustainable Business Practices' has \
                      generated 150% more qualified leads than average. The content resonates \
                      with C-suite executives who spend 40% more. I recommend creating a \
                      follow-up webinar series.",
            action: "Create Webinar Series",
            impact: "+45% lead quality",
            channels: &[ChannelId::Blog, ChannelId::Linkedin],
        },
        InsightTemplate {
            title: "⚡ Cross-Channel Synergy",
            content: "Users who engage with both your blog and Instagram are 4x more likely \
                      to convert. Only 15% of your audience overlaps across channels. \
                      Implementing cross-channel retargeting could increase conversions by 45%.",
            action: "Setup Retargeting",
            impact: "+45% conversions",
            channels: &[ChannelId::Blog, ChannelId::Instagram],
        },
    ]
}
