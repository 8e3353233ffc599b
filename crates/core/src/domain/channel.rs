use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelId {
    Instagram,
    Linkedin,
    Blog,
    Google,
}

impl ChannelId {
    /// Catalog order. Comparison rows and insight scans follow it.
    pub const ALL: [ChannelId; 4] = [
        ChannelId::Instagram,
        ChannelId::Linkedin,
        ChannelId::Blog,
        ChannelId::Google,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Linkedin => "linkedin",
            Self::Blog => "blog",
            Self::Google => "google",
        }
    }

    pub fn channel(self) -> &'static Channel {
        match self {
            Self::Instagram => &INSTAGRAM,
            Self::Linkedin => &LINKEDIN,
            Self::Blog => &BLOG,
            Self::Google => &GOOGLE,
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| EngineError::UnknownChannel {
                id: needle.to_string(),
            })
    }
}

/// Static descriptor of a marketing channel.
#[derive(Debug, Clone, Serialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub primary_metric: &'static str,
    pub audience: &'static str,
    /// Baseline fraction of visits that convert, in [0, 1].
    pub conversion_rate: f64,
    pub avg_cost_per_click: f64,
}

impl Channel {
    pub fn label(&self) -> String {
        format!("{} {}", self.icon, self.name)
    }
}

pub fn catalog() -> impl Iterator<Item = &'static Channel> {
    ChannelId::ALL.into_iter().map(ChannelId::channel)
}

static INSTAGRAM: Channel = Channel {
    id: ChannelId::Instagram,
    name: "Instagram",
    icon: "📱",
    color: "#E1306C",
    primary_metric: "engagement",
    audience: "Gen Z & Millennials",
    conversion_rate: 0.045,
    avg_cost_per_click: 1.20,
};

static LINKEDIN: Channel = Channel {
    id: ChannelId::Linkedin,
    name: "LinkedIn",
    icon: "🔗",
    color: "#0077B5",
    primary_metric: "b2b_leads",
    audience: "C-Suite & Professionals",
    conversion_rate: 0.083,
    avg_cost_per_click: 3.50,
};

static BLOG: Channel = Channel {
    id: ChannelId::Blog,
    name: "Blog/Content",
    icon: "📝",
    color: "#6366F1",
    primary_metric: "organic_traffic",
    audience: "Industry Experts",
    conversion_rate: 0.062,
    avg_cost_per_click: 0.00,
};

static GOOGLE: Channel = Channel {
    id: ChannelId::Google,
    name: "Google Ads",
    icon: "🔍",
    color: "#4285F4",
    primary_metric: "search_volume",
    audience: "High-Intent Buyers",
    conversion_rate: 0.051,
    avg_cost_per_click: 2.80,
};
