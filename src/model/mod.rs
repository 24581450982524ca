use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    High,
    Medium,
    Low,
    Other(String),
}

impl Severity {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Other(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Other(raw) => raw.as_str(),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Other(_) => "unknown",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
            Self::Other(_) => 3,
        }
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Risk {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
}

impl Risk {
    pub fn new(title: &str, description: &str, severity: Severity) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            severity,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub other: usize,
}

impl SeverityCounts {
    pub fn from_risks<'a, I>(risks: I) -> Self
    where
        I: IntoIterator<Item = &'a Risk>,
    {
        let mut counts = Self::default();
        for risk in risks {
            counts.add(&risk.severity);
        }
        counts
    }

    pub fn add(&mut self, severity: &Severity) {
        match severity {
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Other(_) => self.other += 1,
        }
    }

    pub fn merge(&mut self, other: &SeverityCounts) {
        self.high += other.high;
        self.medium += other.medium;
        self.low += other.low;
        self.other += other.other;
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low + self.other
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Terms,
    Cookie,
    Privacy,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Terms, PolicyKind::Cookie, PolicyKind::Privacy];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "terms" | "tos" | "terms-and-conditions" => Some(Self::Terms),
            "cookie" | "cookies" => Some(Self::Cookie),
            "privacy" => Some(Self::Privacy),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Terms => 0,
            Self::Cookie => 1,
            Self::Privacy => 2,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Terms => "terms",
            Self::Cookie => "cookie",
            Self::Privacy => "privacy",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Terms => "Terms & Conditions",
            Self::Cookie => "Cookie Policy",
            Self::Privacy => "Privacy Policy",
        }
    }

    pub fn tab_label(self) -> &'static str {
        match self {
            Self::Terms => "Terms",
            Self::Cookie => "Cookies",
            Self::Privacy => "Privacy",
        }
    }

    pub fn analyze_segment(self) -> &'static str {
        match self {
            Self::Terms => "analyze",
            Self::Cookie => "analyze-cookie",
            Self::Privacy => "analyze-privacy",
        }
    }

    pub fn upload_segment(self) -> Option<&'static str> {
        match self {
            Self::Terms => None,
            Self::Cookie => Some("cookie"),
            Self::Privacy => Some("privacy"),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

// Older records carry a single `risks`/`summary` pair instead of the `terms_*` fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub terms_text: Option<String>,
    pub terms_summary: Option<String>,
    pub terms_risks: Option<Vec<Risk>>,
    pub cookie_text: Option<String>,
    pub cookie_summary: Option<String>,
    pub cookie_risks: Option<Vec<Risk>>,
    pub privacy_text: Option<String>,
    pub privacy_summary: Option<String>,
    pub privacy_risks: Option<Vec<Risk>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risks: Option<Vec<Risk>>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.as_str()).filter(|s| !s.trim().is_empty())
}

impl Company {
    pub fn document(&self, kind: PolicyKind) -> Option<&str> {
        let text = match kind {
            PolicyKind::Terms => self.terms_text.as_ref(),
            PolicyKind::Cookie => self.cookie_text.as_ref(),
            PolicyKind::Privacy => self.privacy_text.as_ref(),
        };
        non_blank(text)
    }

    pub fn has_document(&self, kind: PolicyKind) -> bool {
        self.document(kind).is_some()
    }

    pub fn summary(&self, kind: PolicyKind) -> Option<&str> {
        match kind {
            PolicyKind::Terms => {
                non_blank(self.terms_summary.as_ref()).or_else(|| non_blank(self.summary.as_ref()))
            }
            PolicyKind::Cookie => non_blank(self.cookie_summary.as_ref()),
            PolicyKind::Privacy => non_blank(self.privacy_summary.as_ref()),
        }
    }

    pub fn risks(&self, kind: PolicyKind) -> &[Risk] {
        let risks = match kind {
            PolicyKind::Terms => self.terms_risks.as_deref().or(self.risks.as_deref()),
            PolicyKind::Cookie => self.cookie_risks.as_deref(),
            PolicyKind::Privacy => self.privacy_risks.as_deref(),
        };
        risks.unwrap_or(&[])
    }

    pub fn all_risks(&self) -> impl Iterator<Item = &Risk> {
        PolicyKind::ALL
            .into_iter()
            .flat_map(move |kind| self.risks(kind).iter())
    }

    pub fn severity_counts(&self) -> SeverityCounts {
        SeverityCounts::from_risks(self.all_risks())
    }

    pub fn total_risks(&self) -> usize {
        PolicyKind::ALL
            .into_iter()
            .map(|kind| self.risks(kind).len())
            .sum()
    }

    pub fn initial(&self) -> String {
        self.name
            .trim()
            .chars()
            .next()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "?".to_string())
    }

    pub fn icon_url(&self) -> Option<&str> {
        non_blank(self.icon_url.as_ref())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: ChatRole::User,
            content: content.to_string(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSource {
    pub company_id: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub policy_type: Option<String>,
    #[serde(default)]
    pub policy_label: Option<String>,
}

impl ChatSource {
    pub fn chip_label(&self) -> String {
        let policy = self
            .policy_label
            .as_deref()
            .or(self.policy_type.as_deref())
            .filter(|p| !p.trim().is_empty());
        match policy {
            Some(policy) => format!("{} · {}", self.company_name, policy),
            None => self.company_name.clone(),
        }
    }
}
