use std::fmt;
use std::str::FromStr;

use super::StoreError;

/// Features placed in each template quarter.
pub const FEATURES_PER_QUARTER: usize = 2;

/// Feature colors, cycled by quarter position.
pub const PALETTE: [&str; 4] = ["#4CAF50", "#2196F3", "#FF9800", "#9C27B0"];

/// Built-in starter roadmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Web,
    Mobile,
    Api,
}

impl Template {
    pub const ALL: [Template; 3] = [Self::Web, Self::Mobile, Self::Api];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Mobile => "mobile",
            Self::Api => "api",
        }
    }

    /// Feature titles in roadmap order.
    pub fn titles(&self) -> &'static [&'static str] {
        match self {
            Self::Web => &[
                "Planning & Design",
                "Backend Setup",
                "Frontend Development",
                "Authentication System",
                "Payment Integration",
                "Testing & QA",
                "Deployment",
            ],
            Self::Mobile => &[
                "UI/UX Design",
                "Core Architecture",
                "User Authentication",
                "Main Features",
                "Push Notifications",
                "App Store Submission",
                "Marketing Launch",
            ],
            Self::Api => &[
                "API Specification",
                "Database Design",
                "Authentication & Auth",
                "Core Endpoints",
                "Documentation",
                "Testing Suite",
                "Monitoring Setup",
            ],
        }
    }

    /// Number of quarters the template fills.
    pub fn quarter_count(&self) -> usize {
        self.titles().len().div_ceil(FEATURES_PER_QUARTER)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Template {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web" => Ok(Self::Web),
            "mobile" => Ok(Self::Mobile),
            "api" => Ok(Self::Api),
            _ => Err(StoreError::UnknownTemplate(s.to_string())),
        }
    }
}
