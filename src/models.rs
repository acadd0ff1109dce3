use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Pipeline columns, in board order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "applied" => Some(ApplicationStatus::Applied),
            "shortlisted" => Some(ApplicationStatus::Shortlisted),
            "interview" | "interviewing" => Some(ApplicationStatus::Interview),
            "offer" => Some(ApplicationStatus::Offer),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub company: String,
    pub role: Option<String>,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub applied_on: Option<NaiveDate>,
    pub created_at: String,
    pub updated_at: String,
}

/// Role category a sprint curriculum is authored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleType {
    Sde,
    Sdet,
    Data,
    Pm,
    DevOps,
    Frontend,
    Other,
}

impl RoleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::Sde => "SDE",
            RoleType::Sdet => "SDET",
            RoleType::Data => "Data",
            RoleType::Pm => "PM",
            RoleType::DevOps => "DevOps",
            RoleType::Frontend => "Frontend",
            RoleType::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sde" => Some(RoleType::Sde),
            "sdet" => Some(RoleType::Sdet),
            "data" => Some(RoleType::Data),
            "pm" => Some(RoleType::Pm),
            "devops" => Some(RoleType::DevOps),
            "frontend" => Some(RoleType::Frontend),
            "other" => Some(RoleType::Other),
            _ => None,
        }
    }

    /// Map a free-text role label ("Senior SDET", "ML Engineer", ...) onto a
    /// curriculum category. Most specific keywords are checked first so
    /// "SDET" never falls through to the SDE bucket.
    pub fn from_role_label(label: &str) -> Self {
        let l = label.to_lowercase();
        let has = |kw: &str| l.contains(kw);

        if has("sdet") || has("test") || has("qa") || has("quality") {
            RoleType::Sdet
        } else if has("data") || has("ml") || has("machine learning") || has("analyst") || has("scientist") {
            RoleType::Data
        } else if has("product") || l == "pm" {
            RoleType::Pm
        } else if has("devops") || has("sre") || has("site reliability") || has("infrastructure") || has("platform") {
            RoleType::DevOps
        } else if has("frontend") || has("front end") || has("front-end") || has("ui engineer") {
            RoleType::Frontend
        } else if has("sde") || has("swe") || has("software") || has("engineer") || has("developer") || has("backend") {
            RoleType::Sde
        } else {
            RoleType::Other
        }
    }
}

/// Study category for one day of a sprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusArea {
    Dsa,
    SystemDesign,
    Behavioral,
    Review,
    Mock,
}

impl FocusArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusArea::Dsa => "DSA",
            FocusArea::SystemDesign => "System Design",
            FocusArea::Behavioral => "Behavioral",
            FocusArea::Review => "Review",
            FocusArea::Mock => "Mock",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    Active,
    Completed,
    Expired,
}

impl SprintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SprintStatus::Active => "active",
            SprintStatus::Completed => "completed",
            SprintStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(SprintStatus::Active),
            "completed" => Some(SprintStatus::Completed),
            "expired" => Some(SprintStatus::Expired),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Morning,
    Evening,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Morning => "morning",
            BlockKind::Evening => "evening",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub completed: bool,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub kind: BlockKind,
    pub duration: String, // display string, e.g. "1.5 hours"
    pub tasks: Vec<Task>,
}

impl Block {
    /// A block is complete when every task in it is checked off.
    pub fn is_complete(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|t| t.completed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPlan {
    pub day: u32, // 1-based
    pub date: NaiveDate,
    pub focus: FocusArea,
    pub blocks: Vec<Block>,
}

impl DailyPlan {
    pub fn is_complete(&self) -> bool {
        !self.blocks.is_empty() && self.blocks.iter().all(|b| b.is_complete())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
    pub id: String,
    pub application_id: i64,
    pub interview_date: NaiveDate,
    pub role_type: RoleType,
    pub total_days: u32,
    pub status: SprintStatus,
    pub daily_plans: Vec<DailyPlan>,
    pub created_at: String,
}

impl Sprint {
    pub fn is_complete(&self) -> bool {
        !self.daily_plans.is_empty() && self.daily_plans.iter().all(|d| d.is_complete())
    }

    /// (completed tasks, total tasks) across the whole sprint.
    pub fn progress(&self) -> (usize, usize) {
        let mut done = 0;
        let mut total = 0;
        for day in &self.daily_plans {
            for block in &day.blocks {
                total += block.tasks.len();
                done += block.tasks.iter().filter(|t| t.completed).count();
            }
        }
        (done, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_round_trip() {
        for status in ApplicationStatus::ALL {
            assert_eq!(ApplicationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApplicationStatus::parse(" Interview "), Some(ApplicationStatus::Interview));
        assert_eq!(ApplicationStatus::parse("ghosted"), None);
    }

    #[test]
    fn test_role_type_from_label() {
        assert_eq!(RoleType::from_role_label("SDET"), RoleType::Sdet);
        assert_eq!(RoleType::from_role_label("Senior QA Engineer"), RoleType::Sdet);
        assert_eq!(RoleType::from_role_label("ML Engineer"), RoleType::Data);
        assert_eq!(RoleType::from_role_label("Data Scientist"), RoleType::Data);
        assert_eq!(RoleType::from_role_label("Product Manager"), RoleType::Pm);
        assert_eq!(RoleType::from_role_label("DevOps Engineer"), RoleType::DevOps);
        assert_eq!(RoleType::from_role_label("Frontend Developer"), RoleType::Frontend);
        assert_eq!(RoleType::from_role_label("SDE2"), RoleType::Sde);
        assert_eq!(RoleType::from_role_label("Backend Engineer"), RoleType::Sde);
        assert_eq!(RoleType::from_role_label("Chef"), RoleType::Other);
    }

    #[test]
    fn test_completion_is_derived_bottom_up() {
        let task = |completed| Task {
            id: "t".to_string(),
            description: "x".to_string(),
            completed,
            category: "General".to_string(),
        };
        let mut block = Block {
            id: "b".to_string(),
            kind: BlockKind::Morning,
            duration: "1 hour".to_string(),
            tasks: vec![task(true), task(false)],
        };
        assert!(!block.is_complete());
        block.tasks[1].completed = true;
        assert!(block.is_complete());

        // Empty containers never count as complete.
        let empty = Block {
            id: "b2".to_string(),
            kind: BlockKind::Evening,
            duration: "1 hour".to_string(),
            tasks: vec![],
        };
        assert!(!empty.is_complete());
    }
}
