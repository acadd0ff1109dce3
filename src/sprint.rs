use chrono::{Duration, Local, NaiveDate};
use uuid::Uuid;

use crate::models::{
    Block, BlockKind, DailyPlan, FocusArea, RoleType, Sprint, SprintStatus, Task,
};

// --- Day-template tables ---

struct DayTemplate {
    focus: FocusArea,
    topics: &'static [&'static str],
}

const fn day(focus: FocusArea, topics: &'static [&'static str]) -> DayTemplate {
    DayTemplate { focus, topics }
}

// SDE: a full week when there is a week to spend, a condensed three days,
// otherwise a single review day.
const SDE_WEEK: &[DayTemplate] = &[
    day(FocusArea::Dsa, &["Arrays", "Strings"]),
    day(FocusArea::Dsa, &["Linked Lists", "Stacks & Queues"]),
    day(FocusArea::Dsa, &["Trees", "Graphs"]),
    day(FocusArea::Dsa, &["Dynamic Programming"]),
    day(FocusArea::SystemDesign, &["Scalability", "Caching"]),
    day(FocusArea::Behavioral, &["STAR Stories", "Leadership Principles"]),
    day(FocusArea::Review, &["Weak Areas", "Mock Questions"]),
];
const SDE_SHORT: &[DayTemplate] = &[
    day(FocusArea::Dsa, &["Top Patterns"]),
    day(FocusArea::SystemDesign, &["Core Concepts"]),
    day(FocusArea::Review, &["Weak Areas"]),
];

const SDET_WEEK: &[DayTemplate] = &[
    day(FocusArea::Dsa, &["Arrays", "Strings"]),
    day(FocusArea::Dsa, &["Hash Maps", "Sliding Window"]),
    day(FocusArea::SystemDesign, &["Test Automation Frameworks", "CI/CD Pipelines"]),
    day(FocusArea::SystemDesign, &["API Testing", "Mocking & Stubs"]),
    day(FocusArea::Behavioral, &["Quality Advocacy", "Cross-team Collaboration"]),
    day(FocusArea::Mock, &["Automation Round"]),
    day(FocusArea::Review, &["Weak Areas"]),
];
const SDET_SHORT: &[DayTemplate] = &[
    day(FocusArea::Dsa, &["Top Patterns"]),
    day(FocusArea::SystemDesign, &["Test Automation Frameworks"]),
    day(FocusArea::Review, &["Weak Areas"]),
];

const DATA_WEEK: &[DayTemplate] = &[
    day(FocusArea::Dsa, &["SQL", "Window Functions"]),
    day(FocusArea::Dsa, &["Data Wrangling", "Pandas"]),
    day(FocusArea::SystemDesign, &["Data Pipelines", "Warehousing"]),
    day(FocusArea::SystemDesign, &["Feature Engineering", "Model Evaluation"]),
    day(FocusArea::Behavioral, &["Project Deep Dives"]),
    day(FocusArea::Mock, &["Case Study Round"]),
    day(FocusArea::Review, &["Weak Areas"]),
];
const DATA_SHORT: &[DayTemplate] = &[
    day(FocusArea::Dsa, &["SQL"]),
    day(FocusArea::SystemDesign, &["Data Pipelines"]),
    day(FocusArea::Review, &["Weak Areas"]),
];

const PM_WEEK: &[DayTemplate] = &[
    day(FocusArea::SystemDesign, &["Product Sense", "Prioritization"]),
    day(FocusArea::SystemDesign, &["Metrics", "A/B Testing"]),
    day(FocusArea::Behavioral, &["Stakeholder Stories", "Conflict Resolution"]),
    day(FocusArea::Behavioral, &["Leadership Principles"]),
    day(FocusArea::Mock, &["Product Case Round"]),
    day(FocusArea::Mock, &["Execution Round"]),
    day(FocusArea::Review, &["Weak Areas"]),
];
const PM_SHORT: &[DayTemplate] = &[
    day(FocusArea::SystemDesign, &["Product Sense"]),
    day(FocusArea::Behavioral, &["Stakeholder Stories"]),
    day(FocusArea::Review, &["Weak Areas"]),
];

const DEVOPS_WEEK: &[DayTemplate] = &[
    day(FocusArea::Dsa, &["Scripting", "Shell One-liners"]),
    day(FocusArea::SystemDesign, &["Networking", "DNS & Load Balancing"]),
    day(FocusArea::SystemDesign, &["Containers", "Kubernetes"]),
    day(FocusArea::SystemDesign, &["CI/CD", "Infrastructure as Code"]),
    day(FocusArea::Behavioral, &["Incident Stories"]),
    day(FocusArea::Mock, &["Troubleshooting Round"]),
    day(FocusArea::Review, &["Weak Areas"]),
];
const DEVOPS_SHORT: &[DayTemplate] = &[
    day(FocusArea::SystemDesign, &["Networking"]),
    day(FocusArea::SystemDesign, &["Containers"]),
    day(FocusArea::Review, &["Weak Areas"]),
];

const FRONTEND_WEEK: &[DayTemplate] = &[
    day(FocusArea::Dsa, &["Arrays", "Strings"]),
    day(FocusArea::Dsa, &["DOM Algorithms"]),
    day(FocusArea::SystemDesign, &["Component Architecture", "State Management"]),
    day(FocusArea::SystemDesign, &["Web Performance", "Rendering"]),
    day(FocusArea::Behavioral, &["Design Collaboration"]),
    day(FocusArea::Mock, &["UI Coding Round"]),
    day(FocusArea::Review, &["Weak Areas"]),
];
const FRONTEND_SHORT: &[DayTemplate] = &[
    day(FocusArea::Dsa, &["Top Patterns"]),
    day(FocusArea::SystemDesign, &["Component Architecture"]),
    day(FocusArea::Review, &["Weak Areas"]),
];

// Unknown role categories get one generic review day.
const REVIEW_ONLY: &[DayTemplate] = &[day(FocusArea::Review, &["General Review"])];

fn day_templates(role_type: RoleType, days_remaining: u32) -> &'static [DayTemplate] {
    let (week, short) = match role_type {
        RoleType::Sde => (SDE_WEEK, SDE_SHORT),
        RoleType::Sdet => (SDET_WEEK, SDET_SHORT),
        RoleType::Data => (DATA_WEEK, DATA_SHORT),
        RoleType::Pm => (PM_WEEK, PM_SHORT),
        RoleType::DevOps => (DEVOPS_WEEK, DEVOPS_SHORT),
        RoleType::Frontend => (FRONTEND_WEEK, FRONTEND_SHORT),
        RoleType::Other => return REVIEW_ONLY,
    };
    match days_remaining {
        d if d >= 7 => week,
        3..=6 => short,
        _ => REVIEW_ONLY,
    }
}

// --- Task templates ---

// Exactly four task descriptions per focus; <topic> is the day's first
// topic, <topics> all of them.
fn task_templates(focus: FocusArea) -> [&'static str; 4] {
    match focus {
        FocusArea::Dsa => [
            "Solve 2 problems on <topic>",
            "Review pattern: <topics>",
            "Practice timed coding (30 min)",
            "Review solutions and optimize",
        ],
        FocusArea::SystemDesign => [
            "Study <topic> fundamentals",
            "Design exercise: <topics>",
            "Read one real-world case study",
            "Sketch the architecture and note tradeoffs",
        ],
        FocusArea::Behavioral => [
            "Draft a STAR story on <topic>",
            "Practice answers out loud: <topics>",
            "Research the company and recent news",
            "Record one answer and review it",
        ],
        FocusArea::Review => [
            "Revisit notes on <topic>",
            "Redo missed problems: <topics>",
            "Light timed practice (30 min)",
            "Prepare questions for the interviewer",
        ],
        FocusArea::Mock => [
            "Run a full mock: <topic>",
            "Self-review the mock: <topics>",
            "Drill the weakest area found",
            "One timed practice round",
        ],
    }
}

// --- Generation ---

/// Build a study sprint for an interview. An interview today or in the past
/// still yields a one-day plan; days past the end of the hand-authored
/// template become generic review days, so the output always spans exactly
/// `days_remaining` days starting from `today`.
pub fn generate_sprint(
    application_id: i64,
    interview_date: NaiveDate,
    role_type: RoleType,
    today: NaiveDate,
) -> Sprint {
    let days_remaining = (interview_date - today).num_days().max(1) as u32;
    let template = day_templates(role_type, days_remaining);

    let daily_plans: Vec<DailyPlan> = (0..days_remaining)
        .map(|i| {
            let (focus, topics) = match template.get(i as usize) {
                Some(t) => (t.focus, t.topics.iter().map(|s| s.to_string()).collect()),
                None => (FocusArea::Review, vec!["General Review".to_string()]),
            };
            build_day(i + 1, today + Duration::days(i64::from(i)), focus, &topics)
        })
        .collect();

    Sprint {
        id: Uuid::new_v4().to_string(),
        application_id,
        interview_date,
        role_type,
        total_days: days_remaining,
        status: SprintStatus::Active,
        daily_plans,
        created_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

fn build_day(day: u32, date: NaiveDate, focus: FocusArea, topics: &[String]) -> DailyPlan {
    let first_topic = topics.first().cloned().unwrap_or_else(|| "General".to_string());
    let all_topics = if topics.is_empty() {
        "General".to_string()
    } else {
        topics.join(", ")
    };

    let mut tasks: Vec<Task> = task_templates(focus)
        .iter()
        .map(|tpl| Task {
            id: Uuid::new_v4().to_string(),
            description: tpl.replace("<topic>", &first_topic).replace("<topics>", &all_topics),
            completed: false,
            category: first_topic.clone(),
        })
        .collect();

    // Morning takes the larger half, evening the rest.
    let evening_tasks = tasks.split_off(tasks.len().div_ceil(2));
    let blocks = vec![
        Block {
            id: Uuid::new_v4().to_string(),
            kind: BlockKind::Morning,
            duration: "2 hours".to_string(),
            tasks,
        },
        Block {
            id: Uuid::new_v4().to_string(),
            kind: BlockKind::Evening,
            duration: "1.5 hours".to_string(),
            tasks: evening_tasks,
        },
    ];

    DailyPlan { day, date, focus, blocks }
}

// --- Completion state ---

/// Flip one task by id. Block/day/sprint completion is derived from task
/// state, so callers follow up with [`recompute_status`].
pub fn toggle_task(sprint: &mut Sprint, task_id: &str) -> bool {
    for day in &mut sprint.daily_plans {
        for block in &mut day.blocks {
            for task in &mut block.tasks {
                if task.id == task_id {
                    task.completed = !task.completed;
                    return true;
                }
            }
        }
    }
    false
}

pub fn recompute_status(sprint: &mut Sprint, today: NaiveDate) {
    sprint.status = if sprint.is_complete() {
        SprintStatus::Completed
    } else if sprint.interview_date < today {
        SprintStatus::Expired
    } else {
        SprintStatus::Active
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()
    }

    #[test]
    fn test_sde_sprint_ten_days_out() {
        let sprint = generate_sprint(1, today() + Duration::days(10), RoleType::Sde, today());

        assert_eq!(sprint.total_days, 10);
        assert_eq!(sprint.daily_plans.len(), 10);
        assert_eq!(sprint.status, SprintStatus::Active);

        // First seven days come from the weekly curriculum.
        assert_eq!(sprint.daily_plans[0].focus, FocusArea::Dsa);
        assert!(sprint.daily_plans[0].blocks[0].tasks[0].description.contains("Arrays"));
        assert_eq!(sprint.daily_plans[0].blocks[0].tasks[0].category, "Arrays");
        assert_eq!(sprint.daily_plans[6].focus, FocusArea::Review);

        // Days past the template are filler review days.
        for plan in &sprint.daily_plans[7..] {
            assert_eq!(plan.focus, FocusArea::Review);
            assert_eq!(plan.blocks[0].tasks[0].category, "General Review");
        }
    }

    #[test]
    fn test_interview_today_yields_single_review_day() {
        let sprint = generate_sprint(1, today(), RoleType::Sde, today());
        assert_eq!(sprint.total_days, 1);
        assert_eq!(sprint.daily_plans.len(), 1);
        assert_eq!(sprint.daily_plans[0].focus, FocusArea::Review);
    }

    #[test]
    fn test_interview_in_the_past_still_yields_one_day() {
        let sprint = generate_sprint(1, today() - Duration::days(5), RoleType::Sde, today());
        assert_eq!(sprint.total_days, 1);
    }

    #[test]
    fn test_condensed_tier_for_short_runway() {
        for days in 3..=6 {
            let sprint = generate_sprint(1, today() + Duration::days(days), RoleType::Sde, today());
            assert_eq!(sprint.daily_plans[0].focus, FocusArea::Dsa);
            assert!(sprint.daily_plans[0].blocks[0].tasks[0].description.contains("Top Patterns"));
        }
        // Two days out is below the condensed tier.
        let sprint = generate_sprint(1, today() + Duration::days(2), RoleType::Sde, today());
        assert_eq!(sprint.daily_plans[0].focus, FocusArea::Review);
    }

    #[test]
    fn test_unknown_role_falls_back_to_generic_review() {
        let sprint = generate_sprint(1, today() + Duration::days(10), RoleType::Other, today());
        assert_eq!(sprint.total_days, 10);
        for plan in &sprint.daily_plans {
            assert_eq!(plan.focus, FocusArea::Review);
        }
    }

    #[test]
    fn test_role_specific_curricula_differ() {
        let date = today() + Duration::days(7);
        let pm = generate_sprint(1, date, RoleType::Pm, today());
        assert_eq!(pm.daily_plans[0].focus, FocusArea::SystemDesign);
        assert!(pm.daily_plans[0].blocks[0].tasks[0].description.contains("Product Sense"));

        let sdet = generate_sprint(1, date, RoleType::Sdet, today());
        assert!(sdet.daily_plans[2].blocks[0].tasks[0].description.contains("Test Automation"));
    }

    #[test]
    fn test_day_dates_are_consecutive_from_today() {
        let sprint = generate_sprint(1, today() + Duration::days(4), RoleType::Data, today());
        for (i, plan) in sprint.daily_plans.iter().enumerate() {
            assert_eq!(plan.day, i as u32 + 1);
            assert_eq!(plan.date, today() + Duration::days(i as i64));
        }
    }

    #[test]
    fn test_every_day_has_two_blocks_of_four_tasks() {
        let sprint = generate_sprint(1, today() + Duration::days(9), RoleType::DevOps, today());
        for plan in &sprint.daily_plans {
            assert_eq!(plan.blocks.len(), 2);
            assert_eq!(plan.blocks[0].kind, BlockKind::Morning);
            assert_eq!(plan.blocks[1].kind, BlockKind::Evening);
            assert_eq!(plan.blocks[0].tasks.len(), 2);
            let total: usize = plan.blocks.iter().map(|b| b.tasks.len()).sum();
            assert_eq!(total, 4);
        }
    }

    #[test]
    fn test_toggle_recomputes_bottom_up() {
        let mut sprint = generate_sprint(1, today() + Duration::days(1), RoleType::Sde, today());
        assert_eq!(sprint.total_days, 1);

        let task_ids: Vec<String> = sprint.daily_plans[0]
            .blocks
            .iter()
            .flat_map(|b| b.tasks.iter().map(|t| t.id.clone()))
            .collect();

        for id in &task_ids {
            assert!(toggle_task(&mut sprint, id));
        }
        recompute_status(&mut sprint, today());
        assert!(sprint.daily_plans[0].is_complete());
        assert_eq!(sprint.status, SprintStatus::Completed);

        // Untoggling one task reopens the sprint.
        assert!(toggle_task(&mut sprint, &task_ids[0]));
        recompute_status(&mut sprint, today());
        assert_eq!(sprint.status, SprintStatus::Active);

        assert!(!toggle_task(&mut sprint, "no-such-task"));
    }

    #[test]
    fn test_incomplete_sprint_past_interview_expires() {
        let mut sprint = generate_sprint(1, today() + Duration::days(3), RoleType::Sde, today());
        recompute_status(&mut sprint, today() + Duration::days(4));
        assert_eq!(sprint.status, SprintStatus::Expired);
    }

    #[test]
    fn test_ids_are_unique_within_a_sprint() {
        let sprint = generate_sprint(1, today() + Duration::days(7), RoleType::Sde, today());
        let mut ids: Vec<&str> = sprint
            .daily_plans
            .iter()
            .flat_map(|d| d.blocks.iter())
            .flat_map(|b| b.tasks.iter().map(|t| t.id.as_str()).chain(std::iter::once(b.id.as_str())))
            .collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }
}
