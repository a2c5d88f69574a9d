//! Goal domain model.
//!
//! Goals form a tree: top-level goals decompose into weighted sub-goals.
//! The tree is stored flat; a goal only knows its parent's id, and its
//! children are "the goals whose `parent_id` is this goal's id".
//!
//! A leaf's completion is set by the user. A goal with sub-goals always
//! carries the weighted average of its children's completion (see
//! [`weighted_completion`]).

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest completion value, meaning "done".
pub const MAX_COMPLETION: u8 = 100;

/// Storage and interchange format for deadline and creation dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Weight of a goal's completion within its parent's average.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionWeight {
    #[default]
    Low = 1,
    Medium = 2,
    High = 3,
}

impl CompletionWeight {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" | "1" => Some(Self::Low),
            "medium" | "2" => Some(Self::Medium),
            "high" | "3" => Some(Self::High),
            _ => None,
        }
    }

    /// Numeric weight used in the parent's average.
    pub const fn value(self) -> u32 {
        self as u32
    }

    pub const fn from_value(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            _ => None,
        }
    }
}

/// Coarse progress bands, used to colour completion in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionBand {
    Low,
    LowerMiddle,
    UpperMiddle,
    High,
    Complete,
}

impl CompletionBand {
    pub const fn from_completion(completion: u8) -> Self {
        match completion {
            0..=24 => Self::Low,
            25..=49 => Self::LowerMiddle,
            50..=74 => Self::UpperMiddle,
            75..=99 => Self::High,
            _ => Self::Complete,
        }
    }
}

/// One node of the goal tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier, assigned by the store on insert
    pub id: Uuid,
    /// Display name (may be empty)
    pub name: String,
    /// Free text description (may be empty)
    pub description: String,
    /// Name of the attached image asset; empty when there is none
    #[serde(default)]
    pub image_name: String,
    /// Degree of completion, 0 to 100
    pub completion: u8,
    /// Weight within the parent's completion average
    #[serde(default)]
    pub weight: CompletionWeight,
    /// Day by which the goal should be reached
    pub deadline: Option<NaiveDate>,
    /// Day the goal was created
    pub created_on: NaiveDate,
    /// Parent goal; `None` for top-level goals
    pub parent_id: Option<Uuid>,
}

impl Goal {
    /// Create a new leaf goal with the given name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            image_name: String::new(),
            completion: 0,
            weight: CompletionWeight::default(),
            deadline: None,
            created_on: Local::now().date_naive(),
            parent_id: None,
        }
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_weight(mut self, weight: CompletionWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_completion(mut self, completion: u8) -> Self {
        self.completion = completion;
        self
    }

    pub fn with_image(mut self, image_name: impl Into<String>) -> Self {
        self.image_name = image_name.into();
        self
    }

    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn has_image(&self) -> bool {
        !self.image_name.is_empty()
    }

    pub fn band(&self) -> CompletionBand {
        CompletionBand::from_completion(self.completion)
    }

    /// Last instant of the deadline day (23:59:59).
    ///
    /// A deadline covers the whole day, so "due today" is not yet overdue.
    pub fn deadline_end(&self) -> Option<NaiveDateTime> {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)?;
        self.deadline.map(|d| d.and_time(end_of_day))
    }

    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.deadline_end().is_some_and(|end| end < now)
    }

    /// Validate the structural invariants the store relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.completion > MAX_COMPLETION {
            return Err(format!(
                "Completion must be between 0 and {MAX_COMPLETION}, got {}",
                self.completion
            ));
        }
        Ok(())
    }

    /// Check user input for a new or edited goal.
    ///
    /// Returns every problem found rather than stopping at the first one.
    /// Stricter than [`Goal::validate`]: the store accepts empty names,
    /// interactive entry does not.
    pub fn check_input(&self, today: NaiveDate) -> Vec<String> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("Name is empty".to_string());
        }
        if self.description.trim().is_empty() {
            problems.push("Description is empty".to_string());
        }
        if self.deadline.is_some_and(|d| d < today) {
            problems.push("Deadline is in the past".to_string());
        }
        if let Err(e) = self.validate() {
            problems.push(e);
        }
        problems
    }
}

/// Weighted average of child completions, truncated towards zero.
///
/// Returns `None` when there is nothing to aggregate.
pub fn weighted_completion<I>(children: I) -> Option<u8>
where
    I: IntoIterator<Item = (u8, CompletionWeight)>,
{
    let (weighted_sum, total_weight) = children
        .into_iter()
        .fold((0u64, 0u64), |(sum, total), (completion, weight)| {
            let w = u64::from(weight.value());
            (sum + u64::from(completion) * w, total + w)
        });

    if total_weight == 0 {
        return None;
    }

    u8::try_from(weighted_sum / total_weight).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_creation() {
        let goal = Goal::new("Run a marathon", "Finish in under four hours");
        assert_eq!(goal.name, "Run a marathon");
        assert_eq!(goal.completion, 0);
        assert_eq!(goal.weight, CompletionWeight::Low);
        assert!(goal.is_top_level());
        assert!(!goal.has_image());
        assert!(goal.deadline.is_none());
    }

    #[test]
    fn test_weight_parsing() {
        assert_eq!(CompletionWeight::from_str("HIGH"), Some(CompletionWeight::High));
        assert_eq!(CompletionWeight::from_str("2"), Some(CompletionWeight::Medium));
        assert_eq!(CompletionWeight::from_str("urgent"), None);
        assert_eq!(CompletionWeight::from_value(3), Some(CompletionWeight::High));
        assert_eq!(CompletionWeight::from_value(0), None);
        assert_eq!(CompletionWeight::Medium.value(), 2);
    }

    #[test]
    fn test_weighted_completion() {
        let children = [(40, CompletionWeight::Low), (80, CompletionWeight::High)];
        assert_eq!(weighted_completion(children), Some(70));

        let children = [(40, CompletionWeight::Low), (0, CompletionWeight::High)];
        assert_eq!(weighted_completion(children), Some(10));

        let children = [
            (40, CompletionWeight::Low),
            (0, CompletionWeight::High),
            (100, CompletionWeight::Medium),
        ];
        assert_eq!(weighted_completion(children), Some(40));
    }

    #[test]
    fn test_weighted_completion_truncates() {
        // (33*1 + 34*1) / 2 = 33.5
        let children = [(33, CompletionWeight::Low), (34, CompletionWeight::Low)];
        assert_eq!(weighted_completion(children), Some(33));
    }

    #[test]
    fn test_weighted_completion_empty() {
        assert_eq!(weighted_completion(std::iter::empty()), None);
    }

    #[test]
    fn test_completion_bands() {
        assert_eq!(CompletionBand::from_completion(0), CompletionBand::Low);
        assert_eq!(CompletionBand::from_completion(25), CompletionBand::LowerMiddle);
        assert_eq!(CompletionBand::from_completion(74), CompletionBand::UpperMiddle);
        assert_eq!(CompletionBand::from_completion(99), CompletionBand::High);
        assert_eq!(CompletionBand::from_completion(100), CompletionBand::Complete);
    }

    #[test]
    fn test_deadline_covers_whole_day() {
        let day = NaiveDate::from_ymd_opt(2030, 6, 1).unwrap();
        let goal = Goal::new("g", "d").with_deadline(day);

        let noon = day.and_hms_opt(12, 0, 0).unwrap();
        assert!(!goal.is_overdue(noon));

        let next_morning = day.succ_opt().unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(goal.is_overdue(next_morning));

        assert!(!Goal::new("g", "d").is_overdue(next_morning));
    }

    #[test]
    fn test_validate_completion_range() {
        assert!(Goal::new("g", "d").with_completion(100).validate().is_ok());
        assert!(Goal::new("g", "d").with_completion(101).validate().is_err());
    }

    #[test]
    fn test_check_input_collects_all_problems() {
        let today = NaiveDate::from_ymd_opt(2030, 6, 1).unwrap();
        let goal = Goal::new("", " ").with_deadline(NaiveDate::from_ymd_opt(2030, 5, 31).unwrap());

        let problems = goal.check_input(today);
        assert_eq!(problems.len(), 3);

        let ok = Goal::new("Name", "Desc").with_deadline(today);
        assert!(ok.check_input(today).is_empty());
    }
}
