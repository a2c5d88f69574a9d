//! Goal CLI commands.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::cli::context::CliContext;
use crate::cli::output::{
    format_deadline, list_table, output, render_list, short_id, styled_completion, truncate, CommandOutput,
};
use crate::cli::tree::{collect_rows, render_rows, TreeRow};
use crate::domain::errors::DomainError;
use crate::domain::models::{CompletionWeight, Config, Goal, DATE_FORMAT};
use crate::domain::ports::GoalRepository;
use crate::services::{deadline_policy, goal_traversal};

#[derive(Args, Debug)]
pub struct GoalArgs {
    #[command(subcommand)]
    pub command: GoalCommands,
}

#[derive(Subcommand, Debug)]
pub enum GoalCommands {
    /// Create a new goal
    Add {
        /// Goal name
        name: String,
        /// Goal description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Parent goal ID (or unique prefix)
        #[arg(short, long)]
        parent: Option<String>,
        /// Deadline (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        deadline: Option<NaiveDate>,
        /// Weight within the parent (low, medium, high)
        #[arg(short, long, default_value = "low", value_parser = parse_weight)]
        weight: CompletionWeight,
        /// Initial completion (0-100)
        #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
        completion: u8,
        /// Image file to attach
        #[arg(short, long)]
        image: Option<PathBuf>,
        /// Push earlier parent deadlines out to this goal's deadline
        #[arg(long)]
        extend_parents: bool,
        /// Skip the name/description/deadline input check
        #[arg(long)]
        no_check: bool,
    },
    /// List top-level goals, or the sub-goals of a goal
    List {
        /// Parent goal ID (or unique prefix)
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Show goal details
    Show {
        /// Goal ID (or unique prefix)
        id: String,
    },
    /// Render the whole goal tree
    Tree,
    /// List goals without sub-goals
    Leaves,
    /// Edit a goal
    Edit {
        /// Goal ID (or unique prefix)
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// New deadline (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date, conflicts_with = "clear_deadline")]
        deadline: Option<NaiveDate>,
        /// Remove the deadline
        #[arg(long)]
        clear_deadline: bool,
        #[arg(short, long, value_parser = parse_weight)]
        weight: Option<CompletionWeight>,
        /// New completion; only for goals without sub-goals
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
        completion: Option<u8>,
        /// Image file to attach, replacing the current one
        #[arg(short, long, conflicts_with = "clear_image")]
        image: Option<PathBuf>,
        /// Remove the attached image
        #[arg(long)]
        clear_image: bool,
        /// Push earlier parent deadlines out to the new deadline
        #[arg(long)]
        extend_parents: bool,
        /// Pull later sub-goal deadlines in to the new deadline
        #[arg(long)]
        clamp_children: bool,
        /// Skip the name/description/deadline input check
        #[arg(long)]
        no_check: bool,
    },
    /// Set the completion of a goal without sub-goals
    Progress {
        /// Goal ID (or unique prefix)
        id: String,
        /// Completion (0-100)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        value: u8,
    },
    /// Recalculate a goal's completion from its sub-goals
    Recalc {
        /// Goal ID (or unique prefix)
        id: String,
    },
    /// Delete a goal and all of its sub-goals
    Delete {
        /// Goal ID (or unique prefix)
        id: String,
    },
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

pub fn parse_weight(s: &str) -> Result<CompletionWeight, String> {
    CompletionWeight::from_str(s).ok_or_else(|| format!("invalid weight '{s}': use low, medium or high"))
}

#[derive(Debug, serde::Serialize)]
pub struct GoalOutput {
    pub id: String,
    pub name: String,
    pub description: String,
    pub completion: u8,
    pub weight: String,
    pub deadline: Option<String>,
    pub created_on: String,
    pub image_name: Option<String>,
    pub parent_id: Option<String>,
}

impl From<&Goal> for GoalOutput {
    fn from(goal: &Goal) -> Self {
        Self {
            id: goal.id.to_string(),
            name: goal.name.clone(),
            description: goal.description.clone(),
            completion: goal.completion,
            weight: goal.weight.as_str().to_string(),
            deadline: goal.deadline.map(|d| d.format(DATE_FORMAT).to_string()),
            created_on: goal.created_on.format(DATE_FORMAT).to_string(),
            image_name: goal.has_image().then(|| goal.image_name.clone()),
            parent_id: goal.parent_id.map(|id| id.to_string()),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct GoalListOutput {
    pub goals: Vec<GoalOutput>,
    pub sub_goal_counts: Vec<u64>,
    pub total: usize,
}

impl CommandOutput for GoalListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "done", "weight", "deadline", "sub-goals"]);
        for (goal, subs) in self.goals.iter().zip(&self.sub_goal_counts) {
            table.add_row(vec![
                short_id(&goal.id).to_string(),
                truncate(&goal.name, 40),
                styled_completion(goal.completion).to_string(),
                goal.weight.clone(),
                goal.deadline.clone().unwrap_or_else(|| "-".to_string()),
                subs.to_string(),
            ]);
        }
        render_list("goal", &table, self.total)
    }
}

#[derive(Debug, serde::Serialize)]
pub struct GoalDetailOutput {
    pub goal: GoalOutput,
    pub path: Vec<String>,
    pub sub_goals: usize,
    pub overdue: bool,
}

impl CommandOutput for GoalDetailOutput {
    fn to_human(&self) -> String {
        let goal = &self.goal;
        let mut lines = vec![
            format!("Goal: {}", goal.name),
            format!("ID: {}", goal.id),
            format!("Completion: {}", styled_completion(goal.completion)),
            format!("Weight: {}", goal.weight),
            format!(
                "Deadline: {}{}",
                goal.deadline.as_deref().unwrap_or("-"),
                if self.overdue { " (overdue)" } else { "" }
            ),
            format!("Created: {}", goal.created_on),
            format!("Description: {}", goal.description),
        ];
        if let Some(image) = &goal.image_name {
            lines.push(format!("Image: {image}"));
        }
        if !self.path.is_empty() {
            lines.push(format!("Path: {}", self.path.join(" > ")));
        }
        lines.push(format!("Sub-goals: {}", self.sub_goals));
        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct GoalTreeOutput {
    pub goals: Vec<TreeRow>,
}

impl CommandOutput for GoalTreeOutput {
    fn to_human(&self) -> String {
        if self.goals.is_empty() {
            return "No goals found.".to_string();
        }
        render_rows(&self.goals)
    }
}

#[derive(Debug, serde::Serialize)]
pub struct GoalActionOutput {
    pub success: bool,
    pub message: String,
    pub goal: Option<GoalOutput>,
}

impl CommandOutput for GoalActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

fn action(message: String, goal: Option<&Goal>) -> GoalActionOutput {
    GoalActionOutput {
        success: true,
        message,
        goal: goal.map(GoalOutput::from),
    }
}

fn check_input(goal: &Goal) -> Result<()> {
    let problems = goal.check_input(Local::now().date_naive());
    if problems.is_empty() {
        return Ok(());
    }
    bail!("{} (use --no-check to skip)", problems.join("; "))
}

fn describe(goals: &[Goal]) -> String {
    goals
        .iter()
        .map(|g| format!("'{}' ({})", g.name, format_deadline(g)))
        .collect::<Vec<_>>()
        .join(", ")
}

async fn read_image(path: &Path) -> Result<(String, Vec<u8>)> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid image path: {}", path.display()))?
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok((file_name, bytes))
}

/// Refuse or repair parents due before `deadline`.
async fn reconcile_ancestors(ctx: &CliContext, parent_id: Uuid, deadline: NaiveDate, extend: bool) -> Result<()> {
    let conflicts = deadline_policy::ancestor_conflicts(&ctx.service, parent_id, deadline).await?;
    if conflicts.is_empty() {
        return Ok(());
    }
    if !extend {
        bail!(
            "Deadline {} is later than parent deadline(s) {}; use --extend-parents to move them",
            deadline.format(DATE_FORMAT),
            describe(&conflicts)
        );
    }
    deadline_policy::extend_ancestor_deadlines(&ctx.service, parent_id, deadline).await?;
    Ok(())
}

pub async fn execute(args: GoalArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = CliContext::open(config).await?;
    let service = &ctx.service;

    match args.command {
        GoalCommands::Add {
            name,
            description,
            parent,
            deadline,
            weight,
            completion,
            image,
            extend_parents,
            no_check,
        } => {
            let parent_id = match parent {
                Some(p) => Some(ctx.goal(&p).await?.id),
                None => None,
            };

            let mut draft = Goal::new(name, description).with_weight(weight).with_completion(completion);
            draft.deadline = deadline;
            if !no_check {
                check_input(&draft)?;
            }
            // Read the image before touching the store
            let image = match image {
                Some(path) => Some(read_image(&path).await?),
                None => None,
            };

            if let (Some(pid), Some(d)) = (parent_id, deadline) {
                reconcile_ancestors(&ctx, pid, d, extend_parents).await?;
            }

            let id = service.insert(draft, parent_id).await?;
            if let Some((file_name, bytes)) = image {
                service.attach_image(id, &file_name, &bytes).await?;
            }

            let goal = service.get_goal(id).await?;
            output(&action(format!("Goal created: {}", goal.id), Some(&goal)), json_mode);
        }

        GoalCommands::List { parent } => {
            let goals = match parent {
                Some(p) => service.get_children(ctx.goal(&p).await?.id).await?,
                None => service.top_level_goals().await?,
            };
            let mut sub_goal_counts = Vec::with_capacity(goals.len());
            for goal in &goals {
                sub_goal_counts.push(service.repository().count_children(goal.id).await?);
            }
            let out = GoalListOutput {
                total: goals.len(),
                goals: goals.iter().map(GoalOutput::from).collect(),
                sub_goal_counts,
            };
            output(&out, json_mode);
        }

        GoalCommands::Show { id } => {
            let goal = ctx.goal(&id).await?;
            let mut path: Vec<String> = service.ancestors(goal.id).await?.into_iter().map(|g| g.name).collect();
            path.reverse();
            let sub_goals = service.get_children(goal.id).await?.len();

            let out = GoalDetailOutput {
                overdue: goal.is_overdue(Local::now().naive_local()),
                goal: GoalOutput::from(&goal),
                path,
                sub_goals,
            };
            output(&out, json_mode);
        }

        GoalCommands::Tree => {
            let out = GoalTreeOutput {
                goals: collect_rows(service).await?,
            };
            output(&out, json_mode);
        }

        GoalCommands::Leaves => {
            let leaves = service.collect_leaves().await?;
            let out = GoalListOutput {
                total: leaves.len(),
                sub_goal_counts: vec![0; leaves.len()],
                goals: leaves.iter().map(GoalOutput::from).collect(),
            };
            output(&out, json_mode);
        }

        GoalCommands::Edit {
            id,
            name,
            description,
            deadline,
            clear_deadline,
            weight,
            completion,
            image,
            clear_image,
            extend_parents,
            clamp_children,
            no_check,
        } => {
            let existing = ctx.goal(&id).await?;
            let has_children = service.has_children(existing.id).await?;
            if completion.is_some() && has_children {
                return Err(DomainError::CompletionIsDerived(existing.id).into());
            }

            let mut changes = existing.clone();
            if let Some(name) = name {
                changes.name = name;
            }
            if let Some(description) = description {
                changes.description = description;
            }
            if let Some(weight) = weight {
                changes.weight = weight;
            }
            if let Some(completion) = completion {
                changes.completion = completion;
            }
            if deadline.is_some() || clear_deadline {
                changes.deadline = deadline;
            }
            if !no_check {
                // An unchanged deadline may already have passed
                let mut checked = changes.clone();
                if deadline.is_none() {
                    checked.deadline = None;
                }
                check_input(&checked)?;
            }
            let image = match image {
                Some(path) => Some(read_image(&path).await?),
                None => None,
            };

            if let Some(d) = deadline {
                if let Some(pid) = existing.parent_id {
                    reconcile_ancestors(&ctx, pid, d, extend_parents).await?;
                }
                let late = deadline_policy::descendant_conflicts(service, existing.id, d).await?;
                if !late.is_empty() && !clamp_children {
                    bail!(
                        "Sub-goal deadline(s) {} are later than {}; use --clamp-children to move them",
                        describe(&late),
                        d.format(DATE_FORMAT)
                    );
                }
            }

            let mut updated = service.update(existing.id, &changes).await?;
            if let (Some(d), true) = (deadline, clamp_children) {
                deadline_policy::clamp_descendant_deadlines(service, existing.id, d).await?;
            }
            if let Some((file_name, bytes)) = image {
                service.attach_image(existing.id, &file_name, &bytes).await?;
                updated = service.get_goal(existing.id).await?;
            } else if clear_image {
                service.detach_image(existing.id).await?;
                updated = service.get_goal(existing.id).await?;
            }

            output(&action(format!("Goal updated: {}", updated.id), Some(&updated)), json_mode);
        }

        GoalCommands::Progress { id, value } => {
            let goal = ctx.goal(&id).await?;
            service.set_leaf_completion(goal.id, value).await?;
            let goal = service.get_goal(goal.id).await?;
            output(
                &action(format!("Goal '{}' is {}% complete", goal.name, goal.completion), Some(&goal)),
                json_mode,
            );
        }

        GoalCommands::Recalc { id } => {
            let goal = ctx.goal(&id).await?;
            let message = if service.recalculate_completion(goal.id).await? {
                "Completion recalculated"
            } else {
                "Goal has no sub-goals; nothing to recalculate"
            };
            let goal = service.get_goal(goal.id).await?;
            output(&action(format!("{message}: {}%", goal.completion), Some(&goal)), json_mode);
        }

        GoalCommands::Delete { id } => {
            let goal = ctx.goal(&id).await?;
            let removed = goal_traversal::subtree_post_order(service.repository(), goal.clone()).await?.len();
            service.delete(goal.id).await?;
            output(
                &action(
                    format!("Deleted goal '{}' ({removed} goal(s) removed)", goal.name),
                    Some(&goal),
                ),
                json_mode,
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_and_weight() {
        assert_eq!(parse_date("2031-02-28"), Ok(NaiveDate::from_ymd_opt(2031, 2, 28).unwrap()));
        assert!(parse_date("28.02.2031").is_err());
        assert_eq!(parse_weight("high"), Ok(CompletionWeight::High));
        assert!(parse_weight("huge").is_err());
    }

    #[tokio::test]
    async fn test_list_output_counts_sub_goals() {
        use crate::adapters::memory::{InMemoryGoalRepository, InMemoryImageStore};
        use crate::services::GoalService;
        use std::sync::Arc;

        console::set_colors_enabled(false);
        let service = GoalService::new(Arc::new(InMemoryGoalRepository::new()), Arc::new(InMemoryImageStore::new()));
        let root = service.insert(Goal::new("Root", ""), None).await.unwrap();
        service.insert(Goal::new("A", ""), Some(root)).await.unwrap();
        service.insert(Goal::new("B", ""), Some(root)).await.unwrap();

        let goals = service.top_level_goals().await.unwrap();
        let mut sub_goal_counts = Vec::new();
        for goal in &goals {
            sub_goal_counts.push(service.repository().count_children(goal.id).await.unwrap());
        }
        let out = GoalListOutput {
            total: goals.len(),
            goals: goals.iter().map(GoalOutput::from).collect(),
            sub_goal_counts,
        };

        assert_eq!(out.sub_goal_counts, vec![2]);
        let human = out.to_human();
        assert!(human.starts_with("1 goal:"));
        assert!(human.contains("Root"));
    }
}
