//! Tasks
//!
//! Managers and admins assign work; assignees see and move their own tasks.

use super::{Access, Action, FeatureModule, Governed, ModulePolicy};
use crate::auth::Capability;
use crate::db::{Record, keys};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_id, validate_optional_text, validate_required_text,
};
use shared::error::AppResult;
use shared::models::{Task, TaskCreate, TaskStatus, TaskUpdate};
use shared::util::now_millis;

impl Record for Task {
    const STORAGE_KEY: &'static str = keys::TASKS;
    const RESOURCE: &'static str = "Task";

    fn id(&self) -> i64 {
        self.id
    }

    fn subject_id(&self) -> Option<i64> {
        Some(self.assignee_id)
    }
}

trait TaskRules {
    fn validate(&self) -> AppResult<()>;
}

impl TaskRules for Task {
    fn validate(&self) -> AppResult<()> {
        validate_required_text(&self.title, "title", MAX_NAME_LEN)?;
        validate_optional_text(&self.description, "description", MAX_NOTE_LEN)?;
        validate_id(self.assignee_id, "assignee_id")
    }
}

impl Governed for Task {
    type Create = TaskCreate;
    type Update = TaskUpdate;

    const POLICY: ModulePolicy = ModulePolicy {
        name: "tasks",
        view: Access::OwnerOr(Capability::ManageTasks),
        create: Access::Capability(Capability::ManageTasks),
        edit: Access::OwnerOr(Capability::ManageTasks),
        delete: Access::Capability(Capability::ManageTasks),
    };

    fn build(id: i64, now: i64, input: TaskCreate) -> AppResult<Self> {
        let task = Task {
            id,
            title: input.title.trim().to_string(),
            description: input.description,
            assignee_id: input.assignee_id,
            priority: input.priority.unwrap_or_default(),
            status: TaskStatus::Todo,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        };
        task.validate()?;
        Ok(task)
    }

    fn apply(&mut self, patch: TaskUpdate, now: i64) -> AppResult<()> {
        let mut next = self.clone();
        if let Some(title) = patch.title {
            next.title = title.trim().to_string();
        }
        if patch.description.is_some() {
            next.description = patch.description;
        }
        if let Some(assignee) = patch.assignee_id {
            next.assignee_id = assignee;
        }
        if let Some(priority) = patch.priority {
            next.priority = priority;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if patch.due_date.is_some() {
            next.due_date = patch.due_date;
        }
        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }
}

impl FeatureModule<Task> {
    /// Move a task across the board
    ///
    /// Same access as editing, so an assignee may move its own task.
    pub fn set_task_status(&self, id: i64, status: TaskStatus) -> AppResult<Task> {
        let result = self.try_mutate(id, Task::POLICY.edit, Action::Edit, |task, _| {
            task.status = status;
            task.updated_at = now_millis();
            Ok(())
        });
        self.report(Action::Edit, result)
    }

    /// Visible tasks in one column
    pub fn tasks_with_status(&self, status: TaskStatus) -> AppResult<Vec<Task>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|t| t.status == status)
            .collect())
    }
}
