//! Automation rules created from the workflow form.
//!
//! Workflows are stored and toggled only; nothing evaluates the trigger
//! expressions.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::util::generate_id;

use super::entities::Workflow;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("trigger expression is empty")]
    EmptyTrigger,
    #[error("action expression is empty")]
    EmptyAction,
    #[error("no workflow with id {0}")]
    UnknownWorkflow(String),
}

/// Form input for a new workflow.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDraft {
    pub trigger: String,
    pub action: String,
}

impl WorkflowDraft {
    pub fn new(trigger: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            action: action.into(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct WorkflowBook {
    workflows: Vec<Workflow>,
}

impl WorkflowBook {
    pub fn create(&mut self, draft: WorkflowDraft) -> Result<&Workflow, WorkflowError> {
        let trigger = draft.trigger.trim();
        let action = draft.action.trim();
        if trigger.is_empty() {
            return Err(WorkflowError::EmptyTrigger);
        }
        if action.is_empty() {
            return Err(WorkflowError::EmptyAction);
        }

        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        self.workflows.push(Workflow {
            id: generate_id("wf"),
            trigger: trigger.to_string(),
            action: action.to_string(),
            active: true,
            executions: 0,
            created_at,
        });
        Ok(&self.workflows[self.workflows.len() - 1])
    }

    /// Flips the active flag and returns the new state.
    pub fn toggle(&mut self, id: &str) -> Result<bool, WorkflowError> {
        let workflow = self
            .workflows
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| WorkflowError::UnknownWorkflow(id.to_string()))?;
        workflow.active = !workflow.active;
        Ok(workflow.active)
    }

    pub fn remove(&mut self, id: &str) -> Result<Workflow, WorkflowError> {
        let idx = self
            .workflows
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| WorkflowError::UnknownWorkflow(id.to_string()))?;
        Ok(self.workflows.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.id == id)
    }

    pub fn active(&self) -> impl Iterator<Item = &Workflow> {
        self.workflows.iter().filter(|w| w.active)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workflow> {
        self.workflows.iter()
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_trims_and_activates() {
        let mut book = WorkflowBook::default();
        let workflow = book
            .create(WorkflowDraft::new("  doh > 90 ", "markdown 20%"))
            .unwrap();
        assert_eq!(workflow.trigger, "doh > 90");
        assert!(workflow.active);
        assert_eq!(workflow.executions, 0);
        assert!(OffsetDateTime::parse(&workflow.created_at, &Rfc3339).is_ok());
    }

    #[test]
    fn empty_expressions_are_rejected() {
        let mut book = WorkflowBook::default();
        assert_eq!(
            book.create(WorkflowDraft::new("   ", "notify")).unwrap_err(),
            WorkflowError::EmptyTrigger
        );
        assert_eq!(
            book.create(WorkflowDraft::new("score < 40", "")).unwrap_err(),
            WorkflowError::EmptyAction
        );
        assert!(book.is_empty());
    }

    #[test]
    fn toggle_and_remove() {
        let mut book = WorkflowBook::default();
        let id = book
            .create(WorkflowDraft::new("velocity < 1", "donate"))
            .unwrap()
            .id
            .clone();
        book.create(WorkflowDraft::new("stock > 500", "bulk sell")).unwrap();

        assert_eq!(book.toggle(&id), Ok(false));
        assert_eq!(book.active().count(), 1);
        assert_eq!(book.toggle(&id), Ok(true));
        assert_eq!(book.get(&id).map(|w| w.trigger.as_str()), Some("velocity < 1"));
        let triggers: Vec<_> = book.iter().map(|w| w.trigger.as_str()).collect();
        assert_eq!(triggers, ["velocity < 1", "stock > 500"]);

        let removed = book.remove(&id).unwrap();
        assert_eq!(removed.action, "donate");
        assert_eq!(book.len(), 1);
        assert!(book.get(&id).is_none());
        assert_eq!(
            book.toggle(&id),
            Err(WorkflowError::UnknownWorkflow(id.clone()))
        );
    }
}
