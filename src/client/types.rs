//! DTOs mirrored from the backend's JSON responses.
//!
//! These are read-only copies; the backend is the source of truth. Timestamps
//! are kept as the strings the backend sends.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// `GET /stats`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub projects: u64,
    pub commands: u64,
    pub practices: u64,
    pub analyses: u64,
    pub operations: u64,
    pub repositories: u64,
}

/// A researched GitHub repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    pub score: f64,
    pub category: String,
    #[serde(default)]
    pub technology_stack: Vec<String>,
    #[serde(default)]
    pub ai_summary: Option<String>,
    pub last_analyzed: String,
    pub created_at: String,
    pub updated_at: String,
}

/// `GET /research/results`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchResults {
    pub total_projects: u64,
    pub results: Vec<Repository>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchState {
    Idle,
    Running,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

/// `GET /research/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchStatus {
    pub status: ResearchState,
    pub progress: f64,
    pub current_operation: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// Lifecycle shared by commands and operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

/// A `/colby` command issued against a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: String,
    pub repository: String,
    pub author: String,
    pub command: String,
    pub status: RunStatus,
    pub created_at: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub execution_time: Option<f64>,
}

/// `GET /colby/commands`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandsResponse {
    pub commands: Vec<Command>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeStatus {
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

/// Review outcome accepted by `PATCH /colby/best-practices/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeDecision {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPractice {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub technology: String,
    pub status: PracticeStatus,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub examples: Option<Vec<String>>,
    #[serde(default)]
    pub implementation_guide: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// `GET /colby/best-practices`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPracticesResponse {
    pub practices: Vec<BestPractice>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Research,
    Analysis,
    Command,
    Cleanup,
    #[serde(other)]
    Unknown,
}

/// A long-running backend operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub status: RunStatus,
    pub progress: f64,
    pub started_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// `GET /operations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationsResponse {
    pub operations: Vec<Operation>,
    pub total: u64,
}

/// `GET /repositories/{id}/analysis`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryAnalysis {
    pub analysis: String,
    #[serde(default)]
    pub details: Value,
}

/// Acknowledgement returned by control endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `POST /colby/execute`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteCommandResponse {
    pub message: String,
    pub command_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ExecuteCommandRequest<'a> {
    pub command: &'a str,
    pub repository: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct UpdatePracticeStatusRequest {
    pub status: PracticeDecision,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_type_field() {
        let op: Operation = serde_json::from_value(json!({
            "id": "op-1",
            "type": "analysis",
            "status": "running",
            "progress": 42.5,
            "started_at": "2024-05-01T10:00:00Z",
            "metadata": { "repo": "octo/hello" }
        }))
        .unwrap();

        assert_eq!(op.kind, OperationKind::Analysis);
        assert_eq!(op.status, RunStatus::Running);
        assert!(!op.status.is_finished());
        assert_eq!(op.metadata.unwrap()["repo"], "octo/hello");
    }

    #[test]
    fn test_unknown_status_does_not_fail_decoding() {
        let status: ResearchStatus = serde_json::from_value(json!({
            "status": "paused",
            "progress": 10,
            "current_operation": "waiting"
        }))
        .unwrap();

        assert_eq!(status.status, ResearchState::Unknown);
        assert!(status.started_at.is_none());
    }

    #[test]
    fn test_repository_optional_fields() {
        let repo: Repository = serde_json::from_value(json!({
            "id": "1",
            "name": "hello",
            "full_name": "octo/hello",
            "html_url": "https://github.com/octo/hello",
            "score": 8.7,
            "category": "tooling",
            "last_analyzed": "2024-05-01",
            "created_at": "2024-04-01",
            "updated_at": "2024-05-01"
        }))
        .unwrap();

        assert!(repo.description.is_none());
        assert!(repo.technology_stack.is_empty());
    }

    #[test]
    fn test_decision_serializes_lowercase() {
        let body = UpdatePracticeStatusRequest {
            status: PracticeDecision::Rejected,
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({ "status": "rejected" })
        );
    }
}
