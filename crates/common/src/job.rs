use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Created,
    Scheduled,
    Validating,
    Validated,
    Running,
    Succeeded,
    Failed,
    RetrievingPicture,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Succeeded and failed both end the wait; the caller decides which it got.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Created => "CREATED",
            JobStatus::Scheduled => "SCHEDULED",
            JobStatus::Validating => "VALIDATING",
            JobStatus::Validated => "VALIDATED",
            JobStatus::Running => "RUNNING",
            JobStatus::Succeeded => "SUCCEEDED",
            JobStatus::Failed => "FAILED",
            JobStatus::RetrievingPicture => "RETRIEVING_PICTURE",
            JobStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "execution_order")]
    pub execution_order: u32,
    pub description: String,
}

/// Handle for an asynchronous array operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "jobId")]
    pub job_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "symmetrixId", default)]
    pub symmetrix_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub username: String,
    #[serde(rename = "last_modified_date", default)]
    pub last_modified_date: String,
    #[serde(rename = "scheduled_date", default)]
    pub scheduled_date: String,
    #[serde(rename = "completed_date", default)]
    pub completed_date: String,
    #[serde(rename = "task", default)]
    pub tasks: Vec<Task>,
    #[serde(rename = "resourceLink", default)]
    pub resource_link: String,
    #[serde(default)]
    pub result: String,
}

impl Job {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// One-line summary for logs and error messages.
    pub fn describe(&self) -> String {
        format!(
            "job {} ({}) status {} result '{}' resource {}",
            self.job_id, self.name, self.status, self.result, self.resource_link
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobIdList {
    #[serde(rename = "jobId", default)]
    pub job_ids: Vec<String>,
}

/// Either the synchronous result of an operation or the job running it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobOr<T> {
    Job(Job),
    Done(T),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_status_strings_decode() {
        let status: JobStatus = serde_json::from_value(json!("PAUSED")).unwrap();
        assert_eq!(status, JobStatus::Unknown);
        assert!(!status.is_terminal());
    }

    #[test]
    fn terminal_statuses() {
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Scheduled.is_terminal());
    }

    #[test]
    fn job_or_prefers_job_shape() {
        let value = json!({"jobId": "J1", "status": "RUNNING"});
        let parsed: JobOr<serde_json::Value> = serde_json::from_value(value).unwrap();
        assert!(matches!(parsed, JobOr::Job(ref j) if j.job_id == "J1"));
    }
}
