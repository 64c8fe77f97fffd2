//! Server-side job engine.
//!
//! A job starts `SCHEDULED`. Every odd-numbered poll reports its terminal
//! status and every even-numbered poll reports its initial status again, so a
//! caller polling the same id sees the states alternate. Callers stop once
//! they see the terminal status they want.

use common::{Job, JobStatus, Task};
use std::collections::BTreeMap;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

pub const JOB_IN_PROGRESS: &str = "Job in progress";
pub const JOB_SUCCEEDED: &str = "Job completed successfully";
pub const JOB_FAILED: &str = "Job failed: induced error";

#[derive(Debug, Clone)]
pub struct MockJob {
    pub job: Job,
    pub initial: JobStatus,
    pub terminal: JobStatus,
    pub polls: u32,
}

impl MockJob {
    fn poll(&mut self) -> Job {
        self.polls += 1;
        if self.polls % 2 == 1 {
            self.job.status = self.terminal;
            self.job.completed_date = now();
            self.job.result = if self.terminal == JobStatus::Failed {
                JOB_FAILED.to_string()
            } else {
                JOB_SUCCEEDED.to_string()
            };
        } else {
            self.job.status = self.initial;
            self.job.completed_date.clear();
            self.job.result = JOB_IN_PROGRESS.to_string();
        }
        self.job.last_modified_date = now();
        self.job.clone()
    }
}

#[derive(Debug, Default)]
pub struct JobEngine {
    jobs: BTreeMap<String, MockJob>,
    next_id: u64,
}

impl JobEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a job and return it in its created (`SCHEDULED`) state.
    pub fn create(
        &mut self,
        symmetrix_id: &str,
        name: &str,
        resource_link: &str,
        initial: JobStatus,
        terminal: JobStatus,
    ) -> Job {
        self.next_id += 1;
        let job_id = format!("{}{:06}", OffsetDateTime::now_utc().unix_timestamp(), self.next_id);
        let job = Job {
            job_id: job_id.clone(),
            name: name.to_string(),
            symmetrix_id: symmetrix_id.to_string(),
            status: JobStatus::Scheduled,
            username: "mock".to_string(),
            last_modified_date: now(),
            scheduled_date: now(),
            completed_date: String::new(),
            tasks: vec![Task {
                execution_order: 1,
                description: name.to_string(),
            }],
            resource_link: resource_link.to_string(),
            result: String::new(),
        };
        debug!(job = %job_id, %name, ?terminal, "job created");
        self.jobs.insert(
            job_id,
            MockJob {
                job: job.clone(),
                initial,
                terminal,
                polls: 0,
            },
        );
        job
    }

    /// Advance the job one step and return what the caller observes.
    pub fn poll(&mut self, job_id: &str) -> Option<Job> {
        self.jobs.get_mut(job_id).map(MockJob::poll)
    }

    pub fn peek(&self, job_id: &str) -> Option<&MockJob> {
        self.jobs.get(job_id)
    }

    pub fn ids(&self, status: Option<JobStatus>) -> Vec<String> {
        self.jobs
            .values()
            .filter(|j| status.map_or(true, |s| j.job.status == s))
            .map(|j| j.job.job_id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

pub(crate) fn now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_job_is_scheduled() {
        let mut engine = JobEngine::new();
        let job = engine.create("000197900046", "op", "", JobStatus::Running, JobStatus::Succeeded);
        assert_eq!(job.status, JobStatus::Scheduled);
        assert_eq!(engine.ids(None), vec![job.job_id]);
    }

    #[test]
    fn polls_alternate_between_terminal_and_initial() {
        let mut engine = JobEngine::new();
        let job = engine.create("000197900046", "op", "", JobStatus::Running, JobStatus::Succeeded);

        let first = engine.poll(&job.job_id).unwrap();
        assert_eq!(first.status, JobStatus::Succeeded);
        assert_eq!(first.result, JOB_SUCCEEDED);
        assert!(!first.completed_date.is_empty());

        let second = engine.poll(&job.job_id).unwrap();
        assert_eq!(second.status, JobStatus::Running);
        assert_eq!(second.result, JOB_IN_PROGRESS);

        let third = engine.poll(&job.job_id).unwrap();
        assert_eq!(third.status, JobStatus::Succeeded);
    }

    #[test]
    fn failed_jobs_report_failure_text() {
        let mut engine = JobEngine::new();
        let job = engine.create("000197900046", "op", "", JobStatus::Running, JobStatus::Failed);
        let polled = engine.poll(&job.job_id).unwrap();
        assert_eq!(polled.status, JobStatus::Failed);
        assert_eq!(polled.result, JOB_FAILED);
    }

    #[test]
    fn unknown_job() {
        let mut engine = JobEngine::new();
        assert!(engine.poll("nope").is_none());
    }
}
