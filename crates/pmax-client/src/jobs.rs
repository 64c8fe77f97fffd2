//! Job queries and the job-wait helper.

use common::{routes, Job, JobIdList, JobStatus, ROLE_LOOKUP_FAILURE};
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::Client;

impl Client {
    /// Job ids on the array, optionally only those in `status`.
    pub async fn get_job_id_list(&self, symid: &str, status: Option<JobStatus>) -> Result<JobIdList> {
        self.check_array(symid)?;
        let url = self.url(routes::JOB_LIST, &[symid]);
        match status {
            Some(status) => self.get_query(url, &[("status", status.as_str())]).await,
            None => self.get(url).await,
        }
    }

    /// Fetch a job. Unisphere intermittently fails job reads with a role
    /// lookup error; that one failure is retried once.
    pub async fn get_job_by_id(&self, symid: &str, job_id: &str) -> Result<Job> {
        self.check_array(symid)?;
        let url = self.url(routes::JOB, &[symid, job_id]);
        match self.get(url.clone()).await {
            Err(err) if is_role_lookup_failure(&err) => {
                warn!(%job_id, error = %err, "role lookup failed reading job, retrying");
                self.get(url).await
            }
            other => other,
        }
    }

    /// Poll `job_id` until it is `SUCCEEDED` or `FAILED`.
    ///
    /// Polls at most `max_job_retries` times, sleeping `job_retry_interval`
    /// between polls. A `FAILED` job is returned, not turned into an error;
    /// see [`Client::wait_on_job_success`] for that.
    pub async fn wait_on_job_completion(&self, symid: &str, job_id: &str) -> Result<Job> {
        let attempts = self.config().max_job_retries;
        let interval = self.config().job_retry_interval;
        let mut last = JobStatus::Scheduled;

        for attempt in 1..=attempts {
            let job = self.get_job_by_id(symid, job_id).await?;
            if job.is_terminal() {
                info!(%job_id, status = %job.status, attempt, "job finished");
                return Ok(job);
            }
            debug!(%job_id, status = %job.status, attempt, "job still running");
            last = job.status;
            if attempt < attempts {
                tokio::time::sleep(interval).await;
            }
        }

        Err(ClientError::JobTimedOut {
            job_id: job_id.to_string(),
            status: last,
            attempts,
        })
    }

    /// Like [`Client::wait_on_job_completion`] but a `FAILED` job is an error.
    pub async fn wait_on_job_success(&self, symid: &str, job_id: &str) -> Result<Job> {
        let job = self.wait_on_job_completion(symid, job_id).await?;
        match job.status {
            JobStatus::Succeeded => Ok(job),
            _ => Err(ClientError::JobFailed(job.describe())),
        }
    }
}

fn is_role_lookup_failure(err: &ClientError) -> bool {
    err.api_message()
        .map_or(false, |m| m.contains(ROLE_LOOKUP_FAILURE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{ErrorEnvelope, ErrorKind};

    #[test]
    fn only_the_role_message_is_transient() {
        let body = serde_json::to_vec(&ErrorEnvelope::new(500, ROLE_LOOKUP_FAILURE)).unwrap();
        assert!(is_role_lookup_failure(&ClientError::from_response(500, &body)));

        let other = ClientError::Api {
            kind: ErrorKind::Server,
            status: 500,
            message: "Job not found".to_string(),
        };
        assert!(!is_role_lookup_failure(&other));
        assert!(!is_role_lookup_failure(&ClientError::JobFailed("x".into())));
    }
}
