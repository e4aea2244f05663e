//! Built-in demo jobs served when both the upstream source and the local
//! store come up empty, so the search experience never dead-ends on an
//! error page.

use crate::types::job::{JobRecord, JobSource};

/// A small, static result set. Ids are fixed so repeated fallbacks don't
/// look like new postings.
pub fn demo_jobs() -> Vec<JobRecord> {
    vec![
        JobRecord::new(
            JobSource::Manual,
            "demo-frontend-1",
            "Frontend Developer",
            "Build and maintain user-facing features for a hiring platform. \
             React experience required, TypeScript a plus.",
        )
        .with_company("Hirely Demo Co")
        .with_location("Remote"),
        JobRecord::new(
            JobSource::Manual,
            "demo-backend-1",
            "Backend Engineer",
            "Design APIs and data pipelines powering job search and \
             candidate matching.",
        )
        .with_company("Hirely Demo Co")
        .with_location("Remote"),
        JobRecord::new(
            JobSource::Manual,
            "demo-recruiter-1",
            "Technical Recruiter",
            "Source and screen engineering candidates, partnering with \
             hiring managers end to end.",
        )
        .with_company("Hirely Demo Co")
        .with_location("Oslo, Norway"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_set_is_nonempty_and_valid() {
        let jobs = demo_jobs();
        assert!(!jobs.is_empty());
        for job in &jobs {
            assert!(job.validate().is_ok());
            assert_eq!(job.source, JobSource::Manual);
        }
    }

    #[test]
    fn test_demo_external_ids_are_stable() {
        let a: Vec<_> = demo_jobs().into_iter().map(|j| j.external_id).collect();
        let b: Vec<_> = demo_jobs().into_iter().map(|j| j.external_id).collect();
        assert_eq!(a, b);
    }
}
