/// Segment between the deployment prefix and the job identifier.
pub const FIXITY_CHECK_STREAM: &str = "fixity_check:";

/// Broadcast topic for the run identified by `job_identifier`.
///
/// # Examples
///
/// ```
/// use fixity_check::core::stream_name;
///
/// assert_eq!(stream_name("prod:", "job-1"), "prod:fixity_check:job-1");
/// assert_eq!(stream_name("", "job-1"), "fixity_check:job-1");
/// ```
pub fn stream_name(prefix: &str, job_identifier: &str) -> String {
    format!("{prefix}{FIXITY_CHECK_STREAM}{job_identifier}")
}
