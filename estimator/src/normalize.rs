const ROOT_PREFIX: &str = "root.";
const JOB_COUNTS_SUFFIX: &str = ".jobCounts";

/// Turns a raw observation name into the queue identifier shown to users.
///
/// `root.<queue>.jobCounts` becomes `<queue>`. Anything else loses a leading
/// `root.` and a trailing `.jobCounts`, if present.
pub fn normalize_queue_name(raw: &str) -> String {
    if let Some(segment) = raw
        .strip_prefix(ROOT_PREFIX)
        .and_then(|rest| rest.strip_suffix(JOB_COUNTS_SUFFIX))
    {
        if !segment.is_empty() && !segment.contains('.') {
            return segment.to_string();
        }
    }

    let name = raw.strip_prefix(ROOT_PREFIX).unwrap_or(raw);
    name.strip_suffix(JOB_COUNTS_SUFFIX).unwrap_or(name).to_string()
}
