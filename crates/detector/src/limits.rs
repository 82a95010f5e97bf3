const MAX_JOBS: usize = 64;

/// Environment variable overriding the default worker count
pub const JOBS_ENV: &str = "INCLUDE_GARDENER_JOBS";

fn available_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn parse_jobs(raw: Option<&str>, default_value: usize) -> usize {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default_value)
        .clamp(1, MAX_JOBS)
}

/// Worker count used when none is configured explicitly
pub fn default_jobs() -> usize {
    let raw = std::env::var(JOBS_ENV).ok();
    parse_jobs(raw.as_deref(), available_jobs())
}
