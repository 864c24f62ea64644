use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const COMMIT: &str = match option_env!("PROCTRACK_BUILD_COMMIT") {
    Some(c) => c,
    None => "unknown",
};
pub const BUILD_DATE: &str = match option_env!("PROCTRACK_BUILD_DATE") {
    Some(d) => d,
    None => "unknown",
};

/// Version, commit and build date on one line.
pub fn version_string() -> String {
    format!("{VERSION} (commit: {COMMIT}, built: {BUILD_DATE})")
}

/// Body of `GET /version`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub build_date: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            commit: COMMIT,
            build_date: BUILD_DATE,
        }
    }
}
