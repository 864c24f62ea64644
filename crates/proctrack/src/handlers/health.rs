use axum::http::StatusCode;

use crate::api::ROOT_MESSAGE;

/// GET /
pub async fn root() -> &'static str {
    ROOT_MESSAGE
}

pub async fn livez() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_root() {
        assert_eq!(root().await, "Process Management Server is running");
    }

    #[tokio::test]
    async fn test_livez() {
        let (status, body) = livez().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
