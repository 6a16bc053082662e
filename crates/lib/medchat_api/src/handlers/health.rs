//! Liveness endpoint.

use axum::Json;

use crate::models::HealthResponse;

/// `GET /api/health`: process is up; reports the crate version.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: medchat_core::version().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_version() {
        let Json(resp) = health_handler().await;
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.version, medchat_core::version());
    }
}
