//! Router construction.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;

use crate::handlers;
use crate::live_reload;
use crate::middleware::headers;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>, public_dir: &Path) -> Router {
    let mut router = Router::new().route("/api/manifest", get(handlers::manifest::get_manifest));

    if state.live_reload_enabled() {
        router = router.route("/ws/live-reload", get(live_reload::ws_handler));
    }

    router
        .merge(static_files::static_router(public_dir))
        .layer(
            ServiceBuilder::new()
                .layer(headers::no_cache_layer())
                .layer(headers::content_type_options_layer()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use cb_config::{DocumentationConfig, ProjectLayout};
    use cb_manifest::ManifestOptions;
    use cb_toolchain::Toolchain;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tower::ServiceExt;

    fn router(root: &Path) -> Router {
        let layout = ProjectLayout::new(root);
        let public_dir = layout.public_dir();
        let toolchain = Toolchain::new(
            layout,
            ManifestOptions::default(),
            DocumentationConfig::default(),
            false,
        );
        let state = Arc::new(AppState {
            toolchain: Arc::new(toolchain),
            live_reload: None,
        });
        create_router(state, &public_dir)
    }

    async fn fetch(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_manifest_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("public")).unwrap();
        fs::write(
            dir.path().join("public/config.json"),
            r#"{"files": {"/scripts/a.py": "./a.py"}}"#,
        )
        .unwrap();

        let (status, body) = fetch(router(dir.path()), "/api/manifest").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["files"]["/scripts/a.py"], "./a.py");
    }

    #[tokio::test]
    async fn test_manifest_endpoint_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("public")).unwrap();
        fs::write(dir.path().join("public/config.json"), "{ not json").unwrap();

        let (status, body) = fetch(router(dir.path()), "/api/manifest").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("error"));
    }

    #[tokio::test]
    async fn test_serves_public_files_without_caching() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("public/scripts")).unwrap();
        fs::write(dir.path().join("public/scripts/main.py"), "print('hi')").unwrap();

        let response = router(dir.path())
            .oneshot(
                Request::builder()
                    .uri("/scripts/main.py")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["cache-control"],
            "no-store, must-revalidate"
        );
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn test_unknown_path_falls_back_to_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("public")).unwrap();
        fs::write(dir.path().join("public/index.html"), "<html></html>").unwrap();

        let (status, body) = fetch(router(dir.path()), "/some/route").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html></html>");
    }

    #[tokio::test]
    async fn test_live_reload_route_absent_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("public")).unwrap();

        let (status, _) = fetch(router(dir.path()), "/ws/live-reload").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
