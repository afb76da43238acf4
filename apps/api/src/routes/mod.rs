pub mod catalog;
pub mod health;
pub mod reports;

use axum::{routing::get, routing::post, Router};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalog
        .route("/api/v1/tests", get(catalog::handle_list_tests))
        .route("/api/v1/tests/:mode", get(catalog::handle_get_test))
        .route("/api/v1/stimulus", get(catalog::handle_stimulus))
        // Reports
        .route(
            "/api/v1/reports/word-association",
            post(reports::handle_word_association),
        )
        .route(
            "/api/v1/reports/situation-reaction",
            post(reports::handle_situation_reaction),
        )
        .route("/api/v1/reports/ppdt", post(reports::handle_ppdt))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::ReportKind;
    use crate::capture::{CaptureError, ImageCapture};
    use crate::catalog::{NO_RESPONSE, SITUATIONS, WORDS};
    use crate::errors::ANALYSIS_FAILED_MESSAGE;
    use crate::reports::test_support::FakeAnalyzer;
    use crate::reports::ReportRequester;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    struct FixedStimulus(Option<&'static str>);

    #[async_trait]
    impl ImageCapture for FixedStimulus {
        async fn capture(&self) -> Result<String, CaptureError> {
            self.0.map(str::to_string).ok_or(CaptureError::Missing)
        }
    }

    fn app(analyzer: FakeAnalyzer) -> Router {
        build_router(AppState {
            requester: ReportRequester::new(Arc::new(analyzer)),
            capture: Arc::new(FixedStimulus(Some(PNG))),
        })
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(json) => Body::from(json.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn answers(prompts: &[&str], responses: [&str; 5]) -> Value {
        let answers: Vec<Value> = prompts
            .iter()
            .zip(responses)
            .map(|(p, r)| json!({ "prompt": p, "response": r }))
            .collect();
        json!({ "answers": answers })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(FakeAnalyzer::default()), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "assessment-api");
    }

    #[tokio::test]
    async fn test_catalog_lists_three_tests() {
        let (status, body) = send(app(FakeAnalyzer::default()), "GET", "/api/v1/tests", None).await;
        assert_eq!(status, StatusCode::OK);
        let modes: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["mode"].as_str().unwrap())
            .collect();
        assert_eq!(modes, ["word-association", "situation-reaction", "ppdt"]);
    }

    #[tokio::test]
    async fn test_descriptor_by_mode() {
        let (status, body) = send(
            app(FakeAnalyzer::default()),
            "GET",
            "/api/v1/tests/word-association",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["shape"]["kind"], "item-loop");
        assert_eq!(body["shape"]["seconds_per_item"], 22);
        assert_eq!(body["shape"]["items"][0], "friend");

        let (status, body) =
            send(app(FakeAnalyzer::default()), "GET", "/api/v1/tests/tat", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_stimulus_returns_data_uri() {
        let (status, body) =
            send(app(FakeAnalyzer::default()), "GET", "/api/v1/stimulus", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["imageDataUri"], PNG);

        let missing = build_router(AppState {
            requester: ReportRequester::new(Arc::new(FakeAnalyzer::default())),
            capture: Arc::new(FixedStimulus(None)),
        });
        let (status, body) = send(missing, "GET", "/api/v1/stimulus", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "CAPTURE_ERROR");
    }

    #[tokio::test]
    async fn test_word_association_report() {
        let (status, body) = send(
            app(FakeAnalyzer::default()),
            "POST",
            "/api/v1/reports/word-association",
            Some(answers(
                &WORDS,
                ["Friends help.", "", "Courage wins.", NO_RESPONSE, "Games teach."],
            )),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "word-association");
        assert!(body["generatedAt"].is_string());
        let analyses = body["report"]["wordAnalyses"].as_array().unwrap();
        assert_eq!(analyses.len(), 5);
        assert_eq!(analyses[1]["sentence"], NO_RESPONSE);
        assert_eq!(analyses[1]["report"]["emotion"], "None");
    }

    #[tokio::test]
    async fn test_situation_reaction_all_blank_is_insufficient() {
        let (status, body) = send(
            app(FakeAnalyzer::default()),
            "POST",
            "/api/v1/reports/situation-reaction",
            Some(answers(&SITUATIONS, ["", " ", NO_RESPONSE, "", ""])),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "INSUFFICIENT_INPUT");
    }

    #[tokio::test]
    async fn test_analysis_failure_returns_generic_message() {
        let (status, body) = send(
            app(FakeAnalyzer::failing_on(ReportKind::SituationSummary)),
            "POST",
            "/api/v1/reports/situation-reaction",
            Some(answers(&SITUATIONS, ["a", "b", "c", "d", "e"])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "ANALYSIS_FAILED");
        assert_eq!(body["error"]["message"], ANALYSIS_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_ppdt_without_image_is_capture_error() {
        let (status, body) = send(
            app(FakeAnalyzer::default()),
            "POST",
            "/api/v1/reports/ppdt",
            Some(json!({
                "story": "They rebuild the bridge.",
                "characters": [{ "gender": "female", "mood": "positive" }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "CAPTURE_ERROR");
    }

    #[tokio::test]
    async fn test_ppdt_report() {
        let (status, body) = send(
            app(FakeAnalyzer::default()),
            "POST",
            "/api/v1/reports/ppdt",
            Some(json!({
                "imageDataUri": PNG,
                "story": "They rebuild the bridge.",
                "characters": [
                    { "gender": "female", "mood": "positive" },
                    { "gender": "male", "mood": null }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "ppdt");
        assert_eq!(
            body["report"]["storyAnalysis"]["plotSummary"],
            "2 characters work together."
        );
    }
}
