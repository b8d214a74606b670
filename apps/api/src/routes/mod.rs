pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assessment::handlers as assessment;
use crate::auth::handlers as auth;
use crate::colleges::handlers as colleges;
use crate::profile::handlers as profile;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/sign-up", post(auth::handle_sign_up))
        .route("/api/v1/auth/sign-in", post(auth::handle_sign_in))
        .route("/api/v1/auth/refresh", post(auth::handle_refresh))
        .route("/api/v1/auth/sign-out", post(auth::handle_sign_out))
        .route("/api/v1/auth/me", get(auth::handle_me))
        // Profile
        .route(
            "/api/v1/profile",
            get(profile::handle_get_profile).patch(profile::handle_update_profile),
        )
        // Assessment pipeline
        .route("/api/v1/quizzes/:kind", get(assessment::handle_get_quiz))
        .route(
            "/api/v1/assessments",
            post(assessment::handle_create_assessment),
        )
        .route(
            "/api/v1/assessments/:id",
            get(assessment::handle_get_assessment).delete(assessment::handle_abandon_assessment),
        )
        .route(
            "/api/v1/assessments/:id/recommendations",
            post(assessment::handle_recommendations),
        )
        .route(
            "/api/v1/assessments/:id/:kind/start",
            post(assessment::handle_start_quiz),
        )
        .route(
            "/api/v1/assessments/:id/:kind/answer",
            post(assessment::handle_answer),
        )
        .route(
            "/api/v1/assessments/:id/:kind/previous",
            post(assessment::handle_previous),
        )
        .route(
            "/api/v1/assessments/:id/:kind/submit",
            post(assessment::handle_submit),
        )
        // College locator
        .route("/api/v1/colleges", get(colleges::handle_nearby_colleges))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::assessment::questions::{APPEARANCE_QUIZ, PERSONALITY_QUIZ};
    use crate::colleges::{CollegeSite, Coordinate};
    use crate::test_support::TestHarness;

    const CAREERS_REPLY: &str = r#"["Data Scientist", "Software Engineer", "Product Manager"]"#;

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn sign_up_body(email: &str, mobile: &str) -> Value {
        json!({
            "full_name": "Asha Patel",
            "email": email,
            "mobile": mobile,
            "password": "careers2024",
            "confirm_password": "careers2024"
        })
    }

    /// Signs up a fresh account and returns its access token.
    async fn signed_up(app: &Router, email: &str, mobile: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/v1/auth/sign-up",
            None,
            Some(sign_up_body(email, mobile)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["session"]["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(TestHarness::new(CAREERS_REPLY, vec![]).state);
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_invalid_sign_up_lists_fields() {
        let app = build_router(TestHarness::new(CAREERS_REPLY, vec![]).state);
        let mut body = sign_up_body("not-an-email", "12345");
        body["confirm_password"] = json!("something-else1");

        let (status, body) = send(&app, Method::POST, "/api/v1/auth/sign-up", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        let fields = body["error"]["fields"].as_object().unwrap();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("mobile"));
        assert!(fields.contains_key("confirm_password"));
    }

    #[tokio::test]
    async fn test_sign_up_creates_profile_and_rejects_duplicates() {
        let harness = TestHarness::new(CAREERS_REPLY, vec![]);
        let app = build_router(harness.state.clone());
        let token = signed_up(&app, "asha@example.com", "9876543210").await;

        let (status, me) = send(&app, Method::GET, "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["session_valid"], true);
        assert_eq!(me["profile"]["mobile"], "9876543210");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/auth/sign-up",
            None,
            Some(sign_up_body("other@example.com", "9876543210")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "ACCOUNT_EXISTS");
    }

    #[tokio::test]
    async fn test_sign_in_by_phone_and_wrong_password() {
        let app = build_router(TestHarness::new(CAREERS_REPLY, vec![]).state);
        signed_up(&app, "asha@example.com", "9876543210").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/auth/sign-in",
            None,
            Some(json!({ "identifier": "9876543210", "password": "careers2024" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["user"]["email"], "asha@example.com");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/auth/sign-in",
            None,
            Some(json!({ "identifier": "Asha@Example.com", "password": "wrongpass1" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTH_ERROR");
    }

    #[tokio::test]
    async fn test_sign_in_rejects_non_ascii_digits_before_lookup() {
        let harness = TestHarness::new(CAREERS_REPLY, vec![]);
        let app = build_router(harness.state.clone());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/auth/sign-in",
            None,
            Some(json!({ "identifier": "९८७६५४३२१०", "password": "careers2024" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["fields"]["identifier"].is_string());
        assert!(harness.profiles.mobile_lookups().is_empty());
    }

    #[tokio::test]
    async fn test_sign_up_resumes_after_profile_insert_fails() {
        let harness = TestHarness::new(CAREERS_REPLY, vec![]);
        let app = build_router(harness.state.clone());
        let body = sign_up_body("asha@example.com", "9876543210");

        harness.profiles.reject_next_create();
        let (status, failed) =
            send(&app, Method::POST, "/api/v1/auth/sign-up", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(failed["error"]["code"], "ACCOUNT_EXISTS");

        let (status, resumed) =
            send(&app, Method::POST, "/api/v1/auth/sign-up", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(resumed["profile"]["mobile"], "9876543210");
        assert_eq!(resumed["profile"]["id"], resumed["user"]["id"]);

        // Once the profile exists the same form is a plain duplicate.
        let (status, again) =
            send(&app, Method::POST, "/api/v1/auth/sign-up", None, Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(again["error"]["code"], "ACCOUNT_EXISTS");
    }

    #[tokio::test]
    async fn test_sign_up_with_taken_email_and_wrong_password_conflicts() {
        let app = build_router(TestHarness::new(CAREERS_REPLY, vec![]).state);
        signed_up(&app, "asha@example.com", "9876543210").await;

        let mut body = sign_up_body("asha@example.com", "9123456780");
        body["password"] = json!("different99");
        body["confirm_password"] = json!("different99");
        let (status, body) = send(&app, Method::POST, "/api/v1/auth/sign-up", None, Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "ACCOUNT_EXISTS");
    }

    #[tokio::test]
    async fn test_protected_routes_need_a_token() {
        let app = build_router(TestHarness::new(CAREERS_REPLY, vec![]).state);
        let (status, _) = send(&app, Method::POST, "/api/v1/assessments", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::GET, "/api/v1/profile", Some("bogus"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_patch_marks_profile_complete() {
        let app = build_router(TestHarness::new(CAREERS_REPLY, vec![]).state);
        let token = signed_up(&app, "asha@example.com", "9876543210").await;

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/v1/profile",
            Some(&token),
            Some(json!({ "academic_info": { "board": "GSEB", "stream": "Science" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile_completed"], true);

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/api/v1/profile",
            Some(&token),
            Some(json!({ "mobile": "98765" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_quiz_bank_is_served() {
        let app = build_router(TestHarness::new(CAREERS_REPLY, vec![]).state);
        let (status, body) = send(&app, Method::GET, "/api/v1/quizzes/appearance", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], "appearance");
        assert_eq!(body["steps"][0]["questions"].as_array().unwrap().len(), 30);
    }

    #[tokio::test]
    async fn test_full_assessment_flow() {
        let harness = TestHarness::new(CAREERS_REPLY, vec![]);
        let app = build_router(harness.state.clone());
        let token = signed_up(&app, "asha@example.com", "9876543210").await;

        let (status, created) = send(&app, Method::POST, "/api/v1/assessments", Some(&token), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["state"], "not_started");
        let base = format!("/api/v1/assessments/{}", created["id"].as_str().unwrap());

        // Recommendations before either quiz is a pipeline-order conflict.
        let (status, _) = send(&app, Method::POST, &format!("{base}/recommendations"), Some(&token), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&app, Method::POST, &format!("{base}/personality/start"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        for _ in 0..PERSONALITY_QUIZ.total() {
            let (status, _) = send(
                &app,
                Method::POST,
                &format!("{base}/personality/answer"),
                Some(&token),
                Some(json!({ "option": "Agree" })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, view) = send(&app, Method::POST, &format!("{base}/personality/submit"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["personality_prediction"], "Engineering");
        assert_eq!(harness.classifier.received().len(), 1);

        for question in APPEARANCE_QUIZ.questions() {
            let (status, _) = send(
                &app,
                Method::POST,
                &format!("{base}/appearance/answer"),
                Some(&token),
                Some(json!({ "option": question.options[1] })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, _) = send(&app, Method::POST, &format!("{base}/appearance/submit"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, view) = send(&app, Method::POST, &format!("{base}/recommendations"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["state"], "recommendations_ready");
        assert_eq!(view["recommendations"]["source"], "ai");
        assert_eq!(view["recommendations"]["careers"][0], "Data Scientist");

        let (_, me) = send(&app, Method::GET, "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(me["profile"]["personality_completed"], true);
        assert_eq!(me["profile"]["appearance_completed"], true);
    }

    #[tokio::test]
    async fn test_unknown_option_is_rejected() {
        let app = build_router(TestHarness::new(CAREERS_REPLY, vec![]).state);
        let token = signed_up(&app, "asha@example.com", "9876543210").await;
        let (_, created) = send(&app, Method::POST, "/api/v1/assessments", Some(&token), None).await;
        let base = format!("/api/v1/assessments/{}", created["id"].as_str().unwrap());
        send(&app, Method::POST, &format!("{base}/personality/start"), Some(&token), None).await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("{base}/personality/answer"),
            Some(&token),
            Some(json!({ "option": "Strongly Agree" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_sessions_are_private_and_can_be_abandoned() {
        let app = build_router(TestHarness::new(CAREERS_REPLY, vec![]).state);
        let owner = signed_up(&app, "asha@example.com", "9876543210").await;
        let other = signed_up(&app, "ravi@example.com", "9123456780").await;

        let (_, created) = send(&app, Method::POST, "/api/v1/assessments", Some(&owner), None).await;
        let uri = format!("/api/v1/assessments/{}", created["id"].as_str().unwrap());

        let (status, _) = send(&app, Method::GET, &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, Method::DELETE, &uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::GET, &uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_colleges_default_location_and_validation() {
        let site = CollegeSite {
            id: "node/1".to_string(),
            name: "Nirma University".to_string(),
            position: Coordinate { lat: 23.129, lon: 72.544 },
            area: "Ahmedabad".to_string(),
        };
        let harness = TestHarness::new(CAREERS_REPLY, vec![site]);
        let app = build_router(harness.state.clone());

        let (status, body) = send(&app, Method::GET, "/api/v1/colleges", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["used_default_location"], true);
        assert_eq!(body["colleges"][0]["ranking"], "NIRF Engineering Rank 81");
        assert_eq!(harness.colleges.requests()[0].1, 10_000);

        let (status, _) = send(&app, Method::GET, "/api/v1/colleges?lat=95&lon=72", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, Method::GET, "/api/v1/colleges?lat=23", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
