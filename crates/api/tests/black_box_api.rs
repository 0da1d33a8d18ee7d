use reqwest::StatusCode;
use serde_json::{Value, json};

use condohub_infra::Settings;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "correct-horse-battery";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let settings = Settings::from_toml(&format!(
            r#"
            [store]
            backend = "memory"

            [hooks]
            detached = false

            [bootstrap]
            enterprise_name = "Maple Court"
            admin_email = "{ADMIN_EMAIL}"
            admin_password = "{ADMIN_PASSWORD}"
            "#
        ))
        .expect("test settings are valid");

        // Same router as prod, bound to an ephemeral port.
        let app = condohub_api::app::build_app(&settings)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let res = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["session"]["token"].as_str().unwrap().to_string()
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/water")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv.get("/me", "not-a-real-token").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthenticated");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let srv = TestServer::spawn().await;
    let res = srv
        .client
        .post(srv.url("/auth/login"))
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_lists_memberships_with_affordances() {
    let srv = TestServer::spawn().await;
    let token = srv.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = srv.get("/me", &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);

    let memberships = body["memberships"].as_array().unwrap();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0]["role"], "ADMIN");
    let affordances = memberships[0]["affordances"].as_array().unwrap();
    assert_eq!(affordances.len(), 7);
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let srv = TestServer::spawn().await;
    let token = srv.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = srv.post("/auth/logout", &token, json!({})).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = srv.get("/me", &token).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn read_only_resident_cannot_write_readings() {
    let srv = TestServer::spawn().await;
    let admin = srv.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = srv
        .post(
            "/admin/users",
            &admin,
            json!({
                "email": "resident@example.com",
                "displayName": "Resident",
                "password": "resident-password",
                "role": "RESIDENT",
                "permissions": { "water": "READ_ONLY" },
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let resident = srv.login("resident@example.com", "resident-password").await;

    let res = srv.get("/water", &resident).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .post("/water", &resident, json!({ "unit": "101", "reading": 120.0 }))
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    // Hidden module.
    let res = srv.get("/tasks", &resident).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn readings_infer_previous_value_and_are_audited() {
    let srv = TestServer::spawn().await;
    let admin = srv.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = srv
        .post("/water", &admin, json!({ "unit": "101", "reading": 100.0 }))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = srv
        .post("/water", &admin, json!({ "unit": "101", "reading": 120.0 }))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["previousReading"].as_f64(), Some(100.0));

    // Below the previous reading.
    let res = srv
        .post("/water", &admin, json!({ "unit": "101", "reading": 90.0 }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv.get("/admin/audit-logs?action=ADD_READING", &admin).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|e| e["userEmail"] == ADMIN_EMAIL));
}

#[tokio::test]
async fn foreign_enterprise_header_is_rejected() {
    let srv = TestServer::spawn().await;
    let admin = srv.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = srv
        .client
        .get(srv.url("/water"))
        .bearer_auth(&admin)
        .header("X-Enterprise-Id", uuid::Uuid::now_v7().to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "tenant_isolation");
}

#[tokio::test]
async fn malformed_and_unknown_ids() {
    let srv = TestServer::spawn().await;
    let admin = srv.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = srv.get("/suppliers/not-a-uuid", &admin).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");

    let res = srv
        .get(&format!("/suppliers/{}", uuid::Uuid::now_v7()), &admin)
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn settings_round_trip_through_admin_panel() {
    let srv = TestServer::spawn().await;
    let admin = srv.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = srv
        .client
        .put(srv.url("/admin/settings"))
        .bearer_auth(&admin)
        .json(&json!({ "waterLimit": 15.0, "theme": "dark" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.get("/admin/settings", &admin).await;
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["waterLimit"].as_f64(), Some(15.0));
    assert_eq!(body["theme"], "dark");

    let res = srv
        .client
        .put(srv.url("/admin/settings"))
        .bearer_auth(&admin)
        .json(&json!({ "waterLimit": -3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
