#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const JWT_SECRET: &str = "integration-secret";
pub const PASSWORD: &str = "password123";

/// The built binary on a free port over the in-memory store. Each test gets
/// its own process, so counts start from zero.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    child: Child,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_afterschool-api"))
            .args(["--store", "memory", "--host", "127.0.0.1", "--port", &port.to_string()])
            .env("JWT_SECRET", JWT_SECRET)
            .env("APP_ENV", "development")
            .env_remove("DATABASE_DELETE_POLICIES")
            .env_remove("SECURITY_ADMIN_GATE")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            child,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.get(self.url(path)).send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let res = self.client.post(self.url(path)).json(&body).send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.delete(self.url(path)).send().await?;
        Ok((res.status(), res.json().await?))
    }

    /// POSTs and returns the new record's id, failing unless it was created.
    pub async fn create(&self, path: &str, body: Value) -> Result<String> {
        let (status, body) = self.post(path, body).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "POST {} returned {}: {}", path, status, body);
        body["id"].as_str().map(str::to_owned).context("created record has no id")
    }

    pub async fn register(&self, role: &str, email: &str) -> Result<String> {
        self.create(
            "/api/users/register",
            json!({"role": role, "name": "Test User", "email": email, "password": PASSWORD}),
        )
        .await
    }

    pub async fn login(&self, email: &str) -> Result<String> {
        let (status, body) = self
            .post("/api/users/login", json!({"email": email, "password": PASSWORD}))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login returned {}: {}", status, body);
        body["token"].as_str().map(str::to_owned).context("login returned no token")
    }

    /// Program, group and parent, then a child in that group.
    /// Returns (child id, group id).
    pub async fn child_with_group(&self, name: &str, parent_email: &str) -> Result<(String, String)> {
        let program = self
            .create("/api/programs", json!({"name": "Robotics", "duration": "12 weeks"}))
            .await?;
        let group = self
            .create(
                "/api/groups",
                json!({"name": "Tigers", "schedule": "Mon 16:00", "programId": program}),
            )
            .await?;
        let parent = self.register("parent", parent_email).await?;
        let child = self
            .create(
                "/api/children",
                json!({"name": name, "dateOfBirth": "2016-05-04", "groupId": group, "parentId": parent}),
            )
            .await?;
        Ok((child, group))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
