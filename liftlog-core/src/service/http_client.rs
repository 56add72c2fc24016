use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use super::types::{
    Exercise, ExerciseStats, Template, TemplateInput, User, WorkoutRecord, WorkoutUpsert,
};
use super::DataService;
use crate::config::AppConfig;
use crate::error::{LiftLogError, Result};

#[derive(Serialize)]
struct NameBody<'a> {
    name: &'a str,
}

/// `DataService` over the backend's REST API.
///
/// One `reqwest::Client` is shared by every request (connection pooling);
/// cloning the service is cheap.
#[derive(Clone)]
pub struct HttpDataService {
    client: reqwest::Client,
    api_root: Url,
}

impl HttpDataService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let api_root = config.api_root()?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("liftlog/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LiftLogError::Config(format!("Failed to build HTTP client: {}", e)))?;

        info!("Data service at {}", api_root);
        Ok(Self { client, api_root })
    }

    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    /// Build `<api_root>/<segments...>` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_root.clone();
        url.path_segments_mut()
            .map_err(|_| {
                LiftLogError::Config(format!("Backend URL cannot be a base: {}", self.api_root))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let resp = request.send().await.map_err(|e| {
            warn!("{} failed to reach the service: {}", what, e);
            LiftLogError::Unreachable(format!("{}: {}", what, e))
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("{} returned {}: {}", what, status, body);
            return Err(server_error(status, &body));
        }
        debug!("{} -> {}", what, status);
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        let resp = self.send(self.client.get(url), what).await?;
        read_json(resp, what).await
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
    resp.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            LiftLogError::Decode(format!("{}: {}", what, e))
        } else {
            LiftLogError::Unreachable(format!("{}: {}", what, e))
        }
    })
}

/// Map a non-2xx response to an error, surfacing the server's own message
/// when the body carries one (`{"detail": "..."}` or `{"message": "..."}`).
fn server_error(status: StatusCode, body: &str) -> LiftLogError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["detail", "message"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|d| d.as_str()).map(|s| s.to_string()))
        })
        .filter(|s| !s.trim().is_empty());

    let message = detail.unwrap_or_else(|| match status.canonical_reason() {
        Some(reason) => format!("request failed ({})", reason),
        None => format!("request failed with status {}", status.as_u16()),
    });

    LiftLogError::Server {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl DataService for HttpDataService {
    async fn login(&self, name: &str) -> Result<User> {
        let url = self.endpoint(&["users"])?;
        let resp = self
            .send(self.client.post(url).json(&NameBody { name }), "Login")
            .await?;
        read_json(resp, "Login").await
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        let url = self.endpoint(&["users", user_id])?;
        self.get_json(url, "Fetch user").await
    }

    async fn list_exercises(&self, user_id: &str) -> Result<Vec<Exercise>> {
        let url = self.endpoint(&["exercises", user_id])?;
        self.get_json(url, "List exercises").await
    }

    async fn create_exercise(&self, user_id: &str, name: &str) -> Result<Exercise> {
        let url = self.endpoint(&["exercises", user_id])?;
        let resp = self
            .send(
                self.client.post(url).json(&NameBody { name }),
                "Create exercise",
            )
            .await?;
        read_json(resp, "Create exercise").await
    }

    async fn delete_exercise(&self, exercise_id: &str) -> Result<()> {
        let url = self.endpoint(&["exercises", exercise_id])?;
        self.send(self.client.delete(url), "Delete exercise").await?;
        Ok(())
    }

    async fn list_workouts(&self, user_id: &str, limit: usize) -> Result<Vec<WorkoutRecord>> {
        let mut url = self.endpoint(&["workouts", user_id])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        self.get_json(url, "List workouts").await
    }

    async fn get_workout(&self, user_id: &str, date: NaiveDate) -> Result<Option<WorkoutRecord>> {
        let day = date.format("%Y-%m-%d").to_string();
        let url = self.endpoint(&["workouts", user_id, "date", &day])?;
        self.get_json(url, "Load workout").await
    }

    async fn save_workout(&self, user_id: &str, workout: &WorkoutUpsert) -> Result<WorkoutRecord> {
        let url = self.endpoint(&["workouts", user_id])?;
        let resp = self
            .send(self.client.post(url).json(workout), "Save workout")
            .await?;
        read_json(resp, "Save workout").await
    }

    async fn delete_workout(&self, workout_id: &str) -> Result<()> {
        let url = self.endpoint(&["workouts", workout_id])?;
        self.send(self.client.delete(url), "Delete workout").await?;
        Ok(())
    }

    async fn list_templates(&self, user_id: &str) -> Result<Vec<Template>> {
        let url = self.endpoint(&["templates", user_id])?;
        self.get_json(url, "List templates").await
    }

    async fn create_template(&self, user_id: &str, template: &TemplateInput) -> Result<Template> {
        let url = self.endpoint(&["templates", user_id])?;
        let resp = self
            .send(self.client.post(url).json(template), "Create template")
            .await?;
        read_json(resp, "Create template").await
    }

    async fn update_template(
        &self,
        template_id: &str,
        template: &TemplateInput,
    ) -> Result<Template> {
        let url = self.endpoint(&["templates", template_id])?;
        let resp = self
            .send(self.client.put(url).json(template), "Update template")
            .await?;
        read_json(resp, "Update template").await
    }

    async fn delete_template(&self, template_id: &str) -> Result<()> {
        let url = self.endpoint(&["templates", template_id])?;
        self.send(self.client.delete(url), "Delete template").await?;
        Ok(())
    }

    async fn exercise_stats(
        &self,
        user_id: &str,
        exercise_id: &str,
        limit: usize,
    ) -> Result<Vec<ExerciseStats>> {
        let mut url = self.endpoint(&["stats", user_id, exercise_id])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        self.get_json(url, "Load stats").await
    }
}
