use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{AuthApi, CourseRepository};
use crate::config::ClientConfig;
use crate::error::{server_message, ClientError};
use crate::models::{AccessToken, Course, Credentials, NewCourse};
use crate::session::Session;

/// How a non-2xx status maps onto [`ClientError`] for a given call.
#[derive(Debug, Clone, Copy)]
enum Failure {
    Collection,
    ById,
    Write,
    Auth,
}

/// REST client for the `courses`, `login` and `register` resources.
///
/// Every request carries `Authorization: Bearer <token>` while the session
/// holds one.
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
    session: Session,
}

impl HttpClient {
    pub fn new(config: ClientConfig, session: Session) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build http client: {}", e)))?;

        if let Some(token) = &config.access_token {
            session.set(token.clone());
        }

        Ok(Self {
            client,
            config,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn course_url(&self, id: i64) -> String {
        self.config.url(&format!("courses/{}", id))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))
    }

    async fn expect_success(&self, response: Response, failure: Failure) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("request failed with {}: {}", status, body);
        Err(map_failure(status, &body, failure))
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, ClientError> {
        let body = response.text().await?;
        serde_json::from_str::<T>(&body).map_err(|e| {
            tracing::error!("Failed to parse response: {} body={}", e, body);
            ClientError::from(e)
        })
    }

    async fn post_json<B, T>(&self, url: &str, body: &B, failure: Failure) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(self.client.post(url).json(body)).await?;
        let response = self.expect_success(response, failure).await?;
        self.read_json(response).await
    }
}

fn map_failure(status: StatusCode, body: &str, failure: Failure) -> ClientError {
    let message = || {
        server_message(body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string())
    };

    match failure {
        Failure::ById | Failure::Write if status == StatusCode::NOT_FOUND => ClientError::NotFound,
        Failure::Write
            if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY =>
        {
            ClientError::Rejected(message())
        }
        Failure::Auth if status.is_client_error() => ClientError::InvalidCredentials(message()),
        _ => ClientError::server(status, body),
    }
}

#[async_trait]
impl CourseRepository for HttpClient {
    async fn list(&self) -> Result<Vec<Course>, ClientError> {
        let url = self.config.url("courses");
        debug!("GET {}", url);

        let response = self.send(self.client.get(&url)).await?;
        let response = self.expect_success(response, Failure::Collection).await?;
        self.read_json(response).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Course, ClientError> {
        let url = self.course_url(id);
        debug!("GET {}", url);

        let response = self.send(self.client.get(&url)).await?;
        let response = self.expect_success(response, Failure::ById).await?;
        self.read_json(response).await
    }

    async fn create(&self, course: &NewCourse) -> Result<Course, ClientError> {
        let url = self.config.url("courses");
        debug!("POST {}", url);

        let created: Course = self.post_json(&url, course, Failure::Write).await?;
        info!("created course {} ({})", created.id, created.name);
        Ok(created)
    }

    async fn update(&self, id: i64, course: &NewCourse) -> Result<Course, ClientError> {
        let url = self.course_url(id);
        debug!("PUT {}", url);

        let body = Course::from_new(id, course.clone());
        let response = self.send(self.client.put(&url).json(&body)).await?;
        let response = self.expect_success(response, Failure::Write).await?;
        let updated: Course = self.read_json(response).await?;
        info!("updated course {}", updated.id);
        Ok(updated)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ClientError> {
        let url = self.course_url(id);
        debug!("DELETE {}", url);

        let response = self.send(self.client.delete(&url)).await?;
        self.expect_success(response, Failure::ById).await?;
        info!("deleted course {}", id);
        Ok(())
    }
}

#[async_trait]
impl AuthApi for HttpClient {
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, ClientError> {
        let url = self.config.url("login");
        debug!("POST {} as {}", url, credentials.email);

        let token: AccessToken = self.post_json(&url, credentials, Failure::Auth).await?;
        self.session.set(token.access_token.clone());
        info!("logged in as {}", credentials.email);
        Ok(token)
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), ClientError> {
        let url = self.config.url("register");
        debug!("POST {} as {}", url, credentials.email);

        let response = self.send(self.client.post(&url).json(credentials)).await?;
        self.expect_success(response, Failure::Auth).await?;
        info!("registered {}", credentials.email);
        Ok(())
    }

    fn logout(&self) {
        self.session.clear();
        info!("session cleared");
    }
}
