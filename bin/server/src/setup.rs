//! Browser routes that walk a provider's setup pipeline.
//!
//! Progress is kept in process memory, keyed by a short-lived cookie. Each
//! GET renders the current step; each POST submits it. When the last step
//! completes the integration is created and the browser is sent back to the
//! integrations page. A failed step sends the browser back with the error in
//! the `setup_error` query parameter.

use crate::config::SetupConfig;
use crate::db::IntegrationRecord;
use crate::error::HttpError;
use crate::state::AppState;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use switchyard_core::{OrganizationSlug, ProviderKey};
use switchyard_integration::{
    Pipeline, PipelineProgress, PipelineSession,
    api::{SETUP_ERROR_PARAM, integrations_page_path},
    provider::FormFields,
};
use time::Duration as TimeDuration;
use tokio::sync::Mutex;
use ulid::Ulid;

/// Setup session cookie name.
pub const SETUP_COOKIE: &str = "integration_setup";

struct StoredSession {
    session: PipelineSession,
    expires_at: DateTime<Utc>,
}

/// In-flight setup sessions, keyed by cookie value.
///
/// Sessions expire `ttl` after their last step was rendered; expired sessions
/// are never resumed and are dropped by [`SetupSessions::prune`].
#[derive(Clone)]
pub struct SetupSessions {
    inner: Arc<Mutex<HashMap<String, StoredSession>>>,
    ttl: ChronoDuration,
}

impl Default for SetupSessions {
    fn default() -> Self {
        Self::new(SetupConfig::default().session_ttl())
    }
}

impl SetupSessions {
    pub fn new(ttl: ChronoDuration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    async fn take(&self, key: &str) -> Option<PipelineSession> {
        let stored = self.inner.lock().await.remove(key)?;
        (stored.expires_at > Utc::now()).then_some(stored.session)
    }

    async fn store(&self, key: String, session: PipelineSession) {
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.inner
            .lock()
            .await
            .insert(key, StoredSession { session, expires_at });
    }

    /// Drops expired sessions. Returns how many were dropped.
    pub async fn prune(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.inner.lock().await;
        let before = sessions.len();
        sessions.retain(|_, stored| stored.expires_at > now);
        before - sessions.len()
    }

    /// Number of sessions currently held.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn cookie_max_age(&self) -> TimeDuration {
        TimeDuration::seconds(self.ttl.num_seconds())
    }
}

/// Runs [`SetupSessions::prune`] on the configured interval until the
/// process exits.
pub fn spawn_cleanup(sessions: SetupSessions, config: &SetupConfig) {
    let interval_secs = config.cleanup_interval_seconds;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            let pruned = sessions.prune().await;
            if pruned > 0 {
                tracing::debug!(expired_sessions = pruned, "Pruned expired setup sessions");
            }
        }
    });
}

/// Routes for the setup pipeline.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/organizations/{org}/integrations/{provider}/setup/",
        get(show_step).post(submit_step),
    )
}

async fn show_step(
    State(state): State<AppState>,
    Path((org, provider)): Path<(OrganizationSlug, ProviderKey)>,
    jar: CookieJar,
) -> Result<Response, HttpError> {
    run_step(&state, jar, org, provider, FormFields::new()).await
}

async fn submit_step(
    State(state): State<AppState>,
    Path((org, provider)): Path<(OrganizationSlug, ProviderKey)>,
    jar: CookieJar,
    Form(input): Form<FormFields>,
) -> Result<Response, HttpError> {
    run_step(&state, jar, org, provider, input).await
}

async fn run_step(
    state: &AppState,
    jar: CookieJar,
    org: OrganizationSlug,
    provider: ProviderKey,
    input: FormFields,
) -> Result<Response, HttpError> {
    let unknown = || HttpError::UnknownProvider {
        key: provider.to_string(),
    };
    let Some(definition) = state.registry.get(&provider) else {
        return Err(unknown());
    };

    let session_key = jar
        .get(SETUP_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap_or_else(|| Ulid::new().to_string());
    let stored = state.setup_sessions.take(&session_key).await;

    let mut pipeline = Pipeline::resume(&state.registry, org.clone(), &provider, stored)
        .map_err(|_| unknown())?;

    match pipeline.advance(&input) {
        Ok(PipelineProgress::Render(html)) => {
            state
                .setup_sessions
                .store(session_key.clone(), pipeline.into_session())
                .await;
            let cookie = session_cookie(session_key, state.setup_sessions.cookie_max_age());
            Ok((jar.add(cookie), Html(html)).into_response())
        }
        Ok(PipelineProgress::Finished(finished)) => {
            let record = IntegrationRecord::new(
                org.clone(),
                finished.provider,
                finished.name,
                finished.metadata,
            );
            state.store.insert(&record).await?;
            tracing::info!(
                org = %org,
                provider = %provider,
                integration_id = %record.id,
                "integration created"
            );
            Ok(back_to_page(jar, &org, None))
        }
        Err(report) => {
            tracing::warn!(
                org = %org,
                provider = %provider,
                error = %report,
                "integration setup failed"
            );
            let message = report.current_context().user_message(definition.name());
            Ok(back_to_page(jar, &org, Some(&message)))
        }
    }
}

fn session_cookie(value: String, max_age: TimeDuration) -> Cookie<'static> {
    Cookie::build((SETUP_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// Clears the setup cookie and returns to the integrations page, carrying
/// `error` for the page to show.
fn back_to_page(jar: CookieJar, org: &OrganizationSlug, error: Option<&str>) -> Response {
    let mut location = integrations_page_path(org);
    if let Some(message) = error {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(SETUP_ERROR_PARAM, message)
            .finish();
        location = format!("{location}?{query}");
    }
    let cleared = Cookie::build(SETUP_COOKIE).path("/").build();
    (jar.remove(cleared), Redirect::to(&location)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryIntegrationStore;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use switchyard_integration::{IntegrationStatus, ProviderRegistry};
    use tower::ServiceExt;

    const SETUP_URI: &str = "/organizations/acme/integrations/example/setup/";

    fn app_with(sessions: SetupSessions) -> (Router, AppState) {
        let state = AppState::new(
            Arc::new(MemoryIntegrationStore::new()),
            ProviderRegistry::with_builtin(),
        )
        .with_setup_sessions(sessions);
        (router().with_state(state.clone()), state)
    }

    fn app() -> (Router, AppState) {
        app_with(SetupSessions::default())
    }

    fn get() -> Request<Body> {
        Request::builder()
            .uri(SETUP_URI)
            .body(Body::empty())
            .expect("request")
    }

    fn example_session() -> PipelineSession {
        let registry = ProviderRegistry::with_builtin();
        Pipeline::start(
            &registry,
            OrganizationSlug::from_static("acme"),
            &ProviderKey::from_static("example"),
        )
        .expect("known provider")
        .into_session()
    }

    fn cookie_pair(response: &Response) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("set-cookie header")
            .to_str()
            .expect("ascii header");
        set_cookie
            .split(';')
            .next()
            .expect("cookie pair")
            .to_string()
    }

    fn post(cookie: Option<&str>, form: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(SETUP_URI)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(form.to_string())).expect("request")
    }

    #[tokio::test]
    async fn get_renders_first_step_and_sets_cookie() {
        let (app, state) = app();
        let response = app.oneshot(get()).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(cookie_pair(&response).starts_with("integration_setup="));
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert!(String::from_utf8_lossy(&body).contains("name=\"name\""));
        assert_eq!(state.setup_sessions.len().await, 1);
    }

    #[tokio::test]
    async fn completing_setup_creates_visible_integration() {
        let (app, state) = app();
        let first = app.clone().oneshot(get()).await.expect("response");
        let cookie = cookie_pair(&first);

        let response = app
            .oneshot(post(Some(&cookie), "name=Ops+Alerts"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).expect("location"),
            "/organizations/acme/integrations"
        );
        assert!(state.setup_sessions.is_empty().await);

        let created = state
            .store
            .list(&OrganizationSlug::from_static("acme"), None)
            .await
            .expect("list");
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].name, "Ops Alerts");
        assert_eq!(created[0].status, IntegrationStatus::Visible);
        assert_eq!(created[0].provider.as_str(), "example");
    }

    #[tokio::test]
    async fn failed_step_redirects_and_clears_session() {
        let (app, state) = app();
        let response = app
            .oneshot(post(Some("integration_setup=abc"), "name=+"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(header::LOCATION)
            .expect("location")
            .to_str()
            .expect("ascii header");
        assert!(location.starts_with("/organizations/acme/integrations?setup_error="));
        assert!(location.contains("There+was+an+error+setting+up+Example"));
        assert!(location.contains("a+name+is+required"));
        assert!(state.setup_sessions.is_empty().await);
        let created = state
            .store
            .list(&OrganizationSlug::from_static("acme"), None)
            .await
            .expect("list");
        assert!(created.is_empty());
    }

    #[tokio::test]
    async fn abandoned_sessions_expire_and_are_pruned() {
        let (app, state) = app_with(SetupSessions::new(ChronoDuration::zero()));
        for _ in 0..50 {
            let response = app.clone().oneshot(get()).await.expect("response");
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(state.setup_sessions.len().await, 50);

        assert_eq!(state.setup_sessions.prune().await, 50);
        assert!(state.setup_sessions.is_empty().await);
    }

    #[tokio::test]
    async fn expired_session_is_not_resumed() {
        let expired = SetupSessions::new(ChronoDuration::zero());
        expired.store("abc".to_string(), example_session()).await;
        assert!(expired.take("abc").await.is_none());

        let live = SetupSessions::default();
        live.store("abc".to_string(), example_session()).await;
        assert_eq!(live.prune().await, 0);
        assert_eq!(live.take("abc").await, Some(example_session()));
    }

    #[tokio::test]
    async fn unknown_provider_is_not_found() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/organizations/acme/integrations/slack/setup/")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
