use super::{
    broadcaster::{AuthBroadcaster, AuthEvent, Received, Subscription},
    state::{SessionState, UserProfile},
    types::{AuthOutcome, LoginRequest, LoginResponse, Registration, TokenStatus},
};
use crate::{
    api::{self, ApiClient, ApiError},
    config::{ClientConfig, DEFAULT_VERIFY_PATH},
    router::Router,
    store::{CredentialRecord, CredentialStore},
};
use reqwest::{header::HeaderMap, Method, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";
/// Pages a logged-in user is sent away from.
const AUTH_ENTRY_PATHS: [&str; 2] = ["/login", "/register"];

/// Everything sessions share: the API, the credential store, the router and
/// the broadcaster.
#[derive(Clone)]
pub struct SessionContext {
    pub api: ApiClient,
    pub store: Arc<dyn CredentialStore>,
    pub router: Arc<Router>,
    pub broadcaster: AuthBroadcaster,
    pub verify_path: String,
}

impl SessionContext {
    #[must_use]
    pub fn new(api: ApiClient, store: Arc<dyn CredentialStore>) -> Self {
        let router = Arc::new(Router::new(store.clone()));
        Self {
            api,
            store,
            router,
            broadcaster: AuthBroadcaster::new(),
            verify_path: DEFAULT_VERIFY_PATH.to_string(),
        }
    }

    /// # Errors
    /// Returns an error if the configured API URL is invalid.
    pub fn from_config(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        let mut context = Self::new(ApiClient::new(config)?, store);
        context.verify_path.clone_from(&config.verify_path);
        Ok(context)
    }
}

/// Extra request settings for [`AuthSession::make_authenticated_request`].
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

struct Shared {
    state: SessionState,
    /// Last record this session wrote or read; changes equal to it are our own.
    known: CredentialRecord,
}

pub struct AuthSession {
    id: Uuid,
    context: SessionContext,
    shared: Mutex<Shared>,
    cancel: CancellationToken,
}

impl AuthSession {
    /// Creates a logged-out session without checking credentials or listening
    /// for changes. Most callers want [`AuthSession::mount`].
    #[must_use]
    pub fn new(context: SessionContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            context,
            shared: Mutex::new(Shared {
                state: SessionState::logged_out(),
                known: CredentialRecord::default(),
            }),
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a session, reconciles it with the stored credentials and starts
    /// mirroring transitions from sibling sessions until unmounted.
    pub async fn mount(context: SessionContext) -> Arc<Self> {
        let session = Arc::new(Self::new(context));
        let events = session.context.broadcaster.subscribe();
        let changes = session.context.store.watch();

        session.check_auth().await;
        spawn_sync(
            Arc::downgrade(&session),
            session.id,
            session.cancel.clone(),
            events,
            changes,
        );

        session
    }

    /// Stops listening for changes and cancels in-flight requests.
    pub fn unmount(&self) {
        if !self.cancel.is_cancelled() {
            debug!(session = %self.id, "unmounting session");
            self.cancel.cancel();
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.context.router
    }

    /// Reconciles the session with the stored credentials and the server.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn check_auth(&self) -> SessionState {
        let record = self.context.store.load();
        self.remember(&record);

        let token = match record.token() {
            Some(token) if record.has_token() => token.clone(),
            _ => {
                self.set_state(SessionState::logged_out());
                if self.context.router.current_requires_auth() {
                    self.navigate("/login");
                }
                return self.state();
            }
        };

        match self.verify_token(&token).await {
            TokenStatus::Valid if !self.context.store.load().same_as(&record) => {
                debug!("stored credentials changed during verification, skipping");
            }
            TokenStatus::Valid => {
                let user = self.lock().state.user().cloned();
                let state = SessionState::logged_in(record.is_admin(), user);
                self.set_state(state.clone());
                self.context.broadcaster.publish(self.id, state.event());

                let current = self.context.router.current().path;
                if AUTH_ENTRY_PATHS.contains(&current.as_str()) {
                    self.navigate(record.role().landing_path());
                }
            }
            TokenStatus::Rejected => {
                warn!("stored token rejected by server, logging out");
                self.logout();
            }
            TokenStatus::Unreachable => {
                debug!("token could not be verified, keeping current state");
            }
        }

        self.state()
    }

    /// Asks the server whether `token` is still accepted.
    #[instrument(skip(self, token), fields(session = %self.id, path = %self.context.verify_path))]
    pub async fn verify_token(&self, token: &SecretString) -> TokenStatus {
        let result = self
            .context
            .api
            .get_with_bearer(&self.context.verify_path, token, &self.cancel)
            .await;

        match result {
            Ok(response) if response.status().is_success() => TokenStatus::Valid,
            Ok(response) if response.status() == StatusCode::UNAUTHORIZED => TokenStatus::Rejected,
            Ok(response) => {
                warn!(status = response.status().as_u16(), "unexpected status verifying token");
                TokenStatus::Unreachable
            }
            Err(err) if err.is_transport() => {
                warn!("Auth check failed: {err}");
                TokenStatus::Unreachable
            }
            Err(err) => {
                error!("Auth check failed: {err}");
                TokenStatus::Unreachable
            }
        }
    }

    /// Logs in, stores the granted credentials and publishes the transition.
    #[instrument(skip(self, password), fields(session = %self.id))]
    pub async fn login(&self, username: &str, password: &SecretString) -> AuthOutcome {
        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };

        let response = match self.context.api.post_json("/login", &body, &self.cancel).await {
            Ok(response) => response,
            Err(err) => {
                error!("Login failed: {err}");
                return AuthOutcome::failed(LOGIN_FAILED);
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = api::error_message(response)
                .await
                .unwrap_or_else(|| LOGIN_FAILED.to_string());
            warn!(status, "login rejected");
            return AuthOutcome::failed(message);
        }

        let granted: LoginResponse = match api::read_json(response).await {
            Ok(granted) => granted,
            Err(err) => {
                error!("Login failed: {err}");
                return AuthOutcome::failed(LOGIN_FAILED);
            }
        };

        let record = CredentialRecord::new(granted.access_token, granted.role.clone());
        self.remember(&record);
        if let Err(err) = self.context.store.save(record.clone()) {
            error!("Login failed: {err}");
            return AuthOutcome::failed(LOGIN_FAILED);
        }

        let state = SessionState::logged_in(
            record.is_admin(),
            Some(UserProfile {
                username: username.to_string(),
            }),
        );
        self.set_state(state.clone());
        self.context.broadcaster.publish(self.id, state.event());
        info!(role = %granted.role, "logged in");

        AuthOutcome::succeeded(Some(granted.role))
    }

    /// Creates an account. Does not log the new user in.
    #[instrument(
        skip(self, registration),
        fields(session = %self.id, username = %registration.username)
    )]
    pub async fn register(&self, registration: &Registration) -> AuthOutcome {
        let response = match self
            .context
            .api
            .post_json("/register", registration, &self.cancel)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!("Registration failed: {err}");
                return AuthOutcome::failed(REGISTRATION_FAILED);
            }
        };

        if response.status().is_success() {
            info!("registered");
            AuthOutcome::succeeded(None)
        } else {
            let status = response.status().as_u16();
            let message = api::error_message(response)
                .await
                .unwrap_or_else(|| REGISTRATION_FAILED.to_string());
            warn!(status, "registration rejected");
            AuthOutcome::failed(message)
        }
    }

    /// Clears credentials and state and publishes the transition. Safe to repeat.
    pub fn logout(&self) {
        self.remember(&CredentialRecord::default());
        if let Err(err) = self.context.store.clear() {
            error!(session = %self.id, "failed to clear stored credentials: {err}");
        }

        self.set_state(SessionState::logged_out());
        self.context
            .broadcaster
            .publish(self.id, AuthEvent::logged_out());

        if self.context.router.current_requires_auth() {
            self.navigate("/login");
        }
        info!(session = %self.id, "logged out");
    }

    /// Bearer headers for the stored token, or an empty map after logging out
    /// when there is none.
    pub fn auth_headers(&self) -> HeaderMap {
        let record = self.context.store.load();
        let headers = match record.token() {
            Some(token) if record.has_token() => api::bearer_headers(token),
            _ => Err(ApiError::Config("no stored token".to_string())),
        };

        headers.unwrap_or_else(|err| {
            debug!(session = %self.id, "no usable token: {err}");
            self.logout();
            HeaderMap::new()
        })
    }

    /// Sends an authenticated request. `None` means the session expired (and
    /// was logged out) or the server could not be reached.
    #[instrument(skip(self, options), fields(session = %self.id))]
    pub async fn make_authenticated_request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Option<Response> {
        let auth = self.auth_headers();
        if auth.is_empty() {
            return None;
        }

        let RequestOptions { mut headers, body } = options;
        headers.extend(auth);

        let mut request = self.context.api.request(method, path).headers(headers);
        if let Some(body) = &body {
            request = request.json(body);
        }

        match self.context.api.send(request, &self.cancel).await {
            Ok(response) if response.status() == StatusCode::UNAUTHORIZED => {
                warn!("session expired, logging out");
                self.logout();
                None
            }
            Ok(response) => Some(response),
            Err(err) => {
                error!("Request failed: {err}");
                None
            }
        }
    }

    fn mirror(&self, event: AuthEvent) {
        let mut shared = self.lock();
        shared.state = shared.state.apply(event);
        debug!(session = %self.id, ?event, "mirrored auth event");
    }

    fn is_known(&self, record: &CredentialRecord) -> bool {
        self.lock().known.same_as(record)
    }

    fn remember(&self, record: &CredentialRecord) {
        self.lock().known = record.clone();
    }

    fn set_state(&self, state: SessionState) {
        self.lock().state = state;
    }

    fn navigate(&self, path: &str) {
        if let Err(err) = self.context.router.push(path) {
            warn!(session = %self.id, "navigation to {path} failed: {err}");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Mirrors sibling events and re-checks on external credential changes until
/// the session is unmounted or dropped.
fn spawn_sync(
    session: Weak<AuthSession>,
    id: Uuid,
    cancel: CancellationToken,
    mut events: Subscription,
    mut changes: watch::Receiver<CredentialRecord>,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                received = events.recv() => {
                    let Some(session) = session.upgrade() else { break };
                    match received {
                        Received::Event(envelope) if envelope.origin == id => {}
                        Received::Event(envelope) => session.mirror(envelope.event),
                        Received::Lagged(skipped) => {
                            warn!(session = %id, skipped, "auth events dropped, re-checking");
                            session.check_auth().await;
                        }
                        Received::Closed => break,
                    }
                }
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let record = changes.borrow_and_update().clone();
                    let Some(session) = session.upgrade() else { break };
                    if !session.is_known(&record) {
                        debug!(session = %id, "stored credentials changed externally");
                        session.check_auth().await;
                    }
                }
            }
        }
        debug!(session = %id, "session sync stopped");
    });
}
