use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use crate::auth::{Session, SessionProvider, UserProfile, decode_id_token};
use crate::utils::{GalleryError, GalleryResult};

const NO_PENDING_CONFIRMATION: &str = "No pending confirmation. Please sign up first.";
const EVENT_CAPACITY: usize = 16;

/// Tokens handed back by a successful password sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub access_token: String,
    pub id_token: String,
}

/// Hosted identity service. The wire protocol lives in the host; the store
/// only sequences calls and keeps the resulting session.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, username: &str, email: &str, password: &str) -> GalleryResult<()>;
    async fn sign_in(&self, username: &str, password: &str) -> GalleryResult<AuthTokens>;
    async fn confirm_sign_up(&self, username: &str, code: &str) -> GalleryResult<()>;
    async fn resend_confirmation_code(&self, username: &str) -> GalleryResult<()>;
}

/// Session lifecycle notifications. Hosts reset the gallery engine on
/// `LoggedOut`; the store never reaches into the engine itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(UserProfile),
    LoggedOut,
}

#[derive(Debug, Default)]
struct AuthState {
    session: Option<Session>,
    pending_username: Option<String>,
    loading: bool,
    error: Option<String>,
}

pub struct SessionStore<P> {
    provider: P,
    state: Mutex<AuthState>,
    events: broadcast::Sender<AuthEvent>,
}

impl<P: IdentityProvider> SessionStore<P> {
    pub fn new(provider: P) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            provider,
            state: Mutex::new(AuthState::default()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Rehydrates a session the host persisted earlier.
    pub fn restore(&self, session: Session) {
        if session.is_usable() {
            debug!("Restoring session for {}", session.user.user_id);
            self.state.lock().session = Some(session);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.lock().session.as_ref().is_some_and(Session::is_usable)
    }

    pub fn pending_username(&self) -> Option<String> {
        self.state.lock().pending_username.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn clear_error(&self) {
        self.state.lock().error = None;
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub async fn sign_up(&self, username: &str, email: &str, password: &str) -> GalleryResult<()> {
        self.begin();
        let result = self.provider.sign_up(username, email, password).await;
        self.finish(&result);
        if result.is_ok() {
            self.state.lock().pending_username = Some(username.to_string());
        }
        result
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> GalleryResult<()> {
        self.begin();
        let result = match self.provider.sign_in(username, password).await {
            Ok(tokens) => Self::session_from_tokens(username, tokens),
            Err(e) => Err(e),
        };
        self.finish(&result);

        let session = result?;
        let profile = session.user.clone();
        {
            let mut state = self.state.lock();
            state.session = Some(session);
            state.pending_username = None;
        }
        info!("Signed in as {}", profile.username);
        let _ = self.events.send(AuthEvent::SignedIn(profile));
        Ok(())
    }

    pub async fn confirm_sign_up(&self, code: &str) -> GalleryResult<()> {
        let username = self.require_pending()?;
        self.begin();
        let result = self.provider.confirm_sign_up(&username, code.trim()).await;
        self.finish(&result);
        if result.is_ok() {
            self.state.lock().pending_username = None;
        }
        result
    }

    pub async fn resend_code(&self) -> GalleryResult<()> {
        let username = self.require_pending()?;
        self.begin();
        let result = self.provider.resend_confirmation_code(&username).await;
        self.finish(&result);
        result
    }

    /// Drops the session and announces it.
    pub fn logout(&self) {
        {
            let mut state = self.state.lock();
            state.session = None;
            state.pending_username = None;
            state.error = None;
        }
        info!("Logged out");
        let _ = self.events.send(AuthEvent::LoggedOut);
    }

    fn session_from_tokens(username: &str, tokens: AuthTokens) -> GalleryResult<Session> {
        let claims = decode_id_token(&tokens.id_token)?;
        Ok(Session {
            user: UserProfile {
                user_id: claims.sub,
                username: claims.name.unwrap_or_else(|| username.to_string()),
                email: claims.email,
            },
            access_token: tokens.access_token,
        })
    }

    fn require_pending(&self) -> GalleryResult<String> {
        let mut state = self.state.lock();
        match state.pending_username.clone() {
            Some(username) => Ok(username),
            None => {
                state.error = Some(NO_PENDING_CONFIRMATION.to_string());
                Err(GalleryError::auth(NO_PENDING_CONFIRMATION))
            }
        }
    }

    fn begin(&self) {
        let mut state = self.state.lock();
        state.loading = true;
        state.error = None;
    }

    fn finish<T>(&self, result: &GalleryResult<T>) {
        let mut state = self.state.lock();
        state.loading = false;
        if let Err(e) = result {
            warn!("Auth operation failed: {}", e);
            state.error = Some(e.to_string());
        }
    }
}

impl<P: IdentityProvider> SessionProvider for SessionStore<P> {
    fn current_session(&self) -> Option<Session> {
        self.state.lock().session.clone().filter(Session::is_usable)
    }
}
