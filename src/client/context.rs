use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::auth_store::AuthStore;
use super::notifications::NotificationQueue;
use super::session_provider::SessionProvider;
use super::sync::AuthSynchronizer;
use super::ui_store::UiStore;
use crate::config::ConfigV1;
use crate::error::{AuthError, FieldErrors};
use crate::storage::{create_storage, Storage};
use crate::validation::{validate_login_form, validate_register_form, LoginForm, RegisterForm, RegisterRequest};

/// Result of submitting a form through the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Submitted,
    /// Field messages to show next to the inputs; nothing was sent.
    Invalid(FieldErrors),
    /// The request failed and one error notification was raised.
    Failed(AuthError),
}

/// Owns the client state and is passed explicitly to whatever needs it.
#[derive(Clone)]
pub struct AppContext {
    pub auth: AuthStore,
    pub ui: UiStore,
    pub notifications: NotificationQueue,
    pub provider: Arc<SessionProvider>,
}

impl AppContext {
    pub fn new(
        storage: Arc<dyn Storage>,
        provider: Arc<SessionProvider>,
        toast_duration_ms: u64,
    ) -> Self {
        Self {
            auth: AuthStore::new(storage.clone()),
            ui: UiStore::new(storage),
            notifications: NotificationQueue::new(toast_duration_ms),
            provider,
        }
    }

    /// Build a context for a client of the server at `server_url`, with storage
    /// and toast settings taken from the configuration.
    pub fn from_config(config: &ConfigV1, server_url: &str) -> Self {
        Self::new(
            create_storage(&config.storage),
            Arc::new(SessionProvider::new(server_url, config.backend.timeout_in_ms)),
            config.ui.toast_duration_ms,
        )
    }

    /// Start applying every provider change to the auth store.
    pub fn spawn_sync(&self) -> JoinHandle<()> {
        let sync = AuthSynchronizer::new(self.auth.clone());
        tokio::spawn(sync.run(self.provider.subscribe()))
    }

    /// Record user activity.
    pub fn touch(&self) {
        self.auth.update_last_activity();
    }

    fn begin_submit(&self) {
        self.auth.set_loading(true);
        self.ui.set_form_submitting(true);
    }

    fn end_submit(&self) {
        self.auth.set_loading(false);
        self.ui.set_form_submitting(false);
    }

    pub async fn sign_in(&self, form: &LoginForm) -> FormOutcome {
        if let Err(fields) = validate_login_form(form) {
            return FormOutcome::Invalid(fields);
        }

        self.begin_submit();
        let result = self.provider.sign_in(form).await;
        if result.is_ok() {
            self.auth.apply_snapshot(&self.provider.snapshot());
        }
        self.end_submit();

        match result {
            Ok(session) => {
                info!("Signed in as '{}'", session.user.id);
                self.notifications
                    .success("Welcome Back!", Some("You have been signed in successfully"));
                FormOutcome::Submitted
            }
            Err(AuthError::Validation(fields)) => FormOutcome::Invalid(fields),
            Err(e @ AuthError::InvalidCredentials) => {
                self.notifications
                    .error("Authentication Failed", Some("Invalid email or password"));
                FormOutcome::Failed(e)
            }
            Err(e) => {
                error!("Sign in error: {}", e);
                self.notifications.error(
                    "Sign In Error",
                    Some("An unexpected error occurred. Please try again."),
                );
                FormOutcome::Failed(e)
            }
        }
    }

    /// Register, then sign in with the same credentials.
    pub async fn sign_up(&self, form: &RegisterForm) -> FormOutcome {
        if let Err(fields) = validate_register_form(form) {
            return FormOutcome::Invalid(fields);
        }

        self.begin_submit();
        let outcome = self.register_and_sign_in(form).await;
        self.end_submit();
        outcome
    }

    async fn register_and_sign_in(&self, form: &RegisterForm) -> FormOutcome {
        match self.provider.register(&RegisterRequest::from(form)).await {
            Ok(()) => {}
            Err(AuthError::Validation(fields)) => return FormOutcome::Invalid(fields),
            Err(e) => {
                error!("Registration error: {}", e);
                self.notifications
                    .error("Registration Failed", Some(e.user_message().as_str()));
                return FormOutcome::Failed(e);
            }
        }
        self.notifications
            .success("Account Created!", Some("Your account has been created successfully"));

        let login = LoginForm {
            email: form.email.clone(),
            password: form.password.clone(),
            remember_me: false,
        };
        match self.provider.sign_in(&login).await {
            Ok(_) => {
                self.auth.apply_snapshot(&self.provider.snapshot());
                FormOutcome::Submitted
            }
            Err(e) => {
                warn!("Automatic sign-in after registration failed: {}", e);
                self.notifications.error(
                    "Sign In Error",
                    Some("Account created but failed to sign in. Please try signing in manually."),
                );
                FormOutcome::Failed(e)
            }
        }
    }

    pub async fn sign_out(&self) {
        self.provider.sign_out().await;
        self.auth.logout();
    }
}
