//! Application context with shared state and utilities

use anyhow::{bail, Context, Result};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::sync::Arc;

use fumigation_client::{
    ApiClient, ApiResponse, ClientConfig, Guarded, SessionManager, TokenStore, User,
};

/// Application context passed to all commands
pub struct AppContext {
    pub config: ClientConfig,
    pub api: Arc<ApiClient>,
    pub session: Arc<SessionManager>,
    pub quiet: bool,
}

impl AppContext {
    /// Load configuration and verify any stored session.
    pub async fn new(api_url: Option<String>, quiet: bool) -> Result<Self> {
        let config =
            ClientConfig::from_env_with(api_url).context("Failed to load configuration")?;
        let store = Arc::new(TokenStore::from_config(&config));
        let api = Arc::new(
            ApiClient::from_config(&config, store).context("Failed to build HTTP client")?,
        );
        let session = Arc::new(SessionManager::new(api.clone(), &config));
        session.init().await;

        Ok(Self {
            config,
            api,
            session,
            quiet,
        })
    }

    /// The signed-in user, if they hold one of `roles`. An empty list admits
    /// anyone signed in.
    pub fn require(&self, roles: &[&str]) -> Result<User> {
        match self.session.guard(roles, |user| user.clone()) {
            Guarded::Render(user) => Ok(user),
            Guarded::Waiting => bail!("Session is still being verified"),
            Guarded::RedirectToLogin => bail!("Not signed in. Run `fumi login` first."),
            Guarded::AccessDenied(denied) => {
                self.print_warning(&denied.message());
                bail!(
                    "Sign in with another account: `fumi login` ({})",
                    denied.login.path()
                )
            }
        }
    }

    pub fn theme(&self) -> ColorfulTheme {
        ColorfulTheme::default()
    }

    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.quiet {
            return Ok(default);
        }
        Ok(Confirm::with_theme(&self.theme())
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    pub fn print_header(&self, msg: &str) {
        if !self.quiet {
            println!();
            println!("{}", style(msg).bold());
        }
    }

    pub fn print_success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(msg).green());
        }
    }

    pub fn print_warning(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(msg).yellow());
        }
    }

    pub fn print_info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(msg).cyan());
        }
    }
}

/// Unwrap a response, turning a failure into an error carrying its message.
pub fn expect_data<T>(response: ApiResponse<T>) -> Result<T> {
    match response {
        ApiResponse::Success(data) => Ok(data),
        ApiResponse::Failure(failure) => {
            if let Some(body) = &failure.body {
                tracing::debug!(status = ?failure.status, body = %body, "Server response");
            }
            if failure.kind.is_transient() {
                bail!("{} (try again in a moment)", failure.message)
            }
            bail!("{}", failure.message)
        }
    }
}
