//! Navigation shell and auth gate.
//!
//! Routing rules:
//! - `/` always redirects to `/chat`
//! - `/chat` redirects to `/login` unless authenticated
//! - `/login` and `/register` are always reachable
//! - while a stored token is being validated nothing is routed

use tracing::{debug, info, warn};

use chatdeck_core::config::AuthConfig;
use chatdeck_core::AuthStatus;

use crate::auth_forms::{self, AuthError, LoginForm, RegisterForm};
use crate::context::AppContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Register,
    Chat,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Chat => "/chat",
        }
    }

}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    /// Auth state is still being determined.
    Loading,
    Render(Route),
    Redirect(Route),
}

/// One routing step for `route` under `status`.
pub fn resolve(route: Route, status: &AuthStatus) -> RouteDecision {
    if *status == AuthStatus::Validating {
        return RouteDecision::Loading;
    }
    match route {
        Route::Root => RouteDecision::Redirect(Route::Chat),
        Route::Chat if !status.is_authenticated() => RouteDecision::Redirect(Route::Login),
        other => RouteDecision::Render(other),
    }
}

// ─────────────────────────────────────────────
// Shell
// ─────────────────────────────────────────────

pub struct Shell {
    ctx: AppContext,
    config: AuthConfig,
    route: Option<Route>,
    notice: Option<String>,
}

impl Shell {
    pub fn new(ctx: AppContext, config: AuthConfig) -> Self {
        Self {
            ctx,
            config,
            route: None,
            notice: None,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// The route currently rendered, `None` before the first navigation.
    pub fn route(&self) -> Option<Route> {
        self.route
    }

    /// A message for the user left by the last bootstrap, if any.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Determine auth state from the stored token.
    ///
    /// The token is discarded only when the backend rejects it. If the
    /// backend cannot be reached the token is kept on disk and the shell
    /// stays unauthenticated with a notice.
    pub async fn bootstrap(&mut self) -> AuthStatus {
        let Some(token) = self.ctx.token() else {
            debug!("no stored token");
            self.ctx.auth().set(AuthStatus::Unauthenticated);
            return self.ctx.auth().status();
        };

        if !self.config.validate_on_start {
            debug!("trusting stored token without validation");
            self.ctx
                .auth()
                .set(AuthStatus::Authenticated { username: None });
            return self.ctx.auth().status();
        }

        self.ctx.auth().set(AuthStatus::Validating);
        match self.ctx.api().validate_token(&token).await {
            Ok(username) => {
                info!(username = username.as_deref().unwrap_or("?"), "stored token accepted");
                self.ctx.auth().set(AuthStatus::Authenticated { username });
            }
            Err(e) if e.is_unauthorized() => {
                warn!(error = %e, "stored token rejected, discarding");
                self.ctx.sign_out();
            }
            Err(e) => {
                warn!(error = %e, "could not validate stored token, keeping it");
                self.notice = Some(format!(
                    "{} Your saved login was kept for next time.",
                    e.user_message()
                ));
                self.ctx.auth().set(AuthStatus::Unauthenticated);
            }
        }
        self.ctx.auth().status()
    }

    /// Follow redirects from `target` and render the final route.
    ///
    /// Returns `Loading` without changing the route while validation is pending.
    pub fn navigate(&mut self, target: Route) -> RouteDecision {
        let status = self.ctx.auth().status();
        let mut route = target;
        // the redirect graph is acyclic: Root → Chat → Login
        for _ in 0..3 {
            match resolve(route, &status) {
                RouteDecision::Loading => return RouteDecision::Loading,
                RouteDecision::Redirect(next) => {
                    debug!(from = %route, to = %next, "redirect");
                    route = next;
                }
                RouteDecision::Render(r) => {
                    self.route = Some(r);
                    return RouteDecision::Render(r);
                }
            }
        }
        self.route = Some(Route::Login);
        RouteDecision::Render(Route::Login)
    }

    /// Re-check the current route after an auth change, e.g. a token
    /// rejected mid-session.
    pub fn refresh(&mut self) -> RouteDecision {
        self.navigate(self.route.unwrap_or(Route::Root))
    }

    pub async fn login(&mut self, form: &LoginForm) -> Result<Route, AuthError> {
        auth_forms::submit_login(&self.ctx, form).await?;
        self.navigate(Route::Chat);
        Ok(self.route.unwrap_or(Route::Chat))
    }

    pub async fn register(&mut self, form: &RegisterForm) -> Result<Route, AuthError> {
        auth_forms::submit_register(&self.ctx, form).await?;
        self.navigate(Route::Chat);
        Ok(self.route.unwrap_or(Route::Chat))
    }

    /// Clear the token, flip to unauthenticated and go to `/login`.
    pub fn logout(&mut self) -> Route {
        info!("logging out");
        self.ctx.sign_out();
        self.navigate(Route::Login);
        Route::Login
    }
}
