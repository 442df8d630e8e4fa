use std::future::{Ready, ready};

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use thiserror::Error;

use crate::adapters::api::ApiState;
use crate::domain::session_token::{SessionClaims, TOKEN_TTL, verify_token};

pub const SESSION_COOKIE_NAME: &str = "auth_token";

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub jwt_secret: String,
    pub production: bool,
}

/// Builds the session cookie with its issuance attributes. Clearing must
/// reuse the same attribute set, or some clients keep the stale cookie.
pub fn build_session_cookie(settings: &SessionSettings, token: String) -> Cookie<'static> {
    let same_site = if settings.production {
        SameSite::None
    } else {
        SameSite::Lax
    };

    Cookie::build(SESSION_COOKIE_NAME, token)
        .http_only(true)
        .secure(settings.production)
        .same_site(same_site)
        .path("/")
        .max_age(CookieDuration::seconds(TOKEN_TTL.as_secs() as i64))
        .finish()
}

pub fn clear_session_cookie(settings: &SessionSettings) -> Cookie<'static> {
    let mut cookie = build_session_cookie(settings, String::new());
    cookie.make_removal();
    cookie
}

/// Non-rejecting token check for probe endpoints.
pub fn probe_session(req: &HttpRequest, settings: &SessionSettings) -> Option<SessionClaims> {
    let cookie = req.cookie(SESSION_COOKIE_NAME)?;
    verify_token(cookie.value(), &settings.jwt_secret).ok()
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionRejection {
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("session settings unavailable")]
    SettingsUnavailable,
}

impl ResponseError for SessionRejection {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotAuthenticated | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::SettingsUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "message": self.to_string() }))
    }
}

/// Request guard for endpoints behind the session cookie. Extraction
/// verifies the token once and carries the decoded claims into the handler;
/// rejections surface as 401 JSON bodies.
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub claims: SessionClaims,
}

impl FromRequest for AuthenticatedUser {
    type Error = SessionRejection;
    type Future = Ready<Result<Self, SessionRejection>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, SessionRejection> {
    let state = req
        .app_data::<web::Data<ApiState>>()
        .ok_or(SessionRejection::SettingsUnavailable)?;

    let cookie = req
        .cookie(SESSION_COOKIE_NAME)
        .ok_or(SessionRejection::NotAuthenticated)?;

    let claims = verify_token(cookie.value(), &state.session.jwt_secret)
        .map_err(|_| SessionRejection::InvalidToken)?;

    Ok(AuthenticatedUser { claims })
}
