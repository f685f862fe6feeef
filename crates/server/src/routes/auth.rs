use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{Html, IntoResponse, Redirect, Response},
};

use helmios_api::{LoginForm, ServiceError, SignupForm};

use crate::auth::AuthService;
use crate::error::{AuthError, PageErr};
use crate::session::{SessionManager, extract_session_token};
use crate::views;

/// Shared by every login failure so unknown users and wrong passwords look alike.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

/// GET /signup
pub async fn signup_form() -> Html<String> {
    views::signup(false)
}

/// POST /signup: redeem an invite and create the account.
pub async fn signup(State(auth): State<AuthService>, Form(form): Form<SignupForm>) -> Response {
    tracing::info!(
        "signup request: username={:?} invite={:?}",
        form.username,
        form.invite_code
    );

    match auth
        .register(&form.username, &form.password, &form.invite_code)
        .await
    {
        Ok(_) => Redirect::to("/login").into_response(),
        Err(AuthError::InvalidInvite) => views::signup(true).into_response(),
        Err(AuthError::UsernameTaken) => {
            PageErr::bad_request("Username already exists").into_response()
        }
        Err(AuthError::Service(ServiceError::BadRequest(msg))) => {
            (StatusCode::BAD_REQUEST, msg).into_response()
        }
        Err(e) => {
            tracing::error!("error registering user: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error registering user").into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Login / logout
// ---------------------------------------------------------------------------

/// GET /login
pub async fn login_form() -> Html<String> {
    views::login()
}

/// POST /login: check credentials and start a session.
pub async fn login(
    State(auth): State<AuthService>,
    State(sessions): State<SessionManager>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageErr> {
    let user_id = match auth.login(&form.username, &form.password).await {
        Ok(user_id) => user_id,
        Err(AuthError::InvalidCredentials) => {
            return Err(PageErr::bad_request(INVALID_CREDENTIALS));
        }
        Err(e) => return Err(PageErr::from_store("login")(e)),
    };

    // Never reuse a token the client arrived with.
    if let Some(previous) = extract_session_token(&headers) {
        sessions
            .destroy_session(&previous)
            .map_err(PageErr::from_store("rotate session"))?;
    }

    let token = sessions
        .create_session(&user_id)
        .map_err(PageErr::from_store("create session"))?;
    let cookie = sessions
        .session_cookie(&token)
        .map_err(PageErr::from_store("session cookie"))?;

    tracing::info!("user {user_id} logged in");
    Ok(([(SET_COOKIE, cookie)], Redirect::to("/dashboard")).into_response())
}

/// GET /logout: end the session and return to the login page.
pub async fn logout(
    State(sessions): State<SessionManager>,
    headers: HeaderMap,
) -> Result<Response, PageErr> {
    if let Some(token) = extract_session_token(&headers) {
        sessions
            .destroy_session(&token)
            .map_err(PageErr::from_store("logout"))?;
    }

    // Always clear the cookie, even if the session record was missing.
    let clear = sessions
        .clear_cookie()
        .map_err(PageErr::from_store("clear cookie"))?;
    Ok(([(SET_COOKIE, clear)], Redirect::to("/login")).into_response())
}
