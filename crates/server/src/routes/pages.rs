use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::error::PageErr;
use crate::session::{CurrentUser, SessionManager};
use crate::storage::Db;
use crate::views;

/// GET /: landing page.
pub async fn home() -> Html<String> {
    views::home()
}

/// GET /dashboard: profile of the logged-in user.
pub async fn dashboard(
    State(db): State<Db>,
    State(sessions): State<SessionManager>,
    user: CurrentUser,
) -> Result<Response, PageErr> {
    let record = db
        .find_user_by_id(&user.user_id)
        .map_err(PageErr::from_store("dashboard user lookup"))?;

    let Some(record) = record else {
        // Session outlived its user row.
        tracing::warn!("session points at missing user {}", user.user_id);
        sessions
            .destroy_session(&user.token)
            .map_err(PageErr::from_store("dashboard session cleanup"))?;
        let clear = sessions
            .clear_cookie()
            .map_err(PageErr::from_store("clear cookie"))?;
        return Ok(([(SET_COOKIE, clear)], Redirect::to("/login")).into_response());
    };

    Ok(views::dashboard(&record.profile()).into_response())
}
