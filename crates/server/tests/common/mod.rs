#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use tower::ServiceExt;

use helmios_server::config::AppConfig;
use helmios_server::session::SESSION_COOKIE_NAME;
use helmios_server::storage::{self, Db};
use helmios_server::{AppState, app};

/// In-process server over a throwaway data directory.
pub struct TestApp {
    pub dir: tempfile::TempDir,
    pub db: Db,
    router: Router,
}

impl TestApp {
    pub fn new(invite_codes: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let public_dir = dir.path().join("public");
        std::fs::create_dir_all(public_dir.join("scripts")).unwrap();
        std::fs::write(public_dir.join("scripts/home.js"), "// home\n").unwrap();

        let config = AppConfig {
            data_dir: dir.path().join("data"),
            public_dir,
            password_rounds: 1_000,
            ..AppConfig::default()
        };
        let db = storage::init_db(&config.data_dir).unwrap();
        for code in invite_codes {
            db.create_invite_code(code).unwrap();
        }
        let router = app(AppState::new(db.clone(), config));

        Self { dir, db, router }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::builder().method("GET").uri(path);
        if let Some(token) = cookie {
            req = req.header(header::COOKIE, format!("{SESSION_COOKIE_NAME}={token}"));
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, path: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = cookie {
            req = req.header(header::COOKIE, format!("{SESSION_COOKIE_NAME}={token}"));
        }
        self.send(req.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn signup(&self, username: &str, password: &str, invite: &str) -> Response<Body> {
        let body = format!("username={username}&password={password}&inviteCode={invite}");
        self.post_form("/signup", &body, None).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Response<Body> {
        let body = format!("username={username}&password={password}");
        self.post_form("/login", &body, None).await
    }

    /// Log in and return the raw session token.
    pub async fn login_token(&self, username: &str, password: &str) -> String {
        let res = self.login(username, password).await;
        assert_redirect(&res, "/dashboard");
        session_token(&res).expect("login should set a session cookie")
    }
}

pub fn assert_redirect(res: &Response<Body>, to: &str) {
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), to);
}

/// Session token from a `Set-Cookie` header, if one is set to a non-empty value.
pub fn session_token(res: &Response<Body>) -> Option<String> {
    let cookie = res.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let (pair, _) = cookie.split_once(';')?;
    let (name, value) = pair.split_once('=')?;
    (name == SESSION_COOKIE_NAME && !value.is_empty()).then(|| value.to_string())
}

pub async fn body_text(res: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
