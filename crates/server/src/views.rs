//! HTML pages. Small enough to build by hand; every interpolated value
//! goes through [`escape`].

use axum::response::Html;

use helmios_api::UserProfile;

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} · helmios</title>\n\
         <link rel=\"stylesheet\" href=\"/styles/main.css\">\n\
         </head>\n\
         <body>\n\
         {body}\n\
         </body>\n\
         </html>\n",
        title = escape(title),
    ))
}

/// Escape text for HTML element and attribute contexts.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn home() -> Html<String> {
    page(
        "Welcome",
        "<main class=\"home\">\n\
         <h1>helmios</h1>\n\
         <p>Membership is by invitation.</p>\n\
         <nav><a href=\"/signup\">Sign up</a> <a href=\"/login\">Log in</a></nav>\n\
         <span class=\"dots\">&hellip;</span>\n\
         <p id=\"textField\">Ask a member for an invite code.</p>\n\
         </main>\n\
         <script src=\"/scripts/home.js\"></script>",
    )
}

pub fn signup(invite_code_error: bool) -> Html<String> {
    let error = if invite_code_error {
        "<p class=\"error\" role=\"alert\">Invalid invite code.</p>\n"
    } else {
        ""
    };
    page(
        "Sign up",
        &format!(
            "<main>\n\
             <h1>Sign up</h1>\n\
             {error}\
             <form method=\"post\" action=\"/signup\">\n\
             <label>Username <input name=\"username\" required></label>\n\
             <label>Password <input name=\"password\" type=\"password\" required></label>\n\
             <label>Invite code <input name=\"inviteCode\" required></label>\n\
             <button type=\"submit\">Create account</button>\n\
             </form>\n\
             <p>Already registered? <a href=\"/login\">Log in</a></p>\n\
             </main>"
        ),
    )
}

pub fn login() -> Html<String> {
    page(
        "Log in",
        "<main>\n\
         <h1>Log in</h1>\n\
         <form method=\"post\" action=\"/login\">\n\
         <label>Username <input name=\"username\" required></label>\n\
         <label>Password <input name=\"password\" type=\"password\" required></label>\n\
         <button type=\"submit\">Log in</button>\n\
         </form>\n\
         <p>Have an invite? <a href=\"/signup\">Sign up</a></p>\n\
         </main>",
    )
}

pub fn dashboard(user: &UserProfile) -> Html<String> {
    page(
        "Dashboard",
        &format!(
            "<main>\n\
             <h1>Welcome, {username}</h1>\n\
             <dl>\n\
             <dt>User ID</dt><dd>{id}</dd>\n\
             <dt>Invite code</dt><dd>{invite}</dd>\n\
             <dt>Member since</dt><dd>{created}</dd>\n\
             </dl>\n\
             <p><a href=\"/logout\">Log out</a></p>\n\
             </main>",
            username = escape(&user.username),
            id = escape(&user.id),
            invite = escape(&user.invite_code),
            created = escape(&user.created_at),
        ),
    )
}
