//! Minimal static page shells for the form routes. Real templating is out
//! of scope; these exist so the routes render usable forms and message
//! lists. Successful posts answer with an `HX-Location` header, so the
//! shell loads htmx.

use crate::profile::types::User;

fn shell(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="https://unpkg.com/htmx.org@1.9.12"></script>
</head>
<body>
<nav><a href="/">Home</a> <a href="/edit">Edit profile</a> <a href="/upload-avatar">Avatar</a> <a href="/logout">Logout</a></nav>
{body}
</body>
</html>"#
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn error_list(messages: &[String]) -> String {
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", escape(m)))
        .collect();
    format!(r#"<ul class="errors">{items}</ul>"#)
}

pub fn register_form() -> String {
    shell(
        "Register",
        r#"<h1>Register</h1>
<form hx-post="/register">
<label>Name <input name="name"></label>
<label>Email <input name="email" type="email"></label>
<label>Password <input name="password" type="password"></label>
<label>Category <select name="category"><option value="1">Personal</option><option value="2">Business</option></select></label>
<button type="submit">Register</button>
</form>
<p><a href="/login">Already have an account?</a></p>"#,
    )
}

pub fn login_form() -> String {
    shell(
        "Login",
        r#"<h1>Login</h1>
<form hx-post="/login">
<label>Email <input name="email" type="email"></label>
<label>Password <input name="password" type="password"></label>
<button type="submit">Login</button>
</form>
<p><a href="/register">Need an account?</a></p>"#,
    )
}

pub fn home(user: Option<&User>) -> String {
    let body = match user {
        Some(user) => {
            let avatar = if user.avatar.is_empty() {
                String::new()
            } else {
                format!(
                    r#"<img src="/uploads/{}" alt="avatar" width="120">"#,
                    escape(&user.avatar)
                )
            };
            format!(
                "<h1>Welcome, {}</h1>\n{}\n<p>{}</p>",
                escape(&user.name),
                avatar,
                escape(&user.bio)
            )
        }
        None => r#"<h1>Welcome</h1><p><a href="/login">Login</a> or <a href="/register">register</a>.</p>"#.to_string(),
    };
    shell("Home", &body)
}

pub fn edit_form(user: &User) -> String {
    let body = format!(
        r#"<h1>Edit profile</h1>
<form hx-post="/edit">
<label>Name <input name="name" value="{}"></label>
<label>Date of birth <input name="dob" type="date" value="{}"></label>
<label>Bio <textarea name="bio">{}</textarea></label>
<button type="submit">Save</button>
</form>"#,
        escape(&user.name),
        user.dob,
        escape(&user.bio)
    );
    shell("Edit profile", &body)
}

pub fn upload_form(user: &User) -> String {
    let current = if user.avatar.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p>Current: <img src="/uploads/{}" alt="avatar" width="120"></p>"#,
            escape(&user.avatar)
        )
    };
    let body = format!(
        r#"<h1>Upload avatar</h1>
{current}
<form hx-post="/upload-avatar" hx-encoding="multipart/form-data">
<input name="avatar" type="file" accept="image/*">
<button type="submit">Upload</button>
</form>"#
    );
    shell("Upload avatar", &body)
}
