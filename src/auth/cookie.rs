use time::Duration;

use crate::config::SessionConfig;

/// Build the Set-Cookie value carrying a session token. HttpOnly, path `/`,
/// max-age matching the session TTL.
pub fn build_session_cookie(config: &SessionConfig, token: &str, max_age: Duration) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        config.cookie_name,
        token,
        max_age.whole_seconds().max(0),
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the Set-Cookie value that clears the session cookie.
pub fn build_clear_cookie(config: &SessionConfig) -> String {
    let mut cookie = format!(
        "{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax",
        config.cookie_name,
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Pull a named cookie value out of a Cookie request header.
pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();
        if key == name {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secure: bool) -> SessionConfig {
        SessionConfig {
            secret: "s".into(),
            cookie_name: "session".into(),
            ttl_minutes: 180,
            cookie_secure: secure,
        }
    }

    #[test]
    fn session_cookie_has_expected_attributes() {
        let cookie = build_session_cookie(&config(false), "tok", Duration::hours(3));
        assert_eq!(
            cookie,
            "session=tok; Path=/; Max-Age=10800; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn secure_flag_is_appended_when_configured() {
        let cookie = build_session_cookie(&config(true), "tok", Duration::hours(3));
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_zeroes_max_age_and_value() {
        let cookie = build_clear_cookie(&config(false));
        assert_eq!(cookie, "session=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax");
    }

    #[test]
    fn extracts_named_cookie_among_several() {
        let header = "theme=dark; session=abc.def.ghi; lang=en";
        assert_eq!(
            extract_cookie_value(header, "session"),
            Some("abc.def.ghi".to_string())
        );
        assert_eq!(extract_cookie_value(header, "missing"), None);
    }
}
