// ============================
// sessiongate-lib/src/auth/cookie.rs
// ============================
//! Session cookie parsing and `Set-Cookie` construction.

/// Find the value of cookie `name` in a `Cookie` request header
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| unquote(value.trim()).to_string())
}

/// Strip one enclosing pair of double quotes; anything else is kept as is
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

/// `Set-Cookie` value that stores the session token
pub fn session_cookie(name: &str, token: &str) -> String {
    format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value that makes the browser drop the session cookie
pub fn expired_session_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Whether `name` is usable as a cookie name (an RFC 6265 token)
pub fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value_lookup() {
        let header = "theme=dark; _my_session_id=abc123; lang=en";
        assert_eq!(cookie_value(header, "_my_session_id").as_deref(), Some("abc123"));
        assert_eq!(cookie_value(header, "lang").as_deref(), Some("en"));
        assert!(cookie_value(header, "missing").is_none());
    }

    #[test]
    fn test_cookie_value_is_exact_name_match() {
        let header = "x_my_session_id=nope;_my_session_id=yes";
        assert_eq!(cookie_value(header, "_my_session_id").as_deref(), Some("yes"));
    }

    #[test]
    fn test_cookie_value_keeps_equals_in_value() {
        assert_eq!(cookie_value("sid=a=b", "sid").as_deref(), Some("a=b"));
        assert_eq!(cookie_value("sid=\"quoted\"", "sid").as_deref(), Some("quoted"));
        assert_eq!(cookie_value("sid=", "sid").as_deref(), Some(""));
    }

    #[test]
    fn test_cookie_value_strips_only_a_matched_quote_pair() {
        assert_eq!(cookie_value("sid=\"\"abc\"\"", "sid").as_deref(), Some("\"abc\""));
        assert_eq!(cookie_value("sid=\"abc", "sid").as_deref(), Some("\"abc"));
        assert_eq!(cookie_value("sid=abc\"", "sid").as_deref(), Some("abc\""));
        assert_eq!(cookie_value("sid=\"", "sid").as_deref(), Some("\""));
        assert_eq!(cookie_value("sid=\"\"", "sid").as_deref(), Some(""));
    }

    #[test]
    fn test_set_cookie_values() {
        assert_eq!(
            session_cookie("_my_session_id", "tok"),
            "_my_session_id=tok; Path=/; HttpOnly; SameSite=Lax"
        );
        assert!(expired_session_cookie("_my_session_id").ends_with("Max-Age=0"));
    }

    #[test]
    fn test_cookie_name_validation() {
        assert!(is_valid_cookie_name("_my_session_id"));
        assert!(!is_valid_cookie_name(""));
        assert!(!is_valid_cookie_name("bad name"));
        assert!(!is_valid_cookie_name("semi;colon"));
    }
}
