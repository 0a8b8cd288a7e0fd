//! Verification and password-reset mail bodies

/// Links stay valid for two days
pub const LINK_TTL_MINUTES: i64 = 2880;

/// Rendered mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailContent {
    pub subject: String,
    pub body: String,
}

/// `<app_url>/<path>?token=<token>&timestamp=<expiry_ms>`
pub fn link(app_url: &str, path: &str, token: &str, expiry_ms: i64) -> String {
    format!(
        "{}/{}?token={}&timestamp={}",
        app_url.trim_end_matches('/'),
        path,
        token,
        expiry_ms
    )
}

pub fn verification(username: &str, link: &str) -> MailContent {
    MailContent {
        subject: "Verify your coffee shop account".to_string(),
        body: format!(
            "Hi {username},\n\nConfirm your email address by opening the link below:\n\n{link}\n\nThe link expires in 48 hours.\n"
        ),
    }
}

pub fn password_reset(username: &str, link: &str) -> MailContent {
    MailContent {
        subject: "Reset your coffee shop password".to_string(),
        body: format!(
            "Hi {username},\n\nSomeone asked to reset your password. If that was you, open the link below:\n\n{link}\n\nThe link expires in 48 hours. Ignore this mail otherwise.\n"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_format() {
        assert_eq!(
            link("http://localhost:3000/", "verify", "abc", 42),
            "http://localhost:3000/verify?token=abc&timestamp=42"
        );
    }

    #[test]
    fn test_bodies_contain_link() {
        let l = link("http://localhost:3000", "resetpassword", "abc", 42);
        assert!(password_reset("barista", &l).body.contains(&l));
        assert!(verification("barista", &l).body.contains("barista"));
    }
}
