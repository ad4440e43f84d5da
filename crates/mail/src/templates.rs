//! Message bodies for the two account emails.
//!
//! Links point back at the public API so the token lands on the matching
//! redemption route.

/// A rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub subject: String,
    pub html_body: String,
}

/// Email asking the recipient to confirm their address.
pub fn verify_email(client_url: &str, token: &str) -> MailMessage {
    let link = format!("{}/api/auth/verify-email/{token}", client_url.trim_end_matches('/'));
    MailMessage {
        subject: "Verify Email".to_string(),
        html_body: format!(
            "<p>Click this link to verify your email: <a href='{link}'>Verify</a></p>\
             <p>The link expires in 15 minutes.</p>"
        ),
    }
}

/// Email carrying a password-reset link.
pub fn reset_password(client_url: &str, token: &str) -> MailMessage {
    let link = format!("{}/api/auth/reset-password/{token}", client_url.trim_end_matches('/'));
    MailMessage {
        subject: "Reset Password".to_string(),
        html_body: format!(
            "<p>Click this link to reset your password: <a href='{link}'>Reset</a></p>\
             <p>If you did not request a reset you can ignore this email.</p>"
        ),
    }
}
