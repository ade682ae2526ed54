//! Invitation email delivery over SMTP.

use anyhow::Result;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::EmailConfig;

/// Service for sending system emails
pub struct Mailer {
    config: EmailConfig,
}

impl Mailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Check if email sending is configured and enabled
    pub fn is_enabled(&self) -> bool {
        self.config.is_configured()
    }

    /// Send an artist invitation email
    pub async fn send_invitation_email(
        &self,
        to_email: &str,
        token: &str,
        expires_in_days: i64,
    ) -> Result<()> {
        if !self.is_enabled() {
            tracing::warn!(
                "Email not configured, skipping invitation email to {}",
                to_email
            );
            return Ok(());
        }

        let invite_url = format!(
            "{}/invite/{}",
            self.config.frontend_url.trim_end_matches('/'),
            token
        );
        let subject = "You're invited to the availability calendar";
        let html_body = render_invitation_html(&invite_url, expires_in_days);
        let text_body = render_invitation_text(&invite_url, expires_in_days);

        self.send_email(to_email, subject, &html_body, &text_body)
            .await
    }

    /// Send an email with HTML and plain text versions
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<()> {
        let smtp_host = self
            .config
            .smtp_host
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("SMTP host not configured"))?;
        let from_address = self
            .config
            .from_address
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("From address not configured"))?;

        let from_mailbox = format!("{} <{}>", self.config.from_name, from_address);
        let from: Mailbox = from_mailbox.parse()?;
        let to: Mailbox = to_email.parse()?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        let mailer = if self.config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer
        };

        mailer.build().send(email).await?;

        tracing::info!(
            to = %to_email,
            subject = %subject,
            "Email sent successfully"
        );

        Ok(())
    }
}

/// Render the HTML version of the invitation email
fn render_invitation_html(invite_url: &str, expires_in_days: i64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Invitation</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; background-color: #f5f5f5; margin: 0; padding: 40px 20px;">
    <div style="max-width: 560px; margin: 0 auto; background-color: #ffffff; border-radius: 8px; padding: 32px 24px;">
        <h2 style="margin-top: 0; color: #111827;">You're invited to join the availability calendar</h2>
        <p style="color: #374151; line-height: 1.6;">Click the button below to create your artist account and start marking the days you're available.</p>
        <div style="text-align: center; margin: 32px 0;">
            <a href="{invite_url}" style="display: inline-block; background-color: #3b82f6; color: white; text-decoration: none; padding: 14px 32px; border-radius: 6px; font-weight: 500;">
                Create my account
            </a>
        </div>
        <p style="color: #6b7280; font-size: 13px; text-align: center;">This link expires in {expires_in_days} days. If you didn't expect this invitation, you can safely ignore this email.</p>
    </div>
</body>
</html>"#,
        invite_url = invite_url,
        expires_in_days = expires_in_days,
    )
}

/// Render the plain text version of the invitation email
fn render_invitation_text(invite_url: &str, expires_in_days: i64) -> String {
    format!(
        r#"You're invited to join the availability calendar

To create your artist account, visit:
{invite_url}

This link expires in {expires_in_days} days.

If you didn't expect this invitation, you can safely ignore this email."#,
        invite_url = invite_url,
        expires_in_days = expires_in_days,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_invitation_text() {
        let text = render_invitation_text("https://example.com/invite/abc123", 7);
        assert!(text.contains("https://example.com/invite/abc123"));
        assert!(text.contains("7 days"));
    }

    #[test]
    fn test_render_invitation_html() {
        let html = render_invitation_html("https://example.com/invite/abc123", 7);
        assert!(html.contains("https://example.com/invite/abc123"));
        assert!(html.contains("7 days"));
        assert!(html.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_mailer_disabled_without_config() {
        let mailer = Mailer::new(EmailConfig::default());
        assert!(!mailer.is_enabled());
    }

    #[tokio::test]
    async fn test_send_skips_silently_when_disabled() {
        let mailer = Mailer::new(EmailConfig::default());
        // no SMTP configured: returns Ok without attempting delivery
        mailer
            .send_invitation_email("artist@example.com", "tok", 7)
            .await
            .unwrap();
    }
}
