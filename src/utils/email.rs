//! Outbound email behind the [`Mailer`] trait.
//!
//! The credential lifecycle only ever talks to `dyn Mailer`, so tests can
//! substitute a failing mock to exercise the compensating-cleanup paths
//! (token fields must be cleared when the send fails after persistence).

use async_trait::async_trait;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::instrument;

use batchwise_config::EmailConfig;
use batchwise_core::AppError;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        reset_token: &str,
    ) -> Result<(), AppError>;

    async fn send_verification_email(
        &self,
        to_email: &str,
        to_name: &str,
        verification_token: &str,
    ) -> Result<(), AppError>;
}

/// SMTP-backed [`Mailer`] implementation.
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self, text_body, html_body))]
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::info!(to = %to_email, subject = %subject, "SMTP disabled, skipping email");
            return Ok(());
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal_error(format!("Invalid from email: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::internal_error(format!("Invalid to email: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::internal_error(format!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| {
                    AppError::internal_error(format!("Failed to create SMTP relay: {}", e))
                })?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal_error(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal_error(format!("Failed to send email: {}", e)))?;

        Ok(())
    }

    fn action_template(&self, name: &str, heading: &str, body: &str, link: &str, cta: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<body style="margin: 0; padding: 20px; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="600" align="center" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px;">
        <tr>
            <td style="background-color: #4F46E5; padding: 24px; text-align: center;">
                <h1 style="margin: 0; color: #ffffff; font-size: 24px;">Batchwise</h1>
            </td>
        </tr>
        <tr>
            <td style="padding: 32px;">
                <h2 style="margin: 0 0 16px 0; color: #333333;">{heading}</h2>
                <p style="color: #666666; font-size: 16px;">Hi <strong>{name}</strong>,</p>
                <p style="color: #666666; font-size: 16px;">{body}</p>
                <p style="text-align: center; margin: 28px 0;">
                    <a href="{link}" style="display: inline-block; padding: 12px 36px; background-color: #4F46E5; color: #ffffff; text-decoration: none; border-radius: 6px; font-weight: bold;">{cta}</a>
                </p>
                <p style="color: #4F46E5; font-size: 13px; word-break: break-all;">{link}</p>
                <p style="color: #666666; font-size: 13px;">If you didn't request this, please ignore this email.</p>
            </td>
        </tr>
    </table>
</body>
</html>"#
        )
    }
}

#[async_trait]
impl Mailer for EmailService {
    #[instrument(skip(self, reset_token))]
    async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        reset_token: &str,
    ) -> Result<(), AppError> {
        let reset_link = format!(
            "{}/reset-password?token={}",
            self.config.frontend_url, reset_token
        );

        let html_body = self.action_template(
            to_name,
            "Password Reset Request",
            "We received a request to reset your password. Click the button below to create a new password. This link will expire in 1 hour.",
            &reset_link,
            "Reset Password",
        );
        let text_body = format!(
            "Hi {},\n\n\
             You requested to reset your password.\n\n\
             Click the link below to reset your password:\n\
             {}\n\n\
             This link will expire in 1 hour.\n\n\
             If you didn't request this, please ignore this email.\n\n\
             Best regards,\n\
             Batchwise Team",
            to_name, reset_link
        );

        self.send_email(to_email, "Password Reset Request", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self, verification_token))]
    async fn send_verification_email(
        &self,
        to_email: &str,
        to_name: &str,
        verification_token: &str,
    ) -> Result<(), AppError> {
        let verify_link = format!(
            "{}/verify-email?token={}",
            self.config.frontend_url, verification_token
        );

        let html_body = self.action_template(
            to_name,
            "Verify Your Email",
            "Please confirm this email address belongs to you. This link will expire in 24 hours.",
            &verify_link,
            "Verify Email",
        );
        let text_body = format!(
            "Hi {},\n\n\
             Please verify your email address by clicking the link below:\n\
             {}\n\n\
             This link will expire in 24 hours.\n\n\
             If you didn't request this, please ignore this email.\n\n\
             Best regards,\n\
             Batchwise Team",
            to_name, verify_link
        );

        self.send_email(to_email, "Verify Your Email", &text_body, &html_body)
            .await
    }
}
