use async_trait::async_trait;
use crate::config::{EmailConfig, ConfigError};
use crate::model::order::{OrderAddress, OrderStatus, PaymentMethod};
use crate::util::notification::{Notification, Notifier, NotifyError, OrderSummary};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use tracing::{error, info, instrument};

/// Email service errors
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SMTP error: {0}")]
    SmtpError(String),

    #[error("Message building error: {0}")]
    MessageError(String),

    #[error("Address error: {0}")]
    AddressError(String),
}

impl From<ConfigError> for EmailError {
    fn from(err: ConfigError) -> Self {
        EmailError::ConfigError(err.to_string())
    }
}

/// Email message builder
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
}

impl EmailMessage {
    pub fn new(to: String, subject: String) -> Self {
        Self {
            to,
            subject,
            text_body: None,
            html_body: None,
        }
    }

    pub fn with_text_body(mut self, body: String) -> Self {
        self.text_body = Some(body);
        self
    }

    pub fn with_html_body(mut self, body: String) -> Self {
        self.html_body = Some(body);
        self
    }
}

/// SMTP email service implementation
pub struct SmtpEmailService {
    pub config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    #[instrument(skip(config), fields(host = %config.smtp_host, port = config.smtp_port))]
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        info!("Initializing SMTP email service");

        config.validate().map_err(EmailError::from)?;

        let mut transport_builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .timeout(Some(std::time::Duration::from_secs(config.connection_timeout_secs)));

        if config.use_tls {
            let tls_parameters = TlsParameters::new(config.smtp_host.clone())
                .map_err(|e| EmailError::ConfigError(format!("TLS configuration error: {}", e)))?;

            if config.use_starttls {
                transport_builder = transport_builder.tls(Tls::Required(tls_parameters));
            } else {
                transport_builder = transport_builder.tls(Tls::Wrapper(tls_parameters));
            }
        } else {
            transport_builder = transport_builder.tls(Tls::None);
        }

        if !config.smtp_username.is_empty() && !config.smtp_password.is_empty() {
            let credentials = Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            );
            transport_builder = transport_builder.credentials(credentials);
        }

        let transport = transport_builder.build();

        info!("SMTP email service initialized successfully");
        Ok(Self { config, transport })
    }

    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    pub async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        validate_email_address(&message.to)?;

        let email_message = self.build_message(message)?;

        self.transport
            .send(email_message)
            .await
            .map_err(|e| {
                error!("Failed to send email: {}", e);
                EmailError::SmtpError(format!("Failed to send email: {}", e))
            })?;

        info!("Email sent successfully");
        Ok(())
    }

    fn build_message(&self, email_message: EmailMessage) -> Result<Message, EmailError> {
        let from_mailbox: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid from address: {}", e)))?;

        let to_mailbox: Mailbox = email_message.to
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid to address: {}", e)))?;

        let message_builder = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&email_message.subject);

        match (email_message.text_body, email_message.html_body) {
            (Some(text), Some(html)) => message_builder
                .multipart(
                    MultiPart::alternative()
                        .singlepart(SinglePart::builder().header(ContentType::TEXT_PLAIN).body(text))
                        .singlepart(SinglePart::builder().header(ContentType::TEXT_HTML).body(html)),
                )
                .map_err(|e| EmailError::MessageError(format!("Failed to build multipart message: {}", e))),
            (Some(text), None) => message_builder
                .body(text)
                .map_err(|e| EmailError::MessageError(format!("Failed to build text message: {}", e))),
            (None, Some(html)) => message_builder
                .singlepart(SinglePart::builder().header(ContentType::TEXT_HTML).body(html))
                .map_err(|e| EmailError::MessageError(format!("Failed to build HTML message: {}", e))),
            (None, None) => Err(EmailError::MessageError("No message body provided".to_string())),
        }
    }
}

#[async_trait]
impl Notifier for SmtpEmailService {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = render(notification);
        self.send_email(message)
            .await
            .map_err(|e| NotifyError(e.to_string()))
    }
}

fn validate_email_address(email: &str) -> Result<(), EmailError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(EmailError::AddressError(format!("Invalid email format: {}", email)));
    }
    Ok(())
}

/// Turns a notification into a ready-to-send message.
pub fn render(notification: &Notification) -> EmailMessage {
    match notification {
        Notification::EmailVerification { to, name, link } => EmailMessage::new(
            to.clone(),
            "Verify your email - Woostaa".to_string(),
        )
        .with_text_body(format!(
            "Hello {name},\n\nThanks for signing up with Woostaa. Please confirm your email address by opening this link:\n\n{link}\n\nIf you did not create an account, you can ignore this email.\n\nThe Woostaa Team"
        ))
        .with_html_body(layout(
            "Verify your email",
            &format!(
                "<p>Hello {name},</p><p>Thanks for signing up with Woostaa. Please confirm your email address.</p>{button}<p>If you did not create an account, you can ignore this email.</p>",
                name = esc(name),
                button = button(link, "Verify Email"),
            ),
        )),

        Notification::PasswordReset { to, name, link } => EmailMessage::new(
            to.clone(),
            "Password Reset Request - Woostaa".to_string(),
        )
        .with_text_body(format!(
            "Hello {name},\n\nWe received a request to reset your Woostaa password. Open this link to choose a new one:\n\n{link}\n\nThis link expires in 1 hour. If you did not request a reset, your password stays unchanged.\n\nThe Woostaa Team"
        ))
        .with_html_body(layout(
            "Password Reset Request",
            &format!(
                "<p>Hello {name},</p><p>We received a request to reset your Woostaa password.</p>{button}<p>This link expires in 1 hour. If you did not request a reset, your password stays unchanged.</p>",
                name = esc(name),
                button = button(link, "Reset Password"),
            ),
        )),

        Notification::OrderPlaced { to, operator_copy, order } => {
            let subject = if *operator_copy {
                format!("New Order Received - {}", order.order_number)
            } else {
                format!("Order Confirmation - {}", order.order_number)
            };
            let heading = if *operator_copy { "New Order Received" } else { "Order Confirmation" };
            EmailMessage::new(to.clone(), subject)
                .with_text_body(order_text(order, *operator_copy))
                .with_html_body(layout(heading, &order_html(order, *operator_copy)))
        }

        Notification::OrderStatusChanged { to, name, order_number, status, notes } => {
            let (subject, line) = status_copy(*status);
            let mut text = format!("Hello {name},\n\nOrder {order_number}: {line}\n");
            let mut html = format!(
                "<p>Hello {}</p><p>Order <strong>{}</strong>: {}</p>",
                esc(name),
                esc(order_number),
                esc(line)
            );
            if let Some(notes) = notes.as_deref().filter(|n| !n.trim().is_empty()) {
                text.push_str(&format!("\nNote from our team: {notes}\n"));
                html.push_str(&format!("<p><em>Note from our team:</em> {}</p>", esc(notes)));
            }
            text.push_str("\nThe Woostaa Team");
            EmailMessage::new(to.clone(), format!("{} - {}", subject, order_number))
                .with_text_body(text)
                .with_html_body(layout(subject, &html))
        }
    }
}

fn status_copy(status: OrderStatus) -> (&'static str, &'static str) {
    match status {
        OrderStatus::Confirmed => ("Order Confirmed", "your booking is confirmed and a professional will be assigned shortly."),
        OrderStatus::InProgress => ("Service In Progress", "our professional has started working on your service."),
        OrderStatus::Completed => ("Service Completed", "your service has been completed. Thank you for choosing Woostaa!"),
        OrderStatus::Cancelled => ("Order Cancelled", "your order has been cancelled."),
        OrderStatus::Pending => ("Order Update", "your order is pending confirmation."),
    }
}

fn payment_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Card => "Card",
        PaymentMethod::Upi => "UPI",
        PaymentMethod::Wallet => "Wallet",
        PaymentMethod::Cod => "Cash on Delivery",
    }
}

fn address_line(address: &OrderAddress) -> String {
    [&address.flat_number, &address.apartment_name, &address.area, &address.landmark, &address.pincode]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn order_rows(order: &OrderSummary, operator_copy: bool) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Order Number", order.order_number.clone()),
        ("Service", order.service_name.clone()),
        ("Date", order.scheduled_date.clone()),
        ("Time", order.scheduled_time.clone()),
        ("Amount", format!("₹{:.2}", order.total_amount)),
        ("Payment", payment_label(order.payment_method).to_string()),
        ("Address", address_line(&order.address)),
    ];
    if operator_copy {
        rows.push(("Customer", order.customer_name.clone()));
        rows.push(("Email", order.customer_email.clone()));
        rows.push(("Phone", order.customer_phone.clone()));
    }
    if let Some(instructions) = order.special_instructions.as_deref().filter(|s| !s.trim().is_empty()) {
        rows.push(("Instructions", instructions.to_string()));
    }
    rows
}

fn order_text(order: &OrderSummary, operator_copy: bool) -> String {
    let intro = if operator_copy {
        "A new order has been placed.".to_string()
    } else {
        format!("Hello {},\n\nThank you for your booking. Here are the details:", order.customer_name)
    };
    let rows: String = order_rows(order, operator_copy)
        .into_iter()
        .map(|(label, value)| format!("{label}: {value}\n"))
        .collect();
    format!("{intro}\n\n{rows}\nThe Woostaa Team")
}

fn order_html(order: &OrderSummary, operator_copy: bool) -> String {
    let intro = if operator_copy {
        "<p>A new order has been placed.</p>".to_string()
    } else {
        format!("<p>Hello {},</p><p>Thank you for your booking. Here are the details:</p>", esc(&order.customer_name))
    };
    let rows: String = order_rows(order, operator_copy)
        .into_iter()
        .map(|(label, value)| format!("<tr><td><strong>{}</strong></td><td>{}</td></tr>", label, esc(&value)))
        .collect();
    format!("{intro}<table>{rows}</table>")
}

fn esc(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}

fn button(link: &str, label: &str) -> String {
    format!(
        r#"<div style="text-align: center;"><a href="{link}" class="button">{label}</a></div><p style="word-break: break-all;">{link}</p>"#,
        link = html_escape::encode_double_quoted_attribute(link),
        label = label,
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #f8f9fa; padding: 20px; text-align: center; border-radius: 8px 8px 0 0; }}
        .content {{ background-color: #ffffff; padding: 30px; border: 1px solid #dee2e6; }}
        .button {{ display: inline-block; padding: 12px 24px; background-color: #0d9488; color: #ffffff; text-decoration: none; border-radius: 4px; font-weight: bold; margin: 20px 0; }}
        .footer {{ background-color: #f8f9fa; padding: 15px; text-align: center; font-size: 12px; color: #6c757d; }}
        td {{ padding: 4px 12px 4px 0; vertical-align: top; }}
    </style>
</head>
<body>
    <div class="header"><h1>Woostaa</h1><h2>{title}</h2></div>
    <div class="content">{body}<p>Best regards,<br>The Woostaa Team</p></div>
    <div class="footer"><p>This is an automated message. Please do not reply to this email.</p></div>
</body>
</html>"#,
        title = esc(title),
        body = body,
    )
}
