//! Fire-and-forget delivery of customer and operator notifications.
//!
//! Request handlers enqueue a [`Notification`] on the [`NotificationDispatcher`]
//! and return immediately. A single [`NotificationWorker`] drains the queue and
//! hands each message to a [`Notifier`]; failures are logged and dropped.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::model::order::{OrderAddress, OrderStatus, PaymentMethod};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub order_number: String,
    pub service_name: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub total_amount: f64,
    pub payment_method: PaymentMethod,
    pub address: OrderAddress,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    EmailVerification { to: String, name: String, link: String },
    PasswordReset { to: String, name: String, link: String },
    /// Sent once to the customer and once to the operator address.
    OrderPlaced { to: String, operator_copy: bool, order: OrderSummary },
    OrderStatusChanged {
        to: String,
        name: String,
        order_number: String,
        status: OrderStatus,
        notes: Option<String>,
    },
}

impl Notification {
    pub fn recipient(&self) -> &str {
        match self {
            Notification::EmailVerification { to, .. }
            | Notification::PasswordReset { to, .. }
            | Notification::OrderPlaced { to, .. }
            | Notification::OrderStatusChanged { to, .. } => to,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notification::EmailVerification { .. } => "email_verification",
            Notification::PasswordReset { .. } => "password_reset",
            Notification::OrderPlaced { operator_copy: false, .. } => "order_confirmation",
            Notification::OrderPlaced { operator_copy: true, .. } => "order_operator_copy",
            Notification::OrderStatusChanged { .. } => "order_status",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Used when no SMTP server is configured.
pub struct LogOnlyNotifier;

#[async_trait]
impl Notifier for LogOnlyNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        warn!(
            kind = notification.kind(),
            to = %notification.recipient(),
            "Email is not configured, skipping notification"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::Sender<Notification>,
}

impl NotificationDispatcher {
    /// Queues without waiting. A full or closed queue drops the message.
    pub fn dispatch(&self, notification: Notification) {
        let kind = notification.kind();
        if let Err(e) = self.sender.try_send(notification) {
            error!(kind, "Could not queue notification: {}", e);
        }
    }

    /// Creates the queue and starts its worker on the current runtime.
    pub fn spawn(notifier: Arc<dyn Notifier>, buffer_size: usize) -> Self {
        let (worker, dispatcher) = NotificationWorker::new(notifier, buffer_size);
        tokio::spawn(worker.run());
        dispatcher
    }
}

pub struct NotificationWorker {
    receiver: mpsc::Receiver<Notification>,
    notifier: Arc<dyn Notifier>,
}

impl NotificationWorker {
    pub fn new(notifier: Arc<dyn Notifier>, buffer_size: usize) -> (Self, NotificationDispatcher) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        (NotificationWorker { receiver, notifier }, NotificationDispatcher { sender })
    }

    pub async fn run(mut self) {
        info!("Notification worker started");
        while let Some(notification) = self.receiver.recv().await {
            match self.notifier.deliver(&notification).await {
                Ok(()) => info!(kind = notification.kind(), to = %notification.recipient(), "Notification delivered"),
                Err(e) => error!(kind = notification.kind(), to = %notification.recipient(), "{}", e),
            }
        }
        info!("Notification worker stopped");
    }
}
