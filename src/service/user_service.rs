use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::admin_user_conf::AdminUserConfig;
use crate::config::{AccountConfig, AppConfig};
use crate::dto::user_dto::{
    LoginRequest, MessageResponse, PublicUser, RegisterRequest, RegisterResponse, ResetPasswordRequest,
    ResetTokenInfo, UpdateProfileRequest, LoginResponse,
};
use crate::model::user::{User, UserProfile, ROLE_ADMIN, ROLE_USER};
use crate::repository::repository_error::RepositoryError;
use crate::repository::user_repo::UserRepository;
use crate::util::error::{Requirements, ServiceError};
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl, TokenPair};
use crate::util::notification::{Notification, NotificationDispatcher};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};

pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with this email exists, a password reset link has been sent.";

#[derive(Debug, Clone)]
pub enum Registration {
    Created(RegisterResponse),
    /// Existing unverified account; a fresh verification email was queued.
    Resent(RegisterResponse),
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<Registration, ServiceError>;
    /// Returns the URL the browser is redirected to.
    async fn verify_email(&self, token: &str) -> Result<String, ServiceError>;
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ServiceError>;
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, ServiceError>;
    async fn get_profile(&self, user_id: ObjectId) -> Result<PublicUser, ServiceError>;
    async fn update_profile(&self, user_id: ObjectId, request: UpdateProfileRequest) -> Result<PublicUser, ServiceError>;
    async fn resend_verification(&self, email: &str) -> Result<MessageResponse, ServiceError>;
    async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ServiceError>;
    async fn reset_password(&self, request: ResetPasswordRequest) -> Result<MessageResponse, ServiceError>;
    async fn validate_reset_token(&self, token: &str) -> Result<ResetTokenInfo, ServiceError>;
}

pub struct UserServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub notifications: NotificationDispatcher,
    pub app_config: AppConfig,
    pub account_config: AccountConfig,
}

impl UserServiceImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_utils: Arc<JwtTokenUtilsImpl>,
        notifications: NotificationDispatcher,
        app_config: AppConfig,
        account_config: AccountConfig,
    ) -> Self {
        Self { user_repo, jwt_utils, notifications, app_config, account_config }
    }

    fn hash(password: &str) -> Result<String, ServiceError> {
        PasswordUtilsImpl::hash_password(password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))
    }

    fn check_phone(&self, phone: &str) -> Result<(), ServiceError> {
        if phone.trim().len() < self.account_config.min_phone_length {
            return Err(ServiceError::InvalidInput(format!(
                "Please enter a valid phone number (at least {} digits)",
                self.account_config.min_phone_length
            )));
        }
        Ok(())
    }

    /// Seconds left before another verification email may be sent, if any.
    fn cooldown_remaining(&self, last_sent: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
        let last_sent = last_sent?;
        let ready_at = last_sent + Duration::seconds(self.account_config.verification_resend_cooldown_secs);
        let remaining = (ready_at - now).num_milliseconds();
        (remaining > 0).then(|| (remaining + 999) / 1000)
    }

    /// Issues a new verification token and queues the email.
    async fn send_verification(&self, mut user: User) -> Result<User, ServiceError> {
        let now = Utc::now();
        if let Some(wait) = self.cooldown_remaining(user.last_verification_email_sent, now) {
            return Err(ServiceError::InvalidInput(format!(
                "Verification email already sent. Please wait {} seconds before requesting another.",
                wait
            )));
        }
        let token = Uuid::new_v4().to_string();
        user.verification_token = Some(token.clone());
        user.last_verification_email_sent = Some(now);
        let id = user.id.ok_or_else(|| ServiceError::InternalError("User without id".to_string()))?;
        let user = self.user_repo.update(id, user).await?;

        self.notifications.dispatch(Notification::EmailVerification {
            to: user.email.clone(),
            name: user.full_name.clone(),
            link: self.app_config.verification_url(&token),
        });
        Ok(user)
    }

    fn tokens_for(&self, user: &User) -> Result<TokenPair, ServiceError> {
        self.jwt_utils
            .generate_token_pair(
                &user.id.map(|id| id.to_hex()).unwrap_or_default(),
                &user.email,
                &user.role,
            )
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))
    }

    async fn user_with_valid_reset_token(&self, token: &str) -> Result<User, ServiceError> {
        let invalid = || ServiceError::InvalidInput("Invalid or expired password reset token".to_string());
        if token.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Token is required".to_string()));
        }
        let user = self.user_repo.find_by_reset_token(token).await?.ok_or_else(invalid)?;
        match user.password_reset_expires {
            Some(expires) if expires > Utc::now() => Ok(user),
            _ => Err(invalid()),
        }
    }

    /// Creates the bootstrap administrator when no account holds its email.
    /// Returns whether an account was created.
    #[instrument(skip(self, config), fields(email = %config.email))]
    pub async fn ensure_admin(&self, config: &AdminUserConfig) -> Result<bool, ServiceError> {
        if self.user_repo.find_by_email(&config.email.trim().to_lowercase()).await?.is_some() {
            info!("Admin user already exists, skipping creation.");
            return Ok(false);
        }
        let admin = User {
            email: config.email.trim().to_lowercase(),
            password_hash: Self::hash(&config.password)?,
            full_name: config.full_name.clone(),
            phone: config.phone.clone(),
            is_verified: true,
            role: ROLE_ADMIN.to_string(),
            profile: UserProfile { is_profile_complete: true, ..Default::default() },
            ..Default::default()
        };
        self.user_repo.insert(admin).await?;
        info!("First admin user created.");
        Ok(true)
    }
}

fn merge(new: Option<String>, old: Option<String>) -> Option<String> {
    new.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()).or(old)
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn register(&self, request: RegisterRequest) -> Result<Registration, ServiceError> {
        self.check_phone(&request.phone)?;
        let email = request.email.trim().to_lowercase();

        if let Some(existing) = self.user_repo.find_by_email(&email).await? {
            if existing.is_verified {
                return Err(ServiceError::Conflict("User already exists with this email".to_string()));
            }
            let user = self.send_verification(existing).await?;
            info!("Verification email re-sent to unverified account");
            return Ok(Registration::Resent(RegisterResponse {
                message: "Verification email has been resent. Please check your email to verify your account.".to_string(),
                user_id: user.id,
            }));
        }

        let token = Uuid::new_v4().to_string();
        let user = User {
            email,
            password_hash: Self::hash(&request.password)?,
            full_name: request.full_name.trim().to_string(),
            phone: request.phone.trim().to_string(),
            is_verified: false,
            verification_token: Some(token.clone()),
            last_verification_email_sent: Some(Utc::now()),
            role: ROLE_USER.to_string(),
            ..Default::default()
        };
        let user = self.user_repo.insert(user).await.map_err(|e| match e {
            RepositoryError::AlreadyExists(_) => {
                warn!("Concurrent registration for the same email");
                ServiceError::Conflict("User already exists with this email".to_string())
            }
            e => {
                error!("Failed to insert user: {e}");
                ServiceError::from(e)
            }
        })?;

        self.notifications.dispatch(Notification::EmailVerification {
            to: user.email.clone(),
            name: user.full_name.clone(),
            link: self.app_config.verification_url(&token),
        });

        info!("User registered");
        Ok(Registration::Created(RegisterResponse {
            message: "User registered successfully. Please check your email to verify your account.".to_string(),
            user_id: user.id,
        }))
    }

    #[instrument(skip(self, token))]
    async fn verify_email(&self, token: &str) -> Result<String, ServiceError> {
        let mut user = self
            .user_repo
            .find_by_verification_token(token)
            .await?
            .ok_or_else(|| ServiceError::InvalidInput("Invalid verification token".to_string()))?;
        user.is_verified = true;
        user.verification_token = None;
        let id = user.id.ok_or_else(|| ServiceError::InternalError("User without id".to_string()))?;
        self.user_repo.update(id, user).await?;
        info!("Email verified");
        Ok(self.app_config.login_url())
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let invalid = || ServiceError::InvalidInput("Invalid credentials".to_string());
        let email = request.email.trim().to_lowercase();
        let user = self.user_repo.find_by_email(&email).await?.ok_or_else(invalid)?;
        let valid = PasswordUtilsImpl::verify_password(&request.password, &user.password_hash).map_err(|e| {
            error!("Stored password hash is unusable: {}", e);
            invalid()
        })?;
        if !valid {
            warn!("Invalid credentials");
            return Err(invalid());
        }
        if !user.is_verified {
            return Err(ServiceError::unmet(
                "Please verify your email before logging in",
                Requirements { needs_verification: true, ..Default::default() },
            ));
        }
        let tokens = self.tokens_for(&user)?;
        info!("User logged in");
        Ok(LoginResponse {
            message: "Login successful".to_string(),
            user: PublicUser::from(user),
            tokens,
        })
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, ServiceError> {
        let claims = self
            .jwt_utils
            .validate_refresh_token(refresh_token)
            .map_err(|e| ServiceError::Unauthorized(format!("Invalid refresh token: {}", e)))?;
        self.jwt_utils
            .generate_token_pair(&claims.sub, &claims.email, &claims.role)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))
    }

    async fn get_profile(&self, user_id: ObjectId) -> Result<PublicUser, ServiceError> {
        self.user_repo
            .find_by_id(&user_id)
            .await?
            .map(PublicUser::from)
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    #[instrument(skip(self, request), fields(user = %user_id))]
    async fn update_profile(&self, user_id: ObjectId, request: UpdateProfileRequest) -> Result<PublicUser, ServiceError> {
        let mut user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        if let Some(phone) = request.phone {
            if phone.trim().is_empty() {
                return Err(ServiceError::InvalidInput("Phone number cannot be empty".to_string()));
            }
            self.check_phone(&phone)?;
            user.phone = phone.trim().to_string();
        }
        if let Some(full_name) = request.full_name {
            if full_name.trim().is_empty() {
                return Err(ServiceError::InvalidInput("Full name cannot be empty".to_string()));
            }
            user.full_name = full_name.trim().to_string();
        }

        let old = std::mem::take(&mut user.profile);
        user.profile = UserProfile {
            apartment_name: merge(request.apartment_name, old.apartment_name),
            flat_number: merge(request.flat_number, old.flat_number),
            area: merge(request.area, old.area),
            landmark: merge(request.landmark, old.landmark),
            pincode: merge(request.pincode, old.pincode),
            emergency_contact: merge(request.emergency_contact, old.emergency_contact),
            special_instructions: merge(request.special_instructions, old.special_instructions),
            is_profile_complete: true,
        };

        let user = self.user_repo.update(user_id, user).await?;
        info!("Profile updated");
        Ok(PublicUser::from(user))
    }

    #[instrument(skip(self))]
    async fn resend_verification(&self, email: &str) -> Result<MessageResponse, ServiceError> {
        let user = self
            .user_repo
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        if user.is_verified {
            return Err(ServiceError::InvalidInput("Email already verified".to_string()));
        }
        self.send_verification(user).await?;
        Ok(MessageResponse::new("Verification email sent"))
    }

    #[instrument(skip(self))]
    async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ServiceError> {
        let Some(mut user) = self.user_repo.find_by_email(&email.trim().to_lowercase()).await? else {
            info!("Password reset requested for unknown email");
            return Ok(MessageResponse::new(FORGOT_PASSWORD_MESSAGE));
        };
        let token = Uuid::new_v4().to_string();
        user.password_reset_token = Some(token.clone());
        user.password_reset_expires = Some(Utc::now() + Duration::seconds(self.account_config.reset_token_ttl_secs));
        let id = user.id.ok_or_else(|| ServiceError::InternalError("User without id".to_string()))?;
        let user = self.user_repo.update(id, user).await?;

        self.notifications.dispatch(Notification::PasswordReset {
            to: user.email.clone(),
            name: user.full_name.clone(),
            link: self.app_config.reset_password_url(&token),
        });
        info!("Password reset token issued");
        Ok(MessageResponse::new(FORGOT_PASSWORD_MESSAGE))
    }

    #[instrument(skip(self, request))]
    async fn reset_password(&self, request: ResetPasswordRequest) -> Result<MessageResponse, ServiceError> {
        if request.token.trim().is_empty() || request.new_password.is_empty() {
            return Err(ServiceError::InvalidInput("Token and new password are required".to_string()));
        }
        if request.new_password.chars().count() < self.account_config.min_password_length {
            return Err(ServiceError::InvalidInput(format!(
                "Password must be at least {} characters long",
                self.account_config.min_password_length
            )));
        }
        let mut user = self.user_with_valid_reset_token(&request.token).await?;
        user.password_hash = Self::hash(&request.new_password)?;
        user.password_reset_token = None;
        user.password_reset_expires = None;
        let id = user.id.ok_or_else(|| ServiceError::InternalError("User without id".to_string()))?;
        self.user_repo.update(id, user).await?;
        info!("Password reset");
        Ok(MessageResponse::new(
            "Password has been reset successfully. You can now log in with your new password.",
        ))
    }

    async fn validate_reset_token(&self, token: &str) -> Result<ResetTokenInfo, ServiceError> {
        let user = self.user_with_valid_reset_token(token).await?;
        Ok(ResetTokenInfo { valid: true, user_email: user.email, user_name: user.full_name })
    }
}
