pub mod user_handler;
pub mod order_handler;
pub mod catalog_handler;
pub mod directory_handler;
pub mod admin_handler;

use bson::oid::ObjectId;

use crate::util::error::{HandlerError, HandlerErrorKind};
use crate::util::jwt::Claims;

/// Path ids that are not valid ObjectIds can never match a document.
pub fn parse_id(raw: &str, what: &str) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| HandlerError::new(HandlerErrorKind::NotFound, format!("{} not found", what)))
}

pub fn caller_id(claims: &Claims) -> Result<ObjectId, HandlerError> {
    claims
        .user_id()
        .map_err(|_| HandlerError::new(HandlerErrorKind::Unauthorized, "Invalid token subject"))
}
