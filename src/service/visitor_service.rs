use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use crate::model::user::PageVisit;
use crate::model::visitor::{Visit, VISIT_HISTORY_LIMIT};
use crate::repository::user_repo::UserRepository;
use crate::repository::visitor_repo::VisitorRepository;
use crate::util::error::ServiceError;

#[derive(Debug, Clone)]
pub struct PageView {
    pub visitor_id: String,
    pub page: String,
    pub user_agent: Option<String>,
    pub client_ip: Option<String>,
    pub user: Option<ObjectId>,
}

#[async_trait]
pub trait VisitorService: Send + Sync {
    async fn track(&self, view: PageView) -> Result<(), ServiceError>;
}

pub struct VisitorServiceImpl {
    pub visitor_repo: Arc<dyn VisitorRepository>,
    pub user_repo: Arc<dyn UserRepository>,
}

impl VisitorServiceImpl {
    pub fn new(visitor_repo: Arc<dyn VisitorRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self { visitor_repo, user_repo }
    }
}

/// Client addresses are stored only as hex SHA-256 digests.
pub fn hash_ip(ip: &str) -> String {
    hex::encode(Sha256::digest(ip.as_bytes()))
}

#[async_trait]
impl VisitorService for VisitorServiceImpl {
    #[instrument(skip(self, view), fields(visitor = %view.visitor_id, page = %view.page))]
    async fn track(&self, view: PageView) -> Result<(), ServiceError> {
        let now = Utc::now();
        let visit = Visit {
            timestamp: now,
            page: view.page.clone(),
            user_agent: view.user_agent,
            ip_hash: view.client_ip.as_deref().map(hash_ip),
        };
        let created = self
            .visitor_repo
            .record_visit(&view.visitor_id, visit, view.user, VISIT_HISTORY_LIMIT)
            .await?;
        if created {
            self.visitor_repo.increment_unique_visitors().await?;
            debug!("New unique visitor");
        }
        if let Some(user_id) = view.user {
            self.user_repo
                .record_visit(&user_id, PageVisit { timestamp: now, page: view.page }, VISIT_HISTORY_LIMIT)
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_hash_is_stable_hex() {
        let a = hash_ip("10.0.0.1");
        assert_eq!(a.len(), 64);
        assert_eq!(a, hash_ip("10.0.0.1"));
        assert_ne!(a, hash_ip("10.0.0.2"));
    }
}
