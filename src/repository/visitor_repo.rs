use crate::model::visitor::{SiteStats, Visit, Visitor};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument, UpdateOptions};
use mongodb::IndexModel;
use tracing::{debug, info};

const SITE_STATS_ID: &str = "global";

#[async_trait]
pub trait VisitorRepository: Send + Sync {
    /// Appends a visit, creating the visitor on first sight.
    /// Returns true when the visitor did not exist before.
    async fn record_visit(&self, visitor_id: &str, visit: Visit, user: Option<ObjectId>, history_limit: i32) -> RepositoryResult<bool>;
    async fn increment_unique_visitors(&self) -> RepositoryResult<()>;
    async fn total_unique_visitors(&self) -> RepositoryResult<i64>;
}

pub struct MongoVisitorRepository {
    visitors: mongodb::Collection<Visitor>,
    stats: mongodb::Collection<SiteStats>,
}

impl MongoVisitorRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        MongoVisitorRepository {
            visitors: db.collection::<Visitor>("visitors"),
            stats: db.collection::<SiteStats>("sitestats"),
        }
    }

    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        let unique_visitor = IndexModel::builder()
            .keys(doc! { "visitorId": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.visitors.create_index(unique_visitor, None).await?;
        info!("Visitor indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl VisitorRepository for MongoVisitorRepository {
    async fn record_visit(&self, visitor_id: &str, visit: Visit, user: Option<ObjectId>, history_limit: i32) -> RepositoryResult<bool> {
        let at = visit.timestamp.to_rfc3339();
        let visit_doc = bson::to_document(&visit)?;
        let mut set = doc! { "lastVisit": at.clone() };
        if let Some(user) = user {
            set.insert("user", user);
            set.insert("isLoggedIn", true);
        }
        let update = doc! {
            "$setOnInsert": { "visitorId": visitor_id, "firstVisit": at },
            "$set": set,
            "$inc": { "totalVisits": 1_i64 },
            "$push": { "visits": { "$each": [visit_doc], "$slice": -history_limit } },
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::Before)
            .build();
        let filter = doc! { "visitorId": visitor_id };
        let before = match self.visitors.find_one_and_update(filter.clone(), update.clone(), options.clone()).await {
            Ok(before) => before,
            // a concurrent first visit won the insert; ours now applies as a plain update
            Err(e) => match RepositoryError::from(e) {
                RepositoryError::AlreadyExists(_) => self.visitors.find_one_and_update(filter, update, options).await?,
                other => return Err(other),
            },
        };
        debug!(visitor_id = %visitor_id, new = before.is_none(), "Visit recorded");
        Ok(before.is_none())
    }

    async fn increment_unique_visitors(&self) -> RepositoryResult<()> {
        let options = UpdateOptions::builder().upsert(true).build();
        self.stats
            .update_one(doc! { "_id": SITE_STATS_ID }, doc! { "$inc": { "totalUniqueVisitors": 1_i64 } }, options)
            .await?;
        Ok(())
    }

    async fn total_unique_visitors(&self) -> RepositoryResult<i64> {
        let stats = self.stats.find_one(Document::new(), None).await?;
        Ok(stats.map(|s| s.total_unique_visitors).unwrap_or(0))
    }
}
