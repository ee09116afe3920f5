use crate::model::order::{Order, OrderStatus, PaymentStatus};
use crate::repository::mongo::page_window;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument};
use mongodb::IndexModel;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

const ORDER_SEQUENCE: &str = "orderNumber";

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Atomically advances the order-number counter and returns the new value.
    async fn next_sequence(&self) -> RepositoryResult<i64>;
    async fn insert(&self, order: Order) -> RepositoryResult<Order>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Order>>;
    async fn find_for_user(&self, id: &ObjectId, user: &ObjectId) -> RepositoryResult<Option<Order>>;
    async fn list_for_user(&self, user: &ObjectId, page: u64, limit: u64) -> RepositoryResult<(Vec<Order>, u64)>;
    async fn list(&self, status: Option<OrderStatus>, page: u64, limit: u64) -> RepositoryResult<(Vec<Order>, u64)>;
    async fn recent(&self, limit: i64) -> RepositoryResult<Vec<Order>>;
    async fn count(&self, status: Option<OrderStatus>) -> RepositoryResult<u64>;
    async fn count_active_for_user(&self, user: &ObjectId) -> RepositoryResult<u64>;
    async fn update_status(&self, id: &ObjectId, status: OrderStatus, notes: Option<String>) -> RepositoryResult<Order>;
    /// Records a settled payment and confirms the order in one write.
    async fn mark_paid(&self, id: &ObjectId, payment_id: &str) -> RepositoryResult<Order>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Counter {
    #[serde(rename = "_id")]
    id: String,
    seq: i64,
}

pub struct MongoOrderRepository {
    collection: mongodb::Collection<Order>,
    counters: mongodb::Collection<Counter>,
}

impl MongoOrderRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        MongoOrderRepository {
            collection: db.collection::<Order>("orders"),
            counters: db.collection::<Counter>("counters"),
        }
    }

    /// Unique order numbers and the per-user listing index.
    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        let unique_number = IndexModel::builder()
            .keys(doc! { "orderNumber": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let by_user = IndexModel::builder()
            .keys(doc! { "user": 1, "createdAt": -1 })
            .build();
        self.collection.create_indexes(vec![unique_number, by_user], None).await?;
        info!("Order indexes ensured");
        Ok(())
    }

    async fn find_many(&self, filter: Document, page: u64, limit: u64) -> RepositoryResult<(Vec<Order>, u64)> {
        let (skip, limit) = page_window(page, limit);
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .build();
        let total = self.collection.count_documents(filter.clone(), None).await?;
        let orders: Vec<Order> = self.collection.find(filter, options).await?.try_collect().await?;
        Ok((orders, total))
    }

    async fn set_fields(&self, id: &ObjectId, mut fields: Document) -> RepositoryResult<Order> {
        fields.insert("updatedAt", Utc::now().to_rfc3339());
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        match self.collection.find_one_and_update(doc! { "_id": id }, doc! { "$set": fields }, options).await {
            Ok(Some(order)) => Ok(order),
            Ok(None) => {
                warn!("No order found to update for ID: {}", id);
                Err(RepositoryError::not_found(format!("Order not found for ID: {}", id)))
            }
            Err(e) => {
                error!("Failed to update order: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    async fn next_sequence(&self) -> RepositoryResult<i64> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let counter = self
            .counters
            .find_one_and_update(doc! { "_id": ORDER_SEQUENCE }, doc! { "$inc": { "seq": 1_i64 } }, options)
            .await?
            .ok_or_else(|| RepositoryError::database("Order counter upsert returned nothing"))?;
        Ok(counter.seq)
    }

    #[tracing::instrument(skip(self, order), fields(order_number = %order.order_number))]
    async fn insert(&self, mut order: Order) -> RepositoryResult<Order> {
        order.id = Some(ObjectId::new());
        let now = Utc::now().to_rfc3339();
        order.created_at = Some(now.clone());
        order.updated_at = Some(now);
        match self.collection.insert_one(order.clone(), None).await {
            Ok(_) => {
                info!("Order inserted");
                Ok(order)
            }
            Err(e) => {
                error!("Failed to insert order: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Order>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_for_user(&self, id: &ObjectId, user: &ObjectId) -> RepositoryResult<Option<Order>> {
        Ok(self.collection.find_one(doc! { "_id": id, "user": user }, None).await?)
    }

    async fn list_for_user(&self, user: &ObjectId, page: u64, limit: u64) -> RepositoryResult<(Vec<Order>, u64)> {
        self.find_many(doc! { "user": user }, page, limit).await
    }

    async fn list(&self, status: Option<OrderStatus>, page: u64, limit: u64) -> RepositoryResult<(Vec<Order>, u64)> {
        let filter = match status {
            Some(s) => doc! { "status": s.as_str() },
            None => Document::new(),
        };
        self.find_many(filter, page, limit).await
    }

    async fn recent(&self, limit: i64) -> RepositoryResult<Vec<Order>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).limit(limit).build();
        Ok(self.collection.find(None, options).await?.try_collect().await?)
    }

    async fn count(&self, status: Option<OrderStatus>) -> RepositoryResult<u64> {
        let filter = status.map(|s| doc! { "status": s.as_str() });
        Ok(self.collection.count_documents(filter, None).await?)
    }

    async fn count_active_for_user(&self, user: &ObjectId) -> RepositoryResult<u64> {
        let active: Vec<&str> = [OrderStatus::Pending, OrderStatus::Confirmed, OrderStatus::InProgress]
            .iter()
            .map(|s| s.as_str())
            .collect();
        let filter = doc! { "user": user, "status": { "$in": active } };
        Ok(self.collection.count_documents(filter, None).await?)
    }

    #[tracing::instrument(skip(self, notes), fields(id = %id, status = %status))]
    async fn update_status(&self, id: &ObjectId, status: OrderStatus, notes: Option<String>) -> RepositoryResult<Order> {
        let mut fields = doc! { "status": status.as_str() };
        if let Some(notes) = notes {
            fields.insert("adminNotes", notes);
        }
        self.set_fields(id, fields).await
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn mark_paid(&self, id: &ObjectId, payment_id: &str) -> RepositoryResult<Order> {
        let payment_status = bson::to_bson(&PaymentStatus::Completed)?;
        let fields = doc! {
            "paymentStatus": payment_status,
            "paymentId": payment_id,
            "status": OrderStatus::Confirmed.as_str(),
        };
        self.set_fields(id, fields).await
    }
}
