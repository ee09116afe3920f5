use crate::model::user::{PageVisit, User};
use crate::repository::mongo::{contains_regex, page_window};
use crate::repository::repository_error::{RepositoryResult, RepositoryError};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::IndexModel;
use tracing::{error, info};

/// Filter for the admin user listing
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub role: Option<String>,
    /// Matched against full name, email and phone
    pub search: Option<String>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> RepositoryResult<User>;
    async fn update(&self, id: ObjectId, user: User) -> RepositoryResult<User>;
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>>;
    async fn find_by_verification_token(&self, token: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_reset_token(&self, token: &str) -> RepositoryResult<Option<User>>;
    async fn list(&self, query: &UserQuery, page: u64, limit: u64) -> RepositoryResult<(Vec<User>, u64)>;
    async fn count_by_role(&self, role: &str) -> RepositoryResult<u64>;
    async fn record_visit(&self, id: &ObjectId, visit: PageVisit, history_limit: i32) -> RepositoryResult<()>;
}

pub struct UserRepositoryImpl {
    collection: mongodb::Collection<User>,
}

impl UserRepositoryImpl {
    pub fn new(db: &mongodb::Database) -> Self {
        UserRepositoryImpl { collection: db.collection::<User>("users") }
    }

    /// One account per email.
    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(unique_email, None).await?;
        info!("User indexes ensured");
        Ok(())
    }

    fn filter_for(query: &UserQuery) -> Document {
        let mut filter = Document::new();
        if let Some(ref role) = query.role {
            filter.insert("role", role.clone());
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let re = contains_regex(search);
            filter.insert("$or", vec![
                doc! { "fullName": re.clone() },
                doc! { "email": re.clone() },
                doc! { "phone": re },
            ]);
        }
        filter
    }

    /// `$set` body for a full-document update. Visit stats are left out; only
    /// `record_visit` writes them.
    fn update_fields(user: &User) -> RepositoryResult<Document> {
        let mut fields = bson::to_document(user)?;
        fields.remove("_id");
        fields.remove("visitStats");
        Ok(fields)
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        user.id = Some(ObjectId::new());
        let now = Utc::now().to_rfc3339();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        match self.collection.insert_one(user.clone(), None).await {
            Ok(_) => {
                info!("User inserted");
                Ok(user)
            }
            Err(e) => {
                error!("Failed to insert user: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self, user), fields(id = %id))]
    async fn update(&self, id: ObjectId, mut user: User) -> RepositoryResult<User> {
        user.updated_at = Some(Utc::now().to_rfc3339());
        let fields = Self::update_fields(&user)?;
        let result = self.collection.update_one(doc! { "_id": id }, doc! { "$set": fields }, None).await;
        match result {
            Ok(update_result) if update_result.matched_count > 0 => Ok(user),
            Ok(_) => Err(RepositoryError::not_found(format!("No user found to update for ID: {}", id))),
            Err(e) => {
                error!("Failed to update user: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("User not found for ID: {}", id)));
        }
        info!("User deleted");
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let filter = doc! { "email": email.to_lowercase() };
        let user = self.collection.find_one(filter, None).await.map_err(|e| RepositoryError::database(format!("Failed to find user by email: {}", e)))?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        let user = self.collection.find_one(doc! { "_id": id }, None).await.map_err(|e| RepositoryError::database(format!("Failed to find user by id: {}", e)))?;
        Ok(user)
    }

    async fn find_by_verification_token(&self, token: &str) -> RepositoryResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "verificationToken": token }, None).await?)
    }

    async fn find_by_reset_token(&self, token: &str) -> RepositoryResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "passwordResetToken": token }, None).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, query: &UserQuery, page: u64, limit: u64) -> RepositoryResult<(Vec<User>, u64)> {
        let filter = Self::filter_for(query);
        let (skip, limit) = page_window(page, limit);
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .build();
        let total = self.collection.count_documents(filter.clone(), None).await?;
        let users: Vec<User> = self.collection.find(filter, options).await?.try_collect().await?;
        info!("Listed {} of {} users", users.len(), total);
        Ok((users, total))
    }

    async fn count_by_role(&self, role: &str) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(doc! { "role": role }, None).await?)
    }

    async fn record_visit(&self, id: &ObjectId, visit: PageVisit, history_limit: i32) -> RepositoryResult<()> {
        let visit_doc = bson::to_document(&visit)?;
        let update = doc! {
            "$inc": { "visitStats.totalVisits": 1_i64 },
            "$set": { "visitStats.lastVisit": visit.timestamp.to_rfc3339() },
            "$push": { "visitStats.visitHistory": { "$each": [visit_doc], "$slice": -history_limit } },
        };
        self.collection.update_one(doc! { "_id": id }, update, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_fields_leave_visit_stats_alone() {
        let mut user = User { email: "asha@example.com".to_string(), id: Some(ObjectId::new()), ..Default::default() };
        user.visit_stats.total_visits = 7;
        let fields = UserRepositoryImpl::update_fields(&user).unwrap();
        assert!(fields.get("visitStats").is_none());
        assert!(fields.get("_id").is_none());
        assert_eq!(fields.get_str("email").unwrap(), "asha@example.com");
    }
}
