//! MongoDB profile store
//!
//! Profiles live in one collection. Each document carries the camelCase
//! field keys used by the API, the owning `userId`, and `createdAt` /
//! `updatedAt` timestamps stored as RFC 3339 strings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fundboard_core::{
    get_env_or, get_required_env, FundboardError, ProfileField, ProfilePatch, ProfileStore,
    Result, StartupProfile, PROFILES_COLLECTION,
};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::{ClientOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};
use tracing::{debug, info};

/// MongoDB-backed [`ProfileStore`]
pub struct MongoProfileStore {
    db: Database,
    client: Client,
}

impl MongoProfileStore {
    /// Connect, verify with a ping and make sure the owner index exists
    pub async fn connect(connection_string: &str, database_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB database: {}", database_name);

        let client_options = ClientOptions::parse(connection_string)
            .await
            .map_err(|e| FundboardError::store(format!("Failed to parse MongoDB URI: {}", e)))?;

        let client = Client::with_options(client_options).map_err(|e| {
            FundboardError::store(format!("Failed to create MongoDB client: {}", e))
        })?;

        let db = client.database(database_name);

        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| FundboardError::store(format!("Failed to connect to MongoDB: {}", e)))?;

        let store = Self { db, client };
        store.create_indexes().await;

        info!("Successfully connected to MongoDB");
        Ok(store)
    }

    /// Connect using `MONGODB_URL` and `MONGODB_DATABASE` (default `fundboard`)
    pub async fn from_env() -> Result<Self> {
        let url = get_required_env("MONGODB_URL")?;
        let database = get_env_or("MONGODB_DATABASE", "fundboard");
        Self::connect(&url, &database).await
    }

    /// Get the database instance
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Get the client instance
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn profiles(&self) -> Collection<Document> {
        self.db.collection(PROFILES_COLLECTION)
    }

    async fn create_indexes(&self) {
        let indexes = vec![IndexModel::builder()
            .keys(doc! { "userId": 1, "updatedAt": -1 })
            .options(IndexOptions::builder().build())
            .build()];
        // best effort
        if let Err(e) = self.profiles().create_indexes(indexes).await {
            debug!("Skipping profile index creation: {}", e);
        }
    }
}

fn parse_object_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id)
        .map_err(|_| FundboardError::validation(format!("Invalid profile id: {}", id)))
}

fn parse_timestamp(doc: &Document, key: &str) -> Option<DateTime<Utc>> {
    doc.get_str(key)
        .ok()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

/// Build the document inserted for a new profile.
///
/// Empty fields are left out; the id is assigned by the server.
pub fn profile_to_doc(profile: &StartupProfile, now: DateTime<Utc>) -> Document {
    let mut doc = doc! { "userId": profile.user_id.as_str() };
    for field in ProfileField::ALL {
        if let Some(value) = profile.get(field) {
            doc.insert(field.key(), value);
        }
    }
    let stamp = now.to_rfc3339();
    doc.insert("createdAt", stamp.clone());
    doc.insert("updatedAt", stamp);
    doc
}

/// Build the `$set` / `$unset` update for a patch
pub fn patch_to_update(patch: &ProfilePatch, now: DateTime<Utc>) -> Document {
    let mut set = doc! { "updatedAt": now.to_rfc3339() };
    let mut unset = Document::new();

    for (field, value) in &patch.fields {
        match value {
            Some(value) => {
                set.insert(field.key(), value.as_str());
            }
            None => {
                unset.insert(field.key(), "");
            }
        }
    }

    let mut update = doc! { "$set": set };
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    update
}

/// Read a stored document back into a profile
pub fn doc_to_profile(doc: &Document) -> Result<StartupProfile> {
    let id = match doc.get("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(s)) => s.clone(),
        _ => return Err(FundboardError::store("Profile document without _id")),
    };

    let user_id = doc
        .get_str("userId")
        .map_err(|_| FundboardError::store(format!("Profile {} has no userId", id)))?
        .to_string();

    let mut profile = StartupProfile::new_for(user_id);
    profile.id = Some(id);
    for field in ProfileField::ALL {
        if let Ok(value) = doc.get_str(field.key()) {
            profile.set(field, Some(value.to_string()));
        }
    }
    profile.created_at = parse_timestamp(doc, "createdAt");
    profile.updated_at = parse_timestamp(doc, "updatedAt");

    Ok(profile)
}

#[async_trait]
impl ProfileStore for MongoProfileStore {
    fn name(&self) -> &str {
        "mongodb"
    }

    async fn create(&self, profile: &StartupProfile) -> Result<String> {
        let doc = profile_to_doc(profile, Utc::now());

        let result = self
            .profiles()
            .insert_one(doc)
            .await
            .map_err(|e| FundboardError::store(format!("Failed to create profile: {}", e)))?;

        let id = match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        };
        debug!(profile_id = %id, user_id = %profile.user_id, "Created profile");
        Ok(id)
    }

    async fn update(&self, id: &str, patch: &ProfilePatch) -> Result<()> {
        let filter = doc! { "_id": parse_object_id(id)? };
        let update = patch_to_update(patch, Utc::now());

        let result = self
            .profiles()
            .update_one(filter, update)
            .await
            .map_err(|e| FundboardError::store(format!("Failed to update profile: {}", e)))?;

        if result.matched_count == 0 {
            return Err(FundboardError::not_found(format!("Profile {}", id)));
        }
        debug!(profile_id = %id, fields = patch.fields.len(), "Updated profile");
        Ok(())
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<StartupProfile>> {
        let mut cursor = self
            .profiles()
            .find(doc! { "userId": user_id })
            .await
            .map_err(|e| FundboardError::store(format!("Failed to list profiles: {}", e)))?;

        let mut profiles = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(|e| {
            FundboardError::store(format!("Failed to iterate profiles: {}", e))
        })? {
            profiles.push(doc_to_profile(&doc)?);
        }

        Ok(profiles)
    }

    async fn get(&self, id: &str) -> Result<Option<StartupProfile>> {
        let filter = doc! { "_id": parse_object_id(id)? };

        let doc = self
            .profiles()
            .find_one(filter)
            .await
            .map_err(|e| FundboardError::store(format!("Failed to get profile: {}", e)))?;

        doc.as_ref().map(doc_to_profile).transpose()
    }
}
