use crate::auth::{require_admin, validate_email, Identity};
use crate::errors::{AppError, AppResult};
use crate::models::{
    AppSettings, CompanyDraft, CompanyRecord, DirectoryPage, DirectoryState, Facets, UserPage,
    UserRecord,
};
use crate::normalize::normalize_company;
use crate::pipeline::{total_pages, visible_slice};
use crate::storage::{decode_data_url, logo_key, ObjectStorage};
use crate::store::DocumentStore;
use crate::view::facets;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::watch;

const COMPANIES: &str = "companies";
const USERS: &str = "users";

/// The application service behind the directory views. Reads go through an
/// in-memory snapshot of normalized companies; every successful write
/// refreshes the snapshot and publishes it to subscribers, so a subscriber
/// that falls behind only ever sees the latest state.
pub struct DirectoryService {
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn ObjectStorage>,
    settings: AppSettings,
    companies_tx: watch::Sender<Vec<CompanyRecord>>,
    companies_rx: watch::Receiver<Vec<CompanyRecord>>,
}

impl DirectoryService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
        settings: AppSettings,
    ) -> AppResult<Self> {
        let (companies_tx, companies_rx) = watch::channel(Vec::new());
        let service = Self {
            store,
            storage,
            settings,
            companies_tx,
            companies_rx,
        };
        service.publish_snapshot()?;
        Ok(service)
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    fn load_companies(&self) -> AppResult<Vec<CompanyRecord>> {
        let documents = self.store.list(COMPANIES, Some("companyName"))?;
        let mut companies = Vec::with_capacity(documents.len());
        for document in &documents {
            match normalize_company(document, &self.settings.geo_defaults) {
                Some(company) => companies.push(company),
                None => tracing::warn!(
                    collection = COMPANIES,
                    "skipping document without an id during normalization"
                ),
            }
        }
        Ok(companies)
    }

    fn publish_snapshot(&self) -> AppResult<()> {
        let companies = self.load_companies()?;
        tracing::debug!(count = companies.len(), "publishing company snapshot");
        self.companies_tx.send_replace(companies);
        Ok(())
    }

    fn snapshot(&self) -> Vec<CompanyRecord> {
        self.companies_rx.borrow().clone()
    }

    /// One page of the directory for the given view state: filtered, sorted,
    /// and sliced in that order.
    pub fn company_list(&self, state: &DirectoryState) -> DirectoryPage {
        visible_slice(&self.snapshot(), state, self.settings.page_size)
    }

    /// Distinct industries and headquarters cities across the whole
    /// directory, independent of the active filters.
    pub fn company_facets(&self) -> Facets {
        facets(&self.snapshot())
    }

    pub fn company_get(&self, company_id: &str) -> AppResult<CompanyRecord> {
        let document = self.store.read(COMPANIES, company_id)?.ok_or_else(|| {
            AppError::NotFound(format!("Company '{}' not found", company_id))
        })?;
        normalize_company(&document, &self.settings.geo_defaults).ok_or_else(|| {
            AppError::Internal(format!("Company '{}' has no usable document", company_id))
        })
    }

    /// Live feed of the normalized company list. Each published snapshot
    /// replaces the previous one; a dropped receiver simply stops observing.
    pub fn subscribe_companies(&self) -> watch::Receiver<Vec<CompanyRecord>> {
        self.companies_tx.subscribe()
    }

    pub fn company_create(
        &self,
        identity: &Identity,
        draft: &CompanyDraft,
    ) -> AppResult<CompanyRecord> {
        require_admin(identity)?;
        if let Some(email) = draft.email.as_deref() {
            validate_email(email)?;
        }

        let body = serde_json::to_value(draft)?;
        let company_id = self.store.create(COMPANIES, &body)?;
        tracing::info!(
            company_id = %company_id,
            actor = %identity.email,
            "company created"
        );
        self.publish_snapshot()?;
        self.company_get(&company_id)
    }

    pub fn company_update(
        &self,
        identity: &Identity,
        company_id: &str,
        draft: &CompanyDraft,
    ) -> AppResult<CompanyRecord> {
        require_admin(identity)?;
        if let Some(email) = draft.email.as_deref() {
            validate_email(email)?;
        }

        let patch = serde_json::to_value(draft)?;
        self.store.update(COMPANIES, company_id, &patch)?;
        tracing::info!(
            company_id = %company_id,
            actor = %identity.email,
            "company updated"
        );
        self.publish_snapshot()?;
        self.company_get(company_id)
    }

    pub fn company_delete(&self, identity: &Identity, company_id: &str) -> AppResult<()> {
        require_admin(identity)?;

        // detach the stored logo first so the object is not orphaned
        if let Some(document) = self.store.read(COMPANIES, company_id)? {
            if let Some(logo) = document.get("logoUrl").and_then(Value::as_str) {
                if logo.starts_with("logos/") {
                    self.storage.delete(logo)?;
                }
            }
        }

        self.store.delete(COMPANIES, company_id)?;
        tracing::info!(
            company_id = %company_id,
            actor = %identity.email,
            "company deleted"
        );
        self.publish_snapshot()
    }

    /// Stores an inline-uploaded logo and points the company at it. Returns
    /// the storage key now recorded on the document.
    pub fn logo_upload(
        &self,
        identity: &Identity,
        company_id: &str,
        data_url: &str,
    ) -> AppResult<String> {
        require_admin(identity)?;

        // fail before writing anything if the company does not exist
        let existing = self.store.read(COMPANIES, company_id)?.ok_or_else(|| {
            AppError::NotFound(format!("Company '{}' not found", company_id))
        })?;

        let (extension, bytes) = decode_data_url(data_url)?;
        let key = self.storage.put(&logo_key(company_id, &extension), &bytes)?;

        let previous = existing
            .get("logoUrl")
            .and_then(Value::as_str)
            .map(ToString::to_string);

        self.store
            .update(COMPANIES, company_id, &json!({ "logoUrl": key }))?;

        if let Some(previous) = previous {
            if previous.starts_with("logos/") && previous != key {
                self.storage.delete(&previous)?;
            }
        }

        tracing::info!(
            company_id = %company_id,
            key = %key,
            size_bytes = bytes.len(),
            "logo stored"
        );
        self.publish_snapshot()?;
        Ok(key)
    }

    fn load_users(&self) -> AppResult<Vec<UserRecord>> {
        let documents = self.store.list(USERS, Some("email"))?;
        let mut users = Vec::with_capacity(documents.len());
        for document in documents {
            match serde_json::from_value::<UserRecord>(document) {
                Ok(user) => users.push(user),
                Err(err) => tracing::warn!(
                    collection = USERS,
                    error = %err,
                    "skipping malformed user document"
                ),
            }
        }
        Ok(users)
    }

    pub fn user_list(
        &self,
        identity: &Identity,
        search: Option<&str>,
        page: u32,
    ) -> AppResult<UserPage> {
        require_admin(identity)?;
        let mut users = self.load_users()?;
        if let Some(query) = search.map(str::trim).filter(|query| !query.is_empty()) {
            let query = query.to_lowercase();
            users.retain(|user| {
                user.email.to_lowercase().contains(&query)
                    || user
                        .display_name
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase().contains(&query))
            });
        }
        let total = users.len();
        let page_size = self.settings.page_size;
        let start = if page == 0 {
            total
        } else {
            (page as usize - 1) * page_size as usize
        };

        Ok(UserPage {
            items: users
                .into_iter()
                .skip(start)
                .take(page_size as usize)
                .collect(),
            total,
            total_pages: total_pages(total, page_size),
            page,
        })
    }

    pub fn user_set_admin(
        &self,
        identity: &Identity,
        user_id: &str,
        is_admin: bool,
    ) -> AppResult<UserRecord> {
        require_admin(identity)?;
        // an admin cannot revoke their own access and lock everyone out
        if identity.user_id == user_id && !is_admin {
            return Err(AppError::Policy(
                "Administrators cannot revoke their own access".to_string(),
            ));
        }

        self.store
            .update(USERS, user_id, &json!({ "isAdmin": is_admin }))?;
        tracing::info!(
            user_id = %user_id,
            is_admin,
            actor = %identity.email,
            "user admin flag changed"
        );

        let document = self.store.read(USERS, user_id)?.ok_or_else(|| {
            AppError::NotFound(format!("User '{}' not found", user_id))
        })?;
        serde_json::from_value(document).map_err(AppError::from)
    }

    /// Promotes the user with the given email to administrator. Used by the
    /// bootstrap tool, so it authenticates by email lookup rather than by a
    /// calling identity.
    pub fn make_admin(&self, email: &str) -> AppResult<UserRecord> {
        validate_email(email)?;
        let needle = email.trim().to_lowercase();

        let user = self
            .load_users()?
            .into_iter()
            .find(|user| user.email.to_lowercase() == needle)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No user with email '{}'; they must sign in once first",
                    email
                ))
            })?;

        self.store
            .update(USERS, &user.id, &json!({ "isAdmin": true }))?;
        tracing::info!(user_id = %user.id, email = %user.email, "user promoted to admin");

        Ok(UserRecord {
            is_admin: true,
            ..user
        })
    }
}
