use crate::data::Database;
use crate::error::{Result, StoreError};
use schemalink_pipeline::links::{self, LinkField, ProcessedLinksHook};
use schemalink_pipeline::strategy::LinkSource;
use std::sync::Arc;
use tracing::{debug, warn};

/// Caller-supplied authorization for writes. `Some(item_id)` guards one
/// item's lists, `None` guards catalog-wide operations. The store knows no
/// policy of its own; with no check installed, writes are allowed.
pub type PermissionCheck = Arc<dyn Fn(Option<i64>) -> bool + Send + Sync>;

/// Adapter between the content metadata tables and the link pipeline. Owns
/// LinkList persistence exclusively; the render path only ever reads through
/// the [`LinkSource`] impl.
pub struct LinkStore {
    db: Database,
    permission_check: Option<PermissionCheck>,
    eligible_types: Option<Vec<String>>,
    processed_hook: Option<ProcessedLinksHook>,
}

fn split_raw_lines(raw: &str) -> Vec<String> {
    raw.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl LinkStore {
    pub fn new(db: Database) -> Self {
        LinkStore {
            db,
            permission_check: None,
            eligible_types: None,
            processed_hook: None,
        }
    }

    pub fn with_permission_check(mut self, check: PermissionCheck) -> Self {
        self.permission_check = Some(check);
        self
    }

    /// Restrict link storage to the given item types. Default: every type
    /// is eligible.
    pub fn with_eligible_types(mut self, types: Vec<String>) -> Self {
        self.eligible_types = Some(types);
        self
    }

    pub fn with_processed_hook(mut self, hook: ProcessedLinksHook) -> Self {
        self.processed_hook = Some(hook);
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn authorize(&self, item_id: Option<i64>) -> Result<()> {
        if let Some(ref check) = self.permission_check
            && !check(item_id)
        {
            return Err(StoreError::PermissionDenied);
        }
        Ok(())
    }

    fn check_eligible(&self, item_id: i64) -> Result<()> {
        let item = self
            .db
            .get_item(item_id)?
            .ok_or(StoreError::UnknownItem(item_id))?;
        if let Some(ref types) = self.eligible_types
            && !types.iter().any(|t| t == &item.item_type)
        {
            return Err(StoreError::IneligibleType(item.item_type));
        }
        Ok(())
    }

    /// Raw newline-delimited text of one list; absent storage reads as
    /// empty.
    pub fn get_raw(&self, item_id: i64, field: LinkField) -> Result<String> {
        Ok(self
            .db
            .get_meta(item_id, field.meta_key())?
            .unwrap_or_default())
    }

    pub fn set_raw(&self, item_id: i64, field: LinkField, raw: &str) -> Result<()> {
        self.authorize(Some(item_id))?;
        self.check_eligible(item_id)?;
        if raw.trim().is_empty() {
            // empty list is represented as absent storage
            self.db.delete_meta(item_id, field.meta_key())?;
        } else {
            self.db.set_meta(item_id, field.meta_key(), raw)?;
        }
        Ok(())
    }

    /// Append one link, rejecting invalid URLs and duplicates. Returns
    /// whether the link was actually added.
    pub fn add_link(&self, item_id: i64, field: LinkField, link: &str) -> Result<bool> {
        self.authorize(Some(item_id))?;
        self.check_eligible(item_id)?;
        let link = links::validate_link(link)?;

        let raw = self.get_raw(item_id, field)?;
        let mut lines = split_raw_lines(&raw);
        if lines.iter().any(|existing| existing == &link) {
            debug!("Link already stored for item {}: {}", item_id, link);
            return Ok(false);
        }
        lines.push(link);
        self.db
            .set_meta(item_id, field.meta_key(), &lines.join("\n"))?;
        Ok(true)
    }

    /// Remove one link, matching the stored line either verbatim or by its
    /// normalized form. Returns whether anything was removed.
    pub fn remove_link(&self, item_id: i64, field: LinkField, link: &str) -> Result<bool> {
        self.authorize(Some(item_id))?;
        let target = link.trim();
        let normalized = links::normalize_link(target);

        let raw = self.get_raw(item_id, field)?;
        let lines = split_raw_lines(&raw);
        let before = lines.len();
        let kept: Vec<String> = lines
            .into_iter()
            .filter(|line| line.as_str() != target && Some(line) != normalized.as_ref())
            .collect();
        if kept.len() == before {
            return Ok(false);
        }

        if kept.is_empty() {
            self.db.delete_meta(item_id, field.meta_key())?;
        } else {
            self.db
                .set_meta(item_id, field.meta_key(), &kept.join("\n"))?;
        }
        Ok(true)
    }

    pub fn clear(&self, item_id: i64, field: LinkField) -> Result<()> {
        self.authorize(Some(item_id))?;
        self.db.delete_meta(item_id, field.meta_key())?;
        Ok(())
    }

    pub fn clear_both(&self, item_id: i64) -> Result<()> {
        for field in LinkField::ALL {
            self.clear(item_id, field)?;
        }
        Ok(())
    }

    /// Catalog-wide removal of one field from every item regardless of type
    /// or status. Not transactional across items; used by uninstall cleanup.
    pub fn clear_all(&self, field: LinkField) -> Result<usize> {
        self.authorize(None)?;
        Ok(self.db.delete_meta_by_key(field.meta_key())?)
    }

    /// Processed list plus the count of lines dropped by validation, for the
    /// editing surface. The render path never sees the count.
    pub fn preview(&self, item_id: i64, field: LinkField) -> Result<(Vec<String>, usize)> {
        let raw = self.get_raw(item_id, field)?;
        let (links, dropped) = links::process_links_with_dropped(&raw);
        let links = match self.processed_hook {
            Some(ref hook) => hook(links, item_id, field),
            None => links,
        };
        Ok((links, dropped))
    }
}

impl LinkSource for LinkStore {
    /// Render-path read. Failures degrade to an empty list: a storage
    /// hiccup must never break page rendering.
    fn links_for(&self, item_id: i64, field: LinkField) -> Vec<String> {
        let raw = match self.db.get_meta(item_id, field.meta_key()) {
            Ok(raw) => raw.unwrap_or_default(),
            Err(err) => {
                warn!(
                    "Link lookup failed for item {} ({}): {}",
                    item_id,
                    field.as_str(),
                    err
                );
                return Vec::new();
            }
        };
        let links = links::process_links(&raw);
        match self.processed_hook {
            Some(ref hook) => hook(links, item_id, field),
            None => links,
        }
    }
}
