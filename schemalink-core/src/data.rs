use rusqlite::{Connection, OptionalExtension, Result, params, params_from_iter};
use rusqlite::types::Value as SqlValue;
use schemalink_pipeline::links::LinkField;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct Database {
    conn: Connection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    Published,
    Draft,
    Private,
    Archived,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Published => "published",
            ItemStatus::Draft => "draft",
            ItemStatus::Private => "private",
            ItemStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<ItemStatus> {
        match s {
            "published" => Some(ItemStatus::Published),
            "draft" => Some(ItemStatus::Draft),
            "private" => Some(ItemStatus::Private),
            "archived" => Some(ItemStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub permalink: String,
    pub item_type: String,
    pub category: Option<String>,
    pub status: ItemStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub title: String,
    pub slug: String,
    pub permalink: String,
    pub item_type: String,
    pub category: Option<String>,
    pub status: ItemStatus,
}

/// Which columns a catalog search term matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchColumn {
    All,
    Title,
    Url,
    SchemaLinks,
}

impl SearchColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchColumn::All => "all",
            SearchColumn::Title => "title",
            SearchColumn::Url => "url",
            SearchColumn::SchemaLinks => "schema-links",
        }
    }

    pub fn parse(s: &str) -> Option<SearchColumn> {
        match s {
            "all" => Some(SearchColumn::All),
            "title" => Some(SearchColumn::Title),
            "url" => Some(SearchColumn::Url),
            "schema-links" => Some(SearchColumn::SchemaLinks),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    Title,
    Type,
    Url,
}

impl OrderBy {
    fn column(&self) -> &'static str {
        match self {
            OrderBy::Title => "title",
            OrderBy::Type => "item_type",
            OrderBy::Url => "slug",
        }
    }

    pub fn parse(s: &str) -> Option<OrderBy> {
        match s {
            "title" => Some(OrderBy::Title),
            "type" => Some(OrderBy::Type),
            "url" => Some(OrderBy::Url),
            _ => None,
        }
    }
}

/// Catalog query built from composed predicates. Every filter becomes a
/// parameterized WHERE fragment; the generated SQL is never patched up
/// after the fact.
#[derive(Debug, Clone)]
pub struct ItemQuery {
    pub search: Option<String>,
    pub search_column: SearchColumn,
    pub item_type: Option<String>,
    pub category: Option<String>,
    pub status: Option<ItemStatus>,
    pub order_by: OrderBy,
    pub descending: bool,
    pub page: usize,
    pub per_page: usize,
}

impl Default for ItemQuery {
    fn default() -> Self {
        ItemQuery {
            search: None,
            search_column: SearchColumn::All,
            item_type: None,
            category: None,
            status: None,
            order_by: OrderBy::Title,
            descending: false,
            page: 1,
            per_page: 20,
        }
    }
}

/// One catalog row with its raw stored link lines, ready for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub item: ContentItem,
    pub significant_links: Vec<String>,
    pub related_links: Vec<String>,
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

fn split_raw_lines(raw: &str) -> Vec<String> {
    raw.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl Database {
    pub fn drop(path: &Path) {
        fs::remove_file(path).unwrap();
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Optimize for concurrent writes
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            -- Content catalog
            CREATE TABLE IF NOT EXISTS content_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    permalink TEXT NOT NULL,
    item_type TEXT NOT NULL DEFAULT 'post',
    category TEXT,
    status TEXT NOT NULL DEFAULT 'published'
        CHECK(status IN ('published', 'draft', 'private', 'archived')),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_items_type ON content_items(item_type);
CREATE INDEX IF NOT EXISTS idx_items_status ON content_items(status);
CREATE INDEX IF NOT EXISTS idx_items_category ON content_items(category);

-- Generic per-item metadata; the two link lists live here under
-- 'significant_links_raw' and 'related_links_raw'
CREATE TABLE IF NOT EXISTS item_meta (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id INTEGER NOT NULL,
    meta_key TEXT NOT NULL,
    meta_value TEXT NOT NULL,
    updated_at INTEGER NOT NULL,

    FOREIGN KEY(item_id) REFERENCES content_items(id) ON DELETE CASCADE,
    UNIQUE(item_id, meta_key)
);

CREATE INDEX IF NOT EXISTS idx_meta_item ON item_meta(item_id);
CREATE INDEX IF NOT EXISTS idx_meta_key ON item_meta(meta_key);
            ",
        )?;
        Ok(())
    }

    // Item operations
    pub fn insert_item(&self, item: &NewItem) -> Result<i64> {
        let timestamp = current_timestamp();

        self.conn.execute(
            "INSERT INTO content_items (title, slug, permalink, item_type, category, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &item.title,
                &item.slug,
                &item.permalink,
                &item.item_type,
                &item.category,
                item.status.as_str(),
                timestamp,
                timestamp,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_item(&self, id: i64) -> Result<Option<ContentItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, slug, permalink, item_type, category, status, created_at, updated_at
             FROM content_items WHERE id = ?1",
        )?;

        stmt.query_row(params![id], row_to_item).optional()
    }

    pub fn get_item_by_slug(&self, slug: &str) -> Result<Option<ContentItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, slug, permalink, item_type, category, status, created_at, updated_at
             FROM content_items WHERE slug = ?1",
        )?;

        stmt.query_row(params![slug], row_to_item).optional()
    }

    pub fn count_items(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM content_items", [], |row| row.get(0))
    }

    // Metadata operations
    pub fn get_meta(&self, item_id: i64, meta_key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT meta_value FROM item_meta WHERE item_id = ?1 AND meta_key = ?2")?;

        stmt.query_row(params![item_id, meta_key], |row| row.get(0))
            .optional()
    }

    pub fn set_meta(&self, item_id: i64, meta_key: &str, meta_value: &str) -> Result<()> {
        let timestamp = current_timestamp();

        self.conn.execute(
            "INSERT INTO item_meta (item_id, meta_key, meta_value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(item_id, meta_key)
             DO UPDATE SET meta_value = excluded.meta_value, updated_at = excluded.updated_at",
            params![item_id, meta_key, meta_value, timestamp],
        )?;
        Ok(())
    }

    pub fn delete_meta(&self, item_id: i64, meta_key: &str) -> Result<usize> {
        self.conn.execute(
            "DELETE FROM item_meta WHERE item_id = ?1 AND meta_key = ?2",
            params![item_id, meta_key],
        )
    }

    /// Catalog-wide delete of one meta key across every item regardless of
    /// status. Returns the number of rows removed.
    pub fn delete_meta_by_key(&self, meta_key: &str) -> Result<usize> {
        self.conn
            .execute("DELETE FROM item_meta WHERE meta_key = ?1", params![meta_key])
    }

    // Catalog query
    fn build_predicates(query: &ItemQuery) -> (String, Vec<SqlValue>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(ref item_type) = query.item_type {
            clauses.push("item_type = ?".to_string());
            values.push(SqlValue::Text(item_type.clone()));
        }

        if let Some(ref category) = query.category {
            clauses.push("category = ?".to_string());
            values.push(SqlValue::Text(category.clone()));
        }

        if let Some(status) = query.status {
            clauses.push("status = ?".to_string());
            values.push(SqlValue::Text(status.as_str().to_string()));
        }

        if let Some(ref search) = query.search
            && !search.is_empty()
        {
            let pattern = format!("%{}%", search);
            let meta_exists = format!(
                "EXISTS (SELECT 1 FROM item_meta m WHERE m.item_id = content_items.id \
                 AND m.meta_key IN ('{}', '{}') AND m.meta_value LIKE ?)",
                LinkField::Significant.meta_key(),
                LinkField::Related.meta_key()
            );
            match query.search_column {
                SearchColumn::Title => {
                    clauses.push("title LIKE ?".to_string());
                    values.push(SqlValue::Text(pattern));
                }
                SearchColumn::Url => {
                    clauses.push("(slug LIKE ? OR permalink LIKE ?)".to_string());
                    values.push(SqlValue::Text(pattern.clone()));
                    values.push(SqlValue::Text(pattern));
                }
                SearchColumn::SchemaLinks => {
                    clauses.push(meta_exists);
                    values.push(SqlValue::Text(pattern));
                }
                SearchColumn::All => {
                    clauses.push(format!(
                        "(title LIKE ? OR slug LIKE ? OR permalink LIKE ? OR {})",
                        meta_exists
                    ));
                    values.push(SqlValue::Text(pattern.clone()));
                    values.push(SqlValue::Text(pattern.clone()));
                    values.push(SqlValue::Text(pattern.clone()));
                    values.push(SqlValue::Text(pattern));
                }
            }
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        (where_sql, values)
    }

    /// Run a catalog query, returning the matching page of entries plus the
    /// total match count for pagination.
    pub fn query_items(&self, query: &ItemQuery) -> Result<(Vec<CatalogEntry>, i64)> {
        let (where_sql, values) = Self::build_predicates(query);

        let count_sql = format!("SELECT COUNT(*) FROM content_items{}", where_sql);
        let total: i64 =
            self.conn
                .query_row(&count_sql, params_from_iter(values.iter()), |row| row.get(0))?;

        let per_page = query.per_page.max(1);
        let offset = query.page.saturating_sub(1) * per_page;
        let direction = if query.descending { "DESC" } else { "ASC" };
        let select_sql = format!(
            "SELECT id, title, slug, permalink, item_type, category, status, created_at, updated_at
             FROM content_items{} ORDER BY {} COLLATE NOCASE {} LIMIT ? OFFSET ?",
            where_sql,
            query.order_by.column(),
            direction
        );

        let mut page_values = values;
        page_values.push(SqlValue::Integer(per_page as i64));
        page_values.push(SqlValue::Integer(offset as i64));

        let mut stmt = self.conn.prepare(&select_sql)?;
        let items = stmt
            .query_map(params_from_iter(page_values.iter()), row_to_item)?
            .collect::<Result<Vec<_>>>()?;

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let significant_links = self
                .get_meta(item.id, LinkField::Significant.meta_key())?
                .map(|raw| split_raw_lines(&raw))
                .unwrap_or_default();
            let related_links = self
                .get_meta(item.id, LinkField::Related.meta_key())?
                .map(|raw| split_raw_lines(&raw))
                .unwrap_or_default();
            entries.push(CatalogEntry {
                item,
                significant_links,
                related_links,
            });
        }

        Ok((entries, total))
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}

fn row_to_item(row: &rusqlite::Row) -> Result<ContentItem> {
    let status: String = row.get(6)?;
    let status = ItemStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Text,
            format!("unknown item status '{}'", status).into(),
        )
    })?;

    Ok(ContentItem {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        permalink: row.get(3)?,
        item_type: row.get(4)?,
        category: row.get(5)?,
        status,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
