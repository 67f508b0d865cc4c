use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{Pool, QueryBuilder, Sqlite};
use uuid::Uuid;
use crate::db::models::{NewNote, Note, NoteChanges};
use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Tag restriction for a note listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
    All,
    Tag(String),
}

impl TagFilter {
    /// Absent, blank and `"all"` (any case) mean no restriction
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => TagFilter::All,
            Some(v) if v.eq_ignore_ascii_case("all") => TagFilter::All,
            Some(v) => TagFilter::Tag(v.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Latest,
    Oldest,
}

impl SortOrder {
    pub fn from_param(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("latest") | Some("newest") => Ok(SortOrder::Latest),
            Some("oldest") => Ok(SortOrder::Oldest),
            Some(other) => Err(AppError::Validation(format!("Invalid sort order: {}", other))),
        }
    }

    fn sql(self) -> &'static str {
        match self {
            SortOrder::Latest => " ORDER BY date DESC, id DESC",
            SortOrder::Oldest => " ORDER BY date ASC, id ASC",
        }
    }
}

/// Raw listing parameters as they arrive on the query string
#[derive(Debug, Default, Deserialize)]
pub struct ListNotesParams {
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

/// A validated, owner-scoped note listing request
#[derive(Debug, Clone)]
pub struct NoteQuery {
    pub user_id: String,
    pub tag: TagFilter,
    pub search: Option<String>,
    pub sort: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl NoteQuery {
    pub fn from_params(
        user_id: &str,
        params: ListNotesParams,
        max_page_size: u32,
    ) -> Result<Self, AppError> {
        let page = params.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }

        let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 {
            return Err(AppError::Validation("limit must be at least 1".to_string()));
        }

        let search = params
            .search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        Ok(NoteQuery {
            user_id: user_id.to_string(),
            tag: TagFilter::from_param(params.filter.as_deref()),
            search,
            sort: SortOrder::from_param(params.sort.as_deref())?,
            page,
            limit: limit.min(max_page_size.max(1)),
        })
    }

    fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE user_id = ").push_bind(self.user_id.clone());

        if let TagFilter::Tag(tag) = &self.tag {
            qb.push(" AND EXISTS (SELECT 1 FROM json_each(notes.tags) WHERE json_each.value = ")
                .push_bind(tag.clone())
                .push(")");
        }

        // `search` is already lowercased
        if let Some(search) = &self.search {
            qb.push(" AND instr(title_folded, ")
                .push_bind(search.clone())
                .push(") > 0");
        }
    }
}

/// Full Unicode lowercase, stored alongside the title for search
fn fold_title(title: &str) -> String {
    title.to_lowercase()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePage {
    pub notes: Vec<Note>,
    pub current_page: u32,
    pub total_pages: i64,
    pub total_notes: i64,
}

pub struct NoteRepository;

impl NoteRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        user_id: &str,
        note: NewNote,
        date: i64,
    ) -> Result<Note, AppError> {
        let id = Uuid::new_v4().to_string();

        let note = sqlx::query_as::<_, Note>(
            r#"
INSERT INTO notes (id, user_id, title, title_folded, content, summary, tags, date)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&note.title)
        .bind(fold_title(&note.title))
        .bind(&note.content)
        .bind(&note.summary)
        .bind(Json(&note.tags))
        .bind(date)
        .fetch_one(pool)
        .await?;

        Ok(note)
    }

    pub async fn get_for_owner(
        pool: &Pool<Sqlite>,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Note>, AppError> {
        let note = sqlx::query_as::<_, Note>(
            "SELECT * FROM notes WHERE id = ? AND user_id = ?"
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(note)
    }

    pub async fn update_for_owner(
        pool: &Pool<Sqlite>,
        id: &str,
        user_id: &str,
        changes: NoteChanges,
    ) -> Result<Option<Note>, AppError> {
        let title_folded = changes.title.as_deref().map(fold_title);

        let note = sqlx::query_as::<_, Note>(
            r#"
UPDATE notes
SET title = COALESCE(?, title),
    title_folded = COALESCE(?, title_folded),
    content = COALESCE(?, content),
    summary = COALESCE(?, summary),
    tags = COALESCE(?, tags)
WHERE id = ? AND user_id = ?
RETURNING *
            "#,
        )
        .bind(changes.title)
        .bind(title_folded)
        .bind(changes.content)
        .bind(changes.summary)
        .bind(changes.tags.map(Json))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(note)
    }

    /// Returns false when no note with this id belongs to `user_id`
    pub async fn delete_for_owner(
        pool: &Pool<Sqlite>,
        id: &str,
        user_id: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list(pool: &Pool<Sqlite>, query: &NoteQuery) -> Result<NotePage, AppError> {
        let mut count: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM notes");
        query.push_conditions(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        let mut select: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM notes");
        query.push_conditions(&mut select);
        select
            .push(query.sort.sql())
            .push(" LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(query.offset());

        let notes = select.build_query_as::<Note>().fetch_all(pool).await?;
        let limit = i64::from(query.limit);

        Ok(NotePage {
            notes,
            current_page: query.page,
            total_pages: (total + limit - 1) / limit,
            total_notes: total,
        })
    }
}
