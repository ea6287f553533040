//! Fragment table operations

use fragments_types::{Fragment, FragmentDraft, FragmentPage};
use rusqlite::types::Type;
use rusqlite::OptionalExtension;

use super::{date_column, format_date, Db};
use crate::error::{StoreError, StoreResult};

pub(super) const FRAGMENT_COLUMNS: &str = "id, title, text, tags, date";

impl Db {
    /// Insert a fragment. Tags are normalized; a taken date is a
    /// `Conflict("date")`.
    pub fn create_fragment(&self, draft: &FragmentDraft) -> StoreResult<Fragment> {
        let conn = self.conn();
        let tags = draft.normalized_tags();

        conn.execute(
            "INSERT INTO fragments (title, text, tags, date) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                &draft.title,
                &draft.text,
                encode_tags(&tags),
                format_date(draft.date),
            ],
        )
        .map_err(StoreError::unique("date"))?;

        Ok(Fragment {
            id: conn.last_insert_rowid(),
            title: draft.title.clone(),
            text: draft.text.clone(),
            tags,
            date: draft.date,
        })
    }

    pub fn get_fragment(&self, id: i64) -> StoreResult<Option<Fragment>> {
        let conn = self.conn();
        let fragment = conn
            .query_row(
                &format!("SELECT {} FROM fragments WHERE id = ?1", FRAGMENT_COLUMNS),
                [id],
                row_to_fragment,
            )
            .optional()?;
        Ok(fragment)
    }

    /// Overwrite every editable field, renormalizing tags. `None` when the
    /// fragment does not exist.
    pub fn update_fragment(&self, id: i64, draft: &FragmentDraft) -> StoreResult<Option<Fragment>> {
        let conn = self.conn();
        let tags = draft.normalized_tags();

        let rows_affected = conn
            .execute(
                "UPDATE fragments SET title = ?1, text = ?2, tags = ?3, date = ?4 WHERE id = ?5",
                rusqlite::params![
                    &draft.title,
                    &draft.text,
                    encode_tags(&tags),
                    format_date(draft.date),
                    id,
                ],
            )
            .map_err(StoreError::unique("date"))?;

        if rows_affected == 0 {
            return Ok(None);
        }
        Ok(Some(Fragment {
            id,
            title: draft.title.clone(),
            text: draft.text.clone(),
            tags,
            date: draft.date,
        }))
    }

    /// Delete a fragment, returning what was removed.
    pub fn delete_fragment(&self, id: i64) -> StoreResult<Option<Fragment>> {
        let Some(fragment) = self.get_fragment(id)? else {
            return Ok(None);
        };
        let conn = self.conn();
        let rows_affected = conn.execute("DELETE FROM fragments WHERE id = ?1", [id])?;
        Ok((rows_affected > 0).then_some(fragment))
    }

    /// All fragments, newest first.
    pub fn list_fragments(&self) -> StoreResult<Vec<Fragment>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM fragments ORDER BY id DESC",
            FRAGMENT_COLUMNS
        ))?;
        let fragments = stmt
            .query_map([], row_to_fragment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(fragments)
    }

    /// One page of the newest-first listing. Pages start at 1.
    pub fn list_fragments_page(&self, page: u32, per_page: u32) -> StoreResult<FragmentPage> {
        let page = page.max(1);
        let offset = i64::from(page - 1) * i64::from(per_page);
        let conn = self.conn();

        let total: i64 = conn.query_row("SELECT COUNT(*) FROM fragments", [], |r| r.get(0))?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM fragments ORDER BY id DESC LIMIT ?1 OFFSET ?2",
            FRAGMENT_COLUMNS
        ))?;
        let items = stmt
            .query_map(rusqlite::params![per_page, offset], row_to_fragment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(FragmentPage {
            items,
            page,
            per_page,
            total,
        })
    }

    pub fn count_fragments(&self) -> StoreResult<i64> {
        let conn = self.conn();
        Ok(conn.query_row("SELECT COUNT(*) FROM fragments", [], |r| r.get(0))?)
    }
}

fn encode_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

pub(super) fn row_to_fragment(row: &rusqlite::Row) -> rusqlite::Result<Fragment> {
    let tags_json: String = row.get(3)?;
    let tags = serde_json::from_str(&tags_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(Fragment {
        id: row.get(0)?,
        title: row.get(1)?,
        text: row.get(2)?,
        tags,
        date: date_column(row, 4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft(title: &str, tags: &str, day: u32) -> FragmentDraft {
        FragmentDraft {
            title: title.to_string(),
            text: format!("body of {}", title),
            tags: tags.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        }
    }

    #[test]
    fn test_create_normalizes_tags() {
        let db = Db::open(":memory:").unwrap();
        let created = db.create_fragment(&draft("one", " Rust , Web  Dev ", 1)).unwrap();
        assert_eq!(created.tags, vec!["rust", "web dev"]);

        let loaded = db.get_fragment(created.id).unwrap().unwrap();
        assert_eq!(loaded, created);
    }

    #[test]
    fn test_duplicate_date_conflicts() {
        let db = Db::open(":memory:").unwrap();
        db.create_fragment(&draft("one", "", 1)).unwrap();
        let second = db.create_fragment(&draft("two", "", 1));
        assert!(matches!(second, Err(StoreError::Conflict("date"))));
    }

    #[test]
    fn test_update_renormalizes_tags() {
        let db = Db::open(":memory:").unwrap();
        let created = db.create_fragment(&draft("one", "a", 1)).unwrap();

        let updated = db
            .update_fragment(created.id, &draft("renamed", "X ,  Y", 2))
            .unwrap()
            .unwrap();
        assert_eq!(updated.tags, vec!["x", "y"]);

        let loaded = db.get_fragment(created.id).unwrap().unwrap();
        assert_eq!(loaded.title, "renamed");
        assert_eq!(loaded.tags, vec!["x", "y"]);
        assert_eq!(loaded.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_update_missing_fragment() {
        let db = Db::open(":memory:").unwrap();
        assert!(db.update_fragment(42, &draft("x", "", 1)).unwrap().is_none());
    }

    #[test]
    fn test_update_into_taken_date_conflicts() {
        let db = Db::open(":memory:").unwrap();
        db.create_fragment(&draft("one", "", 1)).unwrap();
        let second = db.create_fragment(&draft("two", "", 2)).unwrap();
        let result = db.update_fragment(second.id, &draft("two", "", 1));
        assert!(matches!(result, Err(StoreError::Conflict("date"))));
    }

    #[test]
    fn test_delete_removes_from_listings() {
        let db = Db::open(":memory:").unwrap();
        let keep = db.create_fragment(&draft("keep", "", 1)).unwrap();
        let gone = db.create_fragment(&draft("gone", "", 2)).unwrap();

        let deleted = db.delete_fragment(gone.id).unwrap().unwrap();
        assert_eq!(deleted.title, "gone");

        let ids: Vec<i64> = db.list_fragments().unwrap().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![keep.id]);
        let page = db.list_fragments_page(1, 5).unwrap();
        assert_eq!(page.total, 1);
        assert!(page.items.iter().all(|f| f.id != gone.id));
        assert!(db.delete_fragment(gone.id).unwrap().is_none());
    }

    #[test]
    fn test_pages_are_newest_first() {
        let db = Db::open(":memory:").unwrap();
        for day in 1..=7 {
            db.create_fragment(&draft(&format!("f{}", day), "", day)).unwrap();
        }

        let first = db.list_fragments_page(1, 5).unwrap();
        let titles: Vec<&str> = first.items.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["f7", "f6", "f5", "f4", "f3"]);
        assert_eq!(first.total, 7);
        assert!(first.has_next());

        let second = db.list_fragments_page(2, 5).unwrap();
        let titles: Vec<&str> = second.items.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["f2", "f1"]);
        assert!(!second.has_next());

        assert!(db.list_fragments_page(3, 5).unwrap().items.is_empty());
    }
}
