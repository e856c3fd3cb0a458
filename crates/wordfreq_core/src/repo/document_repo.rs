//! Document repository: the dedup half of the persistence protocol.
//!
//! # Invariants
//! - Lookups compare the canonical URL by exact string equality.
//! - `record_document` is an insert; `url` is UNIQUE in the schema, so a
//!   second insert of the same URL fails instead of double-recording.

use crate::model::document::{Document, DocumentTotals};
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Storage contract for processed documents.
pub trait DocumentRepository {
    fn has_document(&self, url: &str) -> RepoResult<bool>;
    fn record_document(&self, document: &Document) -> RepoResult<()>;
    fn get_document(&self, url: &str) -> RepoResult<Option<Document>>;
    fn document_totals(&self) -> RepoResult<DocumentTotals>;
}

pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    /// Builds a repository over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["scraped_documents"])?;
        Ok(Self { conn })
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn has_document(&self, url: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM scraped_documents WHERE url = ?1);",
            [url],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn record_document(&self, document: &Document) -> RepoResult<()> {
        if document.url.is_empty() {
            return Err(RepoError::InvalidData(
                "document url cannot be empty".to_string(),
            ));
        }
        if document.word_count < 0 {
            return Err(RepoError::InvalidData(format!(
                "negative word count {} for `{}`",
                document.word_count, document.url
            )));
        }

        self.conn.execute(
            "INSERT INTO scraped_documents (url, word_count) VALUES (?1, ?2);",
            params![document.url.as_str(), document.word_count],
        )?;
        Ok(())
    }

    fn get_document(&self, url: &str) -> RepoResult<Option<Document>> {
        let document = self
            .conn
            .query_row(
                "SELECT url, word_count FROM scraped_documents WHERE url = ?1;",
                [url],
                |row| Ok(Document::new(row.get::<_, String>(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(document)
    }

    fn document_totals(&self) -> RepoResult<DocumentTotals> {
        let totals = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(word_count), 0) FROM scraped_documents;",
            [],
            |row| {
                Ok(DocumentTotals {
                    documents: row.get(0)?,
                    words: row.get(1)?,
                })
            },
        )?;
        Ok(totals)
    }
}
