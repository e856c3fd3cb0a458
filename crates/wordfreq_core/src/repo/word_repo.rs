//! Word-count repository: the additive half of the persistence protocol.
//!
//! # Invariants
//! - Conflicts on `word` add the incoming count to the stored one; a stored
//!   count is never overwritten.
//! - One `upsert_word_counts` call commits all rows or none.
//! - Invalid-word flags are insert-if-absent.

use crate::frequency::FrequencyMap;
use crate::model::word::{validate_word, WordCount};
use crate::repo::{ensure_tables, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

/// Upper bound on words per statement; keeps bound parameters well under
/// SQLite's variable limit.
const UPSERT_CHUNK_WORDS: usize = 500;

const UPSERT_HEAD_SQL: &str = "INSERT INTO word_counts (word, count) VALUES ";
const UPSERT_TAIL_SQL: &str = " ON CONFLICT(word) DO UPDATE
    SET count = word_counts.count + excluded.count
    RETURNING word, count;";

/// Storage contract for cumulative word counts and invalid-word flags.
pub trait WordCountRepository {
    /// Adds each `(word, occurrences)` to the stored totals and returns the
    /// resulting rows ordered by word.
    fn upsert_word_counts(&self, counts: &FrequencyMap) -> RepoResult<Vec<WordCount>>;
    /// Stored rows for the given words; unknown words are absent.
    fn get_word_counts(&self, words: &[String]) -> RepoResult<Vec<WordCount>>;
    /// Every stored row ordered by word.
    fn list_word_counts(&self, exclude_invalid: bool) -> RepoResult<Vec<WordCount>>;
    /// Returns `true` when the flag was newly added.
    fn mark_invalid_word(&self, word: &str) -> RepoResult<bool>;
    fn list_invalid_words(&self) -> RepoResult<Vec<String>>;
}

pub struct SqliteWordCountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWordCountRepository<'conn> {
    /// Builds a repository over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["word_counts", "invalid_words"])?;
        Ok(Self { conn })
    }
}

impl WordCountRepository for SqliteWordCountRepository<'_> {
    fn upsert_word_counts(&self, counts: &FrequencyMap) -> RepoResult<Vec<WordCount>> {
        let rows: Vec<WordCount> = counts
            .iter()
            .map(|(word, count)| WordCount::new(word.as_str(), *count))
            .collect();
        for row in &rows {
            row.validate()?;
        }
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut stored = Vec::with_capacity(rows.len());
        for chunk in rows.chunks(UPSERT_CHUNK_WORDS) {
            let sql = upsert_sql(chunk.len());
            let bind_values = chunk.iter().flat_map(|row| {
                [
                    Value::Text(row.word.clone()),
                    Value::Integer(row.count),
                ]
            });

            let mut stmt = tx.prepare(&sql)?;
            let mut returned = stmt.query(params_from_iter(bind_values))?;
            while let Some(row) = returned.next()? {
                stored.push(parse_word_count_row(row)?);
            }
        }
        tx.commit()?;

        stored.sort_by(|a, b| a.word.cmp(&b.word));
        Ok(stored)
    }

    fn get_word_counts(&self, words: &[String]) -> RepoResult<Vec<WordCount>> {
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; words.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT word, count FROM word_counts WHERE word IN ({placeholders}) ORDER BY word ASC;"
        ))?;
        let mut rows = stmt.query(params_from_iter(words.iter()))?;

        let mut found = Vec::new();
        while let Some(row) = rows.next()? {
            found.push(parse_word_count_row(row)?);
        }
        Ok(found)
    }

    fn list_word_counts(&self, exclude_invalid: bool) -> RepoResult<Vec<WordCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT word, count
             FROM word_counts
             WHERE ?1 = 0 OR word NOT IN (SELECT word FROM invalid_words)
             ORDER BY word ASC;",
        )?;
        let mut rows = stmt.query([i64::from(exclude_invalid)])?;

        let mut all = Vec::new();
        while let Some(row) = rows.next()? {
            all.push(parse_word_count_row(row)?);
        }
        Ok(all)
    }

    fn mark_invalid_word(&self, word: &str) -> RepoResult<bool> {
        validate_word(word)?;
        let inserted = self.conn.execute(
            "INSERT INTO invalid_words (word) VALUES (?1) ON CONFLICT DO NOTHING;",
            [word],
        )?;
        Ok(inserted == 1)
    }

    fn list_invalid_words(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT word FROM invalid_words ORDER BY word ASC;")?;
        let words = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(words)
    }
}

fn upsert_sql(row_count: usize) -> String {
    let values = vec!["(?, ?)"; row_count].join(", ");
    format!("{UPSERT_HEAD_SQL}{values}{UPSERT_TAIL_SQL}")
}

fn parse_word_count_row(row: &Row<'_>) -> RepoResult<WordCount> {
    let word_count = WordCount::new(row.get::<_, String>("word")?, row.get("count")?);
    word_count.validate()?;
    Ok(word_count)
}
