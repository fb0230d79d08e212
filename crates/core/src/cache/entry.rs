//! Cache entry model and row operations.
//!
//! One row per distinct request key; writes are upserts, reads are
//! point lookups. Entries are never deleted here. A caller that wants
//! fresh data forces a refresh, which overwrites in place.

use super::connection::CacheDb;
use super::format::PayloadFormat;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// One cached fetch result, keyed by the fully-built request URL.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cache key: the request URL, query string included.
    pub request: String,
    /// Name of the fetch operation that produced the entry. Diagnostic
    /// only; not part of the key.
    pub func_name: Option<String>,
    /// Serialized payload: UTF-8 text, or base64 when `format` is bytes.
    pub body: String,
    /// How `body` must be decoded.
    pub format: PayloadFormat,
    /// Original response Content-Type, when the source was HTTP.
    pub content_type: Option<String>,
    /// Character encoding label used for the body text.
    pub encoding: Option<String>,
    /// Original HTTP status.
    pub status_code: Option<i32>,
    /// JSON-encoded map of original response headers.
    pub headers: Option<String>,
    /// RFC 3339 insertion/update time.
    pub timestamp: String,
}

impl CacheDb {
    /// Insert or replace the entry for its request key.
    ///
    /// Uses UPSERT semantics keyed on `request`: a second write for the
    /// same key replaces every column, never leaves two rows.
    pub async fn upsert_entry(&self, entry: &CacheEntry) -> Result<(), Error> {
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache (
                        request, func_name, body, format, content_type,
                        encoding, status_code, headers, timestamp
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(request) DO UPDATE SET
                        func_name = excluded.func_name,
                        body = excluded.body,
                        format = excluded.format,
                        content_type = excluded.content_type,
                        encoding = excluded.encoding,
                        status_code = excluded.status_code,
                        headers = excluded.headers,
                        timestamp = excluded.timestamp",
                    params![
                        &entry.request,
                        &entry.func_name,
                        &entry.body,
                        entry.format.as_str(),
                        &entry.content_type,
                        &entry.encoding,
                        &entry.status_code,
                        &entry.headers,
                        &entry.timestamp,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the entry for a request key.
    ///
    /// Returns None when the key has never been cached.
    pub async fn get_entry(&self, request: &str) -> Result<Option<CacheEntry>, Error> {
        let request = request.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT request, func_name, body, format, content_type,
                            encoding, status_code, headers, timestamp
                     FROM cache WHERE request = ?1",
                )?;

                let result = stmt.query_row(params![request], |row| {
                    Ok(CacheEntry {
                        request: row.get(0)?,
                        func_name: row.get(1)?,
                        body: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                        format: PayloadFormat::from_tag(row.get::<_, Option<String>>(3)?.as_deref()),
                        content_type: row.get(4)?,
                        encoding: row.get(5)?,
                        status_code: row.get(6)?,
                        headers: row.get(7)?,
                        timestamp: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
                    })
                });

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Number of cached entries.
    pub async fn entry_count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
