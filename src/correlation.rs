// src/correlation.rs
use crate::record::DiagnosticRecord;
use lru::LruCache;

/// Seconds a request id stays buffered after its latest diagnostic line
pub const CORRELATION_WINDOW_SECS: i64 = 600;

/// Prepended to each buffered line so it nests under the completion line
pub const EXTRA_LINE_PREFIX: &str = "  ";

#[derive(Debug, Clone)]
struct PendingTrace {
    lines: Vec<String>,
    expires_at: i64,
}

/// Diagnostic lines waiting for the completion line of their request.
///
/// Entries are kept in touch order (least recently touched first), so expiry
/// only ever has to look at the front of the cache. The log's own timestamps
/// serve as the clock: lines within one source must be roughly monotonic or
/// entries expire early or late.
pub struct CorrelationBuffer {
    entries: LruCache<String, PendingTrace>,
    window: i64,
    expired: usize,
}

impl CorrelationBuffer {
    pub fn new() -> Self {
        CorrelationBuffer {
            entries: LruCache::unbounded(),
            window: CORRELATION_WINDOW_SECS,
            expired: 0,
        }
    }

    /// Buffer a diagnostic line under its request id. Returns `false` (and
    /// buffers nothing) when the record's timestamp is not a usable time.
    pub fn store(&mut self, record: &DiagnosticRecord) -> bool {
        let Some(now) = record.common.time_value else {
            return false;
        };
        let text = format!("{}{}", EXTRA_LINE_PREFIX, record.common.line);
        let expires_at = now + self.window;

        // get_mut moves the entry to the most recently used end
        if let Some(trace) = self.entries.get_mut(record.common.request_id.as_str()) {
            trace.lines.push(text);
            trace.expires_at = expires_at;
        } else {
            self.entries.put(
                record.common.request_id.clone(),
                PendingTrace {
                    lines: vec![text],
                    expires_at,
                },
            );
        }

        self.expire(now);
        true
    }

    /// Remove and return the buffered lines for `request_id`, joined by newlines.
    /// Pending entries are returned even if their window has passed.
    pub fn retrieve(&mut self, request_id: &str) -> String {
        self.entries
            .pop(request_id)
            .map(|trace| trace.lines.join("\n"))
            .unwrap_or_default()
    }

    /// Drop entries whose expiry is at or before `now`, oldest first
    fn expire(&mut self, now: i64) {
        while let Some((_, trace)) = self.entries.peek_lru() {
            if trace.expires_at > now {
                break;
            }
            self.entries.pop_lru();
            self.expired += 1;
        }
    }

    /// Number of request ids currently buffered
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries evicted by expiry so far
    pub fn expired_count(&self) -> usize {
        self.expired
    }

    /// Discard everything still pending, returning how many entries were dropped
    pub fn clear(&mut self) -> usize {
        let pending = self.entries.len();
        self.entries.clear();
        pending
    }
}

impl Default for CorrelationBuffer {
    fn default() -> Self {
        Self::new()
    }
}
