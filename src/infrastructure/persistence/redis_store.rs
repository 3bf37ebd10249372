//! Redis-backed mapping store.
//!
//! Every write that touches more than one key runs as a single Lua script, so
//! claims stay atomic across processes and restarts. Scripts are loaded once
//! and invoked by SHA.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use r2d2::{Pool, PooledConnection};
use redis::{Client, Connection, RedisError, Script};
use tracing::{debug, info, warn};

use crate::domain::entities::{Expiry, Record, RecordStatus, ShortCode};
use crate::domain::repositories::{InsertOutcome, MappingStore, Sequence};
use crate::error::ShortenerError;

const NEVER: &str = "never";

const POOL_MAX_SIZE: u32 = 16;
const POOL_MIN_IDLE: u32 = 2;
const COMMAND_TIMEOUT: Duration = Duration::from_secs(2);
/// How long a hit may wait for a pooled connection before it is dropped.
const HIT_CHECKOUT_TIMEOUT: Duration = Duration::from_millis(20);

/// Shared helpers prepended to scripts that need them.
const LIVENESS_LUA: &str = r#"
local function is_active(key, now)
  local h = redis.call('HMGET', key, 'status', 'expires_at')
  if h[1] ~= 'active' then return false end
  if h[2] == 'never' then return true end
  return tonumber(h[2]) > now
end
"#;

// KEYS: record, reverse, expiry index
// ARGV: code, url, created_at, expires_at, now, index flag, key expiry, prefix
//
// Arguments are checked before the first write: Redis does not roll back a
// script that fails halfway.
const TRY_INSERT_LUA: &str = r#"
local now = tonumber(ARGV[5])
if not now or not tonumber(ARGV[3]) then
  return redis.error_reply('try_insert: bad timestamp argument')
end
local expiring = ARGV[4] ~= 'never'
if expiring and (not tonumber(ARGV[4]) or not tonumber(ARGV[7])) then
  return redis.error_reply('try_insert: bad expiry argument')
end
if ARGV[6] == '1' then
  local held = redis.call('GET', KEYS[2])
  if held then
    local hkey = ARGV[8] .. 'code:' .. held
    if is_active(hkey, now) and redis.call('HGET', hkey, 'url') == ARGV[2] then
      local h = redis.call('HMGET', hkey, 'url', 'created_at', 'expires_at', 'status', 'hits')
      return {'existing', held, h[1], h[2], h[3], h[4], h[5]}
    end
  end
end
if is_active(KEYS[1], now) then
  return {'collision'}
end
local old_url = redis.call('HGET', KEYS[1], 'url')
redis.call('DEL', KEYS[1])
redis.call('HSET', KEYS[1], 'url', ARGV[2], 'created_at', ARGV[3],
  'expires_at', ARGV[4], 'status', 'active', 'hits', 0)
if expiring then
  redis.call('ZADD', KEYS[3], ARGV[4], ARGV[1])
  redis.call('PEXPIREAT', KEYS[1], ARGV[7])
end
if ARGV[6] == '1' then
  redis.call('SET', KEYS[2], ARGV[1])
  if expiring then
    redis.call('PEXPIREAT', KEYS[2], ARGV[7])
  end
end
if old_url and old_url ~= ARGV[2] then
  local stale = ARGV[8] .. 'url:' .. old_url
  if redis.call('GET', stale) == ARGV[1] then
    redis.call('DEL', stale)
  end
end
return {'inserted'}
"#;

// KEYS: record. ARGV: now
const MARK_EXPIRED_LUA: &str = r#"
local h = redis.call('HMGET', KEYS[1], 'status', 'expires_at')
if h[1] ~= 'active' or not h[2] or h[2] == 'never' then return 0 end
if tonumber(ARGV[1]) >= tonumber(h[2]) then
  redis.call('HSET', KEYS[1], 'status', 'expired')
  return 1
end
return 0
"#;

// KEYS: record. ARGV: cutoff, prefix, code
const DELETE_EXPIRED_LUA: &str = r#"
local h = redis.call('HMGET', KEYS[1], 'expires_at', 'url')
if not h[1] or h[1] == 'never' or tonumber(ARGV[1]) < tonumber(h[1]) then return 0 end
redis.call('DEL', KEYS[1])
if h[2] then
  local reverse = ARGV[2] .. 'url:' .. h[2]
  if redis.call('GET', reverse) == ARGV[3] then
    redis.call('DEL', reverse)
  end
end
return 1
"#;

// KEYS: expiry index. ARGV: cutoff, limit
const NEXT_DUE_LUA: &str = r#"
local due = redis.call('ZRANGEBYSCORE', KEYS[1], '-inf', ARGV[1], 'LIMIT', 0, ARGV[2])
if #due > 0 then
  redis.call('ZREM', KEYS[1], unpack(due))
end
return due
"#;

// KEYS: record
const RECORD_HIT_LUA: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return redis.call('HINCRBY', KEYS[1], 'hits', 1)
end
return 0
"#;

/// The store's Lua scripts, hashed once.
struct Scripts {
    try_insert: Script,
    mark_expired: Script,
    delete_expired: Script,
    next_due: Script,
    record_hit: Script,
}

impl Scripts {
    fn new() -> Self {
        Self {
            try_insert: Script::new(&format!("{LIVENESS_LUA}{TRY_INSERT_LUA}")),
            mark_expired: Script::new(MARK_EXPIRED_LUA),
            delete_expired: Script::new(DELETE_EXPIRED_LUA),
            next_due: Script::new(NEXT_DUE_LUA),
            record_hit: Script::new(RECORD_HIT_LUA),
        }
    }
}

/// Applies read and write timeouts to every pooled connection.
#[derive(Debug)]
struct CommandTimeouts(Duration);

impl r2d2::CustomizeConnection<Connection, RedisError> for CommandTimeouts {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), RedisError> {
        conn.set_read_timeout(Some(self.0))?;
        conn.set_write_timeout(Some(self.0))
    }
}

/// Mapping store and shared sequence over a pool of Redis connections.
///
/// Each call checks out its own connection, so calls from different workers
/// run in parallel. Broken connections are discarded by the pool and replaced
/// on demand. The client is blocking; run calls on the blocking pool.
pub struct RedisStore {
    pool: Pool<Client>,
    scripts: Scripts,
    key_prefix: String,
    expired_grace: TimeDelta,
}

impl RedisStore {
    /// Connects to Redis and verifies the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - connection string (e.g., `"redis://localhost:6379/0"`)
    /// - `key_prefix` - namespace prepended to every key
    /// - `expired_grace` - extra lifetime given to expiring keys past their expiry
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::StoreUnavailable`] if the URL is invalid or the
    /// server cannot be reached.
    pub fn connect(
        redis_url: &str,
        key_prefix: impl Into<String>,
        expired_grace: Duration,
    ) -> Result<Self, ShortenerError> {
        info!("Connecting to Redis store");

        let expired_grace = TimeDelta::from_std(expired_grace)
            .map_err(|_| ShortenerError::invalid_input("expired grace period is too large"))?;

        let client = Client::open(redis_url).map_err(|e| {
            ShortenerError::store_unavailable(format!("Failed to create Redis client: {e}"))
        })?;

        let pool = Pool::builder()
            .max_size(POOL_MAX_SIZE)
            .min_idle(Some(POOL_MIN_IDLE))
            .connection_timeout(COMMAND_TIMEOUT)
            .test_on_check_out(false)
            .connection_customizer(Box::new(CommandTimeouts(COMMAND_TIMEOUT)))
            .build(client)
            .map_err(|e| {
                ShortenerError::store_unavailable(format!("Failed to create Redis pool: {e}"))
            })?;

        let store = Self {
            pool,
            scripts: Scripts::new(),
            key_prefix: key_prefix.into(),
            expired_grace,
        };
        store.ping()?;

        info!(pool_size = POOL_MAX_SIZE, "✓ Connected to Redis store");
        Ok(store)
    }

    fn record_key(&self, code: &str) -> String {
        format!("{}code:{}", self.key_prefix, code)
    }

    fn url_key(&self, long_url: &str) -> String {
        format!("{}url:{}", self.key_prefix, long_url)
    }

    fn expiry_key(&self) -> String {
        format!("{}expiry", self.key_prefix)
    }

    fn counter_key(&self) -> String {
        format!("{}counter", self.key_prefix)
    }

    fn get_connection(&self) -> Result<PooledConnection<Client>, ShortenerError> {
        self.pool.get().map_err(|e| {
            ShortenerError::store_unavailable(format!("Failed to get Redis connection: {e}"))
        })
    }

    /// Runs `f` on a pooled connection.
    fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> redis::RedisResult<T>,
    ) -> Result<T, ShortenerError> {
        let mut conn = self.get_connection()?;

        f(&mut *conn).map_err(|e| {
            warn!("Redis command failed: {}", e);
            ShortenerError::store_unavailable(e)
        })
    }

    fn decode_record(code: &str, fields: &HashMap<String, String>) -> Result<Record, ShortenerError> {
        let field = |name: &str| {
            fields.get(name).ok_or_else(|| {
                ShortenerError::store_unavailable(format!(
                    "Corrupt record {code}: missing field '{name}'"
                ))
            })
        };

        let long_url = field("url")?.clone();
        let created_at = decode_millis(code, field("created_at")?)?;
        let expiry = match field("expires_at")?.as_str() {
            NEVER => Expiry::Never,
            millis => Expiry::At(decode_millis(code, millis)?),
        };
        let status = match field("status")?.as_str() {
            "active" => RecordStatus::Active,
            "expired" => RecordStatus::Expired,
            other => {
                return Err(ShortenerError::store_unavailable(format!(
                    "Corrupt record {code}: unknown status '{other}'"
                )));
            }
        };
        let hits = fields
            .get("hits")
            .and_then(|h| h.parse().ok())
            .unwrap_or(0);

        Ok(Record {
            code: ShortCode::new_unchecked(code),
            long_url,
            created_at,
            expiry,
            status,
            hits,
        })
    }
}

fn decode_millis(code: &str, raw: &str) -> Result<DateTime<Utc>, ShortenerError> {
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| {
            ShortenerError::store_unavailable(format!("Corrupt record {code}: bad timestamp '{raw}'"))
        })
}

fn expiry_field(expiry: Expiry) -> String {
    match expiry {
        Expiry::Never => NEVER.to_string(),
        Expiry::At(at) => at.timestamp_millis().to_string(),
    }
}

/// Absolute time, in Unix millis, at which Redis itself drops an expiring key.
///
/// Saturates at the latest representable instant. `None` for records that
/// never expire.
fn key_expiry_millis(expiry: Expiry, grace: TimeDelta) -> Option<i64> {
    expiry.timestamp().map(|at| {
        at.checked_add_signed(grace)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .timestamp_millis()
    })
}

/// Whether a Redis error is the reply to `INCR` on a counter at `i64::MAX`.
fn is_counter_overflow(err: &RedisError) -> bool {
    is_overflow_reply(&err.to_string())
}

fn is_overflow_reply(message: &str) -> bool {
    message.contains("increment or decrement would overflow")
}

impl MappingStore for RedisStore {
    fn try_insert(
        &self,
        record: &Record,
        index_long_url: bool,
        now: DateTime<Utc>,
    ) -> Result<InsertOutcome, ShortenerError> {
        let mut invocation = self.scripts.try_insert.prepare_invoke();
        invocation
            .key(self.record_key(record.code.as_str()))
            .key(self.url_key(&record.long_url))
            .key(self.expiry_key())
            .arg(record.code.as_str())
            .arg(&record.long_url)
            .arg(record.created_at.timestamp_millis())
            .arg(expiry_field(record.expiry))
            .arg(now.timestamp_millis())
            .arg(if index_long_url { "1" } else { "0" })
            .arg(key_expiry_millis(record.expiry, self.expired_grace).unwrap_or(0))
            .arg(&self.key_prefix);

        let reply: Vec<Option<String>> = self.with_connection(|conn| invocation.invoke(conn))?;

        match reply.first().cloned().flatten().as_deref() {
            Some("inserted") => Ok(InsertOutcome::Inserted),
            Some("collision") => {
                debug!(code = %record.code, "Redis claim collided");
                Ok(InsertOutcome::Collision)
            }
            Some("existing") => {
                let mut values = reply.into_iter().skip(1);
                let code = values.next().flatten().unwrap_or_default();
                let fields: HashMap<String, String> =
                    ["url", "created_at", "expires_at", "status", "hits"]
                        .into_iter()
                        .zip(values)
                        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
                        .collect();
                Ok(InsertOutcome::Existing(Self::decode_record(&code, &fields)?))
            }
            other => Err(ShortenerError::store_unavailable(format!(
                "Unexpected reply from insert script: {other:?}"
            ))),
        }
    }

    fn fetch(&self, code: &str) -> Result<Option<Record>, ShortenerError> {
        let key = self.record_key(code);
        let fields: HashMap<String, String> =
            self.with_connection(|conn| redis::cmd("HGETALL").arg(&key).query(conn))?;

        if fields.is_empty() {
            return Ok(None);
        }

        Self::decode_record(code, &fields).map(Some)
    }

    fn find_by_long_url(
        &self,
        long_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Record>, ShortenerError> {
        let key = self.url_key(long_url);
        let code: Option<String> =
            self.with_connection(|conn| redis::cmd("GET").arg(&key).query(conn))?;

        let Some(code) = code else {
            return Ok(None);
        };

        Ok(self
            .fetch(&code)?
            .filter(|r| r.long_url == long_url && r.is_active_at(now)))
    }

    fn mark_expired(&self, code: &str, now: DateTime<Utc>) -> Result<bool, ShortenerError> {
        let mut invocation = self.scripts.mark_expired.prepare_invoke();
        invocation
            .key(self.record_key(code))
            .arg(now.timestamp_millis());

        let changed: i64 = self.with_connection(|conn| invocation.invoke(conn))?;
        Ok(changed == 1)
    }

    fn delete_expired(&self, code: &str, cutoff: DateTime<Utc>) -> Result<bool, ShortenerError> {
        let mut invocation = self.scripts.delete_expired.prepare_invoke();
        invocation
            .key(self.record_key(code))
            .arg(cutoff.timestamp_millis())
            .arg(&self.key_prefix)
            .arg(code);

        let removed: i64 = self.with_connection(|conn| invocation.invoke(conn))?;
        Ok(removed == 1)
    }

    fn next_due(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ShortCode>, ShortenerError> {
        let mut invocation = self.scripts.next_due.prepare_invoke();
        invocation
            .key(self.expiry_key())
            .arg(cutoff.timestamp_millis())
            .arg(limit);

        let codes: Vec<String> = self.with_connection(|conn| invocation.invoke(conn))?;
        Ok(codes.into_iter().map(ShortCode::new_unchecked).collect())
    }

    fn record_hit(&self, code: &str) {
        // A saturated pool costs the hit, never a wait.
        let mut conn = match self.pool.get_timeout(HIT_CHECKOUT_TIMEOUT) {
            Ok(conn) => conn,
            Err(e) => {
                debug!("Dropped hit for {}: {}", code, e);
                return;
            }
        };

        let result: redis::RedisResult<i64> = self
            .scripts
            .record_hit
            .key(self.record_key(code))
            .invoke(&mut *conn);
        if let Err(e) = result {
            debug!("Dropped hit for {}: {}", code, e);
        }
    }

    fn ping(&self) -> Result<(), ShortenerError> {
        self.with_connection(|conn| redis::cmd("PING").query::<String>(conn))
            .map(|_| ())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

impl Sequence for RedisStore {
    fn next(&self) -> Result<u64, ShortenerError> {
        let key = self.counter_key();
        let mut conn = self.get_connection()?;

        let value: i64 = match redis::cmd("INCR").arg(&key).query(&mut *conn) {
            Ok(value) => value,
            Err(e) if is_counter_overflow(&e) => {
                warn!("Counter {} is exhausted", key);
                return Err(ShortenerError::ExhaustedKeyspace { attempts: 0 });
            }
            Err(e) => {
                warn!("Redis command failed: {}", e);
                return Err(ShortenerError::store_unavailable(e));
            }
        };

        // INCR starts at 1; the sequence starts at 0.
        u64::try_from(value - 1).map_err(|_| {
            ShortenerError::store_unavailable(format!("Counter {key} holds invalid value {value}"))
        })
    }
}
