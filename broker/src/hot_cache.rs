//! C2 HotCache: an advisory, sub-millisecond mirror of active intents.
//!
//! Never consulted by `try_claim` — claiming is always against the
//! `IntentStore`. A `parking_lot::RwLock`-guarded map, the same shared
//! mutable-state idiom the reference codebase reaches for in place of a
//! dedicated cache dependency (one isn't in its stack, and isn't needed
//! here either).

use crate::db::intent_store::PaymentIntent;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;

pub const ACTIVE_TTL: Duration = Duration::from_secs(15 * 60);
pub const PROCESSING_TTL: Duration = Duration::from_secs(30 * 60);

struct CacheEntry {
    intent: PaymentIntent,
    expires_at: Instant,
}

#[derive(Default)]
pub struct HotCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl HotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, intent: PaymentIntent, ttl: Duration) {
        let entry = CacheEntry {
            intent,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().insert(entry.intent.payment_hash.clone(), entry);
    }

    /// Lazily evicts on read rather than running a background sweep — the
    /// Janitor's `delete_many` is the authoritative cleanup path, so this
    /// is memory hygiene between ticks, not a correctness requirement.
    pub fn get(&self, payment_hash: &str) -> Option<PaymentIntent> {
        let hit = {
            let guard = self.entries.read();
            guard.get(payment_hash).map(|entry| {
                (entry.intent.clone(), entry.expires_at > Instant::now())
            })
        };

        match hit {
            Some((intent, true)) => Some(intent),
            Some((_, false)) => {
                self.delete(payment_hash);
                None
            }
            None => None,
        }
    }

    pub fn delete(&self, payment_hash: &str) {
        self.entries.write().remove(payment_hash);
    }

    pub fn delete_many(&self, payment_hashes: &[String]) {
        let mut guard = self.entries.write();
        for hash in payment_hashes {
            guard.remove(hash);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::intent_store::DestinationMode;
    use crate::db::intent_store::Environment;
    use crate::db::intent_store::IntentStatus;
    use time::OffsetDateTime;

    fn sample_intent(hash: &str) -> PaymentIntent {
        PaymentIntent {
            payment_hash: hash.to_string(),
            total_amount_sat: 1000,
            base_amount_sat: 1000,
            tip_amount_sat: 0,
            tip_percent: 0.0,
            display_currency: "BTC".to_string(),
            base_amount_display: None,
            tip_amount_display: None,
            memo: None,
            user_api_key_hash: None,
            user_wallet_id: None,
            destination_mode: DestinationMode::ApiKey,
            user_api_key: Some("key".to_string()),
            ln_address_username: None,
            ln_address_wallet_id: None,
            npubcash_address: None,
            nwc_uri: None,
            tip_recipients: vec![],
            environment: Environment::Staging,
            status: IntentStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
            expires_at: OffsetDateTime::now_utc(),
            processed_at: None,
            metadata: serde_json::json!({}),
        }
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache = HotCache::new();
        cache.put(sample_intent("abc"), ACTIVE_TTL);
        assert!(cache.get("abc").is_some());
        assert!(cache.get("does-not-exist").is_none());
    }

    #[test]
    fn expired_entry_is_evicted_on_read() {
        let cache = HotCache::new();
        cache.put(sample_intent("abc"), Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("abc").is_none());
    }

    #[test]
    fn delete_many_clears_a_batch() {
        let cache = HotCache::new();
        cache.put(sample_intent("a"), ACTIVE_TTL);
        cache.put(sample_intent("b"), ACTIVE_TTL);
        cache.delete_many(&["a".to_string(), "b".to_string()]);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_none());
    }
}
