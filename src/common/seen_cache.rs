// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use dashmap::DashSet;
use std::collections::VecDeque;
use std::hash::Hash;
use tokio::sync::Mutex;

/// Insert `key` into a bounded seen set. Returns `true` only for first-seen keys.
pub async fn remember_with_bounded_order<T>(
    seen: &DashSet<T>,
    order: &Mutex<VecDeque<T>>,
    key: T,
    max_len: usize,
) -> bool
where
    T: Copy + Eq + Hash,
{
    if !seen.insert(key) {
        return false;
    }
    let mut guard = order.lock().await;
    guard.push_back(key);
    if guard.len() > max_len
        && let Some(oldest) = guard.pop_front()
    {
        seen.remove(&oldest);
    }
    true
}

/// Owned wrapper so callers don't carry the set and its eviction order separately.
pub struct SeenCache<T: Copy + Eq + Hash> {
    seen: DashSet<T>,
    order: Mutex<VecDeque<T>>,
    max_len: usize,
}

impl<T: Copy + Eq + Hash> SeenCache<T> {
    pub fn new(max_len: usize) -> Self {
        Self {
            seen: DashSet::new(),
            order: Mutex::new(VecDeque::new()),
            max_len: max_len.max(1),
        }
    }

    pub async fn remember(&self, key: T) -> bool {
        remember_with_bounded_order(&self.seen, &self.order, key, self.max_len).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    #[tokio::test]
    async fn dedup_marks_and_bounds() {
        let cache = SeenCache::new(4);
        let h1 = B256::from([1u8; 32]);
        let h2 = B256::from([2u8; 32]);
        assert!(cache.remember(h1).await);
        assert!(!cache.remember(h1).await);
        assert!(cache.remember(h2).await);
        cache.remember(B256::from([3u8; 32])).await;
        cache.remember(B256::from([4u8; 32])).await;
        cache.remember(B256::from([5u8; 32])).await;
        // h1 was evicted by the bound and counts as new again.
        assert!(cache.remember(h1).await);
    }
}
