//! 送信者名の解決
//!
//! プロフィールが見つからない、または検索に失敗した場合は `None` を返し、
//! 表示側で "Unknown" にフォールバックさせます。

use std::{collections::HashMap, sync::Arc};

use crate::domain::{DisplayName, ProfileRepository, UserId};

/// 送信者名を解決する（ベストエフォート）
pub async fn resolve_sender_name(
    profiles: &Arc<dyn ProfileRepository>,
    user_id: &UserId,
) -> Option<DisplayName> {
    match profiles.find_profile(user_id).await {
        Ok(profile) => profile.map(|p| p.name),
        Err(e) => {
            tracing::warn!("Failed to resolve sender name for '{}': {}", user_id, e);
            None
        }
    }
}

/// 同じ送信者の検索を 1 回にまとめるキャッシュ付きリゾルバ
pub struct SenderNameCache {
    profiles: Arc<dyn ProfileRepository>,
    cache: HashMap<UserId, Option<DisplayName>>,
}

impl SenderNameCache {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            profiles,
            cache: HashMap::new(),
        }
    }

    pub async fn resolve(&mut self, user_id: &UserId) -> Option<DisplayName> {
        if let Some(cached) = self.cache.get(user_id) {
            return cached.clone();
        }
        let resolved = resolve_sender_name(&self.profiles, user_id).await;
        self.cache.insert(user_id.clone(), resolved.clone());
        resolved
    }
}
