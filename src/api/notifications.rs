use serde_json::Value;

use crate::cache::QueryCache;
use crate::errors::ClientError;
use crate::models::notification::{
    Notification, NotificationPreferences, UpdatePreferencesRequest,
};

use super::http::{list_from_value, object_from_value, ApiClient};
use super::keys;

/// Optional filters for the notification list endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationFilters {
    pub unread: bool,
    pub limit: Option<u32>,
}

pub struct NotificationsApi<'a> {
    http: &'a ApiClient,
    cache: &'a QueryCache,
}

impl<'a> NotificationsApi<'a> {
    pub(crate) fn new(http: &'a ApiClient, cache: &'a QueryCache) -> Self {
        Self { http, cache }
    }

    pub async fn list(
        &self,
        filters: NotificationFilters,
    ) -> Result<Vec<Notification>, ClientError> {
        let key = keys::notification_list(filters.unread, filters.limit);
        if let Some(cached) = self.cache.get::<Vec<Notification>>(&key) {
            return Ok(cached);
        }

        let mut path = String::from("notifications/?");
        if filters.unread {
            path.push_str("unread=true&");
        }
        if let Some(limit) = filters.limit {
            path.push_str(&format!("limit={limit}&"));
        }
        let path = path.trim_end_matches(['&', '?']).to_string();

        let value = self.http.get(&path).await?;
        let items: Vec<Notification> = list_from_value(value)?;
        self.cache.set(&key, &items);
        Ok(items)
    }

    /// Fetch one notification. Retrieval marks it read server-side, so the
    /// list and unread-count partitions are invalidated here.
    pub async fn get(&self, id: &str) -> Result<Notification, ClientError> {
        let value = self.http.get(&format!("notifications/{id}/")).await?;
        let notification: Notification = object_from_value(value)?;

        self.cache.invalidate(keys::NOTIFICATIONS);
        self.cache.set(&keys::notification(id), &notification);
        Ok(notification)
    }

    pub async fn unread_count(&self) -> Result<u64, ClientError> {
        if let Some(cached) = self.cache.get::<u64>(keys::UNREAD_COUNT) {
            return Ok(cached);
        }

        let value = self.http.get("notifications/unread_count/").await?;
        let count = match &value {
            Value::Object(map) => map.get("count").and_then(Value::as_u64).unwrap_or(0),
            Value::Number(n) => n.as_u64().unwrap_or(0),
            _ => 0,
        };
        self.cache.set(keys::UNREAD_COUNT, &count);
        Ok(count)
    }

    pub async fn mark_read(&self, id: &str) -> Result<(), ClientError> {
        self.http
            .post(&format!("notifications/{id}/mark_read/"), None)
            .await?;
        self.cache.invalidate(keys::NOTIFICATIONS);
        Ok(())
    }

    pub async fn mark_all_read(&self) -> Result<(), ClientError> {
        self.http.post("notifications/mark_all_read/", None).await?;
        self.cache.invalidate(keys::NOTIFICATIONS);
        Ok(())
    }

    pub async fn preferences(&self) -> Result<NotificationPreferences, ClientError> {
        if let Some(cached) = self
            .cache
            .get::<NotificationPreferences>(keys::NOTIFICATION_PREFERENCES)
        {
            return Ok(cached);
        }

        let value = self.http.get("notifications/preferences/").await?;
        let prefs: NotificationPreferences = object_from_value(value)?;
        self.cache.set(keys::NOTIFICATION_PREFERENCES, &prefs);
        Ok(prefs)
    }

    pub async fn update_preferences(
        &self,
        update: &UpdatePreferencesRequest,
    ) -> Result<NotificationPreferences, ClientError> {
        let value = self
            .http
            .patch(
                "notifications/preferences/",
                Some(serde_json::to_value(update)?),
            )
            .await?;
        let prefs: NotificationPreferences = object_from_value(value)?;
        self.cache.invalidate(keys::NOTIFICATION_PREFERENCES);
        Ok(prefs)
    }
}
