// Notification domain model
use super::id::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: EntityId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: Option<String>,
    #[serde(default, alias = "isRead", alias = "is_read")]
    pub read: bool,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

/// Latest polled notifications for the session user
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotificationFeed {
    pub items: Vec<Notification>,
    pub unread: usize,
}

impl NotificationFeed {
    pub fn new(items: Vec<Notification>) -> Self {
        let unread = items.iter().filter(|n| !n.read).count();
        Self { items, unread }
    }

    pub fn mark_read(&mut self, id: &EntityId) {
        if let Some(item) = self.items.iter_mut().find(|n| &n.id == id) {
            item.read = true;
        }
        self.recount();
    }

    pub fn remove(&mut self, id: &EntityId) {
        self.items.retain(|n| &n.id != id);
        self.recount();
    }

    fn recount(&mut self) {
        self.unread = self.items.iter().filter(|n| !n.read).count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, read: bool) -> Notification {
        Notification {
            id: EntityId::new(id),
            title: None,
            message: format!("message {}", id),
            kind: None,
            read,
            created_at: None,
        }
    }

    #[test]
    fn test_feed_counts_unread() {
        let mut feed = NotificationFeed::new(vec![note("1", false), note("2", true), note("3", false)]);
        assert_eq!(feed.unread, 2);

        feed.mark_read(&EntityId::new("1"));
        assert_eq!(feed.unread, 1);

        feed.remove(&EntityId::new("3"));
        assert_eq!(feed.unread, 0);
        assert_eq!(feed.items.len(), 2);
    }

    #[test]
    fn test_backend_read_flag_alias() {
        let n: Notification =
            serde_json::from_str(r#"{"_id": 3, "message": "New post", "isRead": true}"#).unwrap();
        assert!(n.read);
        assert_eq!(n.id.as_str(), "3");
    }
}
