// Community forum domain model - topics, posts, likes and success stories
use super::id::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "authorName")]
    pub author: Option<String>,
    #[serde(default, alias = "postCount")]
    pub post_count: u32,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(alias = "_id")]
    pub id: EntityId,
    #[serde(alias = "topicId")]
    pub topic_id: EntityId,
    pub content: String,
    #[serde(default, alias = "authorName")]
    pub author: Option<String>,
    #[serde(default, alias = "likeCount")]
    pub likes: u32,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessStory {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub title: String,
    pub content: String,
    #[serde(default, alias = "authorName")]
    pub author: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTopic {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub topic_id: EntityId,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStory {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostLike {
    pub post_id: EntityId,
    pub user_id: EntityId,
}
