// Community service - forum topics, posts, likes and success stories
use crate::application::errors::{require_text, ServiceError};
use crate::application::repositories::CommunityRepository;
use crate::application::session_context::SessionContext;
use crate::domain::community::{NewPost, NewStory, NewTopic, Post, PostLike, SuccessStory, Topic};
use crate::domain::id::EntityId;
use std::sync::Arc;

#[derive(Clone)]
pub struct CommunityService {
    repository: Arc<dyn CommunityRepository>,
    session: Arc<SessionContext>,
}

impl CommunityService {
    pub fn new(repository: Arc<dyn CommunityRepository>, session: Arc<SessionContext>) -> Self {
        Self {
            repository,
            session,
        }
    }

    pub async fn topics(&self) -> Result<Vec<Topic>, ServiceError> {
        Ok(self.repository.list_topics().await?)
    }

    pub async fn create_topic(&self, topic: NewTopic) -> Result<Topic, ServiceError> {
        self.session.require()?;
        require_text("title", &topic.title)?;

        let topic = NewTopic {
            title: topic.title.trim().to_string(),
            description: topic
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        };
        let created = self.repository.create_topic(&topic).await?;
        tracing::info!(topic = %created.id, "forum topic created");
        Ok(created)
    }

    pub async fn posts(&self, topic_id: &EntityId) -> Result<Vec<Post>, ServiceError> {
        require_text("topic id", topic_id.as_str())?;
        Ok(self.repository.list_posts(topic_id).await?)
    }

    pub async fn create_post(&self, post: NewPost) -> Result<Post, ServiceError> {
        self.session.require()?;
        require_text("topic id", post.topic_id.as_str())?;
        require_text("content", &post.content)?;

        let created = self.repository.create_post(&post).await?;
        tracing::info!(post = %created.id, topic = %created.topic_id, "forum post created");
        Ok(created)
    }

    /// Likes are recorded against the logged-in user
    pub async fn like_post(&self, post_id: &EntityId) -> Result<(), ServiceError> {
        let session = self.session.require()?;
        let like = PostLike {
            post_id: post_id.clone(),
            user_id: session.user.id,
        };
        self.repository.like_post(&like).await?;
        Ok(())
    }

    pub async fn stories(&self) -> Result<Vec<SuccessStory>, ServiceError> {
        Ok(self.repository.list_stories().await?)
    }

    pub async fn share_story(&self, story: NewStory) -> Result<SuccessStory, ServiceError> {
        self.session.require()?;
        require_text("title", &story.title)?;
        require_text("content", &story.content)?;

        Ok(self.repository.create_story(&story).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::ApiError;
    use crate::application::session_context::tests::session_for;
    use crate::domain::session::{Role, SessionError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeForum {
        likes: Mutex<Vec<PostLike>>,
        topics: Mutex<Vec<NewTopic>>,
    }

    #[async_trait]
    impl CommunityRepository for FakeForum {
        async fn list_topics(&self) -> Result<Vec<Topic>, ApiError> {
            Ok(Vec::new())
        }

        async fn create_topic(&self, topic: &NewTopic) -> Result<Topic, ApiError> {
            self.topics.lock().unwrap().push(topic.clone());
            Ok(Topic {
                id: EntityId::new("t1"),
                title: topic.title.clone(),
                description: topic.description.clone(),
                author: None,
                post_count: 0,
                created_at: None,
            })
        }

        async fn list_posts(&self, _topic_id: &EntityId) -> Result<Vec<Post>, ApiError> {
            Ok(Vec::new())
        }

        async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
            Ok(Post {
                id: EntityId::new("p1"),
                topic_id: post.topic_id.clone(),
                content: post.content.clone(),
                author: None,
                likes: 0,
                created_at: None,
            })
        }

        async fn like_post(&self, like: &PostLike) -> Result<(), ApiError> {
            self.likes.lock().unwrap().push(like.clone());
            Ok(())
        }

        async fn list_stories(&self) -> Result<Vec<SuccessStory>, ApiError> {
            Ok(Vec::new())
        }

        async fn create_story(&self, story: &NewStory) -> Result<SuccessStory, ApiError> {
            Ok(SuccessStory {
                id: EntityId::new("s1"),
                title: story.title.clone(),
                content: story.content.clone(),
                author: None,
                created_at: None,
            })
        }
    }

    fn service(logged_in: bool) -> (CommunityService, Arc<FakeForum>) {
        let session = Arc::new(SessionContext::new());
        if logged_in {
            session.establish(session_for(Role::Patient));
        }
        let forum = Arc::new(FakeForum::default());
        (CommunityService::new(forum.clone(), session), forum)
    }

    #[tokio::test]
    async fn test_like_uses_session_user() {
        let (community, forum) = service(true);
        community.like_post(&EntityId::new("p9")).await.unwrap();

        let likes = forum.likes.lock().unwrap();
        assert_eq!(likes.len(), 1);
        assert_eq!(likes[0].user_id.as_str(), "u1");
        assert_eq!(likes[0].post_id.as_str(), "p9");
    }

    #[tokio::test]
    async fn test_blank_post_is_rejected() {
        let (community, _) = service(true);
        let err = community
            .create_post(NewPost {
                topic_id: EntityId::new("t1"),
                content: "   ".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "content must not be empty");
    }

    #[tokio::test]
    async fn test_topic_is_trimmed_and_requires_session() {
        let (community, _) = service(false);
        let err = community
            .create_topic(NewTopic {
                title: "Diabetes care".to_string(),
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Session(SessionError::NotAuthenticated)));

        let (community, forum) = service(true);
        let topic = community
            .create_topic(NewTopic {
                title: "  Diabetes care ".to_string(),
                description: Some("  ".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(topic.title, "Diabetes care");
        assert!(forum.topics.lock().unwrap()[0].description.is_none());
    }
}
