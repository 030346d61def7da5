//! In-memory stores and fixtures for unit tests

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use auth::jwt::{JwtConfig, TokenService, TokenSubject};
use auth::models::{NewUser, Role, User, UserChanges, UserQuery, page};
use auth::repositories::UserStore;
use auth::{Authenticator, Identity};
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use uuid::Uuid;

use crate::models::{
    AuthorSummary, Category, CategoryChanges, CategoryListing, CategorySummary, Comment, CommentStatus,
    NewCategory, NewComment, NewPostRecord, NewTag, Post, PostChanges, PostQuery, PostSort,
    PostStats, PostStatus, SortOrder, Tag, TagChanges, TagListing,
};
use crate::repositories::post::RECENT_POSTS;
use crate::repositories::{CategoryStore, CommentStore, PostStore, TagStore};

pub fn identity(role: Role) -> Identity {
    let id = Uuid::new_v4();
    Identity {
        id,
        email: format!("{}@example.com", id.simple()),
        role,
        first_name: None,
        last_name: None,
    }
}

fn tag(slug: &str) -> Tag {
    let now = Utc::now();
    Tag {
        id: Uuid::new_v4(),
        name: slug.to_string(),
        slug: slug.to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// Public summary of `identity`, as the users table would yield it
pub fn author_of(identity: &Identity, bio: Option<&str>) -> AuthorSummary {
    AuthorSummary {
        id: identity.id,
        first_name: identity.first_name.clone(),
        last_name: identity.last_name.clone(),
        avatar: None,
        bio: bio.map(str::to_string),
    }
}

#[derive(Default)]
pub struct MemoryPostStore {
    posts: Mutex<HashMap<Uuid, Post>>,
    tags: Mutex<HashMap<Uuid, Tag>>,
    authors: Mutex<HashMap<Uuid, AuthorSummary>>,
    categories: Mutex<HashMap<Uuid, CategorySummary>>,
}

impl MemoryPostStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn get(&self, id: Uuid) -> Option<Post> {
        self.posts.lock().unwrap().get(&id).cloned()
    }

    /// Make a tag known so posts can connect to it
    pub fn register_tag(&self, slug: &str) -> Uuid {
        let tag = tag(slug);
        let id = tag.id;
        self.tags.lock().unwrap().insert(id, tag);
        id
    }

    /// Make a user known so posts can show who wrote them
    pub fn register_author(&self, author: AuthorSummary) {
        self.authors.lock().unwrap().insert(author.id, author);
    }

    /// Make a category known so posts can embed it
    pub fn register_category(&self, name: &str) -> Uuid {
        let category = CategorySummary {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            color: Some("#336699".to_string()),
        };
        let id = category.id;
        self.categories.lock().unwrap().insert(id, category);
        id
    }

    /// Occupy `slug` with a bare draft
    pub fn occupy_slug(&self, slug: &str) {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: slug.to_string(),
            slug: slug.to_string(),
            excerpt: None,
            content: slug.to_string(),
            featured_image: None,
            status: PostStatus::Draft,
            published_at: None,
            scheduled_at: None,
            reading_time: 1,
            view_count: 0,
            author_id: Uuid::new_v4(),
            category_id: None,
            created_at: now,
            updated_at: now,
            author: None,
            category: None,
            tags: Vec::new(),
        };
        self.posts.lock().unwrap().insert(post.id, post);
    }

    /// Attach author and category the way the SQL store does
    fn with_relations(&self, mut post: Post, with_bio: bool) -> Post {
        post.author = self
            .authors
            .lock()
            .unwrap()
            .get(&post.author_id)
            .cloned()
            .map(|mut author| {
                if !with_bio {
                    author.bio = None;
                }
                author
            });
        post.category = post
            .category_id
            .and_then(|id| self.categories.lock().unwrap().get(&id).cloned());
        post
    }

    pub fn set_views(&self, id: Uuid, views: i64) {
        if let Some(post) = self.posts.lock().unwrap().get_mut(&id) {
            post.view_count = views;
        }
    }

    fn resolve_tags(&self, ids: &[Uuid]) -> DatabaseResult<Vec<Tag>> {
        let tags = self.tags.lock().unwrap();
        ids.iter()
            .map(|id| {
                tags.get(id)
                    .cloned()
                    .ok_or_else(|| DatabaseError::ForeignKeyViolation("post_tags_tag_id_fkey".into()))
            })
            .collect()
    }
}

fn matches_query(post: &Post, query: &PostQuery) -> bool {
    if query.status.is_some_and(|s| s != post.status) {
        return false;
    }
    if query.category_id.is_some_and(|c| Some(c) != post.category_id) {
        return false;
    }
    if query.author_id.is_some_and(|a| a != post.author_id) {
        return false;
    }
    if let Some(slug) = query.tag_slug.as_deref() {
        if !post.tags.iter().any(|t| t.slug == slug) {
            return false;
        }
    }
    if let Some(search) = query.search.as_deref() {
        let needle = search.to_lowercase();
        let hit = post.title.to_lowercase().contains(&needle)
            || post.content.to_lowercase().contains(&needle)
            || post
                .excerpt
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(&needle));
        if !hit {
            return false;
        }
    }
    true
}

fn compare(a: &Post, b: &Post, sort: PostSort) -> Ordering {
    match sort {
        PostSort::CreatedAt => a.created_at.cmp(&b.created_at),
        PostSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        PostSort::PublishedAt => a.published_at.cmp(&b.published_at),
        PostSort::ViewCount => a.view_count.cmp(&b.view_count),
        PostSort::Title => a.title.cmp(&b.title),
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn slug_owner(&self, slug: &str) -> DatabaseResult<Option<Uuid>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .values()
            .find(|p| p.slug == slug)
            .map(|p| p.id))
    }

    async fn insert(&self, record: NewPostRecord) -> DatabaseResult<Post> {
        let tags = self.resolve_tags(&record.tag_ids)?;
        let mut posts = self.posts.lock().unwrap();
        if posts.values().any(|p| p.slug == record.slug) {
            return Err(DatabaseError::UniqueViolation("posts_slug_key".into()));
        }

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: record.title,
            slug: record.slug,
            excerpt: record.excerpt,
            content: record.content,
            featured_image: record.featured_image,
            status: record.status,
            published_at: record.published_at,
            scheduled_at: record.scheduled_at,
            reading_time: record.reading_time,
            view_count: 0,
            author_id: record.author_id,
            category_id: record.category_id,
            created_at: now,
            updated_at: now,
            author: None,
            category: None,
            tags,
        };
        posts.insert(post.id, post.clone());
        drop(posts);
        Ok(self.with_relations(post, false))
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> DatabaseResult<Post> {
        let tags = match &changes.tag_ids {
            Some(ids) => Some(self.resolve_tags(ids)?),
            None => None,
        };

        let mut posts = self.posts.lock().unwrap();
        if let Some(slug) = &changes.slug {
            if posts.values().any(|p| p.id != id && &p.slug == slug) {
                return Err(DatabaseError::UniqueViolation("posts_slug_key".into()));
            }
        }

        let post = posts.get_mut(&id).ok_or(DatabaseError::RecordNotFound)?;
        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(slug) = changes.slug {
            post.slug = slug;
        }
        if let Some(excerpt) = changes.excerpt {
            post.excerpt = Some(excerpt);
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        if let Some(image) = changes.featured_image {
            post.featured_image = Some(image);
        }
        if let Some(status) = changes.status {
            post.status = status;
        }
        if let Some(at) = changes.published_at {
            post.published_at = Some(at);
        }
        if let Some(at) = changes.scheduled_at {
            post.scheduled_at = Some(at);
        }
        if let Some(minutes) = changes.reading_time {
            post.reading_time = minutes;
        }
        if let Some(category_id) = changes.category_id {
            post.category_id = Some(category_id);
        }
        if let Some(tags) = tags {
            post.tags = tags;
        }
        post.updated_at = Utc::now();

        let post = post.clone();
        drop(posts);
        Ok(self.with_relations(post, false))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Post>> {
        Ok(self.get(id).map(|p| self.with_relations(p, false)))
    }

    async fn find_by_slug(&self, slug: &str) -> DatabaseResult<Option<Post>> {
        let post = self
            .posts
            .lock()
            .unwrap()
            .values()
            .find(|p| p.slug == slug)
            .cloned();
        Ok(post.map(|p| self.with_relations(p, true)))
    }

    async fn increment_views(&self, id: Uuid) -> DatabaseResult<i64> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts.get_mut(&id).ok_or(DatabaseError::RecordNotFound)?;
        post.view_count += 1;
        Ok(post.view_count)
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        self.posts
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DatabaseError::RecordNotFound)
    }

    async fn list(&self, query: &PostQuery) -> DatabaseResult<(Vec<Post>, i64)> {
        let (page, limit) = page::normalize(query.page, query.limit);
        let sort = query.sort_by.unwrap_or_default();
        let order = query.sort_order.unwrap_or_default();

        let mut matching: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|p| matches_query(p, query))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            let ordering = match order {
                SortOrder::Asc => compare(a, b, sort),
                SortOrder::Desc => compare(a, b, sort).reverse(),
            };
            ordering.then(a.id.cmp(&b.id))
        });

        let total = matching.len() as i64;
        let data = matching
            .into_iter()
            .skip(page::offset(page, limit) as usize)
            .take(limit as usize)
            .map(|p| self.with_relations(p, false))
            .collect();

        Ok((data, total))
    }

    async fn stats(&self) -> DatabaseResult<PostStats> {
        let posts = self.posts.lock().unwrap();

        let mut by_status: BTreeMap<String, i64> = PostStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        for post in posts.values() {
            *by_status.entry(post.status.as_str().to_string()).or_default() += 1;
        }

        let mut recent_posts: Vec<Post> = posts.values().cloned().collect();
        recent_posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_posts.truncate(RECENT_POSTS as usize);
        let total = posts.len() as i64;
        let total_views = posts.values().map(|p| p.view_count).sum();
        drop(posts);

        Ok(PostStats {
            total,
            total_views,
            by_status,
            recent_posts: recent_posts
                .into_iter()
                .map(|p| self.with_relations(p, false))
                .collect(),
        })
    }

    async fn related(&self, post: &Post, limit: u32) -> DatabaseResult<Vec<Post>> {
        let mut related: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.id != post.id && p.status == PostStatus::Published)
            .filter(|p| {
                (post.category_id.is_some() && p.category_id == post.category_id)
                    || p.tags.iter().any(|t| post.tags.iter().any(|o| o.id == t.id))
            })
            .cloned()
            .collect();
        related.sort_by(|a, b| b.view_count.cmp(&a.view_count).then(a.id.cmp(&b.id)));
        related.truncate(limit as usize);
        Ok(related
            .into_iter()
            .map(|p| self.with_relations(p, false))
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryCommentStore {
    comments: Mutex<HashMap<Uuid, Comment>>,
    users: Mutex<HashMap<Uuid, AuthorSummary>>,
}

impl MemoryCommentStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get(&self, id: Uuid) -> Option<Comment> {
        self.comments.lock().unwrap().get(&id).cloned()
    }

    /// Make a user known so comments can show who wrote them
    pub fn register_user(&self, user: AuthorSummary) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    fn with_user(&self, mut comment: Comment) -> Comment {
        comment.user = comment
            .user_id
            .and_then(|id| self.users.lock().unwrap().get(&id).cloned());
        comment
    }

    /// Insert a comment in any state with a fixed creation time
    pub fn seed(
        &self,
        post_id: Uuid,
        parent_id: Option<Uuid>,
        status: CommentStatus,
        created_at: DateTime<Utc>,
    ) -> Comment {
        let comment = Comment {
            id: Uuid::new_v4(),
            content: format!("{:?} comment", status),
            post_id,
            user_id: None,
            parent_id,
            author_name: Some("Seeded".to_string()),
            author_email: None,
            author_ip: None,
            status,
            created_at,
            updated_at: created_at,
            user: None,
        };
        self.comments
            .lock()
            .unwrap()
            .insert(comment.id, comment.clone());
        comment
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn insert(&self, new_comment: NewComment) -> DatabaseResult<Comment> {
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            content: new_comment.content,
            post_id: new_comment.post_id,
            user_id: new_comment.user_id,
            parent_id: new_comment.parent_id,
            author_name: new_comment.author_name,
            author_email: new_comment.author_email,
            author_ip: new_comment.author_ip,
            status: CommentStatus::Pending,
            created_at: now,
            updated_at: now,
            user: None,
        };
        self.comments
            .lock()
            .unwrap()
            .insert(comment.id, comment.clone());
        Ok(self.with_user(comment))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Comment>> {
        Ok(self.get(id).map(|c| self.with_user(c)))
    }

    async fn set_status(&self, id: Uuid, status: CommentStatus) -> DatabaseResult<Comment> {
        let mut comments = self.comments.lock().unwrap();
        let comment = comments.get_mut(&id).ok_or(DatabaseError::RecordNotFound)?;
        comment.status = status;
        comment.updated_at = Utc::now();
        let comment = comment.clone();
        drop(comments);
        Ok(self.with_user(comment))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        let mut comments = self.comments.lock().unwrap();
        comments.remove(&id).ok_or(DatabaseError::RecordNotFound)?;
        comments.retain(|_, c| c.parent_id != Some(id));
        Ok(())
    }

    async fn approved_for_post(&self, post_id: Uuid) -> DatabaseResult<Vec<Comment>> {
        let approved: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.post_id == post_id && c.status == CommentStatus::Approved)
            .cloned()
            .collect();
        Ok(approved.into_iter().map(|c| self.with_user(c)).collect())
    }
}

#[derive(Default)]
pub struct MemoryCategoryStore {
    categories: Mutex<HashMap<Uuid, Category>>,
}

impl MemoryCategoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn list(&self) -> DatabaseResult<Vec<CategoryListing>> {
        let categories = self.categories.lock().unwrap();
        let mut listing: Vec<CategoryListing> = categories
            .values()
            .map(|c| CategoryListing {
                category: c.clone(),
                parent: c
                    .parent_id
                    .and_then(|id| categories.get(&id))
                    .map(CategorySummary::from),
                post_count: 0,
            })
            .collect();
        listing.sort_by(|a, b| a.category.name.cmp(&b.category.name));
        Ok(listing)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Category>> {
        Ok(self.categories.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> DatabaseResult<Option<Category>> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn children(&self, id: Uuid) -> DatabaseResult<Vec<CategorySummary>> {
        let mut children: Vec<CategorySummary> = self
            .categories
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.parent_id == Some(id))
            .map(CategorySummary::from)
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn insert(&self, new_category: NewCategory) -> DatabaseResult<Category> {
        let mut categories = self.categories.lock().unwrap();
        if categories.values().any(|c| c.slug == new_category.slug) {
            return Err(DatabaseError::UniqueViolation("categories_slug_key".into()));
        }
        if let Some(parent_id) = new_category.parent_id {
            if !categories.contains_key(&parent_id) {
                return Err(DatabaseError::ForeignKeyViolation(
                    "categories_parent_id_fkey".into(),
                ));
            }
        }

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: new_category.name,
            slug: new_category.slug,
            description: new_category.description,
            color: new_category.color,
            icon: new_category.icon,
            parent_id: new_category.parent_id,
            created_at: now,
            updated_at: now,
        };
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, id: Uuid, changes: CategoryChanges) -> DatabaseResult<Category> {
        let mut categories = self.categories.lock().unwrap();
        let category = categories.get_mut(&id).ok_or(DatabaseError::RecordNotFound)?;
        if let Some(name) = changes.name {
            category.name = name;
        }
        if let Some(slug) = changes.slug {
            category.slug = slug;
        }
        if let Some(description) = changes.description {
            category.description = Some(description);
        }
        if let Some(color) = changes.color {
            category.color = Some(color);
        }
        if let Some(icon) = changes.icon {
            category.icon = Some(icon);
        }
        if let Some(parent_id) = changes.parent_id {
            category.parent_id = Some(parent_id);
        }
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        let mut categories = self.categories.lock().unwrap();
        categories.remove(&id).ok_or(DatabaseError::RecordNotFound)?;
        for child in categories.values_mut() {
            if child.parent_id == Some(id) {
                child.parent_id = None;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTagStore {
    tags: Mutex<HashMap<Uuid, Tag>>,
}

impl MemoryTagStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl TagStore for MemoryTagStore {
    async fn list(&self) -> DatabaseResult<Vec<TagListing>> {
        let mut listing: Vec<TagListing> = self
            .tags
            .lock()
            .unwrap()
            .values()
            .map(|t| TagListing {
                tag: t.clone(),
                post_count: 0,
            })
            .collect();
        listing.sort_by(|a, b| a.tag.name.cmp(&b.tag.name));
        Ok(listing)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Tag>> {
        Ok(self.tags.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> DatabaseResult<Option<Tag>> {
        Ok(self
            .tags
            .lock()
            .unwrap()
            .values()
            .find(|t| t.slug == slug)
            .cloned())
    }

    async fn insert(&self, new_tag: NewTag) -> DatabaseResult<Tag> {
        let mut tags = self.tags.lock().unwrap();
        if tags.values().any(|t| t.slug == new_tag.slug) {
            return Err(DatabaseError::UniqueViolation("tags_slug_key".into()));
        }
        let mut tag = tag(&new_tag.slug);
        tag.name = new_tag.name;
        tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn update(&self, id: Uuid, changes: TagChanges) -> DatabaseResult<Tag> {
        let mut tags = self.tags.lock().unwrap();
        let tag = tags.get_mut(&id).ok_or(DatabaseError::RecordNotFound)?;
        if let Some(name) = changes.name {
            tag.name = name;
        }
        if let Some(slug) = changes.slug {
            tag.slug = slug;
        }
        tag.updated_at = Utc::now();
        Ok(tag.clone())
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        self.tags
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DatabaseError::RecordNotFound)
    }
}

/// Users known to the guard in router tests
#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUsers {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, role: Role) -> User {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let user = User {
            id,
            email: format!("{}@example.com", id.simple()),
            password_hash: String::new(),
            first_name: None,
            last_name: None,
            avatar: None,
            bio: None,
            role,
            is_active: true,
            refresh_token_hash: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().insert(id, user.clone());
        user
    }
}

#[async_trait]
impl UserStore for MemoryUsers {
    async fn create(&self, _new_user: NewUser) -> DatabaseResult<User> {
        Err(DatabaseError::Configuration("read-only fixture".into()))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn set_refresh_token_hash(&self, _id: Uuid, _hash: Option<String>) -> DatabaseResult<()> {
        Ok(())
    }

    async fn record_login(&self, _id: Uuid, _hash: String, _at: DateTime<Utc>) -> DatabaseResult<()> {
        Ok(())
    }

    async fn list(&self, _query: &UserQuery) -> DatabaseResult<(Vec<User>, i64)> {
        let users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        let total = users.len() as i64;
        Ok((users, total))
    }

    async fn update(&self, _id: Uuid, _changes: UserChanges) -> DatabaseResult<User> {
        Err(DatabaseError::Configuration("read-only fixture".into()))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        self.users
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DatabaseError::RecordNotFound)
    }
}

pub fn token_service() -> TokenService {
    TokenService::new(&JwtConfig {
        access_secret: "api-test-access-secret".to_string(),
        refresh_secret: "api-test-refresh-secret".to_string(),
        access_expires_in: "15m".to_string(),
        refresh_expires_in: "7d".to_string(),
    })
}

/// Guard backed by `users`, plus a way to mint bearer headers for them
pub fn authenticator(users: Arc<MemoryUsers>) -> Authenticator {
    Authenticator::new(token_service(), users)
}

pub fn bearer(user: &User) -> String {
    let pair = token_service()
        .issue_token_pair(&TokenSubject {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
        })
        .unwrap();
    format!("Bearer {}", pair.access_token)
}
