//! Category and tag management

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, reject_invalid};
use crate::models::{
    Category, CategoryChanges, CategoryDetail, CategoryListing, CategorySummary,
    CreateCategoryRequest, CreateTagRequest, NewCategory, NewTag, Tag, TagChanges, TagListing,
    UpdateCategoryRequest, UpdateTagRequest,
};
use crate::repositories::{CategoryStore, TagStore};
use crate::slug;

/// Slug for a new or renamed node: the explicit one when given, else the name's
fn derive_slug(explicit: Option<&str>, name: &str, prefix: &str) -> ApiResult<String> {
    let Some(explicit) = explicit else {
        return Ok(slug::from_title(name, prefix));
    };

    let slug = slug::slugify(explicit);
    if slug.is_empty() {
        return Err(ApiError::BadRequest(
            "Slug must contain at least one letter or digit".to_string(),
        ));
    }
    Ok(slug)
}

fn require_name(name: Option<&str>) -> ApiResult<()> {
    let mut problems = Vec::new();
    if name.is_some_and(|n| n.trim().is_empty()) {
        problems.push("Name is required");
    }
    reject_invalid(problems)
}

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryStore>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryStore>) -> Self {
        Self { categories }
    }

    pub async fn list(&self) -> ApiResult<Vec<CategoryListing>> {
        Ok(self.categories.list().await?)
    }

    async fn existing(&self, id: Uuid) -> ApiResult<Category> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))
    }

    pub async fn find(&self, id: Uuid) -> ApiResult<CategoryDetail> {
        let category = self.existing(id).await?;

        let parent = match category.parent_id {
            Some(parent_id) => self
                .categories
                .find_by_id(parent_id)
                .await?
                .as_ref()
                .map(CategorySummary::from),
            None => None,
        };
        let children = self.categories.children(id).await?;

        Ok(CategoryDetail {
            category,
            parent,
            children,
        })
    }

    pub async fn create(&self, request: CreateCategoryRequest) -> ApiResult<Category> {
        require_name(Some(request.name.as_str()))?;
        let slug = derive_slug(request.slug.as_deref(), &request.name, "category")?;

        if self.categories.find_by_slug(&slug).await?.is_some() {
            return Err(ApiError::Conflict(
                "Category with this slug already exists".to_string(),
            ));
        }

        let category = self
            .categories
            .insert(NewCategory {
                name: request.name,
                slug,
                description: request.description,
                color: request.color,
                icon: request.icon,
                parent_id: request.parent_id,
            })
            .await?;
        info!("Category {} created as {}", category.id, category.slug);

        Ok(category)
    }

    pub async fn update(&self, id: Uuid, request: UpdateCategoryRequest) -> ApiResult<Category> {
        let current = self.existing(id).await?;
        require_name(request.name.as_deref())?;

        if request.parent_id == Some(id) {
            return Err(ApiError::BadRequest(
                "A category cannot be its own parent".to_string(),
            ));
        }

        let slug = match (request.slug.as_deref(), request.name.as_deref()) {
            (Some(explicit), _) => {
                Some(derive_slug(Some(explicit), &current.name, "category")?)
            }
            (None, Some(name)) if name != current.name => {
                Some(derive_slug(None, name, "category")?)
            }
            _ => None,
        };

        if let Some(slug) = slug.as_deref().filter(|s| *s != current.slug) {
            if self.categories.find_by_slug(slug).await?.is_some() {
                return Err(ApiError::Conflict(
                    "Category with this slug already exists".to_string(),
                ));
            }
        }

        let category = self
            .categories
            .update(
                id,
                CategoryChanges {
                    name: request.name,
                    slug,
                    description: request.description,
                    color: request.color,
                    icon: request.icon,
                    parent_id: request.parent_id,
                },
            )
            .await?;
        info!("Category {} updated", id);

        Ok(category)
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.existing(id).await?;
        self.categories.delete(id).await?;
        info!("Category {} deleted", id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct TagService {
    tags: Arc<dyn TagStore>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagStore>) -> Self {
        Self { tags }
    }

    pub async fn list(&self) -> ApiResult<Vec<TagListing>> {
        Ok(self.tags.list().await?)
    }

    pub async fn find(&self, id: Uuid) -> ApiResult<Tag> {
        self.tags
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))
    }

    pub async fn create(&self, request: CreateTagRequest) -> ApiResult<Tag> {
        require_name(Some(request.name.as_str()))?;
        let slug = derive_slug(request.slug.as_deref(), &request.name, "tag")?;

        if self.tags.find_by_slug(&slug).await?.is_some() {
            return Err(ApiError::Conflict(
                "Tag with this slug already exists".to_string(),
            ));
        }

        let tag = self
            .tags
            .insert(NewTag {
                name: request.name,
                slug,
            })
            .await?;
        info!("Tag {} created as {}", tag.id, tag.slug);

        Ok(tag)
    }

    pub async fn update(&self, id: Uuid, request: UpdateTagRequest) -> ApiResult<Tag> {
        let current = self.find(id).await?;
        require_name(request.name.as_deref())?;

        let slug = match (request.slug.as_deref(), request.name.as_deref()) {
            (Some(explicit), _) => Some(derive_slug(Some(explicit), &current.name, "tag")?),
            (None, Some(name)) if name != current.name => {
                Some(derive_slug(None, name, "tag")?)
            }
            _ => None,
        };

        if let Some(slug) = slug.as_deref().filter(|s| *s != current.slug) {
            if self.tags.find_by_slug(slug).await?.is_some() {
                return Err(ApiError::Conflict(
                    "Tag with this slug already exists".to_string(),
                ));
            }
        }

        let tag = self
            .tags
            .update(
                id,
                TagChanges {
                    name: request.name,
                    slug,
                },
            )
            .await?;
        info!("Tag {} updated", id);

        Ok(tag)
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.find(id).await?;
        self.tags.delete(id).await?;
        info!("Tag {} deleted", id);
        Ok(())
    }
}
