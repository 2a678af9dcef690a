//! Read-only views that group stored images for presentation.
//!
//! Every view classifies each image from its leading bytes and pairs the id
//! with a MIME type. Images whose bytes match no known signature are dropped
//! unless [`AggregationConfig::surface_unknown`] is set, in which case they
//! appear with [`FALLBACK_MIME`].

use std::collections::BTreeMap;

use chrono::Utc;
use ph_core::config::AggregationConfig;
use ph_core::{CategoryId, Error, ImageId, Result, UserId};
use ph_db::models::{ImageRef, PersonalDetails};
use ph_db::pool::get_conn;
use ph_db::queries::{categories, images, users};
use ph_sniff::{FALLBACK_MIME, SNIFF_LEN};
use serde::Serialize;

use crate::store::ContentStore;

/// One classified image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageEntry {
    pub image_id: ImageId,
    pub mime_type: &'static str,
}

/// A category and the qualifying images filed under it, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub category_name: String,
    pub images: Vec<ImageEntry>,
}

/// Category id to group. Every category is present, even when empty.
pub type CategoryGroups = BTreeMap<CategoryId, CategoryGroup>;

/// A photographer's images within a single category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotographerGroup {
    pub owner_id: UserId,
    pub username: String,
    pub images: Vec<ImageEntry>,
}

/// A photographer and their work across all categories.
///
/// Personal details are flattened into the JSON object; absent ones
/// serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub owner_id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub age: Option<u32>,
    #[serde(flatten)]
    pub details: PersonalDetails,
    pub categories: CategoryGroups,
}

/// Builds grouped views over a [`ContentStore`]. Holds no state of its own.
#[derive(Clone)]
pub struct AggregationService {
    store: ContentStore,
    config: AggregationConfig,
}

impl AggregationService {
    pub fn new(store: ContentStore, config: AggregationConfig) -> Self {
        Self { store, config }
    }

    /// Group every category's images, optionally only those owned by `owner_id`.
    ///
    /// Categories with no qualifying images map to an empty group. Repeated
    /// calls against an unchanged store return equal results.
    pub fn group_by_category(&self, owner_id: Option<UserId>) -> Result<CategoryGroups> {
        let mut groups = CategoryGroups::new();

        for category in self.store.list_categories()? {
            let refs = self.store.list_by_category(category.id, owner_id)?;
            let images = self.classify_all(&refs)?;
            groups.insert(
                category.id,
                CategoryGroup {
                    category_name: category.name,
                    images,
                },
            );
        }

        tracing::debug!(
            owner_id = ?owner_id.map(|o| o.to_string()),
            categories = groups.len(),
            "Grouped images by category"
        );
        Ok(groups)
    }

    /// Photographers with at least one qualifying image in `category_id`,
    /// ordered by username, each with their images in that category.
    pub fn browse_category(&self, category_id: CategoryId) -> Result<Vec<PhotographerGroup>> {
        let (category, owners) = {
            let conn = get_conn(self.store.pool())?;
            let category = categories::get_category(&conn, category_id)?
                .ok_or_else(|| Error::not_found("category", category_id))?;
            let owners = images::list_owners_in_category(&conn, category_id)?;
            (category, owners)
        };

        let mut photographers = Vec::with_capacity(owners.len());
        for owner in owners {
            let refs = self.store.list_by_category(category_id, Some(owner.id))?;
            let images = self.classify_all(&refs)?;
            if images.is_empty() {
                continue;
            }
            photographers.push(PhotographerGroup {
                owner_id: owner.id,
                username: owner.username,
                images,
            });
        }

        tracing::debug!(
            category = %category.name,
            photographers = photographers.len(),
            "Browsed category"
        );
        Ok(photographers)
    }

    /// A photographer's profile page: their images grouped by category.
    pub fn photographer_profile(&self, owner_id: UserId) -> Result<Profile> {
        let user = {
            let conn = get_conn(self.store.pool())?;
            users::get_user(&conn, owner_id)?.ok_or_else(|| Error::not_found("user", owner_id))?
        };

        Ok(Profile {
            owner_id: user.id,
            display_name: user.details.full_name(),
            age: user.details.age_on(Utc::now().date_naive()),
            username: user.username,
            email: user.email,
            details: user.details,
            categories: self.group_by_category(Some(owner_id))?,
        })
    }

    fn classify_all(&self, refs: &[ImageRef]) -> Result<Vec<ImageEntry>> {
        let mut entries = Vec::with_capacity(refs.len());
        for image in refs {
            if let Some(entry) = self.classify_one(image.id)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn classify_one(&self, image_id: ImageId) -> Result<Option<ImageEntry>> {
        let prefix = self.store.peek(image_id, SNIFF_LEN)?;
        match ph_sniff::classify_mime(&prefix) {
            Some(mime_type) => Ok(Some(ImageEntry {
                image_id,
                mime_type,
            })),
            None if self.config.surface_unknown => Ok(Some(ImageEntry {
                image_id,
                mime_type: FALLBACK_MIME,
            })),
            None => {
                tracing::warn!(image_id = %image_id, "Dropping image of unknown type");
                Ok(None)
            }
        }
    }
}
