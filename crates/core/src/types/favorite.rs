//! Favorites list rules.
//!
//! The list is a denormalized snapshot of each liked product, newest first,
//! unique by product ID. Persistence lives in the client crate; this module
//! only knows how the list changes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// A product snapshot taken when the user marked it as a favorite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: Option<String>,
    pub seller_name: String,
    /// When the item was added, in milliseconds since the Unix epoch.
    pub added_at: i64,
}

impl FavoriteItem {
    /// Snapshot a product at `added_at` (epoch milliseconds).
    #[must_use]
    pub fn snapshot(product: &Product, added_at: i64) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
            image: product.primary_image().map(str::to_owned),
            seller_name: product.seller.name.clone(),
            added_at,
        }
    }
}

/// The user's favorites, most recently added first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites(Vec<FavoriteItem>);

impl Favorites {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Prepend `item` unless its ID is already present.
    ///
    /// Returns `true` if the list changed.
    pub fn add(&mut self, item: FavoriteItem) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.0.insert(0, item);
        true
    }

    /// Remove the item with `id`. Returns `true` if it was present.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.0.len();
        self.0.retain(|item| &item.id != id);
        self.0.len() != before
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.0.iter().any(|item| &item.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FavoriteItem> {
        self.0.iter()
    }

    /// Set `is_liked` on each product from membership in this list.
    pub fn apply_liked(&self, products: &mut [Product]) {
        let ids: HashSet<&ProductId> = self.0.iter().map(|item| &item.id).collect();
        for product in products {
            product.is_liked = ids.contains(&product.id);
        }
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<FavoriteItem> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Favorites {
    type Item = &'a FavoriteItem;
    type IntoIter = std::slice::Iter<'a, FavoriteItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
