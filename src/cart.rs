//! Session cart and the pure pricing rules applied to it at checkout.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Movie;

/// ZIP recorded when the purchase form leaves it blank.
pub const DEFAULT_ZIP: &str = "00000";

/// Movie id (as submitted) to requested quantity (as submitted).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart(BTreeMap<String, String>);

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins per movie id.
    pub fn set(&mut self, movie_id: i32, quantity: impl Into<String>) {
        self.0.insert(movie_id.to_string(), quantity.into());
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Keys that parse as movie ids, in ascending order.
    pub fn movie_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.0.keys().filter_map(|k| k.parse().ok()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn raw_quantity(&self, movie_id: i32) -> Option<&str> {
        self.0.get(&movie_id.to_string()).map(String::as_str)
    }

    /// Quantity for a movie if present and a valid integer.
    pub fn quantity(&self, movie_id: i32) -> Option<i32> {
        self.raw_quantity(movie_id).and_then(parse_quantity)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Cart {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter.into_iter().map(|(k, v)| (k.into(), v.into()));
        Cart(entries.collect())
    }
}

/// Parses a submitted quantity. Only ASCII digits are accepted.
pub fn parse_quantity(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// One (movie, quantity, unit price) tuple of a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LineItem {
    pub movie_id: i32,
    pub movie_name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub line_total: i64,
}

/// Builds purchase lines for every resolvable movie with a positive quantity.
pub fn build_line_items(cart: &Cart, movies: &[Movie]) -> Vec<LineItem> {
    let mut lines: Vec<LineItem> = movies
        .iter()
        .filter_map(|movie| {
            let quantity = cart.quantity(movie.id).filter(|q| *q > 0)?;
            let line_total = movie.price.checked_mul(i64::from(quantity))?;
            Some(LineItem {
                movie_id: movie.id,
                movie_name: movie.name.clone(),
                quantity,
                unit_price: movie.price,
                line_total,
            })
        })
        .collect();
    lines.sort_by_key(|line| line.movie_id);
    lines
}

pub fn lines_total(lines: &[LineItem]) -> i64 {
    lines.iter().map(|line| line.line_total).sum()
}

/// Cart index total: quantity times current price, summed over resolvable movies.
pub fn cart_total(cart: &Cart, movies: &[Movie]) -> i64 {
    movies
        .iter()
        .filter_map(|movie| {
            let quantity = cart.quantity(movie.id)?;
            movie.price.checked_mul(i64::from(quantity))
        })
        .sum()
}

pub fn normalize_zip(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(zip) if !zip.is_empty() => zip.to_string(),
        _ => DEFAULT_ZIP.to_string(),
    }
}
