//! Redirect targets shared by handlers and services.

pub const LOGIN: &str = "/api/accounts/login";
pub const MOVIES: &str = "/api/movies";
pub const CART: &str = "/api/cart";
pub const POPULARITY_JSON: &str = "/api/cart/popularity.json";

pub fn movie(id: i32) -> String {
    format!("{MOVIES}/{id}")
}
