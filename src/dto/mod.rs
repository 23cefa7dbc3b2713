pub mod accounts;
pub mod cart;
pub mod movies;
pub mod popularity;
