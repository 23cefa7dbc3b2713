pub mod auth_service;
pub mod cart_service;
pub mod movie_service;
pub mod order_service;
pub mod popularity_service;
pub mod review_service;
