pub mod items;
pub mod movie_ratings;
pub mod movies;
pub mod orders;
pub mod popularity;
pub mod reviews;
pub mod users;

pub use items::Entity as Items;
pub use movie_ratings::Entity as MovieRatings;
pub use movies::Entity as Movies;
pub use orders::Entity as Orders;
pub use popularity::Entity as Popularity;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
