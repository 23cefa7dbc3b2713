use utoipa::{
    Modify, OpenApi,
    openapi::{
        self, OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::LineItem,
    dto::{
        accounts::{FormPage, LoginForm, LoginResponse, OrderList, OrderWithItems, SignupForm},
        cart::{AddToCartForm, CartLine, CartPage, PurchaseForm, PurchaseReceipt},
        movies::{MovieDetail, MovieList, RatingForm, ReviewEditPage, ReviewForm, ReviewView},
        popularity::{MapPage, RegionPage, ZipPayload},
    },
    models::{Item, Movie, Order, Review},
    popularity::{RegionMovie, RegionPopularity, ZipMovie, ZipPopularity},
    response::{ApiResponse, Meta},
    routes::{accounts, cart, health, movies, params, popularity},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        accounts::signup_page,
        accounts::signup,
        accounts::login_page,
        accounts::login,
        accounts::logout,
        accounts::orders,
        movies::list_movies,
        movies::show_movie,
        movies::create_review,
        movies::edit_review_page,
        movies::update_review,
        movies::delete_review,
        movies::rate_movie,
        cart::cart_index,
        cart::add_to_cart,
        cart::clear_cart,
        cart::purchase_page,
        cart::purchase,
        popularity::region_view,
        popularity::map_view,
        popularity::zip_json
    ),
    components(
        schemas(
            Movie,
            Review,
            Order,
            Item,
            LineItem,
            SignupForm,
            LoginForm,
            LoginResponse,
            FormPage,
            OrderWithItems,
            OrderList,
            MovieList,
            MovieDetail,
            ReviewView,
            ReviewEditPage,
            ReviewForm,
            RatingForm,
            AddToCartForm,
            PurchaseForm,
            CartLine,
            CartPage,
            PurchaseReceipt,
            RegionMovie,
            RegionPopularity,
            ZipMovie,
            ZipPopularity,
            RegionPage,
            MapPage,
            ZipPayload,
            params::Pagination,
            params::MovieQuery,
            Meta,
            ApiResponse<MovieList>,
            ApiResponse<MovieDetail>,
            ApiResponse<CartPage>,
            ApiResponse<PurchaseReceipt>,
            ApiResponse<OrderList>,
            ApiResponse<RegionPage>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Accounts", description = "Signup, login, logout and order history"),
        (name = "Movies", description = "Movie catalog"),
        (name = "Reviews", description = "Movie reviews"),
        (name = "Ratings", description = "Movie ratings"),
        (name = "Cart", description = "Session cart and purchase"),
        (name = "Popularity", description = "Purchases aggregated by ZIP code"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_mounted_on_get_and_post_document_both() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/accounts/logout",
            "/api/cart/clear",
            "/api/movies/{id}/reviews/{review_id}/delete",
        ] {
            let item = doc.paths.paths.get(path).expect(path);
            assert!(item.get.is_some(), "{path} get");
            assert!(item.post.is_some(), "{path} post");
        }
    }

    #[test]
    fn every_handler_is_documented() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/health"));
        assert!(doc.paths.paths.contains_key("/api/cart/popularity.json"));
        assert_eq!(doc.paths.paths.len(), 18);
    }
}
