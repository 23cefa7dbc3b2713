use movie_store::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{
        cart::{AddToCartForm, PurchaseForm},
        movies::{RatingForm, ReviewForm},
    },
    entity::{
        items::{Column as ItemCol, Entity as Items},
        movie_ratings::{Column as RatingCol, Entity as MovieRatings},
        movies::{ActiveModel as MovieActive, Model as MovieModel},
        orders::{Column as OrderCol, Entity as Orders},
        popularity::{Column as PopCol, Entity as Popularity},
        reviews::{Column as ReviewCol, Entity as Reviews},
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    popularity::{rank_regions, rank_zips},
    response::Outcome,
    routes::params::Pagination,
    services::{cart_service, movie_service, order_service, popularity_service, review_service},
    session::SessionId,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

// Every test creates its own users, movies and ZIPs so runs never collide.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run purchase flow tests."
            );
            return Ok(None);
        }
    };

    let config = AppConfig {
        database_url: database_url.clone(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "flow-secret".into(),
        jwt_ttl_hours: 1,
        session_ttl_secs: 3600,
    };
    let pool = create_pool(&database_url).await?;
    let state = AppState::new(pool, config);
    run_migrations(&state.orm).await?;
    Ok(Some(state))
}

async fn create_user(state: &AppState) -> anyhow::Result<AuthUser> {
    let user_id = Uuid::new_v4();
    let username = format!("user-{}", &user_id.simple().to_string()[..12]);
    UserActive {
        id: Set(user_id),
        username: Set(username.clone()),
        password_hash: Set("not-a-real-hash".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(AuthUser { user_id, username })
}

async fn create_movie(state: &AppState, name: &str, price: i64) -> anyhow::Result<MovieModel> {
    let movie = MovieActive {
        id: NotSet,
        name: Set(format!("{name} {}", Uuid::new_v4().simple())),
        price: Set(price),
        description: Set("test movie".into()),
        image: Set(String::new()),
    }
    .insert(&state.orm)
    .await?;
    Ok(movie)
}

fn unique_zip() -> String {
    format!("{:05}", Uuid::new_v4().as_u128() % 100_000)
}

fn new_session() -> SessionId {
    SessionId::new(Uuid::new_v4().to_string())
}

async fn add(
    state: &AppState,
    session: &SessionId,
    movie_id: i32,
    quantity: &str,
) -> anyhow::Result<()> {
    cart_service::add_to_cart(
        state,
        session,
        movie_id,
        AddToCartForm {
            quantity: Some(quantity.into()),
        },
    )
    .await?;
    Ok(())
}

async fn popularity_count(state: &AppState, movie_id: i32, zip: &str) -> anyhow::Result<i32> {
    let row = Popularity::find()
        .filter(PopCol::MovieId.eq(movie_id))
        .filter(PopCol::Zip.eq(zip))
        .one(&state.orm)
        .await?;
    Ok(row.map(|r| r.count).unwrap_or(0))
}

async fn order_count(state: &AppState, user: &AuthUser) -> anyhow::Result<u64> {
    Ok(Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?)
}

#[tokio::test]
async fn purchase_creates_order_items_and_popularity() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = create_user(&state).await?;
    let movie = create_movie(&state, "Heat", 10).await?;
    let other = create_movie(&state, "Alien", 7).await?;
    let session = new_session();

    add(&state, &session, movie.id, "2").await?;
    add(&state, &session, other.id, "3").await?;

    let outcome =
        cart_service::purchase(&state, &user, &session, PurchaseForm { zip: None }).await?;
    let receipt = outcome.into_data().expect("purchase receipt");
    assert_eq!(receipt.total, 2 * 10 + 3 * 7);
    assert_eq!(receipt.order.total, receipt.total);
    assert_eq!(receipt.zip, "00000");

    let items = Items::find()
        .filter(ItemCol::OrderId.eq(receipt.order.id))
        .all(&state.orm)
        .await?;
    assert_eq!(items.len(), 2);
    let heat = items.iter().find(|i| i.movie_id == movie.id).expect("heat item");
    assert_eq!((heat.quantity, heat.price), (2, 10));

    assert_eq!(popularity_count(&state, movie.id, "00000").await?, 2);
    assert_eq!(popularity_count(&state, other.id, "00000").await?, 3);
    assert!(state.sessions.cart(&session).is_empty());
    Ok(())
}

#[tokio::test]
async fn repeated_purchases_accumulate_popularity() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = create_user(&state).await?;
    let movie = create_movie(&state, "Drive", 5).await?;
    let zip = unique_zip();

    for quantity in ["1", "4"] {
        let session = new_session();
        add(&state, &session, movie.id, quantity).await?;
        let outcome = cart_service::purchase(
            &state,
            &user,
            &session,
            PurchaseForm {
                zip: Some(zip.clone()),
            },
        )
        .await?;
        assert!(!outcome.is_redirect());
    }

    assert_eq!(popularity_count(&state, movie.id, &zip).await?, 5);
    assert_eq!(order_count(&state, &user).await?, 2);
    Ok(())
}

#[tokio::test]
async fn cart_without_valid_lines_writes_nothing() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = create_user(&state).await?;
    let movie = create_movie(&state, "Brazil", 12).await?;
    let session = new_session();

    add(&state, &session, movie.id, "0").await?;
    // Rejected at add time, the earlier quantity stays.
    add(&state, &session, movie.id, "abc").await?;
    assert_eq!(state.sessions.cart(&session).raw_quantity(movie.id), Some("0"));

    let outcome = cart_service::purchase(&state, &user, &session, PurchaseForm::default()).await?;
    assert!(outcome.is_redirect());
    assert_eq!(order_count(&state, &user).await?, 0);
    assert_eq!(popularity_count(&state, movie.id, "00000").await?, 0);
    Ok(())
}

#[tokio::test]
async fn failed_purchase_rolls_back_and_keeps_cart() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = create_user(&state).await?;
    let movie = create_movie(&state, "Fargo", 9).await?;
    let session = new_session();
    add(&state, &session, movie.id, "1").await?;

    let result = cart_service::purchase(
        &state,
        &user,
        &session,
        PurchaseForm {
            zip: Some("123456789012345".into()),
        },
    )
    .await;

    assert!(matches!(result, Err(AppError::OrmError(_))));
    assert_eq!(order_count(&state, &user).await?, 0);
    assert_eq!(state.sessions.cart(&session).quantity(movie.id), Some(1));
    Ok(())
}

#[tokio::test]
async fn adding_unknown_movie_is_not_found() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let result = cart_service::add_to_cart(
        &state,
        &new_session(),
        i32::MAX,
        AddToCartForm {
            quantity: Some("1".into()),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn rating_is_one_row_per_user_and_movie() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = create_user(&state).await?;
    let other = create_user(&state).await?;
    let movie = create_movie(&state, "Up", 4).await?;

    for (who, value) in [(&user, "2"), (&user, "5"), (&other, "4"), (&user, "9")] {
        review_service::rate_movie(
            &state,
            who,
            movie.id,
            RatingForm {
                rating: Some(value.into()),
            },
        )
        .await?;
    }

    let rows = MovieRatings::find()
        .filter(RatingCol::MovieId.eq(movie.id))
        .count(&state.orm)
        .await?;
    assert_eq!(rows, 2);

    let detail = movie_service::show_movie(&state, Some(&user), movie.id)
        .await?
        .into_data()
        .expect("movie detail");
    assert_eq!(detail.user_rating, Some(5));
    assert_eq!(detail.average_rating, Some(4.5));
    Ok(())
}

#[tokio::test]
async fn reviews_are_editable_only_by_their_author() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let author = create_user(&state).await?;
    let stranger = create_user(&state).await?;
    let movie = create_movie(&state, "Casablanca", 6).await?;

    review_service::create_review(
        &state,
        &author,
        movie.id,
        ReviewForm {
            comment: Some("Great".into()),
        },
    )
    .await?;
    review_service::create_review(
        &state,
        &author,
        movie.id,
        ReviewForm {
            comment: Some("   ".into()),
        },
    )
    .await?;

    let reviews = Reviews::find()
        .filter(ReviewCol::MovieId.eq(movie.id))
        .all(&state.orm)
        .await?;
    assert_eq!(reviews.len(), 1);
    let review_id = reviews[0].id;

    let denied = review_service::update_review(
        &state,
        &stranger,
        movie.id,
        review_id,
        ReviewForm {
            comment: Some("Hijacked".into()),
        },
    )
    .await;
    assert!(matches!(denied, Err(AppError::NotFound)));
    let denied = review_service::delete_review(&state, &stranger, movie.id, review_id).await;
    assert!(matches!(denied, Err(AppError::NotFound)));

    review_service::update_review(
        &state,
        &author,
        movie.id,
        review_id,
        ReviewForm {
            comment: Some("Even better".into()),
        },
    )
    .await?;
    let detail = movie_service::show_movie(&state, None, movie.id)
        .await?
        .into_data()
        .expect("movie detail");
    assert_eq!(detail.reviews.len(), 1);
    assert_eq!(detail.reviews[0].comment, "Even better");
    assert_eq!(detail.reviews[0].username, author.username);

    review_service::delete_review(&state, &author, movie.id, review_id).await?;
    assert!(Reviews::find_by_id(review_id).one(&state.orm).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn aggregation_reflects_purchases() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = create_user(&state).await?;
    let movie = create_movie(&state, "Amelie", 3).await?;
    let zip = unique_zip();

    let session = new_session();
    add(&state, &session, movie.id, "6").await?;
    cart_service::purchase(
        &state,
        &user,
        &session,
        PurchaseForm {
            zip: Some(zip.clone()),
        },
    )
    .await?;

    let rows: Vec<_> = popularity_service::zip_movie_counts(&state)
        .await?
        .into_iter()
        .filter(|row| row.movie_id == movie.id)
        .collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total, 6);
    assert_eq!(rows[0].movie_name, movie.name);

    let zips = rank_zips(&rows);
    assert_eq!(zips[0].zip, zip);
    assert_eq!(zips[0].total, 6);

    let regions = rank_regions(&rows);
    assert_eq!(regions[0].region, format!("{}**", &zip[..3]));
    assert_eq!(regions[0].top[0].movie_id, movie.id);

    let payload = popularity_service::zip_payload(&state).await?;
    assert!(payload.data.iter().any(|z| z.zip == zip && z.total >= 6));
    Ok(())
}

#[tokio::test]
async fn order_history_lists_only_own_orders_newest_first() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let buyer = create_user(&state).await?;
    let someone_else = create_user(&state).await?;
    let first = create_movie(&state, "Solaris", 8).await?;
    let second = create_movie(&state, "Stalker", 11).await?;

    for (user, movie, quantity) in [
        (&buyer, &first, "1"),
        (&someone_else, &first, "2"),
        (&buyer, &second, "3"),
    ] {
        let session = new_session();
        add(&state, &session, movie.id, quantity).await?;
        cart_service::purchase(&state, user, &session, PurchaseForm::default()).await?;
    }

    let outcome = order_service::list_orders(&state, &buyer, Pagination::default()).await?;
    let Outcome::Render(page) = outcome else {
        panic!("order history should render");
    };
    assert_eq!(page.message, "Orders");
    assert_eq!(page.meta.and_then(|m| m.total), Some(2));

    let orders = page.data.expect("orders").items;
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o.order.user_id == buyer.user_id));

    assert_eq!(orders[0].order.total, 33);
    assert_eq!(orders[0].items.len(), 1);
    assert_eq!(orders[0].items[0].movie_id, second.id);
    assert_eq!(orders[0].items[0].quantity, 3);

    assert_eq!(orders[1].order.total, 8);
    assert_eq!(orders[1].items[0].movie_id, first.id);
    Ok(())
}
