use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Alias, Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::{
    audit,
    cart::{Cart, build_line_items, cart_total, lines_total, normalize_zip, parse_quantity},
    dto::cart::{AddToCartForm, CartLine, CartPage, PurchaseForm, PurchaseReceipt},
    entity::{
        items::ActiveModel as ItemActive,
        movies::{Column as MovieCol, Entity as Movies},
        orders::ActiveModel as OrderActive,
        popularity::{ActiveModel as PopularityActive, Column as PopCol, Entity as Popularity},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Movie, Order},
    response::Outcome,
    routes::paths,
    session::SessionId,
    state::AppState,
};

async fn movies_in_cart(state: &AppState, cart: &Cart) -> AppResult<Vec<Movie>> {
    let ids = cart.movie_ids();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let movies = Movies::find()
        .filter(MovieCol::Id.is_in(ids))
        .order_by_asc(MovieCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Movie::from)
        .collect();
    Ok(movies)
}

pub async fn cart_index(state: &AppState, session: &SessionId) -> AppResult<Outcome<CartPage>> {
    let cart = state.sessions.cart(session);
    let movies = movies_in_cart(state, &cart).await?;
    let total = cart_total(&cart, &movies);

    let items = movies
        .into_iter()
        .map(|movie| {
            let quantity = cart.raw_quantity(movie.id).unwrap_or_default().to_string();
            CartLine { movie, quantity }
        })
        .collect();

    Ok(Outcome::render(
        "Cart",
        CartPage {
            items,
            cart_total: total,
        },
    ))
}

pub async fn add_to_cart(
    state: &AppState,
    session: &SessionId,
    movie_id: i32,
    form: AddToCartForm,
) -> AppResult<Outcome<()>> {
    let movie = Movies::find_by_id(movie_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    match form.quantity.as_deref().and_then(parse_quantity) {
        Some(quantity) => {
            state
                .sessions
                .update_cart(session, |cart| cart.set(movie.id, quantity.to_string()));
        }
        None => tracing::debug!(movie_id, "ignored invalid cart quantity"),
    }

    Ok(Outcome::redirect(paths::CART))
}

pub fn clear_cart(state: &AppState, session: &SessionId) -> Outcome<()> {
    state.sessions.clear_cart(session);
    Outcome::redirect(paths::CART)
}

/// Turns the session cart into an order.
///
/// The order, its items and the popularity increments are written in one
/// transaction. Nothing is written when the cart has no valid line, and the
/// cart is only emptied once the transaction has committed.
pub async fn purchase(
    state: &AppState,
    user: &AuthUser,
    session: &SessionId,
    form: PurchaseForm,
) -> AppResult<Outcome<PurchaseReceipt>> {
    let cart = state.sessions.cart(session);
    if cart.is_empty() {
        return Ok(Outcome::redirect(paths::CART));
    }

    let movies = movies_in_cart(state, &cart).await?;
    let lines = build_line_items(&cart, &movies);
    if lines.is_empty() {
        tracing::debug!(user_id = %user.user_id, "purchase with no valid lines");
        return Ok(Outcome::redirect(paths::CART));
    }
    let total = lines_total(&lines);
    let zip = normalize_zip(form.zip.as_deref());

    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: NotSet,
        user_id: Set(user.user_id),
        total: Set(total),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for line in &lines {
        ItemActive {
            id: NotSet,
            order_id: Set(order.id),
            movie_id: Set(line.movie_id),
            quantity: Set(line.quantity),
            price: Set(line.unit_price),
        }
        .insert(&txn)
        .await?;

        let counter = PopularityActive {
            id: NotSet,
            movie_id: Set(line.movie_id),
            zip: Set(zip.clone()),
            count: Set(line.quantity),
        };
        Popularity::insert(counter)
            .on_conflict(
                OnConflict::columns([PopCol::MovieId, PopCol::Zip])
                    .value(
                        PopCol::Count,
                        Expr::col((Popularity, PopCol::Count))
                            .add(Expr::col((Alias::new("excluded"), PopCol::Count))),
                    )
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;

    state.sessions.clear_cart(session);

    tracing::info!(
        order_id = order.id,
        user_id = %user.user_id,
        total,
        lines = lines.len(),
        zip = %zip,
        "purchase completed"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "purchase",
        "orders",
        serde_json::json!({ "order_id": order.id, "total": total, "zip": zip }),
    )
    .await;

    Ok(Outcome::render(
        "Purchase Complete",
        PurchaseReceipt {
            order: Order::from(order),
            items: lines,
            total,
            zip,
        },
    ))
}
