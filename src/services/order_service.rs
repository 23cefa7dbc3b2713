use std::collections::HashMap;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::{
    dto::accounts::{OrderList, OrderWithItems},
    entity::{
        items::{Column as ItemCol, Entity as Items},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Item, Order},
    response::{Meta, Outcome},
    routes::params::Pagination,
    state::AppState,
};

/// The caller's orders, newest first, each with its items.
pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<Outcome<OrderList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .order_by_desc(OrderCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order: HashMap<i32, Vec<Item>> = HashMap::new();
    if !order_ids.is_empty() {
        for item in Items::find()
            .filter(ItemCol::OrderId.is_in(order_ids))
            .order_by_asc(ItemCol::Id)
            .all(&state.orm)
            .await?
        {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(Item::from(item));
        }
    }

    let items = orders
        .into_iter()
        .map(|order| OrderWithItems {
            items: items_by_order.remove(&order.id).unwrap_or_default(),
            order: Order::from(order),
        })
        .collect();

    Ok(Outcome::render_with_meta(
        "Orders",
        OrderList { items },
        Meta::new(page, limit, total),
    ))
}
