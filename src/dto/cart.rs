use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    cart::LineItem,
    models::{Movie, Order},
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddToCartForm {
    pub quantity: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PurchaseForm {
    pub zip: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLine {
    pub movie: Movie,
    pub quantity: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartPage {
    pub items: Vec<CartLine>,
    pub cart_total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseReceipt {
    pub order: Order,
    pub items: Vec<LineItem>,
    pub total: i64,
    pub zip: String,
}
