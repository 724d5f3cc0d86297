//! Service wiring shared by every HTTP worker.

use std::sync::Arc;

use crate::application::cart_service::CartService;
use crate::application::checkout_service::CheckoutService;
use crate::application::order_service::OrderService;
use crate::application::user_locks::UserLocks;
use crate::config::AppConfig;
use crate::domain::ports::{CartRepository, OrderRepository, PaymentGateway};
use crate::infrastructure::paypal::PayPalClient;
use crate::infrastructure::store::SupabaseStore;
use crate::infrastructure::supabase::SupabaseClient;

#[derive(Clone)]
pub struct AppContext {
    pub carts: CartService,
    pub orders: OrderService,
    pub checkout: CheckoutService,
}

impl AppContext {
    pub fn new(
        cart_repo: Arc<dyn CartRepository>,
        order_repo: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let carts = CartService::new(cart_repo);
        let orders = OrderService::new(order_repo);
        let checkout = CheckoutService::new(
            carts.clone(),
            orders.clone(),
            gateway,
            UserLocks::new(),
        );
        Self {
            carts,
            orders,
            checkout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let store = Arc::new(SupabaseStore::new(SupabaseClient::new(
            config.supabase.clone(),
        )));
        let gateway = Arc::new(PayPalClient::new(config.paypal.clone()));
        Self::new(store.clone(), store, gateway)
    }
}
