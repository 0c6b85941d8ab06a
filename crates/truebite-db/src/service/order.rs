//! # Order Workflow
//!
//! Orchestrates validation, pricing, payment and persistence of a new
//! order as one atomic unit, and owns the delivery status state machine.
//!
//! ## Order Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               create_order: ONE transaction                             │
//! │                                                                         │
//! │  1. Load customer         → NotFound / CustomerBlacklisted             │
//! │  2. Reject empty carts    → EmptyCart                                  │
//! │  3. Per cart line:        → DishNotFound / DishUnavailable /           │
//! │     snapshot the price      VipOnlyDish / InvalidQuantity              │
//! │  4. Price the cart        (pure, truebite-core)                        │
//! │  5. Debit the wallet      → InsufficientFunds, BEFORE any order row    │
//! │  6. Insert order + items, bump customer counters                       │
//! │  7. COMMIT - or roll back everything                                   │
//! │                                                                         │
//! │  Any failure leaves no order, no items, no ledger entry, no balance    │
//! │  change. A failed creation is reported, never silently retried:        │
//! │  retrying a multi-step commit is how wallets get double-debited.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::customer::CustomerRepository;
use crate::repository::dish::DishRepository;
use crate::repository::order::OrderRepository;
use crate::repository::wallet::WalletRepository;
use truebite_core::{
    price_cart, CartLine, CoreError, Order, OrderItem, OrderStatus, DEFAULT_HISTORY_LIMIT,
    MAX_LINE_QUANTITY,
};

/// The order workflow service.
#[derive(Debug, Clone)]
pub struct OrderService {
    pool: SqlitePool,
}

impl OrderService {
    /// Creates a new OrderService.
    pub fn new(pool: SqlitePool) -> Self {
        OrderService { pool }
    }

    fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// Creates an order from a submitted cart.
    ///
    /// Runs the whole validate-price-pay-persist sequence inside a single
    /// transaction. On any error the transaction rolls back (sqlx rolls
    /// back a dropped transaction, which covers every early-return path).
    pub async fn create_order(&self, customer_id: &str, cart: &[CartLine]) -> DbResult<Order> {
        debug!(customer_id = %customer_id, lines = cart.len(), "create_order");

        let mut tx = self.pool.begin().await?;

        let customer = CustomerRepository::get_tx(&mut tx, customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", customer_id))?;

        if customer.is_blacklisted {
            return Err(CoreError::CustomerBlacklisted(customer.id).into());
        }

        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        // Validate every line against the catalog and snapshot prices.
        let mut lines = Vec::with_capacity(cart.len());
        for cart_line in cart {
            let dish = DishRepository::get_tx(&mut tx, &cart_line.dish_id)
                .await?
                .ok_or_else(|| CoreError::DishNotFound(cart_line.dish_id.clone()))?;

            if !dish.is_available {
                return Err(CoreError::DishUnavailable { name: dish.name }.into());
            }

            if dish.is_vip_only && !customer.is_vip {
                return Err(CoreError::VipOnlyDish { name: dish.name }.into());
            }

            if cart_line.quantity <= 0 || cart_line.quantity > MAX_LINE_QUANTITY {
                return Err(CoreError::InvalidQuantity {
                    dish_id: dish.id,
                    quantity: cart_line.quantity,
                }
                .into());
            }

            lines.push((dish, cart_line.quantity));
        }

        // Price from the snapshots and the count BEFORE this order.
        let priced: Vec<_> = lines.iter().map(|(d, q)| (d.price(), *q)).collect();
        let quote = price_cart(&priced, customer.is_vip, customer.order_count);

        let order_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        // Debit before any order row is written. InsufficientFunds aborts
        // the transaction with nothing persisted.
        let wallet = WalletRepository::get_by_customer_tx(&mut tx, customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Wallet", customer_id))?;

        WalletRepository::debit(
            &mut tx,
            &wallet.id,
            quote.total,
            Some(&order_id),
            "Order payment",
        )
        .await?;

        let mut order = Order {
            id: order_id.clone(),
            customer_id: customer.id.clone(),
            chef_id: None,
            delivery_person_id: None,
            status: OrderStatus::Created,
            subtotal_cents: quote.subtotal.cents(),
            discount_cents: quote.discount.cents(),
            delivery_fee_cents: quote.delivery_fee.cents(),
            total_cents: quote.total.cents(),
            order_time: now,
            delivery_time: None,
            items: Vec::new(),
        };
        OrderRepository::insert_tx(&mut tx, &order).await?;

        for (line_no, (dish, quantity)) in lines.iter().enumerate() {
            let item = OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                dish_id: dish.id.clone(),
                quantity: *quantity,
                price_cents: dish.price_cents,
                line_no: line_no as i64,
                created_at: now,
            };
            OrderRepository::insert_item_tx(&mut tx, &item).await?;
            order.items.push(item);
        }

        CustomerRepository::record_order(&mut tx, &customer.id, quote.total.cents()).await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            customer_id = %customer.id,
            total = %quote.total,
            items = order.items.len(),
            "Order created"
        );

        Ok(order)
    }

    /// Gets an order by ID, items included.
    pub async fn get_order(&self, order_id: &str) -> DbResult<Order> {
        self.orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))
    }

    /// Lists a customer's order history, newest first.
    ///
    /// A non-positive `limit` falls back to [`DEFAULT_HISTORY_LIMIT`].
    pub async fn list_orders(&self, customer_id: &str, limit: i64) -> DbResult<Vec<Order>> {
        let limit = if limit > 0 { limit } else { DEFAULT_HISTORY_LIMIT };
        self.orders().list_for_customer(customer_id, limit).await
    }

    /// Moves an order to a new lifecycle status.
    ///
    /// The target is received as a string from the routing layer; an
    /// unrecognized name fails with `InvalidStatus` and leaves the order
    /// unchanged.
    pub async fn update_status(&self, order_id: &str, new_status: &str) -> DbResult<Order> {
        let status: OrderStatus = new_status.parse().map_err(DbError::Domain)?;

        self.orders().transition_status(order_id, status).await?;

        info!(order_id = %order_id, status = %status, "Order status transition");

        self.get_order(order_id).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use truebite_core::{Customer, Dish, LedgerEntryKind, Money};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(db: &Database, is_vip: bool, order_count: i64) -> Customer {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: "Test Customer".to_string(),
            is_vip,
            is_blacklisted: false,
            order_count,
            total_spent_cents: 0,
            created_at: Utc::now(),
        };
        db.customers().insert(&customer).await.unwrap();
        customer
    }

    async fn seed_dish(db: &Database, price_cents: i64, available: bool, vip_only: bool) -> Dish {
        let dish = Dish {
            id: Uuid::new_v4().to_string(),
            chef_id: None,
            name: format!("Dish {price_cents}"),
            price_cents,
            is_available: available,
            is_vip_only: vip_only,
            created_at: Utc::now(),
        };
        db.dishes().insert(&dish).await.unwrap();
        dish
    }

    async fn fund_wallet(db: &Database, customer_id: &str, cents: i64) {
        db.wallets().create(customer_id).await.unwrap();
        if cents > 0 {
            db.finance_service()
                .deposit(customer_id, Money::from_cents(cents))
                .await
                .unwrap();
        }
    }

    fn line(dish: &Dish, quantity: i64) -> CartLine {
        CartLine {
            dish_id: dish.id.clone(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_regular_order_end_to_end() {
        // 2 × $10.00 + $5.00 fee = $25.00 against a $30.00 wallet
        let db = setup().await;
        let customer = seed_customer(&db, false, 0).await;
        let dish = seed_dish(&db, 1000, true, false).await;
        fund_wallet(&db, &customer.id, 3000).await;

        let order = db
            .order_service()
            .create_order(&customer.id, &[line(&dish, 2)])
            .await
            .unwrap();

        assert_eq!(order.subtotal_cents, 2000);
        assert_eq!(order.discount_cents, 0);
        assert_eq!(order.delivery_fee_cents, 500);
        assert_eq!(order.total_cents, 2500);
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].price_cents, 1000);
        assert_eq!(order.items[0].quantity, 2);

        // Wallet debited to $5.00, payment entry linked to the order
        let wallet = db.wallets().get_by_customer(&customer.id).await.unwrap().unwrap();
        assert_eq!(wallet.balance_cents, 500);

        let entries = db.wallets().list_entries(&wallet.id, 50).await.unwrap();
        let payment = entries.iter().find(|e| e.kind == LedgerEntryKind::Payment).unwrap();
        assert_eq!(payment.amount_cents, -2500);
        assert_eq!(payment.order_id.as_deref(), Some(order.id.as_str()));

        // Customer counters bumped in the same unit
        let customer = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(customer.order_count, 1);
        assert_eq!(customer.total_spent_cents, 2500);

        // Readable back through the service
        let fetched = db.order_service().get_order(&order.id).await.unwrap();
        assert_eq!(fetched.total_cents, 2500);
        assert_eq!(fetched.items.len(), 1);
    }

    #[tokio::test]
    async fn test_vip_discount_and_loyalty_waiver() {
        // VIP, 3 prior orders: 5% off $40.00 and the fee waived
        let db = setup().await;
        let customer = seed_customer(&db, true, 3).await;
        let dish = seed_dish(&db, 2000, true, false).await;
        fund_wallet(&db, &customer.id, 10000).await;

        let order = db
            .order_service()
            .create_order(&customer.id, &[line(&dish, 2)])
            .await
            .unwrap();

        assert_eq!(order.subtotal_cents, 4000);
        assert_eq!(order.discount_cents, 200);
        assert_eq!(order.delivery_fee_cents, 0);
        assert_eq!(order.total_cents, 3800);
    }

    #[tokio::test]
    async fn test_vip_can_order_vip_only_dish() {
        let db = setup().await;
        let customer = seed_customer(&db, true, 0).await;
        let dish = seed_dish(&db, 3000, true, true).await;
        fund_wallet(&db, &customer.id, 10000).await;

        let order = db
            .order_service()
            .create_order(&customer.id, &[line(&dish, 1)])
            .await
            .unwrap();
        assert_eq!(order.items[0].dish_id, dish.id);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let db = setup().await;
        let customer = seed_customer(&db, false, 0).await;
        fund_wallet(&db, &customer.id, 1000).await;

        let err = db
            .order_service()
            .create_order(&customer.id, &[])
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_blacklisted_customer_rejected() {
        let db = setup().await;
        let customer = seed_customer(&db, false, 0).await;
        sqlx::query("UPDATE customers SET is_blacklisted = 1 WHERE id = ?1")
            .bind(&customer.id)
            .execute(db.pool())
            .await
            .unwrap();
        let dish = seed_dish(&db, 1000, true, false).await;
        fund_wallet(&db, &customer.id, 5000).await;

        let err = db
            .order_service()
            .create_order(&customer.id, &[line(&dish, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::CustomerBlacklisted(_))));
    }

    #[tokio::test]
    async fn test_unknown_customer_is_not_found() {
        let db = setup().await;
        let dish = seed_dish(&db, 1000, true, false).await;

        let err = db
            .order_service()
            .create_order("no-such-customer", &[line(&dish, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_dish_validation_failures() {
        let db = setup().await;
        let customer = seed_customer(&db, false, 0).await;
        fund_wallet(&db, &customer.id, 10000).await;

        let missing = CartLine {
            dish_id: "no-such-dish".to_string(),
            quantity: 1,
        };
        let err = db
            .order_service()
            .create_order(&customer.id, &[missing])
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::DishNotFound(_))));

        let unavailable = seed_dish(&db, 1000, false, false).await;
        let err = db
            .order_service()
            .create_order(&customer.id, &[line(&unavailable, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::DishUnavailable { .. })));

        let dish = seed_dish(&db, 1000, true, false).await;
        let err = db
            .order_service()
            .create_order(&customer.id, &[line(&dish, 0)])
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::InvalidQuantity { .. })));
    }

    #[tokio::test]
    async fn test_excessive_quantity_is_rejected_before_pricing() {
        // A runaway quantity must fail validation, not overflow a total
        let db = setup().await;
        let customer = seed_customer(&db, false, 0).await;
        let dish = seed_dish(&db, 1000, true, false).await;
        fund_wallet(&db, &customer.id, 10000).await;

        for quantity in [MAX_LINE_QUANTITY + 1, i64::MAX] {
            let err = db
                .order_service()
                .create_order(&customer.id, &[line(&dish, quantity)])
                .await
                .unwrap_err();
            assert!(matches!(
                err.as_domain(),
                Some(CoreError::InvalidQuantity { quantity: q, .. }) if *q == quantity
            ));
        }

        assert_eq!(db.orders().count().await.unwrap(), 0);
        let wallet = db.wallets().get_by_customer(&customer.id).await.unwrap().unwrap();
        assert_eq!(wallet.balance_cents, 10000);
    }

    #[tokio::test]
    async fn test_vip_only_dish_leaves_no_partial_state() {
        // First line is fine, second is VIP-only: nothing may persist
        let db = setup().await;
        let customer = seed_customer(&db, false, 0).await;
        let plain = seed_dish(&db, 1000, true, false).await;
        let exclusive = seed_dish(&db, 5000, true, true).await;
        fund_wallet(&db, &customer.id, 20000).await;

        let err = db
            .order_service()
            .create_order(&customer.id, &[line(&plain, 1), line(&exclusive, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::VipOnlyDish { .. })));

        assert_eq!(db.orders().count().await.unwrap(), 0);
        let wallet = db.wallets().get_by_customer(&customer.id).await.unwrap().unwrap();
        assert_eq!(wallet.balance_cents, 20000);
        let entries = db.wallets().list_entries(&wallet.id, 50).await.unwrap();
        assert!(entries.iter().all(|e| e.kind == LedgerEntryKind::Deposit));
    }

    #[tokio::test]
    async fn test_insufficient_funds_rolls_back_everything() {
        // $10.00 wallet cannot cover a $25.00 total
        let db = setup().await;
        let customer = seed_customer(&db, false, 0).await;
        let dish = seed_dish(&db, 1000, true, false).await;
        fund_wallet(&db, &customer.id, 1000).await;

        let err = db
            .order_service()
            .create_order(&customer.id, &[line(&dish, 2)])
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::InsufficientFunds {
                balance_cents: 1000,
                required_cents: 2500,
            })
        ));

        assert_eq!(db.orders().count().await.unwrap(), 0);
        let wallet = db.wallets().get_by_customer(&customer.id).await.unwrap().unwrap();
        assert_eq!(wallet.balance_cents, 1000);

        let customer = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(customer.order_count, 0);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_submission_debits_once() {
        // Balance covers exactly one order; the duplicate must lose.
        // A file-backed pool with several connections lets both
        // submissions run on their own connection, so the debits really
        // race on the conditional UPDATE instead of serializing at
        // connection acquire.
        let path = std::env::temp_dir().join(format!("truebite-race-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();

        let customer = seed_customer(&db, false, 0).await;
        let dish = seed_dish(&db, 1000, true, false).await;
        fund_wallet(&db, &customer.id, 2500).await;

        let service = db.order_service();
        let cart = [line(&dish, 2)];
        let (a, b) = tokio::join!(
            service.create_order(&customer.id, &cart),
            service.create_order(&customer.id, &cart),
        );

        // Exactly one submission wins. The loser either failed the
        // sufficiency check or lost the write-lock race; both surface as
        // an error with nothing persisted.
        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        assert_eq!(db.orders().count().await.unwrap(), 1);
        let wallet = db.wallets().get_by_customer(&customer.id).await.unwrap().unwrap();
        assert_eq!(wallet.balance_cents, 0);

        let entries = db.wallets().list_entries(&wallet.id, 50).await.unwrap();
        let payments = entries
            .iter()
            .filter(|e| e.kind == LedgerEntryKind::Payment)
            .count();
        assert_eq!(payments, 1);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_price_snapshot_survives_catalog_change() {
        let db = setup().await;
        let customer = seed_customer(&db, false, 0).await;
        let dish = seed_dish(&db, 1000, true, false).await;
        fund_wallet(&db, &customer.id, 5000).await;

        let order = db
            .order_service()
            .create_order(&customer.id, &[line(&dish, 1)])
            .await
            .unwrap();

        db.dishes().update_price(&dish.id, 9900).await.unwrap();

        let fetched = db.order_service().get_order(&order.id).await.unwrap();
        assert_eq!(fetched.items[0].price_cents, 1000);
        assert_eq!(fetched.total_cents, 1500);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let db = setup().await;
        let customer = seed_customer(&db, false, 0).await;
        let dish = seed_dish(&db, 1000, true, false).await;
        fund_wallet(&db, &customer.id, 10000).await;

        let service = db.order_service();
        let first = service.create_order(&customer.id, &[line(&dish, 1)]).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = service.create_order(&customer.id, &[line(&dish, 2)]).await.unwrap();

        let orders = service.list_orders(&customer.id, 50).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, second.id);
        assert_eq!(orders[1].id, first.id);

        let limited = service.list_orders(&customer.id, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, second.id);
    }

    #[tokio::test]
    async fn test_status_lifecycle_to_delivered() {
        let db = setup().await;
        let customer = seed_customer(&db, false, 0).await;
        let dish = seed_dish(&db, 1000, true, false).await;
        fund_wallet(&db, &customer.id, 5000).await;

        let service = db.order_service();
        let order = service.create_order(&customer.id, &[line(&dish, 1)]).await.unwrap();

        for status in [
            "IN_KITCHEN",
            "READY_FOR_DELIVERY",
            "ASSIGNED",
            "OUT_FOR_DELIVERY",
        ] {
            let updated = service.update_status(&order.id, status).await.unwrap();
            assert_eq!(updated.status.as_str(), status);
            assert!(updated.delivery_time.is_none());
        }

        let delivered = service.update_status(&order.id, "DELIVERED").await.unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert!(delivered.delivery_time.is_some());
    }

    #[tokio::test]
    async fn test_bogus_status_leaves_order_unchanged() {
        let db = setup().await;
        let customer = seed_customer(&db, false, 0).await;
        let dish = seed_dish(&db, 1000, true, false).await;
        fund_wallet(&db, &customer.id, 5000).await;

        let service = db.order_service();
        let order = service.create_order(&customer.id, &[line(&dish, 1)]).await.unwrap();

        let err = service.update_status(&order.id, "BOGUS").await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::InvalidStatus(s)) if s == "BOGUS"));

        let unchanged = service.get_order(&order.id).await.unwrap();
        assert_eq!(unchanged.status, OrderStatus::Created);
    }

    #[tokio::test]
    async fn test_terminal_states_admit_no_transitions() {
        let db = setup().await;
        let customer = seed_customer(&db, false, 0).await;
        let dish = seed_dish(&db, 1000, true, false).await;
        fund_wallet(&db, &customer.id, 5000).await;

        let service = db.order_service();
        let order = service.create_order(&customer.id, &[line(&dish, 1)]).await.unwrap();

        // Cancellation is reachable straight from CREATED
        let cancelled = service.update_status(&order.id, "CANCELLED").await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let err = service.update_status(&order.id, "IN_KITCHEN").await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::InvalidTransition {
                from: OrderStatus::Cancelled,
                to: OrderStatus::InKitchen,
            })
        ));
    }

    #[tokio::test]
    async fn test_update_status_unknown_order() {
        let db = setup().await;
        let err = db
            .order_service()
            .update_status("no-such-order", "IN_KITCHEN")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
