//! # truebite-core: Pure Business Logic for TrueBite
//!
//! The heart of the order-placement workflow. Everything here is a pure
//! function over plain data: pricing, the delivery status state machine,
//! and the monetary and ledger types the wallet depends on.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      TrueBite Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Routing layer (outside this workspace)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ truebite-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │   error   │  │   │
//! │  │   │  Order    │  │   Money   │  │   Quote   │  │ CoreError │  │   │
//! │  │   │  Wallet   │  │  (cents)  │  │ price_cart│  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 truebite-db (Database Layer)                    │   │
//! │  │        SQLite, wallet ledger, order creation transaction        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: pricing is deterministic - same cart, same total
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64), never floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use money::Money;
pub use pricing::{price_cart, Quote};
pub use types::*;

/// Flat delivery fee charged on every order, in cents.
pub const BASE_DELIVERY_FEE_CENTS: i64 = 500;

/// VIP discount applied to the subtotal, in basis points (500 = 5%).
pub const VIP_DISCOUNT_BPS: u32 = 500;

/// Every Nth completed order earns a VIP customer free delivery.
pub const FREE_DELIVERY_EVERY: i64 = 3;

/// Default page size for order and transaction history listings.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Largest quantity accepted on a single cart line. Anything above this
/// is a malformed request, not a plausible order.
pub const MAX_LINE_QUANTITY: i64 = 1_000;
