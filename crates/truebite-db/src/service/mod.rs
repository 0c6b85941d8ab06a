//! # Service Module
//!
//! Transactional workflows built on the repositories. Each logical
//! operation enters exactly one transactional scope; repositories never
//! commit on their own.
//!
//! - [`order::OrderService`] - the atomic validate-price-pay-persist
//!   sequence for new orders, plus order reads and status transitions
//! - [`finance::FinanceService`] - wallets, deposits, refunds, and the
//!   transaction history

pub mod finance;
pub mod order;
