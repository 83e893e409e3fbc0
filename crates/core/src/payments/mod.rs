//! Payments module - gateway orders, callback verification and refunds.

mod payments_model;
mod payments_service;
mod payments_traits;
mod signature;

pub use payments_model::{
    CreateOrder, GatewayOrder, GatewayPayment, GatewayRefund, OrderCreated, OrderRequest,
    RefundOutcome, RefundRequest, VerifyPayment,
};
pub use payments_service::PaymentService;
pub use payments_traits::{PaymentGatewayTrait, PaymentServiceTrait};
pub use signature::{sign_payment, verify_payment_signature};
