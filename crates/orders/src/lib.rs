//! Orders domain: order header, lines, totals and the order status machine.

pub mod order;

pub use order::{
    Order, OrderEvent, OrderLine, OrderStatus, OrderCreated, OrderLineUpserted,
    OrderStatusAdvanced,
};
