//! Order payload assembler
//!
//! Joins the order spec with its referenced customer and store into the
//! payload the commerce client sends. Validation happens here: every
//! item must resolve against the store's catalog snapshot before
//! anything goes on the wire.

use commerce_client::{Address, CreditCard, Order, OrderLine, Service};
use rust_decimal::Decimal;
use shared::{CustomerSpec, Error, OrderItem, Result, StoreSpec};

/// Build a protocol-ready order from resource state
///
/// Fails with a configuration error when an item's product id is not in
/// the store catalog; a typo'd spec should never reach the service.
/// `credit_card` and `amount` are `None` for pricing and set for
/// placement.
pub fn assemble_order(
    customer: &CustomerSpec,
    store: &StoreSpec,
    items: &[OrderItem],
    credit_card: Option<CreditCard>,
    amount: Option<Decimal>,
) -> Result<Order> {
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let known = store.products.iter().any(|p| p.id == item.product_id);
        if !known {
            return Err(Error::configuration(format!(
                "product '{}' not in store {} catalog",
                item.product_id, store.id
            )));
        }
        lines.push(OrderLine {
            code: item.product_id.clone(),
            quantity: item.quantity,
        });
    }

    Ok(Order {
        store_id: store.id.clone(),
        service: Service::Carryout,
        first_name: customer.first_name.clone(),
        last_name: customer.last_name.clone(),
        email: customer.email.clone(),
        phone: customer.phone.clone(),
        address: Address {
            street_number: customer.street_number.clone(),
            street_name: customer.street_name.clone(),
            city: customer.city.clone(),
            region: customer.region.clone(),
            postal_code: customer.postal_code.clone(),
        },
        lines,
        credit_card,
        amount,
    })
}
