use tracing::{info, instrument};

use crate::domain::{Order, OrderType};
use crate::projection::{KeyValueStore, OrderOverview, ProjectionCache, ReceiptData};

use super::{OrderSource, SyncError};

/// Turn the stored cart into an order.
///
/// The store has to answer first: only then are the receipt and overview
/// written, the projection updated and the cart cleared. A rejected order
/// leaves the cart as it was.
#[instrument(skip(source, cache))]
pub async fn checkout<Src, S>(
    source: &Src,
    cache: &ProjectionCache<S>,
    order_type: OrderType,
    payment_method: Option<String>,
) -> Result<Order, SyncError>
where
    Src: OrderSource,
    S: KeyValueStore,
{
    let cart = cache.cart();
    if cart.is_empty() {
        return Err(SyncError::EmptyCart);
    }

    let order = source.create_order(&cart.to_draft(order_type, payment_method)).await?;

    cache.save_checkout(&ReceiptData::from(&order), &OrderOverview::from(&order))?;
    cache.apply_confirmed(&order)?;
    cache.clear_cart();

    info!(
        order_number = %order.order_number,
        priority = order.priority_number,
        "Checkout complete"
    );
    Ok(order)
}
