//! Built-in tool implementations.

mod availability;
mod create_order;
mod create_reservation;
mod order_status;

pub use availability::CheckAvailability;
pub use create_order::CreateOrder;
pub use create_reservation::CreateReservation;
pub use order_status::CheckOrderStatus;

/// Short confirmation code spoken back to the caller. Ids are uuids so
/// eight bytes is normally a char boundary, but stay safe for arbitrary ids.
fn confirmation_code(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::confirmation_code;

    #[test]
    fn confirmation_code_truncates_uuids() {
        assert_eq!(
            confirmation_code("3f2a9c7e-1b4d-4e8a-9c31-0d5f6a7b8c9d"),
            "3f2a9c7e"
        );
    }

    #[test]
    fn confirmation_code_keeps_short_or_multibyte_ids_whole() {
        assert_eq!(confirmation_code("ord-1"), "ord-1");
        assert_eq!(confirmation_code("注文番号一二三"), "注文番号一二三");
    }
}
