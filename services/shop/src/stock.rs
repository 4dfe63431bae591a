//! Stock admission rule for purchases
//!
//! A purchase may only be admitted while it fits within the remaining
//! `quantity_limit` of the cloth's primary storage. This module holds the
//! decision itself; the buy repository applies the same rule again inside
//! the database transaction as a guarded conditional update, so two
//! concurrent purchases can never both be admitted against the same
//! remaining units.

/// Outcome of applying the admission rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecision {
    /// The request fits; `remaining` is the quantity left afterwards
    Admitted { remaining: i32 },
    /// The request exceeds the remaining quantity (or asks for < 1 unit)
    Rejected,
}

/// Decide whether `requested` units can be taken from `quantity_limit`
pub fn decide(quantity_limit: i32, requested: i32) -> StockDecision {
    if requested < 1 || requested > quantity_limit {
        return StockDecision::Rejected;
    }

    StockDecision::Admitted {
        remaining: quantity_limit - requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[test]
    fn test_admits_within_limit() {
        assert_eq!(decide(5, 3), StockDecision::Admitted { remaining: 2 });
        assert_eq!(decide(5, 5), StockDecision::Admitted { remaining: 0 });
        assert_eq!(decide(1, 1), StockDecision::Admitted { remaining: 0 });
    }

    #[test]
    fn test_rejects_beyond_limit() {
        assert_eq!(decide(5, 6), StockDecision::Rejected);
        assert_eq!(decide(0, 1), StockDecision::Rejected);
        assert_eq!(decide(2, 3), StockDecision::Rejected);
    }

    #[test]
    fn test_rejects_non_positive_requests() {
        assert_eq!(decide(5, 0), StockDecision::Rejected);
        assert_eq!(decide(5, -1), StockDecision::Rejected);
    }

    #[test]
    fn test_example_sequence() {
        // quantity_limit = 5; a purchase of 3 succeeds leaving 2; a second
        // purchase of 3 must be rejected with the limit unchanged.
        let limit = 5;
        let StockDecision::Admitted { remaining } = decide(limit, 3) else {
            panic!("first purchase should be admitted");
        };
        assert_eq!(remaining, 2);
        assert_eq!(decide(remaining, 3), StockDecision::Rejected);
    }

    /// Concurrent submissions racing for the same stock must never admit
    /// more units in total than were available.
    #[tokio::test]
    async fn test_concurrent_reservations_never_oversell() {
        let stock = Arc::new(Mutex::new(5i32));
        let mut handles = Vec::new();

        for _ in 0..20 {
            let stock = Arc::clone(&stock);
            handles.push(tokio::spawn(async move {
                // Decision and decrement under one lock, mirroring the
                // repository's guarded UPDATE.
                let mut remaining = stock.lock().await;
                match decide(*remaining, 2) {
                    StockDecision::Admitted { remaining: left } => {
                        *remaining = left;
                        true
                    }
                    StockDecision::Rejected => false,
                }
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }

        // Only two purchases of 2 fit into 5 units.
        assert_eq!(admitted, 2);
        assert_eq!(*stock.lock().await, 1);
    }
}
