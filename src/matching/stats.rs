use rust_decimal::Decimal;

use crate::state::{cents_to_major, Listing};

/// Price overview of one match set. Prices in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSummary {
    pub count: usize,
    pub cheapest: i64,
    pub most_expensive: i64,
    /// Mean of the effective prices, rounded to the cent.
    pub average: i64,
}

impl MatchSummary {
    /// None for an empty set. Listings without price data count as 0.
    pub fn from_listings(listings: &[Listing]) -> Option<Self> {
        if listings.is_empty() {
            return None;
        }
        let prices: Vec<i64> = listings.iter().map(Listing::sort_price).collect();
        let total: i64 = prices.iter().sum();
        let average: i64 = (Decimal::from(total) / Decimal::from(prices.len() as i64))
            .round()
            .try_into()
            .unwrap_or(0);

        Some(Self {
            count: prices.len(),
            cheapest: prices.iter().copied().min().unwrap_or(0),
            most_expensive: prices.iter().copied().max().unwrap_or(0),
            average,
        })
    }

    pub fn average_major(&self) -> Decimal {
        cents_to_major(self.average)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty() {
        assert_eq!(MatchSummary::from_listings(&[]), None);
    }

    #[test]
    fn test_summary() {
        let listings = vec![
            Listing::new("a").with_prices(Some(500), None),
            Listing::new("b").with_prices(None, Some(800)),
            Listing::new("c").with_prices(Some(1201), Some(1500)),
        ];

        let s = MatchSummary::from_listings(&listings).unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.cheapest, 500);
        assert_eq!(s.most_expensive, 1201);
        // (500 + 800 + 1201) / 3 = 833.67
        assert_eq!(s.average, 834);
        assert_eq!(s.average_major(), dec!(8.34));
    }

    #[test]
    fn test_unpriced_counts_as_zero() {
        let listings = vec![
            Listing::new("a"),
            Listing::new("b").with_prices(Some(1000), None),
        ];
        let s = MatchSummary::from_listings(&listings).unwrap();
        assert_eq!(s.cheapest, 0);
        assert_eq!(s.average, 500);
    }
}
