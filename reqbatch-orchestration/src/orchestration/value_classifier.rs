//! # Value Classifier
//!
//! Maps a monetary amount to a named bucket and the batch size recommended
//! for it. Buckets are `(lower, upper]` ranges that partition `[0, ∞)`;
//! negative and unparsable amounts classify as zero.

use reqbatch_shared::config::{ClassificationBasis, ClassificationConfig};
use reqbatch_shared::errors::ConfigError;
use reqbatch_shared::formatting::parse_locale_decimal;
use reqbatch_shared::models::PendingRecord;
use rust_decimal::Decimal;
use serde::Serialize;

/// A value range and its batch size
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub name: String,
    /// Exclusive; zero for the first bucket
    pub lower_bound: Decimal,
    /// Inclusive; `None` for the open-ended bucket
    pub upper_bound: Option<Decimal>,
    pub batch_size: usize,
}

impl Bucket {
    /// Whether `amount` falls in this bucket. The first bucket also holds zero.
    pub fn contains(&self, amount: Decimal) -> bool {
        let above_lower = amount > self.lower_bound
            || (self.lower_bound.is_zero() && amount.is_zero());
        let below_upper = self.upper_bound.is_none_or(|upper| amount <= upper);
        above_lower && below_upper
    }
}

#[derive(Debug, Clone)]
pub struct ValueClassifier {
    basis: ClassificationBasis,
    bounded: Vec<Bucket>,
    open_ended: Bucket,
}

impl ValueClassifier {
    /// Build the classifier from a bucket table, rejecting tables with gaps or overlaps
    pub fn new(config: &ClassificationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut bounded = Vec::with_capacity(config.buckets.len());
        let mut open_ended = None;
        let mut lower = Decimal::ZERO;
        for bucket in &config.buckets {
            let upper = bucket.upper_bound.map(Decimal::from);
            let built = Bucket {
                name: bucket.name.clone(),
                lower_bound: lower,
                upper_bound: upper,
                batch_size: bucket.batch_size,
            };
            match upper {
                Some(upper) => {
                    lower = upper;
                    bounded.push(built);
                }
                None => open_ended = Some(built),
            }
        }

        let open_ended = open_ended
            .ok_or_else(|| ConfigError::invalid("bucket table has no open-ended bucket"))?;
        Ok(Self {
            basis: config.basis,
            bounded,
            open_ended,
        })
    }

    /// Classify an amount; negative amounts count as zero
    pub fn classify(&self, amount: Decimal) -> &Bucket {
        let amount = amount.max(Decimal::ZERO);
        self.bounded
            .iter()
            .find(|bucket| bucket.upper_bound.is_some_and(|upper| amount <= upper))
            .unwrap_or(&self.open_ended)
    }

    /// Classify a locale-formatted amount; unparsable text counts as zero
    pub fn classify_text(&self, raw: &str) -> &Bucket {
        self.classify(parse_locale_decimal(raw).unwrap_or(Decimal::ZERO))
    }

    /// The amount a record is classified on
    pub fn amount_of(&self, record: &PendingRecord) -> Decimal {
        let unit_price = parse_locale_decimal(&record.unit_price).unwrap_or(Decimal::ZERO);
        match self.basis {
            ClassificationBasis::UnitPrice => unit_price,
            ClassificationBasis::LineTotal => {
                let quantity = parse_locale_decimal(&record.quantity).unwrap_or(Decimal::ZERO);
                quantity.checked_mul(unit_price).unwrap_or(Decimal::MAX)
            }
        }
    }

    pub fn classify_record(&self, record: &PendingRecord) -> &Bucket {
        self.classify(self.amount_of(record))
    }

    /// All buckets in table order
    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> {
        self.bounded.iter().chain(std::iter::once(&self.open_ended))
    }

    pub fn basis(&self) -> ClassificationBasis {
        self.basis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqbatch_shared::config::BucketConfig;
    use std::str::FromStr;

    fn parse_amount(raw: &str) -> Option<Decimal> {
        Decimal::from_str(raw).ok()
    }

    fn classifier() -> ValueClassifier {
        ValueClassifier::new(&ClassificationConfig::default()).unwrap()
    }

    #[test]
    fn test_table_boundaries() {
        let classifier = classifier();
        let cases = [
            ("0", "0-1500", 10),
            ("1500", "0-1500", 10),
            ("1500.01", "1501-5000", 10),
            ("5000", "1501-5000", 10),
            ("25000", "5001-25000", 10),
            ("100000", "25001-100000", 10),
            ("100000.5", "100001-200000", 1),
            ("200000", "100001-200000", 1),
            ("200000.01", ">200000", 1),
            ("99999999", ">200000", 1),
        ];
        for (amount, name, size) in cases {
            let bucket = classifier.classify(parse_amount(amount).unwrap());
            assert_eq!(bucket.name, name, "amount {amount}");
            assert_eq!(bucket.batch_size, size, "amount {amount}");
        }
    }

    #[test]
    fn test_negative_and_unparsable_count_as_zero() {
        let classifier = classifier();
        assert_eq!(classifier.classify(Decimal::from(-250)).name, "0-1500");
        assert_eq!(classifier.classify_text("n/a").name, "0-1500");
        assert_eq!(classifier.classify_text("").name, "0-1500");
        assert_eq!(classifier.classify_text("R$ 250.000,00").name, ">200000");
    }

    #[test]
    fn test_random_amounts_fall_inside_their_bucket() {
        let classifier = classifier();
        let buckets: Vec<&Bucket> = classifier.buckets().collect();
        let mut rng = fastrand::Rng::with_seed(0x5eed_2024);

        for _ in 0..10_000 {
            let cents = rng.u64(0..50_000_000);
            let amount = Decimal::new(cents as i64, 2);
            let bucket = classifier.classify(amount);
            assert!(bucket.contains(amount), "{amount} not in {}", bucket.name);

            let holders = buckets.iter().filter(|b| b.contains(amount)).count();
            assert_eq!(holders, 1, "{amount} held by {holders} buckets");
        }
    }

    #[test]
    fn test_ranges_are_contiguous() {
        let classifier = classifier();
        let buckets: Vec<&Bucket> = classifier.buckets().collect();
        assert_eq!(buckets[0].lower_bound, Decimal::ZERO);
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].upper_bound, Some(pair[1].lower_bound));
        }
        assert!(buckets.last().unwrap().upper_bound.is_none());
        assert_eq!(buckets[4].batch_size, 1);
        assert_eq!(buckets[5].batch_size, 1);
    }

    #[test]
    fn test_line_total_basis() {
        let config = ClassificationConfig {
            basis: ClassificationBasis::LineTotal,
            ..ClassificationConfig::default()
        };
        let line_total = ValueClassifier::new(&config).unwrap();
        let record = PendingRecord::new(2, "MAT-1", "4", "1.000,00");
        assert_eq!(line_total.amount_of(&record), Decimal::from(4000));
        assert_eq!(line_total.classify_record(&record).name, "1501-5000");
        assert_eq!(classifier().classify_record(&record).name, "0-1500");
    }

    #[test]
    fn test_invalid_table_is_rejected() {
        let config = ClassificationConfig {
            basis: ClassificationBasis::UnitPrice,
            buckets: vec![
                BucketConfig::new("small", Some(100), 5),
                BucketConfig::new("large", Some(1000), 1),
            ],
        };
        assert!(ValueClassifier::new(&config).is_err());
    }
}
