//! Bucket table listing

use reqbatch_orchestration::{Bucket, ValueClassifier};
use reqbatch_shared::config::{ClassificationBasis, ReqbatchConfig};

use crate::output;

pub(crate) fn handle_buckets_command(config: &ReqbatchConfig) -> anyhow::Result<()> {
    let classifier = ValueClassifier::new(&config.classification)?;

    output::header("Value buckets");
    output::label("Classified on", basis_label(classifier.basis()));
    output::blank();
    for bucket in classifier.buckets() {
        output::bucket(
            &bucket.name,
            format!("{:<24} batch size {}", range_label(bucket), bucket.batch_size),
        );
    }
    Ok(())
}

fn basis_label(basis: ClassificationBasis) -> &'static str {
    match basis {
        ClassificationBasis::UnitPrice => "unit price",
        ClassificationBasis::LineTotal => "quantity x unit price",
    }
}

/// `(lower, upper]`, or `> lower` for the open-ended bucket
fn range_label(bucket: &Bucket) -> String {
    match bucket.upper_bound {
        Some(upper) if bucket.lower_bound.is_zero() => format!("0 - {upper}"),
        Some(upper) => format!("> {} - {upper}", bucket.lower_bound),
        None => format!("> {}", bucket.lower_bound),
    }
}
