//! Sales pipeline distribution.

use chrono::NaiveDate;

use super::status::{classify_status, stage_slot, Stage};
use super::types::PipelineStage;
use crate::dates::days_between;
use crate::models::Sale;
use crate::numeric::{mean, percentage, round1, round2};

#[derive(Default)]
struct Bucket {
    count: usize,
    amount: u64,
    ages: Vec<f64>,
}

/// Distribute every sale into exactly one stage, in [`Stage::ALL`] order.
///
/// `avg_days_in_stage` is the mean age `today - sale_day` over the stage's
/// members with a parseable sale date.
pub fn pipeline(sales: &[Sale], today: NaiveDate) -> Vec<PipelineStage> {
    let mut buckets: Vec<Bucket> = Stage::ALL.iter().map(|_| Bucket::default()).collect();

    for sale in sales {
        let bucket = &mut buckets[stage_slot(classify_status(&sale.status).stage)];
        bucket.count += 1;
        bucket.amount = bucket.amount.saturating_add(sale.amount);
        if let Some(day) = sale.sale_day() {
            bucket.ages.push(days_between(day, today) as f64);
        }
    }

    let total = sales.len() as f64;
    Stage::ALL
        .iter()
        .zip(buckets)
        .map(|(stage, bucket)| PipelineStage {
            stage: *stage,
            count: bucket.count,
            total_amount: bucket.amount,
            percentage: round2(percentage(bucket.count as f64, total)),
            avg_days_in_stage: round1(mean(&bucket.ages)),
        })
        .collect()
}
