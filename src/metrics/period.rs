//! Period KPIs.

use chrono::NaiveDate;

use super::status::OutcomeCounts;
use super::types::PeriodMetrics;
use crate::dates::days_between;
use crate::models::Sale;
use crate::numeric::{mean, percentage, round1, round2, saturating_total};

/// Sales whose calendar day falls in `[start, end]`. Undated sales never match.
pub fn sales_in_window(sales: &[Sale], start: NaiveDate, end: NaiveDate) -> Vec<&Sale> {
    sales
        .iter()
        .filter(|sale| {
            sale.sale_day()
                .map(|day| day >= start && day <= end)
                .unwrap_or(false)
        })
        .collect()
}

/// Inclusive day count of the window, never less than 1.
pub fn days_in_window(start: NaiveDate, end: NaiveDate) -> i64 {
    (days_between(start, end) + 1).max(1)
}

/// Compute KPIs for the sales dated within `[start, end]`.
pub fn period_metrics(
    sales: &[Sale],
    start: NaiveDate,
    end: NaiveDate,
    daily_quota: u32,
) -> PeriodMetrics {
    let in_window = sales_in_window(sales, start, end);
    let total = in_window.len();
    let total_amount = saturating_total(in_window.iter().map(|s| s.amount));
    let counts = OutcomeCounts::tally(in_window.iter().copied());

    let resolution_days: Vec<f64> = in_window
        .iter()
        .filter_map(|sale| {
            let sold = sale.sale_day()?;
            let delivered = sale.delivery_day()?;
            Some(days_between(sold, delivered) as f64)
        })
        .collect();

    let days = days_in_window(start, end);
    let quota_target = u64::from(daily_quota) * days as u64;

    PeriodMetrics {
        start,
        end,
        total_sales: total,
        total_amount,
        average_sale: average_amount(total_amount, total),
        pending: counts.pending,
        completed: counts.completed,
        rejected: counts.rejected,
        conversion_rate: round2(percentage(counts.completed as f64, total as f64)),
        avg_resolution_days: round1(mean(&resolution_days)),
        sales_per_day: round2(total as f64 / days as f64),
        days_in_window: days,
        quota_target,
        quota_met: total as u64 >= quota_target,
        quota_pct: round1(percentage(total as f64, quota_target as f64)),
    }
}

/// `amount / count` rounded to the nearest peso, 0 for no sales.
pub(crate) fn average_amount(amount: u64, count: usize) -> u64 {
    if count == 0 {
        0
    } else {
        (amount as f64 / count as f64).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::testing::{day, sale};

    fn september_sales() -> Vec<Sale> {
        vec![
            sale("2024-09-01 10:00:00", 85_000_000, "Completado", "Ana"),
            sale("2024-09-02 11:30:00", 62_000_000, "En producción", "Ana"),
            sale("2024-09-03 09:15:00", 95_000_000, "Rechazado", "Luis"),
        ]
    }

    #[test]
    fn test_three_sale_example() {
        let metrics = period_metrics(&september_sales(), day(2024, 9, 1), day(2024, 9, 3), 5);

        assert_eq!(metrics.total_sales, 3);
        assert_eq!(metrics.total_amount, 242_000_000);
        assert_eq!(metrics.average_sale, 80_666_667);
        assert_eq!(metrics.completed, 1);
        assert_eq!(metrics.pending, 1);
        assert_eq!(metrics.rejected, 1);
        assert_eq!(metrics.conversion_rate, 33.33);
        assert_eq!(metrics.days_in_window, 3);
        assert_eq!(metrics.sales_per_day, 1.0);
        assert_eq!(metrics.quota_target, 15);
        assert!(!metrics.quota_met);
        assert_eq!(metrics.quota_pct, 20.0);
    }

    #[test]
    fn test_window_is_inclusive_and_filters() {
        let mut sales = september_sales();
        sales.push(sale("2024-08-31 23:59:59", 10_000_000, "Completado", "Ana"));
        sales.push(sale("2024-09-04 00:00:00", 10_000_000, "Completado", "Ana"));
        sales.push(sale("sin fecha", 10_000_000, "Completado", "Ana"));

        let metrics = period_metrics(&sales, day(2024, 9, 1), day(2024, 9, 3), 5);
        assert_eq!(metrics.total_sales, 3);
        assert_eq!(metrics.total_amount, 242_000_000);
    }

    #[test]
    fn test_empty_window_is_all_zero() {
        let metrics = period_metrics(&september_sales(), day(2025, 1, 1), day(2025, 1, 31), 5);
        assert_eq!(metrics.total_sales, 0);
        assert_eq!(metrics.total_amount, 0);
        assert_eq!(metrics.average_sale, 0);
        assert_eq!(metrics.conversion_rate, 0.0);
        assert_eq!(metrics.avg_resolution_days, 0.0);
        assert_eq!(metrics.days_in_window, 31);
        assert_eq!(metrics.quota_target, 155);
    }

    #[test]
    fn test_resolution_time_uses_only_scheduled_deliveries() {
        let mut sales = september_sales();
        sales[0].delivery_date = "2024-09-11".into();
        sales[1].delivery_date = "2024-09-22 12:00:00".into();
        // sales[2] keeps "Por definir"

        let metrics = period_metrics(&sales, day(2024, 9, 1), day(2024, 9, 3), 5);
        // (10 + 20) / 2
        assert_eq!(metrics.avg_resolution_days, 15.0);
    }

    #[test]
    fn test_quota_met_and_single_day_window() {
        let sales: Vec<Sale> = (0..6)
            .map(|i| sale("2024-09-02 10:00:00", 1_000_000 + i, "Contrato", "Ana"))
            .collect();
        let metrics = period_metrics(&sales, day(2024, 9, 2), day(2024, 9, 2), 5);
        assert_eq!(metrics.days_in_window, 1);
        assert!(metrics.quota_met);
        assert_eq!(metrics.quota_pct, 120.0);
    }

    #[test]
    fn test_inverted_window_counts_as_one_day() {
        let metrics = period_metrics(&september_sales(), day(2024, 9, 3), day(2024, 9, 1), 5);
        assert_eq!(metrics.days_in_window, 1);
        assert_eq!(metrics.total_sales, 0);
    }

    #[test]
    fn test_totals_match_filtered_set_for_many_windows() {
        let sales: Vec<Sale> = (1..=28)
            .map(|d| {
                sale(
                    &format!("2024-02-{:02} 12:00:00", d),
                    (d as u64) * 1_250_000,
                    "Contrato",
                    "Ana",
                )
            })
            .collect();

        for start in 1..=28u32 {
            for end in start..=28u32 {
                let metrics = period_metrics(&sales, day(2024, 2, start), day(2024, 2, end), 5);
                let expected_total = (end - start + 1) as usize;
                let expected_amount: u64 = (start..=end).map(|d| d as u64 * 1_250_000).sum();
                assert_eq!(metrics.total_sales, expected_total);
                assert_eq!(metrics.total_amount, expected_amount);
                assert_eq!(
                    metrics.average_sale,
                    (expected_amount as f64 / expected_total as f64).round() as u64
                );
            }
        }
    }
}
