//! Per-executive rollup.

use std::collections::BTreeMap;

use super::period::average_amount;
use super::status::OutcomeCounts;
use super::types::ExecutiveMetrics;
use crate::mapper::DEFAULT_EXECUTIVE;
use crate::models::Sale;
use crate::numeric::{percentage, round2};

#[derive(Default)]
struct Group {
    total: usize,
    amount: u64,
    counts: OutcomeCounts,
}

/// Group sales by executive display name and rank by sale count.
///
/// Ties keep alphabetical order of the executive name.
pub fn executive_rollup(sales: &[Sale]) -> Vec<ExecutiveMetrics> {
    let mut groups: BTreeMap<&str, Group> = BTreeMap::new();
    for sale in sales {
        let key = match sale.executive.trim() {
            "" => DEFAULT_EXECUTIVE,
            name => name,
        };
        let group = groups.entry(key).or_default();
        group.total += 1;
        group.amount = group.amount.saturating_add(sale.amount);
        group.counts.add(&sale.status);
    }

    let mut rollup: Vec<ExecutiveMetrics> = groups
        .into_iter()
        .map(|(executive, group)| ExecutiveMetrics {
            rank: 0,
            executive: executive.to_string(),
            total_sales: group.total,
            total_amount: group.amount,
            average_sale: average_amount(group.amount, group.total),
            pending: group.counts.pending,
            completed: group.counts.completed,
            rejected: group.counts.rejected,
            success_rate: round2(percentage(group.counts.completed as f64, group.total as f64)),
        })
        .collect();

    // Stable sort keeps the BTreeMap's name order among equal counts.
    rollup.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
    for (i, entry) in rollup.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    rollup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::testing::sale;

    #[test]
    fn test_rollup_groups_ranks_and_counts() {
        let sales = vec![
            sale("2024-09-01", 3_000_000, "Completado", "Luis Soto (Vendedor)"),
            sale("2024-09-02", 4_000_000, "En producción", "Ana Paz (Ejecutiva)"),
            sale("2024-09-03", 2_000_000, "Entrega OK", "Ana Paz (Ejecutiva)"),
            sale("2024-09-04", 5_000_000, "Rechazado", "Ana Paz (Ejecutiva)"),
            sale("2024-09-05", 1_000_000, "Sin estado", "Luis Soto (Vendedor)"),
            sale("2024-09-06", 6_000_000, "Contrato", "Berta Díaz (Vendedor)"),
        ];

        let rollup = executive_rollup(&sales);
        assert_eq!(rollup.len(), 3);

        let ana = &rollup[0];
        assert_eq!(ana.rank, 1);
        assert_eq!(ana.executive, "Ana Paz (Ejecutiva)");
        assert_eq!(ana.total_sales, 3);
        assert_eq!(ana.total_amount, 11_000_000);
        assert_eq!(ana.average_sale, 3_666_667);
        assert_eq!((ana.pending, ana.completed, ana.rejected), (1, 1, 1));
        assert_eq!(ana.success_rate, 33.33);

        let luis = &rollup[1];
        assert_eq!(luis.rank, 2);
        assert_eq!(luis.executive, "Luis Soto (Vendedor)");
        assert_eq!((luis.pending, luis.completed, luis.rejected), (0, 1, 0));
        assert_eq!(luis.success_rate, 50.0);

        assert_eq!(rollup[2].rank, 3);
        assert_eq!(rollup[2].executive, "Berta Díaz (Vendedor)");
    }

    #[test]
    fn test_ties_are_alphabetical() {
        let sales = vec![
            sale("2024-09-01", 1, "Contrato", "Zoe"),
            sale("2024-09-01", 1, "Contrato", "Alba"),
            sale("2024-09-01", 1, "Contrato", "Mario"),
        ];
        let names: Vec<_> = executive_rollup(&sales)
            .into_iter()
            .map(|e| (e.rank, e.executive))
            .collect();
        assert_eq!(
            names,
            vec![(1, "Alba".to_string()), (2, "Mario".to_string()), (3, "Zoe".to_string())]
        );
    }

    #[test]
    fn test_blank_executive_grouped_as_unassigned() {
        let sales = vec![sale("2024-09-01", 1, "Contrato", "  "), sale("2024-09-01", 1, "Contrato", "")];
        let rollup = executive_rollup(&sales);
        assert_eq!(rollup.len(), 1);
        assert_eq!(rollup[0].executive, DEFAULT_EXECUTIVE);
        assert_eq!(rollup[0].total_sales, 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(executive_rollup(&[]).is_empty());
    }
}
