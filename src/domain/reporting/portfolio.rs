//! Portfolio-wide aggregate row.

use serde::{Deserialize, Serialize};

use super::{round_to, BucketCount, DefectLeakage, LeakageCell, QualityReportRow, RatePolicy};

pub const PORTFOLIO_LABEL: &str = "All Streams";

/// Average issue counts per bucket across included projects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketAverage {
    pub p1_p2: f64,
    pub p3_p4: f64,
}

/// Totals and averages over every row of a report.
///
/// Each average is taken over the rows whose cell resolved for that metric.
/// Leakage sums numerators and denominators first and computes one rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAggregate {
    pub label: String,
    pub supported_releases_total: u64,
    pub supported_releases_average: Option<f64>,
    pub bugs_average: Option<BucketAverage>,
    pub incidents_average: Option<BucketAverage>,
    pub leakage: LeakageCell,
}

impl PortfolioAggregate {
    pub fn compute(rows: &[QualityReportRow], leakage_policy: &RatePolicy) -> Self {
        let decimals = leakage_policy.decimals;

        let releases: Vec<u64> = rows.iter().filter_map(|r| r.supported_releases).collect();
        let supported_releases_total: u64 = releases.iter().sum();
        let supported_releases_average =
            average(supported_releases_total as f64, releases.len(), decimals);

        let bugs: Vec<BucketCount> = rows.iter().filter_map(|r| r.bugs).collect();
        let incidents: Vec<BucketCount> = rows.iter().filter_map(|r| r.incidents).collect();
        let bugs_average = bucket_average(&bugs, decimals);
        let incidents_average = bucket_average(&incidents, decimals);

        let summed = rows
            .iter()
            .filter_map(|r| r.leakage)
            .fold(DefectLeakage::default(), |acc, cell| {
                DefectLeakage::new(
                    acc.numerator.saturating_add(cell.numerator),
                    acc.denominator.saturating_add(cell.denominator),
                )
            });

        Self {
            label: PORTFOLIO_LABEL.to_string(),
            supported_releases_total,
            supported_releases_average,
            bugs_average,
            incidents_average,
            leakage: LeakageCell::compute(summed, leakage_policy),
        }
    }
}

fn bucket_average(cells: &[BucketCount], decimals: u32) -> Option<BucketAverage> {
    let p1_p2: u64 = cells.iter().map(|c| c.p1_p2).sum();
    let p3_p4: u64 = cells.iter().map(|c| c.p3_p4).sum();
    Some(BucketAverage {
        p1_p2: average(p1_p2 as f64, cells.len(), decimals)?,
        p3_p4: average(p3_p4 as f64, cells.len(), decimals)?,
    })
}

fn average(sum: f64, count: usize, decimals: u32) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(round_to(sum / count as f64, decimals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ProjectId;
    use crate::domain::reporting::{RateValue, ZeroDenominatorPolicy};

    fn row(id: &str, releases: Option<u64>, leakage: Option<(u64, u64)>) -> QualityReportRow {
        let policy = RatePolicy::default();
        QualityReportRow {
            project_id: ProjectId::new(id).unwrap(),
            project_name: id.to_uppercase(),
            business_stream: "funding".to_string(),
            supported_releases: releases,
            bugs: Some(BucketCount::new(2, 5)),
            incidents: Some(BucketCount::new(1, 3)),
            leakage: leakage.map(|(n, d)| LeakageCell::compute(DefectLeakage::new(n, d), &policy)),
            regression_times: Some(Vec::new()),
        }
    }

    #[test]
    fn leakage_is_computed_on_sums_not_averaged() {
        let rows = vec![row("a", Some(1), Some((1, 100))), row("b", Some(1), Some((1, 2)))];
        let portfolio = PortfolioAggregate::compute(&rows, &RatePolicy::default());

        assert_eq!(portfolio.leakage.numerator, 2);
        assert_eq!(portfolio.leakage.denominator, 102);
        assert_eq!(portfolio.leakage.rate, RateValue::Percent(1.96));
    }

    #[test]
    fn zero_activity_projects_count_toward_averages() {
        let rows = vec![row("a", Some(4), None), row("b", Some(0), None)];
        let portfolio = PortfolioAggregate::compute(&rows, &RatePolicy::default());

        assert_eq!(portfolio.supported_releases_total, 4);
        assert_eq!(portfolio.supported_releases_average, Some(2.0));
    }

    #[test]
    fn unresolved_cells_are_left_out_of_that_average_only() {
        let mut missing_bugs = row("b", None, Some((0, 0)));
        missing_bugs.bugs = None;
        let rows = vec![row("a", Some(3), Some((0, 0))), missing_bugs];
        let portfolio = PortfolioAggregate::compute(&rows, &RatePolicy::default());

        assert_eq!(portfolio.supported_releases_average, Some(3.0));
        assert_eq!(portfolio.bugs_average, Some(BucketAverage { p1_p2: 2.0, p3_p4: 5.0 }));
        assert_eq!(portfolio.incidents_average, Some(BucketAverage { p1_p2: 1.0, p3_p4: 3.0 }));
    }

    #[test]
    fn empty_rows_have_no_averages() {
        let na = RatePolicy::new(ZeroDenominatorPolicy::NotApplicable, 2);
        let portfolio = PortfolioAggregate::compute(&[], &na);

        assert_eq!(portfolio.label, PORTFOLIO_LABEL);
        assert!(portfolio.supported_releases_average.is_none());
        assert!(portfolio.bugs_average.is_none());
        assert_eq!(portfolio.leakage.rate, RateValue::NotApplicable);
    }
}
