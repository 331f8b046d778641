// Unit tests for the metrics analytics service: aggregation semantics,
// degradation rules, and ranking/tiering determinism.

use health_atlas::services::core::analysis::metrics_analytics::*;
use health_atlas::types::HealthEventRecord;

fn record(lga: Option<&str>, facility: &str, period: &str, cases: f64) -> HealthEventRecord {
    HealthEventRecord {
        facility_id: None,
        facility_name: facility.to_string(),
        lga_name: lga.map(String::from),
        ward_name: None,
        period: period.to_string(),
        case_count: cases,
        population: None,
    }
}

fn record_with_population(
    lga: &str,
    facility: &str,
    period: &str,
    cases: f64,
    population: f64,
) -> HealthEventRecord {
    HealthEventRecord {
        population: Some(population),
        ..record(Some(lga), facility, period, cases)
    }
}

#[test]
fn test_empty_input_yields_empty_derivations() {
    let summary = compute_analytics(&[]);

    assert!(summary.yearly_totals.is_empty());
    assert!(summary.lga_year_series.is_empty());
    assert!(summary.seasonality.is_empty());
    assert!(summary.lga_rankings.is_empty());
    assert!(summary.facility_outliers.is_empty());
    assert!(summary.underserved_lgas.is_empty());
    assert!(summary.priority_lgas.is_empty());
}

#[test]
fn test_yearly_totals_combine_periods_of_the_same_year() {
    let records = vec![
        record(Some("Ikeja"), "PHC A", "202301", 5.0),
        record(Some("Ikeja"), "PHC B", "202301", 3.0),
    ];
    let summary = compute_analytics(&records);

    assert_eq!(summary.yearly_totals.len(), 1);
    assert_eq!(summary.yearly_totals[0].year, 2023);
    assert_eq!(summary.yearly_totals[0].total_cases, 8.0);
}

#[test]
fn test_malformed_period_excluded_from_time_axes_but_not_lga_totals() {
    let records = vec![
        record(Some("Ikeja"), "PHC A", "20", 5.0),
        record(Some("Ikeja"), "PHC A", "202301", 3.0),
    ];
    let summary = compute_analytics(&records);

    // Time-keyed tables only see the well-formed record.
    assert_eq!(summary.yearly_totals.len(), 1);
    assert_eq!(summary.yearly_totals[0].total_cases, 3.0);
    assert_eq!(summary.lga_year_series[0].points[0].total_cases, 3.0);

    // LGA-keyed tables do not require a period and count both.
    assert_eq!(summary.lga_rankings.len(), 1);
    assert_eq!(summary.lga_rankings[0].total_cases, 8.0);
}

#[test]
fn test_seasonality_has_no_nan_months() {
    let records = vec![
        record(Some("Ikeja"), "PHC A", "202306", 12.0),
        record(Some("Ikeja"), "PHC A", "202406", 6.0),
    ];
    let summary = compute_analytics(&records);

    assert_eq!(summary.seasonality.len(), 12);
    let june = &summary.seasonality[5];
    assert_eq!(june.month, 6);
    assert_eq!(june.average_cases, 9.0);
    for point in summary.seasonality.iter().filter(|p| p.month != 6) {
        assert_eq!(point.average_cases, 0.0);
        assert!(!point.average_cases.is_nan());
    }
}

#[test]
fn test_lga_series_align_to_the_global_year_axis() {
    let records = vec![
        record(Some("Ikeja"), "PHC A", "202201", 4.0),
        record(Some("Epe"), "PHC B", "202301", 6.0),
        // A record with no LGA still widens the global axis.
        record(None, "PHC C", "202101", 1.0),
    ];
    let summary = compute_analytics(&records);

    let years: Vec<i32> = summary.yearly_totals.iter().map(|p| p.year).collect();
    assert_eq!(years, vec![2021, 2022, 2023]);

    for series in &summary.lga_year_series {
        let series_years: Vec<i32> = series.points.iter().map(|p| p.year).collect();
        assert_eq!(series_years, years);
    }
    let ikeja = &summary.lga_year_series[0];
    assert_eq!(ikeja.lga, "Ikeja");
    assert_eq!(
        ikeja.points.iter().map(|p| p.total_cases).collect::<Vec<_>>(),
        vec![0.0, 4.0, 0.0]
    );
}

#[test]
fn test_outlier_detection_flags_only_extreme_facilities() {
    // Mean 32.5, population std dev ~38.97: z ~1.73 stays unflagged.
    let borderline = vec![
        record(Some("Epe"), "PHC A", "202301", 10.0),
        record(Some("Epe"), "PHC B", "202301", 10.0),
        record(Some("Epe"), "PHC C", "202301", 10.0),
        record(Some("Epe"), "PHC D", "202301", 100.0),
    ];
    assert!(compute_analytics(&borderline).facility_outliers.is_empty());

    let mut extreme: Vec<HealthEventRecord> = (0..5)
        .map(|i| record(Some("Ikeja"), &format!("PHC {}", i), "202301", 10.0))
        .collect();
    extreme.push(record(Some("Ikeja"), "General Hospital", "202301", 200.0));

    let outliers = compute_analytics(&extreme).facility_outliers;
    assert_eq!(outliers.len(), 1);
    assert_eq!(outliers[0].facility_name, "General Hospital");
    assert_eq!(outliers[0].lga, "Ikeja");
    assert_eq!(outliers[0].kind, OutlierKind::High);
    assert!(outliers[0].z_score >= 2.0);
}

#[test]
fn test_lgas_with_fewer_than_three_facilities_never_flag_outliers() {
    let records = vec![
        record(Some("Badagry"), "PHC A", "202301", 1.0),
        record(Some("Badagry"), "PHC B", "202301", 10000.0),
    ];
    assert!(compute_analytics(&records).facility_outliers.is_empty());
}

#[test]
fn test_population_zero_means_unknown_incidence() {
    let records = vec![record_with_population("Ikeja", "PHC A", "202301", 5.0, 0.0)];
    let summary = compute_analytics(&records);

    let ranking = &summary.lga_rankings[0];
    assert_eq!(ranking.incidence_per_1000, None);
    // Unknown population also keeps the LGA out of coverage scoring.
    assert!(summary.underserved_lgas.is_empty());
    assert!(summary.priority_lgas.is_empty());
}

#[test]
fn test_priority_tiers_follow_rank_positions() {
    // 14 qualifying LGAs with strictly decreasing burden and identical
    // populations, so priority order matches case totals.
    let records: Vec<HealthEventRecord> = (0..14)
        .map(|i| {
            record_with_population(
                &format!("LGA {:02}", i),
                &format!("PHC {:02}", i),
                "202301",
                1400.0 - 100.0 * i as f64,
                10000.0,
            )
        })
        .collect();
    let priorities = compute_analytics(&records).priority_lgas;

    assert_eq!(priorities.len(), 14);
    for (rank, priority) in priorities.iter().enumerate() {
        assert_eq!(priority.lga, format!("LGA {:02}", rank));
        let expected = match rank {
            0..=2 => PriorityTier::Urgent,
            3..=6 => PriorityTier::High,
            7..=11 => PriorityTier::Medium,
            _ => PriorityTier::Monitor,
        };
        assert_eq!(priority.tier, expected, "rank {}", rank);
    }
    assert_eq!(priorities[0].tier.label(), "Tier 1 (urgent)");
    assert_eq!(priorities[13].tier.label(), "Monitor");
}

#[test]
fn test_compute_is_idempotent_over_the_same_input() {
    let records = vec![
        record_with_population("Ikeja", "PHC A", "202301", 25.0, 45000.0),
        record_with_population("Epe", "PHC B", "202302", 13.0, 12000.0),
        record(Some("Badagry"), "PHC C", "20", 7.0),
        record(None, "PHC D", "202301", 2.0),
    ];
    let first = compute_analytics(&records);
    let second = compute_analytics(&records);

    assert_eq!(first, second);
}

#[test]
fn test_ranking_ties_keep_first_encountered_order() {
    let records = vec![
        record(Some("Gamma"), "PHC G", "202301", 10.0),
        record(Some("Alpha"), "PHC A", "202301", 5.0),
        record(Some("Beta"), "PHC B", "202301", 5.0),
    ];
    let rankings = compute_analytics(&records).lga_rankings;

    let order: Vec<&str> = rankings.iter().map(|r| r.lga.as_str()).collect();
    assert_eq!(order, vec!["Gamma", "Alpha", "Beta"]);
}

#[test]
fn test_underserved_score_prefers_high_burden_low_coverage() {
    let records = vec![
        // Same burden and population; Epe has a tenth of the coverage.
        record_with_population("Ikeja", "PHC 1", "202301", 100.0, 10000.0),
        record_with_population("Ikeja", "PHC 2", "202301", 0.0, 10000.0),
        record_with_population("Ikeja", "PHC 3", "202301", 0.0, 10000.0),
        record_with_population("Ikeja", "PHC 4", "202301", 0.0, 10000.0),
        record_with_population("Ikeja", "PHC 5", "202301", 0.0, 10000.0),
        record_with_population("Epe", "PHC 6", "202301", 100.0, 10000.0),
    ];
    let underserved = compute_analytics(&records).underserved_lgas;

    assert_eq!(underserved.len(), 2);
    assert_eq!(underserved[0].lga, "Epe");
    assert_eq!(underserved[0].facility_count, 1);
    assert!(underserved[0].underserved_score > underserved[1].underserved_score);
}
