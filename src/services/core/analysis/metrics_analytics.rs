use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::types::HealthEventRecord;
use crate::utils::logger::Logger;
use crate::utils::time::{period_month, period_year};
use crate::utils::{AtlasError, AtlasResult};

// ============= DERIVED TABLES =============

/// Case total for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearPoint {
    pub year: i32,
    pub total_cases: f64,
}

/// Per-LGA case totals aligned to the global year axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LgaYearSeries {
    pub lga: String,
    pub points: Vec<YearPoint>,
}

/// Average case load for one calendar month across all years combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityPoint {
    /// Calendar month, 1-12.
    pub month: u32,
    pub average_cases: f64,
}

/// Burden and incidence summary for one LGA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LgaRanking {
    pub lga: String,
    pub total_cases: f64,
    pub facility_count: usize,
    /// First usable population value seen for this LGA; `None` when unknown.
    pub population: Option<f64>,
    /// Cases per 1,000 population; `None` when the population is unknown,
    /// which is not the same thing as an incidence of zero.
    pub incidence_per_1000: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierKind {
    High,
    Low,
}

/// A facility whose caseload deviates from its LGA peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierFacility {
    pub facility_id: String,
    pub facility_name: String,
    pub lga: String,
    pub total_cases: f64,
    pub z_score: f64,
    pub kind: OutlierKind,
}

/// Burden-to-coverage ratio for one LGA with a known population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderservedLgaScore {
    pub lga: String,
    pub population: f64,
    pub facility_count: usize,
    pub facilities_per_10k: f64,
    pub incidence_per_1000: Option<f64>,
    pub total_cases: f64,
    pub underserved_score: f64,
}

/// Intervention tier, assigned by rank position rather than score cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Urgent,
    High,
    Medium,
    Monitor,
}

impl PriorityTier {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            0..=2 => PriorityTier::Urgent,
            3..=6 => PriorityTier::High,
            7..=11 => PriorityTier::Medium,
            _ => PriorityTier::Monitor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriorityTier::Urgent => "Tier 1 (urgent)",
            PriorityTier::High => "Tier 2 (high)",
            PriorityTier::Medium => "Tier 3 (medium)",
            PriorityTier::Monitor => "Monitor",
        }
    }
}

impl std::fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Weighted composite score ranking LGAs for intervention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityLgaScore {
    pub lga: String,
    pub total_cases: f64,
    pub incidence_per_1000: f64,
    pub facilities_per_10k: f64,
    pub priority_score: f64,
    pub tier: PriorityTier,
}

/// Everything the dashboards consume, derived in one pass over the records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub yearly_totals: Vec<YearPoint>,
    pub lga_year_series: Vec<LgaYearSeries>,
    pub seasonality: Vec<SeasonalityPoint>,
    pub lga_rankings: Vec<LgaRanking>,
    pub facility_outliers: Vec<OutlierFacility>,
    pub underserved_lgas: Vec<UnderservedLgaScore>,
    pub priority_lgas: Vec<PriorityLgaScore>,
}

// ============= STATISTICAL FOUNDATION =============

/// Mathematical utility functions shared by the analytics derivations
pub struct StatUtils;

impl StatUtils {
    /// Arithmetic mean of a sample
    pub fn mean(values: &[f64]) -> AtlasResult<f64> {
        if values.is_empty() {
            return Err(AtlasError::validation_error("No values provided"));
        }
        Ok(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Population standard deviation (divides by N, not N-1)
    pub fn population_std_dev(values: &[f64]) -> AtlasResult<f64> {
        let mean = Self::mean(values)?;
        let variance =
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;
        Ok(variance.sqrt())
    }
}

// ============= ANALYTICS SERVICE =============

/// Thresholds and weights for the analytics derivations.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Absolute z-score at which a facility is flagged.
    pub outlier_z_threshold: f64,
    /// LGAs with fewer distinct facilities than this are skipped for
    /// outlier detection; z-scores are not stable on tiny peer groups.
    pub min_facilities_for_outliers: usize,
    /// Keeps the priority ratio finite when an LGA has zero coverage.
    pub coverage_epsilon: f64,
    pub burden_weight: f64,
    pub incidence_weight: f64,
    pub underserved_weight: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            outlier_z_threshold: 2.0,
            min_facilities_for_outliers: 3,
            coverage_epsilon: 0.01,
            burden_weight: 0.4,
            incidence_weight: 0.3,
            underserved_weight: 0.3,
        }
    }
}

/// Derives the dashboard aggregates from raw facility-period records.
///
/// Pure and synchronous: every call recomputes the full summary from the
/// input slice alone, so repeated calls over the same data are deep-equal.
#[derive(Debug, Clone)]
pub struct MetricsAnalyticsService {
    config: AnalyticsConfig,
    logger: Logger,
}

/// Computes the full analytics summary with the default configuration.
pub fn compute_analytics(records: &[HealthEventRecord]) -> AnalyticsSummary {
    MetricsAnalyticsService::new(
        AnalyticsConfig::default(),
        crate::utils::logger::logger().clone(),
    )
    .compute(records)
}

impl MetricsAnalyticsService {
    pub fn new(config: AnalyticsConfig, logger: Logger) -> Self {
        Self { config, logger }
    }

    /// Runs every derivation over the records and bundles the results.
    pub fn compute(&self, records: &[HealthEventRecord]) -> AnalyticsSummary {
        let yearly_totals = self.yearly_totals(records);
        let lga_year_series = self.lga_year_series(records, &yearly_totals);
        let seasonality = self.seasonality(records);
        let lga_rankings = self.lga_rankings(records);
        let facility_outliers = self.facility_outliers(records);
        let underserved_lgas = self.underserved_scores(&lga_rankings);
        let priority_lgas = self.priority_scores(&lga_rankings);

        self.logger.debug(&format!(
            "Computed analytics over {} records: {} years, {} LGAs, {} outliers",
            records.len(),
            yearly_totals.len(),
            lga_rankings.len(),
            facility_outliers.len()
        ));

        AnalyticsSummary {
            yearly_totals,
            lga_year_series,
            seasonality,
            lga_rankings,
            facility_outliers,
            underserved_lgas,
            priority_lgas,
        }
    }

    /// Case totals per distinct valid year, ascending. Years absent from the
    /// data are not filled in.
    fn yearly_totals(&self, records: &[HealthEventRecord]) -> Vec<YearPoint> {
        let mut totals: HashMap<i32, f64> = HashMap::new();
        for record in records {
            if let Some(year) = period_year(&record.period) {
                *totals.entry(year).or_insert(0.0) += record.case_count;
            }
        }

        let mut points: Vec<YearPoint> = totals
            .into_iter()
            .map(|(year, total_cases)| YearPoint { year, total_cases })
            .collect();
        points.sort_by_key(|point| point.year);
        points
    }

    /// Per-LGA totals over the global year axis; an LGA contributes 0 for
    /// years it has no data, rather than omitting the year.
    fn lga_year_series(
        &self,
        records: &[HealthEventRecord],
        year_axis: &[YearPoint],
    ) -> Vec<LgaYearSeries> {
        let mut order: Vec<String> = Vec::new();
        let mut totals: HashMap<String, HashMap<i32, f64>> = HashMap::new();

        for record in records {
            let Some(lga) = record.lga_name.as_deref() else {
                continue;
            };
            let Some(year) = period_year(&record.period) else {
                continue;
            };
            if !totals.contains_key(lga) {
                order.push(lga.to_string());
            }
            *totals
                .entry(lga.to_string())
                .or_default()
                .entry(year)
                .or_insert(0.0) += record.case_count;
        }

        order
            .into_iter()
            .map(|lga| {
                let by_year = &totals[&lga];
                let points = year_axis
                    .iter()
                    .map(|axis_point| YearPoint {
                        year: axis_point.year,
                        total_cases: by_year.get(&axis_point.year).copied().unwrap_or(0.0),
                    })
                    .collect();
                LgaYearSeries { lga, points }
            })
            .collect()
    }

    /// Average cases per calendar month across all years and LGAs combined.
    /// The average divides by contributing record count, not by years.
    /// Non-empty input always yields all 12 months; empty input yields
    /// nothing, like every other derivation.
    fn seasonality(&self, records: &[HealthEventRecord]) -> Vec<SeasonalityPoint> {
        if records.is_empty() {
            return Vec::new();
        }

        let mut sums = [0.0f64; 12];
        let mut counts = [0u32; 12];

        for record in records {
            if let Some(month) = period_month(&record.period) {
                let slot = (month - 1) as usize;
                sums[slot] += record.case_count;
                counts[slot] += 1;
            }
        }

        (1..=12)
            .map(|month| {
                let slot = (month - 1) as usize;
                let average_cases = if counts[slot] > 0 {
                    sums[slot] / counts[slot] as f64
                } else {
                    0.0
                };
                SeasonalityPoint {
                    month,
                    average_cases,
                }
            })
            .collect()
    }

    /// Burden and incidence per LGA, sorted descending by total cases.
    /// Records with malformed periods still count here; only the LGA field
    /// is required.
    fn lga_rankings(&self, records: &[HealthEventRecord]) -> Vec<LgaRanking> {
        struct LgaAccum {
            total_cases: f64,
            facilities: HashSet<String>,
            population: Option<f64>,
        }

        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, LgaAccum> = HashMap::new();

        for record in records {
            let Some(lga) = record.lga_name.as_deref() else {
                continue;
            };
            if !groups.contains_key(lga) {
                order.push(lga.to_string());
            }
            let accum = groups.entry(lga.to_string()).or_insert_with(|| LgaAccum {
                total_cases: 0.0,
                facilities: HashSet::new(),
                population: None,
            });

            accum.total_cases += record.case_count;
            if let Some(key) = record.facility_key() {
                accum.facilities.insert(key.to_string());
            }
            // First non-null, non-zero population wins; later values for the
            // same LGA are ignored.
            if accum.population.is_none() {
                if let Some(population) = record.population {
                    if population.is_finite() && population != 0.0 {
                        accum.population = Some(population);
                    }
                }
            }
        }

        let mut rankings: Vec<LgaRanking> = order
            .into_iter()
            .map(|lga| {
                let accum = &groups[&lga];
                let incidence_per_1000 = match accum.population {
                    Some(population) if population > 0.0 => {
                        Some(accum.total_cases / population * 1000.0)
                    }
                    _ => None,
                };
                LgaRanking {
                    lga,
                    total_cases: accum.total_cases,
                    facility_count: accum.facilities.len(),
                    population: accum.population,
                    incidence_per_1000,
                }
            })
            .collect();

        // Stable sort keeps first-encountered order for equal totals.
        rankings.sort_by(|a, b| {
            b.total_cases
                .partial_cmp(&a.total_cases)
                .unwrap_or(Ordering::Equal)
        });
        rankings
    }

    /// Facilities whose caseload deviates from their LGA peer group by at
    /// least the configured z-score.
    ///
    /// Z-scores are computed within each LGA rather than globally, so that
    /// LGA-level burden differences do not drown out facility anomalies.
    fn facility_outliers(&self, records: &[HealthEventRecord]) -> Vec<OutlierFacility> {
        struct FacilityAccum {
            facility_id: String,
            facility_name: String,
            total_cases: f64,
        }

        let mut lga_order: Vec<String> = Vec::new();
        let mut facility_order: HashMap<String, Vec<String>> = HashMap::new();
        let mut groups: HashMap<String, HashMap<String, FacilityAccum>> = HashMap::new();

        for record in records {
            let Some(lga) = record.lga_name.as_deref() else {
                continue;
            };
            let Some(key) = record.facility_key() else {
                continue;
            };
            if !groups.contains_key(lga) {
                lga_order.push(lga.to_string());
            }
            let facilities = groups.entry(lga.to_string()).or_default();
            if !facilities.contains_key(key) {
                facility_order
                    .entry(lga.to_string())
                    .or_default()
                    .push(key.to_string());
            }
            let accum = facilities
                .entry(key.to_string())
                .or_insert_with(|| FacilityAccum {
                    facility_id: key.to_string(),
                    facility_name: record.facility_name.clone(),
                    total_cases: 0.0,
                });
            accum.total_cases += record.case_count;
        }

        let mut outliers: Vec<OutlierFacility> = Vec::new();
        for lga in &lga_order {
            let facilities = &groups[lga];
            if facilities.len() < self.config.min_facilities_for_outliers {
                continue;
            }

            let keys = &facility_order[lga];
            let totals: Vec<f64> = keys.iter().map(|k| facilities[k].total_cases).collect();
            let (Ok(mean), Ok(std_dev)) = (
                StatUtils::mean(&totals),
                StatUtils::population_std_dev(&totals),
            ) else {
                continue;
            };
            if std_dev == 0.0 {
                // All facilities identical; nothing to flag.
                continue;
            }

            for key in keys {
                let facility = &facilities[key];
                let z_score = (facility.total_cases - mean) / std_dev;
                if z_score.abs() >= self.config.outlier_z_threshold {
                    outliers.push(OutlierFacility {
                        facility_id: facility.facility_id.clone(),
                        facility_name: facility.facility_name.clone(),
                        lga: lga.clone(),
                        total_cases: facility.total_cases,
                        z_score,
                        kind: if z_score > 0.0 {
                            OutlierKind::High
                        } else {
                            OutlierKind::Low
                        },
                    });
                }
            }
        }

        outliers.sort_by(|a, b| {
            b.z_score
                .abs()
                .partial_cmp(&a.z_score.abs())
                .unwrap_or(Ordering::Equal)
        });
        outliers
    }

    /// Burden-to-coverage scores for LGAs with a known positive population,
    /// highest need first.
    fn underserved_scores(&self, rankings: &[LgaRanking]) -> Vec<UnderservedLgaScore> {
        let mut scores: Vec<UnderservedLgaScore> = rankings
            .iter()
            .filter_map(|ranking| {
                let population = ranking.population.filter(|p| *p > 0.0)?;
                let facilities_per_10k = ranking.facility_count as f64 / population * 10000.0;
                let underserved_score = match ranking.incidence_per_1000 {
                    Some(incidence) if facilities_per_10k > 0.0 => incidence / facilities_per_10k,
                    _ => 0.0,
                };
                Some(UnderservedLgaScore {
                    lga: ranking.lga.clone(),
                    population,
                    facility_count: ranking.facility_count,
                    facilities_per_10k,
                    incidence_per_1000: ranking.incidence_per_1000,
                    total_cases: ranking.total_cases,
                    underserved_score,
                })
            })
            .collect();

        scores.sort_by(|a, b| {
            b.underserved_score
                .partial_cmp(&a.underserved_score)
                .unwrap_or(Ordering::Equal)
        });
        scores
    }

    /// Composite priority scores and rank-position tiers for LGAs with both
    /// a known population and a known incidence.
    fn priority_scores(&self, rankings: &[LgaRanking]) -> Vec<PriorityLgaScore> {
        struct Candidate {
            lga: String,
            total_cases: f64,
            incidence_per_1000: f64,
            facilities_per_10k: f64,
            underserved_raw: f64,
        }

        let candidates: Vec<Candidate> = rankings
            .iter()
            .filter_map(|ranking| {
                let population = ranking.population.filter(|p| *p > 0.0)?;
                let incidence = ranking.incidence_per_1000?;
                let facilities_per_10k = ranking.facility_count as f64 / population * 10000.0;
                let underserved_raw =
                    incidence / (facilities_per_10k + self.config.coverage_epsilon);
                Some(Candidate {
                    lga: ranking.lga.clone(),
                    total_cases: ranking.total_cases,
                    incidence_per_1000: incidence,
                    facilities_per_10k,
                    underserved_raw,
                })
            })
            .collect();

        // Components normalize against the maxima of the qualifying set; a
        // zero maximum zeroes the component instead of dividing by it.
        let max_total = candidates.iter().fold(0.0f64, |m, c| m.max(c.total_cases));
        let max_incidence = candidates
            .iter()
            .fold(0.0f64, |m, c| m.max(c.incidence_per_1000));
        let max_underserved = candidates
            .iter()
            .fold(0.0f64, |m, c| m.max(c.underserved_raw));
        let normalize = |value: f64, max: f64| if max > 0.0 { value / max * 100.0 } else { 0.0 };

        let mut scores: Vec<PriorityLgaScore> = candidates
            .into_iter()
            .map(|candidate| {
                let burden_score = normalize(candidate.total_cases, max_total);
                let incidence_score = normalize(candidate.incidence_per_1000, max_incidence);
                let underserved_score = normalize(candidate.underserved_raw, max_underserved);
                let priority_score = self.config.burden_weight * burden_score
                    + self.config.incidence_weight * incidence_score
                    + self.config.underserved_weight * underserved_score;
                PriorityLgaScore {
                    lga: candidate.lga,
                    total_cases: candidate.total_cases,
                    incidence_per_1000: candidate.incidence_per_1000,
                    facilities_per_10k: candidate.facilities_per_10k,
                    priority_score,
                    tier: PriorityTier::Monitor,
                }
            })
            .collect();

        scores.sort_by(|a, b| {
            b.priority_score
                .partial_cmp(&a.priority_score)
                .unwrap_or(Ordering::Equal)
        });
        for (rank, score) in scores.iter_mut().enumerate() {
            score.tier = PriorityTier::for_rank(rank);
        }
        scores
    }
}
