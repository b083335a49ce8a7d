use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::core::batch::BatchSummary;
use crate::core::strategy_comparison::StrategyOutcome;
use crate::data::disaster::ImpactMap;
use crate::data::zone_map::{HourlyDemand, ZoneStatistics};
use crate::models::coverage_map::CoverageMap;
use crate::models::metrics::{CoverageMetrics, PlacementReport};
use crate::models::surface::DemandSurface;
use crate::utils::logging::{self, FileIOType, OperationCategory};

#[derive(Serialize)]
struct CellRecord<T> {
    row: usize,
    col: usize,
    value: T,
}

#[derive(Serialize)]
struct SiteRecord {
    index: usize,
    row: usize,
    col: usize,
}

#[derive(Serialize)]
struct SummaryRecord {
    reactors: usize,
    total_capacity_mw: f64,
    normal_coverage_pct: f64,
    disaster_coverage_pct: f64,
    efficiency: f64,
    redundancy: f64,
}

#[derive(Serialize)]
struct StrategyRecord {
    strategy: String,
    reactors: usize,
    radius: f64,
    capacity_mw: f64,
    total_capacity_mw: f64,
    normal_coverage_pct: f64,
    disaster_coverage_pct: f64,
    efficiency: f64,
}

#[derive(Serialize)]
struct CurveRecord {
    reactors: usize,
    normal_coverage_pct: f64,
    disaster_coverage_pct: f64,
}

#[derive(Serialize)]
struct BatchRecord {
    seed: u64,
    normal_coverage_pct: f64,
    disaster_coverage_pct: f64,
    fallback_rounds: usize,
}

/// Writes run artefacts into a fresh timestamped directory.
pub struct CsvExporter {
    output_dir: PathBuf,
    timestamp: String,
    verbose_logging: bool,
}

impl CsvExporter {
    pub fn new(output_dir: impl AsRef<Path>, verbose_logging: bool) -> Result<Self> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let full_path = output_dir.as_ref().join(&timestamp);
        std::fs::create_dir_all(&full_path)
            .with_context(|| format!("creating output directory {}", full_path.display()))?;

        Ok(Self { output_dir: full_path, timestamp, verbose_logging })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    fn write_records<T: Serialize>(&self, file_name: &str, records: impl IntoIterator<Item = T>) -> Result<PathBuf> {
        let _timing = logging::start_timing("write_csv",
            OperationCategory::FileIO { subcategory: FileIOType::CsvExport });

        let path = self.output_dir.join(file_name);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        let mut count = 0;
        for record in records {
            writer.serialize(record)?;
            count += 1;
        }
        writer.flush()?;

        if self.verbose_logging {
            info!(file = %path.display(), records = count, "CSV written");
        }
        Ok(path)
    }

    /// `row,col,value` for every cell, written as `<name>_demand.csv`.
    pub fn export_surface(&self, name: &str, surface: &DemandSurface) -> Result<PathBuf> {
        self.write_records(
            &format!("{}_demand.csv", name),
            surface.cells().map(|(row, col, value)| CellRecord { row, col, value }),
        )
    }

    pub fn export_impact(&self, impact: &ImpactMap) -> Result<PathBuf> {
        let cols = impact.cols();
        self.write_records(
            "impact_map.csv",
            impact.multipliers().iter().enumerate().map(|(i, &value)| CellRecord { row: i / cols, col: i % cols, value }),
        )
    }

    pub fn export_coverage(&self, coverage: &CoverageMap) -> Result<PathBuf> {
        let cols = coverage.cols();
        self.write_records(
            "coverage_map.csv",
            coverage.as_slice().iter().enumerate().map(|(i, &covered)| CellRecord {
                row: i / cols,
                col: i % cols,
                value: u8::from(covered),
            }),
        )
    }

    /// Sites as `index,row,col` plus a one-line summary file.
    pub fn export_placement(&self, report: &PlacementReport) -> Result<PathBuf> {
        self.write_records(
            "placement_summary.csv",
            [SummaryRecord {
                reactors: report.num_reactors,
                total_capacity_mw: report.total_capacity_mw,
                normal_coverage_pct: report.metrics.normal_coverage_pct,
                disaster_coverage_pct: report.metrics.disaster_coverage_pct,
                efficiency: report.efficiency,
                redundancy: report.redundancy,
            }],
        )?;
        self.write_records(
            "placement.csv",
            report.placement.iter().enumerate().map(|(index, site)| SiteRecord { index, row: site.row, col: site.col }),
        )
    }

    pub fn export_strategies(&self, outcomes: &[StrategyOutcome]) -> Result<PathBuf> {
        self.write_records(
            "strategy_comparison.csv",
            outcomes.iter().map(|outcome| StrategyRecord {
                strategy: outcome.strategy.label(),
                reactors: outcome.strategy.reactors,
                radius: outcome.strategy.radius,
                capacity_mw: outcome.strategy.capacity,
                total_capacity_mw: outcome.total_capacity_mw,
                normal_coverage_pct: outcome.metrics.normal_coverage_pct,
                disaster_coverage_pct: outcome.metrics.disaster_coverage_pct,
                efficiency: outcome.efficiency,
            }),
        )
    }

    pub fn export_coverage_curve(&self, curve: &[(usize, CoverageMetrics)]) -> Result<PathBuf> {
        self.write_records(
            "coverage_curve.csv",
            curve.iter().map(|(reactors, metrics)| CurveRecord {
                reactors: *reactors,
                normal_coverage_pct: metrics.normal_coverage_pct,
                disaster_coverage_pct: metrics.disaster_coverage_pct,
            }),
        )
    }

    pub fn export_zone_statistics(&self, stats: &[ZoneStatistics]) -> Result<PathBuf> {
        self.write_records("zone_statistics.csv", stats)
    }

    pub fn export_demand_series(&self, series: &[HourlyDemand]) -> Result<PathBuf> {
        self.write_records("demand_series.csv", series)
    }

    pub fn export_batch(&self, summary: &BatchSummary) -> Result<PathBuf> {
        self.write_records(
            "batch_runs.csv",
            summary.runs.iter().map(|run| BatchRecord {
                seed: run.seed,
                normal_coverage_pct: run.metrics.normal_coverage_pct,
                disaster_coverage_pct: run.metrics.disaster_coverage_pct,
                fallback_rounds: run.fallback_rounds,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::site::FacilitySite;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("reactorgrid_{}_{}", name, std::process::id()))
    }

    #[test]
    fn writes_surface_and_placement_files() {
        let root = scratch_dir("export");
        let exporter = CsvExporter::new(&root, false).unwrap();
        assert!(exporter.output_dir().ends_with(exporter.timestamp()));

        let surface = DemandSurface::from_rows(vec![vec![1.5, 2.0], vec![0.0, 4.0]]).unwrap();
        let path = exporter.export_surface("normal", &surface).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text, "row,col,value\n0,0,1.5\n0,1,2.0\n1,0,0.0\n1,1,4.0\n");

        let report = PlacementReport {
            placement: vec![FacilitySite::new(1, 1)],
            metrics: CoverageMetrics::new(50.0, 40.0),
            efficiency: 45.0,
            redundancy: 1.0,
            total_capacity_mw: 15.0,
            num_reactors: 1,
        };
        let path = exporter.export_placement(&report).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "index,row,col\n0,1,1\n");

        let coverage = CoverageMap::from_sites(&report.placement, 2, 2, 0.0);
        let path = exporter.export_coverage(&coverage).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().ends_with("1,1,1\n"));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn writes_hourly_series() {
        let root = scratch_dir("series");
        let exporter = CsvExporter::new(&root, false).unwrap();
        let series = [
            HourlyDemand { offset: 0, hour: 23, total_demand: 12.5 },
            HourlyDemand { offset: 1, hour: 0, total_demand: 10.0 },
        ];
        let path = exporter.export_demand_series(&series).unwrap();
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "offset,hour,total_demand\n0,23,12.5\n1,0,10.0\n"
        );
        std::fs::remove_dir_all(&root).unwrap();
    }
}
