use lazy_static::lazy_static;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Level;
use tracing_subscriber::{EnvFilter, prelude::*};
use tracing_timing::{Builder, Histogram};
use std::collections::HashMap;
use parking_lot::RwLock;
use std::time::{Duration, Instant};
use std::cell::RefCell;

const HISTOGRAM_MAX_NS: u64 = 60_000_000_000;
const HISTOGRAM_SIGFIG: u8 = 3;

// Categories for the kinds of work the simulator times
#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum OperationCategory {
    Placement {
        subcategory: PlacementStage,
    },
    Scoring,
    Generation {
        subcategory: GenerationType,
    },
    FileIO {
        subcategory: FileIOType,
    },
    Other,
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum PlacementStage {
    CandidateScan,
    CoverageMarking,
    Metrics,
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum GenerationType {
    Zones,
    Demand,
    Disaster,
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum FileIOType {
    CsvExport,
    LpExport,
    ConfigLoad,
}

impl OperationCategory {
    pub fn as_str(&self) -> String {
        match self {
            OperationCategory::Placement { subcategory } => {
                format!("Placement - {}", match subcategory {
                    PlacementStage::CandidateScan => "Candidate Scan",
                    PlacementStage::CoverageMarking => "Coverage Marking",
                    PlacementStage::Metrics => "Metrics",
                })
            },
            OperationCategory::Scoring => "Scoring".to_string(),
            OperationCategory::Generation { subcategory } => {
                format!("Generation - {}", match subcategory {
                    GenerationType::Zones => "Zones",
                    GenerationType::Demand => "Demand",
                    GenerationType::Disaster => "Disaster",
                })
            },
            OperationCategory::FileIO { subcategory } => {
                format!("File I/O - {}", match subcategory {
                    FileIOType::CsvExport => "CSV Export",
                    FileIOType::LpExport => "LP Export",
                    FileIOType::ConfigLoad => "Config Load",
                })
            },
            OperationCategory::Other => "Other Operations".to_string(),
        }
    }
}

thread_local! {
    static TIMING_STACK: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

lazy_static! {
    static ref TIMING_ENABLED: AtomicBool = AtomicBool::new(false);
    static ref FUNCTION_TIMINGS: RwLock<HashMap<String, Histogram<u64>>> = RwLock::new(HashMap::new());
    static ref CATEGORY_TIMINGS: RwLock<HashMap<OperationCategory, Histogram<u64>>> = RwLock::new(HashMap::new());
    static ref CALL_TREE: RwLock<HashMap<String, CallRecord>> = RwLock::new(HashMap::new());
}

/// Records the elapsed time of a scope when dropped.
pub struct TimingGuard {
    function_name: String,
    category: OperationCategory,
    start: Instant,
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        record_timing_end(&self.function_name, duration, &self.category);
    }
}

pub fn start_timing(function_name: &str, category: OperationCategory) -> TimingGuard {
    TIMING_STACK.with(|stack| {
        stack.borrow_mut().push(function_name.to_string());
    });

    TimingGuard {
        function_name: function_name.to_string(),
        category,
        start: Instant::now(),
    }
}

fn new_histogram() -> Histogram<u64> {
    // Bounds are constants well inside hdrhistogram's limits.
    Histogram::<u64>::new_with_bounds(1, HISTOGRAM_MAX_NS, HISTOGRAM_SIGFIG)
        .expect("constant histogram bounds are valid")
}

fn record_timing_end(function_name: &str, duration: Duration, category: &OperationCategory) {
    // Keep the stack balanced even when timing is off.
    let parent = TIMING_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        stack.pop();
        stack.last().cloned()
    });

    if is_timing_enabled() {
        record(function_name, duration, category, parent);
    }
}

fn record(function_name: &str, duration: Duration, category: &OperationCategory, parent: Option<String>) {
    let duration_ns = (duration.as_nanos() as u64).clamp(1, HISTOGRAM_MAX_NS);

    {
        let mut calls = CALL_TREE.write();
        let entry = calls.entry(function_name.to_string()).or_default();
        entry.total += duration;
        entry.calls += 1;
        if let Some(parent) = parent {
            if !entry.callers.contains(&parent) {
                entry.callers.push(parent);
            }
        }
    }

    let _ = FUNCTION_TIMINGS.write()
        .entry(function_name.to_string())
        .or_insert_with(new_histogram)
        .record(duration_ns);
    let _ = CATEGORY_TIMINGS.write()
        .entry(category.clone())
        .or_insert_with(new_histogram)
        .record(duration_ns);
}

#[derive(Debug, Clone, Default)]
struct CallRecord {
    total: Duration,
    calls: usize,
    callers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FunctionTiming {
    pub name: String,
    pub total: Duration,
    pub calls: usize,
    pub p95_ms: f64,
    pub callers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CategoryTiming {
    pub label: String,
    pub calls: u64,
    pub mean_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub total_secs: f64,
}

fn ns_to_ms(ns: f64) -> f64 {
    ns / 1_000_000.0
}

/// Timed functions, slowest total first.
pub fn function_timings() -> Vec<FunctionTiming> {
    let calls = CALL_TREE.read();
    let histograms = FUNCTION_TIMINGS.read();
    let mut timings: Vec<FunctionTiming> = calls
        .iter()
        .map(|(name, record)| FunctionTiming {
            name: name.clone(),
            total: record.total,
            calls: record.calls,
            p95_ms: histograms
                .get(name)
                .map_or(0.0, |h| ns_to_ms(h.value_at_quantile(0.95) as f64)),
            callers: record.callers.clone(),
        })
        .collect();
    timings.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    timings
}

/// Per-category histograms summarised, largest total first.
pub fn category_timings() -> Vec<CategoryTiming> {
    let histograms = CATEGORY_TIMINGS.read();
    let mut timings: Vec<CategoryTiming> = histograms
        .iter()
        .map(|(category, h)| CategoryTiming {
            label: category.as_str(),
            calls: h.len(),
            mean_ms: ns_to_ms(h.mean()),
            p95_ms: ns_to_ms(h.value_at_quantile(0.95) as f64),
            p99_ms: ns_to_ms(h.value_at_quantile(0.99) as f64),
            total_secs: h.mean() * h.len() as f64 / 1_000_000_000.0,
        })
        .collect();
    timings.sort_by(|a, b| b.total_secs.total_cmp(&a.total_secs));
    timings
}

/// Installs the global tracing subscriber. Fails if one is already set.
pub fn init_logging(enable_timing: bool, debug_logging: bool) -> anyhow::Result<()> {
    TIMING_ENABLED.store(enable_timing, Ordering::SeqCst);

    let crate_level = if debug_logging { "reactorgrid=debug" } else { "reactorgrid=info" };
    let env_filter = EnvFilter::from_default_env()
        .add_directive(Level::INFO.into())
        .add_directive(crate_level.parse()?);

    if enable_timing {
        let timing_layer = Builder::default().layer(new_histogram);

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .with(timing_layer.boxed());

        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact());

        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

pub fn is_timing_enabled() -> bool {
    TIMING_ENABLED.load(Ordering::SeqCst)
}

pub fn print_timing_report() {
    if !is_timing_enabled() {
        return;
    }

    println!("\nTiming Report");
    println!("========================================");
    println!("\nBy function:");
    for timing in function_timings() {
        let avg_ms = timing.total.as_secs_f64() * 1000.0 / timing.calls.max(1) as f64;
        println!("  {}: total={:.3}s, calls={}, avg={:.3}ms, p95={:.3}ms",
            timing.name, timing.total.as_secs_f64(), timing.calls, avg_ms, timing.p95_ms);
        if !timing.callers.is_empty() {
            println!("    called by: {}", timing.callers.join(", "));
        }
    }

    let categories = category_timings();
    let grand_total: f64 = categories.iter().map(|c| c.total_secs).sum();
    println!("\nBy category:");
    for category in categories {
        let share = if grand_total > 0.0 { category.total_secs / grand_total * 100.0 } else { 0.0 };
        println!("  {}: {:.1}% ({:.3}s), calls={}, mean={:.3}ms, p95={:.3}ms, p99={:.3}ms",
            category.label, share, category.total_secs, category.calls,
            category.mean_ms, category.p95_ms, category.p99_ms);
    }
    println!("========================================\n");
}
