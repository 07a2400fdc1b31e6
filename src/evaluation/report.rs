//! Human-readable evaluation reports.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::evaluation::harness::EvaluationReport;
use crate::search::SearchMode;

/// Precision@1 a legal search deployment should reach.
pub const TARGET_PRECISION_AT_1: f64 = 0.95;
/// Below this Precision@1 is critical rather than improvable.
pub const WARN_PRECISION_AT_1: f64 = 0.80;
/// Mean latency budget in milliseconds.
pub const TARGET_MEAN_LATENCY_MS: f64 = 200.0;

const RULE_WIDTH: usize = 80;

fn precision_at_1(report: &EvaluationReport) -> f64 {
    report.precision_at_k.get(&1).copied().unwrap_or(0.0)
}

/// Render one report with its quality and latency verdicts.
pub fn format_evaluation_report(report: &EvaluationReport) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(
        out,
        "EVALUATION REPORT - method: {}",
        report.method.as_str().to_uppercase()
    );
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "Queries evaluated: {}", report.num_queries);
    let _ = writeln!(out);

    let _ = writeln!(out, "QUALITY METRICS:");
    let _ = writeln!(out, "{light}");
    let _ = writeln!(out, "Precision@K:");
    for (k, score) in &report.precision_at_k {
        let _ = writeln!(out, "  P@{k:2} = {score:.3} ({:.1}%)", score * 100.0);
    }
    if !report.ndcg_at_k.is_empty() {
        let _ = writeln!(out, "NDCG@K:");
        for (k, score) in &report.ndcg_at_k {
            let _ = writeln!(out, "  NDCG@{k:2} = {score:.3}");
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Recall       = {:.3} ({:.1}%)",
        report.recall,
        report.recall * 100.0
    );
    let _ = writeln!(out, "F1-Score     = {:.3}", report.f1_score);
    let _ = writeln!(out, "MRR          = {:.3}", report.mrr);
    let _ = writeln!(out, "MAP          = {:.3}", report.map);

    let lat = &report.latency_ms;
    let _ = writeln!(out);
    let _ = writeln!(out, "LATENCY:");
    let _ = writeln!(out, "{light}");
    let _ = writeln!(out, "Mean     = {:.1} ms", lat.mean);
    let _ = writeln!(out, "Median   = {:.1} ms", lat.median);
    let _ = writeln!(out, "P95      = {:.1} ms", lat.p95);
    let _ = writeln!(out, "P99      = {:.1} ms", lat.p99);
    let _ = writeln!(out, "Min/Max  = {:.1} / {:.1} ms", lat.min, lat.max);

    let _ = writeln!(out);
    let _ = writeln!(out, "TARGETS:");
    let _ = writeln!(out, "{light}");

    let p1 = precision_at_1(report);
    let target = TARGET_PRECISION_AT_1 * 100.0;
    if p1 >= TARGET_PRECISION_AT_1 {
        let _ = writeln!(out, "✅ Precision@1 = {:.1}% (target: ≥{target:.0}%)", p1 * 100.0);
    } else if p1 >= WARN_PRECISION_AT_1 {
        let _ = writeln!(
            out,
            "⚠️  Precision@1 = {:.1}% (target: ≥{target:.0}%, needs improvement)",
            p1 * 100.0
        );
    } else {
        let _ = writeln!(
            out,
            "❌ Precision@1 = {:.1}% (target: ≥{target:.0}%, CRITICAL)",
            p1 * 100.0
        );
    }

    if lat.mean < TARGET_MEAN_LATENCY_MS {
        let _ = writeln!(
            out,
            "✅ Mean latency = {:.1} ms (target: <{TARGET_MEAN_LATENCY_MS:.0} ms)",
            lat.mean
        );
    } else {
        let _ = writeln!(
            out,
            "❌ Mean latency = {:.1} ms (target: <{TARGET_MEAN_LATENCY_MS:.0} ms, SLOW)",
            lat.mean
        );
    }
    let _ = write!(out, "{heavy}");
    out
}

/// Best method per headline metric across several runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodComparison {
    pub best_precision_at_1: SearchMode,
    pub best_latency: SearchMode,
    pub best_map: SearchMode,
}

/// Pick the best method per metric. Ties go to the earlier report.
/// Returns `None` for an empty slice.
pub fn compare_methods(reports: &[EvaluationReport]) -> Option<MethodComparison> {
    let first = reports.first()?;
    let mut best_p1 = first;
    let mut best_latency = first;
    let mut best_map = first;

    for report in &reports[1..] {
        if precision_at_1(report) > precision_at_1(best_p1) {
            best_p1 = report;
        }
        if report.latency_ms.mean < best_latency.latency_ms.mean {
            best_latency = report;
        }
        if report.map > best_map.map {
            best_map = report;
        }
    }

    Some(MethodComparison {
        best_precision_at_1: best_p1.method,
        best_latency: best_latency.method,
        best_map: best_map.method,
    })
}

/// Side-by-side summary of several runs.
pub fn format_comparison(reports: &[EvaluationReport]) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "METHOD COMPARISON");
    let _ = writeln!(out, "{heavy}");

    let _ = writeln!(out, "\nPrecision@1:");
    for report in reports {
        let p1 = precision_at_1(report);
        let status = if p1 >= TARGET_PRECISION_AT_1 { "✅" } else { "⚠️" };
        let _ = writeln!(
            out,
            "  {:10}: {p1:.3} ({:.1}%) {status}",
            report.method.as_str(),
            p1 * 100.0
        );
    }

    let _ = writeln!(out, "\nMean latency:");
    for report in reports {
        let mean = report.latency_ms.mean;
        let status = if mean < TARGET_MEAN_LATENCY_MS { "✅" } else { "⚠️" };
        let _ = writeln!(out, "  {:10}: {mean:6.1} ms {status}", report.method.as_str());
    }

    let _ = writeln!(out, "\nMAP:");
    for report in reports {
        let _ = writeln!(out, "  {:10}: {:.3}", report.method.as_str(), report.map);
    }

    if let Some(best) = compare_methods(reports) {
        let _ = writeln!(out, "\nBEST PER METRIC:");
        let _ = writeln!(out, "  Precision@1: {}", best.best_precision_at_1);
        let _ = writeln!(out, "  Latency:     {}", best.best_latency);
        let _ = writeln!(out, "  MAP:         {}", best.best_map);
    }
    let _ = write!(out, "{heavy}");
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::evaluation::latency::LatencyStats;

    fn report(method: SearchMode, p1: f64, mean_latency: f64, map: f64) -> EvaluationReport {
        EvaluationReport {
            method,
            num_queries: 5,
            precision_at_k: BTreeMap::from([(1, p1), (10, 0.3)]),
            recall: 0.8,
            f1_score: 0.4,
            mrr: 0.9,
            map,
            ndcg_at_k: BTreeMap::new(),
            latency_ms: LatencyStats {
                mean: mean_latency,
                median: mean_latency,
                p95: mean_latency,
                p99: mean_latency,
                min: mean_latency,
                max: mean_latency,
                count: 5,
            },
        }
    }

    #[test]
    fn test_report_verdicts() {
        let text = format_evaluation_report(&report(SearchMode::Hybrid, 1.0, 12.0, 0.8));
        assert!(text.contains("method: HYBRID"));
        assert!(text.contains("P@ 1 = 1.000 (100.0%)"));
        assert!(text.contains("✅ Precision@1 = 100.0%"));
        assert!(text.contains("✅ Mean latency = 12.0 ms"));

        let text = format_evaluation_report(&report(SearchMode::Keyword, 0.85, 250.0, 0.5));
        assert!(text.contains("⚠️  Precision@1 = 85.0%"));
        assert!(text.contains("❌ Mean latency = 250.0 ms"));

        let text = format_evaluation_report(&report(SearchMode::Semantic, 0.2, 5.0, 0.1));
        assert!(text.contains("CRITICAL"));
    }

    #[test]
    fn test_compare_methods() {
        let reports = vec![
            report(SearchMode::Hybrid, 1.0, 30.0, 0.8),
            report(SearchMode::Semantic, 0.8, 20.0, 0.6),
            report(SearchMode::Keyword, 1.0, 2.0, 0.9),
        ];
        assert_eq!(
            compare_methods(&reports),
            Some(MethodComparison {
                best_precision_at_1: SearchMode::Hybrid,
                best_latency: SearchMode::Keyword,
                best_map: SearchMode::Keyword,
            })
        );
        assert_eq!(compare_methods(&[]), None);

        let text = format_comparison(&reports);
        assert!(text.contains("Latency:     keyword"));
    }
}
