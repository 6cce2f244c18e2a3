//! Human-readable text output

use super::RunReport;
use crate::util::resource::is_oversubscribed;
use crate::util::time::{format_rate, format_seconds};

/// Render the console lines for a report
///
/// The first two lines are always the timing line and the approximation line;
/// the error line follows only when the report carries one.
pub fn format_report(report: &RunReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Pi approximation took {} seconds to complete using {} workers.\n",
        format_seconds(report.elapsed()),
        report.workers
    ));
    out.push_str(&format!(
        "Approximation of π using {} terms: {:?}\n",
        report.terms, report.value
    ));

    if let Some(error) = report.error {
        out.push_str(&format!(
            "Absolute error: {:e} (series bound {:e})\n",
            error.absolute_error, error.error_bound
        ));
    }

    out
}

/// Print a report to stdout
pub fn print_report(report: &RunReport) {
    print!("{}", format_report(report));
}

/// Print run details for `--debug`
///
/// Goes to stderr so stdout stays limited to the result lines.
pub fn print_debug_details(report: &RunReport) {
    eprintln!(
        "DEBUG: backend={} workers={} cpus={} rate={} terms/s",
        report.backend,
        report.workers,
        report.available_cpus,
        format_rate(report.terms_per_second)
    );
    if is_oversubscribed(report.workers, report.available_cpus) {
        eprintln!(
            "DEBUG: {} workers share {} CPUs",
            report.workers, report.available_cpus
        );
    }
    for (index, chunk) in report.chunks.iter().enumerate() {
        eprintln!(
            "DEBUG: chunk {} [{}, {}) partial={:?}",
            index, chunk.start, chunk.end, chunk.partial_sum
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::sample_report;

    #[test]
    fn test_format_report_lines() {
        let report = sample_report(false);
        let text = format_report(&report);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Pi approximation took 0.001500 seconds to complete using 4 workers."
        );
        assert!(lines[1].starts_with("Approximation of π using 1000 terms: 3.14"));
    }

    #[test]
    fn test_format_report_with_error() {
        let report = sample_report(true);
        let text = format_report(&report);
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("Absolute error: "));
        assert!(text.contains("series bound"));
    }

    #[test]
    fn test_whole_values_keep_decimal_point() {
        let mut report = sample_report(false);
        report.terms = 1;
        report.value = 4.0;
        assert!(format_report(&report).contains("using 1 terms: 4.0\n"));
    }
}
