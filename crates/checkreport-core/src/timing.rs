//! Timing records of the analyzer run.

use checkreport_types::{TimingRecord, ANALYZER_PASS};

/// Formats seconds as `2 day 23 hour 42 min 3.205 sec`; leading zero units
/// are omitted.
pub fn format_time(elapsed: f64) -> String {
    const MINUTE: f64 = 60.0;
    const HOUR: f64 = 60.0 * MINUTE;
    const DAY: f64 = 24.0 * HOUR;

    let mut parts = Vec::new();
    let mut rest = elapsed;
    for (unit, seconds) in [("day", DAY), ("hour", HOUR), ("min", MINUTE)] {
        if rest >= seconds {
            parts.push(format!("{} {unit}", (rest / seconds).floor() as u64));
            rest %= seconds;
        }
    }
    parts.push(format!("{rest:.3} sec"));
    parts.join(" ")
}

/// Wall-clock seconds of the analyzer itself, 0 when it was not recorded.
pub fn analyzer_time(records: &[TimingRecord]) -> f64 {
    records
        .iter()
        .find(|r| r.pass == ANALYZER_PASS)
        .map_or(0.0, |r| r.seconds)
}

/// The `# Time stats:` block, sorted by pass name. Without `full`, the
/// analyzer's internal sub-passes are hidden.
pub fn render_timing(records: &[TimingRecord], full: bool) -> String {
    let sub_pass = format!("{ANALYZER_PASS}.");
    let mut shown: Vec<&TimingRecord> = records
        .iter()
        .filter(|r| full || !r.pass.contains(&sub_pass))
        .collect();
    shown.sort_by(|a, b| a.pass.cmp(&b.pass));

    let mut out = String::from("# Time stats:\n");
    let width = shown.iter().map(|r| r.pass.len()).max().unwrap_or(0);
    for record in shown {
        out.push_str(&format!(
            "{:<width$}: {}\n",
            record.pass,
            format_time(record.seconds)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pass: &str, seconds: f64) -> TimingRecord {
        TimingRecord {
            pass: pass.to_string(),
            seconds,
        }
    }

    #[test]
    fn format_time_examples() {
        assert_eq!(format_time(3.1415), "3.142 sec");
        assert_eq!(
            format_time(2.0 * 86400.0 + 23.0 * 3600.0 + 42.0 * 60.0 + 3.20498),
            "2 day 23 hour 42 min 3.205 sec"
        );
        assert_eq!(format_time(60.0), "1 min 0.000 sec");
    }

    #[test]
    fn analyzer_time_defaults_to_zero() {
        assert_eq!(analyzer_time(&[]), 0.0);
        assert_eq!(
            analyzer_time(&[record("clang", 1.0), record(ANALYZER_PASS, 2.5)]),
            2.5
        );
    }

    #[test]
    fn short_timing_hides_sub_passes() {
        let records = [
            record("ikos-analyzer.value", 1.0),
            record("clang", 0.5),
            record(ANALYZER_PASS, 2.0),
        ];
        assert_eq!(
            render_timing(&records, false),
            "# Time stats:\nclang        : 0.500 sec\nikos-analyzer: 2.000 sec\n"
        );
        assert!(render_timing(&records, true).contains("ikos-analyzer.value: 1.000 sec"));
    }
}
