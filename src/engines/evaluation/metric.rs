use crate::types::TrialFailure;

pub const METRIC_LABEL: &str = "ROI MPKI";

/// Extract the ROI MPKI value from combined simulator output
///
/// The first line containing the label decides the outcome: `ROI MPKI`, optional
/// spaces, `:`, optional spaces, then a run of digits and dots.
pub fn parse_roi_mpki(output: &str) -> Result<f64, TrialFailure> {
    let line = output
        .lines()
        .find(|line| line.contains(METRIC_LABEL))
        .ok_or(TrialFailure::MissingMetric)?;

    parse_metric_line(line).ok_or_else(|| TrialFailure::Unparsable(line.trim().to_string()))
}

fn parse_metric_line(line: &str) -> Option<f64> {
    let (_, after_label) = line.split_once(METRIC_LABEL)?;
    let after_colon = after_label.trim_start().strip_prefix(':')?.trim_start();
    let number: String = after_colon
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    number.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_metric_line() {
        let output = "Warmup complete\nSimulation done\nROI MPKI: 3.1415\nIPC: 1.2\n";
        assert_eq!(parse_roi_mpki(output), Ok(3.1415));
    }

    #[test]
    fn test_spacing_variants() {
        assert_eq!(parse_roi_mpki("ROI MPKI:7"), Ok(7.0));
        assert_eq!(parse_roi_mpki("  ROI MPKI   :   0.25 (branches)"), Ok(0.25));
        assert_eq!(parse_roi_mpki("[stats] ROI MPKI : 12."), Ok(12.0));
    }

    #[test]
    fn test_first_match_wins() {
        let output = "ROI MPKI: 1.5\nROI MPKI: 9.0\n";
        assert_eq!(parse_roi_mpki(output), Ok(1.5));
    }

    #[test]
    fn test_zero_is_a_value_not_a_failure() {
        assert_eq!(parse_roi_mpki("ROI MPKI: 0.0"), Ok(0.0));
    }

    #[test]
    fn test_missing_metric() {
        assert_eq!(
            parse_roi_mpki("Segmentation fault\n"),
            Err(TrialFailure::MissingMetric)
        );
        assert_eq!(parse_roi_mpki(""), Err(TrialFailure::MissingMetric));
    }

    #[test]
    fn test_unparsable_metric() {
        assert!(matches!(
            parse_roi_mpki("ROI MPKI: nan"),
            Err(TrialFailure::Unparsable(_))
        ));
        assert!(matches!(
            parse_roi_mpki("ROI MPKI: 1.2.3"),
            Err(TrialFailure::Unparsable(_))
        ));
        // A later well-formed line does not rescue a malformed first one
        assert!(matches!(
            parse_roi_mpki("ROI MPKI = 4\nROI MPKI: 5\n"),
            Err(TrialFailure::Unparsable(_))
        ));
    }
}
