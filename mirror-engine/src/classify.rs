//! Exit-code classification for the external mirroring tool.
//!
//! The tool packs several boolean conditions into bit positions of its exit
//! code. Bits below 8 report work done (files copied, mismatches, extras);
//! bit 8 and above report copy errors. The threshold is a fixed contract of
//! the tool and must not change.

use mirror_core::types::Verdict;

/// Smallest exit code the tool uses to report a copy error.
pub const FAILURE_THRESHOLD: i32 = 8;

/// Classify a raw exit code. Pure and total.
///
/// Negative codes never occur under the tool's contract; they classify as
/// failure rather than as warnings.
pub fn classify(exit_code: i32) -> Verdict {
    if exit_code == 0 {
        Verdict::Success
    } else if (1..FAILURE_THRESHOLD).contains(&exit_code) {
        Verdict::SuccessWithWarnings
    } else {
        Verdict::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_success() {
        assert_eq!(classify(0), Verdict::Success);
    }

    #[test]
    fn codes_below_threshold_are_warnings() {
        for code in 1..FAILURE_THRESHOLD {
            assert_eq!(classify(code), Verdict::SuccessWithWarnings, "code {code}");
        }
    }

    #[test]
    fn codes_at_or_above_threshold_are_failures() {
        for code in [8, 9, 15, 16, 255] {
            assert_eq!(classify(code), Verdict::Failure, "code {code}");
        }
    }

    #[test]
    fn out_of_contract_negative_codes_are_failures() {
        assert_eq!(classify(-1), Verdict::Failure);
    }
}
