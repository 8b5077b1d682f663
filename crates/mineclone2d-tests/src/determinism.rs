//! Determinism checks for rendered worlds.
//!
//! Terrain, tile placement and PNG encoding are all seeded or fixed, so the
//! same inputs must always produce the same bytes. These helpers run a
//! producer several times and report the first byte that differs.

use std::fmt;

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical output.
    pub is_deterministic: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// Size of the first run's output in bytes.
    pub output_size: usize,
    /// BLAKE3 hash of the first run's output.
    pub hash: String,
    /// First difference found, if any.
    pub diff_info: Option<DiffInfo>,
}

/// First byte difference between a run and the reference run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffInfo {
    pub offset: usize,
    /// Reference byte, `None` past the end of the reference output.
    pub expected: Option<u8>,
    /// Differing byte, `None` past the end of the differing output.
    pub actual: Option<u8>,
    /// Which run (0-indexed) differed.
    pub run_index: usize,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn byte(b: Option<u8>) -> String {
            b.map(|b| format!("0x{:02X}", b))
                .unwrap_or_else(|| "<end>".to_string())
        }
        write!(
            f,
            "Difference at byte {}: expected {}, got {} (run {})",
            self.offset,
            byte(self.expected),
            byte(self.actual),
            self.run_index
        )
    }
}

impl DeterminismResult {
    /// Panic with a detailed message if not deterministic.
    pub fn assert_deterministic(&self) {
        if let Some(diff) = &self.diff_info {
            panic!(
                "Non-deterministic output detected!\n\
                 Runs: {}\n\
                 Output size: {} bytes\n\
                 Hash: {}\n\
                 {}",
                self.runs, self.output_size, self.hash, diff
            );
        }
    }
}

/// BLAKE3 hex digest of some bytes.
pub fn compute_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

fn first_difference(reference: &[u8], output: &[u8]) -> Option<usize> {
    reference
        .iter()
        .zip(output)
        .position(|(a, b)| a != b)
        .or_else(|| (reference.len() != output.len()).then(|| reference.len().min(output.len())))
}

/// Run `produce` `runs` times and compare every output with the first.
///
/// # Panics
///
/// Panics if `runs < 2`.
pub fn verify_determinism<F, O>(produce: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = produce();
    let reference = reference.as_ref();
    let hash = compute_hash(reference);

    for run_index in 1..runs {
        let output = produce();
        let output = output.as_ref();
        if let Some(offset) = first_difference(reference, output) {
            return DeterminismResult {
                is_deterministic: false,
                runs,
                output_size: reference.len(),
                hash,
                diff_info: Some(DiffInfo {
                    offset,
                    expected: reference.get(offset).copied(),
                    actual: output.get(offset).copied(),
                    run_index,
                }),
            };
        }
    }

    DeterminismResult {
        is_deterministic: true,
        runs,
        output_size: reference.len(),
        hash,
        diff_info: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_identical_runs() {
        let result = verify_determinism(|| vec![1u8, 2, 3], 4);
        assert!(result.is_deterministic);
        assert_eq!(result.output_size, 3);
        assert_eq!(result.hash, compute_hash(&[1, 2, 3]));
    }

    #[test]
    fn test_reports_first_difference() {
        let calls = Cell::new(0u8);
        let result = verify_determinism(
            || {
                calls.set(calls.get() + 1);
                vec![7u8, 7, calls.get()]
            },
            3,
        );
        assert!(!result.is_deterministic);
        let diff = result.diff_info.unwrap();
        assert_eq!(diff.offset, 2);
        assert_eq!(diff.expected, Some(1));
        assert_eq!(diff.actual, Some(2));
        assert_eq!(diff.run_index, 1);
    }

    #[test]
    fn test_length_mismatch() {
        let calls = Cell::new(0usize);
        let result = verify_determinism(
            || {
                calls.set(calls.get() + 1);
                vec![0u8; calls.get()]
            },
            2,
        );
        let diff = result.diff_info.unwrap();
        assert_eq!(diff.offset, 1);
        assert_eq!(diff.expected, None);
        assert_eq!(diff.actual, Some(0));
    }

    #[test]
    #[should_panic(expected = "Non-deterministic")]
    fn test_assert_panics_on_difference() {
        let calls = Cell::new(0u8);
        verify_determinism(
            || {
                calls.set(calls.get() + 1);
                [calls.get()]
            },
            2,
        )
        .assert_deterministic();
    }
}
