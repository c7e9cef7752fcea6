//! Test table runner
//!
//! Sends each brief transaction through a caller-supplied
//! [`embedded_hal::i2c::I2c`] bus and compares the read-back data with the
//! test's expectation. The bus implementation owns all timing, retries and
//! error recovery; the runner issues exactly one bus call per test.

use embedded_hal::i2c::I2c;

use i2ctest_core::{BriefTest, BriefTransaction};

use crate::error::RunError;

/// Outcome of running a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Summary<E> {
    /// Tests whose response matched
    pub passed: usize,
    /// Tests that failed on the bus or on the check
    pub failed: usize,
    /// Index and cause of the first failure
    pub first_failure: Option<(usize, RunError<E>)>,
}

impl<E> Default for Summary<E> {
    fn default() -> Self {
        Self {
            passed: 0,
            failed: 0,
            first_failure: None,
        }
    }
}

impl<E> Summary<E> {
    /// Returns true if every test passed
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Total number of tests run
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

/// Send one transaction, reading `read_count` bytes into `response`
///
/// Uses a plain write when nothing is read, a plain read when nothing is
/// written, and a repeated-start write-read otherwise. At most
/// `response.len()` bytes are read.
pub fn execute<B: I2c, const N: usize>(
    bus: &mut B,
    transaction: &BriefTransaction<N>,
    response: &mut [u8],
) -> Result<(), B::Error> {
    let address = transaction.seven_bit_address();
    let payload = transaction.payload();
    let len = transaction.read_len().min(response.len());
    let read = &mut response[..len];

    if read.is_empty() {
        bus.write(address, payload)
    } else if payload.is_empty() {
        bus.read(address, read)
    } else {
        bus.write_read(address, payload, read)
    }
}

/// Run a single test
pub fn run_test<B: I2c, const N: usize>(
    bus: &mut B,
    test: &BriefTest<N>,
) -> Result<(), RunError<B::Error>> {
    let mut response = [0u8; N];
    execute(bus, &test.transaction, &mut response).map_err(RunError::Bus)?;
    test.check(&response[..test.expected().len()])?;

    Ok(())
}

/// Run every test in order, continuing past failures
pub fn run_table<'a, B, I, const N: usize>(bus: &mut B, tests: I) -> Summary<B::Error>
where
    B: I2c,
    I: IntoIterator<Item = &'a BriefTest<N>>,
{
    let mut summary = Summary::default();

    for (index, test) in tests.into_iter().enumerate() {
        match run_test(bus, test) {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("Test {} passed", index);
                summary.passed += 1;
            }
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Test {} failed: {}", index, defmt::Debug2Format(&e));
                summary.failed += 1;
                if summary.first_failure.is_none() {
                    summary.first_failure = Some((index, e));
                }
            }
        }
    }

    #[cfg(feature = "defmt")]
    defmt::info!(
        "Ran {} tests: {} passed, {} failed",
        summary.total(),
        summary.passed,
        summary.failed
    );

    summary
}
