//! Helpers shared by the unit tests.
//!
//! **Note**: only compiled during testing.

#[cfg(test)]
pub mod test_helper {
    use log::Level;

    /// Assert that exactly the given warnings were logged, in order. Needs
    /// `testing_logger::setup()` at the start of the test.
    pub fn check_warnings(expected: Vec<&str>) {
        testing_logger::validate(|captured| {
            let warnings: Vec<&str> = captured
                .iter()
                .filter(|entry| entry.level == Level::Warn)
                .map(|entry| entry.body.as_str())
                .collect();
            assert_eq!(warnings, expected);
        });
    }
}
