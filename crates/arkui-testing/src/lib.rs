//! Testing utilities and harness for ArkUI NG grids.

pub mod fake_host;
pub mod test_rule;

pub use fake_host::FakeGridHost;
pub use test_rule::GridTestRule;
