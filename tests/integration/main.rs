//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one part of the engine
//! against the mock transport. All tests run on the host with no
//! controller attached.

mod abort_tests;
mod driver_tests;
mod mock_transport;
mod tx_path_tests;
