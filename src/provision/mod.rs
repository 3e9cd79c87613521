mod engine;

pub use engine::{DriveSelection, ProvisionOutcome, ProvisioningEngine};
