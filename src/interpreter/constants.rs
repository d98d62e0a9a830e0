// Constants for the line interpreter

/// Lowest synthetic address handed to a variable slot.
/// Chosen to look like a user-space stack address.
pub const SLOT_ADDRESS_BASE: u64 = 0x7ffd_0000_0000;

/// Size of the window synthetic addresses are drawn from
pub const SLOT_ADDRESS_SPAN: u64 = 0x0000_0fff_fff0;

/// Synthetic addresses are multiples of this
pub const SLOT_ALIGN: u64 = 4;

/// Message of the Success event that ends a completed run
pub const EXIT_MESSAGE: &str = "Process finished with exit code 0";

/// System event emitted when a run completes without printing anything
pub const NO_OUTPUT_MESSAGE: &str = "Build succeeded: no output produced.";
