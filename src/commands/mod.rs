mod adjust;
mod presets;
mod preview;
mod remote;

pub use adjust::run_adjust;
pub use presets::run_presets;
pub use preview::run_preview;
pub use remote::{run_apply_preset, run_pull, run_push};
