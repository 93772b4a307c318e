pub mod headless;
pub mod session;

pub use headless::launch_browser;
pub use session::{run_scoped, with_session, AutomationSession, ChromeSession};
