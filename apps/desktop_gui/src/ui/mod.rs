//! UI layer for the desktop client: app shell and theme.

pub mod app;
pub mod theme;

pub use app::DesktopGuiApp;
