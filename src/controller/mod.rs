//! Application logic controller module
//!
//! Everything the overlay window does apart from drawing lives here, so it can be
//! driven and tested without a display.
//!
//! # Architecture
//!
//! - `MainWindowModel`: window lifecycle, menu command dispatch and the shutdown sequence
//! - `ContentController`: owns the API poller and folds its events into displayable state
//! - `GraphState`: rating series with the plot toggles and the "Last 24h" filter
//! - `CrashGuard`: panic hook that saves settings and stops polling before exiting
//!
//! # Event Flow
//!
//! ```text
//! ApiPoller → PollEvent → ContentController → GUI timer refresh
//!                                ↑
//! GUI menu → MainWindowModel::trigger
//! ```
//!
//! # Shutdown
//!
//! On a normal exit the GUI calls `MainWindowModel::finish`, which saves the settings
//! before stopping the poller. On a panic the crash hook runs the same two steps
//! through `Teardown` and then terminates the process.

pub mod commands;
pub mod content;
pub mod crash_guard;
pub mod graph;
pub mod main_window;

pub use commands::{
    CommandTable, FolderTarget, GRAPH_COMMAND_IDS, LAST_DAY_COMMAND_ID, LINKS, Menu, MenuAction,
    MenuEntry, Navigator, SystemNavigator, menu_layout,
};
pub use content::{Content, ContentController, SHUTDOWN_GRACE};
pub use crash_guard::{
    CRASH_EXIT_CODE, CrashGuard, ProcessTeardown, Teardown, TeardownReport, describe_panic,
    run_teardown,
};
pub use graph::{DAY_SECS, GraphState, GraphTab, SeriesView};
pub use main_window::{CommandOutcome, MainWindowModel, WindowPhase, WindowServices};
