//! Slint glue for the main window
//!
//! `GuiController` owns the Slint `MainWindow` and the `MainWindowModel` behind it.
//! Menu clicks are forwarded to `MainWindowModel::trigger`, a repeating timer drains
//! the poller's events into the view, and `run` performs the shutdown sequence once
//! the event loop returns.

use crate::gui::view::{self, PlotBounds};
use crate::{MainWindow, MenuItemData, PlotLine};
use anyhow::{Context, Result};
use aoe4_overlay::controller::{
    CommandOutcome, ContentController, GRAPH_COMMAND_IDS, LAST_DAY_COMMAND_ID, MainWindowModel,
    MenuEntry, menu_layout,
};
use aoe4_overlay::monitor::StopOutcome;
use aoe4_overlay::utils::update_checker::current_timestamp;
use slint::{Color, ComponentHandle, ModelRc, SharedString, Timer, TimerMode, VecModel};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How often poller events are pulled into the view
const REFRESH_INTERVAL: Duration = Duration::from_millis(250);

type SharedModel = Rc<RefCell<MainWindowModel<ContentController>>>;

/// Main window and its model
pub struct GuiController {
    main_window: MainWindow,
    model: SharedModel,
    refresh_timer: Timer,
}

impl GuiController {
    /// Create the window, populate the menus and connect all callbacks
    pub fn new(model: MainWindowModel<ContentController>) -> Result<Self> {
        let main_window = MainWindow::new().context("Failed to create main window")?;

        let (width, height) = model.geometry();
        #[expect(
            clippy::cast_precision_loss,
            reason = "window dimensions are clamped far below 2^24"
        )]
        main_window
            .window()
            .set_size(slint::LogicalSize::new(width as f32, height as f32));

        populate_menus(&main_window, &model);
        if let Some(profile_id) = model.content().profile_id() {
            main_window.set_profile_id_text(profile_id.to_string().into());
        }

        let model = Rc::new(RefCell::new(model));
        refresh_view(&main_window, &mut model.borrow_mut());

        connect_menu(&main_window, &model);
        connect_profile_entry(&main_window, &model);

        let refresh_timer = Timer::default();
        let weak = main_window.as_weak();
        let timer_model = Rc::clone(&model);
        refresh_timer.start(TimerMode::Repeated, REFRESH_INTERVAL, move || {
            let Some(window) = weak.upgrade() else {
                return;
            };
            let Ok(mut model) = timer_model.try_borrow_mut() else {
                return;
            };
            if model.content_mut().process_events() > 0 {
                refresh_view(&window, &mut model);
            }
        });

        info!("GUI controller ready");
        Ok(Self {
            main_window,
            model,
            refresh_timer,
        })
    }

    /// Run the event loop, then save settings and stop polling
    pub fn run(self) -> Result<StopOutcome> {
        let run_result = self.main_window.show().and_then(|()| {
            center_on_screen(self.main_window.window());
            slint::run_event_loop()
        });
        self.refresh_timer.stop();
        if let Err(e) = self.main_window.hide() {
            debug!("Failed to hide main window: {}", e);
        }

        let window = self.main_window.window();
        let size = window.size().to_logical(window.scale_factor());
        let mut model = self.model.borrow_mut();
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "logical window size is non-negative and small"
        )]
        model.resize(
            size.width.max(0.0).round() as u32,
            size.height.max(0.0).round() as u32,
        );

        let outcome = model.finish().context("Failed to save settings on exit");
        run_result.context("Slint event loop failed")?;
        outcome
    }
}

/// Move the window to the middle of the monitor it opened on
///
/// The native window only exists once shown, so this runs after `show`.
fn center_on_screen(window: &slint::Window) {
    use slint::winit_030::WinitWindowAccessor;

    let position = window
        .with_winit_window(|winit_window| {
            let monitor = winit_window.current_monitor()?;
            let origin = monitor.position();
            let screen = monitor.size();
            let outer = winit_window.outer_size();
            Some(view::centered_position(
                (origin.x, origin.y),
                (screen.width, screen.height),
                (outer.width, outer.height),
            ))
        })
        .flatten();

    match position {
        Some((x, y)) => window.set_position(slint::PhysicalPosition::new(x, y)),
        None => debug!("No monitor information, leaving window position to the system"),
    }
}

fn menu_items(entries: &[MenuEntry], checked: impl Fn(&str) -> bool) -> ModelRc<MenuItemData> {
    let items: Vec<MenuItemData> = entries
        .iter()
        .map(|entry| MenuItemData {
            id: entry.id.into(),
            label: entry.label.as_str().into(),
            checkable: entry.checkable,
            checked: entry.checkable && checked(entry.id),
        })
        .collect();
    ModelRc::new(VecModel::from(items))
}

fn populate_menus(window: &MainWindow, model: &MainWindowModel<ContentController>) {
    let graph_actions = model.graph_actions();
    let last_day = model.last_day();
    let is_checked = |id: &str| {
        if id == LAST_DAY_COMMAND_ID {
            return last_day;
        }
        GRAPH_COMMAND_IDS
            .iter()
            .position(|graph_id| *graph_id == id)
            .is_some_and(|index| graph_actions[index])
    };

    for menu in menu_layout() {
        let items = menu_items(&menu.entries, &is_checked);
        match menu.title {
            "File" => window.set_file_items(items),
            "Graphs" => window.set_graph_items(items),
            "Links" => window.set_link_items(items),
            other => warn!("Menu '{}' has no place in the window", other),
        }
    }
}

fn connect_menu(window: &MainWindow, model: &SharedModel) {
    let weak = window.as_weak();
    let model = Rc::clone(model);
    window.on_menu_activated(move |id: SharedString, checked| {
        let outcome = model.borrow_mut().trigger(id.as_str(), checked);
        let Some(window) = weak.upgrade() else {
            return;
        };
        match outcome {
            Ok(CommandOutcome::Quit) => {
                info!("Exit requested from menu");
                if let Err(e) = slint::quit_event_loop() {
                    warn!("Failed to quit event loop: {}", e);
                }
            }
            Ok(CommandOutcome::Handled) => refresh_view(&window, &mut model.borrow_mut()),
            Err(e) => {
                warn!("Menu command '{}' failed: {}", id, e);
                window.set_status_text(e.to_string().into());
            }
        }
    });
}

fn connect_profile_entry(window: &MainWindow, model: &SharedModel) {
    let weak = window.as_weak();
    let model = Rc::clone(model);
    window.on_profile_submitted(move |text: SharedString| {
        let Some(window) = weak.upgrade() else {
            return;
        };
        let profile_id = match view::parse_profile_id(&text) {
            Ok(profile_id) => profile_id,
            Err(message) => {
                window.set_status_text(message.into());
                return;
            }
        };

        let mut model = model.borrow_mut();
        if let Err(e) = model.content_mut().set_profile_id(profile_id) {
            warn!("Failed to switch profile: {}", e);
            window.set_status_text(e.to_string().into());
            return;
        }
        debug!("Profile entry applied: {:?}", profile_id);
        refresh_view(&window, &mut model);
    });
}

fn refresh_view(window: &MainWindow, model: &mut MainWindowModel<ContentController>) {
    if let Some(name) = model.content().player_name().map(str::to_owned) {
        model.update_title(&name);
    }
    window.set_window_title(model.title().into());

    let content = model.content();
    let match_text = content
        .current_match()
        .map_or_else(|| "No match yet".to_string(), view::match_summary);
    window.set_match_text(match_text.into());

    let now = i64::try_from(current_timestamp()).unwrap_or(i64::MAX);
    let views = content.graph().visible_series(now);
    let plots: Vec<PlotLine> = PlotBounds::of(&views)
        .map(|bounds| {
            views
                .iter()
                .map(|series| {
                    let (r, g, b) = view::series_rgb(series.team_size);
                    PlotLine {
                        label: series.team_size.label().into(),
                        commands: view::path_commands(&series.points, &bounds).into(),
                        color: Color::from_rgb_u8(r, g, b),
                        summary: view::series_summary(series).into(),
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    window.set_plots(ModelRc::new(VecModel::from(plots)));
    window.set_graphs_text(view::empty_graphs_text(content.profile_id().is_some()).into());

    window.set_status_text(content.last_error().unwrap_or_default().into());
    let update_text = content
        .available_update()
        .map(|update| format!("New version available: {}", update.version))
        .unwrap_or_default();
    window.set_update_text(update_text.into());
}
