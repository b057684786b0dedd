//! Menu command table
//!
//! The menu bar is described as data: `menu_layout` lists every menu and entry, and
//! `CommandTable` maps entry ids to the action they trigger. The GUI builds its
//! widgets from the layout and forwards clicked ids to `MainWindowModel::trigger`.

use std::collections::HashMap;
use std::path::Path;

/// Folder opened by a File menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderTarget {
    /// HTML overlay layout files
    Html,
    /// Settings and logs
    Config,
}

/// What a menu entry does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Show a folder in the system file browser
    OpenFolder(FolderTarget),
    /// Open a web page
    OpenUrl(&'static str),
    /// Quit the application
    Exit,
    /// Toggle the rating plot at the given index
    ShowGraph(usize),
    /// Toggle the "Last 24h" filter
    LastDay,
}

/// One menu entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    /// Stable identifier passed back by the GUI
    pub id: &'static str,
    /// Visible text
    pub label: String,
    /// Triggered action
    pub action: MenuAction,
    /// Whether the entry is a checkbox
    pub checkable: bool,
}

/// A top-level menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    /// Menu title
    pub title: &'static str,
    /// Entries in display order
    pub entries: Vec<MenuEntry>,
}

/// Ids of the graph toggles, index-aligned with the four team sizes
pub const GRAPH_COMMAND_IDS: [&str; 4] = ["graph-1", "graph-2", "graph-3", "graph-4"];

/// Id of the "Last 24h" toggle
pub const LAST_DAY_COMMAND_ID: &str = "graph-last-day";

/// External links shown in the Links menu as (id, label, url)
pub const LINKS: [(&str, &str, &str); 6] = [
    ("link-github", "App on Github", "https://github.com/FluffyMaguro/AoE4_Overlay"),
    ("link-discord", "My discord", "https://discord.gg/FtGdhqD"),
    ("link-maguro", "Maguro.one", "https://www.maguro.one/"),
    ("link-donate", "Donate", "https://www.paypal.com/paypalme/FluffyMaguro"),
    ("link-aoeivnet", "AoEIV.net", "https://aoeiv.net/"),
    ("link-aoe4world", "AoE4 World", "https://aoe4world.com/"),
];

fn entry(id: &'static str, label: impl Into<String>, action: MenuAction) -> MenuEntry {
    MenuEntry {
        id,
        label: label.into(),
        action,
        checkable: false,
    }
}

/// Menus in display order: File, Graphs, Links
pub fn menu_layout() -> Vec<Menu> {
    let file = Menu {
        title: "File",
        entries: vec![
            entry("file-html", "Html files", MenuAction::OpenFolder(FolderTarget::Html)),
            entry("file-config", "Config/logs", MenuAction::OpenFolder(FolderTarget::Config)),
            entry("file-exit", "Exit", MenuAction::Exit),
        ],
    };

    let mut graph_entries: Vec<MenuEntry> = GRAPH_COMMAND_IDS
        .iter()
        .enumerate()
        .map(|(index, &id)| {
            let n = index + 1;
            MenuEntry {
                checkable: true,
                ..entry(id, format!("Show {n}v{n}"), MenuAction::ShowGraph(index))
            }
        })
        .collect();
    graph_entries.push(MenuEntry {
        checkable: true,
        ..entry(LAST_DAY_COMMAND_ID, "Last 24h", MenuAction::LastDay)
    });
    let graphs = Menu {
        title: "Graphs",
        entries: graph_entries,
    };

    let links = Menu {
        title: "Links",
        entries: LINKS
            .iter()
            .map(|&(id, label, url)| entry(id, label, MenuAction::OpenUrl(url)))
            .collect(),
    };

    vec![file, graphs, links]
}

/// Lookup from entry id to action
#[derive(Debug, Clone)]
pub struct CommandTable {
    actions: HashMap<&'static str, MenuAction>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::from_layout(&menu_layout())
    }
}

impl CommandTable {
    /// Build the table from a menu layout
    pub fn from_layout(menus: &[Menu]) -> Self {
        let actions = menus
            .iter()
            .flat_map(|m| m.entries.iter())
            .map(|e| (e.id, e.action))
            .collect();
        Self { actions }
    }

    /// Action bound to `id`
    pub fn lookup(&self, id: &str) -> Option<MenuAction> {
        self.actions.get(id).copied()
    }

    /// Number of registered commands
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Launches external navigation for menu actions
pub trait Navigator: Send {
    /// Show `path` in the file browser
    fn open_folder(&self, path: &Path);
    /// Open `url` in the browser
    fn open_url(&self, url: &str);
}

/// `Navigator` using the operating system's default handlers
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNavigator;

impl Navigator for SystemNavigator {
    fn open_folder(&self, path: &Path) {
        crate::utils::open_folder(path);
    }

    fn open_url(&self, url: &str) {
        crate::utils::open_url(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_layout_order_and_titles() {
        let titles: Vec<&str> = menu_layout().iter().map(|m| m.title).collect();
        assert_eq!(titles, ["File", "Graphs", "Links"]);
    }

    #[test]
    fn test_ids_are_unique() {
        let layout = menu_layout();
        let ids: Vec<&str> = layout
            .iter()
            .flat_map(|m| m.entries.iter().map(|e| e.id))
            .collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
        assert_eq!(CommandTable::default().len(), ids.len());
    }

    #[test]
    fn test_file_menu_entries() {
        let layout = menu_layout();
        assert_eq!(
            layout[0].entries,
            [
                entry("file-html", "Html files", MenuAction::OpenFolder(FolderTarget::Html)),
                entry("file-config", "Config/logs", MenuAction::OpenFolder(FolderTarget::Config)),
                entry("file-exit", "Exit", MenuAction::Exit),
            ]
        );
    }

    #[test]
    fn test_graph_entries_are_checkable() {
        let layout = menu_layout();
        let graphs = &layout[1];
        assert_eq!(graphs.entries.len(), 5);
        assert!(graphs.entries.iter().all(|e| e.checkable));
        assert_eq!(graphs.entries[2].label, "Show 3v3");
        assert_eq!(graphs.entries[4].label, "Last 24h");
    }

    #[test]
    fn test_lookup() {
        let table = CommandTable::default();
        assert_eq!(table.lookup("file-exit"), Some(MenuAction::Exit));
        assert_eq!(table.lookup("graph-2"), Some(MenuAction::ShowGraph(1)));
        assert_eq!(
            table.lookup("link-aoe4world"),
            Some(MenuAction::OpenUrl("https://aoe4world.com/"))
        );
        assert_eq!(table.lookup("nope"), None);
    }
}
