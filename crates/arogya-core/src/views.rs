//! Sidebar navigation and mutually exclusive panels
//!
//! The switcher keeps no "current view" of its own: whichever panel is not
//! hidden is the current one, exactly like toggling a `hidden` class.

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub id: String,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    /// Id of the panel this link shows
    pub target: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ViewSwitcher {
    panels: Vec<Panel>,
    links: Vec<NavLink>,
}

impl ViewSwitcher {
    /// Build from `(panel id, link label)` pairs; the first one starts visible
    /// and its link active.
    pub fn new<I, S, L>(views: I) -> Self
    where
        I: IntoIterator<Item = (S, L)>,
        S: Into<String>,
        L: Into<String>,
    {
        let mut switcher = Self::default();
        for (id, label) in views {
            let id = id.into();
            switcher.links.push(NavLink {
                label: label.into(),
                target: id.clone(),
                active: false,
            });
            switcher.panels.push(Panel { id, hidden: true });
        }
        if let Some(first) = switcher.panels.first().map(|p| p.id.clone()) {
            switcher.show_view(&first, Some(0));
        }
        switcher
    }

    /// Hide every panel, reveal `view_id` if it exists, then move the active
    /// marker to `invoker`. Unknown ids leave every panel hidden.
    pub fn show_view(&mut self, view_id: &str, invoker: Option<usize>) {
        for panel in &mut self.panels {
            panel.hidden = true;
        }

        match self.panels.iter_mut().find(|p| p.id == view_id) {
            Some(panel) => panel.hidden = false,
            None => debug!(view_id, "no panel with this id"),
        }

        for link in &mut self.links {
            link.active = false;
        }
        if let Some(link) = invoker.and_then(|i| self.links.get_mut(i)) {
            link.active = true;
        }
    }

    /// Sidebar click: show the link's target and mark the link active
    pub fn activate_link(&mut self, index: usize) {
        if let Some(target) = self.links.get(index).map(|l| l.target.clone()) {
            self.show_view(&target, Some(index));
        }
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    pub fn visible_panel(&self) -> Option<&str> {
        self.panels.iter().find(|p| !p.hidden).map(|p| p.id.as_str())
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.panels.iter().any(|p| p.id == id && !p.hidden)
    }

    pub fn active_link(&self) -> Option<usize> {
        self.links.iter().position(|l| l.active)
    }
}
