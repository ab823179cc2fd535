//! Enabled/busy state of the action controls.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Extract,
    Summarize,
    Search,
}

impl Control {
    pub const ALL: [Control; 3] = [Control::Extract, Control::Summarize, Control::Search];

    pub fn idle_label(&self) -> &'static str {
        match self {
            Control::Extract => "Extract Text",
            Control::Summarize => "Summarize",
            Control::Search => "Search",
        }
    }

    pub fn busy_label(&self) -> &'static str {
        match self {
            Control::Extract => "Extracting...",
            Control::Summarize => "Summarizing...",
            Control::Search => "Searching...",
        }
    }

    pub fn dom_id(&self) -> &'static str {
        match self {
            Control::Extract => "extractBtn",
            Control::Summarize => "summarizeBtn",
            Control::Search => "searchBtn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub enabled: bool,
    pub busy: bool,
}

impl ControlState {
    /// Whether a click would be accepted.
    pub fn is_clickable(&self) -> bool {
        self.enabled && !self.busy
    }
}

/// State of every action control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    extract: ControlState,
    summarize: ControlState,
    search: ControlState,
}

impl Default for Controls {
    fn default() -> Self {
        let disabled = ControlState {
            enabled: false,
            busy: false,
        };
        Self {
            extract: disabled,
            summarize: disabled,
            search: disabled,
        }
    }
}

impl Controls {
    pub fn get(&self, control: Control) -> ControlState {
        match control {
            Control::Extract => self.extract,
            Control::Summarize => self.summarize,
            Control::Search => self.search,
        }
    }

    fn get_mut(&mut self, control: Control) -> &mut ControlState {
        match control {
            Control::Extract => &mut self.extract,
            Control::Summarize => &mut self.summarize,
            Control::Search => &mut self.search,
        }
    }

    /// Label currently shown on the control.
    pub fn label(&self, control: Control) -> &'static str {
        if self.get(control).busy {
            control.busy_label()
        } else {
            control.idle_label()
        }
    }

    /// Enable or disable every control depending on whether documents exist.
    pub fn set_documents_available(&mut self, available: bool) {
        for control in Control::ALL {
            self.get_mut(control).enabled = available;
        }
    }

    /// Mark a control busy. Returns false when it already was.
    pub fn begin(&mut self, control: Control) -> bool {
        let state = self.get_mut(control);
        if state.busy {
            return false;
        }
        state.busy = true;
        true
    }

    /// Restore a control after its request settled.
    pub fn finish(&mut self, control: Control) {
        self.get_mut(control).busy = false;
    }
}
