use std::fmt;
use std::sync::Arc;

use crate::domain::entities::record::Record;

pub type IndexedHandler = Arc<dyn Fn(usize, &Record) + Send + Sync>;
pub type RecordHandler = Arc<dyn Fn(&Record) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    ShowInfo,
    Download,
    Call,
    Email,
    Edit,
    Delete,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        ActionKind::ShowInfo,
        ActionKind::Download,
        ActionKind::Call,
        ActionKind::Email,
        ActionKind::Edit,
        ActionKind::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::ShowInfo => "showInfo",
            ActionKind::Download => "download",
            ActionKind::Call => "call",
            ActionKind::Email => "email",
            ActionKind::Edit => "edit",
            ActionKind::Delete => "delete",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct ActionHook<H> {
    pub enabled: bool,
    pub handler: H,
}

impl<H> ActionHook<H> {
    pub fn enabled(handler: H) -> Self {
        Self {
            enabled: true,
            handler,
        }
    }

    pub fn disabled(handler: H) -> Self {
        Self {
            enabled: false,
            handler,
        }
    }
}

impl<H> fmt::Debug for ActionHook<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHook")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Per-column row action capabilities.
///
/// `call` and `email` only receive the record; every other action also
/// receives the row's absolute index across pages.
#[derive(Clone, Default, Debug)]
pub struct RowActions {
    pub show_info: Option<ActionHook<IndexedHandler>>,
    pub download: Option<ActionHook<IndexedHandler>>,
    pub call: Option<ActionHook<RecordHandler>>,
    pub email: Option<ActionHook<RecordHandler>>,
    pub edit: Option<ActionHook<IndexedHandler>>,
    pub delete: Option<ActionHook<IndexedHandler>>,
}

impl RowActions {
    pub fn is_enabled(&self, kind: ActionKind) -> bool {
        match kind {
            ActionKind::ShowInfo => hook_enabled(&self.show_info),
            ActionKind::Download => hook_enabled(&self.download),
            ActionKind::Call => hook_enabled(&self.call),
            ActionKind::Email => hook_enabled(&self.email),
            ActionKind::Edit => hook_enabled(&self.edit),
            ActionKind::Delete => hook_enabled(&self.delete),
        }
    }

    pub fn enabled_kinds(&self) -> Vec<ActionKind> {
        ActionKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }

    /// Runs the handler for `kind`. Returns `false` when it is absent or disabled.
    pub fn invoke(&self, kind: ActionKind, absolute_index: usize, record: &Record) -> bool {
        let indexed = match kind {
            ActionKind::ShowInfo => &self.show_info,
            ActionKind::Download => &self.download,
            ActionKind::Edit => &self.edit,
            ActionKind::Delete => &self.delete,
            ActionKind::Call => return run_record_hook(&self.call, record),
            ActionKind::Email => return run_record_hook(&self.email, record),
        };
        match indexed {
            Some(hook) if hook.enabled => {
                (hook.handler)(absolute_index, record);
                true
            }
            _ => false,
        }
    }
}

fn hook_enabled<H>(hook: &Option<ActionHook<H>>) -> bool {
    hook.as_ref().is_some_and(|hook| hook.enabled)
}

fn run_record_hook(hook: &Option<ActionHook<RecordHandler>>, record: &Record) -> bool {
    match hook {
        Some(hook) if hook.enabled => {
            (hook.handler)(record);
            true
        }
        _ => false,
    }
}
