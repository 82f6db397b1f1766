//! Reversible commands recorded by dynamics for the document's undo log.

use serde::Serialize;

use crate::model::{Anchor, ElementId, Point};
use crate::property::{PropertyId, PropertyValue};

/// A change that can be reverted on the element it targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UndoCommand {
    /// A property assignment. `old` is the raw stored value, not a resolved one.
    ChangeProperty {
        element: ElementId,
        id: PropertyId,
        old: PropertyValue,
        new: PropertyValue,
    },
    /// Reassignment of the time/staff anchor.
    ChangeParent {
        element: ElementId,
        old_anchor: Option<Anchor>,
        new_anchor: Anchor,
        old_user_off: Point,
    },
}

impl UndoCommand {
    pub fn element(&self) -> ElementId {
        match self {
            UndoCommand::ChangeProperty { element, .. } => *element,
            UndoCommand::ChangeParent { element, .. } => *element,
        }
    }
}

/// Append-only command log. Only the owning score pops from it.
#[derive(Debug, Default, Clone)]
pub struct UndoStack {
    commands: Vec<UndoCommand>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: UndoCommand) {
        self.commands.push(cmd);
    }

    pub fn last(&self) -> Option<&UndoCommand> {
        self.commands.last()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UndoCommand> {
        self.commands.iter()
    }

    pub(crate) fn pop(&mut self) -> Option<UndoCommand> {
        self.commands.pop()
    }
}
