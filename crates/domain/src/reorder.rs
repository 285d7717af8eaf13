use log::{debug, warn};

use crate::{Editor, Location, RepeatItem, Step, StepId};

/// Drag state of the routine editor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    DraggingLeaf {
        leaf: StepId,
        source_group: Option<StepId>,
    },
    DraggingGroup {
        group: StepId,
    },
}

/// Insertion point relative to the siblings of one level of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Start,
    Before(StepId),
    After(StepId),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    TopLevel(Position),
    Group { group: StepId, position: Position },
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderError {
    #[error("a drag is already in progress")]
    AlreadyDragging,
    #[error("no drag in progress")]
    NotDragging,
    #[error("unknown step {0}")]
    UnknownStep(StepId),
    #[error("steps cannot be dragged out of a repeat group")]
    LeafOutsideGroup,
    #[error("repeat groups cannot be nested")]
    NestedGroup,
    #[error("drop target no longer exists")]
    TargetMissing,
}

/// Drag-and-drop protocol over an [`Editor`].
///
/// Positions are resolved against the live tree when the drop happens. A drop either moves
/// exactly one node or leaves the tree untouched. Every drop and cancellation returns the engine
/// to [`DragState::Idle`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReorderEngine {
    state: DragState,
    hovered_group: Option<StepId>,
}

impl ReorderEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == DragState::Idle
    }

    /// Repeat group currently highlighted as a drop target.
    #[must_use]
    pub fn hovered_group(&self) -> Option<StepId> {
        self.hovered_group
    }

    pub fn start_drag(&mut self, editor: &Editor, id: StepId) -> Result<(), ReorderError> {
        if !self.is_idle() {
            return Err(ReorderError::AlreadyDragging);
        }
        self.state = match editor.locate(id) {
            Some(Location::TopLevel(i)) if editor.items()[i].is_group() => {
                DragState::DraggingGroup { group: id }
            }
            Some(Location::TopLevel(_)) => DragState::DraggingLeaf {
                leaf: id,
                source_group: None,
            },
            Some(Location::InGroup { .. }) => DragState::DraggingLeaf {
                leaf: id,
                source_group: editor.group_of(id),
            },
            None => return Err(ReorderError::UnknownStep(id)),
        };
        debug!("started dragging step {id}");
        Ok(())
    }

    /// The pointer entered the bounds of a repeat group.
    ///
    /// Only leaves from outside the group highlight it, as they are the only drags the group
    /// accepts as a whole.
    pub fn enter_group(&mut self, group: StepId) {
        if let DragState::DraggingLeaf { source_group, .. } = self.state {
            if source_group != Some(group) {
                self.hovered_group = Some(group);
            }
        }
    }

    /// The pointer left the bounds of a repeat group.
    pub fn exit_group(&mut self, group: StepId) {
        if self.hovered_group == Some(group) {
            self.hovered_group = None;
        }
    }

    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Drops the dragged step at the target.
    ///
    /// If the drop is rejected, the tree is left unchanged.
    pub fn drop(&mut self, editor: &mut Editor, target: DropTarget) -> Result<(), ReorderError> {
        let state = self.state;
        self.reset();
        let result = match state {
            DragState::Idle => Err(ReorderError::NotDragging),
            DragState::DraggingLeaf { leaf, source_group } => {
                drop_leaf(editor, leaf, source_group, target)
            }
            DragState::DraggingGroup { group } => drop_group(editor, group, target),
        };
        if let Err(err) = result {
            warn!("rejected drop at {target:?}: {err}");
        }
        result
    }

    fn reset(&mut self) {
        self.state = DragState::Idle;
        self.hovered_group = None;
    }
}

/// A leaf that was inside a repeat group when the drag started is never dropped at the top
/// level, even if it has left the group in the meantime.
fn drop_leaf(
    editor: &mut Editor,
    leaf: StepId,
    source_group: Option<StepId>,
    target: DropTarget,
) -> Result<(), ReorderError> {
    let source = editor.locate(leaf).ok_or(ReorderError::UnknownStep(leaf))?;
    match (source, target) {
        (Location::InGroup { .. }, DropTarget::TopLevel(_)) => {
            Err(ReorderError::LeafOutsideGroup)
        }
        (Location::TopLevel(_), DropTarget::TopLevel(_)) if source_group.is_some() => {
            Err(ReorderError::LeafOutsideGroup)
        }
        (Location::TopLevel(from), DropTarget::TopLevel(position)) => {
            move_top_level(editor, from, leaf, position)
        }
        (_, DropTarget::Group { group, position }) => {
            let items = editor
                .group_items(group)
                .ok_or(ReorderError::TargetMissing)?;
            validate_anchor(items.iter().map(RepeatItem::id), position)?;
            if anchor(position) == Some(leaf) {
                return Ok(());
            }
            let item = match source {
                Location::TopLevel(from) => {
                    if editor.items()[from].is_group() {
                        return Err(ReorderError::UnknownStep(leaf));
                    }
                    editor
                        .take_top_level(from)
                        .and_then(|step| RepeatItem::try_from(step).ok())
                }
                Location::InGroup { index, .. } if editor.group_of(leaf) == Some(group) => {
                    return reorder_in_group(editor, group, index, position);
                }
                Location::InGroup { group, index } => {
                    editor.take_from_group(group, index).map(|(item, _)| item)
                }
            }
            .ok_or(ReorderError::UnknownStep(leaf))?;
            insert_into_group(editor, group, position, item)
        }
    }
}

fn drop_group(editor: &mut Editor, group: StepId, target: DropTarget) -> Result<(), ReorderError> {
    let from = editor
        .group_index(group)
        .ok_or(ReorderError::UnknownStep(group))?;
    match target {
        DropTarget::Group { .. } => Err(ReorderError::NestedGroup),
        DropTarget::TopLevel(position) => move_top_level(editor, from, group, position),
    }
}

fn move_top_level(
    editor: &mut Editor,
    from: usize,
    id: StepId,
    position: Position,
) -> Result<(), ReorderError> {
    validate_anchor(editor.items().iter().map(Step::id), position)?;
    if anchor(position) == Some(id) {
        return Ok(());
    }
    let step = editor
        .take_top_level(from)
        .ok_or(ReorderError::UnknownStep(id))?;
    let index = resolve(editor.items().iter().map(Step::id), position);
    editor.insert_top_level(index, step);
    Ok(())
}

/// Moves a leaf within its own group. The group keeps its size, so it is never removed.
fn reorder_in_group(
    editor: &mut Editor,
    group: StepId,
    from: usize,
    position: Position,
) -> Result<(), ReorderError> {
    let items = editor
        .group_items_mut(group)
        .ok_or(ReorderError::TargetMissing)?;
    if from >= items.len() {
        return Err(ReorderError::TargetMissing);
    }
    let item = items.remove(from);
    let index = resolve(items.iter().map(RepeatItem::id), position);
    items.insert(index, item);
    Ok(())
}

fn insert_into_group(
    editor: &mut Editor,
    group: StepId,
    position: Position,
    item: RepeatItem,
) -> Result<(), ReorderError> {
    // The source group may have been removed, so the target is looked up again.
    let items = editor
        .group_items_mut(group)
        .ok_or(ReorderError::TargetMissing)?;
    let index = resolve(items.iter().map(RepeatItem::id), position);
    items.insert(index, item);
    Ok(())
}

fn anchor(position: Position) -> Option<StepId> {
    match position {
        Position::Before(id) | Position::After(id) => Some(id),
        Position::Start | Position::End => None,
    }
}

fn validate_anchor(
    mut siblings: impl Iterator<Item = StepId>,
    position: Position,
) -> Result<(), ReorderError> {
    match anchor(position) {
        Some(id) if !siblings.any(|sibling| sibling == id) => Err(ReorderError::TargetMissing),
        _ => Ok(()),
    }
}

/// Index at which to insert into a sibling list from which the moved node has been removed.
fn resolve(mut siblings: impl ExactSizeIterator<Item = StepId>, position: Position) -> usize {
    let len = siblings.len();
    match position {
        Position::Start => 0,
        Position::End => len,
        Position::Before(id) => siblings.position(|s| s == id).unwrap_or(len),
        Position::After(id) => siblings.position(|s| s == id).map_or(len, |i| i + 1),
    }
}
