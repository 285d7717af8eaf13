use std::collections::BTreeSet;

use log::debug;

use crate::{ExerciseMode, RepeatCount, RepeatItem, RestMode, Step, StepId, StepMode, Summary};

/// Position of a node in the editor tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    TopLevel(usize),
    InGroup { group: usize, index: usize },
}

/// Borrowed view of a node in the editor tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Step(&'a Step),
    Item { group: StepId, item: &'a RepeatItem },
}

/// In-memory routine tree of a single editing session.
///
/// The tree has two levels: top-level steps, and the leaves held by repeat groups. All mutations
/// are total. A reference to a step that does not exist turns the operation into a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Editor {
    items: Vec<Step>,
}

impl Editor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_items(items: Vec<Step>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[Step] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<Step> {
        self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Aggregates computed over the current tree.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::of(&self.items)
    }

    #[must_use]
    pub fn locate(&self, id: StepId) -> Option<Location> {
        for (i, step) in self.items.iter().enumerate() {
            if step.id() == id {
                return Some(Location::TopLevel(i));
            }
            if let Step::RepeatGroup { items, .. } = step {
                if let Some(index) = items.iter().position(|item| item.id() == id) {
                    return Some(Location::InGroup { group: i, index });
                }
            }
        }
        None
    }

    #[must_use]
    pub fn get(&self, id: StepId) -> Option<Node<'_>> {
        match self.locate(id)? {
            Location::TopLevel(i) => Some(Node::Step(&self.items[i])),
            Location::InGroup { group, index } => match &self.items[group] {
                Step::RepeatGroup {
                    id: group_id,
                    items,
                    ..
                } => Some(Node::Item {
                    group: *group_id,
                    item: &items[index],
                }),
                Step::Exercise { .. } | Step::Rest { .. } => None,
            },
        }
    }

    #[must_use]
    pub fn contains(&self, id: StepId) -> bool {
        self.locate(id).is_some()
    }

    /// Identifier of the repeat group holding the given leaf.
    #[must_use]
    pub fn group_of(&self, id: StepId) -> Option<StepId> {
        match self.locate(id)? {
            Location::InGroup { group, .. } => Some(self.items[group].id()),
            Location::TopLevel(_) => None,
        }
    }

    #[must_use]
    pub fn group_items(&self, group_id: StepId) -> Option<&[RepeatItem]> {
        self.items.iter().find_map(|step| match step {
            Step::RepeatGroup { id, items, .. } if *id == group_id => Some(items.as_slice()),
            _ => None,
        })
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.items
            .iter()
            .map(|step| match step {
                Step::Exercise { .. } | Step::Rest { .. } => 1,
                Step::RepeatGroup { items, .. } => items.len(),
            })
            .sum()
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.items.iter().filter(|step| step.is_group()).count()
    }

    /// Checks that no repeat group is empty and that every identifier is unique in the tree.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let mut ids = BTreeSet::new();
        self.items.iter().all(Step::is_valid)
            && self
                .items
                .iter()
                .flat_map(Step::ids)
                .all(|id| ids.insert(id))
    }

    pub fn add_exercise(&mut self, exercise_ref: &str, name: &str, mode: ExerciseMode) -> StepId {
        let id = StepId::generate();
        self.items.push(Step::Exercise {
            id,
            exercise_ref: exercise_ref.to_string(),
            name: name.to_string(),
            mode,
        });
        id
    }

    pub fn add_rest(&mut self, mode: RestMode) -> StepId {
        let id = StepId::generate();
        self.items.push(Step::Rest { id, mode });
        id
    }

    /// Appends a new repeat group.
    ///
    /// The group is empty until a leaf is added to it. An empty group must be populated before
    /// the routine is saved.
    pub fn start_repeat_group(&mut self, repeat_count: RepeatCount) -> StepId {
        let id = StepId::generate();
        self.items.push(Step::RepeatGroup {
            id,
            repeat_count,
            items: vec![],
        });
        id
    }

    pub fn add_exercise_to_group(
        &mut self,
        group_id: StepId,
        exercise_ref: &str,
        name: &str,
        mode: ExerciseMode,
    ) -> Option<StepId> {
        let id = StepId::generate();
        self.push_to_group(
            group_id,
            RepeatItem::Exercise {
                id,
                exercise_ref: exercise_ref.to_string(),
                name: name.to_string(),
                mode,
            },
        )
        .then_some(id)
    }

    pub fn add_rest_to_group(&mut self, group_id: StepId, mode: RestMode) -> Option<StepId> {
        let id = StepId::generate();
        self.push_to_group(group_id, RepeatItem::Rest { id, mode })
            .then_some(id)
    }

    fn push_to_group(&mut self, group_id: StepId, item: RepeatItem) -> bool {
        if let Some(items) = self.group_items_mut(group_id) {
            items.push(item);
            true
        } else {
            debug!("ignored addition to unknown repeat group {group_id}");
            false
        }
    }

    /// Replaces the mode of a leaf. Unknown identifiers, groups and modes of the wrong kind are
    /// ignored.
    pub fn update_mode(&mut self, id: StepId, mode: impl Into<StepMode>) {
        let mode = mode.into();
        let applied = match self.locate(id) {
            Some(Location::TopLevel(i)) => self.items[i].set_mode(mode),
            Some(Location::InGroup { group, index }) => match &mut self.items[group] {
                Step::RepeatGroup { items, .. } => items[index].set_mode(mode),
                Step::Exercise { .. } | Step::Rest { .. } => false,
            },
            None => false,
        };
        if !applied {
            debug!("ignored mode update of step {id}");
        }
    }

    pub fn update_repeat_count(&mut self, group_id: StepId, repeat_count: RepeatCount) {
        match self.items.iter_mut().find(|step| step.id() == group_id) {
            Some(Step::RepeatGroup {
                repeat_count: count,
                ..
            }) => *count = repeat_count,
            _ => debug!("ignored repeat count update of step {group_id}"),
        }
    }

    /// Removes a step. Removing the last leaf of a repeat group removes the group.
    pub fn remove(&mut self, id: StepId) {
        match self.locate(id) {
            Some(Location::TopLevel(i)) => {
                self.items.remove(i);
            }
            Some(Location::InGroup { group, index }) => {
                self.take_from_group(group, index);
            }
            None => debug!("ignored removal of unknown step {id}"),
        }
    }

    /// Inserts a copy of a step directly after the original. Every copied node gets a new
    /// identifier.
    pub fn duplicate(&mut self, id: StepId) -> Option<StepId> {
        match self.locate(id) {
            Some(Location::TopLevel(i)) => {
                let copy = self.items[i].with_fresh_ids();
                let copy_id = copy.id();
                self.items.insert(i + 1, copy);
                Some(copy_id)
            }
            Some(Location::InGroup { group, index }) => match &mut self.items[group] {
                Step::RepeatGroup { items, .. } => {
                    let copy = items[index].with_fresh_id();
                    let copy_id = copy.id();
                    items.insert(index + 1, copy);
                    Some(copy_id)
                }
                Step::Exercise { .. } | Step::Rest { .. } => None,
            },
            None => {
                debug!("ignored duplication of unknown step {id}");
                None
            }
        }
    }

    /// Moves a leaf out of its repeat group to the top level, directly after the group. If the
    /// group becomes empty, the leaf takes the position of the removed group.
    pub fn move_out_of_repeat(&mut self, group_id: StepId, id: StepId) {
        let Some(Location::InGroup { group, index }) = self.locate(id) else {
            debug!("ignored move of step {id} which is not part of a repeat group");
            return;
        };
        if self.items[group].id() != group_id {
            debug!("ignored move of step {id} which is not part of repeat group {group_id}");
            return;
        }
        if let Some((item, group_removed)) = self.take_from_group(group, index) {
            let position = if group_removed { group } else { group + 1 };
            self.items.insert(position, Step::from(item));
        }
    }

    pub(crate) fn group_index(&self, group_id: StepId) -> Option<usize> {
        self.items
            .iter()
            .position(|step| step.is_group() && step.id() == group_id)
    }

    pub(crate) fn group_items_mut(&mut self, group_id: StepId) -> Option<&mut Vec<RepeatItem>> {
        self.items.iter_mut().find_map(|step| match step {
            Step::RepeatGroup { id, items, .. } if *id == group_id => Some(items),
            _ => None,
        })
    }

    pub(crate) fn top_level_index(&self, id: StepId) -> Option<usize> {
        self.items.iter().position(|step| step.id() == id)
    }

    pub(crate) fn take_top_level(&mut self, index: usize) -> Option<Step> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub(crate) fn insert_top_level(&mut self, index: usize, step: Step) {
        let index = index.min(self.items.len());
        self.items.insert(index, step);
    }

    /// Takes a leaf out of a group. The second value tells whether the group was removed because
    /// it became empty.
    pub(crate) fn take_from_group(
        &mut self,
        group: usize,
        index: usize,
    ) -> Option<(RepeatItem, bool)> {
        let Some(Step::RepeatGroup { items, .. }) = self.items.get_mut(group) else {
            return None;
        };
        if index >= items.len() {
            return None;
        }
        let item = items.remove(index);
        let group_removed = items.is_empty();
        if group_removed {
            self.items.remove(group);
        }
        Some((item, group_removed))
    }
}
