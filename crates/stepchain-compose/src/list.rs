use tracing::trace;

use crate::step::Step;

/// One entry of a step list as supplied by the caller.
#[derive(Debug, Clone)]
pub enum Entry {
    /// A step to run.
    Step(Step),
    /// A placeholder that contributes nothing.
    Skip,
    /// Related steps grouped for readability. Empty slots are skipped.
    Group(Vec<Option<Step>>),
}

impl From<Step> for Entry {
    fn from(step: Step) -> Self {
        Self::Step(step)
    }
}

impl From<Option<Step>> for Entry {
    fn from(step: Option<Step>) -> Self {
        step.map_or(Self::Skip, Self::Step)
    }
}

impl From<Vec<Step>> for Entry {
    fn from(steps: Vec<Step>) -> Self {
        Self::Group(steps.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<Step>>> for Entry {
    fn from(slots: Vec<Option<Step>>) -> Self {
        Self::Group(slots)
    }
}

/// Builder for an ordered list of entries.
///
/// ```
/// use stepchain_compose::{Step, StepList, Value};
///
/// let notify = false;
/// let list = StepList::new()
///     .step(Step::nullary("load", || Value::from(1_i64)))
///     .maybe(notify.then(|| Step::nullary("notify", || ())))
///     .group([Step::nullary("audit", || ()), Step::nullary("index", || ())]);
///
/// assert_eq!(list.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StepList {
    entries: Vec<Entry>,
}

impl StepList {
    /// Start an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.entries.push(Entry::Step(step));
        self
    }

    /// Add a placeholder that is dropped when the list is flattened.
    #[must_use]
    pub fn skip(mut self) -> Self {
        self.entries.push(Entry::Skip);
        self
    }

    /// Add a step that may be absent.
    #[must_use]
    pub fn maybe(mut self, step: Option<Step>) -> Self {
        self.entries.push(step.into());
        self
    }

    /// Add a group of steps, spliced in place when the list is flattened.
    #[must_use]
    pub fn group<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Option<Step>>,
    {
        self.entries
            .push(Entry::Group(steps.into_iter().map(Into::into).collect()));
        self
    }

    /// Append an entry in place.
    pub fn push(&mut self, entry: impl Into<Entry>) {
        self.entries.push(entry.into());
    }

    /// Number of entries, counting placeholders and groups as one each.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for StepList {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<Entry> for StepList {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<E: Into<Entry>> Extend<E> for StepList {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        self.entries.extend(iter.into_iter().map(Into::into));
    }
}

/// Flatten groups one level and drop placeholders, preserving order.
pub fn flatten<I>(entries: I) -> Vec<Step>
where
    I: IntoIterator<Item = Entry>,
{
    let mut steps = Vec::new();
    for entry in entries {
        match entry {
            Entry::Step(step) => steps.push(step),
            Entry::Skip => trace!("dropping skip marker"),
            Entry::Group(slots) => {
                if slots.is_empty() {
                    trace!("dropping empty group");
                }
                for slot in slots {
                    match slot {
                        Some(step) => steps.push(step),
                        None => trace!("dropping skip marker inside group"),
                    }
                }
            }
        }
    }
    steps
}
