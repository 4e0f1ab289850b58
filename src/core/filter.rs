use std::borrow::Cow;

use crate::interaction::Selection;

/// Returns the items visible under `selection`.
///
/// `Unselected` borrows the input untouched. `Selecting { low, high }`
/// keeps items with `low < value < high`; both bounds are exclusive so a
/// value sitting exactly on a brush edge never shows up on both sides of
/// adjacent selections. Input order is preserved.
#[must_use]
pub fn filter_records<'a, T, V>(items: &'a [T], selection: Selection, value_of: V) -> Cow<'a, [T]>
where
    T: Clone,
    V: Fn(&T) -> f64,
{
    match selection {
        Selection::Unselected => Cow::Borrowed(items),
        Selection::Selecting { low, high } => Cow::Owned(
            items
                .iter()
                .filter(|item| {
                    let value = value_of(*item);
                    low < value && value < high
                })
                .cloned()
                .collect(),
        ),
    }
}
