#![forbid(unsafe_code)]

//! Hour grouping and column split for the slot grid.
//!
//! The grid shows one row per hour, each row holding that hour's slots in
//! minute order, and distributes rows over a fixed number of columns. The
//! default day (09–22, two columns) renders 09–15 on the left and 16–22 on
//! the right.

use crate::slot::TimeSlot;

/// Default number of grid columns.
pub const DEFAULT_COLUMNS: usize = 2;

/// One hour row: the hour and its slot indices in minute order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourGroup {
    pub hour: u8,
    pub slots: Vec<usize>,
}

/// Group `slots` by hour, preserving index order.
#[must_use]
pub fn hour_groups(slots: &[TimeSlot]) -> Vec<HourGroup> {
    let mut groups: Vec<HourGroup> = Vec::new();
    for (index, slot) in slots.iter().enumerate() {
        match groups.last_mut() {
            Some(group) if group.hour == slot.hour() => group.slots.push(index),
            _ => groups.push(HourGroup {
                hour: slot.hour(),
                slots: vec![index],
            }),
        }
    }
    groups
}

/// Split hour rows into `columns` contiguous columns.
///
/// Earlier columns take the extra row when the split is uneven. A column
/// count of zero is treated as one; surplus columns are omitted rather than
/// rendered empty.
#[must_use]
pub fn split_columns(groups: &[HourGroup], columns: usize) -> Vec<Vec<HourGroup>> {
    if groups.is_empty() {
        return Vec::new();
    }
    let per_column = groups.len().div_ceil(columns.max(1));
    groups
        .chunks(per_column)
        .map(<[HourGroup]>::to_vec)
        .collect()
}
