//! Default slack computations, shared by the allocation policies.
//!
//! The slack of a container is the difference between its capacity and its number of items. Growing geometrically
//! amortizes the cost of reallocations, while shrinking lazily avoids thrashing when items are added and removed
//! around a capacity boundary.

/// Number of items allocated on the first growth of a small container.
pub const FIRST_GROW: usize = 4;

/// Number of items added to every growth, on top of the geometric increment.
pub const CONSTANT_GROW: usize = 16;

/// Number of slack bytes above which a shrink is always considered.
pub const SHRINK_SLACK_BYTES: usize = 16 * 1024;

/// Number of slack items at, or below, which a non-empty container is never shrunk.
pub const SHRINK_SLACK_ITEMS: usize = 64;

/// Computes the capacity to allocate for `num` items, when the current capacity `max` is insufficient.
///
/// The result is at least `num`, unless `num` exceeds `limit`, and is clamped to `limit`, the largest count the
/// policy can represent.
///
/// #   Examples
///
/// ```
/// #   use owned_arrays::utils::slack::calculate_slack_grow;
/// //  First growth of an empty container.
/// assert_eq!(4, calculate_slack_grow(1, 0, usize::MAX));
///
/// //  Subsequent growths are geometric.
/// assert_eq!(5 + 15 / 8 + 16, calculate_slack_grow(5, 4, usize::MAX));
/// ```
#[inline]
pub const fn calculate_slack_grow(num: usize, max: usize, limit: usize) -> usize {
    debug_assert!(num > max);

    let grow = if max != 0 || num > FIRST_GROW {
        //  Saturate rather than overflow; the result is clamped below anyway.
        num.saturating_add((num / 8).saturating_mul(3))
            .saturating_add((num % 8) * 3 / 8)
            .saturating_add(CONSTANT_GROW)
    } else {
        FIRST_GROW
    };

    if grow > limit { limit } else { grow }
}

/// Computes the capacity to keep for `num` items, when the current capacity is `max`.
///
/// Returns `max` to decline shrinking: the slack is only relinquished if it is large, both relative to the number of
/// items and in absolute terms, or the container is empty.
///
/// #   Examples
///
/// ```
/// #   use owned_arrays::utils::slack::calculate_slack_shrink;
/// //  Small slack is kept.
/// assert_eq!(100, calculate_slack_shrink(90, 100, 4));
///
/// //  Empty containers release their storage.
/// assert_eq!(0, calculate_slack_shrink(0, 100, 4));
///
/// //  Large slack is released.
/// assert_eq!(10, calculate_slack_shrink(10, 1000, 4));
/// ```
#[inline]
pub const fn calculate_slack_shrink(num: usize, max: usize, item_size: usize) -> usize {
    debug_assert!(num <= max);

    let slack = max - num;

    let too_many_slack_bytes = slack.saturating_mul(item_size) >= SHRINK_SLACK_BYTES;
    let too_many_slack_items = num.saturating_mul(3) < max.saturating_mul(2);

    if (too_many_slack_bytes || too_many_slack_items) && (slack > SHRINK_SLACK_ITEMS || num == 0) {
        num
    } else {
        max
    }
}

/// Computes the capacity to allocate when explicitly reserving room for `num` items.
///
/// Explicit reservations are honoured exactly.
#[inline]
pub const fn calculate_slack_reserve(num: usize) -> usize {
    num
}
