//! Stable insertion sort for short slices of `Copy` values,
//! used to order the hits of a single ray.

use std::cmp::Ordering;

/// Sorts `slice` stably, in place and without allocating.
///
/// A leading run is detected first (a strictly descending one gets reversed),
/// the rest is placed with binary insertion. Quadratic in the worst case, meant for
/// the handful of hits a ray typically has.
pub fn sort_by<T: Copy, F: FnMut(&T, &T) -> Ordering>(slice: &mut [T], mut compare: F) {
    if slice.len() < 2 {
        return;
    }
    let run_length = leading_run(slice, &mut compare);
    binary_insertion_sort(slice, run_length, &mut compare);
}

pub fn sort_by_key<T: Copy, K: Ord, F: FnMut(&T) -> K>(slice: &mut [T], mut key: F) {
    sort_by(slice, |a, b| key(a).cmp(&key(b)));
}

/// Length of the sorted prefix of `slice`, after making it ascending.
/// Strictly descending prefixes are reversed, which keeps the sort stable.
fn leading_run<T, F: FnMut(&T, &T) -> Ordering>(slice: &mut [T], compare: &mut F) -> usize {
    debug_assert!(slice.len() >= 2);
    let mut end = 2;
    if compare(&slice[1], &slice[0]) == Ordering::Less {
        while end < slice.len() && compare(&slice[end], &slice[end - 1]) == Ordering::Less {
            end += 1;
        }
        slice[..end].reverse();
    } else {
        while end < slice.len() && compare(&slice[end], &slice[end - 1]) != Ordering::Less {
            end += 1;
        }
    }
    end
}

/// Sorts `slice`, assuming `slice[..sorted]` is already in order.
fn binary_insertion_sort<T: Copy, F: FnMut(&T, &T) -> Ordering>(
    slice: &mut [T],
    sorted: usize,
    compare: &mut F,
) {
    for start in sorted.max(1)..slice.len() {
        let pivot = slice[start];

        // First slot whose element is greater than the pivot,
        // equal elements stay in front of it.
        let mut left = 0;
        let mut right = start;
        while left < right {
            let mid = left + (right - left) / 2;
            if compare(&pivot, &slice[mid]) == Ordering::Less {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        slice.copy_within(left..start, left + 1);
        slice[left] = pivot;
    }
}
