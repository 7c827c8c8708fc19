/// Resolution of the fixture's hue wheel. Hue values run `0..WHEEL_SIZE`.
pub const WHEEL_SIZE: u32 = 65535;

/// Smallest hue the bridge can tell apart from "no hue given".
pub const MIN_HUE: u16 = 1;

/// Start angle for the group at `index` out of `count` groups sorted by name.
///
/// Groups are spread evenly around the wheel. A result of 0 is sent as
/// `MIN_HUE`, because a zero hue is dropped on the wire and the fixture would
/// fall back to its own start angle.
pub fn start_hue(index: usize, count: usize) -> u16 {
    if count == 0 {
        return MIN_HUE;
    }
    let hue = (index as u64 * u64::from(WHEEL_SIZE) / count as u64) as u16;
    return hue.max(MIN_HUE);
}

/// Start angles for every group, in ascending name order.
pub fn group_offsets<'a, I>(names: I) -> Vec<(&'a str, u16)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sorted: Vec<&str> = names.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();
    let count = sorted.len();
    return sorted
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, start_hue(i, count)))
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_groups() {
        let offsets = group_offsets(["left", "center", "right"]);
        assert_eq!(offsets, vec![("center", 1), ("left", 21845), ("right", 43690)]);
    }

    #[test]
    fn single_group_starts_at_min_hue() {
        assert_eq!(group_offsets(["all"]), vec![("all", MIN_HUE)]);
    }

    #[test]
    fn offsets_are_evenly_spaced() {
        for count in 1..=12usize {
            let hues: Vec<u32> = (0..count).map(|i| u32::from(start_hue(i, count))).collect();
            let expected = WHEEL_SIZE / count as u32;
            for pair in hues.windows(2) {
                assert!(pair[1] > pair[0]);
                // Floor division may shave one off a gap.
                let gap = pair[1] - pair[0];
                assert!(
                    gap == expected
                        || gap == expected + 1
                        || (pair[0] == 1 && gap == expected - 1)
                );
            }
            // Wrapping from the last group back to the first.
            let wrap = (WHEEL_SIZE - hues[count - 1]) + hues[0];
            assert!(wrap >= expected, "{} groups: wrap gap {}", count, wrap);
            assert!(wrap <= expected + 2, "{} groups: wrap gap {}", count, wrap);
            assert!(hues.iter().all(|h| *h > 0 && *h < WHEEL_SIZE));
        }
    }

    #[test]
    fn zero_groups() {
        assert_eq!(start_hue(0, 0), MIN_HUE);
        assert!(group_offsets(Vec::<&str>::new()).is_empty());
    }
}
