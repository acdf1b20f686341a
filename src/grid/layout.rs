//! Column width distribution.
//!
//! Fixed columns keep their width. The remaining space is shared among the
//! flexible columns in proportion to their natural widths; any column that
//! ends up below the minimum is pinned to it and the shortfall is taken
//! evenly from the flexible columns not pinned yet. The loop ends when no
//! unpinned column is below the minimum or every flexible column is pinned.

/// How a column asks for space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthSpec {
    /// Exactly this many cells.
    Fixed(usize),
    /// A share of the free space proportional to this natural width.
    Natural(usize),
}

/// Laid-out widths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Width of each column, in column order.
    pub widths: Vec<usize>,
    /// True when the columns need more than the container offers.
    pub overflow: bool,
}

impl ColumnLayout {
    /// Sum of all widths.
    pub fn total(&self) -> usize {
        self.widths.iter().sum()
    }
}

const EPSILON: f64 = 1e-9;

/// Distributes `container` cells over `specs`.
///
/// Whenever some flexible column stays unpinned the widths sum to exactly
/// `container`; fixed widths are honoured as given.
pub fn distribute(specs: &[WidthSpec], container: usize, min: usize) -> ColumnLayout {
    let fixed: usize = specs
        .iter()
        .map(|s| match s {
            WidthSpec::Fixed(w) => *w,
            WidthSpec::Natural(_) => 0,
        })
        .sum();
    let free = container.saturating_sub(fixed);
    let flex: Vec<usize> = specs
        .iter()
        .enumerate()
        .filter_map(|(i, s)| matches!(s, WidthSpec::Natural(_)).then_some(i))
        .collect();

    let natural_sum: usize = specs
        .iter()
        .map(|s| match s {
            WidthSpec::Natural(w) => *w,
            WidthSpec::Fixed(_) => 0,
        })
        .sum();

    let mut targets = vec![0.0_f64; specs.len()];
    for &i in &flex {
        targets[i] = match specs[i] {
            WidthSpec::Natural(_) if natural_sum == 0 => free as f64 / flex.len() as f64,
            WidthSpec::Natural(w) => w as f64 * free as f64 / natural_sum as f64,
            WidthSpec::Fixed(_) => 0.0,
        };
    }

    let mut pinned = vec![false; specs.len()];
    let min_f = min as f64;
    while let Some(&narrow) = flex
        .iter()
        .find(|&&i| !pinned[i] && targets[i] < min_f - EPSILON)
    {
        let shortfall = min_f - targets[narrow];
        targets[narrow] = min_f;
        pinned[narrow] = true;
        let rest: Vec<usize> = flex.iter().copied().filter(|&i| !pinned[i]).collect();
        if rest.is_empty() {
            break;
        }
        let share = shortfall / rest.len() as f64;
        for i in rest {
            targets[i] -= share;
        }
    }

    let mut widths: Vec<usize> = specs
        .iter()
        .enumerate()
        .map(|(i, s)| match s {
            WidthSpec::Fixed(w) => *w,
            WidthSpec::Natural(_) if pinned[i] => min,
            WidthSpec::Natural(_) => (targets[i] + EPSILON).floor() as usize,
        })
        .collect();

    // Largest remainder: hand out the cells lost to flooring.
    let open: Vec<usize> = flex.iter().copied().filter(|&i| !pinned[i]).collect();
    if !open.is_empty() {
        let assigned: usize = flex.iter().map(|&i| widths[i]).sum();
        let mut remainder = free.saturating_sub(assigned);
        let mut by_fraction = open.clone();
        by_fraction.sort_by(|&a, &b| {
            let fa = targets[a] - targets[a].floor();
            let fb = targets[b] - targets[b].floor();
            fb.total_cmp(&fa).then(a.cmp(&b))
        });
        for i in by_fraction.into_iter().cycle() {
            if remainder == 0 {
                break;
            }
            widths[i] += 1;
            remainder -= 1;
        }
    }

    let total: usize = widths.iter().sum();
    ColumnLayout {
        overflow: total > container,
        widths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WidthSpec::{Fixed, Natural};

    #[test]
    fn test_proportional_split_fills_container() {
        let layout = distribute(&[Natural(10), Natural(30)], 80, 5);
        assert_eq!(layout.widths, vec![20, 60]);
        assert!(!layout.overflow);
    }

    #[test]
    fn test_fixed_widths_are_exact() {
        let layout = distribute(&[Fixed(3), Natural(1), Natural(1), Fixed(7)], 50, 4);
        assert_eq!(layout.widths[0], 3);
        assert_eq!(layout.widths[3], 7);
        assert_eq!(layout.total(), 50);
    }

    #[test]
    fn test_narrow_columns_are_pinned_to_minimum() {
        let layout = distribute(&[Natural(1), Natural(50), Natural(49)], 100, 10);
        assert_eq!(layout.widths[0], 10);
        assert!(layout.widths.iter().all(|&w| w >= 10));
        assert_eq!(layout.total(), 100);
    }

    #[test]
    fn test_cascading_pins() {
        // Pinning the first column pushes the second under the minimum too.
        let layout = distribute(&[Natural(1), Natural(9), Natural(90)], 40, 10);
        assert_eq!(layout.widths, vec![10, 10, 20]);
        assert!(!layout.overflow);
    }

    #[test]
    fn test_all_pinned_overflows() {
        let layout = distribute(&[Natural(1), Natural(1), Natural(1)], 20, 10);
        assert_eq!(layout.widths, vec![10, 10, 10]);
        assert!(layout.overflow);
    }

    #[test]
    fn test_zero_natural_widths_split_evenly() {
        let layout = distribute(&[Natural(0), Natural(0), Natural(0)], 31, 1);
        assert_eq!(layout.total(), 31);
        let max = layout.widths.iter().max().copied().unwrap();
        let min = layout.widths.iter().min().copied().unwrap();
        assert!(max - min <= 1);
    }

    #[test]
    fn test_rounding_keeps_total() {
        for container in 20..60 {
            let layout = distribute(&[Fixed(2), Natural(7), Natural(11), Natural(13)], container, 3);
            assert_eq!(layout.total(), container, "container {container}");
        }
    }

    #[test]
    fn test_fixed_only() {
        let layout = distribute(&[Fixed(10), Fixed(10)], 15, 4);
        assert_eq!(layout.widths, vec![10, 10]);
        assert!(layout.overflow);
    }
}
