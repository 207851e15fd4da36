/// Rising-edge test: `true` only when the button went from released to pressed.
pub fn detect_edge(current: bool, prev: bool) -> bool {
    !prev && current
}

/// One tick of button memory for edge detection.
///
/// The first sample only seeds the previous state, so a button already
/// held at power-on never produces a press.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeDetector {
    prev: Option<bool>,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self { prev: None }
    }

    /// Feed this tick's sample. Returns `true` on a press-began edge.
    pub fn update(&mut self, current: bool) -> bool {
        let edge = match self.prev {
            Some(prev) => detect_edge(current, prev),
            None => false,
        };
        self.prev = Some(current);
        edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_edge_truth_table() {
        assert!(!detect_edge(false, false));
        assert!(detect_edge(true, false));
        assert!(!detect_edge(true, true));
        assert!(!detect_edge(false, true));
    }

    #[test]
    fn one_event_per_rising_edge() {
        let samples = [
            false, false, true, true, true, false, true, false, false, true, true,
        ];
        let mut detector = EdgeDetector::new();
        let edges: Vec<usize> = samples
            .iter()
            .enumerate()
            .filter(|(_, &s)| detector.update(s))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(edges, vec![2, 6, 9]);
    }

    #[test]
    fn held_at_boot_is_not_a_press() {
        let mut detector = EdgeDetector::new();
        assert!(!detector.update(true));
        assert!(!detector.update(true));

        // Release and press again: that one counts.
        assert!(!detector.update(false));
        assert!(detector.update(true));
    }

    #[test]
    fn sustained_levels_never_fire() {
        let mut detector = EdgeDetector::new();
        assert!((0..50).all(|_| !detector.update(false)));
        assert!(detector.update(true));
        assert!((0..50).all(|_| !detector.update(true)));
    }
}
