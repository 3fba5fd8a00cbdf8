use serde::{Deserialize, Serialize};

/// Landmarks per detected hand.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark index of the index fingertip.
pub const INDEX_FINGER_TIP: usize = 8;

/// Number of hands needed to span a rectangle.
pub const HANDS_EXPECTED: usize = 2;

/// Normalized landmark position, both axes in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A tracked point for the current frame only.
pub type TrackedPoint = Landmark;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hand {
    pub landmarks: Vec<Landmark>,
}

impl Hand {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Build a full skeleton where every landmark sits on the fingertip.
    pub fn from_fingertip(tip: Landmark) -> Self {
        Self {
            landmarks: vec![tip; LANDMARK_COUNT],
        }
    }

    /// Index fingertip, or `None` for a truncated landmark set.
    pub fn fingertip(&self) -> Option<TrackedPoint> {
        self.landmarks.get(INDEX_FINGER_TIP).copied()
    }
}

/// Everything the detector reported for one frame: zero or more hands with
/// normalized landmarks. The game only reads each hand's index fingertip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HandFrame {
    pub hands: Vec<Hand>,
}

impl HandFrame {
    pub fn new(hands: Vec<Hand>) -> Self {
        Self { hands }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_fingertips(tips: &[Landmark]) -> Self {
        Self {
            hands: tips.iter().copied().map(Hand::from_fingertip).collect(),
        }
    }

    /// All fingertips present this frame, for markers.
    pub fn fingertips(&self) -> Vec<TrackedPoint> {
        self.hands.iter().filter_map(Hand::fingertip).collect()
    }

    /// The two fingertips spanning the rectangle. Only an exact pair of
    /// well-formed hands qualifies.
    pub fn fingertip_pair(&self) -> Option<[TrackedPoint; 2]> {
        match self.hands.as_slice() {
            [a, b] => Some([a.fingertip()?, b.fingertip()?]),
            _ => None,
        }
    }

    /// Flip horizontally, as a selfie camera preview would.
    pub fn mirrored(&self) -> Self {
        Self {
            hands: self
                .hands
                .iter()
                .map(|hand| Hand {
                    landmarks: hand
                        .landmarks
                        .iter()
                        .map(|l| Landmark::new(1.0 - l.x, l.y))
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    A,
    B,
}

/// Two keyboard-steered fingertips standing in for a camera.
#[derive(Debug, Clone)]
pub struct VirtualHands {
    pub a: Landmark,
    pub b: Landmark,
    pub a_visible: bool,
    pub b_visible: bool,
}

impl VirtualHands {
    pub fn new(a: Landmark, b: Landmark) -> Self {
        Self {
            a,
            b,
            a_visible: true,
            b_visible: true,
        }
    }

    pub fn nudge(&mut self, pointer: Pointer, dx: f64, dy: f64) {
        let p = match pointer {
            Pointer::A => &mut self.a,
            Pointer::B => &mut self.b,
        };
        p.x = (p.x + dx).clamp(0.0, 1.0);
        p.y = (p.y + dy).clamp(0.0, 1.0);
    }

    pub fn toggle(&mut self, pointer: Pointer) {
        match pointer {
            Pointer::A => self.a_visible = !self.a_visible,
            Pointer::B => self.b_visible = !self.b_visible,
        }
    }

    pub fn frame(&self) -> HandFrame {
        let mut tips = Vec::with_capacity(HANDS_EXPECTED);
        if self.a_visible {
            tips.push(self.a);
        }
        if self.b_visible {
            tips.push(self.b);
        }
        HandFrame::from_fingertips(&tips)
    }
}

impl Default for VirtualHands {
    fn default() -> Self {
        Self::new(Landmark::new(0.3, 0.3), Landmark::new(0.5, 0.6))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingertip_reads_landmark_eight() {
        let mut landmarks = vec![Landmark::new(0.0, 0.0); LANDMARK_COUNT];
        landmarks[INDEX_FINGER_TIP] = Landmark::new(0.25, 0.75);
        let hand = Hand::new(landmarks);
        assert_eq!(hand.fingertip(), Some(Landmark::new(0.25, 0.75)));
    }

    #[test]
    fn truncated_hand_has_no_fingertip() {
        let hand = Hand::new(vec![Landmark::new(0.1, 0.1); 5]);
        assert_eq!(hand.fingertip(), None);
    }

    #[test]
    fn pair_requires_exactly_two_hands() {
        let one = HandFrame::from_fingertips(&[Landmark::new(0.1, 0.1)]);
        assert!(one.fingertip_pair().is_none());

        let three = HandFrame::from_fingertips(&[Landmark::new(0.1, 0.1); 3]);
        assert!(three.fingertip_pair().is_none());
        assert_eq!(three.fingertips().len(), 3);

        let two = HandFrame::from_fingertips(&[Landmark::new(0.1, 0.2), Landmark::new(0.3, 0.4)]);
        assert_eq!(
            two.fingertip_pair(),
            Some([Landmark::new(0.1, 0.2), Landmark::new(0.3, 0.4)])
        );
    }

    #[test]
    fn pair_with_malformed_hand_is_none() {
        let frame = HandFrame::new(vec![
            Hand::from_fingertip(Landmark::new(0.1, 0.1)),
            Hand::new(vec![]),
        ]);
        assert!(frame.fingertip_pair().is_none());
        assert_eq!(frame.fingertips().len(), 1);
    }

    #[test]
    fn mirrored_flips_x_only() {
        let frame = HandFrame::from_fingertips(&[Landmark::new(0.2, 0.4)]);
        let tip = frame.mirrored().fingertips()[0];
        assert!((tip.x - 0.8).abs() < 1e-12);
        assert_eq!(tip.y, 0.4);
    }

    #[test]
    fn virtual_hands_clamp_and_hide() {
        let mut hands = VirtualHands::default();
        hands.nudge(Pointer::A, -5.0, 0.0);
        assert_eq!(hands.a.x, 0.0);

        hands.toggle(Pointer::B);
        assert_eq!(hands.frame().hands.len(), 1);
        hands.toggle(Pointer::B);
        assert!(hands.frame().fingertip_pair().is_some());
    }
}
