use rand::seq::SliceRandom;
use rand::Rng;

/// Praise shown on the success overlay.
pub const AFFIRMATIONS: [&str; 6] = [
    "AMAZING!",
    "PERFECT!",
    "YOU GOT IT!",
    "SUPERSTAR!",
    "WELL DONE!",
    "BRAVO!",
];

/// Pick one affirmation uniformly.
pub fn pick_affirmation<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    AFFIRMATIONS.choose(rng).copied().unwrap_or("PERFECT!")
}

/// What the success overlay shows for one solved puzzle.
#[derive(Debug, Clone, PartialEq)]
pub struct Celebration {
    pub message: &'static str,
    pub dimension_label: String,
}

impl Celebration {
    pub fn new(message: &'static str, dimension_label: String) -> Self {
        Self {
            message,
            dimension_label,
        }
    }

    pub fn start(dimension_label: String) -> Self {
        let mut rng = rand::thread_rng();
        Self::new(pick_affirmation(&mut rng), dimension_label)
    }
}
