/// Running score. Frozen once the game is decided; the best score of the
/// process lifetime survives restarts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Scoreboard {
    score: u32,
    frozen: bool,
    high_score: u32,
}

impl Scoreboard {
    /// Returns whether the score changed.
    pub(crate) fn add(&mut self, amount: u32) -> bool {
        if self.frozen || amount == 0 {
            return false;
        }
        self.score = self.score.saturating_add(amount);
        true
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    pub(crate) fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn high_score(&self) -> u32 {
        self.high_score.max(self.score)
    }

    pub(crate) fn restart(&mut self) {
        self.high_score = self.high_score();
        self.score = 0;
        self.frozen = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_score_ignores_additions() {
        let mut board = Scoreboard::default();
        assert!(board.add(2));
        board.freeze();
        assert!(!board.add(5));
        assert_eq!(board.score(), 2);
    }

    #[test]
    fn restart_keeps_high_score() {
        let mut board = Scoreboard::default();
        board.add(9);
        board.freeze();
        board.restart();
        assert_eq!(board.score(), 0);
        assert!(!board.is_frozen());
        assert_eq!(board.high_score(), 9);

        board.add(4);
        board.restart();
        assert_eq!(board.high_score(), 9);
    }
}
