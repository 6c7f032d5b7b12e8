/// The player's hit points. May drop below zero; readers clamp for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Health {
    current: i32,
    max: i32,
    extended: bool,
}

impl Health {
    pub(crate) fn new(max: i32) -> Self {
        let max = max.max(1);
        Self {
            current: max,
            max,
            extended: false,
        }
    }

    /// Negative amounts deal damage.
    pub(crate) fn add(&mut self, amount: i32) {
        self.current = self.current.saturating_add(amount);
    }

    pub(crate) fn current(&self) -> i32 {
        self.current
    }

    pub(crate) fn max(&self) -> i32 {
        self.max
    }

    pub(crate) fn is_below_max(&self) -> bool {
        self.current < self.max
    }

    /// Adds the bonus segment shown once the power carrot is eaten.
    pub(crate) fn power_up(&mut self) {
        self.extended = true;
    }

    pub(crate) fn is_extended(&self) -> bool {
        self.extended
    }

    pub(crate) fn restart(&mut self) {
        self.current = self.max;
        self.extended = false;
    }
}
