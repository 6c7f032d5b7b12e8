use rand::rngs::SmallRng;

/// Something a pool can recycle instead of dropping.
pub(crate) trait Poolable {
    /// Reset to spawn defaults. Called on every spawn, fresh or reused.
    fn respawn(&mut self, rng: &mut SmallRng);
    fn is_inactive(&self) -> bool;
    /// Force the slot dead without any leaving animation.
    fn deactivate(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SlotId(usize);

/// Slot-indexed pool of one entity kind. Storage only grows; dead slots are
/// found by scanning in insertion order.
pub(crate) struct EntityPool<T> {
    slots: Vec<T>,
    make: Box<dyn Fn() -> T>,
    cap: Option<usize>,
}

impl<T: Poolable> EntityPool<T> {
    pub(crate) fn new(make: impl Fn() -> T + 'static, cap: Option<usize>) -> Self {
        Self {
            slots: Vec::new(),
            make: Box::new(make),
            cap: cap.filter(|cap| *cap > 0),
        }
    }

    /// Reuses the first inactive slot, otherwise grows. `None` at the cap.
    pub(crate) fn spawn(&mut self, rng: &mut SmallRng) -> Option<&mut T> {
        let slot = self.claim_slot(rng)?;
        self.slots.get_mut(slot.0)
    }

    /// Like [`EntityPool::spawn`] repeated `count` times. May return fewer
    /// slots than asked for when the cap is reached.
    pub(crate) fn spawn_multiple(&mut self, count: usize, rng: &mut SmallRng) -> Vec<SlotId> {
        let mut spawned = Vec::with_capacity(count);
        for _ in 0..count {
            match self.claim_slot(rng) {
                Some(slot) => spawned.push(slot),
                None => break,
            }
        }
        spawned
    }

    pub(crate) fn get(&self, slot: SlotId) -> Option<&T> {
        self.slots.get(slot.0)
    }

    pub(crate) fn get_mut(&mut self, slot: SlotId) -> Option<&mut T> {
        self.slots.get_mut(slot.0)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut()
    }

    pub(crate) fn iter_live(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter(|entity| !entity.is_inactive())
    }

    pub(crate) fn num_instances(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn num_active_instances(&self) -> usize {
        self.iter_live().count()
    }

    /// Kills every slot. Storage is kept for reuse.
    pub(crate) fn restart(&mut self) {
        for entity in &mut self.slots {
            entity.deactivate();
        }
    }

    fn claim_slot(&mut self, rng: &mut SmallRng) -> Option<SlotId> {
        if let Some(index) = self.slots.iter().position(|entity| entity.is_inactive()) {
            self.slots[index].respawn(rng);
            return Some(SlotId(index));
        }
        if self.cap.is_some_and(|cap| self.slots.len() >= cap) {
            return None;
        }
        let mut entity = (self.make)();
        entity.respawn(rng);
        self.slots.push(entity);
        Some(SlotId(self.slots.len() - 1))
    }
}
