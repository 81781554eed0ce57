use crate::models::Spot;

/// Number of spots kept; also the size of the history requested on login
pub const SPOT_CAPACITY: usize = 6;

/// Fixed-size ring of the most recent spots
#[derive(Debug, Clone, Default)]
pub struct SpotStore {
    slots: [Option<Spot>; SPOT_CAPACITY],
    count: usize,
    latest: Option<usize>,
}

impl SpotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a spot, overwriting the oldest once the ring is full
    pub fn add_spot(&mut self, spot: Spot) {
        let next = self.latest.map_or(0, |i| (i + 1) % SPOT_CAPACITY);
        self.slots[next] = Some(spot);
        self.latest = Some(next);
        if self.count < SPOT_CAPACITY {
            self.count += 1;
        }
    }

    /// Spots newest first, at most `SPOT_CAPACITY`
    pub fn get_spots_by_recency(&self) -> impl Iterator<Item = &Spot> + '_ {
        let latest = self.latest.unwrap_or(0);
        (0..self.count)
            .filter_map(move |i| self.slots[(latest + SPOT_CAPACITY - i) % SPOT_CAPACITY].as_ref())
    }

    /// Most recently added spot
    pub fn latest(&self) -> Option<&Spot> {
        self.latest.and_then(|i| self.slots[i].as_ref())
    }

    /// Get spot count
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Clear all spots
    pub fn clear(&mut self) {
        self.slots = Default::default();
        self.count = 0;
        self.latest = None;
    }
}
