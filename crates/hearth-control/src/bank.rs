//! 1-based collections of device ports.

use hearth_core::PortIndex;

/// Devices addressed by [`PortIndex`].
///
/// A slot is empty when its device failed registration; lookups on empty
/// or out-of-range slots return `None`.
#[derive(Debug)]
pub struct PortBank<T> {
    slots: Vec<Option<T>>,
}

impl<T> Default for PortBank<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T> PortBank<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next port. `None` records a port that is present but
    /// unusable.
    pub fn push(&mut self, device: Option<T>) {
        self.slots.push(device);
    }

    pub fn get(&self, port: PortIndex) -> Option<&T> {
        self.slots.get(port.offset()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, port: PortIndex) -> Option<&mut T> {
        self.slots.get_mut(port.offset()).and_then(Option::as_mut)
    }

    /// Number of ports, usable or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of usable ports.
    pub fn available(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Usable ports with their indices.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PortIndex, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(offset, slot)| {
            let index = PortIndex::new(u8::try_from(offset + 1).ok()?).ok()?;
            slot.as_mut().map(|device| (index, device))
        })
    }
}

impl<T> FromIterator<Option<T>> for PortBank<T> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}
