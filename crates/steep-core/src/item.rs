use crate::id::CollectibleId;
use serde::{Deserialize, Serialize};

/// Index of the dedicated solid ingredient slot.
pub const SOLID_SLOT: usize = 0;
/// Index of the liquid slot.
pub const LIQUID_SLOT: usize = 1;
/// Number of content slots in a station.
pub const SLOT_COUNT: usize = 2;

/// The two content slots of a station, indexed by [`SOLID_SLOT`] and
/// [`LIQUID_SLOT`].
pub type Contents = [Option<ItemStack>; SLOT_COUNT];

/// A stack of one catalog entry. Liquids are stored in raw units; divide by
/// the entry's `items_per_litre` for litres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: CollectibleId,
    pub quantity: u32,
    /// Hours of perish progress already applied to this stack.
    #[serde(default)]
    pub transitioned_hours: f32,
}

impl ItemStack {
    pub fn new(item: CollectibleId, quantity: u32) -> Self {
        Self {
            item,
            quantity,
            transitioned_hours: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    /// Remove up to `quantity` units. Returns the amount actually removed.
    #[must_use = "returns the quantity actually removed, which may be less than requested"]
    pub fn take(&mut self, quantity: u32) -> u32 {
        let removed = quantity.min(self.quantity);
        self.quantity -= removed;
        removed
    }
}

/// A cheap summary of a slot used to detect content changes between updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotFingerprint {
    pub item: Option<CollectibleId>,
    pub quantity: u32,
}

impl SlotFingerprint {
    pub fn of(slot: &Option<ItemStack>) -> Self {
        match slot {
            Some(stack) if !stack.is_empty() => Self {
                item: Some(stack.item),
                quantity: stack.quantity,
            },
            _ => Self::default(),
        }
    }
}

/// Fingerprints of every slot in `contents`.
pub fn fingerprint(contents: &Contents) -> [SlotFingerprint; SLOT_COUNT] {
    [
        SlotFingerprint::of(&contents[SOLID_SLOT]),
        SlotFingerprint::of(&contents[LIQUID_SLOT]),
    ]
}

/// Remove `quantity` units from a slot, emptying it once depleted.
/// Returns the amount actually removed.
pub fn drain_slot(slot: &mut Option<ItemStack>, quantity: u32) -> u32 {
    let Some(stack) = slot.as_mut() else {
        return 0;
    };
    let removed = stack.take(quantity);
    if stack.is_empty() {
        *slot = None;
    }
    removed
}
