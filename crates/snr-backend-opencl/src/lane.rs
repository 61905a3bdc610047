// SPDX-License-Identifier: Apache-2.0

//! Typed descriptors for the unrolled per-lane fragments.
//!
//! Each work-item processes `nr_items_d0` lane slots; a slot is identified by
//! its index and its element offset from the work-item's base position. The
//! generators render one fragment per slot per role, so the descriptors can
//! be tested independently of full-kernel assembly.

use crate::template::replace_all;

/// One unrolled lane slot: its index and its offset along the parallel axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneSlot {
    pub index: u32,
    pub offset: u32,
}

/// The slots one work-item owns: `nr_items` slots spaced `stride` elements
/// apart (the stride is the thread count along the same axis).
pub fn lane_slots(nr_items: u32, stride: u32) -> Vec<LaneSlot> {
    (0..nr_items)
        .map(|index| LaneSlot {
            index,
            offset: index * stride,
        })
        .collect()
}

impl LaneSlot {
    /// Specialize a fragment template for this slot: every `<%NUM%>` becomes
    /// the slot index, every `<%OFFSET%>` the element offset. Slot zero
    /// elides the ` + <%OFFSET%>` term entirely so the emitted address stays
    /// free of a dead `+ 0`.
    pub fn render(&self, template: &str) -> String {
        let numbered = replace_all(template, "<%NUM%>", &self.index.to_string());
        if self.offset == 0 {
            replace_all(&numbered, " + <%OFFSET%>", "")
        } else {
            replace_all(&numbered, "<%OFFSET%>", &self.offset.to_string())
        }
    }
}
