//! Per-section selection and focus state
//!
//! Each animated object is split into sections (a light's position and
//! target handles, a piece's body and control points). Selection is tracked
//! per section in two bitmasks, with the invariant that every focused section
//! is also selected.

use bitflags::bitflags;

bitflags! {
    /// Bitmask over section indices
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SectionMask: u32 {
        /// Keep bits for every possible section index
        const _ = !0;
    }
}

impl SectionMask {
    /// Mask with only `index` set; empty for indices of 32 and above
    pub fn single(index: u32) -> Self {
        Self::from_bits_retain(1u32.checked_shl(index).unwrap_or(0))
    }

    /// Mask with the first `count` indices set
    pub fn first_n(count: u32) -> Self {
        if count >= u32::BITS {
            Self::all()
        } else {
            Self::from_bits_retain((1u32 << count) - 1)
        }
    }

    /// Lowest set index
    pub fn lowest(self) -> Option<u32> {
        if self.is_empty() {
            None
        } else {
            Some(self.bits().trailing_zeros())
        }
    }
}

/// A section type that maps to a bit index
pub trait SectionId: Copy {
    /// Bit index of this section (below 32)
    fn index(self) -> u32;
}

/// Selected and focused sections of one object
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: SectionMask,
    focused: SectionMask,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select or deselect a section; deselecting also drops its focus
    pub fn set_selected<S: SectionId>(&mut self, section: S, selected: bool) {
        let bit = SectionMask::single(section.index());
        if selected {
            self.selected |= bit;
        } else {
            self.selected -= bit;
            self.focused -= bit;
        }
    }

    /// Focus or unfocus a section; focusing also selects it
    pub fn set_focused<S: SectionId>(&mut self, section: S, focused: bool) {
        let bit = SectionMask::single(section.index());
        if focused {
            self.focused |= bit;
            self.selected |= bit;
        } else {
            self.focused -= bit;
        }
    }

    pub fn is_selected<S: SectionId>(&self, section: S) -> bool {
        self.selected.intersects(SectionMask::single(section.index()))
    }

    pub fn is_focused<S: SectionId>(&self, section: S) -> bool {
        self.focused.intersects(SectionMask::single(section.index()))
    }

    /// True if any section is selected
    pub fn is_any_selected(&self) -> bool {
        !self.selected.is_empty()
    }

    /// True if any section is focused
    pub fn is_any_focused(&self) -> bool {
        !self.focused.is_empty()
    }

    /// Select every section in `available`, or clear the whole selection
    pub fn set_all_selected(&mut self, selected: bool, available: SectionMask) {
        if selected {
            self.selected = available;
        } else {
            self.selected = SectionMask::empty();
        }
        self.focused &= self.selected;
    }

    /// Forget every section outside `available`
    pub fn retain(&mut self, available: SectionMask) {
        self.selected &= available;
        self.focused &= available;
    }

    /// Drop focus from every section, keeping the selection
    pub fn clear_focus(&mut self) {
        self.focused = SectionMask::empty();
    }

    /// Index of the focused section, the lowest one if several are focused
    pub fn focused_index(&self) -> Option<u32> {
        self.focused.lowest()
    }
}
