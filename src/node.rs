/// How the value stored alongside an entry relates to the true evaluation.
#[repr(u8)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    #[default]
    #[doc(alias = "Pv")]
    Exact,
    /// Proven floor, recorded on a beta cutoff.
    #[doc(alias = "Cut")]
    LowerBound,
    /// Proven ceiling, recorded when no move raised alpha.
    #[doc(alias = "All")]
    UpperBound,
}

// SAFETY: `Exact` has discriminant 0, so the all-zero byte is a valid `EntryType`.
unsafe impl bytemuck::Zeroable for EntryType {}
