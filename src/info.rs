/// Caller-defined bits that tell apart positions sharing a fingerprint, e.g. side to move or
/// castling rights.
///
/// The cache assumes nothing about the layout. It compares [`ExtraInfo::bits`] for equality and
/// mixes [`ExtraInfo::key_bits`] into the fingerprint.
pub trait ExtraInfo: Copy + Eq + Send + Sync {
    /// Full-width value, stored verbatim in the entry.
    fn bits(self) -> u64;

    /// Value folded into the key: the 32-bit truncation of [`ExtraInfo::bits`].
    #[inline]
    fn key_bits(self) -> u64 {
        self.bits() as u32 as u64
    }
}

macro_rules! impl_extra_info {
    ($($ty:ty),*) => {
        $(impl ExtraInfo for $ty {
            #[inline]
            fn bits(self) -> u64 { self as u64 }
        })*
    };
}

impl_extra_info!(bool, u8, u16, u32, u64);

#[test]
fn test_key_bits_truncate() {
    assert_eq!(0x1_0000_0003_u64.bits(), 0x1_0000_0003);
    assert_eq!(0x1_0000_0003_u64.key_bits(), 3);
    assert_eq!(true.key_bits(), 1);
    assert_eq!(0xffu8.key_bits(), 0xff);
}
