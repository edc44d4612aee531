//! CRF (Constant Rate Factor) Type-Safe Wrapper
//!
//! VP9 CRF values are validated once at construction; everything downstream
//! can pass a `Crf` around without re-checking the range.

use std::fmt;
use thiserror::Error;

/// VP9 minimum CRF (lossless)
pub const VP9_CRF_MIN: u8 = 0;

/// VP9 maximum CRF (lowest quality)
pub const VP9_CRF_MAX: u8 = 63;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrfError {
    #[error("VP9 CRF {value} out of range [{min}, {max}]")]
    OutOfRange { value: i64, min: u8, max: u8 },
}

/// 类型安全的 VP9 CRF 值
///
/// # Examples
/// ```
/// use sticker_utils::types::crf::Crf;
///
/// let crf = Crf::new(30).unwrap();
/// assert_eq!(crf.value(), 30);
///
/// assert!(Crf::new(64).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Crf(u8);

impl Crf {
    pub fn new(value: i64) -> Result<Self, CrfError> {
        if value < VP9_CRF_MIN as i64 || value > VP9_CRF_MAX as i64 {
            return Err(CrfError::OutOfRange {
                value,
                min: VP9_CRF_MIN,
                max: VP9_CRF_MAX,
            });
        }
        Ok(Self(value as u8))
    }

    /// 钳制到有效范围（不返回错误）
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(VP9_CRF_MIN as i64, VP9_CRF_MAX as i64) as u8)
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Next coarser value, or `None` when stepping would leave the VP9 range.
    pub fn step_up(&self, step: u8) -> Option<Self> {
        let next = self.0.checked_add(step)?;
        Self::new(next as i64).ok()
    }
}

impl fmt::Debug for Crf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Crf<VP9>({})", self.0)
    }
}

impl fmt::Display for Crf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vp9_crf_valid_range() {
        assert!(Crf::new(0).is_ok());
        assert!(Crf::new(63).is_ok());
        assert!(Crf::new(30).is_ok());

        assert!(Crf::new(-1).is_err());
        assert_eq!(
            Crf::new(64).unwrap_err().to_string(),
            "VP9 CRF 64 out of range [0, 63]"
        );
    }

    #[test]
    fn test_step_up() {
        let crf = Crf::new(45).unwrap();
        assert_eq!(crf.step_up(5).map(|c| c.value()), Some(50));

        let top = Crf::new(60).unwrap();
        assert_eq!(top.step_up(5), None);
    }

    #[test]
    fn test_crf_clamped() {
        assert_eq!(Crf::clamped(100).value(), 63);
        assert_eq!(Crf::clamped(-5).value(), 0);
        assert_eq!(Crf::clamped(35).value(), 35);
    }

    #[test]
    fn test_crf_display() {
        let crf = Crf::new(35).unwrap();
        assert_eq!(format!("{}", crf), "35");
        assert_eq!(format!("{:?}", crf), "Crf<VP9>(35)");
    }
}
