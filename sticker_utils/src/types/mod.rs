//! Type-Safe Wrappers Module
//!
//! - `crf`: VP9 CRF 类型安全包装
//! - `file_size`: 文件大小类型安全包装

pub mod crf;
pub mod file_size;

pub use crf::{Crf, CrfError, VP9_CRF_MAX, VP9_CRF_MIN};
pub use file_size::FileSize;

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn crf_validation_property(value in -100i64..100i64) {
            let result = Crf::new(value);
            let in_range = (0..=63).contains(&value);
            prop_assert_eq!(result.is_ok(), in_range,
                "VP9 CRF {} should be {}",
                value,
                if in_range { "valid" } else { "invalid" }
            );
        }

        #[test]
        fn crf_step_up_stays_in_range(value in 0i64..=63, step in 1u8..20) {
            let crf = Crf::new(value).unwrap();
            match crf.step_up(step) {
                Some(next) => {
                    prop_assert!(next.value() <= VP9_CRF_MAX);
                    prop_assert_eq!(next.value() as i64, value + step as i64);
                }
                None => prop_assert!(value + step as i64 > VP9_CRF_MAX as i64),
            }
        }

        #[test]
        fn file_size_budget_property(size in 0u64..1_000_000, budget in 0u64..1_000_000) {
            prop_assert_eq!(
                FileSize::new(size).fits_within(FileSize::new(budget)),
                size <= budget
            );
        }
    }
}
