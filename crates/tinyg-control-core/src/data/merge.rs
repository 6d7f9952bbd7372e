//! Merge rules for partial state updates
//!
//! TinyG answers every request with only the keys it was asked for, so the
//! machine state is rebuilt by folding each decoded frame into the previous
//! snapshot. A field that is absent in the update keeps its known value.
//!
//! The rules exist once per field kind:
//! - [`merge_value`] for scalars and enums (replace when present)
//! - [`merge_nested`] for structures (recurse field by field when present)

/// Field-by-field overwrite-if-present merge.
pub trait Merge {
    /// Fold `update` into `self`.
    ///
    /// Only fields present in `update` are written. Applying the same update
    /// twice leaves `self` unchanged after the first application.
    fn merge_from(&mut self, update: &Self);
}

/// Replace `dst` with `src` when `src` carries a value.
#[inline]
pub fn merge_value<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if let Some(value) = src {
        *dst = Some(value.clone());
    }
}

/// Merge a nested structure without dropping the parts `src` does not mention.
#[inline]
pub fn merge_nested<T: Merge + Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if let Some(update) = src {
        match dst {
            Some(current) => current.merge_from(update),
            None => *dst = Some(update.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Pair {
        a: Option<i32>,
        b: Option<i32>,
    }

    impl Merge for Pair {
        fn merge_from(&mut self, update: &Self) {
            merge_value(&mut self.a, &update.a);
            merge_value(&mut self.b, &update.b);
        }
    }

    #[test]
    fn test_merge_value_keeps_known_on_absent() {
        let mut dst = Some(3);
        merge_value(&mut dst, &None);
        assert_eq!(dst, Some(3));
        merge_value(&mut dst, &Some(7));
        assert_eq!(dst, Some(7));
    }

    #[test]
    fn test_merge_nested_recurses() {
        let mut dst = Some(Pair {
            a: Some(1),
            b: Some(2),
        });
        merge_nested(
            &mut dst,
            &Some(Pair {
                a: None,
                b: Some(5),
            }),
        );
        assert_eq!(
            dst,
            Some(Pair {
                a: Some(1),
                b: Some(5)
            })
        );
    }

    #[test]
    fn test_merge_nested_fills_empty() {
        let mut dst: Option<Pair> = None;
        let update = Some(Pair {
            a: Some(9),
            b: None,
        });
        merge_nested(&mut dst, &update);
        assert_eq!(dst, update);
    }
}
