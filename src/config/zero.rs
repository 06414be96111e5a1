use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Reports whether a value still holds its type's zero value.
///
/// Settings-file values only override built-in defaults when they are not
/// zero, so every field type of [`super::RunConfig`] implements this.
/// Composite values are zero when all of their parts are.
pub(crate) trait ZeroValue {
    fn is_zero(&self) -> bool;
}

macro_rules! zero_by_default {
    ($($t:ty),* $(,)?) => {
        $(
            impl ZeroValue for $t {
                fn is_zero(&self) -> bool {
                    *self == <$t>::default()
                }
            }
        )*
    };
}

zero_by_default!(bool, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, String);

impl ZeroValue for str {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl ZeroValue for PathBuf {
    fn is_zero(&self) -> bool {
        self.as_os_str().is_empty()
    }
}

impl<T: ZeroValue> ZeroValue for Option<T> {
    fn is_zero(&self) -> bool {
        self.as_ref().map_or(true, ZeroValue::is_zero)
    }
}

// Lists and maps have no "nil" state here; an empty container is absent.
impl<T> ZeroValue for Vec<T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> ZeroValue for HashMap<K, V, S> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> ZeroValue for BTreeMap<K, V> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: ZeroValue, const N: usize> ZeroValue for [T; N] {
    fn is_zero(&self) -> bool {
        self.iter().all(ZeroValue::is_zero)
    }
}

impl<T: ZeroValue + ?Sized> ZeroValue for &T {
    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }
}
