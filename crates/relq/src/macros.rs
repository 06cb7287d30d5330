//! Helper macros.

/// Build a `Vec<Value>` from heterogeneous arguments.
///
/// ```ignore
/// let q = relq::table("users").filter("age > ? AND name = ?", relq::args![18, "bob"]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}
