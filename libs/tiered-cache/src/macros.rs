/// Declares a unit struct implementing [`ScopeKey`](crate::key::ScopeKey).
///
/// ```
/// use tiered_cache::{ScopeKey, scope_key};
///
/// scope_key!(SellerYearKey => "goals:{}:{}"[seller_id: str, year: i32]);
///
/// assert_eq!(SellerYearKey.key_with_args(("S1", &2026)), "goals:S1:2026");
/// ```
#[macro_export]
macro_rules! scope_key {
    ($name:ident => $format_key:literal[$($arg:ident:$ty:ty),*]) => {
        #[doc=concat!("Scope key\n ## Format \n", $format_key)]
        pub struct $name;

        impl $crate::key::ScopeKey for $name {
            type Args<'r> = ($(&'r $ty,)*);

            fn key_with_args(&self, args: Self::Args<'_>) -> std::borrow::Cow<'static, str> {
                let ($($arg,)*) = args;

                (format!($format_key, $($arg),*)).into()
            }
        }
    };
}
