//! Accessor generation macros
//!
//! These macros eliminate repetitive match code on payload-carrying enums.
//! All macros use `paste` internally for identifier concatenation.

// =============================================================================
// Enum accessor generation
// =============================================================================

/// Generate is_xxx, as_xxx, as_xxx_mut for enums with one-field variants
///
/// Uses paste's `:camel` modifier to convert the method name to the variant name.
///
/// # Generated methods per variant:
/// - `is_xxx(&self) -> bool`
/// - `as_xxx(&self) -> Option<&Type>`
/// - `as_xxx_mut(&mut self) -> Option<&mut Type>`
///
/// # Example
/// ```ignore
/// impl ShapeKind {
///     // text -> Text, image -> Image
///     impl_enum_accessors!(text: TextBody, image: ImageShape);
/// }
/// ```
#[macro_export]
macro_rules! impl_enum_accessors {
    ($($variant:ident : $ty:ty),* $(,)?) => {
        ::paste::paste! {
            $(
                #[doc = "Check if this is a " [<$variant:camel>] " variant"]
                pub fn [<is_ $variant>](&self) -> bool {
                    matches!(self, Self::[<$variant:camel>](_))
                }

                #[doc = "Try to get as " $variant " reference"]
                pub fn [<as_ $variant>](&self) -> Option<&$ty> {
                    match self { Self::[<$variant:camel>](v) => Some(v), _ => None }
                }

                #[doc = "Try to get as mutable " $variant " reference"]
                pub fn [<as_ $variant _mut>](&mut self) -> Option<&mut $ty> {
                    match self { Self::[<$variant:camel>](v) => Some(v), _ => None }
                }
            )*
        }
    };
}

/// Generate a method returning a constant per fieldless-or-not variant
///
/// # Example
/// ```ignore
/// impl_variant_names!(name; Text => "text", Image => "image");
/// // Expands to: pub fn name(&self) -> &'static str { match self { Self::Text(..) => "text", ... } }
/// ```
#[macro_export]
macro_rules! impl_variant_names {
    ($method:ident; $($variant:ident => $name:literal),* $(,)?) => {
        #[doc = concat!("Static `", stringify!($method), "` of the variant")]
        pub fn $method(&self) -> &'static str {
            match self {
                $(Self::$variant(..) => $name,)*
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[derive(Debug)]
    enum Value {
        Int(i64),
        Word(String),
    }

    impl Value {
        impl_enum_accessors!(int: i64, word: String);
        impl_variant_names!(name; Int => "int", Word => "word");
    }

    #[test]
    fn test_generated_accessors() {
        let mut value = Value::Int(3);
        assert!(value.is_int());
        assert!(!value.is_word());
        assert_eq!(value.as_int(), Some(&3));
        if let Some(v) = value.as_int_mut() {
            *v = 4;
        }
        assert_eq!(value.as_int(), Some(&4));
        assert_eq!(value.as_word(), None);
        assert_eq!(value.name(), "int");
        assert_eq!(Value::Word("x".into()).name(), "word");
    }
}
