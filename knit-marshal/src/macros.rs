/// Declares a struct and implements [`Marshal`](crate::Marshal) for it.
///
/// Each field names its JSON key (the field name unless `as "key"` is given),
/// its registry type name, and whether it is `required` or `optional`.
/// Required fields are stored as the given type; optional fields as
/// `Option<Box<_>>`. Fields are written and read in declaration order.
///
/// ```
/// knit_marshal::aggregate! {
///     #[derive(Debug, PartialEq)]
///     pub struct Link as ["link_t"] {
///         pub i: required("int") i32,
///         pub next as "r": optional("link_t") Link,
///     }
/// }
///
/// let mut registry = knit_marshal::Registry::new();
/// registry.register_type::<Link>().unwrap();
///
/// let link: Link = registry.from_str(r#"{"i":1,"r":{"i":2,"r":null}}"#).unwrap().unwrap();
/// assert_eq!(link.next.as_ref().map(|n| n.i), Some(2));
/// assert_eq!(registry.to_string(&link).unwrap(), r#"{"i":1,"r":{"i":2,"r":null}}"#);
/// ```
#[macro_export]
macro_rules! aggregate {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident as [$($alias:literal),+ $(,)?] {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident $(as $key:literal)? : $mode:ident($type_name:literal) $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $crate::__knit_field!(@type $mode $ty),
            )*
        }

        impl $crate::Marshal for $name {
            const NAMES: &'static [&'static str] = &[$($alias),+];

            #[allow(unused_variables)]
            fn marshal_fields(
                &self,
                registry: &$crate::Registry,
                out: &mut $crate::Object,
            ) -> $crate::Result<()> {
                $(
                    $crate::__knit_field!(
                        @marshal $mode registry, out,
                        $crate::__knit_key!($field $($key)?), $type_name, self.$field
                    )?;
                )*
                Ok(())
            }

            #[allow(unused_variables)]
            fn unmarshal_fields(
                registry: &$crate::Registry,
                object: &$crate::Object,
            ) -> $crate::Result<Self> {
                Ok($name {
                    $(
                        $field: $crate::__knit_field!(
                            @unmarshal $mode $ty; registry, object,
                            $crate::__knit_key!($field $($key)?), $type_name
                        )?,
                    )*
                })
            }

            #[allow(unused_variables)]
            fn destroy_fields(self, registry: &$crate::Registry) -> $crate::Result<()> {
                $(
                    $crate::__knit_field!(
                        @destroy $mode registry,
                        $crate::__knit_key!($field $($key)?), $type_name, self.$field
                    )?;
                )*
                Ok(())
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __knit_key {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident $key:literal) => {
        $key
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __knit_field {
    (@type required $ty:ty) => { $ty };
    (@type optional $ty:ty) => { ::core::option::Option<::std::boxed::Box<$ty>> };

    (@marshal required $reg:ident, $out:ident, $key:expr, $tn:expr, $value:expr) => {
        $crate::field::marshal_required($reg, $out, $key, $tn, &$value)
    };
    (@marshal optional $reg:ident, $out:ident, $key:expr, $tn:expr, $value:expr) => {
        $crate::field::marshal_optional($reg, $out, $key, $tn, $value.as_deref())
    };

    (@unmarshal required $ty:ty; $reg:ident, $obj:ident, $key:expr, $tn:expr) => {
        $crate::field::unmarshal_required::<$ty>($reg, $obj, $key, $tn)
    };
    (@unmarshal optional $ty:ty; $reg:ident, $obj:ident, $key:expr, $tn:expr) => {
        $crate::field::unmarshal_optional::<$ty>($reg, $obj, $key, $tn)
    };

    (@destroy required $reg:ident, $key:expr, $tn:expr, $value:expr) => {
        $crate::field::destroy_required($reg, $key, $tn, $value)
    };
    (@destroy optional $reg:ident, $key:expr, $tn:expr, $value:expr) => {
        $crate::field::destroy_optional($reg, $key, $tn, $value)
    };
}
