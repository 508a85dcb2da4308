//! `json_model!`: declares a model type.

/// Declares a model struct, its field accessors and its [`Model`](crate::Model) impl.
///
/// ```
/// use json_models::{json_model, CharField, Collection, IntField, Model};
///
/// json_model! {
///     /// A street address.
///     pub struct Address {
///         number: IntField = IntField::new("number") => set_number,
///         street: CharField = CharField::new("street") => set_street,
///         city: CharField = CharField::new("city"),
///         foobars: Collection<String> = Collection::new("foobars"),
///     }
///     finders {
///         (number) => "http://address/number/%s",
///         (number, street) => "http://address/number/%s/street/%s",
///         (street, "stringfield") => "http://address/street/%s/stringfield/%s",
///     }
///     headers {
///         "Accept" => "application/json",
///     }
/// }
///
/// let mut address = Address::parse(r#"{"number": 10, "street": "1st Ave. South"}"#).unwrap();
/// assert_eq!(address.number().unwrap(), Some(10));
/// address.set_street(Some("Mockingbird Lane".to_string())).unwrap();
/// assert_eq!(address.to_string(), r#"{"number":10,"street":"Mockingbird Lane"}"#);
/// assert!(address.foobars().unwrap().is_empty());
/// ```
///
/// Each field line is `name: Kind = descriptor` with an optional `=> setter`. The getter
/// `name()` returns `Result<<Kind as Field>::Value, ModelError>`; the setter takes the same
/// value type. Finder keys are field names or string literals; a field name that is not
/// declared fails to compile. `validate = path_or_closure;` installs the post-load hook, a
/// `fn(&Self) -> Result<(), ModelError>`.
///
/// An invalid declaration (duplicate key sets, placeholder counts that do not match, empty
/// path segments) panics with a [`DeclarationError`](crate::DeclarationError) the first time
/// the type's registry is used.
#[macro_export]
macro_rules! json_model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $kind:ty = $descriptor:expr $(=> $setter:ident)?
            ),* $(,)?
        }
        $(finders {
            $( ( $($key:tt),+ ) => $template:expr ),* $(,)?
        })?
        $(headers {
            $( $header:expr => $header_value:expr ),* $(,)?
        })?
        $(validate = $validator:expr;)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name {
            document: $crate::Document,
        }

        const _: () = {
            struct Descriptors {
                $( $field: $kind, )*
            }

            fn descriptors() -> &'static Descriptors {
                static DESCRIPTORS: ::std::sync::OnceLock<Descriptors> = ::std::sync::OnceLock::new();
                DESCRIPTORS.get_or_init(|| Descriptors {
                    $( $field: $descriptor, )*
                })
            }

            impl $name {
                $(
                    $(#[$field_meta])*
                    pub fn $field(
                        &self,
                    ) -> ::std::result::Result<<$kind as $crate::field::Field>::Value, $crate::ModelError> {
                        $crate::field::Field::parse(&descriptors().$field, &self.document)
                    }

                    $(
                        pub fn $setter(
                            &mut self,
                            value: <$kind as $crate::field::Field>::Value,
                        ) -> ::std::result::Result<(), $crate::ModelError> {
                            $crate::field::Field::store(&descriptors().$field, &mut self.document, value)
                        }
                    )?
                )*
            }

            impl $crate::Model for $name {
                fn model_type() -> &'static $crate::ModelType {
                    static MODEL_TYPE: ::std::sync::OnceLock<$crate::ModelType> =
                        ::std::sync::OnceLock::new();
                    MODEL_TYPE.get_or_init(|| {
                        #[allow(unused_variables)]
                        let fields = descriptors();
                        let declared = $crate::ModelType::builder(stringify!($name))
                            $( .field(stringify!($field), &fields.$field) )*
                            $($( .finder(
                                &[$( $crate::__finder_key!(fields, $key) ),+],
                                $template,
                            ) )*)?
                            $($( .header($header, $header_value) )*)?
                            .build();
                        match declared {
                            Ok(model_type) => model_type,
                            Err(e) => panic!("invalid model declaration `{}`: {}", stringify!($name), e),
                        }
                    })
                }

                fn objects() -> &'static $crate::Manager<Self> {
                    static OBJECTS: ::std::sync::OnceLock<$crate::Manager<$name>> =
                        ::std::sync::OnceLock::new();
                    OBJECTS.get_or_init(|| $crate::Manager::new(<Self as $crate::Model>::model_type()))
                }

                fn from_document_unchecked(document: $crate::Document) -> Self {
                    Self { document }
                }

                fn document(&self) -> &$crate::Document {
                    &self.document
                }

                fn document_mut(&mut self) -> &mut $crate::Document {
                    &mut self.document
                }

                #[allow(unreachable_code)]
                fn validate_on_load(&self) -> ::std::result::Result<(), $crate::ModelError> {
                    $(
                        let validator: fn(&Self) -> ::std::result::Result<(), $crate::ModelError> =
                            $validator;
                        return validator(self);
                    )?
                    Ok(())
                }
            }

            impl ::std::fmt::Display for $name {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    ::std::fmt::Display::fmt(&self.document, f)
                }
            }
        };
    };
}

/// Finder key inside `json_model!`: a declared field name or a string literal.
#[doc(hidden)]
#[macro_export]
macro_rules! __finder_key {
    ($fields:ident, $key:ident) => {{
        let _ = &$fields.$key;
        stringify!($key)
    }};
    ($fields:ident, $key:literal) => {
        $key
    };
}
