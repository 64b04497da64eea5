// Modified based on the https://github.com/sqlparser-rs/sqlparser-rs/blob/main/src/keywords.rs

/// Defines a string constant for a single keyword: `kw_def!(SELECT);`,
/// which expands to `const SELECT: &'static str = "SELECT";`
macro_rules! kw_def {
    ($ident:ident = $string_keyword:expr) => {
        const $ident: &'static str = $string_keyword;
    };
    ($ident:ident) => {
        kw_def!($ident = stringify!($ident));
    };
}

/// Expands to the `Keyword` enum and the `ALL_KEYWORDS` /
/// `ALL_KEYWORD_STRINGS` arrays of the reserved vocabulary.
///
/// **NOTE**: All keywords should be sorted to be able to match using binary search.
macro_rules! define_keywords {
    (
        $(
            $keyword:ident $(= $string_keyword:expr)?
        ),*
    ) => {
        /// The reserved vocabulary of the query language.
        #[allow(non_camel_case_types)]
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum Keyword {
            $(
                #[doc = stringify!($keyword)]
                $keyword
            ),*
        }

        impl ::core::fmt::Display for Keyword {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Debug::fmt(self, f)
            }
        }

        $( kw_def!($keyword $(= $string_keyword)?); )*

        /// All keywords, in the same order as [`ALL_KEYWORD_STRINGS`].
        pub const ALL_KEYWORDS: &[Keyword] = &[
            $(Keyword::$keyword),*
        ];

        /// All keyword strings, sorted so lookup can use binary search.
        pub const ALL_KEYWORD_STRINGS: &[&str] = &[
            $($keyword),*
        ];
    };
}
