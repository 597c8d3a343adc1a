//! Proptest strategies for names and type paths

use proptest::prelude::*;

/// A plain identifier
pub fn identifier() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,15}"
}

/// A dotted name of one to four identifiers
pub fn dotted_name() -> impl Strategy<Value = String> {
    prop::collection::vec(identifier(), 1..=4).prop_map(|parts| parts.join("."))
}

/// A `::`-separated type path of one to four identifiers
pub fn type_path() -> impl Strategy<Value = String> {
    prop::collection::vec(identifier(), 1..=4).prop_map(|parts| parts.join("::"))
}

/// Two distinct type paths, for declaring vs reflected types
pub fn distinct_type_paths() -> impl Strategy<Value = (String, String)> {
    (type_path(), type_path()).prop_filter("type paths must differ", |(a, b)| a != b)
}
