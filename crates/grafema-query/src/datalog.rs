//! Datalog surface (§6): queries are opaque strings, accepted as-is;
//! results are lists of `{bindings:[{name, value}]}`. The binding/row
//! shapes live in [`crate::backend`] next to `Backend::check_guarantee`,
//! the only operation that produces them; this module re-exports them
//! under the name this surface uses so callers can `use
//! grafema_query::datalog::*` without reaching into `backend`.

pub use crate::backend::{Binding, DatalogRow};

pub type DatalogQuery = String;
