//! Read request construction
//!
//! One clause per column binding, in binding order:
//!
//! - a binding with a qualifier requests that column
//! - a binding without one requests the whole map-type family
//!
//! Version counts and page sizes are copied from the binding unchanged.
//! Entity-id bindings need no clause; their values come from the row key.

use log::debug;

use crate::entity::EntitySpec;
use crate::store::{ColumnRequest, ReadRequest, TimeRange};

/// Builds the read request for an entity spec
pub struct RequestBuilder<'a, E> {
    spec: &'a EntitySpec<E>,
    time_range: TimeRange,
}

impl<'a, E> RequestBuilder<'a, E> {
    pub fn new(spec: &'a EntitySpec<E>) -> Self {
        Self {
            spec,
            time_range: TimeRange::all(),
        }
    }

    /// Restricts the request to cells written within `time_range`
    pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = time_range;
        self
    }

    pub fn build(&self) -> ReadRequest {
        let mut request = ReadRequest::new(self.time_range);

        for binding in self.spec.column_bindings() {
            let clause = match binding.qualifier() {
                Some(qualifier) => {
                    debug!(
                        "Requesting column {}:{} for field {}",
                        binding.family(),
                        qualifier,
                        binding.field()
                    );
                    ColumnRequest::column(
                        binding.family(),
                        qualifier,
                        binding.max_versions(),
                        binding.page_size(),
                    )
                }
                None => {
                    debug!(
                        "Requesting family {} for field {}",
                        binding.family(),
                        binding.field()
                    );
                    ColumnRequest::family(
                        binding.family(),
                        binding.max_versions(),
                        binding.page_size(),
                    )
                }
            };
            request.columns.push(clause);
        }

        for binding in self.spec.entity_id_bindings() {
            debug!(
                "Ignoring entity-id field {} (component {})",
                binding.field(),
                binding.component()
            );
        }

        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{MapTimeSeries, PagedMap, TimeSeries};
    use crate::entity::{ColumnDef, Entity, EntityDescriptor, ALL_VERSIONS};
    use crate::store::{KeySchema, TableLayout};

    fn layout() -> TableLayout {
        TableLayout::new("user_table", KeySchema::strings(["login"]))
            .with_group_family("info", ["login", "zip_code"])
            .with_map_family("query_count")
    }

    #[derive(Default)]
    struct User {
        login: String,
        zip: i32,
        zips: TimeSeries<i32>,
        history: MapTimeSeries<i64>,
        pages: PagedMap<i64>,
    }

    impl Entity for User {
        fn describe() -> EntityDescriptor<Self> {
            EntityDescriptor::<Self>::new("user_table")
                .entity_id("login", "login", |u| &mut u.login)
                .column("zip", ColumnDef::new("info", "zip_code"), |u| &mut u.zip)
                .column(
                    "zips",
                    ColumnDef::new("info", "zip_code").max_versions(5),
                    |u| &mut u.zips,
                )
                .column(
                    "history",
                    ColumnDef::family("query_count").all_versions(),
                    |u| &mut u.history,
                )
                .column(
                    "pages",
                    ColumnDef::family("query_count").page_size(3),
                    |u| &mut u.pages,
                )
        }
    }

    #[test]
    fn test_one_clause_per_column_binding() {
        let spec = EntitySpec::<User>::for_entity(&layout()).unwrap();
        let request = RequestBuilder::new(&spec).build();

        assert_eq!(request.time_range, TimeRange::all());
        assert_eq!(
            request.columns,
            vec![
                ColumnRequest::column("info", "zip_code", 1, 0),
                ColumnRequest::column("info", "zip_code", 5, 0),
                ColumnRequest::family("query_count", ALL_VERSIONS, 0),
                ColumnRequest::family("query_count", 1, 3),
            ]
        );
        assert_eq!(request.max_versions("info", "zip_code"), Some(5));
        assert!(!request.requests_family("info_missing"));
    }

    #[test]
    fn test_time_range_is_carried() {
        let spec = EntitySpec::<User>::for_entity(&layout()).unwrap();
        let request = RequestBuilder::new(&spec)
            .with_time_range(TimeRange::new(10, 20))
            .build();
        assert_eq!(request.time_range, TimeRange::new(10, 20));
    }

    #[test]
    fn test_entity_ids_only_spec_requests_nothing() {
        #[derive(Default)]
        struct KeyOnly {
            login: String,
        }

        impl Entity for KeyOnly {
            fn describe() -> EntityDescriptor<Self> {
                EntityDescriptor::<Self>::new("user_table")
                    .entity_id("login", "login", |k| &mut k.login)
            }
        }

        let spec = EntitySpec::<KeyOnly>::for_entity(&layout()).unwrap();
        assert!(RequestBuilder::new(&spec).build().is_empty());
    }
}
