//! Field-to-column catalogs.
//!
//! A [`Catalog`] is the ordered association list between an entity's logical
//! field names and its physical columns, produced by whatever metadata
//! mechanism the host application uses. Entry order defines generated
//! column-list and insert-value ordering.
//!
//! Producing a catalog (introspecting the entity shape) is not cheap and is
//! requested on every query, so catalogs are shared behind
//! [`CatalogRegistry`]: a process-wide, append-only, read-through cache keyed
//! by entity name. A race that computes the same catalog twice is tolerated
//! (catalogs are pure and deterministic); the double-checked write keeps it
//! rare.

use crate::error::{QueryError, QueryResult};
use crate::ident::validate_ident;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// One field↔column association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub field: String,
    pub column: String,
    pub label: String,
    pub primary_key: bool,
}

/// The ordered field→column association list for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entity: String,
    table: String,
    columns: Vec<ColumnDef>,
}

impl Catalog {
    /// Start building a catalog for an entity backed by a physical table.
    pub fn builder(entity: &str, table: &str) -> QueryResult<CatalogBuilder> {
        if entity.trim().is_empty() {
            return Err(QueryError::required("catalog entity name"));
        }
        validate_ident(table)?;
        Ok(CatalogBuilder {
            catalog: Catalog {
                entity: entity.to_string(),
                table: table.to_string(),
                columns: Vec::new(),
            },
        })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Resolve a bare (alias-stripped) field name to its column entry.
    pub fn resolve(&self, field: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// The primary-key column, if one was flagged.
    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }
}

/// Builder for a [`Catalog`].
pub struct CatalogBuilder {
    catalog: Catalog,
}

impl CatalogBuilder {
    /// Add a field↔column association. Order of calls defines column order.
    pub fn column(mut self, field: &str, column: &str, label: &str) -> QueryResult<Self> {
        self.push(field, column, label, false)?;
        Ok(self)
    }

    /// Add the primary-key association.
    pub fn primary_key(mut self, field: &str, column: &str, label: &str) -> QueryResult<Self> {
        self.push(field, column, label, true)?;
        Ok(self)
    }

    fn push(&mut self, field: &str, column: &str, label: &str, pk: bool) -> QueryResult<()> {
        if field.trim().is_empty() {
            return Err(QueryError::required("catalog field name"));
        }
        validate_ident(column)?;
        self.catalog.columns.push(ColumnDef {
            field: field.to_string(),
            column: column.to_string(),
            label: label.to_string(),
            primary_key: pk,
        });
        Ok(())
    }

    pub fn build(self) -> Catalog {
        self.catalog
    }
}

/// Supplies the catalog for an entity name.
pub trait CatalogProvider {
    fn catalog(&self, entity: &str) -> QueryResult<Arc<Catalog>>;
}

/// Process-wide catalog cache with explicit registration and compute-once
/// loading.
#[derive(Default)]
pub struct CatalogRegistry {
    catalogs: RwLock<HashMap<String, Arc<Catalog>>>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prebuilt catalog under its entity name.
    pub fn register(&self, catalog: Catalog) {
        let mut map = self.catalogs.write().expect("catalog registry poisoned");
        map.insert(catalog.entity().to_string(), Arc::new(catalog));
    }

    /// Look up a cached catalog.
    pub fn get(&self, entity: &str) -> Option<Arc<Catalog>> {
        let map = self.catalogs.read().expect("catalog registry poisoned");
        map.get(entity).cloned()
    }

    /// Look up a catalog, computing and caching it on first use. Concurrent
    /// first lookups may compute twice; the first write wins.
    pub fn get_or_build<F>(&self, entity: &str, build: F) -> QueryResult<Arc<Catalog>>
    where
        F: FnOnce() -> QueryResult<Catalog>,
    {
        if let Some(found) = self.get(entity) {
            return Ok(found);
        }
        let built = Arc::new(build()?);
        let mut map = self.catalogs.write().expect("catalog registry poisoned");
        Ok(map
            .entry(entity.to_string())
            .or_insert_with(|| built)
            .clone())
    }
}

impl CatalogProvider for CatalogRegistry {
    fn catalog(&self, entity: &str) -> QueryResult<Arc<Catalog>> {
        self.get(entity)
            .ok_or_else(|| QueryError::invalid(format!("no catalog registered for '{entity}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_catalog() -> Catalog {
        Catalog::builder("User", "T_USER")
            .unwrap()
            .primary_key("id", "ID", "Id")
            .unwrap()
            .column("name", "NAME", "Name")
            .unwrap()
            .column("score", "SCORE", "Score")
            .unwrap()
            .build()
    }

    #[test]
    fn resolves_in_declared_order() {
        let catalog = user_catalog();
        let fields: Vec<_> = catalog.columns().iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["id", "name", "score"]);
        assert_eq!(catalog.resolve("name").unwrap().column, "NAME");
        assert!(catalog.resolve("missing").is_none());
        assert_eq!(catalog.primary_key().unwrap().field, "id");
    }

    #[test]
    fn rejects_invalid_physical_names() {
        assert!(Catalog::builder("User", "T_USER; DROP").is_err());
        let builder = Catalog::builder("User", "T_USER").unwrap();
        assert!(builder.column("name", "BAD NAME", "Name").is_err());
    }

    #[test]
    fn registry_computes_once() {
        let registry = CatalogRegistry::new();
        let mut calls = 0;
        let first = registry
            .get_or_build("User", || {
                calls += 1;
                Ok(user_catalog())
            })
            .unwrap();
        let second = registry
            .get_or_build("User", || {
                calls += 1;
                Ok(user_catalog())
            })
            .unwrap();
        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn provider_errors_on_unknown_entity() {
        let registry = CatalogRegistry::new();
        registry.register(user_catalog());
        assert!(registry.catalog("User").is_ok());
        assert!(registry.catalog("Ghost").is_err());
    }
}
