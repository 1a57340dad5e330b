//! Column descriptors: the storage-facing half of each entity.
//!
//! Records in [`crate::entity`] carry no storage metadata. Instead every
//! entity owns an ordered `&'static [Column]` whose order matches the columns
//! of its source file.

/// The closed set of semantic column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Integer,
  Float,
  String,
  Boolean,
  Timestamp,
}

/// Target of a foreign-key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
  pub table:  &'static str,
  pub column: &'static str,
}

/// One column of an entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
  pub name:        &'static str,
  pub ty:          ColumnType,
  pub nullable:    bool,
  pub primary_key: bool,
  pub indexed:     bool,
  pub references:  Option<ForeignKey>,
}

impl Column {
  /// A nullable, unindexed column.
  pub const fn new(name: &'static str, ty: ColumnType) -> Self {
    Self {
      name,
      ty,
      nullable: true,
      primary_key: false,
      indexed: false,
      references: None,
    }
  }

  /// A non-null primary-key column.
  pub const fn primary_key(name: &'static str, ty: ColumnType) -> Self {
    Self {
      name,
      ty,
      nullable: false,
      primary_key: true,
      indexed: false,
      references: None,
    }
  }

  pub const fn indexed(mut self) -> Self {
    self.indexed = true;
    self
  }

  pub const fn references(
    mut self,
    table: &'static str,
    column: &'static str,
  ) -> Self {
    self.references = Some(ForeignKey { table, column });
    self
  }
}
