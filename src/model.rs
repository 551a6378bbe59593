use crate::core::{Column, Result, Value};

/// Declared mapping between a Rust struct and a table shape.
///
/// Implementors list their columns explicitly; nothing is discovered at
/// runtime. The usual way to get an implementation is
/// `#[derive(TableModel)]`, which maps each struct field to a column
/// (`Option<T>` fields become nullable columns).
///
/// # Example
///
/// ```
/// use rowbridge::{TableModel, Value};
///
/// #[derive(Default, TableModel)]
/// struct User {
///     id: i64,
///     name: String,
///     email: Option<String>,
/// }
///
/// let mut user = User::default();
/// user.set("name", Value::Text("Ada".into())).unwrap();
/// assert_eq!(user.get("NAME"), Some(Value::Text("Ada".into())));
/// assert_eq!(User::table_name(), "User");
/// ```
pub trait TableModel {
    /// Table this model maps to. Defaults to the struct name unless
    /// overridden with `#[table(name = "...")]`.
    fn table_name() -> &'static str
    where
        Self: Sized;

    /// Column descriptors in field declaration order.
    fn columns() -> Vec<Column>
    where
        Self: Sized;

    /// Reads one field by column name (case-insensitive). `None` means the
    /// name matches no column; a null field reads as `Some(Value::Null)`.
    fn get(&self, column: &str) -> Option<Value>;

    /// Writes one field by column name (case-insensitive), coercing the
    /// value to the field's type where the conversion is lossless.
    fn set(&mut self, column: &str, value: Value) -> Result<()>;
}
