use cyclus_core::StateId;

/// A single typed value inside a [`Datum`] row.
///
/// Mirrors the value kinds named in the data model: bool, int64, double,
/// string, bytes ("blob"), UUID, vector<T>, map<K,V>, or a composite
/// resource-id reference.
#[derive(Debug, Clone, PartialEq)]
pub enum DatumValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
    Blob(Vec<u8>),
    Uuid(uuid::Uuid),
    List(Vec<DatumValue>),
    Map(Vec<(DatumValue, DatumValue)>),
    /// A reference to a resource by its `state_id`, the join key into the
    /// Resources table.
    ResourceRef(StateId),
}

macro_rules! impl_from_datum_value {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for DatumValue {
            fn from(value: $ty) -> Self {
                DatumValue::$variant(value.into())
            }
        }
    };
}

impl_from_datum_value!(bool, Bool);
impl_from_datum_value!(i64, Int);
impl_from_datum_value!(i32, Int);
impl_from_datum_value!(u32, Int);
impl_from_datum_value!(f64, Double);
impl_from_datum_value!(String, Str);
impl_from_datum_value!(uuid::Uuid, Uuid);
impl_from_datum_value!(Vec<u8>, Blob);

impl From<&str> for DatumValue {
    fn from(value: &str) -> Self {
        DatumValue::Str(value.to_owned())
    }
}
impl From<u64> for DatumValue {
    fn from(value: u64) -> Self {
        // Resource/agent ids exceed i64 only in pathological runs; cast is
        // the pragmatic bridge to Postgres-style BIGINT backends.
        DatumValue::Int(value as i64)
    }
}

/// An append-only record of (title, list-of-named-values) destined for
/// backends, automatically stamped with the simulation's UUID.
///
/// Built via the owned-builder chain `Datum::new("Title").val("a", 1)...`,
/// then handed to [`crate::Recorder::record`].
#[derive(Debug, Clone)]
pub struct Datum {
    title: &'static str,
    sim_id: Option<uuid::Uuid>,
    values: Vec<(&'static str, DatumValue)>,
}

impl Datum {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            sim_id: None,
            values: Vec::new(),
        }
    }

    /// Appends a named, typed entry. Consumes and returns `self` so calls
    /// chain: `Datum::new("Foo").val("x", 1).val("y", "bananas")`.
    pub fn val(mut self, name: &'static str, value: impl Into<DatumValue>) -> Self {
        self.values.push((name, value.into()));
        self
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn sim_id(&self) -> Option<uuid::Uuid> {
        self.sim_id
    }

    pub fn values(&self) -> &[(&'static str, DatumValue)] {
        &self.values
    }

    pub(crate) fn stamp(&mut self, sim_id: uuid::Uuid) {
        self.sim_id = Some(sim_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chain_accumulates_values_in_order() {
        let datum = Datum::new("Resources").val("Quantity", 30.0).val("Units", "kg");
        assert_eq!(datum.title(), "Resources");
        assert_eq!(datum.values().len(), 2);
        assert_eq!(datum.values()[0].0, "Quantity");
    }
}
