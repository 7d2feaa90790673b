use crate::{
    codec::{KeyAsValue, ValueCodec},
    collections::{Item, Map},
    error::InternalError,
    range::{Iter, RangeValues, Ranger},
    schema::{Prefix, SchemaBuilder},
    store::KvStore,
};

const LENGTH_SUFFIX: u8 = 0x00;
const ELEMENTS_SUFFIX: u8 = 0x01;

///
/// Vector
///
/// Append-only indexed list. The length lives under `prefix ++ 0x00`
/// (registered as `{name}_length`) and element `i` under
/// `prefix ++ 0x01 ++ be(i)` (registered as `{name}_elements`).
///

#[derive(Clone, Debug)]
pub struct Vector<VC> {
    name: String,
    length: Item<KeyAsValue<u64>>,
    elements: Map<u64, VC>,
}

impl<VC: ValueCodec> Vector<VC> {
    pub fn new(
        builder: &mut SchemaBuilder,
        prefix: impl Into<Prefix>,
        name: impl Into<String>,
        value_codec: VC,
    ) -> Self {
        let prefix = prefix.into();
        let name = name.into();

        Self {
            length: Item::new(
                builder,
                prefix.child(LENGTH_SUFFIX),
                format!("{name}_length"),
                KeyAsValue::new(),
            ),
            elements: Map::new(
                builder,
                prefix.child(ELEMENTS_SUFFIX),
                format!("{name}_elements"),
                value_codec,
            ),
            name,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len<S: KvStore>(&self, store: &S) -> Result<u64, InternalError> {
        Ok(self.length.try_get(store)?.unwrap_or(0))
    }

    pub fn is_empty<S: KvStore>(&self, store: &S) -> Result<bool, InternalError> {
        Ok(self.len(store)? == 0)
    }

    /// Append `value`, returning its index.
    pub fn push<S: KvStore>(
        &self,
        store: &mut S,
        value: &VC::Value,
    ) -> Result<u64, InternalError> {
        let index = self.len(store)?;
        let len = index.checked_add(1).ok_or_else(|| {
            InternalError::collection_unsupported(format!("vector '{}' is full", self.name))
        })?;
        self.elements.set(store, &index, value)?;
        self.length.set(store, &len)?;

        Ok(index)
    }

    /// Remove and return the last element.
    pub fn pop<S: KvStore>(&self, store: &mut S) -> Result<VC::Value, InternalError> {
        let len = self.len(store)?;
        let Some(last) = len.checked_sub(1) else {
            return Err(InternalError::empty_vec(&self.name));
        };

        let value = self.elements.get(store, &last)?;
        self.elements.remove(store, &last)?;
        self.length.set(store, &last)?;

        Ok(value)
    }

    pub fn get<S: KvStore>(&self, store: &S, index: u64) -> Result<VC::Value, InternalError> {
        self.check_bounds(store, index)?;

        self.elements.get(store, &index)
    }

    /// Overwrite the element at `index`; the index must already exist.
    pub fn replace<S: KvStore>(
        &self,
        store: &mut S,
        index: u64,
        value: &VC::Value,
    ) -> Result<(), InternalError> {
        self.check_bounds(store, index)?;

        self.elements.set(store, &index, value)
    }

    /// Iterate `(index, value)` pairs selected by an index range.
    pub fn iterate<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        range: impl Ranger<u64>,
    ) -> Result<Iter<'a, u64, VC>, InternalError> {
        self.elements.iterate(store, range)
    }

    pub fn iter<'a, S: KvStore>(
        &'a self,
        store: &'a S,
    ) -> Result<Iter<'a, u64, VC>, InternalError> {
        self.iterate(store, RangeValues::full())
    }

    pub fn walk<S, E, F>(&self, store: &S, range: impl Ranger<u64>, f: F) -> Result<(), E>
    where
        S: KvStore,
        E: From<InternalError>,
        F: FnMut(u64, VC::Value) -> Result<bool, E>,
    {
        self.elements.walk(store, range, f)
    }

    fn check_bounds<S: KvStore>(&self, store: &S, index: u64) -> Result<(), InternalError> {
        let len = self.len(store)?;
        if index >= len {
            return Err(InternalError::out_of_bounds(&self.name, index, len));
        }

        Ok(())
    }
}
